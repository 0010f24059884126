//! # API REST
//!
//! REST API implementation for Yorisoi.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! All state lives in one [`Session`] behind a mutex; handlers never hold the lock across an
//! await point.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::{
    AssignmentRes, DraftReq, DraftRes, HealthRes, MedicationEditReq, ListPatientsQuery, ListPatientsRes, ListRoundsRes,
    NotificationRes, PatientDetailRes, PatientSummary, RecordStatusRes, RecordTextQuery,
    RecordTextRes, RoundDetailRes, UpdateAssignmentReq,
};
use yorisoi_core::{
    draft::ClinicalDraft, AssignmentAction, AssignmentKey, PatientBrowserAction,
    RoundBrowserAction, Session, SortKey, TextFormat, VisitContext,
};

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        get_patient,
        approve_record,
        unapprove_record,
        record_text,
        render_draft,
        list_rounds,
        get_round,
        update_assignment,
        confirm_assignment,
        revert_assignment,
        current_notification,
    ),
    components(schemas(
        HealthRes,
        PatientSummary,
        ListPatientsRes,
        PatientDetailRes,
        RecordStatusRes,
        RecordTextRes,
        MedicationEditReq,
        DraftReq,
        DraftRes,
        ListRoundsRes,
        RoundDetailRes,
        UpdateAssignmentReq,
        AssignmentRes,
        NotificationRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full REST router, including the Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients))
        .route("/patients/:id", get(get_patient))
        .route(
            "/patients/:id/records/:record_id/approve",
            post(approve_record),
        )
        .route(
            "/patients/:id/records/:record_id/unapprove",
            post(unapprove_record),
        )
        .route("/patients/:id/records/:record_id/text", get(record_text))
        .route("/patients/:id/records/:record_id/draft", post(render_draft))
        .route("/rounds", get(list_rounds))
        .route("/rounds/:id", get(get_round))
        .route(
            "/rounds/:id/segments/:segment_id/assignment",
            put(update_assignment),
        )
        .route(
            "/rounds/:id/segments/:segment_id/confirm",
            post(confirm_assignment),
        )
        .route(
            "/rounds/:id/segments/:segment_id/revert",
            post(revert_assignment),
        )
        .route("/notification", get(current_notification))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the router until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ Starting Yorisoi REST on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Yorisoi is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    params(ListPatientsQuery),
    responses(
        (status = 200, description = "Filtered and sorted patients", body = ListPatientsRes),
        (status = 400, description = "Unknown sort key")
    )
)]
/// List patients matching `q`, ordered by `sort`
async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<ListPatientsQuery>,
) -> Result<Json<ListPatientsRes>, ApiError> {
    let key = match query.sort.as_deref() {
        None => SortKey::default(),
        Some(raw) => raw.parse().map_err(|e| {
            tracing::warn!("List patients rejected: {}", e);
            (StatusCode::BAD_REQUEST, "Unknown sort key")
        })?,
    };
    let session = state.session.lock().await;
    let patients = session
        .patients
        .list(query.q.as_deref().unwrap_or_default(), key)
        .into_iter()
        .map(PatientSummary::from)
        .collect();
    Ok(Json(ListPatientsRes { patients }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient with all records", body = PatientDetailRes),
        (status = 404, description = "Patient not found")
    )
)]
/// Fetch one patient and their records
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientDetailRes>, ApiError> {
    let session = state.session.lock().await;
    let patient = session
        .patients
        .patients()
        .iter()
        .find(|p| p.id.as_str() == id)
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "Patient not found"))?;
    Ok(Json(PatientDetailRes { patient }))
}

fn record_status_res(session: &Session, patient_id: String, record_id: String) -> RecordStatusRes {
    let status = session
        .patients
        .patients()
        .iter()
        .find(|p| p.id.as_str() == patient_id)
        .and_then(|p| p.find_record(&record_id))
        .map(|r| r.status);
    // Unresolved ids raise nothing; never echo an older notification.
    let notification = status
        .and_then(|_| session.patients.notifier().visible(Utc::now()))
        .cloned();
    RecordStatusRes {
        patient_id,
        record_id,
        status,
        notification,
    }
}

#[utoipa::path(
    post,
    path = "/patients/{id}/records/{record_id}/approve",
    params(
        ("id" = String, Path, description = "Patient id"),
        ("record_id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record status after the transition", body = RecordStatusRes)
    )
)]
/// Mark a record approved; unknown ids leave everything unchanged
async fn approve_record(
    State(state): State<AppState>,
    AxumPath((id, record_id)): AxumPath<(String, String)>,
) -> Json<RecordStatusRes> {
    let mut session = state.session.lock().await;
    let next = session.patients.clone().approve(&id, &record_id, Utc::now());
    session.patients = next;
    tracing::info!("Approve record {} for patient {}", record_id, id);
    Json(record_status_res(&session, id, record_id))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/records/{record_id}/unapprove",
    params(
        ("id" = String, Path, description = "Patient id"),
        ("record_id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record status after the transition", body = RecordStatusRes)
    )
)]
/// Return a record to pending; unknown ids leave everything unchanged
async fn unapprove_record(
    State(state): State<AppState>,
    AxumPath((id, record_id)): AxumPath<(String, String)>,
) -> Json<RecordStatusRes> {
    let mut session = state.session.lock().await;
    let next = session.patients.clone().unapprove(&id, &record_id, Utc::now());
    session.patients = next;
    tracing::info!("Unapprove record {} for patient {}", record_id, id);
    Json(record_status_res(&session, id, record_id))
}

fn parse_format(raw: Option<&str>) -> Result<TextFormat, ApiError> {
    match raw {
        None => Ok(TextFormat::default()),
        Some(raw) => raw.parse().map_err(|e| {
            tracing::warn!("Text format rejected: {}", e);
            (StatusCode::BAD_REQUEST, "Unknown text format")
        }),
    }
}

fn format_name(format: TextFormat) -> &'static str {
    match format {
        TextFormat::Emr => "emr",
        TextFormat::Soap => "soap",
        TextFormat::HomeVisit => "home_visit",
    }
}

#[utoipa::path(
    get,
    path = "/patients/{id}/records/{record_id}/text",
    params(
        ("id" = String, Path, description = "Patient id"),
        ("record_id" = String, Path, description = "Record id"),
        RecordTextQuery
    ),
    responses(
        (status = 200, description = "Rendered text", body = RecordTextRes),
        (status = 400, description = "Unknown text format"),
        (status = 404, description = "Patient or record not found")
    )
)]
/// Render a record as copy-paste text
async fn record_text(
    State(state): State<AppState>,
    AxumPath((id, record_id)): AxumPath<(String, String)>,
    Query(query): Query<RecordTextQuery>,
) -> Result<Json<RecordTextRes>, ApiError> {
    let format = parse_format(query.format.as_deref())?;
    let session = state.session.lock().await;
    let patient = session
        .patients
        .patients()
        .iter()
        .find(|p| p.id.as_str() == id)
        .ok_or((StatusCode::NOT_FOUND, "Patient not found"))?;
    let record = patient
        .find_record(&record_id)
        .ok_or((StatusCode::NOT_FOUND, "Record not found"))?;
    let text = format.render(
        &VisitContext::new(patient.name.clone(), record.date.clone()),
        &record.clinical_data,
    );
    Ok(Json(RecordTextRes {
        format: format_name(format).into(),
        text,
    }))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/records/{record_id}/draft",
    request_body = DraftReq,
    params(
        ("id" = String, Path, description = "Patient id"),
        ("record_id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Edited draft and its rendered text", body = DraftRes),
        (status = 400, description = "Unknown text format"),
        (status = 404, description = "Patient or record not found")
    )
)]
/// Apply local edits to a copy of a record and render it; the record itself is not changed
async fn render_draft(
    State(state): State<AppState>,
    AxumPath((id, record_id)): AxumPath<(String, String)>,
    Json(req): Json<DraftReq>,
) -> Result<Json<DraftRes>, ApiError> {
    let format = parse_format(req.format.as_deref())?;
    let mut session = state.session.lock().await;
    let (context, clinical_data) = {
        let patient = session
            .patients
            .patients()
            .iter()
            .find(|p| p.id.as_str() == id)
            .ok_or((StatusCode::NOT_FOUND, "Patient not found"))?;
        let record = patient
            .find_record(&record_id)
            .ok_or((StatusCode::NOT_FOUND, "Record not found"))?;
        let mut draft = ClinicalDraft::from_record(record);
        req.apply_to(&mut draft);
        (
            VisitContext::new(patient.name.clone(), record.date.clone()),
            draft.to_clinical_data(),
        )
    };

    let now = Utc::now();
    let next = session
        .patients
        .clone()
        .update(PatientBrowserAction::SaveDraft, now);
    session.patients = next;
    tracing::info!("Draft saved for record {} of patient {}", record_id, id);

    Ok(Json(DraftRes {
        text: format.render(&context, &clinical_data),
        format: format_name(format).into(),
        record_id,
        clinical_data,
        notification: session.patients.notifier().visible(now).cloned(),
    }))
}

#[utoipa::path(
    get,
    path = "/rounds",
    responses(
        (status = 200, description = "Rounds newest first with progress", body = ListRoundsRes)
    )
)]
/// List rounds with their confirmation progress
async fn list_rounds(State(state): State<AppState>) -> Json<ListRoundsRes> {
    let session = state.session.lock().await;
    Json(ListRoundsRes {
        rounds: session.rounds.summaries(),
    })
}

#[utoipa::path(
    get,
    path = "/rounds/{id}",
    params(("id" = String, Path, description = "Round id")),
    responses(
        (status = 200, description = "Round segments and facility roster", body = RoundDetailRes),
        (status = 404, description = "Round not found")
    )
)]
/// Fetch one round with its ordered segments
async fn get_round(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<RoundDetailRes>, ApiError> {
    let session = state.session.lock().await;
    let browser = &session.rounds;
    let round = browser
        .round(&id)
        .ok_or((StatusCode::NOT_FOUND, "Round not found"))?;
    let segments = browser
        .segment_views(&id)
        .ok_or((StatusCode::NOT_FOUND, "Round not found"))?;
    let roster = browser
        .facility_for(round)
        .map(|f| f.roster.clone())
        .unwrap_or_default();
    Ok(Json(RoundDetailRes {
        summary: browser.summary(round),
        segments,
        roster,
    }))
}

/// Applies an assignment action when the round and segment exist, then reports the result.
fn apply_assignment(
    session: &mut Session,
    round_id: String,
    segment_id: String,
    action: AssignmentAction,
) -> AssignmentRes {
    let known = session
        .rounds
        .round(&round_id)
        .is_some_and(|r| r.find_segment(&segment_id).is_some());
    if known {
        let next = session
            .rounds
            .clone()
            .update(RoundBrowserAction::Assignment(action));
        session.rounds = next;
    } else {
        tracing::warn!("Assignment ignored for unknown segment {}/{}", round_id, segment_id);
    }
    let browser = &session.rounds;
    AssignmentRes {
        assignment: browser.board().get(&round_id, &segment_id).cloned(),
        label: browser.assigned_label(&round_id, &segment_id),
        round_id,
        segment_id,
    }
}

#[utoipa::path(
    put,
    path = "/rounds/{id}/segments/{segment_id}/assignment",
    request_body = UpdateAssignmentReq,
    params(
        ("id" = String, Path, description = "Round id"),
        ("segment_id" = String, Path, description = "Segment id")
    ),
    responses(
        (status = 200, description = "Assignment after the update", body = AssignmentRes),
        (status = 400, description = "Patient is not on the round's facility roster")
    )
)]
/// Link a segment to a roster patient; the assignment becomes unconfirmed
///
/// A blank or `null` patient id unlinks the segment.
async fn update_assignment(
    State(state): State<AppState>,
    AxumPath((id, segment_id)): AxumPath<(String, String)>,
    Json(req): Json<UpdateAssignmentReq>,
) -> Result<Json<AssignmentRes>, ApiError> {
    let mut session = state.session.lock().await;
    let patient_id = req
        .roster_patient_id
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if let Some(patient_id) = patient_id {
        let known_segment = session
            .rounds
            .round(&id)
            .is_some_and(|r| r.find_segment(&segment_id).is_some());
        if known_segment && !session.rounds.is_on_roster(&id, patient_id) {
            tracing::warn!(
                "Assignment rejected: {} is not on the roster for round {}",
                patient_id,
                id
            );
            return Err((StatusCode::BAD_REQUEST, "Patient is not on the roster"));
        }
    }
    let action = AssignmentAction::Update {
        key: AssignmentKey::new(id.clone(), segment_id.clone()),
        roster_patient_id: req.roster_patient_id,
    };
    Ok(Json(apply_assignment(&mut session, id, segment_id, action)))
}

#[utoipa::path(
    post,
    path = "/rounds/{id}/segments/{segment_id}/confirm",
    params(
        ("id" = String, Path, description = "Round id"),
        ("segment_id" = String, Path, description = "Segment id")
    ),
    responses(
        (status = 200, description = "Assignment after the confirm", body = AssignmentRes)
    )
)]
/// Confirm a linked segment; without a linked patient nothing changes
async fn confirm_assignment(
    State(state): State<AppState>,
    AxumPath((id, segment_id)): AxumPath<(String, String)>,
) -> Json<AssignmentRes> {
    let action = AssignmentAction::Confirm {
        key: AssignmentKey::new(id.clone(), segment_id.clone()),
    };
    let mut session = state.session.lock().await;
    Json(apply_assignment(&mut session, id, segment_id, action))
}

#[utoipa::path(
    post,
    path = "/rounds/{id}/segments/{segment_id}/revert",
    params(
        ("id" = String, Path, description = "Round id"),
        ("segment_id" = String, Path, description = "Segment id")
    ),
    responses(
        (status = 200, description = "Assignment after the revert", body = AssignmentRes)
    )
)]
/// Return a confirmed segment to unconfirmed, keeping its linked patient
async fn revert_assignment(
    State(state): State<AppState>,
    AxumPath((id, segment_id)): AxumPath<(String, String)>,
) -> Json<AssignmentRes> {
    let action = AssignmentAction::Revert {
        key: AssignmentKey::new(id.clone(), segment_id.clone()),
    };
    let mut session = state.session.lock().await;
    Json(apply_assignment(&mut session, id, segment_id, action))
}

#[utoipa::path(
    get,
    path = "/notification",
    responses(
        (status = 200, description = "Currently visible notification, if any", body = NotificationRes)
    )
)]
/// Current notification, hidden once its display time has passed
async fn current_notification(State(state): State<AppState>) -> Json<NotificationRes> {
    let session = state.session.lock().await;
    Json(NotificationRes {
        notification: session.patients.notifier().visible(Utc::now()).cloned(),
    })
}
