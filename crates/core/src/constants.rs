//! Constants used throughout the Yorisoi core crate.
//!
//! User-facing labels live here so the REST and CLI surfaces show the same wording.

/// Default lifetime of a notification before it is dismissed, in milliseconds.
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 3000;

/// Label shown when a segment has no resolvable roster patient.
pub const UNCONFIRMED_LABEL: &str = "未確定";

/// Status given to medication rows added in a local draft.
pub const DEFAULT_MEDICATION_STATUS: &str = "開始";

/// Placeholder for empty lists in visit reports.
pub const EMPTY_LIST_LABEL: &str = "なし";

pub const MSG_APPROVED: &str = "承認・完了しました";
pub const MSG_UNAPPROVED: &str = "修正モードに切り替えました";
pub const MSG_DRAFT_SAVED: &str = "一時保存しました";
pub const MSG_COPIED: &str = "クリップボードにコピーしました";
pub const MSG_COPY_FAILED: &str = "コピーに失敗しました";

/// Environment variable naming an alternative fixture file.
pub const ENV_FIXTURES: &str = "YORISOI_FIXTURES";

/// Environment variable overriding the notification lifetime.
pub const ENV_NOTIFICATION_TTL_MS: &str = "YORISOI_NOTIFICATION_TTL_MS";

/// Environment variable for the REST listen address.
pub const ENV_REST_ADDR: &str = "YORISOI_REST_ADDR";

/// Listen address used when `YORISOI_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
