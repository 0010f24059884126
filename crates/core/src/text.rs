//! Plain-text renderings of clinical data.
//!
//! All renderers are deterministic string assembly over a [`ClinicalData`] value plus a little
//! context; none of them performs I/O. The output is meant to be pasted into an external EMR,
//! so section headers are fixed literals.

use crate::constants::EMPTY_LIST_LABEL;
use crate::model::{ClinicalData, Medication};
use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use yorisoi_types::display_date;

const RULE: &str = "--------------------------------------------------";

/// Who and when a visit text is about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitContext {
    pub patient_name: String,
    pub date: String,
    pub facility_name: Option<String>,
    pub timeframe: Option<String>,
}

impl VisitContext {
    pub fn new(patient_name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            patient_name: patient_name.into(),
            date: date.into(),
            facility_name: None,
            timeframe: None,
        }
    }

    pub fn with_facility(mut self, facility_name: impl Into<String>) -> Self {
        self.facility_name = Some(facility_name.into());
        self
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    /// `2025/11/12 午前`, or just the date when no timeframe is known.
    fn visit_label(&self) -> String {
        match self.timeframe.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(timeframe) => format!("{} {}", display_date(&self.date), timeframe),
            None => display_date(&self.date),
        }
    }
}

/// Text layouts available for export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// Full EMR copy-paste template.
    #[default]
    Emr,
    /// SOAP chart note only.
    Soap,
    /// Home-visit pharmacy report.
    HomeVisit,
}

impl TextFormat {
    pub fn render(self, context: &VisitContext, data: &ClinicalData) -> String {
        match self {
            TextFormat::Emr => generate_copy_text(&context.patient_name, &context.date, data),
            TextFormat::Soap => build_soap_text(context, data),
            TextFormat::HomeVisit => build_home_visit_text(context, data),
        }
    }
}

impl std::str::FromStr for TextFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim() {
            "emr" => Ok(TextFormat::Emr),
            "soap" => Ok(TextFormat::Soap),
            "home_visit" | "home-visit" => Ok(TextFormat::HomeVisit),
            other => Err(CoreError::InvalidInput(format!(
                "unknown text format '{other}' (expected emr, soap or home_visit)"
            ))),
        }
    }
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("・{item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bulleted list, or the empty-list label when there is nothing to show.
fn bullets_or_none(items: &[String]) -> String {
    if items.is_empty() {
        EMPTY_LIST_LABEL.to_string()
    } else {
        bullets(items)
    }
}

fn text_or_none(text: &str) -> &str {
    if text.trim().is_empty() {
        EMPTY_LIST_LABEL
    } else {
        text
    }
}

/// Builds the EMR copy-paste text for one record.
///
/// Empty lists leave blank lines in place so the section layout never shifts; the whole
/// result is trimmed.
pub fn generate_copy_text(patient_name: &str, date: &str, data: &ClinicalData) -> String {
    let ClinicalData {
        soap,
        pharmacy_focus,
        alerts,
        meta,
    } = data;

    let medications = pharmacy_focus
        .medications
        .iter()
        .map(|m| {
            format!(
                "- {} {} {} ({}): {}",
                m.name, m.dose, m.route, m.status, m.reason_or_note
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let contact = if alerts.need_to_contact_physician.is_empty() {
        String::new()
    } else {
        format!(
            "※医師連絡要: {}",
            alerts.need_to_contact_physician.join(", ")
        )
    };

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "診療記録: {date}");
    let _ = writeln!(out, "患者: {patient_name}");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "【SOAP】");
    let _ = writeln!(out, "■ S (Subjective)\n{}\n", soap.subjective);
    let _ = writeln!(out, "■ O (Objective)\n{}\n", soap.objective);
    let _ = writeln!(out, "■ A (Assessment)\n{}\n", soap.assessment);
    let _ = writeln!(out, "■ P (Plan)\n{}\n", soap.plan);
    let _ = writeln!(out, "【薬学的介入・指導】");
    let _ = writeln!(out, "薬剤:\n{medications}\n");
    let _ = writeln!(out, "指導・モニタリング:");
    let _ = writeln!(out, "{}", bullets(&pharmacy_focus.patient_education));
    let _ = writeln!(out, "{}\n", bullets(&pharmacy_focus.labs_and_monitoring));
    let _ = writeln!(out, "【Red Flags / アラート】");
    let _ = writeln!(out, "{}", bullets(&alerts.red_flags));
    let _ = writeln!(out, "{contact}\n");
    let _ = writeln!(out, "【その他】");
    let _ = writeln!(out, "問題点: {}", meta.main_problems.join(", "));
    let _ = writeln!(out, "{RULE}");

    out.trim().to_string()
}

/// SOAP-only chart note.
pub fn build_soap_text(context: &VisitContext, data: &ClinicalData) -> String {
    let soap = &data.soap;
    let mut out = String::new();

    let _ = write!(out, "{}", context.visit_label());
    if let Some(facility) = context.facility_name.as_deref() {
        let _ = write!(out, " {facility}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{} 様\n", context.patient_name);
    let _ = writeln!(out, "S（主観的情報）\n{}\n", text_or_none(&soap.subjective));
    let _ = writeln!(out, "O（客観的情報）\n{}\n", text_or_none(&soap.objective));
    let _ = writeln!(out, "A（評価）\n{}\n", text_or_none(&soap.assessment));
    let _ = writeln!(out, "P（計画）\n{}", text_or_none(&soap.plan));

    out.trim_end().to_string()
}

fn medication_line(m: &Medication) -> String {
    let regimen = [m.dose.as_str(), m.route.as_str(), m.frequency.as_str()]
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut line = format!("・{}", m.name);
    if !regimen.is_empty() {
        let _ = write!(line, " {regimen}");
    }
    if !m.status.trim().is_empty() {
        let _ = write!(line, "（{}）", m.status);
    }
    if !m.reason_or_note.trim().is_empty() {
        let _ = write!(line, " {}", m.reason_or_note);
    }
    line
}

/// Home-visit pharmacy management report.
pub fn build_home_visit_text(context: &VisitContext, data: &ClinicalData) -> String {
    let ClinicalData {
        soap,
        pharmacy_focus,
        alerts,
        meta,
    } = data;

    let medications = if pharmacy_focus.medications.is_empty() {
        EMPTY_LIST_LABEL.to_string()
    } else {
        pharmacy_focus
            .medications
            .iter()
            .map(medication_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut out = String::new();
    let _ = writeln!(out, "【訪問薬剤管理指導 報告書】");
    let _ = writeln!(out, "訪問日: {}", context.visit_label());
    if let Some(facility) = context.facility_name.as_deref() {
        let _ = writeln!(out, "訪問先: {facility}");
    }
    let _ = writeln!(out, "患者: {} 様\n", context.patient_name);
    let _ = writeln!(out, "■ 主な問題点\n{}\n", bullets_or_none(&meta.main_problems));
    let _ = writeln!(out, "■ 状況（S/O）\n{}", text_or_none(&soap.subjective));
    let _ = writeln!(out, "{}\n", text_or_none(&soap.objective));
    let _ = writeln!(out, "■ 処方薬\n{medications}\n");
    let _ = writeln!(
        out,
        "■ 服薬状況（アドヒアランス）\n{}\n",
        text_or_none(&pharmacy_focus.adherence)
    );
    let _ = writeln!(
        out,
        "■ 副作用モニタリング\n{}\n",
        bullets_or_none(&pharmacy_focus.side_effects)
    );
    let _ = writeln!(
        out,
        "■ 薬学的問題点・疑義照会\n{}\n",
        bullets_or_none(&pharmacy_focus.drug_related_problems)
    );
    let _ = writeln!(
        out,
        "■ 検査値・モニタリング\n{}\n",
        bullets_or_none(&pharmacy_focus.labs_and_monitoring)
    );
    let _ = writeln!(
        out,
        "■ 患者指導内容\n{}\n",
        bullets_or_none(&pharmacy_focus.patient_education)
    );
    let _ = writeln!(
        out,
        "■ 医師への連絡事項\n{}\n",
        bullets_or_none(&alerts.need_to_contact_physician)
    );
    let _ = writeln!(out, "■ 評価・計画\n{}", text_or_none(&soap.assessment));
    let _ = writeln!(out, "{}\n", text_or_none(&soap.plan));
    let _ = writeln!(
        out,
        "■ 次回フォローアップ\n{}",
        text_or_none(&pharmacy_focus.follow_up)
    );
    if !meta.note_for_pharmacy.trim().is_empty() {
        let _ = writeln!(out, "\n■ 申し送り\n{}", meta.note_for_pharmacy);
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alerts, Meta, PharmacyFocus, Soap};

    fn sample() -> ClinicalData {
        ClinicalData {
            soap: Soap {
                subjective: "足の痛みが続いている".into(),
                objective: "右足背に潰瘍あり".into(),
                assessment: "創部感染の疑い".into(),
                plan: "主治医へ報告".into(),
            },
            pharmacy_focus: PharmacyFocus {
                medications: vec![Medication {
                    name: "メトホルミン".into(),
                    dose: "500mg".into(),
                    route: "経口".into(),
                    frequency: "1日2回".into(),
                    status: "継続".into(),
                    reason_or_note: "血糖管理".into(),
                }],
                adherence: "良好".into(),
                side_effects: vec!["消化器症状".into()],
                drug_related_problems: vec![],
                labs_and_monitoring: vec!["HbA1c".into()],
                patient_education: vec!["フットケア".into()],
                follow_up: "2週間後".into(),
            },
            alerts: Alerts {
                red_flags: vec!["発熱".into()],
                need_to_contact_physician: vec!["38度以上の発熱".into(), "創部の悪化".into()],
            },
            meta: Meta {
                main_problems: vec!["糖尿病".into(), "足潰瘍".into()],
                note_for_pharmacy: "残薬確認".into(),
            },
        }
    }

    #[test]
    fn copy_text_contains_all_sections_in_order() {
        let text = generate_copy_text("田中 健", "2025-11-12", &sample());

        assert!(text.starts_with(RULE));
        assert!(text.ends_with(RULE));
        let order = [
            "診療記録: 2025-11-12",
            "患者: 田中 健",
            "【SOAP】",
            "■ S (Subjective)\n足の痛みが続いている",
            "■ P (Plan)\n主治医へ報告",
            "【薬学的介入・指導】",
            "- メトホルミン 500mg 経口 (継続): 血糖管理",
            "指導・モニタリング:\n・フットケア\n・HbA1c",
            "【Red Flags / アラート】\n・発熱",
            "※医師連絡要: 38度以上の発熱, 創部の悪化",
            "【その他】\n問題点: 糖尿病, 足潰瘍",
        ];
        let mut cursor = 0;
        for needle in order {
            let found = text[cursor..]
                .find(needle)
                .unwrap_or_else(|| panic!("missing or out of order: {needle}"));
            cursor += found + needle.len();
        }
    }

    #[test]
    fn copy_text_omits_contact_line_without_contacts() {
        let mut data = sample();
        data.alerts.need_to_contact_physician.clear();
        let text = generate_copy_text("田中 健", "2025-11-12", &data);
        assert!(!text.contains("医師連絡要"));
    }

    #[test]
    fn copy_text_is_deterministic() {
        let data = sample();
        assert_eq!(
            generate_copy_text("田中 健", "2025-11-12", &data),
            generate_copy_text("田中 健", "2025-11-12", &data)
        );
    }

    #[test]
    fn soap_text_uses_visit_header() {
        let ctx = VisitContext::new("田中 健", "2025-11-12")
            .with_timeframe("午前")
            .with_facility("さくら苑");
        let text = build_soap_text(&ctx, &sample());

        assert!(text.starts_with("2025/11/12 午前 さくら苑\n田中 健 様"));
        assert!(text.contains("S（主観的情報）\n足の痛みが続いている"));
        assert!(text.ends_with("P（計画）\n主治医へ報告"));
        assert!(!text.contains("メトホルミン"));
    }

    #[test]
    fn home_visit_text_marks_empty_sections() {
        let ctx = VisitContext::new("田中 健", "2025-11-12");
        let text = build_home_visit_text(&ctx, &sample());

        assert!(text.starts_with("【訪問薬剤管理指導 報告書】\n訪問日: 2025/11/12\n患者: 田中 健 様"));
        assert!(!text.contains("訪問先"));
        assert!(text.contains("・メトホルミン 500mg 経口 1日2回（継続） 血糖管理"));
        assert!(text.contains("■ 薬学的問題点・疑義照会\nなし"));
        assert!(text.ends_with("■ 申し送り\n残薬確認"));
    }

    #[test]
    fn format_dispatch_and_parsing() {
        let ctx = VisitContext::new("田中 健", "2025-11-12");
        let data = sample();
        assert_eq!(
            TextFormat::Emr.render(&ctx, &data),
            generate_copy_text("田中 健", "2025-11-12", &data)
        );
        assert_eq!("home-visit".parse::<TextFormat>().expect("parse"), TextFormat::HomeVisit);
        assert!("pdf".parse::<TextFormat>().is_err());
    }
}
