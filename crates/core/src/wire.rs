//! Wire models exchanged with the hospital backend and translation helpers.
//!
//! Responsibilities:
//! - Define the consultation record as the backend returns it on read
//! - Translate that record into a form draft and treatment plan
//! - Build the create/update payload from a draft and treatment plan
//! - Parse standalone draft documents with path-aware error reporting
//!
//! Notes:
//! - The backend is lenient about types (ids as numbers or strings, lists sometimes missing);
//!   the read model absorbs that so the draft stays strictly typed.

use crate::constants::DISCHARGE_REASON_EXPIRED;
use crate::de;
use crate::draft::{
    BedRef, ConsultationDraft, DoctorRef, FacilityRef, Icd11Diagnosis, PatientCategory,
    SymptomCode, Suggestion, TelemedicineAction,
};
use crate::plan::{Investigation, PrnPrescription, Prescription, Procedure, TreatmentPlan};
use crate::{ConsultError, ConsultResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Read model
// ============================================================================

/// A consultation as returned by the backend's read operation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConsultationRecord {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: String,
    pub symptoms: Vec<SymptomCode>,
    pub other_symptoms: Option<String>,
    pub symptoms_onset_date: Option<String>,
    #[serde(deserialize_with = "de::blank_as_none")]
    pub suggestion: Option<Suggestion>,
    pub consultation_status: Option<u32>,
    pub admitted_to: Option<String>,
    /// Category display text, e.g. `"Comfort Care"`.
    pub category: Option<String>,
    pub admission_date: Option<String>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub referred_to: String,
    pub icd11_diagnoses_object: Vec<Icd11Diagnosis>,
    pub icd11_provisional_diagnoses_object: Vec<Icd11Diagnosis>,
    pub verified_by: Option<String>,
    pub is_kasp: Option<bool>,
    pub examination_details: Option<String>,
    pub history_of_present_illness: Option<String>,
    pub prescribed_medication: Option<String>,
    pub consultation_notes: Option<String>,
    pub ip_no: Option<String>,
    pub is_telemedicine: Option<bool>,
    pub action: Option<TelemedicineAction>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub assigned_to: String,
    pub assigned_to_object: Option<DoctorRef>,
    pub special_instruction: Option<String>,
    pub review_interval: Option<i32>,
    #[serde(deserialize_with = "de::lenient_string")]
    pub weight: String,
    #[serde(deserialize_with = "de::lenient_string")]
    pub height: String,
    pub current_bed: Option<CurrentBed>,
    pub discharge_reason: Option<String>,
    /// Free-text discharge notes; for a declared death this is the cause of death.
    pub discharge_notes: Option<String>,
    pub death_datetime: Option<String>,
    pub death_confirmed_doctor: Option<String>,
    #[serde(deserialize_with = "de::list_or_empty")]
    pub discharge_advice: Vec<Prescription>,
    #[serde(deserialize_with = "de::list_or_empty")]
    pub prn_prescription: Vec<PrnPrescription>,
    #[serde(deserialize_with = "de::list_or_empty")]
    pub investigation: Vec<Investigation>,
    #[serde(deserialize_with = "de::list_or_empty")]
    pub procedure: Vec<Procedure>,
}

/// The bed a patient currently occupies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CurrentBed {
    pub bed_object: Option<BedRef>,
}

/// Patient lookup used for the page header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatientRecord {
    pub name: String,
    pub facility_object: Option<FacilityRef>,
}

/// Identifier returned after a create or update.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SavedConsultation {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: String,
}

impl ConsultationRecord {
    /// Translate a backend record into a form draft and its treatment plan.
    ///
    /// Unparseable dates become `None`, an unknown or missing category falls back to comfort
    /// care, and the cause of death is read from the discharge notes.
    pub fn into_form(self) -> (ConsultationDraft, TreatmentPlan) {
        let category = self
            .category
            .as_deref()
            .and_then(PatientCategory::from_text)
            .unwrap_or(PatientCategory::Comfort);

        let draft = ConsultationDraft {
            symptoms: self.symptoms,
            other_symptoms: self.other_symptoms.unwrap_or_default(),
            symptoms_onset_date: self
                .symptoms_onset_date
                .as_deref()
                .and_then(de::parse_iso_date),
            suggestion: self.suggestion,
            consultation_status: self.consultation_status.unwrap_or_default(),
            category: Some(category),
            admitted_to: self.admitted_to.unwrap_or_default(),
            admission_date: self.admission_date.as_deref().and_then(de::parse_iso_date),
            ip_no: self.ip_no.unwrap_or_default(),
            bed: self.current_bed.and_then(|bed| bed.bed_object),
            referred_to: self.referred_to,
            icd11_diagnoses_object: self.icd11_diagnoses_object,
            icd11_provisional_diagnoses_object: self.icd11_provisional_diagnoses_object,
            verified_by: self.verified_by.unwrap_or_default(),
            is_kasp: Some(self.is_kasp.unwrap_or_default()),
            examination_details: self.examination_details.unwrap_or_default(),
            history_of_present_illness: self.history_of_present_illness.unwrap_or_default(),
            prescribed_medication: self.prescribed_medication.unwrap_or_default(),
            consultation_notes: self.consultation_notes.unwrap_or_default(),
            special_instruction: self.special_instruction.unwrap_or_default(),
            is_telemedicine: self.is_telemedicine.unwrap_or_default(),
            action: self.action.unwrap_or_default(),
            assigned_to: self.assigned_to,
            assigned_to_object: self.assigned_to_object,
            review_interval: self
                .review_interval
                .unwrap_or(crate::constants::REVIEW_INTERVAL_UNSET),
            weight: self.weight,
            height: self.height,
            discharge_reason: self.discharge_reason.unwrap_or_default(),
            cause_of_death: self.discharge_notes.unwrap_or_default(),
            death_datetime: self
                .death_datetime
                .as_deref()
                .and_then(de::parse_iso_datetime),
            death_confirmed_doctor: self.death_confirmed_doctor.unwrap_or_default(),
        };

        let plan = TreatmentPlan {
            prescriptions: self.discharge_advice,
            prn_prescriptions: self.prn_prescription,
            investigations: self.investigation,
            procedures: self.procedure,
        };

        (draft, plan)
    }
}

// ============================================================================
// Write model
// ============================================================================

/// Body of a create or update consultation call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsultationPayload {
    pub patient: String,
    pub facility: String,
    pub symptoms: Vec<SymptomCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms_onset_date: Option<NaiveDate>,
    pub suggestion: Option<Suggestion>,
    pub consultation_status: u32,
    pub admitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<NaiveDate>,
    pub category: Option<PatientCategory>,
    pub is_kasp: bool,
    pub kasp_enabled_date: Option<DateTime<Utc>>,
    pub examination_details: String,
    pub history_of_present_illness: String,
    pub prescribed_medication: String,
    pub ip_no: String,
    pub icd11_diagnoses: Vec<String>,
    pub icd11_provisional_diagnoses: Vec<String>,
    pub verified_by: String,
    pub discharge_advice: Vec<Prescription>,
    pub prn_prescription: Vec<PrnPrescription>,
    pub investigation: Vec<Investigation>,
    pub procedure: Vec<Procedure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_to: Option<String>,
    pub consultation_notes: String,
    pub is_telemedicine: bool,
    pub action: TelemedicineAction,
    pub review_interval: i32,
    pub assigned_to: String,
    pub special_instruction: String,
    pub weight: f64,
    pub height: f64,
    pub bed: Option<String>,
}

impl ConsultationPayload {
    /// Build the payload for a draft, keeping only the fields its decision makes relevant.
    ///
    /// # Arguments
    ///
    /// * `draft` - Validated form snapshot.
    /// * `plan` - Treatment plan rows submitted with it.
    /// * `patient_id` / `facility_id` - Owning patient and facility.
    /// * `now` - Submission time, recorded as the scheme enrolment date when `is_kasp` is set.
    pub fn from_form(
        draft: &ConsultationDraft,
        plan: &TreatmentPlan,
        patient_id: &str,
        facility_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let admitted = draft.is_admitted();
        let is_kasp = draft.is_kasp.unwrap_or_default();

        Self {
            patient: patient_id.to_owned(),
            facility: facility_id.to_owned(),
            symptoms: draft.symptoms.clone(),
            other_symptoms: draft
                .is_other_symptoms_selected()
                .then(|| draft.other_symptoms.clone()),
            symptoms_onset_date: draft
                .has_symptoms()
                .then_some(draft.symptoms_onset_date)
                .flatten(),
            suggestion: draft.suggestion,
            consultation_status: draft.consultation_status,
            admitted,
            admission_date: admitted.then_some(draft.admission_date).flatten(),
            category: draft.category,
            is_kasp,
            kasp_enabled_date: is_kasp.then_some(now),
            examination_details: draft.examination_details.clone(),
            history_of_present_illness: draft.history_of_present_illness.clone(),
            prescribed_medication: draft.prescribed_medication.clone(),
            ip_no: draft.ip_no.clone(),
            icd11_diagnoses: diagnosis_ids(&draft.icd11_diagnoses_object),
            icd11_provisional_diagnoses: diagnosis_ids(&draft.icd11_provisional_diagnoses_object),
            verified_by: draft.verified_by.clone(),
            discharge_advice: plan.prescriptions.clone(),
            prn_prescription: plan.prn_prescriptions.clone(),
            investigation: plan.investigations.clone(),
            procedure: plan.procedures.clone(),
            referred_to: (draft.suggestion == Some(Suggestion::Referral))
                .then(|| draft.referred_to.clone()),
            consultation_notes: draft.consultation_notes.clone(),
            is_telemedicine: draft.is_telemedicine,
            action: draft.action,
            review_interval: draft.review_interval,
            assigned_to: if draft.is_telemedicine {
                draft.assigned_to.clone()
            } else {
                String::new()
            },
            special_instruction: draft.special_instruction.clone(),
            weight: number_or_zero(&draft.weight),
            height: number_or_zero(&draft.height),
            bed: draft.bed.as_ref().map(|bed| bed.id.clone()),
        }
    }
}

/// Body of the discharge call chained after a declared death.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DischargeRequest {
    pub discharge_reason: String,
    pub discharge_notes: String,
    pub death_datetime: Option<NaiveDateTime>,
    pub death_confirmed_doctor: String,
}

impl DischargeRequest {
    /// Discharge as expired, carrying the death details entered on the draft.
    pub fn declared_dead(draft: &ConsultationDraft) -> Self {
        Self {
            discharge_reason: DISCHARGE_REASON_EXPIRED.to_owned(),
            discharge_notes: draft.cause_of_death.clone(),
            death_datetime: draft.death_datetime,
            death_confirmed_doctor: draft.death_confirmed_doctor.clone(),
        }
    }
}

fn diagnosis_ids(diagnoses: &[Icd11Diagnosis]) -> Vec<String> {
    diagnoses.iter().map(|d| d.id.clone()).collect()
}

fn number_or_zero(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ============================================================================
// Draft documents
// ============================================================================

/// A draft and its treatment plan as one JSON document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftDocument {
    #[serde(default)]
    pub draft: ConsultationDraft,
    #[serde(default)]
    pub plan: TreatmentPlan,
}

/// Parse a draft document from JSON text.
///
/// This uses `serde_path_to_error` to report the path (e.g. `draft.suggestion`) of the first
/// value that does not match the model.
///
/// # Errors
///
/// Returns [`ConsultError::Translation`] if the text is not JSON or does not match the
/// draft document schema, and [`ConsultError::Deserialization`] if a valid document is followed
/// by trailing characters.
pub fn parse_draft_document(json_text: &str) -> ConsultResult<DraftDocument> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);

    let parsed = serde_path_to_error::deserialize::<_, DraftDocument>(&mut deserializer);
    match parsed {
        Ok(document) => {
            deserializer.end()?;
            Ok(document)
        }
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(ConsultError::Translation(format!(
                "draft document schema mismatch at {path}: {source}"
            )))
        }
    }
}

/// Parse a consultation as returned by the backend.
///
/// # Errors
///
/// Returns [`ConsultError::Deserialization`] if the text is not a JSON object.
pub fn parse_consultation_record(json_text: &str) -> ConsultResult<ConsultationRecord> {
    Ok(serde_json::from_str(json_text)?)
}

/// Render a draft document as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ConsultError::Serialization`] if serialisation fails.
pub fn render_draft_document(document: &DraftDocument) -> ConsultResult<String> {
    serde_json::to_string_pretty(document).map_err(ConsultError::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    const RECORD_JSON: &str = r#"{
        "id": 311,
        "symptoms": [3, 9],
        "other_symptoms": "Night sweats",
        "symptoms_onset_date": "2023-05-28T00:00:00Z",
        "suggestion": "A",
        "consultation_status": 2,
        "admitted": true,
        "admitted_to": "Ward 4",
        "category": "Abnormal",
        "admission_date": "not-a-date",
        "referred_to": null,
        "icd11_diagnoses_object": [{ "id": 133207, "label": "Tuberculosis" }],
        "verified_by": "Dr. Nair",
        "is_kasp": true,
        "consultation_notes": "Start ATT",
        "ip_no": "IP-77",
        "is_telemedicine": false,
        "assigned_to": 12,
        "weight": 58,
        "height": "161",
        "current_bed": { "bed_object": { "id": "bed-9", "name": "B9" } },
        "discharge_notes": "",
        "discharge_advice": [{ "medicine": "Isoniazid", "dosage": "300mg OD" }],
        "prn_prescription": null,
        "investigation": "none",
        "procedure": [{ "procedure": "Chest X-ray", "time": "10:00" }]
    }"#;

    #[test]
    fn test_record_into_form() {
        let record: ConsultationRecord = serde_json::from_str(RECORD_JSON).expect("parse record");
        assert_eq!(record.id, "311");

        let (draft, plan) = record.into_form();
        assert_eq!(draft.symptoms, vec![SymptomCode(3), SymptomCode(9)]);
        assert_eq!(draft.other_symptoms, "Night sweats");
        assert_eq!(draft.symptoms_onset_date, NaiveDate::from_ymd_opt(2023, 5, 28));
        assert_eq!(draft.suggestion, Some(Suggestion::Admission));
        assert_eq!(draft.category, Some(PatientCategory::Moderate));
        assert_eq!(draft.admission_date, None);
        assert_eq!(draft.icd11_diagnoses_object[0].id, "133207");
        assert_eq!(draft.assigned_to, "12");
        assert_eq!(draft.weight, "58");
        assert_eq!(draft.is_kasp, Some(true));
        assert_eq!(draft.bed.as_ref().map(|b| b.id.as_str()), Some("bed-9"));
        assert!(draft.referred_to.is_empty());

        assert_eq!(plan.prescriptions.len(), 1);
        assert!(plan.prn_prescriptions.is_empty());
        assert!(plan.investigations.is_empty());
        assert_eq!(plan.procedures[0].procedure.as_deref(), Some("Chest X-ray"));
    }

    #[test]
    fn test_unknown_category_falls_back_to_comfort() {
        let record = ConsultationRecord {
            category: Some("Unheard of".into()),
            discharge_notes: Some("Septic shock".into()),
            ..ConsultationRecord::default()
        };
        let (draft, _) = record.into_form();
        assert_eq!(draft.category, Some(PatientCategory::Comfort));
        assert_eq!(draft.cause_of_death, "Septic shock");
    }

    #[test]
    fn test_payload_keeps_only_relevant_fields() {
        let draft = ConsultationDraft {
            symptoms: vec![SymptomCode(1)],
            other_symptoms: "stale text".into(),
            symptoms_onset_date: NaiveDate::from_ymd_opt(2023, 5, 1),
            suggestion: Some(Suggestion::Referral),
            admission_date: NaiveDate::from_ymd_opt(2023, 6, 1),
            referred_to: "facility-3".into(),
            is_telemedicine: false,
            assigned_to: "99".into(),
            is_kasp: Some(false),
            weight: "abc".into(),
            height: "170.5".into(),
            ..ConsultationDraft::default()
        };

        let payload =
            ConsultationPayload::from_form(&draft, &TreatmentPlan::default(), "p-1", "f-1", now());

        assert_eq!(payload.other_symptoms, None);
        assert_eq!(payload.symptoms_onset_date, None);
        assert!(!payload.admitted);
        assert_eq!(payload.admission_date, None);
        assert_eq!(payload.referred_to.as_deref(), Some("facility-3"));
        assert!(payload.assigned_to.is_empty());
        assert_eq!(payload.kasp_enabled_date, None);
        assert_eq!(payload.weight, 0.0);
        assert_eq!(payload.height, 170.5);

        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(json["suggestion"], "R");
        assert!(json.get("admission_date").is_none());
    }

    #[test]
    fn test_payload_for_admission() {
        let draft = ConsultationDraft {
            symptoms: vec![SymptomCode(3), SymptomCode(9)],
            other_symptoms: "Rash".into(),
            symptoms_onset_date: NaiveDate::from_ymd_opt(2023, 5, 30),
            referred_to: "ignored".into(),
            is_telemedicine: true,
            assigned_to: "7".into(),
            icd11_provisional_diagnoses_object: vec![Icd11Diagnosis {
                id: "1F57".into(),
                label: "Dengue".into(),
            }],
            bed: Some(BedRef {
                id: "bed-2".into(),
                name: "B2".into(),
            }),
            ..ConsultationDraft::new(NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date"))
        };
        let draft = ConsultationDraft {
            is_kasp: Some(true),
            ..draft
        };

        let payload =
            ConsultationPayload::from_form(&draft, &TreatmentPlan::default(), "p-1", "f-1", now());

        assert!(payload.admitted);
        assert_eq!(payload.admission_date, NaiveDate::from_ymd_opt(2023, 6, 1));
        assert_eq!(payload.other_symptoms.as_deref(), Some("Rash"));
        assert_eq!(payload.symptoms_onset_date, NaiveDate::from_ymd_opt(2023, 5, 30));
        assert_eq!(payload.referred_to, None);
        assert_eq!(payload.assigned_to, "7");
        assert_eq!(payload.kasp_enabled_date, Some(now()));
        assert_eq!(payload.icd11_provisional_diagnoses, vec!["1F57".to_string()]);
        assert_eq!(payload.bed.as_deref(), Some("bed-2"));
    }

    #[test]
    fn test_declared_dead_discharge_request() {
        let draft = ConsultationDraft {
            cause_of_death: "Respiratory failure".into(),
            death_datetime: de::parse_iso_datetime("2023-06-01T03:10"),
            death_confirmed_doctor: "Dr. Paul".into(),
            ..ConsultationDraft::default()
        };
        let request = DischargeRequest::declared_dead(&draft);
        assert_eq!(request.discharge_reason, "EXP");
        assert_eq!(request.discharge_notes, "Respiratory failure");
        assert!(request.death_datetime.is_some());
    }

    #[test]
    fn test_parse_draft_document_reports_path() {
        let err = parse_draft_document(r#"{ "draft": { "consultation_status": "two" } }"#)
            .expect_err("should reject string status");
        match err {
            ConsultError::Translation(msg) => {
                assert!(msg.contains("draft.consultation_status"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_draft_document_defaults_missing_parts() {
        let document = parse_draft_document(r#"{ "draft": { "symptoms": [2] } }"#)
            .expect("parse document");
        assert_eq!(document.draft.symptoms, vec![SymptomCode(2)]);
        assert!(document.plan.is_empty());

        let rendered = render_draft_document(&document).expect("render document");
        let reparsed = parse_draft_document(&rendered).expect("reparse document");
        assert_eq!(document, reparsed);
    }

    #[test]
    fn test_trailing_characters_are_rejected() {
        let err = parse_draft_document(r#"{ "draft": {} } extra"#)
            .expect_err("should reject trailing text");
        assert!(matches!(err, ConsultError::Deserialization(_)));
    }

    #[test]
    fn test_parse_consultation_record() {
        let record = parse_consultation_record(RECORD_JSON).expect("parse record");
        assert_eq!(record.id, "311");

        let err = parse_consultation_record("42").expect_err("number is not a record");
        assert!(matches!(err, ConsultError::Deserialization(_)));
    }

    #[test]
    fn test_record_dates_keep_their_offset_calendar_day() {
        let record = ConsultationRecord {
            admission_date: Some("2023-05-28T00:00:00+05:30".into()),
            symptoms_onset_date: Some("2023-05-20T02:00:00+05:30".into()),
            death_datetime: Some("2023-06-01T03:10:00+05:30".into()),
            ..ConsultationRecord::default()
        };

        let (draft, _) = record.into_form();
        assert_eq!(draft.admission_date, NaiveDate::from_ymd_opt(2023, 5, 28));
        assert_eq!(draft.symptoms_onset_date, NaiveDate::from_ymd_opt(2023, 5, 20));
        assert_eq!(
            draft.death_datetime,
            NaiveDate::from_ymd_opt(2023, 6, 1).and_then(|d| d.and_hms_opt(3, 10, 0))
        );

        let request = DischargeRequest::declared_dead(&draft);
        assert_eq!(request.death_datetime, draft.death_datetime);
    }
}
