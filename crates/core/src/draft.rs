//! Consultation draft model.
//!
//! A [`ConsultationDraft`] is a complete snapshot of the consultation form. The form session
//! replaces it wholesale on every field change, so the validator always sees a consistent
//! record. Coded fields use the same string/number codes the hospital backend stores.

use crate::constants::{ASYMPTOMATIC_SYMPTOM, OTHER_SYMPTOM, REVIEW_INTERVAL_UNSET};
use crate::de;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Coded values
// ============================================================================

/// Numeric symptom code as stored by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomCode(pub u32);

/// Clinical disposition decided at the end of the consultation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suggestion {
    #[serde(rename = "HI")]
    HomeIsolation,
    #[serde(rename = "A")]
    Admission,
    #[serde(rename = "R")]
    Referral,
    #[serde(rename = "OP")]
    OpConsultation,
    #[serde(rename = "DC")]
    DomiciliaryCare,
    #[serde(rename = "DD")]
    DeclareDeath,
}

impl Suggestion {
    pub const ALL: [Suggestion; 6] = [
        Suggestion::HomeIsolation,
        Suggestion::Admission,
        Suggestion::Referral,
        Suggestion::OpConsultation,
        Suggestion::DomiciliaryCare,
        Suggestion::DeclareDeath,
    ];

    /// Backend code for this disposition.
    pub fn code(self) -> &'static str {
        match self {
            Suggestion::HomeIsolation => "HI",
            Suggestion::Admission => "A",
            Suggestion::Referral => "R",
            Suggestion::OpConsultation => "OP",
            Suggestion::DomiciliaryCare => "DC",
            Suggestion::DeclareDeath => "DD",
        }
    }
}

impl FromStr for Suggestion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Suggestion::ALL
            .into_iter()
            .find(|suggestion| suggestion.code() == s)
            .ok_or_else(|| format!("unknown suggestion code: {s}"))
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Triage category of the patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientCategory {
    Comfort,
    Stable,
    Moderate,
    Critical,
}

impl PatientCategory {
    pub const ALL: [PatientCategory; 4] = [
        PatientCategory::Comfort,
        PatientCategory::Stable,
        PatientCategory::Moderate,
        PatientCategory::Critical,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PatientCategory::Comfort => "Comfort",
            PatientCategory::Stable => "Stable",
            PatientCategory::Moderate => "Moderate",
            PatientCategory::Critical => "Critical",
        }
    }

    /// Display text, which is also what the backend returns on read.
    pub fn text(self) -> &'static str {
        match self {
            PatientCategory::Comfort => "Comfort Care",
            PatientCategory::Stable => "Stable",
            PatientCategory::Moderate => "Abnormal",
            PatientCategory::Critical => "Critical",
        }
    }

    /// Look up a category by its display text.
    pub fn from_text(text: &str) -> Option<Self> {
        PatientCategory::ALL
            .into_iter()
            .find(|category| category.text() == text)
    }
}

impl FromStr for PatientCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientCategory::ALL
            .into_iter()
            .find(|category| category.id() == s)
            .ok_or_else(|| format!("unknown patient category: {s}"))
    }
}

/// Follow-up action for a telemedicine consultation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TelemedicineAction {
    #[default]
    Pending,
    SpecialistRequired,
    PlanForHomeCare,
    FollowUpNotRequired,
    Complete,
    Review,
    NotReachable,
}

// ============================================================================
// References to other records
// ============================================================================

/// An ICD-11 diagnosis picked from the diagnosis search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icd11Diagnosis {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: String,
    #[serde(default)]
    pub label: String,
}

/// A bed selected for an admitted patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedRef {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A doctor assigned to review a telemedicine consultation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRef {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// A facility, as picked for a referral or shown in the patient header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRef {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

// ============================================================================
// Draft
// ============================================================================

/// Snapshot of every field on the consultation form.
///
/// `Default` is a blank draft. [`ConsultationDraft::new`] gives the values a freshly opened
/// form starts with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationDraft {
    pub symptoms: Vec<SymptomCode>,
    pub other_symptoms: String,
    #[serde(deserialize_with = "de::optional_date")]
    pub symptoms_onset_date: Option<NaiveDate>,

    #[serde(deserialize_with = "de::blank_as_none")]
    pub suggestion: Option<Suggestion>,
    /// Raw status code; `0` means nothing has been selected.
    pub consultation_status: u32,
    #[serde(deserialize_with = "de::blank_as_none")]
    pub category: Option<PatientCategory>,

    pub admitted_to: String,
    #[serde(deserialize_with = "de::optional_date")]
    pub admission_date: Option<NaiveDate>,
    pub ip_no: String,
    pub bed: Option<BedRef>,

    /// Facility id the patient is referred to.
    pub referred_to: String,

    pub icd11_diagnoses_object: Vec<Icd11Diagnosis>,
    pub icd11_provisional_diagnoses_object: Vec<Icd11Diagnosis>,

    pub verified_by: String,
    pub is_kasp: Option<bool>,

    pub examination_details: String,
    pub history_of_present_illness: String,
    pub prescribed_medication: String,
    pub consultation_notes: String,
    pub special_instruction: String,

    pub is_telemedicine: bool,
    pub action: TelemedicineAction,
    pub assigned_to: String,
    pub assigned_to_object: Option<DoctorRef>,
    pub review_interval: i32,

    pub weight: String,
    pub height: String,

    pub discharge_reason: String,
    pub cause_of_death: String,
    #[serde(deserialize_with = "de::optional_datetime")]
    pub death_datetime: Option<NaiveDateTime>,
    pub death_confirmed_doctor: String,
}

impl Default for ConsultationDraft {
    fn default() -> Self {
        Self {
            symptoms: Vec::new(),
            other_symptoms: String::new(),
            symptoms_onset_date: None,
            suggestion: None,
            consultation_status: 0,
            category: None,
            admitted_to: String::new(),
            admission_date: None,
            ip_no: String::new(),
            bed: None,
            referred_to: String::new(),
            icd11_diagnoses_object: Vec::new(),
            icd11_provisional_diagnoses_object: Vec::new(),
            verified_by: String::new(),
            is_kasp: None,
            examination_details: String::new(),
            history_of_present_illness: String::new(),
            prescribed_medication: String::new(),
            consultation_notes: String::new(),
            special_instruction: String::new(),
            is_telemedicine: false,
            action: TelemedicineAction::Pending,
            assigned_to: String::new(),
            assigned_to_object: None,
            review_interval: REVIEW_INTERVAL_UNSET,
            weight: String::new(),
            height: String::new(),
            discharge_reason: String::new(),
            cause_of_death: String::new(),
            death_datetime: None,
            death_confirmed_doctor: String::new(),
        }
    }
}

impl ConsultationDraft {
    /// Draft for a newly opened form: admission decided, comfort-care category, admitted today.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            suggestion: Some(Suggestion::Admission),
            category: Some(PatientCategory::Comfort),
            admission_date: Some(today),
            is_kasp: Some(false),
            ..Self::default()
        }
    }

    /// True when symptoms are recorded and none of them is the asymptomatic code.
    pub fn has_symptoms(&self) -> bool {
        !self.symptoms.is_empty() && !self.symptoms.contains(&ASYMPTOMATIC_SYMPTOM)
    }

    pub fn is_other_symptoms_selected(&self) -> bool {
        self.symptoms.contains(&OTHER_SYMPTOM)
    }

    pub fn is_admitted(&self) -> bool {
        self.suggestion == Some(Suggestion::Admission)
    }

    /// Body surface area in m² using the Mosteller formula.
    ///
    /// Returns `None` unless both weight (kg) and height (cm) parse as positive numbers.
    pub fn body_surface_area(&self) -> Option<f64> {
        let weight = parse_positive(&self.weight)?;
        let height = parse_positive(&self.height)?;
        Some((weight * height / 3600.0).sqrt())
    }

    /// Toggle telemedicine. Switching it off resets the follow-up action to pending.
    pub fn with_telemedicine(self, is_telemedicine: bool) -> Self {
        let action = if is_telemedicine {
            self.action
        } else {
            TelemedicineAction::Pending
        };
        Self {
            is_telemedicine,
            action,
            ..self
        }
    }

    /// Assign or clear the reviewing doctor.
    pub fn with_assigned_doctor(self, doctor: Option<DoctorRef>) -> Self {
        match doctor.filter(|d| !d.id.trim().is_empty()) {
            Some(doctor) => Self {
                assigned_to: doctor.id.clone(),
                assigned_to_object: Some(doctor),
                ..self
            },
            None => Self {
                assigned_to: String::new(),
                assigned_to_object: None,
                ..self
            },
        }
    }

    /// Set the referral destination. Clearing the selection keeps the previous value.
    pub fn with_referral_facility(self, facility: Option<&FacilityRef>) -> Self {
        match facility.filter(|f| !f.id.trim().is_empty()) {
            Some(facility) => Self {
                referred_to: facility.id.clone(),
                ..self
            },
            None => self,
        }
    }
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
