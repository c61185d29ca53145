//! Treatment plan lists edited beside the consultation draft.
//!
//! The prescription, PRN, investigation and procedure builders each own a list of structured
//! rows. Rows are kept as entered (every column optional) and judged by the validator.

use serde::{Deserialize, Serialize};

/// A scheduled prescription row ("discharge advice").
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prescription {
    pub medicine: Option<String>,
    pub route: Option<String>,
    /// Dosage and frequency as entered, e.g. `"500mg BD"`.
    pub dosage: Option<String>,
    pub days: Option<u32>,
    pub notes: Option<String>,
}

/// An "as needed" prescription row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrnPrescription {
    pub medicine: Option<String>,
    pub route: Option<String>,
    pub dosage: Option<String>,
    /// Clinical indication that triggers the dose.
    pub indicator: Option<String>,
    pub max_dosage: Option<String>,
    pub min_time: Option<u32>,
    pub notes: Option<String>,
}

/// A requested investigation, possibly repeated on a schedule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Investigation {
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub repetitive: bool,
    pub time: Option<String>,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

/// A planned procedure: either at a set time or repeated at a frequency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Procedure {
    pub procedure: Option<String>,
    pub repetitive: bool,
    pub time: Option<String>,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

/// The four auxiliary lists submitted with a consultation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentPlan {
    #[serde(rename = "discharge_advice")]
    pub prescriptions: Vec<Prescription>,
    #[serde(rename = "prn_prescription")]
    pub prn_prescriptions: Vec<PrnPrescription>,
    #[serde(rename = "investigation")]
    pub investigations: Vec<Investigation>,
    #[serde(rename = "procedure")]
    pub procedures: Vec<Procedure>,
}

impl TreatmentPlan {
    pub fn is_empty(&self) -> bool {
        self.prescriptions.is_empty()
            && self.prn_prescriptions.is_empty()
            && self.investigations.is_empty()
            && self.procedures.is_empty()
    }
}

/// True for `None`, the empty string, or whitespace only.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
