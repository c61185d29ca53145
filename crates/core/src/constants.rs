//! Constants used throughout the consultation core.
//!
//! Coded values shared with the hospital backend live here so the validator, the wire layer
//! and the form session agree on them.

use crate::draft::SymptomCode;

/// Symptom code recorded when the patient reports no symptoms.
pub const ASYMPTOMATIC_SYMPTOM: SymptomCode = SymptomCode(1);

/// Symptom code that requires a free-text description in `other_symptoms`.
pub const OTHER_SYMPTOM: SymptomCode = SymptomCode(9);

/// `admitted_to` value for patients isolated at home.
pub const HOME_ISOLATION: &str = "Home Isolation";

/// Default display label for the insurance-scheme field.
pub const DEFAULT_KASP_STRING: &str = "KASP";

/// Discharge reason sent when a patient is declared dead.
pub const DISCHARGE_REASON_EXPIRED: &str = "EXP";

/// `review_interval` value meaning no review has been scheduled.
pub const REVIEW_INTERVAL_UNSET: i32 = -1;

/// Notification shown after a new consultation is stored.
pub const CREATED_NOTIFICATION: &str = "Consultation created successfully";

/// Notification shown after an existing consultation is updated.
pub const UPDATED_NOTIFICATION: &str = "Consultation updated successfully";
