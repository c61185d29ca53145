//! # Consult Core
//!
//! Core logic for the patient consultation form.
//!
//! This crate contains pure data operations:
//! - The consultation draft and treatment plan models
//! - The field validator and its ordered rule table
//! - Translation between the form model and the backend wire shapes
//! - The form session that loads and submits consultations through [`ConsultationApi`]
//!
//! **No transport concerns**: HTTP servers and command-line handling belong in `api-rest`
//! and `consult-cli`.

pub mod config;
pub mod constants;
mod de;
pub mod draft;
pub mod error;
pub mod form;
pub mod plan;
pub mod validation;
pub mod wire;

pub use config::ValidatorConfig;
pub use de::{parse_iso_date, parse_iso_datetime};
pub use draft::{
    BedRef, ConsultationDraft, DoctorRef, FacilityRef, Icd11Diagnosis, PatientCategory,
    Suggestion, SymptomCode, TelemedicineAction,
};
pub use error::{ConsultError, ConsultResult};
pub use form::{
    AbortStatus, ApiResponse, ConsultationApi, ConsultationForm, LoadOutcome, PatientHeader,
    SubmitOutcome,
};
pub use plan::{Investigation, PrnPrescription, Prescription, Procedure, TreatmentPlan};
pub use validation::{ConsultationValidator, FormField, ValidationResult};
pub use wire::{
    parse_consultation_record, parse_draft_document, render_draft_document, ConsultationPayload,
    ConsultationRecord, DischargeRequest, DraftDocument,
};
