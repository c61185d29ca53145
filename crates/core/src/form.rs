//! Consultation form session.
//!
//! A [`ConsultationForm`] owns the current draft snapshot and treatment plan for one patient,
//! loads an existing consultation when editing, and drives submission: validate, write, chain
//! the discharge for a declared death, and tell the caller where to navigate.
//!
//! The backend is reached only through the [`ConsultationApi`] trait. Calls are never retried
//! and a failed write leaves the draft exactly as it was so the user can resubmit.

use crate::config::ValidatorConfig;
use crate::constants::{CREATED_NOTIFICATION, UPDATED_NOTIFICATION};
use crate::draft::{ConsultationDraft, Suggestion};
use crate::plan::TreatmentPlan;
use crate::validation::{ConsultationValidator, FormField, ValidationResult};
use crate::wire::{
    ConsultationPayload, ConsultationRecord, DischargeRequest, PatientRecord, SavedConsultation,
};
use crate::{ConsultError, ConsultResult};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Collaborators
// ============================================================================

/// Response from a backend call: an HTTP-like status plus an optional body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data: Some(data),
        }
    }

    pub fn status(status: u16) -> Self {
        Self { status, data: None }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a successful response, or `None` for a failed or empty one.
    pub fn into_success(self) -> Option<T> {
        if self.is_success() {
            self.data
        } else {
            None
        }
    }
}

/// Backend operations the consultation form depends on.
///
/// `Err` is reserved for transport failures; a reachable backend that refuses a request answers
/// with a non-2xx [`ApiResponse`].
#[allow(async_fn_in_trait)]
pub trait ConsultationApi {
    async fn get_consultation(&self, id: &str) -> ConsultResult<ApiResponse<ConsultationRecord>>;

    async fn create_consultation(
        &self,
        payload: &ConsultationPayload,
    ) -> ConsultResult<ApiResponse<SavedConsultation>>;

    async fn update_consultation(
        &self,
        id: &str,
        payload: &ConsultationPayload,
    ) -> ConsultResult<ApiResponse<SavedConsultation>>;

    async fn get_patient(&self, id: &str) -> ConsultResult<ApiResponse<PatientRecord>>;

    async fn discharge_patient(
        &self,
        patient_id: &str,
        request: &DischargeRequest,
    ) -> ConsultResult<ApiResponse<()>>;
}

/// Cooperative cancellation flag shared between a view and its pending fetches.
///
/// Aborting never interrupts a call in flight; the fetch checks the flag once its response
/// arrives and discards the result.
#[derive(Clone, Debug, Default)]
pub struct AbortStatus(Arc<AtomicBool>);

impl AbortStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of [`ConsultationForm::load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Creating a new consultation; nothing to fetch.
    Fresh,
    /// The existing consultation replaced the draft and plan.
    Loaded,
    /// The backend had no such consultation; the caller should navigate back.
    NotFound,
    /// The view was torn down before the response arrived; nothing was applied.
    Aborted,
}

/// Display names for the page header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientHeader {
    pub patient_name: String,
    pub facility_name: String,
}

/// Result of [`ConsultationForm::submit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; no call was made. The UI should focus `first_error_field`.
    Invalid {
        first_error_field: Option<FormField>,
    },
    /// The consultation was stored.
    Saved {
        consultation_id: String,
        notification: &'static str,
        redirect: String,
        /// Outcome of the chained discharge; `None` unless death was declared.
        discharged: Option<bool>,
    },
}

// ============================================================================
// Form session
// ============================================================================

/// Consultation form state for one patient.
#[derive(Clone, Debug)]
pub struct ConsultationForm {
    facility_id: String,
    patient_id: String,
    consultation_id: Option<String>,
    draft: ConsultationDraft,
    plan: TreatmentPlan,
    errors: ValidationResult,
}

impl ConsultationForm {
    /// Open the form for a new consultation.
    pub fn create(
        facility_id: impl Into<String>,
        patient_id: impl Into<String>,
        today: chrono::NaiveDate,
    ) -> Self {
        Self {
            facility_id: facility_id.into(),
            patient_id: patient_id.into(),
            consultation_id: None,
            draft: ConsultationDraft::new(today),
            plan: TreatmentPlan::default(),
            errors: ValidationResult::default(),
        }
    }

    /// Open the form to edit an existing consultation. Call [`ConsultationForm::load`] next.
    pub fn edit(
        facility_id: impl Into<String>,
        patient_id: impl Into<String>,
        consultation_id: impl Into<String>,
        today: chrono::NaiveDate,
    ) -> Self {
        Self {
            consultation_id: Some(consultation_id.into()),
            ..Self::create(facility_id, patient_id, today)
        }
    }

    pub fn is_update(&self) -> bool {
        self.consultation_id.is_some()
    }

    pub fn consultation_id(&self) -> Option<&str> {
        self.consultation_id.as_deref()
    }

    pub fn draft(&self) -> &ConsultationDraft {
        &self.draft
    }

    pub fn plan(&self) -> &TreatmentPlan {
        &self.plan
    }

    /// Errors from the most recent validation, for inline display.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    /// Replace the draft with a new snapshot.
    pub fn replace_draft(&mut self, draft: ConsultationDraft) {
        self.draft = draft;
    }

    /// Derive a new snapshot from the current one and swap it in.
    pub fn update_draft<F>(&mut self, change: F)
    where
        F: FnOnce(ConsultationDraft) -> ConsultationDraft,
    {
        let next = change(self.draft.clone());
        self.draft = next;
    }

    pub fn replace_plan(&mut self, plan: TreatmentPlan) {
        self.plan = plan;
    }

    /// Path of the consultation detail page.
    pub fn consultation_path(&self, consultation_id: &str) -> String {
        format!(
            "/facility/{}/patient/{}/consultation/{}",
            self.facility_id, self.patient_id, consultation_id
        )
    }

    /// Path the cancel button leads to.
    pub fn cancel_path(&self) -> String {
        format!("/facility/{}/patient/{}", self.facility_id, self.patient_id)
    }

    /// Path of the page header's back link.
    pub fn back_path(&self) -> String {
        match &self.consultation_id {
            Some(id) => self.consultation_path(id),
            None => self.cancel_path(),
        }
    }

    /// Fetch the consultation being edited and replace the draft and plan with it.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the collaborator.
    pub async fn load<A: ConsultationApi>(
        &mut self,
        api: &A,
        status: &AbortStatus,
    ) -> ConsultResult<LoadOutcome> {
        let Some(id) = self.consultation_id.clone() else {
            return Ok(LoadOutcome::Fresh);
        };

        let response = api.get_consultation(&id).await?;

        if status.is_aborted() {
            tracing::debug!(consultation_id = %id, "consultation load aborted");
            return Ok(LoadOutcome::Aborted);
        }

        match response.into_success() {
            Some(record) => {
                let (draft, plan) = record.into_form();
                self.draft = draft;
                self.plan = plan;
                self.errors = ValidationResult::default();
                Ok(LoadOutcome::Loaded)
            }
            None => {
                tracing::warn!(consultation_id = %id, "consultation not found");
                Ok(LoadOutcome::NotFound)
            }
        }
    }

    /// Look up the patient and facility names for the page header.
    ///
    /// Returns `Ok(None)` when aborted or when the backend has no such patient.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the collaborator.
    pub async fn patient_header<A: ConsultationApi>(
        &self,
        api: &A,
        status: &AbortStatus,
    ) -> ConsultResult<Option<PatientHeader>> {
        let response = api.get_patient(&self.patient_id).await?;
        if status.is_aborted() {
            return Ok(None);
        }

        Ok(response.into_success().map(|patient| PatientHeader {
            patient_name: patient.name,
            facility_name: patient
                .facility_object
                .map(|facility| facility.name)
                .unwrap_or_default(),
        }))
    }

    /// Validate the current snapshot and keep the errors for display.
    pub fn validate(&mut self, config: &ValidatorConfig) -> &ValidationResult {
        let validator = ConsultationValidator::new(config.clone());
        self.errors = validator.validate(&self.draft, &self.plan);
        &self.errors
    }

    /// Validate and, if valid, store the consultation.
    ///
    /// On success the draft is reset to a fresh form and, when death was declared, the
    /// patient is discharged as expired. A failed discharge is logged and reported in the
    /// outcome; the consultation itself is already stored.
    ///
    /// # Arguments
    ///
    /// * `api` - Backend collaborator.
    /// * `config` - Validator configuration resolved at startup.
    /// * `now` - Submission time in the user's zone; the reset draft uses its local date.
    ///
    /// # Errors
    ///
    /// Returns [`ConsultError::Api`] when the write is refused and
    /// [`ConsultError::MissingData`] when it succeeds without a body. In both cases the draft is
    /// left intact and no discharge is attempted. Transport failures are propagated.
    pub async fn submit<A: ConsultationApi, Tz: TimeZone>(
        &mut self,
        api: &A,
        config: &ValidatorConfig,
        now: DateTime<Tz>,
    ) -> ConsultResult<SubmitOutcome> {
        let first_error_field = {
            let result = self.validate(config);
            (!result.is_valid()).then(|| result.first_error_field())
        };
        if let Some(first_error_field) = first_error_field {
            return Ok(SubmitOutcome::Invalid { first_error_field });
        }

        let payload = ConsultationPayload::from_form(
            &self.draft,
            &self.plan,
            &self.patient_id,
            &self.facility_id,
            now.with_timezone(&Utc),
        );

        let (operation, response) = match &self.consultation_id {
            Some(id) => (
                "update_consultation",
                api.update_consultation(id, &payload).await?,
            ),
            None => (
                "create_consultation",
                api.create_consultation(&payload).await?,
            ),
        };

        if !response.is_success() {
            let status = response.status;
            tracing::warn!(operation, status, "consultation write failed");
            return Err(ConsultError::Api { operation, status });
        }
        let Some(saved) = response.data else {
            tracing::warn!(operation, "consultation write returned no body");
            return Err(ConsultError::MissingData(operation));
        };

        let consultation_id = self.consultation_id.clone().unwrap_or(saved.id);
        let declared_dead = (payload.suggestion == Some(Suggestion::DeclareDeath))
            .then(|| DischargeRequest::declared_dead(&self.draft));

        self.draft = ConsultationDraft::new(now.date_naive());
        self.errors = ValidationResult::default();

        let discharged = match declared_dead {
            Some(request) => Some(self.discharge(api, &request).await),
            None => None,
        };

        tracing::info!(%consultation_id, operation, "consultation saved");

        Ok(SubmitOutcome::Saved {
            redirect: self.consultation_path(&consultation_id),
            notification: if self.is_update() {
                UPDATED_NOTIFICATION
            } else {
                CREATED_NOTIFICATION
            },
            consultation_id,
            discharged,
        })
    }

    async fn discharge<A: ConsultationApi>(&self, api: &A, request: &DischargeRequest) -> bool {
        match api.discharge_patient(&self.patient_id, request).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                tracing::warn!(status = response.status, "discharge after declared death refused");
                false
            }
            Err(e) => {
                tracing::warn!("discharge after declared death failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Icd11Diagnosis, PatientCategory, SymptomCode};
    use crate::plan::Prescription;
    use chrono::{FixedOffset, NaiveDate};
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 11, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    /// In-memory backend recording every call.
    #[derive(Default)]
    struct FakeApi {
        record: Option<ConsultationRecord>,
        write_status: u16,
        write_without_body: bool,
        discharge_status: u16,
        abort_on_fetch: Option<AbortStatus>,
        calls: Mutex<Vec<String>>,
        payloads: Mutex<Vec<ConsultationPayload>>,
        discharges: Mutex<Vec<DischargeRequest>>,
    }

    impl FakeApi {
        fn accepting() -> Self {
            Self {
                write_status: 201,
                discharge_status: 200,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn write_response(&self, id: &str) -> ApiResponse<SavedConsultation> {
            ApiResponse {
                status: self.write_status,
                data: (!self.write_without_body).then(|| SavedConsultation { id: id.into() }),
            }
        }

        fn log(&self, call: &str) {
            self.calls.lock().expect("calls lock").push(call.to_owned());
        }
    }

    impl ConsultationApi for FakeApi {
        async fn get_consultation(
            &self,
            id: &str,
        ) -> ConsultResult<ApiResponse<ConsultationRecord>> {
            self.log(&format!("get_consultation:{id}"));
            if let Some(status) = &self.abort_on_fetch {
                status.abort();
            }
            Ok(match &self.record {
                Some(record) => ApiResponse::ok(record.clone()),
                None => ApiResponse::status(404),
            })
        }

        async fn create_consultation(
            &self,
            payload: &ConsultationPayload,
        ) -> ConsultResult<ApiResponse<SavedConsultation>> {
            self.log("create_consultation");
            self.payloads
                .lock()
                .expect("payloads lock")
                .push(payload.clone());
            Ok(self.write_response("c-new"))
        }

        async fn update_consultation(
            &self,
            id: &str,
            payload: &ConsultationPayload,
        ) -> ConsultResult<ApiResponse<SavedConsultation>> {
            self.log(&format!("update_consultation:{id}"));
            self.payloads
                .lock()
                .expect("payloads lock")
                .push(payload.clone());
            Ok(self.write_response(id))
        }

        async fn get_patient(&self, id: &str) -> ConsultResult<ApiResponse<PatientRecord>> {
            self.log(&format!("get_patient:{id}"));
            Ok(ApiResponse::ok(PatientRecord {
                name: "Meera K".into(),
                facility_object: Some(crate::draft::FacilityRef {
                    id: "f-1".into(),
                    name: "Taluk Hospital".into(),
                }),
            }))
        }

        async fn discharge_patient(
            &self,
            patient_id: &str,
            request: &DischargeRequest,
        ) -> ConsultResult<ApiResponse<()>> {
            self.log(&format!("discharge_patient:{patient_id}"));
            self.discharges
                .lock()
                .expect("discharges lock")
                .push(request.clone());
            Ok(ApiResponse {
                status: self.discharge_status,
                data: Some(()),
            })
        }
    }

    fn complete_draft(suggestion: Suggestion) -> ConsultationDraft {
        ConsultationDraft {
            symptoms: vec![SymptomCode(1)],
            suggestion: Some(suggestion),
            consultation_status: 2,
            category: Some(PatientCategory::Critical),
            ip_no: "IP-1".into(),
            admission_date: Some(today()),
            referred_to: "f-9".into(),
            consultation_notes: "Observe overnight".into(),
            verified_by: "Dr. Thomas".into(),
            icd11_diagnoses_object: vec![Icd11Diagnosis {
                id: "BA41".into(),
                label: "Myocardial infarction".into(),
            }],
            cause_of_death: "Cardiogenic shock".into(),
            death_datetime: today().and_hms_opt(2, 45, 0),
            death_confirmed_doctor: "Dr. Thomas".into(),
            ..ConsultationDraft::default()
        }
    }

    #[tokio::test]
    async fn test_load_without_id_is_fresh() {
        let api = FakeApi::accepting();
        let mut form = ConsultationForm::create("f-1", "p-1", today());
        let outcome = form.load(&api, &AbortStatus::new()).await.expect("load");
        assert_eq!(outcome, LoadOutcome::Fresh);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_replaces_draft_and_plan() {
        let api = FakeApi {
            record: Some(ConsultationRecord {
                id: "c-5".into(),
                symptoms: vec![SymptomCode(4)],
                suggestion: Some(Suggestion::Referral),
                category: Some("Critical".into()),
                discharge_advice: vec![Prescription {
                    medicine: Some("Aspirin".into()),
                    dosage: Some("75mg OD".into()),
                    ..Prescription::default()
                }],
                ..ConsultationRecord::default()
            }),
            ..FakeApi::accepting()
        };

        let mut form = ConsultationForm::edit("f-1", "p-1", "c-5", today());
        let outcome = form.load(&api, &AbortStatus::new()).await.expect("load");

        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(form.draft().suggestion, Some(Suggestion::Referral));
        assert_eq!(form.draft().category, Some(PatientCategory::Critical));
        assert_eq!(form.plan().prescriptions.len(), 1);
        assert_eq!(api.calls(), vec!["get_consultation:c-5".to_string()]);
    }

    #[tokio::test]
    async fn test_aborted_load_applies_nothing() {
        let status = AbortStatus::new();
        let api = FakeApi {
            record: Some(ConsultationRecord {
                suggestion: Some(Suggestion::DeclareDeath),
                discharge_advice: vec![Prescription::default()],
                ..ConsultationRecord::default()
            }),
            abort_on_fetch: Some(status.clone()),
            ..FakeApi::accepting()
        };

        let mut form = ConsultationForm::edit("f-1", "p-1", "c-5", today());
        let before = form.draft().clone();
        let outcome = form.load(&api, &status).await.expect("load");

        assert_eq!(outcome, LoadOutcome::Aborted);
        assert_eq!(form.draft(), &before);
        assert!(form.plan().is_empty());
    }

    #[tokio::test]
    async fn test_missing_consultation_is_not_found() {
        let api = FakeApi::accepting();
        let mut form = ConsultationForm::edit("f-1", "p-1", "c-404", today());
        let outcome = form.load(&api, &AbortStatus::new()).await.expect("load");
        assert_eq!(outcome, LoadOutcome::NotFound);
        assert_eq!(form.back_path(), "/facility/f-1/patient/p-1/consultation/c-404");
    }

    #[tokio::test]
    async fn test_patient_header() {
        let api = FakeApi::accepting();
        let form = ConsultationForm::create("f-1", "p-1", today());

        let header = form
            .patient_header(&api, &AbortStatus::new())
            .await
            .expect("header")
            .expect("patient found");
        assert_eq!(header.patient_name, "Meera K");
        assert_eq!(header.facility_name, "Taluk Hospital");

        let aborted = AbortStatus::new();
        aborted.abort();
        let header = form.patient_header(&api, &aborted).await.expect("header");
        assert!(header.is_none());
    }

    #[tokio::test]
    async fn test_invalid_submit_makes_no_call() {
        let api = FakeApi::accepting();
        let mut form = ConsultationForm::create("f-1", "p-1", today());

        let outcome = form
            .submit(&api, &ValidatorConfig::default(), now())
            .await
            .expect("submit");

        assert_eq!(
            outcome,
            SubmitOutcome::Invalid {
                first_error_field: Some(FormField::Symptoms)
            }
        );
        assert!(api.calls().is_empty());
        assert!(form.errors().has_error(FormField::Symptoms));
    }

    #[tokio::test]
    async fn test_create_submit_redirects_to_new_consultation() {
        let api = FakeApi::accepting();
        let mut form = ConsultationForm::create("f-1", "p-1", today());
        form.replace_draft(complete_draft(Suggestion::Admission));

        let outcome = form
            .submit(&api, &ValidatorConfig::default(), now())
            .await
            .expect("submit");

        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                consultation_id: "c-new".into(),
                notification: CREATED_NOTIFICATION,
                redirect: "/facility/f-1/patient/p-1/consultation/c-new".into(),
                discharged: None,
            }
        );
        assert_eq!(api.calls(), vec!["create_consultation".to_string()]);
        assert_eq!(form.draft(), &ConsultationDraft::new(now().date_naive()));

        let payloads = api.payloads.lock().expect("payloads lock");
        assert!(payloads[0].admitted);
        assert_eq!(payloads[0].patient, "p-1");
    }

    #[tokio::test]
    async fn test_update_submit_uses_existing_id() {
        let api = FakeApi::accepting();
        let mut form = ConsultationForm::edit("f-1", "p-1", "c-7", today());
        form.replace_draft(complete_draft(Suggestion::Referral));

        let outcome = form
            .submit(&api, &ValidatorConfig::default(), now())
            .await
            .expect("submit");

        match outcome {
            SubmitOutcome::Saved {
                consultation_id,
                notification,
                redirect,
                ..
            } => {
                assert_eq!(consultation_id, "c-7");
                assert_eq!(notification, UPDATED_NOTIFICATION);
                assert_eq!(redirect, "/facility/f-1/patient/p-1/consultation/c-7");
            }
            other => panic!("expected Saved, got {other:?}"),
        }
        assert_eq!(api.calls(), vec!["update_consultation:c-7".to_string()]);
    }

    #[tokio::test]
    async fn test_declared_death_chains_discharge() {
        let api = FakeApi::accepting();
        let mut form = ConsultationForm::create("f-1", "p-1", today());
        form.replace_draft(complete_draft(Suggestion::DeclareDeath));

        let outcome = form
            .submit(&api, &ValidatorConfig::default(), now())
            .await
            .expect("submit");

        assert!(matches!(
            outcome,
            SubmitOutcome::Saved {
                discharged: Some(true),
                ..
            }
        ));
        assert_eq!(
            api.calls(),
            vec![
                "create_consultation".to_string(),
                "discharge_patient:p-1".to_string()
            ]
        );
        let discharges = api.discharges.lock().expect("discharges lock");
        assert_eq!(discharges[0].discharge_reason, "EXP");
        assert_eq!(discharges[0].discharge_notes, "Cardiogenic shock");
    }

    #[tokio::test]
    async fn test_refused_discharge_is_reported_not_raised() {
        let api = FakeApi {
            discharge_status: 500,
            ..FakeApi::accepting()
        };
        let mut form = ConsultationForm::create("f-1", "p-1", today());
        form.replace_draft(complete_draft(Suggestion::DeclareDeath));

        let outcome = form
            .submit(&api, &ValidatorConfig::default(), now())
            .await
            .expect("submit");

        assert!(matches!(
            outcome,
            SubmitOutcome::Saved {
                discharged: Some(false),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_refused_write_keeps_draft() {
        let api = FakeApi {
            write_status: 400,
            ..FakeApi::accepting()
        };
        let mut form = ConsultationForm::create("f-1", "p-1", today());
        let draft = complete_draft(Suggestion::DeclareDeath);
        form.replace_draft(draft.clone());

        let err = form
            .submit(&api, &ValidatorConfig::default(), now())
            .await
            .expect_err("write should fail");

        assert!(matches!(
            err,
            ConsultError::Api {
                operation: "create_consultation",
                status: 400
            }
        ));
        assert_eq!(form.draft(), &draft);
        assert_eq!(api.calls(), vec!["create_consultation".to_string()]);
    }

    #[test]
    fn test_update_draft_swaps_snapshot() {
        let mut form = ConsultationForm::create("f-1", "p-1", today());
        form.update_draft(|draft| ConsultationDraft {
            ip_no: "IP-3".into(),
            ..draft
        });
        assert_eq!(form.draft().ip_no, "IP-3");
        assert_eq!(form.draft().suggestion, Some(Suggestion::Admission));
        assert_eq!(form.cancel_path(), "/facility/f-1/patient/p-1");
        assert_eq!(form.back_path(), "/facility/f-1/patient/p-1");
    }

    #[tokio::test]
    async fn test_write_without_body_keeps_draft() {
        let api = FakeApi {
            write_status: 204,
            write_without_body: true,
            ..FakeApi::accepting()
        };
        let mut form = ConsultationForm::create("f-1", "p-1", today());
        let draft = complete_draft(Suggestion::DeclareDeath);
        form.replace_draft(draft.clone());

        let err = form
            .submit(&api, &ValidatorConfig::default(), now())
            .await
            .expect_err("empty write should fail");

        assert!(matches!(
            err,
            ConsultError::MissingData("create_consultation")
        ));
        assert_eq!(form.draft(), &draft);
        assert_eq!(api.calls(), vec!["create_consultation".to_string()]);
        assert!(api.discharges.lock().expect("discharges lock").is_empty());
    }

    #[tokio::test]
    async fn test_reset_draft_uses_local_date() {
        let api = FakeApi::accepting();
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("valid offset");
        let early_morning = ist
            .with_ymd_and_hms(2023, 6, 2, 1, 0, 0)
            .single()
            .expect("valid timestamp");

        let mut form = ConsultationForm::create("f-1", "p-1", today());
        form.replace_draft(complete_draft(Suggestion::Referral));
        form.submit(&api, &ValidatorConfig::default(), early_morning)
            .await
            .expect("submit");

        assert_eq!(
            form.draft().admission_date,
            NaiveDate::from_ymd_opt(2023, 6, 2)
        );
    }
}
