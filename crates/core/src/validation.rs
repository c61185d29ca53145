//! Consultation form validation.
//!
//! The validator is a static table of per-field rules evaluated in a fixed order against a
//! complete draft snapshot and its treatment plan. Each rule reads whatever fields govern it
//! (for example the current `suggestion`) and either passes or yields a user-facing message.
//!
//! The table order is part of the contract: the first violated rule names the field the UI
//! scrolls to and focuses.
//!
//! Validation is pure. It never mutates its inputs, holds no state between calls, and reports
//! every violation as data rather than as an error.

use crate::config::ValidatorConfig;
use crate::constants::HOME_ISOLATION;
use crate::draft::{ConsultationDraft, Suggestion};
use crate::plan::{is_blank, TreatmentPlan};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Field identifiers
// ============================================================================

/// Form fields that carry validation errors.
///
/// Declaration order is evaluation order; `Ord` follows it, so the error map iterates in the
/// same order the rules run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Symptoms,
    Category,
    Suggestion,
    ConsultationStatus,
    IpNo,
    OtherSymptoms,
    SymptomsOnsetDate,
    AdmissionDate,
    CauseOfDeath,
    DeathDatetime,
    DeathConfirmedDoctor,
    ReferredTo,
    ConsultationNotes,
    IsTelemedicine,
    IsKasp,
    DischargeAdvice,
    Procedure,
    PrnPrescription,
    Investigation,
    VerifiedBy,
    Icd11ProvisionalDiagnosesObject,
    Icd11DiagnosesObject,
}

impl FormField {
    /// Every field, in evaluation order.
    pub const ALL: [FormField; 22] = [
        FormField::Symptoms,
        FormField::Category,
        FormField::Suggestion,
        FormField::ConsultationStatus,
        FormField::IpNo,
        FormField::OtherSymptoms,
        FormField::SymptomsOnsetDate,
        FormField::AdmissionDate,
        FormField::CauseOfDeath,
        FormField::DeathDatetime,
        FormField::DeathConfirmedDoctor,
        FormField::ReferredTo,
        FormField::ConsultationNotes,
        FormField::IsTelemedicine,
        FormField::IsKasp,
        FormField::DischargeAdvice,
        FormField::Procedure,
        FormField::PrnPrescription,
        FormField::Investigation,
        FormField::VerifiedBy,
        FormField::Icd11ProvisionalDiagnosesObject,
        FormField::Icd11DiagnosesObject,
    ];

    /// Form field name, also used as the DOM id the UI scrolls to.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Symptoms => "symptoms",
            FormField::Category => "category",
            FormField::Suggestion => "suggestion",
            FormField::ConsultationStatus => "consultation_status",
            FormField::IpNo => "ip_no",
            FormField::OtherSymptoms => "other_symptoms",
            FormField::SymptomsOnsetDate => "symptoms_onset_date",
            FormField::AdmissionDate => "admission_date",
            FormField::CauseOfDeath => "cause_of_death",
            FormField::DeathDatetime => "death_datetime",
            FormField::DeathConfirmedDoctor => "death_confirmed_doctor",
            FormField::ReferredTo => "referred_to",
            FormField::ConsultationNotes => "consultation_notes",
            FormField::IsTelemedicine => "is_telemedicine",
            FormField::IsKasp => "is_kasp",
            FormField::DischargeAdvice => "discharge_advice",
            FormField::Procedure => "procedure",
            FormField::PrnPrescription => "prn_prescription",
            FormField::Investigation => "investigation",
            FormField::VerifiedBy => "verified_by",
            FormField::Icd11ProvisionalDiagnosesObject => "icd11_provisional_diagnoses_object",
            FormField::Icd11DiagnosesObject => "icd11_diagnoses_object",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Result
// ============================================================================

/// Outcome of validating one draft snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<FormField, String>,
    first_error_field: Option<FormField>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The violated field that was evaluated first, if any.
    pub fn first_error_field(&self) -> Option<FormField> {
        self.first_error_field
    }

    /// Error message for `field`, or `""` when the field is clean.
    pub fn error(&self, field: FormField) -> &str {
        self.errors.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn has_error(&self, field: FormField) -> bool {
        self.errors.contains_key(&field)
    }

    /// Violated fields and their messages, in evaluation order.
    pub fn errors(&self) -> impl Iterator<Item = (FormField, &str)> + '_ {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn record(&mut self, rule: &FieldRule, message: String) {
        if self.first_error_field.is_none() {
            self.first_error_field = Some(rule.field);
        }
        for field in rule.also_marks {
            self.errors.insert(*field, message.clone());
        }
        self.errors.insert(rule.field, message);
    }
}

impl Serialize for ValidationResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct ValidationResultWire<'a> {
            valid: bool,
            first_error_field: Option<FormField>,
            errors: &'a BTreeMap<FormField, String>,
        }

        ValidationResultWire {
            valid: self.is_valid(),
            first_error_field: self.first_error_field,
            errors: &self.errors,
        }
        .serialize(serializer)
    }
}

// ============================================================================
// Rule table
// ============================================================================

/// Everything a rule may look at.
struct RuleContext<'a> {
    draft: &'a ConsultationDraft,
    plan: &'a TreatmentPlan,
    config: &'a ValidatorConfig,
}

/// One row of the rule table.
struct FieldRule {
    field: FormField,
    /// Extra fields that receive the same message when this rule fails.
    also_marks: &'static [FormField],
    check: fn(&RuleContext<'_>) -> Option<String>,
}

const fn rule(field: FormField, check: fn(&RuleContext<'_>) -> Option<String>) -> FieldRule {
    FieldRule {
        field,
        also_marks: &[],
        check,
    }
}

static RULES: &[FieldRule] = &[
    rule(FormField::Symptoms, check_symptoms),
    rule(FormField::Category, check_category),
    rule(FormField::Suggestion, check_suggestion),
    rule(FormField::ConsultationStatus, check_consultation_status),
    rule(FormField::IpNo, check_ip_no),
    rule(FormField::OtherSymptoms, check_other_symptoms),
    rule(FormField::SymptomsOnsetDate, check_symptoms_onset_date),
    rule(FormField::AdmissionDate, check_admission_date),
    rule(FormField::CauseOfDeath, check_cause_of_death),
    rule(FormField::DeathDatetime, check_death_datetime),
    rule(FormField::DeathConfirmedDoctor, check_death_confirmed_doctor),
    rule(FormField::ReferredTo, check_referred_to),
    rule(FormField::ConsultationNotes, check_consultation_notes),
    rule(FormField::IsTelemedicine, check_is_telemedicine),
    rule(FormField::IsKasp, check_is_kasp),
    rule(FormField::DischargeAdvice, check_discharge_advice),
    rule(FormField::Procedure, check_procedures),
    rule(FormField::PrnPrescription, check_prn_prescriptions),
    rule(FormField::Investigation, check_investigations),
    rule(FormField::VerifiedBy, check_verified_by),
    FieldRule {
        field: FormField::Icd11ProvisionalDiagnosesObject,
        also_marks: &[FormField::Icd11DiagnosesObject],
        check: check_diagnoses,
    },
];

fn fail(message: &str) -> Option<String> {
    Some(message.to_owned())
}

fn decided(ctx: &RuleContext<'_>, suggestion: Suggestion) -> bool {
    ctx.draft.suggestion == Some(suggestion)
}

fn check_symptoms(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.symptoms.is_empty() {
        return fail("Please select the symptoms");
    }
    None
}

fn check_category(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.category.is_none() {
        return fail("Please select a category");
    }
    None
}

fn check_suggestion(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.suggestion.is_none() {
        return fail("Please enter the decision");
    }
    None
}

fn check_consultation_status(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.consultation_status == 0 {
        return fail("Please select the consultation status");
    }
    None
}

fn check_ip_no(ctx: &RuleContext<'_>) -> Option<String> {
    if !decided(ctx, Suggestion::Admission) {
        return None;
    }
    if ctx.draft.ip_no.is_empty() {
        return fail("IP Number is required as person is admitted");
    }
    if ctx.draft.ip_no.trim().is_empty() {
        return fail("IP can not be empty");
    }
    None
}

fn check_other_symptoms(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.is_other_symptoms_selected() && ctx.draft.other_symptoms.is_empty() {
        return fail("Please enter the other symptom details");
    }
    None
}

fn check_symptoms_onset_date(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.has_symptoms() && ctx.draft.symptoms_onset_date.is_none() {
        return fail("Please enter date of onset of the above symptoms");
    }
    None
}

fn check_admission_date(ctx: &RuleContext<'_>) -> Option<String> {
    if decided(ctx, Suggestion::Admission) && ctx.draft.admission_date.is_none() {
        return fail("Field is required as person is admitted");
    }
    None
}

fn check_cause_of_death(ctx: &RuleContext<'_>) -> Option<String> {
    if decided(ctx, Suggestion::DeclareDeath) && ctx.draft.cause_of_death.is_empty() {
        return fail("Please enter cause of death");
    }
    None
}

fn check_death_datetime(ctx: &RuleContext<'_>) -> Option<String> {
    if decided(ctx, Suggestion::DeclareDeath) && ctx.draft.death_datetime.is_none() {
        return fail("Please enter the date & time of death");
    }
    None
}

fn check_death_confirmed_doctor(ctx: &RuleContext<'_>) -> Option<String> {
    if decided(ctx, Suggestion::DeclareDeath) && ctx.draft.death_confirmed_doctor.is_empty() {
        return fail("Please enter the name of doctor who confirmed the death");
    }
    None
}

fn check_referred_to(ctx: &RuleContext<'_>) -> Option<String> {
    if decided(ctx, Suggestion::Referral) && ctx.draft.referred_to.is_empty() {
        return fail("Please select the referred to facility");
    }
    None
}

fn check_consultation_notes(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.consultation_notes.is_empty() {
        return fail("Required *");
    }
    if ctx.draft.consultation_notes.trim().is_empty() {
        return fail("Consultation notes can not be empty");
    }
    None
}

fn check_is_telemedicine(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.admitted_to == HOME_ISOLATION && !ctx.draft.is_telemedicine {
        return fail("Telemedicine should be `Yes` when Admitted To is Home Isolation");
    }
    None
}

fn check_is_kasp(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.config.kasp_enabled() && ctx.draft.is_kasp.is_none() {
        return Some(format!(
            "Please select an option, {} is mandatory",
            ctx.config.kasp_string()
        ));
    }
    None
}

fn check_discharge_advice(ctx: &RuleContext<'_>) -> Option<String> {
    for row in &ctx.plan.prescriptions {
        if is_blank(row.medicine.as_deref()) {
            return fail("Prescription Medicine field can not be empty");
        }
        if is_blank(row.dosage.as_deref()) {
            return fail("Prescription Frequency field can not be empty");
        }
    }
    None
}

fn check_procedures(ctx: &RuleContext<'_>) -> Option<String> {
    for row in &ctx.plan.procedures {
        if is_blank(row.procedure.as_deref()) {
            return fail("Procedure field can not be empty");
        }
        if !row.repetitive && is_blank(row.time.as_deref()) {
            return fail("Time field can not be empty");
        }
        if row.repetitive && is_blank(row.frequency.as_deref()) {
            return fail("Frequency field can not be empty");
        }
    }
    None
}

fn check_prn_prescriptions(ctx: &RuleContext<'_>) -> Option<String> {
    for row in &ctx.plan.prn_prescriptions {
        if is_blank(row.medicine.as_deref()) {
            return fail("Medicine field can not be empty");
        }
        if is_blank(row.indicator.as_deref()) {
            return fail("Indicator field can not be empty");
        }
    }
    None
}

fn check_investigations(ctx: &RuleContext<'_>) -> Option<String> {
    for row in &ctx.plan.investigations {
        if row.types.is_empty() {
            return fail("Investigation field can not be empty");
        }
        if row.repetitive && is_blank(row.frequency.as_deref()) {
            return fail("Frequency field can not be empty");
        }
    }
    None
}

fn check_verified_by(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.verified_by.trim().is_empty() {
        return fail("Please fill verified by");
    }
    None
}

fn check_diagnoses(ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.draft.icd11_provisional_diagnoses_object.is_empty()
        && ctx.draft.icd11_diagnoses_object.is_empty()
    {
        return fail("Please select either Provisional Diagnosis or Final Diagnosis");
    }
    None
}

// ============================================================================
// Validator
// ============================================================================

/// Validates consultation drafts against the rule table.
#[derive(Clone, Debug, Default)]
pub struct ConsultationValidator {
    config: ValidatorConfig,
}

impl ConsultationValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a draft snapshot together with its treatment plan.
    ///
    /// # Arguments
    ///
    /// * `draft` - Complete form snapshot.
    /// * `plan` - Prescription, PRN, investigation and procedure rows entered alongside it.
    ///
    /// # Returns
    ///
    /// A [`ValidationResult`] holding one message per violated field and the first violated
    /// field in evaluation order. Calling this twice on the same inputs yields equal results.
    pub fn validate(&self, draft: &ConsultationDraft, plan: &TreatmentPlan) -> ValidationResult {
        let ctx = RuleContext {
            draft,
            plan,
            config: &self.config,
        };

        let mut result = ValidationResult::default();
        for rule in RULES {
            if let Some(message) = (rule.check)(&ctx) {
                result.record(rule, message);
            }
        }

        tracing::debug!(
            valid = result.is_valid(),
            errors = result.error_count(),
            first_error_field = ?result.first_error_field,
            "validated consultation draft"
        );

        result
    }
}
