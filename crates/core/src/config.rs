//! Validator runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the validator and form
//! session. Nothing in this crate reads environment variables; binaries read them and hand the
//! raw values to the parsing helpers below.

use crate::constants::DEFAULT_KASP_STRING;
use crate::{ConsultError, ConsultResult};

/// Validator configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorConfig {
    kasp_enabled: bool,
    kasp_string: String,
}

impl ValidatorConfig {
    /// Create a new `ValidatorConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ConsultError::InvalidInput` if `kasp_string` is empty or whitespace-only, since
    /// it is interpolated into the user-facing message for the insurance-scheme field.
    pub fn new(kasp_enabled: bool, kasp_string: impl Into<String>) -> ConsultResult<Self> {
        let kasp_string = kasp_string.into();
        if kasp_string.trim().is_empty() {
            return Err(ConsultError::InvalidInput(
                "kasp_string cannot be empty".into(),
            ));
        }

        Ok(Self {
            kasp_enabled,
            kasp_string: kasp_string.trim().to_owned(),
        })
    }

    pub fn kasp_enabled(&self) -> bool {
        self.kasp_enabled
    }

    pub fn kasp_string(&self) -> &str {
        &self.kasp_string
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            kasp_enabled: false,
            kasp_string: DEFAULT_KASP_STRING.to_owned(),
        }
    }
}

/// Parse the insurance-scheme feature flag from an optional string value.
///
/// If `value` is `None` or empty/whitespace, the feature is disabled.
///
/// # Errors
///
/// Returns `ConsultError::InvalidInput` for anything other than `true/false`, `1/0` or `yes/no`
/// (case-insensitive).
pub fn kasp_enabled_from_env_value(value: Option<String>) -> ConsultResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(ConsultError::InvalidInput(format!(
            "unrecognised boolean for kasp flag: {other}"
        ))),
    }
}

/// Resolve the insurance-scheme label from an optional string value.
///
/// Falls back to [`DEFAULT_KASP_STRING`] when unset or blank.
pub fn kasp_string_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_KASP_STRING.to_owned())
}
