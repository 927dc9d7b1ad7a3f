//! Conversions from external infrastructure errors into domain errors.

use medminder_domain::MedMinderError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MedMinderError);

impl From<InfraError> for MedMinderError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MedMinderError> for InfraError {
    fn from(value: MedMinderError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMedMinderError {
    fn into_medminder(self) -> MedMinderError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MedMinderError */
/* -------------------------------------------------------------------------- */

impl IntoMedMinderError for HttpError {
    fn into_medminder(self) -> MedMinderError {
        if self.is_timeout() {
            return MedMinderError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MedMinderError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => MedMinderError::NotFound(message),
                429 => MedMinderError::Network(message),
                400..=499 => MedMinderError::InvalidInput(message),
                _ => MedMinderError::Network(message),
            };
        }

        if self.is_decode() {
            return MedMinderError::Network(format!("malformed response body: {self}"));
        }

        MedMinderError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_medminder())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → MedMinderError */
/* -------------------------------------------------------------------------- */

impl IntoMedMinderError for JsonError {
    fn into_medminder(self) -> MedMinderError {
        MedMinderError::InvalidInput(format!(
            "invalid JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_medminder())
    }
}

impl IntoMedMinderError for TomlError {
    fn into_medminder(self) -> MedMinderError {
        MedMinderError::Config(format!("invalid TOML: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_medminder())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
