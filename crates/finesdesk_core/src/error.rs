//! Application error types shared by the client and its front ends.
use crate::constants::FALLBACK_ERROR_MESSAGE;
use crate::validation::FieldErrors;
use thiserror::Error;

/// Top-level application error type.
///
/// Every variant is recoverable: list views stay usable and forms keep their
/// values after any of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// No response arrived (connect failure, timeout, aborted body).
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend rejected the payload with a field-keyed error map.
    #[error("Validation failed:\n{0}")]
    Validation(FieldErrors),

    /// The backend answered `success: false` with a message and no field map.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Local presence checks failed; no request was sent.
    #[error("Missing required fields:\n{0}")]
    MissingFields(FieldErrors),

    /// The response body did not have a shape we understand.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The session role may not open the requested page.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The modal was asked to submit while it was not open.
    #[error("Form is not open")]
    FormClosed,
}

impl AppError {
    /// Field-level errors carried by validation failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) | Self::MissingFields(errors) => Some(errors),
            _ => None,
        }
    }

    /// Text shown in the modal alert for this error.
    ///
    /// Validation variants render the joined field map; rejections show the
    /// backend message; everything else falls back to a fixed string.
    pub fn alert_message(&self) -> String {
        match self {
            Self::Validation(errors) | Self::MissingFields(errors) => errors.display_string(),
            Self::Rejected(message) | Self::Forbidden(message) if !message.trim().is_empty() => {
                message.clone()
            }
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}
