//! Core domain library for FinesDesk: records, list idiom, forms, errors.

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Dashboard aggregation.
pub mod dashboard;
/// Response envelope normalization.
pub mod envelope;
/// Scoped environment overrides for tests.
pub mod env;
/// Application error type.
pub mod error;
/// Resource change notifications.
pub mod invalidation;
/// Search, filter and pagination for list pages.
pub mod listing;
/// Modal form lifecycle.
pub mod modal;
/// Domain records and forms.
pub mod models;
/// Text helpers.
pub mod text;
/// Request sequencing and cancellation.
pub mod tracker;
/// Field errors and required-field checks.
pub mod validation;

pub use config::Config;
pub use constants::{DEFAULT_PORT, DEFAULT_SERVER_URL, PAGE_SIZE};
pub use error::AppError;
pub use invalidation::{Change, Invalidation, InvalidationBus};
pub use listing::{Filter, ListQuery, Listable, Paginator};
pub use modal::{Modal, ModalPhase};
pub use models::{Record, Resource};
pub use tracker::{RequestTicket, RequestTracker};
pub use validation::{FieldErrors, FormModel};
