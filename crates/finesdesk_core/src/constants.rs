//! Shared constants used across FinesDesk crates.

/// Rows per list page. Every list view uses the same window size.
pub const PAGE_SIZE: usize = 10;

/// Upper bound on numbered pager buttons.
pub const MAX_PAGE_BUTTONS: usize = 5;

/// Default port for the stub backend.
pub const DEFAULT_PORT: u16 = 38480;

/// Default backend URL used by the client when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:38480";

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Alert text used when a failure carries no usable message.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
