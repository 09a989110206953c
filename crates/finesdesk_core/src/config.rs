//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_PORT, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
use crate::models::{Role, Session, SessionUser};
use crate::text::normalize_optional_nonempty;
use std::env;

/// Runtime configuration shared by the client, CLI and stub server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without the `/api` suffix.
    pub server_url: String,
    pub request_timeout_secs: u64,
    /// Port the stub server listens on.
    pub port: u16,
    /// Seed the stub server with demo records on startup.
    pub seed_demo: bool,
    pub session_role: Role,
    pub session_user: String,
    pub session_student_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            port: DEFAULT_PORT,
            seed_demo: false,
            session_role: Role::Admin,
            session_user: "Administrator".to_string(),
            session_student_id: None,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment; missing or unrecognized values
/// are `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_role(name: &str, default: Role) -> Role {
    match env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|err| {
            tracing::warn!(
                "Invalid {}='{}': {}. Falling back to {}",
                name,
                value,
                err,
                default
            );
            default
        }),
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_url: normalize_optional_nonempty(env::var("FINESDESK_SERVER").ok())
                .unwrap_or(defaults.server_url),
            request_timeout_secs: env_parsed("FINESDESK_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            port: env_parsed("PORT").unwrap_or(defaults.port),
            seed_demo: env_flag_enabled("FINESDESK_SEED_DEMO"),
            session_role: env_role("FINESDESK_ROLE", defaults.session_role),
            session_user: normalize_optional_nonempty(env::var("FINESDESK_USER").ok())
                .unwrap_or(defaults.session_user),
            session_student_id: normalize_optional_nonempty(
                env::var("FINESDESK_STUDENT_ID").ok(),
            ),
        }
    }

    /// Session described by the `FINESDESK_ROLE`/`FINESDESK_USER` settings.
    pub fn session(&self) -> Session {
        Session::new(SessionUser {
            id: 0,
            name: self.session_user.clone(),
            email: None,
            role: self.session_role,
            student_id: self.session_student_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{env_lock, EnvGuard};

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
    }

    #[test]
    fn from_env_reads_overrides_and_falls_back_on_bad_values() {
        let _lock = env_lock().lock().expect("env lock");
        let _server = EnvGuard::set("FINESDESK_SERVER", " http://school.local:9000 ");
        let _timeout = EnvGuard::set("FINESDESK_TIMEOUT_SECS", "oops");
        let _role = EnvGuard::set("FINESDESK_ROLE", "Student");
        let _student = EnvGuard::set("FINESDESK_STUDENT_ID", "2024-0042");
        let _seed = EnvGuard::set("FINESDESK_SEED_DEMO", "yes");
        let _user = EnvGuard::remove("FINESDESK_USER");

        let config = Config::from_env();
        assert_eq!(config.server_url, "http://school.local:9000");
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.seed_demo);

        let session = config.session();
        assert_eq!(session.role(), Role::Student);
        assert_eq!(session.student_id(), Some("2024-0042"));
        assert_eq!(session.user.name, "Administrator");
    }

    #[test]
    fn unknown_role_falls_back_to_admin() {
        let _lock = env_lock().lock().expect("env lock");
        let _role = EnvGuard::set("FINESDESK_ROLE", "principal");
        assert_eq!(Config::from_env().session_role, Role::Admin);
    }
}
