//! Scoped environment overrides for tests that read configuration.

use std::sync::{Mutex, OnceLock};

/// Process-wide lock; hold it while any [`EnvGuard`] is alive.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers serialize through `env_lock` while mutating.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Overrides one variable and puts the previous value back on drop.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    fn apply(key: &str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }

    pub fn set(key: &str, value: &str) -> Self {
        Self::apply(key, Some(value))
    }

    pub fn remove(key: &str) -> Self {
        Self::apply(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_var(&self.key, self.previous.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn guard_restores_previous_value_and_absence() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "FINESDESK_TEST_ENV_GUARD";
        {
            let _outer = EnvGuard::set(key, "before");
            {
                let _inner = EnvGuard::set(key, "after");
                assert_eq!(std::env::var(key).ok().as_deref(), Some("after"));
            }
            assert_eq!(std::env::var(key).ok().as_deref(), Some("before"));
        }
        assert!(std::env::var(key).is_err());
    }
}
