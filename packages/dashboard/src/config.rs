//! Start-up configuration and the shared-secret gate.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `CASUALTY_MAP_PASSWORD` | Yes | Secret that unlocks the dashboard |
//!
//! plus the `SUPABASE_*` variables read by [`StorageConfig`].

use casualty_map_storage::{StorageConfig, StorageError};

use crate::DashboardError;

/// Everything read from the environment at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Secret that unlocks the dashboard.
    pub password: String,
    /// Where the dataset is downloaded from.
    pub storage: StorageConfig,
}

impl DashboardConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] naming the first required variable
    /// that is unset.
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] naming the first required variable
    /// that is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DashboardError> {
        let password = lookup("CASUALTY_MAP_PASSWORD")
            .filter(|value| !value.is_empty())
            .ok_or_else(|| DashboardError::Config {
                name: "CASUALTY_MAP_PASSWORD".to_string(),
            })?;

        let storage = StorageConfig::from_lookup(&lookup).map_err(|e| match e {
            StorageError::MissingEnv { name } => DashboardError::Config { name },
            other => DashboardError::Storage(other),
        })?;

        Ok(Self { password, storage })
    }
}

/// Single shared-secret gate in front of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGate {
    secret: String,
    unlocked: bool,
}

impl AuthGate {
    /// Creates a locked gate.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            unlocked: false,
        }
    }

    /// Unlocks the gate if `attempt` equals the secret. A wrong attempt
    /// leaves the gate as it was.
    pub fn try_unlock(&mut self, attempt: &str) -> bool {
        if attempt == self.secret {
            self.unlocked = true;
        } else {
            log::debug!("Rejected unlock attempt");
        }
        self.unlocked
    }

    /// Whether the gate has been unlocked.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn reads_password_and_storage() {
        let config = DashboardConfig::from_lookup(vars(&[
            ("CASUALTY_MAP_PASSWORD", "hunter2"),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();
        assert_eq!(config.password, "hunter2");
        assert_eq!(config.storage.bucket, "casualties-data");
    }

    #[test]
    fn missing_password_is_named() {
        let err = DashboardConfig::from_lookup(vars(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, DashboardError::Config { ref name } if name == "CASUALTY_MAP_PASSWORD"));
    }

    #[test]
    fn missing_storage_variable_is_named() {
        let err = DashboardConfig::from_lookup(vars(&[("CASUALTY_MAP_PASSWORD", "x")])).unwrap_err();
        assert!(matches!(err, DashboardError::Config { ref name } if name == "SUPABASE_URL"));
    }

    #[test]
    fn gate_opens_only_on_exact_secret() {
        let mut gate = AuthGate::new("hunter2");
        assert!(!gate.try_unlock("Hunter2"));
        assert!(!gate.try_unlock(""));
        assert!(!gate.is_unlocked());
        assert!(gate.try_unlock("hunter2"));
        assert!(gate.is_unlocked());
    }
}
