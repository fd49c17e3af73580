//! Loading, overriding and checking a `HandoverConfig`.
//!
//! Load order:
//!
//! 1. Parse TOML (`from_toml_str` / `from_file`), missing keys defaulted.
//! 2. Apply environment overrides through an injected lookup.
//! 3. Check the result; any inconsistency is a `Config` error.

use std::path::Path;

use tracing::{debug, info};

use handover_contracts::error::{HandoverError, HandoverResult};
use handover_core::listing::validate_release;

use crate::settings::HandoverConfig;

/// Overrides the default release.
pub const ENV_RELEASE: &str = "HANDOVER_RELEASE";
/// Overrides `[submission] target_server_uri`.
pub const ENV_TARGET_SERVER_URI: &str = "HANDOVER_TARGET_SERVER_URI";
/// Overrides `[jobs] analysis`.
pub const ENV_JOBS_ANALYSIS: &str = "HANDOVER_JOBS_ANALYSIS";

impl HandoverConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `HandoverError::Config` if the TOML is malformed, carries an
    /// unknown key, or describes an inconsistent configuration.
    pub fn from_toml_str(s: &str) -> HandoverResult<Self> {
        let config: HandoverConfig = toml::from_str(s).map_err(|e| HandoverError::Config {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> HandoverResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| HandoverError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), release = %config.release, "configuration loaded");
        Ok(config)
    }

    /// Apply overrides found by `lookup`, keyed by the `ENV_*` names.
    ///
    /// Empty values are ignored. The result is checked again.
    pub fn with_overrides<F>(mut self, lookup: F) -> HandoverResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let found = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(release) = found(ENV_RELEASE) {
            debug!(key = ENV_RELEASE, value = %release, "override applied");
            self.release = release;
        }
        if let Some(uri) = found(ENV_TARGET_SERVER_URI) {
            debug!(key = ENV_TARGET_SERVER_URI, value = %uri, "override applied");
            self.submission.target_server_uri = uri;
        }
        if let Some(analysis) = found(ENV_JOBS_ANALYSIS) {
            debug!(key = ENV_JOBS_ANALYSIS, value = %analysis, "override applied");
            self.jobs.analysis = analysis;
        }

        self.check()?;
        Ok(self)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> HandoverResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Reject configurations the services cannot run with.
    pub fn check(&self) -> HandoverResult<()> {
        validate_release(&self.release).map_err(|_| HandoverError::Config {
            reason: format!("default release '{}' is not a release number", self.release),
        })?;

        if self.status.submission_marker.trim().is_empty() {
            return Err(config_error("[status] submission_marker must not be empty"));
        }
        if self.listing.page_size == 0 {
            return Err(config_error("[listing] page_size must be at least 1"));
        }
        if self.submission.analysis.trim().is_empty() || self.jobs.analysis.trim().is_empty() {
            return Err(config_error("analysis names must not be empty"));
        }

        for (event_type, processes) in &self.events {
            for process in processes {
                if !self.processes.contains_key(process) {
                    return Err(HandoverError::Config {
                        reason: format!(
                            "event type '{}' names process '{}' with no [processes.{}] section",
                            event_type, process, process
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

fn config_error(reason: &str) -> HandoverError {
    HandoverError::Config {
        reason: reason.to_string(),
    }
}
