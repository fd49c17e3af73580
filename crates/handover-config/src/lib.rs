//! # handover-config
//!
//! TOML configuration for the handover status service.
//!
//! ## Overview
//!
//! [`HandoverConfig`] holds every tunable the services take at construction:
//! the default release, the status markers, listing limits, the release
//! offset, the analyses jobs are submitted to, and the event dispatch tables.
//! It converts into the option structs of `handover-core`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use handover_config::HandoverConfig;
//!
//! let config = HandoverConfig::from_file(Path::new("handover.toml"))?.with_env_overrides()?;
//! let reducer = StatusReducer::new(store.clone(), config.reducer_options());
//! ```

pub mod loader;
pub mod settings;

pub use loader::{ENV_JOBS_ANALYSIS, ENV_RELEASE, ENV_TARGET_SERVER_URI};
pub use settings::{HandoverConfig, ProcessSection, DEFAULT_RELEASE};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use handover_contracts::error::HandoverError;

    use crate::{HandoverConfig, ENV_JOBS_ANALYSIS, ENV_RELEASE, ENV_TARGET_SERVER_URI};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn expect_config_error(result: Result<HandoverConfig, HandoverError>, needle: &str) {
        match result {
            Err(HandoverError::Config { reason }) => {
                assert!(reason.contains(needle), "expected '{needle}' in: {reason}")
            }
            other => panic!("expected Config, got {:?}", other),
        }
    }

    // ── 1. defaults ───────────────────────────────────────────────────────────

    #[test]
    fn empty_document_gives_defaults() {
        let config = HandoverConfig::from_toml_str("").unwrap();
        assert_eq!(config, HandoverConfig::default());
        assert_eq!(config.release, "101");
        assert_eq!(config.matcher().offset(), 53);
        assert_eq!(config.listing_options().page_size, 1000);
        assert!(!config.listing_options().deduplicate_tokens);
        assert_eq!(config.reducer_options().submission_marker, "Handling");
    }

    // ── 2. full document ──────────────────────────────────────────────────────

    #[test]
    fn full_document_round_trips_into_options() {
        let toml = r#"
            release = "94"

            [status]
            submission_marker = "Handling"
            completion_markers = ["all done"]

            [listing]
            page_size = 50
            deduplicate_tokens = true

            [matcher]
            release_offset = 40

            [submission]
            analysis = "handover_database"
            target_server_uri = "mysql://ensadmin@sta-1:4519/"

            [jobs]
            analysis = "healthcheck"

            [events]
            new_assembly = ["xref_update", "ftp_dumps"]

            [processes.xref_update]
            analysis = "run_xrefs"

            [processes.ftp_dumps]
            analysis = "dump_ftp"
        "#;

        let config = HandoverConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.release, "94");
        assert_eq!(config.reducer_options().completion_markers, vec!["all done"]);
        assert_eq!(config.listing_options().page_size, 50);
        assert!(config.listing_options().deduplicate_tokens);
        assert!(config.matcher().matches("homo_sapiens_core_94_134", "134"));
        assert!(!HandoverConfig::default()
            .matcher()
            .matches("homo_sapiens_core_94_134", "134"));

        let submission = config.submission_options();
        assert_eq!(submission.target_server_uri, "mysql://ensadmin@sta-1:4519/");
        assert_eq!(submission.submission_marker, "Handling");
        assert_eq!(config.jobs.analysis, "healthcheck");

        assert_eq!(config.events["new_assembly"], vec!["xref_update", "ftp_dumps"]);
        assert_eq!(config.process_analyses()["ftp_dumps"], "dump_ftp");
    }

    // ── 3. rejected documents ─────────────────────────────────────────────────

    #[test]
    fn malformed_toml_is_a_config_error() {
        expect_config_error(
            HandoverConfig::from_toml_str("this is not valid toml ][[["),
            "failed to parse config TOML",
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        expect_config_error(
            HandoverConfig::from_toml_str("[listing]\npage_sise = 10"),
            "page_sise",
        );
    }

    #[test]
    fn inconsistent_values_are_rejected() {
        expect_config_error(HandoverConfig::from_toml_str(r#"release = "abc""#), "abc");
        expect_config_error(
            HandoverConfig::from_toml_str("[listing]\npage_size = 0"),
            "page_size",
        );
        expect_config_error(
            HandoverConfig::from_toml_str("[events]\nnew_assembly = [\"ghost\"]"),
            "ghost",
        );
    }

    #[test]
    fn missing_file_is_a_config_error() {
        expect_config_error(
            HandoverConfig::from_file(std::path::Path::new("/nonexistent/handover.toml")),
            "failed to read config file",
        );
    }

    // ── 4. overrides ──────────────────────────────────────────────────────────

    #[test]
    fn overrides_replace_file_values() {
        let config = HandoverConfig::from_toml_str(r#"release = "93""#)
            .unwrap()
            .with_overrides(lookup(&[
                (ENV_RELEASE, "95"),
                (ENV_TARGET_SERVER_URI, "mysql://sta-2:3306/"),
                (ENV_JOBS_ANALYSIS, "healthcheck"),
            ]))
            .unwrap();

        assert_eq!(config.release, "95");
        assert_eq!(config.submission.target_server_uri, "mysql://sta-2:3306/");
        assert_eq!(config.jobs.analysis, "healthcheck");
    }

    #[test]
    fn blank_or_absent_overrides_are_ignored() {
        let config = HandoverConfig::default()
            .with_overrides(lookup(&[(ENV_RELEASE, "  ")]))
            .unwrap();
        assert_eq!(config.release, "101");
    }

    #[test]
    fn bad_override_is_rejected() {
        expect_config_error(
            HandoverConfig::default().with_overrides(lookup(&[(ENV_RELEASE, "latest")])),
            "latest",
        );
    }
}
