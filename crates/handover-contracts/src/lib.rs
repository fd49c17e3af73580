//! # handover-contracts
//!
//! Shared types for the handover status service.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, record validation, the store query
//! language and the error taxonomy.

pub mod error;
pub mod event;
pub mod job;
pub mod query;
pub mod status;

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use error::HandoverError;
    use event::{EventId, EventParams, EventRecord, RawEvent, ReportType, StoredEvent};
    use query::{EventField, EventFilter, EventQuery, SortOrder};
    use status::HandoverStatus;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn params(token: &str) -> EventParams {
        EventParams {
            handover_token: token.to_string(),
            src_uri: "mysql://ensro@prod-1:4525/panthera_pardus_core_93_1".to_string(),
            tgt_uri: "mysql://ensro@dev-1:4484/panthera_pardus_core_93_1".to_string(),
            contact: "joe.blogg@example.org".to_string(),
            comment: "handover new Leopard database".to_string(),
            progress_complete: None,
            progress_total: None,
        }
    }

    fn stored(seq: u64, token: &str, report_type: ReportType, secs: i64, msg: &str) -> StoredEvent {
        let time = Utc.timestamp_opt(1_530_000_000 + secs, 0).unwrap();
        StoredEvent {
            id: EventId(format!("ev-{seq}")),
            sequence: seq,
            record: EventRecord::new(report_type, time, msg, params(token)).unwrap(),
        }
    }

    // ── EventRecord validation ───────────────────────────────────────────────

    #[test]
    fn raw_event_with_naive_timestamp_is_accepted() {
        let raw = RawEvent {
            report_type: "INFO".to_string(),
            report_time: "2018-06-27T15:19:08.459".to_string(),
            message: "Metadata load complete, Handover successful".to_string(),
            params: params("605f1191").with_progress(3, 3),
        };

        let record = EventRecord::try_from(raw).unwrap();
        assert_eq!(record.report_type(), ReportType::Info);
        assert_eq!(record.token(), "605f1191");
        assert_eq!(
            record.report_time(),
            Utc.with_ymd_and_hms(2018, 6, 27, 15, 19, 8).unwrap()
                + chrono::Duration::milliseconds(459)
        );
    }

    #[test]
    fn raw_event_with_rfc3339_timestamp_is_accepted() {
        let raw = RawEvent {
            report_type: "ERROR".to_string(),
            report_time: "2018-06-27T16:00:00+01:00".to_string(),
            message: "Healthchecks failed".to_string(),
            params: params("t"),
        };
        let record = EventRecord::try_from(raw).unwrap();
        assert_eq!(
            record.report_time(),
            Utc.with_ymd_and_hms(2018, 6, 27, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = EventRecord::new(ReportType::Info, Utc::now(), "Handling", params("  ")).unwrap_err();
        match err {
            HandoverError::Validation { reason } => assert!(reason.contains("handover_token")),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn unknown_report_type_is_rejected() {
        let raw = RawEvent {
            report_type: "WARN".to_string(),
            report_time: "2018-06-27T15:19:08".to_string(),
            message: "?".to_string(),
            params: params("t"),
        };
        match EventRecord::try_from(raw) {
            Err(HandoverError::Validation { reason }) => assert!(reason.contains("WARN")),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn unparseable_report_time_is_rejected() {
        let raw = RawEvent {
            report_type: "INFO".to_string(),
            report_time: "yesterday".to_string(),
            message: "?".to_string(),
            params: params("t"),
        };
        assert!(matches!(
            EventRecord::try_from(raw),
            Err(HandoverError::Validation { .. })
        ));
    }

    #[test]
    fn progress_beyond_total_is_rejected() {
        let result = EventRecord::new(
            ReportType::Info,
            Utc::now(),
            "Copying",
            params("t").with_progress(4, 3),
        );
        assert!(matches!(result, Err(HandoverError::Validation { .. })));
    }

    #[test]
    fn record_deserializes_through_validation() {
        let doc = json!({
            "report_type": "INFO",
            "report_time": "2018-06-27T15:07:07.462",
            "message": "Handling {...}",
            "params": {
                "handover_token": "",
                "src_uri": "a", "tgt_uri": "b", "contact": "c", "comment": "d"
            }
        });
        let err = serde_json::from_value::<EventRecord>(doc).unwrap_err();
        assert!(err.to_string().contains("handover_token"));
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    #[test]
    fn latest_query_picks_max_report_time() {
        let events = vec![
            stored(0, "a", ReportType::Info, 10, "first"),
            stored(1, "a", ReportType::Info, 30, "third"),
            stored(2, "a", ReportType::Info, 20, "second"),
            stored(3, "b", ReportType::Info, 99, "other token"),
        ];

        let hits = EventQuery::latest(EventFilter::token("a")).apply(&events);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.message(), "third");
    }

    #[test]
    fn equal_timestamps_resolve_by_arrival() {
        let events = vec![
            stored(0, "a", ReportType::Info, 10, "earlier arrival"),
            stored(1, "a", ReportType::Info, 10, "later arrival"),
        ];

        let newest = EventQuery::latest(EventFilter::token("a")).apply(&events);
        assert_eq!(newest[0].record.message(), "later arrival");

        let oldest = EventQuery::latest(EventFilter::token("a"))
            .with_order(SortOrder::Ascending)
            .apply(&events);
        assert_eq!(oldest[0].record.message(), "earlier arrival");
    }

    #[test]
    fn report_type_and_prefix_conditions_combine() {
        let events = vec![
            stored(0, "a", ReportType::Info, 1, "Handling {...}"),
            stored(1, "a", ReportType::Info, 2, "Copying database"),
            stored(2, "a", ReportType::Error, 3, "Handling failed"),
        ];

        let filter = EventFilter::new()
            .report_type(ReportType::Info)
            .starts_with(EventField::Message, "Handling");
        let hits = EventQuery::new(filter).apply(&events);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, EventId("ev-0".to_string()));
    }

    #[test]
    fn generation_suffix_matches_trailing_groups_only() {
        let events = vec![stored(0, "a", ReportType::Info, 1, "Handling")];

        let hit = EventFilter::new().generation_suffix(EventField::TgtUri, "93");
        let miss = EventFilter::new().generation_suffix(EventField::TgtUri, "9");
        assert!(hit.matches(&events[0].record));
        assert!(!miss.matches(&events[0].record));
    }

    #[test]
    fn generation_suffix_rejects_deeper_or_leading_groups() {
        let target = |tgt_uri: &str| {
            let mut p = params("a");
            p.tgt_uri = tgt_uri.to_string();
            EventRecord::new(ReportType::Info, Utc::now(), "Handling", p).unwrap()
        };
        let filter = EventFilter::new().generation_suffix(EventField::TgtUri, "93");

        assert!(filter.matches(&target("mysql://sta-1/felis_catus_core_93")));
        assert!(filter.matches(&target("mysql://sta-1/felis_catus_core_93_1")));
        assert!(!filter.matches(&target("mysql://sta-1/felis_catus_core_93_1_2")));
        assert!(!filter.matches(&target("mysql://sta-1/93_foo")));
        assert!(!filter.matches(&target("mysql://sta-1/felis_catus_core_93_x")));
        assert!(!filter.matches(&target("mysql://sta-1/93_1")));
    }

    #[test]
    fn offset_and_limit_page_through_results() {
        let events: Vec<StoredEvent> = (0..5)
            .map(|i| stored(i, "a", ReportType::Info, i as i64, &format!("m{i}")))
            .collect();

        let page = EventQuery::new(EventFilter::token("a"))
            .with_offset(1)
            .with_limit(2)
            .apply(&events);
        let messages: Vec<&str> = page.iter().map(|e| e.record.message()).collect();
        assert_eq!(messages, vec!["m3", "m2"]);
    }

    // ── Status / errors ──────────────────────────────────────────────────────

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HandoverStatus::Failed).unwrap(), "\"failed\"");
        assert!(HandoverStatus::Complete.is_terminal());
        assert!(!HandoverStatus::Running.is_terminal());
    }

    #[test]
    fn not_found_display_names_the_key() {
        let err = HandoverError::not_found("handover token", "abc-123");
        assert_eq!(err.to_string(), "handover token abc-123 not found");
        assert!(!err.is_retriable());
    }

    #[test]
    fn transport_errors_are_retriable() {
        let err = HandoverError::StoreUnavailable {
            reason: "connection refused".to_string(),
        };
        assert!(err.is_retriable());
        assert!(err.to_string().contains("connection refused"));
    }
}
