//! Built-in event trail used when no `--events` file is given.
//!
//! All data here is fictional. It covers release 101 with one handover in
//! each state, plus a pending handover on release 100 that a 101 listing must
//! leave out.

use serde_json::{json, Value};

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    event::EventRecord,
};

const PROD: &str = "mysql://ensro@mysql-ens-general-prod-1:4525/";
const STAGING: &str = "mysql://ensadmin@mysql-ens-sta-1:4519/";

/// One handover: its token, database and the reports written for it.
struct Trail {
    token: &'static str,
    database: &'static str,
    /// `(report_type, report_time, message, progress)`
    reports: &'static [(&'static str, &'static str, &'static str, Option<(u64, u64)>)],
}

const TRAILS: &[Trail] = &[
    Trail {
        token: "0b5c4a1e-3d8f-4f53-9a5e-2f1b7c9d6e01",
        database: "homo_sapiens_core_101_38",
        reports: &[
            ("INFO", "2020-06-02T09:14:03", "", None),
            ("INFO", "2020-06-02T09:20:41", "Copying database", Some((1, 3))),
            ("INFO", "2020-06-02T10:02:17", "Running datachecks", Some((2, 3))),
            ("INFO", "2020-06-02T10:45:09", "Handover successful", Some((3, 3))),
        ],
    },
    Trail {
        token: "6a2e9d73-18c4-4b0f-8e21-d4c35f7a9b02",
        database: "drosophila_melanogaster_core_48_101_7",
        reports: &[
            ("INFO", "2020-06-02T11:03:55", "", None),
            ("INFO", "2020-06-02T11:10:12", "Copying database", Some((1, 3))),
        ],
    },
    Trail {
        token: "c91f0b44-7e2a-4d6c-b3f8-5a0e1d2c4b03",
        database: "mus_musculus_core_101_38",
        reports: &[
            ("INFO", "2020-06-02T12:30:00", "", None),
            ("INFO", "2020-06-02T12:36:48", "Copying database", Some((1, 3))),
            ("ERROR", "2020-06-02T13:05:21", "Datachecks failed: ForeignKeys", None),
        ],
    },
    Trail {
        token: "f3d8a2b6-9c15-4e7a-a0d4-8b6f2e1c7d04",
        database: "felis_catus_core_100_1",
        reports: &[("INFO", "2020-05-11T08:00:00", "", None)],
    },
];

/// The sample trail as validated records, in write order.
///
/// An empty message stands for the submission event, which is written as
/// `"<marker> <request json>"`.
pub fn events(submission_marker: &str) -> HandoverResult<Vec<EventRecord>> {
    let mut records = Vec::new();
    for trail in TRAILS {
        let src_uri = format!("{PROD}{}", trail.database);
        let tgt_uri = format!("{STAGING}{}", trail.database);
        let request = json!({
            "handover_token": trail.token,
            "src_uri": src_uri,
            "tgt_uri": tgt_uri,
            "contact": "joe.blogg@example.org",
            "comment": format!("handover {}", trail.database),
        });

        for (report_type, report_time, message, progress) in trail.reports {
            let message = if message.is_empty() {
                format!("{submission_marker} {request}")
            } else {
                message.to_string()
            };

            let mut params = request.clone();
            if let Some((complete, total)) = progress {
                params["progress_complete"] = json!(complete);
                params["progress_total"] = json!(total);
            }

            records.push(record(json!({
                "report_type": report_type,
                "report_time": report_time,
                "message": message,
                "params": params,
            }))?);
        }
    }
    Ok(records)
}

fn record(raw: Value) -> HandoverResult<EventRecord> {
    serde_json::from_value(raw).map_err(|e| HandoverError::Validation {
        reason: format!("sample event rejected: {e}"),
    })
}
