use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::diff::diff_values;
use crate::protocol::{plan_message, MutationPlan};

/// How ingested snapshots are written to the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// Every snapshot in full.
    Full,
    /// First snapshot in full, then only changed leaves.
    Diffed,
}

/// NDJSON journal of snapshots and dispatched plans.
pub(crate) struct Journal {
    mode: JournalMode,
    file: File,
    previous_snapshot: Option<Value>,
}

impl Journal {
    pub fn open(mode: JournalMode, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_snapshot: None,
        })
    }

    pub fn log_snapshot(&mut self, snapshot: &Value) {
        let entry = match (self.mode, self.previous_snapshot.as_ref()) {
            (JournalMode::Diffed, Some(prev)) => {
                let mut changes = Vec::new();
                diff_values(prev, snapshot, "", &mut changes);
                let changes: Vec<Value> = changes
                    .iter()
                    .map(|(path, old, new)| json!({ "path": path, "old": old, "new": new }))
                    .collect();
                json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "snapshot",
                    "changes": changes,
                })
            }
            (JournalMode::Diffed, None) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "snapshot",
                "full": true,
                "body": snapshot,
            }),
            (JournalMode::Full, _) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "snapshot",
                "body": snapshot,
            }),
        };
        self.write_line(&entry);
        if self.mode == JournalMode::Diffed {
            self.previous_snapshot = Some(snapshot.clone());
        }
    }

    pub fn log_plan(&mut self, plan: &MutationPlan) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "plan",
            "message": plan_message(plan),
        });
        self.write_line(&entry);
    }

    pub fn log_outcome(&mut self, plan: &MutationPlan, failed_at: Option<usize>, reason: Option<&str>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "outcome",
            "plan": plan.id.to_string(),
            "ok": failed_at.is_none(),
            "failed_at": failed_at,
            "reason": reason,
        });
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write journal entry: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Mutation;
    use tempfile::NamedTempFile;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn full_mode_writes_every_snapshot() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Full, tmp.path()).unwrap();
        journal.log_snapshot(&json!({"date": "2026-01-01"}));
        journal.log_snapshot(&json!({"date": "2026-01-02"}));

        let lines = read_lines(tmp.path());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["dir"], "snapshot");
        assert_eq!(lines[1]["body"]["date"], "2026-01-02");
        assert!(lines[0]["ts"].as_str().is_some());
    }

    #[test]
    fn diffed_mode_logs_full_first_then_changes() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Diffed, tmp.path()).unwrap();
        journal.log_snapshot(&json!({"quick_mode": null, "date": "2026-01-01"}));
        journal.log_snapshot(&json!({"quick_mode": {"kind": "QM_PARTY"}, "date": "2026-01-01"}));
        journal.log_snapshot(&json!({"quick_mode": {"kind": "QM_PARTY"}, "date": "2026-01-01"}));

        let lines = read_lines(tmp.path());
        assert_eq!(lines[0]["full"], true);
        assert!(lines[0]["body"].is_object());
        let changes = lines[1]["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["path"], "quick_mode");
        assert_eq!(lines[2]["changes"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn plan_and_outcome_entries() {
        let tmp = NamedTempFile::new().unwrap();
        let mut journal = Journal::open(JournalMode::Full, tmp.path()).unwrap();
        let plan = MutationPlan::new(None, "remove_quick_mode", vec![Mutation::ClearQuickMode]);
        journal.log_plan(&plan);
        journal.log_outcome(&plan, Some(0), Some("503 Service Unavailable"));

        let lines = read_lines(tmp.path());
        assert_eq!(lines[0]["dir"], "plan");
        assert_eq!(lines[0]["message"]["intent"], "remove_quick_mode");
        assert_eq!(lines[1]["dir"], "outcome");
        assert_eq!(lines[1]["ok"], false);
        assert_eq!(lines[1]["failed_at"], 0);
        assert_eq!(lines[1]["plan"], plan.id.to_string());
    }
}
