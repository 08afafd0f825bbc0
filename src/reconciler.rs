use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, trace};

use crate::diff::{diff_installation, diff_presentations};
use crate::dispatch::{dispatch, dispatch_installation, Intent};
use crate::duration::DurationPolicy;
use crate::logger::{Journal, JournalMode};
use crate::protocol::MutationPlan;
use crate::resolver::{presentations, UnitPresentation};
use crate::snapshot::Installation;
use crate::transport::{apply_plan, MutationTransport};
use crate::types::Event;
use crate::{Error, Result};

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;
type SnapshotCallback = Box<dyn Fn(&Installation, &BTreeMap<String, UnitPresentation>) + Send + Sync>;

pub struct ReconcilerBuilder {
    quick_veto_duration: Option<Duration>,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
    journal_mode: Option<JournalMode>,
    journal_path: Option<PathBuf>,
}

impl ReconcilerBuilder {
    pub fn new() -> Self {
        Self {
            quick_veto_duration: None,
            event_callbacks: Vec::new(),
            snapshot_callbacks: Vec::new(),
            journal_mode: None,
            journal_path: None,
        }
    }

    /// Default room quick veto duration, 30 minutes to 24 hours.
    pub fn quick_veto_duration(mut self, duration: Duration) -> Self {
        self.quick_veto_duration = Some(duration);
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn on_snapshot(
        mut self,
        f: impl Fn(&Installation, &BTreeMap<String, UnitPresentation>) + Send + Sync + 'static,
    ) -> Self {
        self.snapshot_callbacks.push(Box::new(f));
        self
    }

    pub fn journal(mut self, mode: JournalMode, path: impl Into<PathBuf>) -> Self {
        self.journal_mode = Some(mode);
        self.journal_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Reconciler> {
        let policy = match self.quick_veto_duration {
            Some(d) => DurationPolicy::with_room_default(d)?,
            None => DurationPolicy::default(),
        };

        let journal = match (self.journal_mode, self.journal_path) {
            (Some(mode), Some(path)) => Some(Journal::open(mode, path)?),
            _ => None,
        };

        Ok(Reconciler {
            policy,
            snapshot: None,
            presentations: BTreeMap::new(),
            event_callbacks: self.event_callbacks,
            snapshot_callbacks: self.snapshot_callbacks,
            journal,
        })
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the latest snapshot and its presentations, and turns intents into
/// plans against it.
pub struct Reconciler {
    policy: DurationPolicy,
    snapshot: Option<Installation>,
    presentations: BTreeMap<String, UnitPresentation>,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
    journal: Option<Journal>,
}

impl Reconciler {
    pub fn builder() -> ReconcilerBuilder {
        ReconcilerBuilder::new()
    }

    /// Replaces the current snapshot, re-resolves every unit and fires
    /// events for what changed.
    pub fn ingest(&mut self, snapshot: Installation) {
        if let Some(ref mut journal) = self.journal {
            journal.log_snapshot(&snapshot.to_json());
        }

        let current = presentations(&snapshot);
        let mut events = Vec::new();
        diff_installation(self.snapshot.as_ref(), &snapshot, &mut events);
        diff_presentations(&self.presentations, &current, &mut events);

        self.presentations = current;
        let snapshot = self.snapshot.insert(snapshot);

        for event in &events {
            for cb in &self.event_callbacks {
                cb(event);
            }
        }
        for cb in &self.snapshot_callbacks {
            cb(snapshot, &self.presentations);
        }

        if events.is_empty() {
            trace!("ingest: no changes");
        } else {
            debug!(count = events.len(), units = self.presentations.len(), "ingested snapshot");
        }
    }

    pub fn ingest_json(&mut self, body: &str) -> Result<()> {
        let snapshot = Installation::from_json(body)?;
        self.ingest(snapshot);
        Ok(())
    }

    pub fn snapshot(&self) -> Option<&Installation> {
        self.snapshot.as_ref()
    }

    pub fn presentations(&self) -> &BTreeMap<String, UnitPresentation> {
        &self.presentations
    }

    pub fn presentation(&self, unit_id: &str) -> Option<&UnitPresentation> {
        self.presentations.get(unit_id)
    }

    pub fn policy(&self) -> &DurationPolicy {
        &self.policy
    }

    /// Plans an intent against one unit of the current snapshot.
    pub fn dispatch(&mut self, unit_id: &str, intent: &Intent) -> Result<MutationPlan> {
        let snapshot = self.snapshot.as_ref().ok_or(Error::NoSnapshot)?;
        let unit = snapshot
            .unit(unit_id)
            .ok_or_else(|| Error::UnknownUnit(unit_id.to_string()))?;
        let mutations = dispatch(intent, unit, snapshot, &self.policy)?;
        let plan = MutationPlan::new(Some(unit_id.to_string()), intent.name(), mutations);
        self.journal_plan(&plan);
        Ok(plan)
    }

    /// Plans a quick mode or holiday intent.
    pub fn dispatch_installation(&mut self, intent: &Intent) -> Result<MutationPlan> {
        let snapshot = self.snapshot.as_ref().ok_or(Error::NoSnapshot)?;
        let mutations = dispatch_installation(intent, snapshot, &self.policy)?;
        let plan = MutationPlan::new(None, intent.name(), mutations);
        self.journal_plan(&plan);
        Ok(plan)
    }

    /// Hands a plan to the transport. The snapshot is left untouched; the
    /// next fetch shows the effect.
    pub async fn apply<T: MutationTransport>(&mut self, transport: &mut T, plan: &MutationPlan) -> Result<()> {
        let result = apply_plan(transport, plan).await;
        if let Some(ref mut journal) = self.journal {
            match &result {
                Err(Error::MutationRejected { index, reason }) => {
                    journal.log_outcome(plan, Some(*index), Some(reason.as_str()))
                }
                _ => journal.log_outcome(plan, None, None),
            }
        }
        result
    }

    fn journal_plan(&mut self, plan: &MutationPlan) {
        debug!(plan = %plan.id, intent = plan.intent, count = plan.len(), "planned mutations");
        if let Some(ref mut journal) = self.journal {
            journal.log_plan(plan);
        }
    }
}
