use std::time::Duration;

use tracing::debug;

use crate::error::DurationKind;
use crate::snapshot::QuickModeKind;
use crate::types::UnitKind;
use crate::{Error, Result};

pub const MIN_ROOM_VETO: Duration = Duration::from_secs(30 * 60);
pub const MAX_ROOM_VETO: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_ROOM_VETO: Duration = Duration::from_secs(3 * 60 * 60);
pub const ZONE_VETO: Duration = Duration::from_secs(6 * 60 * 60);
pub const MAX_QUICK_MODE_DAYS: u8 = 7;
pub const DEFAULT_COOLING_DAYS: u8 = 1;

/// Quick veto and quick mode durations.
///
/// Room vetoes default to the instance-configured duration and accept
/// caller overrides within 30 minutes to 24 hours. Zone vetoes always last
/// six hours; a caller-supplied zone duration is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationPolicy {
    room_default: Duration,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            room_default: DEFAULT_ROOM_VETO,
        }
    }
}

impl DurationPolicy {
    /// Policy with a configured room default, itself validated against the room bounds.
    pub fn with_room_default(room_default: Duration) -> Result<Self> {
        let room_default = check_room(room_default)?;
        Ok(Self { room_default })
    }

    pub fn room_default(&self) -> Duration {
        self.room_default
    }

    /// Default veto duration for a kind. Only zones and rooms have vetoes.
    pub fn default_veto(&self, kind: UnitKind) -> Result<Duration> {
        match kind {
            UnitKind::Room => Ok(self.room_default),
            UnitKind::Zone => Ok(ZONE_VETO),
            UnitKind::HotWater | UnitKind::Ventilation => Err(Error::UnsupportedIntentForKind {
                kind,
                intent: "quick veto".to_string(),
            }),
        }
    }

    /// Veto duration to use for a request, falling back to the default when unspecified.
    pub fn veto(&self, kind: UnitKind, requested: Option<Duration>) -> Result<Duration> {
        match (kind, requested) {
            (UnitKind::Room, Some(requested)) => check_room(requested),
            (UnitKind::Zone, Some(requested)) => {
                debug!(
                    requested_secs = requested.as_secs(),
                    "zone quick veto duration is fixed, ignoring requested duration"
                );
                Ok(ZONE_VETO)
            }
            (kind, _) => self.default_veto(kind),
        }
    }

    pub fn validate(&self, kind: UnitKind, requested: Duration) -> Result<Duration> {
        self.veto(kind, Some(requested))
    }

    /// Day count to send with a quick mode, `None` when the vendor takes none.
    pub fn quick_mode_days(&self, kind: QuickModeKind, requested: Option<u8>) -> Result<Option<u8>> {
        if !kind.takes_duration() {
            if requested.is_some() {
                debug!(quick_mode = %kind, "quick mode takes no duration, ignoring requested days");
            }
            return Ok(None);
        }
        match requested {
            Some(days) if days > MAX_QUICK_MODE_DAYS => Err(Error::InvalidDuration {
                kind: DurationKind::QuickMode,
                requested: Duration::from_secs(u64::from(days) * 24 * 60 * 60),
            }),
            Some(days) => Ok(Some(days)),
            None if kind == QuickModeKind::CoolingForXDays => Ok(Some(DEFAULT_COOLING_DAYS)),
            None => Ok(None),
        }
    }
}

fn check_room(requested: Duration) -> Result<Duration> {
    if (MIN_ROOM_VETO..=MAX_ROOM_VETO).contains(&requested) {
        Ok(requested)
    } else {
        Err(Error::InvalidDuration {
            kind: DurationKind::QuickVeto(UnitKind::Room),
            requested,
        })
    }
}
