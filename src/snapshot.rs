//! Immutable model of one fetch cycle.
//!
//! A snapshot is replaced wholesale on every fetch; nothing in here is
//! mutated across cycles. The fetch collaborator either builds these values
//! directly or hands over the JSON document accepted by
//! [`Installation::from_json`].

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Temperature, UnitKind};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    /// Day the snapshot was taken, used for holiday expiry.
    pub date: NaiveDate,
    #[serde(default)]
    pub holiday_mode: Option<HolidayMode>,
    #[serde(default)]
    pub quick_mode: Option<QuickMode>,
    #[serde(default)]
    pub errors: BTreeSet<ErrorCode>,
    #[serde(default)]
    pub units: Vec<ControlUnit>,
}

impl Installation {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            holiday_mode: None,
            quick_mode: None,
            errors: BTreeSet::new(),
            units: Vec::new(),
        }
    }

    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn unit(&self, id: &str) -> Option<&ControlUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn units_of(&self, kind: UnitKind) -> impl Iterator<Item = &ControlUnit> {
        self.units.iter().filter(move |u| u.kind == kind)
    }

    /// Holiday mode, if one is set and its date range covers the snapshot date.
    pub fn active_holiday(&self) -> Option<&HolidayMode> {
        self.holiday_mode
            .as_ref()
            .filter(|h| h.is_applied(self.date))
    }

    pub fn has_ventilation(&self) -> bool {
        self.units_of(UnitKind::Ventilation).next().is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolidayMode {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_temperature: Temperature,
}

impl HolidayMode {
    pub fn is_applied(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuickModeKind {
    #[serde(rename = "QM_HOTWATER_BOOST")]
    HotWaterBoost,
    #[serde(rename = "QM_VENTILATION_BOOST")]
    VentilationBoost,
    #[serde(rename = "QM_ONE_DAY_AWAY")]
    OneDayAway,
    #[serde(rename = "QM_SYSTEMOFF")]
    SystemOff,
    #[serde(rename = "QM_ONE_DAY_AT_HOME")]
    OneDayAtHome,
    #[serde(rename = "QM_PARTY")]
    Party,
    #[serde(rename = "QM_COOLING_FOR_X_DAYS")]
    CoolingForXDays,
}

impl QuickModeKind {
    pub const ALL: [QuickModeKind; 7] = [
        QuickModeKind::HotWaterBoost,
        QuickModeKind::VentilationBoost,
        QuickModeKind::OneDayAway,
        QuickModeKind::SystemOff,
        QuickModeKind::OneDayAtHome,
        QuickModeKind::Party,
        QuickModeKind::CoolingForXDays,
    ];

    pub fn as_vendor_str(&self) -> &'static str {
        match self {
            QuickModeKind::HotWaterBoost => "QM_HOTWATER_BOOST",
            QuickModeKind::VentilationBoost => "QM_VENTILATION_BOOST",
            QuickModeKind::OneDayAway => "QM_ONE_DAY_AWAY",
            QuickModeKind::SystemOff => "QM_SYSTEMOFF",
            QuickModeKind::OneDayAtHome => "QM_ONE_DAY_AT_HOME",
            QuickModeKind::Party => "QM_PARTY",
            QuickModeKind::CoolingForXDays => "QM_COOLING_FOR_X_DAYS",
        }
    }

    pub fn from_vendor_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_vendor_str() == s)
    }

    /// Whether the vendor accepts a day count for this quick mode.
    pub fn takes_duration(&self) -> bool {
        matches!(
            self,
            QuickModeKind::OneDayAway | QuickModeKind::OneDayAtHome | QuickModeKind::CoolingForXDays
        )
    }
}

impl fmt::Display for QuickModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_vendor_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickMode {
    pub kind: QuickModeKind,
    #[serde(default)]
    pub duration_days: Option<u8>,
}

impl QuickMode {
    pub fn new(kind: QuickModeKind) -> Self {
        Self { kind, duration_days: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

/// Schedule-driven operating state of a unit absent any override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseMode {
    Auto,
    On,
    Off,
    Manual,
    Day,
    Night,
    /// Anything the vendor sends that this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl BaseMode {
    pub const ALL: [BaseMode; 7] = [
        BaseMode::Auto,
        BaseMode::On,
        BaseMode::Off,
        BaseMode::Manual,
        BaseMode::Day,
        BaseMode::Night,
        BaseMode::Unknown,
    ];

    pub fn as_vendor_str(&self) -> &'static str {
        match self {
            BaseMode::Auto => "AUTO",
            BaseMode::On => "ON",
            BaseMode::Off => "OFF",
            BaseMode::Manual => "MANUAL",
            BaseMode::Day => "DAY",
            BaseMode::Night => "NIGHT",
            BaseMode::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActiveFunction {
    Heating,
    Cooling,
    #[default]
    #[serde(other)]
    Standby,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickVeto {
    pub target_temperature: Temperature,
    #[serde(rename = "remaining_minutes", with = "minutes")]
    pub remaining: Duration,
}

impl QuickVeto {
    pub fn new(target_temperature: Temperature, remaining: Duration) -> Self {
        Self { target_temperature, remaining }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlUnit {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: UnitKind,
    pub base_mode: BaseMode,
    #[serde(default)]
    pub quick_veto: Option<QuickVeto>,
    #[serde(default)]
    pub current_temperature: Option<Temperature>,
    #[serde(default)]
    pub target_temperature: Option<Temperature>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub active_function: ActiveFunction,
    /// Zone has a cooling circuit.
    #[serde(default)]
    pub cooling: bool,
    /// Zone is controlled room by room; its rooms are presented instead.
    #[serde(default)]
    pub room_by_room: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ControlUnit {
    pub fn new(id: impl Into<String>, kind: UnitKind, base_mode: BaseMode) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
            base_mode,
            quick_veto: None,
            current_temperature: None,
            target_temperature: None,
            enabled: true,
            active_function: ActiveFunction::Standby,
            cooling: false,
            room_by_room: false,
        }
    }

    pub fn with_quick_veto(mut self, veto: QuickVeto) -> Self {
        self.quick_veto = Some(veto);
        self
    }

    pub fn with_active_function(mut self, function: ActiveFunction) -> Self {
        self.active_function = function;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Disabled units and room-by-room zones never receive a presentation.
    pub fn is_presentable(&self) -> bool {
        self.enabled && !(self.kind == UnitKind::Zone && self.room_by_room)
    }
}

mod minutes {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs() / 60)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let mins = u64::deserialize(d)?;
        Ok(Duration::from_secs(mins.saturating_mul(60)))
    }
}
