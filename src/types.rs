use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::QuickModeKind;

/// Temperature in Celsius.
/// The installation accepts setpoints in 0.5 degree increments.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(f64);

impl Temperature {
    pub const MIN_SETPOINT: Temperature = Temperature(5.0);
    pub const MAX_SETPOINT: Temperature = Temperature(30.0);

    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    /// Round to installation precision (0.5 increments).
    pub fn to_setpoint(&self) -> f64 {
        (self.0 * 2.0).round() / 2.0
    }

    pub fn is_valid_setpoint(&self) -> bool {
        (Self::MIN_SETPOINT.0..=Self::MAX_SETPOINT.0).contains(&self.0)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Zone,
    Room,
    #[serde(rename = "dhw")]
    HotWater,
    Ventilation,
}

impl UnitKind {
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Zone,
        UnitKind::Room,
        UnitKind::HotWater,
        UnitKind::Ventilation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Zone => "zone",
            UnitKind::Room => "room",
            UnitKind::HotWater => "dhw",
            UnitKind::Ventilation => "ventilation",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    Auto,
    FanOnly,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::Auto => "auto",
            HvacMode::FanOnly => "fan_only",
        }
    }

    pub fn from_host_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(HvacMode::Off),
            "heat" => Some(HvacMode::Heat),
            "cool" => Some(HvacMode::Cool),
            "auto" => Some(HvacMode::Auto),
            "fan_only" => Some(HvacMode::FanOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Comfort,
    Home,
    Sleep,
    Away,
    Boost,
    CoolingOn,
    CoolingForXDays,
    SystemOff,
    Party,
    QuickVeto,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Comfort => "comfort",
            Preset::Home => "home",
            Preset::Sleep => "sleep",
            Preset::Away => "away",
            Preset::Boost => "boost",
            Preset::CoolingOn => "cooling_on",
            Preset::CoolingForXDays => "cooling_for_x_days",
            Preset::SystemOff => "system_off",
            Preset::Party => "party",
            Preset::QuickVeto => "quick_veto",
        }
    }

    pub fn from_host_str(s: &str) -> Option<Self> {
        match s {
            "comfort" => Some(Preset::Comfort),
            "home" => Some(Preset::Home),
            "sleep" => Some(Preset::Sleep),
            "away" => Some(Preset::Away),
            "boost" => Some(Preset::Boost),
            "cooling_on" => Some(Preset::CoolingOn),
            "cooling_for_x_days" => Some(Preset::CoolingForXDays),
            "system_off" => Some(Preset::SystemOff),
            "party" => Some(Preset::Party),
            "quick_veto" => Some(Preset::QuickVeto),
            _ => None,
        }
    }
}

/// The resolved (hvac, preset) pair a host shows for one unit.
/// `None` on either side means the host has nothing to show there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PresentationMode {
    pub hvac: Option<HvacMode>,
    pub preset: Option<Preset>,
}

impl PresentationMode {
    pub const fn new(hvac: Option<HvacMode>, preset: Option<Preset>) -> Self {
        Self { hvac, preset }
    }
}

impl fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.hvac.map(|h| h.as_str()).unwrap_or("-"),
            self.preset.map(|p| p.as_str()).unwrap_or("none"),
        )
    }
}

/// Events emitted by the diff engine when a new snapshot is ingested.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PresentationChanged {
        unit_id: String,
        kind: UnitKind,
        from: PresentationMode,
        to: PresentationMode,
    },
    UnitAppeared { unit_id: String, kind: UnitKind, mode: PresentationMode },
    UnitDisappeared { unit_id: String, kind: UnitKind },
    TargetTemperatureChanged { unit_id: String, temp: Option<Temperature> },
    HolidayModeChanged { active: bool },
    QuickModeChanged { mode: Option<QuickModeKind> },
    ErrorsChanged { errors: Vec<String> },
}
