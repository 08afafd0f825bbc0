//! Collapses the override layers of a unit into one [`PresentationMode`].
//!
//! Every table below is an exhaustive `match` on closed enums, so adding a
//! quick mode or a base mode fails to compile until the tables cover it.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::precedence::{ActiveLayer, active_layer};
use crate::snapshot::{ActiveFunction, BaseMode, ControlUnit, Installation, QuickModeKind};
use crate::types::{HvacMode, PresentationMode, Preset, Temperature, UnitKind};

const HOLIDAY: PresentationMode = PresentationMode::new(Some(HvacMode::Off), Some(Preset::Away));
const FALLBACK: PresentationMode = PresentationMode::new(Some(HvacMode::Off), None);

/// Presentation of one unit for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitPresentation {
    pub kind: UnitKind,
    pub name: String,
    pub mode: PresentationMode,
    pub target_temperature: Option<Temperature>,
    pub current_temperature: Option<Temperature>,
}

pub fn resolve(unit: &ControlUnit, installation: &Installation) -> PresentationMode {
    match active_layer(unit, installation) {
        ActiveLayer::Holiday(_) => HOLIDAY,
        ActiveLayer::QuickMode(kind) => {
            quick_mode_presentation(unit.kind, kind).unwrap_or_else(|| base_presentation(unit))
        }
        ActiveLayer::QuickVeto => PresentationMode::new(heating(unit), Some(Preset::QuickVeto)),
        ActiveLayer::Base(_) => base_presentation(unit),
    }
}

/// Target temperature the unit is currently heading for.
pub fn active_target(unit: &ControlUnit, installation: &Installation) -> Option<Temperature> {
    match active_layer(unit, installation) {
        ActiveLayer::Holiday(holiday) => Some(holiday.target_temperature),
        ActiveLayer::QuickVeto => unit.quick_veto.as_ref().map(|v| v.target_temperature),
        ActiveLayer::QuickMode(QuickModeKind::SystemOff) => None,
        ActiveLayer::QuickMode(_) | ActiveLayer::Base(_) => unit.target_temperature,
    }
}

/// Resolves every presentable unit of the installation, keyed by unit id.
pub fn presentations(installation: &Installation) -> BTreeMap<String, UnitPresentation> {
    installation
        .units
        .iter()
        .filter(|u| u.is_presentable())
        .map(|u| {
            (
                u.id.clone(),
                UnitPresentation {
                    kind: u.kind,
                    name: u.name.clone(),
                    mode: resolve(u, installation),
                    target_temperature: active_target(u, installation),
                    current_temperature: u.current_temperature,
                },
            )
        })
        .collect()
}

/// Fixed (unit kind, quick mode) table. `None` means the quick mode does not
/// apply to the kind.
pub fn quick_mode_presentation(kind: UnitKind, quick_mode: QuickModeKind) -> Option<PresentationMode> {
    use HvacMode::*;
    use QuickModeKind::*;
    use UnitKind::*;

    let (hvac, preset) = match (kind, quick_mode) {
        (_, SystemOff) => (Some(Off), Some(Preset::SystemOff)),

        (Zone, OneDayAway) => (Some(Off), Some(Preset::Away)),
        (Zone, Party) => (Some(Heat), Some(Preset::Party)),
        (Zone, VentilationBoost) => (Some(FanOnly), None),
        (Zone, CoolingForXDays) => (Some(Cool), Some(Preset::CoolingForXDays)),
        (Zone, OneDayAtHome) => (Some(Auto), Some(Preset::Home)),
        (Zone, HotWaterBoost) => return None,

        (Room, _) => return None,

        (HotWater, HotWaterBoost) => (Some(Heat), Some(Preset::Boost)),
        (HotWater, OneDayAway) => (Some(Off), Some(Preset::Away)),
        (HotWater, VentilationBoost | OneDayAtHome | Party | CoolingForXDays) => return None,

        (Ventilation, VentilationBoost) => (Some(FanOnly), Some(Preset::Boost)),
        (Ventilation, OneDayAway) => (Some(Off), Some(Preset::Away)),
        (Ventilation, HotWaterBoost | OneDayAtHome | Party | CoolingForXDays) => return None,
    };
    Some(PresentationMode::new(hvac, preset))
}

/// Fixed (unit kind, base mode) table. Base modes a kind does not support
/// fall back to off.
pub fn base_presentation(unit: &ControlUnit) -> PresentationMode {
    use HvacMode::*;
    use UnitKind::*;

    let (hvac, preset) = match (unit.kind, unit.base_mode) {
        (_, BaseMode::Auto) => (Some(Auto), Some(Preset::Comfort)),
        (_, BaseMode::Off) => (Some(Off), None),

        (Zone, BaseMode::Day) => (heating(unit), Some(Preset::Home)),
        (Zone, BaseMode::Night) => (heating(unit), Some(Preset::Sleep)),
        (Zone, BaseMode::On | BaseMode::Manual) => (cooling(unit), Some(Preset::CoolingOn)),

        (Room, BaseMode::Manual) => (heating(unit), Some(Preset::Home)),

        (HotWater, BaseMode::On) => (Some(Heat), None),

        (Ventilation, BaseMode::Day) => (Some(FanOnly), Some(Preset::Home)),
        (Ventilation, BaseMode::Night) => (Some(Off), Some(Preset::Sleep)),

        (Zone, BaseMode::Unknown)
        | (Room, BaseMode::On | BaseMode::Day | BaseMode::Night | BaseMode::Unknown)
        | (HotWater, BaseMode::Manual | BaseMode::Day | BaseMode::Night | BaseMode::Unknown)
        | (Ventilation, BaseMode::On | BaseMode::Manual | BaseMode::Unknown) => {
            warn!(
                unit = %unit.id,
                kind = %unit.kind,
                mode = unit.base_mode.as_vendor_str(),
                "unsupported base mode, presenting as off"
            );
            return FALLBACK;
        }
    };
    PresentationMode::new(hvac, preset)
}

fn heating(unit: &ControlUnit) -> Option<HvacMode> {
    (unit.active_function == ActiveFunction::Heating).then_some(HvacMode::Heat)
}

fn cooling(unit: &ControlUnit) -> Option<HvacMode> {
    (unit.active_function == ActiveFunction::Cooling).then_some(HvacMode::Cool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precedence::affects;

    #[test]
    fn quick_mode_table_matches_relevance() {
        for kind in UnitKind::ALL {
            for quick_mode in QuickModeKind::ALL {
                assert_eq!(
                    quick_mode_presentation(kind, quick_mode).is_some(),
                    affects(quick_mode, kind),
                    "{kind} / {quick_mode}"
                );
            }
        }
    }

    #[test]
    fn base_table_for_idle_units() {
        use HvacMode::*;
        use UnitKind::*;

        for kind in UnitKind::ALL {
            for mode in BaseMode::ALL {
                let expected = match (kind, mode) {
                    (_, BaseMode::Auto) => PresentationMode::new(Some(Auto), Some(Preset::Comfort)),
                    (Zone, BaseMode::Day) => PresentationMode::new(None, Some(Preset::Home)),
                    (Zone, BaseMode::Night) => PresentationMode::new(None, Some(Preset::Sleep)),
                    (Zone, BaseMode::On | BaseMode::Manual) => {
                        PresentationMode::new(None, Some(Preset::CoolingOn))
                    }
                    (Room, BaseMode::Manual) => PresentationMode::new(None, Some(Preset::Home)),
                    (HotWater, BaseMode::On) => PresentationMode::new(Some(Heat), None),
                    (Ventilation, BaseMode::Day) => PresentationMode::new(Some(FanOnly), Some(Preset::Home)),
                    (Ventilation, BaseMode::Night) => PresentationMode::new(Some(Off), Some(Preset::Sleep)),
                    _ => FALLBACK,
                };
                let unit = ControlUnit::new("u", kind, mode);
                assert_eq!(base_presentation(&unit), expected, "{kind} / {mode:?}");
            }
        }
    }

    #[test]
    fn quick_veto_shows_heat_only_while_heating() {
        let inst = Installation::new(chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let veto = crate::snapshot::QuickVeto::new(
            Temperature::from_celsius(24.0),
            std::time::Duration::from_secs(3600),
        );
        let zone = ControlUnit::new("z", UnitKind::Zone, BaseMode::Auto).with_quick_veto(veto);

        let cooling = zone.clone().with_active_function(ActiveFunction::Cooling);
        assert_eq!(resolve(&cooling, &inst), PresentationMode::new(None, Some(Preset::QuickVeto)));
        let heating = zone.with_active_function(ActiveFunction::Heating);
        assert_eq!(
            resolve(&heating, &inst),
            PresentationMode::new(Some(HvacMode::Heat), Some(Preset::QuickVeto))
        );
    }

    #[test]
    fn zone_day_shows_heat_only_while_heating() {
        let zone = ControlUnit::new("z", UnitKind::Zone, BaseMode::Day);
        assert_eq!(
            base_presentation(&zone),
            PresentationMode::new(None, Some(Preset::Home))
        );
        let zone = zone.with_active_function(ActiveFunction::Heating);
        assert_eq!(
            base_presentation(&zone),
            PresentationMode::new(Some(HvacMode::Heat), Some(Preset::Home))
        );
    }

    #[test]
    fn unsupported_base_mode_falls_back_to_off() {
        let room = ControlUnit::new("r", UnitKind::Room, BaseMode::Night);
        assert_eq!(base_presentation(&room), FALLBACK);
        let dhw = ControlUnit::new("d", UnitKind::HotWater, BaseMode::Unknown);
        assert_eq!(base_presentation(&dhw), FALLBACK);
    }
}
