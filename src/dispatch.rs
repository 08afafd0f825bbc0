//! Translates user intents into ordered installation mutations.
//!
//! Dispatch is a pure function of the intent, the targeted unit, the
//! snapshot the host last saw and the duration policy. It never talks to the
//! installation; the emitted list is applied in order by a transport.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::duration::DurationPolicy;
use crate::precedence::relevant_quick_mode;
use crate::snapshot::{BaseMode, ControlUnit, Installation, QuickModeKind};
use crate::types::{HvacMode, Preset, Temperature, UnitKind};
use crate::{Error, Result};

pub const MIN_HOT_WATER_TEMP: f64 = 35.0;
pub const MAX_HOT_WATER_TEMP: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetTemperature {
        value: Temperature,
        duration: Option<Duration>,
    },
    SetHvacMode(HvacMode),
    SetPreset(Preset),
    SetQuickVeto {
        temperature: Temperature,
        duration: Option<Duration>,
    },
    RemoveQuickVeto,
    SetQuickMode {
        kind: QuickModeKind,
        duration_days: Option<u8>,
    },
    RemoveQuickMode,
    SetHolidayMode {
        start: NaiveDate,
        end: NaiveDate,
        temperature: Temperature,
    },
    RemoveHolidayMode,
}

impl Intent {
    pub fn set_temperature(celsius: f64) -> Self {
        Intent::SetTemperature {
            value: Temperature::from_celsius(celsius),
            duration: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::SetTemperature { .. } => "set_temperature",
            Intent::SetHvacMode(_) => "set_hvac_mode",
            Intent::SetPreset(_) => "set_preset",
            Intent::SetQuickVeto { .. } => "set_quick_veto",
            Intent::RemoveQuickVeto => "remove_quick_veto",
            Intent::SetQuickMode { .. } => "set_quick_mode",
            Intent::RemoveQuickMode => "remove_quick_mode",
            Intent::SetHolidayMode { .. } => "set_holiday_mode",
            Intent::RemoveHolidayMode => "remove_holiday_mode",
        }
    }

    /// Quick mode and holiday intents act on the whole installation.
    pub fn is_installation_scoped(&self) -> bool {
        matches!(
            self,
            Intent::SetQuickMode { .. }
                | Intent::RemoveQuickMode
                | Intent::SetHolidayMode { .. }
                | Intent::RemoveHolidayMode
        )
    }
}

/// One change the transport applies to the installation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    SetBaseMode {
        unit_id: String,
        kind: UnitKind,
        mode: BaseMode,
    },
    CreateQuickVeto {
        unit_id: String,
        kind: UnitKind,
        temperature: Temperature,
        #[serde(rename = "duration_minutes", serialize_with = "as_minutes")]
        duration: Duration,
    },
    ClearQuickVeto {
        unit_id: String,
        kind: UnitKind,
    },
    SetQuickMode {
        kind: QuickModeKind,
        duration_days: Option<u8>,
    },
    ClearQuickMode,
    SetHolidayMode {
        start: NaiveDate,
        end: NaiveDate,
        temperature: Temperature,
    },
    ClearHolidayMode,
    UpdateManualTargetTemperature {
        unit_id: String,
        temperature: Temperature,
    },
    SetHotWaterSetpoint {
        unit_id: String,
        temperature: Temperature,
    },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetBaseMode { .. } => "set_base_mode",
            Mutation::CreateQuickVeto { .. } => "create_quick_veto",
            Mutation::ClearQuickVeto { .. } => "clear_quick_veto",
            Mutation::SetQuickMode { .. } => "set_quick_mode",
            Mutation::ClearQuickMode => "clear_quick_mode",
            Mutation::SetHolidayMode { .. } => "set_holiday_mode",
            Mutation::ClearHolidayMode => "clear_holiday_mode",
            Mutation::UpdateManualTargetTemperature { .. } => "update_manual_target_temperature",
            Mutation::SetHotWaterSetpoint { .. } => "set_hot_water_setpoint",
        }
    }
}

fn as_minutes<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs() / 60)
}

/// What a mode or preset command switches the unit to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Base(BaseMode),
    QuickMode(QuickModeKind),
}

pub fn dispatch(
    intent: &Intent,
    unit: &ControlUnit,
    installation: &Installation,
    policy: &DurationPolicy,
) -> Result<Vec<Mutation>> {
    if intent.is_installation_scoped() {
        return dispatch_installation(intent, installation, policy);
    }
    if !unit.is_presentable() {
        return Err(Error::UnitDisabled(unit.id.clone()));
    }

    let mutations = match intent {
        Intent::SetTemperature { value, duration } => {
            set_temperature(unit, installation, policy, *value, *duration)?
        }
        Intent::SetHvacMode(mode) => {
            let target = hvac_target(unit, installation, *mode)
                .ok_or_else(|| unsupported(unit.kind, intent))?;
            switch_to(unit, installation, policy, target)?
        }
        Intent::SetPreset(preset) => {
            let target = preset_target(unit, *preset).ok_or_else(|| unsupported(unit.kind, intent))?;
            switch_to(unit, installation, policy, target)?
        }
        Intent::SetQuickVeto { temperature, duration } => {
            check_setpoint(unit.kind, *temperature)?;
            let duration = policy.veto(unit.kind, *duration)?;
            let mut mutations = clear_veto(unit);
            mutations.push(create_veto(unit, *temperature, duration));
            mutations
        }
        Intent::RemoveQuickVeto => {
            policy.default_veto(unit.kind)?;
            clear_veto(unit)
        }
        Intent::SetQuickMode { .. }
        | Intent::RemoveQuickMode
        | Intent::SetHolidayMode { .. }
        | Intent::RemoveHolidayMode => unreachable!("installation scoped intents return early"),
    };

    debug!(
        unit = %unit.id,
        kind = %unit.kind,
        intent = intent.name(),
        count = mutations.len(),
        "dispatched intent"
    );
    Ok(mutations)
}

/// Dispatch for quick mode and holiday intents, which never target a unit.
pub fn dispatch_installation(
    intent: &Intent,
    installation: &Installation,
    policy: &DurationPolicy,
) -> Result<Vec<Mutation>> {
    let mutations = match intent {
        Intent::SetQuickMode { kind, duration_days } => {
            let duration_days = policy.quick_mode_days(*kind, *duration_days)?;
            let mut mutations = Vec::new();
            if installation.quick_mode.is_some() {
                mutations.push(Mutation::ClearQuickMode);
            }
            mutations.push(Mutation::SetQuickMode {
                kind: *kind,
                duration_days,
            });
            mutations
        }
        Intent::RemoveQuickMode => installation
            .quick_mode
            .map(|_| Mutation::ClearQuickMode)
            .into_iter()
            .collect(),
        Intent::SetHolidayMode { start, end, temperature } => {
            if end < start {
                return Err(Error::InvalidDateRange {
                    start: *start,
                    end: *end,
                });
            }
            if !temperature.is_valid_setpoint() {
                return Err(Error::InvalidTemperature(temperature.celsius()));
            }
            vec![Mutation::SetHolidayMode {
                start: *start,
                end: *end,
                temperature: Temperature::from_celsius(temperature.to_setpoint()),
            }]
        }
        Intent::RemoveHolidayMode => installation
            .holiday_mode
            .as_ref()
            .map(|_| Mutation::ClearHolidayMode)
            .into_iter()
            .collect(),
        _ => return Err(Error::UnitRequired(intent.name())),
    };

    debug!(intent = intent.name(), count = mutations.len(), "dispatched installation intent");
    Ok(mutations)
}

/// Clears the holiday and the quick mode, each only if it currently applies to the unit.
pub fn remove_active_overrides(unit: &ControlUnit, installation: &Installation) -> Vec<Mutation> {
    let mut mutations = Vec::new();
    if installation.active_holiday().is_some() {
        mutations.push(Mutation::ClearHolidayMode);
    }
    if relevant_quick_mode(installation, unit.kind).is_some() {
        mutations.push(Mutation::ClearQuickMode);
    }
    mutations
}

fn set_temperature(
    unit: &ControlUnit,
    installation: &Installation,
    policy: &DurationPolicy,
    value: Temperature,
    duration: Option<Duration>,
) -> Result<Vec<Mutation>> {
    check_setpoint(unit.kind, value)?;
    let temperature = Temperature::from_celsius(value.to_setpoint());

    let mut mutations = remove_active_overrides(unit, installation);
    match unit.kind {
        UnitKind::Room if unit.quick_veto.is_none() && unit.base_mode == BaseMode::Manual => {
            mutations.push(Mutation::UpdateManualTargetTemperature {
                unit_id: unit.id.clone(),
                temperature,
            });
        }
        UnitKind::Room | UnitKind::Zone => {
            let duration = policy.veto(unit.kind, duration)?;
            mutations.extend(clear_veto(unit));
            mutations.push(create_veto(unit, temperature, duration));
        }
        UnitKind::HotWater => {
            // clearing a holiday or quick mode leaves the tank in its schedule
            if unit.base_mode == BaseMode::Off || !mutations.is_empty() {
                mutations.push(Mutation::SetBaseMode {
                    unit_id: unit.id.clone(),
                    kind: unit.kind,
                    mode: BaseMode::On,
                });
            }
            mutations.push(Mutation::SetHotWaterSetpoint {
                unit_id: unit.id.clone(),
                temperature,
            });
        }
        UnitKind::Ventilation => {
            return Err(Error::UnsupportedIntentForKind {
                kind: unit.kind,
                intent: "set_temperature".to_string(),
            });
        }
    }
    Ok(mutations)
}

fn switch_to(
    unit: &ControlUnit,
    installation: &Installation,
    policy: &DurationPolicy,
    target: Target,
) -> Result<Vec<Mutation>> {
    let mut mutations = remove_active_overrides(unit, installation);
    mutations.extend(clear_veto(unit));
    match target {
        Target::Base(mode) => mutations.push(Mutation::SetBaseMode {
            unit_id: unit.id.clone(),
            kind: unit.kind,
            mode,
        }),
        Target::QuickMode(kind) => {
            let duration_days = policy.quick_mode_days(kind, None)?;
            // a quick mode not affecting this unit was left alone above, but
            // only one quick mode can be active at a time
            if installation.quick_mode.is_some() && !mutations.contains(&Mutation::ClearQuickMode) {
                mutations.push(Mutation::ClearQuickMode);
            }
            mutations.push(Mutation::SetQuickMode { kind, duration_days });
        }
    }
    Ok(mutations)
}

fn hvac_target(unit: &ControlUnit, installation: &Installation, mode: HvacMode) -> Option<Target> {
    use HvacMode::*;
    use UnitKind::*;

    let target = match (unit.kind, mode) {
        (Zone | Room | HotWater | Ventilation, Auto) => Target::Base(BaseMode::Auto),
        (Zone | Room | HotWater, Off) => Target::Base(BaseMode::Off),
        (Zone, FanOnly) if installation.has_ventilation() => {
            Target::QuickMode(QuickModeKind::VentilationBoost)
        }
        (HotWater, Heat) => Target::Base(BaseMode::On),
        (Ventilation, FanOnly) => Target::Base(BaseMode::Day),
        (Ventilation, Off) => Target::Base(BaseMode::Night),
        _ => return None,
    };
    Some(target)
}

fn preset_target(unit: &ControlUnit, preset: Preset) -> Option<Target> {
    use QuickModeKind as Qm;
    use UnitKind::*;

    let target = match (unit.kind, preset) {
        (_, Preset::Comfort) => Target::Base(BaseMode::Auto),
        (_, Preset::SystemOff) => Target::QuickMode(Qm::SystemOff),

        (Zone, Preset::Home) => Target::Base(BaseMode::Day),
        (Zone, Preset::Sleep) => Target::Base(BaseMode::Night),
        (Zone, Preset::CoolingOn) if unit.cooling => Target::Base(BaseMode::On),
        (Zone, Preset::Away) => Target::QuickMode(Qm::OneDayAway),
        (Zone, Preset::Party) => Target::QuickMode(Qm::Party),
        (Zone, Preset::CoolingForXDays) if unit.cooling => Target::QuickMode(Qm::CoolingForXDays),

        (Room, Preset::Home) => Target::Base(BaseMode::Manual),

        (HotWater, Preset::Boost) => Target::QuickMode(Qm::HotWaterBoost),
        (HotWater, Preset::Away) => Target::Base(BaseMode::Off),

        (Ventilation, Preset::Home) => Target::Base(BaseMode::Day),
        (Ventilation, Preset::Sleep) => Target::Base(BaseMode::Night),
        (Ventilation, Preset::Boost) => Target::QuickMode(Qm::VentilationBoost),
        _ => return None,
    };
    Some(target)
}

fn clear_veto(unit: &ControlUnit) -> Vec<Mutation> {
    match (unit.kind, &unit.quick_veto) {
        (UnitKind::Zone | UnitKind::Room, Some(_)) => vec![Mutation::ClearQuickVeto {
            unit_id: unit.id.clone(),
            kind: unit.kind,
        }],
        _ => Vec::new(),
    }
}

fn create_veto(unit: &ControlUnit, temperature: Temperature, duration: Duration) -> Mutation {
    Mutation::CreateQuickVeto {
        unit_id: unit.id.clone(),
        kind: unit.kind,
        temperature: Temperature::from_celsius(temperature.to_setpoint()),
        duration,
    }
}

fn check_setpoint(kind: UnitKind, temperature: Temperature) -> Result<()> {
    let valid = match kind {
        UnitKind::HotWater => {
            (MIN_HOT_WATER_TEMP..=MAX_HOT_WATER_TEMP).contains(&temperature.celsius())
        }
        _ => temperature.is_valid_setpoint(),
    };
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidTemperature(temperature.celsius()))
    }
}

fn unsupported(kind: UnitKind, intent: &Intent) -> Error {
    Error::UnsupportedIntentForKind {
        kind,
        intent: format!("{intent:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{HolidayMode, QuickMode, QuickVeto};

    fn installation() -> Installation {
        Installation::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
    }

    fn with_quick_mode(kind: QuickModeKind) -> Installation {
        let mut inst = installation();
        inst.quick_mode = Some(QuickMode::new(kind));
        inst
    }

    fn with_holiday() -> Installation {
        let mut inst = installation();
        inst.holiday_mode = Some(HolidayMode {
            start_date: NaiveDate::from_ymd_opt(2026, 2, 25).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            target_temperature: Temperature::from_celsius(15.0),
        });
        inst
    }

    #[test]
    fn overrides_only_cleared_when_relevant() {
        let zone = ControlUnit::new("z", UnitKind::Zone, BaseMode::Auto);
        assert!(remove_active_overrides(&zone, &with_quick_mode(QuickModeKind::HotWaterBoost)).is_empty());
        assert_eq!(
            remove_active_overrides(&zone, &with_quick_mode(QuickModeKind::Party)),
            vec![Mutation::ClearQuickMode]
        );

        let mut both = with_holiday();
        both.quick_mode = Some(QuickMode::new(QuickModeKind::SystemOff));
        assert_eq!(
            remove_active_overrides(&zone, &both),
            vec![Mutation::ClearHolidayMode, Mutation::ClearQuickMode]
        );
    }

    #[test]
    fn expired_holiday_is_not_cleared() {
        let mut inst = with_holiday();
        inst.date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let room = ControlUnit::new("r", UnitKind::Room, BaseMode::Auto);
        assert!(remove_active_overrides(&room, &inst).is_empty());
    }

    #[test]
    fn existing_veto_is_replaced() {
        let zone = ControlUnit::new("z", UnitKind::Zone, BaseMode::Auto).with_quick_veto(QuickVeto::new(
            Temperature::from_celsius(19.0),
            Duration::from_secs(600),
        ));
        let mutations = dispatch(
            &Intent::set_temperature(21.0),
            &zone,
            &installation(),
            &DurationPolicy::default(),
        )
        .unwrap();
        assert_eq!(mutations.len(), 2);
        assert_eq!(mutations[0].name(), "clear_quick_veto");
        assert_eq!(mutations[1].name(), "create_quick_veto");
    }

    #[test]
    fn hot_water_temperature_switches_on_when_off() {
        let dhw = ControlUnit::new("dhw", UnitKind::HotWater, BaseMode::Off);
        let mutations = dispatch(
            &Intent::set_temperature(50.0),
            &dhw,
            &with_quick_mode(QuickModeKind::HotWaterBoost),
            &DurationPolicy::default(),
        )
        .unwrap();
        assert_eq!(
            mutations,
            vec![
                Mutation::ClearQuickMode,
                Mutation::SetBaseMode {
                    unit_id: "dhw".into(),
                    kind: UnitKind::HotWater,
                    mode: BaseMode::On,
                },
                Mutation::SetHotWaterSetpoint {
                    unit_id: "dhw".into(),
                    temperature: Temperature::from_celsius(50.0),
                },
            ]
        );
    }

    #[test]
    fn setpoints_are_rounded_to_half_degrees() {
        let room = ControlUnit::new("r", UnitKind::Room, BaseMode::Manual);
        let mutations = dispatch(
            &Intent::set_temperature(21.3),
            &room,
            &installation(),
            &DurationPolicy::default(),
        )
        .unwrap();
        assert_eq!(
            mutations,
            vec![Mutation::UpdateManualTargetTemperature {
                unit_id: "r".into(),
                temperature: Temperature::from_celsius(21.5),
            }]
        );
    }

    #[test]
    fn mutation_serializes_with_tag() {
        let m = Mutation::CreateQuickVeto {
            unit_id: "z".into(),
            kind: UnitKind::Zone,
            temperature: Temperature::from_celsius(21.0),
            duration: Duration::from_secs(6 * 3600),
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["type"], "create_quick_veto");
        assert_eq!(v["kind"], "zone");
        assert_eq!(v["duration_minutes"], 360);
        assert_eq!(v["temperature"], 21.0);
    }
}
