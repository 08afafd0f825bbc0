//! Which override layer wins for a unit.
//!
//! Holiday outranks quick mode, quick mode outranks quick veto, quick veto
//! outranks the base schedule. Hot water and ventilation have no quick veto
//! layer, so a veto reported for them is never considered.

use crate::snapshot::{BaseMode, ControlUnit, HolidayMode, Installation, QuickModeKind};
use crate::types::UnitKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerTag {
    Holiday,
    QuickMode,
    QuickVeto,
    Base,
}

/// The single layer that determines a unit's presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveLayer<'a> {
    Holiday(&'a HolidayMode),
    QuickMode(QuickModeKind),
    QuickVeto,
    Base(BaseMode),
}

impl ActiveLayer<'_> {
    pub fn tag(&self) -> LayerTag {
        match self {
            ActiveLayer::Holiday(_) => LayerTag::Holiday,
            ActiveLayer::QuickMode(_) => LayerTag::QuickMode,
            ActiveLayer::QuickVeto => LayerTag::QuickVeto,
            ActiveLayer::Base(_) => LayerTag::Base,
        }
    }
}

const WITH_VETO: &[LayerTag] = &[
    LayerTag::Holiday,
    LayerTag::QuickMode,
    LayerTag::QuickVeto,
    LayerTag::Base,
];

const WITHOUT_VETO: &[LayerTag] = &[LayerTag::Holiday, LayerTag::QuickMode, LayerTag::Base];

/// Layers a unit kind can be in, highest precedence first.
pub fn precedence(kind: UnitKind) -> &'static [LayerTag] {
    match kind {
        UnitKind::Zone | UnitKind::Room => WITH_VETO,
        UnitKind::HotWater | UnitKind::Ventilation => WITHOUT_VETO,
    }
}

/// Whether a quick mode changes the behaviour of a unit kind.
pub fn affects(quick_mode: QuickModeKind, kind: UnitKind) -> bool {
    use QuickModeKind::*;
    use UnitKind::*;

    match (quick_mode, kind) {
        (SystemOff, _) => true,
        (HotWaterBoost, HotWater) => true,
        (VentilationBoost, Zone | Ventilation) => true,
        (OneDayAway, Zone | HotWater | Ventilation) => true,
        (OneDayAtHome | Party | CoolingForXDays, Zone) => true,
        _ => false,
    }
}

/// The quick mode of the installation if it applies to `kind`.
pub fn relevant_quick_mode(installation: &Installation, kind: UnitKind) -> Option<QuickModeKind> {
    installation
        .quick_mode
        .map(|q| q.kind)
        .filter(|q| affects(*q, kind))
}

pub fn active_layer<'a>(unit: &ControlUnit, installation: &'a Installation) -> ActiveLayer<'a> {
    for tag in precedence(unit.kind) {
        let layer = match tag {
            LayerTag::Holiday => installation.active_holiday().map(ActiveLayer::Holiday),
            LayerTag::QuickMode => {
                relevant_quick_mode(installation, unit.kind).map(ActiveLayer::QuickMode)
            }
            LayerTag::QuickVeto => unit.quick_veto.as_ref().map(|_| ActiveLayer::QuickVeto),
            LayerTag::Base => Some(ActiveLayer::Base(unit.base_mode)),
        };
        if let Some(layer) = layer {
            return layer;
        }
    }
    ActiveLayer::Base(unit.base_mode)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::snapshot::{QuickMode, QuickVeto};
    use crate::types::Temperature;

    fn installation() -> Installation {
        Installation::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
    }

    fn veto() -> QuickVeto {
        QuickVeto::new(Temperature::from_celsius(22.0), Duration::from_secs(3600))
    }

    #[test]
    fn every_precedence_ends_with_base() {
        for kind in UnitKind::ALL {
            let layers = precedence(kind);
            assert_eq!(layers.first(), Some(&LayerTag::Holiday));
            assert_eq!(layers.last(), Some(&LayerTag::Base));
            assert!(layers.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn system_off_affects_everything() {
        for kind in UnitKind::ALL {
            assert!(affects(QuickModeKind::SystemOff, kind));
        }
    }

    #[test]
    fn boosts_only_affect_their_circuit() {
        assert!(affects(QuickModeKind::HotWaterBoost, UnitKind::HotWater));
        assert!(!affects(QuickModeKind::HotWaterBoost, UnitKind::Zone));
        assert!(!affects(QuickModeKind::HotWaterBoost, UnitKind::Room));
        assert!(affects(QuickModeKind::VentilationBoost, UnitKind::Zone));
        assert!(affects(QuickModeKind::VentilationBoost, UnitKind::Ventilation));
        assert!(!affects(QuickModeKind::VentilationBoost, UnitKind::HotWater));
    }

    #[test]
    fn rooms_only_follow_system_off() {
        for kind in QuickModeKind::ALL {
            assert_eq!(
                affects(kind, UnitKind::Room),
                kind == QuickModeKind::SystemOff,
                "{kind}"
            );
        }
    }

    #[test]
    fn veto_beats_base_but_not_quick_mode() {
        let zone = ControlUnit::new("z1", UnitKind::Zone, BaseMode::Auto).with_quick_veto(veto());
        let mut inst = installation();
        assert_eq!(active_layer(&zone, &inst), ActiveLayer::QuickVeto);

        inst.quick_mode = Some(QuickMode::new(QuickModeKind::Party));
        assert_eq!(
            active_layer(&zone, &inst),
            ActiveLayer::QuickMode(QuickModeKind::Party)
        );
    }

    #[test]
    fn irrelevant_quick_mode_falls_through_to_veto() {
        let zone = ControlUnit::new("z1", UnitKind::Zone, BaseMode::Auto).with_quick_veto(veto());
        let mut inst = installation();
        inst.quick_mode = Some(QuickMode::new(QuickModeKind::HotWaterBoost));
        assert_eq!(active_layer(&zone, &inst), ActiveLayer::QuickVeto);
    }

    #[test]
    fn hot_water_ignores_reported_veto() {
        let dhw = ControlUnit::new("dhw", UnitKind::HotWater, BaseMode::On).with_quick_veto(veto());
        assert_eq!(
            active_layer(&dhw, &installation()),
            ActiveLayer::Base(BaseMode::On)
        );
    }
}
