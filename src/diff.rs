use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::resolver::UnitPresentation;
use crate::snapshot::Installation;
use crate::types::Event;

/// Leaf-level changes between two JSON documents as (path, old, new).
/// Keys missing from `current` are not reported.
pub(crate) fn diff_values(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = if path_prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{path_prefix}.{key}")
                };
                match prev_map.get(key) {
                    Some(prev_val) => diff_values(prev_val, curr_val, &path, changes),
                    None if curr_val.is_object() => {
                        diff_values(&Value::Object(Map::new()), curr_val, &path, changes)
                    }
                    None => changes.push((path, Value::Null, curr_val.clone())),
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}

pub(crate) fn diff_presentations(
    previous: &BTreeMap<String, UnitPresentation>,
    current: &BTreeMap<String, UnitPresentation>,
    events: &mut Vec<Event>,
) {
    for (unit_id, curr) in current {
        match previous.get(unit_id) {
            None => events.push(Event::UnitAppeared {
                unit_id: unit_id.clone(),
                kind: curr.kind,
                mode: curr.mode,
            }),
            Some(prev) => {
                if prev.mode != curr.mode {
                    events.push(Event::PresentationChanged {
                        unit_id: unit_id.clone(),
                        kind: curr.kind,
                        from: prev.mode,
                        to: curr.mode,
                    });
                }
                if prev.target_temperature != curr.target_temperature {
                    events.push(Event::TargetTemperatureChanged {
                        unit_id: unit_id.clone(),
                        temp: curr.target_temperature,
                    });
                }
            }
        }
    }
    for (unit_id, prev) in previous {
        if !current.contains_key(unit_id) {
            events.push(Event::UnitDisappeared {
                unit_id: unit_id.clone(),
                kind: prev.kind,
            });
        }
    }
}

/// Installation-wide changes. With no previous snapshot, only active
/// overrides and errors are reported.
pub(crate) fn diff_installation(
    previous: Option<&Installation>,
    current: &Installation,
    events: &mut Vec<Event>,
) {
    let prev_holiday = previous.is_some_and(|p| p.active_holiday().is_some());
    let curr_holiday = current.active_holiday().is_some();
    if prev_holiday != curr_holiday {
        events.push(Event::HolidayModeChanged { active: curr_holiday });
    }

    let prev_quick = previous.and_then(|p| p.quick_mode.map(|q| q.kind));
    let curr_quick = current.quick_mode.map(|q| q.kind);
    if prev_quick != curr_quick {
        events.push(Event::QuickModeChanged { mode: curr_quick });
    }

    let errors_changed = match previous {
        Some(p) => p.errors != current.errors,
        None => current.has_errors(),
    };
    if errors_changed {
        events.push(Event::ErrorsChanged {
            errors: current.errors.iter().map(|e| e.0.clone()).collect(),
        });
    }
}
