use serde_json::{json, Value};
use uuid::Uuid;

use crate::dispatch::Mutation;
use crate::types::UnitKind;

/// An ordered list of mutations produced by one dispatched intent.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationPlan {
    pub id: Uuid,
    pub unit_id: Option<String>,
    pub intent: &'static str,
    pub mutations: Vec<Mutation>,
}

impl MutationPlan {
    pub fn new(unit_id: Option<String>, intent: &'static str, mutations: Vec<Mutation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            unit_id,
            intent,
            mutations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }
}

/// Vendor REST call a transport has to issue for one mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

impl VendorRequest {
    fn put(path: String, body: Value) -> Self {
        Self {
            method: "PUT",
            path,
            body: Some(body),
        }
    }

    fn delete(path: String) -> Self {
        Self {
            method: "DELETE",
            path,
            body: None,
        }
    }
}

fn unit_path(kind: UnitKind, unit_id: &str) -> String {
    match kind {
        UnitKind::Zone => format!("/zones/{unit_id}"),
        UnitKind::Room => format!("/rooms/{unit_id}"),
        UnitKind::HotWater => format!("/dhw/{unit_id}/hotwater"),
        UnitKind::Ventilation => format!("/ventilation/{unit_id}/fan"),
    }
}

/// Path and body relative to the facility's system control root.
pub fn vendor_request(mutation: &Mutation) -> VendorRequest {
    match mutation {
        Mutation::SetBaseMode { unit_id, kind, mode } => {
            let base = unit_path(*kind, unit_id);
            match kind {
                UnitKind::Zone => VendorRequest::put(
                    format!("{base}/heating/configuration/mode"),
                    json!({ "mode": mode.as_vendor_str() }),
                ),
                UnitKind::Room => VendorRequest::put(
                    format!("{base}/configuration/operationMode"),
                    json!({ "operationMode": mode.as_vendor_str() }),
                ),
                UnitKind::HotWater | UnitKind::Ventilation => VendorRequest::put(
                    format!("{base}/configuration/operation_mode"),
                    json!({ "operation_mode": mode.as_vendor_str() }),
                ),
            }
        }
        Mutation::CreateQuickVeto {
            unit_id,
            kind,
            temperature,
            duration,
        } => {
            let minutes = duration.as_secs() / 60;
            match kind {
                UnitKind::Room => VendorRequest::put(
                    format!("{}/configuration/quickVeto", unit_path(*kind, unit_id)),
                    json!({ "temperatureSetpoint": temperature.celsius(), "duration": minutes }),
                ),
                _ => VendorRequest::put(
                    format!("{}/configuration/quick-veto", unit_path(*kind, unit_id)),
                    json!({ "setpoint_temperature": temperature.celsius(), "duration": minutes }),
                ),
            }
        }
        Mutation::ClearQuickVeto { unit_id, kind } => match kind {
            UnitKind::Room => {
                VendorRequest::delete(format!("{}/configuration/quickVeto", unit_path(*kind, unit_id)))
            }
            _ => VendorRequest::delete(format!("{}/configuration/quick-veto", unit_path(*kind, unit_id))),
        },
        Mutation::SetQuickMode {
            kind,
            duration_days,
        } => VendorRequest::put(
            "/configuration/quickmode".to_string(),
            json!({
                "quickmode": {
                    "quickmode": kind.as_vendor_str(),
                    "duration": duration_days,
                }
            }),
        ),
        Mutation::ClearQuickMode => VendorRequest::delete("/configuration/quickmode".to_string()),
        Mutation::SetHolidayMode {
            start,
            end,
            temperature,
        } => VendorRequest::put(
            "/configuration/holidaymode".to_string(),
            json!({
                "holidaymode": {
                    "active": true,
                    "start_date": start.format("%Y-%m-%d").to_string(),
                    "end_date": end.format("%Y-%m-%d").to_string(),
                    "temperature_setpoint": temperature.celsius(),
                }
            }),
        ),
        Mutation::ClearHolidayMode => VendorRequest::delete("/configuration/holidaymode".to_string()),
        Mutation::UpdateManualTargetTemperature {
            unit_id,
            temperature,
        } => VendorRequest::put(
            format!("{}/configuration/temperatureSetpoint", unit_path(UnitKind::Room, unit_id)),
            json!({ "temperatureSetpoint": temperature.celsius() }),
        ),
        Mutation::SetHotWaterSetpoint {
            unit_id,
            temperature,
        } => VendorRequest::put(
            format!(
                "{}/configuration/temperature_setpoint",
                unit_path(UnitKind::HotWater, unit_id)
            ),
            json!({ "temperature_setpoint": temperature.celsius() }),
        ),
    }
}

/// A whole plan as written to the journal.
pub fn plan_message(plan: &MutationPlan) -> Value {
    let mutations: Vec<Value> = plan
        .mutations
        .iter()
        .map(|m| serde_json::to_value(m).unwrap_or(Value::Null))
        .collect();
    json!({
        "plan": plan.id.to_string(),
        "intent": plan.intent,
        "unit": plan.unit_id,
        "mutations": mutations,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::snapshot::{BaseMode, QuickModeKind};
    use crate::types::Temperature;

    #[test]
    fn zone_veto_request() {
        let req = vendor_request(&Mutation::CreateQuickVeto {
            unit_id: "Control_ZO1".into(),
            kind: UnitKind::Zone,
            temperature: Temperature::from_celsius(21.5),
            duration: Duration::from_secs(6 * 3600),
        });
        assert_eq!(req.method, "PUT");
        assert_eq!(req.path, "/zones/Control_ZO1/configuration/quick-veto");
        let body = req.body.unwrap();
        assert_eq!(body["setpoint_temperature"], 21.5);
        assert_eq!(body["duration"], 360);
    }

    #[test]
    fn room_base_mode_request() {
        let req = vendor_request(&Mutation::SetBaseMode {
            unit_id: "1".into(),
            kind: UnitKind::Room,
            mode: BaseMode::Manual,
        });
        assert_eq!(req.path, "/rooms/1/configuration/operationMode");
        assert_eq!(req.body.unwrap()["operationMode"], "MANUAL");
    }

    #[test]
    fn quick_mode_requests() {
        let req = vendor_request(&Mutation::SetQuickMode {
            kind: QuickModeKind::CoolingForXDays,
            duration_days: Some(3),
        });
        let body = req.body.unwrap();
        assert_eq!(body["quickmode"]["quickmode"], "QM_COOLING_FOR_X_DAYS");
        assert_eq!(body["quickmode"]["duration"], 3);

        let req = vendor_request(&Mutation::ClearQuickMode);
        assert_eq!(req.method, "DELETE");
        assert!(req.body.is_none());
    }

    #[test]
    fn holiday_request_dates() {
        let req = vendor_request(&Mutation::SetHolidayMode {
            start: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 7, 14).unwrap(),
            temperature: Temperature::from_celsius(15.0),
        });
        let body = req.body.unwrap();
        assert_eq!(body["holidaymode"]["start_date"], "2026-07-01");
        assert_eq!(body["holidaymode"]["end_date"], "2026-07-14");
    }

    #[test]
    fn plan_message_structure() {
        let plan = MutationPlan::new(
            Some("r1".into()),
            "remove_quick_veto",
            vec![Mutation::ClearQuickVeto {
                unit_id: "r1".into(),
                kind: UnitKind::Room,
            }],
        );
        let msg = plan_message(&plan);
        assert_eq!(msg["plan"], plan.id.to_string());
        assert_eq!(msg["intent"], "remove_quick_veto");
        assert_eq!(msg["unit"], "r1");
        assert_eq!(msg["mutations"][0]["type"], "clear_quick_veto");
        assert_eq!(msg.as_object().unwrap().len(), 4);
    }
}
