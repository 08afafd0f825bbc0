mod diff;
mod dispatch;
mod duration;
mod error;
mod logger;
mod precedence;
mod protocol;
mod reconciler;
mod resolver;
mod snapshot;
mod transport;
mod types;

pub use dispatch::{
    dispatch, dispatch_installation, remove_active_overrides, Intent, Mutation, MAX_HOT_WATER_TEMP,
    MIN_HOT_WATER_TEMP,
};
pub use duration::{
    DurationPolicy, DEFAULT_COOLING_DAYS, DEFAULT_ROOM_VETO, MAX_QUICK_MODE_DAYS, MAX_ROOM_VETO,
    MIN_ROOM_VETO, ZONE_VETO,
};
pub use error::{DurationKind, Error, Result};
pub use logger::JournalMode;
pub use precedence::{active_layer, affects, precedence, relevant_quick_mode, ActiveLayer, LayerTag};
pub use protocol::{plan_message, vendor_request, MutationPlan, VendorRequest};
pub use reconciler::{Reconciler, ReconcilerBuilder};
pub use resolver::{
    active_target, base_presentation, presentations, quick_mode_presentation, resolve, UnitPresentation,
};
pub use snapshot::{
    ActiveFunction, BaseMode, ControlUnit, ErrorCode, HolidayMode, Installation, QuickMode, QuickModeKind,
    QuickVeto,
};
pub use transport::{apply_plan, MutationTransport};
pub use types::*;
