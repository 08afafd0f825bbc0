use std::future::Future;

use tracing::{debug, warn};

use crate::dispatch::Mutation;
use crate::protocol::MutationPlan;
use crate::{Error, Result};

/// Applies single mutations to the installation.
///
/// Implementations own the vendor session, retries are not expected: a
/// rejected mutation is reported upward as-is.
pub trait MutationTransport {
    fn apply(&mut self, mutation: &Mutation) -> impl Future<Output = std::result::Result<(), String>> + Send;
}

/// Applies a plan in order, stopping at the first rejection.
///
/// Mutations before the rejected one stay applied; the next snapshot shows
/// the partial state.
pub async fn apply_plan<T: MutationTransport>(transport: &mut T, plan: &MutationPlan) -> Result<()> {
    for (index, mutation) in plan.mutations.iter().enumerate() {
        debug!(plan = %plan.id, index, mutation = mutation.name(), "applying mutation");
        if let Err(reason) = transport.apply(mutation).await {
            warn!(plan = %plan.id, index, mutation = mutation.name(), %reason, "mutation rejected");
            return Err(Error::MutationRejected { index, reason });
        }
    }
    Ok(())
}
