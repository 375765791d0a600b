//! State store of the per-probe accumulators.

use async_trait::async_trait;

use crate::models::{Accumulator, ProbeId};
use crate::prelude::*;

#[cfg(test)]
pub mod memory;
pub mod redis;

/// Durable per-probe accumulator storage.
///
/// `load` never fails with «not found»: an absent record is a valid state
/// and loads as an empty accumulator. `save` is a per-key upsert; a `save`
/// followed by a `load` of the same id returns the just-saved record.
#[async_trait]
pub trait AccumulatorStore {
    async fn load(&mut self, id: ProbeId) -> Result<Accumulator>;

    async fn save(&mut self, accumulator: &Accumulator) -> Result;
}
