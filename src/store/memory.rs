use async_trait::async_trait;

use crate::models::{Accumulator, ProbeId};
use crate::prelude::*;
use crate::store::AccumulatorStore;

/// Hash-map store used by the tests, same contract as the Redis one.
#[derive(Default)]
pub struct MemoryAccumulatorStore {
    records: AHashMap<ProbeId, Accumulator>,
}

impl MemoryAccumulatorStore {
    pub fn with_record(mut self, accumulator: Accumulator) -> Self {
        self.records.insert(accumulator.id, accumulator);
        self
    }

    pub fn record(&self, id: ProbeId) -> Option<&Accumulator> {
        self.records.get(&id)
    }
}

#[async_trait]
impl AccumulatorStore for MemoryAccumulatorStore {
    async fn load(&mut self, id: ProbeId) -> Result<Accumulator> {
        Ok(self
            .records
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Accumulator::new(id)))
    }

    async fn save(&mut self, accumulator: &Accumulator) -> Result {
        self.records.insert(accumulator.id, accumulator.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips_ok() -> crate::Result {
        let mut store = MemoryAccumulatorStore::default();
        let accumulator = Accumulator {
            id: 124,
            values: vec![100],
        };
        store.save(&accumulator).await?;
        assert_eq!(store.load(124).await?, accumulator);
        Ok(())
    }

    #[tokio::test]
    async fn load_of_absent_id_is_empty_ok() -> crate::Result {
        let mut store = MemoryAccumulatorStore::default();
        assert_eq!(store.load(125).await?, Accumulator::new(125));
        Ok(())
    }
}
