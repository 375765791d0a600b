use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::instrument;

use crate::models::{Accumulator, ProbeId};
use crate::prelude::*;
use crate::store::AccumulatorStore;

const KEY_PREFIX: &str = "probes::accumulators";

pub struct RedisAccumulatorStore {
    redis: ConnectionManager,
}

impl RedisAccumulatorStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(id: ProbeId) -> String {
        format!("{}::{}", KEY_PREFIX, id)
    }
}

#[async_trait]
impl AccumulatorStore for RedisAccumulatorStore {
    #[instrument(level = "debug", skip_all, fields(id = id))]
    async fn load(&mut self, id: ProbeId) -> Result<Accumulator> {
        let blob: Option<Vec<u8>> = self
            .redis
            .get(Self::key(id))
            .await
            .context("failed to retrieve the accumulator")?;
        match blob {
            Some(blob) => rmp_serde::from_slice(&blob).context("failed to parse the accumulator"),
            None => Ok(Accumulator::new(id)),
        }
    }

    #[instrument(level = "debug", skip_all, fields(id = accumulator.id, n_values = accumulator.values.len()))]
    async fn save(&mut self, accumulator: &Accumulator) -> Result {
        self.redis
            .set(Self::key(accumulator.id), rmp_serde::to_vec_named(accumulator)?)
            .await
            .context("failed to store the accumulator")
    }
}
