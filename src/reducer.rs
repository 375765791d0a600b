//! The average reducer: the consume-transform-produce state machine.

use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::backoff::Backoff;
use crate::channel::redis::{RedisInboundChannel, RedisOutboundChannel};
use crate::channel::{Delivery, InboundChannel, OutboundChannel};
use crate::models::Probe;
use crate::opts::ReduceOpts;
use crate::prelude::*;
use crate::store::redis::RedisAccumulatorStore;
use crate::store::AccumulatorStore;

const INITIAL_DELAY_MILLIS: u64 = 100;
const MAX_DELAY_MILLIS: u64 = 30000;

#[instrument(skip_all)]
pub async fn run(opts: ReduceOpts) -> Result {
    sentry::configure_scope(|scope| scope.set_tag("app", "reducer"));

    let redis = redis::Client::open(opts.connections.redis_uri.as_str())
        .context("failed to parse the Redis URI")?
        .get_tokio_connection_manager()
        .await
        .context("failed to connect to Redis")?;
    let inbound = RedisInboundChannel::open(
        redis.clone(),
        opts.inbound_stream,
        opts.group,
        opts.consumer,
    )
    .await?;
    let outbound = RedisOutboundChannel::new(redis.clone(), opts.outbound_stream);
    let store = RedisAccumulatorStore::new(redis);

    Reducer::new(store, outbound)
        .run(inbound, opts.poll_timeout)
        .await
}

/// Accumulates probe readings per id and emits the pair averages.
///
/// One instance serves all ids: the per-id state lives entirely in the store,
/// and the consume loop keeps a single delivery in flight, which serialises
/// all store operations of the same id.
pub struct Reducer<S, O> {
    store: S,
    outbound: O,
}

impl<S: AccumulatorStore, O: OutboundChannel> Reducer<S, O> {
    pub fn new(store: S, outbound: O) -> Self {
        Self { store, outbound }
    }

    /// Drives the consume loop.
    ///
    /// A failed iteration leaves its delivery unacknowledged, so the entry
    /// is redelivered once the backoff delay ends.
    pub async fn run(
        mut self,
        mut inbound: impl InboundChannel,
        poll_timeout: StdDuration,
    ) -> Result {
        info!("running…");
        let mut backoff = Backoff::new(INITIAL_DELAY_MILLIS, MAX_DELAY_MILLIS);
        loop {
            match self.poll(&mut inbound, poll_timeout).await {
                Ok(()) => {
                    backoff = Backoff::new(INITIAL_DELAY_MILLIS, MAX_DELAY_MILLIS);
                }
                Err(error) => {
                    let delay = backoff.next();
                    warn!(
                        n_attempts = backoff.n_attempts(),
                        "iteration failed, retrying in {}: {:#}",
                        humantime::format_duration(delay),
                        error,
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// One iteration: receive, process, acknowledge.
    async fn poll(&mut self, inbound: &mut impl InboundChannel, timeout: StdDuration) -> Result {
        let delivery = match inbound.receive(timeout).await? {
            Some(delivery) => delivery,
            None => return Ok(()),
        };
        self.handle(&delivery).await?;
        inbound.ack(&delivery).await
    }

    /// Processes one delivery; a malformed payload is dropped as poison.
    async fn handle(&mut self, delivery: &Delivery) -> Result {
        let probe = match Probe::from_payload(&delivery.payload) {
            Ok(probe) => probe,
            Err(error) => {
                warn!(
                    entry_id = delivery.entry_id.as_str(),
                    "dropping the malformed probe: {:#}", error,
                );
                return Ok(());
            }
        };
        self.on_probe(probe).await
    }

    /// Loads the accumulator, appends the reading, emits the pair average
    /// when it is due, and persists the updated accumulator.
    #[instrument(level = "debug", skip_all, fields(id = probe.id))]
    pub async fn on_probe(&mut self, probe: Probe) -> Result {
        let mut accumulator = self.store.load(probe.id).await?;
        if let Some(mean) = accumulator.push(probe.value) {
            let average = Probe {
                id: probe.id,
                value: mean,
            };
            self.outbound.send(&average).await?;
            info!(id = probe.id, mean = mean, "reduced");
        }
        self.store.save(&accumulator).await
    }
}
