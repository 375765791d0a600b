//! Inbound and outbound probe channels.

use async_trait::async_trait;

use crate::models::Probe;
use crate::prelude::*;

#[cfg(test)]
pub mod memory;
pub mod redis;

/// Stream-entry field carrying the JSON probe payload.
pub const PAYLOAD_KEY: &str = "payload";

/// One inbound entry pending acknowledgment.
#[derive(Debug)]
pub struct Delivery {
    pub entry_id: String,
    pub payload: Vec<u8>,
}

/// Source of inbound probe events with at-least-once delivery.
#[async_trait]
pub trait InboundChannel {
    /// Waits up to `timeout` for the next delivery.
    async fn receive(&mut self, timeout: StdDuration) -> Result<Option<Delivery>>;

    /// Marks the delivery as consumed, excluding it from redelivery.
    async fn ack(&mut self, delivery: &Delivery) -> Result;
}

/// Sink of the outbound averaged probes.
#[async_trait]
pub trait OutboundChannel {
    async fn send(&mut self, probe: &Probe) -> Result;
}
