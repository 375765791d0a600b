use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::channel::{Delivery, InboundChannel, OutboundChannel};
use crate::models::Probe;
use crate::prelude::*;

/// In-process inbound queue used by the tests.
pub struct MemoryInboundChannel {
    receiver: mpsc::UnboundedReceiver<Delivery>,
    pub acked: Vec<String>,
}

impl MemoryInboundChannel {
    pub fn new() -> (mpsc::UnboundedSender<Delivery>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let this = Self {
            receiver,
            acked: Vec::new(),
        };
        (sender, this)
    }
}

#[async_trait]
impl InboundChannel for MemoryInboundChannel {
    async fn receive(&mut self, timeout: StdDuration) -> Result<Option<Delivery>> {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Ok(delivery) => Ok(delivery),
            Err(_) => Ok(None),
        }
    }

    async fn ack(&mut self, delivery: &Delivery) -> Result {
        self.acked.push(delivery.entry_id.clone());
        Ok(())
    }
}

/// Captures the outbound probes so that the tests can assert on them.
#[derive(Default)]
pub struct MemoryOutboundChannel {
    pub sent: Vec<Probe>,
}

#[async_trait]
impl OutboundChannel for MemoryOutboundChannel {
    async fn send(&mut self, probe: &Probe) -> Result {
        self.sent.push(*probe);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_times_out_empty_ok() -> crate::Result {
        let (_sender, mut inbound) = MemoryInboundChannel::new();
        let delivery = inbound.receive(StdDuration::from_millis(10)).await?;
        assert!(delivery.is_none());
        Ok(())
    }
}
