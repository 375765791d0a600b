use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use tracing::{debug, instrument};

use crate::channel::{Delivery, InboundChannel, OutboundChannel, PAYLOAD_KEY};
use crate::models::Probe;
use crate::prelude::*;

/// Inbound probe stream read through a consumer group.
///
/// Entries are acknowledged with `XACK` only after the reducer has persisted
/// the accumulator, so a crash mid-processing leaves them pending and they
/// are redelivered on the next start.
pub struct RedisInboundChannel {
    redis: ConnectionManager,
    stream: String,
    group: String,
    consumer: String,

    /// Own pending entries are drained before new ones are read.
    check_backlog: bool,
}

impl RedisInboundChannel {
    pub async fn open(
        redis: ConnectionManager,
        stream: String,
        group: String,
        consumer: String,
    ) -> Result<Self> {
        let mut this = Self {
            redis,
            stream,
            group,
            consumer,
            check_backlog: true,
        };
        this.create_group().await?;
        Ok(this)
    }

    /// Creates the consumer group, and the stream itself when missing.
    async fn create_group(&mut self) -> Result {
        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.stream)
            .arg(&self.group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut self.redis)
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(error) if error.code() == Some("BUSYGROUP") => Ok(()),
            Err(error) => Err(error).context("failed to create the consumer group"),
        }
    }
}

#[async_trait]
impl InboundChannel for RedisInboundChannel {
    #[instrument(level = "debug", skip_all)]
    async fn receive(&mut self, timeout: StdDuration) -> Result<Option<Delivery>> {
        let entry_id = if self.check_backlog { "0" } else { ">" };
        let options = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(1)
            .block(timeout.as_millis() as usize);
        let reply: Option<StreamReadReply> = self
            .redis
            .xread_options(&[&self.stream], &[entry_id], &options)
            .await
            .context("failed to read the inbound stream")?;

        let entry = reply
            .and_then(|mut reply| reply.keys.pop())
            .and_then(|mut key| key.ids.pop());
        match entry {
            Some(entry) => {
                let payload = entry
                    .get(PAYLOAD_KEY)
                    .ok_or_else(|| anyhow!("entry {} carries no payload", entry.id))?;
                Ok(Some(Delivery {
                    entry_id: entry.id,
                    payload,
                }))
            }
            None => {
                // An empty read at `0` means the pending list is drained.
                if self.check_backlog {
                    debug!("backlog drained");
                    self.check_backlog = false;
                }
                Ok(None)
            }
        }
    }

    #[instrument(level = "debug", skip_all, fields(entry_id = delivery.entry_id.as_str()))]
    async fn ack(&mut self, delivery: &Delivery) -> Result {
        let _: i64 = self
            .redis
            .xack(&self.stream, &self.group, &[&delivery.entry_id])
            .await
            .context("failed to acknowledge the delivery")?;
        Ok(())
    }
}

/// Outbound averaged-probe stream.
pub struct RedisOutboundChannel {
    redis: ConnectionManager,
    stream: String,
}

impl RedisOutboundChannel {
    pub fn new(redis: ConnectionManager, stream: String) -> Self {
        Self { redis, stream }
    }
}

#[async_trait]
impl OutboundChannel for RedisOutboundChannel {
    #[instrument(level = "debug", skip_all, fields(id = probe.id))]
    async fn send(&mut self, probe: &Probe) -> Result {
        let payload = probe.to_payload()?;
        let _: String = self
            .redis
            .xadd(&self.stream, "*", &[(PAYLOAD_KEY, payload)])
            .await
            .context("failed to send the probe")?;
        Ok(())
    }
}
