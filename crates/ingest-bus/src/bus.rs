use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer};
use tracing::info;

use crate::error::{BusError, Result};
use crate::types::Lane;

/// A connected AMQP channel, with the two durable fanout lanes (§6)
/// declared and bound. One `Bus` per process; listeners/backfillers publish,
/// the ingestor consumes.
pub struct Bus {
    channel: Channel,
}

impl Bus {
    /// Connects to `amqp_uri`, opens a channel, and declares both fanout
    /// exchanges plus their bound durable queues. Idempotent — safe to call
    /// from every process at startup.
    pub async fn connect(amqp_uri: &str) -> Result<Self> {
        let conn = Connection::connect(amqp_uri, ConnectionProperties::default())
            .await
            .map_err(|e| BusError::ConnectionFailed(e.to_string()))?;
        let channel = conn.create_channel().await?;

        for lane in [Lane::Realtime, Lane::Historical] {
            channel
                .exchange_declare(
                    lane.exchange(),
                    lapin::ExchangeKind::Fanout,
                    ExchangeDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await?;
            channel
                .queue_declare(
                    lane.queue(),
                    QueueDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await?;
            channel
                .queue_bind(
                    lane.queue(),
                    lane.exchange(),
                    "",
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
        }

        info!("bus connected, lanes declared");
        Ok(Self { channel })
    }

    /// Publishes `payload` (UTF-8 JSON, §6) onto `lane`'s fanout exchange
    /// with persistent delivery mode.
    pub async fn publish(&self, lane: Lane, payload: &[u8]) -> Result<()> {
        self.channel
            .basic_publish(
                lane.exchange(),
                "",
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|e| BusError::PublishFailed(e.to_string()))?
            .await
            .map_err(|e| BusError::PublishFailed(e.to_string()))?;
        Ok(())
    }

    /// Opens a manual-ack consumer on `lane`'s durable queue.
    pub async fn consume(&self, lane: Lane, consumer_tag: &str) -> Result<Consumer> {
        self.channel
            .basic_consume(
                lane.queue(),
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::ConsumeFailed(e.to_string()))
    }
}

/// Acks a delivery after C10 confirms persistence (§4.9 step 3/5, §6).
pub async fn ack(delivery: &lapin::message::Delivery) -> Result<()> {
    delivery
        .ack(BasicAckOptions::default())
        .await
        .map_err(|e| BusError::ConsumeFailed(e.to_string()))
}

/// Rejects a delivery with requeue — used only on LLM 4xx/5xx (§4.9 step 5).
pub async fn requeue(delivery: &lapin::message::Delivery) -> Result<()> {
    delivery
        .nack(BasicNackOptions {
            requeue: true,
            ..Default::default()
        })
        .await
        .map_err(|e| BusError::ConsumeFailed(e.to_string()))
}

/// Rejects a delivery without requeue — dropped payloads (§7 per-message dropped).
pub async fn drop_without_requeue(delivery: &lapin::message::Delivery) -> Result<()> {
    delivery
        .nack(BasicNackOptions {
            requeue: false,
            ..Default::default()
        })
        .await
        .map_err(|e| BusError::ConsumeFailed(e.to_string()))
}
