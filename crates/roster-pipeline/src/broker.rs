//! RabbitMQ session
//!
//! A [`BrokerSession`] is one connection, one channel and the declared queue.
//! Opening it is all-or-nothing: each attempt connects, creates the channel and
//! declares the queue, and a failure in a later step closes what the earlier
//! steps opened before the next attempt.

use async_trait::async_trait;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, ConfirmSelectOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer, Queue};
use roster_common::{connect_with_retry, RetryPolicy, RosterError};
use tracing::{debug, info, warn};

use crate::config::{AckMode, BrokerConfig};
use crate::consumer::Inbound;
use crate::error::{PipelineError, Result};
use crate::producer::Publisher;

/// Resource name used in connection logs
const RESOURCE: &str = "RabbitMQ";

/// AMQP reply code for a normal close
const REPLY_SUCCESS: u16 = 200;

/// Content type stamped on every published message
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Declare `name` as a non-durable, non-exclusive, non-auto-delete queue.
///
/// Declaring an existing queue with the same flags is a no-op, so the reader
/// and the writer may both call this in any order.
pub async fn declare_queue(channel: &Channel, name: &str) -> lapin::Result<Queue> {
    channel
        .queue_declare(
            name,
            QueueDeclareOptions {
                passive: false,
                durable: false,
                exclusive: false,
                auto_delete: false,
                nowait: false,
            },
            FieldTable::default(),
        )
        .await
}

/// Open connection, channel and declared queue
pub struct BrokerSession {
    connection: Connection,
    channel: Channel,
    queue: Queue,
}

impl BrokerSession {
    /// Establish the session, retrying per `policy`
    pub async fn open(config: &BrokerConfig, policy: &RetryPolicy) -> Result<Self> {
        info!(endpoint = %config.endpoint(), queue = %config.queue, "Connecting to broker");

        let session = connect_with_retry(policy, RESOURCE, |_| Self::try_open(config))
            .await
            .map_err(RosterError::from)?;

        Ok(session)
    }

    /// One attempt at connect, create channel, declare queue
    async fn try_open(config: &BrokerConfig) -> lapin::Result<Self> {
        let connection =
            Connection::connect_uri(config.amqp_uri(), ConnectionProperties::default()).await?;

        let channel = match connection.create_channel().await {
            Ok(channel) => channel,
            Err(e) => {
                close_connection(&connection).await;
                return Err(e);
            },
        };

        let queue = match declare_queue(&channel, &config.queue).await {
            Ok(queue) => queue,
            Err(e) => {
                close_channel(&channel).await;
                close_connection(&connection).await;
                return Err(e);
            },
        };

        debug!(
            queue = %queue.name(),
            messages = queue.message_count(),
            consumers = queue.consumer_count(),
            "Queue declared"
        );

        Ok(Self {
            connection,
            channel,
            queue,
        })
    }

    pub fn queue_name(&self) -> &str {
        self.queue.name().as_str()
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Put the channel in publisher-confirm mode
    pub async fn enable_confirms(&self) -> Result<()> {
        self.channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        Ok(())
    }

    /// Register a consumer on the session's queue
    pub async fn consume(&self, ack_mode: AckMode) -> Result<Consumer> {
        let consumer = self
            .channel
            .basic_consume(
                self.queue_name(),
                "",
                BasicConsumeOptions {
                    no_ack: ack_mode.no_ack(),
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        info!(queue = %self.queue_name(), ?ack_mode, "Consumer registered");
        Ok(consumer)
    }

    /// Close channel then connection, logging failures
    pub async fn close(self) {
        close_channel(&self.channel).await;
        close_connection(&self.connection).await;
        debug!("Broker session closed");
    }
}

async fn close_channel(channel: &Channel) {
    if let Err(e) = channel.close(REPLY_SUCCESS, "closing").await {
        warn!(error = %e, "Failed to close broker channel");
    }
}

async fn close_connection(connection: &Connection) {
    if let Err(e) = connection.close(REPLY_SUCCESS, "closing").await {
        warn!(error = %e, "Failed to close broker connection");
    }
}

#[async_trait]
impl Publisher for BrokerSession {
    /// Publish to the default exchange and wait for the broker's confirm
    async fn publish(&self, payload: &[u8]) -> Result<()> {
        let confirmation = self
            .channel
            .basic_publish(
                "",
                self.queue_name(),
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type(JSON_CONTENT_TYPE.into()),
            )
            .await?
            .await?;

        if confirmation.is_nack() {
            return Err(PipelineError::Nack);
        }
        Ok(())
    }
}

#[async_trait]
impl Inbound for Delivery {
    fn body(&self) -> &[u8] {
        &self.data
    }

    async fn ack(&self) -> Result<()> {
        self.acker.ack(BasicAckOptions::default()).await?;
        Ok(())
    }
}
