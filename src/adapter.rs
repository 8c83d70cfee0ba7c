//! Loggly log adapter: drains a record stream and posts each record as an event

use crate::config::{self, Config};
use crate::errors::{AdapterError, Result};
use crate::message::{LogRecord, OutboundEvent};
use crate::transport::{DeliveryMetricsSnapshot, LogglyTransport};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

/// Inbound records for one adapter. The stream ending is the only stop signal.
pub type LogStream = BoxStream<'static, LogRecord>;

/// Capability of consuming a log stream until its producer closes it
#[async_trait]
pub trait LogAdapter: Send + Sync {
    async fn stream(&self, inbound: LogStream);
}

/// Looks up the host instance id; called once per record
pub type InstanceIdSource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Adapter forwarding every record to Loggly, one request at a time
pub struct LogglyAdapter {
    adapter_id: String,
    transport: LogglyTransport,
    instance_id: InstanceIdSource,
    reported_errors: AtomicU64,
}

impl fmt::Debug for LogglyAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogglyAdapter")
            .field("adapter_id", &self.adapter_id)
            .field("transport", &self.transport)
            .field("reported_errors", &self.reported_errors)
            .finish_non_exhaustive()
    }
}

impl LogglyAdapter {
    /// Create an adapter from the process environment
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// Create an adapter that reads `INSTANCE_ID` from the environment per record
    pub fn new(config: Config) -> Result<Self> {
        Self::with_instance_id_source(config, Arc::new(config::instance_id))
    }

    pub fn with_instance_id_source(config: Config, instance_id: InstanceIdSource) -> Result<Self> {
        let transport = LogglyTransport::new(&config)?;

        Ok(Self {
            adapter_id: Uuid::new_v4().to_string(),
            transport,
            instance_id,
            reported_errors: AtomicU64::new(0),
        })
    }

    pub fn adapter_id(&self) -> &str {
        &self.adapter_id
    }

    /// Build, serialize and send one record
    pub async fn send_record(&self, record: &LogRecord) -> Result<()> {
        let event = OutboundEvent::from_record(record, (self.instance_id)());

        debug!(
            "Forwarding {} line from container {} ({})",
            record.source, record.container.id, record.container.image
        );

        self.transport.send_event(&event).await
    }

    pub fn metrics(&self) -> DeliveryMetricsSnapshot {
        self.transport.metrics()
    }

    /// Number of per-record failures written to the error log
    pub fn reported_errors(&self) -> u64 {
        self.reported_errors.load(Ordering::Relaxed)
    }

    fn report(&self, err: &AdapterError) {
        self.reported_errors.fetch_add(1, Ordering::Relaxed);
        error!("{}", err);
    }
}

#[async_trait]
impl LogAdapter for LogglyAdapter {
    async fn stream(&self, mut inbound: LogStream) {
        let span = info_span!("loggly_adapter", adapter_id = %self.adapter_id);

        async move {
            info!("Loggly adapter started");

            while let Some(record) = inbound.next().await {
                if let Err(e) = self.send_record(&record).await {
                    self.report(&e);
                }
            }

            let metrics = self.metrics();
            info!(
                "Log stream closed - Delivered: {}, Failed: {}, Attempts: {} ({:.1}% success rate), Unserializable: {}, Errors reported: {}",
                metrics.successes,
                metrics.failures,
                metrics.attempts,
                metrics.success_rate,
                metrics.serialization_failures,
                self.reported_errors()
            );
        }
        .instrument(span)
        .await
    }
}
