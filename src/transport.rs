//! HTTP transport for delivering events to the Loggly collector

use crate::config::Config;
use crate::errors::{AdapterError, Result};
use crate::message::OutboundEvent;
use reqwest::{Client, Response, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Path segment of the Loggly event ingestion endpoint
pub const EVENT_ENDPOINT: &str = "/inputs";

/// Sends one event per request to `<collector>/inputs/<token>`
#[derive(Debug)]
pub struct LogglyTransport {
    client: Client,
    collector_addr: String,
    token: String,
    metrics: DeliveryMetrics,
}

impl LogglyTransport {
    /// Create a new transport; the client is built once and reused for every send
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut builder =
            Client::builder().user_agent(format!("loggly_adapter/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(AdapterError::Transport)?;

        Ok(Self {
            client,
            collector_addr: config.collector_addr.clone(),
            token: config.token.clone(),
            metrics: DeliveryMetrics::default(),
        })
    }

    /// Destination URL; the token is used verbatim as the last path segment
    pub fn endpoint_url(&self) -> String {
        format!("{}{}/{}", self.collector_addr, EVENT_ENDPOINT, self.token)
    }

    /// Serialize and post a single event. Nothing is retried.
    pub async fn send_event(&self, event: &OutboundEvent) -> Result<()> {
        let body = match serde_json::to_vec(event) {
            Ok(body) => body,
            Err(e) => {
                self.metrics.record_serialization_failure();
                return Err(AdapterError::Serialization(e));
            }
        };

        self.metrics.record_attempt();

        let result = match self.client.post(self.endpoint_url()).body(body).send().await {
            Ok(response) => self.handle_response(response).await,
            Err(e) => Err(AdapterError::Transport(e)),
        };

        match &result {
            Ok(()) => self.metrics.record_success(),
            Err(_) => self.metrics.record_failure(),
        }

        result
    }

    /// Anything but 200 OK is a failed delivery
    async fn handle_response(&self, response: Response) -> Result<()> {
        let status = response.status();

        if status == StatusCode::OK {
            debug!("Event accepted by collector");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();

        Err(AdapterError::Protocol {
            status,
            body: body.trim().to_string(),
        })
    }

    pub fn metrics(&self) -> DeliveryMetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Per-adapter delivery counters
#[derive(Debug, Default)]
struct DeliveryMetrics {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    serialization_failures: AtomicU64,
}

impl DeliveryMetrics {
    fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_serialization_failure(&self) {
        self.serialization_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DeliveryMetricsSnapshot {
        let attempts = self.attempts.load(Ordering::Relaxed);
        let successes = self.successes.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        let serialization_failures = self.serialization_failures.load(Ordering::Relaxed);

        let success_rate = if attempts > 0 {
            (successes as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        DeliveryMetricsSnapshot {
            attempts,
            successes,
            failures,
            serialization_failures,
            success_rate,
        }
    }
}

/// Snapshot of delivery metrics. `successes + failures == attempts`; events
/// that could not be serialized never reach the network and are only counted
/// in `serialization_failures`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryMetricsSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub serialization_failures: u64,
    pub success_rate: f64,
}
