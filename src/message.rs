//! Inbound log records and the outbound Loggly event

use crate::environment::{self, EnvironmentIndex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single container log line as handed over by the log router
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub message: String,
    pub container: ContainerInfo,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "Utc::now")]
    pub time: DateTime<Utc>,
}

/// Identity and declared environment of the container that emitted a record
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ContainerInfo {
    pub id: String,
    pub image: String,
    #[serde(default)]
    pub env: Vec<String>,
}

fn default_source() -> String {
    "stdout".to_string()
}

impl LogRecord {
    pub fn new(message: String, container: ContainerInfo) -> Self {
        Self {
            message,
            container,
            source: default_source(),
            time: Utc::now(),
        }
    }

    pub fn with_source(mut self, source: String) -> Self {
        self.source = source;
        self
    }

    /// Index of the emitting container's environment
    pub fn environment(&self) -> EnvironmentIndex {
        environment::extract(self.container.env.as_slice())
    }
}

impl ContainerInfo {
    pub fn new(id: String, image: String) -> Self {
        Self {
            id,
            image,
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, env: Vec<String>) -> Self {
        self.env = env;
        self
    }
}

/// Payload posted to the Loggly event endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OutboundEvent {
    pub message: String,
    pub container_id: String,
    pub container_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_revision: Option<String>,
}

impl OutboundEvent {
    /// Build the event for `record`, enriching it from the container environment
    pub fn from_record(record: &LogRecord, instance_id: Option<String>) -> Self {
        let env = record.environment();

        Self {
            message: record.message.clone(),
            container_id: record.container.id.clone(),
            container_image: record.container.image.clone(),
            instance_id: instance_id.filter(|id| !id.is_empty()),
            service_name: env.service_name().map(str::to_string),
            app_revision: env.app_revision().map(str::to_string),
        }
    }
}
