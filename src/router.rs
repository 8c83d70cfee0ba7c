//! Adapter registry, routes and the pump feeding records to them

use crate::adapter::{LogAdapter, LogStream, LogglyAdapter};
use crate::errors::{AdapterError, Result};
use crate::message::LogRecord;

use futures::StreamExt;
use futures::channel::mpsc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Name the Loggly adapter is registered under
pub const ADAPTER_NAME: &str = "r5-loggly";

pub type AdapterFactory = Box<dyn Fn(&Route) -> Result<Arc<dyn LogAdapter>> + Send + Sync>;

/// Binds a registered adapter to the log stream
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: String,
    pub adapter: String,
}

impl Route {
    pub fn new(adapter: &str) -> Self {
        Self {
            id: format!("{}-default", adapter),
            adapter: adapter.to_string(),
        }
    }
}

struct ActiveRoute {
    route: Route,
    adapter: Arc<dyn LogAdapter>,
}

#[derive(Default)]
pub struct AdapterRegistry {
    factories: HashMap<String, AdapterFactory>,
    routes: Vec<ActiveRoute>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; a later registration under the same name replaces it
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&Route) -> Result<Arc<dyn LogAdapter>> + Send + Sync + 'static,
    {
        if self
            .factories
            .insert(name.to_string(), Box::new(factory))
            .is_some()
        {
            warn!("Adapter factory {} registered twice, replacing", name);
        }
    }

    /// Construct the route's adapter and activate the route.
    /// Nothing is recorded when construction fails.
    pub fn add_route(&mut self, route: Route) -> Result<()> {
        let factory = self.factories.get(&route.adapter).ok_or_else(|| {
            AdapterError::Registry(format!("no adapter registered as {}", route.adapter))
        })?;

        let adapter = factory(&route)?;
        info!("Route {} added for adapter {}", route.id, route.adapter);

        self.routes.push(ActiveRoute { route, adapter });
        Ok(())
    }

    pub fn routes(&self) -> Vec<&Route> {
        self.routes.iter().map(|active| &active.route).collect()
    }

    /// Feed every record from `source` to every route, then wait for all
    /// adapters to drain their streams.
    pub async fn pump(&self, mut source: LogStream) -> Result<()> {
        if self.routes.is_empty() {
            return Err(AdapterError::Registry("no routes configured".to_string()));
        }

        let mut senders = Vec::with_capacity(self.routes.len());
        let mut tasks = Vec::with_capacity(self.routes.len());

        for active in &self.routes {
            let (tx, rx) = mpsc::unbounded::<LogRecord>();
            let adapter = Arc::clone(&active.adapter);

            senders.push((active.route.id.clone(), tx));
            tasks.push(tokio::spawn(async move {
                adapter.stream(rx.boxed()).await;
            }));
        }

        while let Some(record) = source.next().await {
            for (route_id, tx) in &senders {
                if tx.unbounded_send(record.clone()).is_err() {
                    warn!("Route {} is no longer accepting records", route_id);
                }
            }
        }

        // Closing the channels ends each adapter's stream.
        drop(senders);

        for task in tasks {
            if let Err(e) = task.await {
                error!("Adapter task failed: {}", e);
            }
        }

        Ok(())
    }
}

/// Register the Loggly adapter and its default route.
///
/// The adapter reads its configuration from the environment, so this fails
/// with [`AdapterError::Config`] when `LOGGLY_TOKEN` is missing. Whether that
/// is fatal is up to the caller.
pub fn register(registry: &mut AdapterRegistry) -> Result<()> {
    registry.register(ADAPTER_NAME, |_route| {
        let adapter: Arc<dyn LogAdapter> = Arc::new(LogglyAdapter::from_env()?);
        Ok(adapter)
    });

    registry.add_route(Route::new(ADAPTER_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::message::ContainerInfo;
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingAdapter {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LogAdapter for RecordingAdapter {
        async fn stream(&self, mut inbound: LogStream) {
            while let Some(record) = inbound.next().await {
                self.seen.lock().unwrap().push(record.message);
            }
        }
    }

    fn record(message: &str) -> LogRecord {
        LogRecord::new(
            message.to_string(),
            ContainerInfo::new("abc".to_string(), "nginx".to_string()),
        )
    }

    #[test]
    fn test_unknown_adapter_is_rejected() {
        let mut registry = AdapterRegistry::new();
        let result = registry.add_route(Route::new("syslog"));

        assert!(matches!(result, Err(AdapterError::Registry(_))));
        assert!(registry.routes().is_empty());
    }

    #[test]
    fn test_factory_failure_adds_no_route() {
        let mut registry = AdapterRegistry::new();
        registry.register(ADAPTER_NAME, |_route| {
            let adapter: Arc<dyn LogAdapter> =
                Arc::new(LogglyAdapter::new(Config::from_lookup(|_| None)?)?);
            Ok(adapter)
        });

        let result = registry.add_route(Route::new(ADAPTER_NAME));
        assert!(matches!(result, Err(AdapterError::Config(_))));
        assert!(registry.routes().is_empty());
    }

    #[tokio::test]
    async fn test_pump_without_routes_fails() {
        let registry = AdapterRegistry::new();
        let result = registry.pump(stream::iter(vec![record("a")]).boxed()).await;
        assert!(matches!(result, Err(AdapterError::Registry(_))));
    }

    #[tokio::test]
    async fn test_pump_feeds_every_route() {
        let first = Arc::new(RecordingAdapter::default());
        let second = Arc::new(RecordingAdapter::default());

        let mut registry = AdapterRegistry::new();
        let a = Arc::clone(&first);
        registry.register("first", move |_route| Ok(a.clone() as Arc<dyn LogAdapter>));
        let b = Arc::clone(&second);
        registry.register("second", move |_route| Ok(b.clone() as Arc<dyn LogAdapter>));

        registry.add_route(Route::new("first")).unwrap();
        registry.add_route(Route::new("second")).unwrap();
        assert_eq!(registry.routes().len(), 2);

        let source = stream::iter(vec![record("one"), record("two"), record("three")]).boxed();
        registry.pump(source).await.unwrap();

        let expected = vec!["one", "two", "three"];
        assert_eq!(*first.seen.lock().unwrap(), expected);
        assert_eq!(*second.seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_pump_through_loggly_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let config = Config {
            token: "test-token".to_string(),
            collector_addr: server.uri(),
            http_timeout: None,
        };

        let mut registry = AdapterRegistry::new();
        registry.register(ADAPTER_NAME, move |_route| {
            let adapter: Arc<dyn LogAdapter> = Arc::new(LogglyAdapter::new(config.clone())?);
            Ok(adapter)
        });
        registry.add_route(Route::new(ADAPTER_NAME)).unwrap();

        let source = stream::iter(vec![record("one"), record("two")]).boxed();
        registry.pump(source).await.unwrap();
    }
}
