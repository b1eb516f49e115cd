//! Shared utilities for integration tests.

use std::sync::Arc;

use rest_dispatch::blog::{self, BlogStore};
use rest_dispatch::config::ServiceConfig;
use rest_dispatch::http::HttpServer;
use rest_dispatch::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// A server on an ephemeral port, stopped on drop.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<BlogStore>,
    shutdown: Shutdown,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve the seeded blog with default config.
    pub async fn spawn() -> Self {
        Self::spawn_with(ServiceConfig::default(), BlogStore::seeded()).await
    }

    pub async fn spawn_with(config: ServiceConfig, store: BlogStore) -> Self {
        let store = Arc::new(store);
        let root = blog::build(Arc::clone(&store), config.dispatch.options())
            .expect("blog tree builds");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let shutdown = Shutdown::new();
        let server = HttpServer::new(config, root);
        let server_shutdown = shutdown.subscribe();
        let handle = tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            base_url,
            store,
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Trigger graceful shutdown and wait for the server task.
    #[allow(dead_code)]
    pub async fn stop(mut self) {
        self.shutdown.trigger();
        let handle = std::mem::replace(&mut self.handle, tokio::spawn(async {}));
        let _ = handle.await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client without connection pooling so each test sees a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
