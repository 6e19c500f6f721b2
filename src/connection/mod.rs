//! Connection management for MongoDB
//!
//! This module provides:
//! - Connection establishment, verified with a ping, and termination
//! - [`MongoDataSource`], the `$sample` backed document source used for
//!   schema inference

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::{Client, options::ClientOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, Result, SamplingError};
use crate::schema::{DataSource, Namespace};

/// MongoDB connection manager
pub struct ConnectionManager {
    /// MongoDB client instance
    client: Option<Client>,

    /// Connection configuration
    config: ConnectionConfig,

    /// Current connection state
    state: Arc<RwLock<ConnectionState>>,

    /// Connection URI
    uri: String,
}

/// Connection state information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,

    /// Currently connecting
    Connecting,

    /// Connected and ready
    Connected,

    /// Connection failed
    Failed(String),
}

/// Hide credentials in a connection URI
///
/// # Arguments
/// * `uri` - The URI to sanitize
///
/// # Returns
/// * `String` - URI with everything between `://` and `@` replaced by `***`
pub fn sanitize_uri(uri: &str) -> String {
    if let (Some(proto_end), Some(host_start)) = (uri.find("://"), uri.rfind('@'))
        && host_start > proto_end
    {
        return format!("{}***{}", &uri[..proto_end + 3], &uri[host_start..]);
    }
    if uri.contains('@') {
        "mongodb://***".to_string()
    } else {
        uri.to_string()
    }
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `uri` - MongoDB connection URI
    /// * `config` - Connection configuration
    pub fn new(uri: String, config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            uri,
        }
    }

    /// Identity of this connection, safe to display and to use as a cache key
    pub fn connection_id(&self) -> String {
        sanitize_uri(&self.uri)
    }

    /// Establish connection to MongoDB and verify it with a ping
    ///
    /// # Returns
    /// * `Result<()>` - Success or connection error
    pub async fn connect(&mut self) -> Result<()> {
        self.set_state(ConnectionState::Connecting).await;

        let result = self.try_connect().await;
        match &result {
            Ok(client) => {
                self.client = Some(client.clone());
                self.set_state(ConnectionState::Connected).await;
                info!("Connected to {}", self.connection_id());
            }
            Err(e) => {
                warn!("Connection to {} failed: {}", self.connection_id(), e);
                self.set_state(ConnectionState::Failed(e.to_string())).await;
            }
        }
        result.map(|_| ())
    }

    async fn try_connect(&self) -> Result<Client> {
        let options = self.client_options().await?;
        let client = Client::with_options(options)
            .map_err(|e| ConnectionError::ConnectionFailed(e.to_string()))?;
        Self::ping_client(&client).await?;
        Ok(client)
    }

    /// Parse the URI and apply configured timeouts and app name
    async fn client_options(&self) -> Result<ClientOptions> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| ConnectionError::InvalidUri(e.to_string()))?;

        let timeout = Duration::from_secs(self.config.timeout);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        if options.app_name.is_none() {
            options.app_name = Some(self.config.app_name.clone());
        }
        debug!("Client options prepared for {}", self.connection_id());
        Ok(options)
    }

    /// Disconnect from MongoDB
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            info!("Disconnected from {}", self.connection_id());
        }
        self.set_state(ConnectionState::Disconnected).await;
        Ok(())
    }

    /// Get the MongoDB client
    pub fn get_client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| ConnectionError::NotConnected.into())
    }

    /// Document source backed by this connection
    pub fn data_source(&self) -> Result<MongoDataSource> {
        Ok(MongoDataSource::new(self.get_client()?.clone()))
    }

    /// Check if currently connected
    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.read().await, ConnectionState::Connected)
    }

    async fn set_state(&self, new_state: ConnectionState) {
        *self.state.write().await = new_state;
    }

    async fn ping_client(client: &Client) -> Result<()> {
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ConnectionError::PingFailed(e.to_string()))?;
        Ok(())
    }
}

/// Document source reading from a live deployment
#[derive(Clone)]
pub struct MongoDataSource {
    client: Client,
}

impl MongoDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for MongoDataSource {
    async fn sample(&self, namespace: &Namespace, size: usize) -> Result<Vec<Document>> {
        let collection = self
            .client
            .database(&namespace.database)
            .collection::<Document>(&namespace.collection);
        let pipeline = vec![doc! { "$sample": { "size": (size as i64) } }];

        let cursor = collection
            .aggregate(pipeline)
            .await
            .map_err(|e| SamplingError::QueryFailed {
                namespace: namespace.to_string(),
                message: e.to_string(),
            })?;

        let documents: Vec<Document> =
            cursor
                .try_collect()
                .await
                .map_err(|e| SamplingError::CursorFailed {
                    namespace: namespace.to_string(),
                    message: e.to_string(),
                })?;
        debug!("Sampled {} documents from {}", documents.len(), namespace);
        Ok(documents)
    }

    async fn collection_names(&self, database: &str) -> Result<Vec<String>> {
        let mut names = self.client.database(database).list_collection_names().await?;
        names.sort();
        Ok(names)
    }
}
