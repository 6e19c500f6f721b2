//! Document sampling for schema inference

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::Document;
use tracing::{debug, info};

use super::{Schema, infer_schema};
use crate::error::Result;

/// A `database.collection` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Where sampled documents and collection names come from
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Return up to `size` randomly chosen documents of `namespace`
    async fn sample(&self, namespace: &Namespace, size: usize) -> Result<Vec<Document>>;

    /// Names of the collections in `database`
    async fn collection_names(&self, database: &str) -> Result<Vec<String>>;
}

/// Samples a collection and infers its schema
#[derive(Clone)]
pub struct SchemaSampler {
    source: Arc<dyn DataSource>,
    sample_size: usize,
}

impl SchemaSampler {
    /// Create a sampler drawing `sample_size` documents per collection
    pub fn new(source: Arc<dyn DataSource>, sample_size: usize) -> Self {
        Self {
            source,
            sample_size,
        }
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// The underlying data source
    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// Sample `namespace` and infer its schema
    ///
    /// # Returns
    /// * `Result<Schema>` - The inferred schema; empty if the collection is empty
    pub async fn sample(&self, namespace: &Namespace) -> Result<Schema> {
        debug!("Sampling {} documents from {}", self.sample_size, namespace);
        let documents = self.source.sample(namespace, self.sample_size).await?;
        let schema = infer_schema(&documents);
        info!(
            "Inferred schema for {} from {} documents ({} fields)",
            namespace,
            schema.sampled,
            schema.paths().len()
        );
        Ok(schema)
    }
}
