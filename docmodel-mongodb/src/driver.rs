use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, Credential, FindOptions},
};
use tracing::debug;

use docmodel_core::{
    backend::{DocumentDriver, DriverBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
};

use crate::config::AdapterConfig;

/// [`DocumentDriver`] over the official MongoDB client.
///
/// The client is opened once by [`MongoDriverBuilder`] and shared by every operation; the
/// MongoDB client pools and multiplexes connections internally.
#[derive(Debug)]
pub struct MongoDriver {
    client: Client,
    config: AdapterConfig,
    database: String,
}

impl MongoDriver {
    pub fn new(client: Client, config: AdapterConfig, database: String) -> Self {
        Self { client, config, database }
    }

    pub fn builder(config: AdapterConfig) -> MongoDriverBuilder {
        MongoDriverBuilder::new(config)
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&self.config.collection_name(collection_name))
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl DocumentDriver for MongoDriver {
    async fn find_one(&self, collection: &str, filter: Document) -> DocumentStoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(filter)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Document>> {
        let options = find_options(sort, limit)?;

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn insert_one(&self, collection: &str, record: Document) -> DocumentStoreResult<Bson> {
        Ok(
            self.get_collection(collection)
                .insert_one(record)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .inserted_id
        )
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        preserved: &[&str],
    ) -> DocumentStoreResult<()> {
        let result = self.get_collection(collection)
            .update_one(filter.clone(), replacement_pipeline(replacement, preserved))
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(DocumentStoreError::Backend(format!(
                "No document matching {filter} in collection {collection}"
            )));
        }

        Ok(())
    }

    async fn delete(&self, collection: &str, filter: Document) -> DocumentStoreResult<u64> {
        Ok(
            self.get_collection(collection)
                .delete_many(filter)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .deleted_count
        )
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.client
            .database(&self.database)
            .create_collection(&self.config.collection_name(name))
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.shutdown().await
    }
}

/// Sort and limit options of a `find`. An empty sort document leaves the natural order.
fn find_options(sort: Document, limit: Option<usize>) -> DocumentStoreResult<FindOptions> {
    let mut options = FindOptions::default();

    if !sort.is_empty() {
        options.sort = Some(sort);
    }
    if let Some(limit) = limit {
        let limit = i64::try_from(limit).map_err(|_| {
            DocumentStoreError::UnsupportedOperation(format!("Limit {limit} exceeds the MongoDB maximum"))
        })?;
        options.limit = Some(limit);
    }

    Ok(options)
}

/// Update pipeline that swaps the stored record for `replacement` while keeping the stored
/// values of `preserved`. The replacement is wrapped in `$literal` so `$`-prefixed strings in
/// it stay plain values.
fn replacement_pipeline(replacement: Document, preserved: &[&str]) -> Vec<Document> {
    let kept = preserved
        .iter()
        .map(|field| (field.to_string(), Bson::String(format!("${field}"))))
        .collect::<Document>();

    vec![doc! {
        "$replaceWith": { "$mergeObjects": [{ "$literal": replacement }, kept] },
    }]
}

pub struct MongoDriverBuilder {
    config: AdapterConfig,
}

impl MongoDriverBuilder {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverBuilder for MongoDriverBuilder {
    type Driver = MongoDriver;

    async fn build(self) -> DocumentStoreResult<Self::Driver> {
        let database = self
            .config
            .dbname
            .clone()
            .ok_or_else(|| DocumentStoreError::Initialization("Database name is required".to_string()))?;

        let uri = self.config.connection_uri();
        let mut options = ClientOptions::parse(uri.as_str())
            .await
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        if let Some(username) = &self.config.username {
            let mut credential = Credential::default();
            credential.username = Some(username.clone());
            credential.password = self.config.password.clone();
            credential.source = Some(database.clone());
            options.credential = Some(credential);
        }

        debug!(%uri, %database, "opening MongoDB client");

        Ok(MongoDriver::new(
            Client::with_options(options)
                .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            self.config,
            database,
        ))
    }
}
