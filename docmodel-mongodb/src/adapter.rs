//! CRUD execution over a [`DocumentDriver`].
//!
//! [`MongoAdapter`] turns model-layer requests into driver calls: queries go through the
//! [`MongoQueryTranslator`], returned records go through the materializer, and multi-item
//! writes run strictly one after another.

use async_trait::async_trait;
use bson::{Document, doc};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use docmodel_core::{
    adapter::Adapter,
    backend::DocumentDriver,
    error::{DocumentStoreError, DocumentStoreResult},
    materialize::{Loaded, materialize},
    model::{CREATED_AT_FIELD, Fields, ID_FIELD, INTERNAL_ID_FIELD, Model},
    query::Query,
};

use crate::query::{MongoQueryTranslator, translate_sort};

/// Stored fields an update carries over into the replacement record.
const PRESERVED_FIELDS: &[&str] = &[INTERNAL_ID_FIELD, ID_FIELD, CREATED_AT_FIELD];

/// Metadata fields written alongside the model's properties on insert.
const INSERTED_FIELDS: &[&str] = &[ID_FIELD, CREATED_AT_FIELD];

/// [`Adapter`] speaking the MongoDB query language through a [`DocumentDriver`].
///
/// The driver is usually a [`MongoDriver`](crate::driver::MongoDriver); any driver that
/// understands MongoDB filter documents works, including the in-memory one.
///
/// # Example
///
/// ```ignore
/// use docmodel::{backend::DriverBuilder, mongodb::{AdapterConfig, MongoAdapter, MongoDriver}};
///
/// let config = AdapterConfig::builder().dbname("app").build();
/// let driver = MongoDriver::builder(config).build().await?;
/// let adapter = MongoAdapter::new(driver);
/// ```
#[derive(Debug)]
pub struct MongoAdapter<D: DocumentDriver> {
    driver: D,
    translator: MongoQueryTranslator,
}

impl<D: DocumentDriver> MongoAdapter<D> {
    pub fn new(driver: D) -> Self {
        Self::builder(driver).build()
    }

    pub fn builder(driver: D) -> MongoAdapterBuilder<D> {
        MongoAdapterBuilder::new(driver)
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Releases the adapter and shuts its driver down.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.driver.shutdown().await
    }

    fn id_filter(id: &str) -> Document {
        doc! { ID_FIELD: id }
    }

    fn translate<M: Model>(&self, query: &Query<M>) -> DocumentStoreResult<Document> {
        let mut translator = self.translator;
        translator.translate(query.conditions())
    }

    fn filter_for<M: Model>(&self, query: &Query<M>) -> DocumentStoreResult<Document> {
        match query.by_id() {
            Some(id) => Ok(Self::id_filter(id)),
            None => self.translate(query),
        }
    }
}

#[async_trait]
impl<D: DocumentDriver> Adapter for MongoAdapter<D> {
    fn name(&self) -> &'static str {
        "mongo"
    }

    async fn load<M: Model>(&self, query: &Query<M>) -> DocumentStoreResult<Loaded<M>> {
        let collection = M::collection_name();
        let limit = query.opts().limit;

        let records = match query.by_id() {
            Some(id) => {
                trace!(collection, id, "loading by id");
                self.driver
                    .find_one(collection, Self::id_filter(id))
                    .await?
                    .into_iter()
                    .collect::<Vec<_>>()
            }
            None => {
                let filter = self.translate(query)?;
                let sort = translate_sort(query.opts().sort.as_ref());

                trace!(collection, %filter, %sort, ?limit, "loading");
                self.driver.find(collection, filter, sort, limit).await?
            }
        };

        let instances = records
            .into_iter()
            .map(materialize::<M>)
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        debug!(model = M::model_name(), count = instances.len(), "loaded");

        Ok(Loaded::collapse(instances, query.opts()))
    }

    async fn insert<M: Model>(&self, items: &mut [M]) -> DocumentStoreResult<Vec<M>> {
        let collection = M::collection_name();
        let mut inserted = Vec::with_capacity(items.len());

        for (index, item) in items.iter_mut().enumerate() {
            let id = Uuid::new_v4().to_string();
            item.meta_mut().id = Some(id.clone());

            let data = item.to_data(Fields::Including(INSERTED_FIELDS))?;
            let internal_id = match self.driver.insert_one(collection, data).await {
                Ok(internal_id) => internal_id,
                Err(e) => {
                    warn!(collection, index, error = %e, "insert aborted");
                    return Err(e);
                }
            };

            trace!(collection, %id, %internal_id, "inserted");
            item.meta_mut().stamp(Some(id), Some(internal_id));
            inserted.push(item.clone());
        }

        debug!(model = M::model_name(), count = inserted.len(), "inserted");

        Ok(inserted)
    }

    async fn update<M: Model>(&self, data: &M, query: &Query<M>) -> DocumentStoreResult<bool> {
        let id = query
            .by_id()
            .ok_or_else(|| DocumentStoreError::UnsupportedOperation("Bulk update is not supported".to_string()))?;

        data.validate()?;

        let fields = data.to_data(Fields::Excluding(PRESERVED_FIELDS))?;
        let collection = M::collection_name();

        trace!(collection, id, "updating");
        self.driver
            .replace_one(collection, Self::id_filter(id), fields, PRESERVED_FIELDS)
            .await?;

        Ok(true)
    }

    async fn remove<M: Model>(&self, query: &Query<M>) -> DocumentStoreResult<bool> {
        let collection = M::collection_name();
        let filter = self.filter_for(query)?;

        let removed = self.driver.delete(collection, filter).await?;
        debug!(collection, removed, "removed");

        Ok(true)
    }

    async fn create_collections(&self, names: &[&str]) -> DocumentStoreResult<()> {
        for name in names {
            if let Err(e) = self.driver.create_collection(name).await {
                warn!(collection = *name, error = %e, "collection creation aborted");
                return Err(e);
            }

            debug!(collection = *name, "created collection");
        }

        Ok(())
    }
}

/// Builder for [`MongoAdapter`].
pub struct MongoAdapterBuilder<D: DocumentDriver> {
    driver: D,
    escape_patterns: bool,
}

impl<D: DocumentDriver> MongoAdapterBuilder<D> {
    pub fn new(driver: D) -> Self {
        Self { driver, escape_patterns: false }
    }

    /// Escape regex metacharacters in values matched by `$regex` (default: false).
    pub fn escape_patterns(mut self, escape: bool) -> Self {
        self.escape_patterns = escape;
        self
    }

    pub fn build(self) -> MongoAdapter<D> {
        MongoAdapter {
            driver: self.driver,
            translator: MongoQueryTranslator::new(self.escape_patterns),
        }
    }
}
