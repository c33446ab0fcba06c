//! In-memory driver implementation.
//!
//! Records are kept per collection in insertion order behind an async-aware read-write lock,
//! so the natural order of a `find` without sort matches the order records were written in.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use mea::rwlock::RwLock;

use docmodel_core::{
    backend::{DocumentDriver, DriverBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
};

use crate::evaluator::{Comparable, DocumentEvaluator};

type CollectionMap = HashMap<String, Vec<Document>>;

/// Thread-safe in-memory document driver.
///
/// `InMemoryDriver` is cloneable and uses an `Arc`-wrapped internal state; clones share the
/// same underlying data.
///
/// # Performance
///
/// Every query scans the whole collection (no indexing). Intended for development and tests.
///
/// # Example
///
/// ```ignore
/// use docmodel_memory::InMemoryDriver;
/// use docmodel::backend::DocumentDriver;
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let driver = InMemoryDriver::new();
///
///     driver.insert_one("users", doc! { "id": "u-1", "name": "Alice" }).await?;
///     let found = driver.find_one("users", doc! { "name": "Alice" }).await?;
///     assert!(found.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryDriver {
    /// collection_name -> records in insertion order
    collections: Arc<RwLock<CollectionMap>>,
}

impl InMemoryDriver {
    /// Creates a new driver with no collections.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(CollectionMap::new())),
        }
    }

    pub fn builder() -> InMemoryDriverBuilder {
        InMemoryDriverBuilder::default()
    }

    /// Returns a snapshot of every record in `collection`, in insertion order.
    pub async fn records(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Lists the names of every collection, created explicitly or by an insert.
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names = self
            .collections
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    fn sort_records(records: &mut [Document], sort: &Document) {
        if sort.is_empty() {
            return;
        }

        // sort_by is stable, so ties keep insertion order
        records.sort_by(|a, b| {
            for (field, direction) in sort {
                let left = Comparable::from(a.get(field));
                let right = Comparable::from(b.get(field));
                let ordering = match direction {
                    Bson::Int32(d) if *d < 0 => right.sort_cmp(&left),
                    Bson::Int64(d) if *d < 0 => right.sort_cmp(&left),
                    Bson::Double(d) if *d < 0.0 => right.sort_cmp(&left),
                    _ => left.sort_cmp(&right),
                };

                if ordering.is_ne() {
                    return ordering;
                }
            }

            std::cmp::Ordering::Equal
        });
    }

    fn replace_record(record: &mut Document, mut replacement: Document, preserved: &[&str]) {
        for field in preserved {
            if let Some(value) = record.get(*field) {
                replacement.insert(*field, value.clone());
            }
        }

        *record = replacement;
    }
}

#[async_trait]
impl DocumentDriver for InMemoryDriver {
    async fn find_one(&self, collection: &str, filter: Document) -> DocumentStoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        let records = match collections.get(collection) {
            Some(records) => records,
            None => return Ok(None),
        };

        for record in records {
            if DocumentEvaluator::new(record).evaluate(&filter)? {
                return Ok(Some(record.clone()));
            }
        }

        Ok(None)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let records = match collections.get(collection) {
            Some(records) => records,
            None => return Ok(vec![]),
        };

        let mut matched = DocumentEvaluator::filter_records(records, &filter)?
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();

        Self::sort_records(&mut matched, &sort);

        // A limit of zero means "no limit", as in MongoDB
        Ok(
            matched
                .into_iter()
                .take(limit.filter(|limit| *limit > 0).unwrap_or(usize::MAX))
                .collect()
        )
    }

    async fn insert_one(&self, collection: &str, mut record: Document) -> DocumentStoreResult<Bson> {
        let mut collections = self.collections.write().await;
        let records = collections
            .entry(collection.to_string())
            .or_default();

        let internal_id = match record.get("_id") {
            Some(existing) => {
                let duplicate = records
                    .iter()
                    .any(|other| other.get("_id") == Some(existing));
                if duplicate {
                    return Err(DocumentStoreError::Backend(format!(
                        "Duplicate key {existing} in collection {collection}"
                    )));
                }
                existing.clone()
            }
            None => {
                let generated = Bson::ObjectId(ObjectId::new());
                record.insert("_id", generated.clone());
                generated
            }
        };

        records.push(record);

        Ok(internal_id)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        preserved: &[&str],
    ) -> DocumentStoreResult<()> {
        let mut collections = self.collections.write().await;
        let records = collections.get_mut(collection);

        let mut target = None;
        if let Some(records) = records {
            for record in records.iter_mut() {
                if DocumentEvaluator::new(record).evaluate(&filter)? {
                    target = Some(record);
                    break;
                }
            }
        }

        match target {
            Some(record) => {
                Self::replace_record(record, replacement, preserved);
                Ok(())
            }
            None => Err(DocumentStoreError::Backend(format!(
                "No document matching {filter} in collection {collection}"
            ))),
        }
    }

    async fn delete(&self, collection: &str, filter: Document) -> DocumentStoreResult<u64> {
        let mut collections = self.collections.write().await;
        let records = match collections.get_mut(collection) {
            Some(records) => records,
            None => return Ok(0),
        };

        // Evaluate everything first so a malformed filter leaves the collection untouched
        let mut doomed = Vec::with_capacity(records.len());
        for record in records.iter() {
            doomed.push(DocumentEvaluator::new(record).evaluate(&filter)?);
        }

        let before = records.len();
        let mut doomed = doomed.into_iter();
        records.retain(|_| !doomed.next().unwrap_or(false));

        Ok((before - records.len()) as u64)
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        let mut collections = self.collections.write().await;

        if collections.contains_key(name) {
            return Err(DocumentStoreError::Backend(format!("Collection {name} already exists")));
        }

        collections.insert(name.to_string(), Vec::new());

        Ok(())
    }
}

/// Builder for constructing [`InMemoryDriver`] instances.
#[derive(Default)]
pub struct InMemoryDriverBuilder;

#[async_trait]
impl DriverBuilder for InMemoryDriverBuilder {
    type Driver = InMemoryDriver;

    async fn build(self) -> DocumentStoreResult<Self::Driver> {
        Ok(InMemoryDriver::new())
    }
}
