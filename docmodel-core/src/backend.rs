//! Driver call surface consumed by adapters.
//!
//! A [`DocumentDriver`] is the thin layer over a concrete document store client. It speaks raw
//! records and backend filter documents; query translation, sequencing and materialization all
//! happen in the adapter above it.
//!
//! # Traits
//!
//! - [`DocumentDriver`]: The operations an adapter issues against the store
//! - [`DriverBuilder`]: Factory trait for creating driver instances
//!
//! # Examples
//!
//! ```ignore
//! use docmodel::backend::DocumentDriver;
//! use bson::doc;
//!
//! let driver = MyDriverImpl::new();
//! let internal_id = driver.insert_one("users", doc! { "id": "u-1", "name": "Alice" }).await?;
//! let found = driver.find_one("users", doc! { "id": "u-1" }).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::error::DocumentStoreResult;

/// Abstract interface over a document store client.
///
/// # Thread Safety
///
/// One driver is shared by every operation of an adapter without additional locking, so
/// implementations must be safe to call concurrently from multiple async tasks.
///
/// # Error Handling
///
/// Every failure surfaced by the store is reported as
/// [`DocumentStoreError::Backend`](crate::error::DocumentStoreError::Backend).
#[async_trait]
pub trait DocumentDriver: Send + Sync + Debug {
    /// Fetches the first record of `collection` matching `filter`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` when no record matches.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> DocumentStoreResult<Option<Document>>;

    /// Fetches every record of `collection` matching `filter`, ordered by `sort`.
    ///
    /// # Arguments
    ///
    /// * `filter` - Backend filter document; an empty document matches every record
    /// * `sort` - Backend sort document; an empty document keeps the natural order
    /// * `limit` - Maximum number of records to return
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Document>>;

    /// Inserts one record and returns the identifier the backend assigned to it.
    async fn insert_one(&self, collection: &str, record: Document) -> DocumentStoreResult<Bson>;

    /// Replaces the first record matching `filter` with `replacement` in a single write.
    ///
    /// The stored values of the `preserved` fields are carried over into the new record;
    /// every other stored field not present in `replacement` is dropped. A filter matching no
    /// record is an error.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        preserved: &[&str],
    ) -> DocumentStoreResult<()>;

    /// Deletes every record matching `filter` and returns how many were removed.
    ///
    /// Matching nothing is not an error.
    async fn delete(&self, collection: &str, filter: Document) -> DocumentStoreResult<u64>;

    /// Creates an empty collection.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Cleanly shuts down the driver, releasing its connection.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<D> DocumentDriver for &D
where
    D: DocumentDriver,
{
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> DocumentStoreResult<Option<Document>> {
        (*self).find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Document>> {
        (*self)
            .find(collection, filter, sort, limit)
            .await
    }

    async fn insert_one(&self, collection: &str, record: Document) -> DocumentStoreResult<Bson> {
        (*self).insert_one(collection, record).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        preserved: &[&str],
    ) -> DocumentStoreResult<()> {
        (*self)
            .replace_one(collection, filter, replacement, preserved)
            .await
    }

    async fn delete(&self, collection: &str, filter: Document) -> DocumentStoreResult<u64> {
        (*self).delete(collection, filter).await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (*self).create_collection(name).await
    }
}

#[async_trait]
impl<D> DocumentDriver for Arc<D>
where
    D: DocumentDriver,
{
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> DocumentStoreResult<Option<Document>> {
        (**self).find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Document>> {
        (**self)
            .find(collection, filter, sort, limit)
            .await
    }

    async fn insert_one(&self, collection: &str, record: Document) -> DocumentStoreResult<Bson> {
        (**self).insert_one(collection, record).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        preserved: &[&str],
    ) -> DocumentStoreResult<()> {
        (**self)
            .replace_one(collection, filter, replacement, preserved)
            .await
    }

    async fn delete(&self, collection: &str, filter: Document) -> DocumentStoreResult<u64> {
        (**self).delete(collection, filter).await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        (**self).create_collection(name).await
    }
}

#[async_trait]
pub trait DriverBuilder {
    type Driver: DocumentDriver;

    async fn build(self) -> DocumentStoreResult<Self::Driver>;
}
