//! The pluggable persistence interface of the model layer.
//!
//! An [`Adapter`] executes the CRUD operations of the model layer against one backend. Each
//! operation is a single future that resolves exactly once, with either an error or the
//! operation's success value.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    materialize::Loaded,
    model::Model,
    query::Query,
};

/// CRUD operations over model instances.
///
/// # Multi-item operations
///
/// [`Adapter::insert`] and [`Adapter::create_collections`] process their items strictly one
/// after another, in input order. The first failing item aborts the operation: its error is
/// returned, the remaining items are never attempted, and items already written stay written.
#[async_trait]
pub trait Adapter: Send + Sync + Debug {
    /// Short name of the backend this adapter targets.
    fn name(&self) -> &'static str;

    /// Loads the instances matching `query`.
    ///
    /// Returns [`Loaded::One`] when the query is limited to a single result, and
    /// [`Loaded::Many`] otherwise.
    async fn load<M: Model>(&self, query: &Query<M>) -> DocumentStoreResult<Loaded<M>>;

    /// Inserts `items`, stamping each with its identifiers as it is written.
    ///
    /// # Returns
    ///
    /// The stamped items in insertion order.
    async fn insert<M: Model>(&self, items: &mut [M]) -> DocumentStoreResult<Vec<M>>;

    /// Writes `data` over the record addressed by `query.by_id()`.
    ///
    /// # Errors
    ///
    /// Fails without touching the backend when the query has no direct-lookup key or when
    /// `data` does not validate.
    async fn update<M: Model>(&self, data: &M, query: &Query<M>) -> DocumentStoreResult<bool>;

    /// Removes the records matching `query`. Matching nothing is a success.
    async fn remove<M: Model>(&self, query: &Query<M>) -> DocumentStoreResult<bool>;

    /// Creates the named collections one at a time.
    async fn create_collections(&self, names: &[&str]) -> DocumentStoreResult<()>;

    /// Inserts a single item.
    async fn insert_one<M: Model>(&self, item: &mut M) -> DocumentStoreResult<M> {
        self.insert(std::slice::from_mut(item))
            .await?
            .pop()
            .ok_or_else(|| DocumentStoreError::Backend("Insert returned no record".to_string()))
    }

    /// Creates a single collection.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.create_collections(&[name]).await
    }
}
