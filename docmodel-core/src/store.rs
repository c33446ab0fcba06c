//! Model store: the entry point the model layer uses to reach an adapter.
//!
//! # Example
//!
//! ```ignore
//! use docmodel::store::ModelStore;
//!
//! let store = ModelStore::new(adapter);
//! let users = store.models::<User>();
//! let alice = users.first(Query::builder().filter(Filter::eq("name", "alice")).build()).await?;
//! ```

use crate::{
    adapter::Adapter,
    collection::ModelCollection,
    error::DocumentStoreResult,
    model::Model,
};

/// A model store bound to a specific adapter implementation.
///
/// # Type Parameters
///
/// * `A` - The adapter implementation type
#[derive(Debug)]
pub struct ModelStore<A: Adapter> {
    adapter: A,
}

impl<A: Adapter> ModelStore<A> {
    /// Creates a new model store with the given adapter.
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    /// Gets the collection handle for model `M`.
    ///
    /// The collection name is determined by the model's `collection_name()` method.
    pub fn models<M: Model>(&self) -> ModelCollection<'_, A, M> {
        ModelCollection::new(&self.adapter)
    }

    /// Creates the given collections, one at a time.
    ///
    /// # Errors
    ///
    /// Returns the first creation error; the remaining names are not attempted.
    pub async fn create_collections(&self, names: &[&str]) -> DocumentStoreResult<()> {
        self.adapter.create_collections(names).await
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }
}
