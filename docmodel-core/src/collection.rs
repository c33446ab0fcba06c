//! Typed collection handles.
//!
//! A [`ModelCollection`] groups the adapter operations for one model type and adds the
//! conveniences the model layer is built on: `first`, `get`, `save`.
//!
//! # Example
//!
//! ```ignore
//! let users = store.models::<User>();
//!
//! let mut user = User::new("Alice");
//! users.save(&mut user).await?;          // insert
//! user.name = "Alicia".into();
//! users.save(&mut user).await?;          // update by id
//!
//! let again = users.get(user.id().unwrap()).await?;
//! ```

use std::marker::PhantomData;

use chrono::Utc;
use tracing::debug;

use crate::{
    adapter::Adapter,
    error::{DocumentStoreError, DocumentStoreResult},
    materialize::Loaded,
    model::Model,
    query::Query,
};

/// Collection handle for model `M` over a borrowed adapter.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the adapter reference
/// * `A` - The adapter type
/// * `M` - The model type
#[derive(Debug)]
pub struct ModelCollection<'a, A: Adapter, M: Model> {
    adapter: &'a A,
    _model: PhantomData<fn() -> M>,
}

impl<'a, A: Adapter, M: Model> ModelCollection<'a, A, M> {
    pub(crate) fn new(adapter: &'a A) -> Self {
        Self { adapter, _model: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &'static str {
        M::collection_name()
    }

    /// Runs `query` as-is.
    pub async fn find(&self, query: &Query<M>) -> DocumentStoreResult<Loaded<M>> {
        self.adapter.load(query).await
    }

    /// Loads every instance of the model.
    pub async fn all(&self) -> DocumentStoreResult<Vec<M>> {
        Ok(self.adapter.load(&Query::new()).await?.into_vec())
    }

    /// Loads the first instance matching `query`, in the query's sort order.
    pub async fn first(&self, query: Query<M>) -> DocumentStoreResult<Option<M>> {
        Ok(self.adapter.load(&query.with_limit(1)).await?.into_one())
    }

    /// Loads the instance with the given public identifier.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Option<M>> {
        self.first(Query::for_id(id)).await
    }

    /// Persists `instance`: inserts it when it has never been saved, updates it by id otherwise.
    ///
    /// New instances without a creation timestamp get the current time.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`] if the instance fails validation or the backend
    /// rejects the write.
    pub async fn save(&self, instance: &mut M) -> DocumentStoreResult<()> {
        if instance.meta().saved {
            let id = instance
                .meta()
                .id
                .clone()
                .ok_or_else(|| DocumentStoreError::UnsupportedOperation(
                    format!("Saved {} instance has no id", M::model_name()),
                ))?;

            debug!(model = M::model_name(), %id, "saving existing instance");
            self.adapter
                .update(&*instance, &Query::<M>::for_id(id))
                .await?;
        } else {
            instance.validate()?;

            let meta = instance.meta_mut();
            if meta.created_at.is_none() {
                meta.created_at = Some(Utc::now());
            }

            self.adapter.insert_one(instance).await?;
        }

        Ok(())
    }

    /// Removes the instance with the given public identifier.
    pub async fn remove(&self, id: &str) -> DocumentStoreResult<bool> {
        self.adapter.remove(&Query::<M>::for_id(id)).await
    }

    /// Removes every instance matching `query`.
    pub async fn remove_where(&self, query: &Query<M>) -> DocumentStoreResult<bool> {
        self.adapter.remove(query).await
    }

    /// Creates the backing collection.
    pub async fn create(&self) -> DocumentStoreResult<()> {
        self.adapter.create_collection(self.name()).await
    }
}
