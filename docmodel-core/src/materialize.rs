//! Conversion of raw backend records into model instances.
//!
//! Every record an adapter returns from a load goes through [`materialize`]: the model builds
//! the instance, then the public and internal identifiers are stamped and the instance is
//! marked saved. [`Loaded`] shapes the final result, collapsing single-instance queries.

use bson::{Bson, Document};

use crate::{
    error::DocumentStoreResult,
    model::{ID_FIELD, INTERNAL_ID_FIELD, Model},
    query::QueryOptions,
};

/// Builds a persisted model instance from a raw backend record.
///
/// # Errors
///
/// Returns an error if the model cannot be constructed from the record.
pub fn materialize<M: Model>(record: Document) -> DocumentStoreResult<M> {
    let id = match record.get(ID_FIELD) {
        Some(Bson::String(id)) => Some(id.clone()),
        _ => None,
    };
    let internal_id = record.get(INTERNAL_ID_FIELD).cloned();

    let mut instance = M::create(record)?;
    instance.meta_mut().stamp(id, internal_id);

    Ok(instance)
}

/// The result of a load.
///
/// Queries limited to exactly one result resolve to [`Loaded::One`]; every other query
/// resolves to [`Loaded::Many`] in backend order.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<M> {
    One(Option<M>),
    Many(Vec<M>),
}

impl<M> Loaded<M> {
    /// Shapes materialized instances according to the query options.
    pub fn collapse(instances: Vec<M>, opts: &QueryOptions) -> Self {
        if opts.is_single() {
            Loaded::One(instances.into_iter().next())
        } else {
            Loaded::Many(instances)
        }
    }

    /// Returns the instances as a sequence, whichever shape the result has.
    pub fn into_vec(self) -> Vec<M> {
        match self {
            Loaded::One(instance) => instance.into_iter().collect(),
            Loaded::Many(instances) => instances,
        }
    }

    /// Returns the first instance, whichever shape the result has.
    pub fn into_one(self) -> Option<M> {
        match self {
            Loaded::One(instance) => instance,
            Loaded::Many(instances) => instances.into_iter().next(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Loaded::One(instance) => instance.iter().len(),
            Loaded::Many(instances) => instances.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
