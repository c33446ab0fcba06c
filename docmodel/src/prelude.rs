//! Convenient re-exports of commonly used types from docmodel.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docmodel::prelude::*;
//! ```

pub use docmodel_core::{
    adapter::Adapter,
    backend::{DocumentDriver, DriverBuilder},
    collection::ModelCollection,
    error::{DocumentStoreError, DocumentStoreResult, ValidationErrors},
    materialize::Loaded,
    model::{Fields, InstanceMeta, Model, ModelExt},
    query::{Comparison, ComparisonKind, Condition, Filter, OperationNode, Query, QueryBuilder, QueryVisitor, SortDirection, SortSpec},
    store::ModelStore,
};
