//! Main docmodel crate providing a unified interface for model persistence.
//!
//! This crate is the primary entry point for users of the docmodel framework.
//! It re-exports the core types and functionality from the sub-crates and provides
//! access to the available adapters and drivers.
//!
//! # Features
//!
//! - **Typed models** - Define models with Serde and persist them through a `ModelStore`
//! - **Structured queries** - AND / OR / NOT condition trees with sort and limit
//! - **MongoDB adapter** - Query translation and CRUD execution (requires `mongodb` feature)
//! - **In-memory driver** - Run the adapter without a database in development and tests
//!
//! # Quick Start
//!
//! ```ignore
//! use docmodel::{prelude::*, memory::InMemoryDriver, mongodb::MongoAdapter};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub name: String,
//!     #[serde(skip)]
//!     pub meta: InstanceMeta,
//! }
//!
//! impl Model for User {
//!     fn model_name() -> &'static str { "User" }
//!     fn collection_name() -> &'static str { "users" }
//!     fn meta(&self) -> &InstanceMeta { &self.meta }
//!     fn meta_mut(&mut self) -> &mut InstanceMeta { &mut self.meta }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = ModelStore::new(MongoAdapter::new(InMemoryDriver::new()));
//!     let users = store.models::<User>();
//!
//!     let mut user = User { name: "Alice".to_string(), meta: InstanceMeta::default() };
//!     users.save(&mut user).await.unwrap();
//!
//!     let alice = users
//!         .first(Query::builder().filter(Filter::eq("name", "alice").case_insensitive()).build())
//!         .await
//!         .unwrap();
//!
//!     println!("Found user: {:?}", alice);
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory driver for development and testing
//! - [`mongodb`] - MongoDB adapter and driver (requires `mongodb` feature)

pub mod prelude;

pub use docmodel_core::{adapter, backend, collection, error, materialize, model, query, store};

// Re-export BSON types and the async-trait macro for driver implementors
pub use async_trait::async_trait;
pub use bson;

/// In-memory driver implementations.
pub mod memory {
    pub use docmodel_memory::{InMemoryDriver, InMemoryDriverBuilder};
}

/// MongoDB adapter and driver implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docmodel_mongodb::{
        AdapterConfig, AdapterConfigBuilder, MongoAdapter, MongoAdapterBuilder, MongoDriver,
        MongoDriverBuilder, MongoQueryTranslator, translate_conditions, translate_sort,
    };
}
