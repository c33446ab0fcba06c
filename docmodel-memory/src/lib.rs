//! In-memory document driver for docmodel.
//!
//! This crate provides a thread-safe, in-memory implementation of the `DocumentDriver` trait
//! that understands the same filter vocabulary the MongoDB adapter emits. It is intended for
//! development and tests: plug it under a `MongoAdapter` to run the full translation and CRUD
//! path without a database.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Ordered storage** - Records keep insertion order, like an unsorted MongoDB scan
//! - **Filter evaluation** - `$and`, `$or`, `$nor`, comparisons, `$in` and `$regex`
//! - **Sorting and limits** - Multi-key stable sort documents
//!
//! # Quick Start
//!
//! ```ignore
//! use docmodel::{memory::InMemoryDriver, mongodb::MongoAdapter, store::ModelStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ModelStore::new(MongoAdapter::new(InMemoryDriver::new()));
//!     let users = store.models::<User>();
//!
//!     let mut user = User::new("Alice");
//!     users.save(&mut user).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmodel_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryDriver, InMemoryDriverBuilder};
