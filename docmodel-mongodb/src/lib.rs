//! MongoDB adapter for docmodel.
//!
//! This crate provides the MongoDB implementation of the `Adapter` trait: condition trees and
//! sort specifications are translated into MongoDB filter and sort documents, and the CRUD
//! operations of the model layer are executed through a `DocumentDriver`.
//!
//! To use this adapter, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docmodel = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Query translation** - AND / OR / NOT trees, comparisons, case-insensitive and prefix matches
//! - **Sequential writes** - Multi-item inserts and collection creation abort on the first failure
//! - **Pluggable driver** - Runs over the official MongoDB client or the in-memory driver
//!
//! # Example
//!
//! ```ignore
//! use docmodel::{backend::DriverBuilder, mongodb::{AdapterConfig, MongoAdapter, MongoDriver}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AdapterConfig::builder()
//!         .host("localhost")
//!         .dbname("my_database")
//!         .build();
//!     let adapter = MongoAdapter::new(MongoDriver::builder(config).build().await?);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmodel_mongodb;

pub mod adapter;
pub mod config;
pub mod driver;
pub mod query;

pub use adapter::{MongoAdapter, MongoAdapterBuilder};
pub use config::{AdapterConfig, AdapterConfigBuilder};
pub use driver::{MongoDriver, MongoDriverBuilder};
pub use query::{MongoQueryTranslator, translate_conditions, translate_sort};
