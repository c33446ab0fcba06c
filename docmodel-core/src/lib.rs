//! Core of docmodel: the backend-agnostic half of a model persistence layer.
//!
//! This crate provides:
//!
//! - **Query representation** ([`query`]) - Condition trees, comparisons, sort and limit options
//! - **Model capability** ([`model`]) - The trait models implement to be persisted
//! - **Materialization** ([`materialize`]) - Turning raw records into persisted instances
//! - **Adapter interface** ([`adapter`]) - The CRUD operations a backend adapter executes
//! - **Driver call surface** ([`backend`]) - The raw store operations an adapter issues
//! - **Model store** ([`store`], [`collection`]) - Typed entry points for the model layer
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docmodel::model::{InstanceMeta, Model};
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
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmodel_core;

pub mod adapter;
pub mod backend;
pub mod collection;
pub mod error;
pub mod materialize;
pub mod model;
pub mod query;
pub mod store;
