#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use docmodel_core::{
    backend::DocumentDriver,
    error::{DocumentStoreError, DocumentStoreResult, ValidationErrors},
    model::{InstanceMeta, Model},
};
use docmodel_memory::InMemoryDriver;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip)]
    pub meta: InstanceMeta,
}

impl Person {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            name: name.to_string(),
            age,
            nickname: None,
            meta: InstanceMeta::default(),
        }
    }
}

impl Model for Person {
    fn model_name() -> &'static str {
        "Person"
    }

    fn collection_name() -> &'static str {
        "people"
    }

    fn meta(&self) -> &InstanceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut InstanceMeta {
        &mut self.meta
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.is_empty() {
            errors.add("name", "Field \"name\" is required");
        }
        if self.age < 0 {
            errors.add("age", "Field \"age\" must not be negative");
        }
        errors.into_result()
    }
}

#[derive(Debug, Default)]
pub struct Calls {
    pub find_one: AtomicUsize,
    pub find: AtomicUsize,
    pub insert_one: AtomicUsize,
    pub replace_one: AtomicUsize,
    pub delete: AtomicUsize,
    pub create_collection: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        [
            &self.find_one,
            &self.find,
            &self.insert_one,
            &self.replace_one,
            &self.delete,
            &self.create_collection,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }
}

/// In-memory driver that counts calls and fails on request.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub inner: InMemoryDriver,
    pub calls: Calls,
    /// Zero-based index of the insert call that fails.
    pub fail_insert_at: Option<usize>,
    /// Collection whose creation fails.
    pub fail_create: Option<&'static str>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_insert_at(index: usize) -> Self {
        Self {
            fail_insert_at: Some(index),
            ..Self::default()
        }
    }

    pub fn failing_create(name: &'static str) -> Self {
        Self {
            fail_create: Some(name),
            ..Self::default()
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentDriver for RecordingDriver {
    async fn find_one(&self, collection: &str, filter: Document) -> DocumentStoreResult<Option<Document>> {
        self.calls.find_one.fetch_add(1, Ordering::SeqCst);
        self.inner.find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Document>> {
        self.calls.find.fetch_add(1, Ordering::SeqCst);
        self.inner.find(collection, filter, sort, limit).await
    }

    async fn insert_one(&self, collection: &str, record: Document) -> DocumentStoreResult<Bson> {
        let index = self.calls.insert_one.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert_at == Some(index) {
            return Err(DocumentStoreError::Backend("insert rejected".to_string()));
        }
        self.inner.insert_one(collection, record).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        preserved: &[&str],
    ) -> DocumentStoreResult<()> {
        self.calls.replace_one.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_one(collection, filter, replacement, preserved).await
    }

    async fn delete(&self, collection: &str, filter: Document) -> DocumentStoreResult<u64> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(collection, filter).await
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.calls.create_collection.fetch_add(1, Ordering::SeqCst);
        if self.fail_create == Some(name) {
            return Err(DocumentStoreError::Backend(format!("cannot create {name}")));
        }
        self.inner.create_collection(name).await
    }
}
