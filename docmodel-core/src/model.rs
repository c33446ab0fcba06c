//! The model capability consumed by adapters.
//!
//! Adapters never own model semantics. They construct instances from raw records, ask an
//! instance whether it is valid, and ask it to serialize itself, all through the [`Model`]
//! trait. The only state an adapter writes into an instance is its persistence metadata
//! ([`InstanceMeta`]).

use bson::{Bson, Document, de::deserialize_from_document, ser::serialize_to_document};
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{DocumentStoreResult, ValidationErrors};

/// Record key holding the public identifier.
pub const ID_FIELD: &str = "id";
/// Record key holding the backend-assigned internal identifier.
pub const INTERNAL_ID_FIELD: &str = "_id";
/// Record key holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Persistence metadata carried by every model instance.
///
/// Models keep this out of their own serialized properties (typically with `#[serde(skip)]`);
/// [`Model::to_data`] re-adds the fields a caller asks for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceMeta {
    /// Public identifier, assigned on insert.
    pub id: Option<String>,
    /// Identifier assigned by the backend itself.
    pub internal_id: Option<Bson>,
    /// Whether the instance has been written to, or read from, the backend.
    pub saved: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl InstanceMeta {
    /// Returns the metadata value stored under a record key, if the key names one.
    pub fn field(&self, name: &str) -> Option<Bson> {
        match name {
            ID_FIELD => self.id.clone().map(Bson::String),
            INTERNAL_ID_FIELD => self.internal_id.clone(),
            CREATED_AT_FIELD => self
                .created_at
                .map(|at| Bson::DateTime(bson::DateTime::from_chrono(at))),
            _ => None,
        }
    }

    /// Stamps the identifiers of a persisted record and marks the instance saved.
    pub fn stamp(&mut self, id: Option<String>, internal_id: Option<Bson>) {
        self.id = id;
        self.internal_id = internal_id;
        self.saved = true;
    }
}

/// Field selection passed to [`Model::to_data`].
#[derive(Debug, Clone, Copy)]
pub enum Fields<'a> {
    /// The model's properties plus the named metadata fields.
    Including(&'a [&'a str]),
    /// The model's properties without the named fields.
    Excluding(&'a [&'a str]),
}

/// Core trait every persisted model must implement.
///
/// `create` and `to_data` default to serde-based conversions, so most models only provide
/// their names and metadata accessors.
///
/// # Example
///
/// ```ignore
/// use docmodel::model::{InstanceMeta, Model};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     pub name: String,
///     #[serde(skip)]
///     pub meta: InstanceMeta,
/// }
///
/// impl Model for User {
///     fn model_name() -> &'static str { "User" }
///     fn collection_name() -> &'static str { "users" }
///     fn meta(&self) -> &InstanceMeta { &self.meta }
///     fn meta_mut(&mut self) -> &mut InstanceMeta { &mut self.meta }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// The declared type name of the model.
    fn model_name() -> &'static str;

    /// The backend collection holding this model's records.
    fn collection_name() -> &'static str;

    fn meta(&self) -> &InstanceMeta;

    fn meta_mut(&mut self) -> &mut InstanceMeta;

    /// Constructs an instance from a raw backend record.
    ///
    /// The default deserializes the record's properties and keeps its creation timestamp.
    /// Identifiers are stamped afterwards by the materializer.
    fn create(record: Document) -> DocumentStoreResult<Self> {
        let created_at = match record.get(CREATED_AT_FIELD) {
            Some(Bson::DateTime(at)) => Some(at.to_chrono()),
            _ => None,
        };

        let mut instance: Self = deserialize_from_document(record)?;
        instance.meta_mut().created_at = created_at;

        Ok(instance)
    }

    /// Checks the instance, returning the full error set when it is invalid.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }

    /// Serializes the instance into a backend record.
    fn to_data(&self, fields: Fields<'_>) -> DocumentStoreResult<Document> {
        let mut data = serialize_to_document(self)?;

        match fields {
            Fields::Including(names) => {
                for name in names {
                    if let Some(value) = self.meta().field(name) {
                        data.insert(*name, value);
                    }
                }
            }
            Fields::Excluding(names) => {
                for name in names {
                    data.remove(*name);
                }
            }
        }

        Ok(data)
    }
}

/// Convenience methods available on every [`Model`].
pub trait ModelExt: Model {
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn id(&self) -> Option<&str> {
        self.meta().id.as_deref()
    }

    fn is_saved(&self) -> bool {
        self.meta().saved
    }
}

impl<M: Model> ModelExt for M {}
