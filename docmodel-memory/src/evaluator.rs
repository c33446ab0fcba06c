//! Filter document evaluation for in-memory records.
//!
//! This module understands the filter vocabulary emitted by the MongoDB adapter:
//! `$and`, `$or`, `$nor`, direct equality, `$ne`, `$in`, `$gt`, `$gte`, `$lt`, `$lte`
//! and `$regex` / `$options`.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};
use regex::RegexBuilder;

use docmodel_core::error::{DocumentStoreError, DocumentStoreResult};

/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so that `Int32(3)` and `Double(3.0)` compare equal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    ObjectId(ObjectId),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> From<Option<&'a Bson>> for Comparable<'a> {
    fn from(bson: Option<&'a Bson>) -> Self {
        bson.map(Comparable::from).unwrap_or(Comparable::Null)
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl<'a> Comparable<'a> {
    /// Ordering used for sorting: nulls and missing fields first, incomparable values equal.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Ordering::Equal,
            (Comparable::Null, _) => Ordering::Less,
            (_, Comparable::Null) => Ordering::Greater,
            _ => self.partial_cmp(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Equality with array fields matching when any element matches.
    fn matches(&self, expected: &Comparable<'_>) -> bool {
        match self {
            Comparable::Array(items) if !matches!(expected, Comparable::Array(_)) => {
                items.iter().any(|item| item == expected)
            }
            _ => self == expected,
        }
    }
}

/// Evaluates a filter document against a single record.
pub(crate) struct DocumentEvaluator<'a> {
    record: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(record: &'a Document) -> Self {
        Self { record }
    }

    /// Returns `true` when the record satisfies every clause of `filter`.
    ///
    /// # Errors
    ///
    /// Returns a backend error for operators outside the supported vocabulary or malformed
    /// operator arguments.
    pub fn evaluate(&self, filter: &Document) -> DocumentStoreResult<bool> {
        for (key, clause) in filter {
            let matched = match key.as_str() {
                "$and" => self.all(clause_list(key, clause)?)?,
                "$or" => self.any(clause_list(key, clause)?)?,
                "$nor" => !self.any(clause_list(key, clause)?)?,
                op if op.starts_with('$') => {
                    return Err(DocumentStoreError::Backend(format!("Unsupported filter operator {op}")));
                }
                field => self.evaluate_field(field, clause)?,
            };

            if !matched {
                return Ok(false);
            }
        }

        Ok(true)
    }

    pub fn filter_records(
        records: impl IntoIterator<Item = &'a Document>,
        filter: &Document,
    ) -> DocumentStoreResult<Vec<&'a Document>> {
        let mut matched = Vec::new();

        for record in records {
            if DocumentEvaluator::new(record).evaluate(filter)? {
                matched.push(record);
            }
        }

        Ok(matched)
    }

    fn all(&self, filters: Vec<&Document>) -> DocumentStoreResult<bool> {
        for filter in filters {
            if !self.evaluate(filter)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn any(&self, filters: Vec<&Document>) -> DocumentStoreResult<bool> {
        for filter in filters {
            if self.evaluate(filter)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn evaluate_field(&self, field: &str, clause: &Bson) -> DocumentStoreResult<bool> {
        let value = self.record.get(field);

        match clause {
            Bson::Document(ops) if is_operator_document(ops) => {
                for (op, argument) in ops {
                    if !self.evaluate_operator(value, op, argument, ops)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            expected => Ok(Comparable::from(value).matches(&Comparable::from(expected))),
        }
    }

    fn evaluate_operator(
        &self,
        value: Option<&Bson>,
        op: &str,
        argument: &Bson,
        ops: &Document,
    ) -> DocumentStoreResult<bool> {
        let actual = Comparable::from(value);

        match op {
            "$eq" => Ok(actual.matches(&Comparable::from(argument))),
            "$ne" => Ok(!actual.matches(&Comparable::from(argument))),
            "$in" => match argument {
                Bson::Array(candidates) => Ok(
                    candidates
                        .iter()
                        .any(|candidate| actual.matches(&Comparable::from(candidate)))
                ),
                _ => Err(DocumentStoreError::Backend("$in requires an array".to_string())),
            },
            "$gt" | "$gte" | "$lt" | "$lte" => {
                match actual.partial_cmp(&Comparable::from(argument)) {
                    Some(ordering) => Ok(match op {
                        "$gt" => ordering == Ordering::Greater,
                        "$gte" => ordering != Ordering::Less,
                        "$lt" => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    }),
                    None => Ok(false),
                }
            }
            "$regex" => {
                let pattern = match argument {
                    Bson::String(pattern) => pattern,
                    _ => return Err(DocumentStoreError::Backend("$regex requires a string".to_string())),
                };
                let options = match ops.get("$options") {
                    Some(Bson::String(options)) => options.as_str(),
                    _ => "",
                };
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(options.contains('i'))
                    .multi_line(options.contains('m'))
                    .dot_matches_new_line(options.contains('s'))
                    .build()
                    .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

                Ok(match value {
                    Some(Bson::String(text)) => regex.is_match(text),
                    _ => false,
                })
            }
            "$options" => Ok(true),
            op => Err(DocumentStoreError::Backend(format!("Unsupported field operator {op}"))),
        }
    }
}

fn is_operator_document(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|key| key.starts_with('$'))
}

fn clause_list<'b>(key: &str, clause: &'b Bson) -> DocumentStoreResult<Vec<&'b Document>> {
    match clause {
        Bson::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                item.as_document().ok_or_else(|| {
                    DocumentStoreError::Backend(format!("{key} entries must be documents"))
                })
            })
            .collect(),
        _ => Err(DocumentStoreError::Backend(format!("{key} requires a non-empty array"))),
    }
}
