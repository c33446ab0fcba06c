//! Backend-agnostic query representation.
//!
//! A [`Query`] is bound to a model type and carries three things:
//!
//! - a condition tree ([`OperationNode`]) combining [`Comparison`] leaves with AND / OR / NOT,
//! - query options ([`QueryOptions`]): sort order and limit,
//! - an optional direct-lookup key (`by_id`) that bypasses condition translation.
//!
//! Queries are read-only inputs to adapter operations. Backends translate them through a
//! [`QueryVisitor`].
//!
//! # Query Building
//!
//! ```ignore
//! use docmodel::query::{Filter, Query, SortDirection};
//!
//! let query = Query::<User>::builder()
//!     .filter(Filter::and([
//!         Filter::eq("name", "alice").case_insensitive().into(),
//!         Filter::gte("age", 18).into(),
//!     ]))
//!     .sort("name", SortDirection::Asc)
//!     .limit(10)
//!     .build();
//! ```
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct provides static constructors for comparisons and operation nodes:
//!
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - Set membership: `one_of`
//! - Prefix match: `like`
//! - Logical: `and`, `or`, `not`

use std::{fmt, marker::PhantomData};

use bson::Bson;

use crate::{error::DocumentStoreError, model::Model};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl From<&str> for SortDirection {
    /// Parses a declared direction. Only the exact string `"asc"` is ascending; every other
    /// value, `"ASC"` included, sorts descending.
    fn from(value: &str) -> Self {
        match value {
            "asc" => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

/// Ordered field → direction mapping. Earlier fields take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    fields: Vec<(String, SortDirection)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sort field. A field that is already present keeps its position and takes
    /// the new direction.
    pub fn then(mut self, field: impl Into<String>, direction: impl Into<SortDirection>) -> Self {
        let field = field.into();
        let direction = direction.into();

        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = direction,
            None => self.fields.push((field, direction)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.fields
            .iter()
            .map(|(field, direction)| (field.as_str(), *direction))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<F, D> FromIterator<(F, D)> for SortSpec
where
    F: Into<String>,
    D: Into<SortDirection>,
{
    fn from_iter<I: IntoIterator<Item = (F, D)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SortSpec::new(), |spec, (field, direction)| spec.then(field, direction))
    }
}

/// The kind of a field-level predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ComparisonKind {
    /// Equal to (exact match, or anchored pattern match when case-insensitive).
    EqualTo,
    /// Not equal to.
    NotEqualTo,
    /// Field value is one of the values in a set.
    Inclusion,
    /// Greater than.
    GreaterThan,
    /// Less than.
    LessThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than or equal to.
    LessThanOrEqual,
    /// String field starts with the value.
    Like,
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComparisonKind::EqualTo => "EqualTo",
            ComparisonKind::NotEqualTo => "NotEqualTo",
            ComparisonKind::Inclusion => "Inclusion",
            ComparisonKind::GreaterThan => "GreaterThan",
            ComparisonKind::LessThan => "LessThan",
            ComparisonKind::GreaterThanOrEqual => "GreaterThanOrEqual",
            ComparisonKind::LessThanOrEqual => "LessThanOrEqual",
            ComparisonKind::Like => "Like",
        };
        f.write_str(name)
    }
}

/// Per-comparison options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonOptions {
    /// Compare strings without regard to case.
    pub case_insensitive: bool,
}

/// A single field-level predicate. Immutable once constructed; the builder-style methods
/// return a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    field: String,
    kind: ComparisonKind,
    value: Bson,
    options: ComparisonOptions,
}

impl Comparison {
    pub fn new(field: impl Into<String>, kind: ComparisonKind, value: impl Into<Bson>) -> Self {
        Self {
            field: field.into(),
            kind,
            value: value.into(),
            options: ComparisonOptions::default(),
        }
    }

    pub fn with_options(self, options: ComparisonOptions) -> Self {
        Self { options, ..self }
    }

    /// Returns this comparison with case-insensitive matching enabled.
    pub fn case_insensitive(self) -> Self {
        self.with_options(ComparisonOptions { case_insensitive: true })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> ComparisonKind {
        self.kind
    }

    pub fn value(&self) -> &Bson {
        &self.value
    }

    pub fn options(&self) -> &ComparisonOptions {
        &self.options
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.options.case_insensitive
    }
}

/// A child of an [`OperationNode`]: either a nested node or a comparison leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Node(OperationNode),
    Comparison(Comparison),
}

impl From<OperationNode> for Condition {
    fn from(node: OperationNode) -> Self {
        Condition::Node(node)
    }
}

impl From<Comparison> for Condition {
    fn from(comparison: Comparison) -> Self {
        Condition::Comparison(comparison)
    }
}

/// Logical combination of conditions.
///
/// AND and OR nodes hold zero or more ordered children; a node without children places no
/// constraint on the result. NOT always wraps exactly one child.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationNode {
    /// All children must match.
    And(Vec<Condition>),
    /// Any child must match.
    Or(Vec<Condition>),
    /// The child must not match.
    Not(Box<Condition>),
}

impl Default for OperationNode {
    fn default() -> Self {
        OperationNode::And(Vec::new())
    }
}

impl From<Comparison> for OperationNode {
    fn from(comparison: Comparison) -> Self {
        OperationNode::And(vec![comparison.into()])
    }
}

impl OperationNode {
    /// Returns `true` for an AND/OR node without children ("match everything").
    pub fn is_empty(&self) -> bool {
        match self {
            OperationNode::And(children) | OperationNode::Or(children) => children.is_empty(),
            OperationNode::Not(_) => false,
        }
    }

    /// Combines this node with another condition using logical AND.
    ///
    /// If this node is already an AND, the condition is appended to its children.
    pub fn and(self, other: impl Into<Condition>) -> Self {
        match self {
            OperationNode::And(mut children) => {
                children.push(other.into());
                OperationNode::And(children)
            }
            node => OperationNode::And(vec![node.into(), other.into()]),
        }
    }

    /// Combines this node with another condition using logical OR.
    ///
    /// If this node is already an OR, the condition is appended to its children.
    pub fn or(self, other: impl Into<Condition>) -> Self {
        match self {
            OperationNode::Or(mut children) => {
                children.push(other.into());
                OperationNode::Or(children)
            }
            node => OperationNode::Or(vec![node.into(), other.into()]),
        }
    }

    /// Negates this node.
    pub fn not(self) -> Self {
        OperationNode::Not(Box::new(self.into()))
    }
}

/// Helper struct for constructing comparisons and operation nodes.
///
/// # Example
///
/// ```ignore
/// use docmodel::query::Filter;
///
/// let node = Filter::or([
///     Filter::like("title", "intro").case_insensitive().into(),
///     Filter::not(Filter::one_of("tag", vec!["draft", "hidden"])).into(),
/// ]);
/// ```
pub struct Filter;

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::EqualTo, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::NotEqualTo, value)
    }

    /// Matches documents where the field equals any of the given values.
    pub fn one_of(field: impl Into<String>, values: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::Inclusion, values)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::GreaterThan, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::GreaterThanOrEqual, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::LessThan, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::LessThanOrEqual, value)
    }

    /// Matches documents where the string field starts with the value.
    pub fn like(field: impl Into<String>, value: impl Into<Bson>) -> Comparison {
        Comparison::new(field, ComparisonKind::Like, value)
    }

    pub fn and<I, C>(conditions: I) -> OperationNode
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        OperationNode::And(conditions.into_iter().map(Into::into).collect())
    }

    pub fn or<I, C>(conditions: I) -> OperationNode
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        OperationNode::Or(conditions.into_iter().map(Into::into).collect())
    }

    pub fn not(condition: impl Into<Condition>) -> OperationNode {
        OperationNode::Not(Box::new(condition.into()))
    }
}

/// Sort and limit options of a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Sort order; `None` leaves the backend's natural order.
    pub sort: Option<SortSpec>,
    /// Maximum number of results. A limit of `1` collapses the result to a single instance.
    pub limit: Option<usize>,
}

impl QueryOptions {
    /// Returns `true` when the caller asked for a single instance rather than a sequence.
    pub fn is_single(&self) -> bool {
        self.limit == Some(1)
    }
}

/// A structured query against the collection of model `M`.
///
/// Use [`QueryBuilder`] for ergonomic construction, or [`Query::for_id`] for a direct lookup.
pub struct Query<M> {
    conditions: OperationNode,
    by_id: Option<String>,
    opts: QueryOptions,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Query<M> {
    /// Creates an unconstrained query over every record of the model.
    pub fn new() -> Self {
        Query {
            conditions: OperationNode::default(),
            by_id: None,
            opts: QueryOptions::default(),
            _model: PhantomData,
        }
    }

    /// Creates a direct lookup of the record with the given public identifier.
    pub fn for_id(id: impl Into<String>) -> Self {
        Query::builder().by_id(id).build()
    }

    pub fn builder() -> QueryBuilder<M> {
        QueryBuilder::new()
    }

    pub fn conditions(&self) -> &OperationNode {
        &self.conditions
    }

    pub fn by_id(&self) -> Option<&str> {
        self.by_id.as_deref()
    }

    pub fn opts(&self) -> &QueryOptions {
        &self.opts
    }

    pub fn model_name(&self) -> &'static str {
        M::model_name()
    }

    /// Returns this query with its limit replaced.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.opts.limit = Some(limit);
        self
    }
}

impl<M: Model> Default for Query<M> {
    fn default() -> Self {
        Query::new()
    }
}

impl<M> Clone for Query<M> {
    fn clone(&self) -> Self {
        Query {
            conditions: self.conditions.clone(),
            by_id: self.by_id.clone(),
            opts: self.opts.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("model", &M::model_name())
            .field("conditions", &self.conditions)
            .field("by_id", &self.by_id)
            .field("opts", &self.opts)
            .finish()
    }
}

pub struct QueryBuilder<M> {
    query: Query<M>,
}

impl<M: Model> QueryBuilder<M> {
    pub fn new() -> Self {
        QueryBuilder { query: Query::new() }
    }

    /// Sets the condition tree for this query.
    ///
    /// # Arguments
    ///
    /// * `conditions` - A node, or a single comparison (wrapped in an AND node)
    pub fn filter(mut self, conditions: impl Into<OperationNode>) -> Self {
        self.query.conditions = conditions.into();
        self
    }

    /// Restricts the query to the record with the given public identifier.
    pub fn by_id(mut self, id: impl Into<String>) -> Self {
        self.query.by_id = Some(id.into());
        self
    }

    /// Appends a sort field. Fields are applied in the order they are added.
    pub fn sort(mut self, field: impl Into<String>, direction: impl Into<SortDirection>) -> Self {
        let sort = self.query.opts.sort.take().unwrap_or_default();
        self.query.opts.sort = Some(sort.then(field, direction));
        self
    }

    pub fn sort_spec(mut self, sort: SortSpec) -> Self {
        self.query.opts.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.opts.limit = Some(limit);
        self
    }

    pub fn build(self) -> Query<M> {
        self.query
    }
}

impl<M: Model> Default for QueryBuilder<M> {
    fn default() -> Self {
        QueryBuilder::new()
    }
}

/// Walks a condition tree, producing one output per visited node.
///
/// Backends implement this to translate a tree into their native filter syntax.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, children: &[Condition]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, children: &[Condition]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, child: &Condition) -> Result<Self::Output, Self::Error>;
    fn visit_comparison(&mut self, comparison: &Comparison) -> Result<Self::Output, Self::Error>;

    fn visit_node(&mut self, node: &OperationNode) -> Result<Self::Output, Self::Error> {
        match node {
            OperationNode::And(children) => self.visit_and(children),
            OperationNode::Or(children) => self.visit_or(children),
            OperationNode::Not(child) => self.visit_not(child),
        }
    }

    fn visit_condition(&mut self, condition: &Condition) -> Result<Self::Output, Self::Error> {
        match condition {
            Condition::Node(node) => self.visit_node(node),
            Condition::Comparison(comparison) => self.visit_comparison(comparison),
        }
    }
}
