//! Query translation from the docmodel AST to MongoDB query syntax.
//!
//! Condition trees become filter documents, sort specifications become sort documents.
//! Both translations are pure and never touch the database.
//!
//! | Node / comparison | Filter |
//! |---|---|
//! | empty AND / OR | `{}` |
//! | AND / OR | `{"$and": [..]}` / `{"$or": [..]}` |
//! | NOT | `{"$nor": [child]}` |
//! | EqualTo | `{field: value}`, or `^value$` case-insensitive pattern |
//! | Like | `^value` prefix pattern |
//! | others | `{field: {"$ne" / "$in" / "$gt" / "$lt" / "$gte" / "$lte": value}}` |

use bson::{Bson, Document, doc};

use docmodel_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Comparison, ComparisonKind, Condition, OperationNode, QueryVisitor, SortDirection, SortSpec},
};

/// Translates docmodel condition trees into MongoDB filter documents.
///
/// Values embedded in `$regex` patterns are used verbatim unless `escape_patterns` is set, in
/// which case regex metacharacters in the value are escaped first.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoQueryTranslator {
    escape_patterns: bool,
}

impl MongoQueryTranslator {
    pub fn new(escape_patterns: bool) -> Self {
        Self { escape_patterns }
    }

    /// Translates a whole condition tree.
    pub fn translate(&mut self, node: &OperationNode) -> DocumentStoreResult<Document> {
        self.visit_node(node)
    }

    fn translate_children(&mut self, children: &[Condition]) -> DocumentStoreResult<Vec<Document>> {
        children
            .iter()
            .map(|child| self.visit_condition(child))
            .collect()
    }

    fn operator_token(kind: ComparisonKind) -> DocumentStoreResult<&'static str> {
        match kind {
            ComparisonKind::NotEqualTo => Ok("$ne"),
            ComparisonKind::Inclusion => Ok("$in"),
            ComparisonKind::GreaterThan => Ok("$gt"),
            ComparisonKind::LessThan => Ok("$lt"),
            ComparisonKind::GreaterThanOrEqual => Ok("$gte"),
            ComparisonKind::LessThanOrEqual => Ok("$lte"),
            kind => Err(DocumentStoreError::UnsupportedComparison(format!(
                "{kind} has no MongoDB operator"
            ))),
        }
    }

    /// Builds a `$regex` clause anchored at the start, and at the end when `whole_value` is set.
    fn pattern(&self, comparison: &Comparison, whole_value: bool) -> DocumentStoreResult<Document> {
        let value = match comparison.value() {
            Bson::String(value) => value,
            other => {
                return Err(DocumentStoreError::InvalidComparison(format!(
                    "{} on {} requires a string value, got {other}",
                    comparison.kind(),
                    comparison.field(),
                )));
            }
        };

        let value = if comparison.is_case_insensitive() {
            value.to_lowercase()
        } else {
            value.clone()
        };
        let value = if self.escape_patterns {
            regex::escape(&value)
        } else {
            value
        };

        let pattern = if whole_value {
            format!("^{value}$")
        } else {
            format!("^{value}")
        };

        let options = if comparison.is_case_insensitive() { "i" } else { "" };

        Ok(doc! {
            comparison.field(): { "$regex": pattern, "$options": options },
        })
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    /// AND / OR nodes without children place no constraint and become `{}`, at any depth.
    fn visit_node(&mut self, node: &OperationNode) -> Result<Self::Output, Self::Error> {
        if node.is_empty() {
            return Ok(doc! {});
        }

        match node {
            OperationNode::And(children) => self.visit_and(children),
            OperationNode::Or(children) => self.visit_or(children),
            OperationNode::Not(child) => self.visit_not(child),
        }
    }

    fn visit_and(&mut self, children: &[Condition]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { "$and": self.translate_children(children)? })
    }

    fn visit_or(&mut self, children: &[Condition]) -> Result<Self::Output, Self::Error> {
        Ok(doc! { "$or": self.translate_children(children)? })
    }

    fn visit_not(&mut self, child: &Condition) -> Result<Self::Output, Self::Error> {
        let negated = self.visit_condition(child)?;

        Ok(doc! { "$nor": [negated] })
    }

    fn visit_comparison(&mut self, comparison: &Comparison) -> Result<Self::Output, Self::Error> {
        match comparison.kind() {
            ComparisonKind::EqualTo if comparison.is_case_insensitive() => {
                self.pattern(comparison, true)
            }
            ComparisonKind::EqualTo => Ok(doc! {
                comparison.field(): comparison.value().clone(),
            }),
            ComparisonKind::Like => self.pattern(comparison, false),
            kind => {
                let token = Self::operator_token(kind)?;

                Ok(doc! {
                    comparison.field(): { token: comparison.value().clone() },
                })
            }
        }
    }
}

/// Translates a condition tree with the default (unescaped) pattern handling.
pub fn translate_conditions(node: &OperationNode) -> DocumentStoreResult<Document> {
    MongoQueryTranslator::default().translate(node)
}

/// Translates a sort specification into a MongoDB sort document, preserving field order.
pub fn translate_sort(sort: Option<&SortSpec>) -> Document {
    sort.map(|sort| {
        sort.iter()
            .map(|(field, direction)| {
                let order = match direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                };
                (field.to_string(), Bson::Int32(order))
            })
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_core::query::Filter;

    #[test]
    fn operator_kinds_use_token_table() {
        let cases = [
            (Filter::ne("age", 1), "$ne"),
            (Filter::one_of("age", vec![1, 2]), "$in"),
            (Filter::gt("age", 1), "$gt"),
            (Filter::lt("age", 1), "$lt"),
            (Filter::gte("age", 1), "$gte"),
            (Filter::lte("age", 1), "$lte"),
        ];

        for (comparison, token) in cases {
            let value = comparison.value().clone();
            let translated = MongoQueryTranslator::default()
                .visit_comparison(&comparison)
                .unwrap();

            assert_eq!(translated, doc! { "age": { token: value } });
        }
    }

    #[test]
    fn equal_to_is_direct_equality() {
        let translated = translate_conditions(&Filter::eq("name", "Foo").into()).unwrap();

        assert_eq!(translated, doc! { "$and": [{ "name": "Foo" }] });
    }

    #[test]
    fn case_insensitive_equal_to_is_anchored_pattern() {
        let translated = MongoQueryTranslator::default()
            .visit_comparison(&Filter::eq("name", "Foo").case_insensitive())
            .unwrap();

        assert_eq!(translated, doc! { "name": { "$regex": "^foo$", "$options": "i" } });
    }

    #[test]
    fn like_is_prefix_pattern() {
        let mut translator = MongoQueryTranslator::default();

        assert_eq!(
            translator.visit_comparison(&Filter::like("name", "ab")).unwrap(),
            doc! { "name": { "$regex": "^ab", "$options": "" } },
        );
        assert_eq!(
            translator.visit_comparison(&Filter::like("name", "AB").case_insensitive()).unwrap(),
            doc! { "name": { "$regex": "^ab", "$options": "i" } },
        );
    }

    #[test]
    fn pattern_values_are_raw_unless_escaping() {
        let comparison = Filter::like("path", "a.b");

        assert_eq!(
            MongoQueryTranslator::default().visit_comparison(&comparison).unwrap(),
            doc! { "path": { "$regex": "^a.b", "$options": "" } },
        );
        assert_eq!(
            MongoQueryTranslator::new(true).visit_comparison(&comparison).unwrap(),
            doc! { "path": { "$regex": "^a\\.b", "$options": "" } },
        );
    }

    #[test]
    fn pattern_requires_string_value() {
        let result = MongoQueryTranslator::default()
            .visit_comparison(&Filter::like("age", 3));

        assert!(matches!(result, Err(DocumentStoreError::InvalidComparison(_))));
    }

    #[test]
    fn not_wraps_compound_child_in_nor() {
        let a = Filter::eq("a", 1);
        let b = Filter::gt("b", 2);
        let node = Filter::not(Filter::and([a, b]));

        assert_eq!(
            translate_conditions(&node).unwrap(),
            doc! { "$nor": [{ "$and": [{ "a": 1 }, { "b": { "$gt": 2 } }] }] },
        );
    }

    #[test]
    fn nested_nodes_recurse_in_order() {
        let node = Filter::or([
            Condition::from(Filter::eq("role", "admin")),
            Filter::and([Filter::gte("age", 18), Filter::lt("age", 65)]).into(),
        ]);

        assert_eq!(
            translate_conditions(&node).unwrap(),
            doc! {
                "$or": [
                    { "role": "admin" },
                    { "$and": [{ "age": { "$gte": 18 } }, { "age": { "$lt": 65 } }] },
                ]
            },
        );
    }

    #[test]
    fn empty_nodes_match_everything() {
        assert_eq!(translate_conditions(&OperationNode::default()).unwrap(), doc! {});
        assert_eq!(translate_conditions(&OperationNode::Or(vec![])).unwrap(), doc! {});
        assert_eq!(
            translate_conditions(&Filter::and([OperationNode::Or(vec![])])).unwrap(),
            doc! { "$and": [{}] },
        );
    }

    #[test]
    fn sort_keeps_field_order() {
        let sort: SortSpec = [("name", "asc"), ("age", "desc")].into_iter().collect();
        let translated = translate_sort(Some(&sort));

        assert_eq!(translated, doc! { "name": 1, "age": -1 });
        assert_eq!(translated.keys().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(translate_sort(None), doc! {});
    }
}
