//! Query expression evaluation for in-memory document filtering.
//!
//! This module provides the evaluation engine for query expressions,
//! enabling filtering and ordering of BSON documents.

use std::cmp::Ordering;
use bson::{Bson, Document, datetime::DateTime};

use applylog_core::{
    error::{StoreError, StoreResult},
    query::{Expr, QueryVisitor},
};


/// Comparable representation of the BSON values records are filtered and sorted on.
///
/// Numeric types are normalised to f64 so that an Int32 stored by one writer
/// compares equal to an Int64 or Double supplied by another.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null or missing
    Null,
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    /// Any other BSON type; never equal to anything and unordered
    Unsupported,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            _ => Comparable::Unsupported,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            // Missing values sort before everything, as in MongoDB.
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Null, _) => Some(Ordering::Less),
            (_, Comparable::Null) => Some(Ordering::Greater),
            _ => None,
        }
    }
}

impl<'a> Comparable<'a> {
    /// Reads a top-level field, treating a missing field as `Null`.
    pub(crate) fn field(document: &'a Document, field: &str) -> Self {
        document
            .get(field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null)
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> StoreResult<bool> {
        self.visit_expr(expr)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        match self.document.get(field) {
            Some(field_value) => Ok(Comparable::from(field_value) == Comparable::from(value)),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use applylog_core::query::Filter;
    use bson::doc;

    #[test]
    fn eq_matches_exact_values_only() {
        let document = doc! { "category": "campus", "status": "applied" };
        let mut evaluator = DocumentEvaluator::new(&document);

        assert!(evaluator.evaluate(&Filter::eq("category", "campus")).unwrap());
        assert!(!evaluator.evaluate(&Filter::eq("category", "Campus")).unwrap());
        assert!(!evaluator.evaluate(&Filter::eq("missing", "campus")).unwrap());
    }

    #[test]
    fn and_requires_every_clause() {
        let document = doc! { "category": "campus", "status": "applied" };
        let mut evaluator = DocumentEvaluator::new(&document);

        let both = Filter::and([Filter::eq("category", "campus"), Filter::eq("status", "applied")]);
        let mismatch = Filter::and([Filter::eq("category", "campus"), Filter::eq("status", "offer")]);

        assert!(evaluator.evaluate(&both).unwrap());
        assert!(!evaluator.evaluate(&mismatch).unwrap());
        assert!(evaluator.evaluate(&Expr::And(vec![])).unwrap());
    }

    #[test]
    fn numbers_compare_across_widths() {
        let document = doc! { "count": 3_i32 };
        let mut evaluator = DocumentEvaluator::new(&document);

        assert!(evaluator.evaluate(&Filter::eq("count", 3_i64)).unwrap());
    }

    #[test]
    fn unsupported_values_never_match() {
        let document = doc! { "tags": ["a"], "flag": true };
        let mut evaluator = DocumentEvaluator::new(&document);

        assert!(!evaluator.evaluate(&Filter::eq("tags", vec!["a"])).unwrap());
        assert!(!evaluator.evaluate(&Filter::eq("flag", true)).unwrap());
    }

    #[test]
    fn missing_fields_sort_first() {
        let present = doc! { "last_updated": DateTime::from_millis(10) };
        let missing = doc! {};

        assert_eq!(
            Comparable::field(&missing, "last_updated")
                .partial_cmp(&Comparable::field(&present, "last_updated")),
            Some(Ordering::Less)
        );
    }
}
