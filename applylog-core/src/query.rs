//! Query construction and filtering API for document stores.
//!
//! This module provides query construction with exact-match filtering, sorting and
//! offset/limit pagination, plus a visitor trait that backends implement to translate
//! or evaluate filter expressions.
//!
//! # Query Building
//!
//! ```ignore
//! use applylog_core::query::{Query, Filter, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("status", "applied"))
//!     .sort("last_updated", SortDirection::Desc)
//!     .offset(0)
//!     .limit(100)
//!     .build();
//! ```

use bson::Bson;

use crate::error::StoreError;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (earliest to latest).
    Asc,
    /// Descending order (latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// A filter expression for querying documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match). An empty list matches everything.
    And(Vec<Expr>),
    /// Exact match of a top-level field against a value.
    Eq {
        /// The field name to compare.
        field: String,
        /// The value the field must equal.
        value: Bson,
    },
}

impl Expr {
    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }
}

/// A structured query for retrieving and filtering documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Optional filter expression to match documents.
    pub filter: Option<Expr>,
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    /// Number of documents to skip.
    pub offset: Option<u64>,
    /// Sort specification for results.
    pub sort: Option<Sort>,
}

impl Query {
    /// Creates a new empty query with no filters or limits.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Helper struct for constructing filter expressions.
pub struct Filter;

impl Filter {
    /// Creates an equality filter expression.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::Eq { field: field.into(), value: value.into() }
    }

    /// Creates a logical AND filter expression.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter expression for this query.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Sets the number of documents to skip.
    pub fn offset(mut self, offset: u64) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Sets the sort specification for the query results.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort { field: field.into(), direction });
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

pub trait QueryVisitor {
    type Output;
    type Error: Into<StoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Eq { field, value } => self.visit_eq(field, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_appends_to_existing_conjunction() {
        let expr = Filter::eq("category", "campus")
            .and(Filter::eq("status", "applied"))
            .and(Filter::eq("role", "SWE"));

        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected conjunction, got {other:?}"),
        }
    }

    #[test]
    fn builder_sets_every_clause() {
        let query = Query::builder()
            .filter(Filter::eq("status", "offer"))
            .sort("last_updated", SortDirection::Desc)
            .offset(5)
            .limit(10)
            .build();

        assert_eq!(query.offset, Some(5));
        assert_eq!(query.limit, Some(10));
        assert_eq!(
            query.sort,
            Some(Sort { field: "last_updated".into(), direction: SortDirection::Desc })
        );
        assert_eq!(query.filter, Some(Filter::eq("status", "offer")));
    }
}
