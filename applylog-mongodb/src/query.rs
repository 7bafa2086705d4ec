//! Query translation from the filter AST to MongoDB query syntax.

use bson::{Bson, Document, doc};

use applylog_core::{
    error::StoreError,
    query::{Expr, QueryVisitor},
};

use crate::sanitizer::KeySanitizer;


/// Translates filter expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        // MongoDB rejects an empty $and array.
        if exprs.is_empty() {
            return Ok(doc! {});
        }

        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        let field = KeySanitizer::sanitize_key(field);

        Ok(doc! {
            field: { "$eq": value },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use applylog_core::query::Filter;

    #[test]
    fn translates_conjunction_of_equalities() {
        let expr = Filter::eq("category", "campus").and(Filter::eq("status", "applied"));

        let translated = MongoQueryTranslator.visit_expr(&expr).unwrap();

        assert_eq!(
            translated,
            doc! {
                "$and": [
                    { "category": { "$eq": "campus" } },
                    { "status": { "$eq": "applied" } },
                ]
            }
        );
    }

    #[test]
    fn empty_conjunction_matches_everything() {
        let translated = MongoQueryTranslator.visit_expr(&Expr::And(vec![])).unwrap();

        assert_eq!(translated, doc! {});
    }
}
