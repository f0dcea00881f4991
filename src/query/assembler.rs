//! # Query Assembler
//!
//! Compiles a whole query expression into an ordered pipeline, one stage per
//! root clause, in the order the expression lists them.

use super::compiler::FilterCompiler;
use super::errors::QueryResult;
use super::stage::Stage;
use super::value::QueryExpression;

#[derive(Debug, Clone)]
pub struct QueryAssembler {
    compiler: FilterCompiler,
}

impl QueryAssembler {
    pub fn new(compiler: FilterCompiler) -> Self {
        Self { compiler }
    }

    pub fn compiler(&self) -> &FilterCompiler {
        &self.compiler
    }

    /// Compile every clause. The first failing clause aborts compilation;
    /// no partial pipeline is returned.
    pub fn compile_query(&self, expression: &QueryExpression) -> QueryResult<Vec<Stage>> {
        expression
            .clauses()
            .iter()
            .map(|(key, value)| self.compiler.compile_clause(key, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryError, QueryValue};
    use serde_json::json;

    fn assembler() -> QueryAssembler {
        QueryAssembler::new(FilterCompiler::new("urn:example:RangeSelector"))
    }

    #[test]
    fn test_stages_follow_clause_order() {
        let expr = QueryExpression::from_json(json!({
            "type": "Annotation",
            "body.purpose": "tagging",
            "body.value": {"isNot": "draft"}
        }))
        .unwrap();

        let stages = assembler().compile_query(&expr).unwrap();
        let rendered: Vec<_> = stages.iter().map(Stage::to_json).collect();
        assert_eq!(
            rendered,
            vec![
                json!({"$match": {"annotation.type": "Annotation"}}),
                json!({"$match": {"annotation.body.purpose": "tagging"}}),
                json!({"$match": {"annotation.body.value": {"$ne": "draft"}}}),
            ]
        );
    }

    #[test]
    fn test_first_error_aborts() {
        let expr = QueryExpression::new()
            .clause("type", "Annotation")
            .clause(QueryValue::integer(7), "x")
            .clause(":nope", "y");

        let err = assembler().compile_query(&expr).unwrap_err();
        assert_eq!(err, QueryError::UnexpectedField("7".to_string()));
    }

    #[test]
    fn test_empty_expression_compiles_to_empty_pipeline() {
        let stages = assembler().compile_query(&QueryExpression::new()).unwrap();
        assert!(stages.is_empty());
    }
}
