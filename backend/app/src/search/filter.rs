//! JSON filter trees for list endpoints.
//!
//! ```json
//! {"and": [
//!     {"field": "status", "op": "==", "value": "active"},
//!     {"or": [
//!         {"field": "title", "op": "ilike", "value": "%phish%"},
//!         {"field": "reported_at", "op": ">=", "value": "2024-01-01T00:00:00Z"}
//!     ]}
//! ]}
//! ```
//!
//! A bare list is treated as `and`. Values are coerced to the column type.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ColumnType, Condition, Value, sea_query::SimpleExpr};
use serde::Deserialize;
use serde_json::Value as Json;

use super::{Searchable, lower};
use crate::common::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Node {
    And { and: Vec<Node> },
    Or { or: Vec<Node> },
    Not { not: Box<Node> },
    Leaf(Leaf),
    List(Vec<Node>),
}

#[derive(Debug, Deserialize)]
struct Leaf {
    field: String,
    op: Op,
    #[serde(default)]
    value: Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
enum Op {
    #[serde(rename = "==", alias = "eq")]
    Eq,
    #[serde(rename = "!=", alias = "ne")]
    Ne,
    #[serde(rename = ">", alias = "gt")]
    Gt,
    #[serde(rename = ">=", alias = "ge")]
    Ge,
    #[serde(rename = "<", alias = "lt")]
    Lt,
    #[serde(rename = "<=", alias = "le")]
    Le,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "ilike")]
    ILike,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not_in")]
    NotIn,
    #[serde(rename = "is_null")]
    IsNull,
    #[serde(rename = "is_not_null")]
    IsNotNull,
}

pub fn parse<E: Searchable>(raw: &str) -> ApiResult<Condition> {
    let node: Node = serde_json::from_str(raw)
        .map_err(|e| filter_error(format!("Malformed filter: {e}")))?;

    build::<E>(&node).map_err(filter_error)
}

fn filter_error(msg: String) -> ApiError {
    ApiError::field("filter", msg, "value_error")
}

fn build<E: Searchable>(node: &Node) -> Result<Condition, String> {
    match node {
        Node::And { and } | Node::List(and) => group::<E>(Condition::all(), and),
        Node::Or { or } => group::<E>(Condition::any(), or),
        Node::Not { not } => Ok(build::<E>(not)?.not()),
        Node::Leaf(leaf) => Ok(Condition::all().add(leaf_expr::<E>(leaf)?)),
    }
}

fn group<E: Searchable>(condition: Condition, nodes: &[Node]) -> Result<Condition, String> {
    nodes
        .iter()
        .try_fold(condition, |condition, node| Ok(condition.add(build::<E>(node)?)))
}

fn leaf_expr<E: Searchable>(leaf: &Leaf) -> Result<SimpleExpr, String> {
    let column = E::column(&leaf.field).ok_or_else(|| format!("Unknown filter field: {}", leaf.field))?;
    let column_type = column.def().get_column_type().clone();

    let expr = match leaf.op {
        Op::IsNull => column.is_null(),
        Op::IsNotNull => column.is_not_null(),
        Op::Eq => column.eq(coerce(&column_type, &leaf.value, &leaf.field)?),
        Op::Ne => column.ne(coerce(&column_type, &leaf.value, &leaf.field)?),
        Op::Gt => column.gt(coerce(&column_type, &leaf.value, &leaf.field)?),
        Op::Ge => column.gte(coerce(&column_type, &leaf.value, &leaf.field)?),
        Op::Lt => column.lt(coerce(&column_type, &leaf.value, &leaf.field)?),
        Op::Le => column.lte(coerce(&column_type, &leaf.value, &leaf.field)?),
        Op::Like => column.like(pattern(&leaf.value, &leaf.field)?),
        Op::ILike => lower::<E>(column).like(pattern(&leaf.value, &leaf.field)?.to_lowercase()),
        Op::In | Op::NotIn => {
            let Json::Array(items) = &leaf.value else {
                return Err(format!("Operator in/not_in on {} needs a list", leaf.field));
            };
            let values = items
                .iter()
                .map(|item| coerce(&column_type, item, &leaf.field))
                .collect::<Result<Vec<_>, _>>()?;
            if leaf.op == Op::In {
                column.is_in(values)
            } else {
                column.is_not_in(values)
            }
        }
    };

    Ok(expr)
}

fn pattern(value: &Json, field: &str) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("Pattern for {field} must be a string"))
}

fn coerce(column_type: &ColumnType, value: &Json, field: &str) -> Result<Value, String> {
    let mismatch = || format!("Value {value} does not fit field {field}");

    match column_type {
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger => match value {
            Json::Number(n) => n.as_i64().map(Value::from).ok_or_else(mismatch),
            Json::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) => match value {
            Json::Number(n) => n.as_f64().map(Value::from).ok_or_else(mismatch),
            Json::String(s) => s.trim().parse::<f64>().map(Value::from).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ColumnType::Boolean => match value {
            Json::Bool(b) => Ok(Value::from(*b)),
            Json::String(s) => s.trim().parse::<bool>().map(Value::from).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ColumnType::TimestampWithTimeZone | ColumnType::Timestamp | ColumnType::DateTime => {
            let raw = value.as_str().ok_or_else(mismatch)?;
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| Value::from(dt.with_timezone(&Utc)))
                .map_err(|_| mismatch())
        }
        _ => match value {
            Json::String(s) => Ok(Value::from(s.clone())),
            Json::Number(n) => Ok(Value::from(n.to_string())),
            Json::Bool(b) => Ok(Value::from(b.to_string())),
            _ => Err(mismatch()),
        },
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::*;
    use crate::entity::{case, definition};

    fn sql_for(raw: &str) -> String {
        case::Entity::find()
            .filter(parse::<case::Entity>(raw).unwrap())
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn nested_groups_render_as_and_or() {
        let sql = sql_for(
            r#"{"and": [
                {"field": "status", "op": "==", "value": "active"},
                {"or": [
                    {"field": "title", "op": "ilike", "value": "%PHISH%"},
                    {"field": "projectId", "op": "in", "value": [1, "2"]}
                ]}
            ]}"#,
        );
        assert!(sql.contains(r#""cases"."status" = 'active'"#), "{sql}");
        assert!(sql.contains(r#"LOWER("cases"."title") LIKE '%phish%'"#), "{sql}");
        assert!(sql.contains(r#""cases"."project_id" IN (1, 2)"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn bare_list_means_and() {
        let sql = sql_for(
            r#"[{"field": "resolution", "op": "is_null"}, {"field": "id", "op": ">", "value": 3}]"#,
        );
        assert!(sql.contains(r#""cases"."resolution" IS NULL"#), "{sql}");
        assert!(sql.contains(r#""cases"."id" > 3"#), "{sql}");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse::<definition::Entity>(r#"{"field": "color", "op": "==", "value": "x"}"#)
            .unwrap_err();
        let ApiError::Validation(details) = err else {
            panic!("expected validation error");
        };
        assert_eq!(details[0].loc, vec!["filter".to_string()]);
        assert!(details[0].msg.contains("color"));
    }

    #[test]
    fn wrong_value_shapes_are_rejected() {
        assert!(parse::<case::Entity>(r#"{"field": "id", "op": "==", "value": "abc"}"#).is_err());
        assert!(parse::<case::Entity>(r#"{"field": "id", "op": "in", "value": 1}"#).is_err());
        assert!(
            parse::<case::Entity>(r#"{"field": "reported_at", "op": ">", "value": "yesterday"}"#)
                .is_err()
        );
        assert!(parse::<case::Entity>("not json").is_err());
        assert!(parse::<case::Entity>(r#"{"field": "id", "op": "~", "value": 1}"#).is_err());
    }
}
