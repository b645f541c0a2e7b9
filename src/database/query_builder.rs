use chrono::NaiveDate;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs};
use sqlx::types::Json;
use sqlx::Postgres;

/// A typed positional parameter.
///
/// NULLs keep their Postgres type so `INSERT ... VALUES ($1)` into an
/// integer column works with a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i32>),
    BigInt(Option<i64>),
    Text(Option<String>),
    Bool(Option<bool>),
    Date(Option<NaiveDate>),
    Json(Option<Value>),
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(Some(v))
    }
}

impl From<Option<i32>> for SqlParam {
    fn from(v: Option<i32>) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::BigInt(Some(v))
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(Some(v))
    }
}

impl From<&String> for SqlParam {
    fn from(v: &String) -> Self {
        SqlParam::Text(Some(v.clone()))
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(Some(v.to_string()))
    }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self {
        SqlParam::Text(v)
    }
}

impl From<Option<&str>> for SqlParam {
    fn from(v: Option<&str>) -> Self {
        SqlParam::Text(v.map(str::to_string))
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(Some(v))
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(Some(v))
    }
}

impl From<Option<NaiveDate>> for SqlParam {
    fn from(v: Option<NaiveDate>) -> Self {
        SqlParam::Date(v)
    }
}

impl From<Value> for SqlParam {
    fn from(v: Value) -> Self {
        SqlParam::Json(Some(v))
    }
}

impl From<Option<Value>> for SqlParam {
    fn from(v: Option<Value>) -> Self {
        SqlParam::Json(v)
    }
}

/// Build a `Vec<SqlParam>` from heterogeneous values
#[macro_export]
macro_rules! sql_params {
    () => { Vec::<$crate::database::SqlParam>::new() };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::database::SqlParam::from($value)),+]
    };
}

pub fn bind_param_query<'q>(
    q: Query<'q, Postgres, PgArguments>,
    p: &SqlParam,
) -> Query<'q, Postgres, PgArguments> {
    match p.clone() {
        SqlParam::Int(v) => q.bind(v),
        SqlParam::BigInt(v) => q.bind(v),
        SqlParam::Text(v) => q.bind(v),
        SqlParam::Bool(v) => q.bind(v),
        SqlParam::Date(v) => q.bind(v),
        SqlParam::Json(v) => q.bind(v.map(Json)),
    }
}

pub fn bind_param_query_as<'q, T>(
    q: QueryAs<'q, Postgres, T, PgArguments>,
    p: &SqlParam,
) -> QueryAs<'q, Postgres, T, PgArguments> {
    match p.clone() {
        SqlParam::Int(v) => q.bind(v),
        SqlParam::BigInt(v) => q.bind(v),
        SqlParam::Text(v) => q.bind(v),
        SqlParam::Bool(v) => q.bind(v),
        SqlParam::Date(v) => q.bind(v),
        SqlParam::Json(v) => q.bind(v.map(Json)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_converts_mixed_values() {
        let params = crate::sql_params![1, "uaslp", None::<i32>, Some("x".to_string())];
        assert_eq!(
            params,
            vec![
                SqlParam::Int(Some(1)),
                SqlParam::Text(Some("uaslp".into())),
                SqlParam::Int(None),
                SqlParam::Text(Some("x".into())),
            ]
        );
        assert!(crate::sql_params![].is_empty());
    }
}
