//! Parameter binding utilities for database queries.
//!
//! Binds `QueryParam` values, in order, onto a PostgreSQL query.

use crate::models::QueryParam;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;

/// Bind a parameter to a PostgreSQL query.
pub(crate) fn bind_postgres_param<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
    }
}

/// Bind every parameter of a plan, preserving positional order.
pub(crate) fn bind_all<'q>(
    sql: &'q str,
    params: &'q [QueryParam],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, param| bind_postgres_param(query, param))
}
