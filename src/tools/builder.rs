//! Incremental construction of parameterized statements.
//!
//! Filters are collected as `(column, op, value)` entries and rendered once in
//! [`QueryBuilder::build`], so placeholder numbers always follow the order in
//! which filters were actually appended. Skipped filters consume no position.

use crate::models::{QueryParam, QueryPlan};

/// Comparison used by a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    ILike,
    Gte,
    Lte,
}

impl FilterOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::ILike => "ILIKE",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }
}

/// Render `column op $position`.
///
/// Text values are compared against `column::text`, so enum columns such as
/// `role` or `status` match their labels instead of failing with
/// `operator does not exist: <enum> = text`.
pub fn comparison(column: &str, op: FilterOp, position: usize, value: &QueryParam) -> String {
    match (op, value) {
        (FilterOp::Eq, QueryParam::String(_)) => {
            format!("{}::text {} ${}", column, op.as_sql(), position)
        }
        _ => format!("{} {} ${}", column, op.as_sql(), position),
    }
}

/// Trailing row cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// `LIMIT $k`, bound as the last parameter.
    Bound(i64),
    /// `LIMIT n` written into the statement.
    Fixed(u32),
}

#[derive(Debug, Clone)]
struct Filter {
    column: &'static str,
    op: FilterOp,
    cast: Option<&'static str>,
    value: QueryParam,
}

/// Builder for a single `SELECT` with optional `AND` filters.
///
/// The base statement must end in a `WHERE` clause (typically `WHERE 1=1`).
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base: String,
    base_params: Vec<QueryParam>,
    filters: Vec<Filter>,
    tail: Option<String>,
    limit: Option<Limit>,
}

impl QueryBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_base_params(base, Vec::new())
    }

    /// Base statement that already references `$1..$n` for `params`.
    pub fn with_base_params(base: impl Into<String>, params: Vec<QueryParam>) -> Self {
        Self {
            base: base.into(),
            base_params: params,
            filters: Vec::new(),
            tail: None,
            limit: None,
        }
    }

    /// Append `AND column op $k`.
    pub fn filter(
        &mut self,
        column: &'static str,
        op: FilterOp,
        value: impl Into<QueryParam>,
    ) -> &mut Self {
        self.filters.push(Filter {
            column,
            op,
            cast: None,
            value: value.into(),
        });
        self
    }

    /// Append `AND column op $k::cast`.
    pub fn filter_cast(
        &mut self,
        column: &'static str,
        op: FilterOp,
        cast: &'static str,
        value: impl Into<QueryParam>,
    ) -> &mut Self {
        self.filters.push(Filter {
            column,
            op,
            cast: Some(cast),
            value: value.into(),
        });
        self
    }

    /// Exact match, skipped when `value` is `None`.
    pub fn eq(&mut self, column: &'static str, value: Option<QueryParam>) -> &mut Self {
        if let Some(value) = value {
            self.filter(column, FilterOp::Eq, value);
        }
        self
    }

    /// Case-insensitive substring match, skipped when `value` is `None`.
    pub fn contains(&mut self, column: &'static str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.filter(column, FilterOp::ILike, format!("%{}%", value));
        }
        self
    }

    /// Timestamp lower bound (inclusive), skipped when `value` is `None`.
    pub fn since(&mut self, column: &'static str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.filter_cast(column, FilterOp::Gte, "timestamptz", value);
        }
        self
    }

    /// Timestamp upper bound (inclusive), skipped when `value` is `None`.
    pub fn until(&mut self, column: &'static str, value: Option<String>) -> &mut Self {
        if let Some(value) = value {
            self.filter_cast(column, FilterOp::Lte, "timestamptz", value);
        }
        self
    }

    /// Text placed after the filters, e.g. `GROUP BY` or `ORDER BY`.
    pub fn tail(&mut self, tail: impl Into<String>) -> &mut Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn limit(&mut self, limit: Limit) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Render the statement and its parameters.
    pub fn build(self) -> QueryPlan {
        let mut sql = self.base;
        let mut params = self.base_params;

        for filter in self.filters {
            let clause = comparison(filter.column, filter.op, params.len() + 1, &filter.value);
            params.push(filter.value);
            sql.push_str(" AND ");
            sql.push_str(&clause);
            if let Some(cast) = filter.cast {
                sql.push_str("::");
                sql.push_str(cast);
            }
        }

        if let Some(tail) = self.tail {
            sql.push(' ');
            sql.push_str(&tail);
        }

        match self.limit {
            Some(Limit::Bound(n)) => {
                params.push(QueryParam::Int(n));
                sql.push_str(&format!(" LIMIT ${}", params.len()));
            }
            Some(Limit::Fixed(n)) => sql.push_str(&format!(" LIMIT {}", n)),
            None => {}
        }

        QueryPlan::new(sql, params)
    }
}
