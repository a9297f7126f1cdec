//! Postgres-backed warehouse client
//!
//! Executes the domain's parameterized statements. Statement text arrives
//! with `@name` placeholders and backtick-quoted relation names; Postgres
//! wants `$n` positional binds and double-quoted identifiers, so the client
//! rewrites the text, binds the JSON values in placeholder order, and decodes
//! result rows back into JSON maps by column type.

use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::{json, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row as _, TypeInfo, ValueRef};
use tracing::warn;

use core_kernel::Statement;
use domain_policy::ports::{Row, WarehouseError, WarehousePort};

use crate::pool::WarehousePool;

/// [`WarehousePort`] adapter over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgWarehouse {
    pool: WarehousePool,
}

impl PgWarehouse {
    pub fn new(pool: WarehousePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarehousePort for PgWarehouse {
    async fn execute(&self, statement: &Statement) -> Result<Vec<Row>, WarehouseError> {
        let (sql, order) = render_positional(&statement.sql);

        let mut query = sqlx::query(&sql);
        for name in &order {
            let value = statement.params.get(name).cloned().unwrap_or(Value::Null);
            query = bind_value(query, value);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter().map(row_to_json).collect()
    }
}

/// Rewrites `@name` placeholders to `$n` positional binds (repeated names
/// share one bind) and normalizes backtick-quoted identifiers to double
/// quotes. Single-quoted literals pass through untouched.
fn render_positional(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut order: Vec<String> = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                out.push('\'');
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == '\'' {
                        // '' is an escaped quote inside the literal
                        if chars.peek() == Some(&'\'') {
                            out.push(chars.next().unwrap());
                        } else {
                            break;
                        }
                    }
                }
            }
            '`' => out.push('"'),
            '@' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    out.push('@');
                    continue;
                }
                let index = match order.iter().position(|seen| *seen == name) {
                    Some(index) => index,
                    None => {
                        order.push(name);
                        order.len() - 1
                    }
                };
                out.push('$');
                out.push_str(&(index + 1).to_string());
            }
            other => out.push(other),
        }
    }

    (out, order)
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else if let Some(f) = n.as_f64() {
                query.bind(f)
            } else {
                query.bind(n.to_string())
            }
        }
        Value::String(s) => query.bind(s),
        // Arrays and objects travel as jsonb
        composite @ (Value::Array(_) | Value::Object(_)) => query.bind(composite),
    }
}

fn map_sqlx_error(error: sqlx::Error) -> WarehouseError {
    match error {
        sqlx::Error::PoolTimedOut => {
            WarehouseError::ConnectionFailed("connection pool exhausted".to_string())
        }
        sqlx::Error::Io(e) => WarehouseError::ConnectionFailed(e.to_string()),
        sqlx::Error::Database(db) => WarehouseError::query(db.message().to_string()),
        sqlx::Error::ColumnDecode { index, source } => {
            WarehouseError::decode(format!("column {index}: {source}"))
        }
        other => WarehouseError::query(other.to_string()),
    }
}

fn row_to_json(row: &PgRow) -> Result<Row, WarehouseError> {
    let mut out = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        out.insert(column.name().to_string(), decode_column(row, index)?);
    }
    Ok(out)
}

fn decode_column(row: &PgRow, index: usize) -> Result<Value, WarehouseError> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| WarehouseError::decode(e.to_string()))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let column = &row.columns()[index];
    let type_name = column.type_info().name().to_string();
    let decode_err = map_sqlx_error;

    let value = match type_name.as_str() {
        "BOOL" => json!(row.try_get::<bool, _>(index).map_err(decode_err)?),
        "INT2" => json!(row.try_get::<i16, _>(index).map_err(decode_err)?),
        "INT4" => json!(row.try_get::<i32, _>(index).map_err(decode_err)?),
        "INT8" => json!(row.try_get::<i64, _>(index).map_err(decode_err)?),
        "FLOAT4" => json!(row.try_get::<f32, _>(index).map_err(decode_err)?),
        "FLOAT8" => json!(row.try_get::<f64, _>(index).map_err(decode_err)?),
        "TEXT" | "VARCHAR" | "CHAR" | "NAME" => {
            json!(row.try_get::<String, _>(index).map_err(decode_err)?)
        }
        "UUID" => json!(row
            .try_get::<uuid::Uuid, _>(index)
            .map_err(decode_err)?
            .to_string()),
        "TIMESTAMPTZ" => json!(row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(index)
            .map_err(decode_err)?
            .to_rfc3339_opts(SecondsFormat::Micros, true)),
        "TIMESTAMP" => json!(row
            .try_get::<chrono::NaiveDateTime, _>(index)
            .map_err(decode_err)?
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string()),
        "DATE" => json!(row
            .try_get::<chrono::NaiveDate, _>(index)
            .map_err(decode_err)?
            .to_string()),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index).map_err(decode_err)?,
        "TEXT[]" | "VARCHAR[]" => {
            json!(row.try_get::<Vec<String>, _>(index).map_err(decode_err)?)
        }
        other => {
            warn!(
                column = column.name(),
                r#type = other,
                "unsupported column type, returning null"
            );
            Value::Null
        }
    };
    Ok(value)
}
