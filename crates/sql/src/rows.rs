//! Conversion of driver rows into JSON objects.
//!
//! Values are decoded by the column's reported type. Decimals keep their
//! exact text, temporal values use ISO-8601, and anything that cannot be
//! decoded becomes `null` with a debug log.

use crate::session::JsonRow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::types::{Decimal, Uuid};
use sqlx::{Column, ColumnIndex, Decode, Row, Type, TypeInfo};
use tracing::debug;

/// Decode column `idx` as `T`, `None` when the type does not fit.
fn decode<'r, R, T>(row: &'r R, idx: usize) -> Option<Option<T>>
where
    R: Row,
    usize: ColumnIndex<R>,
    T: Decode<'r, R::Database> + Type<R::Database>,
{
    row.try_get::<Option<T>, _>(idx).ok()
}

fn json<T: Into<Value>>(value: Option<Option<T>>) -> Option<Value> {
    value.map(|v| v.map_or(Value::Null, Into::into))
}

fn text<T: ToString>(value: Option<Option<T>>) -> Option<Value> {
    value.map(|v| v.map_or(Value::Null, |v| Value::String(v.to_string())))
}

fn bytes(value: Option<Option<Vec<u8>>>) -> Option<Value> {
    value.map(|v| {
        v.map_or(Value::Null, |b| {
            Value::String(String::from_utf8_lossy(&b).into_owned())
        })
    })
}

fn naive_datetime(value: Option<Option<NaiveDateTime>>) -> Option<Value> {
    text(value.map(|v| v.map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())))
}

fn utc_datetime(value: Option<Option<DateTime<Utc>>>) -> Option<Value> {
    text(value.map(|v| v.map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))))
}

fn collect<R, F>(row: &R, convert: F) -> JsonRow
where
    R: Row,
    F: Fn(&R, usize, &str) -> Option<Value>,
{
    row.columns()
        .iter()
        .map(|column| {
            let idx = column.ordinal();
            let type_name = column.type_info().name();
            let value = convert(row, idx, type_name).unwrap_or_else(|| {
                debug!(column = column.name(), column_type = type_name, "Undecodable column");
                Value::Null
            });
            (column.name().to_string(), value)
        })
        .collect()
}

pub fn mysql_row(row: &MySqlRow) -> JsonRow {
    collect(row, mysql_value)
}

fn mysql_value(row: &MySqlRow, idx: usize, type_name: &str) -> Option<Value> {
    match type_name {
        "BOOLEAN" => json(decode::<_, bool>(row, idx)),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            json(decode::<_, i64>(row, idx))
        }
        t if t.ends_with("UNSIGNED") => json(decode::<_, u64>(row, idx)),
        "YEAR" => json(decode::<_, u16>(row, idx)),
        "FLOAT" => json(decode::<_, f32>(row, idx).map(|v| v.map(f64::from))),
        "DOUBLE" => json(decode::<_, f64>(row, idx)),
        "DECIMAL" => text(decode::<_, Decimal>(row, idx)),
        "DATE" => text(decode::<_, NaiveDate>(row, idx)),
        "TIME" => text(decode::<_, NaiveTime>(row, idx)),
        "DATETIME" => naive_datetime(decode(row, idx)),
        "TIMESTAMP" => utc_datetime(decode(row, idx)),
        "JSON" => json(decode::<_, Value>(row, idx)),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            bytes(decode(row, idx))
        }
        "NULL" => Some(Value::Null),
        _ => None,
    }
    .or_else(|| json(decode::<_, String>(row, idx)))
}

pub fn pg_row(row: &PgRow) -> JsonRow {
    collect(row, pg_value)
}

fn pg_value(row: &PgRow, idx: usize, type_name: &str) -> Option<Value> {
    match type_name {
        "BOOL" => json(decode::<_, bool>(row, idx)),
        "INT2" => json(decode::<_, i16>(row, idx)),
        "INT4" => json(decode::<_, i32>(row, idx)),
        "INT8" => json(decode::<_, i64>(row, idx)),
        "OID" => json(decode::<_, sqlx::postgres::types::Oid>(row, idx).map(|v| v.map(|o| o.0))),
        "FLOAT4" => json(decode::<_, f32>(row, idx).map(|v| v.map(f64::from))),
        "FLOAT8" => json(decode::<_, f64>(row, idx)),
        "NUMERIC" => text(decode::<_, Decimal>(row, idx)),
        "UUID" => text(decode::<_, Uuid>(row, idx)),
        "JSON" | "JSONB" => json(decode::<_, Value>(row, idx)),
        "DATE" => text(decode::<_, NaiveDate>(row, idx)),
        "TIME" => text(decode::<_, NaiveTime>(row, idx)),
        "TIMESTAMP" => naive_datetime(decode(row, idx)),
        "TIMESTAMPTZ" => utc_datetime(decode(row, idx)),
        "BYTEA" => bytes(decode(row, idx)),
        "TEXT[]" | "VARCHAR[]" | "NAME[]" => json(decode::<_, Vec<String>>(row, idx)),
        "INT4[]" => json(decode::<_, Vec<i32>>(row, idx)),
        "INT8[]" => json(decode::<_, Vec<i64>>(row, idx)),
        "VOID" => Some(Value::Null),
        _ => None,
    }
    .or_else(|| json(decode::<_, String>(row, idx)))
}
