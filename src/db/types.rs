//! PostgreSQL row to JSON mapping.
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Category-specific decoders handle the actual value extraction
//!
//! Values that cannot be decoded become JSON `null` and are logged.

use crate::models::Row;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueFormat, PgValueRef};
use sqlx::{Column, Decode, Row as _, Type, TypeInfo, ValueRef};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    Unknown,
}

/// Classify a PostgreSQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    match lower.as_str() {
        "timestamptz" => return TypeCategory::TimestampTz,
        "timestamp" => return TypeCategory::Timestamp,
        "date" => return TypeCategory::Date,
        "time" => return TypeCategory::Time,
        "interval" => return TypeCategory::Unknown,
        "bool" | "boolean" => return TypeCategory::Boolean,
        "json" | "jsonb" => return TypeCategory::Json,
        "uuid" => return TypeCategory::Uuid,
        "bytea" => return TypeCategory::Binary,
        "text" | "varchar" | "bpchar" | "char" | "name" | "citext" => return TypeCategory::Text,
        _ => {}
    }

    if lower.contains("numeric") || lower.contains("decimal") {
        return TypeCategory::Decimal;
    }
    if lower.starts_with("int") || lower.contains("serial") {
        return TypeCategory::Integer;
    }
    if lower.starts_with("float") || lower == "real" || lower.contains("double") {
        return TypeCategory::Float;
    }

    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("NUMERIC")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        match value.format() {
            PgValueFormat::Text => Ok(RawDecimal(value.as_str()?.to_string())),
            PgValueFormat::Binary => Ok(RawDecimal(numeric_binary_to_string(value.as_bytes()?)?)),
        }
    }
}

/// Render the PostgreSQL binary NUMERIC wire format as a decimal string.
///
/// Layout: ndigits, weight, sign, dscale (all 16-bit, big endian) followed by
/// `ndigits` base-10000 digit groups.
fn numeric_binary_to_string(buf: &[u8]) -> Result<String, sqlx::error::BoxDynError> {
    fn read_u16(buf: &[u8], at: usize) -> Result<u16, sqlx::error::BoxDynError> {
        buf.get(at..at + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated NUMERIC value".into())
    }

    let ndigits = read_u16(buf, 0)? as usize;
    let weight = read_u16(buf, 2)? as i16 as i32;
    let sign = read_u16(buf, 4)?;
    let dscale = read_u16(buf, 6)? as usize;

    match sign {
        0xC000 => return Ok("NaN".to_string()),
        0xD000 => return Ok("Infinity".to_string()),
        0xF000 => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let digits = (0..ndigits)
        .map(|i| read_u16(buf, 8 + i * 2))
        .collect::<Result<Vec<u16>, _>>()?;

    let mut int_part = String::new();
    for pos in 0..=weight.max(-1) {
        let group = digits.get(pos as usize).copied().unwrap_or(0);
        if int_part.is_empty() {
            if group != 0 || pos == weight {
                int_part.push_str(&group.to_string());
            }
        } else {
            int_part.push_str(&format!("{:04}", group));
        }
    }
    if int_part.is_empty() {
        int_part.push('0');
    }

    let mut frac_part = String::new();
    if dscale > 0 {
        let mut pos = weight + 1;
        while frac_part.len() < dscale {
            let group = if pos < 0 {
                0
            } else {
                digits.get(pos as usize).copied().unwrap_or(0)
            };
            frac_part.push_str(&format!("{:04}", group));
            pos += 1;
        }
        frac_part.truncate(dscale);
    }

    let mut out = String::new();
    if sign == 0x4000 {
        out.push('-');
    }
    out.push_str(&int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    Ok(out)
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Decode binary data to JSON value.
///
/// Valid UTF-8 is returned as text; anything else is base64 encoded.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> Row;
}

impl RowToJson for PgRow {
    fn to_json_map(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name());
                (col.name().to_string(), decode_column(self, idx, category))
            })
            .collect()
    }
}

// =============================================================================
// Decoders
// =============================================================================

fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
    match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_opt::<bool>(row, idx).map_or(JsonValue::Null, JsonValue::Bool),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Binary => decode_opt::<Vec<u8>>(row, idx)
            .map_or(JsonValue::Null, |v| decode_binary_value(&v)),
        TypeCategory::Json => decode_opt::<JsonValue>(row, idx).unwrap_or(JsonValue::Null),
        TypeCategory::Uuid => decode_opt::<sqlx::types::Uuid>(row, idx)
            .map_or(JsonValue::Null, |v| JsonValue::String(v.to_string())),
        TypeCategory::TimestampTz => decode_opt::<chrono::DateTime<chrono::Utc>>(row, idx)
            .map_or(JsonValue::Null, |v| JsonValue::String(v.to_rfc3339())),
        TypeCategory::Timestamp => decode_opt::<chrono::NaiveDateTime>(row, idx)
            .map_or(JsonValue::Null, |v| {
                JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }),
        TypeCategory::Date => decode_opt::<chrono::NaiveDate>(row, idx)
            .map_or(JsonValue::Null, |v| JsonValue::String(v.to_string())),
        TypeCategory::Time => decode_opt::<chrono::NaiveTime>(row, idx)
            .map_or(JsonValue::Null, |v| JsonValue::String(v.to_string())),
        TypeCategory::Text => {
            decode_opt::<String>(row, idx).map_or(JsonValue::Null, JsonValue::String)
        }
        TypeCategory::Unknown => decode_unknown(row, idx),
    }
}

/// Enums, domains over text and other types without a dedicated decoder.
fn decode_unknown(row: &PgRow, idx: usize) -> JsonValue {
    let Ok(raw) = row.try_get_raw(idx) else {
        return JsonValue::Null;
    };
    if raw.is_null() {
        return JsonValue::Null;
    }
    let format = raw.format();
    match raw.as_bytes() {
        Ok(bytes) => {
            let value = decode_unknown_value(bytes, format);
            if value.is_null() {
                let type_info = raw.type_info();
                tracing::debug!(
                    column = idx,
                    type_name = type_info.name(),
                    "Value of unknown type is not text, returning null"
                );
            }
            value
        }
        Err(_) => JsonValue::Null,
    }
}

/// Raw bytes of an unknown-type value as a JSON string.
///
/// Text-format values are the type's output text. In binary format, enum
/// labels are sent as their UTF-8 text too; bytes that are not UTF-8, or that
/// contain NUL (never valid in PostgreSQL text), are a binary layout and
/// become `null`.
pub fn decode_unknown_value(bytes: &[u8], format: PgValueFormat) -> JsonValue {
    match std::str::from_utf8(bytes) {
        Ok(s) if format == PgValueFormat::Text || !s.contains('\0') => {
            JsonValue::String(s.to_string())
        }
        _ => JsonValue::Null,
    }
}

fn decode_opt<'r, T>(row: &'r PgRow, idx: usize) -> Option<T>
where
    T: Decode<'r, sqlx::Postgres> + Type<sqlx::Postgres>,
{
    match row.try_get::<Option<T>, _>(idx) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(column = idx, error = %e, "Column not decodable, returning null");
            None
        }
    }
}

fn decode_decimal(row: &PgRow, idx: usize) -> JsonValue {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => JsonValue::String(v.0),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            tracing::error!("Failed to decode NUMERIC: {:?}", e);
            JsonValue::Null
        }
    }
}

fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Null;
    }
    if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
        return JsonValue::Number(v.into());
    }
    JsonValue::Null
}

fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
        return serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
        return serde_json::Number::from_f64(v as f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    JsonValue::Null
}
