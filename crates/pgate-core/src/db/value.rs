//! Conversion between JSON values and PostgreSQL values.
//!
//! Parameters arrive as untyped JSON while the server infers a type for
//! every placeholder, so [`SqlParam`] sends each value in PostgreSQL's text
//! format and lets the server parse it as whatever type it expects. Results
//! go the other way through [`Cell`], which decodes the binary format of the
//! common types into JSON.

use std::{error::Error, str};

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::trace;
use serde_json::{Number, Value};
use tokio_postgres::{
    types::{to_sql_checked, Format, FromSql, IsNull, Kind, ToSql, Type},
    Row,
};
use uuid::Uuid;

use crate::params::Record;

type BoxError = Box<dyn Error + Sync + Send>;

/// A JSON value bound as a statement parameter.
#[derive(Debug)]
pub struct SqlParam<'a>(pub &'a Value);

impl ToSql for SqlParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        trace!("Binding {} as {}", self.0, ty.name());
        let text = match self.0 {
            Value::Null => return Ok(IsNull::Yes),
            value if is_json(ty) => value.to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.clone(),
            Value::Array(items) => array_literal(items),
            Value::Object(_) => self.0.to_string(),
        };
        out.extend_from_slice(text.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

fn is_json(ty: &Type) -> bool {
    matches!(base_type(ty).name(), "json" | "jsonb")
}

fn base_type(ty: &Type) -> &Type {
    match ty.kind() {
        Kind::Domain(base) => base_type(base),
        _ => ty,
    }
}

/// Renders a JSON array as a PostgreSQL array literal such as
/// `{1,"two",NULL}`.
fn array_literal(items: &[Value]) -> String {
    let elements: Vec<String> = items
        .iter()
        .map(|item| match item {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => quote_array_element(s),
            Value::Array(nested) => array_literal(nested),
            Value::Object(_) => quote_array_element(&item.to_string()),
        })
        .collect();
    format!("{{{}}}", elements.join(","))
}

fn quote_array_element(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// One decoded result cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell(pub Value);

impl<'a> FromSql<'a> for Cell {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        decode(ty, raw).map(Cell)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Cell(Value::Null))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn decode(ty: &Type, raw: &[u8]) -> Result<Value, BoxError> {
    match ty.kind() {
        Kind::Domain(base) => return decode(base, raw),
        Kind::Enum(_) => return Ok(Value::String(str::from_utf8(raw)?.to_string())),
        Kind::Array(_) => {
            return Ok(match Vec::<Cell>::from_sql(ty, raw) {
                Ok(cells) => Value::Array(cells.into_iter().map(|Cell(v)| v).collect()),
                Err(e) => {
                    trace!("Cannot decode {} array: {e}", ty.name());
                    unsupported(ty)
                }
            });
        }
        _ => {}
    }

    let value = match ty.name() {
        "bool" => Value::Bool(bool::from_sql(ty, raw)?),
        "int2" => i16::from_sql(ty, raw)?.into(),
        "int4" => i32::from_sql(ty, raw)?.into(),
        "int8" => i64::from_sql(ty, raw)?.into(),
        "oid" => u32::from_sql(ty, raw)?.into(),
        "float4" => float(f64::from(f32::from_sql(ty, raw)?)),
        "float8" => float(f64::from_sql(ty, raw)?),
        "numeric" => Value::String(numeric_to_string(raw)?),
        "text" | "varchar" | "bpchar" | "name" | "unknown" | "citext" | "xml" => {
            Value::String(str::from_utf8(raw)?.to_string())
        }
        "char" => Value::String(char::from(i8::from_sql(ty, raw)? as u8).to_string()),
        "json" | "jsonb" => Value::from_sql(ty, raw)?,
        "uuid" => Value::String(Uuid::from_sql(ty, raw)?.to_string()),
        "timestamp" => Value::String(
            NaiveDateTime::from_sql(ty, raw)?
                .format("%Y-%m-%dT%H:%M:%S%.f")
                .to_string(),
        ),
        "timestamptz" => Value::String(DateTime::<Utc>::from_sql(ty, raw)?.to_rfc3339()),
        "date" => Value::String(NaiveDate::from_sql(ty, raw)?.to_string()),
        "time" => Value::String(NaiveTime::from_sql(ty, raw)?.to_string()),
        "bytea" => Value::String(format!("\\x{}", hex(raw))),
        _ => unsupported(ty),
    };
    Ok(value)
}

fn unsupported(ty: &Type) -> Value {
    Value::String(format!("<{}>", ty.name()))
}

fn float(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn hex(raw: &[u8]) -> String {
    raw.iter().map(|b| format!("{b:02x}")).collect()
}

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Decodes the binary NUMERIC format into its exact decimal text.
///
/// The wire layout is a header of four big-endian 16-bit fields (digit
/// count, weight of the first digit, sign, display scale) followed by base
/// 10000 digits.
fn numeric_to_string(raw: &[u8]) -> Result<String, BoxError> {
    let field = |i: usize| -> Result<u16, BoxError> {
        raw.get(i * 2..i * 2 + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".into())
    };

    let ndigits = usize::from(field(0)?);
    let weight = i32::from(field(1)? as i16);
    let sign = field(2)?;
    let scale = usize::from(field(3)?);

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(format!("invalid numeric sign {other:#x}").into()),
    }

    let digits = (0..ndigits)
        .map(|i| field(4 + i))
        .collect::<Result<Vec<u16>, BoxError>>()?;
    let digit = |index: i32| -> u16 {
        usize::try_from(index)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        out.push_str(&digit(0).to_string());
        for index in 1..=weight {
            out.push_str(&format!("{:04}", digit(index)));
        }
    }

    if scale > 0 {
        let mut fraction = String::with_capacity(scale + 4);
        let mut index = weight + 1;
        while fraction.len() < scale {
            fraction.push_str(&format!("{:04}", digit(index)));
            index += 1;
        }
        fraction.truncate(scale);
        out.push('.');
        out.push_str(&fraction);
    }

    Ok(out)
}

/// Converts a result row into a column-name keyed record, in column order.
pub fn row_to_record(row: &Row) -> Result<Record, tokio_postgres::Error> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let Cell(value) = row.try_get(index)?;
            Ok((column.name().to_string(), value))
        })
        .collect()
}
