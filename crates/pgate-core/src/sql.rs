//! SQL text assembly.
//!
//! Identifiers (schema, table and column names) always go through
//! [`quote_ident`]; values are never interpolated and travel as bound
//! parameters. The only caller-supplied fragments that reach the statement
//! verbatim are column types, default expressions and the WHERE condition
//! of an update.

use serde_json::Value;

use crate::{
    error::{GatewayError, Result},
    params::{ColumnDefinition, Record},
};

/// Largest number of bind parameters one statement may carry.
pub const MAX_BIND_PARAMETERS: usize = u16::MAX as usize;

/// Quotes an identifier so it is taken literally, case included.
///
/// # Errors
///
/// Returns `GatewayError::InvalidInput` for empty names and names containing
/// NUL bytes, which PostgreSQL cannot represent.
pub fn quote_ident(field: &str, name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(GatewayError::invalid_input(field).with_reason("must not be empty"));
    }
    if name.contains('\0') {
        return Err(GatewayError::invalid_input(field).with_reason("must not contain NUL bytes"));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quotes `schema.table`.
pub fn qualified_name(schema: &str, table: &str) -> Result<String> {
    Ok(format!(
        "{}.{}",
        quote_ident("schema_name", schema)?,
        quote_ident("table_name", table)?
    ))
}

/// Builds a CREATE TABLE statement.
///
/// Columns flagged as primary key are gathered into one trailing
/// `PRIMARY KEY (...)` clause.
pub fn create_table(
    schema: &str,
    table: &str,
    columns: &[ColumnDefinition],
    if_not_exists: bool,
) -> Result<String> {
    let target = qualified_name(schema, table)?;
    if columns.is_empty() {
        return Err(GatewayError::invalid_input("columns").with_reason("must not be empty"));
    }

    let mut definitions = Vec::with_capacity(columns.len() + 1);
    let mut primary_keys = Vec::new();

    for column in columns {
        if column.name.is_empty() || column.data_type.trim().is_empty() {
            return Err(GatewayError::invalid_input("columns")
                .with_reason("every column needs a non-empty name and type"));
        }
        let name = quote_ident("columns.name", &column.name)?;
        let mut definition = format!("{name} {}", column.data_type.trim());

        if column.nullable == Some(false) {
            definition.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            definition.push_str(" DEFAULT ");
            definition.push_str(&default_expression(&column.name, default)?);
        }
        if column.primary_key {
            primary_keys.push(name);
        }
        definitions.push(definition);
    }

    if !primary_keys.is_empty() {
        definitions.push(format!("PRIMARY KEY ({})", primary_keys.join(", ")));
    }

    let if_not_exists = if if_not_exists { "IF NOT EXISTS " } else { "" };
    Ok(format!(
        "CREATE TABLE {if_not_exists}{target} ({})",
        definitions.join(", ")
    ))
}

fn default_expression(column: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(true) => Ok("TRUE".to_string()),
        Value::Bool(false) => Ok("FALSE".to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(expression) if !expression.trim().is_empty() => Ok(expression.clone()),
        _ => Err(GatewayError::invalid_input("columns.default").with_reason(format!(
            "default for column '{column}' must be a SQL expression, number or boolean"
        ))),
    }
}

/// A statement together with its bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub text: String,
    pub params: Vec<Value>,
}

/// Builds one multi-row INSERT for `rows`.
///
/// The keys of the first row are the column list; keys missing from later
/// rows bind NULL and keys only present in later rows are ignored.
pub fn insert(schema: &str, table: &str, rows: &[Record]) -> Result<BoundStatement> {
    let target = qualified_name(schema, table)?;
    let first = rows
        .first()
        .ok_or_else(|| GatewayError::invalid_input("data").with_reason("must not be empty"))?;
    if first.is_empty() {
        return Err(GatewayError::invalid_input("data")
            .with_reason("the first record must contain at least one column"));
    }

    let columns: Vec<&String> = first.keys().collect();
    let total = columns.len() * rows.len();
    if total > MAX_BIND_PARAMETERS {
        return Err(GatewayError::invalid_input("data").with_reason(format!(
            "{} rows of {} columns need {total} parameters, more than the {MAX_BIND_PARAMETERS} \
             a single statement allows",
            rows.len(),
            columns.len()
        )));
    }

    let column_list = columns
        .iter()
        .map(|column| quote_ident("data", column))
        .collect::<Result<Vec<_>>>()?
        .join(", ");

    let mut params = Vec::with_capacity(total);
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let placeholders: Vec<String> = columns
            .iter()
            .map(|column| {
                params.push(row.get(*column).cloned().unwrap_or(Value::Null));
                format!("${}", params.len())
            })
            .collect();
        tuples.push(format!("({})", placeholders.join(", ")));
    }

    Ok(BoundStatement {
        text: format!(
            "INSERT INTO {target} ({column_list}) VALUES {}",
            tuples.join(", ")
        ),
        params,
    })
}

/// Builds an UPDATE with a mandatory WHERE condition.
///
/// SET values bind first as `$1..$k`; placeholders in `condition` are
/// numbered relative to `condition_params` and shifted past the SET values.
pub fn update(
    schema: &str,
    table: &str,
    values: &Record,
    condition: &str,
    condition_params: &[Value],
) -> Result<BoundStatement> {
    if condition.trim().is_empty() {
        return Err(GatewayError::invalid_input("condition").with_reason(
            "must not be empty; a WHERE condition is required to avoid updating every row",
        ));
    }
    let target = qualified_name(schema, table)?;
    if values.is_empty() {
        return Err(GatewayError::invalid_input("data").with_reason("must not be empty"));
    }

    let mut params = Vec::with_capacity(values.len() + condition_params.len());
    let mut assignments = Vec::with_capacity(values.len());
    for (column, value) in values {
        params.push(value.clone());
        assignments.push(format!("{} = ${}", quote_ident("data", column)?, params.len()));
    }
    let condition = renumber_placeholders(condition, values.len());
    params.extend(condition_params.iter().cloned());

    Ok(BoundStatement {
        text: format!(
            "UPDATE {target} SET {} WHERE {condition}",
            assignments.join(", ")
        ),
        params,
    })
}

/// Shifts every `$n` placeholder in `sql` by `offset`.
///
/// Quoted literals, quoted identifiers, dollar-quoted bodies and
/// identifiers that merely contain `$` are left untouched.
pub fn renumber_placeholders(sql: &str, offset: usize) -> String {
    if offset == 0 {
        return sql.to_string();
    }

    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                let backslash = c == '\'' && is_escape_prefix(&chars, i);
                let end = closing_quote(&chars, i, c, backslash);
                out.extend(&chars[i..end]);
                i = end;
            }
            '$' => {
                let after_identifier = i > 0 && is_ident_char(chars[i - 1]);
                let digits = chars[i + 1..]
                    .iter()
                    .take_while(|ch| ch.is_ascii_digit())
                    .count();

                if !after_identifier && digits > 0 {
                    let number: String = chars[i + 1..i + 1 + digits].iter().collect();
                    match number.parse::<usize>() {
                        Ok(n) => out.push_str(&format!("${}", n + offset)),
                        Err(_) => {
                            out.push('$');
                            out.push_str(&number);
                        }
                    }
                    i += 1 + digits;
                } else if !after_identifier {
                    match dollar_quote_end(&chars, i) {
                        Some(end) => {
                            out.extend(&chars[i..end]);
                            i = end;
                        }
                        None => {
                            out.push(c);
                            i += 1;
                        }
                    }
                } else {
                    out.push(c);
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether the quote at `quote` opens an `E'...'` escape string.
fn is_escape_prefix(chars: &[char], quote: usize) -> bool {
    quote > 0
        && matches!(chars[quote - 1], 'E' | 'e')
        && (quote < 2 || !is_ident_char(chars[quote - 2]))
}

/// Index just past the quote that closes the one at `start`; doubled
/// quotes are escapes, and so are backslashes when `backslash` is set.
fn closing_quote(chars: &[char], start: usize, quote: char, backslash: bool) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        if backslash && chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

/// For a `$tag$` opening at `start`, the index just past the matching
/// closing tag.
fn dollar_quote_end(chars: &[char], start: usize) -> Option<usize> {
    let tag_len = chars[start + 1..]
        .iter()
        .position(|&c| c == '$')
        .filter(|&len| {
            chars[start + 1..start + 1 + len]
                .iter()
                .all(|&c| c.is_alphanumeric() || c == '_')
        })?;
    let tag = &chars[start..start + tag_len + 2];
    let body = start + tag.len();

    (body..=chars.len().saturating_sub(tag.len()))
        .find(|&i| &chars[i..i + tag.len()] == tag)
        .map(|i| i + tag.len())
        .or(Some(chars.len()))
}
