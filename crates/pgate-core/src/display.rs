//! Markdown rendering of operation results.
//!
//! Every result type implements [`fmt::Display`] producing markdown, so the
//! terminal renderer and plain `println!` share one formatting path.

use std::fmt;

use serde_json::Value;

use crate::{
    models::{Confirmation, QueryOutcome, RowsChanged, SchemaList, TableDescription, TableList},
    params::Record,
};

/// Text of one cell inside a markdown table.
fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace('|', "\\|").replace('\n', " ")
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Newtype wrapper rendering records as a markdown table.
///
/// The header comes from the first record's keys; later records are read
/// by those keys.
pub struct RecordTable<'a>(pub &'a [Record]);

impl fmt::Display for RecordTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.0.first() else {
            return writeln!(f, "No rows returned.");
        };
        let columns: Vec<&String> = first.keys().collect();
        if columns.is_empty() {
            return writeln!(f, "{} without columns.", plural(self.0.len(), "row"));
        }

        let header: Vec<String> = columns.iter().map(|c| cell(&Value::from(c.as_str()))).collect();
        writeln!(f, "| {} |", header.join(" | "))?;
        writeln!(f, "|{}", "---|".repeat(columns.len()))?;
        for record in self.0 {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| record.get(*column).map(cell).unwrap_or_default())
                .collect();
            writeln!(f, "| {} |", cells.join(" | "))?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows { rows, row_count } => {
                write!(f, "{}", RecordTable(rows))?;
                writeln!(f)?;
                writeln!(f, "_{}_", plural(*row_count, "row"))
            }
            Self::Affected { affected_rows } => {
                writeln!(f, "{} affected.", plural(*affected_rows as usize, "row"))
            }
        }
    }
}

impl fmt::Display for TableList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tables.is_empty() {
            return writeln!(f, "No tables found in schema `{}`.", self.schema);
        }
        writeln!(f, "# Tables in `{}`", self.schema)?;
        writeln!(f)?;
        for table in &self.tables {
            writeln!(f, "- {table}")?;
        }
        writeln!(f)?;
        writeln!(f, "_{}_", plural(self.count, "table"))
    }
}

impl fmt::Display for TableDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}.{}", self.schema, self.table)?;
        writeln!(f)?;
        writeln!(f, "| Column | Type | Nullable | Default |")?;
        writeln!(f, "|---|---|---|---|")?;
        for column in &self.columns {
            let data_type = match column.character_maximum_length {
                Some(length) => format!("{}({length})", column.data_type),
                None => column.data_type.clone(),
            };
            let key = if self.primary_keys.contains(&column.column_name) {
                " (PK)"
            } else {
                ""
            };
            writeln!(
                f,
                "| {}{key} | {data_type} | {} | {} |",
                column.column_name,
                if column.nullable() { "yes" } else { "no" },
                column
                    .column_default
                    .as_deref()
                    .map(|d| d.replace('|', "\\|"))
                    .unwrap_or_default(),
            )?;
        }
        if !self.primary_keys.is_empty() {
            writeln!(f)?;
            writeln!(f, "Primary key: {}", self.primary_keys.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for SchemaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schemas.is_empty() {
            return writeln!(f, "No schemas found.");
        }
        writeln!(f, "# Schemas")?;
        writeln!(f)?;
        for schema in &self.schemas {
            writeln!(f, "- {schema}")?;
        }
        writeln!(f)?;
        writeln!(f, "_{}_", plural(self.count, "schema"))
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success: {}", self.message)
    }
}

impl fmt::Display for RowsChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Success: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::ColumnInfo;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_record_table() {
        let rows = vec![
            record(json!({"id": 1, "name": "ada", "note": null})),
            record(json!({"id": 2, "name": "a|b", "note": "x"})),
        ];
        let output = RecordTable(&rows).to_string();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "| id | name | note |");
        assert_eq!(lines[1], "|---|---|---|");
        assert_eq!(lines[2], "| 1 | ada | NULL |");
        assert_eq!(lines[3], "| 2 | a\\|b | x |");
    }

    #[test]
    fn test_query_outcome_display() {
        let empty = QueryOutcome::Rows {
            rows: vec![],
            row_count: 0,
        };
        assert!(empty.to_string().contains("No rows returned."));
        assert!(empty.to_string().contains("_0 rows_"));

        let affected = QueryOutcome::Affected { affected_rows: 1 };
        assert_eq!(affected.to_string(), "1 row affected.\n");
    }

    #[test]
    fn test_table_description_display() {
        let description = TableDescription {
            table: "users".to_string(),
            schema: "public".to_string(),
            columns: vec![ColumnInfo {
                column_name: "id".to_string(),
                data_type: "character varying".to_string(),
                character_maximum_length: Some(32),
                column_default: None,
                is_nullable: "NO".to_string(),
            }],
            primary_keys: vec!["id".to_string()],
        };
        let output = description.to_string();
        assert!(output.starts_with("# public.users"));
        assert!(output.contains("| id (PK) | character varying(32) | no |  |"));
        assert!(output.contains("Primary key: id"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(
            TableList::new("audit", vec![]).to_string(),
            "No tables found in schema `audit`.\n"
        );
        assert_eq!(SchemaList::new(vec![]).to_string(), "No schemas found.\n");
    }
}
