//! Read-only schema inspection.

use serde_json::Value;

use super::{into_rows, text_column, Gateway};
use crate::{
    db::{self, StatementKind},
    diagnosis::OperationKind,
    error::{GatewayError, Result},
    models::{ColumnInfo, SchemaList, TableDescription, TableList},
    params::{DescribeTable, ListSchemas, ListTables},
    sql::qualified_name,
};

const LIST_TABLES: &str = "\
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_schema = $1
ORDER BY table_name";

const DESCRIBE_COLUMNS: &str = "\
SELECT column_name::text AS column_name,
       data_type::text AS data_type,
       character_maximum_length::int4 AS character_maximum_length,
       column_default::text AS column_default,
       is_nullable::text AS is_nullable
FROM information_schema.columns
WHERE table_schema = $1 AND table_name = $2
ORDER BY ordinal_position";

// $1 is the quoted qualified name; an unknown table fails the regclass cast.
const DESCRIBE_PRIMARY_KEY: &str = "\
SELECT a.attname::text AS column_name
FROM pg_index i
JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
WHERE i.indrelid = $1::regclass AND i.indisprimary
ORDER BY array_position(i.indkey::int2[], a.attnum)";

const LIST_SCHEMAS: &str = "\
SELECT schema_name::text AS schema_name
FROM information_schema.schemata
WHERE schema_name NOT LIKE 'pg\\_%'
  AND schema_name <> 'information_schema'
ORDER BY schema_name";

impl Gateway {
    /// Lists the tables of a schema in name order.
    pub async fn list_tables(&self, params: &ListTables) -> Result<TableList> {
        let operation = OperationKind::ListTables;
        let rows = self
            .query_rows(
                operation,
                params.db_config.as_ref(),
                LIST_TABLES,
                &[Value::from(params.schema_name.as_str())],
            )
            .await?;
        let tables = text_column(operation, rows, "table_name")?;
        Ok(TableList::new(&params.schema_name, tables))
    }

    /// Describes the columns and primary key of one table.
    ///
    /// Both queries run on the same connection.
    pub async fn describe_table(&self, params: &DescribeTable) -> Result<TableDescription> {
        let operation = OperationKind::DescribeTable;
        let relation = qualified_name(&params.schema_name, &params.table_name)?;

        let profile = self.profile_for(params.db_config.as_ref());
        let mut connection = db::acquire(&profile).await?;

        let result = db::execute(
            &mut connection,
            DESCRIBE_COLUMNS,
            &[
                Value::from(params.schema_name.as_str()),
                Value::from(params.table_name.as_str()),
            ],
            StatementKind::Read,
            operation,
        )
        .await?;
        let columns = into_rows(operation, result)?
            .into_iter()
            .map(|row| {
                serde_json::from_value::<ColumnInfo>(Value::Object(row))
                    .map_err(|e| GatewayError::unknown(operation, e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let result = db::execute(
            &mut connection,
            DESCRIBE_PRIMARY_KEY,
            &[Value::from(relation)],
            StatementKind::Read,
            operation,
        )
        .await?;
        let primary_keys = text_column(operation, into_rows(operation, result)?, "column_name")?;

        Ok(TableDescription {
            table: params.table_name.clone(),
            schema: params.schema_name.clone(),
            columns,
            primary_keys,
        })
    }

    /// Lists user schemas, leaving out `pg_*` and `information_schema`.
    pub async fn list_schemas(&self, params: &ListSchemas) -> Result<SchemaList> {
        let operation = OperationKind::ListSchemas;
        let rows = self
            .query_rows(operation, params.db_config.as_ref(), LIST_SCHEMAS, &[])
            .await?;
        Ok(SchemaList::new(text_column(operation, rows, "schema_name")?))
    }
}
