//! Arbitrary queries and data-changing operations.

use super::Gateway;
use crate::{
    db::StatementKind,
    diagnosis::OperationKind,
    error::{GatewayError, Result},
    models::{Confirmation, QueryOutcome, RowsChanged},
    params::{CreateTable, ExecuteQuery, InsertData, UpdateData},
    sql,
};

impl Gateway {
    /// Runs a caller-supplied statement.
    ///
    /// SELECT, SHOW, DESCRIBE and EXPLAIN return their rows; anything else
    /// is committed and reports the affected-row count.
    pub async fn execute_query(&self, params: &ExecuteQuery) -> Result<QueryOutcome> {
        if params.query.trim().is_empty() {
            return Err(GatewayError::invalid_input("query").with_reason("must not be empty"));
        }
        let result = self
            .run(
                OperationKind::ExecuteQuery,
                params.db_config.as_ref(),
                &params.query,
                &params.params,
                StatementKind::of(&params.query),
            )
            .await?;
        Ok(result.into())
    }

    pub async fn create_table(&self, params: &CreateTable) -> Result<Confirmation> {
        let text = sql::create_table(
            &params.schema_name,
            &params.table_name,
            &params.columns,
            params.if_not_exists,
        )?;
        self.write(
            OperationKind::CreateTable,
            params.db_config.as_ref(),
            &text,
            &[],
        )
        .await?;
        Ok(Confirmation {
            message: format!(
                "Table {}.{} created successfully",
                params.schema_name, params.table_name
            ),
        })
    }

    /// Inserts one record or a batch of records in a single statement.
    pub async fn insert_data(&self, params: &InsertData) -> Result<RowsChanged> {
        let rows = params.data.clone().into_rows();
        let statement = sql::insert(&params.schema_name, &params.table_name, &rows)?;
        let affected_rows = self
            .write(
                OperationKind::InsertData,
                params.db_config.as_ref(),
                &statement.text,
                &statement.params,
            )
            .await?;
        Ok(RowsChanged {
            affected_rows,
            message: format!(
                "Inserted {} row(s) into {}.{}",
                rows.len(),
                params.schema_name,
                params.table_name
            ),
        })
    }

    /// Updates the rows matching a mandatory condition.
    pub async fn update_data(&self, params: &UpdateData) -> Result<RowsChanged> {
        let statement = sql::update(
            &params.schema_name,
            &params.table_name,
            &params.data,
            &params.condition,
            &params.params,
        )?;
        let affected_rows = self
            .write(
                OperationKind::UpdateData,
                params.db_config.as_ref(),
                &statement.text,
                &statement.params,
            )
            .await?;
        Ok(RowsChanged {
            affected_rows,
            message: format!(
                "Updated {affected_rows} row(s) in {}.{}",
                params.schema_name, params.table_name
            ),
        })
    }
}
