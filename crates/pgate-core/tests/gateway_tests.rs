//! Tests against a live PostgreSQL server.
//!
//! Each test returns early unless `PGATE_TEST_DATABASE` is set.

mod common;

use common::{test_gateway, unique_table};
use pgate_core::{
    params::{
        ColumnDefinition, CreateTable, DescribeTable, ExecuteQuery, InsertData, ListSchemas,
        ListTables, Record, Records, UpdateData,
    },
    Diagnosis, Gateway, GatewayError, QueryOutcome,
};
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not a record: {other}"),
    }
}

fn query(text: &str, params: Vec<Value>) -> ExecuteQuery {
    ExecuteQuery {
        query: text.to_string(),
        params,
        db_config: None,
    }
}

async fn create_scores_table(gateway: &Gateway, table: &str) {
    gateway
        .create_table(&CreateTable {
            table_name: table.to_string(),
            columns: vec![
                ColumnDefinition {
                    name: "id".to_string(),
                    data_type: "serial".to_string(),
                    primary_key: true,
                    ..ColumnDefinition::default()
                },
                ColumnDefinition {
                    name: "name".to_string(),
                    data_type: "varchar(40)".to_string(),
                    nullable: Some(false),
                    ..ColumnDefinition::default()
                },
                ColumnDefinition {
                    name: "score".to_string(),
                    data_type: "numeric(6, 2)".to_string(),
                    default: Some(json!(0)),
                    ..ColumnDefinition::default()
                },
            ],
            schema_name: "public".to_string(),
            if_not_exists: true,
            db_config: None,
        })
        .await
        .expect("Failed to create table");
}

async fn drop_table(gateway: &Gateway, table: &str) {
    let outcome = gateway
        .execute_query(&query(&format!("DROP TABLE IF EXISTS \"{table}\""), vec![]))
        .await
        .expect("Failed to drop table");
    assert_eq!(outcome, QueryOutcome::Affected { affected_rows: 0 });
}

async fn count_rows(gateway: &Gateway, table: &str) -> Value {
    let outcome = gateway
        .execute_query(&query(&format!("SELECT count(*) AS n FROM \"{table}\""), vec![]))
        .await
        .expect("count should succeed");
    let QueryOutcome::Rows { rows, .. } = outcome else {
        panic!("expected rows");
    };
    rows[0]["n"].clone()
}

#[tokio::test]
async fn test_select_one() {
    let Some(gateway) = test_gateway() else { return };

    let outcome = gateway
        .execute_query(&query("SELECT 1 AS one", vec![]))
        .await
        .expect("SELECT 1 should succeed");

    match outcome {
        QueryOutcome::Rows { rows, row_count } => {
            assert_eq!(row_count, 1);
            assert_eq!(rows[0]["one"], json!(1));
        }
        other => panic!("expected rows, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bound_parameters() {
    let Some(gateway) = test_gateway() else { return };

    let outcome = gateway
        .execute_query(&query(
            "SELECT $1::int + 1 AS next, $2::text AS name, $3::jsonb AS doc, $4::int[] AS list",
            vec![json!(41), json!("ada"), json!({"a": 1}), json!([1, 2])],
        ))
        .await
        .expect("query should succeed");

    let QueryOutcome::Rows { rows, .. } = outcome else {
        panic!("expected rows");
    };
    assert_eq!(
        Value::Object(rows[0].clone()),
        json!({"next": 42, "name": "ada", "doc": {"a": 1}, "list": [1, 2]})
    );
}

#[tokio::test]
async fn test_missing_relation_is_diagnosed() {
    let Some(gateway) = test_gateway() else { return };
    let table = unique_table("pgate_missing");
    let text = format!("SELECT * FROM {table}");

    let error = gateway
        .execute_query(&query(&text, vec![]))
        .await
        .expect_err("query on a missing table should fail");

    match &error {
        GatewayError::Statement { diagnosis, .. } => {
            assert_eq!(*diagnosis, Some(Diagnosis::MissingTable));
        }
        other => panic!("expected a statement error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_table_lifecycle() {
    let Some(gateway) = test_gateway() else { return };
    let table = unique_table("pgate_scores");
    create_scores_table(&gateway, &table).await;

    // A second create without IF NOT EXISTS collides
    let error = gateway
        .create_table(&CreateTable {
            table_name: table.clone(),
            columns: vec![ColumnDefinition {
                name: "id".to_string(),
                data_type: "int".to_string(),
                ..ColumnDefinition::default()
            }],
            schema_name: "public".to_string(),
            if_not_exists: false,
            db_config: None,
        })
        .await
        .expect_err("duplicate create should fail");
    assert!(matches!(
        error,
        GatewayError::Statement {
            diagnosis: Some(Diagnosis::TableExists),
            ..
        }
    ));

    let inserted = gateway
        .insert_data(&InsertData {
            table_name: table.clone(),
            data: Records::Many(vec![
                record(json!({"name": "ada", "score": 10.5})),
                record(json!({"name": "grace"})),
                record(json!({"name": "edsger", "score": "7.25"})),
            ]),
            schema_name: "public".to_string(),
            db_config: None,
        })
        .await
        .expect("insert should succeed");
    assert_eq!(inserted.affected_rows, 3);

    let inserted = gateway
        .insert_data(&InsertData {
            table_name: table.clone(),
            data: Records::One(record(json!({"name": "barbara", "score": 1}))),
            schema_name: "public".to_string(),
            db_config: None,
        })
        .await
        .expect("single insert should succeed");
    assert_eq!(inserted.affected_rows, 1);

    let updated = gateway
        .update_data(&UpdateData {
            table_name: table.clone(),
            data: record(json!({"score": 99})),
            condition: "name = $1".to_string(),
            params: vec![json!("grace")],
            schema_name: "public".to_string(),
            db_config: None,
        })
        .await
        .expect("update should succeed");
    assert_eq!(updated.affected_rows, 1);

    let outcome = gateway
        .execute_query(&query(
            &format!("SELECT name, score FROM \"{table}\" ORDER BY id"),
            vec![],
        ))
        .await
        .expect("select should succeed");
    let QueryOutcome::Rows { rows, row_count } = outcome else {
        panic!("expected rows");
    };
    assert_eq!(row_count, 4);
    assert_eq!(rows[1]["name"], json!("grace"));
    assert_eq!(rows[1]["score"], json!("99.00"));
    assert_eq!(rows[0]["score"], json!("10.50"));

    let description = gateway
        .describe_table(&DescribeTable {
            table_name: table.clone(),
            schema_name: "public".to_string(),
            db_config: None,
        })
        .await
        .expect("describe should succeed");
    let names: Vec<&str> = description
        .columns
        .iter()
        .map(|c| c.column_name.as_str())
        .collect();
    assert_eq!(names, ["id", "name", "score"]);
    assert_eq!(description.primary_keys, ["id"]);
    assert_eq!(description.columns[1].character_maximum_length, Some(40));
    assert!(!description.columns[1].nullable());

    let tables = gateway
        .list_tables(&ListTables::default())
        .await
        .expect("list should succeed");
    assert!(tables.tables.contains(&table));
    let mut sorted = tables.tables.clone();
    sorted.sort();
    assert_eq!(tables.tables, sorted);

    drop_table(&gateway, &table).await;
}

#[tokio::test]
async fn test_describe_missing_table() {
    let Some(gateway) = test_gateway() else { return };

    let error = gateway
        .describe_table(&DescribeTable {
            table_name: unique_table("pgate_absent"),
            schema_name: "public".to_string(),
            db_config: None,
        })
        .await
        .expect_err("describing a missing table should fail");
    assert!(matches!(
        error,
        GatewayError::Statement {
            diagnosis: Some(Diagnosis::TableOrSchemaMissing),
            ..
        }
    ));
}

#[tokio::test]
async fn test_list_schemas_hides_system_schemas() {
    let Some(gateway) = test_gateway() else { return };

    let schemas = gateway
        .list_schemas(&ListSchemas::default())
        .await
        .expect("list should succeed");
    assert!(schemas.schemas.iter().any(|s| s == "public"));
    assert!(schemas
        .schemas
        .iter()
        .all(|s| !s.starts_with("pg_") && s != "information_schema"));
    assert_eq!(schemas.count, schemas.schemas.len());
}

#[tokio::test]
async fn test_write_statement_is_committed() {
    let Some(gateway) = test_gateway() else { return };
    let table = unique_table("pgate_writes");
    create_scores_table(&gateway, &table).await;

    let outcome = gateway
        .execute_query(&query(
            &format!("INSERT INTO \"{table}\" (name, score) VALUES ($1, 1), ($2, 2)"),
            vec![json!("ada"), json!("grace")],
        ))
        .await
        .expect("insert should succeed");
    assert_eq!(outcome, QueryOutcome::Affected { affected_rows: 2 });

    let outcome = gateway
        .execute_query(&query(
            &format!("UPDATE \"{table}\" SET score = score + 10 WHERE name = $1"),
            vec![json!("ada")],
        ))
        .await
        .expect("update should succeed");
    assert_eq!(outcome, QueryOutcome::Affected { affected_rows: 1 });

    let outcome = gateway
        .execute_query(&query(
            &format!("SELECT score FROM \"{table}\" WHERE name = 'ada'"),
            vec![],
        ))
        .await
        .expect("select should succeed");
    let QueryOutcome::Rows { rows, .. } = outcome else {
        panic!("expected rows");
    };
    assert_eq!(rows[0]["score"], json!("11.00"));

    drop_table(&gateway, &table).await;
}

#[tokio::test]
async fn test_read_side_effects_are_rolled_back() {
    let Some(gateway) = test_gateway() else { return };
    let table = unique_table("pgate_explain");
    create_scores_table(&gateway, &table).await;
    gateway
        .execute_query(&query(
            &format!("INSERT INTO \"{table}\" (name) VALUES ('a'), ('b')"),
            vec![],
        ))
        .await
        .expect("insert should succeed");

    let outcome = gateway
        .execute_query(&query(&format!("EXPLAIN ANALYZE DELETE FROM \"{table}\""), vec![]))
        .await
        .expect("explain should succeed");
    assert!(matches!(outcome, QueryOutcome::Rows { .. }));
    assert_eq!(count_rows(&gateway, &table).await, json!(2));

    drop_table(&gateway, &table).await;
}

#[tokio::test]
async fn test_multi_statement_script() {
    let Some(gateway) = test_gateway() else { return };
    let table = unique_table("pgate_script");

    let outcome = gateway
        .execute_query(&query(
            &format!(
                "CREATE TABLE \"{table}\" (id int); \
                 INSERT INTO \"{table}\" VALUES (1), (2), (3)"
            ),
            vec![],
        ))
        .await
        .expect("script should succeed");
    assert_eq!(outcome, QueryOutcome::Affected { affected_rows: 3 });
    assert_eq!(count_rows(&gateway, &table).await, json!(3));

    let error = gateway
        .execute_query(&query(
            &format!(
                "INSERT INTO \"{table}\" VALUES (4); \
                 INSERT INTO \"{table}\" VALUES ('not a number')"
            ),
            vec![],
        ))
        .await
        .expect_err("a failing script should fail");
    assert!(matches!(error, GatewayError::Statement { .. }));
    assert_eq!(count_rows(&gateway, &table).await, json!(3));

    drop_table(&gateway, &table).await;
}
