use std::fs;
use std::path::Path;

use parquetgen::{DirectorySource, DuckDbExecutor, Generator, GeneratorConfig};

const USERS: &str = r#"{
    "tableName": "users",
    "columns": [
        {"columnName": "id", "type": "integer", "key": true},
        {"columnName": "name", "type": "varchar", "nullable": true}
    ],
    "indexes": [{"name": "idx_users_name", "fields": ["name"]}],
    "rows": [
        {"id": 1, "name": "Ann"},
        {"name": "Bob", "id": 2}
    ],
    "options": {}
}"#;

const ORDERS: &str = r#"{
    "tableName": "orders",
    "schema": [
        {"columnName": "id", "type": "integer", "key": true},
        {"columnName": "user_id", "type": "integer",
         "foreignKey": {"tableName": "users", "columnName": "id"}},
        {"columnName": "total", "type": "double"},
        {"columnName": "paid", "type": "boolean"}
    ],
    "rows": [
        {"id": 10, "user_id": 1, "total": 9.5, "paid": true},
        {"id": 11, "user_id": 2, "total": 20, "paid": false}
    ]
}"#;

fn write_schemas(dir: &Path, schemas: &[(&str, &str)]) {
    for (file, json) in schemas {
        fs::write(dir.join(file), json).unwrap();
    }
}

fn count(generator: &mut Generator<DirectorySource, DuckDbExecutor>, sql: &str) -> i64 {
    generator
        .executor_mut()
        .connection()
        .unwrap()
        .query_row(sql, [], |row| row.get(0))
        .unwrap()
}

#[tokio::test]
async fn generates_tables_and_parquet_files() {
    let schema_dir = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let output_dir = output.path().join("parquet");
    write_schemas(
        schema_dir.path(),
        &[("01_users.json", USERS), ("02_orders.json", ORDERS)],
    );

    let config = GeneratorConfig::new(schema_dir.path(), &output_dir);
    let mut generator = Generator::new(
        config,
        DirectorySource::new(schema_dir.path()),
        DuckDbExecutor::in_memory(),
    );
    let report = generator.run().await.unwrap();

    assert!(report.is_success(), "{:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.tables, ["users", "orders"]);
    assert!(output_dir.join("users.parquet").is_file());
    assert!(output_dir.join("orders.parquet").is_file());

    assert_eq!(count(&mut generator, "select count(*) from users"), 2);
    assert_eq!(count(&mut generator, "select count(*) from orders where paid"), 1);
    assert_eq!(
        count(&mut generator, "select nextval('users_sequence')"),
        1
    );
}

#[tokio::test]
async fn parquet_export_is_readable_and_taken_before_the_data_pass() {
    let schema_dir = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_schemas(schema_dir.path(), &[("01_users.json", USERS)]);

    let mut generator = Generator::new(
        GeneratorConfig::new(schema_dir.path(), output.path()),
        DirectorySource::new(schema_dir.path()),
        DuckDbExecutor::in_memory(),
    );
    let report = generator.run().await.unwrap();
    assert!(report.is_success(), "{:?}", report.failures().collect::<Vec<_>>());

    let export = output.path().join("users.parquet");
    let sql = format!("select count(*) from read_parquet('{}')", export.display());
    assert_eq!(count(&mut generator, &sql), 0);
    assert_eq!(count(&mut generator, "select count(*) from users"), 2);
}

#[tokio::test]
async fn failed_statements_are_reported_and_the_rest_still_runs() {
    let schema_dir = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    // The second row repeats the primary key and is rejected by DuckDB.
    let duplicates = USERS.replace(r#""id": 2"#, r#""id": 1"#);
    write_schemas(
        schema_dir.path(),
        &[("01_users.json", duplicates.as_str()), ("02_orders.json", ORDERS)],
    );

    let mut generator = Generator::new(
        GeneratorConfig::new(schema_dir.path(), output.path()),
        DirectorySource::new(schema_dir.path()),
        DuckDbExecutor::in_memory(),
    );
    let report = generator.run().await.unwrap();

    assert!(!report.is_success());
    assert!(report.definitions.failures.is_empty());
    // The rejected user breaks the order pointing at user 2 as well.
    assert_eq!(report.data.failures.len(), 2);
    assert_eq!(count(&mut generator, "select count(*) from users"), 1);
    assert_eq!(count(&mut generator, "select count(*) from orders"), 1);
}

#[tokio::test]
async fn malformed_schema_aborts_before_execution() {
    let schema_dir = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_schemas(
        schema_dir.path(),
        &[("users.json", r#"{"tableName": "users", "rows": []}"#)],
    );

    let mut generator = Generator::new(
        GeneratorConfig::new(schema_dir.path(), output.path().join("parquet")),
        DirectorySource::new(schema_dir.path()),
        DuckDbExecutor::in_memory(),
    );

    assert!(generator.run().await.is_err());
    assert!(!output.path().join("parquet").exists());
}
