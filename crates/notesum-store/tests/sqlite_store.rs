//! End-to-end store behaviour on scratch databases built from CSV files.

use std::fs;
use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Row};
use tempfile::TempDir;

use notesum_core::models::result_set::Scalar;
use notesum_core::models::sql::SqlStatement;
use notesum_store::error::StoreError;
use notesum_store::ingest::{self, SOURCE_TABLES};
use notesum_store::{SqliteStore, StoreConfig};

const PATIENTS_CSV: &str = "\
Id,FIRST,LAST,BIRTHDATE,INCOME
p1,Lupe126,Rippin620,1980-02-11,52000
p2,Ana,Lopez,1975-07-01,
";

const ALLERGIES_CSV: &str = "\
START,PATIENT,DESCRIPTION,SEVERITY
2010-01-01,p1,Peanut allergy,0.5
2015-03-04,p1,Penicillin,1
";

fn write_sources(dir: &Path) {
    for table in SOURCE_TABLES {
        let body = match table {
            "patients" => PATIENTS_CSV.to_string(),
            "allergies" => ALLERGIES_CSV.to_string(),
            other => format!("Id,NOTE\n{other}-1,placeholder\n"),
        };
        fs::write(dir.join(format!("{table}.csv")), body).unwrap();
    }
}

async fn ingested_with(config: StoreConfig) -> (TempDir, SqliteStore) {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    write_sources(&data);

    let db_path = dir.path().join("db").join("healthcare_data.db");
    let report = ingest::initialize(&db_path, &data).await.unwrap();
    assert_eq!(report.tables.len(), SOURCE_TABLES.len());

    let store = SqliteStore::new(&db_path, config);
    (dir, store)
}

async fn ingested() -> (TempDir, SqliteStore) {
    ingested_with(StoreConfig::default()).await
}

async fn writable(path: &Path) -> SqliteConnection {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqliteConnection::connect_with(&options).await.unwrap()
}

#[tokio::test]
async fn initialize_loads_every_source_with_inferred_types() {
    let (dir, _store) = ingested().await;
    let mut conn = writable(&dir.path().join("db").join("healthcare_data.db")).await;

    let tables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
        .fetch_one(&mut conn)
        .await
        .unwrap();
    assert_eq!(tables, 18);

    let row = sqlx::query(
        "SELECT typeof(\"INCOME\"), (SELECT \"INCOME\" IS NULL FROM patients WHERE \"Id\" = 'p2') \
         FROM patients WHERE \"Id\" = 'p1'",
    )
    .fetch_one(&mut conn)
    .await
    .unwrap();
    let income_type: String = row.get(0);
    let missing_is_null: bool = row.get(1);
    assert_eq!(income_type, "integer");
    assert!(missing_is_null);

    let severity_type: String =
        sqlx::query_scalar("SELECT typeof(\"SEVERITY\") FROM allergies LIMIT 1")
            .fetch_one(&mut conn)
            .await
            .unwrap();
    assert_eq!(severity_type, "real");
}

#[tokio::test]
async fn reingest_replaces_tables() {
    let (dir, store) = ingested().await;
    let data = dir.path().join("data");
    let db_path = dir.path().join("db").join("healthcare_data.db");

    fs::write(data.join("patients.csv"), "Id,FIRST\np9,Solo\n").unwrap();
    ingest::initialize(&db_path, &data).await.unwrap();

    let rows = store
        .execute(&SqlStatement::new("SELECT \"FIRST\" FROM patients"))
        .await
        .unwrap();
    assert_eq!(rows.rows().to_vec(), vec![vec![Scalar::Text("Solo".to_string())]]);
}

#[tokio::test]
async fn missing_source_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    write_sources(&data);
    fs::remove_file(data.join("supplies.csv")).unwrap();

    let mut conn = writable(&dir.path().join("partial.db")).await;
    let err = ingest::load_tables(&mut conn, &data, &SOURCE_TABLES)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingSource { ref table, .. } if table == "supplies"));

    let tables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master")
        .fetch_one(&mut conn)
        .await
        .unwrap();
    assert_eq!(tables, 0);
}

#[tokio::test]
async fn execute_returns_rows_in_query_order() {
    let (_dir, store) = ingested().await;
    let rows = store
        .execute(&SqlStatement::new(
            "SELECT \"DESCRIPTION\", \"SEVERITY\" FROM allergies WHERE \"PATIENT\" = 'p1' ORDER BY \"START\"",
        ))
        .await
        .unwrap();

    assert_eq!(
        rows.rows().to_vec(),
        vec![
            vec![Scalar::Text("Peanut allergy".to_string()), Scalar::Real(0.5)],
            vec![Scalar::Text("Penicillin".to_string()), Scalar::Real(1.0)],
        ]
    );
}

#[tokio::test]
async fn no_rows_is_not_an_error() {
    let (_dir, store) = ingested().await;
    let rows = store
        .execute(&SqlStatement::new(
            "SELECT * FROM allergies WHERE \"PATIENT\" = 'nobody'",
        ))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn failures_release_their_connection() {
    let (_dir, store) = ingested_with(StoreConfig {
        pool_size: 1,
        sample_rows: 3,
    })
    .await;

    let err = store
        .execute(&SqlStatement::new("SELECT \"NOPE\" FROM patients"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no such column"));

    let err = store
        .execute(&SqlStatement::new("DROP TABLE patients"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotReadOnly(_)), "{err:?}");

    // With a single connection, a leaked one would block this forever.
    let rows = tokio::time::timeout(
        Duration::from_secs(5),
        store.execute(&SqlStatement::new("SELECT \"Id\" FROM patients")),
    )
    .await
    .expect("connection returned to the pool")
    .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn writes_are_refused_by_the_connection() {
    let (_dir, store) = ingested().await;

    let err = store
        .execute(&SqlStatement::new("DELETE FROM patients"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotReadOnly(_)), "{err:?}");

    let rows = store
        .execute(&SqlStatement::new("SELECT COUNT(*) FROM patients"))
        .await
        .unwrap();
    assert_eq!(rows.into_rows(), vec![vec![Scalar::Integer(2)]]);
}

#[tokio::test]
async fn describe_schema_lists_tables_with_samples() {
    let (_dir, store) = ingested().await;
    let description = store.describe_schema().await.unwrap();

    assert!(description.contains("CREATE TABLE \"patients\""));
    assert!(description.contains("\"BIRTHDATE\" TEXT"));
    assert!(description.contains("3 rows from patients table:"));
    assert!(description.contains("Lupe126"));
    assert!(description.contains("CREATE TABLE \"supplies\""));
}

#[tokio::test]
async fn pool_is_bounded() {
    let (_dir, store) = ingested_with(StoreConfig {
        pool_size: 2,
        sample_rows: 3,
    })
    .await;

    let first = store.pool().acquire().await.unwrap();
    let second = store.pool().acquire().await.unwrap();
    assert_eq!(store.pool().size(), 2);

    let third = tokio::time::timeout(Duration::from_millis(50), store.pool().acquire()).await;
    assert!(third.is_err(), "third acquire should wait for a free slot");

    drop(first);
    let third = tokio::time::timeout(Duration::from_secs(5), store.pool().acquire())
        .await
        .expect("slot freed")
        .unwrap();
    assert_eq!(store.pool().size(), 2);
    drop(second);
    drop(third);
}

#[tokio::test]
async fn missing_database_is_an_open_error() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path().join("absent.db"), StoreConfig::default());
    let err = store.describe_schema().await.unwrap_err();
    assert!(matches!(err, StoreError::Open { .. }));
}

#[tokio::test]
async fn delete_database_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scratch.db");
    writable(&path).await.close().await.unwrap();

    assert!(ingest::delete_database(&path).await.unwrap());
    assert!(!path.exists());
    assert!(!ingest::delete_database(&path).await.unwrap());
}

#[tokio::test]
async fn close_rejects_later_queries() {
    let (_dir, store) = ingested().await;
    store.close().await;
    let err = store
        .execute(&SqlStatement::new("SELECT 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Database(sqlx::Error::PoolClosed)), "{err:?}");
}
