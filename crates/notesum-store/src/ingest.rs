//! One-shot CSV ingestion into the patient database.

use std::path::Path;

use csv::StringRecord;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Sqlite};
use tracing::{info, warn};

use notesum_core::models::result_set::Scalar;

use crate::error::StoreError;
use crate::store::quote_identifier;

/// The source tables, each loaded from `<name>.csv`.
pub const SOURCE_TABLES: [&str; 18] = [
    "allergies",
    "careplans",
    "claims",
    "claims_transactions",
    "conditions",
    "devices",
    "encounters",
    "imaging_studies",
    "immunizations",
    "medications",
    "observations",
    "organizations",
    "patients",
    "payer_transitions",
    "payers",
    "procedures",
    "providers",
    "supplies",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Integer,
    Real,
    Text,
}

impl Affinity {
    fn sql(&self) -> &'static str {
        match self {
            Affinity::Integer => "INTEGER",
            Affinity::Real => "REAL",
            Affinity::Text => "TEXT",
        }
    }

    fn value(&self, cell: &str) -> Scalar {
        if cell.is_empty() {
            return Scalar::Null;
        }
        match self {
            Affinity::Integer => cell
                .parse::<i64>()
                .map(Scalar::Integer)
                .unwrap_or_else(|_| Scalar::from(cell)),
            Affinity::Real => cell
                .parse::<f64>()
                .map(Scalar::Real)
                .unwrap_or_else(|_| Scalar::from(cell)),
            Affinity::Text => Scalar::from(cell),
        }
    }
}

/// Infer a column's affinity from its non-empty cells.
pub fn infer_affinity<'a>(cells: impl IntoIterator<Item = &'a str>) -> Affinity {
    let mut affinity = Affinity::Integer;
    let mut seen = false;
    for cell in cells.into_iter().filter(|c| !c.is_empty()) {
        seen = true;
        if affinity == Affinity::Integer && cell.parse::<i64>().is_err() {
            affinity = Affinity::Real;
        }
        if affinity == Affinity::Real && cell.parse::<f64>().is_err() {
            return Affinity::Text;
        }
    }
    if seen { affinity } else { Affinity::Text }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// `(table, rows loaded)` in load order.
    pub tables: Vec<(String, usize)>,
}

impl IngestReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|(_, n)| n).sum()
    }
}

/// Create (or refresh) the database at `db_path` from the CSV sources in
/// `data_dir`. Existing tables are replaced.
pub async fn initialize(db_path: &Path, data_dir: &Path) -> Result<IngestReport, StoreError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(|e| StoreError::Open {
            path: db_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let report = load_tables(&mut conn, data_dir, &SOURCE_TABLES).await?;
    conn.close().await?;

    info!(
        db_path = %db_path.display(),
        tables = report.tables.len(),
        rows = report.total_rows(),
        "database initialized"
    );
    Ok(report)
}

/// Load each named table from `<data_dir>/<name>.csv`. Every source file
/// is checked before anything is written.
pub async fn load_tables(
    conn: &mut SqliteConnection,
    data_dir: &Path,
    tables: &[&str],
) -> Result<IngestReport, StoreError> {
    for table in tables {
        let path = data_dir.join(format!("{table}.csv"));
        if !tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            return Err(StoreError::MissingSource {
                table: table.to_string(),
                path,
            });
        }
    }

    let mut report = IngestReport::default();
    for table in tables {
        let path = data_dir.join(format!("{table}.csv"));
        let rows = load_csv(conn, table, &path).await?;
        info!(table, rows, "table loaded");
        report.tables.push((table.to_string(), rows));
    }
    Ok(report)
}

/// Replace `table` with the contents of one CSV file. Returns rows loaded.
pub async fn load_csv(
    conn: &mut SqliteConnection,
    table: &str,
    path: &Path,
) -> Result<usize, StoreError> {
    let csv_err = |source| StoreError::Csv {
        table: table.to_string(),
        source,
    };

    let bytes = tokio::fs::read(path).await?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let headers = reader.headers().map_err(csv_err)?.clone();
    let records = reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .map_err(csv_err)?;

    let affinities: Vec<Affinity> = (0..headers.len())
        .map(|i| infer_affinity(records.iter().map(|r| r.get(i).unwrap_or(""))))
        .collect();

    let quoted = quote_identifier(table);
    let columns = headers
        .iter()
        .zip(&affinities)
        .map(|(name, affinity)| format!("{} {}", quote_identifier(name), affinity.sql()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=headers.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let insert = format!("INSERT INTO {quoted} VALUES ({placeholders})");

    let mut tx = conn.begin().await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {quoted}"))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!("CREATE TABLE {quoted} ({columns})"))
        .execute(&mut *tx)
        .await?;
    for record in &records {
        let mut query = sqlx::query::<Sqlite>(&insert);
        for (i, affinity) in affinities.iter().enumerate() {
            query = match affinity.value(record.get(i).unwrap_or("")) {
                Scalar::Null => query.bind(None::<String>),
                Scalar::Integer(v) => query.bind(v),
                Scalar::Real(v) => query.bind(v),
                Scalar::Text(v) => query.bind(v),
                Scalar::Blob(v) => query.bind(v),
            };
        }
        query.execute(&mut *tx).await?;
    }
    tx.commit().await?;

    Ok(records.len())
}

/// Remove the database file. Returns whether a file was deleted.
pub async fn delete_database(path: &Path) -> Result<bool, StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!(path = %path.display(), "database deleted");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "database file not found, nothing to delete");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
