//! Bulk CSV export of the stored tables

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan, Student, User},
    repository::{books, loans, students, users, Repository},
};

/// Exportable tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportTable {
    Books,
    Students,
    Loans,
    Users,
}

impl ExportTable {
    pub const ALL: [ExportTable; 4] = [
        ExportTable::Books,
        ExportTable::Students,
        ExportTable::Loans,
        ExportTable::Users,
    ];

    /// Table name, also used as the file stem of snapshot files
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportTable::Books => "books",
            ExportTable::Students => "students",
            ExportTable::Loans => "loans",
            ExportTable::Users => "users",
        }
    }
}

impl std::fmt::Display for ExportTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportTable {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "books" => Ok(ExportTable::Books),
            "students" => Ok(ExportTable::Students),
            "loans" => Ok(ExportTable::Loans),
            "users" => Ok(ExportTable::Users),
            _ => Err(AppError::NotFound(format!("Unknown table: {}", s))),
        }
    }
}

/// Rows of one table, decoded at the storage boundary
#[derive(Debug, Clone)]
pub enum TableRows {
    Books(Vec<Book>),
    Students(Vec<Student>),
    Loans(Vec<Loan>),
    Users(Vec<User>),
}

impl TableRows {
    pub fn table(&self) -> ExportTable {
        match self {
            TableRows::Books(_) => ExportTable::Books,
            TableRows::Students(_) => ExportTable::Students,
            TableRows::Loans(_) => ExportTable::Loans,
            TableRows::Users(_) => ExportTable::Users,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TableRows::Books(rows) => rows.len(),
            TableRows::Students(rows) => rows.len(),
            TableRows::Loans(rows) => rows.len(),
            TableRows::Users(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write a header row of column names then one line per row.
    /// Returns the number of data rows; `NoData` when there are none.
    pub fn write_csv<W: Write>(&self, writer: W) -> AppResult<usize> {
        if self.is_empty() {
            return Err(AppError::NoData(format!("table {} is empty", self.table())));
        }

        match self {
            TableRows::Books(rows) => write_records(rows, writer),
            TableRows::Students(rows) => write_records(rows, writer),
            TableRows::Loans(rows) => write_records(rows, writer),
            TableRows::Users(rows) => write_records(rows, writer),
        }
    }
}

fn write_records<T: Serialize, W: Write>(rows: &[T], writer: W) -> AppResult<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(rows.len())
}

#[derive(Clone)]
pub struct ExportService {
    repository: Repository,
}

impl ExportService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Load every row of `table`
    pub async fn load_table(&self, table: ExportTable) -> AppResult<TableRows> {
        let pool = &self.repository.pool;
        let rows = match table {
            ExportTable::Books => TableRows::Books(books::fetch_all(pool).await?),
            ExportTable::Students => TableRows::Students(students::fetch_all(pool).await?),
            ExportTable::Loans => TableRows::Loans(loans::fetch_all(pool).await?),
            ExportTable::Users => TableRows::Users(users::fetch_all(pool).await?),
        };
        Ok(rows)
    }

    /// Load all four tables from one read transaction
    pub async fn snapshot(&self) -> AppResult<Vec<TableRows>> {
        let mut tx = self.repository.pool.begin().await?;

        let snapshot = vec![
            TableRows::Books(books::fetch_all(&mut *tx).await?),
            TableRows::Students(students::fetch_all(&mut *tx).await?),
            TableRows::Loans(loans::fetch_all(&mut *tx).await?),
            TableRows::Users(users::fetch_all(&mut *tx).await?),
        ];

        tx.commit().await?;
        Ok(snapshot)
    }

    /// Serialize `table` as CSV into `writer`
    pub async fn export_table<W: Write>(&self, table: ExportTable, writer: W) -> AppResult<usize> {
        let rows = self.load_table(table).await?;
        rows.write_csv(writer)
    }

    /// Serialize `table` as CSV into the file at `path`. No file is created for an empty table.
    pub async fn export_table_to_path(&self, table: ExportTable, path: &Path) -> AppResult<usize> {
        let rows = self.load_table(table).await?;
        if rows.is_empty() {
            return Err(AppError::NoData(format!("table {} is empty", table)));
        }

        let written = write_csv_file(&rows, path)?;
        tracing::info!("Exported {} {} row(s) to {}", written, table, path.display());
        Ok(written)
    }

    /// Write every non-empty table to `<dir>/<table>.csv` from a single snapshot.
    /// File writing happens off the async runtime, after the read transaction is released.
    pub async fn snapshot_to_dir(&self, dir: &Path) -> AppResult<Vec<(ExportTable, usize)>> {
        let snapshot = self.snapshot().await?;
        let dir = dir.to_path_buf();

        tokio::task::spawn_blocking(move || write_snapshot(&dir, &snapshot))
            .await
            .map_err(|e| AppError::Internal(format!("Snapshot export task failed: {}", e)))?
    }
}

/// Bring `dir` to exactly the snapshot: non-empty tables are (re)written and
/// files left by tables that are now empty are removed.
fn write_snapshot(dir: &Path, snapshot: &[TableRows]) -> AppResult<Vec<(ExportTable, usize)>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for rows in snapshot {
        let table = rows.table();
        let path = dir.join(format!("{}.csv", table));

        if rows.is_empty() {
            match fs::remove_file(&path) {
                Ok(()) => tracing::info!("Removed stale {} (table {} is empty)", path.display(), table),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            continue;
        }

        let count = write_csv_file(rows, &path)?;
        written.push((table, count));
    }
    Ok(written)
}

/// Write into `<path>.tmp` then rename over `path`; `path` is either the old file or the complete new one
fn write_csv_file(rows: &TableRows, path: &Path) -> AppResult<usize> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    let result = File::create(&staging)
        .map_err(AppError::from)
        .and_then(|file| rows.write_csv(file))
        .and_then(|count| {
            fs::rename(&staging, path)?;
            Ok(count)
        });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}
