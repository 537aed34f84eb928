use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::db::connection::CONTAINS_FN;
use crate::error::Result;
use crate::models::file::{FileRecord, FileType, Technology};

use super::Database;

const RECORD_COLUMNS: &str = "path, repo, file_type, technology, summary, key_elements, \
                              dependencies, dependents, tags, content_hash, indexed_at, metadata";

/// Scalar columns that predicates and groupings may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Path,
    Repo,
    FileType,
    Technology,
}

impl Column {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Repo => "repo",
            Self::FileType => "file_type",
            Self::Technology => "technology",
        }
    }
}

/// One conjunct of a scan filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Column, String),
    NotEq(Column, String),
    /// Column value is one of the listed values. An empty list matches nothing.
    In(Column, Vec<String>),
    /// Case-insensitive substring of `summary`, of any `key_elements` entry,
    /// or of any `tags` entry.
    Text(String),
    /// At least one stored tag equals one of the listed tags.
    TagsAny(Vec<String>),
}

/// Result ordering for a scan. Ties fall back to most recently inserted row.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// Descending `indexed_at`.
    RecentFirst,
    /// Records with this technology first, then descending `indexed_at`.
    TechnologyFirst(Technology),
}

/// A filtered, ordered, bounded scan over the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    pub predicates: Vec<Predicate>,
    pub order: Order,
    pub limit: usize,
}

impl Scan {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            predicates: Vec::new(),
            order: Order::RecentFirst,
            limit,
        }
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM files");
        let mut values = Vec::new();

        let clauses: Vec<String> = self
            .predicates
            .iter()
            .map(|p| render_predicate(p, &mut values))
            .collect();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        match &self.order {
            Order::RecentFirst => sql.push_str(" ORDER BY indexed_at DESC, id DESC"),
            Order::TechnologyFirst(tech) => {
                sql.push_str(" ORDER BY (technology = ?) DESC, indexed_at DESC, id DESC");
                values.push(Value::Text(tech.as_str().to_string()));
            }
        }

        sql.push_str(" LIMIT ?");
        values.push(Value::Integer(self.limit as i64));
        (sql, values)
    }
}

fn render_predicate(predicate: &Predicate, values: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::Eq(col, v) => {
            values.push(Value::Text(v.clone()));
            format!("{} = ?", col.as_sql())
        }
        Predicate::NotEq(col, v) => {
            values.push(Value::Text(v.clone()));
            format!("{} != ?", col.as_sql())
        }
        Predicate::In(_, list) if list.is_empty() => "0".to_string(),
        Predicate::In(col, list) => {
            values.extend(list.iter().cloned().map(Value::Text));
            format!("{} IN ({})", col.as_sql(), placeholders(list.len()))
        }
        Predicate::Text(needle) => {
            for _ in 0..3 {
                values.push(Value::Text(needle.clone()));
            }
            format!(
                "({CONTAINS_FN}(summary, ?) \
                 OR EXISTS (SELECT 1 FROM json_each(files.key_elements) e WHERE {CONTAINS_FN}(e.value, ?)) \
                 OR EXISTS (SELECT 1 FROM json_each(files.tags) t WHERE {CONTAINS_FN}(t.value, ?)))"
            )
        }
        Predicate::TagsAny(tags) if tags.is_empty() => "0".to_string(),
        Predicate::TagsAny(tags) => {
            values.extend(tags.iter().cloned().map(Value::Text));
            format!(
                "EXISTS (SELECT 1 FROM json_each(files.tags) t WHERE t.value IN ({}))",
                placeholders(tags.len())
            )
        }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Persisted form of `indexed_at`: fixed-width, microsecond precision, UTC.
#[must_use]
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn text_column<T>(
    row: &Row<'_>,
    idx: usize,
    decode: impl FnOnce(&str) -> std::result::Result<T, BoxError>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    decode(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e))
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        path: row.get(0)?,
        repo: row.get(1)?,
        file_type: text_column(row, 2, |s| s.parse::<FileType>().map_err(Into::into))?,
        technology: text_column(row, 3, |s| s.parse::<Technology>().map_err(Into::into))?,
        summary: row.get(4)?,
        key_elements: text_column(row, 5, |s| serde_json::from_str(s).map_err(Into::into))?,
        dependencies: text_column(row, 6, |s| serde_json::from_str(s).map_err(Into::into))?,
        dependents: text_column(row, 7, |s| serde_json::from_str(s).map_err(Into::into))?,
        tags: text_column(row, 8, |s| serde_json::from_str(s).map_err(Into::into))?,
        content_hash: row.get(9)?,
        indexed_at: text_column(row, 10, |s| decode_timestamp(s).map_err(Into::into))?,
        metadata: text_column(row, 11, |s| serde_json::from_str(s).map_err(Into::into))?,
    })
}

// ─── Primitives over a connection or open transaction ───

/// Point lookup by identity.
pub fn get_record(conn: &Connection, path: &str) -> Result<Option<FileRecord>> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM files WHERE path = ?1");
    Ok(conn.query_row(&sql, params![path], map_record).optional()?)
}

/// Insert the record, or overwrite every non-identity field of the existing row.
pub fn put_record(conn: &Connection, record: &FileRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO files (path, repo, file_type, technology, summary, key_elements,
                            dependencies, dependents, tags, content_hash, indexed_at, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(path) DO UPDATE SET
             repo = excluded.repo,
             file_type = excluded.file_type,
             technology = excluded.technology,
             summary = excluded.summary,
             key_elements = excluded.key_elements,
             dependencies = excluded.dependencies,
             dependents = excluded.dependents,
             tags = excluded.tags,
             content_hash = excluded.content_hash,
             indexed_at = excluded.indexed_at,
             metadata = excluded.metadata",
        params![
            record.path,
            record.repo,
            record.file_type.as_str(),
            record.technology.as_str(),
            record.summary,
            serde_json::to_string(&record.key_elements)?,
            serde_json::to_string(&record.dependencies)?,
            serde_json::to_string(&record.dependents)?,
            serde_json::to_string(&record.tags)?,
            record.content_hash,
            encode_timestamp(&record.indexed_at),
            serde_json::to_string(&record.metadata)?,
        ],
    )?;
    Ok(())
}

/// Filtered, ordered scan returning at most `scan.limit` records.
pub fn scan_records(conn: &Connection, scan: &Scan) -> Result<Vec<FileRecord>> {
    let (sql, values) = scan.to_sql();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), map_record)?;
    let mut records = Vec::new();
    for r in rows {
        records.push(r?);
    }
    Ok(records)
}

/// Record count per distinct value of `column`.
pub fn count_group_by(conn: &Connection, column: Column) -> Result<BTreeMap<String, u64>> {
    let col = column.as_sql();
    let mut stmt = conn.prepare(&format!(
        "SELECT {col}, COUNT(*) FROM files GROUP BY {col} ORDER BY {col}"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    let mut counts = BTreeMap::new();
    for r in rows {
        let (value, count) = r?;
        counts.insert(value, count as u64);
    }
    Ok(counts)
}

pub fn count_records(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0))?;
    Ok(count as u64)
}

/// Most recent `indexed_at`, or `None` for an empty store.
pub fn max_indexed_at(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> =
        conn.query_row("SELECT MAX(indexed_at) FROM files", [], |r| r.get(0))?;
    raw.map(|s| {
        decode_timestamp(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)).into()
        })
    })
    .transpose()
}

/// Sum of dependency list lengths over all records.
pub fn sum_dependencies(conn: &Connection) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(json_array_length(dependencies)), 0) FROM files",
        [],
        |r| r.get(0),
    )?;
    Ok(total as u64)
}

/// Stored `(dependencies, dependents)` of a record, without loading the rest.
pub fn get_edges(conn: &Connection, path: &str) -> Result<Option<(Vec<String>, Vec<String>)>> {
    Ok(conn
        .query_row(
            "SELECT dependencies, dependents FROM files WHERE path = ?1",
            params![path],
            |row| {
                Ok((
                    text_column(row, 0, |s| serde_json::from_str(s).map_err(Into::into))?,
                    text_column(row, 1, |s| serde_json::from_str(s).map_err(Into::into))?,
                ))
            },
        )
        .optional()?)
}

// ─── Store contract: each call is its own unit of work ───

impl Database {
    /// Get a record by path.
    pub fn get(&self, path: &str) -> Result<Option<FileRecord>> {
        self.read(|tx| get_record(tx, path))
    }

    /// Upsert a record atomically.
    pub fn put(&self, record: &FileRecord) -> Result<()> {
        self.write(|tx| put_record(tx, record))
    }

    /// Run a filtered, ordered, bounded scan.
    pub fn scan(&self, scan: &Scan) -> Result<Vec<FileRecord>> {
        self.read(|tx| scan_records(tx, scan))
    }
}
