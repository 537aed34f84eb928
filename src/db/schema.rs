/// SQL statements for creating the knowledge index schema.
///
/// List and map fields are JSON text columns; `indexed_at` is fixed-width
/// RFC 3339 text so that lexical comparison matches chronological order.
pub const CREATE_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    path TEXT UNIQUE NOT NULL,
    repo TEXT NOT NULL,
    file_type TEXT NOT NULL,
    technology TEXT NOT NULL,
    summary TEXT NOT NULL,
    key_elements TEXT NOT NULL DEFAULT '[]',
    dependencies TEXT NOT NULL DEFAULT '[]',
    dependents TEXT NOT NULL DEFAULT '[]',
    tags TEXT NOT NULL DEFAULT '[]',
    content_hash TEXT NOT NULL,
    indexed_at TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_files_repo ON files(repo);
CREATE INDEX IF NOT EXISTS idx_files_file_type ON files(file_type);
CREATE INDEX IF NOT EXISTS idx_files_technology ON files(technology);
CREATE INDEX IF NOT EXISTS idx_files_indexed_at ON files(indexed_at);
-- PERF: search_by_type filters on both
CREATE INDEX IF NOT EXISTS idx_files_repo_file_type ON files(repo, file_type);
";
