//! SQL schema for the blogshelf SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS blog_article (
    id               TEXT PRIMARY KEY,             -- 'blog_article_<suffix>'
    title            TEXT NOT NULL DEFAULT '',
    subtitle         TEXT NOT NULL DEFAULT '',
    author           TEXT NOT NULL DEFAULT '',
    url_slug         TEXT NOT NULL DEFAULT '',
    draft            INTEGER NOT NULL DEFAULT 0,
    body             TEXT,                          -- editor document, JSON text
    metadata         TEXT,                          -- JSON object or NULL
    tags             TEXT DEFAULT '[]',             -- JSON array; legacy rows may hold '{a,b}' or NULL
    body_images      TEXT DEFAULT '[]',
    thumbnail_image  TEXT,
    seo_title        TEXT NOT NULL DEFAULT '',
    seo_keywords     TEXT NOT NULL DEFAULT '',
    seo_description  TEXT NOT NULL DEFAULT '',
    created_at       TEXT NOT NULL,                 -- RFC 3339 UTC, microseconds
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS blog_article_created_idx ON blog_article(created_at);
CREATE INDEX IF NOT EXISTS blog_article_slug_idx    ON blog_article(url_slug);

PRAGMA user_version = 1;
";
