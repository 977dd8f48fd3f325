//! [`SqliteStore`]: the SQLite implementation of [`ArticleStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{Value as SqlValue, ValueRef};

use blogshelf_core::{
  article::{Article, ArticleChanges},
  store::{ArticleQuery, ArticleStore},
};

use crate::{
  Result,
  encode::{ARTICLE_COLUMNS, RawArticle, article_params, set_clause, where_clause},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An article store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.create_scalar_function(
          UNICODE_LOWER,
          1,
          FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
          unicode_lower,
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one row by an arbitrary single-parameter predicate.
  async fn fetch_one(&self, predicate: &'static str, param: String) -> Result<Option<Article>> {
    let raw: Option<RawArticle> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM blog_article WHERE {predicate}");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawArticle::from_row)
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawArticle::into_article))
  }
}

// ─── SQL functions ───────────────────────────────────────────────────────────

/// Name of the SQL function used by case-insensitive filters. SQLite's own
/// `lower()` only folds ASCII.
pub(crate) const UNICODE_LOWER: &str = "unicode_lower";

fn unicode_lower(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
  Ok(match ctx.get_raw(0) {
    ValueRef::Null => None,
    ValueRef::Integer(i) => Some(i.to_string()),
    ValueRef::Real(f) => Some(f.to_string()),
    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
      Some(String::from_utf8_lossy(bytes).to_lowercase())
    }
  })
}

// ─── ArticleStore impl ───────────────────────────────────────────────────────

impl ArticleStore for SqliteStore {
  type Error = crate::Error;

  async fn list(&self, query: &ArticleQuery) -> Result<(Vec<Article>, u64)> {
    let (where_sql, params) = where_clause(&query.filter, query.published_only);
    let take = i64::try_from(query.take).unwrap_or(i64::MAX);
    let skip = i64::try_from(query.skip).unwrap_or(i64::MAX);

    tracing::debug!(%where_sql, skip, take, "listing articles");

    let (raws, count): (Vec<RawArticle>, i64) = self
      .conn
      .call(move |conn| {
        let count: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM blog_article {where_sql}"),
          rusqlite::params_from_iter(params.iter()),
          |row| row.get(0),
        )?;

        let mut page_params = params;
        page_params.push(SqlValue::Integer(take));
        page_params.push(SqlValue::Integer(skip));

        let mut stmt = conn.prepare(&format!(
          "SELECT {ARTICLE_COLUMNS} FROM blog_article {where_sql}
           ORDER BY created_at DESC, id DESC
           LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(page_params.iter()),
            RawArticle::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, count))
      })
      .await?;

    let articles = raws.into_iter().map(RawArticle::into_article).collect();
    Ok((articles, count.max(0) as u64))
  }

  async fn get(&self, id: &str) -> Result<Option<Article>> {
    self.fetch_one("id = ?1", id.to_owned()).await
  }

  async fn find_published(&self, slug: &str) -> Result<Option<Article>> {
    self
      .fetch_one(
        "url_slug = ?1 AND draft = 0 ORDER BY created_at DESC LIMIT 1",
        slug.to_owned(),
      )
      .await
  }

  async fn insert(&self, article: Article) -> Result<Article> {
    let params = article_params(&article)?;
    let id = article.id;

    let raw: RawArticle = self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO blog_article ({ARTICLE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
          ),
          rusqlite::params_from_iter(params.iter()),
        )?;
        Ok(conn.query_row(
          &format!("SELECT {ARTICLE_COLUMNS} FROM blog_article WHERE id = ?1"),
          rusqlite::params![id],
          RawArticle::from_row,
        )?)
      })
      .await?;

    Ok(raw.into_article())
  }

  async fn update(&self, id: &str, changes: ArticleChanges) -> Result<Option<Article>> {
    let (set_sql, mut params) = set_clause(&changes)?;
    let id = id.to_owned();
    params.push(SqlValue::Text(id.clone()));

    let raw: Option<RawArticle> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          &format!("UPDATE blog_article SET {set_sql} WHERE id = ?"),
          rusqlite::params_from_iter(params.iter()),
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {ARTICLE_COLUMNS} FROM blog_article WHERE id = ?1"),
              rusqlite::params![id],
              RawArticle::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawArticle::into_article))
  }

  async fn delete(&self, id: &str) -> Result<Option<Article>> {
    let id = id.to_owned();

    let raw: Option<RawArticle> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM blog_article WHERE id = ?1"),
            rusqlite::params![id],
            RawArticle::from_row,
          )
          .optional()?;
        if raw.is_some() {
          conn.execute("DELETE FROM blog_article WHERE id = ?1", rusqlite::params![id])?;
        }
        Ok(raw)
      })
      .await?;

    Ok(raw.map(RawArticle::into_article))
  }
}
