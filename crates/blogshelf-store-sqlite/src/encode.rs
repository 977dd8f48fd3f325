//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond precision
//! so that text order is time order. Documents and arrays are stored as
//! compact JSON; decoding goes through the lenient rules in
//! [`blogshelf_core::normalize`] because older writers used other encodings.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};

use blogshelf_core::{
  article::{Article, ArticleChanges},
  normalize::{decode_document, encode_document, normalize_array_text},
  store::{ArticleFilter, Column, Condition, FilterValue},
};

use crate::{Error, Result, store::UNICODE_LOWER};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

/// Accepts RFC 3339, Postgres `timestamptz` text (`YYYY-MM-DD HH:MM:SS.ffffff+00`)
/// and SQLite's `CURRENT_TIMESTAMP` format (`YYYY-MM-DD HH:MM:SS`, assumed UTC).
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Like [`decode_dt`], but an unreadable value becomes the Unix epoch so one
/// bad row cannot fail a whole page.
fn decode_dt_lenient(id: &str, column: &str, s: &str) -> DateTime<Utc> {
  decode_dt(s).unwrap_or_else(|e| {
    tracing::warn!(%id, column, error = %e, "unreadable timestamp, using epoch");
    DateTime::<Utc>::default()
  })
}

// ─── Arrays and documents ────────────────────────────────────────────────────

pub fn encode_array(items: &[String]) -> Result<String> { Ok(serde_json::to_string(items)?) }

pub fn decode_array(raw: Option<&str>) -> Vec<String> {
  raw.map(normalize_array_text).unwrap_or_default()
}

pub fn encode_metadata(metadata: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(metadata)?)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list matching [`RawArticle::from_row`].
pub const ARTICLE_COLUMNS: &str = "id, title, subtitle, author, url_slug, draft, body, \
   metadata, tags, body_images, thumbnail_image, seo_title, seo_keywords, \
   seo_description, created_at, updated_at";

/// Raw values read directly from a `blog_article` row.
pub struct RawArticle {
  pub id:              String,
  pub title:           String,
  pub subtitle:        String,
  pub author:          String,
  pub url_slug:        String,
  pub draft:           bool,
  pub body:            Option<String>,
  pub metadata:        Option<String>,
  pub tags:            Option<String>,
  pub body_images:     Option<String>,
  pub thumbnail_image: Option<String>,
  pub seo_title:       String,
  pub seo_keywords:    String,
  pub seo_description: String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawArticle {
  /// Read a row selected with [`ARTICLE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      title:           row.get(1)?,
      subtitle:        row.get(2)?,
      author:          row.get(3)?,
      url_slug:        row.get(4)?,
      draft:           row.get(5)?,
      body:            row.get(6)?,
      metadata:        row.get(7)?,
      tags:            row.get(8)?,
      body_images:     row.get(9)?,
      thumbnail_image: row.get(10)?,
      seo_title:       row.get(11)?,
      seo_keywords:    row.get(12)?,
      seo_description: row.get(13)?,
      created_at:      row.get(14)?,
      updated_at:      row.get(15)?,
    })
  }

  /// Decode every column. Never fails: malformed values fall back per column.
  pub fn into_article(self) -> Article {
    Article {
      body:            decode_document(self.body.as_deref()),
      metadata:        decode_document(self.metadata.as_deref()),
      tags:            decode_array(self.tags.as_deref()),
      body_images:     decode_array(self.body_images.as_deref()),
      created_at:      decode_dt_lenient(&self.id, "created_at", &self.created_at),
      updated_at:      decode_dt_lenient(&self.id, "updated_at", &self.updated_at),
      id:              self.id,
      title:           self.title,
      subtitle:        self.subtitle,
      author:          self.author,
      url_slug:        self.url_slug,
      draft:           self.draft,
      thumbnail_image: self.thumbnail_image,
      seo_title:       self.seo_title,
      seo_keywords:    self.seo_keywords,
      seo_description: self.seo_description,
    }
  }
}

/// Every column of `article`, in [`ARTICLE_COLUMNS`] order, ready to bind.
pub fn article_params(article: &Article) -> Result<Vec<SqlValue>> {
  Ok(vec![
    SqlValue::Text(article.id.clone()),
    SqlValue::Text(article.title.clone()),
    SqlValue::Text(article.subtitle.clone()),
    SqlValue::Text(article.author.clone()),
    SqlValue::Text(article.url_slug.clone()),
    SqlValue::Integer(article.draft.into()),
    optional_text(article.body.as_ref().map(encode_document)),
    optional_text(article.metadata.as_ref().map(encode_document)),
    SqlValue::Text(encode_array(&article.tags)?),
    SqlValue::Text(encode_array(&article.body_images)?),
    optional_text(article.thumbnail_image.clone()),
    SqlValue::Text(article.seo_title.clone()),
    SqlValue::Text(article.seo_keywords.clone()),
    SqlValue::Text(article.seo_description.clone()),
    SqlValue::Text(encode_dt(article.created_at)),
    SqlValue::Text(encode_dt(article.updated_at)),
  ])
}

fn optional_text(s: Option<String>) -> SqlValue { s.map_or(SqlValue::Null, SqlValue::Text) }

// ─── Query fragments ─────────────────────────────────────────────────────────

/// Build a `WHERE` clause (possibly empty) and its bound parameters.
///
/// Column names come from the [`Column`] whitelist; values are always bound.
pub fn where_clause(filter: &ArticleFilter, published_only: bool) -> (String, Vec<SqlValue>) {
  let mut conds = Vec::new();
  let mut params = Vec::new();

  if published_only {
    conds.push("draft = 0".to_owned());
  }

  for condition in &filter.conditions {
    match condition {
      Condition::Contains(column, needle) => {
        conds.push(format!("{UNICODE_LOWER}({column}) LIKE ? ESCAPE '\\'"));
        params.push(SqlValue::Text(format!(
          "%{}%",
          escape_like(&needle.to_lowercase())
        )));
      }
      Condition::Equals(column, value) => {
        conds.push(format!("{column} = ?"));
        params.push(filter_param(value));
      }
    }
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (clause, params)
}

fn filter_param(value: &FilterValue) -> SqlValue {
  match value {
    FilterValue::Text(s) => SqlValue::Text(s.clone()),
    FilterValue::Bool(b) => SqlValue::Integer((*b).into()),
    FilterValue::Integer(i) => SqlValue::Integer(*i),
  }
}

fn escape_like(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// Build the `SET` list of an `UPDATE` and its bound parameters. Columns
/// without a change are omitted so the stored value survives.
pub fn set_clause(changes: &ArticleChanges) -> Result<(String, Vec<SqlValue>)> {
  let mut sets: Vec<(Column, SqlValue)> = Vec::new();

  let texts = [
    (Column::Title, &changes.title),
    (Column::Subtitle, &changes.subtitle),
    (Column::Author, &changes.author),
    (Column::UrlSlug, &changes.url_slug),
    (Column::ThumbnailImage, &changes.thumbnail_image),
    (Column::SeoTitle, &changes.seo_title),
    (Column::SeoKeywords, &changes.seo_keywords),
    (Column::SeoDescription, &changes.seo_description),
  ];
  for (column, value) in texts {
    if let Some(text) = value {
      sets.push((column, SqlValue::Text(text.clone())));
    }
  }

  if let Some(draft) = changes.draft {
    sets.push((Column::Draft, SqlValue::Integer(draft.into())));
  }
  if let Some(body) = &changes.body {
    sets.push((Column::Body, optional_text(body.as_ref().map(encode_document))));
  }
  if let Some(metadata) = &changes.metadata {
    let encoded = metadata.as_ref().map(encode_metadata).transpose()?;
    sets.push((Column::Metadata, optional_text(encoded)));
  }
  if let Some(tags) = &changes.tags {
    sets.push((Column::Tags, SqlValue::Text(encode_array(tags)?)));
  }
  if let Some(images) = &changes.body_images {
    sets.push((Column::BodyImages, SqlValue::Text(encode_array(images)?)));
  }
  sets.push((Column::UpdatedAt, SqlValue::Text(encode_dt(changes.updated_at))));

  let clause = sets
    .iter()
    .map(|(column, _)| format!("{column} = ?"))
    .collect::<Vec<_>>()
    .join(", ");
  let params = sets.into_iter().map(|(_, value)| value).collect();
  Ok((clause, params))
}
