//! The `ArticleStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `blogshelf-store-sqlite`). Business rules live in
//! [`ArticleService`](crate::service::ArticleService); a backend only reads
//! and writes rows.

use std::future::Future;

use serde_json::Value;
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
  Error, Result,
  article::{Article, ArticleChanges},
};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// The columns of `blog_article`. Doubles as the whitelist for client-supplied
/// filter keys and field projections.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
  Id,
  Title,
  Subtitle,
  Author,
  UrlSlug,
  Draft,
  Body,
  Metadata,
  Tags,
  BodyImages,
  ThumbnailImage,
  SeoTitle,
  SeoKeywords,
  SeoDescription,
  CreatedAt,
  UpdatedAt,
}

impl Column {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse a client-supplied field name.
  pub fn from_name(name: &str) -> Result<Self> {
    name
      .parse()
      .map_err(|_| Error::InvalidQuery(format!("unknown field {name:?}")))
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
  Text(String),
  Bool(bool),
  Integer(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  /// Case-insensitive substring match.
  Contains(Column, String),
  Equals(Column, FilterValue),
}

/// A conjunction of [`Condition`]s, applied identically to the page query and
/// the count query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
  pub conditions: Vec<Condition>,
}

impl ArticleFilter {
  /// Case-insensitive title search.
  pub fn title_contains(needle: impl Into<String>) -> Self {
    Self {
      conditions: vec![Condition::Contains(Column::Title, needle.into())],
    }
  }

  /// Parse the `where` object of the admin list route, e.g.
  /// `{"title":{"$ilike":"rust"},"draft":false}`.
  pub fn from_json(value: &Value) -> Result<Self> {
    let Value::Object(fields) = value else {
      return Err(Error::InvalidQuery("`where` must be an object".into()));
    };

    let mut conditions = Vec::with_capacity(fields.len());
    for (key, value) in fields {
      let column = Column::from_name(key)?;
      let condition = match value {
        Value::Object(op) => match op.get("$ilike") {
          Some(Value::String(needle)) => Condition::Contains(column, needle.clone()),
          _ => {
            return Err(Error::InvalidQuery(format!(
              "unsupported operator for field {key:?}"
            )));
          }
        },
        Value::String(s) => Condition::Equals(column, FilterValue::Text(s.clone())),
        Value::Bool(b) => Condition::Equals(column, FilterValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
          Some(i) => Condition::Equals(column, FilterValue::Integer(i)),
          None => {
            return Err(Error::InvalidQuery(format!(
              "unsupported number for field {key:?}"
            )));
          }
        },
        _ => {
          return Err(Error::InvalidQuery(format!(
            "unsupported value for field {key:?}"
          )));
        }
      };
      conditions.push(condition);
    }

    Ok(Self { conditions })
  }
}

/// Parameters for [`ArticleStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
  pub filter:         ArticleFilter,
  /// Restrict to rows with `draft = false`.
  pub published_only: bool,
  pub skip:           u64,
  pub take:           u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a `blog_article` backend.
///
/// Ids passed in are always fully prefixed. All methods return `Send` futures
/// so the trait can be used from axum handlers.
pub trait ArticleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<Error>;

  /// One page of articles, newest first, plus the number of rows matching
  /// the same filter.
  fn list<'a>(
    &'a self,
    query: &'a ArticleQuery,
  ) -> impl Future<Output = Result<(Vec<Article>, u64), Self::Error>> + Send + 'a;

  /// Retrieve an article by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + 'a;

  /// Retrieve a published article by `url_slug`.
  fn find_published<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + 'a;

  /// Insert a fully-populated article and return the stored row.
  fn insert(
    &self,
    article: Article,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Write `changes` to an existing row and return it. Returns `None` if no
  /// row has this id.
  fn update<'a>(
    &'a self,
    id: &'a str,
    changes: ArticleChanges,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + 'a;

  /// Hard-delete a row and return what was deleted.
  fn delete<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + 'a;
}
