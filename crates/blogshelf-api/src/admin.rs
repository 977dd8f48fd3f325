//! Handlers for the admin article routes.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/blog/articles` | `?skip&take&select&where`, JSON-encoded `select`/`where` |
//! | `POST`   | `/admin/blog/articles` | Create |
//! | `GET`    | `/admin/blog/articles/{id}` | Bare or prefixed id |
//! | `POST`   | `/admin/blog/articles/{id}` | Field update, or status change with `change_draft_status` |
//! | `DELETE` | `/admin/blog/articles/{id}` | `article` is null when nothing matched |
//!
//! Every failure is reported in the body with HTTP 200.

use std::collections::HashSet;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
};
use blogshelf_core::{
  article::{Article, ArticleInput},
  identity::IdentityResolver,
  store::{ArticleFilter, ArticleStore, Column},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  ApiState, CurrentActor,
  error::{AdminListError, ApiError},
  paging::parse_count,
};

/// Page size when the admin list omits `take`.
pub const DEFAULT_TAKE: u64 = 20;

// ─── List ─────────────────────────────────────────────────────────────────────

/// Raw query string. Everything arrives as text so that malformed values are
/// reported in the envelope rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub skip:   Option<String>,
  pub take:   Option<String>,
  pub select: Option<String>,
  #[serde(rename = "where")]
  pub filter: Option<String>,
}

/// The query as it was actually applied.
#[derive(Debug, Serialize)]
pub struct SanitizedQuery {
  pub select: Vec<String>,
  pub skip:   u64,
  pub take:   u64,
  #[serde(rename = "where")]
  pub filter: Value,
}

#[derive(Debug, Serialize)]
pub struct ListEnvelope {
  pub articles:        Vec<Value>,
  pub count:           u64,
  pub sanitized_query: SanitizedQuery,
}

/// `GET /admin/blog/articles`
pub async fn list<S, R>(
  State(state): State<ApiState<S, R>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListEnvelope>, AdminListError>
where
  S: ArticleStore,
  R: IdentityResolver,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let skip = parse_count("skip", params.skip.as_deref(), 0)?;
  let take = parse_count("take", params.take.as_deref(), DEFAULT_TAKE)?;
  let select = parse_select(params.select.as_deref())?;
  let filter_json = match params.filter.as_deref().map(str::trim) {
    None | Some("") => Value::Object(Map::new()),
    Some(raw) => serde_json::from_str(raw)
      .map_err(|e| ApiError::BadRequest(format!("invalid `where`: {e}")))?,
  };
  let filter = ArticleFilter::from_json(&filter_json)?;

  tracing::debug!(skip, take, conditions = filter.conditions.len(), "listing articles");
  let (articles, count) = state.articles.list(filter, skip, take).await?;

  let articles = articles
    .iter()
    .map(|a| project(a, select.as_ref()))
    .collect::<Result<Vec<_>, _>>()?;

  let select = match select {
    Some(columns) => columns.iter().map(|c| c.to_string()).collect(),
    None => vec!["*".to_owned()],
  };

  Ok(Json(ListEnvelope {
    articles,
    count,
    sanitized_query: SanitizedQuery {
      select,
      skip,
      take,
      filter: filter_json,
    },
  }))
}

/// `None` selects every field.
fn parse_select(raw: Option<&str>) -> Result<Option<Vec<Column>>, ApiError> {
  let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
    return Ok(None);
  };

  let names: Vec<String> = match serde_json::from_str::<Value>(raw) {
    Ok(Value::Array(items)) => items
      .into_iter()
      .map(|item| match item {
        Value::String(s) => Ok(s),
        other => Err(ApiError::BadRequest(format!("invalid field name {other}"))),
      })
      .collect::<Result<_, _>>()?,
    Ok(Value::String(s)) => vec![s],
    // Unquoted `select=title,draft`.
    _ => raw.split(',').map(|s| s.trim().to_owned()).collect(),
  };

  if names.is_empty() || names.iter().any(|n| n == "*") {
    return Ok(None);
  }

  let mut columns = Vec::with_capacity(names.len());
  for name in &names {
    let column = Column::from_name(name)?;
    if !columns.contains(&column) {
      columns.push(column);
    }
  }
  Ok(Some(columns))
}

fn project(article: &Article, select: Option<&Vec<Column>>) -> Result<Value, ApiError> {
  let value = serde_json::to_value(article).map_err(|e| ApiError::Store(Box::new(e)))?;
  match (select, value) {
    (Some(columns), Value::Object(mut fields)) => {
      let keep: HashSet<&str> = columns.iter().map(|c| c.as_str()).collect();
      fields.retain(|k, _| keep.contains(k.as_str()));
      Ok(Value::Object(fields))
    }
    (_, value) => Ok(value),
  }
}

// ─── Single article ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ArticleEnvelope {
  pub success: bool,
  pub article: Option<Article>,
}

impl ArticleEnvelope {
  fn ok(article: Option<Article>) -> Json<Self> {
    Json(Self {
      success: true,
      article,
    })
  }
}

fn parse_input(body: Result<Json<Value>, JsonRejection>) -> Result<ArticleInput, ApiError> {
  let Json(value) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("invalid article: {e}")))
}

/// `POST /admin/blog/articles`
pub async fn create<S, R>(
  State(state): State<ApiState<S, R>>,
  CurrentActor(actor): CurrentActor,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ArticleEnvelope>, ApiError>
where
  S: ArticleStore + 'static,
  R: IdentityResolver + 'static,
{
  let input = parse_input(body)?;
  let article = state.articles.create(input, &actor).await?;
  tracing::info!(id = %article.id, author = %article.author, "article created");
  Ok(ArticleEnvelope::ok(Some(article)))
}

/// `GET /admin/blog/articles/{id}`
pub async fn get_one<S, R>(
  State(state): State<ApiState<S, R>>,
  Path(id): Path<String>,
) -> Result<Json<ArticleEnvelope>, ApiError>
where
  S: ArticleStore,
  R: IdentityResolver,
{
  let article = state.articles.get(&id).await?;
  Ok(ArticleEnvelope::ok(Some(article)))
}

/// `POST /admin/blog/articles/{id}`
pub async fn update<S, R>(
  State(state): State<ApiState<S, R>>,
  Path(id): Path<String>,
  CurrentActor(actor): CurrentActor,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ArticleEnvelope>, ApiError>
where
  S: ArticleStore + 'static,
  R: IdentityResolver + 'static,
{
  let input = parse_input(body)?;
  let status_change = input.is_status_change();
  let article = state.articles.update(&id, input, &actor).await?;
  tracing::info!(id = %article.id, status_change, draft = article.draft, "article updated");
  Ok(ArticleEnvelope::ok(Some(article)))
}

/// `DELETE /admin/blog/articles/{id}`
pub async fn delete_one<S, R>(
  State(state): State<ApiState<S, R>>,
  Path(id): Path<String>,
) -> Result<Json<ArticleEnvelope>, ApiError>
where
  S: ArticleStore,
  R: IdentityResolver,
{
  let deleted = state.articles.delete(&id).await?;
  if let Some(article) = &deleted {
    tracing::info!(id = %article.id, "article deleted");
  }
  Ok(ArticleEnvelope::ok(deleted))
}
