//! Read-only storefront routes. Drafts are never visible here.

use axum::{
  Json,
  extract::{Path, Query, State, rejection::QueryRejection},
};
use blogshelf_core::{article::Article, identity::IdentityResolver, store::ArticleStore};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  error::{ApiError, PublicError, PublicListError},
  paging::parse_count,
};

/// Page size when the storefront list omits `take`.
pub const DEFAULT_TAKE: u64 = 50;

/// Raw query string; empty values fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub skip: Option<String>,
  pub take: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListEnvelope {
  pub articles: Vec<Article>,
  pub count:    u64,
}

#[derive(Debug, Serialize)]
pub struct ArticleEnvelope {
  pub article: Article,
}

/// `GET /store/blog/articles`
pub async fn list<S, R>(
  State(state): State<ApiState<S, R>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListEnvelope>, PublicListError>
where
  S: ArticleStore,
  R: IdentityResolver,
{
  let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let skip = parse_count("skip", params.skip.as_deref(), 0)?;
  let take = parse_count("take", params.take.as_deref(), DEFAULT_TAKE)?;
  let (articles, count) = state.articles.list_published(skip, take).await?;
  Ok(Json(ListEnvelope { articles, count }))
}

/// `GET /store/blog/articles/{slug}`
pub async fn get_by_slug<S, R>(
  State(state): State<ApiState<S, R>>,
  Path(slug): Path<String>,
) -> Result<Json<ArticleEnvelope>, PublicError>
where
  S: ArticleStore,
  R: IdentityResolver,
{
  let article = state.articles.get_published(&slug).await?;
  Ok(Json(ArticleEnvelope { article }))
}
