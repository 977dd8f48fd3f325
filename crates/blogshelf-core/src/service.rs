//! [`ArticleService`]: the admin and public article operations.
//!
//! Handlers call the service; the service applies defaults, normalization and
//! the publish rule, then hands plain rows to the [`ArticleStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
  Error, Result,
  article::{Article, ArticleChanges, ArticleInput, ID_PREFIX, article_id},
  clock::unique_millis,
  identity::Actor,
  normalize::{absolute_thumbnail, clean_metadata, slug_with_suffix},
  store::{ArticleFilter, ArticleQuery, ArticleStore},
};

/// Message returned when publishing an article without a title or content.
pub const EMPTY_ARTICLE: &str =
  "You cannot change the draft status if the article is empty or the article is not saved";

/// Origin used for public thumbnail URLs unless configured otherwise.
pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:9000";

/// Article operations over a shared store.
///
/// Cloning is cheap: the store is reference-counted.
#[derive(Debug)]
pub struct ArticleService<S> {
  store:         Arc<S>,
  public_origin: String,
}

impl<S> Clone for ArticleService<S> {
  fn clone(&self) -> Self {
    Self {
      store:         Arc::clone(&self.store),
      public_origin: self.public_origin.clone(),
    }
  }
}

impl<S: ArticleStore> ArticleService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      public_origin: DEFAULT_PUBLIC_ORIGIN.to_owned(),
    }
  }

  /// Set the origin that relative thumbnail paths are resolved against on
  /// the public read path.
  pub fn with_public_origin(mut self, origin: impl Into<String>) -> Self {
    self.public_origin = origin.into();
    self
  }

  pub fn store(&self) -> &S { &self.store }

  // ── Admin ─────────────────────────────────────────────────────────────────

  /// One page of articles matching `filter`, and the total match count.
  pub async fn list(
    &self,
    filter: ArticleFilter,
    skip: u64,
    take: u64,
  ) -> Result<(Vec<Article>, u64)> {
    let query = ArticleQuery {
      filter,
      published_only: false,
      skip,
      take,
    };
    self.store.list(&query).await.map_err(Into::into)
  }

  /// Fetch one article by bare or prefixed id.
  pub async fn get(&self, id: &str) -> Result<Article> {
    let id = article_id(id);
    let article = self.store.get(&id).await.map_err(Into::<Error>::into)?;
    article.ok_or(Error::NotFound(id))
  }

  /// Create an article, filling every field the payload leaves out.
  pub async fn create(&self, input: ArticleInput, actor: &Actor) -> Result<Article> {
    let article = new_article(input, actor, Utc::now());
    tracing::debug!(id = %article.id, slug = %article.url_slug, "creating article");
    self.store.insert(article).await.map_err(Into::into)
  }

  /// Update an article in status-change or field-update mode.
  pub async fn update(&self, id: &str, input: ArticleInput, actor: &Actor) -> Result<Article> {
    let id = article_id(id);
    let existing = self
      .store
      .get(&id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or_else(|| Error::NotFound(id.clone()))?;

    let now = Utc::now();
    let changes = if input.is_status_change() {
      if input.draft == Some(false) && !existing.is_publishable() {
        return Err(Error::ValidationFailed(EMPTY_ARTICLE.to_owned()));
      }
      ArticleChanges {
        draft: input.draft,
        ..ArticleChanges::at(now)
      }
    } else {
      field_changes(input, &existing, actor, now)
    };

    let updated = self
      .store
      .update(&id, changes)
      .await
      .map_err(Into::<Error>::into)?;
    updated.ok_or(Error::NotFound(id))
  }

  /// Hard-delete an article. Deleting a missing id is not an error.
  pub async fn delete(&self, id: &str) -> Result<Option<Article>> {
    let id = article_id(id);
    let deleted = self.store.delete(&id).await.map_err(Into::<Error>::into)?;
    if deleted.is_none() {
      tracing::debug!(%id, "delete matched no article");
    }
    Ok(deleted)
  }

  // ── Public ────────────────────────────────────────────────────────────────

  /// One page of published articles and the number of published articles.
  pub async fn list_published(&self, skip: u64, take: u64) -> Result<(Vec<Article>, u64)> {
    let query = ArticleQuery {
      filter: ArticleFilter::default(),
      published_only: true,
      skip,
      take,
    };
    let (articles, count) = self.store.list(&query).await.map_err(Into::<Error>::into)?;
    let articles = articles.into_iter().map(|a| self.publicize(a)).collect();
    Ok((articles, count))
  }

  /// A published article by slug.
  pub async fn get_published(&self, slug: &str) -> Result<Article> {
    self
      .store
      .find_published(slug)
      .await
      .map_err(Into::<Error>::into)?
      .map(|a| self.publicize(a))
      .ok_or_else(|| Error::NotFound(slug.to_owned()))
  }

  fn publicize(&self, mut article: Article) -> Article {
    if let Some(thumbnail) = article.thumbnail_image.as_deref() {
      article.thumbnail_image = Some(absolute_thumbnail(thumbnail, &self.public_origin));
    }
    article
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn non_blank(s: Option<&str>) -> Option<&str> { s.filter(|s| !s.trim().is_empty()) }

/// Text defaults treat only `""` as missing; whitespace is kept as written.
fn non_empty(s: Option<&str>) -> Option<&str> { s.filter(|s| !s.is_empty()) }

fn default_seo_title(title: Option<&str>, stamp: impl FnOnce() -> i64) -> String {
  match non_empty(title) {
    Some(title) => title.to_owned(),
    None => format!("Article {}", stamp()),
  }
}

/// Build the row inserted by `create`.
fn new_article(input: ArticleInput, actor: &Actor, now: DateTime<Utc>) -> Article {
  let stamp = unique_millis();

  let id = match non_blank(input.id.as_deref()) {
    Some(id) => article_id(id.trim()),
    None => format!("{ID_PREFIX}{stamp}"),
  };

  let title = input.title.flatten().unwrap_or_default();
  let subtitle = input.subtitle.flatten().unwrap_or_default();

  let author = input
    .author
    .flatten()
    .filter(|a| !a.is_empty())
    .unwrap_or_else(|| actor.author_name());
  let url_slug = input
    .url_slug
    .flatten()
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| slug_with_suffix(&title, stamp));
  let seo_title = input
    .seo_title
    .flatten()
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| default_seo_title(Some(&title), || stamp));
  let seo_description = input
    .seo_description
    .flatten()
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| subtitle.clone());

  Article {
    id,
    title,
    subtitle,
    author,
    url_slug,
    draft: input.draft.unwrap_or(false),
    body: input.body.flatten(),
    metadata: input
      .metadata
      .flatten()
      .and_then(clean_metadata)
      .map(Value::Object),
    tags: input.tags.flatten().unwrap_or_default(),
    body_images: input.body_images.flatten().unwrap_or_default(),
    thumbnail_image: Some(input.thumbnail_image.flatten().unwrap_or_default()),
    seo_title,
    seo_keywords: input.seo_keywords.flatten().unwrap_or_default(),
    seo_description,
    created_at: now,
    updated_at: now,
  }
}

/// Translate a field-update payload into column changes.
///
/// Present keys are written (null becomes `""` for text, `[]` for arrays);
/// absent keys are left alone unless the stored value is empty and a default
/// exists for it.
fn field_changes(
  input: ArticleInput,
  existing: &Article,
  actor: &Actor,
  now: DateTime<Utc>,
) -> ArticleChanges {
  let text = |field: Option<Option<String>>| field.map(Option::unwrap_or_default);

  let mut changes = ArticleChanges {
    title:           text(input.title),
    subtitle:        text(input.subtitle),
    author:          text(input.author),
    url_slug:        text(input.url_slug),
    draft:           input.draft,
    body:            input.body,
    metadata:        input.metadata.map(|m| m.and_then(clean_metadata)),
    tags:            input.tags.map(Option::unwrap_or_default),
    body_images:     input.body_images.map(Option::unwrap_or_default),
    thumbnail_image: text(input.thumbnail_image),
    seo_title:       text(input.seo_title),
    seo_keywords:    text(input.seo_keywords),
    seo_description: text(input.seo_description),
    updated_at:      now,
  };

  let title = non_empty(changes.title.as_deref())
    .or(non_empty(Some(existing.title.as_str())))
    .map(str::to_owned);

  if changes.seo_title.is_none() && existing.seo_title.is_empty() {
    changes.seo_title = Some(default_seo_title(title.as_deref(), unique_millis));
  }
  if changes.seo_keywords.is_none() && existing.seo_keywords.is_empty() {
    changes.seo_keywords = Some(String::new());
  }
  if changes.seo_description.is_none() && existing.seo_description.is_empty() {
    let subtitle = non_empty(changes.subtitle.as_deref())
      .or(non_empty(Some(existing.subtitle.as_str())))
      .unwrap_or_default();
    changes.seo_description = Some(subtitle.to_owned());
  }
  if changes.author.is_none() && existing.author.is_empty() {
    changes.author = Some(actor.author_name());
  }
  if changes.url_slug.is_none() && existing.url_slug.is_empty() {
    changes.url_slug = Some(slug_with_suffix(
      title.as_deref().unwrap_or_default(),
      unique_millis(),
    ));
  }
  if changes.tags.is_none() && existing.tags.is_empty() {
    changes.tags = Some(Vec::new());
  }
  if changes.body_images.is_none() && existing.body_images.is_empty() {
    changes.body_images = Some(Vec::new());
  }

  changes
}
