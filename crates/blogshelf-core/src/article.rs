//! The `Article` record and the payload shapes used to create and change it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{has_content_blocks, normalize_array};

/// Every stored article id carries this prefix.
pub const ID_PREFIX: &str = "blog_article_";

/// Add [`ID_PREFIX`] to a bare id; already-prefixed ids are returned as-is.
pub fn article_id(raw: &str) -> String {
  if raw.starts_with(ID_PREFIX) {
    raw.to_owned()
  } else {
    format!("{ID_PREFIX}{raw}")
  }
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A row of `blog_article`, fully decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub id:              String,
  pub title:           String,
  pub subtitle:        String,
  pub author:          String,
  pub url_slug:        String,
  pub draft:           bool,
  /// Editor document. Text that was never valid JSON surfaces as a string.
  pub body:            Option<Value>,
  pub metadata:        Option<Value>,
  pub tags:            Vec<String>,
  pub body_images:     Vec<String>,
  pub thumbnail_image: Option<String>,
  pub seo_title:       String,
  pub seo_keywords:    String,
  pub seo_description: String,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Article {
  /// An article may leave draft only with a title and at least one content
  /// block.
  pub fn is_publishable(&self) -> bool {
    !self.title.trim().is_empty() && has_content_blocks(self.body.as_ref())
  }
}

// ─── Request payload ─────────────────────────────────────────────────────────

/// JSON body accepted by the admin create and update routes.
///
/// Each field distinguishes "absent" (`None`) from "explicitly null"
/// (`Some(None)`); update semantics depend on the difference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleInput {
  #[serde(default)]
  pub id:                  Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub title:               Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub subtitle:            Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub author:              Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub url_slug:            Option<Option<String>>,
  #[serde(default)]
  pub draft:               Option<bool>,
  #[serde(default, deserialize_with = "present")]
  pub body:                Option<Option<Value>>,
  #[serde(default, deserialize_with = "present")]
  pub metadata:            Option<Option<Map<String, Value>>>,
  #[serde(default, deserialize_with = "present_array")]
  pub tags:                Option<Option<Vec<String>>>,
  #[serde(default, deserialize_with = "present_array")]
  pub body_images:         Option<Option<Vec<String>>>,
  #[serde(default, deserialize_with = "present")]
  pub thumbnail_image:     Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub seo_title:           Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub seo_keywords:        Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub seo_description:     Option<Option<String>>,
  /// Selects status-change mode on update: only `draft` is written.
  #[serde(default)]
  pub change_draft_status: Option<bool>,
}

impl ArticleInput {
  pub fn is_status_change(&self) -> bool { self.change_draft_status.unwrap_or(false) }
}

/// Marks a field as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

/// Like [`present`], but accepts any array encoding a client might send.
fn present_array<'de, D>(de: D) -> Result<Option<Option<Vec<String>>>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Value::deserialize(de)?;
  Ok(Some(if value.is_null() {
    None
  } else {
    Some(normalize_array(&value))
  }))
}

// ─── Column changes ──────────────────────────────────────────────────────────

/// The columns an update writes. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleChanges {
  pub title:           Option<String>,
  pub subtitle:        Option<String>,
  pub author:          Option<String>,
  pub url_slug:        Option<String>,
  pub draft:           Option<bool>,
  /// `Some(None)` clears the column.
  pub body:            Option<Option<Value>>,
  /// `Some(None)` clears the column.
  pub metadata:        Option<Option<Map<String, Value>>>,
  pub tags:            Option<Vec<String>>,
  pub body_images:     Option<Vec<String>>,
  pub thumbnail_image: Option<String>,
  pub seo_title:       Option<String>,
  pub seo_keywords:    Option<String>,
  pub seo_description: Option<String>,
  pub updated_at:      DateTime<Utc>,
}

impl ArticleChanges {
  /// No column changes other than refreshing `updated_at`.
  pub fn at(updated_at: DateTime<Utc>) -> Self {
    Self {
      title: None,
      subtitle: None,
      author: None,
      url_slug: None,
      draft: None,
      body: None,
      metadata: None,
      tags: None,
      body_images: None,
      thumbnail_image: None,
      seo_title: None,
      seo_keywords: None,
      seo_description: None,
      updated_at,
    }
  }
}
