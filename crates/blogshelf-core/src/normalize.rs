//! Normalization rules for values read from or written to `blog_article`.
//!
//! Rows in the table have been written by several generations of clients, so
//! the same logical field can arrive as native JSON, JSON-encoded text, or a
//! Postgres array literal. Everything here is total: a value that cannot be
//! decoded falls back to a sensible shape instead of failing the request.

use serde_json::{Map, Value};

// ─── Arrays ──────────────────────────────────────────────────────────────────

/// Coerce a stored `tags`/`body_images` value of unknown shape into a list of
/// strings.
///
/// Native arrays are kept, strings are decoded with
/// [`normalize_array_text`], anything else yields an empty list.
pub fn normalize_array(value: &Value) -> Vec<String> {
  match value {
    Value::Array(items) => items.iter().filter_map(element_text).collect(),
    Value::String(raw) => normalize_array_text(raw),
    _ => Vec::new(),
  }
}

/// Decode array text: a Postgres literal like `{a,"b c"}` or JSON.
///
/// A JSON scalar becomes a single-element list; unparseable text and JSON
/// `null` become an empty list.
pub fn normalize_array_text(raw: &str) -> Vec<String> {
  let trimmed = raw.trim();

  if let Some(inner) = trimmed
    .strip_prefix('{')
    .and_then(|rest| rest.strip_suffix('}'))
  {
    return inner
      .split(',')
      .map(unquote)
      .filter(|item| !item.is_empty())
      .map(str::to_owned)
      .collect();
  }

  match serde_json::from_str::<Value>(trimmed) {
    Ok(Value::Array(items)) => items.iter().filter_map(element_text).collect(),
    Ok(scalar) => element_text(&scalar).into_iter().collect(),
    Err(_) => Vec::new(),
  }
}

fn element_text(value: &Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(s) => Some(s.clone()),
    other => Some(other.to_string()),
  }
}

fn unquote(item: &str) -> &str {
  let item = item.trim();
  item
    .strip_prefix('"')
    .and_then(|rest| rest.strip_suffix('"'))
    .unwrap_or(item)
    .trim()
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Decode a JSON-as-text column (`body`, `metadata`).
///
/// Blank or missing text is `None`; text that is not valid JSON is kept
/// verbatim as a JSON string.
pub fn decode_document(raw: Option<&str>) -> Option<Value> {
  let raw = raw?;
  if raw.trim().is_empty() {
    return None;
  }
  Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned())))
}

/// Serialize a document for storage. Strings are stored as-is so that text
/// which was never valid JSON round-trips unchanged.
pub fn encode_document(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// Whether a decoded `body` holds at least one editor content block.
pub fn has_content_blocks(body: Option<&Value>) -> bool {
  body
    .and_then(|b| b.get("blocks"))
    .and_then(Value::as_array)
    .is_some_and(|blocks| !blocks.is_empty())
}

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Drop entries whose value is `""` or `null` (the editor's way of deleting a
/// key). An empty result collapses to `None`.
pub fn clean_metadata(mut metadata: Map<String, Value>) -> Option<Map<String, Value>> {
  metadata.retain(|_, v| !(v.is_null() || v.as_str() == Some("")));
  if metadata.is_empty() { None } else { Some(metadata) }
}

// ─── Slugs ───────────────────────────────────────────────────────────────────

/// Lower-case `title`, keep ASCII word characters, and join the words with
/// single hyphens.
pub fn slugify(title: &str) -> String {
  let mut slug = String::with_capacity(title.len());
  let mut separator = false;

  for c in title.trim().chars().flat_map(char::to_lowercase) {
    if c.is_ascii_alphanumeric() {
      if separator && !slug.is_empty() {
        slug.push('-');
      }
      separator = false;
      slug.push(c);
    } else if c == '_' || c == '-' || c.is_whitespace() {
      separator = true;
    }
  }

  slug
}

/// A unique slug: the slugified title followed by `-<stamp>`, or
/// `article-<stamp>` when the title has no usable characters.
pub fn slug_with_suffix(title: &str, stamp: i64) -> String {
  let base = slugify(title);
  if base.is_empty() {
    format!("article-{stamp}")
  } else {
    format!("{base}-{stamp}")
  }
}

// ─── Public URLs ─────────────────────────────────────────────────────────────

/// Rewrite a stored thumbnail path into an absolute URL under `origin`.
///
/// Absolute `http(s)` URLs and blank values are returned unchanged; paths
/// starting with `/` are appended to the origin; bare file names are assumed
/// to live under `/static`.
pub fn absolute_thumbnail(value: &str, origin: &str) -> String {
  if value.trim().is_empty()
    || value.starts_with("http://")
    || value.starts_with("https://")
  {
    return value.to_owned();
  }

  let origin = origin.trim_end_matches('/');
  if value.starts_with('/') {
    format!("{origin}{value}")
  } else {
    format!("{origin}/static/{value}")
  }
}
