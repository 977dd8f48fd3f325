//! Wiring for the blogshelf HTTP server: configuration, the configured user
//! directory, and the top-level router.

use std::{collections::HashMap, convert::Infallible, path::PathBuf, sync::Arc};

use axum::Router;
use blogshelf_api::{ApiState, api_router};
use blogshelf_core::{
  identity::{IdentityResolver, UserProfile},
  service::{ArticleService, DEFAULT_PUBLIC_ORIGIN},
  store::ArticleStore,
};
use config::{ConfigBuilder, ConfigError, builder::DefaultState};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BLOGSHELF_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Origin that relative thumbnail paths are resolved against on the
  /// storefront routes.
  pub backend_url: String,
  /// Admin users known to the server, used to name article authors.
  #[serde(default)]
  pub users:       Vec<UserProfile>,
}

/// A config builder preloaded with defaults for every required key. Callers
/// layer their own sources on top.
pub fn config_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 9000)?
    .set_default("store_path", "blogshelf.db")?
    .set_default("backend_url", DEFAULT_PUBLIC_ORIGIN)
}

// ─── User directory ───────────────────────────────────────────────────────────

/// [`IdentityResolver`] over the users listed in the configuration file.
#[derive(Debug, Default)]
pub struct UserDirectory {
  users: HashMap<String, UserProfile>,
}

impl UserDirectory {
  pub fn new(users: impl IntoIterator<Item = UserProfile>) -> Self {
    Self {
      users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
    }
  }

  pub fn len(&self) -> usize { self.users.len() }

  pub fn is_empty(&self) -> bool { self.users.is_empty() }
}

impl IdentityResolver for UserDirectory {
  type Error = Infallible;

  async fn resolve(&self, actor_id: &str) -> Result<Option<UserProfile>, Infallible> {
    Ok(self.users.get(actor_id).cloned())
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: API routes over `store`, with request tracing.
pub fn app<S>(store: S, config: &ServerConfig) -> Router
where
  S: ArticleStore + 'static,
{
  let articles = ArticleService::new(Arc::new(store)).with_public_origin(&config.backend_url);
  let users = UserDirectory::new(config.users.iter().cloned());
  tracing::debug!(users = users.len(), origin = %config.backend_url, "building router");

  api_router(ApiState::new(articles, Arc::new(users))).layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
