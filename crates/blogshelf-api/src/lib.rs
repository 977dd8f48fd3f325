//! JSON HTTP API for blogshelf.
//!
//! Exposes an axum [`Router`] with the admin article routes and the
//! read-only storefront routes, backed by any
//! [`blogshelf_core::store::ArticleStore`]. Admin-session authentication runs
//! upstream and identifies the acting user with the [`ACTOR_HEADER`] header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = blogshelf_api::api_router(ApiState::new(service, resolver));
//! ```

pub mod actor;
pub mod admin;
pub mod error;
mod paging;
pub mod storefront;

use std::sync::Arc;

use axum::{Router, routing::get};
use blogshelf_core::{identity::IdentityResolver, service::ArticleService, store::ArticleStore};

pub use actor::{ACTOR_HEADER, CurrentActor};
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, R> {
  pub articles:   ArticleService<S>,
  pub identities: Arc<R>,
}

impl<S, R> Clone for ApiState<S, R> {
  fn clone(&self) -> Self {
    Self {
      articles:   self.articles.clone(),
      identities: Arc::clone(&self.identities),
    }
  }
}

impl<S, R> ApiState<S, R> {
  pub fn new(articles: ArticleService<S>, identities: Arc<R>) -> Self {
    Self { articles, identities }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, R>(state: ApiState<S, R>) -> Router<()>
where
  S: ArticleStore + 'static,
  R: IdentityResolver + 'static,
{
  Router::new()
    // Admin
    .route(
      "/admin/blog/articles",
      get(admin::list::<S, R>).post(admin::create::<S, R>),
    )
    .route(
      "/admin/blog/articles/{id}",
      get(admin::get_one::<S, R>)
        .post(admin::update::<S, R>)
        .delete(admin::delete_one::<S, R>),
    )
    // Storefront
    .route("/store/blog/articles", get(storefront::list::<S, R>))
    .route("/store/blog/articles/{slug}", get(storefront::get_by_slug::<S, R>))
    .with_state(state)
}
