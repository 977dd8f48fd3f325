//! Extractor for the acting admin user.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use blogshelf_core::{
  identity::{Actor, IdentityResolver},
  store::ArticleStore,
};

use crate::ApiState;

/// Header carrying the authenticated actor id, set by the upstream
/// admin-session middleware.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The resolved [`Actor`] for this request.
///
/// Never rejects: a missing header yields an anonymous actor, and a failed
/// lookup yields an actor known only by id.
pub struct CurrentActor(pub Actor);

impl<S, R> FromRequestParts<ApiState<S, R>> for CurrentActor
where
  S: ArticleStore + 'static,
  R: IdentityResolver + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, R>,
  ) -> Result<Self, Self::Rejection> {
    let actor_id = parts
      .headers
      .get(ACTOR_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(|v| v.trim().to_owned());

    Ok(CurrentActor(Actor::resolve(state.identities.as_ref(), actor_id).await))
  }
}
