//! The acting admin user and how their display name becomes an article author.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Fallback author when no identity is available at all.
pub const DEFAULT_AUTHOR: &str = "Admin";

/// Profile fields of an admin user, as known to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub id:         String,
  #[serde(default)]
  pub email:      Option<String>,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name:  Option<String>,
}

/// Maps an actor id to a [`UserProfile`].
///
/// Implemented by whatever owns user accounts; the article adapter only
/// consumes it.
pub trait IdentityResolver: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up a user. Returns `None` if the id is unknown.
  fn resolve<'a>(
    &'a self,
    actor_id: &'a str,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + 'a;
}

/// The user performing an admin request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
  pub id:      Option<String>,
  pub profile: Option<UserProfile>,
}

impl Actor {
  /// Resolve `actor_id` through `resolver`. Lookup failures degrade to an
  /// actor known only by id.
  pub async fn resolve<R: IdentityResolver>(resolver: &R, actor_id: Option<String>) -> Self {
    let Some(id) = actor_id.filter(|id| !id.is_empty()) else {
      return Self::default();
    };

    let profile = match resolver.resolve(&id).await {
      Ok(profile) => profile,
      Err(e) => {
        tracing::warn!(actor_id = %id, error = %e, "identity lookup failed");
        None
      }
    };

    Self { id: Some(id), profile }
  }

  /// The author name recorded on articles this actor creates: email, else
  /// `first last`, else the actor id, else [`DEFAULT_AUTHOR`].
  pub fn author_name(&self) -> String {
    if let Some(profile) = &self.profile {
      if let Some(email) = non_blank(profile.email.as_deref()) {
        return email.to_owned();
      }
      if let (Some(first), Some(last)) = (
        non_blank(profile.first_name.as_deref()),
        non_blank(profile.last_name.as_deref()),
      ) {
        return format!("{first} {last}");
      }
    }

    non_blank(self.id.as_deref())
      .unwrap_or(DEFAULT_AUTHOR)
      .to_owned()
  }
}

fn non_blank(s: Option<&str>) -> Option<&str> { s.filter(|s| !s.trim().is_empty()) }
