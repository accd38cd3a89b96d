use axum::{extract::FromRequestParts, http::request::Parts};

use crate::api::error::AppError;

/// Header carrying the identity recorded on every write.
pub const ACTOR_HEADER: &str = "x-gatehouse-actor";

/// The caller responsible for a mutation, taken from the actor header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AppError::MissingActor)?;
        Ok(Actor(actor.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Actor, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(ACTOR_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_actor_from_header() {
        let actor = extract(Some("  alice@example.com ")).await.unwrap();
        assert_eq!(actor.as_str(), "alice@example.com");
    }

    #[tokio::test]
    async fn test_missing_or_blank_actor_is_rejected() {
        assert!(matches!(extract(None).await, Err(AppError::MissingActor)));
        assert!(matches!(extract(Some("   ")).await, Err(AppError::MissingActor)));
    }
}
