//! Actor identity as asserted by the upstream gateway.
//!
//! Authentication itself lives in front of this service; the gateway
//! terminates the session and forwards the caller's identity in
//! `x-actor-role` / `x-actor-id` / `x-actor-name` headers. Handlers extract
//! an [`Actor`] and pass its role down to the ledger, which only cares about
//! staff-versus-client for transition validation.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ServiceError;

pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// The four roles the back office knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Superadmin,
    Admin,
    /// Production department staff.
    Prd,
    Client,
}

impl ActorRole {
    pub fn is_staff(self) -> bool {
        !matches!(self, ActorRole::Client)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Superadmin => write!(f, "superadmin"),
            ActorRole::Admin => write!(f, "admin"),
            ActorRole::Prd => write!(f, "prd"),
            ActorRole::Client => write!(f, "client"),
        }
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "superadmin" => Ok(ActorRole::Superadmin),
            "admin" => Ok(ActorRole::Admin),
            "prd" | "prd.user" | "user" => Ok(ActorRole::Prd),
            "client" => Ok(ActorRole::Client),
            other => Err(format!("Unknown actor role '{}'", other)),
        }
    }
}

/// Resolved caller identity for the duration of one request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub role: ActorRole,
    pub id: Option<i64>,
    pub name: String,
}

impl Actor {
    pub fn require_staff(&self) -> Result<(), ServiceError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "This action requires a staff role".to_string(),
            ))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let role = header(ACTOR_ROLE_HEADER)
            .ok_or_else(|| {
                ServiceError::Unauthorized(format!("Missing {} header", ACTOR_ROLE_HEADER))
            })?
            .parse::<ActorRole>()
            .map_err(ServiceError::Unauthorized)?;

        let id = match header(ACTOR_ID_HEADER) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                ServiceError::Unauthorized(format!("Invalid {} header", ACTOR_ID_HEADER))
            })?),
            None => None,
        };

        let name = header(ACTOR_NAME_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| role.to_string());

        Ok(Actor { role, id, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles_are_staff() {
        assert!(ActorRole::Superadmin.is_staff());
        assert!(ActorRole::Admin.is_staff());
        assert!(ActorRole::Prd.is_staff());
        assert!(!ActorRole::Client.is_staff());
    }

    #[test]
    fn roles_parse_from_gateway_spelling() {
        assert_eq!("superadmin".parse::<ActorRole>().unwrap(), ActorRole::Superadmin);
        assert_eq!("prd.user".parse::<ActorRole>().unwrap(), ActorRole::Prd);
        assert!("dispatcher".parse::<ActorRole>().is_err());
    }
}
