// 🔐 Authorization Gate - who is calling, and may they write?
//
// Every operation needs an authenticated caller; mutating operations and the
// unfiltered listing additionally need the administrator role.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Resolves a bearer token to a caller
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Caller>;
}

pub fn require_admin(caller: &Caller) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(RegistryError::Forbidden)
    }
}

// ============================================================================
// STATIC TOKEN TABLE
// ============================================================================

/// One configured API token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub caller_id: String,
    pub name: String,
    pub role: Role,
}

/// Token → caller lookup built from configuration
#[derive(Debug, Clone, Default)]
pub struct TokenAuthenticator {
    callers: HashMap<String, Caller>,
}

impl TokenAuthenticator {
    pub fn new(grants: &[TokenGrant]) -> Self {
        let callers = grants
            .iter()
            .filter(|g| !g.token.is_empty())
            .map(|g| {
                (
                    g.token.clone(),
                    Caller {
                        id: g.caller_id.clone(),
                        name: g.name.clone(),
                        role: g.role,
                    },
                )
            })
            .collect();

        TokenAuthenticator { callers }
    }

    pub fn with_token(mut self, token: impl Into<String>, caller: Caller) -> Self {
        self.callers.insert(token.into(), caller);
        self
    }

    pub fn len(&self) -> usize {
        self.callers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, token: &str) -> Result<Caller> {
        self.callers
            .get(token)
            .cloned()
            .ok_or(RegistryError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(token: &str, role: Role) -> TokenGrant {
        TokenGrant {
            token: token.to_string(),
            caller_id: format!("user-{token}"),
            name: token.to_string(),
            role,
        }
    }

    #[test]
    fn test_known_token_resolves_caller() {
        let auth = TokenAuthenticator::new(&[grant("admin-token", Role::Admin)]);
        let caller = auth.authenticate("admin-token").unwrap();
        assert_eq!(caller.id, "user-admin-token");
        assert!(caller.is_admin());
    }

    #[test]
    fn test_unknown_token_is_unauthorized() {
        let auth = TokenAuthenticator::new(&[grant("admin-token", Role::Admin)]);
        assert!(matches!(
            auth.authenticate("nope").unwrap_err(),
            RegistryError::Unauthorized
        ));
    }

    #[test]
    fn test_empty_tokens_are_ignored() {
        let auth = TokenAuthenticator::new(&[grant("", Role::Admin), grant("t1", Role::Staff)]);
        assert_eq!(auth.len(), 1);
        assert!(auth.authenticate("").is_err());
        assert!(TokenAuthenticator::new(&[grant("", Role::Admin)]).is_empty());
    }

    #[test]
    fn test_role_names_match_config_format() {
        for role in [Role::Admin, Role::Staff] {
            assert_eq!(serde_json::to_value(role).unwrap(), role.as_str());
        }
    }

    #[test]
    fn test_require_admin() {
        let staff = Caller {
            id: "u1".to_string(),
            name: "Sam".to_string(),
            role: Role::Staff,
        };
        assert!(matches!(
            require_admin(&staff).unwrap_err(),
            RegistryError::Forbidden
        ));

        let admin = Caller {
            role: Role::Admin,
            ..staff
        };
        assert!(require_admin(&admin).is_ok());
    }
}
