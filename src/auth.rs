//! Signed-in user session
//!
//! The signed-in user is kept as JSON under [`USER_KEY`] so a restart restores
//! the session. Sign-in is local only: any email is accepted.

use crate::error::SetuError;
use crate::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

/// Storage key for the signed-in user
pub const USER_KEY: &str = "user";

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SetuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            other => Err(SetuError::ParseError(format!("unknown role: {}", other))),
        }
    }
}

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// New user; the name defaults to the part of the email before `@`
    pub fn new(email: &str, name: Option<&str>, role: Role) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name,
            email: email.to_string(),
            role,
        }
    }
}

/// Session state backed by a key-value store
pub struct AuthSession<S: KeyValueStore> {
    store: S,
    user: Option<User>,
}

impl<S: KeyValueStore> AuthSession<S> {
    /// Restore the saved user, if any
    ///
    /// Unreadable storage or a corrupt record leaves the session signed out.
    pub fn restore(store: S) -> Self {
        let user = match store.read(USER_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<User>(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "ignoring corrupt saved user");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to load saved user");
                None
            }
        };
        Self { store, user }
    }

    /// Sign in and persist the user
    ///
    /// The password is not checked. The session only changes once the user has
    /// been written.
    pub fn sign_in(
        &mut self,
        email: &str,
        _password: &str,
        name: Option<&str>,
        role: Option<Role>,
    ) -> Result<&User, SetuError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SetuError::ParseError("email must not be empty".to_string()));
        }

        let user = User::new(email, name, role.unwrap_or_default());
        self.store.write(USER_KEY, &serde_json::to_string(&user)?)?;
        info!(role = %user.role, "signed in");
        Ok(self.user.insert(user))
    }

    /// Sign out and forget the saved user
    ///
    /// If the record cannot be removed the session stays signed in.
    pub fn sign_out(&mut self) -> Result<(), SetuError> {
        self.store.remove(USER_KEY)?;
        if self.user.take().is_some() {
            info!("signed out");
        }
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
