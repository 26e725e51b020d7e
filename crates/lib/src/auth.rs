use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PortalError, Result, Role};

/// One predefined login per role.
pub struct DemoAccount {
    pub role: Role,
    pub email: &'static str,
    pub password: &'static str,
}

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        role: Role::Normal,
        email: "user@fraportal.com",
        password: "user123",
    },
    DemoAccount {
        role: Role::Government,
        email: "gov@fraportal.com",
        password: "gov123",
    },
    DemoAccount {
        role: Role::MinistryTribal,
        email: "tribal@fraportal.com",
        password: "tribal123",
    },
    DemoAccount {
        role: Role::WelfareDept,
        email: "welfare@fraportal.com",
        password: "welfare123",
    },
    DemoAccount {
        role: Role::ForestRevenue,
        email: "forest@fraportal.com",
        password: "forest123",
    },
    DemoAccount {
        role: Role::PlanningDevelop,
        email: "planning@fraportal.com",
        password: "planning123",
    },
    DemoAccount {
        role: Role::Ngo,
        email: "ngo@fraportal.com",
        password: "ngo123",
    },
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: Option<Role>,
}

impl User {
    pub fn permissions(&self) -> &'static crate::RolePermissions {
        crate::permissions(self.role)
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Looks the credentials up in the demo account table.
pub fn authenticate(email: &str, password: &str) -> Result<User> {
    let account = DEMO_ACCOUNTS
        .iter()
        .find(|acc| acc.email == email && acc.password == password)
        .ok_or(PortalError::InvalidCredentials)?;

    debug!("Login successful for {} user", account.role);
    Ok(User {
        uid: format!("mock-{}-user-id", account.role),
        email: email.to_string(),
        display_name: local_part(email).to_string(),
        role: Some(account.role),
    })
}

/// Creates a new citizen account. New users always start as `normal`.
pub fn register(email: &str, password: &str, display_name: &str) -> Result<User> {
    let mut errors = crate::FieldErrors::new();
    let email = email.trim();
    if !email.contains('@') || local_part(email).is_empty() {
        errors.insert("email", "A valid email is required".to_string());
    } else if DEMO_ACCOUNTS.iter().any(|acc| acc.email == email) {
        errors.insert("email", "Email is already registered".to_string());
    }
    if password.chars().count() < 6 {
        errors.insert(
            "password",
            "Password must be at least 6 characters".to_string(),
        );
    }
    if display_name.trim().is_empty() {
        errors.insert("displayName", "Display name is required".to_string());
    }
    if !errors.is_empty() {
        return Err(PortalError::Validation(errors));
    }

    Ok(User {
        uid: format!("user-{}", Uuid::new_v4()),
        email: email.to_string(),
        display_name: display_name.trim().to_string(),
        role: Some(Role::Normal),
    })
}

/// Bearer-token sessions, kept in memory only.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, User>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, user: User) -> String {
        let token = Uuid::new_v4().simple().to_string();
        debug!("Opening session for {}", user.email);
        self.sessions.insert(token.clone(), user);
        token
    }

    pub fn get(&self, token: &str) -> Option<&User> {
        self.sessions.get(token)
    }

    pub fn set_role(&mut self, token: &str, role: Role) -> Result<&User> {
        let user = self
            .sessions
            .get_mut(token)
            .ok_or(PortalError::UnknownSession)?;
        user.role = Some(role);
        Ok(user)
    }

    /// Returns whether a session was actually closed.
    pub fn close(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
