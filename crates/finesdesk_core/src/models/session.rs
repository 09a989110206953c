//! Authenticated session context handed to page constructors.
//!
//! The server issues the session; the client only reads it. Pages take a
//! `&Session` explicitly and check the role they need up front.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Secretary,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Secretary => "secretary",
            Self::Student => "student",
        }
    }

    /// Whether this role may open `page`.
    pub fn can_view(self, page: Page) -> bool {
        match self {
            Self::Admin => page != Page::MyRecords,
            Self::Secretary => matches!(
                page,
                Page::Students | Page::Events | Page::Fines | Page::Absences | Page::Dashboard
            ),
            Self::Student => page == Page::MyRecords,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "secretary" => Ok(Self::Secretary),
            "student" => Ok(Self::Student),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Role-scoped pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Students,
    Admins,
    Secretaries,
    Events,
    Fines,
    Absences,
    Dashboard,
    /// A student's own fines and absences.
    MyRecords,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Self::Students => "Students",
            Self::Admins => "Admins",
            Self::Secretaries => "Secretaries",
            Self::Events => "Events",
            Self::Fines => "Fines",
            Self::Absences => "Absences",
            Self::Dashboard => "Dashboard",
            Self::MyRecords => "My Records",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    /// Set for student accounts; scopes the student's own records.
    #[serde(default)]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
}

impl Session {
    pub fn new(user: SessionUser) -> Self {
        Self { user }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Check that this session may open `page`.
    ///
    /// # Errors
    /// Returns [`AppError::Forbidden`] when the role is not allowed, or when a
    /// student session has no student id to scope by.
    pub fn require(&self, page: Page) -> Result<(), AppError> {
        if !self.user.role.can_view(page) {
            return Err(AppError::Forbidden(format!(
                "{} accounts cannot open {}",
                self.user.role,
                page.title()
            )));
        }
        if page == Page::MyRecords && self.student_id().is_none() {
            return Err(AppError::Forbidden(
                "Student session is missing a student id".to_string(),
            ));
        }
        Ok(())
    }

    /// Student id for student sessions, trimmed; `None` when blank.
    pub fn student_id(&self) -> Option<&str> {
        self.user
            .student_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role, student_id: Option<&str>) -> Session {
        Session::new(SessionUser {
            id: 1,
            name: "Test".to_string(),
            email: None,
            role,
            student_id: student_id.map(str::to_string),
        })
    }

    #[test]
    fn secretary_cannot_manage_accounts() {
        let secretary = session(Role::Secretary, None);
        assert!(secretary.require(Page::Fines).is_ok());
        assert!(matches!(
            secretary.require(Page::Admins),
            Err(AppError::Forbidden(_))
        ));
        assert!(secretary.require(Page::Secretaries).is_err());
    }

    #[test]
    fn student_page_needs_student_id() {
        assert!(session(Role::Student, Some("2024-0001"))
            .require(Page::MyRecords)
            .is_ok());
        assert!(session(Role::Student, Some("  "))
            .require(Page::MyRecords)
            .is_err());
        assert!(session(Role::Admin, None).require(Page::MyRecords).is_err());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(" Admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("janitor".parse::<Role>().is_err());
    }
}
