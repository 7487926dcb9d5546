//! Fetch failures, classified by kind instead of by message text.

use std::fmt;

/// Why a backend call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Missing, expired or rejected credentials
    Unauthorized,
    /// Signed in but not enrolled in the course
    NotEnrolled,
    /// Resource does not exist
    NotFound,
    /// Anything else, including transport failures
    Unknown,
}

impl FetchErrorKind {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => FetchErrorKind::Unauthorized,
            403 => FetchErrorKind::NotEnrolled,
            404 => FetchErrorKind::NotFound,
            _ => FetchErrorKind::Unknown,
        }
    }

    /// Screen the user should be sent to, if any.
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            FetchErrorKind::Unauthorized => Some(Redirect::SignIn),
            FetchErrorKind::NotEnrolled => Some(Redirect::Enroll),
            FetchErrorKind::NotFound => Some(Redirect::Catalog),
            FetchErrorKind::Unknown => None,
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Unauthorized => write!(f, "unauthorized"),
            FetchErrorKind::NotEnrolled => write!(f, "not enrolled"),
            FetchErrorKind::NotFound => write!(f, "not found"),
            FetchErrorKind::Unknown => write!(f, "request failed"),
        }
    }
}

/// Where a failed screen routes the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// Sign-in flow
    SignIn,
    /// Course enrollment page
    Enroll,
    /// Course catalog
    Catalog,
}

/// A failed backend call.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    /// Classification
    pub kind: FetchErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Message from the error envelope or transport
    pub message: String,
}

impl FetchError {
    /// Error for a non-success response.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::from_status(status),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Credentials are missing; raised before any request is made.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Unauthorized,
            status: None,
            message: message.into(),
        }
    }

    /// Request did not produce a usable response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Unknown,
            status: None,
            message: message.into(),
        }
    }

    /// Shortcut for `self.kind.redirect()`.
    pub fn redirect(&self) -> Option<Redirect> {
        self.kind.redirect()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::from_status(status.as_u16(), e.to_string()),
            None => FetchError::transport(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification_and_routes() {
        assert_eq!(FetchErrorKind::from_status(401).redirect(), Some(Redirect::SignIn));
        assert_eq!(FetchErrorKind::from_status(403).redirect(), Some(Redirect::Enroll));
        assert_eq!(FetchErrorKind::from_status(404).redirect(), Some(Redirect::Catalog));
        assert_eq!(FetchErrorKind::from_status(500), FetchErrorKind::Unknown);
        assert_eq!(FetchErrorKind::from_status(500).redirect(), None);
    }

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = FetchError::from_status(403, "Enroll to access this course");
        assert_eq!(err.to_string(), "not enrolled: Enroll to access this course");
    }
}
