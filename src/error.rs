use axum::http::StatusCode;
use thiserror::Error;

use crate::session_state::Page;

#[derive(Debug, Error)]
pub enum PortalError {
    /// The workbook, a sheet or a column is missing or unreadable. Fatal at startup.
    #[error("cannot load {path}: {reason}")]
    DataLoad { path: String, reason: String },

    #[error("Registration could not be saved: {0}")]
    Persist(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("`{action}` is not available on the {page} page")]
    UnexpectedAction { page: Page, action: &'static str },

    /// A logged-in id with no profile behind it. Normal navigation never gets here.
    #[error("no profile for logged-in user {0}")]
    MissingProfile(String),
}

impl PortalError {
    pub fn data_load(path: impl Into<String>, reason: impl ToString) -> Self {
        PortalError::DataLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors the page shows next to the form instead of failing the request.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            PortalError::Persist(_) | PortalError::Validation(_) | PortalError::NotFound(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::UnexpectedAction { .. } => StatusCode::CONFLICT,
            PortalError::DataLoad { .. }
            | PortalError::Persist(_)
            | PortalError::MissingProfile(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PortalError> for (StatusCode, String) {
    fn from(e: PortalError) -> Self {
        (e.status_code(), e.to_string())
    }
}
