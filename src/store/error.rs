use rusqlite::ErrorCode;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by the record store.
///
/// `NotFoundOrForbidden` deliberately covers both a missing record and a record
/// owned by another school, so other tenants' ids cannot be discovered.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("not found")]
    NotFoundOrForbidden,
    #[error("select a workspace first")]
    NoWorkspace,
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "bad_params",
            Self::Duplicate(_) => "duplicate",
            Self::NotFoundOrForbidden => "not_found",
            Self::NoWorkspace => "no_workspace",
            Self::Internal(_) => "internal",
        }
    }

    /// HTTP status a gateway should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Duplicate(_) => 409,
            Self::NotFoundOrForbidden => 404,
            Self::NoWorkspace => 503,
            Self::Internal(_) => 500,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.into())
    }
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == ErrorCode::ConstraintViolation
                && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
