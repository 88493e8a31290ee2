//! Error type shared by the page and player stores.

use thiserror::Error;

use crate::roster::config::MAX_PAGES;
use crate::roster::model::{PageId, PlayerId};

pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Debug, Error)]
pub enum RosterError {
    /// Rejected before anything is persisted.
    #[error("Player name is required")]
    EmptyName,
    #[error("A roster can hold at most {MAX_PAGES} pages")]
    PageLimit,
    #[error("At least one page must remain")]
    LastPage,
    #[error("Page {0} not found")]
    PageNotFound(PageId),
    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RosterError {
    /// Capacity and validation failures are shown to the user; not-found
    /// failures are stale-id no-ops and stay quiet.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::EmptyName | Self::PageLimit | Self::LastPage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_errors_are_user_facing() {
        assert!(RosterError::PageLimit.is_user_facing());
        assert!(RosterError::LastPage.is_user_facing());
        assert!(RosterError::EmptyName.is_user_facing());
        assert!(!RosterError::PageNotFound(PageId(1)).is_user_facing());
    }

    #[test]
    fn page_limit_message_names_the_cap() {
        assert_eq!(
            RosterError::PageLimit.to_string(),
            "A roster can hold at most 10 pages"
        );
    }
}
