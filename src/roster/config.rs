//! Fixed roster limits and persistence key names.

/// Players sequence, JSON array.
pub const PLAYERS_KEY: &str = "players_v2";
/// Pages sequence, JSON array.
pub const PAGES_KEY: &str = "pages_v2";
/// Selected page id, stored as a bare decimal string.
pub const CURRENT_PAGE_KEY: &str = "current_page_v2";

pub const MAX_PAGES: usize = 10;
pub const SKILL_SLOTS: usize = 4;
pub const EXTRA_SKILL_SLOTS: usize = 2;
pub const DEFAULT_PAGE_NAME: &str = "Page 1";
