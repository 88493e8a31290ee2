//! Page Store: named tabs with the current selection.

use crate::roster::clock::{Clock, fresh_id};
use crate::roster::config::{DEFAULT_PAGE_NAME, MAX_PAGES};
use crate::roster::error::{Result, RosterError};
use crate::roster::model::{Page, PageId};
use crate::roster::players::PlayerStore;
use crate::roster::schema::normalize_pages;
use crate::roster::storage::{
    RosterStorage, StorageKey, load_json_array, load_raw, save_json, save_raw,
};

/// Outcome of a successful [`PageStore::delete_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDeletion {
    pub removed: Page,
    /// First remaining page; receives the removed page's players.
    pub reassigned_to: PageId,
    pub moved_players: usize,
    /// Whether the selection had to move off the removed page.
    pub reselected: bool,
}

pub struct PageStore<'a, S: RosterStorage> {
    storage: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: RosterStorage> PageStore<'a, S> {
    pub fn new(storage: &'a S, clock: &'a dyn Clock) -> Self {
        Self { storage, clock }
    }

    /// Stored pages, normalized. May be empty; see [`Self::ensure_pages_exist`].
    pub fn load(&self) -> Result<Vec<Page>> {
        let raw = load_json_array(self.storage, StorageKey::Pages)?;
        let normalized = normalize_pages(&raw);
        if normalized.changed {
            self.save(&normalized.records)?;
        }
        Ok(normalized.records)
    }

    fn save(&self, pages: &[Page]) -> Result<()> {
        save_json(self.storage, StorageKey::Pages, pages)
    }

    fn stored_selection(&self) -> Result<Option<PageId>> {
        Ok(load_raw(self.storage, StorageKey::CurrentPage)?.and_then(|s| s.parse().ok()))
    }

    /// Guarantee at least one page and a valid selection.
    pub fn ensure_pages_exist(&self) -> Result<Vec<Page>> {
        let pages = self.load()?;
        let Some(first) = pages.first() else {
            let page = Page {
                id: PageId(fresh_id(self.clock, [])),
                name: DEFAULT_PAGE_NAME.to_string(),
            };
            self.save(std::slice::from_ref(&page))?;
            self.set_current_page_id(page.id)?;
            log::info!("created default page {}", page.id);
            return Ok(vec![page]);
        };

        let selected = self.stored_selection()?;
        if !selected.is_some_and(|id| pages.iter().any(|p| p.id == id)) {
            log::debug!("selection {selected:?} is stale; selecting page {}", first.id);
            self.set_current_page_id(first.id)?;
        }
        Ok(pages)
    }

    /// Record the selection without checking it exists.
    pub fn set_current_page_id(&self, id: PageId) -> Result<()> {
        save_raw(self.storage, StorageKey::CurrentPage, &id.to_string())
    }

    pub fn current_page_id(&self) -> Result<PageId> {
        let pages = self.ensure_pages_exist()?;
        match self.stored_selection()? {
            Some(id) => Ok(id),
            None => pages
                .first()
                .map(|p| p.id)
                .ok_or_else(|| RosterError::Storage("no pages after bootstrap".to_string())),
        }
    }

    /// Append and select a new page. A blank name gets `Page N`.
    ///
    /// Empty storage gets the default page first, so the new page is never
    /// the only one.
    pub fn create_page(&self, name: Option<&str>) -> Result<Page> {
        let mut pages = self.ensure_pages_exist()?;
        if pages.len() >= MAX_PAGES {
            return Err(RosterError::PageLimit);
        }
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Page {}", pages.len() + 1));
        let page = Page {
            id: PageId(fresh_id(self.clock, pages.iter().map(|p| p.id.0))),
            name,
        };
        pages.push(page.clone());
        self.save(&pages)?;
        self.set_current_page_id(page.id)?;
        log::debug!("created page {} ({})", page.id, page.name);
        Ok(page)
    }

    /// Rename in place. An empty name leaves the old one.
    pub fn rename_page(&self, id: PageId, new_name: &str) -> Result<Page> {
        let mut pages = self.load()?;
        let page = pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RosterError::PageNotFound(id))?;
        let trimmed = new_name.trim();
        if !trimmed.is_empty() {
            page.name = trimmed.to_string();
        }
        let renamed = page.clone();
        self.save(&pages)?;
        Ok(renamed)
    }

    /// Remove a page, moving its players to the first remaining page.
    pub fn delete_page(&self, id: PageId) -> Result<PageDeletion> {
        let mut pages = self.load()?;
        if pages.len() <= 1 {
            return Err(RosterError::LastPage);
        }
        let idx = pages
            .iter()
            .position(|p| p.id == id)
            .ok_or(RosterError::PageNotFound(id))?;

        let removed = pages.remove(idx);
        self.save(&pages)?;

        let target = pages[0].id;
        let moved_players = PlayerStore::new(self.storage, self.clock).reassign_page(id, target)?;

        let reselected = self.stored_selection()? == Some(id);
        if reselected {
            self.set_current_page_id(target)?;
        }
        log::debug!("deleted page {id}; {moved_players} player(s) moved to {target}");
        Ok(PageDeletion {
            removed,
            reassigned_to: target,
            moved_players,
            reselected,
        })
    }
}
