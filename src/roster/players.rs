//! Player Store: the ordered player sequence and its edits.

use serde_json::{Value, json};

use crate::roster::clock::{Clock, fresh_id};
use crate::roster::error::{Result, RosterError};
use crate::roster::model::{PageId, Player, PlayerId, PlayerSnapshot};
use crate::roster::ordering;
use crate::roster::pages::PageStore;
use crate::roster::schema::{normalize_players, parse_id};
use crate::roster::storage::{RosterStorage, StorageKey, load_json_array, load_raw, save_json};

pub struct PlayerStore<'a, S: RosterStorage> {
    storage: &'a S,
    clock: &'a dyn Clock,
}

impl<'a, S: RosterStorage> PlayerStore<'a, S> {
    pub fn new(storage: &'a S, clock: &'a dyn Clock) -> Self {
        Self { storage, clock }
    }

    fn pages(&self) -> PageStore<'a, S> {
        PageStore::new(self.storage, self.clock)
    }

    /// Every player in stored order, repaired and re-persisted if needed.
    pub fn list(&self) -> Result<Vec<Player>> {
        let pages = self.pages().ensure_pages_exist()?;
        let raw = load_json_array(self.storage, StorageKey::Players)?;
        let normalized = normalize_players(&raw, &pages);
        if normalized.changed {
            self.save(&normalized.records)?;
        }
        Ok(normalized.records)
    }

    /// Players of one page, in global order.
    pub fn list_page(&self, page: PageId) -> Result<Vec<Player>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| p.page_id == page)
            .collect())
    }

    pub fn find(&self, id: PlayerId) -> Result<Option<Player>> {
        Ok(self.list()?.into_iter().find(|p| p.id == id))
    }

    pub fn save(&self, players: &[Player]) -> Result<()> {
        save_json(self.storage, StorageKey::Players, players)
    }

    /// Remove the record with `id`. Returns whether one was removed.
    pub fn delete_by_id(&self, id: PlayerId) -> Result<bool> {
        let mut players = self.list()?;
        let Some(idx) = players.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        players.remove(idx);
        self.save(&players)?;
        log::debug!("deleted player {id}");
        Ok(true)
    }

    /// Insert a new player on the current page, or replace an existing one
    /// in place (keeping its position and page).
    pub fn upsert(&self, mut snapshot: PlayerSnapshot) -> Result<Player> {
        snapshot.name = snapshot.name.trim().to_string();
        if snapshot.name.is_empty() {
            return Err(RosterError::EmptyName);
        }

        let mut players = self.list()?;
        let player = match snapshot.id {
            Some(id) => {
                let slot = players
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or(RosterError::PlayerNotFound(id))?;
                let page_id = slot.page_id;
                *slot = snapshot.into_player(id, page_id);
                slot.clone()
            }
            None => {
                let id = PlayerId(fresh_id(self.clock, players.iter().map(|p| p.id.0)));
                let page_id = self.pages().current_page_id()?;
                let player = snapshot.into_player(id, page_id);
                players.push(player.clone());
                player
            }
        };
        self.save(&players)?;
        log::debug!("saved player {} ({})", player.id, player.name);
        Ok(player)
    }

    /// Move every player on `from` to `to`. Returns how many moved.
    pub fn reassign_page(&self, from: PageId, to: PageId) -> Result<usize> {
        let mut raw = load_json_array(self.storage, StorageKey::Players)?;
        let mut moved = 0;
        for value in &mut raw {
            if value.get("pageId").and_then(parse_id) != Some(from.0) {
                continue;
            }
            if let Some(obj) = value.as_object_mut() {
                obj.insert("pageId".to_string(), json!(to.0));
                moved += 1;
            }
        }

        let pages = self.pages().load()?;
        let normalized = normalize_players(&raw, &pages);
        if moved > 0 || normalized.changed {
            self.save(&normalized.records)?;
        }
        Ok(moved)
    }

    /// Drop `source` before or after `target`. Both must share a page.
    ///
    /// Returns `false` (and persists nothing) for equal, unknown, or
    /// cross-page ids.
    pub fn reorder_within_page(
        &self,
        source: PlayerId,
        target: PlayerId,
        insert_after: bool,
    ) -> Result<bool> {
        if source == target {
            return Ok(false);
        }
        let mut players = self.list()?;
        let (Some(s), Some(t)) = (
            players.iter().position(|p| p.id == source),
            players.iter().position(|p| p.id == target),
        ) else {
            return Ok(false);
        };
        if players[s].page_id != players[t].page_id {
            log::debug!("ignoring cross-page reorder {source} -> {target}");
            return Ok(false);
        }
        ordering::reorder(&mut players, s, t, insert_after);
        self.save(&players)?;
        Ok(true)
    }

    /// Move `source` just after the last other player on `page`.
    pub fn move_to_end(&self, source: PlayerId, page: PageId) -> Result<bool> {
        let mut players = self.list()?;
        let Some(s) = players.iter().position(|p| p.id == source) else {
            return Ok(false);
        };
        ordering::move_after_last(&mut players, s, |p| p.page_id == page);
        self.save(&players)?;
        Ok(true)
    }

    /// Write the sample roster if the players key was never written.
    pub fn seed_if_unset(&self) -> Result<bool> {
        if load_raw(self.storage, StorageKey::Players)?.is_some() {
            return Ok(false);
        }
        save_json(self.storage, StorageKey::Players, &sample_players(self.clock))?;
        log::info!("seeded sample players");
        Ok(true)
    }
}

/// Two demo players with no page; normalization assigns the first page.
fn sample_players(clock: &dyn Clock) -> Value {
    let now = clock.now_millis();
    let trained = json!({"GP": 241, "TP": 234, "Kick": 122, "Body": 122, "Control": 1,
                         "Guard": 127, "Speed": 118, "Stamina": 1, "Guts": 51});
    json!([
        {
            "id": now,
            "name": "Endo",
            "position": "FW",
            "gender": "男",
            "attribute": "Mountain",
            "pageId": null,
            "icon": "",
            "baseStats": {"GP": 191, "TP": 184, "Kick": 72, "Body": 72, "Control": 70,
                          "Guard": 77, "Speed": 68, "Stamina": 69, "Guts": 79, "Free": 35},
            "trainedStats": trained,
            "skills": ["God Hand", "Majin The Hand", "Justice Fist", "The Earth"],
            "extraSkills": ["Super Move", "Body Shield"],
            "memo": "FW build.\nSpeed boost planned.",
            "images": []
        },
        {
            "id": now.saturating_add(1),
            "name": "Goenji",
            "position": "FW",
            "gender": "男",
            "attribute": "Fire",
            "pageId": null,
            "icon": "",
            "baseStats": {"GP": 200, "TP": 176, "Kick": 79, "Body": 66, "Control": 76,
                          "Guard": 64, "Speed": 72, "Stamina": 68, "Guts": 60, "Free": 20},
            "trainedStats": trained,
            "skills": ["Fire Tornado", "Heat Tackle", "Inazuma Drop", "Bakunetsu Storm"],
            "extraSkills": ["Super Move", "Mad Express"],
            "memo": "Body boost planned.",
            "images": []
        }
    ])
}
