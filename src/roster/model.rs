//! Typed roster records.
//!
//! These are the fully-populated shapes every other module works with. Raw
//! persisted JSON only becomes a `Player`/`Page` by going through
//! [`crate::roster::schema`], so fixed-size skill slots and complete stat
//! blocks are guaranteed by construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::roster::config::{EXTRA_SKILL_SLOTS, SKILL_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PageId)
    }
}

impl FromStr for PlayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PlayerId)
    }
}

/// A named tab grouping players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
            Gender::Unspecified => "",
        }
    }

    /// Unknown values collapse to `Unspecified`.
    pub fn parse(s: &str) -> Self {
        match s {
            "男" => Gender::Male,
            "女" => Gender::Female,
            _ => Gender::Unspecified,
        }
    }
}

/// Stat values. Base blocks carry `Free`; trained blocks never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBlock {
    #[serde(rename = "GP")]
    pub gp: i64,
    #[serde(rename = "TP")]
    pub tp: i64,
    #[serde(rename = "Kick")]
    pub kick: i64,
    #[serde(rename = "Body")]
    pub body: i64,
    #[serde(rename = "Control")]
    pub control: i64,
    #[serde(rename = "Guard")]
    pub guard: i64,
    #[serde(rename = "Speed")]
    pub speed: i64,
    #[serde(rename = "Stamina")]
    pub stamina: i64,
    #[serde(rename = "Guts")]
    pub guts: i64,
    #[serde(rename = "Free", default, skip_serializing_if = "Option::is_none")]
    pub free: Option<i64>,
}

impl StatBlock {
    /// Zero-filled base block (with `Free`).
    pub fn base() -> Self {
        Self {
            free: Some(0),
            ..Self::default()
        }
    }

    /// Zero-filled trained block (no `Free`).
    pub fn trained() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    pub gender: Gender,
    pub attribute: String,
    pub page_id: PageId,
    pub icon: String,
    pub base_stats: StatBlock,
    pub trained_stats: StatBlock,
    pub skills: [String; SKILL_SLOTS],
    pub extra_skills: [String; EXTRA_SKILL_SLOTS],
    pub memo: String,
    pub images: Vec<String>,
}

/// Immutable copy of the edit form, passed to upsert and to the card renderer.
///
/// `id` is `None` for a player that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub id: Option<PlayerId>,
    pub name: String,
    pub position: String,
    pub gender: Gender,
    pub attribute: String,
    pub icon: String,
    pub base_stats: StatBlock,
    pub trained_stats: StatBlock,
    pub skills: [String; SKILL_SLOTS],
    pub extra_skills: [String; EXTRA_SKILL_SLOTS],
    pub memo: String,
    pub images: Vec<String>,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            position: String::new(),
            gender: Gender::Unspecified,
            attribute: String::new(),
            icon: String::new(),
            base_stats: StatBlock::base(),
            trained_stats: StatBlock::trained(),
            skills: Default::default(),
            extra_skills: Default::default(),
            memo: String::new(),
            images: Vec::new(),
        }
    }
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: Some(p.id),
            name: p.name.clone(),
            position: p.position.clone(),
            gender: p.gender,
            attribute: p.attribute.clone(),
            icon: p.icon.clone(),
            base_stats: p.base_stats,
            trained_stats: p.trained_stats,
            skills: p.skills.clone(),
            extra_skills: p.extra_skills.clone(),
            memo: p.memo.clone(),
            images: p.images.clone(),
        }
    }
}

impl PlayerSnapshot {
    /// Materialize as a stored player on `page_id`.
    pub fn into_player(self, id: PlayerId, page_id: PageId) -> Player {
        Player {
            id,
            name: self.name,
            position: self.position,
            gender: self.gender,
            attribute: self.attribute,
            page_id,
            icon: self.icon,
            base_stats: self.base_stats,
            trained_stats: self.trained_stats,
            skills: self.skills,
            extra_skills: self.extra_skills,
            memo: self.memo,
            images: self.images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trained_block_omits_free() {
        let json = serde_json::to_value(StatBlock::trained()).unwrap();
        assert!(json.get("Free").is_none());
        let json = serde_json::to_value(StatBlock::base()).unwrap();
        assert_eq!(json["Free"], 0);
    }

    #[test]
    fn gender_serializes_to_stored_labels() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"男\"");
        assert_eq!(serde_json::to_string(&Gender::Unspecified).unwrap(), "\"\"");
        assert_eq!(Gender::parse("女"), Gender::Female);
        assert_eq!(Gender::parse("x"), Gender::Unspecified);
    }

    #[test]
    fn player_uses_camel_case_keys() {
        let player = PlayerSnapshot {
            name: "Endo".into(),
            ..Default::default()
        }
        .into_player(PlayerId(1), PageId(2));
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["pageId"], 2);
        assert!(json["baseStats"].is_object());
        assert_eq!(json["extraSkills"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn ids_parse_from_route_params() {
        assert_eq!(" 17 ".parse::<PageId>().unwrap(), PageId(17));
        assert!("abc".parse::<PlayerId>().is_err());
    }
}
