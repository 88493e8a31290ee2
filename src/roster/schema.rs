//! Schema Normalizer: the single upgrade path from raw persisted JSON to
//! typed records.
//!
//! Stored data may predate the current shape: missing fields, a legacy single
//! `stats` object instead of `baseStats`, short or long skill arrays, ids
//! saved as strings. Everything funnels through [`migrate_player`] /
//! [`normalize_pages`], which return fully-populated values plus a flag telling
//! the caller whether the repaired form differs from what was stored.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::roster::config::{EXTRA_SKILL_SLOTS, SKILL_SLOTS};
use crate::roster::model::{Gender, Page, PageId, Player, PlayerId, StatBlock};
use crate::roster::stats::Stat;

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    /// True when `records` serialize differently from the raw input.
    pub changed: bool,
}

// ── Lenient scalar parsing ─────────────────────────────────────────

/// Integer prefix parse: optional sign then digits, anything after ignored.
/// No digits at all yields 0.
pub fn parse_int_str(input: &str) -> i64 {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative { -value } else { value }
}

/// Any JSON value as a stat integer; non-numeric input is 0.
pub fn parse_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_int_str(s),
        _ => 0,
    }
}

/// Ids are stored as numbers but older writers sometimes used strings.
pub fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Truncate or pad to exactly `N` slots; non-string slots become empty.
fn slots<const N: usize>(value: Option<&Value>) -> [String; N] {
    let items = value.and_then(Value::as_array);
    std::array::from_fn(|i| {
        items
            .and_then(|arr| arr.get(i))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    })
}

/// Build a stat block from a JSON object, zero-filling missing fields.
pub fn stat_block_from_json(value: &Value, with_free: bool) -> StatBlock {
    let mut block = if with_free {
        StatBlock::base()
    } else {
        StatBlock::trained()
    };
    let rows: &[Stat] = if with_free {
        &Stat::BASE_ROWS
    } else {
        &Stat::TRAINED_ROWS
    };
    for &stat in rows {
        let v = value.get(stat.key()).map(parse_int).unwrap_or(0);
        block.set(stat, v);
    }
    block
}

fn as_object(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| v.is_object())
}

// ── Players ────────────────────────────────────────────────────────

/// Upgrade one raw player object to the current schema.
///
/// `id` has already been resolved by the caller; `pages` is the live page
/// list used to repair missing or dangling page references.
pub fn migrate_player(raw: &Map<String, Value>, id: PlayerId, pages: &[Page]) -> Player {
    let fallback_page = pages.first().map(|p| p.id);
    let page_id = raw
        .get("pageId")
        .and_then(parse_id)
        .map(PageId)
        .filter(|pid| pages.is_empty() || pages.iter().any(|p| p.id == *pid))
        .or(fallback_page)
        .unwrap_or(PageId(0));

    let base_stats = match (as_object(raw.get("baseStats")), as_object(raw.get("stats"))) {
        (Some(base), _) => stat_block_from_json(base, true),
        (None, Some(legacy)) => stat_block_from_json(legacy, true),
        (None, None) => StatBlock::base(),
    };
    let trained_stats = as_object(raw.get("trainedStats"))
        .map(|t| stat_block_from_json(t, false))
        .unwrap_or_else(StatBlock::trained);

    let images = raw
        .get("images")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Player {
        id,
        name: string_field(raw, "name"),
        position: string_field(raw, "position"),
        gender: Gender::parse(&string_field(raw, "gender")),
        attribute: string_field(raw, "attribute"),
        page_id,
        icon: string_field(raw, "icon"),
        base_stats,
        trained_stats,
        skills: slots::<SKILL_SLOTS>(raw.get("skills")),
        extra_skills: slots::<EXTRA_SKILL_SLOTS>(raw.get("extraSkills")),
        memo: string_field(raw, "memo"),
        images,
    }
}

fn differs<T: Serialize>(record: &T, raw: &Value) -> bool {
    serde_json::to_value(record)
        .map(|v| v != *raw)
        .unwrap_or(true)
}

/// Normalize a whole stored player sequence, preserving order.
///
/// Non-object entries are dropped. Entries with a missing or duplicate id get
/// a fresh one above every id in the sequence.
pub fn normalize_players(raw: &[Value], pages: &[Page]) -> Normalized<Player> {
    let mut next_id = raw
        .iter()
        .filter_map(|v| v.get("id").and_then(parse_id))
        .max()
        .map_or(1, |m| m.saturating_add(1));
    let mut seen = HashSet::new();
    let mut changed = false;
    let mut records = Vec::with_capacity(raw.len());

    for value in raw {
        let Some(obj) = value.as_object() else {
            log::warn!("dropping non-object player record");
            changed = true;
            continue;
        };
        let id = match obj.get("id").and_then(parse_id) {
            Some(id) if seen.insert(id) => id,
            _ => {
                let id = next_id;
                next_id = next_id.saturating_add(1);
                seen.insert(id);
                id
            }
        };
        let player = migrate_player(obj, PlayerId(id), pages);
        if differs(&player, value) {
            changed = true;
        }
        records.push(player);
    }

    if changed {
        log::debug!("player records repaired during normalization");
    }
    Normalized { records, changed }
}

// ── Pages ──────────────────────────────────────────────────────────

pub fn normalize_pages(raw: &[Value]) -> Normalized<Page> {
    let mut seen = HashSet::new();
    let mut changed = false;
    let mut records = Vec::with_capacity(raw.len());

    for value in raw {
        let id = value.get("id").and_then(parse_id);
        let Some(id) = id.filter(|id| seen.insert(*id)) else {
            log::warn!("dropping page record without a usable id");
            changed = true;
            continue;
        };
        let name = match value.get("name") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("Page {}", records.len() + 1),
        };
        let page = Page {
            id: PageId(id),
            name,
        };
        if differs(&page, value) {
            changed = true;
        }
        records.push(page);
    }

    Normalized { records, changed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pages() -> Vec<Page> {
        vec![
            Page {
                id: PageId(100),
                name: "Main".into(),
            },
            Page {
                id: PageId(200),
                name: "Bench".into(),
            },
        ]
    }

    fn to_values(players: &[Player]) -> Vec<Value> {
        players
            .iter()
            .map(|p| serde_json::to_value(p).unwrap())
            .collect()
    }

    #[test]
    fn parse_int_str_follows_prefix_rules() {
        assert_eq!(parse_int_str("42"), 42);
        assert_eq!(parse_int_str("  -7px"), -7);
        assert_eq!(parse_int_str("+3"), 3);
        assert_eq!(parse_int_str("3.9"), 3);
        assert_eq!(parse_int_str("abc"), 0);
        assert_eq!(parse_int_str(""), 0);
        assert_eq!(parse_int_str("99999999999999999999999"), i64::MAX);
    }

    #[test]
    fn parse_int_handles_json_kinds() {
        assert_eq!(parse_int(&json!(5)), 5);
        assert_eq!(parse_int(&json!(5.8)), 5);
        assert_eq!(parse_int(&json!("12")), 12);
        assert_eq!(parse_int(&json!(null)), 0);
        assert_eq!(parse_int(&json!(true)), 0);
        assert_eq!(parse_int(&json!([1])), 0);
    }

    #[test]
    fn parse_id_accepts_numeric_strings() {
        assert_eq!(parse_id(&json!(17)), Some(17));
        assert_eq!(parse_id(&json!("17")), Some(17));
        assert_eq!(parse_id(&json!(1.5)), None);
        assert_eq!(parse_id(&json!(null)), None);
    }

    #[test]
    fn empty_record_is_fully_populated() {
        let out = normalize_players(&[json!({"id": 1})], &pages());
        assert!(out.changed);
        let p = &out.records[0];
        assert_eq!(p.page_id, PageId(100));
        assert_eq!(p.gender, Gender::Unspecified);
        assert_eq!(p.base_stats, StatBlock::base());
        assert_eq!(p.trained_stats, StatBlock::trained());
        assert_eq!(p.skills, ["", "", "", ""]);
        assert_eq!(p.extra_skills, ["", ""]);
        assert!(p.images.is_empty());
    }

    #[test]
    fn non_string_fields_coerced() {
        let raw = json!({"id": 1, "gender": 3, "attribute": null, "icon": false,
                          "position": [], "memo": {}, "images": "nope"});
        let p = &normalize_players(&[raw], &pages()).records[0];
        assert_eq!(p.gender, Gender::Unspecified);
        assert_eq!(p.attribute, "");
        assert_eq!(p.icon, "");
        assert_eq!(p.position, "");
        assert_eq!(p.memo, "");
        assert!(p.images.is_empty());
    }

    #[test]
    fn skill_arrays_always_fixed_length() {
        let inputs = [
            json!({"id": 1, "skills": [], "extraSkills": []}),
            json!({"id": 2, "skills": ["a"], "extraSkills": ["x"]}),
            json!({"id": 3, "skills": ["a","b","c","d","e","f"], "extraSkills": ["x","y","z","w","v","u"]}),
            json!({"id": 4}),
        ];
        let out = normalize_players(&inputs, &pages());
        for p in &out.records {
            assert_eq!(p.skills.len(), 4);
            assert_eq!(p.extra_skills.len(), 2);
        }
        assert_eq!(out.records[1].skills, ["a", "", "", ""]);
        assert_eq!(out.records[2].skills, ["a", "b", "c", "d"]);
        assert_eq!(out.records[2].extra_skills, ["x", "y"]);
    }

    #[test]
    fn legacy_stats_become_base_stats() {
        let raw = json!({"id": 1, "stats": {"GP": 150, "Kick": "60", "Free": 9}});
        let p = &normalize_players(&[raw], &pages()).records[0];
        assert_eq!(p.base_stats.gp, 150);
        assert_eq!(p.base_stats.kick, 60);
        assert_eq!(p.base_stats.free, Some(9));
        assert_eq!(p.trained_stats, StatBlock::trained());
    }

    #[test]
    fn base_stats_win_over_legacy_stats() {
        let raw = json!({"id": 1, "baseStats": {"GP": 1}, "stats": {"GP": 2}});
        let p = &normalize_players(&[raw], &pages()).records[0];
        assert_eq!(p.base_stats.gp, 1);
    }

    #[test]
    fn dangling_and_string_page_ids() {
        let raw = [
            json!({"id": 1, "pageId": "200"}),
            json!({"id": 2, "pageId": 999}),
            json!({"id": 3, "pageId": null}),
        ];
        let out = normalize_players(&raw, &pages());
        assert_eq!(out.records[0].page_id, PageId(200));
        assert_eq!(out.records[1].page_id, PageId(100));
        assert_eq!(out.records[2].page_id, PageId(100));
    }

    #[test]
    fn missing_and_duplicate_ids_get_fresh_ones() {
        let raw = [json!({"id": 5}), json!({"name": "no id"}), json!({"id": 5})];
        let out = normalize_players(&raw, &pages());
        let ids: Vec<i64> = out.records.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }

    #[test]
    fn non_objects_dropped() {
        let raw = [json!(null), json!(3), json!({"id": 1})];
        let out = normalize_players(&raw, &pages());
        assert_eq!(out.records.len(), 1);
        assert!(out.changed);
    }

    #[test]
    fn normalization_is_idempotent() {
        let malformed = [
            json!({"id": "9", "name": "A", "skills": ["x"], "stats": {"Kick": "3"}}),
            json!({"id": 10, "gender": "男", "extraSkills": ["a","b","c"], "trainedStats": {"Free": 4}}),
            json!({"name": "B", "pageId": 200, "images": ["data:,", 1]}),
            json!("junk"),
        ];
        let first = normalize_players(&malformed, &pages());
        assert!(first.changed);

        let again = normalize_players(&to_values(&first.records), &pages());
        assert!(!again.changed);
        assert_eq!(again.records, first.records);
    }

    #[test]
    fn clean_data_reports_no_change() {
        let raw = json!({
            "id": 1, "name": "Endo", "position": "GK", "gender": "男", "attribute": "Mountain",
            "pageId": 100, "icon": "",
            "baseStats": {"GP":1,"TP":2,"Kick":3,"Body":4,"Control":5,"Guard":6,"Speed":7,"Stamina":8,"Guts":9,"Free":10},
            "trainedStats": {"GP":1,"TP":2,"Kick":3,"Body":4,"Control":5,"Guard":6,"Speed":7,"Stamina":8,"Guts":9},
            "skills": ["a","b","c","d"], "extraSkills": ["e","f"], "memo": "line1\nline2", "images": []
        });
        let out = normalize_players(&[raw], &pages());
        assert!(!out.changed);
        assert_eq!(out.records[0].memo, "line1\nline2");
    }

    #[test]
    fn pages_normalized() {
        let raw = [
            json!({"id": 1, "name": "One"}),
            json!({"id": "2", "name": 7}),
            json!({"id": 1, "name": "dup"}),
            json!({"name": "no id"}),
            json!({"id": 3}),
        ];
        let out = normalize_pages(&raw);
        assert!(out.changed);
        let names: Vec<&str> = out.records.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["One", "7", "Page 3"]);
        assert_eq!(out.records[1].id, PageId(2));

        let values: Vec<Value> = out
            .records
            .iter()
            .map(|p| serde_json::to_value(p).unwrap())
            .collect();
        assert!(!normalize_pages(&values).changed);
    }
}
