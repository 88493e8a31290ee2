//! Stat Aggregator: display totals and category sums.

use crate::roster::model::StatBlock;

/// One stat row, in the fixed order tables are drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Gp,
    Tp,
    Kick,
    Body,
    Control,
    Guard,
    Speed,
    Stamina,
    Guts,
    Free,
}

/// Colour identity of a stat row; follows the category buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Kick, Control (category A).
    Technique,
    /// Body, Guard, Guts (category B).
    Physique,
    /// Speed, Stamina (category C).
    Mobility,
    Neutral,
}

impl Stat {
    pub const BASE_ROWS: [Stat; 10] = [
        Stat::Gp,
        Stat::Tp,
        Stat::Kick,
        Stat::Body,
        Stat::Control,
        Stat::Guard,
        Stat::Speed,
        Stat::Stamina,
        Stat::Guts,
        Stat::Free,
    ];

    pub const TRAINED_ROWS: [Stat; 9] = [
        Stat::Gp,
        Stat::Tp,
        Stat::Kick,
        Stat::Body,
        Stat::Control,
        Stat::Guard,
        Stat::Speed,
        Stat::Stamina,
        Stat::Guts,
    ];

    /// Stats that count toward the display total (GP/TP excluded).
    const TOTALLED: [Stat; 7] = [
        Stat::Kick,
        Stat::Body,
        Stat::Control,
        Stat::Guard,
        Stat::Speed,
        Stat::Stamina,
        Stat::Guts,
    ];

    /// Key used in persisted JSON.
    pub fn key(self) -> &'static str {
        match self {
            Stat::Gp => "GP",
            Stat::Tp => "TP",
            Stat::Kick => "Kick",
            Stat::Body => "Body",
            Stat::Control => "Control",
            Stat::Guard => "Guard",
            Stat::Speed => "Speed",
            Stat::Stamina => "Stamina",
            Stat::Guts => "Guts",
            Stat::Free => "Free",
        }
    }

    /// Lower-case slug used in form field names (`base_kick`, `trained_gp`).
    pub fn slug(self) -> &'static str {
        match self {
            Stat::Gp => "gp",
            Stat::Tp => "tp",
            Stat::Kick => "kick",
            Stat::Body => "body",
            Stat::Control => "control",
            Stat::Guard => "guard",
            Stat::Speed => "speed",
            Stat::Stamina => "stamina",
            Stat::Guts => "guts",
            Stat::Free => "free",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Stat::Kick | Stat::Control => Tone::Technique,
            Stat::Body | Stat::Guard | Stat::Guts => Tone::Physique,
            Stat::Speed | Stat::Stamina => Tone::Mobility,
            Stat::Gp | Stat::Tp | Stat::Free => Tone::Neutral,
        }
    }
}

impl StatBlock {
    /// `None` only for `Free` on a trained block.
    pub fn get(&self, stat: Stat) -> Option<i64> {
        match stat {
            Stat::Gp => Some(self.gp),
            Stat::Tp => Some(self.tp),
            Stat::Kick => Some(self.kick),
            Stat::Body => Some(self.body),
            Stat::Control => Some(self.control),
            Stat::Guard => Some(self.guard),
            Stat::Speed => Some(self.speed),
            Stat::Stamina => Some(self.stamina),
            Stat::Guts => Some(self.guts),
            Stat::Free => self.free,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i64) {
        match stat {
            Stat::Gp => self.gp = value,
            Stat::Tp => self.tp = value,
            Stat::Kick => self.kick = value,
            Stat::Body => self.body = value,
            Stat::Control => self.control = value,
            Stat::Guard => self.guard = value,
            Stat::Speed => self.speed = value,
            Stat::Stamina => self.stamina = value,
            Stat::Guts => self.guts = value,
            Stat::Free => self.free = Some(value),
        }
    }
}

/// Sum of the seven field stats, plus `Free` when asked for and present.
pub fn display_total(stats: &StatBlock, include_free: bool) -> i64 {
    let core = Stat::TOTALLED
        .iter()
        .filter_map(|&s| stats.get(s))
        .fold(0i64, i64::saturating_add);
    match (include_free, stats.free) {
        (true, Some(free)) => core.saturating_add(free),
        _ => core,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryTotals {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

/// Fixed buckets: A = Kick+Control, B = Body+Guard+Guts, C = Speed+Stamina.
pub fn category_totals(trained: &StatBlock) -> CategoryTotals {
    CategoryTotals {
        a: trained.kick.saturating_add(trained.control),
        b: trained
            .body
            .saturating_add(trained.guard)
            .saturating_add(trained.guts),
        c: trained.speed.saturating_add(trained.stamina),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::schema::stat_block_from_json;
    use serde_json::json;

    #[test]
    fn display_total_with_and_without_free() {
        let stats = stat_block_from_json(
            &json!({"Kick":1,"Body":2,"Control":3,"Guard":4,"Speed":5,"Stamina":6,"Guts":7,"Free":8}),
            true,
        );
        assert_eq!(display_total(&stats, true), 36);
        assert_eq!(display_total(&stats, false), 28);
    }

    #[test]
    fn display_total_ignores_gp_tp() {
        let mut stats = StatBlock::base();
        stats.gp = 200;
        stats.tp = 180;
        stats.kick = 5;
        assert_eq!(display_total(&stats, true), 5);
    }

    #[test]
    fn trained_total_never_counts_free() {
        let stats = stat_block_from_json(&json!({"Kick": 10, "Free": 99}), false);
        assert_eq!(stats.free, None);
        assert_eq!(display_total(&stats, true), 10);
    }

    #[test]
    fn non_numeric_fields_count_as_zero() {
        let stats = stat_block_from_json(
            &json!({"Kick": "12", "Body": "abc", "Control": null, "Guard": 3.9}),
            true,
        );
        assert_eq!(display_total(&stats, false), 15);
    }

    #[test]
    fn category_sums() {
        let trained = stat_block_from_json(
            &json!({"Kick":1,"Control":2,"Body":3,"Guard":4,"Guts":5,"Speed":6,"Stamina":7}),
            false,
        );
        assert_eq!(category_totals(&trained), CategoryTotals { a: 3, b: 12, c: 13 });
    }

    #[test]
    fn totals_saturate() {
        let mut stats = StatBlock::trained();
        stats.kick = i64::MAX;
        stats.body = 1;
        assert_eq!(display_total(&stats, false), i64::MAX);
    }

    #[test]
    fn tones_follow_categories() {
        assert_eq!(Stat::Kick.tone(), Tone::Technique);
        assert_eq!(Stat::Guts.tone(), Tone::Physique);
        assert_eq!(Stat::Stamina.tone(), Tone::Mobility);
        assert_eq!(Stat::Gp.tone(), Tone::Neutral);
    }

    #[test]
    fn row_orders_are_fixed() {
        assert_eq!(Stat::BASE_ROWS.len(), 10);
        assert_eq!(Stat::TRAINED_ROWS.len(), 9);
        assert_eq!(Stat::BASE_ROWS[9], Stat::Free);
        assert!(!Stat::TRAINED_ROWS.contains(&Stat::Free));
    }
}
