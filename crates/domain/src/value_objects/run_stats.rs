//! Per-run player stats and the effect of taking a choice

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::Choice;

const STAT_FLOOR: f64 = 0.0;
const STAT_CEILING: f64 = 100.0;

/// The stats a player carries through a single life run.
///
/// `hp`, `mood`, `finance`, `social`, `relationship` and `energy` are kept in
/// `[0, 100]`. `knowledge` and `age` are unbounded but stay finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStats {
    pub hp: f64,
    pub mood: f64,
    pub finance: f64,
    pub social: f64,
    pub relationship: f64,
    pub energy: f64,
    pub knowledge: f64,
    pub age: f64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            hp: 100.0,
            mood: 50.0,
            finance: 50.0,
            social: 50.0,
            relationship: 50.0,
            energy: 100.0,
            knowledge: 0.0,
            age: 0.0,
        }
    }
}

impl RunStats {
    /// Applies every effect of `choice`, then ages the player by one year.
    ///
    /// Effects on stats this struct does not track are ignored. Fractional
    /// deltas accumulate across choices.
    pub fn apply_choice(&self, choice: &Choice) -> Self {
        let mut next = *self;
        for effect in &choice.effects {
            let delta = effect.delta;
            match effect.stat.as_str() {
                "hp" => next.hp = bounded(next.hp + delta),
                "mood" => next.mood = bounded(next.mood + delta),
                "finance" => next.finance = bounded(next.finance + delta),
                "social" => next.social = bounded(next.social + delta),
                "relationship" => next.relationship = bounded(next.relationship + delta),
                "energy" => next.energy = bounded(next.energy + delta),
                "knowledge" => next.knowledge = finite(next.knowledge + delta),
                "age" => next.age = finite(next.age + delta),
                _ => {}
            }
        }
        next.age = finite(next.age + 1.0);
        next
    }

    /// Stat name to value, suitable for prerequisite checks.
    pub fn as_map(&self) -> BTreeMap<String, f64> {
        [
            ("hp", self.hp),
            ("mood", self.mood),
            ("finance", self.finance),
            ("social", self.social),
            ("relationship", self.relationship),
            ("energy", self.energy),
            ("knowledge", self.knowledge),
            ("age", self.age),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

fn bounded(value: f64) -> f64 {
    if value.is_nan() {
        return STAT_FLOOR;
    }
    value.clamp(STAT_FLOOR, STAT_CEILING)
}

fn finite(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(f64::MIN, f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StatEffect;

    fn choice(effects: Vec<StatEffect>) -> Choice {
        Choice::new("c1", "Cry loudly", effects)
    }

    #[test]
    fn defaults_match_new_life() {
        let stats = RunStats::default();
        assert_eq!(stats.hp, 100.0);
        assert_eq!(stats.mood, 50.0);
        assert_eq!(stats.energy, 100.0);
        assert_eq!(stats.knowledge, 0.0);
        assert_eq!(stats.age, 0.0);
    }

    #[test]
    fn applies_deltas_and_ages_one_year() {
        let next = RunStats::default().apply_choice(&choice(vec![
            StatEffect::new("hp", -5.0),
            StatEffect::new("mood", -10.0),
        ]));
        assert_eq!(next.hp, 95.0);
        assert_eq!(next.mood, 40.0);
        assert_eq!(next.age, 1.0);
    }

    #[test]
    fn clamps_bounded_stats() {
        let next = RunStats::default().apply_choice(&choice(vec![
            StatEffect::new("hp", 50.0),
            StatEffect::new("finance", -80.0),
        ]));
        assert_eq!(next.hp, 100.0);
        assert_eq!(next.finance, 0.0);
    }

    #[test]
    fn knowledge_is_unbounded() {
        let start = RunStats {
            knowledge: 99.0,
            ..RunStats::default()
        };
        let next = start.apply_choice(&choice(vec![StatEffect::new("knowledge", 5.0)]));
        assert_eq!(next.knowledge, 104.0);
    }

    #[test]
    fn fractional_deltas_accumulate() {
        let treat = choice(vec![StatEffect::new("mood", 0.5)]);
        let mut stats = RunStats::default();
        for _ in 0..4 {
            stats = stats.apply_choice(&treat);
        }
        assert_eq!(stats.mood, 52.0);
        assert_eq!(stats.age, 4.0);
    }

    #[test]
    fn huge_deltas_saturate_without_overflow() {
        let next = RunStats::default().apply_choice(&choice(vec![
            StatEffect::new("hp", 1e19),
            StatEffect::new("finance", -1e19),
            StatEffect::new("knowledge", f64::MAX),
        ]));
        assert_eq!(next.hp, 100.0);
        assert_eq!(next.finance, 0.0);
        assert!(next.knowledge.is_finite());

        let start = RunStats {
            knowledge: f64::MAX,
            age: f64::MAX,
            ..RunStats::default()
        };
        let next = start.apply_choice(&choice(vec![StatEffect::new("knowledge", f64::MAX)]));
        assert_eq!(next.knowledge, f64::MAX);
        assert_eq!(next.age, f64::MAX);
    }

    #[test]
    fn unknown_stats_are_ignored() {
        let next = RunStats::default().apply_choice(&choice(vec![StatEffect::new("courage", 2.0)]));
        assert_eq!(
            next,
            RunStats {
                age: 1.0,
                ..RunStats::default()
            }
        );
    }

    #[test]
    fn map_exposes_every_stat() {
        let map = RunStats::default().as_map();
        assert_eq!(map.len(), 8);
        assert_eq!(map.get("energy"), Some(&100.0));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let stats: RunStats = serde_json::from_str(r#"{"hp": 10}"#).unwrap();
        assert_eq!(stats.hp, 10.0);
        assert_eq!(stats.mood, 50.0);
    }
}
