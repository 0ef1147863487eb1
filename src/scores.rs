use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::Difficulty;

/// Placeholder time for a tier nobody has won yet.
pub const UNBEATEN_SECS: u32 = 999;

const DEFAULT_NAME: &str = "Anonymous";

/// Best recorded time for one difficulty tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestTime {
    pub secs: u32,
    pub name: String,
}

impl Default for BestTime {
    fn default() -> Self {
        Self {
            secs: UNBEATEN_SECS,
            name: DEFAULT_NAME.into(),
        }
    }
}

/// Per-difficulty best times, persisted as JSON between sessions.
///
/// Consumes the `GameWon` signal of a session together with the difficulty
/// it was played at; the engine itself never touches this table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub beginner: BestTime,
    pub intermediate: BestTime,
    pub expert: BestTime,
}

impl ScoreTable {
    pub fn best(&self, difficulty: Difficulty) -> &BestTime {
        match difficulty {
            Difficulty::Beginner => &self.beginner,
            Difficulty::Intermediate => &self.intermediate,
            Difficulty::Expert => &self.expert,
        }
    }

    fn best_mut(&mut self, difficulty: Difficulty) -> &mut BestTime {
        match difficulty {
            Difficulty::Beginner => &mut self.beginner,
            Difficulty::Intermediate => &mut self.intermediate,
            Difficulty::Expert => &mut self.expert,
        }
    }

    /// Records a finished time; returns true only when it beats the stored
    /// best. Empty names fall back to the anonymous default.
    pub fn record(&mut self, difficulty: Difficulty, secs: u32, name: &str) -> bool {
        let entry = self.best_mut(difficulty);
        if secs >= entry.secs {
            return false;
        }

        entry.secs = secs;
        entry.name = if name.is_empty() {
            DEFAULT_NAME.into()
        } else {
            name.to_owned()
        };
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Loads a saved table, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("ignoring corrupt score table at {}: {}", path.display(), err);
                Self::default()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                log::warn!("failed to read score table at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let raw = serde_json::to_string(self).map_err(io::Error::other)?;
        fs::write(path, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_strictly_better_times_are_recorded() {
        let mut scores = ScoreTable::default();

        assert!(scores.record(Difficulty::Beginner, 42, "Ada"));
        assert_eq!(scores.best(Difficulty::Beginner).secs, 42);
        assert_eq!(scores.best(Difficulty::Beginner).name, "Ada");

        assert!(!scores.record(Difficulty::Beginner, 42, "Grace"));
        assert!(!scores.record(Difficulty::Beginner, 99, "Grace"));
        assert_eq!(scores.best(Difficulty::Beginner).name, "Ada");

        // other tiers are untouched
        assert_eq!(scores.best(Difficulty::Expert).secs, UNBEATEN_SECS);
    }

    #[test]
    fn empty_names_fall_back_to_anonymous() {
        let mut scores = ScoreTable::default();
        assert!(scores.record(Difficulty::Expert, 120, ""));
        assert_eq!(scores.best(Difficulty::Expert).name, DEFAULT_NAME);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut scores = ScoreTable::default();
        scores.record(Difficulty::Intermediate, 30, "Ada");

        scores.reset();
        assert_eq!(scores, ScoreTable::default());
    }

    #[test]
    fn table_round_trips_through_json() {
        let mut scores = ScoreTable::default();
        scores.record(Difficulty::Beginner, 17, "Ada");

        let raw = serde_json::to_string(&scores).unwrap();
        let restored: ScoreTable = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, scores);
    }

    #[test]
    fn loading_a_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("sapper-scores-missing.json");
        let _ = fs::remove_file(&path);
        assert_eq!(ScoreTable::load(&path), ScoreTable::default());
    }

    #[test]
    fn save_and_load_round_trip_on_disk() {
        let path = std::env::temp_dir().join("sapper-scores-roundtrip.json");
        let mut scores = ScoreTable::default();
        scores.record(Difficulty::Expert, 200, "Ada");

        scores.save(&path).unwrap();
        assert_eq!(ScoreTable::load(&path), scores);
        let _ = fs::remove_file(&path);
    }
}
