/// Profile store: username -> per-game scores, one JSON document.
///
/// ## File format
///   ```json
///   {
///     "alice": { "scores": { "treasure": 0.9, "unjumble": 0.5, ... } }
///   }
///   ```
///
/// A missing file is an empty mapping. The whole document is rewritten
/// with pretty indentation on every score update; single-process use,
/// no locking. Both maps are BTreeMaps, so serialization order is
/// deterministic and a load-then-save round trip is byte-stable.
///
/// The Guest profile never touches the store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::progress::{default_scores, Profile, Scores, GUEST_NAME};

/// One stored entry. `scores` defaults so older or hand-edited files
/// missing the key still load.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub scores: Scores,
}

pub struct ProfileBook {
    path: PathBuf,
    entries: BTreeMap<String, ProfileRecord>,
}

impl ProfileBook {
    /// Read the store. Missing file yields an empty book; an unreadable
    /// or malformed file is reported once and treated as empty rather
    /// than aborting startup.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(text) => match parse_profiles(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("Warning: {} is not valid: {e}", path.display());
                    eprintln!("Starting with empty profiles.");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        ProfileBook {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Fetch or create the profile for `username`. New entries start
    /// with every game at 0.0 and are written through immediately, the
    /// same as an updated one. Guest profiles are built fresh and never
    /// stored.
    pub fn open_profile(&mut self, username: &str) -> Profile {
        if username == GUEST_NAME {
            return Profile::new(username);
        }

        let record = self.entries.entry(username.to_string()).or_default();
        for (game, score) in default_scores() {
            record.scores.entry(game).or_insert(score);
        }
        let profile = Profile {
            username: username.to_string(),
            scores: record.scores.clone(),
        };
        let _ = self.save();
        profile
    }

    /// Write a profile's scores back to the store. A guest profile is a
    /// no-op; everything else overwrites the document on disk.
    pub fn record(&mut self, profile: &Profile) -> Result<(), String> {
        if profile.is_guest() {
            return Ok(());
        }
        self.entries.insert(
            profile.username.clone(),
            ProfileRecord { scores: profile.scores.clone() },
        );
        self.save()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }

    fn save(&self) -> Result<(), String> {
        let text = serialize_profiles(&self.entries)?;
        fs::write(&self.path, text)
            .map_err(|e| format!("write {}: {e}", self.path.display()))
    }
}

fn parse_profiles(
    text: &str,
) -> Result<BTreeMap<String, ProfileRecord>, serde_json::Error> {
    serde_json::from_str(text)
}

fn serialize_profiles(
    entries: &BTreeMap<String, ProfileRecord>,
) -> Result<String, String> {
    serde_json::to_string_pretty(entries)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| format!("serialize profiles: {e}"))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::progress::GameId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "lucky_letters_{tag}_{}_{n}.json",
            std::process::id()
        ))
    }

    #[test]
    fn missing_file_is_an_empty_mapping() {
        let book = ProfileBook::load(Path::new("/no/such/profiles.json"));
        assert!(!book.contains("anyone"));
    }

    #[test]
    fn load_save_round_trip_is_byte_stable() {
        let mut entries = BTreeMap::new();
        let mut scores: Scores = default_scores();
        scores.insert(GameId::Treasure, 0.9);
        entries.insert("alice".to_string(), ProfileRecord { scores });
        entries.insert("bob".to_string(), ProfileRecord::default());

        let first = serialize_profiles(&entries).unwrap();
        let reloaded = parse_profiles(&first).unwrap();
        let second = serialize_profiles(&reloaded).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn score_keys_are_ordered_by_the_game_chain() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "alice".to_string(),
            ProfileRecord { scores: default_scores() },
        );
        let text = serialize_profiles(&entries).unwrap();
        let treasure = text.find("\"treasure\"").unwrap();
        let unjumble = text.find("\"unjumble\"").unwrap();
        let add_letters = text.find("\"add_letters\"").unwrap();
        let memory = text.find("\"memory\"").unwrap();
        assert!(treasure < unjumble && unjumble < add_letters && add_letters < memory);
    }

    #[test]
    fn open_profile_creates_and_persists_a_new_entry() {
        let path = temp_path("create");
        let mut book = ProfileBook::load(&path);
        let profile = book.open_profile("alice");

        assert_eq!(profile.username, "alice");
        assert_eq!(profile.score(GameId::Treasure), 0.0);
        assert!(book.contains("alice"));
        assert!(path.exists());

        // Reopen from disk: the entry survived.
        let mut reopened = ProfileBook::load(&path);
        let again = reopened.open_profile("alice");
        assert_eq!(again.scores, profile.scores);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn recorded_scores_survive_a_reload() {
        let path = temp_path("record");
        let mut book = ProfileBook::load(&path);
        let mut profile = book.open_profile("alice");
        profile.scores.insert(GameId::Treasure, 0.85);
        book.record(&profile).unwrap();

        let mut reopened = ProfileBook::load(&path);
        let again = reopened.open_profile("alice");
        assert_eq!(again.score(GameId::Treasure), 0.85);
        assert!(again.is_unlocked(GameId::Unjumble));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn guest_is_never_persisted() {
        let path = temp_path("guest");
        let mut book = ProfileBook::load(&path);
        let profile = book.open_profile(GUEST_NAME);
        assert!(profile.is_guest());
        assert!(!book.contains(GUEST_NAME));

        book.record(&profile).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn partial_entry_gains_missing_score_keys() {
        let path = temp_path("partial");
        fs::write(&path, r#"{ "carol": { "scores": { "treasure": 0.9 } } }"#)
            .unwrap();
        let mut book = ProfileBook::load(&path);
        let profile = book.open_profile("carol");
        assert_eq!(profile.score(GameId::Treasure), 0.9);
        assert_eq!(profile.score(GameId::Memory), 0.0);

        let _ = fs::remove_file(&path);
    }
}
