/// Challenge content sources.
///
/// ## Sources per game:
///   - Add the Letters: built-in word list (K-1) / spelling table (2-3)
///   - Unjumble:        `word_bank.json` keyed by grade, with a
///                      built-in bank when the file is absent
///   - Treasure Hunt:   image directory, filename stem = target word
///   - Memory Match:    per-grade audio directory, stem = spoken word
///
/// A source that yields nothing produces an empty pool; the caller
/// treats that as a trivial zero-accuracy session, never a crash.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::domain::challenge::Challenge;

/// Grade level, asked once before every session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Grade {
    K1,
    Spelling,
}

impl Grade {
    /// Key into the word bank document.
    pub fn bank_key(self) -> &'static str {
        match self {
            Grade::K1 => "K",
            Grade::Spelling => "Spelling",
        }
    }

    /// Subdirectory of the audio tree.
    pub fn audio_subdir(self) -> &'static str {
        match self {
            Grade::K1 => "k",
            Grade::Spelling => "spelling",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::K1 => "K-1",
            Grade::Spelling => "Grade 2-3",
        }
    }
}

// ── Built-in content ──

/// K-1 fill-in words.
const K1_WORDS: &[&str] = &[
    "WILD", "CHILD", "KIND", "MIND", "FIND", "SUN", "DOG", "LOG", "BED", "HAT",
];

/// Grade 2-3 spelling table: word, blanked display, phoneme options.
/// The first option is the correct one.
const SPELLING_WORDS: &[(&str, &str, [&str; 3])] = &[
    ("MOST", "M__T", ["OS", "OA", "OU"]),
    ("BREAK", "BR__K", ["EA", "AI", "AY"]),
    ("EIGHT", "E__HT", ["IG", "EI", "AY"]),
    ("KNOW", "K__W", ["NO", "KN", "NW"]),
    ("LOUD", "L__D", ["OU", "OO", "UV"]),
    ("EARLY", "E__LY", ["AR", "ER", "UR"]),
    ("LAUGH", "L__GH", ["AU", "AR", "AF"]),
    ("SURE", "S__E", ["UR", "OR", "IR"]),
    ("THOUGH", "TH__GH", ["OU", "OA", "OE"]),
];

/// Fallback unjumble bank, used when word_bank.json is missing.
const BUILTIN_BANK_K: &[&str] =
    &["CAT", "DOG", "SUN", "HAT", "BED", "PIG", "TOP", "CUP"];
const BUILTIN_BANK_SPELLING: &[&str] = &[
    "PLANT", "HOUSE", "TRAIN", "CLOUD", "SMILE", "BRAVE", "STONE", "DREAM",
];

// ── Pool builders ──

/// Add the Letters pool for a grade.
pub fn add_letters_pool<R: Rng>(grade: Grade, rng: &mut R) -> Vec<Challenge> {
    match grade {
        Grade::K1 => K1_WORDS
            .iter()
            .map(|w| Challenge::letter_fill(w, rng))
            .collect(),
        Grade::Spelling => SPELLING_WORDS
            .iter()
            .map(|(word, blanked, phonemes)| {
                Challenge::phoneme_fill(word, blanked, phonemes, rng)
            })
            .collect(),
    }
}

/// Treasure Hunt pool: every image in the directory becomes one round.
/// K-1 asks for the first letter, Grade 2-3 for the full spelling.
pub fn image_pool(images_dir: &Path, grade: Grade) -> Vec<Challenge> {
    scan_stems(images_dir, &["png", "jpg", "jpeg"])
        .into_iter()
        .map(|(word, path)| match grade {
            Grade::K1 => Challenge::image_to_letter(&word, path),
            Grade::Spelling => Challenge::image_to_word(&word, path),
        })
        .collect()
}

/// Unjumble pool from the word bank. A missing or unreadable bank file
/// falls back to the built-in lists; a present file with nothing under
/// the grade key yields an empty pool.
pub fn unjumble_pool<R: Rng>(
    bank_path: &Path,
    grade: Grade,
    rng: &mut R,
) -> Vec<Challenge> {
    let words = match std::fs::read_to_string(bank_path) {
        Ok(text) => bank_words(&text, grade),
        Err(_) => builtin_bank(grade),
    };
    words
        .iter()
        .filter(|w| w.chars().count() >= 2)
        .map(|w| Challenge::unscramble(w, rng))
        .collect()
}

/// Words for the memory game: audio clips under the grade's
/// subdirectory, stem = spoken word.
pub fn audio_words(audio_dir: &Path, grade: Grade) -> Vec<(String, PathBuf)> {
    scan_stems(&audio_dir.join(grade.audio_subdir()), &["mp3", "wav", "ogg"])
}

// ── Word bank parsing ──

/// Grade-keyed word lists from a JSON document. Malformed text counts
/// as empty, the same as a missing grade key.
pub fn bank_words(text: &str, grade: Grade) -> Vec<String> {
    let bank: BTreeMap<String, Vec<String>> =
        match serde_json::from_str(text) {
            Ok(bank) => bank,
            Err(_) => return Vec::new(),
        };
    bank.get(grade.bank_key())
        .map(|words| {
            words.iter().map(|w| w.to_ascii_uppercase()).collect()
        })
        .unwrap_or_default()
}

fn builtin_bank(grade: Grade) -> Vec<String> {
    let words = match grade {
        Grade::K1 => BUILTIN_BANK_K,
        Grade::Spelling => BUILTIN_BANK_SPELLING,
    };
    words.iter().map(|w| w.to_string()).collect()
}

// ── Directory scanning ──

/// (uppercased stem, path) for every file with a matching extension,
/// sorted by stem so pool order is stable before the session shuffle.
/// Unreadable directories scan as empty.
fn scan_stems(dir: &Path, extensions: &[&str]) -> Vec<(String, PathBuf)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    let mut found: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let ext = path.extension()?.to_str()?.to_ascii_lowercase();
            if !extensions.contains(&ext.as_str()) {
                return None;
            }
            let stem = path.file_stem()?.to_str()?;
            if stem.is_empty() {
                return None;
            }
            Some((stem.to_ascii_uppercase(), path))
        })
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::challenge::Mode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    #[test]
    fn k1_pool_is_letter_fill_over_the_word_list() {
        let mut rng = rng();
        let pool = add_letters_pool(Grade::K1, &mut rng);
        assert_eq!(pool.len(), K1_WORDS.len());
        assert!(pool.iter().all(|c| c.mode == Mode::LetterFill));
    }

    #[test]
    fn spelling_pool_carries_the_phoneme_table() {
        let mut rng = rng();
        let pool = add_letters_pool(Grade::Spelling, &mut rng);
        assert_eq!(pool.len(), SPELLING_WORDS.len());
        assert!(pool.iter().all(|c| c.mode == Mode::PhonemeFill));

        let most = pool.iter().find(|c| c.word == "MOST").unwrap();
        assert_eq!(most.prompt, "M__T");
        assert_eq!(most.answer, "OS");
        assert_eq!(most.options.len(), 3);
    }

    #[test]
    fn bank_words_reads_the_grade_key() {
        let text = r#"{ "K": ["cat", "dog"], "Spelling": ["plant"] }"#;
        assert_eq!(bank_words(text, Grade::K1), vec!["CAT", "DOG"]);
        assert_eq!(bank_words(text, Grade::Spelling), vec!["PLANT"]);
    }

    #[test]
    fn missing_grade_key_or_bad_json_is_empty() {
        assert!(bank_words(r#"{ "K": [] }"#, Grade::Spelling).is_empty());
        assert!(bank_words("not json", Grade::K1).is_empty());
    }

    #[test]
    fn missing_bank_file_falls_back_to_builtin_words() {
        let mut rng = rng();
        let pool =
            unjumble_pool(Path::new("/no/such/bank.json"), Grade::K1, &mut rng);
        assert_eq!(pool.len(), BUILTIN_BANK_K.len());
        assert!(pool.iter().all(|c| c.mode == Mode::Unscramble));
        assert!(pool.iter().all(|c| c.prompt != c.answer));
    }

    #[test]
    fn image_pool_scans_stems_per_grade() {
        let dir = std::env::temp_dir().join(format!(
            "lucky_letters_images_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("sun.png"), b"").unwrap();
        std::fs::write(dir.join("dog.jpg"), b"").unwrap();
        std::fs::write(dir.join("notes.txt"), b"").unwrap();

        let letters = image_pool(&dir, Grade::K1);
        assert_eq!(letters.len(), 2);
        assert!(letters.iter().all(|c| c.mode == Mode::ImageToLetter));
        // Sorted by stem: DOG before SUN.
        assert_eq!(letters[0].word, "DOG");
        assert_eq!(letters[0].answer, "D");

        let words = image_pool(&dir, Grade::Spelling);
        assert!(words.iter().all(|c| c.mode == Mode::ImageToWord));
        assert_eq!(words[1].answer, "SUN");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_or_missing_directories_scan_as_empty() {
        assert!(image_pool(Path::new("/no/such/dir"), Grade::K1).is_empty());
        assert!(audio_words(Path::new("/no/such/dir"), Grade::K1).is_empty());
    }
}
