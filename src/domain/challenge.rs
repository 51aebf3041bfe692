/// Challenge variants and judging.
///
/// A Challenge is one round's content, immutable once generated. The
/// variant is picked once per session (game + grade level), and all
/// per-variant behavior hangs off `Mode` instead of being re-branched
/// at every call site.
///
/// ## Judgement Truth Table
///
/// ┌───────────────────────────────┬──────────────┐
/// │ Condition (priority order)     │ Outcome      │
/// ├───────────────────────────────┼──────────────┤
/// │ has options, guess not offered │ NotAnOption  │
/// │ guess == answer (case-insens)  │ Correct      │
/// │ otherwise                      │ Wrong        │
/// └───────────────────────────────┴──────────────┘
///
/// "Not a valid option" is deliberately distinct from "wrong answer":
/// the first means the typed text isn't on the board at all.

use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::Rng;

/// Challenge variant, selected once per session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// K-1 fill-in: one letter of a word is blanked out.
    LetterFill,
    /// Grade 2-3 fill-in: a two-letter phoneme is blanked out.
    PhonemeFill,
    /// Type the first letter of the pictured word.
    ImageToLetter,
    /// Spell the pictured word in full.
    ImageToWord,
    /// Reorder a scrambled word.
    Unscramble,
}

/// How much input a variant accepts before ENTER.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    SingleChar,
    MultiChar(usize),
    FullWord(usize),
}

impl InputMode {
    /// Maximum number of characters the input buffer may hold.
    pub fn cap(self) -> usize {
        match self {
            InputMode::SingleChar => 1,
            InputMode::MultiChar(n) => n,
            InputMode::FullWord(n) => n,
        }
    }
}

/// Result of judging one round. Ordinary values, never errors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Correct,
    Wrong,
    /// Typed text is not among the offered options (choice variants only).
    NotAnOption,
}

/// One round's content. All text is stored uppercase; matching is
/// case-insensitive by construction.
#[derive(Clone, Debug)]
pub struct Challenge {
    pub mode: Mode,
    /// Display prompt: blanked word, scrambled word, or empty for
    /// image variants (the image placeholder is the prompt).
    pub prompt: String,
    /// Canonical correct answer.
    pub answer: String,
    /// Offered options. Empty for free-typed variants.
    pub options: Vec<String>,
    /// The full target word.
    pub word: String,
    /// Prompt image, for the image variants.
    pub image: Option<PathBuf>,
}

impl Challenge {
    pub fn input_mode(&self) -> InputMode {
        match self.mode {
            Mode::LetterFill | Mode::ImageToLetter => InputMode::SingleChar,
            Mode::PhonemeFill => InputMode::MultiChar(2),
            Mode::ImageToWord | Mode::Unscramble => {
                InputMode::FullWord(self.word.chars().count())
            }
        }
    }

    /// K-1 letter fill: blank one random position, offer the missing
    /// letter plus two distractors.
    pub fn letter_fill<R: Rng>(word: &str, rng: &mut R) -> Challenge {
        let word = word.to_ascii_uppercase();
        let chars: Vec<char> = word.chars().collect();
        let idx = rng.gen_range(0..chars.len());
        let missing = chars[idx];

        let mut prompt = String::with_capacity(word.len());
        for (i, c) in chars.iter().enumerate() {
            prompt.push(if i == idx { '_' } else { *c });
        }

        let alphabet: Vec<char> = ('A'..='Z').filter(|c| *c != missing).collect();
        let mut options: Vec<String> = alphabet
            .choose_multiple(rng, 2)
            .map(|c| c.to_string())
            .collect();
        options.push(missing.to_string());
        options.shuffle(rng);

        Challenge {
            mode: Mode::LetterFill,
            prompt,
            answer: missing.to_string(),
            options,
            word,
            image: None,
        }
    }

    /// Grade 2-3 phoneme fill: the blanked display and option list come
    /// from the spelling table; the first listed phoneme is the answer.
    pub fn phoneme_fill<R: Rng>(
        word: &str,
        blanked: &str,
        phonemes: &[&str],
        rng: &mut R,
    ) -> Challenge {
        let mut options: Vec<String> =
            phonemes.iter().map(|p| p.to_ascii_uppercase()).collect();
        let answer = options[0].clone();
        options.shuffle(rng);

        Challenge {
            mode: Mode::PhonemeFill,
            prompt: blanked.to_ascii_uppercase(),
            answer,
            options,
            word: word.to_ascii_uppercase(),
            image: None,
        }
    }

    /// Name the first letter of the pictured word.
    pub fn image_to_letter(word: &str, image: PathBuf) -> Challenge {
        let word = word.to_ascii_uppercase();
        let first = word.chars().next().map(String::from).unwrap_or_default();
        Challenge {
            mode: Mode::ImageToLetter,
            prompt: String::new(),
            answer: first,
            options: Vec::new(),
            word,
            image: Some(image),
        }
    }

    /// Spell the pictured word in full.
    pub fn image_to_word(word: &str, image: PathBuf) -> Challenge {
        let word = word.to_ascii_uppercase();
        Challenge {
            mode: Mode::ImageToWord,
            prompt: String::new(),
            answer: word.clone(),
            options: Vec::new(),
            word,
            image: Some(image),
        }
    }

    /// Unscramble a shuffled word.
    pub fn unscramble<R: Rng>(word: &str, rng: &mut R) -> Challenge {
        let word = word.to_ascii_uppercase();
        let prompt = scramble(&word, rng);
        Challenge {
            mode: Mode::Unscramble,
            prompt,
            answer: word.clone(),
            options: Vec::new(),
            word,
            image: None,
        }
    }
}

/// Judge typed input against a challenge. See the truth table above.
pub fn judge(challenge: &Challenge, input: &str) -> Outcome {
    let guess = input.trim().to_ascii_uppercase();
    if !challenge.options.is_empty() && !challenge.options.contains(&guess) {
        return Outcome::NotAnOption;
    }
    if guess == challenge.answer {
        Outcome::Correct
    } else {
        Outcome::Wrong
    }
}

/// Per-round feedback line for a judged outcome.
pub fn feedback_text(mode: Mode, outcome: Outcome, typed: &str) -> String {
    match outcome {
        Outcome::Correct => "Correct!".to_string(),
        Outcome::NotAnOption => format!("'{typed}' is not a valid option"),
        Outcome::Wrong => match mode {
            Mode::LetterFill | Mode::PhonemeFill => {
                format!("Oops! '{typed}' is wrong")
            }
            Mode::ImageToLetter | Mode::ImageToWord => {
                format!("Nope, that was '{typed}'")
            }
            Mode::Unscramble => "Wrong".to_string(),
        },
    }
}

// ── Scrambling ──

/// Shuffle attempts before giving up and rotating instead.
const MAX_SCRAMBLE_TRIES: usize = 20;

/// Produce a permutation of `word` that differs from it.
///
/// Shuffling is retried a bounded number of times; if every try lands
/// back on the original order, the word is rotated by one position.
/// A rotation equals the original only when every character is the
/// same, in which case the word is returned as-is rather than looping.
pub fn scramble<R: Rng>(word: &str, rng: &mut R) -> String {
    let original: Vec<char> = word.chars().collect();
    if original.len() < 2 {
        return word.to_string();
    }

    let mut arr = original.clone();
    for _ in 0..MAX_SCRAMBLE_TRIES {
        arr.shuffle(rng);
        if arr != original {
            return arr.into_iter().collect();
        }
    }

    let mut rotated = original;
    rotated.rotate_left(1);
    rotated.into_iter().collect()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Helper: hand-built K-1 fill-in for "SUN" with the middle letter
    /// blanked, options U/B/K.
    fn sun_challenge() -> Challenge {
        Challenge {
            mode: Mode::LetterFill,
            prompt: "S_N".to_string(),
            answer: "U".to_string(),
            options: vec!["U".into(), "B".into(), "K".into()],
            word: "SUN".to_string(),
            image: None,
        }
    }

    // ── Judging ──

    #[test]
    fn letter_fill_correct_option() {
        let c = sun_challenge();
        assert_eq!(judge(&c, "U"), Outcome::Correct);
        assert_eq!(feedback_text(c.mode, Outcome::Correct, "U"), "Correct!");
    }

    #[test]
    fn letter_fill_is_case_insensitive() {
        let c = sun_challenge();
        assert_eq!(judge(&c, "u"), Outcome::Correct);
    }

    #[test]
    fn letter_fill_wrong_option() {
        let c = sun_challenge();
        assert_eq!(judge(&c, "B"), Outcome::Wrong);
    }

    #[test]
    fn letter_fill_unoffered_letter() {
        let c = sun_challenge();
        assert_eq!(judge(&c, "Z"), Outcome::NotAnOption);
    }

    #[test]
    fn phoneme_fill_rejects_unoffered_pair() {
        // "MOST" blanked to M__T, options OS / OA / OU, answer OS.
        let c = Challenge {
            mode: Mode::PhonemeFill,
            prompt: "M__T".to_string(),
            answer: "OS".to_string(),
            options: vec!["OS".into(), "OA".into(), "OU".into()],
            word: "MOST".to_string(),
            image: None,
        };
        let out = judge(&c, "AY");
        assert_eq!(out, Outcome::NotAnOption);
        assert!(feedback_text(c.mode, out, "AY").contains("not a valid option"));
        assert_eq!(judge(&c, "OA"), Outcome::Wrong);
        assert_eq!(judge(&c, "os"), Outcome::Correct);
    }

    #[test]
    fn free_typed_variants_never_report_not_an_option() {
        let c = Challenge {
            mode: Mode::Unscramble,
            prompt: "NUS".to_string(),
            answer: "SUN".to_string(),
            options: Vec::new(),
            word: "SUN".to_string(),
            image: None,
        };
        assert_eq!(judge(&c, "sun"), Outcome::Correct);
        assert_eq!(judge(&c, "nus"), Outcome::Wrong);
    }

    // ── Constructors ──

    #[test]
    fn letter_fill_blanks_exactly_one_letter() {
        let mut rng = rng();
        for _ in 0..50 {
            let c = Challenge::letter_fill("sun", &mut rng);
            assert_eq!(c.word, "SUN");
            assert_eq!(c.prompt.chars().filter(|c| *c == '_').count(), 1);
            assert_eq!(c.options.len(), 3);
            assert!(c.options.contains(&c.answer));

            // The blank position must hold the answer in the original word.
            let idx = c.prompt.chars().position(|ch| ch == '_').unwrap();
            let expected: String = c.word.chars().nth(idx).unwrap().to_string();
            assert_eq!(c.answer, expected);
        }
    }

    #[test]
    fn letter_fill_distractors_are_distinct_letters() {
        let mut rng = rng();
        let c = Challenge::letter_fill("DOG", &mut rng);
        let mut seen = c.options.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn phoneme_fill_keeps_first_phoneme_as_answer() {
        let mut rng = rng();
        let c = Challenge::phoneme_fill("MOST", "M__T", &["OS", "OA", "OU"], &mut rng);
        assert_eq!(c.answer, "OS");
        assert_eq!(c.options.len(), 3);
        assert!(c.options.contains(&"OS".to_string()));
    }

    #[test]
    fn image_variants_derive_answers_from_the_stem() {
        let letter = Challenge::image_to_letter("cat", PathBuf::from("cat.png"));
        assert_eq!(letter.answer, "C");
        assert_eq!(letter.input_mode().cap(), 1);

        let word = Challenge::image_to_word("cat", PathBuf::from("cat.png"));
        assert_eq!(word.answer, "CAT");
        assert_eq!(word.input_mode().cap(), 3);
    }

    // ── Scrambling ──

    #[test]
    fn scramble_differs_when_reordering_can_differ() {
        let mut rng = rng();
        for word in ["AB", "SUN", "BREAK", "AAB", "MISSISSIPPI"] {
            for _ in 0..20 {
                assert_ne!(scramble(word, &mut rng), word, "word {word}");
            }
        }
    }

    #[test]
    fn scramble_is_a_permutation() {
        let mut rng = rng();
        let sorted = |s: &str| {
            let mut v: Vec<char> = s.chars().collect();
            v.sort_unstable();
            v
        };
        let s = scramble("BREAK", &mut rng);
        assert_eq!(sorted(&s), sorted("BREAK"));
    }

    #[test]
    fn scramble_terminates_on_identical_characters() {
        let mut rng = rng();
        // No distinct reordering exists; the fallback must not loop.
        assert_eq!(scramble("EEE", &mut rng), "EEE");
        assert_eq!(scramble("A", &mut rng), "A");
    }
}
