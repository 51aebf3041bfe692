/// Memory-match board: pair each spoken word with its written form.
///
/// Every word contributes two cards, one audio and one word. A click on
/// an audio card arms it (and asks the caller to play the clip); the
/// next word-card click judges the pair. Matched cards go inert.
///
/// ┌──────────────────────────────┬───────────────┐
/// │ Click on                      │ Effect        │
/// ├──────────────────────────────┼───────────────┤
/// │ audio card                    │ arm + play    │
/// │ word card, audio armed, match │ pair matched  │
/// │ word card, audio armed, miss  │ try again     │
/// │ word card, nothing armed      │ ignored       │
/// │ matched card                  │ ignored       │
/// └──────────────────────────────┴───────────────┘

use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CardKind {
    Audio,
    Word,
}

#[derive(Clone, Debug)]
pub struct Card {
    pub word: String,
    pub kind: CardKind,
    pub matched: bool,
}

/// What a click did, for the caller to present.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BoardEvent {
    /// An audio card was armed; play this word's clip.
    PlayAudio(String),
    Matched,
    TryAgain,
}

pub struct MatchBoard {
    cards: Vec<Card>,
    selected_audio: Option<usize>,
    matched: usize,
    word_count: usize,
}

impl MatchBoard {
    /// Build a shuffled board with one audio and one word card per word.
    pub fn new<R: Rng>(words: Vec<String>, rng: &mut R) -> Self {
        let word_count = words.len();
        let mut cards: Vec<Card> = Vec::with_capacity(word_count * 2);
        for word in words {
            cards.push(Card { word: word.clone(), kind: CardKind::Audio, matched: false });
            cards.push(Card { word, kind: CardKind::Word, matched: false });
        }
        cards.shuffle(rng);
        MatchBoard {
            cards,
            selected_audio: None,
            matched: 0,
            word_count,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn selected_audio(&self) -> Option<usize> {
        self.selected_audio
    }

    pub fn matched_words(&self) -> usize {
        self.matched
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn is_complete(&self) -> bool {
        self.matched >= self.word_count
    }

    /// matched / words; partial when abandoned early, 1.0 on completion.
    pub fn accuracy(&self) -> f64 {
        if self.word_count == 0 {
            0.0
        } else {
            self.matched as f64 / self.word_count as f64
        }
    }

    /// Apply a click on card `idx`. See the table above.
    pub fn select(&mut self, idx: usize) -> Option<BoardEvent> {
        let card = self.cards.get(idx)?;
        if card.matched {
            return None;
        }
        match card.kind {
            CardKind::Audio => {
                self.selected_audio = Some(idx);
                Some(BoardEvent::PlayAudio(card.word.clone()))
            }
            CardKind::Word => {
                let audio_idx = self.selected_audio.take()?;
                if self.cards[audio_idx].word == self.cards[idx].word {
                    self.cards[audio_idx].matched = true;
                    self.cards[idx].matched = true;
                    self.matched += 1;
                    Some(BoardEvent::Matched)
                } else {
                    Some(BoardEvent::TryAgain)
                }
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> MatchBoard {
        let mut rng = StdRng::seed_from_u64(11);
        MatchBoard::new(vec!["CAT".to_string(), "DOG".to_string()], &mut rng)
    }

    fn find(b: &MatchBoard, word: &str, kind: CardKind) -> usize {
        b.cards()
            .iter()
            .position(|c| c.word == word && c.kind == kind)
            .unwrap()
    }

    #[test]
    fn builds_two_cards_per_word() {
        let b = board();
        assert_eq!(b.cards().len(), 4);
        assert_eq!(b.word_count(), 2);
        let audio = b.cards().iter().filter(|c| c.kind == CardKind::Audio).count();
        assert_eq!(audio, 2);
    }

    #[test]
    fn audio_then_matching_word_pairs_up() {
        let mut b = board();
        let a = find(&b, "CAT", CardKind::Audio);
        let w = find(&b, "CAT", CardKind::Word);

        assert_eq!(b.select(a), Some(BoardEvent::PlayAudio("CAT".to_string())));
        assert_eq!(b.select(w), Some(BoardEvent::Matched));
        assert_eq!(b.matched_words(), 1);
        assert!(b.cards()[a].matched);
        assert!(b.cards()[w].matched);
        assert!((b.accuracy() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn mismatch_clears_the_armed_audio() {
        let mut b = board();
        let a = find(&b, "CAT", CardKind::Audio);
        let w = find(&b, "DOG", CardKind::Word);

        b.select(a);
        assert_eq!(b.select(w), Some(BoardEvent::TryAgain));
        assert_eq!(b.matched_words(), 0);
        assert_eq!(b.selected_audio(), None);
        // Arming again is required before the next word click counts.
        assert_eq!(b.select(w), None);
    }

    #[test]
    fn word_click_without_armed_audio_is_ignored() {
        let mut b = board();
        let w = find(&b, "CAT", CardKind::Word);
        assert_eq!(b.select(w), None);
    }

    #[test]
    fn matched_cards_go_inert() {
        let mut b = board();
        let a = find(&b, "CAT", CardKind::Audio);
        let w = find(&b, "CAT", CardKind::Word);
        b.select(a);
        b.select(w);
        assert_eq!(b.select(a), None);
        assert_eq!(b.select(w), None);
    }

    #[test]
    fn completing_all_pairs_finishes_the_board() {
        let mut b = board();
        for word in ["CAT", "DOG"] {
            let a = find(&b, word, CardKind::Audio);
            let w = find(&b, word, CardKind::Word);
            b.select(a);
            b.select(w);
        }
        assert!(b.is_complete());
        assert_eq!(b.accuracy(), 1.0);
    }

    #[test]
    fn empty_board_scores_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let b = MatchBoard::new(Vec::new(), &mut rng);
        assert!(b.is_complete());
        assert_eq!(b.accuracy(), 0.0);
    }

    #[test]
    fn out_of_range_click_is_ignored() {
        let mut b = board();
        assert_eq!(b.select(99), None);
    }
}
