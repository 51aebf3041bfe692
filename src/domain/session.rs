/// GameSession: one minigame run over a shuffled challenge sequence.
///
/// The sequence is shuffled once at construction and then fixed; every
/// challenge in the pool is played exactly once (session length = pool
/// size). Accuracy is always correct / attempted, so an abandoned
/// session reports the accuracy of the rounds actually played, not a
/// fraction of rounds that never happened.
///
/// Invariant: correct <= attempted <= total.

use rand::seq::SliceRandom;
use rand::Rng;

use super::challenge::{Challenge, Outcome};

/// Outcome of one judged round. Never mutated after creation.
#[derive(Clone, Copy, Debug)]
pub struct RoundResult {
    pub outcome: Outcome,
}

pub struct GameSession {
    challenges: Vec<Challenge>,
    results: Vec<RoundResult>,
    correct: usize,
}

impl GameSession {
    /// Shuffle the pool once and fix the order.
    pub fn new<R: Rng>(mut pool: Vec<Challenge>, rng: &mut R) -> Self {
        pool.shuffle(rng);
        GameSession {
            challenges: pool,
            results: Vec::new(),
            correct: 0,
        }
    }

    /// The challenge awaiting an answer, or None when the session is done.
    pub fn current(&self) -> Option<&Challenge> {
        self.challenges.get(self.results.len())
    }

    /// The most recently judged challenge and its result. Shown during
    /// the feedback freeze, after the cursor has already advanced.
    pub fn last_judged(&self) -> Option<(&Challenge, &RoundResult)> {
        let idx = self.results.len().checked_sub(1)?;
        Some((&self.challenges[idx], &self.results[idx]))
    }

    /// Record the outcome for the current challenge and advance.
    pub fn record(&mut self, outcome: Outcome) {
        debug_assert!(self.results.len() < self.challenges.len());
        if outcome == Outcome::Correct {
            self.correct += 1;
        }
        self.results.push(RoundResult { outcome });
    }

    pub fn total(&self) -> usize {
        self.challenges.len()
    }

    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn is_finished(&self) -> bool {
        self.results.len() >= self.challenges.len()
    }

    /// correct / attempted, 0.0 when nothing was attempted.
    /// For a completed session this equals correct / total.
    pub fn accuracy(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.correct as f64 / self.results.len() as f64
        }
    }
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

    fn mk(word: &str) -> Challenge {
        Challenge {
            mode: Mode::Unscramble,
            prompt: word.chars().rev().collect(),
            answer: word.to_string(),
            options: Vec::new(),
            word: word.to_string(),
            image: None,
        }
    }

    fn pool() -> Vec<Challenge> {
        ["SUN", "DOG", "LOG", "BED", "HAT"].iter().map(|w| mk(w)).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn plays_every_challenge_exactly_once() {
        let mut rng = rng();
        let mut session = GameSession::new(pool(), &mut rng);
        let mut seen = Vec::new();
        while let Some(c) = session.current() {
            seen.push(c.word.clone());
            session.record(Outcome::Correct);
        }
        seen.sort();
        let mut expected: Vec<String> =
            pool().into_iter().map(|c| c.word).collect();
        expected.sort();
        assert_eq!(seen, expected);
        assert!(session.is_finished());
        assert_eq!(session.accuracy(), 1.0);
    }

    #[test]
    fn completed_accuracy_is_a_fraction_of_total() {
        let mut rng = rng();
        let mut session = GameSession::new(pool(), &mut rng);
        let outcomes = [
            Outcome::Correct,
            Outcome::Wrong,
            Outcome::Correct,
            Outcome::NotAnOption,
            Outcome::Correct,
        ];
        for o in outcomes {
            session.record(o);
        }
        assert_eq!(session.correct(), 3);
        assert_eq!(session.attempted(), 5);
        assert!((session.accuracy() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn abandoned_session_scores_only_attempted_rounds() {
        // Five challenges, quit after two answers with one correct:
        // accuracy is 0.5, not 0.2.
        let mut rng = rng();
        let mut session = GameSession::new(pool(), &mut rng);
        session.record(Outcome::Correct);
        session.record(Outcome::Wrong);
        assert!(!session.is_finished());
        assert_eq!(session.attempted(), 2);
        assert!((session.accuracy() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn untouched_session_scores_zero() {
        let mut rng = rng();
        let session = GameSession::new(pool(), &mut rng);
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn empty_pool_is_a_trivial_finished_session() {
        let mut rng = rng();
        let session = GameSession::new(Vec::new(), &mut rng);
        assert!(session.is_finished());
        assert!(session.current().is_none());
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn not_an_option_marks_the_round_wrong() {
        let mut rng = rng();
        let mut session = GameSession::new(pool(), &mut rng);
        session.record(Outcome::NotAnOption);
        assert_eq!(session.correct(), 0);
        assert_eq!(session.attempted(), 1);
        let (_, result) = session.last_judged().unwrap();
        assert_eq!(result.outcome, Outcome::NotAnOption);
    }
}
