/// Events emitted while handling input.
/// The presentation layer consumes these for sound.

use std::path::PathBuf;

#[derive(Clone, Debug)]
pub enum GameEvent {
    RoundCorrect,
    RoundWrong,
    /// An audio card was armed; play this clip.
    CardAudio(PathBuf),
    PairMatched,
    PairMissed,
    SessionPassed,
    SessionFailed,
}
