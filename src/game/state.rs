/// AppState: everything the central loop and renderer share.
///
/// One phase is active at a time; popups are ordinary phases of the
/// same machine, so the single event loop handles every screen and a
/// quit signal is handled in exactly one place. Per-session transient
/// state (session, board, typed buffer) is dropped when control
/// returns to the map.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::board::MatchBoard;
use crate::domain::progress::{GameId, Profile, GUEST_NAME};
use crate::domain::session::GameSession;
use crate::game::content::Grade;
use crate::game::profile::ProfileBook;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Sign in or play as guest.
    Start,
    /// Username entry.
    NamePrompt,
    /// Welcome popup.
    Welcome,
    /// The adventure map menu.
    Map,
    /// "Not at this level yet" popup.
    Locked,
    /// K-1 vs Grade 2-3 prompt for the pending game.
    GradeSelect,
    /// Memory-game instructions popup.
    Instructions,
    /// A typed round awaiting an answer.
    Round,
    /// Post-judgement freeze; input is ignored until the timer runs out.
    Feedback,
    /// The memory-match card grid.
    MemoryBoard,
    /// End-of-game popup.
    Results,
}

/// Color class for feedback and status text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tone {
    Info,
    Good,
    Bad,
}

pub struct AppState {
    pub phase: Phase,

    // ── Profile ──
    pub book: ProfileBook,
    pub profile: Profile,

    // ── Active minigame ──
    pub pending_game: Option<GameId>,
    pub grade: Grade,
    pub session: Option<GameSession>,
    pub board: Option<MatchBoard>,
    /// word -> clip path for the memory game.
    pub audio_clips: HashMap<String, PathBuf>,

    // ── Input buffers ──
    pub typed: String,
    pub name_input: String,

    // ── Presentation ──
    /// Lines for the current popup phase.
    pub popup: Vec<String>,
    pub feedback: String,
    pub feedback_tone: Tone,
    /// Ticks left in the post-judgement freeze.
    pub feedback_ticks: u32,
    /// Transient status line (bottom of screen).
    pub message: String,
    pub message_tone: Tone,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl AppState {
    pub fn new(book: ProfileBook) -> Self {
        AppState {
            phase: Phase::Start,
            book,
            profile: Profile::new(GUEST_NAME),
            pending_game: None,
            grade: Grade::K1,
            session: None,
            board: None,
            audio_clips: HashMap::new(),
            typed: String::new(),
            name_input: String::new(),
            popup: Vec::new(),
            feedback: String::new(),
            feedback_tone: Tone::Info,
            feedback_ticks: 0,
            message: String::new(),
            message_tone: Tone::Info,
            message_timer: 0,
            anim_tick: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, tone: Tone, duration: u32) {
        self.message = msg.to_string();
        self.message_tone = tone;
        self.message_timer = duration;
    }

    pub fn set_feedback(&mut self, text: String, tone: Tone, ticks: u32) {
        self.feedback = text;
        self.feedback_tone = tone;
        self.feedback_ticks = ticks;
    }

    /// Drop per-session transient state when control returns to the map.
    pub fn clear_session(&mut self) {
        self.pending_game = None;
        self.session = None;
        self.board = None;
        self.audio_clips.clear();
        self.typed.clear();
        self.feedback.clear();
        self.feedback_ticks = 0;
    }
}
