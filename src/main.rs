/// Entry point and game loop.
///
/// One event-poll-then-render loop drives every screen: menus, popups,
/// rounds and the memory board are all phases of a single state
/// machine, so cancellation is handled in exactly one place. The loop
/// is paced at a nominal 30 steps/second; the post-answer freeze and
/// transient messages are counted in ticks.

mod config;
mod domain;
mod game;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::board::{BoardEvent, MatchBoard};
use domain::challenge::{feedback_text, judge, Outcome};
use domain::progress::{GameId, GUEST_NAME, PASS_THRESHOLD};
use domain::session::GameSession;
use game::content::{self, Grade};
use game::event::GameEvent;
use game::profile::ProfileBook;
use game::state::{AppState, Phase, Tone};
use ui::input::InputState;
use ui::renderer::{self, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const MAX_NAME_LEN: usize = 12;
/// Tick counts for transient status text.
const FLASH_TICKS: u32 = 30;
const MESSAGE_TICKS: u32 = 60;

fn main() {
    let config = GameConfig::load();
    let book = ProfileBook::load(&config.profiles_file);
    let mut state = AppState::new(book);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut state, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Lucky Letters!");
}

fn game_loop(
    state: &mut AppState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.pacing.tick_rate_ms);

    loop {
        input.drain_events();

        if input.ctrl_c_pressed() {
            abort_active_session(state);
            break;
        }

        let mut events: Vec<GameEvent> = Vec::new();
        if handle_phase(state, &input, config, &mut events) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            tick(state, &mut events);
            last_tick = Instant::now();
        }

        process_sound_events(sound, &events);

        renderer.render(state)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::RoundCorrect | GameEvent::PairMatched => sfx.play_correct(),
            GameEvent::RoundWrong | GameEvent::PairMissed => sfx.play_wrong(),
            GameEvent::CardAudio(path) => sfx.play_clip(path),
            GameEvent::SessionPassed => sfx.play_pass(),
            GameEvent::SessionFailed => sfx.play_fail(),
        }
    }
}

// ── Per-tick timers ──

fn tick(state: &mut AppState, events: &mut Vec<GameEvent>) {
    state.anim_tick = state.anim_tick.wrapping_add(1);

    if state.message_timer > 0 {
        state.message_timer -= 1;
        if state.message_timer == 0 {
            state.message.clear();
        }
    }

    // Post-judgement freeze: input stays frozen until the timer runs
    // out, then the session advances or wraps up.
    if state.phase == Phase::Feedback && state.feedback_ticks > 0 {
        state.feedback_ticks -= 1;
        if state.feedback_ticks == 0 {
            state.typed.clear();
            state.feedback.clear();
            let finished =
                state.session.as_ref().map_or(true, |s| s.is_finished());
            if finished {
                finish_session(state, events);
            } else {
                state.phase = Phase::Round;
            }
        }
    }
}

// ── Phase dispatch ──

/// Handle this frame's input for the active phase.
/// Returns true when the application should exit.
fn handle_phase(
    state: &mut AppState,
    input: &InputState,
    config: &GameConfig,
    events: &mut Vec<GameEvent>,
) -> bool {
    // ESC is the quit signal: it unwinds from any phase, recording a
    // partial result first when a session is active.
    if input.was_pressed(KeyCode::Esc) {
        abort_active_session(state);
        return true;
    }

    let space = input.was_pressed(KeyCode::Char(' '));

    match state.phase {
        // ── Start Screen ──
        Phase::Start => {
            if input.was_pressed(KeyCode::Char('1')) {
                state.name_input.clear();
                state.phase = Phase::NamePrompt;
            } else if input.was_pressed(KeyCode::Char('2')) {
                sign_in(state, GUEST_NAME);
            } else if input.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q')]) {
                return true;
            }
        }

        // ── Username Prompt ──
        Phase::NamePrompt => {
            if input.was_pressed(KeyCode::Enter) {
                let name = state.name_input.trim().to_string();
                let name = if name.is_empty() { "Player".to_string() } else { name };
                sign_in(state, &name);
            } else if input.was_pressed(KeyCode::Backspace) {
                state.name_input.pop();
            } else {
                for c in input.typed_printable() {
                    if state.name_input.chars().count() < MAX_NAME_LEN {
                        state.name_input.push(c);
                    }
                }
            }
        }

        // ── Popups ──
        Phase::Welcome | Phase::Locked => {
            if space {
                state.popup.clear();
                state.phase = Phase::Map;
            }
        }
        Phase::Instructions => {
            if space {
                state.popup.clear();
                state.phase = Phase::MemoryBoard;
            }
        }
        Phase::Results => {
            if space {
                state.popup.clear();
                state.phase = Phase::Map;
            }
        }

        // ── Adventure Map ──
        Phase::Map => {
            for (i, game) in GameId::ALL.iter().enumerate() {
                let key = KeyCode::Char(char::from(b'1' + i as u8));
                if !input.was_pressed(key) {
                    continue;
                }
                // The gate re-reads the profile scores fresh on every
                // attempt; there is no cached unlock state.
                if state.profile.is_unlocked(*game) {
                    state.pending_game = Some(*game);
                    state.phase = Phase::GradeSelect;
                } else {
                    state.popup =
                        vec!["You are not at this level yet".to_string()];
                    state.phase = Phase::Locked;
                }
                break;
            }
        }

        // ── Grade Selection ──
        Phase::GradeSelect => {
            let grade = if input.was_pressed(KeyCode::Char('1')) {
                Some(Grade::K1)
            } else if input.was_pressed(KeyCode::Char('2')) {
                Some(Grade::Spelling)
            } else {
                None
            };
            if let Some(grade) = grade {
                state.grade = grade;
                start_session(state, config);
            }
        }

        // ── Typed Round ──
        Phase::Round => handle_round(state, input, config, events),

        // ── Feedback freeze: input is ignored until the tick timer ends ──
        Phase::Feedback => {}

        // ── Memory Board ──
        Phase::MemoryBoard => handle_board(state, input, events),
    }

    false
}

// ── Sign-in and session start ──

fn sign_in(state: &mut AppState, username: &str) {
    state.profile = state.book.open_profile(username);
    state.popup = if state.profile.is_guest() {
        vec!["Welcome, Guest!".to_string(), "Ready to explore?".to_string()]
    } else {
        vec![
            format!("Welcome, {}!", state.profile.username),
            "Let's begin your adventure!".to_string(),
        ]
    };
    state.phase = Phase::Welcome;
}

/// Build the pending game's content for the chosen grade and enter the
/// first round (or the instructions popup for the memory game).
fn start_session(state: &mut AppState, config: &GameConfig) {
    let Some(game) = state.pending_game else {
        state.phase = Phase::Map;
        return;
    };
    let mut rng = rand::thread_rng();

    if game == GameId::Memory {
        let clips = content::audio_words(&config.audio_dir(), state.grade);
        if clips.is_empty() {
            empty_content(state, game);
            return;
        }
        let words: Vec<String> = clips.iter().map(|(w, _)| w.clone()).collect();
        state.audio_clips = clips.into_iter().collect();
        state.board = Some(MatchBoard::new(words, &mut rng));
        state.popup = vec![
            "Match each sound with its written word.".to_string(),
            "Click a sound card to hear it.".to_string(),
            "Then click the word that matches.".to_string(),
            "Make all matches to win!".to_string(),
        ];
        state.phase = Phase::Instructions;
        return;
    }

    let pool = match game {
        GameId::Treasure => content::image_pool(&config.images_dir(), state.grade),
        GameId::Unjumble => {
            content::unjumble_pool(&config.word_bank(), state.grade, &mut rng)
        }
        _ => content::add_letters_pool(state.grade, &mut rng),
    };
    if pool.is_empty() {
        empty_content(state, game);
        return;
    }

    state.session = Some(GameSession::new(pool, &mut rng));
    state.typed.clear();
    state.feedback.clear();
    state.phase = Phase::Round;
}

/// A content source that yields nothing is a trivial session: zero
/// accuracy, straight back to the map.
fn empty_content(state: &mut AppState, game: GameId) {
    record_result(state, game, 0.0);
    state.clear_session();
    state.set_message(
        &format!("No challenges found for {}", game.title()),
        Tone::Bad,
        MESSAGE_TICKS,
    );
    state.phase = Phase::Map;
}

// ── Round input ──

fn handle_round(
    state: &mut AppState,
    input: &InputState,
    config: &GameConfig,
    events: &mut Vec<GameEvent>,
) {
    if input.was_pressed(KeyCode::Backspace) {
        state.typed.pop();
    }

    let Some(session) = state.session.as_mut() else {
        return;
    };
    let Some(challenge) = session.current() else {
        return;
    };
    let mode = challenge.mode;
    let cap = challenge.input_mode().cap();

    for c in input.typed_letters() {
        if state.typed.chars().count() < cap {
            state.typed.push(c.to_ascii_uppercase());
        }
    }

    if input.was_pressed(KeyCode::Enter) && !state.typed.is_empty() {
        let outcome = judge(challenge, &state.typed);
        let text = feedback_text(mode, outcome, &state.typed);
        session.record(outcome);

        let tone = if outcome == Outcome::Correct {
            events.push(GameEvent::RoundCorrect);
            Tone::Good
        } else {
            events.push(GameEvent::RoundWrong);
            Tone::Bad
        };
        state.set_feedback(text, tone, config.pacing.feedback_ticks());
        state.phase = Phase::Feedback;
    }
}

// ── Memory board input ──

fn handle_board(
    state: &mut AppState,
    input: &InputState,
    events: &mut Vec<GameEvent>,
) {
    let Some(board) = state.board.as_mut() else {
        return;
    };

    let mut flash: Option<(&'static str, Tone)> = None;
    let mut done = false;

    for &(col, row) in input.clicks() {
        let Some(idx) = renderer::card_at(board.cards().len(), col, row) else {
            continue;
        };
        match board.select(idx) {
            Some(BoardEvent::PlayAudio(word)) => {
                if let Some(path) = state.audio_clips.get(&word) {
                    events.push(GameEvent::CardAudio(path.clone()));
                }
            }
            Some(BoardEvent::Matched) => {
                events.push(GameEvent::PairMatched);
                flash = Some(("Matched!", Tone::Good));
                if board.is_complete() {
                    done = true;
                }
            }
            Some(BoardEvent::TryAgain) => {
                events.push(GameEvent::PairMissed);
                flash = Some(("Try Again", Tone::Bad));
            }
            None => {}
        }
    }

    if let Some((text, tone)) = flash {
        state.set_message(text, tone, FLASH_TICKS);
    }
    if done {
        finish_memory(state, events);
    }
}

// ── Session completion ──

/// Wrap up a finished typed session: record the score, queue the
/// results popup, drop the transient state.
fn finish_session(state: &mut AppState, events: &mut Vec<GameEvent>) {
    let Some(game) = state.pending_game else {
        state.phase = Phase::Map;
        return;
    };
    let Some(session) = state.session.as_ref() else {
        state.phase = Phase::Map;
        return;
    };
    let correct = session.correct();
    let total = session.total();
    let accuracy = session.accuracy();

    record_result(state, game, accuracy);

    let passed = accuracy >= PASS_THRESHOLD;
    state.popup = if passed {
        vec![
            format!("Great job! {correct}/{total} correct."),
            "You passed!".to_string(),
        ]
    } else {
        vec![
            format!("You got {correct}/{total}."),
            "Try again next time.".to_string(),
        ]
    };
    events.push(if passed {
        GameEvent::SessionPassed
    } else {
        GameEvent::SessionFailed
    });

    state.clear_session();
    state.phase = Phase::Results;
}

fn finish_memory(state: &mut AppState, events: &mut Vec<GameEvent>) {
    let Some(game) = state.pending_game else {
        state.phase = Phase::Map;
        return;
    };
    let accuracy = state.board.as_ref().map_or(0.0, |b| b.accuracy());

    record_result(state, game, accuracy);

    state.popup = vec!["Great job! All matches completed.".to_string()];
    events.push(GameEvent::SessionPassed);

    state.clear_session();
    state.phase = Phase::Results;
}

/// Apply a session result to the one mutable profile and write it
/// through. Guest progress is kept in memory only.
fn record_result(state: &mut AppState, game: GameId, accuracy: f64) {
    state.profile.scores.insert(game, accuracy);
    if state.book.record(&state.profile).is_err() {
        state.set_message("Save failed!", Tone::Bad, MESSAGE_TICKS);
    }
}

/// A quit signal mid-session still records the partial accuracy of the
/// rounds actually played before the application unwinds.
fn abort_active_session(state: &mut AppState) {
    let Some(game) = state.pending_game else {
        return;
    };
    let accuracy = match state.phase {
        Phase::Round | Phase::Feedback => {
            state.session.as_ref().map(|s| s.accuracy())
        }
        Phase::MemoryBoard => state.board.as_ref().map(|b| b.accuracy()),
        _ => None,
    };
    if let Some(accuracy) = accuracy {
        record_result(state, game, accuracy);
    }
}
