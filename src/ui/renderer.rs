/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws. Each phase
/// has its own draw function; the picture an image round would show is
/// stood in for by a framed slot naming the image file.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::board::{CardKind, MatchBoard};
use crate::domain::challenge::{Challenge, Mode};
use crate::game::state::{AppState, Phase, Tone};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const TEXT: Color = Color::Rgb { r: 220, g: 220, b: 230 };
const DIM: Color = Color::Rgb { r: 130, g: 130, b: 150 };
const TITLE: Color = Color::Rgb { r: 255, g: 210, b: 80 };
const PROMPT: Color = Color::Rgb { r: 110, g: 170, b: 255 };
const GOOD: Color = Color::Rgb { r: 90, g: 220, b: 110 };
const BAD: Color = Color::Rgb { r: 235, g: 90, b: 90 };
const CARD_BG: Color = Color::Rgb { r: 45, g: 45, b: 75 };
const CARD_DONE_BG: Color = Color::Rgb { r: 25, g: 70, b: 35 };

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Info => TEXT,
        Tone::Good => GOOD,
        Tone::Bad => BAD,
    }
}

// ── Card grid geometry (shared with the click hit-test) ──

pub const CARD_W: usize = 13;
pub const CARD_H: usize = 3;
pub const CARD_GAP: usize = 2;
pub const BOARD_LEFT: usize = 2;
pub const BOARD_TOP: usize = 5;

pub fn card_cols(card_count: usize) -> usize {
    card_count.clamp(1, 6)
}

/// Top-left of card `i`, in terminal columns/rows.
pub fn card_origin(i: usize, cols: usize) -> (usize, usize) {
    let row = i / cols;
    let col = i % cols;
    (
        BOARD_LEFT + col * (CARD_W + CARD_GAP),
        BOARD_TOP + row * (CARD_H + CARD_GAP),
    )
}

/// Which card, if any, is under a terminal position.
pub fn card_at(card_count: usize, column: u16, row: u16) -> Option<usize> {
    let (cx, cy) = (column as usize, row as usize);
    let cols = card_cols(card_count);
    for i in 0..card_count {
        let (x, y) = card_origin(i, cols);
        if cx >= x && cx < x + CARD_W && cy >= y && cy < y + CARD_H {
            return Some(i);
        }
    }
    None
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: TEXT, bg: BASE_BG };

    /// Sentinel used to invalidate the back buffer: different from any
    /// real cell, so every position gets diff'd on the next frame.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }

    /// Write a string centered on row `y`.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    /// Single-line frame around a region.
    fn draw_frame(&mut self, x: usize, y: usize, w: usize, h: usize, fg: Color, bg: Color) {
        if w < 2 || h < 2 {
            return;
        }
        for cx in x..x + w {
            self.set(cx, y, Cell { ch: '─', fg, bg });
            self.set(cx, y + h - 1, Cell { ch: '─', fg, bg });
        }
        for cy in y..y + h {
            self.set(x, cy, Cell { ch: '│', fg, bg });
            self.set(x + w - 1, cy, Cell { ch: '│', fg, bg });
        }
        self.set(x, y, Cell { ch: '┌', fg, bg });
        self.set(x + w - 1, y, Cell { ch: '┐', fg, bg });
        self.set(x, y + h - 1, Cell { ch: '└', fg, bg });
        self.set(x + w - 1, y + h - 1, Cell { ch: '┘', fg, bg });
    }

    /// Solid background for a region.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for cy in y..y + h {
            for cx in x..x + w {
                self.set(cx, cy, Cell { ch: ' ', fg: TEXT, bg });
            }
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All),
        )?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen,
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn render(&mut self, state: &AppState) -> io::Result<()> {
        let (w, h) = terminal::size()?;
        let (w, h) = (w as usize, h as usize);
        if w != self.term_w || h != self.term_h {
            self.term_w = w;
            self.term_h = h;
            self.front.resize(w, h);
            self.back.resize(w, h);
            self.back.invalidate();
            queue!(
                self.writer,
                SetBackgroundColor(BASE_BG),
                Clear(ClearType::All),
            )?;
        }

        // Phase changes redraw everything; screens share little layout.
        if self.last_phase != Some(state.phase) {
            self.last_phase = Some(state.phase);
            self.back.invalidate();
        }

        self.front.clear();
        match state.phase {
            Phase::Start => draw_start(&mut self.front),
            Phase::NamePrompt => draw_name_prompt(&mut self.front, state),
            Phase::Welcome | Phase::Locked | Phase::Instructions | Phase::Results => {
                draw_popup(&mut self.front, state)
            }
            Phase::Map => draw_map(&mut self.front, state),
            Phase::GradeSelect => draw_grade_select(&mut self.front, state),
            Phase::Round | Phase::Feedback => draw_round(&mut self.front, state),
            Phase::MemoryBoard => draw_board(&mut self.front, state),
        }
        draw_message_line(&mut self.front, state);

        self.flush_diff()
    }

    /// Emit only the cells that changed since the previous frame.
    fn flush_diff(&mut self) -> io::Result<()> {
        let mut cur_fg = None;
        let mut cur_bg = None;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                queue!(self.writer, MoveTo(x as u16, y as u16))?;
                if cur_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    cur_fg = Some(cell.fg);
                }
                if cur_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    cur_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.ch))?;
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

// ── Screens ──

fn draw_start(fb: &mut FrameBuffer) {
    let mid = fb.height / 2;
    fb.put_centered(mid.saturating_sub(5), "L U C K Y   L E T T E R S", TITLE, BASE_BG);
    fb.put_centered(mid.saturating_sub(3), "a word adventure", DIM, BASE_BG);
    fb.put_centered(mid, "1) Sign in", TEXT, BASE_BG);
    fb.put_centered(mid + 2, "2) Play as guest", TEXT, BASE_BG);
    footer(fb, "ESC to quit");
}

fn draw_name_prompt(fb: &mut FrameBuffer, state: &AppState) {
    let mid = fb.height / 2;
    fb.put_centered(mid.saturating_sub(4), "What is your name?", PROMPT, BASE_BG);

    let box_w = state.name_input.chars().count().max(16) + 4;
    let x = fb.width.saturating_sub(box_w) / 2;
    fb.draw_frame(x, mid.saturating_sub(1), box_w, 3, PROMPT, BASE_BG);

    // Blinking cursor after the typed text.
    let blink_on = (state.anim_tick / 8) % 2 == 0;
    let shown = if blink_on {
        format!("{}_", state.name_input)
    } else {
        state.name_input.clone()
    };
    fb.put_str(x + 2, mid, &shown, TEXT, BASE_BG);

    footer(fb, "ENTER to continue");
}

fn draw_popup(fb: &mut FrameBuffer, state: &AppState) {
    let total = state.popup.len() * 2;
    let mut y = fb.height.saturating_sub(total) / 2;
    for line in &state.popup {
        fb.put_centered(y, line, TEXT, BASE_BG);
        y += 2;
    }
    footer(fb, "Press SPACE to continue");
}

fn draw_map(fb: &mut FrameBuffer, state: &AppState) {
    fb.put_centered(1, "ADVENTURE MAP", TITLE, BASE_BG);
    fb.put_centered(2, &format!("Player: {}", state.profile.username), DIM, BASE_BG);

    let mut y = fb.height / 2;
    y = y.saturating_sub(4);
    for (i, game) in crate::domain::progress::GameId::ALL.iter().enumerate() {
        let unlocked = state.profile.is_unlocked(*game);
        let best = state.profile.score(*game);
        let line = if unlocked {
            format!("{}) {:<16} best {:>3.0}%", i + 1, game.title(), best * 100.0)
        } else {
            format!("{}) {:<16} [locked]", i + 1, game.title())
        };
        let color = if unlocked { TEXT } else { DIM };
        fb.put_centered(y, &line, color, BASE_BG);
        y += 2;
    }

    footer(fb, "Press 1-4 to play, ESC to quit");
}

fn draw_grade_select(fb: &mut FrameBuffer, state: &AppState) {
    if let Some(game) = state.pending_game {
        fb.put_centered(1, game.title(), TITLE, BASE_BG);
    }
    let mid = fb.height / 2;
    fb.put_centered(mid.saturating_sub(3), "Choose your level:", PROMPT, BASE_BG);
    fb.put_centered(mid, "1) K-1", TEXT, BASE_BG);
    fb.put_centered(mid + 2, "2) Grade 2-3", TEXT, BASE_BG);
}

fn draw_round(fb: &mut FrameBuffer, state: &AppState) {
    let session = match &state.session {
        Some(s) => s,
        None => return,
    };
    // During the feedback freeze the judged challenge stays on screen.
    let (challenge, round_no) = if state.phase == Phase::Feedback {
        match session.last_judged() {
            Some((c, _)) => (c, session.attempted()),
            None => return,
        }
    } else {
        match session.current() {
            Some(c) => (c, session.attempted() + 1),
            None => return,
        }
    };

    if let Some(game) = state.pending_game {
        fb.put_centered(1, game.title(), TITLE, BASE_BG);
    }
    fb.put_centered(
        2,
        &format!(
            "Round {}/{}   Score: {}",
            round_no,
            session.total(),
            session.correct()
        ),
        DIM,
        BASE_BG,
    );

    let mid = fb.height / 2;
    draw_challenge(fb, challenge, mid);

    // Typed input with a cursor slot.
    let typed = format!("> {}_", state.typed);
    fb.put_centered(mid + 5, &typed, TEXT, BASE_BG);

    if !state.feedback.is_empty() {
        fb.put_centered(mid + 7, &state.feedback, tone_color(state.feedback_tone), BASE_BG);
    }

    footer(fb, "Type your answer, ENTER to submit");
}

fn draw_challenge(fb: &mut FrameBuffer, challenge: &Challenge, mid: usize) {
    match challenge.mode {
        Mode::LetterFill | Mode::PhonemeFill => {
            fb.put_centered(mid.saturating_sub(6), "Fill in the missing part", PROMPT, BASE_BG);
            fb.put_centered(mid.saturating_sub(5), "Then press ENTER:", PROMPT, BASE_BG);
            fb.put_centered(mid.saturating_sub(2), &spaced(&challenge.prompt), TITLE, BASE_BG);
            draw_options(fb, &challenge.options, mid + 1);
        }
        Mode::ImageToLetter | Mode::ImageToWord => {
            let instruction = if challenge.mode == Mode::ImageToLetter {
                "Type the letter this image starts with:"
            } else {
                "Spell the word shown in the image:"
            };
            draw_image_slot(fb, challenge, mid.saturating_sub(6));
            fb.put_centered(mid + 3, instruction, PROMPT, BASE_BG);
        }
        Mode::Unscramble => {
            fb.put_centered(
                mid.saturating_sub(4),
                &format!("Unscramble: {}", spaced(&challenge.prompt)),
                PROMPT,
                BASE_BG,
            );
        }
    }
}

/// The terminal stand-in for a picture: a framed slot naming the file.
fn draw_image_slot(fb: &mut FrameBuffer, challenge: &Challenge, top: usize) {
    let name = challenge
        .image
        .as_deref()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("picture");
    let w = name.chars().count().max(18) + 6;
    let x = fb.width.saturating_sub(w) / 2;
    fb.draw_frame(x, top, w, 5, DIM, BASE_BG);
    fb.put_centered(top + 1, "( picture )", DIM, BASE_BG);
    fb.put_centered(top + 3, name, TEXT, BASE_BG);
}

fn draw_options(fb: &mut FrameBuffer, options: &[String], y: usize) {
    if options.is_empty() {
        return;
    }
    let box_w = options
        .iter()
        .map(|o| o.chars().count())
        .max()
        .unwrap_or(1)
        + 4;
    let total = options.len() * box_w + (options.len() - 1) * 3;
    let mut x = fb.width.saturating_sub(total) / 2;
    for opt in options {
        fb.draw_frame(x, y, box_w, 3, PROMPT, BASE_BG);
        let pad = (box_w - opt.chars().count()) / 2;
        fb.put_str(x + pad, y + 1, opt, TEXT, BASE_BG);
        x += box_w + 3;
    }
}

fn draw_board(fb: &mut FrameBuffer, state: &AppState) {
    let board = match &state.board {
        Some(b) => b,
        None => return,
    };
    fb.put_centered(1, "MEMORY MATCH", TITLE, BASE_BG);
    fb.put_centered(
        2,
        &format!("Matched {}/{}", board.matched_words(), board.word_count()),
        DIM,
        BASE_BG,
    );
    fb.put_centered(3, "Click a sound card, then the word that matches", DIM, BASE_BG);

    draw_cards(fb, board);
    footer(fb, "ESC to stop (progress is saved)");
}

fn draw_cards(fb: &mut FrameBuffer, board: &MatchBoard) {
    let cols = card_cols(board.cards().len());
    for (i, card) in board.cards().iter().enumerate() {
        let (x, y) = card_origin(i, cols);
        let bg = if card.matched { CARD_DONE_BG } else { CARD_BG };
        let frame = if board.selected_audio() == Some(i) {
            TITLE
        } else if card.matched {
            GOOD
        } else {
            DIM
        };
        fb.fill_rect(x, y, CARD_W, CARD_H, bg);
        fb.draw_frame(x, y, CARD_W, CARD_H, frame, bg);

        let label = match card.kind {
            CardKind::Audio => "~ sound ~".to_string(),
            CardKind::Word => card.word.clone(),
        };
        let pad = CARD_W.saturating_sub(label.chars().count()) / 2;
        fb.put_str(x + pad, y + 1, &label, TEXT, bg);
    }
}

fn draw_message_line(fb: &mut FrameBuffer, state: &AppState) {
    if state.message.is_empty() {
        return;
    }
    let y = fb.height.saturating_sub(1);
    fb.put_centered(y, &state.message, tone_color(state.message_tone), BASE_BG);
}

fn footer(fb: &mut FrameBuffer, hint: &str) {
    let y = fb.height.saturating_sub(2);
    fb.put_centered(y, hint, DIM, BASE_BG);
}

/// Letter-spaced display for short prompts ("S_N" -> "S _ N").
fn spaced(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for (i, c) in s.chars().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
