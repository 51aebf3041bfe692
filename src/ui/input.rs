/// Input event tracker.
///
/// Drains all pending terminal events once per frame, before dispatch.
/// Three views of the same frame:
///   - Edge-triggered key presses (menu navigation, SPACE, ENTER)
///   - The typed character stream, in arrival order (answer entry)
///   - Left-button clicks (memory-game card selection)

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};

pub struct InputState {
    pressed: Vec<KeyCode>,
    raw_events: Vec<KeyEvent>,
    clicks: Vec<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            pressed: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::with_capacity(4),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.pressed.clear();
        self.raw_events.clear();
        self.clicks.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    // Terminals with keyboard enhancement also report
                    // releases; only presses and repeats count here.
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    self.pressed.push(key.code);
                    self.raw_events.push(key);
                }
                Ok(Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                })) => {
                    self.clicks.push((column, row));
                }
                _ => {}
            }
        }
    }

    /// Was this key pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Left-button clicks this frame, as (column, row).
    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    /// Letters typed this frame, in arrival order. Control-modified
    /// keys are not text.
    pub fn typed_letters(&self) -> impl Iterator<Item = char> + '_ {
        self.raw_events.iter().filter_map(|k| match k.code {
            KeyCode::Char(c)
                if c.is_ascii_alphabetic()
                    && !k.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(c)
            }
            _ => None,
        })
    }

    /// Printable characters for the name prompt.
    pub fn typed_printable(&self) -> impl Iterator<Item = char> + '_ {
        self.raw_events.iter().filter_map(|k| match k.code {
            KeyCode::Char(c)
                if (c.is_ascii_graphic() || c == ' ')
                    && !k.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                Some(c)
            }
            _ => None,
        })
    }

    /// Check if any raw event this frame has Ctrl+C.
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
