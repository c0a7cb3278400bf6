//! Input translation
//!
//! Two sources feed a session:
//!
//! - **Local**: crossterm [`Event`]s from the controlling terminal
//! - **Served**: raw bytes from a TCP peer, decoded by [`InputDecoder`]
//!
//! Both produce [`SessionEvent`]s, so the session never knows which surface
//! it is running on.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use catalog_core::{KeyInput, SessionEvent};

/// Map one crossterm key event. Only presses count.
pub fn map_key_event(key: &KeyEvent) -> Option<KeyInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(KeyInput::Interrupt),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(' ') => Some(KeyInput::Space),
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Esc => Some(KeyInput::Esc),
        _ => None,
    }
}

/// Map a terminal event to a session event (keys and resizes only)
pub fn map_terminal_event(event: &Event) -> Option<SessionEvent> {
    match event {
        Event::Key(key) => map_key_event(key).map(SessionEvent::Key),
        Event::Resize(width, height) => Some(SessionEvent::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

// ============================================================================
// Byte stream decoding
// ============================================================================

const ESC: u8 = 0x1b;

/// Telnet "interpret as command"
const IAC: u8 = 0xff;
const SB: u8 = 250;
const SE: u8 = 240;
const WILL: u8 = 251;
const DONT: u8 = 254;
/// Telnet window size option
const NAWS: u8 = 31;

/// Longest CSI body we wait for before giving up on it
const MAX_CSI_LEN: usize = 32;

/// Longest telnet subnegotiation payload we wait for before dropping it
const MAX_SUBNEG_LEN: usize = 64;

/// Reported sizes are clamped to this many cells per side
pub const MAX_DIMENSION: u16 = 1000;

enum Step {
    Emit(SessionEvent, usize),
    Skip(usize),
    Incomplete,
}

/// Incremental decoder for a raw terminal byte stream
///
/// Understands arrow keys (`ESC [ A`, `ESC O A`), Enter in its CR, LF and
/// CRLF forms, DEL/BS, Ctrl+C, a lone ESC, UTF-8 text, the xterm window
/// size report (`ESC [ 8 ; rows ; cols t`) and telnet negotiation,
/// including NAWS size reports. Partial sequences are held until the next
/// chunk arrives.
#[derive(Debug, Default)]
pub struct InputDecoder {
    pending: Vec<u8>,
    after_cr: bool,
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning every complete event it finishes
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SessionEvent> {
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut pos = 0;
        while pos < self.pending.len() {
            let rest = &self.pending[pos..];

            // CRLF and CR NUL are a single Enter
            if self.after_cr {
                self.after_cr = false;
                if rest[0] == b'\n' || rest[0] == 0 {
                    pos += 1;
                    continue;
                }
            }

            match step(rest) {
                Step::Emit(event, used) => {
                    self.after_cr = rest[0] == b'\r';
                    events.push(event);
                    pos += used;
                }
                Step::Skip(used) => pos += used,
                Step::Incomplete => break,
            }
        }

        self.pending.drain(..pos);
        events
    }

    /// Bytes held back waiting for the rest of a sequence
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn key(input: KeyInput, used: usize) -> Step {
    Step::Emit(SessionEvent::Key(input), used)
}

fn step(buf: &[u8]) -> Step {
    match buf[0] {
        ESC => escape(buf),
        IAC => telnet(buf),
        b'\r' | b'\n' => key(KeyInput::Enter, 1),
        0x7f | 0x08 => key(KeyInput::Backspace, 1),
        0x03 => key(KeyInput::Interrupt, 1),
        b' ' => key(KeyInput::Space, 1),
        b if b < 0x20 => Step::Skip(1),
        b if b < 0x80 => key(KeyInput::Char(char::from(b)), 1),
        b => utf8(buf, b),
    }
}

fn escape(buf: &[u8]) -> Step {
    // A lone ESC at the end of a read is the Esc key
    let Some(&intro) = buf.get(1) else {
        return key(KeyInput::Esc, 1);
    };

    match intro {
        b'[' => csi(buf),
        b'O' => match buf.get(2) {
            None => Step::Incomplete,
            Some(b'A') => key(KeyInput::Up, 3),
            Some(b'B') => key(KeyInput::Down, 3),
            Some(_) => Step::Skip(3),
        },
        _ => key(KeyInput::Esc, 1),
    }
}

fn csi(buf: &[u8]) -> Step {
    let body = &buf[2..];
    let Some(end) = body.iter().position(|b| (0x40..=0x7e).contains(b)) else {
        return if body.len() > MAX_CSI_LEN {
            Step::Skip(buf.len())
        } else {
            Step::Incomplete
        };
    };

    let used = 2 + end + 1;
    let params = &body[..end];
    match body[end] {
        b'A' => key(KeyInput::Up, used),
        b'B' => key(KeyInput::Down, used),
        b't' => match parse_size_report(params) {
            Some((width, height)) => Step::Emit(resize(width, height), used),
            None => Step::Skip(used),
        },
        _ => Step::Skip(used),
    }
}

fn resize(width: u16, height: u16) -> SessionEvent {
    SessionEvent::Resize {
        width: width.min(MAX_DIMENSION),
        height: height.min(MAX_DIMENSION),
    }
}

/// `8;rows;cols` from an xterm text area size report
fn parse_size_report(params: &[u8]) -> Option<(u16, u16)> {
    let params = std::str::from_utf8(params).ok()?;
    let mut parts = params.split(';');
    if parts.next()? != "8" {
        return None;
    }
    let rows = parts.next()?.parse().ok()?;
    let cols = parts.next()?.parse().ok()?;
    Some((cols, rows))
}

fn telnet(buf: &[u8]) -> Step {
    let Some(&command) = buf.get(1) else {
        return Step::Incomplete;
    };

    match command {
        WILL..=DONT if buf.len() < 3 => Step::Incomplete,
        WILL..=DONT => Step::Skip(3),
        SB => {
            let Some(end) = buf[2..].windows(2).position(|w| w == [IAC, SE]) else {
                // Unterminated: drop the header and the capped payload
                return if buf.len() - 2 > MAX_SUBNEG_LEN {
                    Step::Skip(2 + MAX_SUBNEG_LEN)
                } else {
                    Step::Incomplete
                };
            };
            let payload = &buf[2..2 + end];
            let used = 2 + end + 2;
            match payload {
                [NAWS, w_hi, w_lo, h_hi, h_lo] => Step::Emit(
                    resize(
                        u16::from_be_bytes([*w_hi, *w_lo]),
                        u16::from_be_bytes([*h_hi, *h_lo]),
                    ),
                    used,
                ),
                _ => Step::Skip(used),
            }
        }
        _ => Step::Skip(2),
    }
}

fn utf8(buf: &[u8], lead: u8) -> Step {
    let len = match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Step::Skip(1),
    };
    if buf.len() < len {
        return Step::Incomplete;
    }

    match std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
    {
        Some(c) => key(KeyInput::Char(c), len),
        None => Step::Skip(1),
    }
}

/// Telnet negotiation sent to a new peer: server echoes, no go-ahead,
/// and please report window size
pub const TELNET_PRELUDE: &[u8] = &[IAC, WILL, 1, IAC, WILL, 3, IAC, 253, NAWS];

/// Ask the peer terminal for its text area size in characters
pub const SIZE_QUERY: &[u8] = b"\x1b[18t";
