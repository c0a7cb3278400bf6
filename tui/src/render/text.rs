//! Text layout helpers
//!
//! Descriptions go through three passes before they reach the buffer:
//!
//! 1. Arabic script is shaped into presentation forms (joining and lam-alef
//!    ligatures), since terminals draw one glyph per cell
//! 2. The shaped text is wrapped by display width
//! 3. Each wrapped line is reordered with the Unicode bidirectional algorithm,
//!    so right-to-left runs come out in visual order once the terminal writes
//!    the cells left to right

use std::borrow::Cow;

use ar_reshaper::reshape_line;
use unicode_bidi::BidiInfo;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width in terminal columns
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Wrap `text` to `width` columns, keeping explicit line breaks
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }

    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, width)
                    .into_iter()
                    .map(Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

/// Shape Arabic script in one logical line into presentation forms
pub fn shape(line: &str) -> Cow<'_, str> {
    if !line.chars().any(is_arabic) {
        return Cow::Borrowed(line);
    }
    Cow::Owned(reshape_line(line))
}

fn is_arabic(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
}

/// Reorder one line from logical to visual order
pub fn visual_order(line: &str) -> Cow<'_, str> {
    if line.is_empty() {
        return Cow::Borrowed(line);
    }

    let info = BidiInfo::new(line, None);
    if !info.has_rtl() {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len());
    for para in &info.paragraphs {
        let range = para.range.clone();
        out.push_str(&info.reorder_line(para, range));
    }
    Cow::Owned(out)
}

/// Shape, wrap by the shaped width, then reorder each line for display
pub fn wrap_for_display(text: &str, width: usize) -> Vec<String> {
    let shaped = text.lines().map(shape).collect::<Vec<_>>().join("\n");
    wrap(&shaped, width)
        .into_iter()
        .map(|line| visual_order(&line).into_owned())
        .collect()
}

/// Cut `s` to at most `width` columns, ending with `…` when cut
pub fn truncate(s: &str, width: usize) -> Cow<'_, str> {
    if display_width(s) <= width {
        return Cow::Borrowed(s);
    }
    if width == 0 {
        return Cow::Borrowed("");
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    Cow::Owned(out)
}

/// Left offset that centers `s` in `width` columns
pub fn centered_x(s: &str, width: u16) -> u16 {
    let w = display_width(s).min(usize::from(width)) as u16;
    (width - w) / 2
}
