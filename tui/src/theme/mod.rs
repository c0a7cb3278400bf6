//! Theme and Colors
//!
//! The coffee palette plus the layout constants the renderer needs. A
//! [`Theme`] is an immutable value handed to [`crate::render`]; nothing in
//! the render path reads global style state.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Coffee Palette
// ============================================================================

/// Accent - latte brown (titles, item names, price tag)
pub const ACCENT: Color = Color::Rgb(0xD4, 0xA3, 0x73);

/// Highlight - cream
pub const HIGHLIGHT: Color = Color::Rgb(0xFA, 0xED, 0xCD);

/// Special - green (order added)
pub const SPECIAL: Color = Color::Rgb(0x73, 0xAD, 0x21);

/// Subtle - borders and dividers
pub const SUBTLE: Color = Color::Rgb(0x38, 0x38, 0x38);

/// Dim - secondary text
pub const DIM: Color = Color::Rgb(0x77, 0x77, 0x77);

/// Price tag text
pub const PRICE_FG: Color = Color::Rgb(0x00, 0x00, 0x00);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

// ============================================================================
// Layout
// ============================================================================

/// Layout constants
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Minimum sidebar width in columns
    pub sidebar_min_width: u16,
    /// Sidebar share of the total width, in percent
    pub sidebar_percent: u16,
    /// Sidebar margin (horizontal, vertical)
    pub list_margin: (u16, u16),
    /// Detail pane padding (horizontal, vertical)
    pub detail_padding: (u16, u16),
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            sidebar_min_width: 35,
            sidebar_percent: 35,
            list_margin: (2, 1),
            detail_padding: (2, 1),
        }
    }
}

impl Layout {
    /// `max(min, percent% of width)`, never wider than the viewport
    pub fn sidebar_width(&self, total_width: u16) -> u16 {
        let share = (u32::from(total_width) * u32::from(self.sidebar_percent) / 100) as u16;
        share.max(self.sidebar_min_width).min(total_width)
    }
}

// ============================================================================
// Theme
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub highlight: Color,
    pub special: Color,
    pub subtle: Color,
    pub dim: Color,
    pub price_fg: Color,
    pub error: Color,
    pub layout: Layout,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: ACCENT,
            highlight: HIGHLIGHT,
            special: SPECIAL,
            subtle: SUBTLE,
            dim: DIM,
            price_fg: PRICE_FG,
            error: ERROR_RED,
            layout: Layout::default(),
        }
    }
}

impl Theme {
    /// List title: cream on latte
    pub fn title(&self) -> Style {
        Style::default().fg(self.highlight).bg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn subtle(&self) -> Style {
        Style::default().fg(self.subtle)
    }

    pub fn special(&self) -> Style {
        Style::default().fg(self.special)
    }

    pub fn price_tag(&self) -> Style {
        Style::default()
            .fg(self.price_fg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn plain(&self) -> Style {
        Style::default()
    }
}
