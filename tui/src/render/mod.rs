//! Session Renderer
//!
//! [`render`] is a pure function of the session, the theme and the animation
//! tick. It produces a fresh [`Buffer`] the size of the session's viewport;
//! surfaces copy that buffer into whatever terminal they drive.
//!
//! # Ready layout
//!
//! ```text
//! ┌ sidebar (max(35, 35%)) ─────────┬ detail ───────────────────────────┐
//! │  Coffee Menu                    │  Midnight Blend  ✔ ORDER ADDED    │
//! │  4 items                        │  Ethiopia / Brazil | Dark Roast   │
//! │                                 │  ------------------------------   │
//! │ │ [x] Midnight Blend            │                                   │
//! │ │     $18.50 | Ethiopia / Brazil│  Notes of dark chocolate and ...  │
//! │                                 │                                   │
//! │   [ ] Golden Hour               │   PRICE: $18.50                   │
//! │       $22.00 | Colombia         │                                   │
//! │  1 selected                     │                                   │
//! │  ↑/k up • ↓/j down • ...        │                                   │
//! └─────────────────────────────────┴───────────────────────────────────┘
//! ```

pub mod text;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use catalog_core::{FetchError, Item, Session, SessionMode};

use crate::spinner;
use crate::theme::Theme;

use self::text::{centered_x, truncate, wrap_for_display};

/// Rows per list entry: title, description, gap
const ITEM_HEIGHT: u16 = 3;

/// Rows the sidebar reserves above the list: title, status, gap
const SIDEBAR_HEADER: u16 = 3;

/// Rows the sidebar reserves below the list: selection/pages, help
const SIDEBAR_FOOTER: u16 = 2;

const LOADING_TEXT: &str = "Brewing connection...";

const BROWSE_HELP: &str = "↑/k up • ↓/j down • space select • / filter • r refresh • q quit";
const FILTER_HELP: &str = "type to filter • enter apply • esc cancel";

/// Render one frame for `session`
pub fn render(session: &Session, theme: &Theme, tick: u64) -> Buffer {
    let viewport = session.viewport();
    let area = Rect::new(0, 0, viewport.width, viewport.height);
    let mut buf = Buffer::empty(area);

    match session.mode() {
        SessionMode::Loading => render_loading(&mut buf, theme, tick),
        SessionMode::Failed(error) => render_failed(&mut buf, theme, error),
        SessionMode::Ready => {
            let sidebar_width = theme.layout.sidebar_width(area.width);
            render_sidebar(&mut buf, session, theme, sidebar_width);
            render_detail(&mut buf, session, theme, sidebar_width);
        }
    }

    buf
}

/// Buffer contents as text rows, trailing blanks trimmed
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let row: String = (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect();
            row.trim_end().to_string()
        })
        .collect()
}

/// Bounds-checked `set_stringn`; returns the x after the last written cell
fn put(buf: &mut Buffer, x: u16, y: u16, s: &str, max_width: u16, style: Style) -> u16 {
    let area = buf.area;
    if y >= area.bottom() || x >= area.right() || max_width == 0 {
        return x;
    }
    let (end_x, _) = buf.set_stringn(x, y, s, usize::from(max_width), style);
    end_x
}

fn put_centered(buf: &mut Buffer, y: u16, s: &str, style: Style) {
    let width = buf.area.width;
    let line = truncate(s, usize::from(width));
    put(buf, centered_x(&line, width), y, &line, width, style);
}

// ============================================================================
// Loading / Failed
// ============================================================================

fn render_loading(buf: &mut Buffer, theme: &Theme, tick: u64) {
    let area = buf.area;
    let frame = spinner::DOT.frame(tick);
    let line = format!("{frame} {LOADING_TEXT}");

    let y = area.height / 2;
    let x = centered_x(&line, area.width);
    let after_spinner = put(buf, x, y, frame, area.width.saturating_sub(x), theme.accent_bold());
    let rest_x = after_spinner.saturating_add(1);
    put(
        buf,
        rest_x,
        y,
        LOADING_TEXT,
        area.width.saturating_sub(rest_x),
        theme.plain(),
    );
}

fn render_failed(buf: &mut Buffer, theme: &Theme, error: &FetchError) {
    let area = buf.area;
    let top = (area.height / 2).saturating_sub(2);

    put_centered(buf, top, &format!("Error: {}", error.user_message()), theme.error());
    let detail_width = usize::from(area.width.saturating_sub(4));
    put_centered(buf, top + 1, &truncate(error.detail(), detail_width), theme.dim());
    put_centered(buf, top + 3, "Press r to retry or q to quit", theme.dim());
}

// ============================================================================
// Sidebar
// ============================================================================

fn render_sidebar(buf: &mut Buffer, session: &Session, theme: &Theme, sidebar_width: u16) {
    let (margin_x, margin_y) = theme.layout.list_margin;
    let inner = Rect::new(
        margin_x,
        margin_y,
        sidebar_width.saturating_sub(margin_x * 2),
        buf.area.height.saturating_sub(margin_y * 2),
    );
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let list = session.list();

    // Title
    put(buf, inner.x, inner.y, " Coffee Menu ", inner.width, theme.title());

    // Status / filter line
    let status_y = inner.y + 1;
    if list.is_filtering() {
        let x = put(buf, inner.x, status_y, "Filter: ", inner.width, theme.dim());
        let remaining = inner.right().saturating_sub(x);
        let x = put(buf, x, status_y, list.filter_text(), remaining, theme.plain());
        put(buf, x, status_y, "█", inner.right().saturating_sub(x), theme.accent_bold());
    } else if list.has_filter() {
        let status = format!(
            "Filter: \"{}\" · {} of {}",
            list.filter_text(),
            list.visible_len(),
            list.total_len()
        );
        let status = truncate(&status, usize::from(inner.width));
        put(buf, inner.x, status_y, &status, inner.width, theme.dim());
    } else {
        let status = match list.total_len() {
            1 => "1 item".to_string(),
            n => format!("{n} items"),
        };
        put(buf, inner.x, status_y, &status, inner.width, theme.dim());
    }

    // List
    let list_area = Rect::new(
        inner.x,
        inner.y + SIDEBAR_HEADER,
        inner.width,
        inner.height.saturating_sub(SIDEBAR_HEADER + SIDEBAR_FOOTER),
    );
    let pages = render_items(buf, session, theme, list_area);

    // Footer: pages and selection count
    let footer_y = inner.bottom().saturating_sub(SIDEBAR_FOOTER);
    if footer_y >= list_area.y {
        let mut x = inner.x;
        if let Some((page, total)) = pages.filter(|&(_, total)| total > 1) {
            for p in 0..total {
                let style = if p == page { theme.plain() } else { theme.subtle() };
                x = put(buf, x, footer_y, "•", inner.right().saturating_sub(x), style);
            }
            x = x.saturating_add(2);
        }
        let selected = session.selection().len();
        if selected > 0 {
            let label = format!("{selected} selected");
            put(buf, x, footer_y, &label, inner.right().saturating_sub(x), theme.special());
        }

        let help = if list.is_filtering() { FILTER_HELP } else { BROWSE_HELP };
        let help = truncate(help, usize::from(inner.width));
        put(buf, inner.x, footer_y + 1, &help, inner.width, theme.dim());
    }
}

/// Draw the page holding the cursor. Returns `(page, page_count)`.
fn render_items(
    buf: &mut Buffer,
    session: &Session,
    theme: &Theme,
    area: Rect,
) -> Option<(usize, usize)> {
    let list = session.list();
    if area.height == 0 || area.width == 0 {
        return None;
    }

    if list.visible_len() == 0 {
        let message = if list.total_len() == 0 {
            "No items."
        } else {
            "No items match."
        };
        put(buf, area.x, area.y, message, area.width, theme.dim());
        return None;
    }

    // The last entry on a page does not need its gap row
    let per_page = usize::from((area.height + 1) / ITEM_HEIGHT).max(1);
    let page = list.cursor() / per_page;
    let page_count = list.visible_len().div_ceil(per_page);
    let first = page * per_page;

    for (row, item) in list.visible_items().skip(first).take(per_page).enumerate() {
        let y = area.y + row as u16 * ITEM_HEIGHT;
        let focused = first + row == list.cursor();
        let selected = session.is_selected(&item.id);
        render_item(buf, theme, item, area, y, focused, selected);
    }

    Some((page, page_count))
}

fn render_item(
    buf: &mut Buffer,
    theme: &Theme,
    item: &Item,
    area: Rect,
    y: u16,
    focused: bool,
    selected: bool,
) {
    let (marker, name_style, summary_style) = if focused {
        ("│ ", theme.accent_bold(), Style::default().fg(theme.accent))
    } else {
        ("  ", theme.plain(), theme.dim())
    };
    let checkbox = if selected { "[x] " } else { "[ ] " };

    let right = area.right();
    if y < area.bottom() {
        let x = put(buf, area.x, y, marker, area.width, theme.accent_bold());
        let check_style = if selected { theme.special() } else { theme.dim() };
        let x = put(buf, x, y, checkbox, right.saturating_sub(x), check_style);
        let name = truncate(&item.name, usize::from(right.saturating_sub(x)));
        put(buf, x, y, &name, right.saturating_sub(x), name_style);
    }

    let y = y + 1;
    if y < area.bottom() {
        let x = put(buf, area.x, y, marker, area.width, theme.accent_bold());
        let x = x.saturating_add(4);
        let summary_text = item.summary();
        let summary = truncate(&summary_text, usize::from(right.saturating_sub(x)));
        put(buf, x, y, &summary, right.saturating_sub(x), summary_style);
    }
}

// ============================================================================
// Detail
// ============================================================================

fn render_detail(buf: &mut Buffer, session: &Session, theme: &Theme, sidebar_width: u16) {
    let area = buf.area;
    if sidebar_width >= area.width {
        return;
    }

    // Left border
    for y in area.top()..area.bottom() {
        put(buf, sidebar_width, y, "│", 1, theme.subtle());
    }

    let (pad_x, pad_y) = theme.layout.detail_padding;
    let content_x = sidebar_width + 1 + pad_x;
    let content = Rect::new(
        content_x,
        pad_y,
        area.width.saturating_sub(content_x + pad_x),
        area.height.saturating_sub(pad_y * 2),
    );
    if content.width == 0 || content.height == 0 {
        return;
    }

    let lines = match session.current_item() {
        Some(item) => detail_lines(item, session.is_selected(&item.id), theme, content.width),
        None => empty_lines(session, theme),
    };

    for (row, segments) in lines.into_iter().take(usize::from(content.height)).enumerate() {
        let y = content.y + row as u16;
        let mut x = content.x;
        for (text, style) in segments {
            x = put(buf, x, y, &text, content.right().saturating_sub(x), style);
        }
    }
}

type Line = Vec<(String, Style)>;

fn detail_lines(item: &Item, selected: bool, theme: &Theme, width: u16) -> Vec<Line> {
    let width_cols = usize::from(width);

    let mut header = vec![(truncate(&item.name, width_cols).into_owned(), theme.accent_bold())];
    if selected {
        header.push(("  ".to_string(), theme.plain()));
        header.push(("✔ ORDER ADDED".to_string(), theme.special()));
    }

    let mut lines = vec![
        header,
        vec![(
            format!("{} | {} Roast", item.origin, item.roast),
            theme.dim(),
        )],
        vec![("-".repeat(width_cols), theme.subtle())],
        Vec::new(),
    ];

    lines.extend(
        wrap_for_display(&item.description, width_cols)
            .into_iter()
            .map(|line| vec![(line, theme.plain())]),
    );

    lines.push(Vec::new());
    lines.push(vec![(
        format!(" PRICE: {} ", item.price_label()),
        theme.price_tag(),
    )]);
    lines
}

fn empty_lines(session: &Session, theme: &Theme) -> Vec<Line> {
    let (headline, hint) = if session.list().total_len() == 0 {
        ("The catalog is empty.", "Press r to refresh.")
    } else {
        (
            "No items match the filter.",
            "Press / to edit it or esc to clear it.",
        )
    };
    vec![
        vec![(headline.to_string(), theme.accent_bold())],
        Vec::new(),
        vec![(hint.to_string(), theme.dim())],
    ]
}
