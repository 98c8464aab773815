//! Table cells, colors and fixed-width layout
//!
//! Every value that ends up in a table column goes through [`Cell`], which keeps
//! the visible text separate from its color. Widths are therefore always measured
//! on what the user sees, so alignment is identical with and without color.

use owo_colors::OwoColorize;

/// Layout constants for the node table
pub mod layout {
    pub const NODE_WIDTH: usize = 14;
    pub const STATE_WIDTH: usize = 10;
    pub const PROCS_WIDTH: usize = 12;

    /// Column widths in display order (node, state, procs)
    pub const COLUMN_WIDTHS: [usize; 3] = [NODE_WIDTH, STATE_WIDTH, PROCS_WIDTH];
}

/// Named colors used by the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Black,
    Bold,
}

/// Maps [`Color`] to terminal escape sequences, or to nothing when disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Wrap `text` in the start sequence for `color` and a reset sequence.
    ///
    /// With color disabled the text is returned unchanged.
    #[must_use]
    pub fn paint(&self, text: &str, color: Color) -> String {
        if !self.enabled {
            return text.to_string();
        }

        match color {
            Color::Red => text.bright_red().to_string(),
            Color::Green => text.bright_green().to_string(),
            Color::Yellow => text.bright_yellow().to_string(),
            Color::Black => text.bright_black().to_string(),
            Color::Bold => text.bold().to_string(),
        }
    }
}

/// One table value: plain text, colored text, or a sequence of both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Colored { text: String, color: Color },
    Joined(Vec<Cell>),
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(text.into())
    }

    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Cell::Colored {
            text: text.into(),
            color,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }

    /// Number of visible characters. Escape sequences never count.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Cell::Text(text) | Cell::Colored { text, .. } => text.chars().count(),
            Cell::Joined(parts) => parts.iter().map(Cell::width).sum(),
        }
    }

    /// Render the cell for the terminal using `palette`.
    #[must_use]
    pub fn render(&self, palette: &Palette) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Colored { text, color } => palette.paint(text, *color),
            Cell::Joined(parts) => parts.iter().map(|part| part.render(palette)).collect(),
        }
    }
}

/// Render a cell and left-align it in a column of `width` visible characters.
///
/// Cells wider than the column are emitted in full, without truncation.
#[must_use]
pub fn pad_cell(cell: &Cell, width: usize, palette: &Palette) -> String {
    let padding = width.saturating_sub(cell.width());
    format!("{}{}", cell.render(palette), " ".repeat(padding))
}

/// Lay out one table row using [`layout::COLUMN_WIDTHS`].
#[must_use]
pub fn format_row(cells: &[Cell; 3], palette: &Palette) -> String {
    cells
        .iter()
        .zip(layout::COLUMN_WIDTHS)
        .map(|(cell, width)| pad_cell(cell, width, palette))
        .collect()
}

/// Strip ANSI color codes, leaving the visible text
#[cfg(test)]
pub(crate) fn strip_ansi(s: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;

    for ch in s.chars() {
        if ch == '\x1b' {
            in_escape = true;
        } else if in_escape && ch == 'm' {
            in_escape = false;
        } else if !in_escape {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_disabled_passes_through() {
        let palette = Palette::new(false);
        assert_eq!(palette.paint("full", Color::Red), "full");
        assert_eq!(palette.paint("", Color::Bold), "");
    }

    #[test]
    fn test_paint_enabled_wraps_text() {
        let palette = Palette::new(true);
        let painted = palette.paint("free", Color::Green);
        assert!(painted.starts_with('\x1b'));
        assert!(painted.contains("free"));
        assert_ne!(painted, "free");
        assert_eq!(strip_ansi(&painted), "free");
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("Hello World"), "Hello World");
        assert_eq!(strip_ansi("\x1b[91mRed\x1b[0m Text"), "Red Text");
        assert_eq!(strip_ansi("\x1b[1;32mGreen Bold\x1b[0m Normal"), "Green Bold Normal");
    }

    #[test]
    fn test_cell_width_ignores_color() {
        let cell = Cell::Joined(vec![
            Cell::colored("5", Color::Yellow),
            Cell::text(" / 8"),
        ]);
        assert_eq!(cell.width(), 5);
        assert_eq!(cell.render(&Palette::new(false)), "5 / 8");
        assert_eq!(strip_ansi(&cell.render(&Palette::new(true))), "5 / 8");
    }

    #[test]
    fn test_pad_cell() {
        let palette = Palette::new(false);
        assert_eq!(pad_cell(&Cell::text("node01"), 10, &palette), "node01    ");
        assert_eq!(pad_cell(&Cell::text("a-very-long-name"), 4, &palette), "a-very-long-name");
        assert_eq!(pad_cell(&Cell::empty(), 3, &palette), "   ");
    }

    #[test]
    fn test_format_row_alignment_same_with_and_without_color() {
        let cells = [
            Cell::text("node01"),
            Cell::colored("avail", Color::Yellow),
            Cell::Joined(vec![Cell::colored("5", Color::Yellow), Cell::text(" / 8")]),
        ];

        let plain = format_row(&cells, &Palette::new(false));
        let colored = format_row(&cells, &Palette::new(true));

        assert_eq!(plain, "node01        avail     5 / 8       ");
        assert_eq!(strip_ansi(&colored), plain);
        assert_eq!(plain.chars().count(), layout::COLUMN_WIDTHS.iter().sum::<usize>());
    }
}
