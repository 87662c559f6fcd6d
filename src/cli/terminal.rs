//! Terminal capability detection and output helpers

use std::io::{self, Write};

use deskwork::{domain::Stats, Item};
use owo_colors::{colors::css, OwoColorize};

/// Width of the item table, in columns.
const TABLE_WIDTH: u16 = 70;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if the terminal is too narrow for the item table
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < TABLE_WIDTH)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as a heading (blue)
    fn heading(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn heading(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().bold().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn heading(&self) -> String {
        self.as_str().heading()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// Writes items as an aligned table, or one per line when `compact`.
pub fn render_items<W: Write + ?Sized>(out: &mut W, items: &[&Item], compact: bool) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "{}", "No items to show.".dim());
    }
    if compact {
        for item in items {
            writeln!(out, "{item}")?;
        }
        return Ok(());
    }

    writeln!(out, "{:<12} {:<30} {:>8} {:>12}", "ID", "NAME", "QTY", "PRICE")?;
    writeln!(out, "{}", "-".repeat(usize::from(TABLE_WIDTH) - 5))?;
    for item in items {
        writeln!(
            out,
            "{:<12} {:<30} {:>8} ${:>11.2}",
            item.id().as_str(),
            item.name(),
            item.quantity(),
            item.price()
        )?;
    }
    Ok(())
}

/// Writes the totals line shown under listings.
pub fn render_stats<W: Write + ?Sized>(out: &mut W, stats: &Stats) -> io::Result<()> {
    let line = format!(
        "{} item(s), {} unit(s), total value ${:.2}",
        stats.items, stats.units, stats.value
    );
    writeln!(out, "{}", line.dim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns() {
        let item = Item::new("1", "Café", 10, 2.5).unwrap();
        let mut out = Vec::new();

        render_items(&mut out, &[&item], false).unwrap();

        let text = String::from_utf8(out).unwrap();
        let row = text.lines().nth(2).unwrap();
        assert!(row.starts_with("1            Café"));
        assert!(row.ends_with("$       2.50"));
    }

    #[test]
    fn compact_uses_item_display() {
        let item = Item::new("1", "Café", 10, 2.5).unwrap();
        let mut out = Vec::new();

        render_items(&mut out, &[&item], true).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "[1] Café | qty: 10 | $ 2.50\n");
    }
}
