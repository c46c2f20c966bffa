//! Human-readable table report

use rustc_hash::FxHashMap;
use std::fmt::Write;

use crate::concern::{ConcernScale, MAX_STARS};
use crate::model::{HistorySize, LeaderboardEntry};
use crate::util::humanize;

use super::metrics::{layout, Item, Node, Rating, Section};
use super::options::{NameStyle, Threshold};

/// Narrowest name column; widened when a label and its footnote need more
const NAME_WIDTH: usize = 36;
const VALUE_WIDTH: usize = 9;
const CONCERN_WIDTH: usize = 30;

/// Footnotes, numbered in order of first use
#[derive(Default)]
struct Footnotes {
    notes: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl Footnotes {
    fn mark(&mut self, entry: &LeaderboardEntry, style: NameStyle) -> Option<usize> {
        let text = match (style, entry.name.as_deref()) {
            (NameStyle::None, _) => return None,
            (NameStyle::Full, Some(name)) => format!("{} ({name})", entry.id),
            _ => entry.id.to_string(),
        };
        if let Some(&n) = self.index.get(&text) {
            return Some(n);
        }
        self.notes.push(text.clone());
        let n = self.notes.len();
        self.index.insert(text, n);
        Some(n)
    }
}

/// Name, value and concern cells of one line
struct Row(String, String, String);

struct Renderer<'a> {
    history: &'a HistorySize,
    threshold: Threshold,
    style: NameStyle,
    scale: &'a ConcernScale,
    footnotes: Footnotes,
}

impl Renderer<'_> {
    fn section(&mut self, section: &Section, depth: usize) -> Vec<Row> {
        let mut lines = Vec::new();
        for child in &section.children {
            match child {
                Node::Section(s) => lines.extend(self.section(s, depth + 1)),
                Node::Item(item) => lines.extend(self.item(item, depth + 1)),
            }
        }
        if !lines.is_empty() {
            lines.insert(0, Row(label(section.title, depth), String::new(), String::new()));
        }
        lines
    }

    fn item(&mut self, item: &Item, depth: usize) -> Option<Row> {
        let rating = item.rate(self.history, self.scale);
        if !self.threshold.admits(rating.severity) {
            return None;
        }

        let mut name = label(item.label, depth);
        if let Some(entry) = item.offender(self.history) {
            if let Some(n) = self.footnotes.mark(entry, self.style) {
                let _ = write!(name, " [{n}]");
            }
        }

        let (number, unit) = humanize(rating.value, item.unit, item.prefixes);
        let value = format!("{number:>5} {unit:<3}");
        Some(Row(name, value, stars(&rating)))
    }
}

fn label(text: &str, depth: usize) -> String {
    if depth == 0 {
        text.to_string()
    } else {
        format!("{}* {text}", "  ".repeat(depth - 1))
    }
}

fn stars(rating: &Rating) -> String {
    if rating.overflow {
        "!".repeat(MAX_STARS as usize)
    } else {
        "*".repeat(rating.severity.min(MAX_STARS) as usize)
    }
}

fn row(name: &str, value: &str, concern: &str, width: usize) -> String {
    format!("| {name:<width$} | {value:<VALUE_WIDTH$} | {concern:<CONCERN_WIDTH$} |")
}

/// Render `history` as a sectioned table
///
/// Rows rated below `threshold` are left out, as are sections with no
/// remaining rows. Offending objects are listed as footnotes unless
/// `style` is [`NameStyle::None`].
pub fn table_string(
    history: &HistorySize,
    threshold: Threshold,
    style: NameStyle,
    scale: &ConcernScale,
) -> String {
    let mut renderer = Renderer {
        history,
        threshold,
        style,
        scale,
        footnotes: Footnotes::default(),
    };

    let mut rows = Vec::new();
    for section in layout() {
        rows.extend(renderer.section(&section, 0));
    }

    if rows.is_empty() {
        return "No problems above the current threshold were found\n".to_string();
    }

    let width = rows
        .iter()
        .map(|r| r.0.chars().count())
        .fold(NAME_WIDTH, usize::max);

    let mut out = String::new();
    let _ = writeln!(out, "{}", row("Name", "Value", "Level of concern", width));
    let _ = writeln!(
        out,
        "| {} | {} | {} |",
        "-".repeat(width),
        "-".repeat(VALUE_WIDTH),
        "-".repeat(CONCERN_WIDTH)
    );
    for Row(name, value, concern) in rows {
        let _ = writeln!(out, "{}", row(&name, &value, &concern, width));
    }

    let notes = renderer.footnotes.notes;
    if !notes.is_empty() {
        out.push('\n');
        for (i, note) in notes.iter().enumerate() {
            let _ = writeln!(out, "[{}]  {note}", i + 1);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlobSize, Category, Count32};
    use gix::ObjectId;

    fn sample() -> HistorySize {
        let mut h = HistorySize::new();
        h.record_reference("refs/heads/main");
        h.record_blob(
            ObjectId::from([7; 20]),
            &BlobSize { size: Count32::new(80_000_000) },
            Some("refs/heads/main:big.bin"),
        );
        h
    }

    #[test]
    fn test_threshold_filters_rows() {
        let h = sample();
        let scale = ConcernScale::default();

        let verbose = table_string(&h, Threshold::VERBOSE, NameStyle::None, &scale);
        assert!(verbose.contains("Overall repository size"));
        assert!(verbose.contains("Number of submodules"));

        let default = table_string(&h, Threshold::DEFAULT, NameStyle::None, &scale);
        assert!(default.contains("Biggest objects"));
        assert!(default.contains("| * Blobs"));
        assert!(!default.contains("Overall repository size"));
        assert!(default.contains("| ***  "));

        let critical = table_string(&h, Threshold::CRITICAL, NameStyle::None, &scale);
        assert_eq!(critical, "No problems above the current threshold were found\n");
    }

    #[test]
    fn test_footnotes_follow_name_style() {
        let h = sample();
        let scale = ConcernScale::default();
        let hex = "07".repeat(20);

        let none = table_string(&h, Threshold::DEFAULT, NameStyle::None, &scale);
        assert!(!none.contains("[1]"));

        let hash = table_string(&h, Threshold::DEFAULT, NameStyle::Hash, &scale);
        assert!(hash.contains("Maximum size [1]"));
        assert!(hash.contains(&format!("[1]  {hex}\n")));

        let full = table_string(&h, Threshold::DEFAULT, NameStyle::Full, &scale);
        assert!(full.contains(&format!("[1]  {hex} (refs/heads/main:big.bin)")));
    }

    #[test]
    fn test_rows_are_aligned() {
        let h = sample();
        let table = table_string(&h, Threshold::VERBOSE, NameStyle::None, &ConcernScale::default());
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_rows_with_footnotes_are_aligned() {
        let mut h = sample();
        for (i, category) in Category::ALL.into_iter().enumerate() {
            let n = i as u8 + 20;
            h.leaderboards.offer(
                category,
                ObjectId::from([n; 20]),
                1,
                Some("refs/heads/feature/long-branch-name:src/deeply/nested/file.rs"),
            );
        }
        let table = table_string(&h, Threshold::VERBOSE, NameStyle::Full, &ConcernScale::default());
        assert!(table.contains("[13]"));

        let widths: Vec<usize> = table
            .lines()
            .filter(|l| l.starts_with('|'))
            .map(|l| l.chars().count())
            .collect();
        assert!(widths.len() > 20);
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{table}");
    }
}
