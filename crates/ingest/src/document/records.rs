//! Markdown-flavoured parser output to section records.
//!
//! Many PDF parsers emit text with ATX headings and pipe tables. This adapter
//! turns that text into the flat `SectionRecord` sequence the tree builder
//! consumes, lifting tables out of the prose.

use docchat_core::{SectionRecord, TableMap};

/// Heading text and level parsed from an ATX heading line.
struct Heading {
    level: u32,
    text: String,
}

/// Record being accumulated until the next heading.
#[derive(Default)]
struct Pending {
    heading: String,
    level: u32,
    body: String,
    tables: TableMap,
    /// Open table block and its position in `body`.
    table: Option<(usize, String)>,
}

impl Pending {
    fn new(heading: Heading) -> Self {
        Self {
            heading: heading.text,
            level: heading.level,
            ..Self::default()
        }
    }

    fn push_table_row(&mut self, line: &str) {
        match &mut self.table {
            Some((_, rows)) => {
                rows.push('\n');
                rows.push_str(line.trim());
            }
            None => self.table = Some((self.body.chars().count(), line.trim().to_string())),
        }
    }

    fn close_table(&mut self) {
        if let Some((position, rows)) = self.table.take() {
            self.tables.insert(position, rows);
        }
    }

    fn push_line(&mut self, line: &str) {
        self.close_table();
        if self.body.is_empty() && line.trim().is_empty() {
            return;
        }
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(line);
    }

    fn finish(mut self) -> Option<SectionRecord> {
        self.close_table();
        let body = self.body.trim_end().to_string();
        if self.heading.is_empty() && body.is_empty() && self.tables.is_empty() {
            return None;
        }
        Some(SectionRecord {
            heading_text: self.heading,
            level: self.level.max(1),
            body_text: body,
            tables: self.tables,
        })
    }
}

/// Split markdown text into one record per heading. Text before the first
/// heading becomes a level-1 record with an empty heading.
pub fn records_from_markdown(text: &str) -> Vec<SectionRecord> {
    let mut records = Vec::new();
    let mut current = Pending::default();

    for line in text.lines() {
        if let Some(heading) = parse_heading(line) {
            let finished = std::mem::replace(&mut current, Pending::new(heading));
            records.extend(finished.finish());
        } else if line.trim_start().starts_with('|') {
            current.push_table_row(line);
        } else {
            current.push_line(line);
        }
    }
    records.extend(current.finish());
    records
}

/// Parse a markdown ATX heading (`#` to `######`) from a line.
fn parse_heading(line: &str) -> Option<Heading> {
    let trimmed = line.trim();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim();
    if text.is_empty() {
        return None;
    }
    Some(Heading {
        level: level as u32,
        text: text.to_string(),
    })
}
