//! Category sections of a spending-report statement
//!
//! Statements group transactions under upper-case category headings
//! (`GROCERIES`, `TRAVEL`, ...), each followed by a repeated column header.
//! Everything from the summary heading on is a recap and is ignored.

use crate::config::PdfLayout;

/// Lines grouped under one category heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// `None` for lines seen before the first heading
    pub category: Option<String>,
    /// (1-based line number, line with trailing whitespace removed)
    pub lines: Vec<(usize, String)>,
}

/// Split extracted statement text into category sections
pub fn split_sections(text: &str, layout: &PdfLayout) -> Vec<Section> {
    let table_header = layout.table_header.to_lowercase();
    let summary_heading = layout.summary_heading.to_lowercase();

    let mut sections = Vec::new();
    let mut current = Section {
        category: None,
        lines: Vec::new(),
    };

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let upper = trimmed.to_uppercase();
        if layout.known_categories.iter().any(|label| *label == upper) {
            let next = Section {
                category: Some(upper),
                lines: Vec::new(),
            };
            flush(&mut sections, std::mem::replace(&mut current, next));
            continue;
        }

        let lower = trimmed.to_lowercase();
        if lower.starts_with(&table_header) {
            continue;
        }
        if lower.starts_with(&summary_heading) {
            break;
        }

        current.lines.push((idx + 1, line.trim_end().to_string()));
    }

    flush(&mut sections, current);
    sections
}

/// Keep a section only if it collected lines
fn flush(sections: &mut Vec<Section>, section: Section) {
    if !section.lines.is_empty() {
        sections.push(section);
    }
}
