//! Per-page table detection and reconstruction.
//!
//! Raw tables are contiguous runs of delimiter-bearing lines (tab or wide
//! space separation). Each retained table carries both a structured grid of
//! raw cell values and a fixed-width textual rendering for the assembled
//! document.

use serde::Serialize;

use crate::types::{ExtractedPage, PageEvent, ProgressTx};

/// Minimum consecutive delimiter-bearing lines that form a raw table.
const MIN_TABLE_LINES: usize = 2;

/// A retained table, numbered 1-based within its page.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedTable {
    pub page_number: u32,
    pub table_number: u32,
    /// Raw row/column cell values, empty strings preserved.
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Fixed-width textual rendering with `+`/`-` borders.
    ///
    /// Column width is the longest cell in that column plus two padding
    /// characters; missing cells render as empty strings.
    #[must_use]
    pub fn render(&self) -> String {
        let columns = self.column_count();
        if columns == 0 {
            return String::new();
        }

        let widths: Vec<usize> = (0..columns)
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| row.get(col).map_or(0, |c| c.chars().count()))
                    .max()
                    .unwrap_or(0)
                    + 2
            })
            .collect();

        let mut border = String::from("+");
        for width in &widths {
            border.push_str(&"-".repeat(*width));
            border.push('+');
        }
        border.push('\n');

        let mut out = format!(
            "Таблица {} (стр. {}):\n",
            self.table_number, self.page_number
        );
        out.push_str(&border);
        for row in &self.rows {
            out.push('|');
            for (col, width) in widths.iter().enumerate() {
                let cell = row.get(col).map_or("", String::as_str);
                out.push_str(&format!(" {cell:<pad$} |", pad = width - 2));
            }
            out.push('\n');
            out.push_str(&border);
        }
        out.push('\n');
        out
    }
}

/// Detect and reconstruct tables across all pages, in page order.
///
/// Tables whose every cell is empty or whitespace are discarded; numbering
/// within a page is 1-based and contiguous after the filter. When a
/// progress channel is given, one [`PageEvent`] is sent per completed page.
#[must_use]
pub fn segment_tables(pages: &[ExtractedPage], progress: Option<&ProgressTx>) -> Vec<ExtractedTable> {
    let total_pages = pages.len();
    let mut tables = Vec::new();

    for page in pages {
        let mut table_number = 0u32;
        let mut found = 0usize;

        for rows in detect_raw_tables(&page.text) {
            if is_blank_table(&rows) {
                continue;
            }
            table_number += 1;
            found += 1;
            tables.push(ExtractedTable {
                page_number: page.page_number,
                table_number,
                rows,
            });
        }

        if found > 0 {
            tracing::debug!(page = page.page_number, tables = found, "tables detected");
        }
        if let Some(tx) = progress {
            let _ = tx.send(PageEvent {
                page_number: page.page_number,
                total_pages,
                tables_found: found,
            });
        }
    }

    tables
}

/// Contiguous runs of at least [`MIN_TABLE_LINES`] cell-bearing lines.
fn detect_raw_tables(text: &str) -> Vec<Vec<Vec<String>>> {
    let mut raw_tables = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        if let Some(cells) = split_cells(line) {
            run.push(cells);
        } else {
            flush_run(&mut run, &mut raw_tables);
        }
    }
    flush_run(&mut run, &mut raw_tables);

    raw_tables
}

fn flush_run(run: &mut Vec<Vec<String>>, raw_tables: &mut Vec<Vec<Vec<String>>>) {
    if run.len() >= MIN_TABLE_LINES {
        raw_tables.push(std::mem::take(run));
    } else {
        run.clear();
    }
}

/// Split a line into cells if it carries a recognizable column structure.
///
/// Tab-separated lines keep empty cells; otherwise runs of two or more
/// spaces act as column gaps. Lines yielding fewer than two cells are not
/// row candidates.
fn split_cells(line: &str) -> Option<Vec<String>> {
    let cells = if line.contains('\t') {
        line.split('\t').map(|c| c.trim().to_owned()).collect()
    } else {
        split_on_wide_gaps(line)
    };
    (cells.len() >= 2).then_some(cells)
}

fn split_on_wide_gaps(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut space_run = 0usize;

    for ch in line.chars() {
        if ch == ' ' {
            space_run += 1;
            continue;
        }
        if space_run >= 2 && !current.is_empty() {
            cells.push(std::mem::take(&mut current));
        } else if space_run == 1 {
            current.push(' ');
        }
        space_run = 0;
        current.push(ch);
    }
    if !current.is_empty() {
        cells.push(current);
    }
    cells
}

fn is_blank_table(rows: &[Vec<String>]) -> bool {
    rows.iter()
        .all(|row| row.iter().all(|cell| cell.trim().is_empty()))
}
