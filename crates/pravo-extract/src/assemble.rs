//! Canonical re-assembly of extracted text and tables.
//!
//! The output layout (text section, tables section, statistics footer) is a
//! compatibility surface: downstream consumers parse the assembled string,
//! so ordering must be deterministic for identical input.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::tables::ExtractedTable;

pub const TEXT_HEADER: &str = "=== ТЕКСТ ДОКУМЕНТА ===";
pub const TABLES_HEADER: &str = "=== ТАБЛИЦЫ ДОКУМЕНТА ===";
pub const STATS_HEADER: &str = "=== СТАТИСТИКА ОБРАБОТКИ ===";

#[derive(Debug, Clone)]
pub struct TableStat {
    pub page_number: u32,
    pub table_number: u32,
    pub rows: usize,
    pub columns: usize,
}

/// Derived, never persisted.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub text_section: String,
    pub tables_section: String,
    pub table_count: usize,
    pub pages_with_tables: BTreeSet<u32>,
    pub stats: Vec<TableStat>,
}

impl AssembledDocument {
    /// Full textual representation: headers, body, rendered tables and the
    /// statistics footer.
    #[must_use]
    pub fn into_text(self) -> String {
        let mut out = format!("{TEXT_HEADER}\n\n{}\n\n{TABLES_HEADER}\n\n", self.text_section);
        out.push_str(&self.tables_section);

        let _ = write!(
            out,
            "\n{STATS_HEADER}\nВсего таблиц найдено: {}\nВсего страниц с таблицами: {}\n",
            self.table_count,
            self.pages_with_tables.len()
        );
        for stat in &self.stats {
            let _ = writeln!(
                out,
                "Таблица {} (стр. {}): {} строк, {} столбцов",
                stat.table_number, stat.page_number, stat.rows, stat.columns
            );
        }
        out
    }
}

/// Combine extracted text and retained tables into one canonical document.
///
/// Tables are rendered in (page, table number) order regardless of the
/// order they were handed in.
#[must_use]
pub fn assemble(text: &str, tables: &[ExtractedTable]) -> AssembledDocument {
    let mut ordered: Vec<&ExtractedTable> = tables.iter().collect();
    ordered.sort_by_key(|t| (t.page_number, t.table_number));

    let mut tables_section = String::new();
    let mut pages_with_tables = BTreeSet::new();
    let mut stats = Vec::with_capacity(ordered.len());

    for table in &ordered {
        tables_section.push_str(&table.render());
        pages_with_tables.insert(table.page_number);
        stats.push(TableStat {
            page_number: table.page_number,
            table_number: table.table_number,
            rows: table.rows.len(),
            columns: table.column_count(),
        });
    }

    AssembledDocument {
        text_section: text.to_owned(),
        tables_section,
        table_count: ordered.len(),
        pages_with_tables,
        stats,
    }
}
