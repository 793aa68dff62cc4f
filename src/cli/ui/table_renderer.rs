use colored::Colorize;
use portal_domain::{ColumnDescriptor, ColumnType};

use crate::cli::output::current_preferences;

/// Widest a cell may grow before it is truncated with `…`.
pub const DEFAULT_MAX_WIDTH: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub min_width: usize,
    pub max_width: Option<usize>,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            min_width: 0,
            max_width: Some(DEFAULT_MAX_WIDTH),
            alignment: Alignment::Left,
        }
    }

    pub fn right(mut self) -> Self {
        self.alignment = Alignment::Right;
        self
    }

    /// Numbers and amounts align right.
    pub fn for_descriptor(column: &ColumnDescriptor) -> Self {
        let base = Self::new(column.label.clone());
        match column.column_type {
            ColumnType::Number | ColumnType::Currency => base.right(),
            _ => base,
        }
    }
}

/// Column metadata plus pre-rendered cell text.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
    pub padding: usize,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            padding: 1,
        }
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Content width per column from header, cells and the column bounds.
    pub fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| visible_width(cell))
                    .fold(visible_width(&column.header), usize::max)
                    .max(column.min_width);
                column.max_width.map_or(widest, |max| widest.min(max))
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.compute_widths();
        let headers: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.render_row(&headers, &widths).bold().to_string());
        lines.push(horizontal_rule(&widths, self.padding));
        lines.extend(self.rows.iter().map(|row| self.render_row(row, &widths)));
        lines.join("\n")
    }

    pub fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        self.columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let text = row.get(idx).map(String::as_str).unwrap_or("");
                render_cell(text, *width, column.alignment, self.padding)
            })
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    }
}

fn visible_width(text: &str) -> usize {
    text.chars().count()
}

fn truncate_text(text: &str, width: usize) -> String {
    if visible_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut fitted: String = text.chars().take(width - 1).collect();
    fitted.push('…');
    fitted
}

/// Pads (and if needed truncates) one cell to `width`.
pub fn render_cell(text: &str, width: usize, alignment: Alignment, padding: usize) -> String {
    let fitted = truncate_text(text, width);
    let gap = " ".repeat(width.saturating_sub(visible_width(&fitted)));
    let pad = " ".repeat(padding);
    match alignment {
        Alignment::Left => format!("{pad}{fitted}{gap}{pad}"),
        Alignment::Right => format!("{pad}{gap}{fitted}{pad}"),
    }
}

pub fn horizontal_rule(widths: &[usize], padding: usize) -> String {
    if widths.is_empty() {
        return String::new();
    }
    let total: usize =
        widths.iter().map(|w| w + padding * 2).sum::<usize>() + widths.len().saturating_sub(1);
    let ch = if current_preferences().plain_mode { '-' } else { '─' };
    ch.to_string().repeat(total)
}
