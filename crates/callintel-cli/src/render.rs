use std::io::Write;

use anyhow::Result;
use callintel_core::Grid;
use comfy_table::{CellAlignment, ContentArrangement, Table};

/// How a report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_flags(json: bool, csv: bool) -> Self {
        if json {
            OutputFormat::Json
        } else if csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Table
        }
    }
}

/// `corner` labels the row-key column; `totals`, when given, becomes a
/// trailing "Total" column.
pub fn grid_table(corner: &str, grid: &Grid, totals: Option<&[String]>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![corner.to_string()];
    header.extend(grid.column_keys().iter().cloned());
    if totals.is_some() {
        header.push("Total".to_string());
    }
    table.set_header(header);

    for (i, row) in grid.rows().iter().enumerate() {
        let mut cells = vec![row.key.clone()];
        cells.extend(row.cells.iter().map(|c| format_count(c.count)));
        if let Some(totals) = totals {
            cells.push(totals.get(i).cloned().unwrap_or_default());
        }
        table.add_row(cells);
    }

    for index in 1..=grid.column_keys().len() + usize::from(totals.is_some()) {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table
}

pub fn write_grid_csv<W: Write>(writer: W, corner: &str, grid: &Grid) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![corner.to_string()];
    header.extend(grid.column_keys().iter().cloned());
    csv.write_record(&header)?;

    for row in grid.rows() {
        let mut record = vec![row.key.clone()];
        record.extend(row.cells.iter().map(|c| c.count.to_string()));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
