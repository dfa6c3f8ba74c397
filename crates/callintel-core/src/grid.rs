//! Dense pivot grids
//!
//! A grid is a complete row × column matrix of counts: every row carries one
//! cell per column key, in column order, zero when nothing was counted.
//! Sparse group counts are folded in with [`Grid::fill`].

use crate::aggregator::GroupCount;
use crate::error::{ReportError, Result};
use crate::events::same_location;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Key equality used to locate a row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    /// Call types, purposes and month labels.
    Exact,
    /// Location names.
    CaseInsensitive,
}

impl KeyMatch {
    pub fn matches(self, axis_key: &str, key: &str) -> bool {
        match self {
            KeyMatch::Exact => axis_key == key,
            KeyMatch::CaseInsensitive => same_location(axis_key, key),
        }
    }
}

/// One dimension of a grid.
#[derive(Debug, Clone)]
pub struct Axis {
    name: &'static str,
    keys: Vec<String>,
    required: bool,
}

impl Axis {
    /// An axis that must have at least one key.
    pub fn required(name: &'static str, keys: Vec<String>) -> Self {
        Self {
            name,
            keys,
            required: true,
        }
    }

    /// An axis that may legitimately be empty.
    pub fn optional(name: &'static str, keys: Vec<String>) -> Self {
        Self {
            name,
            keys,
            required: false,
        }
    }

    fn into_keys(self) -> Result<Vec<String>> {
        if self.required && self.keys.is_empty() {
            return Err(ReportError::EmptyAxis { axis: self.name });
        }

        let mut seen = HashSet::with_capacity(self.keys.len());
        let mut keys = Vec::with_capacity(self.keys.len());
        for key in self.keys {
            if seen.insert(key.clone()) {
                keys.push(key);
            } else {
                tracing::warn!(axis = self.name, key = %key, "duplicate axis key ignored");
            }
        }
        Ok(keys)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub key: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: Vec<String>,
    rows: Vec<GridRow>,
}

/// Allocates a zero-filled grid, rows in `rows` order and the same column
/// order in every row.
pub fn build_grid(rows: Axis, columns: Axis) -> Result<Grid> {
    let row_keys = rows.into_keys()?;
    let columns = columns.into_keys()?;

    let rows = row_keys
        .into_iter()
        .map(|key| GridRow {
            key,
            cells: columns
                .iter()
                .map(|name| Cell {
                    name: name.clone(),
                    count: 0,
                })
                .collect(),
        })
        .collect();

    Ok(Grid { columns, rows })
}

impl Grid {
    pub fn row_keys(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.key.clone()).collect()
    }

    pub fn column_keys(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Count at an exact `(row, column)` position, `None` off the grid.
    pub fn count(&self, row: &str, column: &str) -> Option<u64> {
        let row = self.rows.iter().find(|r| r.key == row)?;
        row.cells.iter().find(|c| c.name == column).map(|c| c.count)
    }

    /// Folds sparse group counts into a new grid. Each group overwrites the
    /// cell it matches; groups with no matching row or column are dropped.
    pub fn fill(
        mut self,
        groups: &[GroupCount],
        row_match: KeyMatch,
        column_match: KeyMatch,
    ) -> Grid {
        let mut dropped = 0usize;

        for group in groups {
            let Some(row) = self
                .rows
                .iter_mut()
                .find(|r| row_match.matches(&r.key, &group.row))
            else {
                dropped += 1;
                continue;
            };
            let Some(cell) = row
                .cells
                .iter_mut()
                .find(|c| column_match.matches(&c.name, &group.column))
            else {
                dropped += 1;
                continue;
            };
            cell.count = group.count;
        }

        if dropped > 0 {
            tracing::debug!(dropped, groups = groups.len(), "groups outside grid axes dropped");
        }

        self
    }

    /// Every row's counts rendered as text, for chart consumption.
    pub fn count_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.count.to_string()).collect())
            .collect()
    }

    /// Sum of each row across all columns, in row order.
    pub fn row_totals(&self) -> Vec<u64> {
        self.rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.count).sum())
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.row_totals().into_iter().sum()
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for row in &self.rows {
            map.serialize_entry(&row.key, &row.cells)?;
        }
        map.end()
    }
}
