//! The grid document
//!
//! [`Grid`] is the in-memory document: an unbounded 1-based cell matrix, the
//! region registry, a protection flag, and a cursor. It implements the
//! structural-mutation semantics the engine relies on: inserting or deleting
//! rows and columns at a region boundary shifts every cell, every relative
//! address token in every expression, and every region rectangle in one
//! pass, so the registry is never stale.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::expr;
use crate::region::{Region, RegionRegistry};

/// A single cell: a raw value and/or an opaque expression, plus a style tag.
///
/// Style tags are opaque identifiers; the grid only copies them around when
/// inserted rows inherit formatting from a neighbor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Raw value (labels, sample numbers)
    pub value: Option<String>,
    /// Expression text, including any leading `=`
    pub expr: Option<String>,
    /// Style tag; 0 is the default style
    pub style: u16,
}

/// Which region boundary inserted rows or columns land on.
///
/// `Down`/`Up` apply to row insertion, `ToRight`/`ToLeft` to column
/// insertion. `Down` inserts just above the region's last row so a footer
/// row stays last and the region grows; `Up` inserts just below the first
/// row, keeping a header first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertDirection {
    Down,
    Up,
    ToRight,
    ToLeft,
}

/// Which neighbor inserted cells copy their formatting from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOrigin {
    LeftOrAbove,
    RightOrBelow,
}

/// An in-memory grid document.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Document name
    name: String,
    /// Sparse cell storage keyed by (row, col), 1-based
    cells: BTreeMap<(u32, u32), Cell>,
    /// Named regions
    regions: RegionRegistry,
    /// Whether the document is protected against edits
    protected: bool,
    /// Cursor position (row, col)
    cursor: (u32, u32),
}

impl Grid {
    /// Create a new empty grid document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            regions: RegionRegistry::new(),
            protected: false,
            cursor: (1, 1),
        }
    }

    /// Document name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the document is protected
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Current cursor position
    pub fn cursor(&self) -> (u32, u32) {
        self.cursor
    }

    // === Regions ===

    /// The region registry
    pub fn regions(&self) -> &RegionRegistry {
        &self.regions
    }

    /// Resolve a region by name
    pub fn region(&self, name: &str) -> Result<Region> {
        self.regions.resolve(name).cloned()
    }

    /// Whether a region exists
    pub fn region_exists(&self, name: &str) -> bool {
        self.regions.exists(name)
    }

    /// Register or replace a region
    pub fn set_region(&mut self, region: Region) {
        self.regions.register(region);
    }

    /// Remove a region by name
    pub fn remove_region(&mut self, name: &str) -> Option<Region> {
        self.regions.unregister(name)
    }

    // === Cells ===

    /// Get a cell, if present
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Read a cell's expression text
    pub fn read_expr(&self, row: u32, col: u32) -> Option<String> {
        self.cells.get(&(row, col)).and_then(|c| c.expr.clone())
    }

    /// Read a cell's raw value
    pub fn read_value(&self, row: u32, col: u32) -> Option<String> {
        self.cells.get(&(row, col)).and_then(|c| c.value.clone())
    }

    /// Write an expression into a cell, replacing any raw value.
    ///
    /// A leading `=` is added if missing.
    pub fn write_expr(&mut self, row: u32, col: u32, text: &str) {
        let text = if text.starts_with('=') {
            text.to_string()
        } else {
            format!("={}", text)
        };
        let cell = self.cells.entry((row, col)).or_default();
        cell.expr = Some(text);
        cell.value = None;
    }

    /// Write a raw value into a cell, replacing any expression.
    pub fn write_value(&mut self, row: u32, col: u32, value: &str) {
        let cell = self.cells.entry((row, col)).or_default();
        cell.value = Some(value.to_string());
        cell.expr = None;
    }

    /// Set a cell's style tag
    pub fn set_style(&mut self, row: u32, col: u32, style: u16) {
        self.cells.entry((row, col)).or_default().style = style;
    }

    /// Iterate over all non-empty cells
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &Cell)> {
        self.cells.iter().map(|(&(r, c), cell)| (r, c, cell))
    }

    // === Structural mutation ===

    /// Insert `count` blank rows at the named region's boundary.
    ///
    /// Every region whose top row is at or below the insertion point shifts
    /// down; every region enclosing the insertion point grows. Inserting
    /// zero rows is a no-op. A single-row region cannot enclose its own
    /// boundary, so with `Down` it shifts instead of growing.
    pub fn insert_rows(
        &mut self,
        region_name: &str,
        count: u32,
        direction: InsertDirection,
        origin: FormatOrigin,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let region = self.region(region_name)?;
        let at = match direction {
            InsertDirection::Down | InsertDirection::ToRight => region.last_row(),
            InsertDirection::Up | InsertDirection::ToLeft => region.row + 1,
        };
        self.insert_row_space(at, count, origin);
        Ok(())
    }

    /// Insert `count` blank columns at the named region's boundary.
    pub fn insert_columns(
        &mut self,
        region_name: &str,
        count: u32,
        direction: InsertDirection,
        origin: FormatOrigin,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let region = self.region(region_name)?;
        let at = match direction {
            InsertDirection::Down | InsertDirection::ToRight => region.last_col(),
            InsertDirection::Up | InsertDirection::ToLeft => region.col + 1,
        };
        self.insert_col_space(at, count, origin);
        Ok(())
    }

    /// Delete the full row span of a named marker region, shifting everything
    /// below upward. The marker region itself disappears from the registry.
    pub fn delete_region_rows(&mut self, region_name: &str) -> Result<()> {
        let region = self.region(region_name)?;
        self.delete_row_space(region.row, region.rows);
        Ok(())
    }

    /// Delete `count` rows from the bottom of a region, keeping its last row
    /// in place (footer convention).
    pub fn delete_rows(&mut self, region_name: &str, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let region = self.region(region_name)?;
        if count > region.rows.saturating_sub(1) {
            return Err(Error::InvalidRegion(format!(
                "cannot delete {} rows from '{}' ({} rows)",
                count, region_name, region.rows
            )));
        }
        self.delete_row_space(region.last_row() - count, count);
        Ok(())
    }

    fn insert_row_space(&mut self, at: u32, count: u32, origin: FormatOrigin) {
        // Shift cells downward, bottom-up.
        let moved: Vec<((u32, u32), Cell)> = self
            .cells
            .range((at, 0)..)
            .map(|(&k, v)| (k, v.clone()))
            .collect();
        for (key, _) in &moved {
            self.cells.remove(key);
        }
        for ((r, c), cell) in moved {
            self.cells.insert((r + count, c), cell);
        }

        // Shift relative row components in every expression.
        for cell in self.cells.values_mut() {
            if let Some(e) = &cell.expr {
                cell.expr = Some(expr::shift_rows(e, at, count as i64));
            }
        }

        // Inserted rows inherit formatting from the chosen neighbor row.
        let origin_row = match origin {
            FormatOrigin::LeftOrAbove => at.saturating_sub(1),
            FormatOrigin::RightOrBelow => at + count,
        };
        if origin_row >= 1 {
            let styled: Vec<(u32, u16)> = self
                .cells
                .range((origin_row, 0)..(origin_row + 1, 0))
                .filter(|(_, cell)| cell.style != 0)
                .map(|(&(_, c), cell)| (c, cell.style))
                .collect();
            for row in at..at + count {
                for &(col, style) in &styled {
                    self.cells.insert((row, col), Cell {
                        style,
                        ..Cell::default()
                    });
                }
            }
        }

        self.regions.apply_row_insert(at, count);
    }

    fn delete_row_space(&mut self, at: u32, count: u32) {
        let end = at + count; // exclusive
        let keys: Vec<(u32, u32)> = self
            .cells
            .range((at, 0)..)
            .map(|(&k, _)| k)
            .collect();
        for (r, c) in keys {
            if let Some(cell) = self.cells.remove(&(r, c)) {
                if r >= end {
                    self.cells.insert((r - count, c), cell);
                }
            }
        }

        for cell in self.cells.values_mut() {
            if let Some(e) = &cell.expr {
                cell.expr = Some(expr::shift_rows(e, at, -(count as i64)));
            }
        }

        self.regions.apply_row_delete(at, count);
    }

    fn insert_col_space(&mut self, at: u32, count: u32, origin: FormatOrigin) {
        let moved: Vec<((u32, u32), Cell)> = self
            .cells
            .iter()
            .filter(|(&(_, c), _)| c >= at)
            .map(|(&k, v)| (k, v.clone()))
            .collect();
        for (key, _) in &moved {
            self.cells.remove(key);
        }
        for ((r, c), cell) in moved {
            self.cells.insert((r, c + count), cell);
        }

        for cell in self.cells.values_mut() {
            if let Some(e) = &cell.expr {
                cell.expr = Some(expr::shift_cols(e, at, count as i64));
            }
        }

        let origin_col = match origin {
            FormatOrigin::LeftOrAbove => at.saturating_sub(1),
            FormatOrigin::RightOrBelow => at + count,
        };
        if origin_col >= 1 {
            let styled: Vec<(u32, u16)> = self
                .cells
                .iter()
                .filter(|(&(_, c), cell)| c == origin_col && cell.style != 0)
                .map(|(&(r, _), cell)| (r, cell.style))
                .collect();
            for col in at..at + count {
                for &(row, style) in &styled {
                    self.cells.insert((row, col), Cell {
                        style,
                        ..Cell::default()
                    });
                }
            }
        }

        self.regions.apply_col_insert(at, count);
    }

    // === Protection and cursor ===

    /// Set the protection flag, returning the previous state.
    pub fn set_protection(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.protected, enabled)
    }

    /// Move the cursor to the top-left cell.
    pub fn move_cursor_to_origin(&mut self) -> Result<()> {
        self.cursor = (1, 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid_with_table() -> Grid {
        let mut grid = Grid::new("test");
        // Rows 2..=5: header, two data rows, footer.
        grid.set_region(Region::new("Table", 2, 2, 4, 3));
        grid.write_value(2, 2, "header");
        grid.write_value(3, 2, "r1");
        grid.write_value(4, 2, "r2");
        grid.write_expr(5, 2, "=SUM(B3:B4)");
        grid.set_region(Region::new("BelowTable", 7, 2, 2, 3));
        grid.write_value(7, 2, "below");
        grid
    }

    #[test]
    fn test_insert_rows_grows_region_and_shifts_below() {
        let mut grid = grid_with_table();
        grid.insert_rows("Table", 3, InsertDirection::Down, FormatOrigin::LeftOrAbove)
            .unwrap();

        let table = grid.region("Table").unwrap();
        assert_eq!(table.rows, 7);
        assert_eq!(grid.region("BelowTable").unwrap().row, 10);
        // footer moved down; its refs point above the insertion and stay put
        assert_eq!(grid.read_value(8, 2), None);
        assert_eq!(grid.read_expr(8, 2), Some("=SUM(B3:B4)".into()));
        assert_eq!(grid.read_value(10, 2), Some("below".into()));
    }

    #[test]
    fn test_insert_rows_zero_is_noop() {
        let mut grid = grid_with_table();
        let before = grid.region("Table").unwrap();
        grid.insert_rows("Table", 0, InsertDirection::Down, FormatOrigin::LeftOrAbove)
            .unwrap();
        assert_eq!(grid.region("Table").unwrap(), before);
    }

    #[test]
    fn test_insert_rows_missing_region() {
        let mut grid = grid_with_table();
        let err = grid
            .insert_rows("Nope", 1, InsertDirection::Down, FormatOrigin::LeftOrAbove)
            .unwrap_err();
        assert!(matches!(err, Error::RegionNotFound(_)));
    }

    #[test]
    fn test_insert_shifts_relative_but_not_absolute_refs() {
        let mut grid = grid_with_table();
        grid.write_expr(1, 1, "=B4+$B$4");
        grid.insert_rows("Table", 2, InsertDirection::Up, FormatOrigin::LeftOrAbove)
            .unwrap();
        // insertion at row 3: relative B4 follows its cell, absolute stays
        assert_eq!(grid.read_expr(1, 1), Some("=B6+$B$4".into()));
    }

    #[test]
    fn test_inserted_rows_inherit_format() {
        let mut grid = grid_with_table();
        grid.set_style(4, 2, 7);
        grid.insert_rows("Table", 2, InsertDirection::Down, FormatOrigin::LeftOrAbove)
            .unwrap();
        // insertion point was row 5; the new rows copy row 4's styles
        assert_eq!(grid.cell(5, 2).unwrap().style, 7);
        assert_eq!(grid.cell(6, 2).unwrap().style, 7);
        assert_eq!(grid.cell(5, 2).unwrap().value, None);
    }

    #[test]
    fn test_delete_region_rows() {
        let mut grid = grid_with_table();
        grid.set_region(Region::new("Scratch", 2, 1, 4, 8));
        grid.delete_region_rows("Scratch").unwrap();

        assert!(!grid.region_exists("Scratch"));
        assert!(!grid.region_exists("Table")); // fully inside the span
        assert_eq!(grid.region("BelowTable").unwrap().row, 3);
        assert_eq!(grid.read_value(3, 2), Some("below".into()));
    }

    #[test]
    fn test_delete_rows_keeps_footer() {
        let mut grid = grid_with_table();
        grid.delete_rows("Table", 1).unwrap();

        let table = grid.region("Table").unwrap();
        assert_eq!(table.rows, 3);
        // footer formula survives in the last row
        assert_eq!(grid.read_expr(4, 2), Some("=SUM(B3:B4)".into()));
        assert!(grid.delete_rows("Table", 3).is_err());
    }

    #[test]
    fn test_insert_columns() {
        let mut grid = grid_with_table();
        grid.write_expr(1, 5, "=D3+$D$3");
        grid.insert_columns("Table", 2, InsertDirection::ToRight, FormatOrigin::LeftOrAbove)
            .unwrap();
        assert_eq!(grid.region("Table").unwrap().cols, 5);
        assert_eq!(grid.read_expr(1, 7), Some("=F3+$D$3".into()));
    }

    #[test]
    fn test_protection_returns_previous_state() {
        let mut grid = Grid::new("test");
        assert!(!grid.set_protection(true));
        assert!(grid.set_protection(false));
        assert!(!grid.is_protected());
    }
}
