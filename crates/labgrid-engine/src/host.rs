//! The document host interface
//!
//! The engine never owns a document; it borrows one from a host for the
//! duration of a single orchestration call, through exactly the operations
//! below. [`Grid`] is the in-memory host used by tests and the file-backed
//! session; a remote bridge can implement the same trait.

use labgrid_core::{FormatOrigin, Grid, InsertDirection, Region};

use crate::error::Result;

/// Operations the engine needs from a document host.
///
/// Resolved [`Region`] values are snapshots: structural mutation moves
/// rectangles, so callers re-resolve names after every insert or delete
/// instead of caching.
pub trait DocumentHost {
    /// Resolve a named region.
    fn region(&self, name: &str) -> Result<Region>;

    /// Whether a named region exists. Never fails.
    fn region_exists(&self, name: &str) -> bool;

    /// Register or replace a named region.
    fn set_region(&mut self, region: Region);

    /// Row count of a named region.
    fn region_row_count(&self, name: &str) -> Result<u32>;

    /// Insert blank rows at a region boundary (see
    /// [`Grid::insert_rows`](labgrid_core::Grid::insert_rows)).
    fn insert_rows(
        &mut self,
        region: &str,
        count: u32,
        direction: InsertDirection,
        origin: FormatOrigin,
    ) -> Result<()>;

    /// Insert blank columns at a region boundary.
    fn insert_columns(
        &mut self,
        region: &str,
        count: u32,
        direction: InsertDirection,
        origin: FormatOrigin,
    ) -> Result<()>;

    /// Delete the full row span of a marker region.
    fn delete_region_rows(&mut self, region: &str) -> Result<()>;

    /// Delete rows from the bottom of a region, keeping its footer row.
    fn delete_rows(&mut self, region: &str, count: u32) -> Result<()>;

    /// Read a cell's expression text.
    fn read_expr(&self, row: u32, col: u32) -> Option<String>;

    /// Write a cell's expression text.
    fn write_expr(&mut self, row: u32, col: u32, text: &str);

    /// Read a cell's raw value.
    fn read_value(&self, row: u32, col: u32) -> Option<String>;

    /// Write a cell's raw value.
    fn write_value(&mut self, row: u32, col: u32, value: &str);

    /// Set document protection, returning the previous state.
    fn set_protection(&mut self, enabled: bool) -> bool;

    /// Move the cursor to the top-left cell. Best-effort; callers log and
    /// ignore failures.
    fn move_cursor_to_origin(&mut self) -> Result<()>;

    // === Provided conveniences ===

    /// Write a list of values down a region's first column, truncated to the
    /// region's row count.
    fn set_region_values(&mut self, name: &str, values: &[String]) -> Result<()> {
        let region = self.region(name)?;
        for (i, value) in values.iter().take(region.rows as usize).enumerate() {
            let addr = region.cell(i as u32 + 1, 1);
            self.write_value(addr.row, addr.col, value);
        }
        Ok(())
    }

    /// Write a single value at region-relative 1-based coordinates.
    fn set_region_value(&mut self, name: &str, rel_row: u32, rel_col: u32, value: &str) -> Result<()> {
        let region = self.region(name)?;
        let addr = region.cell(rel_row, rel_col);
        self.write_value(addr.row, addr.col, value);
        Ok(())
    }
}

impl DocumentHost for Grid {
    fn region(&self, name: &str) -> Result<Region> {
        Ok(Grid::region(self, name)?)
    }

    fn region_exists(&self, name: &str) -> bool {
        Grid::region_exists(self, name)
    }

    fn set_region(&mut self, region: Region) {
        Grid::set_region(self, region)
    }

    fn region_row_count(&self, name: &str) -> Result<u32> {
        Ok(self.regions().row_count(name)?)
    }

    fn insert_rows(
        &mut self,
        region: &str,
        count: u32,
        direction: InsertDirection,
        origin: FormatOrigin,
    ) -> Result<()> {
        Ok(Grid::insert_rows(self, region, count, direction, origin)?)
    }

    fn insert_columns(
        &mut self,
        region: &str,
        count: u32,
        direction: InsertDirection,
        origin: FormatOrigin,
    ) -> Result<()> {
        Ok(Grid::insert_columns(self, region, count, direction, origin)?)
    }

    fn delete_region_rows(&mut self, region: &str) -> Result<()> {
        Ok(Grid::delete_region_rows(self, region)?)
    }

    fn delete_rows(&mut self, region: &str, count: u32) -> Result<()> {
        Ok(Grid::delete_rows(self, region, count)?)
    }

    fn read_expr(&self, row: u32, col: u32) -> Option<String> {
        Grid::read_expr(self, row, col)
    }

    fn write_expr(&mut self, row: u32, col: u32, text: &str) {
        Grid::write_expr(self, row, col, text)
    }

    fn read_value(&self, row: u32, col: u32) -> Option<String> {
        Grid::read_value(self, row, col)
    }

    fn write_value(&mut self, row: u32, col: u32, value: &str) {
        Grid::write_value(self, row, col, value)
    }

    fn set_protection(&mut self, enabled: bool) -> bool {
        Grid::set_protection(self, enabled)
    }

    fn move_cursor_to_origin(&mut self) -> Result<()> {
        Ok(Grid::move_cursor_to_origin(self)?)
    }
}
