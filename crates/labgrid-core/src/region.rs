//! Named regions and the region registry
//!
//! A region is a named rectangle inside the grid. Names are unique and
//! case-insensitive; geometry may overlap (the templates intentionally
//! overlap summary and difference regions for linking). Region families
//! share a base name suffixed with an integer index; which index the bare
//! base name stands for varies per family, so [`RegionFamily`] carries that
//! convention explicitly instead of unifying it.

use std::collections::HashMap;

use crate::address::GridAddress;
use crate::error::{Error, Result};

/// A named rectangular sub-area of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// The region name (e.g. "ImpurityConditionsTable")
    pub name: String,
    /// Top-left row (1-based)
    pub row: u32,
    /// Top-left column (1-based)
    pub col: u32,
    /// Number of rows spanned
    pub rows: u32,
    /// Number of columns spanned
    pub cols: u32,
}

impl Region {
    /// Create a new region
    pub fn new(name: impl Into<String>, row: u32, col: u32, rows: u32, cols: u32) -> Self {
        Self {
            name: name.into(),
            row,
            col,
            rows,
            cols,
        }
    }

    /// Last row spanned (inclusive)
    pub fn last_row(&self) -> u32 {
        self.row + self.rows - 1
    }

    /// Last column spanned (inclusive)
    pub fn last_col(&self) -> u32 {
        self.col + self.cols - 1
    }

    /// Whether the region's row span strictly encloses `row` (the row is
    /// inside the span but not its first row).
    pub fn encloses_row(&self, row: u32) -> bool {
        self.row < row && row <= self.last_row()
    }

    /// Whether the region's column span strictly encloses `col`.
    pub fn encloses_col(&self, col: u32) -> bool {
        self.col < col && col <= self.last_col()
    }

    /// Whether `row` falls anywhere in the region's row span, first row
    /// included.
    pub fn contains_row(&self, row: u32) -> bool {
        self.row <= row && row <= self.last_row()
    }

    /// Whether `col` falls anywhere in the region's column span.
    pub fn contains_col(&self, col: u32) -> bool {
        self.col <= col && col <= self.last_col()
    }

    /// Absolute address of a cell by region-relative 1-based coordinates.
    ///
    /// `(1, 1)` is the region's top-left cell. Coordinates are not clamped;
    /// callers check against `rows`/`cols` where it matters.
    pub fn cell(&self, rel_row: u32, rel_col: u32) -> GridAddress {
        GridAddress::new(self.row + rel_row - 1, self.col + rel_col - 1)
    }
}

/// A region family: regions named `base`, `base1`, `base2`, …
///
/// Some template families use the bare base name for member 0, others for
/// member 1, and some not at all; `unsuffixed` records that per-family
/// convention.
#[derive(Debug, Clone)]
pub struct RegionFamily {
    base: String,
    unsuffixed: Option<u32>,
}

impl RegionFamily {
    /// A family whose members are always written with an index suffix.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            unsuffixed: None,
        }
    }

    /// A family where member `index` is written as the bare base name.
    pub fn with_unsuffixed(base: impl Into<String>, index: u32) -> Self {
        Self {
            base: base.into(),
            unsuffixed: Some(index),
        }
    }

    /// The family's base name.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The registry name of member `index`.
    pub fn member(&self, index: u32) -> String {
        if self.unsuffixed == Some(index) {
            self.base.clone()
        } else {
            format!("{}{}", self.base, index)
        }
    }
}

/// Registry of named regions with case-insensitive lookup.
///
/// The registry is owned by the grid and is updated in place by structural
/// mutation, so resolved [`Region`] values must not be cached across
/// insertions.
#[derive(Debug, Default, Clone)]
pub struct RegionRegistry {
    regions: HashMap<String, Region>,
}

impl RegionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    /// Register or replace a region under its name.
    pub fn register(&mut self, region: Region) {
        self.regions.insert(Self::key(&region.name), region);
    }

    /// Remove a region by name, returning it if present.
    pub fn unregister(&mut self, name: &str) -> Option<Region> {
        self.regions.remove(&Self::key(name))
    }

    /// Whether a region with this name exists. Never fails; absence is a
    /// normal control-flow signal for the orchestrators.
    pub fn exists(&self, name: &str) -> bool {
        self.regions.contains_key(&Self::key(name))
    }

    /// Look up a region by name.
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.get(&Self::key(name))
    }

    /// Resolve a region by name, failing with [`Error::RegionNotFound`].
    pub fn resolve(&self, name: &str) -> Result<&Region> {
        self.get(name)
            .ok_or_else(|| Error::RegionNotFound(name.to_string()))
    }

    /// Row count of a named region.
    pub fn row_count(&self, name: &str) -> Result<u32> {
        Ok(self.resolve(name)?.rows)
    }

    /// Iterate over all regions.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Number of registered regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Apply a row insertion of `count` rows at `at` to every rectangle:
    /// regions starting at or below `at` shift down, regions enclosing `at`
    /// grow.
    pub(crate) fn apply_row_insert(&mut self, at: u32, count: u32) {
        for region in self.regions.values_mut() {
            if region.row >= at {
                region.row += count;
            } else if region.encloses_row(at) {
                region.rows += count;
            }
        }
    }

    /// Apply a deletion of rows `[at, at + count)`. Regions fully inside the
    /// span are dropped, overlapping regions shrink, regions below shift up.
    pub(crate) fn apply_row_delete(&mut self, at: u32, count: u32) {
        let end = at + count; // exclusive
        self.regions.retain(|_, r| !(r.row >= at && r.last_row() < end));
        for region in self.regions.values_mut() {
            if region.row >= end {
                region.row -= count;
            } else if region.last_row() >= at {
                let overlap = (region.last_row() + 1).min(end) - region.row.max(at);
                region.rows -= overlap;
                if region.row >= at {
                    region.row = at;
                }
            }
        }
    }

    /// Apply a column insertion of `count` columns at `at`.
    pub(crate) fn apply_col_insert(&mut self, at: u32, count: u32) {
        for region in self.regions.values_mut() {
            if region.col >= at {
                region.col += count;
            } else if region.encloses_col(at) {
                region.cols += count;
            }
        }
    }
}
