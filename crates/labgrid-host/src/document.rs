//! The on-disk document format
//!
//! Documents are stored as JSON: the grid name, protection flag, a sparse
//! cell list, and the region table. Only populated cells are written, so
//! template files stay small and diffable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use labgrid_core::{Grid, Region};

use crate::error::{Error, Result};

/// Serialized form of one populated cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellRecord {
    pub row: u32,
    pub col: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub style: u16,
}

fn is_zero(style: &u16) -> bool {
    *style == 0
}

/// Serialized form of one named region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionRecord {
    pub name: String,
    pub row: u32,
    pub col: u32,
    pub rows: u32,
    pub cols: u32,
}

impl From<&Region> for RegionRecord {
    fn from(region: &Region) -> Self {
        Self {
            name: region.name.clone(),
            row: region.row,
            col: region.col,
            rows: region.rows,
            cols: region.cols,
        }
    }
}

/// A whole document file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentFile {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
}

impl DocumentFile {
    /// Snapshot a grid into its serialized form. Cells are emitted in
    /// row-major order, regions sorted by name, so equal grids serialize
    /// identically.
    pub fn from_grid(grid: &Grid) -> Self {
        let cells = grid
            .iter_cells()
            .map(|(row, col, cell)| CellRecord {
                row,
                col,
                value: cell.value.clone(),
                expr: cell.expr.clone(),
                style: cell.style,
            })
            .collect();
        let mut regions: Vec<RegionRecord> = grid.regions().iter().map(Into::into).collect();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            name: grid.name().to_string(),
            protected: grid.is_protected(),
            cells,
            regions,
        }
    }

    /// Rebuild the grid this file describes.
    pub fn into_grid(self) -> Grid {
        let mut grid = Grid::new(self.name);
        for region in self.regions {
            grid.set_region(Region::new(
                region.name,
                region.row,
                region.col,
                region.rows,
                region.cols,
            ));
        }
        for cell in self.cells {
            if let Some(expr) = &cell.expr {
                grid.write_expr(cell.row, cell.col, expr);
            } else if let Some(value) = &cell.value {
                grid.write_value(cell.row, cell.col, value);
            }
            if cell.style != 0 {
                grid.set_style(cell.row, cell.col, cell.style);
            }
        }
        grid.set_protection(self.protected);
        grid
    }

    /// Load a document file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the document file to disk, pretty-printed.
    pub fn store(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| Error::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_grid() -> Grid {
        let mut grid = Grid::new("sensitivity");
        grid.set_region(Region::new("SampleNumsRawData", 5, 2, 6, 1));
        grid.write_value(5, 2, "1");
        grid.write_expr(5, 3, "=B5*2");
        grid.set_style(5, 3, 7);
        grid.set_protection(true);
        grid
    }

    #[test]
    fn grid_survives_a_serialization_cycle() {
        let grid = sample_grid();
        let file = DocumentFile::from_grid(&grid);
        let json = serde_json::to_string(&file).unwrap();
        let back: DocumentFile = serde_json::from_str(&json).unwrap();
        let rebuilt = back.into_grid();

        assert_eq!(rebuilt.name(), "sensitivity");
        assert!(rebuilt.is_protected());
        assert_eq!(rebuilt.read_value(5, 2), Some("1".into()));
        assert_eq!(rebuilt.read_expr(5, 3), Some("=B5*2".into()));
        assert_eq!(rebuilt.cell(5, 3).unwrap().style, 7);
        assert_eq!(rebuilt.region("SampleNumsRawData").unwrap().rows, 6);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{
            "name": "doc",
            "cells": [{ "row": 1, "col": 1, "value": "x" }],
            "regions": []
        }"#;
        let file: DocumentFile = serde_json::from_str(json).unwrap();
        assert!(!file.protected);
        assert_eq!(file.cells[0].style, 0);
        assert_eq!(file.cells[0].expr, None);
    }

    #[test]
    fn load_reports_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = DocumentFile::load(&path).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }
}
