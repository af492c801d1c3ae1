//! # labgrid-core
//!
//! Grid document model for the labgrid report-template engine.
//!
//! This crate provides the fundamental types the engine operates on:
//! - [`GridAddress`] - A1-style cell addresses with per-axis absolute flags
//! - [`Region`] and [`RegionRegistry`] - named rectangles and their registry
//! - [`RegionFamily`] - integer-indexed families of region names
//! - [`Grid`] - the in-memory document, including structural mutation
//!   (row/column insertion and deletion that shifts cells, relative address
//!   tokens and region rectangles together)
//! - [`expr`] - address-token scanning inside opaque cell expressions
//!
//! ## Example
//!
//! ```rust
//! use labgrid_core::{Grid, Region, InsertDirection, FormatOrigin};
//!
//! let mut grid = Grid::new("report");
//! grid.set_region(Region::new("ConditionsTable", 2, 2, 4, 3));
//! grid.write_value(3, 2, "Time point 1");
//!
//! grid.insert_rows("ConditionsTable", 2, InsertDirection::Down, FormatOrigin::LeftOrAbove)
//!     .unwrap();
//! assert_eq!(grid.region("ConditionsTable").unwrap().rows, 6);
//! ```

pub mod address;
pub mod error;
pub mod expr;
pub mod grid;
pub mod region;

// Re-exports for convenience
pub use address::GridAddress;
pub use error::{Error, Result};
pub use grid::{Cell, FormatOrigin, Grid, InsertDirection};
pub use region::{Region, RegionFamily, RegionRegistry};

/// Maximum number of rows in a grid document
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a grid document
pub const MAX_COLS: u32 = 16_384;
