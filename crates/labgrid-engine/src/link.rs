//! Cross-region linking
//!
//! Writes reference expressions into one region's cells pointing at the
//! corresponding cells of another. A link is materialized text: once written
//! it is never re-evaluated, so the addressing mode chosen here decides
//! whether later row insertions make the reference track or stay pinned.

use labgrid_core::{GridAddress, Region};

use crate::host::DocumentHost;

/// Component used to mark an offset as broadcast.
pub const BROADCAST: i32 = -1;

/// Per-axis offset applied while walking a region rectangle.
///
/// A non-negative component is added to the 0-based walk index; a negative
/// component broadcasts, pinning that axis to the region's first row or
/// column regardless of the walk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOffset {
    pub row: i32,
    pub col: i32,
}

impl LinkOffset {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Zero offset on both axes, a straight cell-for-cell correspondence.
    pub fn aligned() -> Self {
        Self { row: 0, col: 0 }
    }

    fn apply(component: i32, walk: u32) -> u32 {
        if component < 0 {
            0
        } else {
            component as u32 + walk
        }
    }
}

/// Outcome of [`link_regions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkResult {
    /// Expressions were written into this many target cells.
    Linked { cells: usize },
    /// One of the two regions was missing; nothing was written.
    Skipped,
}

/// Link `target`'s cells to `source`'s cells.
///
/// Walks `target`'s rectangle with a 0-based index pair, resolving the
/// source and destination cell for each position through the given offsets,
/// and writes a reference to the source cell into the destination cell.
/// `row_absolute` and `col_absolute` pick the notation of the written
/// reference per axis. Positions that resolve outside either rectangle are
/// skipped.
///
/// If either region name is unresolved the whole link is skipped rather
/// than failed; orchestrators link opportunistically over families whose
/// members may not all exist.
pub fn link_regions<H: DocumentHost>(
    host: &mut H,
    source: &str,
    target: &str,
    src_offset: LinkOffset,
    dst_offset: LinkOffset,
    row_absolute: bool,
    col_absolute: bool,
) -> LinkResult {
    let Ok(src) = host.region(source) else {
        tracing::debug!(source, target, "link source missing, skipping");
        return LinkResult::Skipped;
    };
    let Ok(dst) = host.region(target) else {
        tracing::debug!(source, target, "link target missing, skipping");
        return LinkResult::Skipped;
    };

    let mut cells = 0usize;
    for i in 0..dst.rows {
        for j in 0..dst.cols {
            let src_row = src.row + LinkOffset::apply(src_offset.row, i);
            let src_col = src.col + LinkOffset::apply(src_offset.col, j);
            let dst_row = dst.row + LinkOffset::apply(dst_offset.row, i);
            let dst_col = dst.col + LinkOffset::apply(dst_offset.col, j);
            if !in_rect(&src, src_row, src_col) || !in_rect(&dst, dst_row, dst_col) {
                continue;
            }
            let addr = GridAddress::with_absolute(src_row, src_col, row_absolute, col_absolute);
            host.write_expr(dst_row, dst_col, &format!("={addr}"));
            cells += 1;
        }
    }
    tracing::debug!(source, target, cells, "linked regions");
    LinkResult::Linked { cells }
}

fn in_rect(region: &Region, row: u32, col: u32) -> bool {
    region.contains_row(row) && region.contains_col(col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labgrid_core::Grid;
    use pretty_assertions::assert_eq;

    fn grid() -> Grid {
        let mut g = Grid::new("doc");
        g.set_region(Region::new("Src", 2, 1, 3, 1));
        g.set_region(Region::new("Dst", 10, 4, 3, 1));
        for r in 0..3 {
            g.write_value(2 + r, 1, &format!("v{r}"));
        }
        g
    }

    #[test]
    fn aligned_link_round_trips_addresses() {
        let mut g = grid();
        let out = link_regions(
            &mut g,
            "Src",
            "Dst",
            LinkOffset::aligned(),
            LinkOffset::aligned(),
            false,
            false,
        );
        assert_eq!(out, LinkResult::Linked { cells: 3 });
        assert_eq!(g.read_expr(10, 4), Some("=A2".into()));
        assert_eq!(g.read_expr(11, 4), Some("=A3".into()));
        assert_eq!(g.read_expr(12, 4), Some("=A4".into()));
    }

    #[test]
    fn aligned_link_covers_the_whole_rectangle() {
        let mut g = Grid::new("doc");
        g.set_region(Region::new("Wide", 5, 2, 3, 2));
        g.set_region(Region::new("Mirror", 20, 6, 3, 2));
        let out = link_regions(
            &mut g,
            "Wide",
            "Mirror",
            LinkOffset::aligned(),
            LinkOffset::aligned(),
            false,
            false,
        );
        // first row and first column of both rectangles are linked too
        assert_eq!(out, LinkResult::Linked { cells: 6 });
        assert_eq!(g.read_expr(20, 6), Some("=B5".into()));
        assert_eq!(g.read_expr(22, 7), Some("=C7".into()));
    }

    #[test]
    fn broadcast_row_pins_one_source_cell() {
        let mut g = grid();
        link_regions(
            &mut g,
            "Src",
            "Dst",
            LinkOffset::new(BROADCAST, 0),
            LinkOffset::aligned(),
            true,
            true,
        );
        // every target row references the source's first row, fully absolute
        assert_eq!(g.read_expr(10, 4), Some("=$A$2".into()));
        assert_eq!(g.read_expr(11, 4), Some("=$A$2".into()));
        assert_eq!(g.read_expr(12, 4), Some("=$A$2".into()));
    }

    #[test]
    fn positive_offset_shifts_source_rows() {
        let mut g = grid();
        link_regions(
            &mut g,
            "Src",
            "Dst",
            LinkOffset::new(1, 0),
            LinkOffset::aligned(),
            false,
            false,
        );
        // walk rows 0..3 hit source rows 1..4; the last falls outside Src
        assert_eq!(g.read_expr(10, 4), Some("=A3".into()));
        assert_eq!(g.read_expr(11, 4), Some("=A4".into()));
        assert_eq!(g.read_expr(12, 4), None);
    }

    #[test]
    fn missing_region_is_skipped() {
        let mut g = grid();
        let out = link_regions(
            &mut g,
            "Nope",
            "Dst",
            LinkOffset::aligned(),
            LinkOffset::aligned(),
            false,
            false,
        );
        assert_eq!(out, LinkResult::Skipped);
        assert_eq!(g.read_expr(10, 4), None);
    }
}
