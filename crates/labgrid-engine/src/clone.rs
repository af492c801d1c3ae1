//! Region cloning
//!
//! Clones a named region's cells next to itself along one axis and registers
//! the copy under a new name. Cloning is idempotent: if the destination name
//! already exists nothing is copied.

use labgrid_core::Region;

use crate::error::Result;
use crate::host::DocumentHost;

/// Axis along which a clone is placed, immediately adjacent to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthAxis {
    Down,
    Right,
}

/// What [`clone_region`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    /// The destination was created and populated.
    Cloned,
    /// The destination name already existed; nothing was touched.
    AlreadyExists,
}

/// Clone `src` next to itself as `dst`.
///
/// The destination starts immediately after the source along `axis` and is
/// sized `src` plus the given deltas, clamped to at least one row and one
/// column. Cell content is copied over the overlap of the two shapes; when
/// the destination is larger than the source the extra cells stay blank.
///
/// With `rewrite_exprs` set, relative address components in copied
/// expressions are translated by the displacement between the two regions;
/// absolute components are preserved as written.
pub fn clone_region<H: DocumentHost>(
    host: &mut H,
    src: &str,
    dst: &str,
    axis: GrowthAxis,
    row_delta: i64,
    col_delta: i64,
    rewrite_exprs: bool,
) -> Result<CloneOutcome> {
    if host.region_exists(dst) {
        tracing::debug!(src, dst, "clone target already exists, skipping");
        return Ok(CloneOutcome::AlreadyExists);
    }
    let source = host.region(src)?;

    let (dst_row, dst_col) = match axis {
        GrowthAxis::Down => (source.row + source.rows, source.col),
        GrowthAxis::Right => (source.row, source.col + source.cols),
    };
    let dst_rows = clamp_dim(source.rows, row_delta);
    let dst_cols = clamp_dim(source.cols, col_delta);

    let copy_rows = source.rows.min(dst_rows);
    let copy_cols = source.cols.min(dst_cols);
    let shift_rows = i64::from(dst_row) - i64::from(source.row);
    let shift_cols = i64::from(dst_col) - i64::from(source.col);

    for r in 0..copy_rows {
        for c in 0..copy_cols {
            let from = (source.row + r, source.col + c);
            let to = (dst_row + r, dst_col + c);
            if let Some(expr) = host.read_expr(from.0, from.1) {
                let text = if rewrite_exprs {
                    labgrid_core::expr::translate_relative(&expr, shift_rows, shift_cols)
                } else {
                    expr
                };
                host.write_expr(to.0, to.1, &text);
            } else if let Some(value) = host.read_value(from.0, from.1) {
                host.write_value(to.0, to.1, &value);
            }
        }
    }

    host.set_region(Region::new(dst, dst_row, dst_col, dst_rows, dst_cols));
    tracing::debug!(src, dst, rows = dst_rows, cols = dst_cols, "cloned region");
    Ok(CloneOutcome::Cloned)
}

fn clamp_dim(base: u32, delta: i64) -> u32 {
    let v = i64::from(base) + delta;
    if v < 1 {
        1
    } else {
        v as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labgrid_core::Grid;
    use pretty_assertions::assert_eq;

    fn grid_with_source() -> Grid {
        let mut g = Grid::new("doc");
        g.set_region(Region::new("Block1", 2, 2, 2, 2));
        g.write_value(2, 2, "label");
        g.write_expr(2, 3, "=B2*2");
        g.write_expr(3, 3, "=$B$2+B3");
        g
    }

    #[test]
    fn clone_down_copies_and_registers() {
        let mut g = grid_with_source();
        let out = clone_region(&mut g, "Block1", "Block2", GrowthAxis::Down, 0, 0, true).unwrap();
        assert_eq!(out, CloneOutcome::Cloned);

        let dst = g.region("Block2").unwrap();
        assert_eq!((dst.row, dst.col, dst.rows, dst.cols), (4, 2, 2, 2));
        assert_eq!(g.read_value(4, 2), Some("label".into()));
        // relative rows shifted by 2, absolutes pinned
        assert_eq!(g.read_expr(4, 3), Some("=B4*2".into()));
        assert_eq!(g.read_expr(5, 3), Some("=$B$2+B5".into()));
    }

    #[test]
    fn clone_without_rewrite_keeps_text() {
        let mut g = grid_with_source();
        clone_region(&mut g, "Block1", "Block2", GrowthAxis::Down, 0, 0, false).unwrap();
        assert_eq!(g.read_expr(4, 3), Some("=B2*2".into()));
    }

    #[test]
    fn clone_right_places_adjacent() {
        let mut g = grid_with_source();
        clone_region(&mut g, "Block1", "Block2", GrowthAxis::Right, 0, 0, false).unwrap();
        let dst = g.region("Block2").unwrap();
        assert_eq!((dst.row, dst.col), (2, 4));
        assert_eq!(g.read_value(2, 4), Some("label".into()));
    }

    #[test]
    fn clone_is_idempotent() {
        let mut g = grid_with_source();
        clone_region(&mut g, "Block1", "Block2", GrowthAxis::Down, 0, 0, true).unwrap();
        g.write_value(4, 2, "edited");
        let out = clone_region(&mut g, "Block1", "Block2", GrowthAxis::Down, 0, 0, true).unwrap();
        assert_eq!(out, CloneOutcome::AlreadyExists);
        assert_eq!(g.read_value(4, 2), Some("edited".into()));
    }

    #[test]
    fn deltas_resize_destination() {
        let mut g = grid_with_source();
        clone_region(&mut g, "Block1", "Block2", GrowthAxis::Down, 1, -1, false).unwrap();
        let dst = g.region("Block2").unwrap();
        assert_eq!((dst.rows, dst.cols), (3, 1));
        // extra row beyond the source stays blank
        assert_eq!(g.read_value(6, 2), None);
    }
}
