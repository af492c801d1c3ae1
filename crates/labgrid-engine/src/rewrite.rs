//! Formula address rewriting
//!
//! Propagates a base cell's expression down a region, varying exactly one
//! address token per row. The substitution is textual: expressions stay
//! opaque and only the one coordinate changes, so every other token in the
//! expression survives byte for byte.
//!
//! The last row of a region is never rewritten. Templates reserve it for a
//! fixed total or footer row; for a region of `R` rows exactly `R - 2` rows
//! below the base receive a rewritten expression.

use labgrid_core::expr;
use labgrid_core::GridAddress;

use crate::error::{Error, Result};
use crate::host::DocumentHost;

/// Copy the expression at `(base_row, base_col)` down the named region,
/// substituting the row of the token `col_offset` columns from the base cell
/// (1 meaning the base cell's own column) with each target row.
///
/// Returns the number of rows written. Fails with
/// [`Error::MissingBaseCell`] when the base cell has no expression or its
/// expression has no token at the offset column; the caller moves on to its
/// other regions.
pub fn rewrite_down<H: DocumentHost>(
    host: &mut H,
    region: &str,
    base_row: u32,
    base_col: u32,
    col_offset: u32,
) -> Result<u32> {
    let rect = host.region(region)?;
    let varying_col = base_col + col_offset - 1;

    let base_expr = host
        .read_expr(base_row, base_col)
        .ok_or_else(|| Error::MissingBaseCell(format!("{region}!R{base_row}C{base_col}")))?;
    let base_token = find_token(&base_expr, base_row, varying_col).ok_or_else(|| {
        Error::MissingBaseCell(format!(
            "{region}!R{base_row}C{base_col} has no token in column {varying_col}"
        ))
    })?;

    let mut written = 0;
    for j in 1..=rect.rows.saturating_sub(2) {
        let row = base_row + j;
        let replacement = GridAddress::new(row, varying_col).relative_text();
        let text = expr::replace_token(&base_expr, &base_token, &replacement);
        host.write_expr(row, base_col, &text);
        written += 1;
    }
    tracing::debug!(region, base_row, base_col, written, "rewrote formulas down");
    Ok(written)
}

/// Rewrite each row's own expression in the named region so that the base
/// cell's varying token references one fixed anchor cell.
///
/// In every target row's expression the token at
/// `(base_row, base_col + col_offset - 1)` is replaced with the address
/// `(static_row, static_col + col_offset - 1)`. Rows with no expression or no
/// matching token are left alone. The footer-row exclusion applies as in
/// [`rewrite_down`].
pub fn rewrite_with_static_anchor<H: DocumentHost>(
    host: &mut H,
    region: &str,
    base_row: u32,
    base_col: u32,
    col_offset: u32,
    static_row: u32,
    static_col: u32,
) -> Result<u32> {
    let rect = host.region(region)?;
    let varying_col = base_col + col_offset - 1;
    let anchor = GridAddress::new(static_row, static_col + col_offset - 1).relative_text();

    let mut written = 0;
    for j in 1..=rect.rows.saturating_sub(2) {
        let row = base_row + j;
        let Some(text) = host.read_expr(row, base_col) else {
            continue;
        };
        let Some(token) = find_token(&text, base_row, varying_col) else {
            continue;
        };
        let text = expr::replace_token(&text, &token, &anchor);
        host.write_expr(row, base_col, &text);
        written += 1;
    }
    tracing::debug!(region, static_row, static_col, written, "anchored formulas");
    Ok(written)
}

/// The literal text of the first token in `text` resolving to `(row, col)`,
/// whatever its absolute flags.
fn find_token(text: &str, row: u32, col: u32) -> Option<String> {
    expr::scan(text)
        .into_iter()
        .find(|t| t.address.row == row && t.address.col == col)
        .map(|t| text[t.start..t.end].to_string())
}
