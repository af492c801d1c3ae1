//! Address tokens inside opaque cell expressions
//!
//! Expressions are never parsed into an AST. The engine only needs to find
//! A1-style address tokens inside them, shift the relative components when
//! rows or columns are inserted or deleted, and substitute one token's text
//! during formula rewriting. Everything else in the expression is left alone.

use lazy_regex::{lazy_regex, Lazy, Regex};

use crate::address::GridAddress;

/// Candidate address tokens. Boundary and quoting checks are applied on top,
/// so function names (`LOG10(`) and sheet names (`Sheet1!`) do not match.
static TOKEN: Lazy<Regex> = lazy_regex!(r"\$?[A-Za-z]{1,3}\$?[0-9]{1,7}");

/// One address token located inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressToken {
    /// Byte offset of the token start
    pub start: usize,
    /// Byte offset one past the token end
    pub end: usize,
    /// The parsed address
    pub address: GridAddress,
}

/// Scan an expression for address tokens.
pub fn scan(expr: &str) -> Vec<AddressToken> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();

    for m in TOKEN.find_iter(expr) {
        // Reject tokens glued to identifier characters on either side.
        if m.start() > 0 {
            let prev = bytes[m.start() - 1];
            if prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'$' {
                continue;
            }
        }
        if let Some(&next) = bytes.get(m.end()) {
            if next.is_ascii_alphanumeric() || next == b'_' || next == b'(' {
                continue;
            }
        }
        // Skip tokens inside double-quoted string literals.
        let quotes = bytes[..m.start()].iter().filter(|&&b| b == b'"').count();
        if quotes % 2 == 1 {
            continue;
        }

        if let Ok(address) = GridAddress::parse(m.as_str()) {
            tokens.push(AddressToken {
                start: m.start(),
                end: m.end(),
                address,
            });
        }
    }

    tokens
}

/// Rebuild an expression with each token mapped through `f`.
///
/// `f` returns `None` to leave the token untouched.
fn map_tokens<F>(expr: &str, mut f: F) -> String
where
    F: FnMut(&AddressToken) -> Option<String>,
{
    let tokens = scan(expr);
    if tokens.is_empty() {
        return expr.to_string();
    }

    let mut out = String::with_capacity(expr.len());
    let mut pos = 0;
    for token in &tokens {
        out.push_str(&expr[pos..token.start]);
        match f(token) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&expr[token.start..token.end]),
        }
        pos = token.end;
    }
    out.push_str(&expr[pos..]);
    out
}

/// Shift relative row components for a row insertion or deletion at `at`.
///
/// Positive `delta` inserts: relative rows at or below `at` move down.
/// Negative `delta` deletes: relative rows below the deleted span move up,
/// references into the deleted span itself are left untouched. Absolute row
/// components never move.
pub fn shift_rows(expr: &str, at: u32, delta: i64) -> String {
    let threshold = if delta >= 0 { at } else { at + delta.unsigned_abs() as u32 };
    map_tokens(expr, |token| {
        let addr = token.address;
        if addr.row_absolute || addr.row < threshold {
            return None;
        }
        Some(addr.offset(delta, 0).to_a1_string())
    })
}

/// Shift relative column components for a column insertion or deletion at `at`.
///
/// Mirror of [`shift_rows`].
pub fn shift_cols(expr: &str, at: u32, delta: i64) -> String {
    let threshold = if delta >= 0 { at } else { at + delta.unsigned_abs() as u32 };
    map_tokens(expr, |token| {
        let addr = token.address;
        if addr.col_absolute || addr.col < threshold {
            return None;
        }
        Some(addr.offset(0, delta).to_a1_string())
    })
}

/// Translate every relative component by a fixed delta, position-independent.
///
/// Used when a cloned region's expressions must track the clone's new
/// location. Absolute components stay pinned to the original cells.
pub fn translate_relative(expr: &str, row_delta: i64, col_delta: i64) -> String {
    map_tokens(expr, |token| {
        let addr = token.address;
        if addr.row_absolute && addr.col_absolute {
            return None;
        }
        let rd = if addr.row_absolute { 0 } else { row_delta };
        let cd = if addr.col_absolute { 0 } else { col_delta };
        Some(addr.offset(rd, cd).to_a1_string())
    })
}

/// Replace every token whose text equals `from` with `to`.
///
/// The comparison is against the token's literal text, so `A1` never matches
/// inside `A10` or `AA1`.
pub fn replace_token(expr: &str, from: &str, to: &str) -> String {
    map_tokens(expr, |token| {
        if &expr[token.start..token.end] == from {
            Some(to.to_string())
        } else {
            None
        }
    })
}
