//! Sensitivity report orchestration
//!
//! Unlike the stability flow, which mutates a document it was handed, the
//! sensitivity flow owns the whole lifecycle: it copies the source template
//! into a scratch directory, opens the copy through a [`HostSession`],
//! resizes the replicate tables, builds out the impurity result blocks,
//! saves, closes, and returns the path of the produced document.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use labgrid_core::{FormatOrigin, InsertDirection, RegionFamily};

use crate::clone::{clone_region, GrowthAxis};
use crate::error::{Error, Result};
use crate::host::DocumentHost;
use crate::session::HostSession;

/// Replicate rows each raw-data table carries in the template.
pub const DEFAULT_NUM_REPS: u32 = 6;
/// Impurity result blocks present in the template.
pub const DEFAULT_NUM_IMPURITIES: u32 = 1;
/// Impurity counts above this are rejected before any mutation.
pub const MAX_NUM_IMPURITIES: u32 = 8;
/// Replicate tables never shrink below this many data rows.
pub const MIN_DATA_ROWS: u32 = 2;

/// Scratch directory under the system temp dir for produced documents.
pub const TEMP_DIR_NAME: &str = "ard-tempfiles";

/// Marker region for the template's hidden scratch section, always stripped.
const SCRATCH_MARKER: &str = "ToDelete";

/// Produce a sensitivity results document from the template at
/// `source_path`.
///
/// Any failure is logged here with the source path before it propagates, and
/// an opened document is closed on the way out, so a caller never holds a
/// half-mutated document without a logged failure.
pub fn update_sensitivity_sheet<S: HostSession>(
    session: &mut S,
    source_path: &Path,
    num_reps: u32,
    num_impurities: u32,
) -> Result<PathBuf> {
    match run(session, source_path, num_reps, num_impurities) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "sensitivity document produced");
            Ok(path)
        }
        Err(err) => {
            tracing::error!(source = %source_path.display(), error = %err, "sensitivity update failed");
            Err(err)
        }
    }
}

fn run<S: HostSession>(
    session: &mut S,
    source_path: &Path,
    num_reps: u32,
    num_impurities: u32,
) -> Result<PathBuf> {
    if num_reps < 1 {
        return Err(Error::InvalidInput(format!(
            "at least one replicate is required, got {num_reps}"
        )));
    }
    if !(1..=MAX_NUM_IMPURITIES).contains(&num_impurities) {
        return Err(Error::InvalidInput(format!(
            "between 1 and {MAX_NUM_IMPURITIES} impurities are supported, got {num_impurities}"
        )));
    }
    if !source_path.is_file() {
        return Err(Error::InvalidInput(format!(
            "source document {} does not exist",
            source_path.display()
        )));
    }

    let save_path = copy_to_temp(source_path)?;
    let mut doc = session.open(&save_path)?;

    let result = mutate(&mut doc, num_reps, num_impurities)
        .and_then(|()| session.save(&doc, &save_path));
    if let Err(err) = session.close(doc) {
        tracing::warn!(error = %err, "closing document failed");
        result?;
        return Err(err);
    }
    result?;
    Ok(save_path)
}

/// Copy the source document into the scratch directory under a unique name,
/// keeping its extension.
fn copy_to_temp(source: &Path) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(TEMP_DIR_NAME);
    std::fs::create_dir_all(&dir)?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let name = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("impurity-sensitivity-results-{stamp}.{ext}"),
        None => format!("impurity-sensitivity-results-{stamp}"),
    };
    let dest = dir.join(name);
    std::fs::copy(source, &dest)?;
    Ok(dest)
}

fn mutate<H: DocumentHost>(doc: &mut H, num_reps: u32, num_impurities: u32) -> Result<()> {
    let was_protected = doc.set_protection(false);
    let result = resize_and_relink(doc, num_reps, num_impurities);
    if let Err(err) = doc.move_cursor_to_origin() {
        tracing::warn!(error = %err, "cursor reset failed");
    }
    doc.set_protection(was_protected);
    result
}

fn resize_and_relink<H: DocumentHost>(doc: &mut H, num_reps: u32, num_impurities: u32) -> Result<()> {
    // the hidden scratch section is always stripped
    if doc.region_exists(SCRATCH_MARKER) {
        doc.delete_region_rows(SCRATCH_MARKER)?;
    } else {
        tracing::warn!(marker = SCRATCH_MARKER, "scratch marker missing, nothing to strip");
    }

    if num_reps > DEFAULT_NUM_REPS {
        let extra = num_reps - DEFAULT_NUM_REPS;
        doc.insert_rows(
            "SampleNumsRawData",
            extra,
            InsertDirection::Down,
            FormatOrigin::LeftOrAbove,
        )?;
        doc.insert_rows(
            "SNResultsFormulas",
            extra,
            InsertDirection::Down,
            FormatOrigin::LeftOrAbove,
        )?;
    } else if num_reps < DEFAULT_NUM_REPS {
        let mut to_remove = DEFAULT_NUM_REPS - num_reps;
        if DEFAULT_NUM_REPS - to_remove < MIN_DATA_ROWS {
            to_remove = DEFAULT_NUM_REPS - MIN_DATA_ROWS;
        }
        doc.delete_rows("SampleNumsRawData", to_remove)?;
        doc.delete_rows("SampleNumsRawData2", to_remove)?;
    }

    renumber_samples(doc, num_reps)?;

    if num_impurities > DEFAULT_NUM_IMPURITIES {
        let impurity_results = RegionFamily::new("ImpurityResults");
        let s2n_results = RegionFamily::new("SignalToNoiseResults");
        for i in DEFAULT_NUM_IMPURITIES..num_impurities {
            let n = i + 1;
            clone_region(
                doc,
                &impurity_results.member(i),
                &impurity_results.member(n),
                GrowthAxis::Down,
                0,
                0,
                true,
            )?;
            doc.set_region_value(&impurity_results.member(n), 2, 2, &format!("Impurity{n}"))?;
            clone_region(
                doc,
                &s2n_results.member(i),
                &s2n_results.member(n),
                GrowthAxis::Down,
                0,
                0,
                true,
            )?;
        }
    }

    update_result_table_formulas(doc, num_impurities);
    Ok(())
}

/// Re-number the replicate labels in both raw-data tables. The template's
/// label columns hold one entry fewer than the replicate count, with a floor
/// matching the minimum table size.
fn renumber_samples<H: DocumentHost>(doc: &mut H, num_reps: u32) -> Result<()> {
    let reps = num_reps.max(MIN_DATA_ROWS);
    let labels: Vec<String> = (1..reps).map(|i| i.to_string()).collect();
    doc.set_region_values("SampleNumsRawData", &labels)?;
    doc.set_region_values("SampleNumsRawData2", &labels)?;
    Ok(())
}

/// Point each results-table row at its impurity block: column 1 at the
/// impurity figure, column 2 at the signal-to-noise figure, column 3 at the
/// blank-guarded %RSD in the block's last row.
fn update_result_table_formulas<H: DocumentHost>(doc: &mut H, num_impurities: u32) {
    let Ok(table) = doc.region("ResultsTable") else {
        tracing::debug!("results table missing, skipping formula update");
        return;
    };

    let impurity_results = RegionFamily::new("ImpurityResults");
    let s2n_results = RegionFamily::new("SignalToNoiseResults");
    for i in 1..=num_impurities.min(table.rows) {
        let row = table.cell(i, 1);
        if let Ok(block) = doc.region(&impurity_results.member(i)) {
            let first = block.cell(2, 2).relative_text();
            let last = block.cell(block.rows, 2).relative_text();
            doc.write_expr(row.row, row.col, &format!("={first}"));
            doc.write_expr(row.row, row.col + 2, &format!("=IF({last}=\"\",\"\",{last})"));
        }
        if let Ok(block) = doc.region(&s2n_results.member(i)) {
            let s2n = block.cell(1, 2).relative_text();
            doc.write_expr(row.row, row.col + 1, &format!("={s2n}"));
        }
    }
}
