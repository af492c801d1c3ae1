//! Stability report orchestration
//!
//! Expands a stability study template in place: grows the six conditions
//! tables to the requested number of time points, writes the condition
//! labels, builds out the impurity section family per impurity, and
//! replicates the impurity sample blocks. Runs inside a protection bracket
//! so the document's protection state survives the whole pass.

use labgrid_core::{FormatOrigin, InsertDirection, RegionFamily};

use crate::clone::{clone_region, GrowthAxis};
use crate::error::{Error, Result};
use crate::host::DocumentHost;
use crate::link::{link_regions, LinkOffset, BROADCAST};
use crate::rewrite::{rewrite_down, rewrite_with_static_anchor};

/// Data rows each conditions table carries in the template.
pub const DEFAULT_NUM_CONDITIONS: u32 = 2;
/// Columns per impurity section in the template.
pub const DEFAULT_IMPURITY_COLS: u32 = 4;
/// Impurity counts above this are rejected before any mutation.
pub const MAX_NUM_IMPURITIES: u32 = 5;

/// Conditions tables, grown in this order.
const CONDITION_TABLES: [&str; 6] = [
    "ImpurityConditionsTable",
    "ResultsConditionsTable",
    "ArrayConditionsTable",
    "AssayConditionsTable",
    "ClaimsConditionsTable",
    "ImpuritySummaryConditionsTable",
];

/// Label regions receiving the condition labels, one per table.
const CONDITION_LABEL_REGIONS: [&str; 6] = [
    "ResultsConditions1",
    "ImpurityConditions",
    "ArrayConditions",
    "AssayConditions",
    "ClaimsConditions",
    "ImpuritySummaryConditions",
];

/// Marker region deleted when the study has no impurity samples.
const IMPURITY_SECTIONS_MARKER: &str = "ToDeleteImpuritySections";

/// Expand the stability template for the given study shape.
///
/// `condition_labels` drives the row growth of every conditions table;
/// `num_impurities` the impurity section family; `num_impurity_samples` the
/// sample block replication. Protection is captured before any mutation and
/// restored on every exit path.
pub fn update_worksheet<H: DocumentHost>(
    host: &mut H,
    sample_labels: &[String],
    condition_labels: &[String],
    num_impurities: u32,
    num_impurity_samples: u32,
) -> Result<()> {
    if num_impurities > MAX_NUM_IMPURITIES {
        return Err(Error::InvalidInput(format!(
            "at most {MAX_NUM_IMPURITIES} impurities are supported, got {num_impurities}"
        )));
    }

    tracing::info!(
        conditions = condition_labels.len(),
        num_impurities,
        num_impurity_samples,
        "updating stability worksheet"
    );

    let was_protected = host.set_protection(false);
    let result = run(
        host,
        sample_labels,
        condition_labels,
        num_impurities,
        num_impurity_samples,
    );
    if let Err(err) = host.move_cursor_to_origin() {
        tracing::warn!(error = %err, "cursor reset failed");
    }
    host.set_protection(was_protected);
    result
}

fn run<H: DocumentHost>(
    host: &mut H,
    sample_labels: &[String],
    condition_labels: &[String],
    num_impurities: u32,
    num_impurity_samples: u32,
) -> Result<()> {
    process_main_level(host, condition_labels)?;
    process_impurity_level(host, num_impurities);
    results_analysis(host, sample_labels, condition_labels, num_impurities);
    handle_impurity_samples(
        host,
        sample_labels,
        condition_labels,
        num_impurities,
        num_impurity_samples,
    )
}

/// Grow every conditions table by the condition delta and write the labels.
///
/// At or below the template's default row count nothing moves; the label
/// write still does not run because the template labels already fit.
fn process_main_level<H: DocumentHost>(host: &mut H, condition_labels: &[String]) -> Result<()> {
    let delta = (condition_labels.len() as u32).saturating_sub(DEFAULT_NUM_CONDITIONS);
    if delta == 0 {
        tracing::debug!("condition count within template default, no growth");
        return Ok(());
    }

    for table in CONDITION_TABLES {
        host.insert_rows(table, delta, InsertDirection::Down, FormatOrigin::LeftOrAbove)?;
    }
    for labels in CONDITION_LABEL_REGIONS {
        host.set_region_values(labels, condition_labels)?;
    }
    Ok(())
}

/// Build out the impurity section family up to `num_impurities`.
///
/// Member `i` is cloned from member `i - 1`, so the template's member 1 seeds
/// the chain. Each new difference region is linked back to its summary
/// conditions region. A failed member is logged and skipped; the remaining
/// members are independent.
fn process_impurity_level<H: DocumentHost>(host: &mut H, num_impurities: u32) {
    let impurity = RegionFamily::new("Impurity");
    let summary = RegionFamily::new("ImpuritySummary");
    let summary_conditions = RegionFamily::new("ImpuritySummaryConditions");
    let difference = RegionFamily::new("ImpurityDifferenceCondition");
    let percentage = RegionFamily::new("ImpurityDifferencePercentage");

    for i in 1..=num_impurities {
        if host.region_exists(&summary.member(i)) {
            continue;
        }
        let clones = [
            (&impurity, true),
            (&summary_conditions, false),
            (&difference, true),
            (&percentage, true),
        ];
        let mut failed = false;
        for (family, rewrite) in clones {
            let src = family.member(i - 1);
            let dst = family.member(i);
            if let Err(err) = clone_region(host, &src, &dst, GrowthAxis::Down, 0, 0, rewrite) {
                tracing::warn!(src, dst, error = %err, "impurity section clone failed");
                failed = true;
                break;
            }
        }
        if failed {
            continue;
        }
        link_regions(
            host,
            &difference.member(i),
            &summary_conditions.member(i),
            LinkOffset::new(2, 2),
            LinkOffset::aligned(),
            false,
            true,
        );
    }
}

/// Build out the results table per sample, write the sample labels, and
/// refresh the row-varying formulas of each impurity's difference regions.
///
/// The standards family grows rightward: a missing member widens the
/// Results table and is cloned from the previous member together with its
/// relinking region, then linked into its summary column. A sample whose
/// build-out fails is logged and skipped.
fn results_analysis<H: DocumentHost>(
    host: &mut H,
    sample_labels: &[String],
    condition_labels: &[String],
    num_impurities: u32,
) {
    let standards = RegionFamily::new("ResultsSampleStandards");
    let relinking = RegionFamily::new("ResultsSampleRelinking");
    let summary = RegionFamily::new("ResultsSampleSummary");
    let num_conditions = condition_labels.len() as u32;

    for (idx, label) in sample_labels.iter().enumerate() {
        let n = idx as u32 + 1;
        let name = standards.member(n);
        if !host.region_exists(&name) {
            if let Err(err) = grow_results_block(host, &standards, &relinking, n, num_conditions) {
                tracing::warn!(name, error = %err, "results sample build-out failed");
                continue;
            }
        }
        let label = primary_label(label);
        if let Err(err) = host.set_region_value(&name, 1, 1, &label) {
            tracing::debug!(name, error = %err, "sample standards region missing, skipping");
        }
        link_regions(
            host,
            &relinking.member(n),
            &summary.member(n),
            LinkOffset::new(BROADCAST, 1),
            LinkOffset::new(BROADCAST, 1),
            false,
            false,
        );
    }

    let difference = RegionFamily::new("ImpurityDifferenceCondition");
    let percentage = RegionFamily::new("ImpurityDifferencePercentage");
    for i in 1..=num_impurities {
        let diff = difference.member(i);
        match host.region(&diff) {
            Ok(rect) => {
                if let Err(err) = rewrite_down(host, &diff, rect.row, rect.col, 2) {
                    tracing::warn!(region = diff, error = %err, "difference rewrite failed");
                }
            }
            Err(err) => tracing::debug!(region = diff, error = %err, "skipping rewrite"),
        }

        let pct = percentage.member(i);
        match host.region(&pct) {
            Ok(rect) => {
                // every percentage row compares against the initial row
                if let Err(err) =
                    rewrite_with_static_anchor(host, &pct, rect.row, rect.col, 2, rect.row, rect.col)
                {
                    tracing::warn!(region = pct, error = %err, "percentage rewrite failed");
                }
            }
            Err(err) => tracing::debug!(region = pct, error = %err, "skipping rewrite"),
        }
    }
}

/// Replicate the impurity sample blocks.
///
/// Zero samples strips the whole impurity section via its marker region; one
/// sample only labels the template block; more than one replicates the data
/// and summary blocks per extra sample, relinking each to its summary
/// conditions.
fn handle_impurity_samples<H: DocumentHost>(
    host: &mut H,
    sample_labels: &[String],
    condition_labels: &[String],
    num_impurities: u32,
    num_impurity_samples: u32,
) -> Result<()> {
    let sample_standards = RegionFamily::with_unsuffixed("ImpuritySampleStandards", 0);
    let summary_sample = RegionFamily::with_unsuffixed("ImpuritySummarySample", 0);

    match num_impurity_samples {
        0 => {
            if host.region_exists(IMPURITY_SECTIONS_MARKER) {
                host.delete_region_rows(IMPURITY_SECTIONS_MARKER)?;
            } else {
                tracing::warn!("impurity sections marker missing, nothing to strip");
            }
        }
        1 => {
            let label = sample_label(sample_labels, 1);
            host.set_region_value(&sample_standards.member(1), 1, 1, &label)?;
            host.set_region_value(&summary_sample.member(1), 1, 1, &label)?;
        }
        n => {
            let conditions = condition_labels.len() as u32;
            let summary_difference = RegionFamily::with_unsuffixed("ImpuritySummaryDifference", 0);
            let summary_definitions = RegionFamily::with_unsuffixed("ImpuritySummaryDefinitions", 0);
            let summary_conditions = RegionFamily::with_unsuffixed("ImpuritySummaryConditions", 0);
            let conditions_family = RegionFamily::with_unsuffixed("ImpurityConditions", 0);
            let differences = RegionFamily::with_unsuffixed("ImpurityDifferences", 0);
            let difference_conditions =
                RegionFamily::with_unsuffixed("ImpurityDifferenceConditions", 0);
            let initials = RegionFamily::with_unsuffixed("ImpurityInitials", 0);

            for x in 1..=n {
                host.insert_rows(
                    "ImpurityData",
                    conditions + 1,
                    InsertDirection::Up,
                    FormatOrigin::RightOrBelow,
                )?;
                clone_member(host, &sample_standards, x, true);
                clone_member(host, &conditions_family, x, false);
                clone_member(host, &differences, x, true);
                clone_member(host, &difference_conditions, x, true);
                clone_member(host, &initials, x, true);

                host.insert_rows(
                    "ImpuritySummaryData",
                    conditions + 1,
                    InsertDirection::Up,
                    FormatOrigin::RightOrBelow,
                )?;
                clone_member(host, &summary_sample, x, true);
                clone_member(host, &summary_difference, x, true);
                clone_member(host, &summary_definitions, x, false);
                clone_member(host, &summary_conditions, x, false);

                link_regions(
                    host,
                    &summary_difference.member(x),
                    &summary_conditions.member(x),
                    LinkOffset::new(BROADCAST, BROADCAST),
                    LinkOffset::new(1, 1),
                    false,
                    true,
                );

                let label = sample_label(sample_labels, x);
                if let Err(err) = host.set_region_value(&sample_standards.member(x), 1, 1, &label) {
                    tracing::warn!(sample = x, error = %err, "sample label write failed");
                }
                if let Err(err) = host.set_region_value(&summary_sample.member(x), 1, 1, &label) {
                    tracing::warn!(sample = x, error = %err, "summary label write failed");
                }
            }
        }
    }

    // each impurity section now spans one block per sample
    let impurity = RegionFamily::new("Impurity");
    let block_rows = (condition_labels.len() as u32 + 2) * (num_impurity_samples + 1);
    for i in 1..=num_impurities {
        let name = impurity.member(i);
        if let Ok(rect) = host.region(&name) {
            if rect.rows < block_rows {
                host.set_region(labgrid_core::Region::new(
                    &name, rect.row, rect.col, block_rows, rect.cols,
                ));
            }
        }
    }
    Ok(())
}

/// Widen the Results table by one sample column group and clone the
/// standards and relinking regions from the previous member.
fn grow_results_block<H: DocumentHost>(
    host: &mut H,
    standards: &RegionFamily,
    relinking: &RegionFamily,
    index: u32,
    num_conditions: u32,
) -> Result<()> {
    host.insert_columns(
        "Results",
        num_conditions + 1,
        InsertDirection::ToRight,
        FormatOrigin::LeftOrAbove,
    )?;
    for family in [standards, relinking] {
        clone_region(
            host,
            &family.member(index - 1),
            &family.member(index),
            GrowthAxis::Right,
            0,
            0,
            true,
        )?;
    }
    Ok(())
}

fn clone_member<H: DocumentHost>(host: &mut H, family: &RegionFamily, index: u32, rewrite: bool) {
    let src = family.member(index - 1);
    let dst = family.member(index);
    if let Err(err) = clone_region(host, &src, &dst, GrowthAxis::Down, 0, 0, rewrite) {
        tracing::warn!(src, dst, error = %err, "sample block clone failed");
    }
}

/// Pick the sample label for 1-based sample `index`, falling back to a
/// generated name. Labels are comma-separated records; the first field is
/// the display name.
fn sample_label(sample_labels: &[String], index: u32) -> String {
    sample_labels
        .get(index as usize - 1)
        .map(|s| primary_label(s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("Sample{index}"))
}

fn primary_label(raw: &str) -> String {
    raw.split(',').next().unwrap_or("").trim().to_string()
}
