//! End-to-end tests for the sensitivity orchestration flow over JSON-backed
//! documents: template on disk, copy, mutate, save, reopen, verify.

use std::path::PathBuf;

use labgrid_core::{Grid, Region};
use labgrid_engine::sensitivity::update_sensitivity_sheet;
use labgrid_host::{DocumentFile, JsonSession};
use pretty_assertions::assert_eq;

/// Build the sensitivity template: raw-data table with six replicate rows,
/// the results-formula table containing the second sample-number column,
/// one impurity block, and the hidden scratch section.
fn template() -> Grid {
    let mut grid = Grid::new("sensitivity");

    grid.set_region(Region::new("SampleNumsRawData", 10, 2, 6, 1));
    // the second sample-number column lives inside the results-formula
    // table, so it grows with it
    grid.set_region(Region::new("SNResultsFormulas", 30, 2, 8, 3));
    grid.set_region(Region::new("SampleNumsRawData2", 31, 2, 7, 1));

    grid.set_region(Region::new("ResultsTable", 50, 2, 2, 3));
    grid.set_region(Region::new("ImpurityResults1", 60, 2, 4, 2));
    grid.write_value(61, 3, "impurity figure");
    grid.set_region(Region::new("SignalToNoiseResults1", 70, 2, 2, 2));

    grid.set_region(Region::new("ToDelete", 100, 1, 3, 2));
    grid.write_value(100, 1, "scratch");

    grid.set_protection(true);
    grid
}

fn write_template(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("template.json");
    DocumentFile::from_grid(&template()).store(&path).unwrap();
    path
}

fn reopen(path: &PathBuf) -> Grid {
    DocumentFile::load(path).unwrap().into_grid()
}

#[test]
fn ten_replicates_grow_both_tables_and_renumber() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_template(&dir);

    let mut session = JsonSession::new();
    let produced = update_sensitivity_sheet(&mut session, &source, 10, 1).unwrap();
    let grid = reopen(&produced);

    let raw = grid.region("SampleNumsRawData").unwrap();
    assert_eq!(raw.rows, 10, "raw data grew by 4 rows");
    assert_eq!(grid.region("SNResultsFormulas").unwrap().rows, 12);

    // labels "1".."9" in both sample-number regions
    let raw2 = grid.region("SampleNumsRawData2").unwrap();
    for (region, name) in [(raw, "raw"), (raw2, "raw2")] {
        for i in 1..=9u32 {
            let addr = region.cell(i, 1);
            assert_eq!(
                grid.read_value(addr.row, addr.col).as_deref(),
                Some(i.to_string().as_str()),
                "{name} row {i}"
            );
        }
    }

    assert!(!grid.region_exists("ToDelete"), "scratch section stripped");
    assert!(grid.is_protected(), "protection restored after the run");

    std::fs::remove_file(produced).unwrap();
}

#[test]
fn two_replicates_shrink_to_the_floor() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_template(&dir);

    let mut session = JsonSession::new();
    let produced = update_sensitivity_sheet(&mut session, &source, 2, 1).unwrap();
    let grid = reopen(&produced);

    let raw = grid.region("SampleNumsRawData").unwrap();
    assert_eq!(raw.rows, 2, "never below two data rows");
    let addr = raw.cell(1, 1);
    assert_eq!(grid.read_value(addr.row, addr.col).as_deref(), Some("1"));

    std::fs::remove_file(produced).unwrap();
}

#[test]
fn extra_impurities_clone_blocks_and_fill_the_results_table() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_template(&dir);

    let mut session = JsonSession::new();
    let produced = update_sensitivity_sheet(&mut session, &source, 6, 2).unwrap();
    let grid = reopen(&produced);

    let block2 = grid.region("ImpurityResults2").unwrap();
    let src = grid.region("ImpurityResults1").unwrap();
    assert_eq!(block2.row, src.row + src.rows, "clone placed adjacent");
    // cloned content plus the written block label
    let figure = block2.cell(2, 2);
    assert_eq!(
        grid.read_value(figure.row, figure.col).as_deref(),
        Some("Impurity2")
    );
    assert!(grid.region_exists("SignalToNoiseResults2"));

    // each results-table row points at its impurity block
    let table = grid.region("ResultsTable").unwrap();
    for i in 1..=2u32 {
        let row = table.cell(i, 1);
        assert!(grid.read_expr(row.row, row.col).is_some(), "row {i} col 1");
        assert!(
            grid.read_expr(row.row, row.col + 2).is_some(),
            "row {i} col 3"
        );
    }

    std::fs::remove_file(produced).unwrap();
}

#[test]
fn source_document_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_template(&dir);
    let before = std::fs::read_to_string(&source).unwrap();

    let mut session = JsonSession::new();
    let produced = update_sensitivity_sheet(&mut session, &source, 10, 1).unwrap();
    assert_ne!(produced, source);
    assert_eq!(std::fs::read_to_string(&source).unwrap(), before);

    std::fs::remove_file(produced).unwrap();
}
