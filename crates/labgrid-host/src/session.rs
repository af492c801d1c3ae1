//! JSON-file host session
//!
//! Implements the engine's [`HostSession`] over [`DocumentFile`] storage:
//! opening a path loads the grid, saving snapshots it back, closing drops
//! it. Storage failures are mapped onto the engine's host error taxonomy so
//! orchestrators treat this host like any remote one.

use std::path::Path;

use labgrid_core::Grid;
use labgrid_engine::HostSession;

use crate::document::DocumentFile;
use crate::error::Error;

/// A session against documents stored as JSON files.
#[derive(Debug, Default)]
pub struct JsonSession;

impl JsonSession {
    pub fn new() -> Self {
        Self
    }
}

fn map_err(err: Error) -> labgrid_engine::Error {
    match err {
        Error::Io { .. } => labgrid_engine::Error::HostUnavailable(err.to_string()),
        Error::Malformed { .. } => labgrid_engine::Error::HostOperationFailed(err.to_string()),
    }
}

impl HostSession for JsonSession {
    type Doc = Grid;

    fn open(&mut self, path: &Path) -> labgrid_engine::Result<Grid> {
        let grid = DocumentFile::load(path).map_err(map_err)?.into_grid();
        tracing::debug!(path = %path.display(), regions = grid.regions().len(), "opened document");
        Ok(grid)
    }

    fn save(&mut self, doc: &Grid, path: &Path) -> labgrid_engine::Result<()> {
        DocumentFile::from_grid(doc).store(path).map_err(map_err)?;
        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }

    fn close(&mut self, doc: Grid) -> labgrid_engine::Result<()> {
        tracing::debug!(name = doc.name(), "closed document");
        Ok(())
    }
}
