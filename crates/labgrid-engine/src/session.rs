//! Host session lifecycle
//!
//! The sensitivity flow needs more than a borrowed document: it copies a
//! source file, asks the host to open the copy, mutates it, then saves and
//! closes. [`HostSession`] is that open/save/close surface, passed into the
//! orchestrator explicitly so there is no process-wide host handle.

use std::path::Path;

use crate::error::Result;
use crate::host::DocumentHost;

/// An explicit connection to a document-editing host.
///
/// `open` hands out a document the caller mutates through [`DocumentHost`];
/// `save` and `close` take it back. Implementations map transport failures
/// to [`Error::HostUnavailable`](crate::error::Error::HostUnavailable) and
/// rejected operations to
/// [`Error::HostOperationFailed`](crate::error::Error::HostOperationFailed).
pub trait HostSession {
    type Doc: DocumentHost;

    /// Open the document at `path` for editing.
    fn open(&mut self, path: &Path) -> Result<Self::Doc>;

    /// Persist the document back to `path`.
    fn save(&mut self, doc: &Self::Doc, path: &Path) -> Result<()>;

    /// Release the document. Best-effort on the failure path; callers log
    /// and discard the error when already unwinding.
    fn close(&mut self, doc: Self::Doc) -> Result<()>;
}
