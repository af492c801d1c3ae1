//! Template expansion engine for laboratory report grids.
//!
//! The engine takes a templated grid document, owned by a
//! [`DocumentHost`](host::DocumentHost), and reshapes it for a concrete
//! study: growing named condition tables, cloning indexed region families,
//! linking regions to each other with written references, and propagating
//! row-varying formulas. Two orchestrators drive the primitives end to end,
//! one for stability studies and one for impurity sensitivity studies.

pub mod clone;
pub mod error;
pub mod host;
pub mod link;
pub mod rewrite;
pub mod sensitivity;
pub mod session;
pub mod stability;

pub use clone::{clone_region, CloneOutcome, GrowthAxis};
pub use error::{Error, Result};
pub use host::DocumentHost;
pub use link::{link_regions, LinkOffset, LinkResult, BROADCAST};
pub use rewrite::{rewrite_down, rewrite_with_static_anchor};
pub use session::HostSession;
