//! View composition: resolving datasets and views into flat row sets.
//!
//! The materializer is the seam between stored specifications and every
//! analysis pass: profiling, discovery, and the hierarchy builder all
//! consume the `MaterializedSource` shape produced here, as does the
//! embedded query evaluator collaborator.

mod materialize;

pub use materialize::{materialize, MaterializedSource, SourceRef};
