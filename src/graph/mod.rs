//! In-memory graph model for one evaluation snapshot.
//!
//! Pure data plus lookup; callers that change the node or edge set rebuild
//! the index from scratch.

pub mod index;

pub use index::{AdjacencyIndex, Neighbor};
