//! Spatial partitioning data structures
//!
//! Provides the broad-phase index used to shortlist collision candidates
//! in 2D space.

mod quadtree;

pub use quadtree::{QuadTree, QuadTreeConfig, QuadTreeEntry, QuadTreeNode};
