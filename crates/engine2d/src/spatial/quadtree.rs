//! Quadtree spatial partitioning structure
//!
//! Divides 2D space into hierarchical regions for fast broad-phase
//! queries. A node stores entries in its own bucket until it exceeds its
//! capacity, then splits into four quadrants. Entries whose bounds fit
//! entirely inside one quadrant move down; entries that straddle a split
//! line stay in the node itself, so every entry is stored exactly once.
//!
//! The tree is meant to be rebuilt every tick from current positions
//! rather than updated incrementally.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::foundation::math::Rect;

/// Configuration for quadtree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Maximum entries per node before subdivision
    pub max_entries_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum quadrant size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_entries_per_node: 10,
            max_depth: 5,
            min_node_size: 1.0,
        }
    }
}

/// Entry stored in the quadtree: a key and the bounds it was inserted with
#[derive(Debug, Clone, Copy)]
pub struct QuadTreeEntry<K> {
    /// Caller's identifier for the stored object
    pub key: K,
    /// Axis-aligned bounds at insertion time
    pub bounds: Rect,
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct QuadTreeNode<K> {
    /// World-space bounds of this node
    pub bounds: Rect,

    /// Entries held by this node itself
    pub entries: Vec<QuadTreeEntry<K>>,

    /// Child quadrants, None until the node splits
    pub children: Option<Box<[QuadTreeNode<K>; 4]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl<K: Copy> QuadTreeNode<K> {
    /// Create a new leaf node
    pub fn new(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn can_subdivide(&self, config: &QuadTreeConfig) -> bool {
        let extents = self.bounds.extents();
        self.depth < config.max_depth && extents.x.min(extents.y) >= config.min_node_size
    }

    /// Insert an entry into this node.
    ///
    /// Returns false if the entry's bounds are not inside this node.
    pub fn insert(&mut self, entry: QuadTreeEntry<K>, config: &QuadTreeConfig) -> bool {
        if !self.bounds.contains_rect(&entry.bounds) {
            return false;
        }

        self.insert_contained(entry, config);
        true
    }

    fn insert_contained(&mut self, entry: QuadTreeEntry<K>, config: &QuadTreeConfig) {
        if self.is_leaf() {
            if self.entries.len() < config.max_entries_per_node || !self.can_subdivide(config) {
                self.entries.push(entry);
                return;
            }
            self.subdivide(config);
        }

        self.place(entry, config);
    }

    /// Push an entry into the single quadrant that fully contains it, or
    /// keep it here when it straddles a split line.
    fn place(&mut self, entry: QuadTreeEntry<K>, config: &QuadTreeConfig) {
        if let Some(children) = self.children.as_mut() {
            if let Some(child) = children
                .iter_mut()
                .find(|child| child.bounds.contains_rect(&entry.bounds))
            {
                child.insert_contained(entry, config);
                return;
            }
        }

        self.entries.push(entry);
    }

    /// Subdivide this node into 4 children and redistribute its entries
    fn subdivide(&mut self, config: &QuadTreeConfig) {
        if self.children.is_some() {
            return; // Already subdivided
        }

        let depth = self.depth + 1;
        let [q0, q1, q2, q3] = self.bounds.quadrants();
        self.children = Some(Box::new([
            QuadTreeNode::new(q0, depth),
            QuadTreeNode::new(q1, depth),
            QuadTreeNode::new(q2, depth),
            QuadTreeNode::new(q3, depth),
        ]));

        for entry in std::mem::take(&mut self.entries) {
            self.place(entry, config);
        }
    }

    /// Append every key that may overlap `query`.
    ///
    /// Collects this node's own entries, then descends into each quadrant
    /// whose region intersects the query bounds.
    pub fn retrieve(&self, query: &Rect, results: &mut Vec<K>) {
        results.extend(self.entries.iter().map(|entry| entry.key));

        if let Some(ref children) = self.children {
            for child in children.iter() {
                if child.bounds.intersects(query) {
                    child.retrieve(query, results);
                }
            }
        }
    }

    /// Collect the bounds of this node and all descendants (for visualization)
    pub fn collect_bounds(&self, bounds: &mut Vec<Rect>) {
        bounds.push(self.bounds);
        if let Some(ref children) = self.children {
            for child in children.iter() {
                child.collect_bounds(bounds);
            }
        }
    }

    /// Count total entries in this node and all children
    pub fn count_entries(&self) -> usize {
        let mut count = self.entries.len();

        if let Some(ref children) = self.children {
            for child in children.iter() {
                count += child.count_entries();
            }
        }

        count
    }
}

/// Quadtree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct QuadTree<K> {
    /// Root node covering the whole tracked region
    pub root: QuadTreeNode<K>,

    /// Configuration
    config: QuadTreeConfig,
}

impl<K: Copy> QuadTree<K> {
    /// Create a new quadtree over the given world region
    pub fn new(region: Rect, config: QuadTreeConfig) -> Self {
        Self {
            root: QuadTreeNode::new(region, 0),
            config,
        }
    }

    /// World region covered by the tree
    pub fn region(&self) -> Rect {
        self.root.bounds
    }

    /// Configuration in use
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Insert a key with its current bounds.
    ///
    /// Bounds that cross the edge of the world region are kept in the root
    /// bucket so they are still found by every query. Bounds entirely
    /// outside the region are ignored and false is returned.
    pub fn insert(&mut self, key: K, bounds: Rect) -> bool {
        let entry = QuadTreeEntry { key, bounds };

        if self.root.insert(entry, &self.config) {
            return true;
        }

        if self.root.bounds.intersects(&bounds) {
            self.root.entries.push(entry);
            true
        } else {
            trace!("quadtree: ignoring bounds {bounds:?} outside {:?}", self.root.bounds);
            false
        }
    }

    /// Append every key stored in a node that `query` reaches
    pub fn retrieve(&self, results: &mut Vec<K>, query: &Rect) {
        self.root.retrieve(query, results);
    }

    /// Bounds of every node in the tree (for visualization)
    pub fn node_bounds(&self) -> Vec<Rect> {
        let mut bounds = Vec::new();
        self.root.collect_bounds(&mut bounds);
        bounds
    }

    /// Get total entry count
    pub fn entry_count(&self) -> usize {
        self.root.count_entries()
    }

    /// Drop all content and return to a single empty bucket
    pub fn clear(&mut self) {
        self.root = QuadTreeNode::new(self.root.bounds, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    fn square(x: f32, y: f32, half: f32) -> Rect {
        Rect::from_center_extents(Vec2::new(x, y), Vec2::new(half, half))
    }

    fn small_tree() -> QuadTree<u32> {
        let config = QuadTreeConfig {
            max_entries_per_node: 2,
            max_depth: 4,
            min_node_size: 1.0,
        };
        QuadTree::new(Rect::from_size(100.0, 100.0), config)
    }

    #[test]
    fn test_quadtree_basic_insertion() {
        let mut tree = small_tree();
        assert!(tree.insert(1, square(10.0, 10.0, 1.0)));
        assert_eq!(tree.entry_count(), 1);
        assert!(tree.root.is_leaf());
    }

    #[test]
    fn test_quadtree_subdivision() {
        let mut tree = small_tree();
        tree.insert(1, square(10.0, 10.0, 1.0));
        tree.insert(2, square(80.0, 10.0, 1.0));
        tree.insert(3, square(10.0, 80.0, 1.0));

        assert_eq!(tree.entry_count(), 3);
        assert!(tree.root.children.is_some());
        assert!(tree.root.entries.is_empty());
    }

    #[test]
    fn test_straddling_entry_stays_in_parent() {
        let mut tree = small_tree();
        tree.insert(1, square(10.0, 10.0, 1.0));
        tree.insert(2, square(80.0, 80.0, 1.0));
        tree.insert(3, square(50.0, 50.0, 2.0));

        assert_eq!(tree.root.entries.len(), 1);
        assert_eq!(tree.root.entries[0].key, 3);
        assert_eq!(tree.entry_count(), 3);
    }

    #[test]
    fn test_max_depth_stops_splitting() {
        let config = QuadTreeConfig {
            max_entries_per_node: 1,
            max_depth: 2,
            min_node_size: 0.0,
        };
        let mut tree = QuadTree::new(Rect::from_size(100.0, 100.0), config);
        for key in 0..20 {
            tree.insert(key, square(5.0, 5.0, 0.5));
        }

        assert_eq!(tree.entry_count(), 20);
        let max_depth = tree.node_bounds().len();
        // root + 4 children + 4 grandchildren
        assert_eq!(max_depth, 9);
    }

    #[test]
    fn test_min_node_size_uses_shorter_side() {
        let config = QuadTreeConfig {
            max_entries_per_node: 1,
            max_depth: 8,
            min_node_size: 6.0,
        };
        // 200 x 10 strip: the root is already below the minimum height
        let mut tree = QuadTree::new(Rect::from_size(200.0, 10.0), config);
        for key in 0..8 {
            tree.insert(key, square(5.0 + key as f32 * 0.1, 5.0, 0.5));
        }

        assert_eq!(tree.entry_count(), 8);
        assert_eq!(tree.node_bounds().len(), 1);
    }

    #[test]
    fn test_outside_region_is_ignored() {
        let mut tree = small_tree();
        assert!(!tree.insert(1, square(500.0, 500.0, 1.0)));
        assert_eq!(tree.entry_count(), 0);

        // Crossing the world edge is kept at the root
        assert!(tree.insert(2, square(0.0, 50.0, 2.0)));
        assert_eq!(tree.root.entries.len(), 1);
    }

    #[test]
    fn test_retrieve_prunes_distant_quadrants() {
        let mut tree = small_tree();
        tree.insert(1, square(10.0, 10.0, 1.0));
        tree.insert(2, square(12.0, 12.0, 1.0));
        tree.insert(3, square(90.0, 90.0, 1.0));

        let mut results = Vec::new();
        tree.retrieve(&mut results, &square(11.0, 11.0, 1.0));
        results.sort_unstable();
        assert_eq!(results, vec![1, 2]);
    }

    #[test]
    fn test_clear_resets_to_single_bucket() {
        let mut tree = small_tree();
        for key in 0..10 {
            tree.insert(key, square(5.0 + key as f32 * 9.0, 5.0, 1.0));
        }
        tree.clear();

        assert_eq!(tree.entry_count(), 0);
        assert!(tree.root.is_leaf());
        assert_eq!(tree.region(), Rect::from_size(100.0, 100.0));
    }
}
