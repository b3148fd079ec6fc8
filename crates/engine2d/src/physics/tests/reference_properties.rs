//! Narrow and broad phase checked against brute-force references
//!
//! Inputs are random but seeded, so failures reproduce.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::foundation::math::{Rect, Vec2};
use crate::physics::collision::{shapes_overlap, Shape};
use crate::spatial::{QuadTree, QuadTreeConfig};

fn random_polygon(rng: &mut StdRng, area: f32) -> Shape {
    let sides = rng.gen_range(3..9);
    let mut shape = Shape::regular_polygon(sides, rng.gen_range(0.5..4.0));
    shape.set_rotation(rng.gen_range(0.0..std::f32::consts::TAU));
    shape.set_position(Vec2::new(rng.gen_range(0.0..area), rng.gen_range(0.0..area)));
    shape
}

fn random_circle(rng: &mut StdRng, area: f32) -> Shape {
    let mut shape = Shape::circle(rng.gen_range(0.25..3.0));
    shape.set_position(Vec2::new(rng.gen_range(0.0..area), rng.gen_range(0.0..area)));
    shape
}

/// Orientation of `c` relative to the directed line `a -> b`
fn orient(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp(&(c - a))
}

fn segments_cross(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

fn strictly_inside(polygon: &[Vec2], point: Vec2) -> bool {
    let n = polygon.len();
    let signs: Vec<f32> = (0..n)
        .map(|i| orient(polygon[i], polygon[(i + 1) % n], point))
        .collect();
    signs.iter().all(|&s| s > 0.0) || signs.iter().all(|&s| s < 0.0)
}

/// Convex polygons overlap iff two edges cross or one contains a vertex of the other
fn reference_polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    let edges = |poly: &[Vec2]| -> Vec<(Vec2, Vec2)> {
        (0..poly.len()).map(|i| (poly[i], poly[(i + 1) % poly.len()])).collect()
    };

    let crossing = edges(a)
        .iter()
        .any(|&(p, q)| edges(b).iter().any(|&(r, s)| segments_cross(p, q, r, s)));

    crossing
        || a.iter().any(|&v| strictly_inside(b, v))
        || b.iter().any(|&v| strictly_inside(a, v))
}

fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let edge = b - a;
    let t = ((point - a).dot(&edge) / edge.magnitude_squared()).clamp(0.0, 1.0);
    (a + edge * t - point).magnitude()
}

/// A circle overlaps a convex polygon iff its center is inside or an edge
/// passes closer than the radius
fn reference_circle_polygon_overlap(center: Vec2, radius: f32, polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    strictly_inside(polygon, center)
        || (0..n).any(|i| distance_to_segment(center, polygon[i], polygon[(i + 1) % n]) < radius)
}

/// SAT agrees with itself when the shapes grow or shrink slightly, so the
/// pair is not sitting on the touching boundary
fn is_clear_case(a: &Shape, b: &Shape) -> bool {
    let mut grown = a.clone();
    grown.scale(1.001);
    let mut shrunk = a.clone();
    shrunk.scale(0.999);
    shapes_overlap(&grown, b) == shapes_overlap(&shrunk, b)
}

#[test]
fn test_circle_pairs_match_distance_rule() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..2000 {
        let a = random_circle(&mut rng, 20.0);
        let b = random_circle(&mut rng, 20.0);
        let radius_sum = a.radius() + b.radius();
        let expected = (a.position() - b.position()).magnitude_squared() < radius_sum * radius_sum;
        assert_eq!(shapes_overlap(&a, &b), expected, "{a:?} vs {b:?}");
        assert_eq!(shapes_overlap(&b, &a), expected);
    }
}

#[test]
fn test_polygon_pairs_match_reference() {
    let mut rng = StdRng::seed_from_u64(23);
    let mut overlapping = 0;
    let mut checked = 0;

    for _ in 0..2000 {
        let a = random_polygon(&mut rng, 12.0);
        let b = random_polygon(&mut rng, 12.0);
        if !is_clear_case(&a, &b) {
            continue;
        }

        let expected = reference_polygons_overlap(a.vertices(), b.vertices());
        assert_eq!(shapes_overlap(&a, &b), expected, "{a:?} vs {b:?}");
        assert_eq!(shapes_overlap(&b, &a), expected);

        checked += 1;
        if expected {
            overlapping += 1;
        }
    }

    // Both outcomes were actually exercised
    assert!(checked > 1500);
    assert!(overlapping > 100);
    assert!(checked - overlapping > 100);
}

#[test]
fn test_circle_polygon_pairs_match_reference() {
    let mut rng = StdRng::seed_from_u64(31);
    let mut overlapping = 0;
    let mut checked = 0;

    for _ in 0..2000 {
        let circle = random_circle(&mut rng, 12.0);
        let polygon = random_polygon(&mut rng, 12.0);
        if !is_clear_case(&circle, &polygon) || !is_clear_case(&polygon, &circle) {
            continue;
        }

        let expected =
            reference_circle_polygon_overlap(circle.position(), circle.radius(), polygon.vertices());
        assert_eq!(shapes_overlap(&circle, &polygon), expected, "{circle:?} vs {polygon:?}");
        assert_eq!(shapes_overlap(&polygon, &circle), expected);

        checked += 1;
        if expected {
            overlapping += 1;
        }
    }

    assert!(checked > 1500);
    assert!(overlapping > 100);
    assert!(checked - overlapping > 100);
}

#[test]
fn test_quadtree_candidates_cover_every_overlap() {
    let mut rng = StdRng::seed_from_u64(5);
    let region = Rect::from_size(100.0, 100.0);
    let config = QuadTreeConfig {
        max_entries_per_node: 4,
        max_depth: 6,
        min_node_size: 1.0,
    };

    let shapes: Vec<Shape> = (0..300)
        .map(|i| {
            if i % 2 == 0 {
                random_circle(&mut rng, 100.0)
            } else {
                random_polygon(&mut rng, 100.0)
            }
        })
        .collect();

    let mut tree = QuadTree::new(region, config);
    for (key, shape) in shapes.iter().enumerate() {
        tree.insert(key, shape.minimum_covered_rect());
    }
    assert_eq!(tree.entry_count(), shapes.len());

    let mut candidates = Vec::new();
    for (i, a) in shapes.iter().enumerate() {
        candidates.clear();
        tree.retrieve(&mut candidates, &a.minimum_covered_rect());

        for (j, b) in shapes.iter().enumerate() {
            if i != j && shapes_overlap(a, b) {
                assert!(candidates.contains(&j), "overlap {i}-{j} missed by broad phase");
            }
        }
    }
}
