//! Narrow-phase overlap tests
//!
//! Circle pairs use the distance between centers. Every other pair runs a
//! separating-axis test over the polygon edge normals of both shapes, plus
//! the axis from a circle's center to the closest polygon vertex. The first
//! separating axis ends the test.
//!
//! Shapes that only touch (zero overlap on some axis) do not collide.

use crate::foundation::math::{Vec2, Vec2Ext};
use super::shape::Shape;

/// Minimum translation needed to separate two overlapping shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first shape towards the second
    pub normal: Vec2,
    /// Overlap depth along `normal` (always positive)
    pub depth: f32,
}

/// Exact overlap test
pub fn shapes_overlap(a: &Shape, b: &Shape) -> bool {
    find_contact(a, b).is_some()
}

/// Exact overlap test that also reports the minimum translation vector
pub fn find_contact(a: &Shape, b: &Shape) -> Option<Contact> {
    if !a.is_valid() || !b.is_valid() {
        return None;
    }

    if a.is_circle() && b.is_circle() {
        return circle_contact(a, b);
    }

    let mut axes = a.axes();
    axes.extend(b.axes());
    if a.is_circle() {
        axes.extend(circle_axis(a, b));
    }
    if b.is_circle() {
        axes.extend(circle_axis(b, a));
    }

    let mut best: Option<Contact> = None;
    for axis in &axes {
        let (min_a, max_a) = a.project(axis);
        let (min_b, max_b) = b.project(axis);

        // Push needed to move b past a's max, or a past b's max
        let forward = max_a - min_b;
        let backward = max_b - min_a;
        if forward <= 0.0 || backward <= 0.0 {
            return None;
        }

        let candidate = if forward < backward {
            Contact { normal: *axis, depth: forward }
        } else {
            Contact { normal: -axis, depth: backward }
        };

        if best.map_or(true, |current| candidate.depth < current.depth) {
            best = Some(candidate);
        }
    }

    best
}

fn circle_contact(a: &Shape, b: &Shape) -> Option<Contact> {
    let offset = b.position() - a.position();
    let radius_sum = a.radius() + b.radius();
    let distance_sq = offset.magnitude_squared();
    if distance_sq >= radius_sum * radius_sum {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > 0.0 { offset / distance } else { Vec2::new(1.0, 0.0) };
    Some(Contact {
        normal,
        depth: radius_sum - distance,
    })
}

/// Axis from a circle's center to the polygon vertex closest to it
fn circle_axis(circle: &Shape, polygon: &Shape) -> Option<Vec2> {
    let center = circle.position();
    polygon
        .closest_vertex(&center)
        .map(|vertex| (vertex - center).normalize_or_zero())
        .filter(|axis| *axis != Vec2::zeros())
}
