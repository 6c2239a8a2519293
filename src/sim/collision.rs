//! Axis-aligned bounding box overlap
//!
//! Edges are inclusive: boxes that only touch count as colliding. No swept
//! test, so a fast object can tunnel through a thin paddle.

use glam::Vec2;

/// Axis-aligned bounding box in field coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from a top-left corner and a size
    pub fn from_rect(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// `one.min <= two.max && two.min <= one.max` on both axes
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let x = self.min.x <= other.max.x && other.min.x <= self.max.x;
        let y = self.min.y <= other.max.y && other.min.y <= self.max.y;
        x && y
    }
}

/// Check whether two boxes overlap
#[inline]
pub fn check_collision(one: &Aabb, two: &Aabb) -> bool {
    one.overlaps(two)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::from_rect(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap() {
        assert!(check_collision(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_collide() {
        assert!(check_collision(&rect(0.0, 0.0, 10.0, 10.0), &rect(10.0, 0.0, 10.0, 10.0)));
        assert!(check_collision(&rect(0.0, 0.0, 10.0, 10.0), &rect(10.0, 10.0, 5.0, 5.0)));
    }

    #[test]
    fn test_separated_on_one_axis() {
        // Overlapping in x, apart in y
        assert!(!check_collision(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 10.5, 10.0, 10.0)));
        // Overlapping in y, apart in x
        assert!(!check_collision(&rect(0.0, 0.0, 10.0, 10.0), &rect(10.5, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn test_containment() {
        assert!(check_collision(&rect(0.0, 0.0, 100.0, 100.0), &rect(40.0, 40.0, 5.0, 5.0)));
        assert!(check_collision(&rect(40.0, 40.0, 5.0, 5.0), &rect(0.0, 0.0, 100.0, 100.0)));
    }
}
