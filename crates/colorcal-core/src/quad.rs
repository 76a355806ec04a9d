use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::Homography;

/// Quadrilateral with corners in TL, TR, BR, BL order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f64>; 4],
}

impl Quad {
    pub fn new(corners: [Point2<f64>; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned rectangle `[x0, x1] × [y0, y1]`.
    pub fn from_bounds(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new([
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ])
    }

    /// Shoelace area; positive for clockwise corners in image (y-down) coordinates.
    pub fn signed_area(&self) -> f64 {
        let c = &self.corners;
        let mut acc = 0.0;
        for k in 0..4 {
            let a = c[k];
            let b = c[(k + 1) % 4];
            acc += a.x * b.y - b.x * a.y;
        }
        0.5 * acc
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Z component of `(c[k] - c[k-1]) × (c[k+1] - c[k])` for every corner.
    pub fn turn_cross_products(&self) -> [f64; 4] {
        let c = &self.corners;
        std::array::from_fn(|k| {
            let prev = c[(k + 3) % 4];
            let cur = c[k];
            let next = c[(k + 1) % 4];
            let e0 = cur - prev;
            let e1 = next - cur;
            e0.x * e1.y - e0.y * e1.x
        })
    }

    /// True when all turns have the same non-zero orientation.
    pub fn is_strictly_convex(&self) -> bool {
        let turns = self.turn_cross_products();
        turns.iter().all(|&t| t > 0.0) || turns.iter().all(|&t| t < 0.0)
    }

    /// Point-in-quad test for convex quads, inclusive of the boundary.
    pub fn contains(&self, p: Point2<f64>) -> bool {
        let c = &self.corners;
        let mut pos = false;
        let mut neg = false;
        for k in 0..4 {
            let a = c[k];
            let b = c[(k + 1) % 4];
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            if cross > 0.0 {
                pos = true;
            } else if cross < 0.0 {
                neg = true;
            }
            if pos && neg {
                return false;
            }
        }
        true
    }

    /// `(min, max)` corners of the axis-aligned bounding box.
    pub fn bounds(&self) -> (Point2<f64>, Point2<f64>) {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.corners {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    pub fn map(&self, h: &Homography) -> Quad {
        Quad::new(self.corners.map(|p| h.apply(p)))
    }

    pub fn is_finite(&self) -> bool {
        self.corners.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_square_area_and_containment() {
        let q = Quad::from_bounds(0.0, 0.0, 2.0, 3.0);
        assert_relative_eq!(q.signed_area(), 6.0);
        assert!(q.is_strictly_convex());
        assert!(q.contains(Point2::new(1.0, 1.5)));
        assert!(q.contains(Point2::new(0.0, 0.0)));
        assert!(!q.contains(Point2::new(2.5, 1.0)));
    }

    #[test]
    fn reversed_winding_is_still_convex() {
        let q = Quad::from_bounds(0.0, 0.0, 1.0, 1.0);
        let rev = Quad::new([q.corners[0], q.corners[3], q.corners[2], q.corners[1]]);
        assert_relative_eq!(rev.signed_area(), -1.0);
        assert!(rev.is_strictly_convex());
        assert!(rev.contains(Point2::new(0.5, 0.5)));
    }

    #[test]
    fn bow_tie_is_not_convex() {
        let q = Quad::new([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ]);
        assert!(!q.is_strictly_convex());
        assert_relative_eq!(q.area(), 0.0);
    }

    #[test]
    fn bounds_cover_all_corners() {
        let q = Quad::new([
            Point2::new(3.0, 1.0),
            Point2::new(8.0, 2.0),
            Point2::new(7.5, 9.0),
            Point2::new(2.0, 7.0),
        ]);
        let (min, max) = q.bounds();
        assert_eq!(min, Point2::new(2.0, 1.0));
        assert_eq!(max, Point2::new(8.0, 9.0));
    }
}
