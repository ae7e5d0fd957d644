use glam::Vec3;

/// Axis-aligned bounding box in 3-D.
///
/// An empty box has `min = +MAX` and `max = -MAX`, so the first `grow`
/// collapses it onto that point. Non-finite points poison the box (it stops
/// being [`valid`](Self::valid)); use [`grow_safe`](Self::grow_safe) to skip them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundBox {
    /// Box that contains nothing.
    pub const EMPTY: BoundBox = BoundBox {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(-f32::MAX),
    };

    /// Degenerate box containing a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Expand the box to contain `p`.
    ///
    /// A NaN component propagates into the box instead of being dropped.
    pub fn grow(&mut self, p: Vec3) {
        self.min = Vec3::new(
            pick_min(self.min.x, p.x),
            pick_min(self.min.y, p.y),
            pick_min(self.min.z, p.z),
        );
        self.max = Vec3::new(
            pick_max(self.max.x, p.x),
            pick_max(self.max.y, p.y),
            pick_max(self.max.z, p.z),
        );
    }

    /// Expand the box to contain `p`, ignoring points with NaN/Inf components.
    pub fn grow_safe(&mut self, p: Vec3) {
        if p.is_finite() {
            self.grow(p);
        }
    }

    /// Whether the box is non-empty and has finite extents.
    pub fn valid(&self) -> bool {
        self.min.cmple(self.max).all() && self.min.is_finite() && self.max.is_finite()
    }

    /// Centre point of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents along each axis.
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Length of the space diagonal.
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }

    /// Whether a point lies inside (or on the boundary of) the box.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Return the smallest box that contains both `self` and `other`.
    pub fn merge(&self, other: &BoundBox) -> BoundBox {
        BoundBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl Default for BoundBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

fn pick_min(current: f32, candidate: f32) -> f32 {
    if candidate < current || candidate.is_nan() {
        candidate
    } else {
        current
    }
}

fn pick_max(current: f32, candidate: f32) -> f32 {
    if candidate > current || candidate.is_nan() {
        candidate
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundBox {
        BoundBox {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        }
    }

    #[test]
    fn empty_box_is_invalid() {
        assert!(!BoundBox::EMPTY.valid());
        assert_eq!(BoundBox::default(), BoundBox::EMPTY);
    }

    #[test]
    fn first_grow_collapses_onto_point() {
        let mut bb = BoundBox::EMPTY;
        bb.grow(Vec3::new(1.0, -2.0, 3.0));
        assert!(bb.valid());
        assert_eq!(bb.min, Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(bb.max, Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn grow_propagates_nan() {
        let mut bb = unit_box();
        bb.grow(Vec3::new(f32::NAN, 0.5, 0.5));
        assert!(!bb.valid());

        // Once poisoned, later finite points do not repair it.
        bb.grow(Vec3::splat(0.25));
        assert!(!bb.valid());
    }

    #[test]
    fn grow_with_infinity_is_invalid() {
        let mut bb = unit_box();
        bb.grow(Vec3::new(f32::INFINITY, 0.0, 0.0));
        assert!(!bb.valid());
    }

    #[test]
    fn grow_safe_skips_non_finite() {
        let mut bb = BoundBox::EMPTY;
        bb.grow_safe(Vec3::new(f32::NAN, 0.0, 0.0));
        bb.grow_safe(Vec3::new(0.0, f32::NEG_INFINITY, 0.0));
        assert!(!bb.valid());

        bb.grow_safe(Vec3::new(2.0, 1.0, 0.0));
        bb.grow_safe(Vec3::new(-1.0, 3.0, 4.0));
        assert!(bb.valid());
        assert_eq!(bb.min, Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(bb.max, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn bounding_box_center_and_extents() {
        let bb = unit_box();
        assert_eq!(bb.center(), Vec3::splat(0.5));
        assert_eq!(bb.half_extents(), Vec3::splat(0.5));
        assert!((bb.diagonal() - 3.0_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn bounding_box_contains_point() {
        let bb = unit_box();
        assert!(bb.contains_point(Vec3::splat(0.5)));
        assert!(bb.contains_point(Vec3::ZERO)); // boundary
        assert!(bb.contains_point(Vec3::ONE)); // boundary
        assert!(!bb.contains_point(Vec3::new(1.1, 0.5, 0.5)));
        assert!(!bb.contains_point(Vec3::new(-0.1, 0.5, 0.5)));
    }

    #[test]
    fn bounding_box_merge() {
        let a = unit_box();
        let b = BoundBox {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(0.5),
        };
        let merged = a.merge(&b);
        assert_eq!(merged.min, Vec3::splat(-1.0));
        assert_eq!(merged.max, Vec3::ONE);
    }
}
