use crate::{DVec3, Interval, Ray};

/// Minimum extent of any axis; thinner boxes are padded to this width.
const MIN_EXTENT: f64 = 1e-4;

/// Widening of each slab during the hit test, relative to the slab's
/// magnitude and never less than this many world units. Covers the rounding
/// in primitive intersection, so a hit exactly on a box face is never pruned.
const SLAB_PADDING: f64 = 1e-9;

/// Bound on the relative error of the slab distances, 2 * gamma(3).
const SLAB_ERROR: f64 = 2.0 * (3.0 * 0.5 * f64::EPSILON) / (1.0 - 3.0 * 0.5 * f64::EPSILON);

/// Axis-aligned bounding box used by the BVH.
///
/// Defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(
            Interval::new(min.x, max.x),
            Interval::new(min.y, max.y),
            Interval::new(min.z, max.z),
        )
    }

    /// Create the tightest AABB around a set of points.
    pub fn enclosing(points: &[DVec3]) -> Self {
        let min = points
            .iter()
            .fold(DVec3::splat(f64::INFINITY), |acc, p| acc.min(*p));
        let max = points
            .iter()
            .fold(DVec3::splat(f64::NEG_INFINITY), |acc, p| acc.max(*p));
        Self::from_points(min, max)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> DVec3 {
        DVec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> DVec3 {
        DVec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method. Division by a zero direction component yields
    /// infinities, which the comparisons handle correctly. The test is
    /// conservative: slabs are widened slightly and the slab distances are
    /// pushed outward by their rounding bound, so boundary hits survive.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let origin = r.origin();
        let direction = r.direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            if slab.min > slab.max {
                return false;
            }
            let magnitude = slab.min.abs().max(slab.max.abs());
            let pad = if magnitude.is_finite() {
                SLAB_PADDING * magnitude.max(1.0)
            } else {
                0.0
            };
            let inv_d = 1.0 / direction[axis];
            let mut t0 = (slab.min - pad - origin[axis]) * inv_d;
            let mut t1 = (slab.max + pad - origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t0 *= if t0 > 0.0 { 1.0 - SLAB_ERROR } else { 1.0 + SLAB_ERROR };
            t1 *= if t1 > 0.0 { 1.0 + SLAB_ERROR } else { 1.0 - SLAB_ERROR };
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return false;
            }
        }

        true
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> DVec3 {
        (self.min() + self.max()) * 0.5
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}
