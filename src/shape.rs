use crate::utils::BoolExt;
use crate::vector::{UnitVector, Vector};

/// Surface tolerance: a point closer than half of it to a face is on that face.
pub const CAR_TOLERANCE: f64 = 1e-9;

/// Half of [`CAR_TOLERANCE`], the effective band used by the boundary tests.
pub const HALF_TOLERANCE: f64 = 0.5 * CAR_TOLERANCE;

/// Axis-aligned box centred on its own local origin and filled with one material.
///
/// All distances take points in the box's local frame. A point within
/// [`HALF_TOLERANCE`] of a face counts as on the surface: moving outward from
/// there gives a zero distance to out.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    name: &'static str,
    material_index: usize,
    half_lengths: [f64; 3],
}

impl BoxShape {
    pub fn new(name: &'static str, material_index: usize, half_lengths: [f64; 3]) -> Self {
        let mut shape = Self {
            name,
            material_index,
            half_lengths: [1.0; 3],
        };
        for (axis, &h) in half_lengths.iter().enumerate() {
            shape.set_half_length(h, axis);
        }
        shape
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn material_index(&self) -> usize {
        self.material_index
    }

    pub fn half_length(&self, axis: usize) -> f64 {
        self.half_lengths[axis]
    }

    /// Values not above twice the tolerance are ignored and the last valid one is kept.
    pub fn set_half_length(&mut self, value: f64, axis: usize) {
        if value > 2.0 * CAR_TOLERANCE {
            self.half_lengths[axis] = value;
        } else {
            log::trace!(
                "{}: ignoring half length {} along axis {}",
                self.name,
                value,
                axis
            );
        }
    }

    /// Distance from the local point `p` along `v` to the box boundary.
    ///
    /// Zero when the point is on (or beyond) a face and `v` points outward
    /// through it. An axis with a null direction component never limits.
    pub fn distance_to_out(&self, p: Vector<f64>, v: UnitVector<f64>) -> f64 {
        let p = p.to_array();
        let v = v.to_array();
        let mut dist = f64::INFINITY;
        for axis in 0..3 {
            let h = self.half_lengths[axis];
            if p[axis].abs() - h >= -HALF_TOLERANCE && p[axis] * v[axis] > 0.0 {
                return 0.0;
            }
            if v[axis] != 0.0 {
                let face = (v[axis] > 0.0).if_else(h, -h);
                dist = dist.min((face - p[axis]) / v[axis]);
            }
        }
        dist
    }

    /// Safety: distance from the local point `p` to the nearest face, zero
    /// outside or within tolerance of the surface.
    pub fn safety(&self, p: Vector<f64>) -> f64 {
        let p = p.to_array();
        let dist = (0..3)
            .map(|axis| self.half_lengths[axis] - p[axis].abs())
            .fold(f64::INFINITY, f64::min);
        (dist >= HALF_TOLERANCE).if_else(dist, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn unit_box() -> BoxShape {
        BoxShape::new("Test", 1, [1.0, 2.0, 3.0])
    }

    fn dir(x: f64, y: f64, z: f64) -> UnitVector<f64> {
        UnitVector::normalize(Vector::new(x, y, z)).unwrap()
    }

    #[test]
    fn distance_along_axes() {
        let b = unit_box();
        let o = Vector::zero();
        assert_abs_diff_eq!(b.distance_to_out(o, dir(1.0, 0.0, 0.0)), 1.0);
        assert_abs_diff_eq!(b.distance_to_out(o, dir(0.0, -1.0, 0.0)), 2.0);
        assert_abs_diff_eq!(b.distance_to_out(o, dir(0.0, 0.0, 1.0)), 3.0);
        let p = Vector::new(0.5, 0.0, 0.0);
        assert_abs_diff_eq!(b.distance_to_out(p, dir(-1.0, 0.0, 0.0)), 1.5);
    }

    #[test]
    fn on_surface_moving_out_is_zero() {
        let b = unit_box();
        let p = Vector::new(1.0, 0.0, 0.0);
        assert_eq!(b.distance_to_out(p, dir(1.0, 0.0, 0.0)), 0.0);
        let p = Vector::new(1.0 - 0.4 * CAR_TOLERANCE, 0.0, 0.0);
        assert_eq!(b.distance_to_out(p, dir(1.0, 1.0, 0.0)), 0.0);
        // same point, moving inward
        assert_abs_diff_eq!(b.distance_to_out(p, dir(-1.0, 0.0, 0.0)), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn safety_is_min_margin() {
        let b = unit_box();
        assert_abs_diff_eq!(b.safety(Vector::new(0.25, 0.0, 0.0)), 0.75);
        assert_abs_diff_eq!(b.safety(Vector::new(0.0, 1.5, 2.9)), 0.1, epsilon = 1e-12);
        assert_eq!(b.safety(Vector::new(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(b.safety(Vector::new(5.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn degenerate_half_length_is_ignored() {
        let mut b = unit_box();
        b.set_half_length(0.0, 0);
        b.set_half_length(CAR_TOLERANCE, 1);
        b.set_half_length(-4.0, 2);
        assert_eq!(b.half_length(0), 1.0);
        assert_eq!(b.half_length(1), 2.0);
        assert_eq!(b.half_length(2), 3.0);
        b.set_half_length(0.5, 2);
        assert_eq!(b.half_length(2), 0.5);
    }

    fn arb_direction() -> impl Strategy<Value = UnitVector<f64>> {
        (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
            .prop_filter("null direction", |(x, y, z)| x * x + y * y + z * z > 1e-4)
            .prop_map(|(x, y, z)| dir(x, y, z))
    }

    proptest! {
        #[test]
        fn step_to_out_lands_on_a_face(
            px in -0.999f64..0.999,
            py in -1.999f64..1.999,
            pz in -2.999f64..2.999,
            v in arb_direction(),
        ) {
            let b = unit_box();
            let p = Vector::new(px, py, pz);
            let d = b.distance_to_out(p, v);
            prop_assert!(d >= 0.0);
            let q = (*v).mul_add(d, p);
            let margin = (0..3)
                .map(|axis| (b.half_length(axis) - q.component(axis).abs()).abs())
                .fold(f64::INFINITY, f64::min);
            prop_assert!(margin < 1e-9, "landed {} away from the nearest face", margin);
        }

        #[test]
        fn safety_matches_face_margins(
            px in -2.0f64..2.0,
            py in -3.0f64..3.0,
            pz in -4.0f64..4.0,
        ) {
            let b = unit_box();
            let p = Vector::new(px, py, pz);
            let margin = (1.0 - px.abs()).min(2.0 - py.abs()).min(3.0 - pz.abs());
            let s = b.safety(p);
            if margin < HALF_TOLERANCE {
                prop_assert_eq!(s, 0.0);
            } else {
                prop_assert!((s - margin).abs() < 1e-12);
            }
        }

        #[test]
        fn outward_on_face_is_zero(
            axis in 0usize..3,
            sign in prop_oneof![Just(1.0f64), Just(-1.0f64)],
            t1 in -0.9f64..0.9,
            t2 in -0.9f64..0.9,
            v in arb_direction(),
        ) {
            let b = unit_box();
            let mut p = [t1, t2 * 2.0, t1 * 3.0];
            p[axis] = sign * b.half_length(axis);
            let outward = v.to_array()[axis] * sign > 0.0;
            prop_assume!(outward);
            prop_assert_eq!(b.distance_to_out(Vector::from(p), v), 0.0);
        }
    }
}
