use num_traits::Zero;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Neg, Add, Sub, Mul, Div, Display, Serialize, Deserialize)]
#[display(fmt = "({}, {}, {})", x, y, z)]
pub struct Vector<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Zero> Vector<T> {
    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero(), T::zero())
    }
}

impl<T: Zero> Default for Vector<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T> Vector<T>
where
    T: Copy + core::ops::Add<Output = T> + core::ops::Sub<Output = T> + core::ops::Mul<Output = T>,
{
    pub fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn norm_sqr(self) -> T {
        self.dot(self)
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }
}

impl Vector<f64> {
    /// self * b + c
    pub fn mul_add(self, b: f64, c: Self) -> Self {
        Self {
            x: self.x.mul_add(b, c.x),
            y: self.y.mul_add(b, c.y),
            z: self.z.mul_add(b, c.z),
        }
    }

    pub fn norm(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    pub fn component(self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vector<f64> {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Deref, Into, Display)]
pub struct UnitVector<T>(pub Vector<T>);

impl UnitVector<f64> {
    /// Rescales `v` to unit length, `None` for a null vector.
    pub fn normalize(v: Vector<f64>) -> Option<Self> {
        let n = v.norm();
        if n > 0.0 && n.is_finite() {
            Some(Self(v * (1.0 / n)))
        } else {
            None
        }
    }

    pub const fn x_axis() -> Self {
        Self(Vector::new(1.0, 0.0, 0.0))
    }
}

impl Default for UnitVector<f64> {
    fn default() -> Self {
        Self::x_axis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    #[test]
    fn normalize_rescales() {
        let u = UnitVector::normalize(Vector::new(3.0, 0.0, 4.0)).unwrap();
        assert_ulps_eq!(u.x, 0.6);
        assert_ulps_eq!(u.z, 0.8);
        assert!(UnitVector::normalize(Vector::zero()).is_none());
    }

    #[test]
    fn mul_add_moves_along_direction() {
        let p = Vector::new(1.0, 2.0, 3.0);
        let v = Vector::new(0.0, 1.0, 0.0);
        assert_eq!(v.mul_add(2.5, p), Vector::new(1.0, 4.5, 3.0));
    }
}
