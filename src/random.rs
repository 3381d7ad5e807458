#![allow(clippy::unreadable_literal, clippy::excessive_precision)]
use rand::distributions::Open01;
use rand::prelude::{Distribution, Rng};
pub use rand_xoshiro::Xoroshiro128Plus as PRng;

/// Uniform random numbers on the open interval (0, 1), the only form of
/// randomness a physics engine may consume.
pub trait RandomSource {
    fn flat(&mut self) -> f64;

    fn flat_array(&mut self, out: &mut [f64]) {
        for v in out.iter_mut() {
            *v = self.flat();
        }
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn flat(&mut self) -> f64 {
        self.sample(Open01)
    }
}

fn polynomial(z: f64, coeff: &[f64]) -> f64 {
    coeff.iter().rev().fold(0.0, |sum, &c| sum.mul_add(z, c))
}

const SHAW_P: &[f64] = &[
    1.2533141359896652729,
    3.0333178251950406994,
    2.3884158540184385711,
    0.73176759583280610539,
    0.085838533424158257377,
    0.0034424140686962222423,
    0.000036313870818023761224,
    4.3304513840364031401e-8,
];

const SHAW_Q: &[f64] = &[
    1.0,
    2.9202373175993672857,
    2.9373357991677046357,
    1.2356513216582148689,
    0.2168237095066675527,
    0.014494272424798068406,
    0.00030617264753008793976,
    1.3141263119543315917e-6,
];

/// Fast Non-branching Standard Normal inverse CDF
/// To transform into a normal distribution with stddev=a and mean=b
/// x = b - a * norminv(u)
/// precision is ~1E-9 when 1E-15 <= u <= 1 - 1E-15
/// precision is ~1E-6 when 1E-22 <= u <= 1 - 1E-22
/// precision is ~1E-3 when 1E-30 <= u <= 1 - 1E-30
///
/// Source:
/// arXiv:0901.0638 [q-fin.CP]
/// Quantile Mechanics II: Changes of Variables in Monte Carlo methods and GPU-Optimized Normal Quantiles
/// William T. Shaw, Thomas Luu, Nick Brickman
pub fn norminv(x: f64) -> f64 {
    let u = if x > 0.5 { 1.0 - x } else { x };
    let v = -(2.0 * u).ln();
    let p = polynomial(v, SHAW_P);
    let q = polynomial(v, SHAW_Q);
    (v * p / q).copysign(x - 0.5)
}

#[derive(Clone, Copy, Debug)]
pub struct StandardNormal;

impl Distribution<f64> for StandardNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        norminv(rng.flat())
    }
}

/// Uniform point on the unit circle, `[cos phi, sin phi]`.
#[derive(Clone, Copy, Debug)]
pub struct UnitCircle;

impl Distribution<[f64; 2]> for UnitCircle {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; 2] {
        let u: f64 = StandardNormal.sample(rng);
        let v: f64 = StandardNormal.sample(rng);
        let d = (u * u + v * v).sqrt();
        [u / d, v / d]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq as assert_almost_eq;
    use rand::SeedableRng;
    use statrs::distribution::{InverseCDF, Normal};

    #[test]
    fn test_shaw() {
        let n = Normal::new(0.0, 1.0).unwrap();

        assert_almost_eq!(norminv(1e-30), n.inverse_cdf(1e-30), epsilon = 1e-3);
        assert_almost_eq!(norminv(1e-20), n.inverse_cdf(1e-20), epsilon = 1e-5);
        assert_almost_eq!(norminv(1e-10), n.inverse_cdf(1e-10), epsilon = 5e-9);
        assert_almost_eq!(norminv(1e-5), n.inverse_cdf(1e-5), epsilon = 2e-9);
        assert_almost_eq!(norminv(0.1), n.inverse_cdf(0.1), epsilon = 1e-9);
        assert_almost_eq!(norminv(0.5), n.inverse_cdf(0.5), epsilon = 1e-9);
        assert_almost_eq!(norminv(0.9), n.inverse_cdf(0.9), epsilon = 1e-9);
        assert_almost_eq!(norminv(0.999), n.inverse_cdf(0.999), epsilon = 2.5e-9);
    }

    #[test]
    fn flat_is_open_interval() {
        let mut rng = PRng::seed_from_u64(1234);
        let mut buf = [0f64; 1024];
        rng.flat_array(&mut buf);
        assert!(buf.iter().all(|&u| u > 0.0 && u < 1.0));
    }

    #[test]
    fn unit_circle_is_normalised() {
        let mut rng = PRng::seed_from_u64(7);
        for _ in 0..100 {
            let [c, s] = UnitCircle.sample(&mut rng);
            assert_almost_eq!(c * c + s * s, 1.0, epsilon = 1e-12);
        }
    }
}
