//! Angle utilities and circular statistics for undirected orientations.
//!
//! Orientations are axes, not directions: θ and θ + π describe the same
//! structure. Statistics therefore work on doubled angles, where that
//! symmetry becomes the ordinary 2π periodicity.
use crate::error::{OrientationError, Result};
use std::f64::consts::{FRAC_PI_2, PI};

/// Normalizes an angle into the range [0, π).
#[inline]
pub fn normalize_half_pi(angle: f64) -> f64 {
    let norm = angle.rem_euclid(PI);
    // rem_euclid can round up to exactly π for tiny negative inputs.
    if norm >= PI {
        0.0
    } else {
        norm
    }
}

/// Smallest unsigned difference between two orientations, in [0, π/2].
#[inline]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs().rem_euclid(PI);
    if diff > FRAC_PI_2 {
        PI - diff
    } else {
        diff
    }
}

/// Mean of `cos 2θ` and `sin 2θ` over a set of orientations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DoubledAngleMoments {
    pub mean_cos: f64,
    pub mean_sin: f64,
}

impl DoubledAngleMoments {
    /// Accumulate moments; fails on an empty sample.
    pub fn from_angles<I>(angles: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sum_cos = 0.0;
        let mut sum_sin = 0.0;
        let mut count = 0usize;
        for theta in angles {
            let (s, c) = (2.0 * theta).sin_cos();
            sum_cos += c;
            sum_sin += s;
            count += 1;
        }
        if count == 0 {
            return Err(OrientationError::EmptyField);
        }
        let n = count as f64;
        Ok(Self {
            mean_cos: sum_cos / n,
            mean_sin: sum_sin / n,
        })
    }

    /// Length of the mean doubled-angle unit vector.
    pub fn resultant_length(&self) -> f64 {
        self.mean_cos.hypot(self.mean_sin)
    }

    /// Circular mean orientation in [0, π). Zero when the resultant vanishes.
    pub fn mean_angle(&self) -> f64 {
        normalize_half_pi(0.5 * self.mean_sin.atan2(self.mean_cos))
    }
}

/// Orientation order parameter `S = sqrt(<cos 2θ>² + <sin 2θ>²)`.
///
/// 1 when all orientations coincide, 0 for an isotropic sample; unchanged
/// by rotating every angle by the same offset.
pub fn order_parameter(angles: &[f64]) -> Result<f64> {
    Ok(DoubledAngleMoments::from_angles(angles.iter().copied())?.resultant_length())
}

/// Circular mean orientation in [0, π).
pub fn circular_mean(angles: &[f64]) -> Result<f64> {
    Ok(DoubledAngleMoments::from_angles(angles.iter().copied())?.mean_angle())
}

/// Order parameter measured against the circular mean: `<cos 2(θ − θ̄)>`.
///
/// Agrees with [`order_parameter`] mathematically; kept as a separate path
/// because it is the form older analyses report.
pub fn centered_order_parameter(angles: &[f64]) -> Result<f64> {
    centered_about(angles, circular_mean(angles)?)
}

/// `<cos 2(θ − reference)>` for a known reference orientation.
pub fn centered_about(angles: &[f64], reference: f64) -> Result<f64> {
    if angles.is_empty() {
        return Err(OrientationError::EmptyField);
    }
    let sum: f64 = angles.iter().map(|&t| (2.0 * (t - reference)).cos()).sum();
    Ok(sum / angles.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn normalize_half_pi_basic() {
        assert!(approx_eq(normalize_half_pi(0.5), 0.5));
        assert!(approx_eq(normalize_half_pi(-FRAC_PI_4), 3.0 * FRAC_PI_4));
        assert_eq!(normalize_half_pi(PI), 0.0);
        let r = normalize_half_pi(3.0 * PI);
        assert!(r < PI && (r < 1e-9 || PI - r < 1e-9));
        assert!(normalize_half_pi(-1e-18) < PI);
    }

    #[test]
    fn angular_difference_handles_wrap() {
        assert!(approx_eq(angular_difference(0.0, PI), 0.0));
        assert!(approx_eq(angular_difference(0.0, FRAC_PI_2), FRAC_PI_2));
        assert!(approx_eq(angular_difference(FRAC_PI_4, -FRAC_PI_4), FRAC_PI_2));
        assert!(approx_eq(angular_difference(0.1, PI - 0.1), 0.2));
        assert!(approx_eq(angular_difference(0.25, 1.7), angular_difference(1.7, 0.25)));
    }

    #[test]
    fn identical_angles_are_perfectly_ordered() {
        let angles = vec![1.1; 50];
        assert!(approx_eq(order_parameter(&angles).expect("S"), 1.0));
        assert!(approx_eq(circular_mean(&angles).expect("mean"), 1.1));
        assert!(approx_eq(centered_order_parameter(&angles).expect("S_c"), 1.0));
    }

    #[test]
    fn axis_symmetry_is_respected() {
        // 0 and π are the same axis.
        let angles = [0.0, PI - 1e-12, 0.0, PI - 1e-12];
        assert!(approx_eq(order_parameter(&angles).expect("S"), 1.0));
    }

    #[test]
    fn evenly_spread_angles_have_zero_order() {
        let n = 180;
        let angles: Vec<f64> = (0..n).map(|i| PI * i as f64 / n as f64).collect();
        assert!(order_parameter(&angles).expect("S") < 1e-9);
    }

    #[test]
    fn rotation_leaves_order_parameter_unchanged() {
        let angles = [0.1, 0.3, 0.35, 1.2, 2.9, 0.05];
        let base = order_parameter(&angles).expect("S");
        for offset in [0.2, 1.0, FRAC_PI_2, 2.5, -0.7] {
            let rotated: Vec<f64> = angles.iter().map(|&a| normalize_half_pi(a + offset)).collect();
            assert!(approx_eq(order_parameter(&rotated).expect("S"), base));
        }
    }

    #[test]
    fn two_orthogonal_populations_cancel() {
        let angles = [0.0, FRAC_PI_2, 0.0, FRAC_PI_2];
        assert!(order_parameter(&angles).expect("S") < 1e-12);
    }

    #[test]
    fn centered_form_matches_resultant_length() {
        let angles = [0.2, 0.25, 0.4, 0.45, 1.9, 2.0, 0.3];
        let s = order_parameter(&angles).expect("S");
        let s_c = centered_order_parameter(&angles).expect("S_c");
        assert!(s > 0.3 && s < 1.0);
        assert!(approx_eq(s, s_c), "s={s} s_c={s_c}");
    }

    #[test]
    fn centered_about_orthogonal_reference_is_negative() {
        let angles = [0.0, 0.0, 0.0];
        assert!(approx_eq(centered_about(&angles, FRAC_PI_2).expect("c"), -1.0));
        assert!(approx_eq(centered_about(&angles, PI).expect("c"), 1.0));
    }

    #[test]
    fn empty_sample_is_an_error() {
        assert_eq!(order_parameter(&[]), Err(OrientationError::EmptyField));
        assert_eq!(circular_mean(&[]), Err(OrientationError::EmptyField));
        assert_eq!(centered_order_parameter(&[]), Err(OrientationError::EmptyField));
        assert_eq!(centered_about(&[], 0.0), Err(OrientationError::EmptyField));
    }
}
