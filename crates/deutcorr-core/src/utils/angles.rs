use std::f64::consts::{FRAC_PI_2, TAU};

/// Lower (inclusive) edge of the azimuthal range used throughout the analysis.
pub const PHI_MIN: f64 = -FRAC_PI_2;
/// Upper (exclusive) edge of the azimuthal range used throughout the analysis.
pub const PHI_MAX: f64 = 3.0 * FRAC_PI_2;

/// Fold an azimuthal angle into $`[-\pi/2, 3\pi/2)`$.
///
/// The fold is a fixed number of shifts: at most two additions of $`2\pi`$ and then at most two
/// subtractions. Any finite input within $`4\pi`$ of the range lands inside it; inputs further
/// out are returned only partially corrected. The range places the near side ($`\Delta\phi
/// \approx 0`$) and the away side ($`\Delta\phi \approx \pi`$) of a correlation away from the
/// edges.
#[inline]
pub fn normalize_phi(angle: f64) -> f64 {
    let mut phi = angle;
    for _ in 0..2 {
        if phi < PHI_MIN {
            phi += TAU;
        }
    }
    for _ in 0..2 {
        if phi >= PHI_MAX {
            phi -= TAU;
        }
    }
    phi
}

/// The signed azimuthal separation $`\phi_a - \phi_h`$, folded with [`normalize_phi`].
#[inline]
pub fn signed_delta_phi(phi_associate: f64, phi_trigger: f64) -> f64 {
    normalize_phi(phi_associate - phi_trigger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_in_range_is_identity() {
        for phi in [-FRAC_PI_2, 0.0, 1.0, PI, 4.7] {
            assert_eq!(normalize_phi(phi), phi);
        }
    }

    #[test]
    fn test_normalize_covers_four_pi() {
        let lo = PHI_MIN - 4.0 * PI;
        let hi = PHI_MAX + 4.0 * PI;
        let n = 20_000;
        for i in 0..n {
            let theta = lo + (hi - lo) * (i as f64 + 0.5) / (n as f64);
            let phi = normalize_phi(theta);
            assert!(
                (PHI_MIN..PHI_MAX).contains(&phi),
                "{theta} normalized to {phi}"
            );
            assert_eq!(normalize_phi(phi), phi);
        }
    }

    #[test]
    fn test_normalize_upper_edge() {
        assert_relative_eq!(normalize_phi(PHI_MAX), PHI_MIN);
        assert_relative_eq!(normalize_phi(-PI), PI);
        assert_relative_eq!(normalize_phi(2.0 * PI), 0.0);
    }

    #[test]
    fn test_normalize_is_fixed_iteration() {
        // three full turns below the range only gets two corrections
        let phi = normalize_phi(-6.0 * PI);
        assert_relative_eq!(phi, -2.0 * PI);
        assert!(phi < PHI_MIN);
    }

    #[test]
    fn test_signed_delta_phi() {
        assert_relative_eq!(signed_delta_phi(FRAC_PI_2, 0.0), FRAC_PI_2);
        assert_relative_eq!(signed_delta_phi(0.0, FRAC_PI_2), -FRAC_PI_2);
        assert_relative_eq!(signed_delta_phi(0.1, 4.0), 0.1 - 4.0 + 2.0 * PI);
    }
}
