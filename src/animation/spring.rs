//! Closed-form response of a damped harmonic oscillator.
//!
//! The spring starts at rest at 0 and is pulled toward 1. The natural angular frequency is fixed
//! at 2π; the configured frequency scales time instead, so a higher frequency settles faster
//! without changing the shape of the curve.

use std::f64::consts::TAU;
use std::time::Duration;

/// Upper bound on spring time. Extreme parameters that have not settled by then are cut off.
pub const MAX_SPRING_TIME: f64 = 3.0;

/// Damping ratios this close to 1 use the critically damped solution.
const CRITICAL_EPSILON: f64 = 1e-4;

const OMEGA0: f64 = TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub damping_ratio: f64,
    pub frequency: f64,
}

impl SpringParams {
    pub fn new(damping_ratio: f64, frequency: f64) -> Self {
        Self {
            damping_ratio: damping_ratio.max(f64::EPSILON),
            frequency: frequency.max(f64::EPSILON),
        }
    }

    /// Spring time after `elapsed`, capped at [`MAX_SPRING_TIME`].
    pub fn spring_time(&self, elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() * self.frequency).min(MAX_SPRING_TIME)
    }
}

impl From<cairn_config::SpringParams> for SpringParams {
    fn from(params: cairn_config::SpringParams) -> Self {
        Self::new(params.damping_ratio.0, params.frequency.0)
    }
}

/// Progress toward the target at spring time `t`, with zero initial displacement and velocity.
pub fn progress(damping_ratio: f64, t: f64) -> f64 {
    let zeta = damping_ratio;

    if (zeta - 1.).abs() < CRITICAL_EPSILON {
        return 1. - (1. + OMEGA0 * t) * (-OMEGA0 * t).exp();
    }

    if zeta > 1. {
        let root = (zeta * zeta - 1.).sqrt();
        let r1 = OMEGA0 * (-zeta + root);
        let r2 = OMEGA0 * (-zeta - root);
        // Chosen so that the response and its derivative are zero at t = 0.
        let c1 = r2 / (r2 - r1);
        let c2 = 1. - c1;
        1. - (c1 * (r1 * t).exp() + c2 * (r2 * t).exp())
    } else {
        let omega_d = OMEGA0 * (1. - zeta * zeta).sqrt();
        let envelope = (-zeta * OMEGA0 * t).exp();
        1. - envelope * ((omega_d * t).cos() + (zeta * OMEGA0 / omega_d) * (omega_d * t).sin())
    }
}
