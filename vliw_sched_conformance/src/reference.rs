// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct computations of the RMS-norm kernels.
//!
//! [`rms_norm_newton`] and [`rms_norm_quake`] perform the same floating-point operations in the
//! same order as the sample programs, so VM outputs must match them exactly.

/// Magic constant of the fast inverse square root.
pub const INV_SQRT_MAGIC: i64 = 0x5F37_59DF;

/// Inputs of a three-element RMS norm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RmsInputs {
    /// Elements.
    pub x: [f64; 3],
    /// Per-element scale.
    pub gamma: [f64; 3],
    /// Added to the mean square before the root.
    pub epsilon: f64,
}

impl RmsInputs {
    /// The inputs used throughout the conformance suite.
    pub const SAMPLE: Self = Self {
        x: [3.0, 4.0, 5.0],
        gamma: [0.1, 0.2, 0.3],
        epsilon: 1e-6,
    };

    fn mean_square_plus_epsilon(&self) -> f64 {
        let [x0, x1, x2] = self.x;
        (x0 * x0 + x1 * x1 + x2 * x2) / 3.0 + self.epsilon
    }
}

/// `x / sqrt(mean(x^2) + epsilon) * gamma` using the platform square root.
pub fn rms_norm_exact(inputs: &RmsInputs) -> [f64; 3] {
    let rms = inputs.mean_square_plus_epsilon().sqrt();
    core::array::from_fn(|i| inputs.x[i] / rms * inputs.gamma[i])
}

/// RMS norm with five Newton iterations for the square root, starting from `s = n`.
pub fn rms_norm_newton(inputs: &RmsInputs) -> [f64; 3] {
    let n = inputs.mean_square_plus_epsilon();
    let mut s = n;
    for _ in 0..5 {
        s = 0.5 * (s + n / s);
    }
    core::array::from_fn(|i| inputs.x[i] / s * inputs.gamma[i])
}

/// RMS norm with the fast inverse square root and one Newton step.
pub fn rms_norm_quake(inputs: &RmsInputs) -> [f64; 3] {
    let n = inputs.mean_square_plus_epsilon();
    let half = n * 0.5;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the bit trick operates on single precision"
    )]
    let bits = i64::from((n as f32).to_bits().cast_signed());
    let guess_bits = INV_SQRT_MAGIC - (bits >> 1);
    let guess = i32::try_from(guess_bits)
        .map_or(f64::NAN, |b| f64::from(f32::from_bits(b.cast_unsigned())));
    let inv = guess * (1.5 - half * (guess * guess));
    core::array::from_fn(|i| inputs.x[i] * inv * inputs.gamma[i])
}
