//! Weighted resistor network DAC model.
//!
//! Each color bit drives its resistor high while the remaining resistors (plus an optional
//! pulldown) pull the output node low, so a bit's contribution is the voltage divider formed by its
//! own resistor against everything else in parallel.

/// Conductance used in place of an absent resistor, effectively an open circuit.
const OPEN_CIRCUIT: f64 = 1e-12;

/// Compute per-bit output weights for one resistor network.
///
/// Returns the weights and the scale factor applied to them. With `scale == None` the weights are
/// scaled so that all bits set produces exactly `max`; passing the returned scale to further
/// networks keeps their outputs proportional to the first one.
#[must_use]
pub fn compute_resistor_weights<const N: usize>(
    max: f64,
    resistances: [f64; N],
    pulldown: Option<f64>,
    scale: Option<f64>,
) -> ([f64; N], f64) {
    let mut weights = [0.0; N];

    for (n, weight) in weights.iter_mut().enumerate() {
        let mut g_down = pulldown.map_or(OPEN_CIRCUIT, |r| 1.0 / r);
        let mut g_up = OPEN_CIRCUIT;

        for (j, &r) in resistances.iter().enumerate() {
            if j == n {
                g_up += 1.0 / r;
            } else {
                g_down += 1.0 / r;
            }
        }

        let r_down = 1.0 / g_down;
        let r_up = 1.0 / g_up;
        *weight = (max * r_down / (r_up + r_down)).clamp(0.0, max);
    }

    let scale = scale.unwrap_or_else(|| {
        let total: f64 = weights.iter().sum();
        max / total
    });

    for weight in &mut weights {
        *weight *= scale;
    }

    (weights, scale)
}

/// Sum the weights of the set bits and round to the nearest 8-bit level.
#[inline]
#[must_use]
pub fn combine_weights<const N: usize>(weights: &[f64; N], bits: [bool; N]) -> u8 {
    let sum: f64 =
        weights.iter().zip(bits).filter(|&(_, bit)| bit).map(|(&weight, _)| weight).sum();
    (sum + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    const LADDER: [f64; 5] = [220.0, 470.0, 1000.0, 2200.0, 3900.0];

    #[test]
    fn autoscaled_network_reaches_full_scale() {
        let (weights, scale) = compute_resistor_weights(255.0, LADDER, None, None);
        assert!(scale > 0.0);
        assert_eq!(combine_weights(&weights, [true; 5]), 255);
        assert_eq!(combine_weights(&weights, [false; 5]), 0);
    }

    #[test]
    fn smaller_resistors_carry_more_weight() {
        let (weights, _) = compute_resistor_weights(255.0, LADDER, None, None);
        assert!(weights.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn pulldown_dims_every_bit() {
        let (normal, scale) = compute_resistor_weights(255.0, LADDER, None, None);
        let (pulled, pulled_scale) =
            compute_resistor_weights(255.0, LADDER, Some(150.0), Some(scale));
        assert_eq!(scale, pulled_scale);
        assert!(normal.iter().zip(&pulled).all(|(n, p)| p < n));
        assert!(combine_weights(&pulled, [true; 5]) < 255);
    }
}
