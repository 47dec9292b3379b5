//! Spatial coordinates for plotted rows.

use std::f64::consts::TAU;

/// `n` evenly spaced points covering `[0, 2π)`, endpoint excluded.
///
/// Computed as `i * 2π / n` so the length is exactly `n`.
pub fn periodic_coordinates(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * TAU / n as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_endpoint() {
        let x = periodic_coordinates(256);
        assert_eq!(x.len(), 256);
        assert_eq!(x[0], 0.0);
        assert!((x[255] - (TAU - TAU / 256.0)).abs() < 1e-12);
    }

    #[test]
    fn empty_grid() {
        assert!(periodic_coordinates(0).is_empty());
    }
}
