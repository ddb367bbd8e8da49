//! Radial spectrum layout.
//!
//! Turns one frame of byte frequency magnitudes into bar primitives arranged
//! on a circle. Drawing them is left to whoever has a canvas.
//!
//! Nothing in the binary calls this yet: mpv's IPC exposes no frequency
//! data, so the terminal client has no spectrum to feed it. The layout is
//! kept and tested on its own until a backend can supply one.
#![cfg_attr(not(test), allow(dead_code))]

use rand::Rng;
use rand::seq::SliceRandom;
use std::f64::consts::TAU;

pub const BAR_COUNT: usize = 120;
pub const INNER_RADIUS: f64 = 70.0;
pub const MAX_HEIGHT: f64 = 30.0;
pub const MIN_HEIGHT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Radians, clockwise from the positive y axis.
    pub angle: f64,
    pub radius: f64,
    pub height: f64,
}

/// A random permutation of the first [`BAR_COUNT`] bins, made once per
/// visualizer so neighbouring bars do not track neighbouring frequencies.
pub fn shuffled_order() -> Vec<usize> {
    shuffled_order_with(&mut rand::rng())
}

pub fn shuffled_order_with<R: Rng + ?Sized>(rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..BAR_COUNT).collect();
    order.shuffle(rng);
    order
}

/// One bar per entry of `order`, reading `spectrum[order[i]]`. Bins past the
/// end of `spectrum` read as silence.
pub fn layout_bars(spectrum: &[u8], order: &[usize]) -> Vec<Bar> {
    if order.is_empty() {
        return Vec::new();
    }
    let step = TAU / order.len() as f64;
    order
        .iter()
        .enumerate()
        .map(|(i, &bin)| {
            let value = spectrum.get(bin).copied().unwrap_or(0);
            let height = (f64::from(value) / 256.0 * MAX_HEIGHT).max(MIN_HEIGHT);
            Bar {
                angle: step * i as f64,
                radius: INNER_RADIUS,
                height,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_order_is_a_permutation() {
        let mut order = shuffled_order_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(order.len(), BAR_COUNT);
        order.sort_unstable();
        assert_eq!(order, (0..BAR_COUNT).collect::<Vec<_>>());
    }

    #[test]
    fn test_bars_follow_order_and_floor_height() {
        let mut spectrum = vec![0u8; 256];
        spectrum[3] = 128;
        spectrum[1] = 255;
        let bars = layout_bars(&spectrum, &[3, 0, 1, 500]);

        assert_eq!(bars.len(), 4);
        assert!((bars[0].height - 15.0).abs() < 1e-9);
        assert_eq!(bars[1].height, MIN_HEIGHT);
        assert!(bars[2].height < MAX_HEIGHT && bars[2].height > 29.0);
        // Out-of-range bin reads as silence.
        assert_eq!(bars[3].height, MIN_HEIGHT);

        assert_eq!(bars[0].angle, 0.0);
        assert!((bars[2].angle - std::f64::consts::PI).abs() < 1e-9);
        assert!(bars.iter().all(|b| b.radius == INNER_RADIUS));
    }

    #[test]
    fn test_full_frame() {
        let order = shuffled_order();
        let bars = layout_bars(&[64u8; 256], &order);
        assert_eq!(bars.len(), BAR_COUNT);
        assert!(bars.iter().all(|b| (b.height - 7.5).abs() < 1e-9));
        assert!(layout_bars(&[], &[]).is_empty());
    }
}
