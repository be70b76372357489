//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::Bounds;

/// Compute the dimensions an image is drawn at before re-encoding.
///
/// Only the dominant side is checked: landscape images are constrained by
/// `max_width`, portrait and square images by `max_height`. The other side
/// follows the aspect ratio. Images already inside the bound are returned
/// unchanged, so nothing is ever upscaled.
///
/// The derived side is rounded to the nearest pixel (half away from zero)
/// and never drops below 1.
///
/// # Examples
/// ```
/// # use fishspot_compress::imaging::{Bounds, fit_within};
/// // 4000x3000 landscape into 1920x1920 → 1920x1440
/// assert_eq!(fit_within((4000, 3000), Bounds::default()), (1920, 1440));
///
/// // 800x600 is already small enough
/// assert_eq!(fit_within((800, 600), Bounds::default()), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), bounds: Bounds) -> (u32, u32) {
    let (width, height) = source;

    if width > height {
        if width > bounds.max_width {
            let h = scale_side(height, bounds.max_width, width);
            (bounds.max_width, h)
        } else {
            (width, height)
        }
    } else if height > bounds.max_height {
        let w = scale_side(width, bounds.max_height, height);
        (w, bounds.max_height)
    } else {
        (width, height)
    }
}

/// `side * numerator / denominator`, rounded, at least 1.
fn scale_side(side: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = side as f64 * numerator as f64 / denominator as f64;
    (scaled.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(max_width: u32, max_height: u32) -> Bounds {
        Bounds {
            max_width,
            max_height,
        }
    }

    // =========================================================================
    // No upscaling
    // =========================================================================

    #[test]
    fn small_landscape_unchanged() {
        assert_eq!(fit_within((800, 600), Bounds::default()), (800, 600));
    }

    #[test]
    fn small_portrait_unchanged() {
        assert_eq!(fit_within((600, 800), Bounds::default()), (600, 800));
    }

    #[test]
    fn exactly_at_bound_unchanged() {
        assert_eq!(fit_within((1920, 1080), Bounds::default()), (1920, 1080));
        assert_eq!(fit_within((1080, 1920), Bounds::default()), (1080, 1920));
        assert_eq!(fit_within((1920, 1920), Bounds::default()), (1920, 1920));
    }

    #[test]
    fn tiny_image_unchanged() {
        assert_eq!(fit_within((1, 1), Bounds::default()), (1, 1));
    }

    // =========================================================================
    // Landscape
    // =========================================================================

    #[test]
    fn landscape_4000x3000_to_default_bounds() {
        // 3000 * 1920 / 4000 = 1440
        assert_eq!(fit_within((4000, 3000), Bounds::default()), (1920, 1440));
    }

    #[test]
    fn landscape_rounds_to_nearest() {
        // 1000 * 1920 / 3000 = 640.0; 1001 * 1920 / 3000 = 640.64 → 641
        assert_eq!(fit_within((3000, 1000), Bounds::default()), (1920, 640));
        assert_eq!(fit_within((3000, 1001), Bounds::default()), (1920, 641));
    }

    #[test]
    fn extreme_landscape_keeps_one_pixel() {
        // 1 * 1920 / 10000 = 0.192 → clamped to 1
        assert_eq!(fit_within((10000, 1), Bounds::default()), (1920, 1));
    }

    // =========================================================================
    // Portrait and square
    // =========================================================================

    #[test]
    fn portrait_3000x4000_to_default_bounds() {
        assert_eq!(fit_within((3000, 4000), Bounds::default()), (1440, 1920));
    }

    #[test]
    fn square_uses_height_bound() {
        assert_eq!(fit_within((4000, 4000), bounds(1000, 500)), (500, 500));
    }

    #[test]
    fn extreme_portrait_keeps_one_pixel() {
        assert_eq!(fit_within((1, 10000), Bounds::default()), (1, 1920));
    }

    // =========================================================================
    // Non-square bounds
    // =========================================================================

    #[test]
    fn landscape_checks_only_width_bound() {
        // Wider than tall, width fits 1920: left alone even though 1200 > 1080
        assert_eq!(fit_within((1500, 1200), bounds(1920, 1080)), (1500, 1200));
    }

    #[test]
    fn portrait_checks_only_height_bound() {
        assert_eq!(fit_within((1200, 1500), bounds(1080, 1920)), (1200, 1500));
    }

    #[test]
    fn custom_bounds_landscape() {
        // 900 * 1280 / 1600 = 720
        assert_eq!(fit_within((1600, 900), bounds(1280, 720)), (1280, 720));
    }

    #[test]
    fn aspect_ratio_preserved_within_rounding() {
        for &(w, h) in &[(4032, 3024), (6000, 4000), (3024, 4032), (5000, 2813)] {
            let (ow, oh) = fit_within((w, h), Bounds::default());
            let src = w as f64 / h as f64;
            let out = ow as f64 / oh as f64;
            // One pixel of rounding on the derived side
            let tolerance = src / oh.min(ow) as f64 + 1e-9;
            assert!(
                (src - out).abs() <= tolerance,
                "{w}x{h} → {ow}x{oh} drifted: {src} vs {out}"
            );
        }
    }
}
