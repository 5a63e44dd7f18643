//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate output dimensions that fit inside optional bounds.
///
/// Fit-inside policy: the result always fits within both bounds while
/// preserving the source aspect ratio, and never enlarges past the source.
/// A missing bound defaults to the source dimension on that axis.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max_width` - Optional width bound in pixels
/// * `max_height` - Optional height bound in pixels
///
/// # Examples
/// ```
/// # use imgpress::imaging::fit_within;
/// // 4000x3000 bounded to width 800 → 800x600
/// assert_eq!(fit_within((4000, 3000), Some(800), None), (800, 600));
///
/// // Source already fits: unchanged
/// assert_eq!(fit_within((640, 480), Some(800), Some(600)), (640, 480));
/// ```
pub fn fit_within(
    source: (u32, u32),
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    let (width, height) = source;

    if max_width.is_none() && max_height.is_none() {
        return source;
    }

    let max_w = max_width.unwrap_or(width);
    let max_h = max_height.unwrap_or(height);

    // No enlargement: a source already inside the bounds passes through.
    if width <= max_w && height <= max_h {
        return source;
    }

    let ratio = f64::min(max_w as f64 / width as f64, max_h as f64 / height as f64);
    if ratio >= 1.0 {
        // Unreachable given the bounds check above; clamp to source.
        return source;
    }

    // Extreme aspect ratios can round an edge down to zero; a 1px edge is
    // the smallest thing a codec will accept.
    let w = ((width as f64 * ratio).round() as u32).max(1);
    let h = ((height as f64 * ratio).round() as u32).max(1);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bounds_returns_source() {
        assert_eq!(fit_within((1920, 1080), None, None), (1920, 1080));
    }

    #[test]
    fn source_inside_bounds_returns_source() {
        assert_eq!(fit_within((640, 480), Some(800), Some(600)), (640, 480));
        assert_eq!(fit_within((800, 600), Some(800), Some(600)), (800, 600));
    }

    #[test]
    fn width_bound_scales_both_edges() {
        // 4000x3000 with max width 800 → 800x600
        assert_eq!(fit_within((4000, 3000), Some(800), None), (800, 600));
    }

    #[test]
    fn height_bound_scales_both_edges() {
        // 3000x4000 portrait with max height 1000 → 750x1000
        assert_eq!(fit_within((3000, 4000), None, Some(1000)), (750, 1000));
    }

    #[test]
    fn tighter_bound_wins() {
        // 2000x1000 into 500x900: width ratio 0.25 is tighter than 0.9
        assert_eq!(fit_within((2000, 1000), Some(500), Some(900)), (500, 250));
    }

    #[test]
    fn never_enlarges() {
        // Bounds larger than source on both axes leave it untouched
        assert_eq!(fit_within((300, 200), Some(3000), Some(2000)), (300, 200));
        // One axis larger, one missing
        assert_eq!(fit_within((300, 200), Some(3000), None), (300, 200));
    }

    #[test]
    fn preserves_aspect_within_one_pixel() {
        let cases = [
            ((4032u32, 3024u32), Some(1000u32), None),
            ((3024, 4032), Some(777), Some(777)),
            ((1999, 1001), None, Some(350)),
        ];
        for (source, max_w, max_h) in cases {
            let (w, h) = fit_within(source, max_w, max_h);
            let src_aspect = source.0 as f64 / source.1 as f64;
            // Reconstructed height from the planned width differs by ≤ 1px
            let expected_h = w as f64 / src_aspect;
            assert!(
                (h as f64 - expected_h).abs() <= 1.0,
                "{source:?} → ({w}, {h}) breaks aspect"
            );
        }
    }

    #[test]
    fn result_fits_both_bounds() {
        let (w, h) = fit_within((4032, 3024), Some(999), Some(333));
        assert!(w <= 999 && h <= 333);
    }

    #[test]
    fn degenerate_sliver_clamps_to_one_pixel() {
        // 10000x10 bounded to width 4: height would round to 0
        let (w, h) = fit_within((10000, 10), Some(4), None);
        assert_eq!(w, 4);
        assert_eq!(h, 1);
    }

    #[test]
    fn square_source_square_bounds() {
        assert_eq!(fit_within((1000, 1000), Some(100), Some(100)), (100, 100));
    }
}
