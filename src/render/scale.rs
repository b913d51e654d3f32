//! Fit a rendered image inside the viewport.
//!
//! The image is scaled uniformly so that it occupies `fit_ratio` of the
//! viewport along its limiting axis, up or down.  Dimensions are truncated
//! and never drop below one pixel.  An unknown viewport leaves the image at
//! its original size.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use super::Viewport;

/// Target size for an image of `size` inside `viewport`.
///
/// ```
/// use memegen_live::render::{fit_size, Viewport};
///
/// // 1000×500 into 500×500 at 90 %: limited by width → 450×225.
/// assert_eq!(fit_size((1000, 500), Viewport::new(500, 500), 0.9), (450, 225));
/// ```
pub fn fit_size(size: (u32, u32), viewport: Viewport, fit_ratio: f64) -> (u32, u32) {
    let (w, h) = size;
    if w == 0 || h == 0 || !viewport.is_known() {
        return size;
    }

    let ratio = (viewport.width as f64 / w as f64).min(viewport.height as f64 / h as f64)
        * fit_ratio.clamp(0.0, 1.0);

    let scaled = |s: u32| ((s as f64 * ratio) as u32).max(1);
    (scaled(w), scaled(h))
}

/// Resize `image` for `viewport` with Lanczos filtering.
pub fn fit_to_viewport(image: DynamicImage, viewport: Viewport, fit_ratio: f64) -> RgbaImage {
    let original = (image.width(), image.height());
    let (w, h) = fit_size(original, viewport, fit_ratio);
    if (w, h) == original {
        return image.into_rgba8();
    }
    image.resize_exact(w, h, FilterType::Lanczos3).into_rgba8()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_limited_image() {
        // 400×800 into 500×500 → limited by height: 500/800 * 0.9 = 0.5625
        assert_eq!(fit_size((400, 800), Viewport::new(500, 500), 0.9), (225, 450));
    }

    #[test]
    fn small_image_is_scaled_up() {
        assert_eq!(fit_size((100, 100), Viewport::new(500, 300), 0.9), (270, 270));
    }

    #[test]
    fn configured_ratio_truncates_exact_products() {
        let ratio = crate::config::RenderConfig::default().fit_ratio;
        assert_eq!(fit_size((1000, 500), Viewport::new(500, 500), ratio), (450, 225));
        assert_eq!(fit_size((333, 333), Viewport::new(1000, 1000), ratio), (900, 900));
        assert_eq!(fit_size((640, 480), Viewport::new(700, 700), ratio), (630, 472));
    }

    #[test]
    fn unknown_viewport_keeps_size() {
        assert_eq!(fit_size((640, 480), Viewport::default(), 0.9), (640, 480));
    }

    #[test]
    fn never_below_one_pixel() {
        assert_eq!(fit_size((10_000, 1), Viewport::new(10, 10), 0.9), (9, 1));
    }

    #[test]
    fn fit_to_viewport_resizes_pixels() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(200, 100));
        let fitted = fit_to_viewport(image, Viewport::new(100, 100), 1.0);
        assert_eq!(fitted.dimensions(), (100, 50));
    }

    #[test]
    fn fit_to_viewport_without_viewport_is_identity() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(20, 10));
        let fitted = fit_to_viewport(image, Viewport::default(), 0.9);
        assert_eq!(fitted.dimensions(), (20, 10));
    }
}
