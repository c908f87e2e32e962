//! Half-block rendering of decoded cat pictures

use crate::cache::ItemCache;
use crate::domain::DisplayHandle;
use image::DynamicImage;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use std::collections::HashMap;

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let ratio = (max_width as f64 / original_width as f64)
        .min(max_height as f64 / original_height as f64);

    if ratio >= 1.0 {
        // Never upscale
        (original_width, original_height)
    } else {
        (
            (original_width as f64 * ratio) as u32,
            (original_height as f64 * ratio) as u32,
        )
    }
}

/// Converts an image to styled lines, two pixels per cell.
///
/// Each cell is an upper half block (▀): the foreground carries the upper pixel and the
/// background the lower one.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let height = if height.is_multiple_of(2) {
        height
    } else {
        height + 1
    };

    // Triangle keeps resizing fast enough to do on a frame budget
    let img = img
        .resize_exact(width, height, image::imageops::FilterType::Triangle)
        .to_rgb8();

    (0..height / 2)
        .map(|y| {
            let spans: Vec<Span<'static>> = (0..width)
                .map(|x| {
                    let upper = img.get_pixel(x, y * 2);
                    let lower = img.get_pixel(x, y * 2 + 1);
                    Span::styled(
                        "▀",
                        Style::default()
                            .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                            .bg(Color::Rgb(lower[0], lower[1], lower[2])),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Renders an image to fit a `columns` x `rows` cell area
pub fn fit_to_cells(img: &DynamicImage, columns: u16, rows: u16) -> Vec<Line<'static>> {
    let (width, height) =
        calculate_resize_dimensions(img.width(), img.height(), columns as u32, rows as u32 * 2);
    image_to_halfblock_lines(img, width, height)
}

#[derive(Debug)]
struct Rendered {
    columns: u16,
    rows: u16,
    lines: Vec<Line<'static>>,
}

/// The latest render of each handle, so a card is only resized when its area changes
#[derive(Debug, Default)]
pub struct PictureCache {
    rendered: HashMap<DisplayHandle, Rendered>,
}

impl PictureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for `handle` fitted to the area, or `None` once the handle has been released
    pub fn lines(
        &mut self,
        cache: &ItemCache,
        handle: DisplayHandle,
        columns: u16,
        rows: u16,
    ) -> Option<&[Line<'static>]> {
        let img = cache.image(handle)?;
        let rendered = self.rendered.entry(handle).or_insert_with(|| Rendered {
            columns,
            rows,
            lines: fit_to_cells(img, columns, rows),
        });
        // A resized area replaces the old render
        if (rendered.columns, rendered.rows) != (columns, rows) {
            *rendered = Rendered {
                columns,
                rows,
                lines: fit_to_cells(img, columns, rows),
            };
        }
        Some(rendered.lines.as_slice())
    }

    /// Drops renders whose handle is gone
    pub fn prune(&mut self, cache: &ItemCache) {
        self.rendered.retain(|handle, _| cache.is_live(*handle));
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fetch_batch;
    use crate::source::fake::FakeSource;

    #[test]
    fn test_calculate_resize_dimensions_scale_down() {
        let (width, height) = calculate_resize_dimensions(1600, 1200, 80, 40);
        assert!(width <= 80);
        assert!(height <= 40);
        // Aspect ratio survives within rounding
        let ratio_diff = (width * 3).abs_diff(height * 4);
        assert!(ratio_diff <= 4, "Aspect ratio not preserved: {}x{}", width, height);
    }

    #[test]
    fn test_calculate_resize_dimensions_no_upscale() {
        assert_eq!(calculate_resize_dimensions(40, 30, 80, 40), (40, 30));
    }

    #[test]
    fn test_calculate_resize_dimensions_zero() {
        assert_eq!(calculate_resize_dimensions(0, 0, 80, 40), (0, 0));
    }

    #[test]
    fn test_calculate_resize_dimensions_tall_image() {
        // Portrait cats are bounded by height
        assert_eq!(calculate_resize_dimensions(400, 500, 80, 40), (32, 40));
    }

    #[test]
    fn test_image_to_halfblock_dimensions() {
        let img = DynamicImage::new_rgb8(10, 10);
        let lines = image_to_halfblock_lines(&img, 5, 6);

        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.spans.len(), 5);
        }
    }

    #[test]
    fn test_image_to_halfblock_odd_height_rounds_up() {
        let img = DynamicImage::new_rgb8(4, 4);
        assert_eq!(image_to_halfblock_lines(&img, 4, 3).len(), 2);
    }

    #[test]
    fn test_image_to_halfblock_colors() {
        let pixels = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
        let img = DynamicImage::ImageRgb8(pixels);
        let lines = image_to_halfblock_lines(&img, 2, 2);
        let style = lines[0].spans[0].style;
        assert_eq!(style.fg, Some(Color::Rgb(10, 20, 30)));
        assert_eq!(style.bg, Some(Color::Rgb(10, 20, 30)));
    }

    #[test]
    fn test_fit_to_cells_uses_two_pixels_per_row() {
        // 400x500 into 40 columns by 25 rows (50 pixels tall)
        let img = DynamicImage::new_rgb8(400, 500);
        let lines = fit_to_cells(&img, 40, 25);
        assert_eq!(lines.len(), 25);
        assert_eq!(lines[0].spans.len(), 40);
    }

    #[tokio::test]
    async fn test_picture_cache_follows_handles() {
        let mut cache = ItemCache::new();
        let items = cache.admit(fetch_batch(&FakeSource::default(), 2, 0).await);
        let mut pictures = PictureCache::new();

        assert!(pictures.lines(&cache, items[0].display, 4, 3).is_some());
        assert!(pictures.lines(&cache, items[0].display, 4, 3).is_some());
        assert!(pictures.lines(&cache, items[1].display, 4, 3).is_some());
        assert_eq!(pictures.len(), 2);

        cache.release(&items[0]);
        assert!(pictures.lines(&cache, items[0].display, 4, 3).is_none());
        pictures.prune(&cache);
        assert_eq!(pictures.len(), 1);
    }

    #[tokio::test]
    async fn test_picture_cache_keeps_one_size_per_handle() {
        let mut cache = ItemCache::new();
        let items = cache.admit(fetch_batch(&FakeSource::default(), 1, 0).await);
        let mut pictures = PictureCache::new();

        let small = pictures.lines(&cache, items[0].display, 2, 1).unwrap().len();
        let large = pictures.lines(&cache, items[0].display, 40, 20).unwrap().len();

        // The 4x6 fake fits 2x1 cells as a single row and is not upscaled at 40x20
        assert_eq!(small, 1);
        assert_eq!(large, 3);
        assert_eq!(pictures.len(), 1);
    }
}
