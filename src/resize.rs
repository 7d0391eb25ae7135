use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Scales `image` so its shortest side equals `min_size`, keeping the aspect
/// ratio. The longer side is truncated.
pub fn min_resize(image: &DynamicImage, min_size: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = shortest_side_dimensions(width, height, min_size);
    image.resize_exact(new_width, new_height, FilterType::CatmullRom)
}

/// Downscales only when the shortest side is above `max_shortest_side`.
pub fn limit_shortest_side(image: DynamicImage, max_shortest_side: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width.min(height) > max_shortest_side {
        min_resize(&image, max_shortest_side)
    } else {
        image
    }
}

fn shortest_side_dimensions(width: u32, height: u32, min_size: u32) -> (u32, u32) {
    let width = width.max(1) as u64;
    let height = height.max(1) as u64;
    let min_size = min_size as u64;
    if width > height {
        ((min_size * width / height) as u32, min_size as u32)
    } else {
        (min_size as u32, (min_size * height / width) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn landscape_keeps_ratio() {
        assert_eq!(shortest_side_dimensions(4000, 3000, 2160), (2880, 2160));
    }

    #[test]
    fn portrait_truncates_long_side() {
        assert_eq!(shortest_side_dimensions(1000, 1999, 500), (500, 999));
    }

    #[test]
    fn square_uses_min_size_on_both_axes() {
        assert_eq!(shortest_side_dimensions(300, 300, 100), (100, 100));
    }

    #[test]
    fn limit_only_shrinks_large_images() {
        let small = DynamicImage::ImageRgb8(RgbImage::new(40, 30));
        assert_eq!(limit_shortest_side(small, 30).dimensions(), (40, 30));

        let large = DynamicImage::ImageRgb8(RgbImage::new(80, 60));
        assert_eq!(limit_shortest_side(large, 30).dimensions(), (40, 30));
    }
}
