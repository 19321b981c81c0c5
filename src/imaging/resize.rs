use image::imageops::FilterType;

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A decoded, resized image ready to hand to the host surface
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub size: Dimensions,
    /// RGBA8, row-major
    pub pixels: Vec<u8>,
}

/// Compute the largest size that fits `frame` while keeping the aspect ratio
///
/// Width is fitted first, then height is re-checked. Never upscales.
pub fn fit_within(original: Dimensions, frame: Dimensions) -> Dimensions {
    let max_width = frame.width.max(1);
    let max_height = frame.height.max(1);

    if original.width == 0 || original.height == 0 {
        return original;
    }

    let aspect_ratio = original.width as f64 / original.height as f64;
    let mut width = original.width;
    let mut height = original.height;

    if width > max_width {
        width = max_width;
        height = (max_width as f64 / aspect_ratio) as u32;
    }

    if height > max_height {
        height = max_height;
        width = (max_height as f64 * aspect_ratio) as u32;
    }

    Dimensions::new(width.max(1), height.max(1))
}

/// Decode image bytes and shrink them to fit the display frame
pub fn prepare(bytes: &[u8], frame: Dimensions) -> Result<PreparedImage, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let original = Dimensions::new(img.width(), img.height());
    let target = fit_within(original, frame);

    let img = if target == original {
        img
    } else {
        img.resize_exact(target.width, target.height, FilterType::Lanczos3)
    };

    Ok(PreparedImage {
        size: target,
        pixels: img.to_rgba8().into_raw(),
    })
}
