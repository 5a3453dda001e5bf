//! Usage: Decode `.ico` / `.png` icon files into RGBA buffers (optionally downsized).

use image::imageops::FilterType;
use std::path::Path;

pub(crate) const TRAY_ICON_SIZE: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IconImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Reads and decodes `path`. With `size`, the result is resized to `size x size`.
pub(crate) fn load_icon(path: &Path, size: Option<u32>) -> Result<IconImage, String> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("ICON_READ: failed to read {}: {e}", path.display()))?;
    decode_icon(&bytes, size)
        .map_err(|e| format!("ICON_DECODE: failed to decode {}: {e}", path.display()))
}

fn decode_icon(bytes: &[u8], size: Option<u32>) -> Result<IconImage, image::ImageError> {
    let mut decoded = image::load_from_memory(bytes)?;
    if let Some(size) = size {
        decoded = decoded.resize_exact(size, size, FilterType::Lanczos3);
    }

    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(IconImage {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}
