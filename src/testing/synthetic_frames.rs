//! Synthetic RGB24 frames with controlled photometric properties.
//!
//! These patterns exercise the scorer heuristics deterministically: solid
//! frames have zero sharpness, checkerboards have very high sharpness, and
//! gradients give a predictable brightness ramp.

use crate::types::FrameData;

/// A frame filled with a single gray level.
pub fn solid_frame(width: u32, height: u32, level: u8) -> FrameData {
    FrameData::new(vec![level; (width * height * 3) as usize], width, height)
}

/// A black/white checkerboard with square cells of `cell` pixels.
pub fn checkerboard_frame(width: u32, height: u32, cell: u32) -> FrameData {
    let cell = cell.max(1);
    let mut data = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let white = ((x / cell) + (y / cell)) % 2 == 0;
            let level = if white { 255 } else { 0 };
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = level;
            data[idx + 1] = level;
            data[idx + 2] = level;
        }
    }
    FrameData::new(data, width, height)
}

/// A horizontal gradient from black to white.
pub fn gradient_frame(width: u32, height: u32) -> FrameData {
    let mut data = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let level = ((x as u64 * 255) / width.max(1) as u64) as u8;
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = level;
            data[idx + 1] = level;
            data[idx + 2] = level;
        }
    }
    FrameData::new(data, width, height)
}
