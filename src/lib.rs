pub mod font;
pub mod generate;
pub mod raster;
pub mod targets;
pub mod vector;

use image::{Rgb, Rgba};
use std::path::PathBuf;

pub use font::LabelFont;
pub use generate::{generate, generate_with, GenerateOptions, Report};
pub use targets::{AssetFormat, IconSet, SvgShadow, Target};

/// Visual constants shared by every icon set.
#[derive(Debug, Clone)]
pub struct IconStyle {
    pub background_start: Rgb<u8>,
    pub background_end: Rgb<u8>,
    pub label: String,
    pub label_gradient_start: Rgb<u8>,
    pub label_gradient_end: Rgb<u8>,
    /// Raster circle radius as a fraction of the icon size.
    pub circle_ratio: f32,
    /// Raster label font size as a fraction of the icon size.
    pub font_ratio: f32,
    /// Raster label is pushed down from the centre by this fraction of the size.
    pub label_offset_ratio: f32,
    pub shadow_offset: u32,
    pub shadow_color: Rgba<u8>,
    pub label_color: Rgba<u8>,
    pub font_candidates: Vec<PathBuf>,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            background_start: Rgb([0x66, 0x7e, 0xea]),
            background_end: Rgb([0x76, 0x4b, 0xa2]),
            label: "SVN".to_string(),
            label_gradient_start: Rgb([0xff, 0xff, 0xff]),
            label_gradient_end: Rgb([0xf0, 0xf0, 0xf0]),
            circle_ratio: 0.44,
            font_ratio: 0.3,
            label_offset_ratio: 0.05,
            shadow_offset: 2,
            shadow_color: Rgba([0, 0, 0, 100]),
            label_color: Rgba([255, 255, 255, 255]),
            font_candidates: vec![
                PathBuf::from("/System/Library/Fonts/Arial.ttf"),
                PathBuf::from("/System/Library/Fonts/Helvetica.ttc"),
            ],
        }
    }
}

/// `#rrggbb` form of a colour.
pub fn hex(c: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c.0[0], c.0[1], c.0[2])
}
