use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

use crate::{raster, vector, IconStyle, LabelFont};

const DESKTOP_SIZES: [u32; 8] = [16, 32, 48, 64, 128, 256, 512, 1024];

const ANDROID_SIZE: u32 = 108;
const ANDROID_DENSITIES: [&str; 5] = [
    "mipmap-hdpi",
    "mipmap-mdpi",
    "mipmap-xhdpi",
    "mipmap-xxhdpi",
    "mipmap-xxxhdpi",
];

const MACOS_ICONSET_DIR: &str = "macos/Runner/Assets.xcassets/AppIcon.iconset";
const MACOS_ICONSET: [(u32, &str); 10] = [
    (16, "icon_16x16"),
    (32, "icon_16x16@2x"),
    (32, "icon_32x32"),
    (64, "icon_32x32@2x"),
    (128, "icon_128x128"),
    (256, "icon_128x128@2x"),
    (256, "icon_256x256"),
    (512, "icon_256x256@2x"),
    (512, "icon_512x512"),
    (1024, "icon_512x512@2x"),
];

/// Drop shadow applied to the SVG disc and label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgShadow {
    pub dy: u32,
    pub std_deviation: u32,
}

impl SvgShadow {
    pub const DESKTOP: SvgShadow = SvgShadow { dy: 4, std_deviation: 4 };
    pub const MACOS: SvgShadow = SvgShadow { dy: 2, std_deviation: 2 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Svg(SvgShadow),
    AndroidVector,
    Png,
}

/// A family of icon files that are always generated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum IconSet {
    /// Desktop SVG icons under assets/icons
    Desktop,
    /// Android launcher vector drawables, one per density folder
    Android,
    /// macOS iconset as SVG documents
    MacosSvg,
    /// macOS iconset as PNG bitmaps
    MacosPng,
}

impl IconSet {
    pub const ALL: [IconSet; 4] = [
        IconSet::Desktop,
        IconSet::Android,
        IconSet::MacosSvg,
        IconSet::MacosPng,
    ];

    pub fn targets(self) -> Vec<Target> {
        match self {
            IconSet::Desktop => DESKTOP_SIZES
                .iter()
                .map(|&size| Target {
                    set: self,
                    size,
                    path: PathBuf::from(format!("assets/icons/icon_{size}x{size}.svg")),
                    format: AssetFormat::Svg(SvgShadow::DESKTOP),
                })
                .collect(),
            IconSet::Android => ANDROID_DENSITIES
                .iter()
                .map(|folder| Target {
                    set: self,
                    size: ANDROID_SIZE,
                    path: PathBuf::from(format!(
                        "android/app/src/main/res/{folder}/ic_launcher.xml"
                    )),
                    format: AssetFormat::AndroidVector,
                })
                .collect(),
            IconSet::MacosSvg => iconset_targets(self, "svg", AssetFormat::Svg(SvgShadow::MACOS)),
            IconSet::MacosPng => iconset_targets(self, "png", AssetFormat::Png),
        }
    }

    /// Requested sets in first-seen order without repeats; every set when
    /// nothing was requested.
    pub fn selection(requested: &[IconSet]) -> Vec<IconSet> {
        if requested.is_empty() {
            return IconSet::ALL.to_vec();
        }
        let mut sets = Vec::with_capacity(requested.len());
        for &set in requested {
            if !sets.contains(&set) {
                sets.push(set);
            }
        }
        sets
    }

    pub fn needs_font(self) -> bool {
        self.targets().iter().any(|t| t.format == AssetFormat::Png)
    }
}

impl fmt::Display for IconSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IconSet::Desktop => "desktop",
            IconSet::Android => "android",
            IconSet::MacosSvg => "macos-svg",
            IconSet::MacosPng => "macos-png",
        };
        f.write_str(name)
    }
}

fn iconset_targets(set: IconSet, ext: &str, format: AssetFormat) -> Vec<Target> {
    MACOS_ICONSET
        .iter()
        .map(|&(size, stem)| Target {
            set,
            size,
            path: PathBuf::from(MACOS_ICONSET_DIR).join(format!("{stem}.{ext}")),
            format,
        })
        .collect()
}

/// One file to produce, with its path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub set: IconSet,
    pub size: u32,
    pub path: PathBuf,
    pub format: AssetFormat,
}

impl Target {
    /// Encoded file contents for this target.
    pub fn render(&self, style: &IconStyle, font: &LabelFont) -> Result<Vec<u8>> {
        match self.format {
            AssetFormat::Svg(shadow) => {
                Ok(vector::svg_document(self.size, style, shadow)?.into_bytes())
            }
            AssetFormat::AndroidVector => {
                Ok(vector::android_vector(self.size, style)?.into_bytes())
            }
            AssetFormat::Png => raster::render_png(self.size, style, font),
        }
    }
}
