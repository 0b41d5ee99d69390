use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::{hex, IconStyle, SvgShadow};

/// Side of the square coordinate space every vector icon is drawn in.
pub const VIEWPORT: u32 = 108;

const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";
const SVG_NS: &str = "http://www.w3.org/2000/svg";

const ANDROID_OUTER_DISC: &str = "M54,6c26.5,0 48,21.5 48,48s-21.5,48 -48,48S6,80.5 6,54S27.5,6 54,6z";
const ANDROID_INNER_DISC: &str = "M54,10c24.3,0 44,19.7 44,44s-19.7,44 -44,44S10,78.3 10,54S29.7,10 54,10z";
const ANDROID_BARS: &str = "M30,65h48v-8h-48V65zM30,45h48v-8h-48V45z";

// --- small event helpers over quick-xml ---

struct XmlDoc {
    w: Writer<Vec<u8>>,
}

impl XmlDoc {
    fn new(encoding: &str) -> Result<Self> {
        let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some(encoding), None)))
            .context("Failed to write XML declaration")?;
        Ok(Self { w })
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let el = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.w
            .write_event(Event::Start(el))
            .with_context(|| format!("Failed to write <{name}>"))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let el = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.w
            .write_event(Event::Empty(el))
            .with_context(|| format!("Failed to write <{name}/>"))?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.w
            .write_event(Event::Text(BytesText::new(text)))
            .context("Failed to write text node")?;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.w
            .write_event(Event::Comment(BytesText::new(text)))
            .context("Failed to write comment")?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.w
            .write_event(Event::End(BytesEnd::new(name)))
            .with_context(|| format!("Failed to write </{name}>"))?;
        Ok(())
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.w.into_inner()).context("Generated XML is not valid UTF-8")
    }
}

fn gradient(doc: &mut XmlDoc, id: &str, from: &str, to: &str) -> Result<()> {
    doc.open(
        "linearGradient",
        &[("id", id), ("x1", "0%"), ("y1", "0%"), ("x2", "100%"), ("y2", "100%")],
    )?;
    let from_style = format!("stop-color:{from};stop-opacity:1");
    let to_style = format!("stop-color:{to};stop-opacity:1");
    doc.empty("stop", &[("offset", "0%"), ("style", from_style.as_str())])?;
    doc.empty("stop", &[("offset", "100%"), ("style", to_style.as_str())])?;
    doc.close("linearGradient")
}

/// Standalone SVG icon: gradient disc, faint inner ring and the label, all with
/// a soft drop shadow. `size` only sets the rendered width/height.
pub fn svg_document(size: u32, style: &IconStyle, shadow: SvgShadow) -> Result<String> {
    anyhow::ensure!(size > 0, "Icon size must be positive");

    let size_str = size.to_string();
    let view_box = format!("0 0 {VIEWPORT} {VIEWPORT}");
    let dy = shadow.dy.to_string();
    let blur = shadow.std_deviation.to_string();

    let mut doc = XmlDoc::new("UTF-8")?;
    doc.open(
        "svg",
        &[
            ("width", size_str.as_str()),
            ("height", size_str.as_str()),
            ("viewBox", view_box.as_str()),
            ("xmlns", SVG_NS),
        ],
    )?;

    doc.open("defs", &[])?;
    gradient(
        &mut doc,
        "bgGradient",
        &hex(style.background_start),
        &hex(style.background_end),
    )?;
    gradient(
        &mut doc,
        "textGradient",
        &hex(style.label_gradient_start),
        &hex(style.label_gradient_end),
    )?;
    doc.open(
        "filter",
        &[("id", "shadow"), ("x", "-50%"), ("y", "-50%"), ("width", "200%"), ("height", "200%")],
    )?;
    doc.empty(
        "feDropShadow",
        &[("dx", "0"), ("dy", dy.as_str()), ("stdDeviation", blur.as_str()), ("flood-opacity", "0.3")],
    )?;
    doc.close("filter")?;
    doc.close("defs")?;

    doc.comment(" Background circle with gradient ")?;
    doc.empty(
        "circle",
        &[
            ("cx", "54"),
            ("cy", "54"),
            ("r", "48"),
            ("fill", "url(#bgGradient)"),
            ("filter", "url(#shadow)"),
        ],
    )?;

    doc.comment(" Inner circle for depth effect ")?;
    doc.empty(
        "circle",
        &[
            ("cx", "54"),
            ("cy", "54"),
            ("r", "44"),
            ("fill", "none"),
            ("stroke", "rgba(255,255,255,0.2)"),
            ("stroke-width", "1"),
        ],
    )?;

    doc.comment(" Label ")?;
    doc.open(
        "text",
        &[
            ("x", "54"),
            ("y", "65"),
            ("font-family", "Arial, sans-serif"),
            ("font-size", "32"),
            ("font-weight", "900"),
            ("text-anchor", "middle"),
            ("fill", "url(#textGradient)"),
            ("filter", "url(#shadow)"),
        ],
    )?;
    doc.text(&style.label)?;
    doc.close("text")?;

    doc.close("svg")?;
    doc.finish()
}

/// Android launcher vector drawable: two stacked discs in the gradient end
/// colours with two white bars punched through.
pub fn android_vector(size: u32, style: &IconStyle) -> Result<String> {
    anyhow::ensure!(size > 0, "Icon size must be positive");

    let dp = format!("{size}dp");
    let viewport = VIEWPORT.to_string();
    let outer = hex(style.background_start);
    let inner = hex(style.background_end);

    let mut doc = XmlDoc::new("utf-8")?;
    doc.open(
        "vector",
        &[
            ("xmlns:android", ANDROID_NS),
            ("android:width", dp.as_str()),
            ("android:height", dp.as_str()),
            ("android:viewportWidth", viewport.as_str()),
            ("android:viewportHeight", viewport.as_str()),
        ],
    )?;
    doc.empty(
        "path",
        &[("android:fillColor", outer.as_str()), ("android:pathData", ANDROID_OUTER_DISC)],
    )?;
    doc.empty(
        "path",
        &[("android:fillColor", inner.as_str()), ("android:pathData", ANDROID_INNER_DISC)],
    )?;
    doc.empty(
        "path",
        &[
            ("android:fillColor", "#ffffff"),
            ("android:fillType", "evenOdd"),
            ("android:pathData", ANDROID_BARS),
        ],
    )?;
    doc.close("vector")?;
    doc.finish()
}

/// Bare SVG canvas holding copies of the label text, used by the rasteriser
/// to measure and draw it. Each run's `y` is the font's ascender line, not the
/// baseline.
pub(crate) fn label_svg(
    size: u32,
    family: &str,
    font_size: u32,
    runs: &[LabelRun],
) -> Result<String> {
    let size_str = size.to_string();
    let font_size = font_size.to_string();

    let mut doc = XmlDoc::new("UTF-8")?;
    doc.open(
        "svg",
        &[("width", size_str.as_str()), ("height", size_str.as_str()), ("xmlns", SVG_NS)],
    )?;
    for run in runs {
        let x = run.x.to_string();
        let y = run.y.to_string();
        let opacity = format!("{:.4}", run.color.0[3] as f32 / 255.0);
        let fill = hex(image::Rgb([run.color.0[0], run.color.0[1], run.color.0[2]]));
        doc.open(
            "text",
            &[
                ("x", x.as_str()),
                ("y", y.as_str()),
                ("font-family", family),
                ("font-size", font_size.as_str()),
                ("dominant-baseline", "text-before-edge"),
                ("fill", fill.as_str()),
                ("fill-opacity", opacity.as_str()),
            ],
        )?;
        doc.text(run.text)?;
        doc.close("text")?;
    }
    doc.close("svg")?;
    doc.finish()
}

/// One coloured copy of the label, anchored at its top-left ascender corner.
pub(crate) struct LabelRun<'a> {
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
    pub color: image::Rgba<u8>,
}
