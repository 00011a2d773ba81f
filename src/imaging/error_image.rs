//! Placeholder images shown in place of files that failed to load.

use super::backend::ImageResult;
use super::params::Dimensions;
use super::vector;
use image::{DynamicImage, Rgba, RgbaImage};

const HEADING: &str = "ERROR LOADING IMAGE";
const BACKGROUND: [u8; 4] = [0x2b, 0x2b, 0x2b, 0xff];
const TEXT_WIDTH: u32 = 440;
const FONT_SIZE: u32 = 16;
const LINE_HEIGHT: u32 = 22;

/// Builds fixed-size placeholder images with a centered, word-wrapped message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorImageFactory {
    size: Dimensions,
}

impl Default for ErrorImageFactory {
    fn default() -> Self {
        Self::new(Dimensions::new(640, 480))
    }
}

impl ErrorImageFactory {
    pub fn new(size: Dimensions) -> Self {
        Self { size }
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }

    /// Render `message` onto a placeholder.
    ///
    /// The result always has an empty format, no scale factors, no
    /// animation, and its own canvas size as the original size.
    pub fn build(&self, message: &str) -> ImageResult {
        let pixels = self.render(message).unwrap_or_else(|| {
            log::warn!("placeholder text rendering failed; using plain canvas");
            self.blank()
        });
        ImageResult {
            original_size: Dimensions::new(pixels.width(), pixels.height()),
            pixels,
            format: String::new(),
            scale_factor1: None,
            scale_factor2: None,
            is_animated: false,
            error: Some(message.to_string()),
        }
    }

    fn blank(&self) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            self.size.width.max(1),
            self.size.height.max(1),
            Rgba(BACKGROUND),
        ))
    }

    fn render(&self, message: &str) -> Option<DynamicImage> {
        let svg = self.document(message);
        let tree = vector::parse(svg.as_bytes(), None).ok()?;
        vector::render(&tree)
    }

    fn document(&self, message: &str) -> String {
        let mut lines = vec![HEADING.to_string(), String::new()];
        for paragraph in message.lines() {
            lines.extend(wrap(paragraph, chars_per_line()));
        }

        let Dimensions { width, height } = self.size;
        let center_x = width / 2;
        let block = LINE_HEIGHT * lines.len() as u32;
        let first_baseline = (height.saturating_sub(block)) / 2 + FONT_SIZE;

        let mut tspans = String::new();
        for (i, line) in lines.iter().enumerate() {
            let y = first_baseline + LINE_HEIGHT * i as u32;
            tspans.push_str(&format!(
                r#"<tspan x="{center_x}" y="{y}">{}</tspan>"#,
                escape_xml(line)
            ));
        }

        let [r, g, b, _] = BACKGROUND;
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
                r##"<rect width="{w}" height="{h}" fill="#{r:02x}{g:02x}{b:02x}"/>"##,
                r#"<text font-family="sans-serif" font-size="{fs}" font-weight="bold" "#,
                r#"fill="white" text-anchor="middle">{spans}</text></svg>"#
            ),
            w = width,
            h = height,
            r = r,
            g = g,
            b = b,
            fs = FONT_SIZE,
            spans = tspans,
        )
    }
}

/// Average bold glyph is a bit over half the font size wide.
fn chars_per_line() -> usize {
    (TEXT_WIDTH * 10 / (FONT_SIZE * 6)) as usize
}

/// Greedy word wrap; words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.chars().count() + 1 + word.len()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
