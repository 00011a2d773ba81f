//! SVG parsing and rasterization shared by the decoder and the placeholder
//! renderer.

use image::{DynamicImage, RgbaImage};
use resvg::tiny_skia;
use resvg::usvg;
use resvg::usvg::fontdb;
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// Families tried for `sans-serif` when the default ("Arial") is missing.
const SANS_SERIF_FALLBACKS: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Cantarell",
    "FreeSans",
];

/// System fonts, loaded once per process.
static FONTS: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("loaded {} font faces for SVG text", db.len());
    resolve_sans_serif(&mut db);
    Arc::new(db)
});

/// Point the generic `sans-serif` family at a face that is installed.
fn resolve_sans_serif(db: &mut fontdb::Database) {
    if has_family(db, fontdb::Family::SansSerif) {
        return;
    }
    let fallback = SANS_SERIF_FALLBACKS
        .iter()
        .copied()
        .find(|name| has_family(db, fontdb::Family::Name(*name)))
        .map(|name| name.to_string())
        .or_else(|| {
            db.faces()
                .find(|face| !face.monospaced)
                .or_else(|| db.faces().next())
                .and_then(|face| face.families.first())
                .map(|(name, _)| name.clone())
        });
    match fallback {
        Some(name) => {
            log::debug!("using '{name}' for sans-serif text");
            db.set_sans_serif_family(name);
        }
        None => log::warn!("no fonts installed; SVG text will not be drawn"),
    }
}

/// Whether any font is available for SVG text.
#[cfg(test)]
pub fn has_fonts() -> bool {
    !FONTS.is_empty()
}

fn has_family(db: &fontdb::Database, family: fontdb::Family<'_>) -> bool {
    let families = [family];
    db.query(&fontdb::Query {
        families: &families,
        ..Default::default()
    })
    .is_some()
}

/// Parse an SVG document. Relative references resolve against `resources_dir`.
pub fn parse(data: &[u8], resources_dir: Option<&Path>) -> Result<usvg::Tree, usvg::Error> {
    let mut options = usvg::Options::default();
    options.resources_dir = resources_dir.map(Path::to_path_buf);
    options.fontdb = Arc::clone(&FONTS);
    usvg::Tree::from_data(data, &options)
}

/// Render a tree at its default size onto a transparent canvas.
///
/// Returns `None` when the default size is empty.
pub fn render(tree: &usvg::Tree) -> Option<DynamicImage> {
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())?;
    resvg::render(tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Some(pixmap_to_image(&pixmap))
}

/// tiny-skia stores premultiplied alpha; `image` expects straight alpha.
fn pixmap_to_image(pixmap: &tiny_skia::Pixmap) -> DynamicImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    DynamicImage::ImageRgba8(out)
}
