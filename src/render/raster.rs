use std::{path::Path, sync::Arc};

use once_cell::sync::Lazy;
use tiny_skia::Pixmap;
use usvg::Tree;

use crate::render::RenderError;

/// System fonts, loaded once for every render.
static FONT_DB: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("[raster] loaded {} font faces", db.len());
    Arc::new(db)
});

/// Rasterize an SVG document at its own size onto a white background.
pub fn rasterize_svg(svg: &str) -> Result<Pixmap, RenderError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = FONT_DB.clone();
    let tree = Tree::from_str(svg, &opt).map_err(|e| RenderError::Scene(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        RenderError::Raster(format!("invalid canvas {}x{}", size.width(), size.height()))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pm);
    Ok(pixmap)
}

pub fn save_png(pixmap: &Pixmap, path: &Path) -> Result<(), RenderError> {
    pixmap
        .save_png(path)
        .map_err(|e| RenderError::Encode(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_rasterize_and_save() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><circle cx="10" cy="10" r="5" fill="blue"/></svg>"#;
        let pixmap = rasterize_svg(svg).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (40, 20));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_png(&pixmap, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_invalid_svg() {
        assert!(matches!(
            rasterize_svg("<not-svg"),
            Err(RenderError::Scene(_))
        ));
    }

    #[test]
    fn test_save_into_missing_directory() {
        let pixmap = Pixmap::new(2, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(save_png(&pixmap, &path), Err(RenderError::Encode(_))));
    }
}
