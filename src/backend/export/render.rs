/**
 * PDF Rendering
 *
 * Draws a [`DocumentLayout`] with printpdf using the builtin Helvetica
 * font, one PDF page per layout page.
 */

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::backend::error::BackendError;
use crate::backend::export::layout::{DocumentLayout, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

/// Render the layout to PDF bytes
///
/// CPU bound; call it from `spawn_blocking` inside handlers.
///
/// # Errors
///
/// * `BackendError::ExportError` - Font registration or serialization failed
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>, BackendError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| BackendError::export(format!("font: {}", e)))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Layer {}", index + 1),
            )
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for line in &page.lines {
            layer.use_text(
                line.text.as_str(),
                line.size,
                Mm(line.x),
                Mm(PAGE_HEIGHT_MM - line.y),
                &font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| BackendError::export(format!("save: {}", e)))
}
