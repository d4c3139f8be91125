//! HTML to plain-text conversion.

/// Layout width handed to the HTML renderer.
///
/// Wide enough that paragraphs come back unwrapped; line wrapping happens in
/// the rasterizer at its own column width.
const HTML_LAYOUT_WIDTH: usize = 4096;

/// Convert an HTML document or fragment to readable plain text.
///
/// Malformed markup is tolerated; the parser recovers the way browsers do.
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), HTML_LAYOUT_WIDTH)
}
