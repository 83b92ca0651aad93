//! WASM bindings for `gaia-markdown`.
//!
//! Exposes the GAIA renderer to the browser admin via wasm-bindgen, so the
//! live preview runs exactly the pipeline the server uses. Variants are
//! passed as `"full"` / `"compact"`; omitting one selects `"full"`.

use gaia_markdown::{PageConfig, RenderOptions, Section, Variant};
use wasm_bindgen::prelude::*;

fn options_for(variant: Option<String>) -> Result<RenderOptions, String> {
    match variant {
        Some(v) => Ok(v.parse::<Variant>()?.options()),
        None => Ok(RenderOptions::full()),
    }
}

/// Render GAIA markdown to a sanitized HTML fragment.
#[wasm_bindgen]
pub fn render_html(input: &str, variant: Option<String>) -> Result<String, JsError> {
    let options = options_for(variant).map_err(|e| JsError::new(&e))?;
    Ok(gaia_markdown::render_with(input, &options))
}

/// Render GAIA markdown as a complete styled HTML page.
///
/// Front matter, if present, supplies the title unless one is passed.
#[wasm_bindgen]
pub fn render_html_page(input: &str, title: Option<String>) -> String {
    let (front_matter, body) = gaia_markdown::split_front_matter(input);
    let options = front_matter
        .as_ref()
        .and_then(|fm| fm.variant)
        .unwrap_or_default()
        .options();
    let config = PageConfig {
        title: title.or_else(|| front_matter.as_ref().and_then(|fm| fm.title.clone())),
        description: front_matter.and_then(|fm| fm.description),
        ..Default::default()
    };
    gaia_markdown::to_html_page(&gaia_markdown::render_with(body, &options), &config)
}

/// Reduce GAIA markdown to plain text for PDF export.
#[wasm_bindgen]
pub fn to_plain_text(input: &str) -> String {
    gaia_markdown::to_plain_text(input)
}

/// Validate GAIA markdown and return diagnostics as JSON.
///
/// Returns a JSON array of `{ severity, message, span, code }` objects.
/// An empty array means the content renders without degradation.
#[wasm_bindgen]
pub fn validate(input: &str) -> String {
    let diagnostics = gaia_markdown::validate(input);
    serde_json::to_string(&diagnostics).unwrap_or_else(|_| "[]".to_string())
}

/// Render an array of typed sections passed as a JS value.
#[wasm_bindgen]
pub fn render_sections(sections: JsValue, variant: Option<String>) -> Result<String, JsError> {
    let options = options_for(variant).map_err(|e| JsError::new(&e))?;
    let sections: Vec<Section> = serde_wasm_bindgen::from_value(sections)?;
    Ok(gaia_markdown::render_sections(&sections, &options))
}

/// Render an array of typed sections passed as a JSON string.
#[wasm_bindgen]
pub fn render_sections_json(json: &str, variant: Option<String>) -> Result<String, JsError> {
    let options = options_for(variant).map_err(|e| JsError::new(&e))?;
    let sections: Vec<Section> = serde_json::from_str(json)?;
    Ok(gaia_markdown::render_sections(&sections, &options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_selection() {
        assert_eq!(options_for(None), Ok(RenderOptions::full()));
        assert_eq!(options_for(Some("Compact".into())), Ok(RenderOptions::compact()));
        assert!(options_for(Some("fancy".into())).is_err());
    }

    #[test]
    fn page_takes_front_matter_title() {
        let html = render_html_page("---\ntitle: Thermal\n---\n## Body", None);
        assert!(html.contains("<title>Thermal</title>"));
        assert!(html.contains("<h2 class=\"gaia-h2\">Body</h2>"));
        let html = render_html_page("---\ntitle: Thermal\n---\n## Body", Some("Override".into()));
        assert!(html.contains("<title>Override</title>"));
    }

    #[test]
    fn validate_returns_json_array() {
        assert_eq!(validate("fine"), "[]");
        assert!(validate("```").contains("\"code\":\"G001\""));
    }
}
