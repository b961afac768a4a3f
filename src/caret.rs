//! Caret geometry: where on screen should the popup appear.
//!
//! Plain fields expose no caret rectangle, so an off-screen mirror
//! element replicates every layout-affecting style of the field, holds
//! the text up to the caret and a marker span whose offset position is
//! the caret position. Contenteditable regions get theirs from the live
//! selection range.

use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, HtmlElement};

use crate::animate::split_unit;
use crate::textfield::{EditableSurface, PlainField};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CaretPoint {
    pub top: f64,
    pub left: f64,
}

/// Viewport-absolute caret position for popup placement. The returned
/// `top` sits one font height below the caret so the popup opens under
/// the text line instead of covering it.
pub fn absolute_caret_position(surface: &EditableSurface) -> CaretPoint {
    let base = match surface {
        EditableSurface::Plain(field) => locate_plain(field).unwrap_or_default(),
        EditableSurface::Rich(_) => locate_rich(),
    };

    CaretPoint {
        top: base.top + font_size_px(surface.element()),
        left: base.left,
    }
}

/// Style properties the mirror must copy for its text to wrap and meter
/// exactly like the field's. Shorthands are expanded because computed
/// style does not reliably concatenate them.
const MIRROR_PROPERTIES: &[&str] = &[
    "direction",
    "box-sizing",
    "width",
    "height",
    "overflow-x",
    "overflow-y",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-style",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "font-style",
    "font-variant",
    "font-weight",
    "font-stretch",
    "font-size",
    "font-size-adjust",
    "line-height",
    "font-family",
    "text-align",
    "text-transform",
    "text-indent",
    "text-decoration",
    "letter-spacing",
    "word-spacing",
    "tab-size",
];

fn locate_plain(field: &PlainField) -> Option<CaretPoint> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let body = document.body()?;

    let element = field.element();
    let computed = window.get_computed_style(element).ok().flatten()?;
    let caret = field.caret_offset()? as usize;

    let mirror: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
    let style = mirror.style();

    style.set_property("white-space", "pre-wrap").ok();
    if !field.is_single_line() {
        style.set_property("word-wrap", "break-word").ok();
    }
    // Rendered but invisible; display:none would not lay out at all
    style.set_property("position", "absolute").ok();
    style.set_property("visibility", "hidden").ok();

    for prop in MIRROR_PROPERTIES {
        if field.is_single_line() && *prop == "line-height" {
            style.set_property("line-height", &single_line_height(&computed)).ok();
        } else {
            let value = computed.get_property_value(prop).unwrap_or_default();
            style.set_property(prop, &value).ok();
        }
    }
    style.set_property("overflow", "hidden").ok();

    let units: Vec<u16> = field.value().encode_utf16().collect();
    let caret = caret.min(units.len());

    let mut before = String::from_utf16_lossy(&units[..caret]);
    if field.is_single_line() {
        // Single-line inputs collapse whitespace; NBSP keeps the metering
        before = before
            .chars()
            .map(|c| if c.is_whitespace() { '\u{a0}' } else { c })
            .collect();
    }
    mirror.set_text_content(Some(&before));

    // The remainder of the text must follow the marker so wrapping
    // matches the field exactly; an empty span would not render
    let marker: HtmlElement = document.create_element("span").ok()?.dyn_into().ok()?;
    let after = String::from_utf16_lossy(&units[caret..]);
    marker.set_text_content(Some(if after.is_empty() { "." } else { after.as_str() }));
    mirror.append_child(&marker).ok()?;

    body.append_child(&mirror).ok()?;

    // Only infallible reads between attach and remove, so the mirror
    // cannot be left behind
    let rect = element.get_bounding_client_rect();
    let top = marker.offset_top() as f64 + parse_px(&computed, "border-top-width") + rect.top()
        - element.scroll_top() as f64;
    let left = marker.offset_left() as f64 + parse_px(&computed, "border-left-width") + rect.left()
        - element.scroll_left() as f64;

    mirror.remove();

    Some(CaretPoint { top, left })
}

/// Line height for the mirror of a single-line input. Text in an input is
/// vertically centered, so with border-box sizing the effective line
/// height is the content height, not the computed line-height.
fn single_line_height(computed: &CssStyleDeclaration) -> String {
    if computed.get_property_value("box-sizing").unwrap_or_default() != "border-box" {
        return computed.get_property_value("height").unwrap_or_default();
    }

    let height = parse_px(computed, "height");
    let outer = parse_px(computed, "padding-top")
        + parse_px(computed, "padding-bottom")
        + parse_px(computed, "border-top-width")
        + parse_px(computed, "border-bottom-width");

    match line_height_case(height, outer, parse_px(computed, "line-height")) {
        LineHeightCase::Content(h) => format!("{h}px"),
        LineHeightCase::Keep => computed.get_property_value("line-height").unwrap_or_default(),
        LineHeightCase::Collapsed => "0".to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum LineHeightCase {
    /// Box taller than one line: line height is the content height.
    Content(f64),
    /// Box exactly one line tall: keep the computed line-height.
    Keep,
    /// Box shorter than a single line.
    Collapsed,
}

/// Compare the border-box height against padding + border + one line.
/// Computed px values carry fractional parts, so sub-pixel differences
/// count as equal.
fn line_height_case(height: f64, outer: f64, line_height: f64) -> LineHeightCase {
    let target = outer + line_height;
    if height > target + 0.5 {
        LineHeightCase::Content(height - outer)
    } else if height >= target - 0.5 {
        LineHeightCase::Keep
    } else {
        LineHeightCase::Collapsed
    }
}

fn locate_rich() -> CaretPoint {
    let range = web_sys::window()
        .and_then(|w| w.get_selection().ok().flatten())
        .filter(|sel| sel.range_count() > 0)
        .and_then(|sel| sel.get_range_at(0).ok());

    match range {
        Some(range) => {
            let range = range.clone_range();
            range.collapse_with_to_start(true);
            // An empty document yields an all-zero rect, which is the
            // documented {0,0} fallback
            let rect = range.get_bounding_client_rect();
            CaretPoint {
                top: rect.top(),
                left: rect.left(),
            }
        }
        None => CaretPoint::default(),
    }
}

fn font_size_px(element: &HtmlElement) -> f64 {
    web_sys::window()
        .and_then(|w| w.get_computed_style(element).ok().flatten())
        .and_then(|computed| computed.get_property_value("font-size").ok())
        .and_then(|value| split_unit(&value))
        .map(|(number, _)| number)
        .unwrap_or(0.0)
}

fn parse_px(computed: &CssStyleDeclaration, prop: &str) -> f64 {
    computed
        .get_property_value(prop)
        .ok()
        .and_then(|value| split_unit(&value))
        .map(|(number, _)| number)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tall_box_uses_content_height() {
        // 44px box, 10px padding+border, 20px line: text centers in 34px
        assert_eq!(line_height_case(44.0, 10.0, 20.0), LineHeightCase::Content(34.0));
    }

    #[test]
    fn one_line_box_keeps_computed_line_height() {
        assert_eq!(line_height_case(30.0, 10.0, 20.0), LineHeightCase::Keep);
    }

    #[test]
    fn fractional_heights_within_half_pixel_count_as_one_line() {
        // browsers report fractional computed px; 30.4 vs 30.0 is one line
        assert_eq!(line_height_case(30.4, 10.0, 20.0), LineHeightCase::Keep);
        assert_eq!(line_height_case(30.0, 9.6, 20.7), LineHeightCase::Keep);
    }

    #[test]
    fn undersized_box_collapses() {
        assert_eq!(line_height_case(15.0, 10.0, 20.0), LineHeightCase::Collapsed);
    }
}
