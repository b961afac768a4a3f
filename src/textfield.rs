//! Editable surface adapter: one interface over `<input>`, `<textarea>`
//! and contenteditable regions.
//!
//! The two surface kinds mutate text through different APIs. Plain fields
//! keep a live selection while the popup is open, so reads go straight to
//! the element; contenteditable regions lose their selection once focus
//! moves, so the selection `Range` is snapshotted when the surface is
//! captured and every later operation works against that snapshot.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Range};

pub enum PlainKind {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

/// An `<input>` or `<textarea>`; both expose the same selection API.
pub struct PlainField {
    kind: PlainKind,
}

impl PlainField {
    pub fn element(&self) -> &HtmlElement {
        match &self.kind {
            PlainKind::Input(el) => el.as_ref(),
            PlainKind::TextArea(el) => el.as_ref(),
        }
    }

    /// Single-line inputs render text vertically centered, which changes
    /// how the caret mirror must compute line height.
    pub fn is_single_line(&self) -> bool {
        matches!(self.kind, PlainKind::Input(_))
    }

    pub fn value(&self) -> String {
        match &self.kind {
            PlainKind::Input(el) => el.value(),
            PlainKind::TextArea(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match &self.kind {
            PlainKind::Input(el) => el.set_value(value),
            PlainKind::TextArea(el) => el.set_value(value),
        }
    }

    pub fn caret_offset(&self) -> Option<u32> {
        let result = match &self.kind {
            PlainKind::Input(el) => el.selection_end(),
            PlainKind::TextArea(el) => el.selection_end(),
        };
        result.ok().flatten()
    }

    fn selection_start(&self) -> Option<u32> {
        let result = match &self.kind {
            PlainKind::Input(el) => el.selection_start(),
            PlainKind::TextArea(el) => el.selection_start(),
        };
        result.ok().flatten()
    }

    fn set_caret(&self, offset: u32) {
        let result = match &self.kind {
            PlainKind::Input(el) => el.set_selection_range(offset, offset),
            PlainKind::TextArea(el) => el.set_selection_range(offset, offset),
        };
        if let Err(e) = result {
            log::warn!("Failed to restore caret position: {:?}", e);
        }
    }
}

/// A contenteditable region with the selection snapshot captured at
/// session open.
pub struct RichField {
    element: HtmlElement,
    snapshot: Option<Range>,
}

impl RichField {
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

pub enum EditableSurface {
    Plain(PlainField),
    Rich(RichField),
}

impl EditableSurface {
    /// Wrap a raw event target. Returns `None` for anything that is not a
    /// text-capable input, a textarea or a contenteditable node. For rich
    /// surfaces the current selection range is snapshotted here, before
    /// any popup interaction can move it.
    pub fn from_element(element: &Element) -> Option<Self> {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            // Non-text inputs (color, range, ...) throw on selection access
            if !matches!(input.selection_start(), Ok(Some(_))) {
                log::debug!("Input without a text selection, ignoring");
                return None;
            }
            return Some(EditableSurface::Plain(PlainField {
                kind: PlainKind::Input(input.clone()),
            }));
        }

        if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            return Some(EditableSurface::Plain(PlainField {
                kind: PlainKind::TextArea(textarea.clone()),
            }));
        }

        if is_content_editable(element) {
            if let Some(html) = element.dyn_ref::<HtmlElement>() {
                return Some(EditableSurface::Rich(RichField {
                    element: html.clone(),
                    snapshot: capture_selection_range(),
                }));
            }
        }

        log::warn!("Unknown editable surface kind, ignoring: <{}>", element.tag_name());
        None
    }

    pub fn element(&self) -> &HtmlElement {
        match self {
            EditableSurface::Plain(field) => field.element(),
            EditableSurface::Rich(field) => field.element(),
        }
    }

    /// Whether the caret sits somewhere an emoji trigger makes sense: at
    /// the very start of the field, or right after whitespace. The check
    /// runs after the trigger character has landed, so "two positions
    /// back" skips over it.
    pub fn is_valid_insertion_point(&self) -> bool {
        match self {
            EditableSurface::Plain(field) => match field.selection_start() {
                Some(caret) => is_valid_offset(&field.value(), caret as usize),
                None => false,
            },
            EditableSurface::Rich(field) => {
                let range = match &field.snapshot {
                    Some(range) => range,
                    // No snapshot means the selection state is unknowable
                    None => return false,
                };
                let offset = match range.start_offset() {
                    Ok(offset) => offset as usize,
                    Err(_) => return false,
                };
                if offset <= 1 {
                    return true;
                }
                let text = range
                    .start_container()
                    .ok()
                    .and_then(|node| node.text_content())
                    .unwrap_or_default();
                is_valid_offset(&text, offset)
            }
        }
    }

    /// Delete `padding + 1` UTF-16 units ending at the caret (the `+1`
    /// covers the trigger character), insert `text` in their place and
    /// put the caret right after it. Returns `false` when the snapshot is
    /// stale or absent; the caller treats that as a no-op.
    pub fn insert(&self, text: &str, padding: usize) -> bool {
        match self {
            EditableSurface::Plain(field) => insert_plain(field, text, padding),
            EditableSurface::Rich(field) => match insert_rich(field, text, padding) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Stale selection snapshot, skipped insertion: {:?}", e);
                    false
                }
            },
        }
    }

    /// Current textual content of the surface.
    #[allow(dead_code)] // Diagnostic readback
    pub fn value(&self) -> String {
        match self {
            EditableSurface::Plain(field) => field.value(),
            EditableSurface::Rich(field) => field.element.inner_html(),
        }
    }
}

fn is_content_editable(element: &Element) -> bool {
    matches!(element.get_attribute("contenteditable").as_deref(), Some(v) if v != "false")
}

fn capture_selection_range() -> Option<Range> {
    let selection = web_sys::window()?.get_selection().ok().flatten()?;
    if selection.range_count() == 0 {
        return None;
    }
    selection.get_range_at(0).ok()
}

fn insert_plain(field: &PlainField, text: &str, padding: usize) -> bool {
    let caret = match field.caret_offset() {
        Some(caret) => caret as usize,
        None => return false,
    };

    match splice_utf16(&field.value(), caret, padding, text) {
        Some((new_value, new_caret)) => {
            field.set_value(&new_value);
            field.element().focus().ok();
            field.set_caret(new_caret as u32);
            true
        }
        None => {
            log::warn!("Caret moved out of range, skipped insertion");
            false
        }
    }
}

fn insert_rich(field: &RichField, text: &str, padding: usize) -> Result<(), JsValue> {
    let snapshot = field
        .snapshot
        .as_ref()
        .ok_or_else(|| JsValue::from_str("no selection snapshot"))?;

    let start_container = snapshot.start_container()?;
    let start_offset = snapshot.start_offset()?;
    if start_offset < 1 {
        return Err(JsValue::from_str("caret before trigger character"));
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let selection = window
        .get_selection()?
        .ok_or_else(|| JsValue::from_str("no selection"))?;

    field.element.focus().ok();

    // Deletion range: trigger character plus the typed filter text
    let range = document.create_range()?;
    range.set_start(&start_container, start_offset - 1)?;
    range.set_end(&start_container, start_offset + padding as u32)?;

    selection.remove_all_ranges()?;
    selection.add_range(&range)?;
    range.delete_contents()?;

    let text_node = document.create_text_node(text);
    range.insert_node(&text_node)?;

    // Collapse the selection to just after the inserted text
    selection.remove_all_ranges()?;
    range.set_start(&text_node, text_node.length())?;
    range.set_end(&text_node, text_node.length())?;
    selection.add_range(&range)?;

    Ok(())
}

/// Replace the `padding + 1` UTF-16 units ending at `caret` with `text`.
/// Returns the new value and the post-insertion caret offset, or `None`
/// when the caret is out of range for the current value.
pub fn splice_utf16(
    value: &str,
    caret: usize,
    padding: usize,
    text: &str,
) -> Option<(String, usize)> {
    let units: Vec<u16> = value.encode_utf16().collect();
    if caret > units.len() {
        return None;
    }
    let start = caret.checked_sub(padding + 1)?;

    let inserted: Vec<u16> = text.encode_utf16().collect();
    let mut spliced = Vec::with_capacity(units.len() + inserted.len());
    spliced.extend_from_slice(&units[..start]);
    spliced.extend_from_slice(&inserted);
    spliced.extend_from_slice(&units[caret..]);

    let new_caret = start + inserted.len();
    Some((String::from_utf16_lossy(&spliced), new_caret))
}

/// Trigger placement rule shared by both surface kinds, in UTF-16 units:
/// valid at offsets 0 and 1, or when the unit two positions back (before
/// the already-typed trigger) is whitespace.
pub fn is_valid_offset(value: &str, caret: usize) -> bool {
    if caret <= 1 {
        return true;
    }
    let units: Vec<u16> = value.encode_utf16().collect();
    if caret > units.len() {
        return false;
    }
    match std::char::decode_utf16(std::iter::once(units[caret - 2])).next() {
        Some(Ok(c)) => c.is_whitespace(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_replaces_trigger_and_padding() {
        // "hello :gri|" with padding 3 -> trigger plus filter replaced
        let (value, caret) = splice_utf16("hello :gri", 10, 3, "😀").unwrap();
        assert_eq!(value, "hello 😀");
        // emoji is two UTF-16 units, caret lands right after it
        assert_eq!(caret, 8);
    }

    #[test]
    fn splice_keeps_text_after_caret() {
        let (value, caret) = splice_utf16("a :x tail", 4, 1, "Z").unwrap();
        assert_eq!(value, "a Z tail");
        assert_eq!(caret, 3);
    }

    #[test]
    fn splice_with_zero_padding_removes_only_trigger() {
        let (value, caret) = splice_utf16(":", 1, 0, "🎉").unwrap();
        assert_eq!(value, "🎉");
        assert_eq!(caret, 2);
    }

    #[test]
    fn splice_rejects_stale_caret() {
        // caret beyond the value: the snapshot no longer matches
        assert!(splice_utf16("ab", 5, 0, "x").is_none());
        // caret too close to the start for the padding
        assert!(splice_utf16("ab", 1, 4, "x").is_none());
    }

    #[test]
    fn splice_counts_utf16_units_not_chars() {
        // value starts with an astral-plane char (2 units)
        let (value, caret) = splice_utf16("😀 :a", 5, 1, "!").unwrap();
        assert_eq!(value, "😀 !");
        assert_eq!(caret, 4);
    }

    #[test]
    fn offset_zero_and_one_are_valid() {
        assert!(is_valid_offset("", 0));
        assert!(is_valid_offset(":", 1));
        assert!(is_valid_offset("anything", 0));
    }

    #[test]
    fn offset_after_whitespace_is_valid() {
        // "hi :" caret at 4, two back is a space
        assert!(is_valid_offset("hi :", 4));
        assert!(is_valid_offset("line\n:", 6));
        assert!(is_valid_offset("tab\t:", 5));
    }

    #[test]
    fn offset_mid_word_is_invalid() {
        // "ab:" caret at 3, two back is 'b'
        assert!(!is_valid_offset("ab:", 3));
        assert!(!is_valid_offset("http:", 5));
    }

    #[test]
    fn offset_beyond_value_is_invalid() {
        assert!(!is_valid_offset("ab", 9));
    }
}
