//! Popup lifecycle and input orchestration.
//!
//! A single popup instance lives for the page's lifetime, owned by a
//! thread-local cell (WASM is single-threaded). A session starts when the
//! trigger lands on a valid surface and ends on insert, escape, arrow
//! left/right, backspace past empty, or a click outside the popup.
//! Keyboard and mouse selection share one index; hover input is gated by
//! a flag that any keypress clears and the next mouse movement re-arms.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, KeyboardEvent, MouseEvent};

use crate::animate::{self, AnimProp};
use crate::caret;
use crate::session::{self, BackspaceOutcome, PickerSession};
use crate::stores::emoji_store::Candidate;
use crate::stores::settings_store;
use crate::textfield::EditableSurface;

const SCROLL_ANIMATION_MS: f64 = 200.0;
const HOVER_ANIMATION_MS: f64 = 100.0;

const NOT_FOUND_ROW: &str =
    r#"<li class="emoji empty"><span>:'-(</span><span>No matches found</span></li>"#;

pub struct Popup {
    popup_elt: HtmlElement,
    emojis_elt: HtmlElement,
    highlight_elt: HtmlElement,
    surface: Option<EditableSurface>,
    session: PickerSession,
    candidates: Vec<Candidate>,
    open: bool,
    on_keydown: Option<Closure<dyn FnMut(KeyboardEvent)>>,
    on_click: Option<Closure<dyn FnMut(MouseEvent)>>,
    on_mousemove: Option<Closure<dyn FnMut(MouseEvent)>>,
    on_mouseover: Option<Closure<dyn FnMut(MouseEvent)>>,
}

thread_local! {
    static POPUP: RefCell<Option<Popup>> = RefCell::new(None);
}

/// Build the popup DOM and event handlers once, on extension load. The
/// instance is never torn down.
pub fn init() {
    let already = POPUP.with(|cell| cell.borrow().is_some());
    if already {
        return;
    }

    let (popup_elt, emojis_elt, highlight_elt) = match build_dom() {
        Some(parts) => parts,
        None => {
            log::error!("Failed to build popup DOM, picker disabled");
            return;
        }
    };

    POPUP.with(|cell| {
        *cell.borrow_mut() = Some(Popup {
            popup_elt,
            emojis_elt,
            highlight_elt,
            surface: None,
            session: PickerSession::new(),
            candidates: Vec::new(),
            open: false,
            on_keydown: None,
            on_click: None,
            on_mousemove: None,
            on_mouseover: None,
        });
    });

    install_handlers();
}

/// Open a session for the given trigger target. No-op while a session is
/// already open, or when the target is not a valid insertion point.
pub fn open_for(target: &Element) {
    with_popup(|popup| popup.show(target));
}

fn with_popup<F: FnOnce(&mut Popup)>(f: F) {
    POPUP.with(|cell| {
        if let Ok(mut slot) = cell.try_borrow_mut() {
            if let Some(popup) = slot.as_mut() {
                f(popup);
            }
        }
    });
}

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn build_dom() -> Option<(HtmlElement, HtmlElement, HtmlElement)> {
    let document = document()?;
    let body = document.body()?;

    let container: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
    container.set_class_name("emojikey-popup");
    container.set_inner_html(r#"<ul class="emojis"></ul><div class="highlight"></div>"#);

    let emojis: HtmlElement = container.query_selector(".emojis").ok()??.dyn_into().ok()?;
    let highlight: HtmlElement = container.query_selector(".highlight").ok()??.dyn_into().ok()?;

    body.append_child(&container).ok()?;
    Some((container, emojis, highlight))
}

fn install_handlers() {
    let on_keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        with_popup(|popup| popup.handle_keydown(&event));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let on_click = Closure::wrap(Box::new(move |event: MouseEvent| {
        with_popup(|popup| popup.handle_click(&event));
    }) as Box<dyn FnMut(MouseEvent)>);

    let on_mousemove = Closure::wrap(Box::new(move |_event: MouseEvent| {
        with_popup(|popup| {
            if popup.open {
                popup.enable_mouse_input();
            }
        });
    }) as Box<dyn FnMut(MouseEvent)>);

    let on_mouseover = Closure::wrap(Box::new(move |event: MouseEvent| {
        with_popup(|popup| popup.handle_hover(&event));
    }) as Box<dyn FnMut(MouseEvent)>);

    with_popup(|popup| {
        popup.on_keydown = Some(on_keydown);
        popup.on_click = Some(on_click);
        popup.on_mousemove = Some(on_mousemove);
        popup.on_mouseover = Some(on_mouseover);
    });
}

impl Popup {
    fn show(&mut self, target: &Element) {
        // Only one session at a time
        if self.open {
            return;
        }

        let surface = match EditableSurface::from_element(target) {
            Some(surface) => surface,
            None => return,
        };

        if !surface.is_valid_insertion_point() {
            log::debug!("Caret is mid-word, not opening picker");
            return;
        }

        let position = caret::absolute_caret_position(&surface);
        let style = self.popup_elt.style();
        style.set_property("top", &format!("{}px", position.top)).ok();
        style.set_property("left", &format!("{}px", position.left)).ok();

        self.surface = Some(surface);
        self.session = PickerSession::new();
        self.open = true;

        self.attach_session_listeners();
        self.disable_mouse_input();
        self.render();

        self.popup_elt.class_list().add_1("show").ok();
    }

    fn hide(&mut self) {
        if !self.open {
            return;
        }

        self.detach_session_listeners();

        self.surface = None;
        self.candidates.clear();
        self.session = PickerSession::new();
        self.open = false;

        // Reset highlight and scroll for the next session
        self.highlight_elt.style().set_property("top", "0px").ok();
        self.emojis_elt.set_scroll_top(0);

        self.popup_elt.class_list().remove_1("show").ok();
    }

    /*== Keyboard ==*/

    fn handle_keydown(&mut self, event: &KeyboardEvent) {
        if !self.open {
            return;
        }

        // Keyboard input takes the selection back from the mouse
        if self.session.accept_mouse_input {
            self.disable_mouse_input();
        }

        let key = event.key();

        // Printable characters extend the filter; they also land in the
        // field and are deleted again as padding on insert
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            self.session.append_char(c);
            self.render();
            return;
        }

        let cancel = || {
            event.stop_propagation();
            event.prevent_default();
        };

        match key.as_str() {
            "Backspace" => match self.session.backspace() {
                BackspaceOutcome::Shortened => self.render(),
                BackspaceOutcome::CloseSession => self.hide(),
            },
            "Escape" => {
                cancel();
                self.hide();
            }
            "ArrowDown" => {
                cancel();
                self.next();
            }
            "ArrowUp" => {
                cancel();
                self.previous();
            }
            // Horizontal navigation just dismisses
            "ArrowLeft" | "ArrowRight" => self.hide(),
            "Enter" => {
                cancel();
                // With no matches the not-found row stays up and the user
                // can backspace to refine
                if self.session.can_commit(self.candidates.len()) {
                    self.insert_selected();
                    self.hide();
                }
            }
            _ => {}
        }
    }

    fn next(&mut self) {
        if self.session.select_next(self.candidates.len()) {
            self.apply_selection();
            self.animate_scroll();
        }
    }

    fn previous(&mut self) {
        if self.session.select_previous(self.candidates.len()) {
            self.apply_selection();
            self.animate_scroll();
        }
    }

    /*== Mouse ==*/

    fn handle_click(&mut self, event: &MouseEvent) {
        if !self.open {
            return;
        }

        let target_node = event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Node>().ok());

        if !self.popup_elt.contains(target_node.as_ref()) {
            self.hide();
            return;
        }

        if let Some((index, _)) = self.candidate_row(event.target()) {
            if self.session.select(index, self.candidates.len()) {
                self.insert_selected();
                self.hide();
            }
        }
    }

    fn handle_hover(&mut self, event: &MouseEvent) {
        if !self.open || !self.session.accept_mouse_input {
            return;
        }

        if let Some((index, row)) = self.candidate_row(event.target()) {
            if self.session.select(index, self.candidates.len()) {
                self.apply_selection();

                // Center the highlight behind the hovered row
                let top = (row.offset_top() - self.emojis_elt.scroll_top()) as f64;
                animate::animate(
                    self.highlight_elt.as_ref(),
                    &[AnimProp { key: "top", to: top, unit: Some("px") }],
                    HOVER_ANIMATION_MS,
                );
            }
        }
    }

    fn enable_mouse_input(&mut self) {
        self.session.accept_mouse_input = true;

        if let Some(cb) = &self.on_mouseover {
            self.emojis_elt
                .add_event_listener_with_callback("mouseover", cb.as_ref().unchecked_ref())
                .ok();
        }
        if let (Some(root), Some(cb)) = (root_element(), &self.on_mousemove) {
            root.remove_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref())
                .ok();
        }
    }

    fn disable_mouse_input(&mut self) {
        self.session.accept_mouse_input = false;

        if let Some(cb) = &self.on_mouseover {
            self.emojis_elt
                .remove_event_listener_with_callback("mouseover", cb.as_ref().unchecked_ref())
                .ok();
        }
        // Re-arm on the next genuine mouse movement
        if let (Some(root), Some(cb)) = (root_element(), &self.on_mousemove) {
            root.add_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref())
                .ok();
        }
    }

    /// Iterative ancestor walk from a click/hover target up to the row
    /// element carrying the candidate index, terminating at the list
    /// container.
    fn candidate_row(&self, target: Option<EventTarget>) -> Option<(usize, HtmlElement)> {
        let mut current: Element = target?.dyn_into().ok()?;

        while !current.is_same_node(Some(self.emojis_elt.as_ref())) {
            if current.class_list().contains("emoji") {
                let index: usize = current.get_attribute("data-index")?.parse().ok()?;
                return Some((index, current.dyn_into().ok()?));
            }
            current = current.parent_element()?;
        }
        None
    }

    /*== Selection and insertion ==*/

    fn apply_selection(&self) {
        if let Ok(Some(previous)) = self.emojis_elt.query_selector(".emoji.sel") {
            previous.class_list().remove_1("sel").ok();
        }
        if let Some(row) = self.row_at(self.session.selected()) {
            row.class_list().add_1("sel").ok();
        }
    }

    fn row_at(&self, index: usize) -> Option<HtmlElement> {
        self.emojis_elt
            .children()
            .item(index as u32)?
            .dyn_into()
            .ok()
    }

    fn animate_scroll(&self) {
        let row = match self.row_at(self.session.selected()) {
            Some(row) => row,
            None => return,
        };

        let plan = session::plan_scroll(
            row.offset_top() as f64,
            row.offset_height() as f64,
            self.emojis_elt.offset_height() as f64,
            self.emojis_elt.scroll_height() as f64,
        );

        animate::animate(
            self.emojis_elt.as_ref(),
            &[AnimProp { key: "scrollTop", to: plan.scroll_top, unit: None }],
            SCROLL_ANIMATION_MS,
        );
        animate::animate(
            self.highlight_elt.as_ref(),
            &[AnimProp { key: "top", to: plan.highlight_top, unit: Some("px") }],
            SCROLL_ANIMATION_MS,
        );
    }

    fn insert_selected(&mut self) {
        let candidate = match self.candidates.get(self.session.selected()) {
            Some(candidate) => *candidate,
            // Empty list: insertion is a no-op
            None => return,
        };
        let surface = match &self.surface {
            Some(surface) => surface,
            None => return,
        };

        let glyph = candidate.glyph(&settings_store::skintone());
        if !surface.insert(&glyph, self.session.padding()) {
            log::warn!("Insertion skipped, field left unchanged");
            return;
        }

        // Emoticons are never recorded in history
        if let Some(emoji) = candidate.as_emoji() {
            settings_store::push_history(emoji);
        }
    }

    /*== Rendering ==*/

    fn render(&mut self) {
        let history = settings_store::history();
        self.candidates = self.session.candidates(&history);

        let html = if self.candidates.is_empty() {
            NOT_FOUND_ROW.to_string()
        } else {
            let skintone = settings_store::skintone();
            let selected = self.session.selected();
            self.candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| render_row(candidate, index, index == selected, &skintone))
                .collect::<Vec<_>>()
                .join("\n")
        };

        self.emojis_elt.set_inner_html(&html);

        // A fresh list starts at the top with the highlight on row one
        self.emojis_elt.set_scroll_top(0);
        self.highlight_elt.style().set_property("top", "0px").ok();
    }

    /*== Listener management ==*/

    fn attach_session_listeners(&self) {
        let root = match root_element() {
            Some(root) => root,
            None => return,
        };
        if let Some(cb) = &self.on_keydown {
            root.add_event_listener_with_callback_and_bool(
                "keydown",
                cb.as_ref().unchecked_ref(),
                true,
            )
            .ok();
        }
        if let Some(cb) = &self.on_click {
            root.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
                .ok();
        }
    }

    fn detach_session_listeners(&self) {
        if let Some(root) = root_element() {
            if let Some(cb) = &self.on_keydown {
                root.remove_event_listener_with_callback_and_bool(
                    "keydown",
                    cb.as_ref().unchecked_ref(),
                    true,
                )
                .ok();
            }
            if let Some(cb) = &self.on_click {
                root.remove_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
                    .ok();
            }
            if let Some(cb) = &self.on_mousemove {
                root.remove_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref())
                    .ok();
            }
        }
        if let Some(cb) = &self.on_mouseover {
            self.emojis_elt
                .remove_event_listener_with_callback("mouseover", cb.as_ref().unchecked_ref())
                .ok();
        }
    }
}

fn root_element() -> Option<Element> {
    document()?.document_element()
}

fn render_row(candidate: &Candidate, index: usize, selected: bool, skintone: &str) -> String {
    let sel = if selected { " sel" } else { "" };
    format!(
        r#"<li class="emoji{sel}" data-index="{index}"><span>{glyph}</span><span>:{name}:</span></li>"#,
        glyph = candidate.glyph(skintone),
        name = candidate.name(),
    )
}
