//! Type `:` in any text field to summon a searchable emoji picker.
//!
//! Loaded into the page as a WebAssembly content script. The pure logic
//! (filtering, session state, splice math) also compiles natively so it
//! can be tested with plain `cargo test`.

mod animate;
mod caret;
mod popup;
mod session;
mod stores;
mod textfield;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent};

const TRIGGER_KEY: &str = ":";

/// Delay between trigger detection and insertion-point validation, so the
/// trigger character has landed in the field by the time we look at it.
const TRIGGER_DEBOUNCE_MS: u32 = 100;

#[wasm_bindgen(start)]
pub fn start() {
    // Panic hook and logger only make sense in the browser; the rlib
    // half is compiled natively for tests
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    }

    stores::settings_store::init_history();
    popup::init();
    init_trigger_listener();

    log::info!("emojikey loaded");
}

/// Current skin tone identifier, for the settings page UI.
#[wasm_bindgen]
pub fn skintone() -> String {
    stores::settings_store::skintone()
}

/// Persist the skin tone identifier picked on the settings page. Unknown
/// identifiers render emoji unmodified.
#[wasm_bindgen]
pub fn set_skintone(color: &str) {
    stores::settings_store::set_skintone(color);
}

/// Wipe the emoji history, for the settings page reset button.
#[wasm_bindgen]
pub fn clear_history() {
    stores::settings_store::clear_history();
}

/// Install the process-wide trigger listener. Lives for the page's
/// lifetime; there is no teardown.
fn init_trigger_listener() {
    let root = match web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    {
        Some(root) => root,
        None => {
            log::error!("No document root, trigger listener not installed");
            return;
        }
    };

    let handler = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if event.key() != TRIGGER_KEY {
            return;
        }
        let target: Element = match event.target().and_then(|t| t.dyn_into().ok()) {
            Some(element) => element,
            None => return,
        };

        // Let the keystroke commit to the field before validating the
        // insertion point and measuring the caret
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(TRIGGER_DEBOUNCE_MS).await;
            popup::open_for(&target);
        });
    }) as Box<dyn FnMut(KeyboardEvent)>);

    if root
        .add_event_listener_with_callback_and_bool(
            "keydown",
            handler.as_ref().unchecked_ref(),
            true,
        )
        .is_err()
    {
        log::error!("Failed to install trigger listener");
    }

    // Page-lifetime listener, intentionally never dropped
    handler.forget();
}
