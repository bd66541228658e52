use std::cell::RefCell;

use log::{error, info, warn};
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod components {
    pub mod banner;
    pub mod chat;
    pub mod notification;
    pub mod reveal;
    pub mod styles;
}
pub mod forms {
    pub mod binding;
    pub mod cycle;
    pub mod reply;
    pub mod transport;
}

use components::notification::DomNotifier;
use config::SiteConfig;
use error::BindError;
use forms::binding::FormBinder;

thread_local! {
    static BINDER: RefCell<Option<FormBinder>> = const { RefCell::new(None) };
}

/// `document.readyState` is `"loading"` until the HTML has been parsed.
pub fn dom_parsed(ready_state: &str) -> bool {
    ready_state != "loading"
}

/// Wires every behaviour onto the current page. Individual widgets that fail
/// to bind are logged and skipped; only a missing window or document is fatal.
pub fn start() -> Result<(), BindError> {
    let window = web_sys::window().ok_or(BindError::NoWindow)?;
    let document = window.document().ok_or(BindError::NoDocument)?;
    let config = SiteConfig::from_document(&document);

    if let Err(e) = components::styles::ensure_styles(&document, &config.banner) {
        warn!("Banner styles not injected: {}", error::js_to_string(&e));
    }

    let notifier = DomNotifier::new(document.clone(), config.banner.clone());
    let binder = FormBinder::new(window.clone(), notifier, config.submit.clone());
    binder.register_forms(&document);
    BINDER.with(|slot| *slot.borrow_mut() = Some(binder));

    if let Err(e) = components::reveal::bind_reveal(&window, &document, &config.reveal) {
        error!("Reveal effects not bound: {}", e);
    }
    match components::chat::bind_chat(&window, &document, &config.chat) {
        Ok(true) => info!("Chat widget ready"),
        Ok(false) => {}
        Err(e) => error!("Chat widget not bound: {}", e),
    }

    Ok(())
}

/// Binds forms added to the page after start-up. Returns how many were
/// newly bound; forms that were already bound are left alone.
#[wasm_bindgen(js_name = registerForms)]
pub fn register_forms() -> usize {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        error!("{}", BindError::NoDocument);
        return 0;
    };
    BINDER.with(|slot| match slot.borrow().as_ref() {
        Some(binder) => binder.register_forms(&document),
        None => {
            warn!("registerForms called before start-up; ignoring");
            0
        }
    })
}
