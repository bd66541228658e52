use log::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement, Window};

use crate::config::ChatSettings;
use crate::error::{js_to_string, log_js_failure, BindError};

/// `mailto:` link for a chat message, or `None` when there is nothing to send.
pub fn compose_mailto(settings: &ChatSettings, message: &str) -> Option<String> {
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    Some(format!(
        "mailto:{}?subject={}&body={}",
        settings.recipient,
        urlencoding::encode(&settings.subject),
        urlencoding::encode(message)
    ))
}

/// The chat box may be a single-line input or a textarea.
enum ChatInput {
    Line(HtmlInputElement),
    Area(HtmlTextAreaElement),
}

impl ChatInput {
    fn from_element(element: Element) -> Option<Self> {
        match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => Some(ChatInput::Line(input)),
            Err(element) => element.dyn_into::<HtmlTextAreaElement>().ok().map(ChatInput::Area),
        }
    }

    fn value(&self) -> String {
        match self {
            ChatInput::Line(input) => input.value(),
            ChatInput::Area(area) => area.value(),
        }
    }

    fn clear(&self) {
        match self {
            ChatInput::Line(input) => input.set_value(""),
            ChatInput::Area(area) => area.set_value(""),
        }
    }
}

fn hand_off(window: &Window, input: &ChatInput, settings: &ChatSettings) {
    let Some(link) = compose_mailto(settings, &input.value()) else {
        return;
    };
    if let Err(e) = window.location().set_href(&link) {
        error!("Could not open mail client: {}", js_to_string(&e));
        return;
    }
    input.clear();
    log_js_failure("show hand-off notice", window.alert_with_message(&settings.handoff_notice));
}

/// Wires the chat widget. Returns `Ok(false)` when the page has no widget.
pub fn bind_chat(window: &Window, document: &Document, settings: &ChatSettings) -> Result<bool, BindError> {
    let header = document.get_element_by_id("chatHeader");
    let body = document.get_element_by_id("chatBody");
    let input = document
        .get_element_by_id("chatInput")
        .and_then(ChatInput::from_element);
    let send = document.get_element_by_id("chatSend");

    let (Some(header), Some(body), Some(input), Some(send)) = (header, body, input, send) else {
        debug!("Chat widget not present");
        return Ok(false);
    };

    let on_toggle = Closure::wrap(Box::new(move || {
        log_js_failure("toggle chat", body.class_list().toggle("show").map(|_| ()));
    }) as Box<dyn FnMut()>);
    header.add_event_listener_with_callback("click", on_toggle.as_ref().unchecked_ref())?;
    on_toggle.forget();

    let (window, settings) = (window.clone(), settings.clone());
    let on_send = Closure::wrap(Box::new(move || {
        hand_off(&window, &input, &settings);
    }) as Box<dyn FnMut()>);
    send.add_event_listener_with_callback("click", on_send.as_ref().unchecked_ref())?;
    on_send.forget();

    Ok(true)
}
