use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MouseEvent, Window};

use crate::config::RevealSettings;
use crate::error::{log_js_failure, BindError};

const SHOW: &str = "show";

pub fn scroll_message_visible(scroll_y: f64, viewport_height: f64, settings: &RevealSettings) -> bool {
    scroll_y > viewport_height * settings.scroll_message_ratio
}

pub fn card_in_view(card_top: f64, viewport_height: f64, settings: &RevealSettings) -> bool {
    card_top < viewport_height - settings.card_margin_px
}

/// Whether `load` has already fired, judging by `document.readyState`.
pub fn page_loaded(ready_state: &str) -> bool {
    ready_state == "complete"
}

/// CSS `top` for the header given the pointer position.
pub fn header_top(pointer_y: i32, header_height: i32, settings: &RevealSettings) -> String {
    if pointer_y < settings.header_zone_px {
        "0".to_string()
    } else {
        format!("-{}px", header_height)
    }
}

fn show(element: &Element) {
    log_js_failure("reveal element", element.class_list().add_1(SHOW));
}

fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0)
}

fn reveal_on_scroll(window: &Window, document: &Document, settings: &RevealSettings) {
    let height = viewport_height(window);
    let scroll_y = window.scroll_y().unwrap_or(0.0);

    if scroll_message_visible(scroll_y, height, settings) {
        if let Some(message) = document.get_element_by_id("scrollMessage") {
            show(&message);
        }
    }

    let Ok(cards) = document.query_selector_all(".service-card") else {
        return;
    };
    for index in 0..cards.length() {
        let Some(card) = cards
            .item(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        if card_in_view(card.get_bounding_client_rect().top(), height, settings) {
            show(&card);
        }
    }
}

fn bind_hero(window: &Window, document: &Document) -> Result<(), BindError> {
    let Some(hero) = document.get_element_by_id("heroText") else {
        debug!("No #heroText on this page");
        return Ok(());
    };
    if page_loaded(&document.ready_state()) {
        show(&hero);
        return Ok(());
    }
    let on_load = Closure::once_into_js(move || show(&hero));
    window.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
    Ok(())
}

fn bind_scroll(window: &Window, document: &Document, settings: &RevealSettings) -> Result<(), BindError> {
    let (win, doc, settings) = (window.clone(), document.clone(), settings.clone());
    let on_scroll = Closure::wrap(Box::new(move || {
        reveal_on_scroll(&win, &doc, &settings);
    }) as Box<dyn FnMut()>);
    window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;
    on_scroll.forget();
    Ok(())
}

fn bind_header(document: &Document, settings: &RevealSettings) -> Result<(), BindError> {
    let Some(header) = document
        .query_selector("header")?
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        debug!("No <header> on this page");
        return Ok(());
    };

    let settings = settings.clone();
    let on_move = Closure::wrap(Box::new(move |event: MouseEvent| {
        let top = header_top(event.client_y(), header.offset_height(), &settings);
        log_js_failure("move header", header.style().set_property("top", &top));
    }) as Box<dyn FnMut(MouseEvent)>);
    document.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();
    Ok(())
}

/// Hero fade-in, scroll-driven reveals and the pointer-driven header.
pub fn bind_reveal(window: &Window, document: &Document, settings: &RevealSettings) -> Result<(), BindError> {
    bind_hero(window, document)?;
    bind_scroll(window, document, settings)?;
    bind_header(document, settings)?;
    Ok(())
}
