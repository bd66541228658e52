use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use services_frontend::config;

fn run() {
    info!("Starting services frontend");
    if let Err(e) = services_frontend::start() {
        error!("Start-up failed: {}", e);
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    if let Err(e) = console_log::init_with_level(config::log_level()) {
        web_sys::console::error_1(&format!("error initializing log: {}", e).into());
    }

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        error!("No document to attach to");
        return;
    };

    if !services_frontend::dom_parsed(&document.ready_state()) {
        let on_ready = Closure::once_into_js(run);
        if let Err(e) = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        {
            error!("Could not wait for DOMContentLoaded: {:?}", e);
        }
    } else {
        run();
    }
}
