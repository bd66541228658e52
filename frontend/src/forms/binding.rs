use std::rc::Rc;

use log::{debug, error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Event, FormData, HtmlButtonElement, HtmlFormElement, ScrollBehavior,
    ScrollToOptions, Window,
};

use crate::components::notification::DomNotifier;
use crate::config::SubmitSettings;
use crate::error::{js_to_string, log_js_failure, BindError, SubmitError};
use crate::forms::cycle::{self, InFlight, SubmissionForm, SubmitControl};
use crate::forms::transport::FetchTransport;

/// Set on a form once its submit handler is installed.
pub const BOUND_MARKER: &str = "data-submit-bound";

const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";

pub struct ButtonControl {
    button: HtmlButtonElement,
}

impl SubmitControl for ButtonControl {
    fn label(&self) -> String {
        self.button.text_content().unwrap_or_default()
    }

    fn set_label(&self, label: &str) {
        self.button.set_text_content(Some(label));
    }

    fn set_disabled(&self, disabled: bool) {
        self.button.set_disabled(disabled);
    }

    fn set_opacity(&self, opacity: &str) {
        log_js_failure("set button opacity", self.button.style().set_property("opacity", opacity));
    }
}

pub struct PageForm {
    window: Window,
    form: HtmlFormElement,
    control: ButtonControl,
    in_flight: InFlight,
}

impl SubmissionForm for PageForm {
    type Control = ButtonControl;
    type Payload = FormData;

    fn control(&self) -> &ButtonControl {
        &self.control
    }

    fn action(&self) -> String {
        // the resolved URL, so a missing attribute posts back to the page
        self.form.action()
    }

    fn encode(&self) -> Result<FormData, SubmitError> {
        FormData::new_with_form(&self.form).map_err(|e| SubmitError::Encoding(js_to_string(&e)))
    }

    fn reset(&self) {
        self.form.reset();
    }

    fn scroll_to_top(&self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

/// Short human name for a form in diagnostics.
fn describe(form: &HtmlFormElement) -> String {
    let id = form.id();
    if !id.is_empty() {
        return format!("#{}", id);
    }
    match form.get_attribute("action") {
        Some(action) if !action.is_empty() => format!("[action=\"{}\"]", action),
        _ => "<form>".to_string(),
    }
}

fn submit_control(form: &HtmlFormElement) -> Result<HtmlButtonElement, BindError> {
    form.query_selector(SUBMIT_SELECTOR)?
        .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
        .ok_or_else(|| BindError::MissingSubmitControl {
            form: describe(form),
        })
}

/// Everything a bound form needs to run its submissions.
#[derive(Clone)]
pub struct FormBinder {
    window: Window,
    notifier: Rc<DomNotifier>,
    transport: Rc<FetchTransport>,
    settings: Rc<SubmitSettings>,
}

impl FormBinder {
    pub fn new(window: Window, notifier: DomNotifier, settings: SubmitSettings) -> Self {
        Self {
            window,
            notifier: Rc::new(notifier),
            transport: Rc::new(FetchTransport::new(settings.request_timeout_ms)),
            settings: Rc::new(settings),
        }
    }

    /// Binds every not-yet-bound form in the document. Safe to call again
    /// after new forms are inserted. Returns how many forms were newly bound.
    pub fn register_forms(&self, document: &Document) -> usize {
        let forms = match document.query_selector_all("form") {
            Ok(forms) => forms,
            Err(e) => {
                error!("Could not list forms: {}", js_to_string(&e));
                return 0;
            }
        };

        let mut bound = 0;
        for index in 0..forms.length() {
            let Some(form) = forms
                .item(index)
                .and_then(|node| node.dyn_into::<HtmlFormElement>().ok())
            else {
                continue;
            };
            match self.bind_form(form) {
                Ok(true) => bound += 1,
                Ok(false) => {}
                Err(e) => error!("{}", e),
            }
        }
        info!("Bound {} new form(s)", bound);
        bound
    }

    /// Installs the submit handler on one form. `Ok(false)` means it was
    /// already bound.
    pub fn bind_form(&self, form: HtmlFormElement) -> Result<bool, BindError> {
        if form.has_attribute(BOUND_MARKER) {
            return Ok(false);
        }
        let button = submit_control(&form)?;

        let page_form = Rc::new(PageForm {
            window: self.window.clone(),
            form: form.clone(),
            control: ButtonControl { button },
            in_flight: InFlight::default(),
        });

        let binder = self.clone();
        let on_submit = Closure::wrap(Box::new(move |event: Event| {
            event.prevent_default();

            let Some(ticket) = page_form.in_flight.try_begin() else {
                debug!("Ignoring submit while a request is in flight");
                return;
            };

            let page_form = page_form.clone();
            let binder = binder.clone();
            spawn_local(async move {
                cycle::submit(
                    &*page_form,
                    &*binder.transport,
                    &*binder.notifier,
                    &binder.settings,
                )
                .await;
                drop(ticket);
            });
        }) as Box<dyn FnMut(Event)>);

        form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
        on_submit.forget();
        form.set_attribute(BOUND_MARKER, "true")?;

        debug!("Bound form {}", describe(&form));
        Ok(true)
    }
}
