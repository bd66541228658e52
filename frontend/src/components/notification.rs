use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::components::banner::{Banner, BannerId, BannerKind, BannerSlot, Notifier};
use crate::components::styles;
use crate::config::BannerSettings;
use crate::error::{js_to_string, log_js_failure};

type SharedSlot = Rc<RefCell<BannerSlot<HtmlElement>>>;

/// Renders banners straight into `<body>`. Clones share the same slot, so
/// every form on the page competes for one banner and the latest call wins.
#[derive(Clone)]
pub struct DomNotifier {
    document: Document,
    settings: BannerSettings,
    slot: SharedSlot,
}

impl DomNotifier {
    pub fn new(document: Document, settings: BannerSettings) -> Self {
        Self {
            document,
            settings,
            slot: Rc::new(RefCell::new(BannerSlot::new())),
        }
    }

    fn evict_current(&self) {
        if let Some(previous) = self.slot.borrow_mut().take() {
            previous.remove();
        }
        // Banners not created through this notifier (e.g. a stale one from a
        // second module instance) still count against the one-banner rule.
        if let Ok(Some(stray)) = self.document.query_selector(".form-message") {
            stray.remove();
        }
    }

    fn render(&self, banner: &Banner) -> Result<HtmlElement, JsValue> {
        let root: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        root.set_class_name(&banner.kind.class_name());
        root.set_attribute("role", "status")?;

        let content = self.child(&root, "div", "message-content")?;
        self.child(&content, "span", "message-icon")?
            .set_text_content(Some(banner.kind.icon()));
        self.child(&content, "span", "message-text")?
            .set_text_content(Some(&banner.message));

        let close = self.child(&content, "button", "message-close")?;
        close.set_attribute("type", "button")?;
        close.set_attribute("aria-label", "Dismiss")?;
        close.set_text_content(Some("×"));

        Ok(root)
    }

    fn child(&self, parent: &Element, tag: &str, class: &str) -> Result<Element, JsValue> {
        let element = self.document.create_element(tag)?;
        element.set_class_name(class);
        parent.append_child(&element)?;
        Ok(element)
    }

    fn wire_close_button(&self, root: &HtmlElement, id: BannerId) -> Result<(), JsValue> {
        let Some(close) = root.query_selector(".message-close")? else {
            return Ok(());
        };
        let slot = self.slot.clone();
        let on_close = Closure::once_into_js(move || {
            if let Some(element) = slot.borrow_mut().release(id) {
                element.remove();
                debug!("Banner dismissed");
            }
        });
        close.add_event_listener_with_callback("click", on_close.unchecked_ref())
    }

    fn schedule_removal(&self, banner: Banner, id: BannerId) {
        let slot = self.slot.clone();
        let exit_ms = self.settings.exit_ms;
        let exit_animation = styles::exit_animation(&self.settings);

        let timeout = Timeout::new(self.settings.display_ms, move || {
            let leaving = slot.borrow().get(id).cloned();
            let Some(element) = leaving else {
                return; // evicted or dismissed already
            };
            log_js_failure(
                "start banner exit animation",
                element.style().set_property("animation", &exit_animation),
            );

            let removal = Timeout::new(exit_ms, move || {
                if let Some(element) = slot.borrow_mut().release(id) {
                    element.remove();
                    debug!(
                        "Banner removed after {}ms",
                        banner.age_ms(chrono::Utc::now())
                    );
                }
            });
            removal.forget();
        });
        timeout.forget();
    }

    fn try_show(&self, kind: BannerKind, message: &str) -> Result<(), JsValue> {
        styles::ensure_styles(&self.document, &self.settings)?;
        self.evict_current();

        let banner = Banner::new(kind, message);
        let root = self.render(&banner)?;
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&root)?;

        let (id, _) = self.slot.borrow_mut().install(root.clone());
        self.wire_close_button(&root, id)?;
        self.schedule_removal(banner, id);
        Ok(())
    }
}

impl Notifier for DomNotifier {
    fn show(&self, kind: BannerKind, message: &str) {
        if let Err(e) = self.try_show(kind, message) {
            error!("Failed to show {} banner: {}", kind.slug(), js_to_string(&e));
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn banner_count(document: &Document) -> u32 {
        document.query_selector_all(".form-message").unwrap().length()
    }

    fn fast() -> BannerSettings {
        BannerSettings {
            display_ms: 50,
            exit_ms: 20,
        }
    }

    #[wasm_bindgen_test]
    fn new_banner_replaces_visible_one() {
        let document = document();
        let notifier = DomNotifier::new(document.clone(), BannerSettings::default());

        notifier.show(BannerKind::Success, "first");
        notifier.show(BannerKind::Error, "second");

        assert_eq!(banner_count(&document), 1);
        let text = document
            .query_selector(".form-message .message-text")
            .unwrap()
            .unwrap()
            .text_content();
        assert_eq!(text.as_deref(), Some("second"));
        assert!(document
            .query_selector(".form-message-error")
            .unwrap()
            .is_some());
        notifier.evict_current();
    }

    #[wasm_bindgen_test]
    fn message_is_not_parsed_as_markup() {
        let document = document();
        let notifier = DomNotifier::new(document.clone(), BannerSettings::default());

        notifier.show(BannerKind::Error, "<b>bold</b>");

        let text = document
            .query_selector(".form-message .message-text")
            .unwrap()
            .unwrap();
        assert_eq!(text.text_content().as_deref(), Some("<b>bold</b>"));
        assert_eq!(text.child_element_count(), 0);
        notifier.evict_current();
    }

    #[wasm_bindgen_test]
    async fn banner_removes_itself() {
        let document = document();
        let notifier = DomNotifier::new(document.clone(), fast());

        notifier.show(BannerKind::Success, "Thanks!");
        assert_eq!(banner_count(&document), 1);

        TimeoutFuture::new(150).await;
        assert_eq!(banner_count(&document), 0);
    }

    #[wasm_bindgen_test]
    async fn close_button_removes_immediately() {
        let document = document();
        let notifier = DomNotifier::new(document.clone(), fast());

        notifier.show(BannerKind::Success, "Thanks!");
        let close: HtmlElement = document
            .query_selector(".form-message .message-close")
            .unwrap()
            .unwrap()
            .dyn_into()
            .unwrap();
        close.click();
        assert_eq!(banner_count(&document), 0);

        // pending timers fire against a removed node
        TimeoutFuture::new(150).await;
        assert_eq!(banner_count(&document), 0);
    }
}
