use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::components::banner::{BannerKind, Notifier};
use crate::config::SubmitSettings;
use crate::error::SubmitError;
use crate::forms::reply::{Outcome, RawReply};

/// The button that starts a submission.
pub trait SubmitControl {
    fn label(&self) -> String;
    fn set_label(&self, label: &str);
    fn set_disabled(&self, disabled: bool);
    fn set_opacity(&self, opacity: &str);
}

/// A form as seen by one submission cycle.
pub trait SubmissionForm {
    type Control: SubmitControl;
    type Payload;

    fn control(&self) -> &Self::Control;
    fn action(&self) -> String;
    fn encode(&self) -> Result<Self::Payload, SubmitError>;
    fn reset(&self);
    fn scroll_to_top(&self);
}

pub trait Transport {
    type Payload;

    fn post(
        &self,
        action: &str,
        payload: Self::Payload,
    ) -> impl Future<Output = Result<RawReply, SubmitError>>;
}

/// Holds a control in its busy state and puts it back on drop, whichever
/// way the cycle ends.
pub struct BusyState<'a, C: SubmitControl> {
    control: &'a C,
    original_label: String,
}

impl<'a, C: SubmitControl> BusyState<'a, C> {
    pub fn engage(control: &'a C, settings: &SubmitSettings) -> Self {
        let original_label = control.label();
        control.set_disabled(true);
        control.set_label(&settings.sending_label);
        control.set_opacity(&settings.busy_opacity);
        Self {
            control,
            original_label,
        }
    }
}

impl<C: SubmitControl> Drop for BusyState<'_, C> {
    fn drop(&mut self) {
        self.control.set_disabled(false);
        self.control.set_label(&self.original_label);
        self.control.set_opacity("1");
    }
}

/// Per-form flag that admits one submission at a time.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Rc<Cell<bool>>);

/// Held for the lifetime of an admitted submission.
#[derive(Debug)]
pub struct InFlightTicket(Rc<Cell<bool>>);

impl InFlight {
    /// `None` while another submission on the same form is running.
    pub fn try_begin(&self) -> Option<InFlightTicket> {
        if self.0.replace(true) {
            return None;
        }
        Some(InFlightTicket(self.0.clone()))
    }

    pub fn is_busy(&self) -> bool {
        self.0.get()
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Runs one full submission: busy state, request, banner, restore.
pub async fn submit<F, T, N>(
    form: &F,
    transport: &T,
    notifier: &N,
    settings: &SubmitSettings,
) -> Outcome
where
    F: SubmissionForm,
    T: Transport<Payload = F::Payload>,
    N: Notifier + ?Sized,
{
    let _busy = BusyState::engage(form.control(), settings);
    let action = form.action();
    debug!("Submitting form to {}", action);

    let reply = match form.encode() {
        Ok(payload) => transport.post(&action, payload).await,
        Err(e) => Err(e),
    };

    let outcome = Outcome::from_reply(reply, settings);
    match &outcome {
        Outcome::Accepted { message } => {
            info!("Form submission to {} accepted", action);
            notifier.show(BannerKind::Success, message);
            form.reset();
            form.scroll_to_top();
        }
        Outcome::Rejected { message } => {
            warn!("Form submission to {} rejected: {}", action, message);
            notifier.show(BannerKind::Error, message);
        }
        Outcome::Failed { cause } => {
            error!("Form submission to {} failed: {}", action, cause);
            notifier.show(BannerKind::Error, &settings.network_error_text);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[derive(Default)]
    struct FakeButton {
        label: RefCell<String>,
        disabled: Cell<bool>,
        opacity: RefCell<String>,
        enabled_count: Cell<u32>,
    }

    impl FakeButton {
        fn labelled(label: &str) -> Rc<Self> {
            let button = Self::default();
            *button.label.borrow_mut() = label.to_string();
            *button.opacity.borrow_mut() = "1".to_string();
            Rc::new(button)
        }
    }

    impl SubmitControl for Rc<FakeButton> {
        fn label(&self) -> String {
            self.label.borrow().clone()
        }
        fn set_label(&self, label: &str) {
            *self.label.borrow_mut() = label.to_string();
        }
        fn set_disabled(&self, disabled: bool) {
            if self.disabled.get() && !disabled {
                self.enabled_count.set(self.enabled_count.get() + 1);
            }
            self.disabled.set(disabled);
        }
        fn set_opacity(&self, opacity: &str) {
            *self.opacity.borrow_mut() = opacity.to_string();
        }
    }

    struct FakeForm {
        button: Rc<FakeButton>,
        fields: RefCell<Vec<(String, String)>>,
        encode_error: Option<SubmitError>,
        scrolled: Cell<bool>,
    }

    impl FakeForm {
        fn quote_request(button: Rc<FakeButton>) -> Self {
            Self {
                button,
                fields: RefCell::new(vec![
                    ("name".to_string(), "Ada".to_string()),
                    ("email".to_string(), "ada@example.com".to_string()),
                ]),
                encode_error: None,
                scrolled: Cell::new(false),
            }
        }

        fn is_cleared(&self) -> bool {
            self.fields.borrow().iter().all(|(_, v)| v.is_empty())
        }
    }

    impl SubmissionForm for FakeForm {
        type Control = Rc<FakeButton>;
        type Payload = Vec<(String, String)>;

        fn control(&self) -> &Rc<FakeButton> {
            &self.button
        }
        fn action(&self) -> String {
            "/submit-simple-api".to_string()
        }
        fn encode(&self) -> Result<Self::Payload, SubmitError> {
            match &self.encode_error {
                Some(e) => Err(e.clone()),
                None => Ok(self.fields.borrow().clone()),
            }
        }
        fn reset(&self) {
            for (_, value) in self.fields.borrow_mut().iter_mut() {
                value.clear();
            }
        }
        fn scroll_to_top(&self) {
            self.scrolled.set(true);
        }
    }

    /// Replies with a canned result and records what the button looked like
    /// while the request was in flight.
    struct ScriptedTransport {
        reply: Result<RawReply, SubmitError>,
        button: Rc<FakeButton>,
        busy_snapshot: RefCell<Option<(bool, String, String)>>,
        sent: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl ScriptedTransport {
        fn new(reply: Result<RawReply, SubmitError>, button: &Rc<FakeButton>) -> Self {
            Self {
                reply,
                button: button.clone(),
                busy_snapshot: RefCell::new(None),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn body(status: u16, body: &str, button: &Rc<FakeButton>) -> Self {
            Self::new(
                Ok(RawReply {
                    status,
                    body: body.to_string(),
                }),
                button,
            )
        }
    }

    impl Transport for ScriptedTransport {
        type Payload = Vec<(String, String)>;

        fn post(
            &self,
            action: &str,
            payload: Self::Payload,
        ) -> impl Future<Output = Result<RawReply, SubmitError>> {
            *self.busy_snapshot.borrow_mut() = Some((
                self.button.disabled.get(),
                self.button.label.borrow().clone(),
                self.button.opacity.borrow().clone(),
            ));
            self.sent.borrow_mut().push((action.to_string(), payload));
            let reply = self.reply.clone();
            async move { reply }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        shown: RefCell<Vec<(BannerKind, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn show(&self, kind: BannerKind, message: &str) {
            self.shown.borrow_mut().push((kind, message.to_string()));
        }
    }

    struct PanickingNotifier;

    impl Notifier for PanickingNotifier {
        fn show(&self, _kind: BannerKind, _message: &str) {
            panic!("renderer blew up");
        }
    }

    fn assert_restored(button: &FakeButton) {
        assert!(!button.disabled.get());
        assert_eq!(*button.label.borrow(), "Request Quote");
        assert_eq!(*button.opacity.borrow(), "1");
        assert_eq!(button.enabled_count.get(), 1);
    }

    #[test]
    fn accepted_submission_clears_form_and_scrolls() {
        let button = FakeButton::labelled("Request Quote");
        let form = FakeForm::quote_request(button.clone());
        let transport =
            ScriptedTransport::body(200, r#"{"success":true,"message":"Thanks!"}"#, &button);
        let notifier = RecordingNotifier::default();

        let outcome = block_on(submit(&form, &transport, &notifier, &SubmitSettings::default()));

        assert!(outcome.is_accepted());
        assert_eq!(
            *notifier.shown.borrow(),
            vec![(BannerKind::Success, "Thanks!".to_string())]
        );
        assert!(form.is_cleared());
        assert!(form.scrolled.get());
        assert_eq!(
            *transport.busy_snapshot.borrow(),
            Some((true, "Sending...".to_string(), "0.6".to_string()))
        );
        assert_restored(&button);
    }

    #[test]
    fn request_carries_form_fields_to_action() {
        let button = FakeButton::labelled("Request Quote");
        let form = FakeForm::quote_request(button.clone());
        let transport = ScriptedTransport::body(200, r#"{"success":true}"#, &button);

        block_on(submit(
            &form,
            &transport,
            &RecordingNotifier::default(),
            &SubmitSettings::default(),
        ));

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "/submit-simple-api");
        assert_eq!(sent[0].1[0], ("name".to_string(), "Ada".to_string()));
    }

    #[test]
    fn rejected_submission_keeps_fields() {
        let button = FakeButton::labelled("Request Quote");
        let form = FakeForm::quote_request(button.clone());
        let transport = ScriptedTransport::body(
            200,
            r#"{"success":false,"message":"Please choose a budget"}"#,
            &button,
        );
        let notifier = RecordingNotifier::default();

        block_on(submit(&form, &transport, &notifier, &SubmitSettings::default()));

        assert_eq!(
            *notifier.shown.borrow(),
            vec![(BannerKind::Error, "Please choose a budget".to_string())]
        );
        assert!(!form.is_cleared());
        assert!(!form.scrolled.get());
        assert_restored(&button);
    }

    #[test]
    fn rejected_without_message_uses_default_text() {
        let button = FakeButton::labelled("Request Quote");
        let form = FakeForm::quote_request(button.clone());
        let transport = ScriptedTransport::body(200, r#"{"success":false}"#, &button);
        let notifier = RecordingNotifier::default();
        let settings = SubmitSettings::default();

        block_on(submit(&form, &transport, &notifier, &settings));

        assert_eq!(
            *notifier.shown.borrow(),
            vec![(BannerKind::Error, settings.default_error_text.clone())]
        );
    }

    #[test]
    fn server_error_page_shows_network_text() {
        let button = FakeButton::labelled("Request Quote");
        let form = FakeForm::quote_request(button.clone());
        let transport = ScriptedTransport::body(500, "Internal Server Error", &button);
        let notifier = RecordingNotifier::default();
        let settings = SubmitSettings::default();

        let outcome = block_on(submit(&form, &transport, &notifier, &settings));

        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(
            *notifier.shown.borrow(),
            vec![(BannerKind::Error, settings.network_error_text.clone())]
        );
        assert!(!form.is_cleared());
        assert_restored(&button);
    }

    #[test]
    fn transport_failures_never_leak_details() {
        let settings = SubmitSettings::default();
        for cause in [
            SubmitError::Transport("TypeError: Failed to fetch".to_string()),
            SubmitError::TimedOut { after_ms: 30_000 },
        ] {
            let button = FakeButton::labelled("Request Quote");
            let form = FakeForm::quote_request(button.clone());
            let transport = ScriptedTransport::new(Err(cause), &button);
            let notifier = RecordingNotifier::default();

            block_on(submit(&form, &transport, &notifier, &settings));

            assert_eq!(
                *notifier.shown.borrow(),
                vec![(BannerKind::Error, settings.network_error_text.clone())]
            );
            assert!(!form.is_cleared());
            assert_restored(&button);
        }
    }

    #[test]
    fn encoding_failure_skips_the_request() {
        let button = FakeButton::labelled("Request Quote");
        let mut form = FakeForm::quote_request(button.clone());
        form.encode_error = Some(SubmitError::Encoding("detached form".to_string()));
        let transport = ScriptedTransport::body(200, r#"{"success":true}"#, &button);
        let notifier = RecordingNotifier::default();

        let outcome = block_on(submit(&form, &transport, &notifier, &SubmitSettings::default()));

        assert!(matches!(
            outcome,
            Outcome::Failed {
                cause: SubmitError::Encoding(_)
            }
        ));
        assert!(transport.sent.borrow().is_empty());
        assert_restored(&button);
    }

    #[test]
    fn control_is_restored_even_if_rendering_panics() {
        let button = FakeButton::labelled("Request Quote");
        let form = FakeForm::quote_request(button.clone());
        let transport = ScriptedTransport::body(200, r#"{"success":true}"#, &button);

        let result = catch_unwind(AssertUnwindSafe(|| {
            block_on(submit(
                &form,
                &transport,
                &PanickingNotifier,
                &SubmitSettings::default(),
            ))
        }));

        assert!(result.is_err());
        assert_restored(&button);
    }

    #[test]
    fn busy_state_uses_configured_label() {
        let button = FakeButton::labelled("Send");
        let settings = SubmitSettings {
            sending_label: "Please wait".to_string(),
            ..SubmitSettings::default()
        };
        {
            let _busy = BusyState::engage(&button, &settings);
            assert!(button.disabled.get());
            assert_eq!(*button.label.borrow(), "Please wait");
        }
        assert!(!button.disabled.get());
        assert_eq!(*button.label.borrow(), "Send");
    }

    #[test]
    fn second_submit_is_refused_while_first_runs() {
        let in_flight = InFlight::default();
        let ticket = in_flight.try_begin().expect("first submit admitted");
        assert!(in_flight.is_busy());
        assert!(in_flight.try_begin().is_none());
        assert!(in_flight.clone().try_begin().is_none());

        drop(ticket);
        assert!(!in_flight.is_busy());
        assert!(in_flight.try_begin().is_some());
    }

    #[test]
    fn ticket_is_released_when_the_cycle_panics() {
        let in_flight = InFlight::default();
        let ticket = in_flight.try_begin().unwrap();
        let result = catch_unwind(AssertUnwindSafe(move || {
            let _held = ticket;
            panic!("notifier blew up");
        }));
        assert!(result.is_err());
        assert!(in_flight.try_begin().is_some());
    }
}
