use std::future::Future;

use futures::future::{select, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use log::debug;
use web_sys::{AbortController, FormData};

use crate::error::{js_to_string, SubmitError};
use crate::forms::cycle::Transport;
use crate::forms::reply::RawReply;

/// Resolves with `exchange` unless `timer` fires first, in which case
/// `on_expiry` runs and the result is [`SubmitError::TimedOut`].
pub async fn race_timeout<E, T>(
    exchange: E,
    timer: T,
    after_ms: u32,
    on_expiry: impl FnOnce(),
) -> Result<RawReply, SubmitError>
where
    E: Future<Output = Result<RawReply, SubmitError>>,
    T: Future<Output = ()>,
{
    match select(Box::pin(exchange), Box::pin(timer)).await {
        Either::Left((reply, _)) => reply,
        Either::Right(((), _)) => {
            on_expiry();
            Err(SubmitError::TimedOut { after_ms })
        }
    }
}

/// Posts multipart form data with `fetch`, aborting the request once the
/// timeout elapses.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    timeout_ms: u32,
}

impl FetchTransport {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl Transport for FetchTransport {
    type Payload = FormData;

    fn post(
        &self,
        action: &str,
        payload: FormData,
    ) -> impl Future<Output = Result<RawReply, SubmitError>> {
        let url = action.to_string();
        let timeout_ms = self.timeout_ms;

        async move {
            let controller = AbortController::new()
                .map_err(|e| SubmitError::Transport(js_to_string(&e)))?;
            let request = Request::post(&url)
                .body(payload)
                .abort_signal(Some(&controller.signal()));

            let exchange = async move {
                let response = request.send().await?;
                let status = response.status();
                let body = response.text().await?;
                debug!("{} answered {} ({} bytes)", url, status, body.len());
                Ok::<_, SubmitError>(RawReply { status, body })
            };

            race_timeout(exchange, TimeoutFuture::new(timeout_ms), timeout_ms, || {
                controller.abort()
            })
            .await
        }
    }
}
