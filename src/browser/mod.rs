//! Page loading and request interception.
//!
//! `PageLoader` is the seam between the audit and the browser: it navigates
//! to a URL and pushes one `CapturedRequest` per outgoing request onto a
//! channel that the capture accumulator drains while the page loads. Every
//! intercepted request is continued; nothing is blocked or rewritten.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::CapturedRequest;

/// Outcome of a page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLoad {
    /// URL of the page after navigation (and any redirects) settled
    pub final_url: String,
}

/// Drives a single page navigation and reports its requests.
pub trait PageLoader {
    /// Navigates to `url`, keeps capturing for `wait` after navigation, then
    /// closes the page.
    ///
    /// Every request seen during the load is sent on `requests`. The sender is
    /// dropped when this future completes, which ends the capture stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot be started or navigation fails.
    fn load(
        &self,
        url: &str,
        wait: Option<Duration>,
        requests: mpsc::Sender<CapturedRequest>,
    ) -> impl Future<Output = Result<PageLoad>>;
}

/// Headless Chromium via the DevTools protocol.
#[derive(Debug, Clone, Default)]
pub struct ChromePageLoader;

impl ChromePageLoader {
    pub fn new() -> Self {
        Self
    }
}

impl PageLoader for ChromePageLoader {
    async fn load(
        &self,
        url: &str,
        wait: Option<Duration>,
        requests: mpsc::Sender<CapturedRequest>,
    ) -> Result<PageLoad> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(anyhow::Error::msg)
            .context("Failed to build browser configuration")?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let outcome = navigate(&browser, url, wait, requests).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Failed to wait for browser exit: {}", e);
        }
        handler_task.abort();
        let _ = handler_task.await;

        outcome
    }
}

async fn navigate(
    browser: &Browser,
    url: &str,
    wait: Option<Duration>,
    requests: mpsc::Sender<CapturedRequest>,
) -> Result<PageLoad> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("Failed to open a page")?;

    let paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .context("Failed to subscribe to paused requests")?;
    page.execute(EnableParams::default())
        .await
        .context("Failed to enable request interception")?;

    let forwarder = spawn_forwarder(page.clone(), paused, requests);

    info!("Loading page {}", url);
    let navigation = page.goto(url).await.map(|_| ());

    if navigation.is_ok() {
        if let Some(wait) = wait {
            info!("Waiting for {}ms...", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
    }

    let final_url = match navigation {
        Ok(()) => page.url().await.ok().flatten(),
        Err(_) => None,
    };

    // Dropping the forwarder drops the sender and ends capture
    forwarder.abort();
    let _ = forwarder.await;

    navigation.with_context(|| format!("Failed to navigate to {url}"))?;
    info!("Closing the page...");
    if let Err(e) = page.close().await {
        debug!("Failed to close page: {}", e);
    }

    Ok(PageLoad {
        final_url: final_url.unwrap_or_else(|| url.to_string()),
    })
}

/// Forwards paused requests to the capture channel, then lets them proceed.
fn spawn_forwarder<S>(
    page: Page,
    mut paused: S,
    requests: mpsc::Sender<CapturedRequest>,
) -> JoinHandle<()>
where
    S: futures::Stream<Item = std::sync::Arc<EventRequestPaused>> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request = captured_request(&event);
            if requests.send(request).await.is_err() {
                debug!("Capture receiver dropped, continuing requests without recording");
            }
            if let Err(e) = page
                .execute(ContinueRequestParams::new(event.request_id.clone()))
                .await
            {
                debug!("Failed to continue request {}: {}", event.request.url, e);
            }
        }
    })
}

fn captured_request(event: &EventRequestPaused) -> CapturedRequest {
    let headers = event
        .request
        .headers
        .inner()
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(name, value)| {
                    let value = value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string());
                    (name.clone(), value)
                })
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    CapturedRequest {
        url: event.request.url.clone(),
        method: event.request.method.clone(),
        headers,
        resource_type: event.resource_type.as_ref().to_lowercase(),
        cross_origin: None,
        registrant: None,
    }
}
