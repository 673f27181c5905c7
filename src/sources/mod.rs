//! Data source adapters.
//!
//! Every upstream feed is wrapped in an [`Adapter`]. Adapters are blocking
//! and run on a background thread started by
//! [`Feed`](crate::dashboard::lifecycle::Feed); none of them accepts a
//! cancellation signal. What happens when the upstream fails is decided by
//! the adapter's [`ErrorPolicy`], applied in [`resolve`].

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::time::Duration;

pub mod events;
pub mod market;
pub mod news;
pub mod philly_data;
pub mod reddit;
pub mod septa;
pub mod system;
pub mod traffic;
pub mod weather;

pub use events::{EventsAdapter, EventsParams};
pub use market::MarketAdapter;
pub use news::NewsAdapter;
pub use philly_data::{CivicDataset, CivicParams, PhillyDataAdapter};
pub use reddit::{RedditAdapter, RedditParams};
pub use septa::{SeptaAdapter, TransitFeed};
pub use system::SystemAdapter;
pub use traffic::TrafficAdapter;
pub use weather::WeatherAdapter;

pub const USER_AGENT: &str = "neighborhood-dashboard/0.1";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// How an adapter reacts to an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Replace the failure with the adapter's fallback payload.
    Fallback,
    /// Surface the failure to the widget.
    Propagate,
}

/// Where a resolved payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> Fetched<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Live,
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Fallback,
        }
    }
}

pub trait Adapter: Send + Sync + 'static {
    type Params: Clone + Send + 'static;
    type Output: Send + 'static;

    fn name(&self) -> &'static str;

    fn error_policy(&self) -> ErrorPolicy;

    fn fetch(&self, params: &Self::Params) -> Result<Self::Output>;

    /// Payload used in place of a failed fetch under
    /// [`ErrorPolicy::Fallback`].
    fn fallback(&self, _params: &Self::Params) -> Option<Self::Output> {
        None
    }
}

/// Run `adapter` and apply its error policy.
pub fn resolve<A: Adapter + ?Sized>(adapter: &A, params: &A::Params) -> Result<Fetched<A::Output>> {
    match adapter.fetch(params) {
        Ok(data) => Ok(Fetched::live(data)),
        Err(err) => match adapter.error_policy() {
            ErrorPolicy::Fallback => match adapter.fallback(params) {
                Some(data) => {
                    tracing::warn!(adapter = adapter.name(), error = %err, "using fallback data");
                    Ok(Fetched::fallback(data))
                }
                None => Err(err),
            },
            ErrorPolicy::Propagate => {
                tracing::warn!(adapter = adapter.name(), error = %err, "fetch failed");
                Err(err.context(format!("{} source failed", adapter.name())))
            }
        },
    }
}

static HTTP: Lazy<Option<Client>> = Lazy::new(|| {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| tracing::error!(error = %e, "failed to build http client"))
        .ok()
});

pub(crate) fn http() -> Result<&'static Client> {
    HTTP.as_ref().context("http client unavailable")
}

/// GET `url` and return the body, failing on any non-success status.
pub(crate) fn get_text(url: &str, accept: &str) -> Result<String> {
    let resp = http()?
        .get(url)
        .header(reqwest::header::ACCEPT, accept)
        .send()
        .with_context(|| format!("request {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("http status {status} from {url}");
    }
    resp.text().context("read response body")
}
