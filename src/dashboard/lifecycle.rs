//! Per-widget fetch lifecycle.
//!
//! A widget starts in [`WidgetStatus::Loading`] and settles into `Loaded`,
//! `Empty` or `Error` once its adapter returns. Every request is tagged with
//! a [`FetchTicket`]; only the most recently issued ticket may settle, so a
//! slow response cannot overwrite the result of a newer refresh.

use crate::model::{CivicRecords, MarketData, SystemMetrics, TrafficData, TransitUpdates, WeatherData};
use crate::sources::{resolve, Adapter, DataOrigin, Fetched};
use chrono::{DateTime, Local};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetStatus {
    Loading,
    Loaded,
    Empty,
    Error(String),
}

/// Payloads that may legitimately contain nothing.
pub trait Payload {
    fn is_empty_payload(&self) -> bool {
        false
    }
}

impl<T> Payload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for WeatherData {}
impl Payload for TrafficData {}
impl Payload for MarketData {}
impl Payload for SystemMetrics {}

impl Payload for TransitUpdates {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for CivicRecords {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

/// Whether a fallback payload is shown as data or treated as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackHandling {
    #[default]
    ShowData,
    ShowError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Result of handing an adapter outcome to [`WidgetLifecycle::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// A newer request was issued; the outcome was discarded.
    Stale,
    Succeeded,
    Failed,
}

pub struct WidgetLifecycle<T> {
    status: WidgetStatus,
    data: Option<T>,
    origin: Option<DataOrigin>,
    issued: u64,
    last_fetched: Option<DateTime<Local>>,
    fallback: FallbackHandling,
}

impl<T: Payload> WidgetLifecycle<T> {
    pub fn new(fallback: FallbackHandling) -> Self {
        Self {
            status: WidgetStatus::Loading,
            data: None,
            origin: None,
            issued: 0,
            last_fetched: None,
            fallback,
        }
    }

    /// Enter `Loading` for a new request. Data from earlier fetches stays
    /// available while the request is in flight.
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        self.status = WidgetStatus::Loading;
        FetchTicket(self.issued)
    }

    pub fn settle(&mut self, ticket: FetchTicket, outcome: anyhow::Result<Fetched<T>>) -> Settled {
        if ticket.0 != self.issued {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                "discarding superseded fetch result"
            );
            return Settled::Stale;
        }
        match outcome {
            Ok(fetched)
                if fetched.origin == DataOrigin::Fallback
                    && self.fallback == FallbackHandling::ShowError =>
            {
                self.status = WidgetStatus::Error("Source unavailable".into());
                Settled::Failed
            }
            Ok(fetched) => {
                self.status = if fetched.data.is_empty_payload() {
                    WidgetStatus::Empty
                } else {
                    WidgetStatus::Loaded
                };
                self.data = Some(fetched.data);
                self.origin = Some(fetched.origin);
                self.last_fetched = Some(Local::now());
                Settled::Succeeded
            }
            Err(err) => {
                self.status = WidgetStatus::Error(format!("{err:#}"));
                Settled::Failed
            }
        }
    }

    pub fn status(&self) -> &WidgetStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == WidgetStatus::Loading
    }

    /// Last successfully fetched payload, kept across failed refreshes.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn shows_fallback(&self) -> bool {
        self.origin == Some(DataOrigin::Fallback)
    }

    pub fn last_fetched(&self) -> Option<DateTime<Local>> {
        self.last_fetched
    }

    pub fn latest_ticket(&self) -> FetchTicket {
        FetchTicket(self.issued)
    }
}

type FetchMessage<T> = (FetchTicket, anyhow::Result<Fetched<T>>);

/// Binds an adapter to a widget lifecycle.
///
/// [`request`](Self::request) runs the adapter on a background thread and
/// returns at once; [`poll`](Self::poll) applies whatever has arrived.
/// Dropping the feed drops the receiving end, so responses arriving after
/// the widget is gone are discarded.
pub struct Feed<A: Adapter> {
    adapter: Arc<A>,
    lifecycle: WidgetLifecycle<A::Output>,
    tx: Sender<FetchMessage<A::Output>>,
    rx: Receiver<FetchMessage<A::Output>>,
}

impl<A> Feed<A>
where
    A: Adapter,
    A::Output: Payload,
{
    pub fn new(adapter: A, fallback: FallbackHandling) -> Self {
        let (tx, rx) = channel();
        Self {
            adapter: Arc::new(adapter),
            lifecycle: WidgetLifecycle::new(fallback),
            tx,
            rx,
        }
    }

    pub fn request(&mut self, params: A::Params) -> FetchTicket {
        let ticket = self.lifecycle.begin();
        let adapter = Arc::clone(&self.adapter);
        let tx = self.tx.clone();
        let name = adapter.name();
        let spawned = std::thread::Builder::new()
            .name(format!("fetch-{name}"))
            .spawn(move || {
                let outcome = resolve(adapter.as_ref(), &params);
                // The widget may have been unmounted meanwhile.
                let _ = tx.send((ticket, outcome));
            });
        if let Err(e) = spawned {
            tracing::error!(adapter = name, error = %e, "failed to spawn fetch thread");
            self.queue_failure(ticket, anyhow::anyhow!("failed to start fetch: {e}"));
        }
        ticket
    }

    /// Report a request that never reached the adapter through the same
    /// channel as worker results, so the next [`poll`](Self::poll) sees it.
    fn queue_failure(&self, ticket: FetchTicket, err: anyhow::Error) {
        // `self` holds the receiver, so the send cannot fail.
        let _ = self.tx.send((ticket, Err(err)));
    }

    /// Apply every settled response. Returns the outcome of the last
    /// response that was not stale, if any.
    pub fn poll(&mut self) -> Option<Settled> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok((ticket, outcome)) => match self.lifecycle.settle(ticket, outcome) {
                    Settled::Stale => {}
                    settled => latest = Some(settled),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }

    pub fn lifecycle(&self) -> &WidgetLifecycle<A::Output> {
        &self.lifecycle
    }

    pub fn status(&self) -> &WidgetStatus {
        self.lifecycle.status()
    }

    pub fn data(&self) -> Option<&A::Output> {
        self.lifecycle.data()
    }
}

/// Poll `done` until it holds or five seconds pass.
#[cfg(test)]
pub(crate) fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    false
}

#[cfg(test)]
pub(crate) fn wait_for_settle<A>(feed: &mut Feed<A>) -> Option<Settled>
where
    A: Adapter,
    A::Output: Payload,
{
    let mut settled = None;
    wait_until(|| {
        settled = feed.poll();
        settled.is_some()
    });
    settled
}
