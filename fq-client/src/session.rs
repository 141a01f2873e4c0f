//! Quote session: local estimate now, authoritative quote once settled
//!
//! Every configuration change is priced locally and published at once. The
//! change also (re)starts a debounce window; when the window closes without a
//! newer change, one authoritative request goes out. Each change bumps a
//! generation counter and results tagged with an older generation are
//! dropped, so the displayed quote always belongs to the current
//! configuration no matter how responses interleave.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use fq_common::catalog::Catalog;
use fq_common::config::ClientSettings;
use fq_common::pricing::compute_price_or_zero;
use fq_common::{ParameterSnapshot, PartConfiguration, PriceBreakdown, Result};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::pricer::AuthoritativePricer;

/// Where a session stands for its current configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    /// No configuration submitted yet
    Idle,
    /// Showing a local estimate; debounce window open or last request failed
    LocalOnly,
    /// Showing a local estimate; authoritative request in flight
    AwaitingAuthoritative,
    /// Showing the server's quote
    Authoritative,
}

/// What produced the displayed breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    /// Local engine, built-in fallback constants
    LocalFallback,
    /// Local engine, last fetched live snapshot
    LocalSnapshot,
    /// Authoritative service
    Authoritative,
}

/// The displayed quote
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub generation: u64,
    pub configuration: PartConfiguration,
    pub breakdown: PriceBreakdown,
    pub source: QuoteSource,
    pub state: QuoteState,
}

impl Quote {
    pub fn is_authoritative(&self) -> bool {
        self.source == QuoteSource::Authoritative
    }
}

struct Inner {
    generation: u64,
    configuration: Option<PartConfiguration>,
    snapshot: Option<ParameterSnapshot>,
    /// Debounce window of the current generation
    pending: Option<CancellationToken>,
}

struct Shared {
    pricer: Arc<dyn AuthoritativePricer>,
    catalog: Catalog,
    debounce: Duration,
    request_timeout: Duration,
    inner: Mutex<Inner>,
    displayed: watch::Sender<Option<Quote>>,
    shutdown: CancellationToken,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent across a panicking holder; keep going
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn local_quote(
        &self,
        generation: u64,
        config: &PartConfiguration,
        snapshot: Option<&ParameterSnapshot>,
    ) -> Quote {
        Quote {
            generation,
            configuration: config.clone(),
            breakdown: compute_price_or_zero(&self.catalog, config, snapshot),
            source: if snapshot.is_some() {
                QuoteSource::LocalSnapshot
            } else {
                QuoteSource::LocalFallback
            },
            state: QuoteState::LocalOnly,
        }
    }

    /// Modify the displayed quote if `generation` is still current
    fn transition(&self, generation: u64, f: impl FnOnce(&mut Quote)) -> bool {
        let inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        self.displayed.send_if_modified(|displayed| match displayed {
            Some(quote) if quote.generation == generation => {
                f(quote);
                true
            }
            _ => false,
        })
    }
}

/// One configuration-editing session
///
/// Must be driven from within a Tokio runtime. Dropping the session (or
/// calling [`QuoteSession::discard`]) cancels any open debounce window and
/// causes in-flight results to be ignored.
pub struct QuoteSession {
    shared: Arc<Shared>,
}

impl QuoteSession {
    pub fn new(pricer: Arc<dyn AuthoritativePricer>, catalog: Catalog, settings: &ClientSettings) -> Self {
        Self::with_timing(pricer, catalog, settings.debounce, settings.request_timeout)
    }

    pub fn with_timing(
        pricer: Arc<dyn AuthoritativePricer>,
        catalog: Catalog,
        debounce: Duration,
        request_timeout: Duration,
    ) -> Self {
        let (displayed, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                pricer,
                catalog,
                debounce,
                request_timeout,
                inner: Mutex::new(Inner {
                    generation: 0,
                    configuration: None,
                    snapshot: None,
                    pending: None,
                }),
                displayed,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Receiver for every change of the displayed quote
    pub fn subscribe(&self) -> watch::Receiver<Option<Quote>> {
        self.shared.displayed.subscribe()
    }

    pub fn current(&self) -> Option<Quote> {
        self.shared.displayed.borrow().clone()
    }

    pub fn state(&self) -> QuoteState {
        self.shared
            .displayed
            .borrow()
            .as_ref()
            .map(|q| q.state)
            .unwrap_or(QuoteState::Idle)
    }

    /// Live snapshot used for local evaluation, if one has been fetched
    pub fn snapshot(&self) -> Option<ParameterSnapshot> {
        self.shared.lock().snapshot.clone()
    }

    /// Submit a new configuration
    ///
    /// Returns the local quote, which is also published immediately. An
    /// invalid configuration is rejected and the displayed quote is left
    /// untouched.
    pub fn update(&self, config: PartConfiguration) -> Result<Quote> {
        config.validate()?;

        let (quote, token) = {
            let mut inner = self.shared.lock();
            inner.generation += 1;
            let quote = self
                .shared
                .local_quote(inner.generation, &config, inner.snapshot.as_ref());

            if let Some(previous) = inner.pending.take() {
                previous.cancel();
            }
            let token = self.shared.shutdown.child_token();
            inner.pending = Some(token.clone());
            inner.configuration = Some(config.clone());

            self.shared.displayed.send_replace(Some(quote.clone()));
            (quote, token)
        };

        debug!(
            generation = quote.generation,
            unit_price = quote.breakdown.unit_price,
            subtotal = quote.breakdown.subtotal,
            source = ?quote.source,
            "Local quote"
        );

        tokio::spawn(settle(
            Arc::clone(&self.shared),
            quote.generation,
            config,
            token,
        ));

        Ok(quote)
    }

    /// Fetch the live parameter snapshot for later local evaluations
    ///
    /// On success the current configuration is re-priced locally unless an
    /// authoritative quote is already displayed. On failure the previous
    /// snapshot stays in use.
    pub async fn refresh_snapshot(&self) -> Result<()> {
        let snapshot = match self.shared.pricer.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Parameter snapshot refresh failed, keeping previous snapshot: {}", e);
                return Err(e);
            }
        };

        info!(parameters = snapshot.len(), "Live parameter snapshot refreshed");

        let mut inner = self.shared.lock();
        inner.snapshot = Some(snapshot);

        if let Some(config) = inner.configuration.clone() {
            let local = self
                .shared
                .local_quote(inner.generation, &config, inner.snapshot.as_ref());
            self.shared.displayed.send_if_modified(|displayed| match displayed {
                Some(quote)
                    if quote.generation == local.generation
                        && quote.state != QuoteState::Authoritative =>
                {
                    quote.breakdown = local.breakdown;
                    quote.source = local.source;
                    true
                }
                _ => false,
            });
        }

        Ok(())
    }

    /// End the session; nothing further is requested or displayed
    pub fn discard(self) {
        debug!("Quote session discarded");
    }
}

impl Drop for QuoteSession {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
        self.shared.lock().generation += 1;
    }
}

/// Debounce, then ask for the authoritative quote of one generation
async fn settle(
    shared: Arc<Shared>,
    generation: u64,
    config: PartConfiguration,
    token: CancellationToken,
) {
    tokio::select! {
        _ = token.cancelled() => {
            debug!(generation, "Debounce window superseded");
            return;
        }
        _ = tokio::time::sleep(shared.debounce) => {}
    }

    if !shared.transition(generation, |q| q.state = QuoteState::AwaitingAuthoritative) {
        return;
    }

    // Not raced against the token: a superseded request completes and its
    // result is dropped by the generation check
    let outcome = tokio::time::timeout(shared.request_timeout, shared.pricer.calculate(&config)).await;

    match outcome {
        Ok(Ok(breakdown)) => {
            let applied = shared.transition(generation, |q| {
                q.breakdown = breakdown;
                q.source = QuoteSource::Authoritative;
                q.state = QuoteState::Authoritative;
            });
            if applied {
                debug!(generation, subtotal = breakdown.subtotal, "Authoritative quote applied");
            } else {
                debug!(generation, "Discarding superseded authoritative quote");
            }
        }
        Ok(Err(e)) => {
            if shared.transition(generation, |q| q.state = QuoteState::LocalOnly) {
                warn!(generation, "Authoritative quote failed, keeping local estimate: {}", e);
            }
        }
        Err(_) => {
            if shared.transition(generation, |q| q.state = QuoteState::LocalOnly) {
                warn!(
                    generation,
                    timeout_ms = shared.request_timeout.as_millis() as u64,
                    "Authoritative quote timed out, keeping local estimate"
                );
            }
        }
    }
}
