//! Link accessibility prober
//!
//! Every collected link gets its own spawned task. A counting semaphore
//! admits at most `max_concurrent` tasks into their network call at once,
//! and every task races the caller's cancellation token both while waiting
//! for a permit and while its request is in flight.
//!
//! Tasks live in a `JoinSet` and report back with their link index, so
//! `outcomes[i]` always belongs to `links[i]` no matter which probe finishes
//! first. Dropping the call drops the set, which aborts every task still
//! queued or in flight.

use crate::html::LinkRecord;
use crate::ProbeError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Transport used to probe a single URL
///
/// Returns the response status code of a HEAD request.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn head(&self, url: &str) -> Result<u16, ProbeError>;
}

/// HEAD probe over a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn head(&self, url: &str) -> Result<u16, ProbeError> {
        let response = self
            .client
            .head(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Transport(e.to_string())
                }
            })?;

        Ok(response.status().as_u16())
    }
}

/// Result of probing one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// The URL actually probed
    pub resolved_url: String,

    /// Response status, when a response arrived
    pub status: Option<u16>,

    /// Why the link counts as inaccessible, if it does
    pub error: Option<ProbeError>,
}

impl ProbeOutcome {
    fn failed(resolved_url: String, error: ProbeError) -> Self {
        Self {
            resolved_url,
            status: None,
            error: Some(error),
        }
    }

    fn completed(resolved_url: String, status: u16) -> Self {
        let error = (status >= 400).then_some(ProbeError::BadStatus(status));
        Self {
            resolved_url,
            status: Some(status),
            error,
        }
    }

    /// Accessible iff a response arrived with a status below 400
    pub fn is_accessible(&self) -> bool {
        self.error.is_none() && self.status.is_some_and(|status| status < 400)
    }

    /// Returns true if the probe was skipped or aborted by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(ProbeError::Cancelled))
    }
}

/// Resolves an href against the base URL
///
/// Root-relative hrefs are prefixed with the base URL; everything else is
/// probed as written.
pub fn resolve_href(href: &str, base_url: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", base_url.strip_suffix('/').unwrap_or(base_url), href)
    } else {
        href.to_string()
    }
}

/// Only http and https URLs are probed
pub fn check_scheme(url: &str) -> Result<(), ProbeError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ProbeError::InvalidScheme(url.to_string()))
    }
}

/// Bounded-concurrency fan-out over a [`LinkProbe`]
pub struct Prober<P> {
    probe: Arc<P>,
    max_concurrent: usize,
}

impl<P: LinkProbe + 'static> Prober<P> {
    /// Creates a prober admitting at most `max_concurrent` probes at once
    ///
    /// A limit of zero is raised to one.
    pub fn new(probe: P, max_concurrent: usize) -> Self {
        Self {
            probe: Arc::new(probe),
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Probes every link and returns one outcome per link, in input order
    ///
    /// Waits for every task; a failed, cancelled or panicking probe only
    /// affects its own slot.
    pub async fn probe_all(
        &self,
        links: &[LinkRecord],
        base_url: &str,
        cancel: &CancellationToken,
    ) -> Vec<ProbeOutcome> {
        // One gate per call: concurrent analyses never share permits
        let gate = Arc::new(Semaphore::new(self.max_concurrent));

        let urls: Vec<String> = links
            .iter()
            .map(|link| resolve_href(&link.href, base_url))
            .collect();

        let mut tasks = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            let probe = Arc::clone(&self.probe);
            let gate = Arc::clone(&gate);
            let cancel = cancel.clone();
            let url = url.clone();
            tasks.spawn(async move {
                (index, probe_one(probe.as_ref(), url, &gate, &cancel).await)
            });
        }

        let mut slots: Vec<Option<ProbeOutcome>> = vec![None; urls.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    tracing::debug!(
                        "Probe {} -> {}",
                        outcome.resolved_url,
                        match (&outcome.error, outcome.status) {
                            (Some(error), _) => error.to_string(),
                            (None, Some(status)) => format!("HTTP {}", status),
                            (None, None) => "no response".to_string(),
                        }
                    );
                    slots[index] = Some(outcome);
                }
                Err(e) => tracing::warn!("Probe task failed: {}", e),
            }
        }

        // A slot left empty belongs to a task that panicked
        let outcomes: Vec<ProbeOutcome> = slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    ProbeOutcome::failed(url, ProbeError::Task("probe task panicked".to_string()))
                })
            })
            .collect();

        let inaccessible = outcomes.iter().filter(|o| !o.is_accessible()).count();
        tracing::info!(
            "Probed {} links ({} inaccessible)",
            outcomes.len(),
            inaccessible
        );

        outcomes
    }
}

async fn probe_one<P: LinkProbe + ?Sized>(
    probe: &P,
    url: String,
    gate: &Semaphore,
    cancel: &CancellationToken,
) -> ProbeOutcome {
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ProbeOutcome::failed(url, ProbeError::Cancelled),
        permit = gate.acquire() => match permit {
            Ok(permit) => permit,
            Err(_) => return ProbeOutcome::failed(url, ProbeError::Cancelled),
        },
    };

    if let Err(error) = check_scheme(&url) {
        return ProbeOutcome::failed(url, error);
    }

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        result = probe.head(&url) => result,
    };
    drop(permit);

    match result {
        Ok(status) => ProbeOutcome::completed(url, status),
        Err(error) => ProbeOutcome::failed(url, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts probes in flight and remembers the peak
    #[derive(Default)]
    struct CountingProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingProbe {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl LinkProbe for CountingProbe {
        async fn head(&self, _url: &str) -> Result<u16, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(200)
        }
    }

    /// Answers by path, finishing later links first
    struct ScriptedProbe;

    #[async_trait]
    impl LinkProbe for ScriptedProbe {
        async fn head(&self, url: &str) -> Result<u16, ProbeError> {
            let index: u64 = url
                .rsplit('-')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(100 - index * 10)).await;
            if url.contains("/broken-") {
                Ok(404)
            } else if url.contains("/down-") {
                Err(ProbeError::Transport("connection refused".to_string()))
            } else {
                Ok(200)
            }
        }
    }

    fn records(hrefs: &[&str]) -> Vec<LinkRecord> {
        hrefs
            .iter()
            .map(|href| LinkRecord::new(*href, "https://example.com"))
            .collect()
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(
            resolve_href("/about", "https://example.com"),
            "https://example.com/about"
        );
        assert_eq!(
            resolve_href("/about", "https://example.com/"),
            "https://example.com/about"
        );
        assert_eq!(
            resolve_href("https://other.example/x", "https://example.com"),
            "https://other.example/x"
        );
        assert_eq!(resolve_href("page.html", "https://example.com"), "page.html");
    }

    #[test]
    fn test_check_scheme() {
        assert!(check_scheme("http://example.com").is_ok());
        assert!(check_scheme("https://example.com").is_ok());
        assert!(matches!(
            check_scheme("mailto:me@example.com"),
            Err(ProbeError::InvalidScheme(_))
        ));
        assert!(check_scheme("page.html").is_err());
    }

    #[test]
    fn test_outcome_accessibility() {
        assert!(ProbeOutcome::completed("u".into(), 200).is_accessible());
        assert!(ProbeOutcome::completed("u".into(), 399).is_accessible());
        assert!(!ProbeOutcome::completed("u".into(), 400).is_accessible());
        assert!(!ProbeOutcome::failed("u".into(), ProbeError::Timeout).is_accessible());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_admission_gate_bounds_in_flight_probes() {
        let prober = Prober::new(CountingProbe::with_delay(Duration::from_millis(30)), 10);
        let hrefs: Vec<String> = (0..60).map(|i| format!("/page-{}", i)).collect();
        let hrefs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

        let outcomes = prober
            .probe_all(&records(&hrefs), "https://example.com", &CancellationToken::new())
            .await;

        assert_eq!(outcomes.len(), 60);
        assert!(outcomes.iter().all(ProbeOutcome::is_accessible));
        let peak = prober.probe.peak.load(Ordering::SeqCst);
        assert!(peak <= 10, "peak in-flight probes was {}", peak);
        assert!(peak > 1, "probes never overlapped");
        assert_eq!(prober.probe.calls.load(Ordering::SeqCst), 60);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_outcomes_keep_input_order() {
        let prober = Prober::new(ScriptedProbe, 10);
        let links = records(&[
            "/ok-0",
            "/broken-1",
            "/down-2",
            "/ok-3",
            "mailto:someone@example.com",
            "/broken-5",
        ]);

        let outcomes = prober
            .probe_all(&links, "https://example.com", &CancellationToken::new())
            .await;

        assert_eq!(outcomes.len(), links.len());
        for (link, outcome) in links.iter().zip(&outcomes) {
            assert_eq!(outcome.resolved_url, resolve_href(&link.href, "https://example.com"));
        }
        let accessible: Vec<bool> = outcomes.iter().map(ProbeOutcome::is_accessible).collect();
        assert_eq!(accessible, vec![true, false, false, true, false, false]);
        assert_eq!(outcomes[1].error, Some(ProbeError::BadStatus(404)));
        assert!(matches!(outcomes[4].error, Some(ProbeError::InvalidScheme(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_skips_every_probe() {
        let prober = Prober::new(CountingProbe::default(), 10);
        let links = records(&["/a", "/b", "https://other.example/"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcomes = prober.probe_all(&links, "https://example.com", &cancel).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(ProbeOutcome::is_cancelled));
        assert_eq!(prober.probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_probes() {
        let prober = Prober::new(CountingProbe::with_delay(Duration::from_secs(30)), 2);
        let links = records(&["/a", "/b", "/c", "/d"]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let outcomes = tokio::time::timeout(
            Duration::from_secs(5),
            prober.probe_all(&links, "https://example.com", &cancel),
        )
        .await
        .expect("probing did not stop after cancellation");

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(ProbeOutcome::is_cancelled));
        // Only the two admitted probes ever reached the transport
        assert_eq!(prober.probe.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropping_the_call_stops_queued_probes() {
        let prober = Prober::new(CountingProbe::with_delay(Duration::from_millis(30)), 1);
        let hrefs: Vec<String> = (0..10).map(|i| format!("/page-{}", i)).collect();
        let hrefs: Vec<&str> = hrefs.iter().map(String::as_str).collect();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            prober.probe_all(&records(&hrefs), "https://example.com", &CancellationToken::new()),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;
        let calls = prober.probe.calls.load(Ordering::SeqCst);
        assert!(calls <= 1, "{} probes ran after the call was dropped", calls);
    }

    #[tokio::test]
    async fn test_panicking_probe_fails_only_its_own_link() {
        struct PanicsOnBoom;

        #[async_trait]
        impl LinkProbe for PanicsOnBoom {
            async fn head(&self, url: &str) -> Result<u16, ProbeError> {
                if url.ends_with("/boom") {
                    panic!("probe blew up");
                }
                Ok(200)
            }
        }

        let prober = Prober::new(PanicsOnBoom, 2);
        let links = records(&["/a", "/boom", "/c"]);
        let outcomes = prober
            .probe_all(&links, "https://example.com", &CancellationToken::new())
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_accessible());
        assert_eq!(outcomes[1].resolved_url, "https://example.com/boom");
        assert!(matches!(outcomes[1].error, Some(ProbeError::Task(_))));
        assert!(outcomes[2].is_accessible());
    }

    #[tokio::test]
    async fn test_empty_link_list() {
        let prober = Prober::new(CountingProbe::default(), 10);
        let outcomes = prober
            .probe_all(&[], "https://example.com", &CancellationToken::new())
            .await;
        assert!(outcomes.is_empty());
    }
}
