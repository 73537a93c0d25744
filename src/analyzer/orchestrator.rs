//! Analysis orchestrator
//!
//! Drives one call through the stage machine:
//! `Start → Fetching → Parsing → Extracting → LinkCollecting → Probing →
//! Aggregating → Done`, failing only while fetching or parsing.
//!
//! The analyzer holds no per-call state, so one instance may serve any
//! number of concurrent calls.

use crate::analyzer::fetcher::{
    build_http_client, fetch_page, validate_target_url, FetchedPage,
};
use crate::analyzer::prober::{HttpProbe, LinkProbe, Prober};
use crate::analyzer::result::AnalysisResult;
use crate::config::Config;
use crate::html::{collect_links, extract_features, parse_document, LinkRecord, PageFeatures};
use crate::state::{AnalysisStage, StageTracker};
use crate::AnalysisError;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Page analyzer
///
/// # Example
///
/// ```no_run
/// use site_analyzer::{Analyzer, Config};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> Result<(), site_analyzer::AnalysisError> {
/// let analyzer = Analyzer::new(Config::default())?;
/// let result = analyzer
///     .analyze("https://example.com", &CancellationToken::new())
///     .await?;
/// println!("{} links, {} inaccessible", result.total_links(), result.inaccessible_count);
/// # Ok(())
/// # }
/// ```
pub struct Analyzer<P = HttpProbe> {
    config: Config,
    client: Client,
    prober: Prober<P>,
}

impl Analyzer<HttpProbe> {
    /// Creates an analyzer that probes links with HTTP HEAD requests
    pub fn new(config: Config) -> Result<Self, AnalysisError> {
        let client = build_http_client(&config)?;
        let probe = HttpProbe::new(client.clone(), config.http.probe_timeout());
        Ok(Self::with_probe(config, client, probe))
    }
}

impl<P: LinkProbe + 'static> Analyzer<P> {
    /// Creates an analyzer with a custom link probe transport
    pub fn with_probe(config: Config, client: Client, probe: P) -> Self {
        let prober = Prober::new(probe, config.http.max_concurrent_probes);
        Self {
            config,
            client,
            prober,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyzes one page
    ///
    /// `cancel` is shared by the page fetch and every link probe. If it
    /// fires before the page arrives the call fails; if it fires later the
    /// remaining probes are recorded as inaccessible and a complete result
    /// is still returned.
    pub async fn analyze(
        &self,
        target_url: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let mut stages = StageTracker::new(target_url);
        tracing::info!("Analyzing {}", target_url);

        stages.advance(AnalysisStage::Fetching);
        let page = match self.fetch(target_url, cancel).await {
            Ok(page) => page,
            Err(e) => return Err(stages.fail(e)),
        };
        if page.final_url != target_url {
            tracing::debug!("{} redirected to {}", target_url, page.final_url);
        }

        let (features, links) = inspect_page(&mut stages, target_url, &page)?;

        stages.advance(AnalysisStage::Probing);
        tracing::debug!(
            "Probing {} links, at most {} at a time",
            links.len(),
            self.prober.max_concurrent()
        );
        let outcomes = self.prober.probe_all(&links, target_url, cancel).await;

        stages.advance(AnalysisStage::Aggregating);
        let result = AnalysisResult::from_parts(target_url, features, links, &outcomes);

        stages.advance(AnalysisStage::Done);
        tracing::info!(
            "Analyzed {} in {:.2}s: {} internal, {} external, {} inaccessible",
            target_url,
            started.elapsed().as_secs_f64(),
            result.internal_count,
            result.external_count,
            result.inaccessible_count
        );

        Ok(result)
    }

    /// Analyzes one page, cancelling everything once `deadline` has passed
    ///
    /// The deadline is layered on top of `cancel`: firing either one stops
    /// outstanding work.
    pub async fn analyze_with_deadline(
        &self,
        target_url: &str,
        cancel: &CancellationToken,
        deadline: Duration,
    ) -> Result<AnalysisResult, AnalysisError> {
        let scoped = cancel.child_token();

        let timer = {
            let scoped = scoped.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                tracing::warn!("Analysis deadline of {:?} reached", deadline);
                scoped.cancel();
            })
        };

        let result = self.analyze(target_url, &scoped).await;
        timer.abort();
        result
    }

    async fn fetch(
        &self,
        target_url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, AnalysisError> {
        validate_target_url(target_url)?;
        fetch_page(
            &self.client,
            target_url,
            self.config.http.fetch_timeout(),
            cancel,
        )
        .await
    }
}

/// Parses the body and runs extraction and link collection
///
/// Kept synchronous so the parsed tree never lives across an await point.
fn inspect_page(
    stages: &mut StageTracker,
    url: &str,
    page: &FetchedPage,
) -> Result<(PageFeatures, Vec<LinkRecord>), AnalysisError> {
    stages.advance(AnalysisStage::Parsing);
    let source = page.decode(url).map_err(|e| stages.fail(e))?;
    let document = parse_document(&source);

    stages.advance(AnalysisStage::Extracting);
    let features = extract_features(&document);

    stages.advance(AnalysisStage::LinkCollecting);
    let links = collect_links(document.tree.root(), url);

    Ok((features, links))
}

/// Analyzes `target_url` with a fresh analyzer built from `config`
///
/// Convenience for one-off calls; build an [`Analyzer`] once to reuse the
/// connection pool across calls.
pub async fn analyze(
    config: Config,
    target_url: &str,
    cancel: &CancellationToken,
) -> Result<AnalysisResult, AnalysisError> {
    let deadline = config.http.analysis_deadline();
    Analyzer::new(config)?
        .analyze_with_deadline(target_url, cancel, deadline)
        .await
}
