//! Parallel load of the library and instruments panels.
//!
//! Both listings are fetched concurrently on the blocking pool and awaited
//! jointly. Each fetch yields its own [`PanelLoad`]; a failure (or panic) in
//! one never cancels or masks the other.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::entries;
use crate::flight::{FlightPermit, SingleFlight};
use crate::session::{PanelKind, SessionState};
use crate::source::{normalize_path, ContentSource, ContentSourceError};

pub type PanelLoad = Result<Vec<String>, ContentSourceError>;

/// Paths and processing rules for one startup run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupPlan {
    pub library_path: String,
    pub library_suffix: Option<String>,
    /// `None` means the instruments panel is not configured and loads empty.
    pub instruments_path: Option<String>,
    pub instruments_suffix: Option<String>,
    pub instruments_exclusions: Vec<String>,
}

/// Independent results of both panel fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupOutcome {
    pub library: PanelLoad,
    pub instruments: PanelLoad,
}

impl StartupOutcome {
    /// Same failure for both panels, e.g. when the source could not be built.
    pub fn failed(err: ContentSourceError) -> Self {
        Self {
            library: Err(err.clone()),
            instruments: Err(err),
        }
    }

    pub fn apply_to(self, state: &mut SessionState) {
        state.apply_library_load(self.library);
        state.apply_instruments_load(self.instruments);
    }
}

/// Owns the plan; hands out at most one [`StartupRun`] at a time.
pub struct StartupOrchestrator {
    plan: Arc<StartupPlan>,
    flight: SingleFlight,
}

/// A claimed load. The single-flight slot stays claimed until this is dropped.
pub struct StartupRun {
    plan: Arc<StartupPlan>,
    _permit: FlightPermit,
}

impl StartupOrchestrator {
    pub fn new(plan: StartupPlan) -> Self {
        Self {
            plan: Arc::new(plan),
            flight: SingleFlight::new(),
        }
    }

    pub fn plan(&self) -> &StartupPlan {
        &self.plan
    }

    pub fn is_running(&self) -> bool {
        self.flight.is_busy()
    }

    /// Claim a run, or `None` while another is still in flight.
    pub fn begin(&self) -> Option<StartupRun> {
        let Some(permit) = self.flight.try_acquire() else {
            debug!("startup already in flight; ignoring request");
            return None;
        };
        Some(StartupRun {
            plan: Arc::clone(&self.plan),
            _permit: permit,
        })
    }
}

impl StartupRun {
    /// Build the source with `connect` (blocking, e.g. a credential check),
    /// then load both panels. A connect failure errors both panels.
    pub async fn connect_and_load<S, F>(&self, connect: F) -> StartupOutcome
    where
        S: ContentSource + ?Sized + 'static,
        F: FnOnce() -> Result<Arc<S>, ContentSourceError> + Send + 'static,
    {
        let source = match tokio::task::spawn_blocking(connect).await {
            Ok(Ok(source)) => source,
            Ok(Err(err)) => {
                error!("content source unavailable: {err}");
                return StartupOutcome::failed(err);
            }
            Err(join_err) => {
                error!("content source setup did not complete: {join_err}");
                return StartupOutcome::failed(ContentSourceError::Other(format!(
                    "connection did not complete: {join_err}"
                )));
            }
        };
        self.load(source).await
    }

    pub async fn load<S: ContentSource + ?Sized + 'static>(&self, source: Arc<S>) -> StartupOutcome {
        let plan = &self.plan;
        info!(
            library = %plan.library_path,
            instruments = ?plan.instruments_path,
            "loading panels"
        );

        let library = fetch(Arc::clone(&source), plan.library_path.clone());
        let instruments = async {
            match plan.instruments_path.as_deref() {
                Some(path) => fetch(Arc::clone(&source), path.to_string()).await,
                None => Ok(Vec::new()),
            }
        };
        let (library, instruments) = tokio::join!(library, instruments);

        let library = library.map(|raw| {
            entries::process_library(&raw, plan.library_suffix.as_deref())
        });
        let instruments = instruments.map(|raw| {
            entries::process(
                &raw,
                plan.instruments_suffix.as_deref(),
                &plan.instruments_exclusions,
            )
        });

        log_outcome(PanelKind::Library, &library);
        log_outcome(PanelKind::Instruments, &instruments);
        StartupOutcome {
            library,
            instruments,
        }
    }
}

async fn fetch<S: ContentSource + ?Sized + 'static>(source: Arc<S>, path: String) -> PanelLoad {
    let label = path.clone();
    let handle =
        tokio::task::spawn_blocking(move || source.list_contents(normalize_path(&path)));
    match handle.await {
        Ok(result) => result,
        Err(join_err) => Err(ContentSourceError::Other(format!(
            "listing '{label}' did not complete: {join_err}"
        ))),
    }
}

fn log_outcome(panel: PanelKind, load: &PanelLoad) {
    match load {
        Ok(entries) => info!(panel = panel.label(), count = entries.len(), "panel ready"),
        Err(err) => error!(panel = panel.label(), "panel load failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeSource {
        listings: HashMap<String, (u64, PanelLoad)>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, path: &str, delay_ms: u64, load: PanelLoad) -> Self {
            self.listings.insert(path.to_string(), (delay_ms, load));
            self
        }
    }

    impl ContentSource for FakeSource {
        fn list_contents(&self, path: &str) -> Result<Vec<String>, ContentSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path == "panic" {
                panic!("source blew up");
            }
            let (delay, load) = self
                .listings
                .get(path)
                .cloned()
                .unwrap_or((0, Err(ContentSourceError::Other(format!("no path {path}")))));
            std::thread::sleep(Duration::from_millis(delay));
            load
        }
    }

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn plan(instruments: Option<&str>) -> StartupPlan {
        StartupPlan {
            library_path: "/Charts".to_string(),
            library_suffix: Some("_altsax.pdf".to_string()),
            instruments_path: instruments.map(str::to_string),
            instruments_suffix: Some(".pdf".to_string()),
            instruments_exclusions: names(&["draft"]),
        }
    }

    #[tokio::test]
    async fn processes_both_panels() {
        let source = FakeSource::default()
            .with("/Charts", 0, Ok(names(&["blues_altsax.pdf", "Anthem_altsax.pdf"])))
            .with(
                "/Parts",
                0,
                Ok(names(&["[file] tuba.pdf", "[file] draft horn.pdf", "[file] Alto.pdf"])),
            );
        let orchestrator = StartupOrchestrator::new(plan(Some("/Parts")));
        let run = orchestrator.begin().expect("first run");
        let outcome = run.load(Arc::new(source)).await;

        assert_eq!(outcome.library, Ok(names(&["blues", "Anthem"])));
        assert_eq!(outcome.instruments, Ok(names(&["Alto", "tuba"])));
    }

    #[tokio::test]
    async fn library_failure_is_isolated_when_it_finishes_last() {
        let source = FakeSource::default()
            .with("/Charts", 60, Err(ContentSourceError::Auth("bad token".into())))
            .with("/Parts", 0, Ok(names(&["tuba"])));
        let orchestrator = StartupOrchestrator::new(plan(Some("/Parts")));
        let outcome = orchestrator.begin().expect("run").load(Arc::new(source)).await;

        let mut state = SessionState::new();
        outcome.apply_to(&mut state);
        assert_eq!(
            state.status(PanelKind::Library).error_message(),
            Some("Cannot connect! bad token")
        );
        assert!(state.status(PanelKind::Instruments).is_ready());
        assert_eq!(state.entries(PanelKind::Instruments), &names(&["tuba"])[..]);
    }

    #[tokio::test]
    async fn library_failure_is_isolated_when_it_finishes_first() {
        let source = FakeSource::default()
            .with("/Charts", 0, Err(ContentSourceError::Other("gone".into())))
            .with("/Parts", 60, Ok(names(&["tuba", "horn"])));
        let orchestrator = StartupOrchestrator::new(plan(Some("/Parts")));
        let outcome = orchestrator.begin().expect("run").load(Arc::new(source)).await;

        assert_eq!(outcome.library, Err(ContentSourceError::Other("gone".into())));
        assert_eq!(outcome.instruments, Ok(names(&["horn", "tuba"])));
    }

    #[tokio::test]
    async fn unconfigured_instruments_are_not_fetched() {
        let source = Arc::new(FakeSource::default().with("/Charts", 0, Ok(names(&["a"]))));
        let orchestrator = StartupOrchestrator::new(plan(None));
        let outcome = orchestrator.begin().expect("run").load(Arc::clone(&source)).await;

        assert_eq!(outcome.instruments, Ok(Vec::new()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_fetch_only_fails_its_panel() {
        let source = FakeSource::default().with("/Parts", 0, Ok(names(&["tuba"])));
        let mut plan = plan(Some("/Parts"));
        plan.library_path = "panic".to_string();
        let orchestrator = StartupOrchestrator::new(plan);
        let outcome = orchestrator.begin().expect("run").load(Arc::new(source)).await;

        assert!(matches!(outcome.library, Err(ContentSourceError::Other(_))));
        assert_eq!(outcome.instruments, Ok(names(&["tuba"])));
    }

    #[tokio::test]
    async fn root_path_is_normalized_before_listing() {
        let source = FakeSource::default().with("", 0, Ok(names(&["x"])));
        let mut plan = plan(None);
        plan.library_path = " / ".to_string();
        let orchestrator = StartupOrchestrator::new(plan);
        let outcome = orchestrator.begin().expect("run").load(Arc::new(source)).await;
        assert_eq!(outcome.library, Ok(names(&["x"])));
    }

    #[test]
    fn second_begin_is_refused_while_in_flight() {
        let orchestrator = StartupOrchestrator::new(plan(None));
        let run = orchestrator.begin();
        assert!(run.is_some());
        assert!(orchestrator.is_running());
        assert!(orchestrator.begin().is_none());
        drop(run);
        assert!(orchestrator.begin().is_some());
    }

    #[tokio::test]
    async fn connect_failure_errors_both_panels() {
        let orchestrator = StartupOrchestrator::new(plan(Some("/Parts")));
        let run = orchestrator.begin().expect("run");
        let outcome = run
            .connect_and_load(|| -> Result<Arc<FakeSource>, ContentSourceError> {
                Err(ContentSourceError::Auth("token missing".into()))
            })
            .await;
        assert_eq!(outcome, StartupOutcome::failed(ContentSourceError::Auth("token missing".into())));
    }

    #[tokio::test]
    async fn connect_then_load_uses_built_source() {
        let orchestrator = StartupOrchestrator::new(plan(None));
        let run = orchestrator.begin().expect("run");
        let outcome = run
            .connect_and_load(|| {
                Ok(Arc::new(
                    FakeSource::default().with("/Charts", 0, Ok(names(&["gig_altsax.pdf"]))),
                ))
            })
            .await;
        assert_eq!(outcome.library, Ok(names(&["gig"])));
        assert_eq!(outcome.instruments, Ok(Vec::new()));
    }

    #[test]
    fn failed_outcome_errors_both_panels_independently() {
        let mut state = SessionState::new();
        StartupOutcome::failed(ContentSourceError::Auth("missing token".into()))
            .apply_to(&mut state);
        assert!(state.status(PanelKind::Library).error_message().is_some());
        assert!(state.status(PanelKind::Instruments).error_message().is_some());
        assert!(!state.is_loading());
    }
}
