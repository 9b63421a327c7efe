use std::time::Duration;

use bandbox_core::{FlightPermit, StartupOutcome, StartupRun};
use bandbox_runtime_config::SourceSettings;
use tracing::info;

/// Work that runs on the background runtime.
pub enum AsyncCommand {
    /// Connect to the content source and load both panels.
    LoadPanels(StartupRun),
    /// The long-running "start" action.
    Start {
        duration: Duration,
        permit: FlightPermit,
    },
}

/// Results delivered back to the event loop. Each carries the single-flight
/// claim of the command that produced it so the slot stays taken until the
/// result has been applied.
pub enum CommandResult {
    PanelsLoaded {
        outcome: StartupOutcome,
        run: StartupRun,
    },
    StartFinished {
        elapsed: Duration,
        permit: FlightPermit,
    },
}

pub async fn execute(cmd: AsyncCommand, source: SourceSettings) -> CommandResult {
    match cmd {
        AsyncCommand::LoadPanels(run) => {
            let outcome = run
                .connect_and_load(move || bandbox_content_client::connect(&source))
                .await;
            CommandResult::PanelsLoaded { outcome, run }
        }

        AsyncCommand::Start { duration, permit } => {
            info!("start action running for {:?}", duration);
            let started = tokio::time::Instant::now();
            tokio::time::sleep(duration).await;
            CommandResult::StartFinished {
                elapsed: started.elapsed(),
                permit,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandbox_core::{SingleFlight, StartupOrchestrator, StartupPlan};
    use bandbox_runtime_config::SourceKind;

    #[tokio::test]
    async fn load_panels_uses_local_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("Charts")).expect("mkdir");
        std::fs::write(dir.path().join("Charts/gig_altsax.pdf"), b"").expect("write");

        let orchestrator = StartupOrchestrator::new(StartupPlan {
            library_path: "/Charts".into(),
            library_suffix: Some("_altsax.pdf".into()),
            ..StartupPlan::default()
        });
        let run = orchestrator.begin().expect("run");
        let settings = SourceSettings {
            kind: SourceKind::Local,
            local_root: Some(dir.path().to_string_lossy().into_owned()),
            ..SourceSettings::default()
        };

        let CommandResult::PanelsLoaded { outcome, run } =
            execute(AsyncCommand::LoadPanels(run), settings).await
        else {
            panic!("expected panel load");
        };
        assert_eq!(outcome.library, Ok(vec!["gig".to_string()]));
        assert!(orchestrator.is_running());
        drop(run);
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn start_holds_permit_until_result_is_dropped() {
        let flight = SingleFlight::new();
        let permit = flight.try_acquire().expect("permit");
        let result = execute(
            AsyncCommand::Start {
                duration: Duration::from_millis(5),
                permit,
            },
            SourceSettings::default(),
        )
        .await;
        assert!(flight.is_busy());
        let CommandResult::StartFinished { elapsed, permit } = result else {
            panic!("expected start result");
        };
        assert!(elapsed >= Duration::from_millis(5));
        drop(permit);
        assert!(!flight.is_busy());
    }
}
