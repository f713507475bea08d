//! A configured sync session: the orchestrator plus the filter and
//! scanner that feed it.
//!
//! The binary drives a session either once over every component
//! ([`Session::sync_all`]) or from watcher signals
//! ([`Session::events_for`] then [`Session::dispatch`]).

use crate::config::Config;
use crate::error::CliResult;
use crate::formatter::ConfiguredFormatter;
use crate::scanner::{ComponentFilter, ComponentScanner};
use crate::watcher::EventClassifier;
use std::path::Path;
use storysync::{
    EventKind, FileWriter, StorySync, SyncError, SyncOutcome, TsOracle, WatchEvent,
};

/// The orchestrator type every session runs.
pub type Orchestrator = StorySync<TsOracle, ConfiguredFormatter>;

/// An event together with how handling it went.
#[derive(Debug)]
pub struct EventReport {
    pub event: WatchEvent,
    pub result: Result<SyncOutcome, SyncError>,
}

impl EventReport {
    /// Whether handling the event failed.
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// A configured sync session.
pub struct Session {
    sync: Orchestrator,
    scanner: ComponentScanner,
}

impl Session {
    /// Build a session from a merged and anchored configuration.
    pub fn from_config(config: &Config, dry_run: bool) -> CliResult<Self> {
        let sync_config = config.to_sync_config();
        let filter = ComponentFilter::new(&sync_config, &config.watch.ignore)?;
        let formatter =
            ConfiguredFormatter::new(config.formatter_command(), &sync_config.project_root);

        let sync = StorySync::new(sync_config, TsOracle::new(), formatter)
            .with_writer(FileWriter::new(dry_run));

        Ok(Self {
            sync,
            scanner: ComponentScanner::new(filter).with_gitignore(config.watch.gitignore),
        })
    }

    /// The orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.sync
    }

    /// Handle one event, logging failures instead of propagating them.
    pub fn dispatch(&self, event: WatchEvent) -> EventReport {
        let result = self.sync.handle(&event);
        if let Err(ref e) = result {
            tracing::error!(path = %event.path.display(), kind = %event.kind, error = %e, "Event failed");
        }
        EventReport { event, result }
    }

    /// Treat every existing component as added, one after another.
    ///
    /// Missing stories are created and existing ones reconciled.
    pub fn sync_all(&self) -> CliResult<Vec<EventReport>> {
        let components = self.scanner.scan()?;
        tracing::info!(count = components.len(), "Syncing components");

        Ok(components
            .into_iter()
            .map(|path| self.dispatch(WatchEvent::new(EventKind::Added, path)))
            .collect())
    }

    /// Classifier seeded with the components that exist now.
    pub fn classifier(&self) -> CliResult<EventClassifier> {
        Ok(EventClassifier::new(self.scanner.scan()?))
    }

    /// Turn a touched path into component events.
    ///
    /// A new directory yields an added event per unknown component inside
    /// it; a vanished directory yields a deleted event per known component
    /// that was below it.
    pub fn events_for(
        &self,
        classifier: &mut EventClassifier,
        path: &Path,
    ) -> CliResult<Vec<WatchEvent>> {
        if path.is_dir() {
            let added = self
                .scanner
                .scan_dir(path)?
                .into_iter()
                .filter_map(|component| {
                    if classifier.is_known(&component) {
                        return None;
                    }
                    classifier
                        .classify(&component, true)
                        .map(|kind| WatchEvent::new(kind, component))
                })
                .collect();
            return Ok(added);
        }

        if self.scanner.filter().accepts(path) {
            return Ok(classifier
                .classify(path, path.is_file())
                .map(|kind| WatchEvent::new(kind, path))
                .into_iter()
                .collect());
        }

        if !path.exists() {
            return Ok(classifier
                .forget_under(path)
                .into_iter()
                .map(|component| WatchEvent::new(EventKind::Deleted, component))
                .collect());
        }

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let components = dir.path().join("src/components");
        fs::create_dir_all(components.join("forms")).unwrap();
        fs::write(
            components.join("Button.tsx"),
            "export interface ButtonProps { label: string }\n",
        )
        .unwrap();
        fs::write(components.join("forms/Input.tsx"), "export {}\n").unwrap();
        dir
    }

    fn session_for(dir: &TempDir, dry_run: bool) -> Session {
        let mut config = Config::default().anchored_at(dir.path());
        config.format.enabled = false;
        Session::from_config(&config, dry_run).unwrap()
    }

    #[test]
    fn test_sync_all_creates_stories() {
        let dir = project();
        let session = session_for(&dir, false);

        let reports = session.sync_all().unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| matches!(r.result, Ok(SyncOutcome::Created { .. }))));
        assert!(dir.path().join("src/stories/Button.stories.tsx").exists());
        assert!(dir.path().join("src/stories/forms/Input.stories.tsx").exists());
    }

    #[test]
    fn test_sync_all_dry_run_writes_nothing() {
        let dir = project();
        let session = session_for(&dir, true);

        let reports = session.sync_all().unwrap();
        assert_eq!(reports.len(), 2);
        assert!(!reports.iter().any(EventReport::is_failure));
        assert!(!dir.path().join("src/stories").exists());
    }

    #[test]
    fn test_events_for_file_lifecycle() {
        let dir = project();
        let session = session_for(&dir, false);
        let mut classifier = session.classifier().unwrap();
        let components = dir.path().join("src/components");

        let button = components.join("Button.tsx");
        let events = session.events_for(&mut classifier, &button).unwrap();
        assert_eq!(events, vec![WatchEvent::new(EventKind::Changed, &button)]);

        let card = components.join("Card.tsx");
        fs::write(&card, "export {}\n").unwrap();
        let events = session.events_for(&mut classifier, &card).unwrap();
        assert_eq!(events, vec![WatchEvent::new(EventKind::Added, &card)]);

        fs::remove_file(&card).unwrap();
        let events = session.events_for(&mut classifier, &card).unwrap();
        assert_eq!(events, vec![WatchEvent::new(EventKind::Deleted, &card)]);
    }

    #[test]
    fn test_events_for_ignored_file() {
        let dir = project();
        let session = session_for(&dir, false);
        let mut classifier = session.classifier().unwrap();

        let test_file = dir.path().join("src/components/Button.test.tsx");
        fs::write(&test_file, "test('x', () => {});\n").unwrap();
        assert!(session
            .events_for(&mut classifier, &test_file)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_events_for_directories() {
        let dir = project();
        let session = session_for(&dir, false);
        let mut classifier = session.classifier().unwrap();
        let components = dir.path().join("src/components");

        let layout = components.join("layout");
        fs::create_dir_all(&layout).unwrap();
        fs::write(layout.join("Grid.tsx"), "export {}\n").unwrap();
        let events = session.events_for(&mut classifier, &layout).unwrap();
        assert_eq!(
            events,
            vec![WatchEvent::new(EventKind::Added, layout.join("Grid.tsx"))]
        );

        let forms = components.join("forms");
        fs::remove_dir_all(&forms).unwrap();
        let events = session.events_for(&mut classifier, &forms).unwrap();
        assert_eq!(
            events,
            vec![WatchEvent::new(EventKind::Deleted, forms.join("Input.tsx"))]
        );
    }

    #[test]
    fn test_dispatch_reports_outcome() {
        let dir = project();
        let session = session_for(&dir, false);
        let ghost = dir.path().join("src/components/Ghost.tsx");

        let report = session.dispatch(WatchEvent::new(EventKind::Deleted, &ghost));
        assert!(matches!(
            report.result,
            Ok(SyncOutcome::NothingToDelete { .. })
        ));
    }
}
