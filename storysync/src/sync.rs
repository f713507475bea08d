//! Event orchestration: watch events in, story files out.
//!
//! [`StorySync::handle`] processes one event to completion. An `Added`
//! event for a component that already has a story converges into the
//! `Changed` path through a direct call carrying a [`Trigger`], so it can
//! never be reordered against later events for the same path.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::formatter::Formatter;
use crate::identity::{self, DisplayName};
use crate::oracle::{select_contract, TypeOracle};
use crate::story::{
    reconcile_source, ReconcileOptions, ReconcileReport, Reconciliation, StoryTemplate,
};
use crate::synth::{describe_props, PropDescriptor, SynthOptions};
use crate::writer::{FileWriter, WriteResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of a filesystem event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Added,
    Changed,
    Deleted,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Added => write!(f, "added"),
            EventKind::Changed => write!(f, "changed"),
            EventKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// A component file event delivered by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: EventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: EventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// How the `Changed` handler was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A `Changed` event from the watcher.
    Event,
    /// An `Added` event whose story already existed.
    AddedWithStory,
}

/// Why a story was left as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The component could not be analyzed.
    NoTypeInformation,
    /// Analysis succeeded but found no props.
    NoProps,
    /// The story no longer has recognizable generated regions.
    Unrecognized,
    /// The story has syntax errors, e.g. while it is being edited.
    Unparsable { line: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoTypeInformation => write!(f, "no type information"),
            SkipReason::NoProps => write!(f, "no props extracted"),
            SkipReason::Unrecognized => write!(f, "story not recognized"),
            SkipReason::Unparsable { line } => write!(f, "story has syntax errors (line {line})"),
        }
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A new story was written.
    Created { write: WriteResult, props: usize },
    /// The generated regions of an existing story were rewritten.
    Reconciled {
        write: WriteResult,
        report: ReconcileReport,
    },
    /// Reconciliation produced the existing content byte for byte.
    Unchanged { artifact: PathBuf },
    /// The existing story was not touched.
    Skipped { artifact: PathBuf, reason: SkipReason },
    /// The story of a deleted component was removed.
    Deleted { write: WriteResult },
    /// A component was deleted that had no story.
    NothingToDelete { artifact: PathBuf },
    /// The path is not a component this session handles.
    Ignored,
}

/// Drives story creation, reconciliation and deletion.
pub struct StorySync<O, F> {
    config: SyncConfig,
    oracle: O,
    formatter: F,
    writer: FileWriter,
}

impl<O: TypeOracle, F: Formatter> StorySync<O, F> {
    /// Create an orchestrator writing to disk.
    pub fn new(config: SyncConfig, oracle: O, formatter: F) -> Self {
        Self {
            config,
            oracle,
            formatter,
            writer: FileWriter::default(),
        }
    }

    /// Use the given writer, e.g. a dry-run one.
    pub fn with_writer(mut self, writer: FileWriter) -> Self {
        self.writer = writer;
        self
    }

    /// The configuration this session runs with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether stories are only previewed, never written.
    pub fn is_dry_run(&self) -> bool {
        self.writer.is_dry_run()
    }

    /// Story path paired with a component.
    pub fn artifact_path(&self, component: &Path) -> PathBuf {
        identity::artifact_path(
            component,
            &self.config.components_root(),
            &self.config.stories_root(),
            &self.config.story_extension,
        )
    }

    /// Handle one event to completion.
    ///
    /// Degraded analysis never fails the event; only I/O errors on the story
    /// file are returned.
    pub fn handle(&self, event: &WatchEvent) -> SyncResult<SyncOutcome> {
        if !self.is_handled(&event.path) {
            tracing::debug!(path = %event.path.display(), "ignoring non-component path");
            return Ok(SyncOutcome::Ignored);
        }

        match event.kind {
            EventKind::Added => self.on_added(&event.path),
            EventKind::Changed => self.on_changed(&event.path, Trigger::Event),
            EventKind::Deleted => self.on_deleted(&event.path),
        }
    }

    fn is_handled(&self, path: &Path) -> bool {
        self.config.is_component_file(path) && !path.starts_with(self.config.stories_root())
    }

    fn on_added(&self, component: &Path) -> SyncResult<SyncOutcome> {
        tracing::info!(component = %component.display(), "Component added");
        let artifact = self.artifact_path(component);
        if artifact.exists() {
            tracing::info!(story = %artifact.display(), "Story exists, reconciling");
            return self.on_changed(component, Trigger::AddedWithStory);
        }
        self.create(component, &artifact)
    }

    fn on_changed(&self, component: &Path, trigger: Trigger) -> SyncResult<SyncOutcome> {
        if trigger == Trigger::Event {
            tracing::info!(component = %component.display(), "Component changed");
        }
        let artifact = self.artifact_path(component);
        if !artifact.exists() {
            tracing::info!(story = %artifact.display(), "No story found, creating");
            return self.create(component, &artifact);
        }
        self.update(component, &artifact, trigger)
    }

    fn on_deleted(&self, component: &Path) -> SyncResult<SyncOutcome> {
        tracing::info!(component = %component.display(), "Component deleted");
        let artifact = self.artifact_path(component);
        if !artifact.exists() {
            tracing::debug!(story = %artifact.display(), "No story to delete");
            return Ok(SyncOutcome::NothingToDelete { artifact });
        }

        let write = self.writer.delete(&artifact)?;
        tracing::info!(story = %artifact.display(), "Story deleted");
        Ok(SyncOutcome::Deleted { write })
    }

    fn create(&self, component: &Path, artifact: &Path) -> SyncResult<SyncOutcome> {
        let name = self.display_name(component);
        let import_path = identity::import_path(
            component,
            &self.config.project_root,
            &self.config.alias_root(),
            &self.config.alias.prefix,
        );
        let title = identity::story_title(component, &self.config.components_root(), &name);

        let template = StoryTemplate {
            component_name: name.as_str(),
            import_path: &import_path,
            title: &title,
            default_story: &self.config.default_story_name,
            arg_types: self.config.generate_arg_types,
            actions: self.config.actions,
        }
        .render();

        let props = self.describe(component, &name).unwrap_or_default();
        let content = if props.is_empty() {
            tracing::info!(component = %name, "No props extracted, args stay empty");
            template
        } else {
            match reconcile_source(&template, &props, &self.reconcile_options())? {
                Reconciliation::Updated { content, report } => {
                    log_diagnostics(artifact, &report);
                    content
                }
                Reconciliation::Unrecognized | Reconciliation::Unparsable { .. } => template,
            }
        };

        let write = self.writer.write(artifact, &content)?;
        tracing::info!(story = %artifact.display(), props = props.len(), "Story created");
        self.format(&write);
        Ok(SyncOutcome::Created {
            write,
            props: props.len(),
        })
    }

    fn update(
        &self,
        component: &Path,
        artifact: &Path,
        trigger: Trigger,
    ) -> SyncResult<SyncOutcome> {
        let name = self.display_name(component);
        let skipped = |reason| SyncOutcome::Skipped {
            artifact: artifact.to_path_buf(),
            reason,
        };

        let Some(props) = self.describe(component, &name) else {
            return Ok(skipped(SkipReason::NoTypeInformation));
        };
        if props.is_empty() {
            if trigger == Trigger::Event {
                tracing::info!(component = %name, "No props extracted, story left as is");
            }
            return Ok(skipped(SkipReason::NoProps));
        }

        let source =
            std::fs::read_to_string(artifact).map_err(|e| SyncError::read(artifact, e))?;
        let reconciled = reconcile_source(&source, &props, &self.reconcile_options())?;
        let (content, report) = match reconciled {
            Reconciliation::Updated { content, report } => (content, report),
            Reconciliation::Unrecognized => {
                tracing::warn!(
                    story = %artifact.display(),
                    "Could not find meta or default story, skipping"
                );
                return Ok(skipped(SkipReason::Unrecognized));
            }
            Reconciliation::Unparsable { line } => {
                tracing::warn!(
                    story = %artifact.display(),
                    line,
                    "Story has syntax errors, skipping"
                );
                return Ok(skipped(SkipReason::Unparsable { line }));
            }
        };
        log_diagnostics(artifact, &report);

        if content == source {
            tracing::debug!(story = %artifact.display(), "Story already up to date");
            return Ok(SyncOutcome::Unchanged {
                artifact: artifact.to_path_buf(),
            });
        }

        let write = self.writer.write(artifact, &content)?;
        tracing::info!(story = %artifact.display(), props = props.len(), "Story updated");
        self.format(&write);
        Ok(SyncOutcome::Reconciled { write, report })
    }

    fn display_name(&self, component: &Path) -> DisplayName {
        let name = identity::display_name(component, &self.config.components_root());
        if name.is_fallback() {
            tracing::warn!(
                component = %component.display(),
                fallback = name.as_str(),
                "Could not derive a component name"
            );
        }
        name
    }

    /// Analyze a component and synthesize its props.
    ///
    /// `None` when no type information could be produced.
    fn describe(&self, component: &Path, name: &DisplayName) -> Option<Vec<PropDescriptor>> {
        let analysis = self.oracle.analyze(component);
        let Some(service) = analysis.service else {
            tracing::warn!(component = %component.display(), "No type information available");
            return None;
        };

        let Some(contract) = select_contract(&analysis.contracts, name.as_str()) else {
            tracing::warn!(component = %component.display(), "No prop contract found");
            return Some(Vec::new());
        };
        if analysis.contracts.len() > 1 {
            tracing::debug!(contract = %contract.name, "Several prop contracts, using one");
        }

        Some(describe_props(contract, &service, self.synth_options()))
    }

    fn synth_options(&self) -> SynthOptions {
        SynthOptions {
            max_depth: self.config.max_recursion_depth,
            actions: self.config.actions,
        }
    }

    fn reconcile_options(&self) -> ReconcileOptions<'_> {
        ReconcileOptions {
            default_story: &self.config.default_story_name,
            generate_arg_types: self.config.generate_arg_types,
            actions: self.config.actions,
        }
    }

    fn format(&self, write: &WriteResult) {
        if !write.was_applied() {
            return;
        }
        if let Err(e) = self.formatter.format(write.path()) {
            tracing::warn!(story = %write.path().display(), error = %e, "Formatter failed");
        }
    }
}

fn log_diagnostics(artifact: &Path, report: &ReconcileReport) {
    for diagnostic in &report.diagnostics {
        tracing::warn!(story = %artifact.display(), "{diagnostic}");
    }
}
