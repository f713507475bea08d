//! Integration tests for storysync.
//!
//! These tests drive the orchestrator end to end against temporary
//! projects: component in, story file out.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use storysync::{
    story::{reconcile_source, ReconcileOptions, Reconciliation},
    synth::describe_props,
    EventKind, NoopFormatter, StorySync, SyncConfig, SyncOutcome, TsOracle, TypeOracle,
    WatchEvent,
};

/// Get the path to test fixtures.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Create a temporary project with files relative to its root.
fn create_temp_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixtures_path().join(name)).unwrap()
}

fn config_for(dir: &TempDir) -> SyncConfig {
    SyncConfig {
        project_root: dir.path().to_path_buf(),
        ..SyncConfig::default()
    }
}

fn sync_for(dir: &TempDir) -> StorySync<TsOracle, NoopFormatter> {
    StorySync::new(config_for(dir), TsOracle::new(), NoopFormatter)
}

fn handle(
    sync: &StorySync<TsOracle, NoopFormatter>,
    kind: EventKind,
    path: &Path,
) -> SyncOutcome {
    sync.handle(&WatchEvent::new(kind, path)).unwrap()
}

// =============================================================================
// Lifecycle scenarios
// =============================================================================

#[test]
fn test_button_story_created_with_args_and_arg_types() {
    let dir = create_temp_project(&[("src/components/Button.tsx", &fixture("Button.tsx"))]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Button.tsx");

    let outcome = handle(&sync, EventKind::Added, &component);
    assert!(matches!(outcome, SyncOutcome::Created { props: 2, .. }));

    let story = fs::read_to_string(dir.path().join("src/stories/Button.stories.tsx")).unwrap();
    assert!(story.contains("title: \"Button\","));
    assert!(story.contains("component: Button,"));
    assert!(story.contains("tags: [\"autodocs\"],"));
    assert!(story.contains("  args: {\n    label: '',\n    onClick: () => {},\n  },"));
    assert!(story.contains("      control: 'text',"));
    assert!(story.contains("      control: false,"));
    assert!(story.contains("      description: 'Text shown on the button.',"));
}

#[test]
fn test_index_component_keeps_index_basename() {
    let dir = create_temp_project(&[(
        "src/components/forms/index.tsx",
        "export interface FormsProps { name: string }\nexport default function Forms(p: FormsProps) { return null; }\n",
    )]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/forms/index.tsx");

    handle(&sync, EventKind::Added, &component);

    let story_path = dir.path().join("src/stories/forms/index.stories.tsx");
    let story = fs::read_to_string(story_path).unwrap();
    assert!(story.contains("import Forms from \"@/components/forms\";"));
    assert!(story.contains("title: \"forms/Forms\","));
    assert!(story.contains("const meta: Meta<typeof Forms>"));
}

#[test]
fn test_delete_without_story_is_noop() {
    let dir = create_temp_project(&[]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Ghost.tsx");

    let outcome = handle(&sync, EventKind::Deleted, &component);
    assert!(matches!(outcome, SyncOutcome::NothingToDelete { .. }));
}

#[test]
fn test_changed_literal_union_becomes_select() {
    let dir = create_temp_project(&[(
        "src/components/Chip.tsx",
        "export interface ChipProps { variant: 'primary' | 'secondary' }\n",
    )]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Chip.tsx");

    let outcome = handle(&sync, EventKind::Changed, &component);
    assert!(matches!(outcome, SyncOutcome::Created { .. }));

    let story = fs::read_to_string(dir.path().join("src/stories/Chip.stories.tsx")).unwrap();
    assert!(story.contains("control: { type: 'select', options: ['primary', 'secondary'] },"));
    assert!(story.contains("type: { name: 'string', required: true },"));
}

#[test]
fn test_changed_updates_existing_story() {
    let dir = create_temp_project(&[("src/components/Button.tsx", &fixture("Button.tsx"))]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Button.tsx");
    handle(&sync, EventKind::Added, &component);

    fs::write(
        &component,
        "export interface ButtonProps { label: string; disabled?: boolean }\n",
    )
    .unwrap();
    let outcome = handle(&sync, EventKind::Changed, &component);
    assert!(matches!(outcome, SyncOutcome::Reconciled { .. }));

    let story = fs::read_to_string(dir.path().join("src/stories/Button.stories.tsx")).unwrap();
    assert!(story.contains("    disabled: false,"));
    assert!(!story.contains("onClick"));
    assert!(story.contains("type: { name: 'boolean', required: false },"));
}

#[test]
fn test_hand_written_content_survives() {
    let dir = create_temp_project(&[("src/components/Button.tsx", &fixture("Button.tsx"))]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Button.tsx");
    handle(&sync, EventKind::Added, &component);

    let story_path = dir.path().join("src/stories/Button.stories.tsx");
    let mut story = fs::read_to_string(&story_path).unwrap();
    story = story.replace("parameters: {},", "parameters: { layout: \"centered\" },");
    story.push_str("\nexport const Disabled: Story = {\n  args: { label: \"Nope\" },\n};\n");
    fs::write(&story_path, &story).unwrap();

    for _ in 0..3 {
        handle(&sync, EventKind::Changed, &component);
    }

    let after = fs::read_to_string(&story_path).unwrap();
    assert!(after.contains("parameters: { layout: \"centered\" },"));
    assert!(after.contains("export const Disabled: Story = {\n  args: { label: \"Nope\" },\n};"));
    assert_eq!(after, story);
}

#[test]
fn test_unrecognized_story_is_skipped() {
    let dir = create_temp_project(&[
        ("src/components/Button.tsx", &fixture("Button.tsx")),
        ("src/stories/Button.stories.tsx", "export const Something = 1;\n"),
    ]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Button.tsx");

    let outcome = handle(&sync, EventKind::Changed, &component);
    assert!(matches!(
        outcome,
        SyncOutcome::Skipped {
            reason: storysync::SkipReason::Unrecognized,
            ..
        }
    ));
    let story = fs::read_to_string(dir.path().join("src/stories/Button.stories.tsx")).unwrap();
    assert_eq!(story, "export const Something = 1;\n");
}

#[test]
fn test_half_edited_story_is_skipped() {
    let broken = "const meta = {\n;\nexport const Default = { args: {} };\n";
    let dir = create_temp_project(&[
        ("src/components/Button.tsx", &fixture("Button.tsx")),
        ("src/stories/Button.stories.tsx", broken),
    ]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Button.tsx");

    for kind in [EventKind::Added, EventKind::Changed] {
        let outcome = handle(&sync, kind, &component);
        assert!(matches!(
            outcome,
            SyncOutcome::Skipped {
                reason: storysync::SkipReason::Unparsable { .. },
                ..
            }
        ));
    }
    let story = fs::read_to_string(dir.path().join("src/stories/Button.stories.tsx")).unwrap();
    assert_eq!(story, broken);
}

#[test]
fn test_unreadable_component_still_gets_story() {
    let dir = create_temp_project(&[("src/components/Broken.tsx", "")]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Broken.tsx");
    fs::remove_file(&component).unwrap();

    let outcome = handle(&sync, EventKind::Added, &component);
    assert!(matches!(outcome, SyncOutcome::Created { props: 0, .. }));
    let story = fs::read_to_string(dir.path().join("src/stories/Broken.stories.tsx")).unwrap();
    assert!(story.contains("  args: {},"));
}

#[test]
fn test_arg_types_disabled_removes_existing_map() {
    let dir = create_temp_project(&[("src/components/Button.tsx", &fixture("Button.tsx"))]);
    let component = dir.path().join("src/components/Button.tsx");
    handle(&sync_for(&dir), EventKind::Added, &component);

    let config = SyncConfig {
        generate_arg_types: false,
        ..config_for(&dir)
    };
    let sync = StorySync::new(config, TsOracle::new(), NoopFormatter);
    handle(&sync, EventKind::Changed, &component);

    let story = fs::read_to_string(dir.path().join("src/stories/Button.stories.tsx")).unwrap();
    assert!(!story.contains("argTypes"));
    assert!(story.contains("    label: '',"));
}

#[test]
fn test_actions_mode() {
    let dir = create_temp_project(&[("src/components/Button.tsx", &fixture("Button.tsx"))]);
    let config = SyncConfig {
        actions: true,
        ..config_for(&dir)
    };
    let sync = StorySync::new(config, TsOracle::new(), NoopFormatter);
    handle(&sync, EventKind::Added, &dir.path().join("src/components/Button.tsx"));

    let story = fs::read_to_string(dir.path().join("src/stories/Button.stories.tsx")).unwrap();
    assert!(story.contains("import { action } from \"@storybook/addon-actions\";"));
    assert!(story.contains("    onClick: action('onClick'),"));
}

// =============================================================================
// Analysis and synthesis against fixtures
// =============================================================================

#[test]
fn test_badge_fixture_defaults() {
    let analysis = TsOracle::new().analyze(&fixtures_path().join("Badge.tsx"));
    let service = analysis.service.unwrap();
    let contract = &analysis.contracts[0];
    assert_eq!(contract.name, "BadgeProps");

    let props = describe_props(contract, &service, Default::default());
    let defaults: Vec<(&str, &str)> = props
        .iter()
        .map(|p| (p.name.as_str(), p.default_value.as_str()))
        .collect();

    assert_eq!(
        defaults,
        vec![
            ("variant", "undefined /* type: \"primary\" | \"secondary\" */"),
            ("size", "undefined /* type: Size */"),
            ("count", "0"),
            ("icon", "undefined /* ReactNode placeholder */"),
            ("tags", "['']"),
            (
                "style",
                "{ color: '', inset: { top: undefined /* Max recursion depth reached */ } }"
            ),
            ("createdAt", "undefined /* type: Date */"),
        ]
    );
}

#[test]
fn test_recursive_fixture_terminates() {
    let analysis = TsOracle::new().analyze(&fixtures_path().join("Tree.tsx"));
    let service = analysis.service.unwrap();
    let props = describe_props(&analysis.contracts[0], &service, Default::default());

    assert_eq!(props.len(), 1);
    assert!(props[0].default_value.contains("Max recursion depth reached"));
}

#[test]
fn test_reconcile_template_matches_orchestrated_creation() {
    let dir = create_temp_project(&[("src/components/Button.tsx", &fixture("Button.tsx"))]);
    let sync = sync_for(&dir);
    let component = dir.path().join("src/components/Button.tsx");
    handle(&sync, EventKind::Added, &component);
    let story = fs::read_to_string(dir.path().join("src/stories/Button.stories.tsx")).unwrap();

    let analysis = TsOracle::new().analyze(&component);
    let service = analysis.service.unwrap();
    let props = describe_props(&analysis.contracts[0], &service, Default::default());
    let options = ReconcileOptions {
        default_story: "Default",
        generate_arg_types: true,
        actions: false,
    };

    match reconcile_source(&story, &props, &options).unwrap() {
        Reconciliation::Updated { content, .. } => assert_eq!(content, story),
        other => panic!("generated story not updated: {other:?}"),
    }
}
