//! Property-based tests for storysync-cli.
//!
//! Properties tested:
//! - CLI arguments override config file values, and only when given
//! - Event classification agrees with a model of the known-file set
//! - Ignored and story files are never treated as components

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use storysync::{EventKind, SyncConfig};
use storysync_cli::{
    config::{CliArgs, Config, ConfigManager, WatchConfig},
    scanner::ComponentFilter,
    watcher::EventClassifier,
};

// =============================================================================
// Generators for property tests
// =============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,10}"
}

fn arb_cli_args() -> impl Strategy<Value = CliArgs> {
    (
        proptest::option::of("[a-z]{1,8}(/[a-z]{1,8}){0,2}"),
        proptest::option::of("[a-z]{1,8}"),
        proptest::option::of(arb_name()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(1usize..6),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(
            |(components, stories, default_story, arg_types, actions, max_depth, format)| {
                CliArgs {
                    components: components.map(PathBuf::from),
                    stories: stories.map(PathBuf::from),
                    default_story,
                    arg_types,
                    actions,
                    max_depth,
                    format,
                    ..Default::default()
                }
            },
        )
}

fn arb_file_config() -> impl Strategy<Value = Config> {
    (arb_name(), any::<bool>(), any::<bool>(), 1usize..6).prop_map(
        |(default_name, arg_types, actions, max_depth)| {
            let mut config = Config::default();
            config.story.default_name = default_name;
            config.story.arg_types = arg_types;
            config.story.actions = actions;
            config.synthesis.max_depth = max_depth;
            config
        },
    )
}

/// A sequence of (file index, exists) observations.
fn arb_observations() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((0usize..4, any::<bool>()), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_cli_args_take_precedence(file in arb_file_config(), args in arb_cli_args()) {
        let merged = ConfigManager::merge_cli_args(file.clone(), &args);

        prop_assert_eq!(
            &merged.paths.components,
            args.components.as_ref().unwrap_or(&file.paths.components)
        );
        let expected_stories = args.stories.clone().or(file.paths.stories.clone());
        prop_assert_eq!(&merged.paths.stories, &expected_stories);
        prop_assert_eq!(
            &merged.story.default_name,
            args.default_story.as_ref().unwrap_or(&file.story.default_name)
        );
        prop_assert_eq!(merged.story.arg_types, args.arg_types.unwrap_or(file.story.arg_types));
        prop_assert_eq!(merged.story.actions, args.actions.unwrap_or(file.story.actions));
        prop_assert_eq!(
            merged.synthesis.max_depth,
            args.max_depth.unwrap_or(file.synthesis.max_depth)
        );
        prop_assert_eq!(merged.format.enabled, args.format.unwrap_or(file.format.enabled));
        prop_assert!(ConfigManager::validate(&merged).is_ok());
    }

    #[test]
    fn prop_classifier_matches_model(observations in arb_observations()) {
        let paths: Vec<PathBuf> = (0..4).map(|i| PathBuf::from(format!("/c/C{i}.tsx"))).collect();
        let mut classifier = EventClassifier::default();
        let mut model: BTreeSet<usize> = BTreeSet::new();

        for (index, exists) in observations {
            let kind = classifier.classify(&paths[index], exists);
            let expected = match (exists, model.contains(&index)) {
                (true, true) => Some(EventKind::Changed),
                (true, false) => Some(EventKind::Added),
                (false, true) => Some(EventKind::Deleted),
                (false, false) => None,
            };
            prop_assert_eq!(kind, expected);

            if exists {
                model.insert(index);
            } else {
                model.remove(&index);
            }
            prop_assert_eq!(classifier.len(), model.len());
        }
    }

    #[test]
    fn prop_ignored_files_are_never_components(
        dirs in prop::collection::vec("[a-z]{1,6}", 0..3),
        name in arb_name(),
        kind in prop_oneof![Just("test"), Just("spec"), Just("stories")],
    ) {
        let config = SyncConfig {
            project_root: PathBuf::from("/app"),
            ..SyncConfig::default()
        };
        let filter = ComponentFilter::new(&config, &WatchConfig::default().ignore).unwrap();

        let mut path = config.components_root();
        for dir in &dirs {
            path.push(dir);
        }
        let component = path.join(format!("{name}.tsx"));
        let excluded = path.join(format!("{name}.{kind}.tsx"));

        prop_assert!(filter.accepts(&component));
        prop_assert!(!filter.accepts(&excluded));
        prop_assert!(!filter.accepts(&Path::new("/app/src/stories").join(format!("{name}.tsx"))), "assertion failed for name = {:?}", name);
    }
}
