//! Story artifacts: the creation template and in-place reconciliation.

pub mod reconcile;
mod render;
pub mod template;

pub use reconcile::{
    reconcile_source, ArgTypesChange, ReconcileOptions, ReconcileReport, Reconciliation,
};
pub use template::{StoryTemplate, ACTIONS_MODULE};
