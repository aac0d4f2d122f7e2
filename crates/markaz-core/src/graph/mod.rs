//! Graph domain module.
//!
//! # Module Structure
//!
//! - `model`: Canonical entities (`Node`, `Link`, `GraphSnapshot`)
//! - `fragment`: Assistant-produced candidate batches (`Fragment`)
//! - `store`: The active chat's working copy (`GraphStore`)
//! - `reconciler`: The merge algorithm (`MergeReconciler`, `MergeReport`)

mod fragment;
mod model;
mod reconciler;
mod store;

pub use fragment::{Fragment, FragmentLink, FragmentNode};
pub use model::{
    DEFAULT_ICON, DEFAULT_SUMMARY, GraphSnapshot, Link, Node, ROOT_ICON, ROOT_ID, ROOT_LABEL,
    ROOT_SUMMARY, deserialize_endpoint, label_key,
};
pub use reconciler::{LinkRejection, MergeReconciler, MergeReport};
pub use store::GraphStore;
