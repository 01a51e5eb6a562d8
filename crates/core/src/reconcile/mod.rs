//! Reconciliation of declared intent with live state, and view diffing.

pub mod diff;
pub mod merge;

pub use diff::diff;
pub use diff::RenderedView;
pub use diff::ViewDelta;
pub use diff::ViewPatch;
pub use merge::reconcile;
