//! vaquah-surface: Host surface over a UI element tree.
//!
//! Provides the element tree types with hit testing, `TreeSurface` (a
//! `HostSurface` that applies and records effects), and a mock storefront
//! page for driving the pipeline end to end.

pub mod actions;
pub mod mock_provider;
pub mod provider;
pub mod tree;

pub use actions::SurfaceEffect;
pub use mock_provider::storefront_tree;
pub use provider::TreeSurface;
pub use tree::{UiNode, UiRect, UiRole, UiState, UiTree};
