//! vaquah-core: Core library for hands-free web control.
//!
//! Turns hand-landmark frames and speech transcripts into a small set of
//! canonical UI actions, and coordinates which sensor is listening. Concrete
//! host surfaces live in `vaquah-surface`; camera and speech engines plug in
//! through the adapter traits in [`sensor`].

pub mod action;
pub mod assistant;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod gesture;
pub mod landmarks;
pub mod permissions;
pub mod pipeline;
pub mod router;
pub mod sensor;
pub mod surface;
pub mod voice;
pub mod wake;

pub use action::{ActionDispatcher, CanonicalAction, DispatchExtra};
pub use assistant::{AssistantSnapshot, AssistantState, AssistantStateMachine};
pub use config::Config;
pub use pipeline::Pipeline;
pub use surface::HostSurface;
