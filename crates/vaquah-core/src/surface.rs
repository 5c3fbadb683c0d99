//! HostSurface trait: the UI substrate that receives synthesized effects.
//!
//! Concrete implementations live outside this crate (see `vaquah-surface`).
//! The core never assumes a particular element tree; it only needs to resolve
//! a target from viewport coordinates and invoke effects on it.

use serde::{Deserialize, Serialize};

/// Pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

/// Opaque handle to an element on the host surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub String);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of interactive element a hit test resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Button,
    Link,
    Input,
    Label,
    Select,
    /// Nothing interactive above the hit element; the literal hit element.
    Other,
}

/// Result of resolving the topmost interactive element at a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveTarget {
    pub id: TargetId,
    pub kind: TargetKind,
    /// Set when the target is a label wrapping an input: clicking the label
    /// must also activate this control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped_control: Option<TargetId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTarget {
    Viewport,
    Element(TargetId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollEdge {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Path(String),
    /// History back (`-1`).
    Back,
}

impl std::fmt::Display for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Navigation::Path(p) => write!(f, "{p}"),
            Navigation::Back => write!(f, "<back>"),
        }
    }
}

/// Host surface adapter consumed by the gesture controller and the dispatcher.
pub trait HostSurface: Send + Sync {
    /// Resolve the topmost interactive target at viewport coordinates,
    /// preferring an interactive ancestor over the literal hit element.
    fn hit_test(&self, x: f64, y: f64) -> Option<InteractiveTarget>;

    /// Nearest scrollable container under the point, if any.
    fn scroll_container_at(&self, _x: f64, _y: f64) -> Option<TargetId> {
        None
    }

    fn click(&self, target: &TargetId) -> anyhow::Result<()>;

    fn scroll_by(&self, target: &ScrollTarget, dy: f64) -> anyhow::Result<()>;

    fn scroll_to_edge(&self, target: &ScrollTarget, edge: ScrollEdge) -> anyhow::Result<()>;

    fn navigate(&self, nav: &Navigation) -> anyhow::Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Lets the host keep a handle on a surface it gave to the pipeline.
impl<T: HostSurface + ?Sized> HostSurface for std::sync::Arc<T> {
    fn hit_test(&self, x: f64, y: f64) -> Option<InteractiveTarget> {
        (**self).hit_test(x, y)
    }
    fn scroll_container_at(&self, x: f64, y: f64) -> Option<TargetId> {
        (**self).scroll_container_at(x, y)
    }
    fn click(&self, target: &TargetId) -> anyhow::Result<()> {
        (**self).click(target)
    }
    fn scroll_by(&self, target: &ScrollTarget, dy: f64) -> anyhow::Result<()> {
        (**self).scroll_by(target, dy)
    }
    fn scroll_to_edge(&self, target: &ScrollTarget, edge: ScrollEdge) -> anyhow::Result<()> {
        (**self).scroll_to_edge(target, edge)
    }
    fn navigate(&self, nav: &Navigation) -> anyhow::Result<()> {
        (**self).navigate(nav)
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
