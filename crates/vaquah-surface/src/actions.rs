//! Effects a [`TreeSurface`](crate::TreeSurface) records, in the order they were applied.

use serde::{Deserialize, Serialize};
use vaquah_core::surface::{Navigation, ScrollEdge, ScrollTarget, TargetId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEffect {
    Click { target: TargetId },
    ScrollBy { target: ScrollTarget, dy: f64 },
    ScrollToEdge { target: ScrollTarget, edge: ScrollEdge },
    Navigate { to: Navigation },
}

fn fmt_target(target: &ScrollTarget) -> String {
    match target {
        ScrollTarget::Viewport => "viewport".into(),
        ScrollTarget::Element(id) => id.to_string(),
    }
}

impl std::fmt::Display for SurfaceEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceEffect::Click { target } => write!(f, "click({target})"),
            SurfaceEffect::ScrollBy { target, dy } => {
                write!(f, "scroll_by({}, {dy})", fmt_target(target))
            }
            SurfaceEffect::ScrollToEdge { target, edge } => {
                write!(f, "scroll_to({}, {edge:?})", fmt_target(target))
            }
            SurfaceEffect::Navigate { to } => write!(f, "navigate({to})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_compact() {
        let click = SurfaceEffect::Click { target: TargetId("buy".into()) };
        assert_eq!(click.to_string(), "click(#buy)");
        let scroll = SurfaceEffect::ScrollBy {
            target: ScrollTarget::Viewport,
            dy: -40.0,
        };
        assert_eq!(scroll.to_string(), "scroll_by(viewport, -40)");
        let edge = SurfaceEffect::ScrollToEdge {
            target: ScrollTarget::Element(TargetId("list".into())),
            edge: ScrollEdge::Bottom,
        };
        assert_eq!(edge.to_string(), "scroll_to(#list, Bottom)");
        let back = SurfaceEffect::Navigate { to: Navigation::Back };
        assert_eq!(back.to_string(), "navigate(<back>)");
    }

    #[test]
    fn serializes_with_type_tag() {
        let effect = SurfaceEffect::Navigate {
            to: Navigation::Path("/cart".into()),
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["to"]["path"], "/cart");
    }
}
