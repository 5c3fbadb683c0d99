//! UI element tree: the page a [`TreeSurface`](crate::TreeSurface) exposes
//! to the pointer, with hit testing and interactive-target resolution.

use serde::{Deserialize, Serialize};
use vaquah_core::surface::{InteractiveTarget, TargetId, TargetKind};

/// Element role, after the subset of ARIA roles the pointer cares about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UiRole {
    Document,
    Group,
    Pane,
    Button,
    Link,
    TextInput,
    Label,
    CheckBox,
    RadioButton,
    ComboBox,
    List,
    ListItem,
    Image,
    Text,
}

impl UiRole {
    /// Kind reported to the pointer, or `None` for non-interactive roles.
    pub fn target_kind(&self) -> Option<TargetKind> {
        match self {
            UiRole::Button => Some(TargetKind::Button),
            UiRole::Link => Some(TargetKind::Link),
            UiRole::TextInput | UiRole::CheckBox | UiRole::RadioButton => Some(TargetKind::Input),
            UiRole::Label => Some(TargetKind::Label),
            UiRole::ComboBox => Some(TargetKind::Select),
            _ => None,
        }
    }

    /// Controls a label can wrap.
    pub fn is_labelable(&self) -> bool {
        matches!(
            self,
            UiRole::TextInput | UiRole::CheckBox | UiRole::RadioButton | UiRole::ComboBox
        )
    }
}

impl std::fmt::Display for UiRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).unwrap_or_default();
        write!(f, "{}", json.trim_matches('"'))
    }
}

/// Bounding rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UiRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl UiRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open: the right and bottom edges belong to the next element.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UiState {
    Disabled,
    Invisible,
    /// Content overflows and can be scrolled.
    Scrollable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiNode {
    pub id: TargetId,
    pub role: UiRole,
    #[serde(default)]
    pub name: String,
    /// No bounds means the node has no hit area of its own; its children
    /// can still be hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<UiRect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<UiState>,
    /// Link destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Scrollable content height, for scroll-to-bottom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<UiNode>,
}

impl UiNode {
    pub fn new(id: &str, role: UiRole, name: &str) -> Self {
        Self {
            id: TargetId(id.to_string()),
            role,
            name: name.to_string(),
            bounds: None,
            states: Vec::new(),
            href: None,
            content_height: None,
            children: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounds = Some(UiRect::new(x, y, width, height));
        self
    }

    pub fn with_state(mut self, state: UiState) -> Self {
        self.states.push(state);
        self
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    /// Mark scrollable with the given content height.
    pub fn scrollable(mut self, content_height: f64) -> Self {
        self.states.push(UiState::Scrollable);
        self.content_height = Some(content_height);
        self
    }

    pub fn with_children(mut self, children: Vec<UiNode>) -> Self {
        self.children = children;
        self
    }

    pub fn has_state(&self, state: UiState) -> bool {
        self.states.contains(&state)
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(UiNode::count).sum::<usize>()
    }

    fn find(&self, id: &TargetId) -> Option<&UiNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// First labelable control in document order.
    fn first_control(&self) -> Option<&UiNode> {
        self.children.iter().find_map(|c| {
            if c.role.is_labelable() && !c.has_state(UiState::Disabled) {
                Some(c)
            } else {
                c.first_control()
            }
        })
    }

    /// Push the path to the deepest node under the point. Later siblings
    /// paint on top, so they are tried first.
    fn hit_path<'a>(&'a self, x: f64, y: f64, path: &mut Vec<&'a UiNode>) -> bool {
        if self.has_state(UiState::Invisible) {
            return false;
        }
        if let Some(b) = &self.bounds {
            if !b.contains(x, y) {
                return false;
            }
        }
        path.push(self);
        if self.children.iter().rev().any(|c| c.hit_path(x, y, path)) {
            return true;
        }
        if self.bounds.is_none() {
            path.pop();
            return false;
        }
        true
    }
}

/// A page snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiTree {
    pub root: UiNode,
    #[serde(default)]
    pub title: String,
}

impl UiTree {
    pub fn new(title: &str, root: UiNode) -> Self {
        Self {
            root,
            title: title.to_string(),
        }
    }

    pub fn element_count(&self) -> usize {
        self.root.count()
    }

    pub fn find(&self, id: &TargetId) -> Option<&UiNode> {
        self.root.find(id)
    }

    /// Root-to-leaf path of the topmost node at the point; empty if nothing
    /// is there.
    pub fn hit_path(&self, x: f64, y: f64) -> Vec<&UiNode> {
        let mut path = Vec::new();
        self.root.hit_path(x, y, &mut path);
        path
    }

    /// Topmost element at the point, promoted to its nearest enabled
    /// interactive ancestor (itself included). A label reports the control
    /// it wraps.
    pub fn resolve_target(&self, x: f64, y: f64) -> Option<InteractiveTarget> {
        let path = self.hit_path(x, y);
        let hit = *path.last()?;
        let interactive = path
            .iter()
            .rev()
            .find(|n| n.role.target_kind().is_some() && !n.has_state(UiState::Disabled));

        let Some(node) = interactive else {
            return Some(InteractiveTarget {
                id: hit.id.clone(),
                kind: TargetKind::Other,
                wrapped_control: None,
            });
        };
        let wrapped_control = if node.role == UiRole::Label {
            node.first_control().map(|c| c.id.clone())
        } else {
            None
        };
        Some(InteractiveTarget {
            id: node.id.clone(),
            kind: node.role.target_kind().unwrap_or(TargetKind::Other),
            wrapped_control,
        })
    }

    /// Nearest scrollable ancestor of the topmost node at the point. The
    /// root document doesn't count; it is the viewport.
    pub fn scroll_container_at(&self, x: f64, y: f64) -> Option<TargetId> {
        self.hit_path(x, y)
            .into_iter()
            .skip(1)
            .rev()
            .find(|n| n.has_state(UiState::Scrollable))
            .map(|n| n.id.clone())
    }
}
