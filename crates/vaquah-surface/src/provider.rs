//! TreeSurface: a [`HostSurface`] over a [`UiTree`] that applies effects to
//! an in-memory page state and records them.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use vaquah_core::surface::{
    HostSurface, InteractiveTarget, Navigation, ScrollEdge, ScrollTarget, TargetId,
};

use crate::actions::SurfaceEffect;
use crate::tree::{UiRole, UiState, UiTree};

#[derive(Debug, Default)]
struct PageState {
    effects: Vec<SurfaceEffect>,
    /// Keyed by container; `None` is the viewport.
    scroll: HashMap<Option<TargetId>, f64>,
    checked: HashSet<TargetId>,
    location: String,
    history: Vec<String>,
}

pub struct TreeSurface {
    tree: UiTree,
    viewport_height: f64,
    page: Mutex<PageState>,
}

impl TreeSurface {
    pub fn new(tree: UiTree, viewport_height: f64) -> Self {
        Self {
            tree,
            viewport_height,
            page: Mutex::new(PageState {
                location: "/".into(),
                ..Default::default()
            }),
        }
    }

    pub fn tree(&self) -> &UiTree {
        &self.tree
    }

    fn page(&self) -> MutexGuard<'_, PageState> {
        self.page.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn effects(&self) -> Vec<SurfaceEffect> {
        self.page().effects.clone()
    }

    pub fn take_effects(&self) -> Vec<SurfaceEffect> {
        std::mem::take(&mut self.page().effects)
    }

    pub fn location(&self) -> String {
        self.page().location.clone()
    }

    pub fn scroll_offset(&self, target: &ScrollTarget) -> f64 {
        self.page().scroll.get(&scroll_key(target)).copied().unwrap_or(0.0)
    }

    pub fn is_checked(&self, id: &TargetId) -> bool {
        self.page().checked.contains(id)
    }

    /// Largest scroll offset for a target; `None` if the content height is unknown.
    fn max_scroll(&self, target: &ScrollTarget) -> anyhow::Result<Option<f64>> {
        let (content, visible) = match target {
            ScrollTarget::Viewport => (self.tree.root.content_height, self.viewport_height),
            ScrollTarget::Element(id) => {
                let node = self
                    .tree
                    .find(id)
                    .ok_or_else(|| anyhow::anyhow!("no element {id}"))?;
                if !node.has_state(UiState::Scrollable) {
                    anyhow::bail!("{id} is not scrollable");
                }
                let visible = node.bounds.map(|b| b.height).unwrap_or(0.0);
                (node.content_height, visible)
            }
        };
        Ok(content.map(|c| (c - visible).max(0.0)))
    }
}

fn scroll_key(target: &ScrollTarget) -> Option<TargetId> {
    match target {
        ScrollTarget::Viewport => None,
        ScrollTarget::Element(id) => Some(id.clone()),
    }
}

impl HostSurface for TreeSurface {
    fn hit_test(&self, x: f64, y: f64) -> Option<InteractiveTarget> {
        self.tree.resolve_target(x, y)
    }

    fn scroll_container_at(&self, x: f64, y: f64) -> Option<TargetId> {
        self.tree.scroll_container_at(x, y)
    }

    fn click(&self, target: &TargetId) -> anyhow::Result<()> {
        let node = self
            .tree
            .find(target)
            .ok_or_else(|| anyhow::anyhow!("no element {target}"))?;
        if node.has_state(UiState::Disabled) {
            anyhow::bail!("{target} is disabled");
        }
        let mut page = self.page();
        page.effects.push(SurfaceEffect::Click { target: target.clone() });
        match node.role {
            UiRole::CheckBox | UiRole::RadioButton => {
                if !page.checked.remove(target) {
                    page.checked.insert(target.clone());
                }
            }
            UiRole::Link => {
                if let Some(href) = &node.href {
                    let from = std::mem::replace(&mut page.location, href.clone());
                    page.history.push(from);
                }
            }
            _ => {}
        }
        log::debug!("TreeSurface: click {target} ({})", node.role);
        Ok(())
    }

    fn scroll_by(&self, target: &ScrollTarget, dy: f64) -> anyhow::Result<()> {
        let max = self.max_scroll(target)?;
        let mut page = self.page();
        let offset = page.scroll.entry(scroll_key(target)).or_insert(0.0);
        let mut next = (*offset + dy).max(0.0);
        if let Some(max) = max {
            next = next.min(max);
        }
        *offset = next;
        page.effects.push(SurfaceEffect::ScrollBy { target: target.clone(), dy });
        Ok(())
    }

    fn scroll_to_edge(&self, target: &ScrollTarget, edge: ScrollEdge) -> anyhow::Result<()> {
        let max = self.max_scroll(target)?;
        let mut page = self.page();
        let offset = page.scroll.entry(scroll_key(target)).or_insert(0.0);
        match edge {
            ScrollEdge::Top => *offset = 0.0,
            ScrollEdge::Bottom => {
                if let Some(max) = max {
                    *offset = max;
                }
            }
        }
        page.effects.push(SurfaceEffect::ScrollToEdge { target: target.clone(), edge });
        Ok(())
    }

    fn navigate(&self, nav: &Navigation) -> anyhow::Result<()> {
        let mut page = self.page();
        match nav {
            Navigation::Path(path) => {
                let from = std::mem::replace(&mut page.location, path.clone());
                page.history.push(from);
            }
            Navigation::Back => match page.history.pop() {
                Some(prev) => page.location = prev,
                None => log::debug!("TreeSurface: back with empty history"),
            },
        }
        page.effects.push(SurfaceEffect::Navigate { to: nav.clone() });
        Ok(())
    }

    fn name(&self) -> &str {
        "tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::UiNode;

    fn surface() -> TreeSurface {
        let tree = UiTree::new(
            "t",
            UiNode::new("page", UiRole::Document, "")
                .at(0.0, 0.0, 400.0, 300.0)
                .scrollable(1_000.0)
                .with_children(vec![
                    UiNode::new("box", UiRole::CheckBox, "").at(0.0, 0.0, 20.0, 20.0),
                    UiNode::new("cart", UiRole::Link, "Cart").at(50.0, 0.0, 50.0, 20.0).with_href("/cart"),
                    UiNode::new("off", UiRole::Button, "Off")
                        .at(150.0, 0.0, 50.0, 20.0)
                        .with_state(UiState::Disabled),
                    UiNode::new("img", UiRole::Image, "").at(0.0, 100.0, 50.0, 50.0),
                ]),
        );
        TreeSurface::new(tree, 300.0)
    }

    #[test]
    fn checkbox_click_toggles() {
        let s = surface();
        let id = TargetId("box".into());
        s.click(&id).unwrap();
        assert!(s.is_checked(&id));
        s.click(&id).unwrap();
        assert!(!s.is_checked(&id));
        assert_eq!(s.effects().len(), 2);
    }

    #[test]
    fn link_click_follows_href() {
        let s = surface();
        s.click(&TargetId("cart".into())).unwrap();
        assert_eq!(s.location(), "/cart");
        s.navigate(&Navigation::Back).unwrap();
        assert_eq!(s.location(), "/");
    }

    #[test]
    fn disabled_and_missing_elements_fail() {
        let s = surface();
        assert!(s.click(&TargetId("off".into())).is_err());
        assert!(s.click(&TargetId("nope".into())).is_err());
        assert!(s.effects().is_empty());
    }

    #[test]
    fn viewport_scroll_is_clamped() {
        let s = surface();
        s.scroll_by(&ScrollTarget::Viewport, -40.0).unwrap();
        assert_eq!(s.scroll_offset(&ScrollTarget::Viewport), 0.0);
        s.scroll_by(&ScrollTarget::Viewport, 300.0).unwrap();
        s.scroll_by(&ScrollTarget::Viewport, 300.0).unwrap();
        s.scroll_by(&ScrollTarget::Viewport, 300.0).unwrap();
        assert_eq!(s.scroll_offset(&ScrollTarget::Viewport), 700.0);
        s.scroll_to_edge(&ScrollTarget::Viewport, ScrollEdge::Top).unwrap();
        assert_eq!(s.scroll_offset(&ScrollTarget::Viewport), 0.0);
        s.scroll_to_edge(&ScrollTarget::Viewport, ScrollEdge::Bottom).unwrap();
        assert_eq!(s.scroll_offset(&ScrollTarget::Viewport), 700.0);
    }

    #[test]
    fn scrolling_a_non_scrollable_element_fails() {
        let s = surface();
        let img = ScrollTarget::Element(TargetId("img".into()));
        assert!(s.scroll_by(&img, 40.0).is_err());
    }

    #[test]
    fn back_with_no_history_stays_put() {
        let s = surface();
        s.navigate(&Navigation::Back).unwrap();
        assert_eq!(s.location(), "/");
        assert_eq!(s.take_effects().len(), 1);
        assert!(s.effects().is_empty());
    }
}
