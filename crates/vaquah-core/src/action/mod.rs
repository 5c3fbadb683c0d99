//! Canonical actions and the dispatcher that turns them into host-surface effects.
//!
//! Every input modality (gesture, voice, manual UI controls) converges onto a
//! [`CanonicalAction`] before any effect is applied. Adding a capability means
//! adding a variant here and a route in [`ActionDispatcher::dispatch`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{DispatchConfig, RoutesConfig};
use crate::surface::{HostSurface, Navigation, ScrollEdge, ScrollTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalAction {
    NavigateHome,
    NavigateCart,
    NavigateCheckout,
    NavigateProducts,
    NavigateBack,
    ScrollUp,
    ScrollDown,
    ScrollTop,
    ScrollBottom,
    OpenAssistant,
    CloseAssistant,
}

impl CanonicalAction {
    pub const ALL: [CanonicalAction; 11] = [
        CanonicalAction::NavigateHome,
        CanonicalAction::NavigateCart,
        CanonicalAction::NavigateCheckout,
        CanonicalAction::NavigateProducts,
        CanonicalAction::NavigateBack,
        CanonicalAction::ScrollUp,
        CanonicalAction::ScrollDown,
        CanonicalAction::ScrollTop,
        CanonicalAction::ScrollBottom,
        CanonicalAction::OpenAssistant,
        CanonicalAction::CloseAssistant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NavigateHome => "NAVIGATE_HOME",
            Self::NavigateCart => "NAVIGATE_CART",
            Self::NavigateCheckout => "NAVIGATE_CHECKOUT",
            Self::NavigateProducts => "NAVIGATE_PRODUCTS",
            Self::NavigateBack => "NAVIGATE_BACK",
            Self::ScrollUp => "SCROLL_UP",
            Self::ScrollDown => "SCROLL_DOWN",
            Self::ScrollTop => "SCROLL_TOP",
            Self::ScrollBottom => "SCROLL_BOTTOM",
            Self::OpenAssistant => "OPEN_ASSISTANT",
            Self::CloseAssistant => "CLOSE_ASSISTANT",
        }
    }
}

impl std::fmt::Display for CanonicalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalAction {
    type Err = anyhow::Error;

    /// Accepts `NAVIGATE_CART`, `navigate_cart` and `navigate-cart`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("unknown action: {s:?}"))
    }
}

/// Optional per-call overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchExtra {
    /// Scroll distance in pixels, replacing the configured step.
    pub scroll_amount: Option<f64>,
    /// Scroll this element instead of the viewport.
    pub scroll_target: Option<ScrollTarget>,
}

/// Maps each canonical action to exactly one effect.
pub struct ActionDispatcher {
    routes: RoutesConfig,
    scroll_step: f64,
}

impl ActionDispatcher {
    pub fn from_config(cfg: &DispatchConfig) -> Self {
        Self {
            routes: cfg.routes.clone(),
            scroll_step: cfg.scroll_step_px,
        }
    }

    /// Navigation an action maps to, if it is a navigation action.
    pub fn route_for(&self, action: CanonicalAction) -> Option<Navigation> {
        match action {
            CanonicalAction::NavigateHome => Some(Navigation::Path(self.routes.home.clone())),
            CanonicalAction::NavigateCart => Some(Navigation::Path(self.routes.cart.clone())),
            CanonicalAction::NavigateCheckout => {
                Some(Navigation::Path(self.routes.checkout.clone()))
            }
            CanonicalAction::NavigateProducts => {
                Some(Navigation::Path(self.routes.products.clone()))
            }
            CanonicalAction::NavigateBack => Some(Navigation::Back),
            _ => None,
        }
    }

    /// Apply `action`. Navigation goes through `navigate`; scrolling goes to
    /// `surface`. Assistant open/close are no-ops here; the caller owns
    /// those state transitions. Surface failures are logged, never returned.
    pub fn dispatch(
        &self,
        action: CanonicalAction,
        surface: &dyn HostSurface,
        navigate: &mut dyn FnMut(Navigation),
        extra: Option<&DispatchExtra>,
    ) {
        log::info!("Dispatch: {action}");

        if let Some(nav) = self.route_for(action) {
            navigate(nav);
            return;
        }

        let target = extra
            .and_then(|e| e.scroll_target.clone())
            .unwrap_or(ScrollTarget::Viewport);
        let amount = extra.and_then(|e| e.scroll_amount).unwrap_or(self.scroll_step);

        let result = match action {
            CanonicalAction::ScrollUp => surface.scroll_by(&target, -amount),
            CanonicalAction::ScrollDown => surface.scroll_by(&target, amount),
            CanonicalAction::ScrollTop => surface.scroll_to_edge(&target, ScrollEdge::Top),
            CanonicalAction::ScrollBottom => surface.scroll_to_edge(&target, ScrollEdge::Bottom),
            CanonicalAction::OpenAssistant | CanonicalAction::CloseAssistant => {
                log::debug!("Dispatch: {action} has no surface effect");
                Ok(())
            }
            // Navigation variants returned above.
            _ => Ok(()),
        };

        if let Err(e) = result {
            log::warn!("Dispatch: {action} failed on {}: {e:#}", surface.name());
        }
    }

    /// Resolve a textual action name. Unknown names are logged and yield
    /// `None`, so nothing is dispatched for them.
    pub fn resolve_named(name: &str) -> Option<CanonicalAction> {
        match name.parse::<CanonicalAction>() {
            Ok(action) => Some(action),
            Err(e) => {
                log::warn!("Dispatch: ignoring {e}");
                None
            }
        }
    }
}

/// Navigation callback that forwards to the surface's own `navigate`.
pub fn surface_navigator(surface: &dyn HostSurface) -> impl FnMut(Navigation) + '_ {
    move |nav: Navigation| {
        if let Err(e) = surface.navigate(&nav) {
            log::warn!("Navigation to {nav} failed on {}: {e:#}", surface.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::surface::{InteractiveTarget, TargetId};

    #[derive(Default)]
    struct StubSurface {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl StubSurface {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HostSurface for StubSurface {
        fn hit_test(&self, _x: f64, _y: f64) -> Option<InteractiveTarget> {
            None
        }
        fn click(&self, target: &TargetId) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(format!("click {target}"));
            Ok(())
        }
        fn scroll_by(&self, target: &ScrollTarget, dy: f64) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("surface gone");
            }
            self.calls.lock().unwrap().push(format!("scroll_by {target:?} {dy}"));
            Ok(())
        }
        fn scroll_to_edge(&self, target: &ScrollTarget, edge: ScrollEdge) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(format!("scroll_to {target:?} {edge:?}"));
            Ok(())
        }
        fn navigate(&self, nav: &Navigation) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(format!("navigate {nav}"));
            Ok(())
        }
        fn name(&self) -> &str {
            "stub"
        }
    }

    fn dispatcher() -> ActionDispatcher {
        ActionDispatcher::from_config(&DispatchConfig::default())
    }

    #[test]
    fn action_names_roundtrip_through_from_str() {
        for action in CanonicalAction::ALL {
            assert_eq!(action.as_str().parse::<CanonicalAction>().unwrap(), action);
        }
        assert_eq!("navigate-cart".parse::<CanonicalAction>().unwrap(), CanonicalAction::NavigateCart);
        assert!("LAUNCH_ROCKET".parse::<CanonicalAction>().is_err());
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&CanonicalAction::ScrollBottom).unwrap();
        assert_eq!(json, "\"SCROLL_BOTTOM\"");
    }

    #[test]
    fn navigation_actions_call_navigate_only() {
        let surface = StubSurface::default();
        let mut navs = Vec::new();
        let d = dispatcher();
        d.dispatch(CanonicalAction::NavigateCheckout, &surface, &mut |n| navs.push(n), None);
        d.dispatch(CanonicalAction::NavigateBack, &surface, &mut |n| navs.push(n), None);
        assert_eq!(navs, vec![Navigation::Path("/checkout".into()), Navigation::Back]);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn scroll_actions_hit_viewport_with_configured_step() {
        let surface = StubSurface::default();
        let d = dispatcher();
        let mut nav = |_n: Navigation| panic!("scroll must not navigate");
        d.dispatch(CanonicalAction::ScrollUp, &surface, &mut nav, None);
        d.dispatch(CanonicalAction::ScrollDown, &surface, &mut nav, None);
        d.dispatch(CanonicalAction::ScrollTop, &surface, &mut nav, None);
        d.dispatch(CanonicalAction::ScrollBottom, &surface, &mut nav, None);
        assert_eq!(
            surface.calls(),
            vec![
                "scroll_by Viewport -300",
                "scroll_by Viewport 300",
                "scroll_to Viewport Top",
                "scroll_to Viewport Bottom",
            ]
        );
    }

    #[test]
    fn extra_overrides_scroll_amount_and_target() {
        let surface = StubSurface::default();
        let extra = DispatchExtra {
            scroll_amount: Some(40.0),
            scroll_target: Some(ScrollTarget::Element(TargetId("9".into()))),
        };
        dispatcher().dispatch(CanonicalAction::ScrollDown, &surface, &mut |_| {}, Some(&extra));
        assert_eq!(surface.calls(), vec!["scroll_by Element(TargetId(\"9\")) 40"]);
    }

    #[test]
    fn assistant_actions_are_noops() {
        let surface = StubSurface::default();
        let mut navs = Vec::new();
        let d = dispatcher();
        d.dispatch(CanonicalAction::OpenAssistant, &surface, &mut |n| navs.push(n), None);
        d.dispatch(CanonicalAction::CloseAssistant, &surface, &mut |n| navs.push(n), None);
        assert!(navs.is_empty());
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn unknown_name_is_ignored() {
        assert_eq!(ActionDispatcher::resolve_named("TELEPORT"), None);
        assert_eq!(ActionDispatcher::resolve_named(""), None);
    }

    #[test]
    fn known_name_resolves() {
        assert_eq!(
            ActionDispatcher::resolve_named("NAVIGATE_CART"),
            Some(CanonicalAction::NavigateCart)
        );
    }

    #[test]
    fn surface_failure_does_not_panic() {
        let surface = StubSurface { fail: true, ..Default::default() };
        dispatcher().dispatch(CanonicalAction::ScrollDown, &surface, &mut |_| {}, None);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn surface_navigator_forwards_to_surface() {
        let surface = StubSurface::default();
        let mut nav = surface_navigator(&surface);
        dispatcher().dispatch(CanonicalAction::NavigateHome, &surface, &mut nav, None);
        drop(nav);
        assert_eq!(surface.calls(), vec!["navigate /"]);
    }
}
