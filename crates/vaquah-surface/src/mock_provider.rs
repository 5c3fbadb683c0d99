//! Mock storefront page for exercising the pipeline without a browser.
//!
//! Layout, in a 1280x720 viewport:
//!
//! ```text
//! ┌ header (0..80) ── Home · Products · Cart ─────────────── [Checkout] ┐
//! │ product list (0..800, scrollable)  │ filters (840..1280)            │
//! │   [Add to cart] per item           │   [x] In stock (label)         │
//! │                                    │   search · sort                │
//! └────────────────────────────────────┴────────────────────────────────┘
//! ```

use crate::provider::TreeSurface;
use crate::tree::{UiNode, UiRole, UiState, UiTree};

pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 720.0;

fn product(n: usize) -> UiNode {
    let top = 100.0 + (n as f64 - 1.0) * 200.0;
    UiNode::new(&format!("product-{n}"), UiRole::ListItem, &format!("Product {n}"))
        .at(0.0, top, 800.0, 180.0)
        .with_children(vec![
            UiNode::new(&format!("product-{n}-image"), UiRole::Image, "").at(20.0, top + 10.0, 200.0, 160.0),
            UiNode::new(&format!("product-{n}-title"), UiRole::Text, &format!("Product {n}"))
                .at(240.0, top + 10.0, 300.0, 30.0),
            UiNode::new(&format!("add-to-cart-{n}"), UiRole::Button, "Add to cart")
                .at(600.0, top + 120.0, 160.0, 40.0)
                .with_children(vec![UiNode::new(&format!("add-to-cart-{n}-icon"), UiRole::Image, "")
                    .at(610.0, top + 128.0, 24.0, 24.0)]),
        ])
}

pub fn storefront_tree() -> UiTree {
    let header = UiNode::new("header", UiRole::Group, "Header")
        .at(0.0, 0.0, VIEWPORT_WIDTH, 80.0)
        .with_children(vec![
            UiNode::new("nav-home", UiRole::Link, "Home").at(20.0, 20.0, 100.0, 40.0).with_href("/"),
            UiNode::new("nav-products", UiRole::Link, "Products")
                .at(140.0, 20.0, 100.0, 40.0)
                .with_href("/products"),
            UiNode::new("nav-cart", UiRole::Link, "Cart").at(260.0, 20.0, 100.0, 40.0).with_href("/cart"),
            UiNode::new("checkout", UiRole::Button, "Checkout").at(1100.0, 20.0, 150.0, 40.0),
        ]);

    let products = UiNode::new("product-list", UiRole::List, "Products")
        .at(0.0, 80.0, 800.0, 640.0)
        .scrollable(2_400.0)
        .with_children((1..=3).map(product).collect());

    let filters = UiNode::new("filters", UiRole::Pane, "Filters")
        .at(840.0, 80.0, 440.0, 640.0)
        .with_children(vec![
            UiNode::new("in-stock-label", UiRole::Label, "In stock only")
                .at(860.0, 120.0, 300.0, 40.0)
                .with_children(vec![
                    UiNode::new("in-stock", UiRole::CheckBox, "").at(860.0, 125.0, 30.0, 30.0),
                    UiNode::new("in-stock-text", UiRole::Text, "In stock only").at(900.0, 120.0, 260.0, 40.0),
                ]),
            UiNode::new("search", UiRole::TextInput, "Search").at(860.0, 200.0, 380.0, 40.0),
            UiNode::new("sort", UiRole::ComboBox, "Sort by").at(860.0, 260.0, 380.0, 40.0),
            UiNode::new("sale-only", UiRole::Button, "Sale items")
                .at(860.0, 320.0, 380.0, 40.0)
                .with_state(UiState::Disabled),
        ]);

    UiTree::new(
        "Storefront",
        UiNode::new("page", UiRole::Document, "Storefront")
            .at(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .scrollable(3_000.0)
            .with_children(vec![header, products, filters]),
    )
}

impl TreeSurface {
    /// The mock storefront in the default viewport.
    pub fn storefront() -> Self {
        TreeSurface::new(storefront_tree(), VIEWPORT_HEIGHT)
    }
}
