//! Phase 5: optional scaffolding.
//!
//! Each component is built at most once: its class is the "already present"
//! check, and its root carries `data-uac-generated` so the UI passes leave it
//! alone.

use crate::dom::{Listener, NodeId};
use crate::engine::{Action, Engine, EngineError, EventKind};
use crate::marker::{self, Marker};

pub const SCROLL_TOP_CLASS: &str = "uac-scroll-top";
pub const HEADER_CLASS: &str = "uac-header";
pub const NAVIGATION_CLASS: &str = "uac-navigation";
pub const SIDEBAR_CLASS: &str = "uac-sidebar";

const HEADING_SELECTOR: &str = "h1, h2, h3";
const MIN_HEADINGS: usize = 2;
const LINK_TEXT_MAX: usize = 30;

const MAIN_SELECTOR: &str = r#"main, .main, [role="main"]"#;
const SIDEBAR_OFFSET: &str = "270px";

const QUICK_LINKS: [(&str, &str); 3] = [("#top", "Home"), ("#about", "About"), ("#contact", "Contact")];

impl Engine {
    pub(in crate::engine) fn scaffold(&mut self) -> Result<(), EngineError> {
        if self.options.create_scroll_top && !self.present(SCROLL_TOP_CLASS) {
            self.create_scroll_top()?;
        }
        if self.options.create_header && !self.features.has_header && !self.present(HEADER_CLASS)
        {
            self.create_header()?;
        }
        if self.options.create_navigation
            && !self.features.has_nav
            && !self.present(NAVIGATION_CLASS)
        {
            self.create_navigation()?;
        }
        if self.options.create_sidebar
            && !self.features.has_sidebar
            && !self.present(SIDEBAR_CLASS)
        {
            self.create_sidebar()?;
        }
        Ok(())
    }

    fn present(&self, class: &str) -> bool {
        self.doc.query(self.doc.root(), &format!(".{class}")).is_some()
    }

    /// Element with a single text child.
    fn text_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<NodeId, EngineError> {
        let node = self.build(parent, tag, attrs, &[])?;
        let content = self.doc.create_text(text);
        self.doc.append_child(node, content)?;
        Ok(node)
    }

    fn create_scroll_top(&mut self) -> Result<(), EngineError> {
        let body = self.doc.body();
        let button = self.text_element(
            body,
            "button",
            &[
                ("class", SCROLL_TOP_CLASS),
                ("title", "Scroll to top"),
                ("aria-label", "Scroll to top"),
            ],
            "↑",
        )?;
        self.doc
            .add_listener(button, Listener::new(EventKind::Click, Action::ScrollToTop))?;
        marker::set(&mut self.doc, button, Marker::Generated)?;
        crate::debug!("enhance"; "scroll-to-top control added");
        Ok(())
    }

    fn create_header(&mut self) -> Result<(), EngineError> {
        let title = self
            .doc
            .title()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Website".to_string());

        let header = self.doc.create_element_with("header", &[("class", HEADER_CLASS)]);
        self.doc.set_styles(
            header,
            &[("position", "sticky"), ("top", "0"), ("z-index", "1000")],
        )?;
        marker::set(&mut self.doc, header, Marker::Generated)?;

        let bar = self.build(
            header,
            "div",
            &[],
            &[
                ("display", "flex"),
                ("justify-content", "space-between"),
                ("align-items", "center"),
            ],
        )?;
        self.text_element(bar, "div", &[("class", "uac-logo")], title.trim())?;
        let toggle = self.text_element(
            bar,
            "button",
            &[("class", "uac-menu-toggle uac-mobile-only")],
            "☰",
        )?;
        self.doc
            .add_listener(toggle, Listener::new(EventKind::Click, Action::ToggleNavigation))?;

        let body = self.doc.body();
        self.doc.prepend_child(body, header)?;
        crate::debug!("enhance"; "header added");
        Ok(())
    }

    /// Table of contents from the page headings; needs at least two.
    fn create_navigation(&mut self) -> Result<(), EngineError> {
        let headings: Vec<NodeId> = self
            .doc
            .query_all(self.doc.body(), HEADING_SELECTOR)
            .into_iter()
            .filter(|&h| !super::in_generated(&self.doc, h))
            .collect();
        if headings.len() < MIN_HEADINGS {
            return Ok(());
        }

        let nav = self.doc.create_element_with(
            "nav",
            &[("class", "uac-navigation uac-mobile-only")],
        );
        marker::set(&mut self.doc, nav, Marker::Generated)?;
        let list = self.build(
            nav,
            "ul",
            &[],
            &[("list-style", "none"), ("padding", "0"), ("margin", "0")],
        )?;

        for (index, &heading) in headings.iter().enumerate() {
            let id = self.heading_id(heading, index)?;
            let text: String = self
                .doc
                .text_content(heading)
                .trim()
                .chars()
                .take(LINK_TEXT_MAX)
                .collect();

            let item = self.build(list, "li", &[], &[])?;
            let href = format!("#{id}");
            let link = self.text_element(item, "a", &[("href", href.as_str())], &text)?;
            self.doc.add_listener(
                link,
                Listener::new(EventKind::Click, Action::ScrollToHeading { heading, nav }),
            )?;
        }

        let body = self.doc.body();
        self.doc.append_child(body, nav)?;
        crate::debug!("enhance"; "navigation added with {} links", headings.len());
        Ok(())
    }

    fn heading_id(&mut self, heading: NodeId, index: usize) -> Result<String, EngineError> {
        if let Some(id) = self.doc.attr(heading, "id").filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }
        let id = self.unique_id("uac-heading", index);
        self.doc.set_attr(heading, "id", &id)?;
        Ok(id)
    }

    fn create_sidebar(&mut self) -> Result<(), EngineError> {
        // Picked before the sidebar exists so it can never pick itself
        let main = self.main_content();

        let aside = self.doc.create_element_with(
            "aside",
            &[("class", "uac-sidebar uac-desktop-only")],
        );
        marker::set(&mut self.doc, aside, Marker::Generated)?;
        let inner = self.build(aside, "div", &[], &[("padding", "20px")])?;
        self.text_element(inner, "h3", &[], "Quick Links")?;

        let list = self.build(inner, "ul", &[], &[("list-style", "none"), ("padding", "0")])?;
        for (href, label) in QUICK_LINKS {
            let item = self.build(list, "li", &[], &[])?;
            self.text_element(item, "a", &[("href", href)], label)?;
        }

        let footer = self.build(inner, "div", &[], &[("margin-top", "20px")])?;
        let toggle =
            self.text_element(footer, "button", &[("class", "uac-theme-toggle")], "Toggle Theme")?;
        self.doc
            .add_listener(toggle, Listener::new(EventKind::Click, Action::ToggleTheme))?;

        if let Some(main) = main {
            self.doc.set_style(main, "margin-left", SIDEBAR_OFFSET)?;
        }
        let body = self.doc.body();
        self.doc.append_child(body, aside)?;
        crate::debug!("enhance"; "sidebar added");
        Ok(())
    }

    /// The main content region, or the first ordinary body child.
    fn main_content(&self) -> Option<NodeId> {
        let body = self.doc.body();
        self.doc.query(body, MAIN_SELECTOR).or_else(|| {
            self.doc.element_children(body).find(|&child| {
                self.doc.tag(child) != Some("header")
                    && !marker::has(&self.doc, child, Marker::Generated)
            })
        })
    }
}
