//! Feature detection.
//!
//! A read-only scan producing a flat [`FeatureSnapshot`]. Every probe is a
//! selector query; an unsupported selector counts as "absent" instead of
//! failing the scan.

use serde::Serialize;

use crate::dom::{Document, NodeId};
use crate::platform::{Capabilities, CapabilityProbe};

/// Point-in-time record of what the document contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSnapshot {
    // Structure
    pub has_header: bool,
    pub has_footer: bool,
    pub has_nav: bool,
    pub has_main: bool,
    pub has_sidebar: bool,

    // Content
    pub has_images: bool,
    pub has_videos: bool,
    pub has_forms: bool,
    pub has_buttons: bool,
    pub has_tables: bool,
    pub has_lists: bool,

    // Markup conventions and libraries
    pub has_bootstrap_markup: bool,
    pub has_tailwind_markup: bool,
    pub has_jquery: bool,
    pub has_react: bool,
    pub has_vue: bool,

    // Third-party assets
    pub has_web_fonts: bool,
    pub has_font_awesome: bool,
    pub has_google_analytics: bool,
    pub has_facebook_pixel: bool,

    // Performance signals
    pub has_lazy_loadable_images: bool,
    pub has_webp: bool,

    pub image_count: usize,
    pub video_count: usize,
    pub form_count: usize,
    pub button_count: usize,
    pub table_count: usize,
    pub list_count: usize,
    pub heading_count: usize,
}

const HEADER: &str = r#"header, .header, [role="banner"]"#;
const FOOTER: &str = r#"footer, .footer, [role="contentinfo"]"#;
const NAV: &str = "nav, .nav, .navbar, .navigation";
const MAIN: &str = r#"main, .main, [role="main"]"#;
const SIDEBAR: &str = "aside, .sidebar, .side-nav";

const VIDEOS: &str = r#"video, iframe[src*="youtube"], iframe[src*="vimeo"]"#;
const BUTTONS: &str = r#"button, .btn, [role="button"]"#;
const LISTS: &str = "ul, ol";
const HEADINGS: &str = "h1, h2, h3";

const BOOTSTRAP: &str = r#"[class*="col-"], .container, .row"#;
const TAILWIND: &str = r#"[class*="bg-"], [class*="text-"], [class*="p-"], [class*="m-"]"#;

const WEB_FONTS: &str = r#"link[href*="fonts.googleapis.com"], link[href*="fonts.gstatic.com"]"#;
const FONT_AWESOME: &str = r#"link[href*="font-awesome"], link[href*="fontawesome"]"#;
const ANALYTICS: &str =
    r#"script[src*="google-analytics"], script[src*="gtag"], script[src*="googletagmanager"]"#;
const PIXEL: &str = r#"script[src*="facebook.net"]"#;

const LAZY: &str = r#"[loading="lazy"], [data-src]"#;
const WEBP: &str = r#"img[src*=".webp"], source[type="image/webp"]"#;

/// Scan `root`'s subtree. Pass `doc.root()` for the whole document.
pub fn detect(doc: &Document, root: NodeId, probe: &dyn CapabilityProbe) -> FeatureSnapshot {
    let any = |selector: &str| doc.query(root, selector).is_some();
    let count = |selector: &str| doc.count(root, selector);
    let Capabilities { jquery, react, vue } = probe.probe(doc);

    let image_count = count("img");
    let video_count = count(VIDEOS);
    let form_count = count("form");
    let button_count = count(BUTTONS);
    let table_count = count("table");
    let list_count = count(LISTS);

    FeatureSnapshot {
        has_header: any(HEADER),
        has_footer: any(FOOTER),
        has_nav: any(NAV),
        has_main: any(MAIN),
        has_sidebar: any(SIDEBAR),

        has_images: image_count > 0,
        has_videos: video_count > 0,
        has_forms: form_count > 0,
        has_buttons: button_count > 0,
        has_tables: table_count > 0,
        has_lists: list_count > 0,

        has_bootstrap_markup: any(BOOTSTRAP),
        has_tailwind_markup: any(TAILWIND),
        has_jquery: jquery,
        has_react: react,
        has_vue: vue,

        has_web_fonts: any(WEB_FONTS),
        has_font_awesome: any(FONT_AWESOME),
        has_google_analytics: any(ANALYTICS),
        has_facebook_pixel: any(PIXEL),

        has_lazy_loadable_images: any(LAZY),
        has_webp: any(WEBP),

        image_count,
        video_count,
        form_count,
        button_count,
        table_count,
        list_count,
        heading_count: count(HEADINGS),
    }
}

impl FeatureSnapshot {
    /// Boolean flags by camelCase name, in declaration order.
    pub fn flags(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("hasHeader", self.has_header),
            ("hasFooter", self.has_footer),
            ("hasNav", self.has_nav),
            ("hasMain", self.has_main),
            ("hasSidebar", self.has_sidebar),
            ("hasImages", self.has_images),
            ("hasVideos", self.has_videos),
            ("hasForms", self.has_forms),
            ("hasButtons", self.has_buttons),
            ("hasTables", self.has_tables),
            ("hasLists", self.has_lists),
            ("hasBootstrapMarkup", self.has_bootstrap_markup),
            ("hasTailwindMarkup", self.has_tailwind_markup),
            ("hasJquery", self.has_jquery),
            ("hasReact", self.has_react),
            ("hasVue", self.has_vue),
            ("hasWebFonts", self.has_web_fonts),
            ("hasFontAwesome", self.has_font_awesome),
            ("hasGoogleAnalytics", self.has_google_analytics),
            ("hasFacebookPixel", self.has_facebook_pixel),
            ("hasLazyLoadableImages", self.has_lazy_loadable_images),
            ("hasWebp", self.has_webp),
        ]
    }

    /// Number of flags that are set.
    pub fn detected(&self) -> usize {
        self.flags().iter().filter(|(_, on)| *on).count()
    }
}
