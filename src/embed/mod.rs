//! Embedded static resources.
//!
//! - `css` - the baseline style block injected into `<head>`

pub mod css {
    use std::borrow::Cow;
    use std::sync::LazyLock;

    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
    use regex::Regex;

    /// Baseline styles, as authored.
    pub const ESSENTIAL_CSS: &str = include_str!("css/essential.css");

    /// Id of the injected `<style>` element.
    pub const STYLE_ID: &str = "uac-essential-styles";

    static MINIFIED: LazyLock<String> = LazyLock::new(|| {
        minify_css(ESSENTIAL_CSS).unwrap_or_else(|| collapse_whitespace(ESSENTIAL_CSS))
    });

    /// Baseline styles, minified when requested.
    pub fn essential(minify: bool) -> Cow<'static, str> {
        if minify {
            Cow::Borrowed(MINIFIED.as_str())
        } else {
            Cow::Borrowed(ESSENTIAL_CSS)
        }
    }

    /// Minify CSS source with lightningcss.
    pub fn minify_css(source: &str) -> Option<String> {
        let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .ok()?;
        Some(result.code)
    }

    /// Fallback when the parser rejects the source.
    fn collapse_whitespace(source: &str) -> String {
        static WS: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
        WS.replace_all(source, " ").trim().to_string()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_minified_is_smaller() {
            let min = essential(true);
            assert!(min.len() < ESSENTIAL_CSS.len());
            assert!(min.contains(".uac-scroll-top"));
            assert!(!min.contains("/* uac essential styles */"));
        }

        #[test]
        fn test_unminified_is_verbatim() {
            assert_eq!(essential(false), ESSENTIAL_CSS);
        }

        #[test]
        fn test_collapse_whitespace() {
            assert_eq!(collapse_whitespace("a {\n  b: c;\n}\n"), "a { b: c; }");
        }
    }
}
