//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an immutable selector expression. Qualifiers such as
//! [`Locator::with_class`] or [`Locator::child`] never mutate: each one
//! returns a new `Locator` whose rendered expression is identical to
//! writing the combined selector by hand. Resolution against a live page
//! happens elsewhere (see [`crate::element`]); this module is pure data.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for element resolution (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for bounded waits (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "td.cell-selected")
    Css(String),
    /// XPath selector
    XPath(String),
    /// CSS selector filtered by visible text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    /// Render the combined selector expression.
    ///
    /// Text-filtered CSS renders with the `>> text=` combinator so the
    /// expression stays a single string for logging and mock keying.
    #[must_use]
    pub fn to_selector(&self) -> String {
        match self {
            Self::Css(s) | Self::XPath(s) => s.clone(),
            Self::CssWithText { css, text } => format!("{css} >> text={text}"),
        }
    }

    /// Whether this selector uses the XPath strategy
    #[must_use]
    pub const fn is_xpath(&self) -> bool {
        matches!(self, Self::XPath(_))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_selector())
    }
}

/// Locator options for resolution behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Timeout for bounded resolution waits
    pub timeout: Duration,
    /// Polling interval
    pub poll_interval: Duration,
    /// Require exactly one match (ambiguity is an error)
    pub strict: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            strict: true,
        }
    }
}

/// A composable selector expression identifying UI elements.
///
/// # Example
///
/// ```
/// use bancada::Locator;
///
/// let cell = Locator::tag("td")
///     .with_class("cell-selected")
///     .with_attribute("data-col", "Age");
/// assert_eq!(cell.to_selector(), "td.cell-selected[data-col='Age']");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    selector: Selector,
    options: LocatorOptions,
}

impl Locator {
    /// Create a locator from a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from an XPath expression
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::XPath(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Locate by tag name
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::css(tag.into())
    }

    /// Locate by element id
    #[must_use]
    pub fn id(id: impl AsRef<str>) -> Self {
        Self::css(format!("#{}", id.as_ref()))
    }

    /// Locate by `name` attribute
    #[must_use]
    pub fn name_attr(name: impl AsRef<str>) -> Self {
        Self::css(format!("[name='{}']", name.as_ref()))
    }

    /// Locate by `data-testid` attribute
    #[must_use]
    pub fn test_id(id: impl AsRef<str>) -> Self {
        Self::css(format!("[data-testid='{}']", id.as_ref()))
    }

    /// Locate a button by its visible caption
    #[must_use]
    pub fn button_with_text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::CssWithText {
            css: "button".to_string(),
            text: text.into(),
        })
    }

    // ------------------------------------------------------------------
    // Qualifiers. Each returns a new Locator; the receiver is unchanged.
    // ------------------------------------------------------------------

    /// Require an additional CSS class.
    ///
    /// XPath locators get the class predicate in XPath form.
    #[must_use]
    pub fn with_class(self, class: impl AsRef<str>) -> Self {
        let class = class.as_ref();
        let selector = match self.selector {
            Selector::Css(s) => Selector::Css(format!("{s}.{class}")),
            Selector::XPath(s) => Selector::XPath(format!(
                "{s}[contains(concat(' ', normalize-space(@class), ' '), ' {class} ')]"
            )),
            Selector::CssWithText { css, text } => Selector::CssWithText {
                css: format!("{css}.{class}"),
                text,
            },
        };
        Self { selector, ..self }
    }

    /// Require an attribute value
    #[must_use]
    pub fn with_attribute(self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (name, value) = (name.as_ref(), value.as_ref());
        let selector = match self.selector {
            Selector::Css(s) => Selector::Css(format!("{s}[{name}='{value}']")),
            Selector::XPath(s) => Selector::XPath(format!("{s}[@{name}='{value}']")),
            Selector::CssWithText { css, text } => Selector::CssWithText {
                css: format!("{css}[{name}='{value}']"),
                text,
            },
        };
        Self { selector, ..self }
    }

    /// Filter by exact visible text
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        let selector = match self.selector {
            Selector::Css(css) | Selector::CssWithText { css, .. } => {
                Selector::CssWithText { css, text }
            }
            Selector::XPath(s) => {
                Selector::XPath(format!("{s}[normalize-space()='{text}']"))
            }
        };
        Self { selector, ..self }
    }

    /// Filter by contained visible text
    #[must_use]
    pub fn containing_text(self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        let selector = match self.selector {
            Selector::Css(css) | Selector::CssWithText { css, .. } => Selector::CssWithText {
                css,
                text: text.to_string(),
            },
            Selector::XPath(s) => {
                Selector::XPath(format!("{s}[contains(normalize-space(), '{text}')]"))
            }
        };
        Self { selector, ..self }
    }

    /// Direct child relationship
    #[must_use]
    pub fn child(self, child: &Self) -> Self {
        let selector = match (&self.selector, &child.selector) {
            (Selector::XPath(a), Selector::XPath(b)) => {
                Selector::XPath(format!("{a}/{}", strip_xpath_root(b)))
            }
            (a, b) => Selector::Css(format!("{} > {}", a.to_selector(), b.to_selector())),
        };
        Self { selector, ..self }
    }

    /// Descendant relationship (any depth)
    #[must_use]
    pub fn descendant(self, descendant: &Self) -> Self {
        let selector = match (&self.selector, &descendant.selector) {
            (Selector::XPath(a), Selector::XPath(b)) => {
                Selector::XPath(format!("{a}//{}", strip_xpath_root(b)))
            }
            (a, b) => Selector::Css(format!("{} {}", a.to_selector(), b.to_selector())),
        };
        Self { selector, ..self }
    }

    /// Zero-based positional index within the match set
    #[must_use]
    pub fn index(self, index: usize) -> Self {
        let selector = match self.selector {
            Selector::Css(s) => Selector::Css(format!("{s}:nth-of-type({})", index + 1)),
            Selector::XPath(s) => Selector::XPath(format!("({s})[{}]", index + 1)),
            Selector::CssWithText { css, text } => Selector::CssWithText {
                css: format!("{css}:nth-of-type({})", index + 1),
                text,
            },
        };
        Self { selector, ..self }
    }

    /// Append a raw selector fragment
    #[must_use]
    pub fn append(self, fragment: impl AsRef<str>) -> Self {
        let fragment = fragment.as_ref();
        let selector = match self.selector {
            Selector::Css(s) => Selector::Css(format!("{s}{fragment}")),
            Selector::XPath(s) => Selector::XPath(format!("{s}{fragment}")),
            Selector::CssWithText { css, text } => Selector::CssWithText {
                css: format!("{css}{fragment}"),
                text,
            },
        };
        Self { selector, ..self }
    }

    /// Set a custom resolution timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Disable strict single-match mode (allow multiple matches)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Render the combined selector expression
    #[must_use]
    pub fn to_selector(&self) -> String {
        self.selector.to_selector()
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.selector)
    }
}

/// Drop the leading `//` or `/` so a rooted XPath can be re-anchored
/// under a parent expression.
fn strip_xpath_root(xpath: &str) -> &str {
    xpath
        .strip_prefix("//")
        .or_else(|| xpath.strip_prefix('/'))
        .unwrap_or(xpath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod composition_tests {
        use super::*;

        #[test]
        fn test_css_class_qualifier() {
            let loc = Locator::tag("td").with_class("cell-selected");
            assert_eq!(loc.to_selector(), "td.cell-selected");
        }

        #[test]
        fn test_css_attribute_qualifier() {
            let loc = Locator::tag("input").with_attribute("type", "checkbox");
            assert_eq!(loc.to_selector(), "input[type='checkbox']");
        }

        #[test]
        fn test_chained_equals_combined() {
            // Composability law: chained qualifiers render the same
            // expression as the single combined selector.
            let chained = Locator::tag("td")
                .with_class("cell-selected")
                .with_attribute("data-col", "Age");
            let combined = Locator::css("td.cell-selected[data-col='Age']");
            assert_eq!(chained.to_selector(), combined.to_selector());
        }

        #[test]
        fn test_child_combinator() {
            let row = Locator::css("tbody tr");
            let cell = Locator::tag("td");
            assert_eq!(row.child(&cell).to_selector(), "tbody tr > td");
        }

        #[test]
        fn test_descendant_combinator() {
            let grid = Locator::css("div.editable-grid");
            let input = Locator::tag("input");
            assert_eq!(grid.descendant(&input).to_selector(), "div.editable-grid input");
        }

        #[test]
        fn test_index_is_one_based_in_css() {
            let loc = Locator::css("tbody tr").index(2);
            assert_eq!(loc.to_selector(), "tbody tr:nth-of-type(3)");
        }

        #[test]
        fn test_xpath_class_predicate() {
            let loc = Locator::xpath("//td").with_class("cell-warning");
            assert!(loc.to_selector().contains("normalize-space(@class)"));
            assert!(loc.to_selector().contains("' cell-warning '"));
        }

        #[test]
        fn test_xpath_child_reanchors() {
            let table = Locator::xpath("//table");
            let row = Locator::xpath("//tr");
            assert_eq!(table.child(&row).to_selector(), "//table/tr");
        }

        #[test]
        fn test_xpath_index_wraps_expression() {
            let loc = Locator::xpath("//tr").index(0);
            assert_eq!(loc.to_selector(), "(//tr)[1]");
        }

        #[test]
        fn test_text_filter_on_css_becomes_text_combinator() {
            let loc = Locator::tag("button").with_text("Save");
            assert_eq!(loc.to_selector(), "button >> text=Save");
        }

        #[test]
        fn test_text_filter_on_xpath() {
            let loc = Locator::xpath("//button").with_text("Save");
            assert_eq!(loc.to_selector(), "//button[normalize-space()='Save']");
        }

        #[test]
        fn test_append_raw_fragment() {
            let loc = Locator::css("thead").append(" th");
            assert_eq!(loc.to_selector(), "thead th");
        }

        #[test]
        fn test_qualifier_does_not_mutate_receiver() {
            let base = Locator::tag("td");
            let _qualified = base.clone().with_class("x");
            assert_eq!(base.to_selector(), "td");
        }
    }

    mod constructor_tests {
        use super::*;

        #[test]
        fn test_id_constructor() {
            assert_eq!(Locator::id("grid-1").to_selector(), "#grid-1");
        }

        #[test]
        fn test_name_attr_constructor() {
            assert_eq!(Locator::name_attr("age").to_selector(), "[name='age']");
        }

        #[test]
        fn test_test_id_constructor() {
            assert_eq!(
                Locator::test_id("detail-table").to_selector(),
                "[data-testid='detail-table']"
            );
        }

        #[test]
        fn test_button_with_text() {
            assert_eq!(
                Locator::button_with_text("Submit").to_selector(),
                "button >> text=Submit"
            );
        }
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_default_options() {
            let opts = LocatorOptions::default();
            assert_eq!(opts.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
            assert!(opts.strict);
        }

        #[test]
        fn test_with_timeout() {
            let loc = Locator::tag("td").with_timeout(Duration::from_secs(10));
            assert_eq!(loc.options().timeout, Duration::from_secs(10));
        }

        #[test]
        fn test_with_strict() {
            let loc = Locator::tag("td").with_strict(false);
            assert!(!loc.options().strict);
        }

        #[test]
        fn test_options_survive_qualifiers() {
            let loc = Locator::tag("td")
                .with_timeout(Duration::from_secs(2))
                .with_class("x")
                .with_attribute("a", "b");
            assert_eq!(loc.options().timeout, Duration::from_secs(2));
        }
    }

    proptest! {
        /// Chained class/attribute qualifiers always render the same
        /// expression as the single combined selector.
        #[test]
        fn prop_chained_css_equals_combined(
            tag in "[a-z]{1,8}",
            class in "[a-z][a-z0-9-]{0,10}",
            attr in "[a-z][a-z0-9-]{0,10}",
            value in "[a-zA-Z0-9 ]{0,12}",
        ) {
            let chained = Locator::tag(&tag)
                .with_class(&class)
                .with_attribute(&attr, &value);
            let combined = Locator::css(format!("{tag}.{class}[{attr}='{value}']"));
            prop_assert_eq!(chained.to_selector(), combined.to_selector());
        }

        /// Qualifier order between independent attribute predicates is
        /// reflected verbatim in the rendered expression.
        #[test]
        fn prop_append_is_concatenation(
            base in "[a-z]{1,8}",
            frag in "\\.[a-z]{1,8}",
        ) {
            let appended = Locator::css(&base).append(&frag);
            prop_assert_eq!(appended.to_selector(), format!("{base}{frag}"));
        }
    }
}
