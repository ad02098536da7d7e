//! Page objects by composition.
//!
//! A [`Page`] bundles the driver handle, the element cache, and the URL
//! match rule for one screen of the application. Concrete page objects
//! hold a `Page` and add domain methods on top; there is no inheritance
//! chain to climb when reading a test.

use crate::driver::PageDriver;
use crate::element::{ElementCache, LazyElement};
use crate::locator::Locator;
use crate::result::{BancadaError, BancadaResult};
use crate::wait::{poll_until_ok, WaitOptions};
use std::sync::Arc;
use tracing::info;

/// How a page recognizes its own URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlMatcher {
    /// URL must equal the pattern exactly
    Exact(String),
    /// URL must start with the pattern
    Prefix(String),
    /// URL must contain the pattern anywhere
    Contains(String),
    /// Any URL matches (component pages without a dedicated route)
    Any,
}

impl UrlMatcher {
    /// Check a URL against this rule
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Any => true,
        }
    }

    /// The pattern text, for diagnostics
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Exact(p) | Self::Prefix(p) | Self::Contains(p) => p,
            Self::Any => "*",
        }
    }
}

/// Contract every concrete page object fulfills
#[async_trait::async_trait]
pub trait PageObject: Send + Sync {
    /// Rule matching this page's URL
    fn url_pattern(&self) -> UrlMatcher;

    /// Short name for logs and error messages
    fn page_name(&self) -> &str;

    /// Budget for [`Self::is_loaded`] to become true, in milliseconds
    fn load_timeout_ms(&self) -> u64 {
        crate::wait::DEFAULT_WAIT_TIMEOUT_MS
    }

    /// Whether the page's readiness marker is present
    async fn is_loaded(&self) -> BancadaResult<bool>;
}

/// Shared plumbing for one screen of the application
pub struct Page {
    driver: Arc<dyn PageDriver>,
    elements: ElementCache,
    url: UrlMatcher,
    name: String,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Create a page bound to a driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, name: impl Into<String>, url: UrlMatcher) -> Self {
        let elements = ElementCache::new(Arc::clone(&driver));
        Self {
            driver,
            elements,
            url,
            name: name.into(),
        }
    }

    /// The underlying driver handle
    #[must_use]
    pub fn driver(&self) -> Arc<dyn PageDriver> {
        Arc::clone(&self.driver)
    }

    /// Page name for logs and error messages
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The URL rule this page answers to
    #[must_use]
    pub const fn url_matcher(&self) -> &UrlMatcher {
        &self.url
    }

    /// Declare a named element on this page
    pub fn register(&mut self, name: impl Into<String>, locator: Locator) {
        self.elements.register(name, locator);
    }

    /// Look up a declared element
    pub fn element(&self, name: &str) -> BancadaResult<&LazyElement> {
        self.elements.require(name)
    }

    /// Build an ad-hoc lazy element without registering it
    #[must_use]
    pub fn lazy(&self, locator: Locator) -> LazyElement {
        LazyElement::new(Arc::clone(&self.driver), locator)
    }

    /// Navigate to a URL and drop all cached handles.
    ///
    /// Every cached element belongs to the document being left, so the
    /// cache is cleared unconditionally.
    pub async fn navigate(&mut self, url: &str) -> BancadaResult<()> {
        info!(page = %self.name, %url, "navigating");
        self.elements.clear();
        self.driver.navigate(url).await
    }

    /// Current browser URL
    pub async fn current_url(&self) -> BancadaResult<String> {
        self.driver.current_url().await
    }

    /// Fail unless the current URL matches this page's rule
    pub async fn assert_on_page(&self) -> BancadaResult<()> {
        let url = self.driver.current_url().await?;
        if self.url.matches(&url) {
            Ok(())
        } else {
            Err(BancadaError::Navigation {
                url: url.clone(),
                message: format!(
                    "page '{}' expects URL matching '{}'",
                    self.name,
                    self.url.pattern()
                ),
            })
        }
    }

    /// Click the button whose visible text equals `caption`
    pub async fn click_button(&self, caption: &str) -> BancadaResult<()> {
        info!(page = %self.name, %caption, "clicking button");
        self.lazy(Locator::button_with_text(caption)).click().await
    }

    /// Wait for a readiness marker element to be displayed
    pub async fn wait_for_element(
        &self,
        locator: Locator,
        options: WaitOptions,
    ) -> BancadaResult<()> {
        let element = self.lazy(locator);
        let condition = format!(
            "page '{}' element '{}' to be displayed",
            self.name,
            element.locator()
        );
        let element = &element;
        poll_until_ok(&condition, options, move || async move {
            element.invalidate().await;
            element.is_displayed().await
        })
        .await?;
        Ok(())
    }
}

/// Navigate to a page object's screen and wait until it reports loaded
pub async fn open<P>(page_object: &P, page: &mut Page, url: &str) -> BancadaResult<()>
where
    P: PageObject,
{
    page.navigate(url).await?;
    let options = WaitOptions::new().with_timeout(page_object.load_timeout_ms());
    let condition = format!("page '{}' to finish loading", page_object.page_name());
    let page_object_ref = &*page_object;
    poll_until_ok(&condition, options, move || async move {
        page_object_ref.is_loaded().await
    })
    .await?;
    let current = page.current_url().await?;
    if page_object.url_pattern().matches(&current) {
        Ok(())
    } else {
        Err(BancadaError::Navigation {
            url: current,
            message: format!(
                "page '{}' loaded but URL does not match '{}'",
                page_object.page_name(),
                page_object.url_pattern().pattern()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockNode};

    fn page_with_form() -> (Arc<MockDriver>, Page) {
        let driver = Arc::new(MockDriver::new());
        driver.with_dom(|dom| {
            dom.insert_root(MockNode::new("save", "button").with_text("Save"));
            dom.insert_root(MockNode::new("title", "h1").with_text("Study Security"));
        });
        let page = Page::new(
            Arc::clone(&driver) as Arc<dyn PageDriver>,
            "security",
            UrlMatcher::Contains("/security".to_string()),
        );
        (driver, page)
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_exact() {
            let m = UrlMatcher::Exact("http://localhost/home".to_string());
            assert!(m.matches("http://localhost/home"));
            assert!(!m.matches("http://localhost/home?x=1"));
        }

        #[test]
        fn test_prefix_and_contains() {
            assert!(UrlMatcher::Prefix("http://localhost".to_string())
                .matches("http://localhost/any/where"));
            assert!(UrlMatcher::Contains("/security".to_string())
                .matches("http://localhost/study/security/begin"));
            assert!(!UrlMatcher::Contains("/security".to_string())
                .matches("http://localhost/study/grid"));
        }

        #[test]
        fn test_any() {
            assert!(UrlMatcher::Any.matches(""));
            assert_eq!(UrlMatcher::Any.pattern(), "*");
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_registered_element_resolves() {
            let (_driver, mut page) = page_with_form();
            page.register("save", Locator::tag("button"));
            assert_eq!(page.element("save").unwrap().text().await.unwrap(), "Save");
        }

        #[tokio::test]
        async fn test_unregistered_element_is_precondition() {
            let (_driver, page) = page_with_form();
            assert!(matches!(
                page.element("missing"),
                Err(BancadaError::Precondition { .. })
            ));
        }

        #[tokio::test]
        async fn test_navigation_clears_cache() {
            let (driver, mut page) = page_with_form();
            page.register("save", Locator::tag("button"));
            let _ = page.element("save").unwrap().text().await.unwrap();

            page.navigate("http://localhost/other").await.unwrap();
            assert!(page.element("save").is_err());
            assert_eq!(driver.calls_matching("navigate:"), 1);
        }

        #[tokio::test]
        async fn test_assert_on_page() {
            let (driver, page) = page_with_form();
            driver
                .navigate("http://localhost/study/security/begin")
                .await
                .unwrap();
            page.assert_on_page().await.unwrap();

            driver.navigate("http://localhost/elsewhere").await.unwrap();
            let err = page.assert_on_page().await.unwrap_err();
            assert!(err.to_string().contains("/security"));
        }

        #[tokio::test]
        async fn test_click_button_by_caption() {
            let (driver, page) = page_with_form();
            page.click_button("Save").await.unwrap();
            assert_eq!(driver.calls_matching("click:save"), 1);
        }

        #[tokio::test]
        async fn test_wait_for_element_times_out_with_condition() {
            let (_driver, page) = page_with_form();
            let err = page
                .wait_for_element(
                    Locator::css("div.never"),
                    WaitOptions::new().with_timeout(30).with_poll_interval(5),
                )
                .await
                .unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("div.never"));
            assert!(msg.contains("security"));
        }
    }

    mod page_object_tests {
        use super::*;

        struct SecurityPage {
            page: Page,
        }

        #[async_trait::async_trait]
        impl PageObject for SecurityPage {
            fn url_pattern(&self) -> UrlMatcher {
                UrlMatcher::Contains("/security".to_string())
            }

            fn page_name(&self) -> &str {
                "security"
            }

            fn load_timeout_ms(&self) -> u64 {
                500
            }

            async fn is_loaded(&self) -> BancadaResult<bool> {
                self.page.lazy(Locator::tag("h1")).is_displayed().await
            }
        }

        #[tokio::test]
        async fn test_open_navigates_and_waits() {
            let (driver, page) = page_with_form();
            let po = SecurityPage { page };
            let mut nav = Page::new(
                Arc::clone(&driver) as Arc<dyn PageDriver>,
                "security",
                UrlMatcher::Any,
            );
            open(&po, &mut nav, "http://localhost/study/security/begin")
                .await
                .unwrap();
            assert_eq!(driver.calls_matching("navigate:"), 1);
        }
    }
}
