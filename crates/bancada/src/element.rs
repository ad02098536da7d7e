//! Lazy element resolution and per-page element caching.
//!
//! A [`LazyElement`] is declared at page-object construction time and
//! performs no browser round-trip until the first accessor call. Once
//! resolved, the handle is cached; if the application re-renders and
//! the handle goes stale, the next accessor transparently re-resolves
//! exactly once and replays the call. This decouples declaring expected
//! page structure from actually touching the browser.

use crate::driver::{ElementHandle, PageDriver};
use crate::event::KeyChord;
use crate::locator::Locator;
use crate::result::{BancadaError, BancadaResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Resolve all elements matching a locator, without waiting
pub async fn resolve_all(
    driver: &dyn PageDriver,
    locator: &Locator,
) -> BancadaResult<Vec<ElementHandle>> {
    driver.find_all(locator.selector()).await
}

/// Resolve exactly one element, auto-waiting within the locator's
/// timeout budget.
///
/// Returns [`BancadaError::NotFound`] if nothing matched within budget,
/// and [`BancadaError::AmbiguousMatch`] if the locator is strict and
/// more than one element matched.
pub async fn resolve_one(
    driver: &dyn PageDriver,
    locator: &Locator,
) -> BancadaResult<ElementHandle> {
    let options = locator.options();
    let start = std::time::Instant::now();
    loop {
        let matches = driver.find_all(locator.selector()).await?;
        if !matches.is_empty() {
            if options.strict && matches.len() > 1 {
                return Err(BancadaError::AmbiguousMatch {
                    selector: locator.to_selector(),
                    count: matches.len(),
                });
            }
            return matches.into_iter().next().ok_or(BancadaError::NotFound {
                selector: locator.to_selector(),
            });
        }
        if start.elapsed() >= options.timeout {
            return Err(BancadaError::NotFound {
                selector: locator.to_selector(),
            });
        }
        tokio::time::sleep(options.poll_interval).await;
    }
}

/// A handle that defers resolution to first use and survives staleness
pub struct LazyElement {
    driver: Arc<dyn PageDriver>,
    locator: Locator,
    resolved: Mutex<Option<ElementHandle>>,
}

impl std::fmt::Debug for LazyElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyElement")
            .field("locator", &self.locator.to_selector())
            .finish_non_exhaustive()
    }
}

impl LazyElement {
    /// Declare a lazy element. Performs no driver calls.
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, locator: Locator) -> Self {
        Self {
            driver,
            locator,
            resolved: Mutex::new(None),
        }
    }

    /// The locator this element resolves through
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Get the cached handle, resolving on first use
    pub async fn handle(&self) -> BancadaResult<ElementHandle> {
        let mut slot = self.resolved.lock().await;
        if let Some(ref handle) = *slot {
            return Ok(handle.clone());
        }
        let handle = resolve_one(self.driver.as_ref(), &self.locator).await?;
        debug!(selector = %self.locator, id = %handle.id, "resolved lazy element");
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Drop the cached handle so the next accessor re-resolves
    pub async fn invalidate(&self) {
        *self.resolved.lock().await = None;
    }

    /// Run an operation against the handle, re-resolving exactly once
    /// if the cached handle turns out to be stale.
    async fn with_handle<T, F, Fut>(&self, op: F) -> BancadaResult<T>
    where
        F: Fn(Arc<dyn PageDriver>, ElementHandle) -> Fut,
        Fut: std::future::Future<Output = BancadaResult<T>>,
    {
        let handle = self.handle().await?;
        match op(Arc::clone(&self.driver), handle).await {
            Err(BancadaError::Stale { .. }) => {
                debug!(selector = %self.locator, "stale handle, re-resolving");
                self.invalidate().await;
                let handle = self.handle().await?;
                op(Arc::clone(&self.driver), handle).await
            }
            other => other,
        }
    }

    /// Visible text
    pub async fn text(&self) -> BancadaResult<String> {
        self.with_handle(|d, h| async move { d.text(&h).await }).await
    }

    /// CSS classes
    pub async fn classes(&self) -> BancadaResult<Vec<String>> {
        self.with_handle(|d, h| async move { d.classes(&h).await })
            .await
    }

    /// Attribute value
    pub async fn attribute(&self, name: &str) -> BancadaResult<Option<String>> {
        let name = name.to_string();
        self.with_handle(move |d, h| {
            let name = name.clone();
            async move { d.attribute(&h, &name).await }
        })
        .await
    }

    /// Whether the element is rendered and visible
    pub async fn is_displayed(&self) -> BancadaResult<bool> {
        self.with_handle(|d, h| async move { d.is_displayed(&h).await })
            .await
    }

    /// Click the element
    pub async fn click(&self) -> BancadaResult<()> {
        self.with_handle(|d, h| async move { d.click(&h).await })
            .await
    }

    /// Type text into the element
    pub async fn type_text(&self, text: &str) -> BancadaResult<()> {
        let text = text.to_string();
        self.with_handle(move |d, h| {
            let text = text.clone();
            async move { d.type_text(&h, &text).await }
        })
        .await
    }

    /// Dispatch a key chord to the element
    pub async fn press_key(&self, chord: impl Into<KeyChord>) -> BancadaResult<()> {
        let chord = chord.into();
        self.with_handle(move |d, h| {
            let chord = chord.clone();
            async move { d.press_key(&h, &chord).await }
        })
        .await
    }

    /// Paste a clipboard block at the element
    pub async fn paste(&self, block: &str) -> BancadaResult<()> {
        let block = block.to_string();
        self.with_handle(move |d, h| {
            let block = block.clone();
            async move { d.paste(&h, &block).await }
        })
        .await
    }
}

/// Scoped store of lazily-resolved handles for one page object.
///
/// Lifetime is the owning page object; navigation clears it.
pub struct ElementCache {
    driver: Arc<dyn PageDriver>,
    elements: HashMap<String, LazyElement>,
}

impl std::fmt::Debug for ElementCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementCache")
            .field("names", &self.names())
            .finish_non_exhaustive()
    }
}

impl ElementCache {
    /// Create an empty cache bound to a driver
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            elements: HashMap::new(),
        }
    }

    /// Declare a named element. No driver calls happen here.
    pub fn register(&mut self, name: impl Into<String>, locator: Locator) {
        let element = LazyElement::new(Arc::clone(&self.driver), locator);
        let _ = self.elements.insert(name.into(), element);
    }

    /// Get a declared element by logical name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LazyElement> {
        self.elements.get(name)
    }

    /// Get a declared element, failing with a precondition error when
    /// the name was never registered
    pub fn require(&self, name: &str) -> BancadaResult<&LazyElement> {
        self.elements.get(name).ok_or_else(|| {
            BancadaError::precondition(format!("element '{name}' not declared in cache"))
        })
    }

    /// All registered logical names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.elements.keys().map(String::as_str).collect()
    }

    /// Drop every cached element (navigation invalidation)
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Number of registered elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockNode};
    use std::time::Duration;

    fn driver_with_button() -> Arc<MockDriver> {
        let driver = Arc::new(MockDriver::new());
        driver.with_dom(|dom| {
            dom.insert_root(MockNode::new("save-btn", "button").with_text("Save"));
        });
        driver
    }

    mod resolve_tests {
        use super::*;

        #[tokio::test]
        async fn test_resolve_one_finds_single_match() {
            let driver = driver_with_button();
            let handle = resolve_one(driver.as_ref(), &Locator::tag("button"))
                .await
                .unwrap();
            assert_eq!(handle.id, "save-btn");
        }

        #[tokio::test]
        async fn test_resolve_one_not_found_names_selector() {
            let driver = driver_with_button();
            let locator = Locator::tag("select").with_timeout(Duration::from_millis(20));
            let err = resolve_one(driver.as_ref(), &locator).await.unwrap_err();
            match err {
                BancadaError::NotFound { selector } => assert_eq!(selector, "select"),
                other => panic!("expected NotFound, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_strict_resolve_rejects_ambiguity() {
            let driver = driver_with_button();
            driver.with_dom(|dom| {
                dom.insert_root(MockNode::new("cancel-btn", "button").with_text("Cancel"));
            });
            let err = resolve_one(driver.as_ref(), &Locator::tag("button"))
                .await
                .unwrap_err();
            assert!(matches!(err, BancadaError::AmbiguousMatch { count: 2, .. }));
        }

        #[tokio::test]
        async fn test_non_strict_resolve_takes_first() {
            let driver = driver_with_button();
            driver.with_dom(|dom| {
                dom.insert_root(MockNode::new("cancel-btn", "button").with_text("Cancel"));
            });
            let handle = resolve_one(
                driver.as_ref(),
                &Locator::tag("button").with_strict(false),
            )
            .await
            .unwrap();
            assert_eq!(handle.id, "save-btn");
        }
    }

    mod lazy_element_tests {
        use super::*;

        #[tokio::test]
        async fn test_construction_performs_no_driver_calls() {
            let driver = driver_with_button();
            let _element = LazyElement::new(
                Arc::clone(&driver) as Arc<dyn PageDriver>,
                Locator::tag("button"),
            );
            assert!(driver.history().is_empty());
        }

        #[tokio::test]
        async fn test_first_accessor_resolves_then_caches() {
            let driver = driver_with_button();
            let element = LazyElement::new(
                Arc::clone(&driver) as Arc<dyn PageDriver>,
                Locator::tag("button"),
            );
            assert_eq!(element.text().await.unwrap(), "Save");
            assert_eq!(element.text().await.unwrap(), "Save");
            // One resolution for both accessor calls.
            assert_eq!(driver.calls_matching("find:"), 1);
        }

        #[tokio::test]
        async fn test_stale_handle_re_resolves_exactly_once() {
            let driver = driver_with_button();
            let element = LazyElement::new(
                Arc::clone(&driver) as Arc<dyn PageDriver>,
                Locator::tag("button"),
            );
            assert_eq!(element.text().await.unwrap(), "Save");

            // Application re-render: same logical button, new handle.
            driver.with_dom(|dom| {
                dom.remove("save-btn");
                dom.insert_root(MockNode::new("save-btn-2", "button").with_text("Save All"));
            });

            assert_eq!(element.text().await.unwrap(), "Save All");
            assert_eq!(driver.calls_matching("find:"), 2);
        }

        #[tokio::test]
        async fn test_click_through_lazy_element() {
            let driver = driver_with_button();
            let element = LazyElement::new(
                Arc::clone(&driver) as Arc<dyn PageDriver>,
                Locator::tag("button"),
            );
            element.click().await.unwrap();
            assert_eq!(driver.calls_matching("click:save-btn"), 1);
        }
    }

    mod element_cache_tests {
        use super::*;

        #[tokio::test]
        async fn test_register_and_get() {
            let driver = driver_with_button();
            let mut cache = ElementCache::new(Arc::clone(&driver) as Arc<dyn PageDriver>);
            cache.register("save", Locator::tag("button"));

            assert!(cache.get("save").is_some());
            assert!(cache.get("missing").is_none());
            assert_eq!(cache.len(), 1);
            // Registration alone never touches the driver.
            assert!(driver.history().is_empty());
        }

        #[tokio::test]
        async fn test_require_missing_is_precondition() {
            let driver = driver_with_button();
            let cache = ElementCache::new(Arc::clone(&driver) as Arc<dyn PageDriver>);
            let err = cache.require("save").unwrap_err();
            assert!(matches!(err, BancadaError::Precondition { .. }));
        }

        #[tokio::test]
        async fn test_clear_empties_cache() {
            let driver = driver_with_button();
            let mut cache = ElementCache::new(Arc::clone(&driver) as Arc<dyn PageDriver>);
            cache.register("save", Locator::tag("button"));
            cache.clear();
            assert!(cache.is_empty());
        }
    }
}
