//! Abstract browser-driver trait.
//!
//! `PageDriver` is the sole seam to the browser automation backend:
//! element location, gestures, keyboard input, clipboard paste, and
//! script evaluation all pass through it. Everything above this trait
//! (lazy elements, page objects, the editable grid) is
//! backend-agnostic, and the whole library is exercised in unit tests
//! through [`crate::mock::MockDriver`].

use crate::event::KeyChord;
use crate::locator::Selector;
use crate::result::BancadaResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque handle to a live UI element.
///
/// A handle is only a reference: element state (text, classes,
/// attributes) is always read back through the driver at query time, so
/// a handle can go stale when the application re-renders. Stale handles
/// surface as [`crate::result::BancadaError::Stale`] and are re-resolved
/// by [`crate::element::LazyElement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Backend-assigned element identifier
    pub id: String,
    /// Element tag name
    pub tag: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
        }
    }
}

/// Browser/session configuration for concrete drivers
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Timeout for element queries
    pub element_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            navigation_timeout: Duration::from_secs(30),
            element_timeout: Duration::from_secs(5),
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set element query timeout
    #[must_use]
    pub const fn element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }
}

/// Abstract driver trait for browser automation.
///
/// All methods take `&self`; implementations own their interior
/// mutability (channels for CDP clients, a mutex over the fake DOM for
/// the mock).
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the session to a URL
    async fn navigate(&self, url: &str) -> BancadaResult<()>;

    /// Get the current URL
    async fn current_url(&self) -> BancadaResult<String>;

    /// Find all elements matching a selector
    async fn find_all(&self, selector: &Selector) -> BancadaResult<Vec<ElementHandle>>;

    /// Read the visible text of an element
    async fn text(&self, element: &ElementHandle) -> BancadaResult<String>;

    /// Read the CSS classes of an element
    async fn classes(&self, element: &ElementHandle) -> BancadaResult<Vec<String>>;

    /// Read an attribute of an element
    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> BancadaResult<Option<String>>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> BancadaResult<bool>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> BancadaResult<()>;

    /// Type text into an element
    async fn type_text(&self, element: &ElementHandle, text: &str) -> BancadaResult<()>;

    /// Dispatch a key chord to an element
    async fn press_key(&self, element: &ElementHandle, chord: &KeyChord) -> BancadaResult<()>;

    /// Paste a clipboard block at an element.
    ///
    /// Concrete drivers map this to the platform's native paste gesture;
    /// how the application redistributes the delimited block is its own
    /// logic, observed afterwards by polling.
    async fn paste(&self, element: &ElementHandle, text: &str) -> BancadaResult<()>;

    /// Evaluate a script in the page context
    async fn execute_js(&self, script: &str) -> BancadaResult<serde_json::Value>;

    /// Close the session
    async fn close(&self) -> BancadaResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_handle_new() {
        let handle = ElementHandle::new("el-7", "td");
        assert_eq!(handle.id, "el-7");
        assert_eq!(handle.tag, "td");
    }

    #[test]
    fn test_driver_config_defaults() {
        let config = DriverConfig::default();
        assert!(config.headless);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.navigation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_driver_config_builder() {
        let config = DriverConfig::new()
            .headless(false)
            .viewport(1280, 720)
            .element_timeout(Duration::from_secs(2));
        assert!(!config.headless);
        assert_eq!(config.viewport_height, 720);
        assert_eq!(config.element_timeout, Duration::from_secs(2));
    }
}
