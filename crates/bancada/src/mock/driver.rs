//! Mock driver: [`PageDriver`] over the in-memory DOM.
//!
//! Two modes. Scripted: tests build the DOM by hand and assert on the
//! recorded call history. Application mode: a [`FakeApp`] owns a model,
//! re-renders the DOM after every gesture, and reacts to clicks/typing/
//! paste the way the real application would.

use crate::driver::{ElementHandle, PageDriver};
use crate::event::KeyChord;
use crate::locator::Selector;
use crate::mock::dom::MockDom;
use crate::result::{BancadaError, BancadaResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// An application model behind the mock driver.
///
/// After every gesture the driver clears the DOM and asks the app to
/// re-render, so logical elements keep their ids and transient ones
/// (editor inputs, dropdown options) appear and disappear like in a
/// live page.
pub trait FakeApp: Send {
    /// Render the current model into the DOM
    fn render(&mut self, dom: &mut MockDom);

    /// A click landed on the node with this id
    fn on_click(&mut self, target_id: &str);

    /// Text was typed into the node with this id
    fn on_type(&mut self, target_id: &str, text: &str);

    /// A key chord was dispatched to the node with this id
    fn on_key(&mut self, target_id: &str, chord: &KeyChord);

    /// A clipboard block was pasted at the node with this id
    fn on_paste(&mut self, target_id: &str, block: &str);

    /// Borrow as `Any` so tests can script the concrete model
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

#[derive(Default)]
struct Inner {
    url: String,
    dom: MockDom,
    app: Option<Box<dyn FakeApp>>,
    history: Vec<String>,
    js_results: HashMap<String, serde_json::Value>,
}

/// Mock [`PageDriver`] for unit and workflow tests
#[derive(Default)]
pub struct MockDriver {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriver").finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Create an empty mock driver (scripted mode)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock driver backed by an application model
    #[must_use]
    pub fn with_app(app: impl FakeApp + 'static) -> Self {
        let driver = Self::new();
        {
            let mut inner = driver.inner.lock().unwrap();
            let mut app: Box<dyn FakeApp> = Box::new(app);
            app.render(&mut inner.dom);
            inner.app = Some(app);
        }
        driver
    }

    /// Mutate the fake DOM directly (scripted mode)
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        f(&mut self.inner.lock().unwrap().dom)
    }

    /// Mutate the application model, then re-render
    pub fn with_app_model(&self, f: impl FnOnce(&mut dyn FakeApp)) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(mut app) = inner.app.take() {
            f(app.as_mut());
            inner.dom.clear();
            app.render(&mut inner.dom);
            inner.app = Some(app);
        }
    }

    /// Mutate the concrete application model, then re-render.
    ///
    /// # Panics
    ///
    /// Panics if the installed app is not a `T` (fixture bug).
    pub fn with_app_as<T: FakeApp + 'static>(&self, f: impl FnOnce(&mut T)) {
        self.with_app_model(|app| {
            let app = app
                .as_any_mut()
                .downcast_mut::<T>()
                .expect("mock app type mismatch");
            f(app);
        });
    }

    /// Register a canned `execute_js` result
    pub fn set_js_result(&self, script: impl Into<String>, value: serde_json::Value) {
        let _ = self
            .inner
            .lock()
            .unwrap()
            .js_results
            .insert(script.into(), value);
    }

    /// Recorded driver calls, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.inner.lock().unwrap().history.clone()
    }

    /// Number of recorded calls with the given prefix
    #[must_use]
    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, entry: String) {
        self.inner.lock().unwrap().history.push(entry);
    }

    fn require_node(inner: &Inner, element: &ElementHandle) -> BancadaResult<()> {
        if inner.dom.get(&element.id).is_some() {
            Ok(())
        } else {
            Err(BancadaError::Stale {
                handle: element.id.clone(),
            })
        }
    }

    fn rerender(inner: &mut Inner) {
        if let Some(mut app) = inner.app.take() {
            inner.dom.clear();
            app.render(&mut inner.dom);
            inner.app = Some(app);
        }
    }

    fn gesture(
        &self,
        element: &ElementHandle,
        entry: String,
        apply: impl FnOnce(&mut dyn FakeApp, &str),
    ) -> BancadaResult<()> {
        let mut inner = self.inner.lock().unwrap();
        Self::require_node(&inner, element)?;
        inner.history.push(entry);
        if let Some(mut app) = inner.app.take() {
            apply(app.as_mut(), &element.id);
            inner.app = Some(app);
            Self::rerender(&mut inner);
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> BancadaResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.history.push(format!("navigate:{url}"));
        inner.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> BancadaResult<String> {
        Ok(self.inner.lock().unwrap().url.clone())
    }

    async fn find_all(&self, selector: &Selector) -> BancadaResult<Vec<ElementHandle>> {
        let rendered = selector.to_selector();
        if selector.is_xpath() {
            return Err(BancadaError::Driver {
                message: format!("mock driver does not interpret XPath: '{rendered}'"),
            });
        }
        let mut inner = self.inner.lock().unwrap();
        inner.history.push(format!("find:{rendered}"));
        let ids = inner.dom.select(&rendered);
        Ok(ids
            .into_iter()
            .filter_map(|id| {
                inner
                    .dom
                    .get(&id)
                    .map(|n| ElementHandle::new(&n.id, &n.tag))
            })
            .collect())
    }

    async fn text(&self, element: &ElementHandle) -> BancadaResult<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .dom
            .get(&element.id)
            .map(|n| inner.dom.deep_text(n))
            .ok_or_else(|| BancadaError::Stale {
                handle: element.id.clone(),
            })
    }

    async fn classes(&self, element: &ElementHandle) -> BancadaResult<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        inner
            .dom
            .get(&element.id)
            .map(|n| n.classes.clone())
            .ok_or_else(|| BancadaError::Stale {
                handle: element.id.clone(),
            })
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> BancadaResult<Option<String>> {
        let inner = self.inner.lock().unwrap();
        inner
            .dom
            .get(&element.id)
            .map(|n| n.attributes.get(name).cloned())
            .ok_or_else(|| BancadaError::Stale {
                handle: element.id.clone(),
            })
    }

    async fn is_displayed(&self, element: &ElementHandle) -> BancadaResult<bool> {
        let inner = self.inner.lock().unwrap();
        inner
            .dom
            .get(&element.id)
            .map(|n| n.displayed)
            .ok_or_else(|| BancadaError::Stale {
                handle: element.id.clone(),
            })
    }

    async fn click(&self, element: &ElementHandle) -> BancadaResult<()> {
        self.gesture(element, format!("click:{}", element.id), |app, id| {
            app.on_click(id);
        })
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> BancadaResult<()> {
        self.gesture(
            element,
            format!("type:{}:{text}", element.id),
            |app, id| app.on_type(id, text),
        )
    }

    async fn press_key(&self, element: &ElementHandle, chord: &KeyChord) -> BancadaResult<()> {
        self.gesture(
            element,
            format!("key:{}:{}", element.id, chord.to_chord_string()),
            |app, id| app.on_key(id, chord),
        )
    }

    async fn paste(&self, element: &ElementHandle, text: &str) -> BancadaResult<()> {
        self.gesture(
            element,
            format!("paste:{}", element.id),
            |app, id| app.on_paste(id, text),
        )
    }

    async fn execute_js(&self, script: &str) -> BancadaResult<serde_json::Value> {
        let mut inner = self.inner.lock().unwrap();
        inner.history.push(format!("js:{script}"));
        Ok(inner
            .js_results
            .get(script)
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn close(&self) -> BancadaResult<()> {
        self.record("close".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::dom::MockNode;

    #[tokio::test]
    async fn test_navigate_records_and_sets_url() {
        let driver = MockDriver::new();
        driver.navigate("http://localhost/project/home").await.unwrap();
        assert_eq!(
            driver.current_url().await.unwrap(),
            "http://localhost/project/home"
        );
        assert_eq!(driver.calls_matching("navigate:"), 1);
    }

    #[tokio::test]
    async fn test_find_all_matches_dom() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| {
            dom.insert_root(MockNode::new("b1", "button").with_text("Save"));
            dom.insert_root(MockNode::new("b2", "button").with_text("Cancel"));
        });
        let all = driver
            .find_all(&Selector::css("button"))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_stale_handle_after_removal() {
        let driver = MockDriver::new();
        driver.with_dom(|dom| {
            dom.insert_root(MockNode::new("b1", "button").with_text("Save"));
        });
        let handle = ElementHandle::new("b1", "button");
        assert_eq!(driver.text(&handle).await.unwrap(), "Save");

        driver.with_dom(|dom| dom.remove("b1"));
        assert!(matches!(
            driver.text(&handle).await,
            Err(BancadaError::Stale { .. })
        ));
    }

    #[tokio::test]
    async fn test_xpath_rejected() {
        let driver = MockDriver::new();
        let result = driver.find_all(&Selector::xpath("//button")).await;
        assert!(matches!(result, Err(BancadaError::Driver { .. })));
    }

    #[tokio::test]
    async fn test_canned_js_result() {
        let driver = MockDriver::new();
        driver.set_js_result("1+1", serde_json::json!(2));
        assert_eq!(driver.execute_js("1+1").await.unwrap(), serde_json::json!(2));
        assert_eq!(driver.execute_js("other").await.unwrap(), serde_json::Value::Null);
    }
}
