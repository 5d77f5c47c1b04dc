//! In-memory [`Driver`] for exercising helpers and page objects without a browser.
//!
//! A [`FakePage`] maps selectors to [`FakeElement`]s and records every action it receives.
//! It understands just enough form behaviour for page-object tests: inputs hold values,
//! and clicking a submit element copies linked input values into receipt elements.
//!
//! ```
//! use pagewright::testing::{FakeElement, FakePage};
//! use pagewright::{HelperConfig, InteractionHelper};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pagewright::Result<()> {
//! let page = FakePage::new().with("#title", FakeElement::text("Welcome"));
//! let helper = InteractionHelper::new(&page, HelperConfig::with_timeout_ms(50));
//! assert_eq!(helper.get_element_text("#title", None).await?, "Welcome");
//! # Ok(())
//! # }
//! ```

use crate::driver::{Driver, ElementState};
use crate::locator::{Element, Scope, Selector};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Bytes returned by [`FakePage`] screenshots: the PNG signature.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

/// One element (or group of identical matches) on a [`FakePage`].
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub count: usize,
    pub state: ElementState,
    pub value: Option<String>,
    pub text: Option<String>,
    pub editable: bool,
    /// Accepts fills but keeps its old value.
    pub drops_input: bool,
    pub submits: bool,
    /// Number of `count` calls that report no match before the element appears.
    pub appears_after: usize,
}

impl FakeElement {
    fn visible() -> Self {
        Self {
            count: 1,
            state: ElementState {
                visible: true,
                enabled: true,
                in_viewport: true,
                ..Default::default()
            },
            value: None,
            text: None,
            editable: false,
            drops_input: false,
            submits: false,
            appears_after: 0,
        }
    }

    /// An empty text input.
    pub fn input() -> Self {
        Self {
            value: Some(String::new()),
            editable: true,
            ..Self::visible()
        }
    }

    /// A static element with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::visible()
        }
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::text(label)
    }

    /// A button that submits the page's linked inputs.
    pub fn submit(label: impl Into<String>) -> Self {
        Self {
            submits: true,
            ..Self::text(label)
        }
    }

    pub fn matches(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn invisible(mut self) -> Self {
        self.state.visible = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.state.hidden = true;
        self
    }

    /// `disabled` property set, so neither enabled nor `:disabled`-free.
    pub fn disabled(mut self) -> Self {
        self.state.enabled = false;
        self.state.disabled = true;
        self
    }

    /// `aria-disabled` only: enabled, but still disabled.
    pub fn aria_disabled(mut self) -> Self {
        self.state.disabled = true;
        self
    }

    pub fn focused(mut self) -> Self {
        self.state.focused = true;
        self
    }

    pub fn out_of_view(mut self) -> Self {
        self.state.in_viewport = false;
        self
    }

    pub fn drops_input(mut self) -> Self {
        self.drops_input = true;
        self
    }

    pub fn appears_after(mut self, polls: usize) -> Self {
        self.appears_after = polls;
        self
    }
}

/// An action a [`FakePage`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeAction {
    Focus(String),
    Fill(String, String),
    Click(String),
    Press(String, String),
    Keyboard(String),
    Scroll(String),
    Goto(String),
    Screenshot,
}

#[derive(Debug, Default)]
struct Dom {
    elements: HashMap<String, FakeElement>,
    /// (input, receipt, label) links applied on submit.
    receipts: Vec<(String, String, String)>,
    url: String,
    redirect: Option<String>,
    actions: Vec<FakeAction>,
}

/// A scripted page. Selectors are keyed by their display form, so frame elements are
/// registered with [`with_in_frame`](Self::with_in_frame).
#[derive(Debug, Default)]
pub struct FakePage {
    dom: Mutex<Dom>,
}

fn key(selector: &str, scope: Scope) -> String {
    Element::new(Selector::parse(selector), scope).to_string()
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, selector: &str, element: FakeElement) -> Self {
        self.lock().elements.insert(key(selector, Scope::Page), element);
        self
    }

    pub fn with_in_frame(self, frame: &str, selector: &str, element: FakeElement) -> Self {
        self.lock()
            .elements
            .insert(key(selector, Scope::frame(frame)), element);
        self
    }

    /// On submit, set the receipt's text to `label` followed by the input's value.
    pub fn with_receipt(self, input: &str, receipt: &str, label: &str) -> Self {
        self.lock().receipts.push((
            key(input, Scope::Page),
            key(receipt, Scope::Page),
            label.to_string(),
        ));
        self
    }

    /// Navigations end at `url` regardless of the requested address.
    pub fn redirect_to(self, url: &str) -> Self {
        self.lock().redirect = Some(url.to_string());
        self
    }

    pub fn actions(&self) -> Vec<FakeAction> {
        self.lock().actions.clone()
    }

    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.lock()
            .elements
            .get(&key(selector, Scope::Page))
            .and_then(|e| e.value.clone())
    }

    pub fn text_of(&self, selector: &str) -> Option<String> {
        self.lock()
            .elements
            .get(&key(selector, Scope::Page))
            .and_then(|e| e.text.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Dom> {
        self.dom.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` on the single match of `element`, or fail like a stale handle.
    fn with_single<T>(
        &self,
        element: &Element,
        f: impl FnOnce(&mut FakeElement) -> Result<T>,
    ) -> Result<T> {
        let mut dom = self.lock();
        let selector = element.to_string();
        match dom.elements.get_mut(&selector) {
            Some(found) if found.count == 1 && found.appears_after == 0 => f(found),
            Some(found) => Err(Error::NotFound {
                selector,
                count: if found.appears_after > 0 { 0 } else { found.count },
            }),
            None => Err(Error::NotFound { selector, count: 0 }),
        }
    }

    fn record(&self, action: FakeAction) {
        self.lock().actions.push(action);
    }
}

impl Driver for FakePage {
    async fn count(&self, element: &Element) -> Result<usize> {
        let mut dom = self.lock();
        Ok(match dom.elements.get_mut(&element.to_string()) {
            Some(found) if found.appears_after > 0 => {
                found.appears_after -= 1;
                0
            }
            Some(found) => found.count,
            None => 0,
        })
    }

    async fn state(&self, element: &Element) -> Result<ElementState> {
        self.with_single(element, |e| Ok(e.state))
    }

    async fn focus(&self, element: &Element) -> Result<()> {
        self.with_single(element, |e| {
            e.state.focused = true;
            Ok(())
        })?;
        let target = element.to_string();
        let mut dom = self.lock();
        for (selector, other) in dom.elements.iter_mut() {
            if *selector != target {
                other.state.focused = false;
            }
        }
        dom.actions.push(FakeAction::Focus(target));
        Ok(())
    }

    async fn fill(&self, element: &Element, text: &str) -> Result<()> {
        self.with_single(element, |e| {
            if !e.editable {
                return Err(Error::Script(format!(
                    "element {} does not accept text input",
                    element
                )));
            }
            if !e.drops_input {
                e.value = Some(text.to_string());
            }
            Ok(())
        })?;
        self.record(FakeAction::Fill(element.to_string(), text.to_string()));
        Ok(())
    }

    async fn input_value(&self, element: &Element) -> Result<Option<String>> {
        self.with_single(element, |e| Ok(e.value.clone()))
    }

    async fn text_content(&self, element: &Element) -> Result<Option<String>> {
        self.with_single(element, |e| Ok(e.text.clone()))
    }

    async fn click(&self, element: &Element) -> Result<()> {
        let submits = self.with_single(element, |e| Ok(e.submits))?;
        let mut dom = self.lock();
        dom.actions.push(FakeAction::Click(element.to_string()));
        if submits {
            let receipts = dom.receipts.clone();
            for (input, receipt, label) in receipts {
                let value = dom
                    .elements
                    .get(&input)
                    .and_then(|e| e.value.clone())
                    .unwrap_or_default();
                dom.elements
                    .insert(receipt, FakeElement::text(format!("{}{}", label, value)));
            }
        }
        Ok(())
    }

    async fn press(&self, element: &Element, keys: &str) -> Result<()> {
        self.with_single(element, |_| Ok(()))?;
        self.record(FakeAction::Press(element.to_string(), keys.to_string()));
        Ok(())
    }

    async fn scroll_into_view_if_needed(&self, element: &Element) -> Result<bool> {
        let scrolled = self.with_single(element, |e| {
            let needed = !e.state.in_viewport;
            e.state.in_viewport = true;
            Ok(needed)
        })?;
        if scrolled {
            self.record(FakeAction::Scroll(element.to_string()));
        }
        Ok(scrolled)
    }

    async fn keyboard_press(&self, keys: &str) -> Result<()> {
        self.record(FakeAction::Keyboard(keys.to_string()));
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let mut dom = self.lock();
        dom.actions.push(FakeAction::Goto(url.to_string()));
        dom.url = dom.redirect.clone().unwrap_or_else(|| url.to_string());
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.lock().url.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.record(FakeAction::Screenshot);
        Ok(FAKE_PNG.to_vec())
    }
}
