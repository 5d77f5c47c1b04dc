//! Locators, resolved elements and resolution scopes.
//!
//! A [`Locator`] is what callers pass around: either a raw selector string or an
//! [`Element`] that has already been bound to a [`Scope`]. Helpers resolve a locator once
//! per operation and use the resulting element for every check and action that follows.

use std::fmt;

/// Quote a string as a JavaScript string literal.
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Selector syntax understood by the browser driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector, evaluated with `querySelectorAll`.
    Css(String),
    /// XPath expression, evaluated with `document.evaluate`.
    XPath(String),
}

impl Selector {
    /// Classify a raw selector string.
    ///
    /// `xpath=` and `css=` prefixes force the syntax. Otherwise strings starting with
    /// `//`, `..` or `(` are XPath and everything else is CSS.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("xpath=") {
            Self::XPath(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("css=") {
            Self::Css(rest.to_string())
        } else if raw.starts_with("//") || raw.starts_with("..") || raw.starts_with('(') {
            Self::XPath(raw.to_string())
        } else {
            Self::Css(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }

    /// JavaScript expression listing the matching nodes of `doc` as an array.
    fn nodes_in(&self, doc: &str) -> String {
        match self {
            Self::Css(s) => format!("Array.from({doc}.querySelectorAll({}))", js_string(s)),
            Self::XPath(s) => format!(
                "(() => {{ const r = {doc}.evaluate({}, {doc}, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 const out = []; for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); return out; }})()",
                js_string(s)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a selector is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The top-level document of the page.
    #[default]
    Page,
    /// The document of a same-origin `<iframe>`, named by a CSS selector in the page.
    Frame(String),
}

impl Scope {
    pub fn frame(selector: impl Into<String>) -> Self {
        Self::Frame(selector.into())
    }

    /// Keyboard input is only routed to the top-level page.
    pub fn has_keyboard(&self) -> bool {
        matches!(self, Self::Page)
    }

    /// JavaScript expression for the scope's document, `null` when a frame is missing.
    fn document_js(&self) -> String {
        match self {
            Self::Page => "document".to_string(),
            Self::Frame(sel) => format!(
                "(document.querySelector({})?.contentDocument ?? null)",
                js_string(sel)
            ),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => f.write_str("page"),
            Self::Frame(sel) => write!(f, "frame '{}'", sel),
        }
    }
}

/// A selector bound to the scope it was resolved in.
///
/// Resolution does not touch the DOM; the match count and interactability are checked
/// by [`InteractionHelper::locate_element`](crate::InteractionHelper::locate_element).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    selector: Selector,
    scope: Scope,
}

impl Element {
    pub fn new(selector: Selector, scope: Scope) -> Self {
        Self { selector, scope }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// JavaScript expression evaluating to the array of matching nodes.
    ///
    /// A missing frame yields an empty array rather than a script error.
    pub fn nodes_js(&self) -> String {
        let doc = self.scope.document_js();
        format!(
            "(() => {{ const doc = {doc}; if (!doc) return []; return {}; }})()",
            self.selector.nodes_in("doc")
        )
    }

    /// JavaScript wrapper that runs `body` with `el` bound to the single match.
    ///
    /// The script evaluates to `{found: true, value}` with the body's return value, or to
    /// `{found: false, count}` when the selector no longer matches exactly one node.
    pub fn with_node_js(&self, body: &str) -> String {
        format!(
            "(() => {{ const nodes = {}; if (nodes.length !== 1) return {{ found: false, count: nodes.length }}; \
             const el = nodes[0]; return {{ found: true, value: (() => {{ {body} }})() ?? null }}; }})()",
            self.nodes_js()
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Page => write!(f, "{}", self.selector),
            ref frame => write!(f, "{} in {}", self.selector, frame),
        }
    }
}

/// Either a selector string or an already-resolved element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Raw(String),
    Resolved(Element),
}

impl Locator {
    /// Bind the locator to `scope`. Resolved elements keep their own scope.
    pub fn resolve(self, scope: &Scope) -> Element {
        match self {
            Self::Raw(raw) => Element::new(Selector::parse(&raw), scope.clone()),
            Self::Resolved(element) => element,
        }
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for Locator {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<&String> for Locator {
    fn from(raw: &String) -> Self {
        Self::Raw(raw.clone())
    }
}

impl From<Element> for Locator {
    fn from(element: Element) -> Self {
        Self::Resolved(element)
    }
}

impl From<&Element> for Locator {
    fn from(element: &Element) -> Self {
        Self::Resolved(element.clone())
    }
}
