//! Browser primitives the interaction layer is built on.
//!
//! [`Driver`] is the seam between [`InteractionHelper`](crate::InteractionHelper) and the
//! automation backend. The helper owns waiting, validation, logging and error wrapping; a
//! driver only answers single questions and performs single actions. `eoka::Page`
//! implements it by evaluating generated scripts against the element's document.

use crate::locator::{js_string, Element};
use crate::{Error, Result};
use eoka::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Snapshot of the DOM predicates checked before an interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ElementState {
    /// Has a non-empty box and is not `visibility: hidden`.
    pub visible: bool,
    /// Not rendered: no box, `visibility: hidden`, `display: none` or the `hidden` attribute.
    /// Accessibility attributes such as `aria-hidden` do not count.
    pub hidden: bool,
    /// The element's own `disabled` property is false.
    pub enabled: bool,
    /// Matches `:disabled` (including disabled fieldsets) or `aria-disabled="true"`.
    pub disabled: bool,
    /// Is the active element of its document.
    pub focused: bool,
    /// Lies entirely inside its viewport.
    pub in_viewport: bool,
}

impl ElementState {
    /// Visible, not hidden, enabled and not disabled.
    pub fn is_interactable(&self) -> bool {
        self.visible && !self.hidden && self.enabled && !self.disabled
    }
}

/// Black-box browser operations, addressed by resolved [`Element`]s.
///
/// Element-level methods fail with [`Error::NotFound`] when the element no longer matches
/// exactly one node at the moment of the call.
#[allow(async_fn_in_trait)]
pub trait Driver {
    /// Number of nodes currently matching the element's selector.
    async fn count(&self, element: &Element) -> Result<usize>;

    async fn state(&self, element: &Element) -> Result<ElementState>;

    async fn focus(&self, element: &Element) -> Result<()>;

    /// Replace the element's value with `text`, firing `input` and `change`.
    async fn fill(&self, element: &Element, text: &str) -> Result<()>;

    /// Current value of a form control, `None` for elements without one.
    async fn input_value(&self, element: &Element) -> Result<Option<String>>;

    async fn text_content(&self, element: &Element) -> Result<Option<String>>;

    /// Click without hit-testing, so overlays and animations do not block it.
    async fn click(&self, element: &Element) -> Result<()>;

    /// Focus the element and press a key or chord such as `Enter` or `Control+A`.
    async fn press(&self, element: &Element, keys: &str) -> Result<()>;

    /// Scroll the element into view unless it already is. Returns whether it scrolled.
    async fn scroll_into_view_if_needed(&self, element: &Element) -> Result<bool>;

    /// Press a key or chord on whatever currently has focus.
    async fn keyboard_press(&self, keys: &str) -> Result<()>;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn url(&self) -> Result<String>;

    /// PNG capture of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}

/// A key press with its modifiers, parsed from `Modifier+Modifier+Key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Chord {
    pub fn parse(keys: &str) -> Result<Self> {
        let mut parts: Vec<&str> = keys.split('+').map(str::trim).collect();
        // "Control++" names the plus key itself
        if keys.ends_with("++") {
            parts.truncate(parts.len().saturating_sub(2));
            parts.push("+");
        }
        let key = match parts.pop() {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => return Err(Error::Script(format!("invalid key combination '{}'", keys))),
        };
        let mut chord = Self {
            key,
            ctrl: false,
            meta: false,
            alt: false,
            shift: false,
        };
        for modifier in parts {
            match modifier.to_ascii_lowercase().as_str() {
                "control" | "ctrl" => chord.ctrl = true,
                "meta" | "cmd" | "command" => chord.meta = true,
                "alt" | "option" => chord.alt = true,
                "shift" => chord.shift = true,
                other => {
                    return Err(Error::Script(format!(
                        "unknown modifier '{}' in '{}'",
                        other, keys
                    )))
                }
            }
        }
        Ok(chord)
    }

    pub fn has_modifiers(&self) -> bool {
        self.ctrl || self.meta || self.alt || self.shift
    }

    /// Ctrl+A or Meta+A.
    pub fn is_select_all(&self) -> bool {
        (self.ctrl || self.meta) && self.key.eq_ignore_ascii_case("a")
    }
}

#[derive(Deserialize)]
struct NodeReply {
    found: bool,
    #[serde(default)]
    count: usize,
    #[serde(default)]
    value: serde_json::Value,
}

/// Run `body` against the element's single node and decode what it returns.
async fn on_node<T: DeserializeOwned>(page: &Page, element: &Element, body: &str) -> Result<T> {
    let reply: NodeReply = page.evaluate(&element.with_node_js(body)).await?;
    if !reply.found {
        return Err(Error::NotFound {
            selector: element.to_string(),
            count: reply.count,
        });
    }
    serde_json::from_value(reply.value)
        .map_err(|e| Error::Script(format!("unexpected reply for {}: {}", element, e)))
}

const STATE_JS: &str = r#"
    const view = el.ownerDocument.defaultView;
    const style = view.getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    const visible = rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden';
    const hidden = !visible || el.hidden === true || style.display === 'none';
    const enabled = el.disabled !== true;
    const disabled = el.matches(':disabled') || el.closest('[aria-disabled="true"]') !== null;
    const focused = el.ownerDocument.activeElement === el;
    const in_viewport = rect.top >= 0 && rect.left >= 0
        && rect.bottom <= view.innerHeight && rect.right <= view.innerWidth;
    return { visible, hidden, enabled, disabled, focused, in_viewport };
"#;

const FILL_JS: &str = r#"
    const view = el.ownerDocument.defaultView;
    let proto = null;
    if (el instanceof view.HTMLTextAreaElement) proto = view.HTMLTextAreaElement.prototype;
    else if (el instanceof view.HTMLInputElement) proto = view.HTMLInputElement.prototype;
    if (proto) {
        Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, __TEXT__);
    } else if (el.isContentEditable) {
        el.textContent = __TEXT__;
    } else {
        return false;
    }
    el.dispatchEvent(new view.Event('input', { bubbles: true }));
    el.dispatchEvent(new view.Event('change', { bubbles: true }));
    return true;
"#;

const CLICK_JS: &str = r#"
    const view = el.ownerDocument.defaultView;
    const opts = { bubbles: true, cancelable: true, view };
    el.dispatchEvent(new view.MouseEvent('mousedown', opts));
    el.dispatchEvent(new view.MouseEvent('mouseup', opts));
    el.click();
    return true;
"#;

const SCROLL_JS: &str = r#"
    const view = el.ownerDocument.defaultView;
    const rect = el.getBoundingClientRect();
    const inside = rect.top >= 0 && rect.left >= 0
        && rect.bottom <= view.innerHeight && rect.right <= view.innerWidth;
    if (inside) return false;
    el.scrollIntoView({ block: 'center', inline: 'nearest' });
    return true;
"#;

/// Synthetic key events on the deepest focused element.
///
/// Synthetic events do not trigger default actions, so select-all is applied directly.
const CHORD_JS: &str = r#"(() => {
    const chord = __CHORD__;
    let el = document.activeElement;
    while (el && el.contentDocument && el.contentDocument.activeElement) {
        el = el.contentDocument.activeElement;
    }
    if (!el) return false;
    const view = el.ownerDocument.defaultView;
    const init = {
        key: chord.key, bubbles: true, cancelable: true,
        ctrlKey: chord.ctrl, metaKey: chord.meta, altKey: chord.alt, shiftKey: chord.shift,
    };
    const proceed = el.dispatchEvent(new view.KeyboardEvent('keydown', init));
    if (proceed && chord.select_all) {
        if (typeof el.select === 'function') el.select();
        else view.getSelection().selectAllChildren(el);
    }
    el.dispatchEvent(new view.KeyboardEvent('keyup', init));
    return true;
})()"#;

impl Driver for Page {
    async fn count(&self, element: &Element) -> Result<usize> {
        let count: usize = self
            .evaluate(&format!("{}.length", element.nodes_js()))
            .await?;
        Ok(count)
    }

    async fn state(&self, element: &Element) -> Result<ElementState> {
        on_node(self, element, STATE_JS).await
    }

    async fn focus(&self, element: &Element) -> Result<()> {
        let _: bool = on_node(self, element, "el.focus(); return true;").await?;
        Ok(())
    }

    async fn fill(&self, element: &Element, text: &str) -> Result<()> {
        let body = FILL_JS.replace("__TEXT__", &js_string(text));
        let accepted: bool = on_node(self, element, &body).await?;
        if !accepted {
            return Err(Error::Script(format!(
                "element {} does not accept text input",
                element
            )));
        }
        Ok(())
    }

    async fn input_value(&self, element: &Element) -> Result<Option<String>> {
        on_node(
            self,
            element,
            "return typeof el.value === 'string' ? el.value : null;",
        )
        .await
    }

    async fn text_content(&self, element: &Element) -> Result<Option<String>> {
        on_node(self, element, "return el.textContent;").await
    }

    async fn click(&self, element: &Element) -> Result<()> {
        let _: bool = on_node(self, element, CLICK_JS).await?;
        Ok(())
    }

    async fn press(&self, element: &Element, keys: &str) -> Result<()> {
        Driver::focus(self, element).await?;
        Driver::keyboard_press(self, keys).await
    }

    async fn scroll_into_view_if_needed(&self, element: &Element) -> Result<bool> {
        let scrolled: bool = on_node(self, element, SCROLL_JS).await?;
        if scrolled {
            // let smooth-scrolling pages settle
            self.wait(100).await;
        }
        Ok(scrolled)
    }

    async fn keyboard_press(&self, keys: &str) -> Result<()> {
        let chord = Chord::parse(keys)?;
        if !chord.has_modifiers() {
            debug!("keyboard: {}", chord.key);
            self.human().press_key(&chord.key).await?;
            return Ok(());
        }
        debug!("keyboard chord: {}", keys);
        let arg = serde_json::json!({
            "key": chord.key,
            "ctrl": chord.ctrl,
            "meta": chord.meta,
            "alt": chord.alt,
            "shift": chord.shift,
            "select_all": chord.is_select_all(),
        });
        let js = CHORD_JS.replace("__CHORD__", &arg.to_string());
        let dispatched: bool = self.evaluate(&js).await?;
        if !dispatched {
            return Err(Error::Script(format!(
                "no focused element to receive '{}'",
                keys
            )));
        }
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        Page::goto(self, url).await?;
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        Ok(Page::url(self).await?)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(Page::screenshot(self).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_single_key() {
        let chord = Chord::parse("Enter").unwrap();
        assert_eq!(chord.key, "Enter");
        assert!(!chord.has_modifiers());
    }

    #[test]
    fn test_chord_select_all_variants() {
        assert!(Chord::parse("Control+A").unwrap().is_select_all());
        assert!(Chord::parse("Meta+a").unwrap().is_select_all());
        assert!(!Chord::parse("Shift+A").unwrap().is_select_all());
        assert!(!Chord::parse("Control+C").unwrap().is_select_all());
    }

    #[test]
    fn test_chord_plus_key() {
        let chord = Chord::parse("Control++").unwrap();
        assert_eq!(chord.key, "+");
        assert!(chord.ctrl);
    }

    #[test]
    fn test_chord_rejects_unknown_modifier() {
        let err = Chord::parse("Hyper+A").unwrap_err();
        assert!(err.to_string().contains("unknown modifier"));
        assert!(Chord::parse("Control+").is_err());
    }

    #[test]
    fn test_interactable() {
        let state = ElementState {
            visible: true,
            enabled: true,
            ..Default::default()
        };
        assert!(state.is_interactable());
        assert!(!ElementState {
            disabled: true,
            ..state
        }
        .is_interactable());
    }
}
