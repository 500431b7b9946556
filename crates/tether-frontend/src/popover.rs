//! Shows and hides the indicator through the browser's popover API.

use tether::indicator::Surface;
use tether::log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlElement;
use yew::NodeRef;

/// Turns `host` into a manual popover that takes no space of its own.
pub fn init(host: &HtmlElement) {
    if let Err(err) = host.set_attribute("popover", "manual") {
        warn!(error = ?err, "Failed to set popover attribute");
    }

    let style = host.style();
    let properties = [
        ("display", "contents"),
        ("border", "none"),
        ("background", "none"),
        ("padding", "0"),
        ("width", "0"),
        ("height", "0"),
        ("overflow", "visible"),
    ];
    for (property, value) in properties {
        if let Err(err) = style.set_property(property, value) {
            warn!(property, error = ?err, "Failed to set popover style");
        }
    }
}

/// The indicator's host element, surfaced as a popover.
pub struct PopoverSurface {
    host: NodeRef,
}

impl PopoverSurface {
    pub fn new(host: NodeRef) -> Self {
        Self { host }
    }

    fn call(&self, method: &str) {
        let Some(element) = self.host.cast::<HtmlElement>() else {
            return;
        };

        let function = match js_sys::Reflect::get(&element, &JsValue::from_str(method)) {
            Ok(function) => function,
            Err(err) => {
                warn!(method, error = ?err, "Failed to look up popover method");
                return;
            }
        };
        let Some(function) = function.dyn_ref::<js_sys::Function>() else {
            debug!(method, "Popover API not supported by this browser");
            return;
        };
        if let Err(err) = function.call0(&element) {
            warn!(method, error = ?err, "Popover call failed");
        }
    }
}

impl Surface for PopoverSurface {
    fn show(&self) {
        self.call("showPopover");
    }

    fn hide(&self) {
        self.call("hidePopover");
    }
}
