// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser host integration.
//!
//! [`WebPlatform`] owns the document-side half of a window: it places the
//! canvas on `document.body`, paints the page background, forwards `resize`
//! and `orientationchange` events, and exposes the fullscreen API variants
//! browsers ship.
//!
//! Fullscreen methods are looked up by name with `Reflect` rather than through
//! typed bindings, since most of them are vendor-prefixed and absent from any
//! given browser.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Size;
use tachisto_core::backend::{FullscreenApi, HostEvent, Platform};
use tachisto_core::color::Color;
use tachisto_core::error::PlatformError;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlCanvasElement, HtmlElement};

/// Method and property names of one fullscreen API variant.
#[derive(Clone, Copy, Debug)]
struct Vendor {
    name: &'static str,
    /// Method on `document.documentElement`.
    request: &'static str,
    /// Method on `document`.
    exit: &'static str,
    /// Property on `document` holding the fullscreen element.
    element: &'static str,
}

/// Priority order: standard first, then vendor prefixes.
const VENDORS: [Vendor; 4] = [
    Vendor {
        name: "standard",
        request: "requestFullscreen",
        exit: "exitFullscreen",
        element: "fullscreenElement",
    },
    Vendor {
        name: "moz",
        request: "mozRequestFullScreen",
        exit: "mozCancelFullScreen",
        element: "mozFullScreenElement",
    },
    Vendor {
        name: "webkit",
        request: "webkitRequestFullscreen",
        exit: "webkitExitFullscreen",
        element: "webkitFullscreenElement",
    },
    Vendor {
        name: "ms",
        request: "msRequestFullscreen",
        exit: "msExitFullscreen",
        element: "msFullscreenElement",
    },
];

macro_rules! vendor_api {
    ($idx:literal) => {
        FullscreenApi {
            name: VENDORS[$idx].name,
            probe: |platform: &WebPlatform| platform.supports(&VENDORS[$idx]),
            request: |platform: &mut WebPlatform| platform.request(&VENDORS[$idx]),
            exit: |platform: &mut WebPlatform| platform.exit(&VENDORS[$idx]),
        }
    };
}

static FULLSCREEN_APIS: [FullscreenApi<WebPlatform>; 4] = [
    vendor_api!(0),
    vendor_api!(1),
    vendor_api!(2),
    vendor_api!(3),
];

type EventClosure = Closure<dyn FnMut(Event)>;
type HostEventCallback = Rc<RefCell<Box<dyn FnMut(HostEvent)>>>;

/// [`Platform`] implementation for a browser page.
///
/// The callback given to [`new`](Self::new) receives every host event once
/// [`subscribe_host_events`](Platform::subscribe_host_events) has been called.
/// It runs from the browser's event loop, outside any frame.
pub struct WebPlatform {
    window: web_sys::Window,
    document: Document,
    canvas: HtmlCanvasElement,
    on_host_event: HostEventCallback,
    listeners: Vec<(&'static str, EventClosure)>,
}

impl core::fmt::Debug for WebPlatform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebPlatform")
            .field("canvas", &"HtmlCanvasElement")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl WebPlatform {
    /// Creates a platform for `canvas` in the current document.
    pub fn new(
        canvas: HtmlCanvasElement,
        on_host_event: impl FnMut(HostEvent) + 'static,
    ) -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or_else(|| PlatformError::new("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| PlatformError::new("no document"))?;
        Ok(Self {
            window,
            document,
            canvas,
            on_host_event: Rc::new(RefCell::new(Box::new(on_host_event))),
            listeners: Vec::new(),
        })
    }

    /// Returns the managed canvas.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn body(&self) -> Result<HtmlElement, PlatformError> {
        self.document
            .body()
            .ok_or_else(|| PlatformError::new("document has no body"))
    }

    fn supports(&self, vendor: &Vendor) -> bool {
        let Some(root) = self.document.document_element() else {
            return false;
        };
        method(&root, vendor.request).is_some() && method(&self.document, vendor.exit).is_some()
    }

    fn request(&mut self, vendor: &Vendor) -> Result<(), PlatformError> {
        let root = self
            .document
            .document_element()
            .ok_or_else(|| PlatformError::new("document has no root element"))?;
        invoke(&root, vendor.request)
    }

    fn exit(&mut self, vendor: &Vendor) -> Result<(), PlatformError> {
        invoke(&self.document, vendor.exit)
    }
}

/// Looks up a callable property of `target`.
fn method(target: &JsValue, name: &str) -> Option<js_sys::Function> {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

/// Calls the method `name` of `target` without arguments.
///
/// Only synchronous failures are reported. Browsers that return a promise
/// reject it asynchronously; the outcome then shows up through
/// `is_fullscreen` and the next resize event.
fn invoke(target: &JsValue, name: &str) -> Result<(), PlatformError> {
    let function = method(target, name)
        .ok_or_else(|| PlatformError::new(format!("{name} is not a function")))?;
    function
        .call0(target)
        .map(|_| ())
        .map_err(|err| PlatformError::new(format!("{name} failed: {err:?}")))
}

fn viewport_dimension(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

impl Platform for WebPlatform {
    fn viewport_size(&self) -> Size {
        Size::new(
            viewport_dimension(self.window.inner_width()),
            viewport_dimension(self.window.inner_height()),
        )
    }

    fn attach_surface(&mut self) -> Result<(), PlatformError> {
        let body = self.body()?;
        let style = self.canvas.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("left", "0");
        let _ = style.set_property("top", "0");
        // Keeps the canvas on its own compositing layer.
        let _ = style.set_property("transform", "translatez(0)");
        body.append_child(&self.canvas)
            .map(|_| ())
            .map_err(|err| PlatformError::new(format!("cannot attach canvas: {err:?}")))
    }

    fn detach_surface(&mut self) -> bool {
        if self.canvas.parent_node().is_none() {
            return false;
        }
        self.canvas.remove();
        true
    }

    fn set_page_background(&mut self, color: Color) {
        if let Ok(body) = self.body() {
            let _ = body
                .style()
                .set_property("background-color", &color.to_hex());
        }
    }

    fn subscribe_host_events(&mut self) -> Result<(), PlatformError> {
        if !self.listeners.is_empty() {
            return Ok(());
        }
        for (kind, event) in [
            ("resize", HostEvent::Resize),
            ("orientationchange", HostEvent::OrientationChange),
        ] {
            let callback = Rc::clone(&self.on_host_event);
            let closure = Closure::wrap(Box::new(move |_: Event| {
                callback.borrow_mut()(event);
            }) as Box<dyn FnMut(Event)>);
            let installed = self
                .window
                .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            if let Err(err) = installed {
                self.unsubscribe_host_events();
                return Err(PlatformError::new(format!(
                    "cannot listen for {kind}: {err:?}"
                )));
            }
            self.listeners.push((kind, closure));
        }
        Ok(())
    }

    fn unsubscribe_host_events(&mut self) {
        for (kind, closure) in self.listeners.drain(..) {
            let _ = self
                .window
                .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }

    fn is_fullscreen(&self) -> bool {
        VENDORS.iter().any(|vendor| {
            js_sys::Reflect::get(&self.document, &JsValue::from_str(vendor.element))
                .is_ok_and(|element| !element.is_null() && !element.is_undefined())
        })
    }

    fn fullscreen_apis(&self) -> &[FullscreenApi<Self>] {
        &FULLSCREEN_APIS
    }
}

impl Drop for WebPlatform {
    fn drop(&mut self) {
        self.unsubscribe_host_events();
    }
}
