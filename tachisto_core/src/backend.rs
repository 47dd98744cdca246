// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for renderer and host integrations.
//!
//! Tachisto splits platform-specific work into *backend* crates. Each backend
//! provides the following pieces:
//!
//! - **Renderer**: Implements [`Renderer`] to draw a [`SceneGraph`] onto the
//!   surface, resize it, and synchronize with the device. The
//!   [`barrier`](Renderer::barrier) is what makes flip timestamps mean "on
//!   screen" rather than "submitted".
//!
//! - **Platform**: Implements [`Platform`] to query the viewport, attach the
//!   surface to the host, install resize/orientation listeners, and expose an
//!   ordered table of [`FullscreenApi`] capabilities.
//!
//! - **Host events**: Listeners installed by the platform forward
//!   [`HostEvent`]s to [`Window::handle_host_event`]. Events are only
//!   triggers: the window always re-reads the viewport from the platform.
//!
//! - **Time**: A [`Clock`](crate::time::Clock), usually a free `now()`
//!   function reading the host's monotonic clock.
//!
//! Test doubles implement the same traits, so the frame loop runs headless.
//!
//! [`Window::handle_host_event`]: crate::window::Window::handle_host_event

use core::fmt;

use kurbo::Size;

use crate::color::Color;
use crate::error::PlatformError;
use crate::scene::SceneGraph;

/// Draws scene graphs onto the display surface.
pub trait Renderer {
    /// Backend-specific payload stored for each scene node.
    type Node;

    /// Resizes the backing surface to `size` device pixels.
    fn resize(&mut self, size: Size);

    /// Sets the color the surface is cleared to before drawing.
    fn set_background(&mut self, color: Color);

    /// Submits the attached nodes of `scene`, back to front.
    fn render(&mut self, scene: &SceneGraph<Self::Node>);

    /// Blocks until the most recent submission has completed on the device.
    ///
    /// Called once per frame right after [`render`](Self::render).
    fn barrier(&mut self);

    /// Blocks until the whole device pipeline is drained.
    ///
    /// Only called when the window is configured with `wait_blanking`. There
    /// is no timeout.
    fn wait_idle(&mut self);
}

/// A host-level event that requires recomputing the surface geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// The host viewport was resized.
    Resize,
    /// The device orientation changed.
    OrientationChange,
}

/// Host window/document integration.
pub trait Platform {
    /// Current viewport size in device pixels.
    fn viewport_size(&self) -> Size;

    /// Installs the rendering surface into the host document.
    fn attach_surface(&mut self) -> Result<(), PlatformError>;

    /// Removes the rendering surface from the host document.
    ///
    /// Returns `false` if it was not attached.
    fn detach_surface(&mut self) -> bool;

    /// Sets the host page background behind and around the surface.
    fn set_page_background(&mut self, color: Color);

    /// Starts forwarding resize and orientation events.
    fn subscribe_host_events(&mut self) -> Result<(), PlatformError>;

    /// Stops forwarding resize and orientation events.
    fn unsubscribe_host_events(&mut self);

    /// Whether the host is currently in a fullscreen state.
    fn is_fullscreen(&self) -> bool;

    /// Fullscreen capabilities in priority order.
    ///
    /// The surface manager uses the first entry whose
    /// [`probe`](FullscreenApi::probe) succeeds.
    fn fullscreen_apis(&self) -> &[FullscreenApi<Self>]
    where
        Self: Sized;
}

/// One way of entering and leaving fullscreen on a host.
///
/// Web hosts, for example, list the standard API followed by the
/// vendor-prefixed variants.
pub struct FullscreenApi<P> {
    /// Name used in diagnostics.
    pub name: &'static str,
    /// Whether this capability is available on the host.
    pub probe: fn(&P) -> bool,
    /// Enters fullscreen.
    pub request: fn(&mut P) -> Result<(), PlatformError>,
    /// Leaves fullscreen.
    pub exit: fn(&mut P) -> Result<(), PlatformError>,
}

impl<P> Clone for FullscreenApi<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for FullscreenApi<P> {}

impl<P> fmt::Debug for FullscreenApi<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FullscreenApi")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// External pointer/touch wiring.
///
/// Receives the renderer once, when the window is set up, and never interacts
/// with the frame loop afterwards.
pub trait InputManager<R: ?Sized> {
    /// Installs pointer and touch listeners on the renderer's surface.
    fn attach(&mut self, renderer: &R);
}
