// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface lifecycle and host integration.
//!
//! [`SurfaceManager`] owns the renderer and the platform adapter. It keeps the
//! surface size, background color, and coordinate system in step with the
//! host:
//!
//! - The surface always covers the host viewport. Sizes are re-read from the
//!   platform whenever a [`HostEvent`] arrives; the event itself carries no
//!   geometry.
//! - Stimulus coordinates have their origin at the center of the surface with
//!   the y axis pointing up. The root transform of the scene graph maps them
//!   to device pixels.
//! - Background color changes are deferred until the next frame and pushed to
//!   both the renderer and the host page.
//!
//! # Fullscreen
//!
//! Entering and leaving fullscreen walks the platform's
//! [`FullscreenApi`](crate::backend::FullscreenApi) table in priority order
//! and uses the first capability whose probe succeeds. Whether the host was
//! already fullscreen before the session is latched once, at initialization.
//! If it was, [`exit_fullscreen`](SurfaceManager::exit_fullscreen) never asks
//! the host to leave fullscreen.

use alloc::format;
use alloc::string::String;

use kurbo::{Affine, Size};

use crate::backend::{HostEvent, Platform, Renderer};
use crate::color::Color;
use crate::config::WindowConfig;
use crate::error::Error;
use crate::log::Logger;
use crate::scene::SceneGraph;

/// Fullscreen bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FullscreenState {
    /// Whether this session successfully requested fullscreen.
    pub requested: bool,
    /// Whether the host was fullscreen before the session started.
    ///
    /// Latched at initialization and never updated.
    pub already_fullscreen_before_session: bool,
}

/// Result of a fullscreen transition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FullscreenOutcome {
    /// Fullscreen was entered through the named capability.
    Entered(&'static str),
    /// Fullscreen was left through the named capability.
    Exited(&'static str),
    /// Nothing to do: fullscreen was already requested or the host is already
    /// fullscreen.
    AlreadyFullscreen,
    /// Nothing to do: the host is not fullscreen.
    NotFullscreen,
    /// The host was fullscreen before the session; exit was skipped.
    HostOwned,
    /// No capability in the table is supported by the host.
    Unsupported,
    /// The named capability was supported but the call failed.
    Failed(&'static str),
}

impl FullscreenOutcome {
    /// Short snake_case name of the outcome kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entered(_) => "entered",
            Self::Exited(_) => "exited",
            Self::AlreadyFullscreen => "already_fullscreen",
            Self::NotFullscreen => "not_fullscreen",
            Self::HostOwned => "host_owned",
            Self::Unsupported => "unsupported",
            Self::Failed(_) => "failed",
        }
    }

    /// The capability involved, if one was tried.
    #[must_use]
    pub const fn api(self) -> Option<&'static str> {
        match self {
            Self::Entered(api) | Self::Exited(api) | Self::Failed(api) => Some(api),
            _ => None,
        }
    }
}

/// Maps center-origin, y-up stimulus coordinates to device pixels.
#[must_use]
pub fn origin_transform(size: Size) -> Affine {
    Affine::translate((size.width / 2.0, size.height / 2.0)) * Affine::scale_non_uniform(1.0, -1.0)
}

/// Owns the display surface, its renderer, and its host integration.
#[derive(Debug)]
pub struct SurfaceManager<R, P> {
    renderer: R,
    platform: P,
    name: String,
    auto_log: bool,
    size: Size,
    background: Color,
    needs_update: bool,
    fullscreen: FullscreenState,
    attached: bool,
    listening: bool,
}

impl<R: Renderer, P: Platform> SurfaceManager<R, P> {
    /// Creates the surface at the current viewport size and installs it into
    /// the host.
    ///
    /// Sets the renderer and page backgrounds, centers the origin of `scene`,
    /// latches the host fullscreen state, and subscribes to host events.
    pub fn initialize(
        mut renderer: R,
        mut platform: P,
        config: &WindowConfig,
        scene: &mut SceneGraph<R::Node>,
        logger: &mut Logger,
    ) -> Result<Self, Error> {
        let size = platform.viewport_size();
        let background = config.background_color;

        renderer.resize(size);
        renderer.set_background(background);
        platform.attach_surface().map_err(Error::Attach)?;
        // The page background is set as well so that host dialogs taller than
        // the surface do not show a different color around it.
        platform.set_page_background(background);
        scene.set_root_transform(origin_transform(size));

        let already_fullscreen_before_session = platform.is_fullscreen();

        if let Err(err) = platform.subscribe_host_events() {
            platform.detach_surface();
            return Err(Error::Subscribe(err));
        }

        if config.auto_log {
            logger.debug(
                &format!(
                    "created surface {}x{} ({})",
                    size.width, size.height, config.units
                ),
                Some(&config.name),
            );
        }

        Ok(Self {
            renderer,
            platform,
            name: config.name.clone(),
            auto_log: config.auto_log,
            size,
            background,
            needs_update: false,
            fullscreen: FullscreenState {
                requested: false,
                already_fullscreen_before_session,
            },
            attached: true,
            listening: true,
        })
    }

    /// Recomputes the surface geometry after a host resize or orientation
    /// change.
    ///
    /// The size is read from the platform, never from the event. The surface
    /// is marked as needing an update every time, even if the size did not
    /// change; the caller is expected to follow up with a full refresh of the
    /// drawables.
    pub fn on_host_resize(
        &mut self,
        event: HostEvent,
        scene: &mut SceneGraph<R::Node>,
        logger: &mut Logger,
    ) -> Size {
        let size = self.platform.viewport_size();
        if self.auto_log {
            logger.debug(
                &format!(
                    "resizing surface to {}x{} on {event:?}",
                    size.width, size.height
                ),
                Some(&self.name),
            );
        }

        self.size = size;
        self.renderer.resize(size);
        scene.set_root_transform(origin_transform(size));
        self.needs_update = true;
        size
    }

    /// Attempts to take the host fullscreen.
    ///
    /// Does nothing if fullscreen was already requested or the host is
    /// already fullscreen. Otherwise uses the first supported capability. If
    /// none is supported, or the call fails, a warning is logged and the state
    /// is left unchanged. On success the surface is marked as needing an
    /// update; the caller marks the drawables.
    pub fn request_fullscreen(&mut self, logger: &mut Logger) -> FullscreenOutcome {
        if self.fullscreen.requested || self.platform.is_fullscreen() {
            return FullscreenOutcome::AlreadyFullscreen;
        }

        let Some(api) = self
            .platform
            .fullscreen_apis()
            .iter()
            .copied()
            .find(|api| (api.probe)(&self.platform))
        else {
            logger.warn("unable to go fullscreen", Some(&self.name));
            return FullscreenOutcome::Unsupported;
        };

        if self.auto_log {
            logger.debug(
                &format!("going fullscreen via {}", api.name),
                Some(&self.name),
            );
        }
        if let Err(err) = (api.request)(&mut self.platform) {
            logger.warn(
                &format!("unable to go fullscreen via {}: {err}", api.name),
                Some(&self.name),
            );
            return FullscreenOutcome::Failed(api.name);
        }

        self.fullscreen.requested = true;
        self.needs_update = true;
        FullscreenOutcome::Entered(api.name)
    }

    /// Takes the host back out of fullscreen.
    ///
    /// Never leaves a fullscreen state the host was already in before the
    /// session. Does nothing if the host is not fullscreen.
    pub fn exit_fullscreen(&mut self, logger: &mut Logger) -> FullscreenOutcome {
        if self.fullscreen.already_fullscreen_before_session {
            return FullscreenOutcome::HostOwned;
        }
        if !self.platform.is_fullscreen() {
            self.fullscreen.requested = false;
            return FullscreenOutcome::NotFullscreen;
        }

        let Some(api) = self
            .platform
            .fullscreen_apis()
            .iter()
            .copied()
            .find(|api| (api.probe)(&self.platform))
        else {
            logger.warn("unable to leave fullscreen", Some(&self.name));
            return FullscreenOutcome::Unsupported;
        };

        if self.auto_log {
            logger.debug(
                &format!("leaving fullscreen via {}", api.name),
                Some(&self.name),
            );
        }
        if let Err(err) = (api.exit)(&mut self.platform) {
            logger.warn(
                &format!("unable to leave fullscreen via {}: {err}", api.name),
                Some(&self.name),
            );
            return FullscreenOutcome::Failed(api.name);
        }

        self.fullscreen.requested = false;
        FullscreenOutcome::Exited(api.name)
    }

    /// Changes the background color, effective from the next frame.
    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
        self.needs_update = true;
    }

    /// Flags the surface as needing an update.
    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }

    /// Pushes a pending background change to the renderer and the host page.
    ///
    /// Returns whether anything was pending.
    pub fn apply_pending_color_change(&mut self) -> bool {
        if !self.needs_update {
            return false;
        }
        self.renderer.set_background(self.background);
        self.platform.set_page_background(self.background);
        self.needs_update = false;
        true
    }

    /// Detaches the surface and removes host listeners.
    ///
    /// Safe to call more than once. Returns whether anything was torn down.
    pub fn teardown(&mut self) -> bool {
        let mut changed = false;
        if self.attached {
            self.platform.detach_surface();
            self.attached = false;
            changed = true;
        }
        if self.listening {
            self.platform.unsubscribe_host_events();
            self.listening = false;
            changed = true;
        }
        changed
    }

    /// Current surface size in device pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Current background color.
    #[must_use]
    pub fn background_color(&self) -> Color {
        self.background
    }

    /// Whether a surface update is pending.
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Fullscreen bookkeeping.
    #[must_use]
    pub fn fullscreen_state(&self) -> FullscreenState {
        self.fullscreen
    }

    /// Whether the surface is installed in the host.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The platform adapter.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform adapter, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
