//! Evaluation context and scoped hooks.

use super::state::MathModeState;
use crate::config::{ConfigScope, MathRenderOptions, PartialMathOptions};
use crate::error::Result;
use crate::render::math::{MathRenderer, RenderOptions};
use std::ops::{Deref, DerefMut};

/// Everything an evaluation frame can see: the math backend, the effective configuration,
/// and the math-mode state.
///
/// Scoped changes go through [`Context::with_config`] and the crate-internal
/// `with_math_state`; both hand back a [`Scope`] that puts the previous value back when it
/// is dropped, including on an early `?` return.
pub struct Context<'r> {
    renderer: &'r dyn MathRenderer,
    config: ConfigScope,
    math: MathModeState,
    renders: usize,
}

impl<'r> Context<'r> {
    pub fn new(renderer: &'r dyn MathRenderer, options: MathRenderOptions) -> Self {
        Self {
            renderer,
            config: ConfigScope::root(options),
            math: MathModeState::default(),
            renders: 0,
        }
    }

    /// Effective math options at the current evaluation point.
    pub fn options(&self) -> &MathRenderOptions {
        self.config.read()
    }

    pub fn config_scope(&self) -> &ConfigScope {
        &self.config
    }

    /// Whether the current evaluation point is inside any math region.
    pub fn is_math_mode(&self) -> bool {
        self.math.is_math_mode()
    }

    /// Whether the outermost enclosing math region is in display mode.
    pub fn is_display_mode(&self) -> bool {
        self.math.is_display_mode()
    }

    /// Number of backend calls made so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub(crate) fn math_state(&self) -> MathModeState {
        self.math
    }

    /// Make `update` visible until the returned scope is dropped.
    pub fn with_config(&mut self, update: &PartialMathOptions) -> Scope<'_, 'r> {
        let child = self.config.overlay(update);
        log::trace!("entering config scope at depth {}", child.depth());
        let saved = Saved::Config(std::mem::replace(&mut self.config, child));
        Scope { ctx: self, saved }
    }

    /// Replace the math-mode state until the returned scope is dropped.
    pub(crate) fn with_math_state(&mut self, state: MathModeState) -> Scope<'_, 'r> {
        log::trace!("math state {:?} -> {:?}", self.math, state);
        let saved = Saved::MathState(std::mem::replace(&mut self.math, state));
        Scope { ctx: self, saved }
    }

    pub(crate) fn render_math(&mut self, markup: &str, options: &RenderOptions) -> Result<String> {
        self.renders += 1;
        self.renderer.render(markup, options)
    }
}

enum Saved {
    Config(ConfigScope),
    MathState(MathModeState),
}

/// A context with one scoped change applied. Dereferences to the [`Context`].
pub struct Scope<'c, 'r> {
    ctx: &'c mut Context<'r>,
    saved: Saved,
}

impl<'r> Deref for Scope<'_, 'r> {
    type Target = Context<'r>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<'r> DerefMut for Scope<'_, 'r> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        match &self.saved {
            Saved::Config(config) => self.ctx.config = config.clone(),
            Saved::MathState(state) => {
                log::trace!("math state {:?} restored", state);
                self.ctx.math = *state;
            }
        }
    }
}
