//! Math-mode state carried through evaluation.

/// Where the current evaluation point sits relative to math regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InMathMode {
    /// Not inside any math region.
    #[default]
    No,
    /// Inside the outermost open math region, which renders the whole group.
    Fresh,
    /// Inside a region nested in another one; an ancestor renders.
    Stale,
}

/// Math-mode state of one evaluation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MathModeState {
    pub in_math_mode: InMathMode,
    /// Display mode of the outermost open region. Meaningless when not in math.
    pub display_mode: bool,
}

impl MathModeState {
    /// The state inside a region entered from `self` with the given display mode.
    ///
    /// Only the outermost region chooses the display mode; nested regions inherit it.
    pub fn enter(self, display_mode: bool) -> Self {
        match self.in_math_mode {
            InMathMode::No => Self {
                in_math_mode: InMathMode::Fresh,
                display_mode,
            },
            InMathMode::Fresh | InMathMode::Stale => Self {
                in_math_mode: InMathMode::Stale,
                display_mode: self.display_mode,
            },
        }
    }

    pub fn is_math_mode(&self) -> bool {
        self.in_math_mode != InMathMode::No
    }

    pub fn is_display_mode(&self) -> bool {
        self.is_math_mode() && self.display_mode
    }

    /// Whether a region evaluated in this state must call the backend.
    pub fn owns_render(&self) -> bool {
        self.in_math_mode == InMathMode::Fresh
    }
}
