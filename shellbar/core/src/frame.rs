//! Frame Layout
//!
//! A frame is the bracketed track plus its label, derived on demand from the
//! renderer's position. Nothing here holds state.
//!
//! ```text
//! [||||||||||||||||||||||||||||||------------------------------] 50.0%
//! ```

use std::fmt;

/// Number of slots in the track; a full track is 100%
pub const TRACK_WIDTH: usize = 60;

/// Opening bracket of the track
pub const BAR_OPEN: char = '[';

/// Closing bracket of the track
pub const BAR_CLOSE: char = ']';

/// Glyph for slots not reached yet
pub const PENDING_GLYPH: char = '-';

/// Glyph for slots already covered
pub const PROGRESS_GLYPH: char = '|';

/// Label of a freshly started (or wrapped) track
pub const START_LABEL: &str = "  0%";

/// Label of the completion frame
pub const DONE_LABEL: &str = "100%";

/// Which label a frame carries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameLabel {
    /// Empty track, `  0%`
    Start,
    /// Animated track at the given position, e.g. `50.0%`
    Live(usize),
    /// Full track after completion, `100%`
    Done,
}

/// A single rendered state of the progress bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    filled: usize,
    label: FrameLabel,
}

impl Frame {
    /// Empty track shown at start and after a wrap
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            filled: 0,
            label: FrameLabel::Start,
        }
    }

    /// Track with `position` slots filled
    ///
    /// Positions beyond [`TRACK_WIDTH`] are clamped.
    #[must_use]
    pub fn at(position: usize) -> Self {
        let position = position.min(TRACK_WIDTH);
        Self {
            filled: position,
            label: FrameLabel::Live(position),
        }
    }

    /// Full track shown once the session finishes
    #[must_use]
    pub const fn complete() -> Self {
        Self {
            filled: TRACK_WIDTH,
            label: FrameLabel::Done,
        }
    }

    /// Number of slots drawn with [`PROGRESS_GLYPH`]
    #[must_use]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// The label printed after the closing bracket
    #[must_use]
    pub fn label(&self) -> String {
        match self.label {
            FrameLabel::Start => START_LABEL.to_string(),
            FrameLabel::Live(position) => percent_label(position),
            FrameLabel::Done => DONE_LABEL.to_string(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = String::with_capacity(TRACK_WIDTH + 10);
        line.push(BAR_OPEN);
        line.extend(std::iter::repeat(PROGRESS_GLYPH).take(self.filled));
        line.extend(std::iter::repeat(PENDING_GLYPH).take(TRACK_WIDTH - self.filled));
        line.push(BAR_CLOSE);
        write!(f, "{line} {}", self.label())
    }
}

/// Whole-number percentage of the track covered at `position`
///
/// Rounds half up, matching `round(position / TRACK_WIDTH * 100)`.
#[must_use]
pub fn percent(position: usize) -> usize {
    let position = position.min(TRACK_WIDTH);
    (position * 100 + TRACK_WIDTH / 2) / TRACK_WIDTH
}

/// Live label for `position`, always with one decimal place (`"50.0%"`)
#[must_use]
pub fn percent_label(position: usize) -> String {
    format!("{}.0%", percent(position))
}
