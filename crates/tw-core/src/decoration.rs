// ABOUTME: Per-window decoration settings.
// ABOUTME: Mode/header lines and fringe/scroll bar columns that eat into a window's minimum size.

use serde::{Deserialize, Serialize};

/// Lines and columns a leaf window spends on decorations rather than content.
///
/// The layout engine never draws these; it only needs their extent to
/// compute how small a window may get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decoration {
    /// Status line at the bottom of the window
    pub mode_line: bool,

    /// Title line at the top of the window
    pub header_line: bool,

    /// Fringe columns on the left edge
    pub left_fringe: u16,

    /// Fringe columns on the right edge
    pub right_fringe: u16,

    /// Scroll bar columns
    pub scroll_bar: u16,

    /// Text margins. Inherited by split windows but not part of the minimum width.
    pub left_margin: u16,
    pub right_margin: u16,
}

impl Default for Decoration {
    fn default() -> Self {
        Self {
            mode_line: true,
            header_line: false,
            left_fringe: 0,
            right_fringe: 0,
            scroll_bar: 0,
            left_margin: 0,
            right_margin: 0,
        }
    }
}

impl Decoration {
    /// A window with no decorations at all.
    pub fn bare() -> Self {
        Self {
            mode_line: false,
            ..Self::default()
        }
    }

    /// Lines taken by mode and header line.
    pub fn lines(&self) -> i32 {
        i32::from(self.mode_line) + i32::from(self.header_line)
    }

    /// Columns taken by fringes and scroll bar.
    pub fn columns(&self) -> i32 {
        i32::from(self.left_fringe) + i32::from(self.right_fringe) + i32::from(self.scroll_bar)
    }
}
