// ABOUTME: Text rendering of layout snapshots.
// ABOUTME: Prints one window per line, indented by depth, with its position and tags.

use std::fmt::Write;

use tw_layout::{Axis, FixedSize, LayoutSnapshot, Side, WindowSnapshot};

/// Render the whole layout as an indented tree. The selected window is
/// marked with `*`.
pub fn render_tree(snapshot: &LayoutSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "frame {}x{}",
        snapshot.size.height, snapshot.size.width
    );
    render_window(&mut out, &snapshot.root, snapshot, 1);
    out
}

fn render_window(
    out: &mut String,
    window: &WindowSnapshot,
    snapshot: &LayoutSnapshot,
    depth: usize,
) {
    let rect = window.rect;
    let marker = if window.id == snapshot.selected { "*" } else { "" };
    let _ = write!(
        out,
        "{:indent$}{}{} {}x{} at {},{}",
        "",
        window.id,
        marker,
        rect.height,
        rect.width,
        rect.top,
        rect.left,
        indent = depth * 2
    );
    match window.axis {
        Some(Axis::Vertical) => out.push_str(" column"),
        Some(Axis::Horizontal) => out.push_str(" row"),
        None => {}
    }
    if let Some(fixed) = window.fixed {
        let label = match fixed {
            FixedSize::Height => "height",
            FixedSize::Width => "width",
            FixedSize::Both => "both",
        };
        let _ = write!(out, " fixed={}", label);
    }
    if let Some(side) = window.side {
        let _ = write!(out, " side={}", side_label(side));
    }
    if let Some(atom) = window.atom {
        let _ = write!(out, " atom={}", atom.0);
    }
    out.push('\n');

    for child in &window.children {
        render_window(out, child, snapshot, depth + 1);
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Top => "top",
        Side::Right => "right",
        Side::Bottom => "bottom",
        Side::Main => "main",
    }
}
