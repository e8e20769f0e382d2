use std::fmt::Write as _;
use std::io::Write;

use crate::sim::*;
use crate::util::Color;

const BURN_COLOR: Color = Color::rgb(255, 0, 0);
const TREE_COLOR: Color = Color::rgb(0, 255, 0);
const BURNED_COLOR: Color = Color::rgb(90, 60, 40);
const BACKGROUND_COLOR: Color = Color::rgb(50, 50, 50);

/// Anything that can show a forest. Sessions hand every frame they produce to
/// a surface right after the engine mutates.
pub trait RenderSurface {
    fn present_frame(&mut self, frame: &SimulationFrame);
}

/// The stylesheet class for a site. Empty ground has no class.
pub fn class_name(state: CellState) -> &'static str {
    match state {
        CellState::Empty => "",
        CellState::Tree => "tree",
        CellState::Burning => "burning",
        CellState::Burned => "burned",
    }
}

/// One `<div>` per site, styled by [`class_name`], in row-major order. The
/// container lays them out with the `--sites-per-side` CSS variable.
pub fn forest_markup(frame: &SimulationFrame) -> String {
    let mut markup = String::with_capacity(frame.grid.len() * 24);
    for state in &frame.grid {
        let _ = write!(markup, r#"<div class="{}"></div>"#, class_name(*state));
    }
    markup
}

fn glyph(state: CellState) -> char {
    match state {
        CellState::Empty => '.',
        CellState::Tree => 'T',
        CellState::Burning => '*',
        CellState::Burned => '#',
    }
}

fn color(state: CellState) -> Color {
    match state {
        CellState::Empty => BACKGROUND_COLOR,
        CellState::Tree => TREE_COLOR,
        CellState::Burning => BURN_COLOR,
        CellState::Burned => BURNED_COLOR,
    }
}

/// One line per row, one glyph per site.
pub fn frame_to_text(frame: &SimulationFrame, colored: bool) -> String {
    let mut text = String::new();
    for row in frame.rows() {
        for state in row {
            if colored {
                text.push_str(&color(*state).ansi_background());
            }
            text.push(glyph(*state));
        }
        if colored {
            text.push_str(Color::ANSI_RESET);
        }
        text.push('\n');
    }
    text
}

/// Prints each frame to a writer, followed by a blank line.
pub struct TextSurface<W: Write> {
    out: W,
    colored: bool,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for TextSurface<W> {
    fn present_frame(&mut self, frame: &SimulationFrame) {
        let text = frame_to_text(frame, self.colored);
        if let Err(e) = writeln!(self.out, "{text}") {
            log::warn!("failed to write frame: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> SimulationFrame {
        SimulationFrame {
            size: 2,
            grid: vec![
                CellState::Empty,
                CellState::Tree,
                CellState::Burning,
                CellState::Burned,
            ],
        }
    }

    #[test]
    fn markup_has_one_div_per_site() {
        assert_eq!(
            forest_markup(&frame()),
            r#"<div class=""></div><div class="tree"></div><div class="burning"></div><div class="burned"></div>"#
        );
    }

    #[test]
    fn plain_text_rows() {
        assert_eq!(frame_to_text(&frame(), false), ".T\n*#\n");
    }

    #[test]
    fn colored_text_resets_each_row() {
        let text = frame_to_text(&frame(), true);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|line| line.ends_with(Color::ANSI_RESET)));
        assert!(text.contains(&TREE_COLOR.ansi_background()));
    }

    #[test]
    fn text_surface_writes_frames() {
        let mut surface = TextSurface::new(Vec::new(), false);
        surface.present_frame(&frame());
        let out = String::from_utf8(surface.into_inner()).unwrap();
        assert_eq!(out, ".T\n*#\n\n");
    }
}
