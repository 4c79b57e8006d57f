//! Drawing surface abstraction shared by patterns and effects.
//!
//! Renderers only ever talk to a [`Surface`]; the host decides whether that
//! is a real canvas, the in-memory [`PixelCanvas`] or a [`DrawList`] that just
//! records what was asked for.

mod raster;

pub use raster::PixelCanvas;

use crate::color::Rgba;

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn covering(dimensions: Dimensions) -> Self {
        Self::new(0.0, 0.0, dimensions.width, dimensions.height)
    }
}

/// Rotated ellipse described by its center, radii and rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub radius_x: f32,
    pub radius_y: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Rgba, width: f32) -> Self {
        Self { color, width }
    }
}

/// Minimal 2D drawing API, modelled on an immediate-mode canvas.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke);
    /// Strokes a connected path through `points`.
    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke);
    fn stroke_circle(&mut self, center: Point, radius: f32, stroke: Stroke);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
    fn stroke_ellipse(&mut self, ellipse: Ellipse, stroke: Stroke);
}

/// One recorded call on a [`DrawList`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Rgba },
    Line { from: Point, to: Point, stroke: Stroke },
    Polyline { points: Vec<Point>, stroke: Stroke },
    StrokeCircle { center: Point, radius: f32, stroke: Stroke },
    FillCircle { center: Point, radius: f32, color: Rgba },
    Ellipse { ellipse: Ellipse, stroke: Stroke },
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Point, &Point)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, .. } => Some((from, to)),
            _ => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }

    pub fn ellipses(&self) -> impl Iterator<Item = &Ellipse> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Ellipse { ellipse, .. } => Some(ellipse),
            _ => None,
        })
    }

    pub fn rects(&self) -> impl Iterator<Item = (&Rect, &Rgba)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::FillRect { rect, color } => Some((rect, color)),
            _ => None,
        })
    }
}

impl Surface for DrawList {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            stroke,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_ellipse(&mut self, ellipse: Ellipse, stroke: Stroke) {
        self.commands.push(DrawCommand::Ellipse { ellipse, stroke });
    }
}

/// Reads bin `index` of `frame` as a `0..=1` intensity; missing bins read as
/// silence.
pub fn bin_level(frame: &[u8], index: usize) -> f32 {
    frame.get(index).copied().map_or(0.0, |value| value as f32 / 255.0)
}

/// Converts the user-facing `sensitivity` (neutral at 50) into a gain.
pub fn sensitivity_gain(sensitivity: f32) -> f32 {
    sensitivity / 50.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn records_commands_in_order() {
        let mut list = DrawList::new();
        let stroke = Stroke::new(Rgb::new(1, 2, 3).opaque(), 2.0);

        list.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgb::BLACK.with_alpha(0.1));
        list.stroke_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), stroke);
        list.stroke_polyline(&[Point::new(0.0, 0.0), Point::new(2.0, 0.0)], stroke);

        assert_eq!(list.len(), 3);
        assert!(matches!(list.commands()[0], DrawCommand::FillRect { .. }));
        assert_eq!(list.lines().count(), 1);
        assert_eq!(list.polylines().next().map(<[Point]>::len), Some(2));
    }

    #[test]
    fn out_of_range_bins_are_silent() {
        assert_eq!(bin_level(&[255, 51], 1), 0.2);
        assert_eq!(bin_level(&[255], 5), 0.0);
    }
}
