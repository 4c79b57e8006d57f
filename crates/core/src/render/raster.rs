use std::io::Write;

use super::{Dimensions, Ellipse, Point, Rect, Stroke, Surface};
use crate::color::{Rgb, Rgba};

/// Opaque RGB software canvas with source-over blending.
///
/// Shapes are rasterised by testing pixel centres inside each shape's
/// bounding box, which is plenty for a few dozen primitives per frame.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width as f32, self.height as f32)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Number of pixels that are not pure black.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&pixel| pixel != Rgb::BLACK).count()
    }

    /// Writes the canvas as a binary PPM (`P6`) image.
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&[pixel.r, pixel.g, pixel.b]);
        }
        writer.write_all(&bytes)?;
        writer.flush()
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        let dst = &mut self.pixels[y * self.width + x];
        let mix = |src: u8, dst: u8| {
            (src as f32 * color.a + dst as f32 * (1.0 - color.a)).round() as u8
        };
        *dst = Rgb::new(mix(color.r, dst.r), mix(color.g, dst.g), mix(color.b, dst.b));
    }

    /// Visits every pixel centre inside the clipped box `[x0, x1] x [y0, y1]`
    /// and blends `color` where `inside` holds.
    fn shade(
        &mut self,
        (x0, y0, x1, y1): (f32, f32, f32, f32),
        color: Rgba,
        inside: impl Fn(f32, f32) -> bool,
    ) {
        if color.a <= 0.0 || ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return;
        }
        let clip_x = |v: f32| v.floor().clamp(0.0, self.width as f32) as usize;
        let clip_y = |v: f32| v.floor().clamp(0.0, self.height as f32) as usize;
        let (left, right) = (clip_x(x0), clip_x(x1 + 1.0));
        let (top, bottom) = (clip_y(y0), clip_y(y1 + 1.0));

        for y in top..bottom {
            for x in left..right {
                if inside(x as f32 + 0.5, y as f32 + 0.5) {
                    self.blend(x, y, color);
                }
            }
        }
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

impl Surface for PixelCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let (x1, y1) = (rect.x + rect.width, rect.y + rect.height);
        self.shade((rect.x, rect.y, x1, y1), color, |x, y| {
            x >= rect.x && x < x1 && y >= rect.y && y < y1
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        let half = (stroke.width / 2.0).max(0.5);
        let bounds = (
            from.x.min(to.x) - half,
            from.y.min(to.y) - half,
            from.x.max(to.x) + half,
            from.y.max(to.y) + half,
        );
        self.shade(bounds, stroke.color, |x, y| {
            segment_distance(Point::new(x, y), from, to) <= half
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], stroke);
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, stroke: Stroke) {
        let half = (stroke.width / 2.0).max(0.5);
        let reach = radius.abs() + half;
        let bounds = (center.x - reach, center.y - reach, center.x + reach, center.y + reach);
        self.shade(bounds, stroke.color, |x, y| {
            let distance = ((x - center.x).powi(2) + (y - center.y).powi(2)).sqrt();
            (distance - radius).abs() <= half
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        let reach = radius.abs();
        let bounds = (center.x - reach, center.y - reach, center.x + reach, center.y + reach);
        self.shade(bounds, color, |x, y| {
            (x - center.x).powi(2) + (y - center.y).powi(2) <= radius * radius
        });
    }

    fn stroke_ellipse(&mut self, ellipse: Ellipse, stroke: Stroke) {
        let (rx, ry) = (ellipse.radius_x.abs(), ellipse.radius_y.abs());
        if rx <= f32::EPSILON || ry <= f32::EPSILON {
            return;
        }
        let half = (stroke.width / 2.0).max(0.5);
        let reach = rx.max(ry) + half;
        let center = ellipse.center;
        let (sin, cos) = ellipse.rotation.sin_cos();
        let scale = rx.min(ry);
        let bounds = (center.x - reach, center.y - reach, center.x + reach, center.y + reach);

        self.shade(bounds, stroke.color, |x, y| {
            let (dx, dy) = (x - center.x, y - center.y);
            let local_x = dx * cos + dy * sin;
            let local_y = -dx * sin + dy * cos;
            let radial = ((local_x / rx).powi(2) + (local_y / ry).powi(2)).sqrt();
            ((radial - 1.0) * scale).abs() <= half
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_fill_fades_towards_the_fill_colour() {
        let mut canvas = PixelCanvas::new(4, 4);
        let white = Rgb::new(255, 255, 255);
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), white.opaque());
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgb::BLACK.with_alpha(0.2));

        let pixel = canvas.pixel(1, 1).unwrap();
        assert_eq!(pixel, Rgb::new(204, 204, 204));
    }

    #[test]
    fn shapes_are_clipped_to_the_canvas() {
        let mut canvas = PixelCanvas::new(10, 10);
        let stroke = Stroke::new(Rgb::new(255, 0, 0).opaque(), 2.0);
        canvas.stroke_line(Point::new(-50.0, 5.0), Point::new(50.0, 5.0), stroke);
        canvas.fill_circle(Point::new(100.0, 100.0), 5.0, Rgb::new(0, 255, 0).opaque());

        assert_eq!(canvas.pixel(0, 5), Some(Rgb::new(255, 0, 0)));
        assert_eq!(canvas.pixel(9, 5), Some(Rgb::new(255, 0, 0)));
        assert_eq!(canvas.lit_pixels(), 20);
    }

    #[test]
    fn ellipse_outline_leaves_the_centre_dark() {
        let mut canvas = PixelCanvas::new(40, 40);
        let ellipse = Ellipse {
            center: Point::new(20.0, 20.0),
            radius_x: 15.0,
            radius_y: 8.0,
            rotation: 0.3,
        };
        canvas.stroke_ellipse(ellipse, Stroke::new(Rgb::new(0, 0, 255).opaque(), 2.0));

        assert_eq!(canvas.pixel(20, 20), Some(Rgb::BLACK));
        assert!(canvas.lit_pixels() > 50);
    }

    #[test]
    fn writes_a_ppm_header_and_payload() {
        let canvas = PixelCanvas::new(3, 2);
        let mut bytes = Vec::new();
        canvas.write_ppm(&mut bytes).unwrap();

        assert!(bytes.starts_with(b"P6\n3 2\n255\n"));
        assert_eq!(bytes.len(), b"P6\n3 2\n255\n".len() + 3 * 2 * 3);
    }
}
