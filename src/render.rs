//! Terminal renderers for the wheel and the confetti overlay.
//!
//! The wheel is rasterised at two pixels per cell using the upper half
//! block, which keeps pixels close to square on common terminal fonts.

use crate::{
    confetti::{
        ConfettiShape,
        Particle,
    },
    options,
    tween::{
        SegmentSpan,
        segment_spans,
    },
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{
        Color,
        Modifier,
        Style,
    },
    widgets::Widget,
};

pub type Rgb = (u8, u8, u8);

pub const WHEEL_COLORS: [Rgb; 12] = [
    (0xFF, 0x6B, 0x6B), // coral red
    (0x4E, 0xCD, 0xC4), // teal
    (0xFF, 0xE6, 0x6D), // sunny yellow
    (0x95, 0xE1, 0xD3), // mint
    (0xF3, 0x81, 0x81), // salmon
    (0xAA, 0x96, 0xDA), // lavender
    (0xFC, 0xBA, 0xD3), // pink
    (0xA8, 0xD8, 0xEA), // sky blue
    (0xFF, 0x9F, 0x43), // orange
    (0x6B, 0xCB, 0x77), // green
    (0x4D, 0x96, 0xFF), // blue
    (0xFF, 0xD9, 0x3D), // gold
];

const WHITE: Rgb = (0xFF, 0xFF, 0xFF);
const EMPTY_FILL: Rgb = (0xF5, 0xF5, 0xF5);
const EMPTY_BORDER: Rgb = (0xE0, 0xE0, 0xE0);
const EMPTY_TEXT: Rgb = (0x99, 0x99, 0x99);
const LABEL_TEXT: Rgb = (0x1A, 0x1A, 0x1A);
const HUB_FILL: Rgb = (0xF0, 0xF0, 0xF0);
const HUB_DOT: Rgb = (0x33, 0x33, 0x33);
const POINTER: Rgb = (0xE0, 0x2D, 0x2D);

const EMPTY_MESSAGE: &str = "Add options to spin";
const HALF_BLOCK: &str = "▀";
const LABEL_RADIUS: f64 = 0.62;
const HUB_RADIUS: f64 = 0.15;
const HUB_DOT_RADIUS: f64 = 0.05;
/// Border half-width in pixels, measured along the arc.
const BORDER_WIDTH: f64 = 0.45;
/// Segments narrower than this keep their colour but lose the label.
const MIN_LABEL_SWEEP: f64 = 8.0;

pub fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

/// Linear mix: `alpha` of `fg` over `bg`.
pub fn blend(fg: Rgb, bg: Rgb, alpha: f64) -> Rgb {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (f64::from(f) * alpha + f64::from(b) * (1.0 - alpha)).round() as u8;
    (mix(fg.0, bg.0), mix(fg.1, bg.1), mix(fg.2, bg.2))
}

pub fn segment_color(index: usize) -> Rgb {
    WHEEL_COLORS[index % WHEEL_COLORS.len()]
}

/// Clockwise angle in degrees from 12 o'clock for an offset from the centre,
/// with y growing downward.
pub fn clockwise_angle(dx: f64, dy: f64) -> f64 {
    dx.atan2(-dy).to_degrees().rem_euclid(360.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pixel {
    Outside,
    Border,
    Hub,
    HubDot,
    Segment { index: usize },
}

/// Geometry of one wheel frame: what sits under each virtual pixel.
#[derive(Clone, Debug)]
pub struct WheelGeometry {
    pub spans: Vec<SegmentSpan>,
    pub rotation: f64,
    pub radius: f64,
}

impl WheelGeometry {
    pub fn new(count: usize, rotation: f64, radius: f64, collapsing: Option<(usize, f64)>) -> Self {
        let (shrinking, progress) = match collapsing {
            Some((index, progress)) => (Some(index), progress),
            None => (None, 0.0),
        };
        WheelGeometry {
            spans: segment_spans(count, shrinking, progress),
            rotation,
            radius,
        }
    }

    /// Classifies the pixel at offset (`dx`, `dy`) from the wheel centre.
    pub fn sample(&self, dx: f64, dy: f64) -> Pixel {
        let distance = (dx * dx + dy * dy).sqrt();
        if distance > self.radius {
            return Pixel::Outside;
        }
        if distance <= self.radius * HUB_DOT_RADIUS {
            return Pixel::HubDot;
        }
        if distance <= self.radius * HUB_RADIUS {
            return Pixel::Hub;
        }
        if distance > self.radius - BORDER_WIDTH * 2.0 {
            return Pixel::Border;
        }
        let local = (clockwise_angle(dx, dy) - self.rotation).rem_euclid(360.0);
        let Some(index) = self.spans.iter().position(|s| s.sweep > 0.0 && s.contains(local))
        else {
            // float slack at the 360 seam belongs to the last visible segment
            return self
                .spans
                .iter()
                .rposition(|s| s.sweep > 0.0)
                .map_or(Pixel::Outside, |index| Pixel::Segment { index });
        };
        if self.spans.len() > 1 && self.near_boundary(local, distance) {
            return Pixel::Border;
        }
        Pixel::Segment { index }
    }

    fn near_boundary(&self, local: f64, distance: f64) -> bool {
        self.spans.iter().filter(|s| s.sweep > 0.0).any(|s| {
            let delta = (local - s.start).rem_euclid(360.0);
            let delta = delta.min(360.0 - delta);
            delta.to_radians() * distance < BORDER_WIDTH
        })
    }

    /// Screen-space angle (clockwise from top) of a segment's centre.
    pub fn label_angle(&self, index: usize) -> Option<f64> {
        self.spans
            .get(index)
            .map(|s| (s.mid() + self.rotation).rem_euclid(360.0))
    }
}

/// Draws the wheel, its labels, the hub and the fixed pointer.
pub struct WheelWidget<'a> {
    pub options: &'a [String],
    pub rotation: f64,
    pub winner_index: Option<usize>,
    pub highlight_winner: bool,
    /// Index being dissolved or collapsed, with its alpha and collapse progress.
    pub removal: Option<(usize, f64, f64)>,
}

impl WheelWidget<'_> {
    fn pixel_color(&self, geometry: &WheelGeometry, dx: f64, dy: f64) -> Option<Rgb> {
        match geometry.sample(dx, dy) {
            Pixel::Outside => None,
            Pixel::Border => Some(WHITE),
            Pixel::Hub => Some(HUB_FILL),
            Pixel::HubDot => Some(HUB_DOT),
            Pixel::Segment { index } => {
                let base = segment_color(index);
                match self.removal {
                    Some((removing, alpha, _)) if removing == index => {
                        Some(blend(base, WHITE, alpha))
                    }
                    _ => Some(base),
                }
            }
        }
    }

    fn render_empty(area: Rect, buf: &mut Buffer, radius: f64, cx: f64, cy: f64) {
        raster(area, buf, cx, cy, |dx, dy| {
            let distance = (dx * dx + dy * dy).sqrt();
            if distance > radius {
                None
            } else if distance > radius - BORDER_WIDTH * 2.0 {
                Some(EMPTY_BORDER)
            } else {
                Some(EMPTY_FILL)
            }
        });
        let width = options::display_width(EMPTY_MESSAGE) as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 2;
        buf.set_stringn(
            x,
            y,
            EMPTY_MESSAGE,
            area.width as usize,
            Style::default().fg(rgb(EMPTY_TEXT)).bg(rgb(EMPTY_FILL)),
        );
    }

    fn render_labels(&self, area: Rect, buf: &mut Buffer, geometry: &WheelGeometry, cx: f64, cy: f64) {
        let count = self.options.len();
        for (index, option) in self.options.iter().enumerate() {
            let Some(span) = geometry.spans.get(index) else {
                continue;
            };
            if span.sweep < MIN_LABEL_SWEEP {
                continue;
            }
            let fading = match self.removal {
                Some((removing, alpha, _)) if removing == index => Some(alpha),
                _ => None,
            };
            if fading.is_some_and(|alpha| alpha < 0.5) {
                continue;
            }
            let Some(angle) = geometry.label_angle(index) else {
                continue;
            };
            let is_winner = self.highlight_winner && self.winner_index == Some(index);
            let mut label = options::truncate_label(option, count);
            if is_winner {
                label = format!("★ {label}");
            }
            let r = geometry.radius * LABEL_RADIUS;
            let px = cx + angle.to_radians().sin() * r;
            let py = cy - angle.to_radians().cos() * r;
            let width = options::display_width(&label) as f64;
            let col = (px - width / 2.0).round().max(0.0) as u16;
            let row = (py / 2.0).floor().max(0.0) as u16;
            if row >= area.height || col >= area.width {
                continue;
            }
            let mut bg = segment_color(index);
            if let Some(alpha) = fading {
                bg = blend(bg, WHITE, alpha);
            }
            let mut style = Style::default().fg(rgb(LABEL_TEXT)).bg(rgb(bg));
            if is_winner {
                style = style.add_modifier(Modifier::BOLD);
            }
            buf.set_stringn(
                area.x + col,
                area.y + row,
                &label,
                (area.width - col) as usize,
                style,
            );
        }
    }
}

impl Widget for WheelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let px_width = f64::from(area.width);
        let px_height = f64::from(area.height) * 2.0;
        let cx = px_width / 2.0;
        // first row is reserved for the pointer
        let cy = 2.0 + (px_height - 2.0) / 2.0;
        let radius = (px_width.min(px_height - 2.0) / 2.0 - 1.0).max(1.0);

        if self.options.is_empty() {
            Self::render_empty(area, buf, radius, cx, cy);
            return;
        }

        let collapsing = self
            .removal
            .filter(|(_, _, progress)| *progress > 0.0)
            .map(|(index, _, progress)| (index, progress));
        let geometry = WheelGeometry::new(self.options.len(), self.rotation, radius, collapsing);
        raster(area, buf, cx, cy, |dx, dy| self.pixel_color(&geometry, dx, dy));
        self.render_labels(area, buf, &geometry, cx, cy);

        let pointer_x = area.x + (cx.floor() as u16).min(area.width - 1);
        if let Some(cell) = buf.cell_mut((pointer_x, area.y)) {
            cell.set_symbol("▼").set_fg(rgb(POINTER));
        }
    }
}

/// Paints every cell in `area` from two vertically stacked pixel samples.
/// `color_at` receives offsets from the centre (`cx`, `cy`) in pixels.
fn raster<F>(area: Rect, buf: &mut Buffer, cx: f64, cy: f64, color_at: F)
where
    F: Fn(f64, f64) -> Option<Rgb>,
{
    for row in 0..area.height {
        for col in 0..area.width {
            let x = f64::from(col) + 0.5 - cx;
            let top_y = f64::from(row) * 2.0 + 0.5 - cy;
            let top = color_at(x, top_y);
            let bottom = color_at(x, top_y + 1.0);
            if top.is_none() && bottom.is_none() {
                continue;
            }
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_symbol(HALF_BLOCK)
                    .set_fg(top.map_or(Color::Reset, rgb))
                    .set_bg(bottom.map_or(Color::Reset, rgb));
            }
        }
    }
}

/// Overlay that draws particles on top of whatever is already rendered.
pub struct ConfettiWidget<I> {
    pub particles: I,
    pub viewport_height: f64,
}

pub fn particle_glyph(particle: &Particle) -> &'static str {
    match particle.shape {
        ConfettiShape::Rect => {
            let tilt = particle.rotation.rem_euclid(180.0);
            if (45.0..135.0).contains(&tilt) { "▮" } else { "▬" }
        }
        ConfettiShape::Circle => {
            if particle.size > 10.0 { "●" } else { "•" }
        }
        ConfettiShape::Star => {
            if particle.size > 10.0 { "★" } else { "✦" }
        }
    }
}

impl<'a, I> Widget for ConfettiWidget<I>
where
    I: Iterator<Item = &'a Particle>,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() || self.viewport_height <= 0.0 {
            return;
        }
        for particle in self.particles {
            if particle.y < 0.0 || particle.opacity < 0.05 {
                continue;
            }
            let col = (particle.x / 100.0 * f64::from(area.width)).floor();
            let row = (particle.y / self.viewport_height * f64::from(area.height)).floor();
            if col < 0.0 || row < 0.0 || col >= f64::from(area.width) || row >= f64::from(area.height) {
                continue;
            }
            let color = blend(particle.color, (0, 0, 0), particle.opacity);
            if let Some(cell) = buf.cell_mut((area.x + col as u16, area.y + row as u16)) {
                cell.set_symbol(particle_glyph(particle)).set_fg(rgb(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::confetti::CONFETTI_COLORS;

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clockwise_angle__measures_from_twelve_o_clock() {
        assert!((clockwise_angle(0.0, -1.0) - 0.0).abs() < 1e-9);
        assert!((clockwise_angle(1.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((clockwise_angle(0.0, 1.0) - 180.0).abs() < 1e-9);
        assert!((clockwise_angle(-1.0, 0.0) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn blend__interpolates_channels() {
        assert_eq!(blend((200, 100, 0), WHITE, 1.0), (200, 100, 0));
        assert_eq!(blend((200, 100, 0), WHITE, 0.0), WHITE);
        assert_eq!(blend((0, 0, 0), (200, 200, 200), 0.5), (100, 100, 100));
    }

    #[test]
    fn segment_color__cycles_palette() {
        assert_eq!(segment_color(0), segment_color(12));
        assert_ne!(segment_color(0), segment_color(1));
    }

    #[test]
    fn sample__segment_under_pointer_matches_pointer_index() {
        // given
        let rotation = 100.0;
        let geometry = WheelGeometry::new(4, rotation, 100.0, None);

        // when
        let pixel = geometry.sample(0.0, -60.0);

        // then
        let expected = crate::wheel::pointer_index(rotation, 4);
        assert_eq!(pixel, Pixel::Segment { index: expected });
    }

    #[test]
    fn sample__classifies_hub_rim_and_outside() {
        let geometry = WheelGeometry::new(3, 0.0, 100.0, None);
        assert_eq!(geometry.sample(0.0, 0.0), Pixel::HubDot);
        assert_eq!(geometry.sample(10.0, 0.0), Pixel::Hub);
        assert_eq!(geometry.sample(0.0, 99.8), Pixel::Border);
        assert_eq!(geometry.sample(0.0, 101.0), Pixel::Outside);
    }

    #[test]
    fn sample__draws_border_on_segment_edges() {
        // segment 1 of 4 starts at 90 degrees, i.e. straight right
        let geometry = WheelGeometry::new(4, 0.0, 100.0, None);
        assert_eq!(geometry.sample(50.0, 0.0), Pixel::Border);
        assert_eq!(geometry.sample(50.0, 20.0), Pixel::Segment { index: 1 });
    }

    #[test]
    fn sample__collapsed_segment_disappears() {
        // given
        let geometry = WheelGeometry::new(2, 0.0, 100.0, Some((0, 1.0)));

        // when
        let left = geometry.sample(-50.0, 10.0);
        let right = geometry.sample(50.0, 10.0);

        // then
        assert_eq!(left, Pixel::Segment { index: 1 });
        assert_eq!(right, Pixel::Segment { index: 1 });
    }

    #[test]
    fn render__empty_wheel_shows_placeholder() {
        // given
        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        let widget = WheelWidget {
            options: &[],
            rotation: 0.0,
            winner_index: None,
            highlight_winner: false,
            removal: None,
        };

        // when
        widget.render(area, &mut buf);

        // then
        let row: String = (0..area.width)
            .map(|x| buf[(x, area.height / 2)].symbol().to_string())
            .collect();
        assert!(row.contains(EMPTY_MESSAGE), "row was {row:?}");
    }

    #[test]
    fn render__draws_pointer_and_labels() {
        // given
        let area = Rect::new(0, 0, 60, 30);
        let mut buf = Buffer::empty(area);
        let opts = options(&["Pizza", "Sushi"]);
        let widget = WheelWidget {
            options: &opts,
            rotation: 0.0,
            winner_index: Some(0),
            highlight_winner: true,
            removal: None,
        };

        // when
        widget.render(area, &mut buf);

        // then
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("▼"));
        assert!(text.contains("★ Pizza"));
        assert!(text.contains("Sushi"));
    }

    #[test]
    fn render__skips_dissolved_label() {
        let area = Rect::new(0, 0, 60, 30);
        let mut buf = Buffer::empty(area);
        let opts = options(&["Pizza", "Sushi", "Tacos"]);
        let widget = WheelWidget {
            options: &opts,
            rotation: 0.0,
            winner_index: Some(1),
            highlight_winner: false,
            removal: Some((1, 0.2, 0.0)),
        };

        widget.render(area, &mut buf);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(!text.contains("Sushi"));
        assert!(text.contains("Tacos"));
    }

    #[test]
    fn particle_glyph__depends_on_shape() {
        let mut particle = Particle {
            x: 0.0,
            y: 0.0,
            size: 12.0,
            color: CONFETTI_COLORS[0],
            rotation: 0.0,
            speed_x: 0.0,
            speed_y: 0.0,
            rotation_speed: 0.0,
            shape: ConfettiShape::Rect,
            opacity: 1.0,
            wobble: 0.0,
            wobble_speed: 0.0,
        };
        assert_eq!(particle_glyph(&particle), "▬");
        particle.rotation = 90.0;
        assert_eq!(particle_glyph(&particle), "▮");
        particle.shape = ConfettiShape::Star;
        assert_eq!(particle_glyph(&particle), "★");
        particle.shape = ConfettiShape::Circle;
        particle.size = 6.0;
        assert_eq!(particle_glyph(&particle), "•");
    }

    #[test]
    fn confetti_widget__maps_virtual_pixels_to_cells() {
        // given
        let area = Rect::new(0, 0, 10, 10);
        let mut buf = Buffer::empty(area);
        let particle = Particle {
            x: 55.0,
            y: 400.0,
            size: 6.0,
            color: CONFETTI_COLORS[1],
            rotation: 0.0,
            speed_x: 0.0,
            speed_y: 0.0,
            rotation_speed: 0.0,
            shape: ConfettiShape::Circle,
            opacity: 1.0,
            wobble: 0.0,
            wobble_speed: 0.0,
        };
        let particles = [particle];

        // when
        ConfettiWidget {
            particles: particles.iter(),
            viewport_height: 800.0,
        }
        .render(area, &mut buf);

        // then
        assert_eq!(buf[(5, 5)].symbol(), "•");
        assert_eq!(buf[(5, 5)].fg, rgb(CONFETTI_COLORS[1]));
    }
}
