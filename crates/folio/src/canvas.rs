//! Terminal drawing surface.
//!
//! Surface units are mapped onto terminal cells by a fixed cell size. Each
//! cell keeps one glyph, a colour and an opacity; drawing composites over
//! what is already there and rendering blends the colour towards black by
//! the cell's opacity.

use folio_core::{Point, Rgb, Viewport};
use folio_effects::{Gradient, Surface};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Cells dimmer than this are not drawn.
const MIN_VISIBLE: f32 = 0.02;

/// Where along a glyph's gradient its colour is sampled.
const GLYPH_SAMPLE: f32 = 0.5;

/// Circles at least this many cells across are filled with a soft shade.
const SOFT_FILL_CELLS: f32 = 6.0;

/// Most points sampled along one circle outline.
const MAX_CIRCLE_SAMPLES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Rgb,
    alpha: f32,
}

impl Cell {
    const BLANK: Cell = Cell {
        glyph: ' ',
        color: Rgb::BLACK,
        alpha: 0.0,
    };
}

/// A grid of composited cells implementing [`Surface`].
#[derive(Debug, Clone)]
pub struct TerminalCanvas {
    cols: u16,
    rows: u16,
    cell_width: f32,
    cell_height: f32,
    cells: Vec<Cell>,
}

impl TerminalCanvas {
    /// Construct an empty canvas; call [`resize`](Self::resize) before drawing.
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cols: 0,
            rows: 0,
            cell_width: cell_width.max(1.0),
            cell_height: cell_height.max(1.0),
            cells: Vec::new(),
        }
    }

    /// Resize to `cols` x `rows` cells, erasing the contents.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![Cell::BLANK; cols as usize * rows as usize];
    }

    /// The canvas size in surface units.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.cols as f32 * self.cell_width,
            self.rows as f32 * self.cell_height,
        )
    }

    /// Surface point at the centre of a cell.
    pub fn cell_center(&self, col: u16, row: u16) -> Point {
        Point::new(
            (col as f32 + 0.5) * self.cell_width,
            (row as f32 + 0.5) * self.cell_height,
        )
    }

    /// Glyph, colour and opacity of a cell.
    pub fn cell(&self, col: u16, row: u16) -> Option<(char, Rgb, f32)> {
        self.index(col as i64, row as i64)
            .map(|i| self.cells[i])
            .map(|c| (c.glyph, c.color, c.alpha))
    }

    fn index(&self, col: i64, row: i64) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    /// Cell coordinates of a surface point (may be out of bounds).
    fn locate(&self, point: Point) -> (i64, i64) {
        (
            (point.x / self.cell_width).floor() as i64,
            (point.y / self.cell_height).floor() as i64,
        )
    }

    /// Composite a glyph over a cell.
    fn plot(&mut self, col: i64, row: i64, glyph: char, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        let Some(i) = self.index(col, row) else {
            return;
        };
        let cell = &mut self.cells[i];
        let below = cell.alpha * (1.0 - alpha);
        let out = alpha + below;
        if out <= 0.0 {
            return;
        }
        cell.color = cell.color.lerp(color, alpha / out);
        if alpha >= below {
            cell.glyph = glyph;
        }
        cell.alpha = out;
    }

    fn plot_point(&mut self, point: Point, glyph: char, color: Rgb, alpha: f32) {
        let (col, row) = self.locate(point);
        self.plot(col, row, glyph, color, alpha);
    }

    /// The part of the segment inside the canvas (Liang-Barsky), or `None`
    /// if it misses the canvas or has a non-finite end.
    fn clip(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
            return None;
        }
        let bounds = self.viewport();
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let (mut enter, mut exit) = (0.0_f32, 1.0_f32);
        for (p, q) in [
            (-dx, from.x),
            (dx, bounds.width - from.x),
            (-dy, from.y),
            (dy, bounds.height - from.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                enter = enter.max(r);
            } else {
                exit = exit.min(r);
            }
            if enter > exit {
                return None;
            }
        }
        Some((
            Point::new(from.x + dx * enter, from.y + dy * enter),
            Point::new(from.x + dx * exit, from.y + dy * exit),
        ))
    }
}

/// Box-drawing character closest to the direction of a segment.
fn line_glyph(dx: f32, dy: f32) -> char {
    let angle = dy.abs().atan2(dx.abs()).to_degrees();
    if angle < 22.5 {
        '─'
    } else if angle > 67.5 {
        '│'
    } else if (dx > 0.0) == (dy > 0.0) {
        '╲'
    } else {
        '╱'
    }
}

impl Surface for TerminalCanvas {
    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    // The terminal background stands in for the fade colour.
    fn fade(&mut self, _color: Rgb, alpha: f32) {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        for cell in &mut self.cells {
            cell.alpha *= keep;
            if cell.alpha < MIN_VISIBLE {
                *cell = Cell::BLANK;
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32) {
        let soft = radius * 2.0 >= SOFT_FILL_CELLS * self.cell_width;
        let glyph = if soft {
            '░'
        } else if radius >= self.cell_width * 0.5 {
            '●'
        } else {
            '•'
        };

        let (min_col, min_row) = self.locate(Point::new(center.x - radius, center.y - radius));
        let (max_col, max_row) = self.locate(Point::new(center.x + radius, center.y + radius));
        let mut hit = false;
        for row in min_row.max(0)..=max_row.min(self.rows as i64 - 1) {
            for col in min_col.max(0)..=max_col.min(self.cols as i64 - 1) {
                let cell_center = self.cell_center(col as u16, row as u16);
                if cell_center.distance(center) <= radius {
                    self.plot(col, row, glyph, color, alpha);
                    hit = true;
                }
            }
        }
        // Smaller than a cell: light the cell under the centre.
        if !hit {
            self.plot_point(center, glyph, color, alpha);
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32) {
        if !radius.is_finite() {
            return;
        }
        let step = self.cell_width.min(self.cell_height) * 0.5;
        let samples = ((std::f32::consts::TAU * radius / step).ceil() as usize)
            .clamp(8, MAX_CIRCLE_SAMPLES);
        let mut last = None;
        for i in 0..samples {
            let theta = i as f32 / samples as f32 * std::f32::consts::TAU;
            let point = Point::new(center.x + radius * theta.cos(), center.y + radius * theta.sin());
            let cell = self.locate(point);
            if last != Some(cell) {
                self.plot(cell.0, cell.1, '·', color, alpha);
                last = Some(cell);
            }
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb, alpha: f32) {
        let glyph = line_glyph(to.x - from.x, to.y - from.y);
        let Some((from, to)) = self.clip(from, to) else {
            return;
        };
        let (c0, r0) = self.locate(from);
        let (c1, r1) = self.locate(to);
        let steps = (c1 - c0).abs().max((r1 - r0).abs());
        if steps == 0 {
            self.plot(c0, r0, glyph, color, alpha);
            return;
        }
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let col = c0 + ((c1 - c0) as f32 * t).round() as i64;
            let row = r0 + ((r1 - r0) as f32 * t).round() as i64;
            self.plot(col, row, glyph, color, alpha);
        }
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Rgb, alpha: f32) {
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.stroke_line(from, to, color, alpha);
        }
    }

    fn fill_glyph(&mut self, origin: Point, glyph: char, gradient: &Gradient) {
        let (color, alpha) = gradient.sample(GLYPH_SAMPLE);
        // The glyph sits in the cell just above its baseline.
        let body = Point::new(origin.x, origin.y - self.cell_height * 0.5);
        self.plot_point(body, glyph, color, alpha);
    }
}

impl Widget for &TerminalCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = self.cols.min(area.width);
        let rows = self.rows.min(area.height);
        for row in 0..rows {
            for col in 0..cols {
                let cell = self.cells[row as usize * self.cols as usize + col as usize];
                if cell.alpha < MIN_VISIBLE || cell.glyph == ' ' {
                    continue;
                }
                let fg = Rgb::BLACK.lerp(cell.color, cell.alpha);
                if let Some(target) = buf.cell_mut((area.x + col, area.y + row)) {
                    target.set_char(cell.glyph).set_fg(fg.into());
                }
            }
        }
    }
}
