//! Floating node network and background grid.

use folio_core::{NetworkParams, Point, Viewport};
use rand::Rng;

use crate::color::{SKY, VIOLET};
use crate::surface::Surface;

const LINK_ALPHA: f32 = 0.1;
const GRID_ALPHA: f32 = 0.05;

/// A drifting node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl Node {
    fn random<R: Rng + ?Sized>(viewport: Viewport, max_speed: f32, rng: &mut R) -> Self {
        let mut velocity = || {
            if max_speed > 0.0 {
                rng.gen_range(-max_speed..max_speed)
            } else {
                0.0
            }
        };
        let vx = velocity();
        let vy = velocity();

        Self {
            x: rng.r#gen::<f32>() * viewport.width.max(0.0),
            y: rng.r#gen::<f32>() * viewport.height.max(0.0),
            vx,
            vy,
            radius: rng.gen_range(1.0..3.0),
            opacity: rng.gen_range(0.3..0.8),
        }
    }

    /// Move by velocity and wrap to the opposite edge when leaving the viewport.
    pub fn advance(&mut self, viewport: Viewport) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 {
            self.x = viewport.width;
        }
        if self.x > viewport.width {
            self.x = 0.0;
        }
        if self.y < 0.0 {
            self.y = viewport.height;
        }
        if self.y > viewport.height {
            self.y = 0.0;
        }
    }

    /// Current position.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Nodes that drift across the viewport and link up with close neighbours.
#[derive(Debug, Clone)]
pub struct NodeNetwork {
    nodes: Vec<Node>,
    params: NetworkParams,
    viewport: Viewport,
}

impl NodeNetwork {
    /// Scatter `node_count` nodes across the viewport.
    pub fn new<R: Rng + ?Sized>(params: NetworkParams, viewport: Viewport, rng: &mut R) -> Self {
        let nodes = (0..params.node_count)
            .map(|_| Node::random(viewport, params.speed(), rng))
            .collect();
        Self {
            nodes,
            params,
            viewport,
        }
    }

    /// Rescale node positions into a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        let scale = |value: f32, old: f32, new: f32| {
            if old > 0.0 { value / old * new } else { 0.0 }
        };
        for node in &mut self.nodes {
            node.x = scale(node.x, self.viewport.width, viewport.width);
            node.y = scale(node.y, self.viewport.height, viewport.height);
        }
        self.viewport = viewport;
    }

    /// The nodes in draw order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Index pairs of nodes closer than the link distance.
    pub fn links(&self) -> Vec<(usize, usize)> {
        let mut links = Vec::new();
        for i in 0..self.nodes.len() {
            for j in (i + 1)..self.nodes.len() {
                let distance = self.nodes[i].position().distance(self.nodes[j].position());
                if distance < self.params.link_distance {
                    links.push((i, j));
                }
            }
        }
        links
    }

    /// Draw every node, move it, then draw the links between close pairs.
    pub fn update<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        for node in &mut self.nodes {
            surface.fill_circle(node.position(), node.radius, VIOLET, node.opacity);
            node.advance(self.viewport);
        }

        for (i, j) in self.links() {
            surface.stroke_line(
                self.nodes[i].position(),
                self.nodes[j].position(),
                VIOLET,
                LINK_ALPHA,
            );
        }
    }
}

/// Draw vertical and horizontal lines every `spacing` units.
pub fn draw_grid<S: Surface + ?Sized>(surface: &mut S, viewport: Viewport, spacing: f32) {
    if !spacing.is_finite() || spacing < 1.0 || viewport.is_empty() {
        return;
    }

    let mut x = 0.0;
    while x < viewport.width {
        surface.stroke_line(
            Point::new(x, 0.0),
            Point::new(x, viewport.height),
            SKY,
            GRID_ALPHA,
        );
        x += spacing;
    }

    let mut y = 0.0;
    while y < viewport.height {
        surface.stroke_line(
            Point::new(0.0, y),
            Point::new(viewport.width, y),
            SKY,
            GRID_ALPHA,
        );
        y += spacing;
    }
}
