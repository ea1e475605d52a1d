//! Grid <-> isometric screen conversion.
//!
//! Every other component goes through these two functions, so the tile size can
//! change without touching anything else.

use serde::{Deserialize, Serialize};

use crate::game::types::{GridCell, IsoPoint};

/// Size of one diamond tile in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileMetrics {
    pub width: f32,
    pub height: f32,
}

impl TileMetrics {
    fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    fn half_height(&self) -> f32 {
        self.height / 2.0
    }
}

/// Project a grid cell to its tile center, relative to the world origin.
pub fn grid_to_iso(cell: GridCell, metrics: TileMetrics) -> IsoPoint {
    IsoPoint {
        x: (i64::from(cell.x) - i64::from(cell.y)) as f32 * metrics.half_width(),
        y: (i64::from(cell.x) + i64::from(cell.y)) as f32 * metrics.half_height(),
    }
}

/// Pick the cell whose tile center is nearest to `point`.
///
/// `f32::round` rounds half away from zero.
pub fn iso_to_grid(point: IsoPoint, metrics: TileMetrics) -> GridCell {
    let u = point.x / metrics.half_width();
    let v = point.y / metrics.half_height();
    GridCell {
        x: ((u + v) / 2.0).round() as i32,
        y: ((v - u) / 2.0).round() as i32,
    }
}

/// Drawing surface. The world origin is drawn at its center.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    fn center(&self) -> IsoPoint {
        IsoPoint {
            x: self.width as f32 * 0.5,
            y: self.height as f32 * 0.5,
        }
    }

    pub fn screen_to_world(&self, screen: IsoPoint) -> IsoPoint {
        let center = self.center();
        IsoPoint {
            x: screen.x - center.x,
            y: screen.y - center.y,
        }
    }

    pub fn world_to_screen(&self, world: IsoPoint) -> IsoPoint {
        let center = self.center();
        IsoPoint {
            x: world.x + center.x,
            y: world.y + center.y,
        }
    }
}
