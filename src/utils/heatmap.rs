use plotters::prelude::*;
use std::path::Path;

use crate::error::{RunError, RunResult};
use crate::models::{Cell, StoreGrid, TrajectoryRecord};

const MAX_IMAGE_SIDE: u32 = 2000;
const MAX_CELL_PIXELS: u32 = 24;

/// Seconds of customer presence per floor cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMap {
    width: i32,
    height: i32,
    seconds: Vec<u32>,
    picking_seconds: Vec<u32>,
}

impl OccupancyMap {
    /// Counts one second per record on its cell; records off the floor are ignored
    pub fn from_records(grid: &StoreGrid, records: &[TrajectoryRecord]) -> Self {
        let mut seconds = vec![0; grid.cell_count()];
        let mut picking_seconds = vec![0; grid.cell_count()];

        for record in records {
            if let Some(idx) = grid.index(Cell::new(record.x, record.y)) {
                seconds[idx] += 1;
                if record.is_picking {
                    picking_seconds[idx] += 1;
                }
            }
        }

        Self {
            width: grid.width(),
            height: grid.height(),
            seconds,
            picking_seconds,
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height {
            Some((cell.y * self.width + cell.x) as usize)
        } else {
            None
        }
    }

    pub fn seconds_at(&self, cell: Cell) -> u32 {
        self.index(cell).map(|idx| self.seconds[idx]).unwrap_or(0)
    }

    pub fn picking_seconds_at(&self, cell: Cell) -> u32 {
        self.index(cell).map(|idx| self.picking_seconds[idx]).unwrap_or(0)
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds.iter().map(|&s| u64::from(s)).sum()
    }

    /// Most occupied cell; ties go to the first in row-major order
    pub fn busiest(&self) -> Option<(Cell, u32)> {
        self.seconds
            .iter()
            .enumerate()
            .filter(|(_, &s)| s > 0)
            .max_by_key(|&(idx, &s)| (s, std::cmp::Reverse(idx)))
            .map(|(idx, &s)| {
                let idx = idx as i32;
                (Cell::new(idx % self.width, idx / self.width), s)
            })
    }

    /// Renders the floor: shelving grey, idle aisle white, occupied cells on a
    /// yellow-to-red ramp scaled to the busiest cell
    pub fn render_png(&self, grid: &StoreGrid, output_path: &Path) -> RunResult<()> {
        let side = self.width.max(self.height).max(1) as u32;
        let cell_px = (MAX_IMAGE_SIDE / side).clamp(1, MAX_CELL_PIXELS);
        let size = (self.width as u32 * cell_px, self.height as u32 * cell_px);

        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let peak = self.seconds.iter().copied().max().unwrap_or(0).max(1);
        let px = cell_px as i32;

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                let occupied = self.seconds_at(cell);
                let color = if !grid.is_walkable(cell) {
                    RGBColor(160, 160, 160)
                } else if occupied == 0 {
                    continue;
                } else {
                    heat_color(occupied, peak)
                };

                root.draw(&Rectangle::new(
                    [(x * px, y * px), ((x + 1) * px, (y + 1) * px)],
                    color.filled(),
                ))
                .map_err(render_error)?;
            }
        }

        for (cell, color) in std::iter::once((grid.entrance(), BLUE))
            .chain(grid.exits().iter().map(|&exit| (exit, GREEN)))
        {
            root.draw(&Rectangle::new(
                [(cell.x * px, cell.y * px), ((cell.x + 1) * px, (cell.y + 1) * px)],
                color.stroke_width(2),
            ))
            .map_err(render_error)?;
        }

        root.present().map_err(render_error)?;
        Ok(())
    }
}

/// Yellow at the lightest occupancy, red at `peak`
fn heat_color(seconds: u32, peak: u32) -> RGBColor {
    let ratio = f64::from(seconds.min(peak)) / f64::from(peak);
    let green = (220.0 * (1.0 - ratio)).round() as u8;
    RGBColor(255, green, 0)
}

fn render_error<E: std::fmt::Display>(e: E) -> RunError {
    RunError::Render(e.to_string())
}
