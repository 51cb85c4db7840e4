// Store model representing the walkable floor plan of a shop

use crate::error::RunError;
use crate::models::{ArticleId, Cell};
use std::collections::HashMap;

/// Largest floor accepted, in cells
pub const MAX_FLOOR_CELLS: usize = 4_000_000;

/// Role of a single planogram cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutRole {
    Walkable,
    Entrance,
    Exit,
    Obstacle,
    /// Shelving holding an article; the shopper picks it from `pickup`
    Shelf { article: ArticleId, pickup: Cell },
}

/// One row of the planogram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub cell: Cell,
    pub role: LayoutRole,
}

impl LayoutEntry {
    pub fn new(cell: Cell, role: LayoutRole) -> Self {
        Self { cell, role }
    }
}

/// Read-only store floor shared by every customer search
#[derive(Debug, Clone)]
pub struct StoreGrid {
    width: i32,
    height: i32,

    /// Row-major walkability flags
    walkable: Vec<bool>,

    entrance: Cell,

    /// Candidate exits in planogram order
    exits: Vec<Cell>,

    /// Pickup cell of each article
    pickups: HashMap<ArticleId, Cell>,
}

impl StoreGrid {
    /// Builds the grid from planogram rows.
    ///
    /// The floor spans `max(x) + 1` by `max(y) + 1` over the listed cells and
    /// unlisted cells are walkable aisle. Entrance and exit cells are always
    /// walkable, even if a later row marks them as shelving. When an article
    /// appears on several shelves the first row wins.
    pub fn from_entries(entries: &[LayoutEntry]) -> Result<Self, RunError> {
        if entries.is_empty() {
            return Err(RunError::InvalidLayout("planogram is empty".into()));
        }
        if let Some(entry) = entries.iter().find(|e| e.cell.x < 0 || e.cell.y < 0) {
            return Err(RunError::InvalidLayout(format!(
                "negative coordinate {}",
                entry.cell
            )));
        }

        let width = entries.iter().map(|e| e.cell.x).max().unwrap_or(0);
        let height = entries.iter().map(|e| e.cell.y).max().unwrap_or(0);
        let too_large = || {
            RunError::InvalidLayout(format!(
                "floor of {} by {} cells exceeds the limit of {} cells",
                i64::from(width) + 1,
                i64::from(height) + 1,
                MAX_FLOOR_CELLS
            ))
        };
        let (width, height) = match (width.checked_add(1), height.checked_add(1)) {
            (Some(width), Some(height)) => (width, height),
            _ => return Err(too_large()),
        };
        let cells = (width as usize)
            .checked_mul(height as usize)
            .filter(|&cells| cells <= MAX_FLOOR_CELLS)
            .ok_or_else(too_large)?;
        let mut walkable = vec![true; cells];

        let mut entrance: Option<Cell> = None;
        let mut exits: Vec<Cell> = Vec::new();
        let mut pickups: HashMap<ArticleId, Cell> = HashMap::new();

        for entry in entries {
            let idx = (entry.cell.y * width + entry.cell.x) as usize;
            match &entry.role {
                LayoutRole::Walkable => walkable[idx] = true,
                LayoutRole::Entrance => {
                    if let Some(previous) = entrance {
                        if previous != entry.cell {
                            return Err(RunError::InvalidLayout(format!(
                                "more than one entrance: {} and {}",
                                previous, entry.cell
                            )));
                        }
                    }
                    entrance = Some(entry.cell);
                }
                LayoutRole::Exit => {
                    if !exits.contains(&entry.cell) {
                        exits.push(entry.cell);
                    }
                }
                LayoutRole::Obstacle => walkable[idx] = false,
                LayoutRole::Shelf { article, pickup } => {
                    walkable[idx] = false;
                    pickups.entry(article.clone()).or_insert(*pickup);
                }
            }
        }

        let entrance =
            entrance.ok_or_else(|| RunError::InvalidLayout("no entrance cell".into()))?;
        if exits.is_empty() {
            return Err(RunError::InvalidLayout("no exit cell".into()));
        }

        let mut grid = Self {
            width,
            height,
            walkable,
            entrance,
            exits,
            pickups,
        };

        for cell in std::iter::once(grid.entrance).chain(grid.exits.clone()) {
            if let Some(idx) = grid.index(cell) {
                grid.walkable[idx] = true;
            }
        }

        if let Some((article, cell)) = grid.pickups.iter().find(|(_, c)| !grid.contains(**c)) {
            return Err(RunError::InvalidLayout(format!(
                "pickup cell {} of article {} lies outside the floor",
                cell, article
            )));
        }

        Ok(grid)
    }

    /// Parses a compact text floor plan, one string per row (row index is `y`).
    ///
    /// `.` aisle, `#` obstacle, `E` entrance, `X` exit. A lowercase letter is
    /// a walkable pickup cell for the article named by that letter.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, RunError> {
        let mut entries = Vec::new();
        let mut letter_pickups = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                let role = match ch {
                    '.' => LayoutRole::Walkable,
                    '#' => LayoutRole::Obstacle,
                    'E' => LayoutRole::Entrance,
                    'X' => LayoutRole::Exit,
                    c if c.is_ascii_lowercase() => {
                        letter_pickups.push((c.to_string(), cell));
                        LayoutRole::Walkable
                    }
                    other => {
                        return Err(RunError::InvalidLayout(format!(
                            "unknown floor symbol '{}' at {}",
                            other, cell
                        )))
                    }
                };
                entries.push(LayoutEntry::new(cell, role));
            }
        }

        let mut grid = Self::from_entries(&entries)?;
        for (article, cell) in letter_pickups {
            grid.pickups.entry(article).or_insert(cell);
        }
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn entrance(&self) -> Cell {
        self.entrance
    }

    pub fn exits(&self) -> &[Cell] {
        &self.exits
    }

    /// Number of cells on the floor
    pub fn cell_count(&self) -> usize {
        self.walkable.len()
    }

    /// Checks whether the cell lies on the floor
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Row-major index of a cell, `None` off the floor
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if self.contains(cell) {
            Some((cell.y * self.width + cell.x) as usize)
        } else {
            None
        }
    }

    /// Inverse of [`StoreGrid::index`]
    pub fn cell_at(&self, idx: usize) -> Cell {
        let idx = idx as i32;
        Cell::new(idx % self.width, idx / self.width)
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).map(|idx| self.walkable[idx]).unwrap_or(false)
    }

    /// Pickup cell of an article, if the planogram places it
    pub fn pickup_cell(&self, article: &str) -> Option<Cell> {
        self.pickups.get(article).copied()
    }

    /// All articles with their pickup cells
    pub fn pickups(&self) -> &HashMap<ArticleId, Cell> {
        &self.pickups
    }

    /// Iterates over walkable cells in row-major order
    pub fn walkable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.walkable
            .iter()
            .enumerate()
            .filter(|(_, &open)| open)
            .map(move |(idx, _)| self.cell_at(idx))
    }
}
