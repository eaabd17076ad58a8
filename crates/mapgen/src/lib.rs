//! Map generation utilities.
use common::{GameResult, Point};

/// Default map width in cells.
pub const MAP_WIDTH: u32 = 20;
/// Default map height in cells.
pub const MAP_HEIGHT: u32 = 12;

/// Kind of a tile on the game map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    /// Open field where monsters roam.
    Grass,
    /// The town gate. Stepping on it returns the player to town.
    Town,
}

/// Simple bounded grid.
#[derive(Clone, Debug)]
pub struct Map {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<TileKind>,
    town: Point,
}

impl Map {
    /// Creates a new map filled with [`TileKind::Grass`] and a town at `town`.
    pub fn new(width: u32, height: u32, town: Point) -> Self {
        let mut map = Self {
            width,
            height,
            tiles: vec![TileKind::Grass; (width * height) as usize],
            town,
        };
        let idx = map.idx(town);
        map.tiles[idx] = TileKind::Town;
        map
    }

    /// Returns tile index from coordinates.
    pub fn idx(&self, pt: Point) -> usize {
        (pt.y as usize) * self.width as usize + pt.x as usize
    }

    /// Position of the town gate.
    pub fn town(&self) -> Point {
        self.town
    }

    /// Returns whether `pt` lies on the map.
    pub fn in_bounds(&self, pt: Point) -> bool {
        pt.x >= 0 && pt.y >= 0 && pt.x < self.width as i32 && pt.y < self.height as i32
    }

    /// Clamps `pt` to the map edges.
    pub fn clamp(&self, pt: Point) -> Point {
        Point::new(
            pt.x.clamp(0, self.width as i32 - 1),
            pt.y.clamp(0, self.height as i32 - 1),
        )
    }

    /// Grass cells not listed in `occupied`, in row-major order.
    pub fn free_cells(&self, occupied: &[Point]) -> Vec<Point> {
        let mut cells = Vec::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let pt = Point::new(x, y);
                if self.tiles[self.idx(pt)] == TileKind::Grass && !occupied.contains(&pt) {
                    cells.push(pt);
                }
            }
        }
        cells
    }
}

/// Generates the overworld [`Map`] with the town near the top-left corner.
pub fn generate() -> GameResult<Map> {
    Ok(Map::new(MAP_WIDTH, MAP_HEIGHT, Point::new(2, 2)))
}

/// Rebuilds a map around a saved town position.
pub fn with_town(town: Point) -> GameResult<Map> {
    let map = Map::new(MAP_WIDTH, MAP_HEIGHT, Point::new(0, 0));
    if !map.in_bounds(town) {
        return Err(common::GameError::Parse(format!(
            "town position ({}, {}) is off the map",
            town.x, town.y
        )));
    }
    Ok(Map::new(MAP_WIDTH, MAP_HEIGHT, town))
}
