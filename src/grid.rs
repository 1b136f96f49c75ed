//! Cell coordinates, directions and the toroidal playfield.

/// A cell on the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const fn new(x: i16, y: i16) -> Self {
        Position { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in cell coordinates, y growing downwards.
    pub fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Fixed-size playfield. Stepping off one edge re-enters at the opposite one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i16,
    height: i16,
}

impl Grid {
    /// Both dimensions are clamped to at least one cell.
    pub fn new(width: i16, height: i16) -> Self {
        Grid {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// The neighbour of `pos` in `direction`, wrapped onto the torus.
    pub fn step(&self, pos: Position, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        self.wrap(pos.x as i32 + dx as i32, pos.y as i32 + dy as i32)
    }

    fn wrap(&self, x: i32, y: i32) -> Position {
        Position::new(
            x.rem_euclid(self.width as i32) as i16,
            y.rem_euclid(self.height as i32) as i16,
        )
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    #[test]
    fn opposites_pair_up() {
        for dir in ALL {
            assert!(dir.is_opposite(dir.opposite()));
            assert!(!dir.is_opposite(dir));
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert!(!Direction::Up.is_opposite(Direction::Left));
    }

    #[test]
    fn step_wraps_every_edge() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.step(Position::new(4, 2), Direction::Right), Position::new(0, 2));
        assert_eq!(grid.step(Position::new(0, 2), Direction::Left), Position::new(4, 2));
        assert_eq!(grid.step(Position::new(1, 0), Direction::Up), Position::new(1, 3));
        assert_eq!(grid.step(Position::new(1, 3), Direction::Down), Position::new(1, 0));
    }

    #[test]
    fn step_stays_inside_for_every_cell() {
        let grid = Grid::new(3, 7);
        for cell in grid.cells() {
            for dir in ALL {
                assert!(grid.contains(grid.step(cell, dir)));
            }
        }
    }

    #[test]
    fn cells_cover_the_grid_once() {
        let grid = Grid::new(4, 3);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), grid.cell_count());
        assert_eq!(cells[0], Position::new(0, 0));
        assert_eq!(cells[11], Position::new(3, 2));
    }

    #[test]
    fn degenerate_dimensions_are_clamped() {
        let grid = Grid::new(0, -3);
        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.step(Position::new(0, 0), Direction::Up), Position::new(0, 0));
    }
}
