//! The player's snake: body, buffered steering and growth.

use std::collections::VecDeque;

use crate::grid::{Direction, Grid, Position};

/// Result of advancing the snake one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The head moved onto a free cell.
    Moved { head: Position },
    /// The head would have entered its own body. Nothing was moved.
    Collision { at: Position },
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Collision { .. })
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    /// Head first.
    segments: VecDeque<Position>,
    direction: Direction,
    pending_direction: Direction,
    target_length: usize,
    score: u32,
}

impl Snake {
    /// A one-segment snake facing right.
    pub fn new(head: Position) -> Self {
        let mut segments = VecDeque::new();
        segments.push_front(head);
        Snake {
            segments,
            direction: Direction::Right,
            pending_direction: Direction::Right,
            target_length: 1,
            score: 0,
        }
    }

    pub fn head(&self) -> Position {
        // Never empty: constructed with one segment and advance only prepends
        // before it pops.
        self.segments[0]
    }

    pub fn segments(&self) -> &VecDeque<Position> {
        &self.segments
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.segments.contains(&pos)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    /// Length the body is growing towards (or already has).
    pub fn target_length(&self) -> usize {
        self.target_length
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Buffers a turn for the next tick. A request for the exact reverse of
    /// the committed direction is ignored and `false` is returned.
    pub fn change_direction(&mut self, requested: Direction) -> bool {
        if requested.is_opposite(self.direction) {
            return false;
        }
        self.pending_direction = requested;
        true
    }

    /// Commits the buffered direction and moves the head one cell.
    ///
    /// The tail is dropped only while the body is at its target length, so
    /// pending growth is realised one segment per tick.
    pub fn advance(&mut self, grid: &Grid) -> Step {
        self.direction = self.pending_direction;
        let new_head = grid.step(self.head(), self.direction);

        if self.segments.iter().skip(1).any(|&seg| seg == new_head) {
            return Step::Collision { at: new_head };
        }

        self.segments.push_front(new_head);
        while self.segments.len() > self.target_length {
            let _ = self.segments.pop_back();
        }
        Step::Moved { head: new_head }
    }

    /// Credits a meal: points to the score, segments to the target length.
    pub fn feed(&mut self, points: u32, growth: usize) {
        self.score += points;
        self.target_length += growth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake_with_body(body: &[(i16, i16)], direction: Direction) -> Snake {
        let segments: VecDeque<Position> =
            body.iter().map(|&(x, y)| Position::new(x, y)).collect();
        Snake {
            target_length: segments.len(),
            segments,
            direction,
            pending_direction: direction,
            score: 0,
        }
    }

    #[test]
    fn new_snake_is_one_segment_facing_right() {
        let snake = Snake::new(Position::new(3, 3));
        assert_eq!(snake.segments().len(), 1);
        assert_eq!(snake.target_length(), 1);
        assert_eq!(snake.direction(), Direction::Right);
        assert_eq!(snake.score(), 0);
    }

    #[test]
    fn reversal_is_ignored() {
        let mut snake = Snake::new(Position::new(3, 3));
        assert!(!snake.change_direction(Direction::Left));
        assert_eq!(snake.pending_direction(), Direction::Right);

        assert!(snake.change_direction(Direction::Up));
        assert_eq!(snake.pending_direction(), Direction::Up);
        // Still measured against the committed direction.
        assert!(!snake.change_direction(Direction::Left));
        assert_eq!(snake.pending_direction(), Direction::Up);
    }

    #[test]
    fn only_last_turn_before_tick_is_applied() {
        let grid = Grid::new(10, 10);
        let mut snake = Snake::new(Position::new(5, 5));
        assert!(snake.change_direction(Direction::Up));
        assert!(snake.change_direction(Direction::Down));
        assert_eq!(
            snake.advance(&grid),
            Step::Moved {
                head: Position::new(5, 6)
            }
        );
        assert_eq!(snake.direction(), Direction::Down);
    }

    #[test]
    fn moving_keeps_length() {
        let grid = Grid::new(10, 10);
        let mut snake = snake_with_body(&[(4, 4), (3, 4), (2, 4)], Direction::Right);
        let step = snake.advance(&grid);
        assert_eq!(step, Step::Moved { head: Position::new(5, 4) });
        assert_eq!(snake.segments().len(), 3);
        assert_eq!(snake.segments().back(), Some(&Position::new(3, 4)));
    }

    #[test]
    fn growth_is_realised_one_segment_per_tick() {
        let grid = Grid::new(20, 20);
        let mut snake = Snake::new(Position::new(1, 1));
        snake.feed(2, 2);
        assert_eq!(snake.target_length(), 3);

        let _ = snake.advance(&grid);
        assert_eq!(snake.segments().len(), 2);
        let _ = snake.advance(&grid);
        assert_eq!(snake.segments().len(), 3);
        let _ = snake.advance(&grid);
        assert_eq!(snake.segments().len(), 3);
        assert_eq!(snake.score(), 2);
    }

    #[test]
    fn collides_with_body() {
        let grid = Grid::new(10, 10);
        // Head at (2,2) moving up into (2,1), which is part of the body.
        let mut snake = snake_with_body(
            &[(2, 2), (3, 2), (3, 1), (2, 1), (1, 1)],
            Direction::Left,
        );
        assert!(snake.change_direction(Direction::Up));
        let before = snake.segments().clone();
        let step = snake.advance(&grid);
        assert_eq!(step, Step::Collision { at: Position::new(2, 1) });
        assert!(step.is_terminal());
        assert_eq!(snake.segments(), &before);
    }

    #[test]
    fn current_tail_counts_as_body() {
        let grid = Grid::new(10, 10);
        // A closed 2x2 loop: the next head cell is the tail.
        let mut snake = snake_with_body(&[(1, 1), (1, 2), (2, 2), (2, 1)], Direction::Up);
        assert!(snake.change_direction(Direction::Right));
        assert!(snake.advance(&grid).is_terminal());
    }

    #[test]
    fn wraps_without_colliding() {
        let grid = Grid::new(4, 4);
        let mut snake = snake_with_body(&[(3, 0), (2, 0)], Direction::Right);
        assert_eq!(snake.advance(&grid), Step::Moved { head: Position::new(0, 0) });
        assert!(snake.change_direction(Direction::Up));
        assert_eq!(snake.advance(&grid), Step::Moved { head: Position::new(0, 3) });
    }
}
