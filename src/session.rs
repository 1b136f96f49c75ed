//! One playthrough: mode switching, the per-tick simulation step and the
//! hand-off to the leaderboard.
//!
//! The UI feeds [`Command`]s and calls [`Session::tick`] at the cadence given
//! by [`Session::tick_interval`]. Everything the UI needs to draw is exposed
//! read-only through [`Session::snapshot`]. Side effects the UI should play
//! out (sounds, music, window mode) are appended to a caller-owned event
//! buffer.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info};

use crate::config::{Config, Settings};
use crate::food::{Food, FoodTier};
use crate::grid::{Direction, Grid, Position};
use crate::leaderboard::{Leaderboard, LeaderboardEntry, MAX_ENTRIES};
use crate::policy::{self, SpeedCurve};
use crate::snake::{Snake, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    TitleScreen,
    Playing,
    Paused,
    GameOver,
    /// Overlay; the state it was opened from is restored on [`Command::Back`].
    LeaderboardView,
    /// Overlay, same as [`SessionState::LeaderboardView`].
    Options,
}

impl SessionState {
    fn is_overlay(self) -> bool {
        matches!(self, SessionState::LeaderboardView | SessionState::Options)
    }
}

/// Input the UI translates keys and menu picks into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    Start,
    Pause,
    Resume,
    TogglePause,
    Restart,
    ToTitle,
    ViewLeaderboard,
    ViewOptions,
    Back,
    ResetScores,
    ToggleSfx,
    ToggleBgm,
    ToggleFullscreen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    FoodCaptured,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MusicCue {
    Start,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Only emitted while sound effects are not muted.
    Sound(Sound),
    Music(MusicCue),
    FoodEaten { tier: FoodTier, at: Position },
    GameOver { score: u32, length: usize },
    ScoreSubmitted { rank: usize },
    LeaderboardReset,
    FullscreenChanged(bool),
}

/// Read-only view for rendering.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub state: SessionState,
    pub grid: Grid,
    pub segments: &'a VecDeque<Position>,
    pub foods: &'a [Food],
    pub score: u32,
    pub length: usize,
    pub speed: u32,
    pub game_over: bool,
    pub high_score: u32,
    pub leaderboard: &'a [LeaderboardEntry],
    pub settings: Settings,
}

pub struct Session<R = ThreadRng> {
    rng: R,
    grid: Grid,
    speed_curve: SpeedCurve,
    settings: Settings,
    state: SessionState,
    /// State restored when an overlay closes.
    underlying: Option<SessionState>,
    snake: Snake,
    foods: Vec<Food>,
    current_speed: u32,
    game_over: bool,
    score_submitted: bool,
    music_playing: bool,
    leaderboard: Leaderboard,
}

impl Session<ThreadRng> {
    pub fn new(config: &Config, leaderboard: Leaderboard) -> Self {
        Session::with_rng(config, leaderboard, rand::thread_rng())
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(config: &Config, leaderboard: Leaderboard, rng: R) -> Self {
        let grid = config.grid();
        let mut session = Session {
            rng,
            grid,
            speed_curve: config.speed,
            settings: config.settings(),
            state: SessionState::TitleScreen,
            underlying: None,
            snake: Snake::new(grid.center()),
            foods: Vec::new(),
            current_speed: config.speed.base,
            game_over: false,
            score_submitted: false,
            music_playing: false,
            leaderboard,
        };
        session.reset();
        session
    }

    /// Puts snake, food and the per-run flags back to their starting values.
    /// Settings and the leaderboard are kept.
    pub fn reset(&mut self) {
        self.snake = Snake::new(self.grid.center());
        self.foods.clear();
        self.game_over = false;
        self.score_submitted = false;
        self.current_speed = self.speed_curve.speed(0);
        self.top_up_food();
    }

    pub fn handle(&mut self, command: Command, events: &mut Vec<SessionEvent>) {
        use SessionState::*;

        match (command, self.state) {
            (Command::Steer(direction), Playing) => {
                let _ = self.snake.change_direction(direction);
            }
            (Command::Start, TitleScreen) => {
                info!("session started");
                self.state = Playing;
            }
            (Command::Pause, Playing) | (Command::TogglePause, Playing) => self.state = Paused,
            (Command::Resume, Paused) | (Command::TogglePause, Paused) => self.state = Playing,
            (Command::Restart, Playing | Paused | GameOver) => {
                info!(score = self.score(), "session restarted");
                self.reset();
                self.state = Playing;
            }
            (Command::ToTitle, _) => {
                self.reset();
                self.underlying = None;
                self.state = TitleScreen;
            }
            (Command::ViewLeaderboard, TitleScreen | Paused | GameOver) => {
                self.open_overlay(LeaderboardView)
            }
            (Command::ViewOptions, TitleScreen | Paused) => self.open_overlay(Options),
            (Command::Back, LeaderboardView | Options) => {
                self.state = self.underlying.take().unwrap_or(TitleScreen);
            }
            (Command::ResetScores, LeaderboardView) => {
                info!("leaderboard reset");
                self.leaderboard.reset_scores();
                events.push(SessionEvent::LeaderboardReset);
            }
            (Command::ToggleSfx, _) => self.settings.sfx_muted = !self.settings.sfx_muted,
            (Command::ToggleBgm, _) => self.settings.bgm_muted = !self.settings.bgm_muted,
            (Command::ToggleFullscreen, _) => {
                self.settings.fullscreen = !self.settings.fullscreen;
                events.push(SessionEvent::FullscreenChanged(self.settings.fullscreen));
            }
            (command, state) => debug!(?command, ?state, "command ignored"),
        }
        self.sync_music(events);
    }

    fn open_overlay(&mut self, overlay: SessionState) {
        self.underlying = Some(self.state);
        self.state = overlay;
    }

    /// Advances the simulation one step. Outside of play this only settles
    /// pending bookkeeping.
    pub fn tick(&mut self, events: &mut Vec<SessionEvent>) {
        if self.state == SessionState::Playing {
            self.step(events);
        }
        if self.game_over {
            self.submit_score(events);
        }
        self.sync_music(events);
    }

    fn step(&mut self, events: &mut Vec<SessionEvent>) {
        let head = match self.snake.advance(&self.grid) {
            Step::Moved { head } => head,
            Step::Collision { at } => {
                info!(
                    score = self.score(),
                    length = self.length(),
                    x = at.x,
                    y = at.y,
                    "game over"
                );
                self.game_over = true;
                self.state = SessionState::GameOver;
                events.push(SessionEvent::GameOver {
                    score: self.score(),
                    length: self.length(),
                });
                self.play(Sound::GameOver, events);
                return;
            }
        };

        let before = self.foods.len();
        self.foods.retain_mut(|food| food.tick());
        if self.foods.len() < before {
            debug!(expired = before - self.foods.len(), "food expired");
        }

        if let Some(index) = self.foods.iter().position(|food| food.is_at(head)) {
            let food = self.foods.remove(index);
            let tier = food.tier();
            self.snake.feed(tier.points(), tier.growth());
            debug!(tier = tier.number(), score = self.score(), "food eaten");
            events.push(SessionEvent::FoodEaten { tier, at: head });
            self.play(Sound::FoodCaptured, events);
            let _ = self.spawn_food();
            self.update_speed();
        }

        self.top_up_food();
    }

    fn submit_score(&mut self, events: &mut Vec<SessionEvent>) {
        if self.score_submitted {
            return;
        }
        self.score_submitted = true;
        let score = self.score();
        if !self.leaderboard.is_high_score(score) {
            return;
        }
        if let Some(rank) = self.leaderboard.add_score(score, self.length()) {
            info!(score, rank, "high score recorded");
            events.push(SessionEvent::ScoreSubmitted { rank });
        }
    }

    /// Adds one food item of a rolled tier on a free cell. Returns `false`
    /// when the board has no free cell left.
    fn spawn_food(&mut self) -> bool {
        let occupied: HashSet<Position> = self
            .snake
            .segments()
            .iter()
            .copied()
            .chain(self.foods.iter().map(Food::position))
            .collect();
        let score = self.score();
        let tier = policy::roll_tier(&mut self.rng, score);
        match policy::free_cell(&mut self.rng, &self.grid, &occupied) {
            Some(pos) => {
                debug!(tier = tier.number(), x = pos.x, y = pos.y, "food spawned");
                self.foods.push(Food::new(tier, pos));
                true
            }
            None => false,
        }
    }

    fn top_up_food(&mut self) {
        let wanted = policy::min_food_count(self.score());
        while self.foods.len() < wanted && self.spawn_food() {}
    }

    fn update_speed(&mut self) {
        let speed = self.speed_curve.speed(self.score());
        if speed != self.current_speed {
            debug!(from = self.current_speed, to = speed, "speed changed");
            self.current_speed = speed;
        }
    }

    fn play(&self, sound: Sound, events: &mut Vec<SessionEvent>) {
        if !self.settings.sfx_muted {
            events.push(SessionEvent::Sound(sound));
        }
    }

    /// Music runs in every state except game over, unless muted.
    fn sync_music(&mut self, events: &mut Vec<SessionEvent>) {
        let base = if self.state.is_overlay() {
            self.underlying.unwrap_or(SessionState::TitleScreen)
        } else {
            self.state
        };
        let wanted = !self.settings.bgm_muted && base != SessionState::GameOver;
        if wanted != self.music_playing {
            self.music_playing = wanted;
            events.push(SessionEvent::Music(if wanted {
                MusicCue::Start
            } else {
                MusicCue::Stop
            }));
        }
    }
}

impl<R> Session<R> {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn score(&self) -> u32 {
        self.snake.score()
    }

    pub fn length(&self) -> usize {
        self.snake.target_length()
    }

    /// Ticks per second.
    pub fn current_speed(&self) -> u32 {
        self.current_speed
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.current_speed.max(1)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.state,
            grid: self.grid,
            segments: self.snake.segments(),
            foods: &self.foods,
            score: self.score(),
            length: self.length(),
            speed: self.current_speed,
            game_over: self.game_over,
            high_score: self.leaderboard.high_score(),
            leaderboard: self.leaderboard.top_scores(MAX_ENTRIES),
            settings: self.settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const RNG_SEED: u64 = 0x5eed_5eed;

    fn session() -> Session<ChaCha8Rng> {
        Session::with_rng(
            &Config::default(),
            Leaderboard::in_memory(),
            ChaCha8Rng::seed_from_u64(RNG_SEED),
        )
    }

    fn playing() -> Session<ChaCha8Rng> {
        let mut s = session();
        s.handle(Command::Start, &mut Vec::new());
        s
    }

    /// Leaves a single food item on the cell the head moves to next.
    fn food_ahead(s: &mut Session<ChaCha8Rng>, tier: FoodTier) {
        let next = s.grid.step(s.snake.head(), s.snake.pending_direction());
        s.foods.clear();
        s.foods.push(Food::new(tier, next));
    }

    #[test]
    fn starts_on_title_with_two_foods() {
        let s = session();
        assert_eq!(s.state(), SessionState::TitleScreen);
        assert_eq!(s.foods().len(), 2);
        assert_eq!(s.length(), 1);
        assert_eq!(s.current_speed(), 8);
        for food in s.foods() {
            assert!(!s.snake().occupies(food.position()));
        }
    }

    #[test]
    fn three_common_meals() {
        let mut s = playing();
        let mut events = Vec::new();
        for _ in 0..3 {
            food_ahead(&mut s, FoodTier::Common);
            s.tick(&mut events);
        }
        assert_eq!(s.score(), 3);
        assert_eq!(s.length(), 4);
        assert_eq!(s.current_speed(), 8);
        // One segment realised per tick.
        assert_eq!(s.snake().segments().len(), 3);
        s.foods.clear();
        s.tick(&mut events);
        assert_eq!(s.snake().segments().len(), 4);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, SessionEvent::Sound(Sound::FoodCaptured)))
                .count(),
            3
        );
    }

    #[test]
    fn tier_points_and_growth() {
        let mut s = playing();
        food_ahead(&mut s, FoodTier::Epic);
        s.tick(&mut Vec::new());
        assert_eq!(s.score(), 5);
        assert_eq!(s.length(), 5);
        assert_eq!(s.current_speed(), 9);
    }

    #[test]
    fn eating_keeps_the_food_count_topped_up() {
        let mut s = playing();
        let mut events = Vec::new();
        food_ahead(&mut s, FoodTier::Common);
        s.tick(&mut events);
        assert!(s.foods().len() >= policy::min_food_count(s.score()));
        let spots: HashSet<_> = s.foods().iter().map(Food::position).collect();
        assert_eq!(spots.len(), s.foods().len());
        for food in s.foods() {
            assert!(!s.snake().occupies(food.position()));
        }
    }

    #[test]
    fn expired_food_is_replaced() {
        let mut s = playing();
        let corner = |f: &Food| f.position().x == 0 && f.position().y <= 1;
        s.foods.clear();
        s.foods.push(Food::new(FoodTier::Epic, Position::new(0, 0)));
        s.foods.push(Food::new(FoodTier::Common, Position::new(0, 1)));
        for _ in 0..79 {
            s.foods.retain(corner);
            s.tick(&mut Vec::new());
        }
        s.foods.retain(corner);
        assert_eq!(s.foods()[0].remaining(), Some(1));

        s.tick(&mut Vec::new());
        assert_eq!(s.state(), SessionState::Playing);
        // Tier 4 cannot be rolled at score zero.
        assert!(!s.foods().iter().any(|f| f.tier() == FoodTier::Epic));
        assert_eq!(s.foods().len(), 2);
    }

    #[test]
    fn expired_food_is_replaced_up_to_the_score_minimum() {
        let mut s = playing();
        s.snake.feed(15, 0);
        let corner = |f: &Food| f.position() == Position::new(0, 0);
        s.foods.clear();
        s.foods.push(Food::new(FoodTier::Uncommon, Position::new(0, 0)));
        for _ in 0..149 {
            s.foods.retain(corner);
            s.tick(&mut Vec::new());
        }
        s.foods.retain(corner);
        assert_eq!(s.foods().len(), 1);
        assert_eq!(s.foods()[0].remaining(), Some(1));

        s.tick(&mut Vec::new());
        assert_eq!(s.state(), SessionState::Playing);
        assert_eq!(policy::min_food_count(s.score()), 3);
        assert_eq!(s.foods().len(), 3);
        assert!(s.foods().iter().all(Food::is_active));
    }

    /// Ticks with no food on the board.
    fn bare_tick(s: &mut Session<ChaCha8Rng>, events: &mut Vec<SessionEvent>) {
        s.foods.clear();
        s.tick(events);
    }

    #[test]
    fn self_collision_ends_the_game_once() {
        let mut s = playing();
        let mut events = Vec::new();
        // Grow to five segments, then turn back into the body.
        food_ahead(&mut s, FoodTier::Epic);
        s.tick(&mut events);
        for _ in 0..4 {
            bare_tick(&mut s, &mut events);
        }
        assert_eq!(s.snake().segments().len(), 5);
        s.handle(Command::Steer(Direction::Up), &mut events);
        bare_tick(&mut s, &mut events);
        s.handle(Command::Steer(Direction::Left), &mut events);
        bare_tick(&mut s, &mut events);
        s.handle(Command::Steer(Direction::Down), &mut events);
        events.clear();
        bare_tick(&mut s, &mut events);

        assert_eq!(s.state(), SessionState::GameOver);
        assert!(s.is_game_over());
        assert_eq!(
            events,
            vec![
                SessionEvent::GameOver { score: 5, length: 5 },
                SessionEvent::Sound(Sound::GameOver),
                SessionEvent::ScoreSubmitted { rank: 1 },
                SessionEvent::Music(MusicCue::Stop),
            ]
        );

        events.clear();
        for _ in 0..3 {
            s.tick(&mut events);
        }
        assert!(events.is_empty());
        assert_eq!(s.leaderboard().entries().len(), 1);
        assert_eq!(s.leaderboard().entries()[0].length, 5);
    }

    #[test]
    fn steering_is_ignored_outside_play() {
        let mut s = session();
        s.handle(Command::Steer(Direction::Down), &mut Vec::new());
        assert_eq!(s.snake().pending_direction(), Direction::Right);
    }

    #[test]
    fn muted_sfx_suppresses_sounds_only() {
        let mut s = playing();
        let mut events = Vec::new();
        s.handle(Command::ToggleSfx, &mut events);
        food_ahead(&mut s, FoodTier::Common);
        s.tick(&mut events);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::FoodEaten { .. })));
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::Sound(_))));
    }

    #[test]
    fn zero_score_game_over_skips_the_leaderboard() {
        let mut s = playing();
        s.game_over = true;
        s.state = SessionState::GameOver;
        let mut events = Vec::new();
        s.tick(&mut events);
        assert!(s.leaderboard().entries().is_empty());
        assert!(s.score_submitted);
    }
}
