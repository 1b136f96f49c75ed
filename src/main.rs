use ggez::audio::{self, SoundSource};
use ggez::conf::FullscreenType;
use ggez::event::{self, EventHandler};
use ggez::input::keyboard::{KeyCode, KeyInput};
use ggez::mint::{Point2, Vector2};
use ggez::{graphics, Context, GameResult};
use rand::Rng;
use std::f32::consts::PI;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snake_rush::config::AudioConfig;
use snake_rush::{
    Command, Config, Direction, Leaderboard, MusicCue, Position, Session, SessionEvent,
    SessionState, Settings, Sound,
};

mod render;

/// Most ticks run in one frame after a stall.
const MAX_TICKS_PER_FRAME: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
enum MenuAction {
    Send(Command),
    Quit,
}

/// Entries of the menu shown in `state`, empty where the screen has none.
fn menu_items(state: SessionState, settings: Settings) -> Vec<(String, MenuAction)> {
    let on_off = |on: bool| if on { "On" } else { "Off" };
    let item = |label: &str, command| (label.to_string(), MenuAction::Send(command));
    match state {
        SessionState::TitleScreen => vec![
            item("Start Game", Command::Start),
            item("Leaderboard", Command::ViewLeaderboard),
            item("Options", Command::ViewOptions),
            ("Quit".to_string(), MenuAction::Quit),
        ],
        SessionState::Paused => vec![
            item("Resume", Command::Resume),
            item("Leaderboard", Command::ViewLeaderboard),
            item("Options", Command::ViewOptions),
            item("Restart", Command::Restart),
            item("Main Menu", Command::ToTitle),
        ],
        SessionState::Options => vec![
            item(&format!("Sound FX: {}", on_off(!settings.sfx_muted)), Command::ToggleSfx),
            item(&format!("BGM: {}", on_off(!settings.bgm_muted)), Command::ToggleBgm),
            item(&format!("Fullscreen: {}", on_off(settings.fullscreen)), Command::ToggleFullscreen),
            item("Back", Command::Back),
        ],
        _ => Vec::new(),
    }
}

fn steering(keycode: KeyCode) -> Option<Direction> {
    match keycode {
        KeyCode::Up | KeyCode::W => Some(Direction::Up),
        KeyCode::Down | KeyCode::S => Some(Direction::Down),
        KeyCode::Left | KeyCode::A => Some(Direction::Left),
        KeyCode::Right | KeyCode::D => Some(Direction::Right),
        _ => None,
    }
}

struct ParticleEffect {
    particles: Vec<Particle>,
    lifetime: f32,
}

struct Particle {
    pos: Point2<f32>,
    vel: Vector2<f32>,
    color: graphics::Color,
    size: f32,
    lifetime: f32,
}

impl ParticleEffect {
    fn new(position: Position, cell_size: f32) -> Self {
        let mut rng = rand::thread_rng();
        let particles = (0..20)
            .map(|_| {
                let angle = rng.gen_range(0.0..2.0 * PI);
                let speed = rng.gen_range(50.0..150.0);
                Particle {
                    pos: Point2 {
                        x: position.x as f32 * cell_size + cell_size / 2.0,
                        y: position.y as f32 * cell_size + cell_size / 2.0,
                    },
                    vel: Vector2 {
                        x: angle.cos() * speed,
                        y: angle.sin() * speed,
                    },
                    color: graphics::Color::new(1.0, rng.gen_range(0.5..1.0), 0.0, 1.0),
                    size: rng.gen_range(2.0..5.0),
                    lifetime: 1.0,
                }
            })
            .collect();

        ParticleEffect {
            particles,
            lifetime: 1.0,
        }
    }

    fn update(&mut self, dt: f32) {
        self.lifetime -= dt;
        for particle in &mut self.particles {
            particle.pos.x += particle.vel.x * dt;
            particle.pos.y += particle.vel.y * dt;
            particle.lifetime -= dt;
            particle.color.a = particle.lifetime.max(0.0);
        }
    }
}

/// Sound sources. A file that fails to load simply stays silent.
struct Audio {
    music: Option<audio::Source>,
    food: Option<audio::Source>,
    game_over: Option<audio::Source>,
}

impl Audio {
    fn load(ctx: &mut Context, volumes: &AudioConfig) -> Self {
        let mut music = Self::source(ctx, "/snake_rush_bgm.wav", volumes.bgm_volume);
        if let Some(music) = music.as_mut() {
            music.set_repeat(true);
        }
        Audio {
            music,
            food: Self::source(ctx, "/food_capture_sound.wav", volumes.food_volume),
            game_over: Self::source(ctx, "/game_over.wav", volumes.game_over_volume),
        }
    }

    fn source(ctx: &mut Context, path: &str, volume: f32) -> Option<audio::Source> {
        match audio::Source::new(ctx, path) {
            Ok(mut source) => {
                source.set_volume(volume);
                Some(source)
            }
            Err(e) => {
                warn!(path, error = %e, "sound unavailable");
                None
            }
        }
    }

    fn play(&mut self, ctx: &mut Context, sound: Sound) -> GameResult {
        let source = match sound {
            Sound::FoodCaptured => self.food.as_mut(),
            Sound::GameOver => self.game_over.as_mut(),
        };
        match source {
            Some(source) => source.play_detached(ctx),
            None => Ok(()),
        }
    }

    fn music(&mut self, ctx: &mut Context, cue: MusicCue) -> GameResult {
        let Some(music) = self.music.as_mut() else {
            return Ok(());
        };
        match cue {
            MusicCue::Start => music.play(ctx),
            MusicCue::Stop => music.stop(ctx),
        }
    }
}

struct Game {
    session: Session,
    audio: Audio,
    cell_size: f32,
    events: Vec<SessionEvent>,
    tick_accumulator: Duration,
    menu_selection: usize,
    menu_state: SessionState,
    confirm_reset: bool,
    particle_effects: Vec<ParticleEffect>,
    food_animation: f32,
}

impl Game {
    fn new(ctx: &mut Context, config: &Config) -> GameResult<Self> {
        let leaderboard = Leaderboard::load(config.leaderboard_path());
        let session = Session::new(config, leaderboard);
        let menu_state = session.state();

        Ok(Game {
            session,
            audio: Audio::load(ctx, &config.audio),
            cell_size: config.grid.cell_size as f32,
            events: Vec::new(),
            tick_accumulator: Duration::ZERO,
            menu_selection: 0,
            menu_state,
            confirm_reset: false,
            particle_effects: Vec::new(),
            food_animation: 0.0,
        })
    }

    fn send(&mut self, command: Command) {
        self.session.handle(command, &mut self.events);
    }

    fn activate_menu(&mut self, ctx: &mut Context) {
        let items = menu_items(self.session.state(), self.session.settings());
        match items.get(self.menu_selection).map(|(_, action)| *action) {
            Some(MenuAction::Send(command)) => self.send(command),
            Some(MenuAction::Quit) => {
                info!("quit requested");
                ctx.request_quit();
            }
            None => {}
        }
    }

    fn navigate_menu(&mut self, keycode: KeyCode) -> bool {
        let count = menu_items(self.session.state(), self.session.settings()).len();
        if count == 0 {
            return false;
        }
        match keycode {
            KeyCode::Up => {
                self.menu_selection = self.menu_selection.checked_sub(1).unwrap_or(count - 1);
                true
            }
            KeyCode::Down => {
                self.menu_selection = (self.menu_selection + 1) % count;
                true
            }
            _ => false,
        }
    }

    /// Plays out whatever the session asked for since the last frame.
    fn dispatch_events(&mut self, ctx: &mut Context) -> GameResult {
        for event in std::mem::take(&mut self.events) {
            match event {
                SessionEvent::Sound(sound) => self.audio.play(ctx, sound)?,
                SessionEvent::Music(cue) => self.audio.music(ctx, cue)?,
                SessionEvent::FoodEaten { at, .. } => {
                    self.particle_effects
                        .push(ParticleEffect::new(at, self.cell_size));
                }
                SessionEvent::FullscreenChanged(on) => {
                    let mode = if on {
                        FullscreenType::Desktop
                    } else {
                        FullscreenType::Windowed
                    };
                    if let Err(e) = ctx.gfx.set_fullscreen(mode) {
                        warn!(error = %e, "could not change fullscreen mode");
                    }
                }
                SessionEvent::GameOver { .. }
                | SessionEvent::ScoreSubmitted { .. }
                | SessionEvent::LeaderboardReset => {}
            }
        }
        Ok(())
    }
}

impl EventHandler for Game {
    fn update(&mut self, ctx: &mut Context) -> GameResult {
        let dt = ctx.time.delta();
        self.food_animation = (self.food_animation + dt.as_secs_f32()) % (2.0 * PI);
        self.particle_effects.retain_mut(|effect| {
            effect.update(dt.as_secs_f32());
            effect.lifetime > 0.0
        });

        self.tick_accumulator += dt;
        let mut ticks = 0;
        while self.tick_accumulator >= self.session.tick_interval() && ticks < MAX_TICKS_PER_FRAME {
            self.tick_accumulator -= self.session.tick_interval();
            self.session.tick(&mut self.events);
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME {
            self.tick_accumulator = Duration::ZERO;
        }

        if self.session.state() != self.menu_state {
            self.menu_state = self.session.state();
            self.menu_selection = 0;
            self.confirm_reset = false;
        }

        self.dispatch_events(ctx)
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        let mut canvas = graphics::Canvas::from_frame(ctx, render::BACKGROUND_COLOR);
        let snapshot = self.session.snapshot();
        let view = render::View {
            cell_size: self.cell_size,
            food_animation: self.food_animation,
            menu: menu_items(snapshot.state, snapshot.settings)
                .into_iter()
                .map(|(label, _)| label)
                .collect(),
            menu_selection: self.menu_selection,
            confirm_reset: self.confirm_reset,
        };

        render::draw_screen(ctx, &mut canvas, &snapshot, &view)?;
        if matches!(snapshot.state, SessionState::Playing | SessionState::GameOver) {
            for effect in &self.particle_effects {
                for particle in &effect.particles {
                    render::draw_particle(ctx, &mut canvas, particle.pos, particle.size, particle.color)?;
                }
            }
        }

        canvas.finish(ctx)?;
        Ok(())
    }

    fn key_down_event(&mut self, ctx: &mut Context, input: KeyInput, _repeat: bool) -> GameResult {
        let Some(keycode) = input.keycode else {
            return Ok(());
        };

        match self.session.state() {
            SessionState::Playing => match keycode {
                KeyCode::Escape => self.send(Command::Pause),
                KeyCode::P => self.send(Command::TogglePause),
                KeyCode::R => self.send(Command::Restart),
                key => {
                    if let Some(direction) = steering(key) {
                        self.send(Command::Steer(direction));
                    }
                }
            },
            SessionState::TitleScreen => match keycode {
                KeyCode::Space => self.send(Command::Start),
                KeyCode::L => self.send(Command::ViewLeaderboard),
                KeyCode::O => self.send(Command::ViewOptions),
                KeyCode::Return => self.activate_menu(ctx),
                key => {
                    let _ = self.navigate_menu(key);
                }
            },
            SessionState::Paused => match keycode {
                KeyCode::Escape | KeyCode::P => self.send(Command::Resume),
                KeyCode::Return => self.activate_menu(ctx),
                key => {
                    let _ = self.navigate_menu(key);
                }
            },
            SessionState::Options => match keycode {
                KeyCode::Escape => self.send(Command::Back),
                KeyCode::Return => self.activate_menu(ctx),
                key => {
                    let _ = self.navigate_menu(key);
                }
            },
            SessionState::LeaderboardView => {
                if self.confirm_reset {
                    if keycode == KeyCode::Y {
                        self.send(Command::ResetScores);
                    }
                    self.confirm_reset = false;
                } else {
                    match keycode {
                        KeyCode::Escape | KeyCode::Back => self.send(Command::Back),
                        KeyCode::X => self.confirm_reset = true,
                        _ => {}
                    }
                }
            }
            SessionState::GameOver => match keycode {
                KeyCode::R => self.send(Command::Restart),
                KeyCode::L => self.send(Command::ViewLeaderboard),
                KeyCode::Escape | KeyCode::M => self.send(Command::ToTitle),
                _ => {}
            },
        }
        Ok(())
    }
}

fn main() -> GameResult {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snake_rush=info".into()),
        )
        .init();

    let config = Config::locate_or_default();
    let width = config.grid.width as f32 * config.grid.cell_size as f32;
    let height = config.grid.height as f32 * config.grid.cell_size as f32;

    let resource_dir = std::path::PathBuf::from("./resources");
    let window_setup = ggez::conf::WindowSetup::default()
        .title("Snake Rush - Endless Mode")
        .vsync(true);
    let fullscreen = if config.display.fullscreen {
        FullscreenType::Desktop
    } else {
        FullscreenType::Windowed
    };
    let window_mode = ggez::conf::WindowMode::default()
        .dimensions(width, height)
        .fullscreen_type(fullscreen)
        .resizable(false);

    let (mut ctx, event_loop) = ggez::ContextBuilder::new("snake_rush", "snake_rush")
        .add_resource_path(resource_dir)
        .window_setup(window_setup)
        .window_mode(window_mode)
        .build()?;

    let game = Game::new(&mut ctx, &config)?;
    info!(
        width = config.grid.width,
        height = config.grid.height,
        "window ready"
    );
    event::run(ctx, event_loop, game)
}
