//! Drawing for every screen. Reads a [`Snapshot`]; never touches the session.

use ggez::mint::Point2;
use ggez::{graphics, Context, GameResult};
use std::f32::consts::PI;

use snake_rush::{FoodTier, SessionState, Snapshot};

pub const BACKGROUND_COLOR: graphics::Color = graphics::Color::new(0.1, 0.1, 0.15, 1.0);
const GRID_COLOR: graphics::Color = graphics::Color::new(0.15, 0.15, 0.2, 1.0);
const HEAD_COLOR: graphics::Color = graphics::Color::new(0.0, 1.0, 1.0, 1.0);
const DIM_COLOR: graphics::Color = graphics::Color::new(0.0, 0.0, 0.0, 0.7);
const SELECTED_COLOR: graphics::Color = graphics::Color::GREEN;

fn food_color(tier: FoodTier) -> graphics::Color {
    match tier {
        FoodTier::Common => graphics::Color::new(1.0, 0.0, 0.0, 1.0),
        FoodTier::Uncommon => graphics::Color::new(1.0, 1.0, 0.0, 1.0),
        FoodTier::Rare => graphics::Color::new(0.0, 0.0, 1.0, 1.0),
        FoodTier::Epic => graphics::Color::new(0.5, 0.0, 0.5, 1.0),
    }
}

/// UI-side state the snapshot does not carry.
pub struct View {
    pub cell_size: f32,
    pub food_animation: f32,
    pub menu: Vec<String>,
    pub menu_selection: usize,
    pub confirm_reset: bool,
}

pub fn draw_screen(
    ctx: &mut Context,
    canvas: &mut graphics::Canvas,
    snapshot: &Snapshot<'_>,
    view: &View,
) -> GameResult {
    let (width, height) = ctx.gfx.drawable_size();
    match snapshot.state {
        SessionState::TitleScreen => {
            draw_title(canvas, width, height, snapshot.high_score);
            draw_menu(canvas, width, height / 2.0, view);
        }
        SessionState::Playing => draw_board(ctx, canvas, snapshot, view)?,
        SessionState::Paused => {
            draw_board(ctx, canvas, snapshot, view)?;
            draw_dim(ctx, canvas, width, height)?;
            draw_heading(canvas, "PAUSED", width, height / 2.0 - 200.0);
            draw_menu(canvas, width, height / 2.0 - 120.0, view);
        }
        SessionState::Options => {
            draw_heading(canvas, "OPTIONS", width, 80.0);
            draw_menu(canvas, width, 200.0, view);
        }
        SessionState::LeaderboardView => draw_leaderboard(canvas, snapshot, width, height, view),
        SessionState::GameOver => {
            draw_board(ctx, canvas, snapshot, view)?;
            draw_dim(ctx, canvas, width, height)?;
            draw_game_over(canvas, snapshot, width, height);
        }
    }
    Ok(())
}

fn cell_rect(x: i16, y: i16, cell: f32, inset: f32) -> graphics::Rect {
    graphics::Rect::new(
        x as f32 * cell + inset,
        y as f32 * cell + inset,
        cell - 2.0 * inset,
        cell - 2.0 * inset,
    )
}

fn fill(
    ctx: &mut Context,
    canvas: &mut graphics::Canvas,
    rect: graphics::Rect,
    color: graphics::Color,
) -> GameResult {
    canvas.draw(
        &graphics::Mesh::new_rectangle(ctx, graphics::DrawMode::fill(), rect, color)?,
        graphics::DrawParam::default(),
    );
    Ok(())
}

fn draw_text(canvas: &mut graphics::Canvas, text: &str, scale: f32, x: f32, y: f32, color: graphics::Color) {
    let mut text = graphics::Text::new(text);
    let _ = text.set_scale(scale);
    canvas.draw(
        &text,
        graphics::DrawParam::default()
            .dest(Point2 { x, y })
            .color(color),
    );
}

/// Roughly centred on `width`; ggez text has no anchor, so estimate.
fn draw_centered(canvas: &mut graphics::Canvas, text: &str, scale: f32, width: f32, y: f32, color: graphics::Color) {
    let x = (width - text.chars().count() as f32 * scale * 0.5) / 2.0;
    draw_text(canvas, text, scale, x.max(0.0), y, color);
}

fn draw_heading(canvas: &mut graphics::Canvas, text: &str, width: f32, y: f32) {
    draw_centered(canvas, text, 48.0, width, y, graphics::Color::WHITE);
}

fn draw_dim(ctx: &mut Context, canvas: &mut graphics::Canvas, width: f32, height: f32) -> GameResult {
    fill(ctx, canvas, graphics::Rect::new(0.0, 0.0, width, height), DIM_COLOR)
}

fn draw_title(canvas: &mut graphics::Canvas, width: f32, height: f32, high_score: u32) {
    draw_centered(canvas, "SNAKE RUSH", 64.0, width, height / 4.0, graphics::Color::GREEN);
    draw_centered(canvas, "Endless Mode", 28.0, width, height / 4.0 + 80.0, graphics::Color::WHITE);
    if high_score > 0 {
        draw_centered(
            canvas,
            &format!("High Score: {high_score}"),
            24.0,
            width,
            height / 4.0 + 120.0,
            graphics::Color::YELLOW,
        );
    }
}

fn draw_menu(canvas: &mut graphics::Canvas, width: f32, top: f32, view: &View) {
    for (i, item) in view.menu.iter().enumerate() {
        let color = if i == view.menu_selection {
            SELECTED_COLOR
        } else {
            graphics::Color::WHITE
        };
        draw_centered(canvas, item, 32.0, width, top + i as f32 * 50.0, color);
    }
}

fn draw_board(
    ctx: &mut Context,
    canvas: &mut graphics::Canvas,
    snapshot: &Snapshot<'_>,
    view: &View,
) -> GameResult {
    let cell = view.cell_size;
    let grid = snapshot.grid;

    for x in 0..grid.width() {
        for y in 0..grid.height() {
            if (i32::from(x) + i32::from(y)) % 2 == 0 {
                fill(ctx, canvas, cell_rect(x, y, cell, 0.0), GRID_COLOR)?;
            }
        }
    }

    let len = snapshot.segments.len() as f32;
    for (i, pos) in snapshot.segments.iter().enumerate() {
        let color = if i == 0 {
            HEAD_COLOR
        } else {
            let shade = (1.0 - i as f32 / len * 0.6).max(0.2);
            graphics::Color::new(0.0, shade, 0.0, 1.0)
        };
        fill(ctx, canvas, cell_rect(pos.x, pos.y, cell, 1.0), color)?;
    }

    let pulse = (view.food_animation * PI).sin() * cell * 0.08;
    for food in snapshot.foods {
        let pos = food.position();
        fill(ctx, canvas, cell_rect(pos.x, pos.y, cell, 1.0 + pulse.abs()), food_color(food.tier()))?;
        // Tier marker: a dark centre square growing with the tier.
        let inset = cell / 2.0 - food.tier().number() as f32 * cell / 12.0;
        fill(ctx, canvas, cell_rect(pos.x, pos.y, cell, inset), graphics::Color::BLACK)?;
    }

    let hud = format!(
        "Score: {} | Length: {} | Speed: {} | Best: {}",
        snapshot.score,
        snapshot.length,
        snapshot.speed,
        snapshot.high_score.max(snapshot.score),
    );
    draw_text(canvas, &hud, 20.0, 10.0, 10.0, graphics::Color::WHITE);
    Ok(())
}

pub fn draw_particle(
    ctx: &mut Context,
    canvas: &mut graphics::Canvas,
    pos: Point2<f32>,
    size: f32,
    color: graphics::Color,
) -> GameResult {
    let rect = graphics::Rect::new(pos.x - size / 2.0, pos.y - size / 2.0, size, size);
    fill(ctx, canvas, rect, color)
}

fn draw_game_over(canvas: &mut graphics::Canvas, snapshot: &Snapshot<'_>, width: f32, height: f32) {
    let mid = height / 2.0;
    draw_centered(canvas, "GAME OVER", 56.0, width, mid - 120.0, graphics::Color::RED);
    draw_centered(
        canvas,
        &format!("Score: {}   Length: {}", snapshot.score, snapshot.length),
        28.0,
        width,
        mid - 40.0,
        graphics::Color::WHITE,
    );
    let best = snapshot.leaderboard.first().map_or(0, |e| e.score);
    if snapshot.score > 0 && snapshot.score >= best {
        draw_centered(canvas, "New high score!", 28.0, width, mid, graphics::Color::YELLOW);
    }
    draw_centered(
        canvas,
        "R: restart   L: leaderboard   Esc: main menu",
        22.0,
        width,
        mid + 60.0,
        graphics::Color::WHITE,
    );
}

fn draw_leaderboard(
    canvas: &mut graphics::Canvas,
    snapshot: &Snapshot<'_>,
    width: f32,
    height: f32,
    view: &View,
) {
    draw_heading(canvas, "LEADERBOARD", width, 50.0);

    if snapshot.leaderboard.is_empty() {
        draw_centered(canvas, "No scores yet", 28.0, width, 160.0, graphics::Color::WHITE);
    }
    for (i, entry) in snapshot.leaderboard.iter().enumerate() {
        let line = format!(
            "{:2}. {:6}  len {:4}  {}",
            i + 1,
            entry.score,
            entry.length,
            entry.timestamp,
        );
        let color = if i == 0 {
            graphics::Color::YELLOW
        } else {
            graphics::Color::WHITE
        };
        draw_centered(canvas, &line, 24.0, width, 140.0 + i as f32 * 32.0, color);
    }

    let footer = if view.confirm_reset {
        "Reset all scores? Y / N"
    } else {
        "Esc: back   X: reset scores"
    };
    draw_centered(canvas, footer, 22.0, width, height - 60.0, graphics::Color::YELLOW);
}
