//! Per-frame update
//!
//! Drives the gameplay state machine. Every phase starts from an empty
//! draw buffer except the result screens, which replay the frame frozen
//! when the round ended.

use glam::Vec2;

use super::components::TickContext;
use super::state::{Game, GameplayState, MenuItem};
use crate::consts::*;
use crate::platform::{Action, TickInput};
use crate::renderer::{TextDraw, colors};
use crate::ui::View;

const TITLE_FONT_SIZE: f32 = 96.0;
const MENU_FONT_SIZE: f32 = 48.0;
const MENU_LINE_HEIGHT: f32 = 72.0;
const HUD_FONT_SIZE: f32 = 32.0;
const OVERLAY_FONT_SIZE: f32 = 120.0;
const HUD_MARGIN: f32 = 24.0;

/// Advance the game by one frame of `dt` seconds. `now` is the wall clock
/// in seconds, used to time the result screens.
pub fn tick(game: &mut Game, input: &TickInput, dt: f32, now: f64) {
    let dt = dt.min(game.config.max_frame_dt).max(0.0);
    game.frame += 1;

    match game.phase {
        GameplayState::RunMenu => run_menu(game, input),
        GameplayState::RunGame => run_game(game, input, dt),
        GameplayState::PreGameOver => enter_result(game, GameplayState::GameOver, now),
        GameplayState::PreGameWin => enter_result(game, GameplayState::GameWin, now),
        GameplayState::GameOver | GameplayState::GameWin => run_result(game, now),
        GameplayState::Quit => game.draw.flush(),
    }
}

fn run_menu(game: &mut Game, input: &TickInput) {
    if input.just_pressed(Action::MenuUp) {
        game.menu_selection = game.menu_selection.prev();
    }
    if input.just_pressed(Action::MenuDown) {
        game.menu_selection = game.menu_selection.next();
    }

    if input.just_pressed(Action::Confirm) {
        match game.menu_selection {
            MenuItem::Play => {
                game.set_phase(GameplayState::RunGame);
                game.draw.flush();
                return;
            }
            MenuItem::Quit => {
                game.set_phase(GameplayState::Quit);
                game.draw.flush();
                return;
            }
        }
    }

    draw_menu(game);
}

fn draw_menu(game: &mut Game) {
    game.draw.flush();
    let font = game.resources.font;
    let root = game.ui_root;

    let title = "BREAKOUT";
    let title_view = View::push_centered(
        View::push_from(root, 0.0, 0.0, 0.0, root.height * 0.5),
        text_width(title, TITLE_FONT_SIZE),
        TITLE_FONT_SIZE,
    );
    game.draw.add(
        TextDraw::new(title, title_view.position(), font, TITLE_FONT_SIZE)
            .with_depth(DEPTH_OVERLAY),
    );

    let list = View::push_from(root, 0.0, root.height * 0.5, 0.0, 0.0);
    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let label = item.label();
        let width = text_width(label, MENU_FONT_SIZE);
        let anchor = View::push_text(
            list,
            (list.width - width) * 0.5,
            i as f32 * MENU_LINE_HEIGHT,
        );
        let color = if *item == game.menu_selection {
            colors::MENU_SELECTED
        } else {
            colors::MENU_IDLE
        };
        game.draw.add(
            TextDraw::new(label, anchor.position(), font, MENU_FONT_SIZE)
                .with_color(color)
                .with_depth(DEPTH_OVERLAY),
        );
    }
}

fn run_game(game: &mut Game, input: &TickInput, dt: f32) {
    if input.just_pressed(Action::Cancel) {
        game.set_phase(GameplayState::RunMenu);
        draw_menu(game);
        return;
    }

    game.draw.flush();
    let world = game.config.world_size();

    let scene = &mut game.scene;
    let mut ctx = TickContext {
        dt,
        input,
        world,
        draw: &mut game.draw,
        paddle: None,
    };
    scene.store.tick(&mut ctx);

    let report = scene.collisions.run(&mut scene.store, &mut scene.score);
    if !report.destroyed.is_empty() {
        log::debug!(
            "Frame {}: {} blocks destroyed, score {}",
            game.frame,
            report.destroyed.len(),
            scene.score
        );
    }

    let hud = View::push_text(game.ui_root, HUD_MARGIN, HUD_MARGIN);
    game.draw.add(
        TextDraw::new(
            format!("Score: {}", scene.score),
            hud.position(),
            game.resources.font,
            HUD_FONT_SIZE,
        )
        .with_depth(DEPTH_HUD),
    );

    if scene.ball_lost(world.y) {
        game.set_phase(GameplayState::PreGameOver);
    } else if scene.is_cleared() {
        game.set_phase(GameplayState::PreGameWin);
    }
}

/// Freeze the last gameplay frame and switch to its result screen
fn enter_result(game: &mut Game, result: GameplayState, now: f64) {
    game.frozen.clear();
    game.draw.record(&mut game.frozen);
    game.result_started_at = now;
    log::info!(
        "Round over with score {} ({} draw requests frozen)",
        game.scene.score,
        game.frozen.len()
    );
    game.set_phase(result);
    draw_result(game);
}

fn run_result(game: &mut Game, now: f64) {
    if now - game.result_started_at >= game.config.reset_delay_secs {
        game.reset_scene();
        game.menu_selection = MenuItem::Play;
        game.set_phase(GameplayState::RunMenu);
        draw_menu(game);
        return;
    }
    draw_result(game);
}

fn draw_result(game: &mut Game) {
    game.draw.flush();
    game.draw.copy_from(&game.frozen);

    let (text, color) = match game.phase {
        GameplayState::GameWin => ("YOU WIN", colors::WIN),
        _ => ("GAME OVER", colors::LOSE),
    };
    let view = View::push_centered(
        game.ui_root,
        text_width(text, OVERLAY_FONT_SIZE),
        OVERLAY_FONT_SIZE,
    );
    game.draw.add(
        TextDraw::new(text, view.position(), game.resources.font, OVERLAY_FONT_SIZE)
            .with_color(color)
            .with_depth(DEPTH_OVERLAY),
    );
}

/// Rough advance of a monospace-ish font
fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

impl Game {
    /// Advance one frame; see [`tick`]
    pub fn update(&mut self, input: &TickInput, dt: f32, now: f64) {
        tick(self, input, dt, now);
    }

    /// Center of the ball, if it exists
    pub fn ball_position(&self) -> Option<Vec2> {
        self.scene.ball().map(|ball| ball.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawLog;
    use crate::settings::{GameConfig, TileLayout};
    use crate::sim::components::BallComponent;
    use crate::sim::state::GameResources;

    fn new_game() -> Game {
        Game::new(GameConfig::default(), GameResources::default())
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn press(action: Action) -> TickInput {
        TickInput::default().press(action)
    }

    fn start(game: &mut Game) {
        game.update(&press(Action::Confirm), TIME_STEP, 0.0);
        assert_eq!(game.phase(), GameplayState::RunGame);
    }

    fn drop_ball(game: &mut Game) {
        let scene = game.scene_mut();
        let id = scene.ball;
        let ball = scene
            .store
            .get_mut(id)
            .and_then(|e| e.component_mut::<BallComponent>())
            .expect("ball");
        ball.launch();
        ball.position.y = 2000.0;
        ball.velocity = Vec2::new(0.0, 500.0);
    }

    #[test]
    fn test_menu_draws_title_and_entries() {
        let mut game = new_game();
        game.update(&idle(), TIME_STEP, 0.0);

        assert_eq!(game.phase(), GameplayState::RunMenu);
        let texts = game.draw_buffer().texts();
        assert_eq!(texts.len(), 1 + MenuItem::ALL.len());
        assert_eq!(texts[1].text, "Play");
        assert_eq!(texts[1].color, colors::MENU_SELECTED);
        assert_eq!(texts[2].color, colors::MENU_IDLE);
    }

    #[test]
    fn test_confirm_play_starts_game() {
        let mut game = new_game();
        start(&mut game);

        game.update(&idle(), TIME_STEP, 0.0);
        assert_eq!(game.phase(), GameplayState::RunGame);
        // Paddle, ball and 50 blocks
        assert_eq!(game.draw_buffer().textures().len(), 52);
        assert_eq!(game.draw_buffer().texts()[0].text, "Score: 0");
    }

    #[test]
    fn test_menu_quit() {
        let mut game = new_game();
        game.update(&press(Action::MenuDown), TIME_STEP, 0.0);
        assert_eq!(game.menu_selection(), MenuItem::Quit);

        game.update(&press(Action::Confirm), TIME_STEP, 0.0);
        assert!(game.should_quit());

        game.update(&press(Action::Confirm), TIME_STEP, 0.0);
        assert!(game.should_quit());
        assert!(game.draw_buffer().is_empty());
    }

    #[test]
    fn test_cancel_returns_to_menu_without_reset() {
        let mut game = new_game();
        start(&mut game);
        game.scene_mut().score = 5;

        game.update(&press(Action::Cancel), TIME_STEP, 0.0);
        assert_eq!(game.phase(), GameplayState::RunMenu);
        assert_eq!(game.score(), 5);

        start(&mut game);
        assert_eq!(game.score(), 5);
    }

    #[test]
    fn test_ball_launch_and_paddle_movement() {
        let mut game = new_game();
        start(&mut game);
        let paddle_x = game.scene().player().expect("player").position.x;

        game.update(&press(Action::Launch), TIME_STEP, 0.0);
        assert!(game.scene().ball().expect("ball").is_launched());

        game.update(&idle().hold(Action::MoveLeft), TIME_STEP, 0.0);
        assert!(game.scene().player().expect("player").position.x < paddle_x);
    }

    #[test]
    fn test_clearing_the_field_wins() {
        let mut game = new_game();
        start(&mut game);
        let blocks = game.scene().map.block_count() as u32;
        game.scene_mut().score = blocks;

        game.update(&idle(), TIME_STEP, 0.0);
        assert_eq!(game.phase(), GameplayState::PreGameWin);

        game.update(&idle(), TIME_STEP, 1.0);
        assert_eq!(game.phase(), GameplayState::GameWin);
        let overlay = game.draw_buffer().texts().last().expect("overlay");
        assert_eq!(overlay.text, "YOU WIN");
        assert_eq!(overlay.depth, DEPTH_OVERLAY);
    }

    #[test]
    fn test_losing_the_ball_ends_the_round() {
        let mut game = new_game();
        start(&mut game);
        drop_ball(&mut game);

        game.update(&idle(), TIME_STEP, 0.0);
        assert_eq!(game.phase(), GameplayState::PreGameOver);

        game.update(&idle(), TIME_STEP, 0.0);
        assert_eq!(game.phase(), GameplayState::GameOver);
        let overlay = game.draw_buffer().texts().last().expect("overlay");
        assert_eq!(overlay.text, "GAME OVER");
    }

    #[test]
    fn test_result_screen_replays_frozen_frame() {
        let mut game = new_game();
        start(&mut game);
        drop_ball(&mut game);
        game.update(&idle(), TIME_STEP, 0.0);
        let last_frame_textures = game.draw_buffer().textures().to_vec();
        let last_frame_texts = game.draw_buffer().texts().to_vec();

        game.update(&idle(), TIME_STEP, 5.0);
        assert_eq!(game.frozen_frame().textures, last_frame_textures);
        assert_eq!(game.frozen_frame().texts, last_frame_texts);

        // Input is ignored and the frame does not change
        for t in [5.5, 6.0, 7.5] {
            game.update(&idle().hold(Action::MoveRight), TIME_STEP, t);
            assert_eq!(game.phase(), GameplayState::GameOver);
            assert_eq!(game.draw_buffer().textures(), &last_frame_textures[..]);
            let texts = game.draw_buffer().texts();
            assert_eq!(texts.len(), last_frame_texts.len() + 1);
            assert_eq!(&texts[..last_frame_texts.len()], &last_frame_texts[..]);
        }

        let mut log = DrawLog::default();
        game.draw(&mut log);
        assert_eq!(log.calls.len(), last_frame_textures.len() + last_frame_texts.len() + 1);
    }

    #[test]
    fn test_reset_after_delay() {
        let mut game = new_game();
        start(&mut game);
        game.update(&press(Action::Launch), TIME_STEP, 0.0);
        game.update(&idle().hold(Action::MoveLeft), TIME_STEP, 0.0);
        let start_position = game.config().paddle_start();
        assert_ne!(game.scene().player().expect("player").position, start_position);

        game.scene_mut().score = 50;
        game.update(&idle(), TIME_STEP, 0.0);
        game.update(&idle(), TIME_STEP, 10.0);
        assert_eq!(game.phase(), GameplayState::GameWin);

        game.update(&idle(), TIME_STEP, 12.9);
        assert_eq!(game.phase(), GameplayState::GameWin);

        game.update(&idle(), TIME_STEP, 13.0);
        assert_eq!(game.phase(), GameplayState::RunMenu);
        assert_eq!(game.score(), 0);
        assert_eq!(game.scene().blocks_remaining(), 50);
        assert_eq!(game.scene().map.block_count(), 50);
        assert!(!game.scene().ball().expect("ball").is_launched());
        assert_eq!(game.scene().player().expect("player").position, start_position);
        assert!(game.frozen_frame().is_empty());

        start(&mut game);
        game.update(&idle(), TIME_STEP, 14.0);
        assert_eq!(game.phase(), GameplayState::RunGame);
    }

    #[test]
    fn test_hitting_the_last_block_wins() {
        let config = GameConfig {
            ball_initial_velocity: Vec2::new(0.0, -600.0),
            layout: TileLayout {
                origin: Vec2::new(900.0, 300.0),
                tile_size: Vec2::new(120.0, 40.0),
                width: 1,
                height: 1,
                tiles: vec![1],
            },
            ..GameConfig::default()
        };
        let mut game = Game::new(config, GameResources::default());
        start(&mut game);
        game.update(&press(Action::Launch), TIME_STEP, 0.0);

        let mut frames = 0;
        while game.phase() == GameplayState::RunGame && frames < 500 {
            game.update(&idle(), TIME_STEP, 0.0);
            frames += 1;
        }
        assert_eq!(game.phase(), GameplayState::PreGameWin);
        assert_eq!(game.score(), 1);
        assert_eq!(game.scene().blocks_remaining(), 0);
    }

    #[test]
    fn test_bad_frame_clamp_does_not_panic() {
        for limit in [-1.0, f32::NAN] {
            let config = GameConfig {
                max_frame_dt: limit,
                ..GameConfig::default()
            };
            let mut game = Game::new(config, GameResources::default());
            start(&mut game);
            game.update(&press(Action::Launch), TIME_STEP, 0.0);
            game.update(&idle(), 0.01, 0.0);
            assert_eq!(game.phase(), GameplayState::RunGame);
        }
    }

    #[test]
    fn test_large_frame_time_is_clamped() {
        let mut game = new_game();
        start(&mut game);
        game.update(&press(Action::Launch), TIME_STEP, 0.0);
        let before = game.ball_position().expect("ball");

        game.update(&idle(), 5.0, 0.0);
        let after = game.ball_position().expect("ball");
        let max_step = GameConfig::default().ball_initial_velocity.length() * 0.1;
        assert!((after - before).length() <= max_step + 1e-3);
    }

    #[test]
    fn test_ball_breaks_block_and_scores() {
        let mut game = new_game();
        start(&mut game);

        let scene = game.scene_mut();
        let block = scene.map.tile_rect(0, 4);
        let id = scene.ball;
        let ball = scene
            .store
            .get_mut(id)
            .and_then(|e| e.component_mut::<BallComponent>())
            .expect("ball");
        ball.launch();
        ball.position = Vec2::new(block.center().x, block.bottom() + ball.radius + 1.0);
        ball.velocity = Vec2::new(0.0, -300.0);

        game.update(&idle(), TIME_STEP, 0.0);
        assert_eq!(game.score(), 1);
        assert_eq!(game.scene().blocks_remaining(), 49);
        assert!(game.scene().ball().expect("ball").velocity.y > 0.0);
    }
}
