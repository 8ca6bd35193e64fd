//! Breakout Core headless runner
//!
//! Drives the simulation at a fixed step with a simple autopilot and a
//! renderer that only counts what it is asked to draw.
//!
//! Usage: `breakout-core [config.json] [max-frames]`

use breakout_core::consts::TIME_STEP;
use breakout_core::platform::{Action, ActionSet, TickInput};
use breakout_core::renderer::{DrawLog, DrawRequest, ResKind, ResourceRegistry};
use breakout_core::sim::{Game, GameResources, GameplayState, MenuItem};
use breakout_core::GameConfig;

const DEFAULT_MAX_FRAMES: u64 = 90 * 120;
/// Rounds to play before choosing Quit from the menu
const ROUNDS: u32 = 3;

/// Plays by following the ball with the paddle
#[derive(Default)]
struct Autopilot {
    previous: ActionSet,
    rounds_finished: u32,
    last_phase: Option<GameplayState>,
}

impl Autopilot {
    fn sample(&mut self, game: &Game) -> TickInput {
        let phase = game.phase();
        if phase.is_result_screen() && self.last_phase != Some(phase) {
            self.rounds_finished += 1;
            log::info!("Round {} finished, score {}", self.rounds_finished, game.score());
        }
        self.last_phase = Some(phase);

        let mut held = ActionSet::EMPTY;
        // Release every other frame so presses register
        let tap = game.frame() % 2 == 0;

        match phase {
            GameplayState::RunMenu if tap => {
                let wanted = if self.rounds_finished >= ROUNDS {
                    MenuItem::Quit
                } else {
                    MenuItem::Play
                };
                if game.menu_selection() == wanted {
                    held.insert(Action::Confirm);
                } else {
                    held.insert(Action::MenuDown);
                }
            }
            GameplayState::RunGame => {
                if tap {
                    held.insert(Action::Launch);
                }
                if let (Some(ball), Some(paddle)) = (game.ball_position(), game.scene().player()) {
                    let offset = ball.x - paddle.center().x;
                    if offset < -paddle.size.x * 0.25 {
                        held.insert(Action::MoveLeft);
                    } else if offset > paddle.size.x * 0.25 {
                        held.insert(Action::MoveRight);
                    }
                    if offset.abs() > paddle.size.x {
                        held.insert(Action::Sprint);
                    }
                }
            }
            _ => {}
        }

        let input = TickInput::from_held(self.previous, held);
        self.previous = held;
        input
    }
}

fn register_resources(registry: &mut ResourceRegistry) -> GameResources {
    registry.register(GameResources::PADDLE, ResKind::Texture);
    registry.register(GameResources::BALL, ResKind::Texture);
    registry.register(GameResources::BLOCK, ResKind::Texture);
    registry.register(GameResources::FONT, ResKind::Font);
    GameResources::from_registry(registry)
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path),
        None => GameConfig::default(),
    };
    let max_frames = args
        .next()
        .and_then(|arg| match arg.parse::<u64>() {
            Ok(frames) => Some(frames),
            Err(err) => {
                log::warn!("Ignoring frame count '{}': {}", arg, err);
                None
            }
        })
        .unwrap_or(DEFAULT_MAX_FRAMES);

    log::info!("Breakout Core (headless) starting, {} frames max", max_frames);

    let mut registry = ResourceRegistry::new();
    let resources = register_resources(&mut registry);
    let mut game = Game::new(config, resources);
    let mut autopilot = Autopilot::default();
    let mut renderer = DrawLog::default();

    let mut textures = 0usize;
    let mut texts = 0usize;
    while !game.should_quit() && game.frame() < max_frames {
        let now = game.frame() as f64 * TIME_STEP as f64;
        let input = autopilot.sample(&game);
        game.update(&input, TIME_STEP, now);

        renderer.calls.clear();
        game.draw(&mut renderer);
        for call in &renderer.calls {
            match call {
                DrawRequest::Texture(_) => textures += 1,
                DrawRequest::Text(_) => texts += 1,
            }
        }
    }

    log::info!(
        "Stopped after {} frames in {}: {} rounds, score {}, {} texture and {} text draws",
        game.frame(),
        game.phase().as_str(),
        autopilot.rounds_finished,
        game.score(),
        textures,
        texts
    );
}
