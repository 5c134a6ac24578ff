use std::path::PathBuf;

use clap::Parser;
use tiny_engine::{
    config::EngineConfig,
    EngineError
};

/// # Global Arguments
#[derive(Debug, Parser)]
#[command(version, about = "Tiny 2D engine demo", long_about = None)]
struct Cli {
    /// JSON config file, flags below override its values
    #[arg(short = 'c', long = "config", value_name = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Window title
    #[arg(short = 't', long = "title", value_name = "TITLE")]
    title: Option<String>,

    /// Window width in pixels
    #[arg(long = "width", value_name = "WIDTH")]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long = "height", value_name = "HEIGHT")]
    height: Option<u32>,

    /// Directory sprites are loaded from
    #[arg(short = 'a', long = "art-dir", value_name = "ART_DIR")]
    art_dir: Option<PathBuf>,

    /// Sprite file (relative to the art directory) used for the player
    #[arg(short = 's', long = "sprite", value_name = "SPRITE_NAME")]
    sprite: Option<String>,

    /// Player sprite scale factor
    #[arg(long = "sprite-scale", value_name = "SCALE", default_value_t = 1.0)]
    sprite_scale: f32,

    /// Number of randomly placed squares
    #[arg(short = 'b', long = "bots", value_name = "COUNT", default_value_t = 12)]
    bots: u32,
}

impl Cli {
    fn load_config(&self) -> Result<EngineConfig, EngineError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };

        if let Some(title) = &self.title {
            config.window_title = title.clone();
        }
        if let Some(width) = self.width {
            config.window_width = width;
        }
        if let Some(height) = self.height {
            config.window_height = height;
        }
        if let Some(art_dir) = &self.art_dir {
            config.art_dir = art_dir.clone();
        }
        Ok(config)
    }
}

fn main() {
    let cli_args = Cli::parse();
    let config = cli_args.load_config();

    let log_filter = config.as_ref()
        .map(|c| c.log_filter.clone())
        .unwrap_or_else(|_| "warn".to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .format_timestamp_millis()
        .format_file(false)
        .format_line_number(true)
        .init();

    log::info!("Got args: '{:?}'.", cli_args);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Could not load config: {e}");
            std::process::exit(1);
        },
    };

    let world = demo::build_world(&config, &cli_args);

    if let Err(e) = tiny_engine::app::run(config, world) {
        log::error!("Engine stopped with error: {e}");
        std::process::exit(1);
    }
}

mod demo {
    use rand::seq::IndexedRandom;
    use tiny_engine::{
        config::EngineConfig,
        game::{
            color::Rgb,
            components::{Sprite, Square},
            math::{Vector2F, Vector2I},
            object::Core,
            script::Script,
            world::World
        },
        input::Input,
        Result
    };

    use super::Cli;

    const TILE_SIZE: f32 = 40.0;
    const PLAYER_SPEED: f32 = 4.0;
    const PLAYER_COLORS: [Rgb; 6] = [
        Rgb::WHITE,
        Rgb::RED,
        Rgb::GREEN,
        Rgb::BLUE,
        Rgb::from_u8(255, 0, 255),
        Rgb::from_u8(255, 255, 0),
    ];

    struct PlayerController {
        spawnpoint: Vector2F,
        color_index: usize,
    }

    impl Script for PlayerController {
        fn start(&mut self, core: &mut Core) -> Result<()> {
            core.transform.move_to(self.spawnpoint);
            log::info!("'{core}' ready: arrows move, space recenters, R changes color");
            Ok(())
        }

        fn update(&mut self, core: &mut Core, input: &Input) -> Result<()> {
            let mut step = Vector2F::zero();
            if input.get_key("up")? {
                step.translate_up();
            }
            if input.get_key("down")? {
                step.translate_down();
            }
            if input.get_key("left")? {
                step.translate_left();
            }
            if input.get_key("right")? {
                step.translate_right();
            }
            core.transform.position += step * PLAYER_SPEED;

            if input.get_key_down("space")? {
                core.transform.move_to(self.spawnpoint);
            }

            if input.get_key_up("r")? {
                if let Ok(square) = core.get_mut::<Square>() {
                    self.color_index = (self.color_index + 1) % PLAYER_COLORS.len();
                    square.color = PLAYER_COLORS[self.color_index];
                    log::debug!("'{core}' color changed to {}", PLAYER_COLORS[self.color_index]);
                }
            }
            Ok(())
        }
    }

    fn player(config: &EngineConfig, cli_args: &Cli) -> Core {
        let mut core = Core::new("Player");

        if let Some(sprite_name) = &cli_args.sprite {
            match Sprite::load(&config.art_dir, sprite_name, cli_args.sprite_scale) {
                Ok(sprite) => {
                    core.add_component(sprite);
                    return core;
                },
                Err(e) => log::warn!("{e}, falling back to a square"),
            }
        }

        match Square::new(TILE_SIZE, TILE_SIZE, PLAYER_COLORS[0]) {
            Ok(square) => {
                core.add_component(square);
            },
            Err(e) => log::error!("Could not build player square: {e}"),
        }
        core
    }

    fn bot(index: u32, cell: Vector2I) -> Core {
        let mut core = Core::new(format!("Bot{index}"));
        let half_tile = Vector2F::new(TILE_SIZE / 2.0, TILE_SIZE / 2.0);
        core.transform.move_to(Vector2F::from(cell) * TILE_SIZE + half_tile);

        let channel = rand::random_range(35..150);
        match Square::new(TILE_SIZE - 4.0, TILE_SIZE - 4.0, Rgb::new(channel, channel, channel)) {
            Ok(square) => {
                core.add_component(square);
            },
            Err(e) => log::error!("Could not build '{core}' square: {e}"),
        }
        core
    }

    pub fn build_world(config: &EngineConfig, cli_args: &Cli) -> World {
        let mut world = World::new();

        let columns = (config.window_width as f32 / TILE_SIZE).max(1.0) as i32;
        let rows = (config.window_height as f32 / TILE_SIZE).max(1.0) as i32;
        let cells: Vec<Vector2I> = (0..columns)
            .flat_map(|x| (0..rows).map(move |y| Vector2I::new(x, y)))
            .collect();

        for (index, cell) in cells.choose_multiple(&mut rand::rng(), cli_args.bots as usize).enumerate() {
            world.spawn(bot(index as u32, *cell));
        }

        let spawnpoint = Vector2F::new(config.window_width as f32 / 2.0, config.window_height as f32 / 2.0);
        world.spawn_with_script(player(config, cli_args), PlayerController {
            spawnpoint,
            color_index: 0
        });

        world
    }
}
