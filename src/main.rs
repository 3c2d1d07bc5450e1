//! Meadow entry point
//!
//! Headless native runner: loads tuning and an optional save, drives the
//! simulation at 60 Hz with a scripted walk, assembles a frame per step, and
//! writes the save back out.
//!
//! Usage: `meadow [--seconds N] [--config PATH] [--save PATH] [--fresh]`
//! (`--help` lists the options)

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use meadow::persistence::{self, SaveRecord};
use meadow::platform::{InputState, PointerButton};
use meadow::renderer::assets::AssetStore;
use meadow::renderer::lighting::Starfield;
use meadow::renderer::{GROUND_TEXTURE, build_frame};
use meadow::sim::{PlaceableKind, WorldState, tick};
use meadow::SimConfig;

/// Fixed step the runner feeds into the simulation
const SIM_DT: f32 = 1.0 / 60.0;
/// Seconds each scripted walking direction is held
const LEG_SECS: f32 = 2.0;

#[derive(Parser)]
#[command(name = "meadow", about = "Run the meadow simulation headless", version)]
struct Options {
    /// Simulated seconds to run
    #[arg(short, long, default_value_t = 30.0)]
    seconds: f32,

    /// Tuning file (JSON); defaults are used if it is missing
    #[arg(short, long, default_value = "meadow.json")]
    config: PathBuf,

    /// Save file to load from and write back to
    #[arg(long, default_value = "meadow-save.json")]
    save: PathBuf,

    /// Ignore any existing save and generate a new world
    #[arg(long)]
    fresh: bool,
}

struct Game {
    state: WorldState,
    input: InputState,
    assets: AssetStore,
    starfield: Starfield,
    /// Key currently held by the script
    held: Option<&'static str>,
    frames: u64,
}

impl Game {
    fn new(state: WorldState) -> Self {
        let tile = state.config.tile_size;
        let mut textures = vec![(GROUND_TEXTURE, state.world_size())];
        textures.extend(PlaceableKind::ALL.map(|k| (k.texture(), k.sprite_rect(tile).size)));
        textures.extend(state.items.iter().map(|def| (def.icon, Vec2::splat(tile))));

        let mut assets = AssetStore::new();
        for (path, _) in &textures {
            assets.request(path);
        }
        log::debug!("Requested {} textures", assets.pending().count());
        // Nothing is decoded headless; report sizes so sprites are emitted
        for (path, size) in textures {
            assets.mark_ready(path, size);
        }
        let starfield = Starfield::new(state.config.seed, state.config.star_count);
        Self {
            state,
            input: InputState::new(),
            assets,
            starfield,
            held: None,
            frames: 0,
        }
    }

    /// Walk a square, greeting the first NPC at the start of each lap
    fn script(&mut self, elapsed: f32) {
        const KEYS: [&str; 4] = ["d", "s", "a", "w"];
        let leg = (elapsed / LEG_SECS) as usize;
        let key = KEYS[leg % KEYS.len()];
        if self.held != Some(key) {
            if let Some(prev) = self.held {
                self.input.key_up(prev);
            }
            self.input.key_down(key, false);
            self.held = Some(key);

            if leg % KEYS.len() == 0 {
                if let Some(npc) = self.state.npcs.first() {
                    let screen = self.state.camera.world_to_screen(npc.pos);
                    self.input.pointer_move(screen);
                    self.input.pointer_down(PointerButton::Secondary);
                }
            }
        }
    }

    fn step(&mut self) {
        let input = self.input.take_tick_input();
        tick(&mut self.state, &input, SIM_DT);
        let frame = build_frame(&self.state, &self.assets, &mut self.starfield);
        self.frames += 1;

        if self.frames % 600 == 0 {
            let cam = self.state.camera.state();
            log::info!(
                "{} | player ({:.1}, {:.1}) | camera ({:.1}, {:.1}) x{:.2} | {} draw cmds, {} lighting passes",
                self.state.time.clock(),
                self.state.player.pos.x,
                self.state.player.pos.y,
                cam.cam_x,
                cam.cam_y,
                cam.zoom,
                frame.world.len(),
                frame.lighting.len()
            );
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Meadow (headless) starting...");

    let opts = Options::parse();
    let config = SimConfig::load(&opts.config);

    let state = if opts.fresh {
        WorldState::new(config)
    } else {
        match persistence::load_from_file(&opts.save) {
            Ok(record) => record.restore(&config),
            Err(e) => {
                log::info!("No usable save ({e}), starting a new world");
                WorldState::new(config)
            }
        }
    };

    let mut game = Game::new(state);
    let steps = (opts.seconds.max(0.0) / SIM_DT).round() as u64;
    for i in 0..steps {
        game.script(i as f32 * SIM_DT);
        game.step();
    }

    log::info!("Ran {} frames, clock at {}", game.frames, game.state.time.clock());
    if let Err(e) = persistence::save_to_file(&opts.save, &SaveRecord::capture(&game.state)) {
        log::error!("Save failed: {e}");
    }
}
