use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};

use ascii_meadow::{
    config::{SceneConfig, ValidatedConfig},
    demo,
    engine::Scene,
    player::Player,
    renderer::{SceneRenderer, TextSurface},
    sprites::{SpriteDir, SpriteSource},
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "ascii-meadow play [scene.json] [--sprites DIR]";
const CHECK_USAGE: &str = "ascii-meadow check <scene.json>";
const FRAME_USAGE: &str = "ascii-meadow frame [scene.json] [--sprites DIR] [--size WxH] [--walk MS]";

/// Positional scene path plus `--flag value` pairs.
#[derive(Debug, Default)]
struct Args {
    scene: Option<String>,
    sprites: Option<String>,
    size: Option<String>,
    walk: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>, usage: &'static str) -> Result<Args> {
    let mut out = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sprites" => out.sprites = Some(args.next().context(usage)?),
            "--size" => out.size = Some(args.next().context(usage)?),
            "--walk" => out.walk = Some(args.next().context(usage)?),
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n\nUsage: {usage}"),
            _ if out.scene.is_none() => out.scene = Some(arg),
            _ => bail!("Unexpected argument {arg}\n\nUsage: {usage}"),
        }
    }
    Ok(out)
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let args = parse_args(args, PLAY_USAGE)?;
            play(&args)
        }
        Some("check") => {
            let path = args.next().context(CHECK_USAGE)?;
            check(&path)
        }
        Some("frame") => {
            let args = parse_args(args, FRAME_USAGE)?;
            frame(&args)
        }
        _ => bail!(
            "ASCII Meadow: depth-projected terminal scene\n\nUsage:\n  {PLAY_USAGE}\n  {CHECK_USAGE}\n  {FRAME_USAGE}"
        ),
    }
}

fn load_config(args: &Args) -> Result<ValidatedConfig> {
    match &args.scene {
        Some(path) => SceneConfig::load(Path::new(path)),
        None => demo::config().context("Built-in scene is invalid"),
    }
}

fn sprite_source(args: &Args, config: &ValidatedConfig) -> Box<dyn SpriteSource> {
    match &args.sprites {
        Some(dir) => Box::new(SpriteDir::new(dir)),
        None => Box::new(demo::library(config)),
    }
}

fn play(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let source = sprite_source(args, &config);
    let mut player = Player::new(&config, source)?;
    player.play()
}

fn check(path: &str) -> Result<()> {
    let config = SceneConfig::load(Path::new(path))?;
    let entities: usize = config
        .layers
        .iter()
        .map(|l| l.positions.as_ref().map_or(1, Vec::len))
        .sum();
    println!(
        "{path}: ok ({} layers, {} sprites, ~{} placed entities)",
        config.layers.len(),
        config.sprites.len(),
        entities,
    );
    Ok(())
}

/// Render one frame to stdout after optionally walking right for a while.
fn frame(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let source = sprite_source(args, &config);
    let viewport = match &args.size {
        Some(s) => parse_size(s)?,
        None => (config.settings.viewport_width, config.settings.viewport_height),
    };
    let walk_ms: f64 = match &args.walk {
        Some(ms) => ms.parse().with_context(|| format!("Invalid --walk value {ms}"))?,
        None => 0.0,
    };

    let mut scene = Scene::load(&config, source.as_ref(), viewport);
    let mut renderer = SceneRenderer::new();
    let mut surface = TextSurface::new();
    let step = 1000.0 / config.settings.fps.max(1) as f64;

    // Let first-sighting fades finish before the frame that gets printed.
    let mut now = 0.0;
    renderer.render_frame(&mut scene, now, &mut surface)?;
    now += config.settings.fade_ms;
    renderer.render_frame(&mut scene, now, &mut surface)?;

    if walk_ms > 0.0 {
        scene.walk(true);
        let end = now + walk_ms;
        while now < end {
            now = (now + step).min(end);
            renderer.render_frame(&mut scene, now, &mut surface)?;
        }
    }

    let text = surface.last().context("No frame rendered")?;
    println!("{text}");
    Ok(())
}

fn parse_size(s: &str) -> Result<(u16, u16)> {
    let (w, h) = s
        .split_once('x')
        .with_context(|| format!("Invalid size {s}, expected WxH"))?;
    let w: u16 = w.parse().with_context(|| format!("Invalid width in {s}"))?;
    let h: u16 = h.parse().with_context(|| format!("Invalid height in {s}"))?;
    if w == 0 || h == 0 {
        bail!("Size {s} must be at least 1x1");
    }
    Ok((w, h))
}
