use std::{fs::File, io::BufWriter, path::PathBuf};

use beat_visualiser_core::{
    preset, AudioConfig, BeatTuning, BeatVizError, FrameClock, PixelCanvas, RenderLoop, SettingsStore,
    SyntheticInput, VisualConfig,
};
use clap::{Args, Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> beat_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Presets { store } => list_presets(&store),
        Commands::Config { store, set, save } => show_config(&store, &set, save),
        Commands::SavePreset { name, store, set } => save_preset(&name, &store, &set),
        Commands::DeletePreset { name, store } => delete_preset(&name, &store),
        Commands::Randomize { store, seed, save } => randomize(&store, seed, save),
    }
}

fn run(args: RunArgs) -> beat_visualiser_core::Result<()> {
    let store = args.store.open();
    let state = store.load();
    let library = state.library();

    let mut config = match args.preset.as_deref() {
        Some(name) => library.try_load(name)?,
        None => state.settings.clone(),
    };
    apply_overrides(&mut config, &args.set)?;

    tracing::info!(
        preset = args.preset.as_deref().unwrap_or("<saved>"),
        frames = args.frames,
        bpm = args.bpm,
        "starting synthetic run"
    );

    let mut input = SyntheticInput::new(
        &AudioConfig::default(),
        args.bpm,
        config.bass_frequency,
        config.bass_quality,
    )?;
    let mut canvas = PixelCanvas::new(args.width, args.height);
    let tuning = if args.sub_bass {
        BeatTuning::sub_bass()
    } else {
        BeatTuning::default()
    };
    let mut render_loop = RenderLoop::new(config, canvas.dimensions(), args.seed)
        .with_presets(library)
        .with_tuning(tuning);
    render_loop.start(&mut input)?;

    let mut clock = FrameClock::new(args.fps);
    let mut beats = 0_u64;
    for _ in 0..args.frames {
        input.pump(clock.frame_duration().as_secs_f32())?;
        let elapsed = clock.tick();
        let Some(report) = render_loop.frame(&mut canvas, elapsed) else {
            break;
        };
        if report.beat {
            beats += 1;
            tracing::debug!(
                frame = report.index,
                energy = report.energy,
                threshold = report.threshold,
                particles = report.particles,
                waves = report.waves,
                "beat"
            );
        }
        if args.realtime {
            std::thread::sleep(clock.frame_duration());
        }
    }
    render_loop.stop();

    let seconds = clock.elapsed().as_secs_f32();
    tracing::info!(
        frames = clock.frames(),
        beats,
        seconds,
        lit_pixels = canvas.lit_pixels(),
        "run finished"
    );

    if let Some(path) = args.snapshot {
        canvas.write_ppm(BufWriter::new(File::create(&path)?))?;
        tracing::info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn list_presets(store: &StoreArgs) -> beat_visualiser_core::Result<()> {
    let library = store.open().load().library();
    for name in library.names() {
        let kind = if preset::is_builtin(&name) { "built-in" } else { "user" };
        println!("{name}\t{kind}");
    }
    Ok(())
}

fn show_config(store: &StoreArgs, set: &[(String, String)], save: bool) -> beat_visualiser_core::Result<()> {
    let store = store.open();
    let mut state = store.load();
    apply_overrides(&mut state.settings, set)?;
    println!("{}", serde_json::to_string_pretty(&state.settings)?);

    if save {
        store.save(&state)?;
        tracing::info!(path = %store.path().display(), "settings saved");
    }
    Ok(())
}

fn save_preset(name: &str, store: &StoreArgs, set: &[(String, String)]) -> beat_visualiser_core::Result<()> {
    let store = store.open();
    let mut state = store.load();
    let mut config = state.settings.clone();
    apply_overrides(&mut config, set)?;

    let mut library = state.library();
    library.save(name, &config)?;
    state.set_library(&library);
    store.save(&state)
}

fn delete_preset(name: &str, store: &StoreArgs) -> beat_visualiser_core::Result<()> {
    let store = store.open();
    let mut state = store.load();
    let mut library = state.library();
    if library.remove(name).is_none() {
        return Err(BeatVizError::UnknownPreset(name.to_owned()));
    }
    state.set_library(&library);
    store.save(&state)
}

fn randomize(store: &StoreArgs, seed: Option<u64>, save: bool) -> beat_visualiser_core::Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let config = VisualConfig::randomized(&mut rng).sanitized();
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        let store = store.open();
        let mut state = store.load();
        state.settings = config;
        store.save(&state)?;
    }
    Ok(())
}

fn apply_overrides(config: &mut VisualConfig, set: &[(String, String)]) -> beat_visualiser_core::Result<()> {
    for (key, value) in set {
        config.apply_setting(key, value)?;
    }
    *config = config.sanitized();
    Ok(())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    Ok((key.trim().to_owned(), value.trim().to_owned()))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Beat-reactive visualiser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Settings file holding the saved configuration and user presets.
    #[arg(long = "settings", default_value = beat_visualiser_core::store::DEFAULT_SETTINGS_FILE)]
    path: PathBuf,
}

impl StoreArgs {
    fn open(&self) -> SettingsStore {
        SettingsStore::new(&self.path)
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Preset to start from instead of the saved settings.
    #[arg(short, long)]
    preset: Option<String>,
    #[command(flatten)]
    store: StoreArgs,
    /// Setting overrides applied on top of the preset.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    set: Vec<(String, String)>,
    /// Number of frames to render.
    #[arg(long, default_value_t = 600)]
    frames: u64,
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
    /// Tempo of the synthetic kick drum.
    #[arg(long, default_value_t = 120.0)]
    bpm: f32,
    #[arg(long, default_value_t = 800)]
    width: usize,
    #[arg(long, default_value_t = 600)]
    height: usize,
    /// Seed for particle directions and randomisation.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the final frame as a binary PPM image.
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Sleep between frames to play at wall-clock speed.
    #[arg(long)]
    realtime: bool,
    /// Detect beats on the kick-drum band only.
    #[arg(long)]
    sub_bass: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render frames from a synthetic beat.
    Run(RunArgs),
    /// List built-in and saved presets.
    Presets {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print the resolved configuration as JSON.
    Config {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
        /// Persist the result as the saved settings.
        #[arg(long)]
        save: bool,
    },
    /// Snapshot the saved settings, plus overrides, as a named preset.
    SavePreset {
        name: String,
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
    },
    /// Delete a saved user preset.
    DeletePreset {
        name: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Generate a random configuration.
    Randomize {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        save: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "beat-visualiser",
            "run",
            "--preset",
            "neon",
            "--frames",
            "30",
            "--set",
            "lineCount=12",
            "--settings",
            "custom.json",
            "--sub-bass",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert!(args.sub_bass);
                assert_eq!(args.preset.as_deref(), Some("neon"));
                assert_eq!(args.frames, 30);
                assert_eq!(args.set, vec![("lineCount".to_owned(), "12".to_owned())]);
                assert_eq!(args.store.path, PathBuf::from("custom.json"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deleting_a_missing_preset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreArgs {
            path: dir.path().join("settings.json"),
        };
        save_preset("mine", &store, &[]).unwrap();
        assert!(store.open().load().library().get("mine").is_some());

        delete_preset("mine", &store).unwrap();
        assert!(store.open().load().library().get("mine").is_none());
        assert!(matches!(
            delete_preset("mine", &store),
            Err(BeatVizError::UnknownPreset(_))
        ));
    }

    #[test]
    fn rejects_malformed_overrides() {
        assert!(parse_key_value("lineCount").is_err());
        assert_eq!(
            parse_key_value(" sensitivity = 40 ").unwrap(),
            ("sensitivity".to_owned(), "40".to_owned())
        );
    }

    #[test]
    fn overrides_are_applied_and_sanitized() {
        let mut config = VisualConfig::default();
        apply_overrides(
            &mut config,
            &[("sensitivity".to_owned(), "500".to_owned())],
        )
        .unwrap();
        assert_eq!(config.sensitivity, 100.0);
    }
}
