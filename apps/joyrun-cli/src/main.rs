use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use joyrun_assets::{AssetLoader, DirModelSource, ImmediateLoader, ModelData, ThreadedLoader};
use joyrun_common::{CharacterVariant, ModelFormat};
use joyrun_input::Action;
use joyrun_kernel::{GameSession, GameStatus, HighScoreStore, SimConfig};
use joyrun_persist::FileHighScoreStore;
use joyrun_render::DebugScene;
use joyrun_runtime::GameApp;
use joyrun_tools::{EventTally, SessionInspector};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Nominal display refresh used to derive `elapsed` for headless runs.
const FRAME_SECONDS: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "joyrun", about = "Headless tools for the joyrun endless runner")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and the character table
    Info,
    /// Run a headless game and print a summary
    Simulate {
        /// Maximum number of frames to run
        #[arg(short, long, default_value = "3600")]
        frames: u64,
        /// RNG seed for obstacle generation
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Character to play (fanfan, rabbit, tako)
        #[arg(short, long, default_value = "fanfan")]
        character: CharacterVariant,
        /// Jump when the next obstacle is within this distance
        #[arg(long, default_value = "3.0", conflicts_with = "jump_every")]
        lookahead: f32,
        /// Jump on a fixed frame period instead of watching obstacles
        #[arg(long)]
        jump_every: Option<u64>,
        /// Simulation constants (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory the character model URLs resolve against
        #[arg(long, default_value = "assets")]
        assets_dir: PathBuf,
        /// Directory holding the persisted high score
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Load models on a background thread
        #[arg(long)]
        threaded: bool,
        /// Print the final rendered frame
        #[arg(long)]
        show_frame: bool,
    },
    /// Decode a model file and print a summary
    Model {
        path: PathBuf,
        /// Override the format inferred from the file extension
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Show or reset the persisted high score
    HighScore {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// STL triangle mesh
    Mesh,
    /// glTF scene (GLB or .gltf)
    Scene,
}

impl From<FormatArg> for ModelFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mesh => ModelFormat::Mesh,
            FormatArg::Scene => ModelFormat::Scene,
        }
    }
}

/// How the headless player decides to jump.
#[derive(Clone, Copy)]
enum Pilot {
    Lookahead(f32),
    Every(u64),
}

impl Pilot {
    fn wants_jump(self, session: &GameSession) -> bool {
        let body = session.body();
        match self {
            Pilot::Every(period) => period > 0 && session.frame() % period == 0,
            Pilot::Lookahead(distance) => {
                let x = session.config().player_x;
                body.is_grounded()
                    && session
                        .obstacles()
                        .iter()
                        .any(|o| o.x > x && o.x - x < distance)
            }
        }
    }
}

struct SimulateOptions {
    frames: u64,
    pilot: Pilot,
    show_frame: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("joyrun v{}", env!("CARGO_PKG_VERSION"));
            println!("persist: {}", joyrun_persist::crate_info());
            println!("assets: {}", joyrun_assets::crate_info());
            println!("render: {}", joyrun_render::crate_info());
            println!("Characters:");
            for variant in CharacterVariant::ALL {
                let p = variant.profile();
                println!(
                    "  {:<7} scale={:.1} offset={:.1} tint={} model={} ({:?})",
                    variant.label(),
                    p.scale,
                    p.vertical_offset,
                    p.tint,
                    p.model_path,
                    p.format
                );
            }
        }
        Commands::Simulate {
            frames,
            seed,
            character,
            lookahead,
            jump_every,
            config,
            assets_dir,
            data_dir,
            threaded,
            show_frame,
        } => {
            let config = match config {
                Some(path) => SimConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => SimConfig::default(),
            };
            config.validate().context("invalid simulation config")?;

            let store = FileHighScoreStore::in_dir(&data_dir);
            let session = GameSession::new(config, seed, Box::new(store));
            let source = DirModelSource::new(&assets_dir);
            let opts = SimulateOptions {
                frames,
                pilot: jump_every.map_or(Pilot::Lookahead(lookahead), Pilot::Every),
                show_frame,
            };

            if threaded {
                let loader = ThreadedLoader::spawn(source).context("starting asset loader")?;
                simulate(GameApp::new(session, DebugScene::new(), loader), character, opts)?;
            } else {
                let loader = ImmediateLoader::new(source);
                simulate(GameApp::new(session, DebugScene::new(), loader), character, opts)?;
            }
        }
        Commands::Model { path, format } => {
            let format = match format {
                Some(f) => f.into(),
                None => infer_format(&path)?,
            };
            let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("model");
            let model = ModelData::decode(&bytes, format, name)
                .with_context(|| format!("decoding {}", path.display()))?;
            print_model(&model);
        }
        Commands::HighScore { data_dir, reset } => {
            let store = FileHighScoreStore::in_dir(&data_dir);
            if reset {
                store.clear().context("resetting high score")?;
                println!("High score reset ({})", store.path().display());
            } else {
                match store.load() {
                    Ok(Some(value)) => println!("High score: {value}"),
                    Ok(None) => println!("High score: none recorded"),
                    Err(e) => bail!("reading {}: {e}", store.path().display()),
                }
            }
        }
    }

    Ok(())
}

fn simulate<L: AssetLoader>(
    mut app: GameApp<DebugScene, L>,
    character: CharacterVariant,
    opts: SimulateOptions,
) -> anyhow::Result<()> {
    app.select_character(character);

    // Background loads settle on their own schedule; wait for them with
    // frames like a real display loop would.
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut elapsed = 0.0;
    let mut tally = EventTally::new();
    while app.session().status() == GameStatus::Loading {
        if Instant::now() > deadline {
            bail!("character model never settled");
        }
        elapsed += FRAME_SECONDS;
        app.frame(elapsed);
        tally.record(app.frame_events());
        if app.session().status() == GameStatus::Loading {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    let input = app.input_handle();
    input.push(Action::StartGame);
    let mut last_frame = String::new();
    for _ in 0..opts.frames {
        if app.session().status() == GameStatus::GameOver {
            break;
        }
        if app.session().status() == GameStatus::Playing && opts.pilot.wants_jump(app.session()) {
            input.push(Action::Jump);
        }
        elapsed += FRAME_SECONDS;
        if let Some(frame) = app.frame(elapsed) {
            last_frame = frame;
        }
        tally.record(app.frame_events());
    }

    let summary = SessionInspector::summary(app.session());
    info!(score = summary.score, high = summary.high_score, frame = summary.frame, "Simulation finished");
    if summary.status == GameStatus::Playing {
        warn!("frame limit reached before game over; high score only updates on game over");
    }
    println!("{summary}");
    println!("{tally}");
    if opts.show_frame {
        print!("{last_frame}");
    }

    app.shutdown();
    Ok(())
}

fn infer_format(path: &Path) -> anyhow::Result<ModelFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("stl") => Ok(ModelFormat::Mesh),
        Some("glb" | "gltf") => Ok(ModelFormat::Scene),
        _ => bail!(
            "cannot infer model format of {}; pass --format",
            path.display()
        ),
    }
}

fn print_model(model: &ModelData) {
    println!("Model: {} ({:?})", model.name, model.format);
    println!("  content id: {}", model.content_id());
    println!(
        "  meshes={} vertices={} triangles={} materials={}",
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count(),
        model.materials.len()
    );
    if let Some((lo, hi)) = model.bounds() {
        println!(
            "  bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            lo.x, lo.y, lo.z, hi.x, hi.y, hi.z
        );
    }
    for material in &model.materials {
        let [r, g, b, a] = material.base_color;
        println!(
            "  material {}: base=({r:.2}, {g:.2}, {b:.2}, {a:.2}) metal={:.2} rough={:.2}",
            material.name, material.metalness, material.roughness
        );
    }
}
