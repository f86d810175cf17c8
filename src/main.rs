use anyhow::{bail, Context};
use camkit::{
    init_logging, CamSession, CamSettings, SceneIndex, SessionFile, Strategy, BUILD_DATE,
    VERSION,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "camkit", version, about = "Inspect and maintain CamKit session files")]
struct Cli {
    /// Settings file (JSON or TOML); defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the operations and chains of a session
    Inspect { session: PathBuf },
    /// Recheck every operation against a scene inventory
    Validate {
        session: PathBuf,
        /// Scene inventory exported as JSON
        #[arg(long)]
        scene: PathBuf,
        /// Write the revalidated session back
        #[arg(long)]
        write: bool,
    },
    /// Reset computations left running when the session was saved
    Recover { session: PathBuf },
    /// List the strategies that can be selected
    Strategies {
        /// Include experimental strategies
        #[arg(long)]
        experimental: bool,
    },
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<CamSettings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match CamSettings::default_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{}, using default settings", e);
                return Ok(CamSettings::default());
            }
        },
    };
    CamSettings::load_or_default(&path)
        .with_context(|| format!("loading settings from {}", path.display()))
}

fn inspect(session: &CamSession, settings: &CamSettings) {
    for (index, op) in session.operations().iter().enumerate() {
        let marker = if session
            .active_operation()
            .is_some_and(|active| active.name() == op.name())
        {
            '*'
        } else {
            ' '
        };
        println!(
            "{}{:>3} {} [{}] source: {}",
            marker,
            index,
            op.name(),
            op.strategy(),
            op.geometry_source()
        );
        println!(
            "      valid: {}  changed: {}  chipload: {:.6} m",
            op.is_valid(),
            op.is_changed(),
            op.chipload()
        );
        if let Some(pid) = op.pid() {
            println!("      computing in process {}", pid);
        }
        let raised: Vec<String> = op.tags().raised().iter().map(|t| t.to_string()).collect();
        if !raised.is_empty() {
            println!("      stale: {}", raised.join(", "));
        }
        if let Some(stats) = op.stats() {
            println!(
                "      last path: {:.1} min, max depth {:.4} m",
                stats.duration, stats.max_cutdepth
            );
        }
        for line in op.warnings().lines() {
            println!("      warning: {}", line);
        }
        for line in op.machine_warnings(&settings.machine) {
            println!("      machine: {}", line);
        }
    }

    for chain in session.chains() {
        println!(
            "chain {} ({}): {}",
            chain.name(),
            if chain.is_valid() { "valid" } else { "invalid" },
            chain.operations().join(" -> ")
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    init_logging(settings.log_level)?;
    info!("camkit {} built {}", VERSION, BUILD_DATE);

    match cli.command {
        Command::Inspect { session: path } => {
            let session = CamSession::load_from_file(&path)
                .with_context(|| format!("loading session {}", path.display()))?;
            inspect(&session, &settings);
        }
        Command::Validate {
            session: path,
            scene,
            write,
        } => {
            let mut session = CamSession::load_from_file(&path)
                .with_context(|| format!("loading session {}", path.display()))?;
            let scene = SceneIndex::load_from_file(&scene)
                .with_context(|| format!("loading scene {}", scene.display()))?;

            let invalid = session.revalidate_all(&scene);
            for op in session.operations().iter().filter(|op| !op.is_valid()) {
                println!("{}: {}", op.name(), op.warnings().replace('\n', "; "));
            }
            if write {
                session.save_to_file(&path)?;
            }
            if invalid > 0 {
                bail!("{} of {} operation(s) are invalid", invalid, session.len());
            }
            println!("{} operation(s) valid", session.len());
        }
        Command::Recover { session: path } => {
            let mut file = SessionFile::read(&path)
                .with_context(|| format!("reading session {}", path.display()))?;
            for op in file.session.operations() {
                if let Some(pid) = op.pid() {
                    println!("{}: abandoning process {}", op.name(), pid);
                }
            }
            let reset = file.session.reset_all_computing_flags();
            file.session.revalidate_chains();
            file.session.save_to_file(&path)?;
            println!("reset {} computation(s)", reset);

            settings.add_recent_session(path);
            if let Some(config) = cli.config.as_deref() {
                settings.save_to_file(config)?;
            } else if let Ok(config) = CamSettings::default_path() {
                if let Err(e) = settings.save_to_file(&config) {
                    warn!("Could not update recent sessions: {}", e);
                }
            }
        }
        Command::Strategies { experimental } => {
            for strategy in Strategy::available(experimental || settings.experimental) {
                let tag = if strategy.is_experimental() {
                    " (experimental)"
                } else {
                    ""
                };
                println!("{:<16}{}{}", strategy.to_string(), strategy.description(), tag);
            }
        }
    }

    Ok(())
}
