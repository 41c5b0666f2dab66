mod app;
mod backend;
mod capacity;
mod config;
mod error;
mod input;
mod models;
mod multitool;
mod navigable;
mod selection;
mod ui;
mod util;

use anyhow::{anyhow, Context, Result};
use app::{App, PoolTool};
use backend::{lvm::LvmTools, memory::MemoryBackend, VolumeBackend};
use clap::Parser;
use config::{Config, PoolNames};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use models::format::DriveFormat;
use multitool::Multitool;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::panic;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ui::theme::ThemeVariant;
use util::human::{fmt_bytes, fmt_fraction, parse_size};
use util::user_state::UserState;

#[derive(Parser, Debug)]
#[command(name = "multitool", about = "Virtual drives carved from an LVM thin pool", version = "0.1")]
struct Cli {
    /// Print the drive registry as JSON and exit
    #[arg(long)]
    list: bool,

    /// Create a drive of SIZE (e.g. 512M, 4G, or plain bytes) and exit
    #[arg(long, value_name = "SIZE")]
    add: Option<String>,

    /// Format the drive created by --add
    #[arg(long, value_enum, value_name = "FORMAT", requires = "add")]
    format: Option<DriveFormat>,

    /// Remove the drive called NAME and exit
    #[arg(long, value_name = "NAME")]
    remove: Option<String>,

    /// Print thin pool usage and exit
    #[arg(long)]
    usage: bool,

    /// Use an in-memory pool of SIZE instead of LVM
    #[arg(long, value_name = "SIZE")]
    simulate: Option<String>,

    /// Settings file (default: ~/.config/multitool/multitool.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Color theme: default, nord, mono
    #[arg(short = 't', long)]
    theme: Option<String>,
}

impl Cli {
    fn headless(&self) -> bool {
        self.list || self.add.is_some() || self.remove.is_some() || self.usage
    }
}

fn main() -> Result<()> {
    let cli    = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    init_logging(&config, cli.headless())?;

    let names = PoolNames::from_env()?;
    let tool  = open_pool(names, &cli, &config)?;

    if cli.list {
        return finish(tool, run_list);
    }
    if let Some(size) = cli.add.as_deref() {
        return finish(tool, |t| run_add(t, size, cli.format));
    }
    if let Some(name) = cli.remove.as_deref() {
        return finish(tool, |t| run_remove(t, name));
    }
    if cli.usage {
        return finish(tool, run_usage);
    }

    let theme = cli.theme.clone()
        .or_else(|| Some(UserState::load().theme_name).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| config.ui.theme.clone());
    let initial_theme = ThemeVariant::from_name(&theme);

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let mut app = App::new(tool, config, initial_theme);
    let result = run(&mut app);
    restore_terminal()?;
    app.multitool.shutdown();
    result
}

// ── Setup ─────────────────────────────────────────────────────────────

fn init_logging(config: &Config, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("multitool=info"));

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    // The alternate screen owns stdout/stderr while the TUI runs.
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("multitool");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let path = dir.join("multitool.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn open_pool(names: PoolNames, cli: &Cli, config: &Config) -> Result<PoolTool> {
    let backend: Box<dyn VolumeBackend> = match cli.simulate.as_deref() {
        Some(size) => {
            let capacity = parse_size(size).ok_or_else(|| anyhow!("invalid size: {size}"))?;
            Box::new(MemoryBackend::new(&names, capacity))
        }
        None => Box::new(LvmTools::open(&names)?),
    };
    Ok(Multitool::init(names, backend, config.drives.name_prefix.clone())?)
}

/// Runs a headless command, then releases the pool whatever the outcome.
fn finish(mut tool: PoolTool, f: impl FnOnce(&mut PoolTool) -> Result<()>) -> Result<()> {
    let result = f(&mut tool);
    tool.shutdown();
    result
}

// ── Headless modes ────────────────────────────────────────────────────

fn run_list(tool: &mut PoolTool) -> Result<()> {
    use serde_json::json;

    let usage = tool.pool_usage().ok();
    let out = json!({
        "timestamp": chrono::Local::now().to_rfc3339(),
        "pool":      tool.pool_names(),
        "drives":    tool.drives(),
        "usage":     usage,
        "fraction":  usage.and_then(|u| u.fraction()),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_add(tool: &mut PoolTool, size: &str, format: Option<DriveFormat>) -> Result<()> {
    let bytes = parse_size(size).ok_or_else(|| anyhow!("invalid size: {size}"))?;
    let drive = tool.add_drive(bytes)?;
    let (id, line) = (
        drive.id().clone(),
        format!("{}\t{}\t{}", drive.name(), drive.path(), fmt_bytes(drive.size_bytes())),
    );
    if let Some(format) = format {
        tool.format_drive(&id, format)
            .with_context(|| format!("drive created but left unformatted: {line}"))?;
    }
    println!("{line}");
    Ok(())
}

fn run_remove(tool: &mut PoolTool, name: &str) -> Result<()> {
    let id = tool.drive_by_name(name)
        .map(|d| d.id().clone())
        .ok_or_else(|| error::MultitoolError::DriveNotFound(name.to_string()))?;
    tool.remove_drive(&id)?;
    println!("removed {name}");
    Ok(())
}

fn run_usage(tool: &mut PoolTool) -> Result<()> {
    let names = tool.pool_names();
    match (tool.percent_used(), tool.pool_usage()) {
        (Ok(fraction), Ok(u)) => println!(
            "{}/{}  {}  {} used of {}",
            names.volume_group,
            names.thin_pool,
            fmt_fraction(fraction),
            fmt_bytes(u.allocated),
            fmt_bytes(u.total),
        ),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "pool usage query failed");
            println!("unknown");
        }
    }
    Ok(())
}

// ── TUI ───────────────────────────────────────────────────────────────

fn run(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;

    app.run(&mut term)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
