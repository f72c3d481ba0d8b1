//! Postinstall patcher for Playwright WebSocket tracing.
//!
//! Finds the installed `playwright-core`, injects WebSocket frame capture into
//! its trace recorder and adds a WebSocket filter to the trace viewer. Safe to
//! run repeatedly: patched files are detected and left alone.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ws_patcher::apply::{RunOptions, RunStatus, run};
use ws_patcher::core::types::InvocationMode;
use ws_patcher::exit_codes;
use ws_patcher::io::config::{DEFAULT_CONFIG_FILE, PatcherConfig, load_config};
use ws_patcher::io::locate::{Installation, Locator};
use ws_patcher::io::package::read_version;
use ws_patcher::status::inspect;
use ws_patcher::{logging, report};

#[derive(Parser)]
#[command(
    name = "ws-patcher",
    version,
    about = "Patch playwright-core to record WebSocket frames in traces"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Run even when not invoked as a postinstall hook.
    #[arg(long, global = true)]
    force: bool,

    /// Directory to search from (defaults to the current directory).
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Config file (defaults to `<cwd>/ws-patcher.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the package that ships the prebuilt viewer.
    #[arg(long, global = true)]
    package_root: Option<PathBuf>,

    /// Prebuilt viewer directory (overrides config).
    #[arg(long, global = true)]
    viewer_dir: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Exit non-zero when the installation is missing or the recorder patch fails.
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Patch the located installation (default).
    Apply,
    /// Print the located installation and its version.
    Locate,
    /// Report which targets are already patched, without writing.
    Status,
}

fn main() {
    logging::init();
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn try_main() -> Result<i32> {
    let cli = Cli::parse();
    report::init_color(cli.no_color);

    let cwd = resolve_cwd(cli.cwd.as_deref())?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_FILE));
    let config = load_config(&config_path)?;
    let node_path: Vec<PathBuf> = env::var_os("NODE_PATH")
        .map(|raw| env::split_paths(&raw).collect())
        .unwrap_or_default();

    match cli.command.as_ref().unwrap_or(&Command::Apply) {
        Command::Apply => cmd_apply(&cli, cwd, config, node_path),
        Command::Locate => cmd_locate(&cwd, &config, node_path),
        Command::Status => cmd_status(&cwd, &config, node_path),
    }
}

fn cmd_apply(
    cli: &Cli,
    cwd: PathBuf,
    config: PatcherConfig,
    node_path: Vec<PathBuf>,
) -> Result<i32> {
    let lifecycle_event = env::var("npm_lifecycle_event").ok();
    let mode = InvocationMode::resolve(lifecycle_event.as_deref(), cli.force);
    let package_root = resolve_package_root(
        cli.package_root.as_deref(),
        env::var_os("npm_package_json").map(PathBuf::from).as_deref(),
        &cwd,
    );
    let prebuilt_viewer_dir =
        resolve_viewer_dir(cli.viewer_dir.as_deref(), &config, &package_root);

    let options = RunOptions {
        cwd,
        config,
        mode,
        prebuilt_viewer_dir,
        node_path,
    };
    let outcome = run(&options);
    print_lines(&report::render(&outcome));

    let code = match outcome.status() {
        RunStatus::Skipped | RunStatus::Patched => exit_codes::OK,
        RunStatus::NotFound if cli.strict => exit_codes::NOT_FOUND,
        RunStatus::Failed if cli.strict => exit_codes::PATCH_FAILED,
        RunStatus::NotFound | RunStatus::Failed => exit_codes::OK,
    };
    Ok(code)
}

fn cmd_locate(cwd: &Path, config: &PatcherConfig, node_path: Vec<PathBuf>) -> Result<i32> {
    let Some(installation) = locate(cwd, config, node_path) else {
        eprintln!("{} not found from {}", config.package, cwd.display());
        return Ok(exit_codes::NOT_FOUND);
    };
    let version = read_version(&installation.root)?;
    print_lines(&report::render_location(&installation, version.as_deref()));
    Ok(exit_codes::OK)
}

fn cmd_status(cwd: &Path, config: &PatcherConfig, node_path: Vec<PathBuf>) -> Result<i32> {
    let Some(installation) = locate(cwd, config, node_path) else {
        eprintln!("{} not found from {}", config.package, cwd.display());
        return Ok(exit_codes::NOT_FOUND);
    };
    let statuses = inspect(&installation.root)?;
    print_lines(&report::render_status(&installation, &statuses));
    Ok(exit_codes::OK)
}

fn locate(cwd: &Path, config: &PatcherConfig, node_path: Vec<PathBuf>) -> Option<Installation> {
    Locator::new(cwd, config).with_node_path(node_path).locate()
}

/// Absolute search root. Parent probes walk `ancestors()`, which only sees
/// the components written in the path.
fn resolve_cwd(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("resolve --cwd {}", dir.display())),
        None => env::current_dir().context("resolve current directory"),
    }
}

/// `--package-root`, else the directory of `npm_package_json`, else `cwd`.
fn resolve_package_root(
    flag: Option<&Path>,
    npm_package_json: Option<&Path>,
    cwd: &Path,
) -> PathBuf {
    if let Some(root) = flag {
        return root.to_path_buf();
    }
    npm_package_json
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// `--viewer-dir`, else the configured dir (relative to the package root),
/// else `<package root>/dist/traceViewer`.
fn resolve_viewer_dir(
    flag: Option<&Path>,
    config: &PatcherConfig,
    package_root: &Path,
) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    match &config.prebuilt_viewer_dir {
        Some(dir) => package_root.join(dir),
        None => package_root.join("dist").join("traceViewer"),
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
