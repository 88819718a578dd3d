//! termcascade settings loader entry point.
//!
//! Loads the bundled default settings, the user settings document and the
//! dynamic profiles of this machine, then prints the resolved profile list,
//! the default profile and every warning the load raised.
//!
//! # Usage
//!
//! ```text
//! termcascade [OPTIONS]
//!
//! Options:
//!   --config   <PATH>   Loader configuration file [default: platform loader.toml]
//!   --settings <PATH>   User settings document [default: from loader.toml]
//!   --mode     <MODE>   all | universal | defaults [default: all]
//!   --profile  <REF>    Resolve a new-terminal request by GUID or name
//!   --index    <N>      Resolve a new-terminal request by profile index
//!   --no-write-back     Never modify the user settings document
//! ```
//!
//! `TERMCASCADE_CONFIG` and `TERMCASCADE_SETTINGS` override the defaults of
//! the first two options; CLI args take precedence when both are present.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use termcascade_loader::application::dynamic_profiles::ProfileGenerator;
use termcascade_loader::application::validation::{NoProbe, ResourceProbe};
use termcascade_loader::infrastructure::generators::ShellsProfileGenerator;
use termcascade_loader::infrastructure::probe::FilesystemProbe;
use termcascade_loader::infrastructure::storage::config::{self, LoaderConfig};
use termcascade_loader::infrastructure::storage::defaults::DEFAULT_SETTINGS_JSON;
use termcascade_loader::infrastructure::storage::settings_file::FileSettingsStore;
use termcascade_loader::{LoadOptions, NewTerminalArgs, Settings, SettingsHandle, SettingsLoader};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Which documents a load reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Defaults, user document and dynamic profiles.
    All,
    /// Defaults and user document.
    Universal,
    /// Bundled defaults only.
    Defaults,
}

/// Resolve terminal settings and report what was loaded.
#[derive(Debug, Parser)]
#[command(
    name = "termcascade",
    about = "Layered terminal settings loader",
    version
)]
struct Cli {
    /// Loader configuration file.
    #[arg(long, env = "TERMCASCADE_CONFIG")]
    config: Option<PathBuf>,

    /// User settings document.
    #[arg(long, env = "TERMCASCADE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Which documents to load.
    #[arg(long, value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Profile GUID or name for a new-terminal request.
    #[arg(long)]
    profile: Option<String>,

    /// Profile index for a new-terminal request.
    #[arg(long, allow_negative_numbers = true)]
    index: Option<i32>,

    /// Never modify the user settings document.
    #[arg(long)]
    no_write_back: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<LoaderConfig> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => config::config_file_path().context("locating loader config")?,
        };
        config::load_config_from(&path)
            .with_context(|| format!("reading loader config {}", path.display()))
    }

    fn settings_path(&self, cfg: &LoaderConfig) -> anyhow::Result<PathBuf> {
        match &self.settings {
            Some(path) => Ok(path.clone()),
            None => cfg.settings_path().context("locating user settings"),
        }
    }
}

fn build_loader(cli: &Cli, cfg: &LoaderConfig) -> anyhow::Result<SettingsLoader> {
    let settings_path = cli.settings_path(cfg)?;
    info!("user settings: {}", settings_path.display());

    let probe: Arc<dyn ResourceProbe> = if cfg.probe.check_paths {
        Arc::new(FilesystemProbe)
    } else {
        Arc::new(NoProbe)
    };
    let mut loader = SettingsLoader::new(DEFAULT_SETTINGS_JSON)
        .with_persistence(Arc::new(FileSettingsStore::new(settings_path)))
        .with_probe(probe)
        .with_options(LoadOptions {
            write_back_dynamic_profiles: cfg.loader.write_back_dynamic_profiles
                && !cli.no_write_back,
            cancel: None,
        });

    if cfg.generators.shells {
        let shells: Box<dyn ProfileGenerator> =
            Box::new(ShellsProfileGenerator::new(&cfg.generators.shells_file));
        loader = loader.with_generator(shells);
    }
    Ok(loader)
}

fn print_report(settings: &Settings, args: &NewTerminalArgs) {
    let default_guid = settings.default_profile_guid();
    println!("Profiles:");
    for profile in settings.profiles() {
        let guid = profile.effective_guid();
        let marker = if guid == default_guid { '*' } else { ' ' };
        let source = profile.source.as_deref().unwrap_or("-");
        println!("  {marker} {} {:<24} {source}", guid.braced(), profile.name);
    }

    let hidden = settings.all_profiles().len() - settings.profiles().len();
    if hidden > 0 {
        println!("  ({hidden} hidden)");
    }
    println!("Color schemes: {}", settings.schemes().len());
    println!("Key bindings: {}", settings.key_map().len());

    if args.profile.is_some() || args.profile_index.is_some() {
        let guid = settings.profile_for_args(args);
        let name = settings
            .find_profile(guid)
            .map(|p| p.name.as_str())
            .unwrap_or_default();
        println!("New terminal would use: {name} {}", guid.braced());
    }

    for warning in settings.warnings() {
        eprintln!("warning: {warning}");
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.loader.log_level)),
        )
        .init();

    let loader = build_loader(&cli, &cfg)?;
    let settings = match cli.mode {
        Mode::All => loader.load_all(),
        Mode::Universal => loader.load_universal(),
        Mode::Defaults => loader.load_defaults(),
    }
    .context("loading settings")?;

    let handle = SettingsHandle::new();
    handle.publish(Arc::new(settings));
    let current = handle
        .current()
        .context("settings were not published")?;

    let args = NewTerminalArgs {
        profile: cli.profile.clone(),
        profile_index: cli.index,
    };
    print_report(&current, &args);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
