/*============================================================
  Synavera Project: Quack
  Module: quack::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Quack. Parses the operation, captures the
    local package snapshot and dispatches to the AUR list,
    search, info, upgrade and install flows or the garbage scan.

  Security / Safety Notes:
    Refuses to run AUR operations as root: recipes execute
    unsandboxed, so only `pacman -U` is elevated (via sudo).

  Dependencies:
    clap for CLI parsing, chrono for session stamps, tokio for
    the single-threaded runtime.

  Operational Scope:
    Invoked directly by operators as a pacman companion.

  Revision History:
    2026-10-19 COD  Authored Quack runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod aur;
mod build;
mod config;
mod error;
mod garbage;
mod inventory;
mod logger;
mod output;
mod package_info;
mod pacman;
mod prompt;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use aur::AurClient;
use build::{InstallOutcome, InstallPaths, Installer, ProcessBackend};
use config::{PacmanConf, QuackConfig};
use error::{QuackError, Result};
use inventory::{clean_package_name, Inventory};
use logger::Logger;
use output::{ColorMode, Palette};
use prompt::{editor_from_env, Prompter, TerminalPrompter};

/// Command-line arguments for Quack.
#[derive(Debug, Parser)]
#[command(
    name = "quack",
    version,
    author = "Synavera Systems",
    about = "Yet another pacman wrapper, for AUR packages"
)]
struct Cli {
    /// Specify when to enable coloring.
    #[arg(long, value_enum, ignore_case = true, value_name = "WHEN")]
    color: Option<ColorMode>,
    /// Find and list .pacsave, .pacorig, .pacnew files and orphans.
    #[arg(short = 'C', long, action = ArgAction::SetTrue, help_heading = "Operations")]
    list_garbage: bool,
    /// AUR related operations (default to install package).
    #[arg(short = 'A', long, action = ArgAction::SetTrue, help_heading = "Operations")]
    aur: bool,
    /// List locally installed AUR packages and exit.
    #[arg(short, long, action = ArgAction::SetTrue, help_heading = "AUR options")]
    list: bool,
    /// Upgrade locally installed AUR packages.
    #[arg(short, long, action = ArgAction::SetTrue, help_heading = "AUR options")]
    upgrade: bool,
    /// Search AUR packages by name and exit.
    #[arg(short, long, action = ArgAction::SetTrue, help_heading = "AUR options")]
    search: bool,
    /// Display information on an AUR package and exit.
    #[arg(short, long, action = ArgAction::SetTrue, help_heading = "AUR options")]
    info: bool,
    /// Include devel packages (trailing -git, -svn…) for list and upgrade.
    #[arg(long, action = ArgAction::SetTrue)]
    devel: bool,
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Echo every log entry to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
    /// Package names or search terms.
    #[arg(value_name = "PACKAGE")]
    packages: Vec<String>,
}

/// The AUR operation selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Search,
    Info,
    List,
    Upgrade,
    Install,
}

impl Cli {
    fn operation(&self) -> Result<Operation> {
        let has_subcommand = self.search || self.info || self.list || self.upgrade;
        if !self.aur || (!has_subcommand && self.packages.is_empty()) {
            return Err(QuackError::Input("No operation given".into()));
        }
        Ok(if self.search {
            Operation::Search
        } else if self.info {
            Operation::Info
        } else if self.list {
            Operation::List
        } else if self.upgrade {
            Operation::Upgrade
        } else {
            Operation::Install
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut palette = cli.color.map_or_else(Palette::plain, Palette::from_mode);
    match run(cli, &mut palette).await {
        Ok(code) => code,
        Err(err) => {
            if err.is_reported() {
                palette.error(&err.to_string());
            }
            err.exit_code()
        }
    }
}

/// Run one invocation. `palette` is upgraded to the pacman.conf colour
/// policy as soon as it is known so the caller reports errors with it.
async fn run(cli: Cli, palette: &mut Palette) -> Result<ExitCode> {
    let config = QuackConfig::load_from_optional_path(cli.config.as_deref())?;
    let pacman_conf = PacmanConf::load(&config.paths.pacman_conf)?;
    *palette = Palette::from_mode(resolve_color(cli.color, pacman_conf.color));
    let palette = *palette;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("quack_{session_stamp}.log")));
    let logger = Logger::new(Some(log_path), cli.verbose)?;
    logger.info("INIT", format!("Quack {} starting", env!("CARGO_PKG_VERSION")));

    let result = dispatch(&cli, &config, &pacman_conf, palette, &logger).await;
    match &result {
        Ok(code) => logger.info("COMPLETE", format!("finished with {code:?}")),
        Err(err) => logger.error("FAILED", err.to_string()),
    }
    logger.finalize()?;
    result
}

/// `--color` wins over pacman.conf; neither means never.
fn resolve_color(flag: Option<ColorMode>, pacman_conf: Option<ColorMode>) -> ColorMode {
    flag.or(pacman_conf).unwrap_or_default()
}

async fn dispatch(
    cli: &Cli,
    config: &QuackConfig,
    pacman_conf: &PacmanConf,
    palette: Palette,
    logger: &Logger,
) -> Result<ExitCode> {
    if cli.list_garbage {
        garbage::list_garbage(&palette, pacman::running_as_root(), logger).await?;
        return Ok(ExitCode::SUCCESS);
    }

    if pacman::running_as_root() {
        return Err(QuackError::Privilege(format!(
            "Do not run {} as root!",
            std::env::args().next().unwrap_or_else(|| "quack".into())
        )));
    }

    let operation = cli.operation()?;
    logger.info("OPERATION", format!("{operation:?}"));

    let local = pacman::installed_packages().await?;
    let official = pacman::sync_package_names(&pacman_conf.repos).await?;
    logger.info(
        "LOCAL",
        format!(
            "{} installed packages, {} official packages across {} repositories",
            local.len(),
            official.len(),
            pacman_conf.repos.len()
        ),
    );
    let inventory = Inventory::new(local, official);

    let session = Session {
        config,
        palette,
        logger,
        inventory,
        client: AurClient::new(&config.aur)?,
        prompter: TerminalPrompter::new(palette, editor_from_env()),
    };

    match operation {
        Operation::Search => session.search(&cli.packages.join(" ")).await,
        Operation::Info => session.info(&cli.packages.join(" ")).await,
        Operation::List => Ok(session.list(cli.devel)),
        Operation::Upgrade => session.upgrade(cli.devel).await,
        Operation::Install => session.install_all(&cli.packages).await,
    }
}

/// Everything one AUR operation needs, captured once per run.
struct Session<'a> {
    config: &'a QuackConfig,
    palette: Palette,
    logger: &'a Logger,
    inventory: Inventory,
    client: AurClient,
    prompter: TerminalPrompter,
}

impl Session<'_> {
    async fn search(&self, terms: &str) -> Result<ExitCode> {
        let records = self.client.search(terms, self.logger).await?;
        self.logger
            .info("SEARCH", format!("{} result(s) for `{terms}`", records.len()));
        for record in &records {
            let installed = self.inventory.is_installed(&record.name);
            println!("{}", report::search_entry(&self.palette, record, installed));
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn info(&self, argument: &str) -> Result<ExitCode> {
        let package = clean_package_name(argument);
        if self.inventory.is_installed(package) {
            let code = pacman::query_info(package, self.palette.mode()).await?;
            return match code {
                0 => Ok(ExitCode::SUCCESS),
                code => Err(QuackError::Exit(code)),
            };
        }

        let records = self
            .client
            .info(&[package.to_string()], true, self.logger)
            .await?;
        let record = records
            .first()
            .ok_or_else(|| QuackError::Input(format!("no AUR package named {package}")))?;
        for line in report::info_sheet(
            &self.palette,
            record,
            &self.inventory,
            &self.config.aur.web_url,
        ) {
            println!("{line}");
        }
        println!();
        Ok(ExitCode::SUCCESS)
    }

    fn list(&self, with_devel: bool) -> ExitCode {
        for pkg in self.inventory.foreign_packages(with_devel) {
            println!(
                "{}",
                report::package_line(&self.palette, &pkg.name, &pkg.version, true)
            );
        }
        ExitCode::SUCCESS
    }

    async fn upgrade(&self, with_devel: bool) -> Result<ExitCode> {
        let names = self.inventory.foreign_names(with_devel);
        let records = self.client.info(&names, false, self.logger).await?;
        let candidates = self.inventory.resolve_upgrades(&records, with_devel);
        self.logger.info(
            "UPGRADE",
            format!(
                "{} foreign package(s), {} AUR record(s), {} upgrade(s)",
                names.len(),
                records.len(),
                candidates.len()
            ),
        );

        if candidates.is_empty() {
            self.palette.info("Nothing to upgrade");
            return Ok(ExitCode::SUCCESS);
        }
        for candidate in &candidates {
            println!("{}", report::upgrade_line(&self.palette, candidate));
        }
        if !self
            .prompter
            .confirm("Do you want to upgrade the above packages? [y/N]")?
        {
            return Ok(ExitCode::SUCCESS);
        }

        let packages: Vec<String> = candidates.into_iter().map(|c| c.name).collect();
        self.install_all(&packages).await
    }

    async fn install_all(&self, packages: &[String]) -> Result<ExitCode> {
        let backend = ProcessBackend::new(&self.config.aur.web_url, self.palette.mode());
        let paths = InstallPaths {
            package_cache: self.config.paths.package_cache.clone(),
            fallback_dir: self.config.paths.fallback_dir.clone(),
        };
        let installer = Installer::new(&backend, &self.prompter, paths, self.palette, self.logger);

        let mut failed = Vec::new();
        for package in packages {
            if installer.install(package).await? == InstallOutcome::Failed {
                failed.push(package.as_str());
            }
        }

        if failed.is_empty() {
            Ok(ExitCode::SUCCESS)
        } else {
            self.logger
                .warn("INSTALL", format!("Not installed: {}", failed.join(", ")));
            Ok(ExitCode::FAILURE)
        }
    }
}
