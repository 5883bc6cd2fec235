/*============================================================
  Synavera Project: Quack
  Module: quack::pacman
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Interface with pacman and its companions: snapshot the local
    database, list official repository packages, and run the
    privileged install and copy steps.

  Security / Safety Notes:
    Only `pacman -U` and the package-cache copy run through sudo.
    All other commands run with the caller's privileges.

  Dependencies:
    tokio::process for command execution, nix for euid checks.

  Operational Scope:
    Supplies the inventory snapshot and the process plumbing used
    by the install pipeline and the garbage scan.

  Revision History:
    2026-10-19 COD  Reworked pacman integration layer for Quack.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Structured parsing with clear failure modes
    - Reusable helpers for external command diagnostics
============================================================*/

use std::collections::HashSet;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

use crate::error::{QuackError, Result};
use crate::output::ColorMode;
use crate::package_info::LocalPackage;

/// Whether the effective user is root.
pub fn running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Snapshot every installed package via `pacman -Q`.
pub async fn installed_packages() -> Result<Vec<LocalPackage>> {
    let stdout = run_captured("pacman", ["-Q", "--color=never"]).await?;
    Ok(parse_installed(&stdout))
}

/// Names of every package offered by the given sync repositories.
///
/// An empty repository list lets pacman enumerate all configured repos.
pub async fn sync_package_names(repos: &[String]) -> Result<HashSet<String>> {
    let mut args = vec!["--color=never".to_string(), "-Slq".to_string()];
    args.extend(repos.iter().cloned());
    let stdout = run_captured("pacman", &args).await?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// `pacman -Qi` passthrough; returns pacman's exit status.
pub async fn query_info(package: &str, color: ColorMode) -> Result<i32> {
    let status = run_interactive(
        "pacman",
        ["--color", color.as_str(), "-Qi", package],
        None,
    )
    .await?;
    Ok(status.code().unwrap_or(1))
}

/// `pacman -Qdt` passthrough listing orphaned dependencies.
pub async fn list_orphans(color: ColorMode) -> Result<i32> {
    let status = run_interactive("pacman", ["--color", color.as_str(), "-Qdt"], None).await?;
    Ok(status.code().unwrap_or(1))
}

/// `sudo pacman -U` on built artifacts. `Ok(false)` when pacman refuses.
pub async fn install_artifacts(artifacts: &[PathBuf], color: ColorMode) -> Result<bool> {
    let mut args: Vec<&OsStr> = vec![
        OsStr::new("pacman"),
        OsStr::new("--color"),
        OsStr::new(color.as_str()),
        OsStr::new("-U"),
    ];
    args.extend(artifacts.iter().map(|path| path.as_os_str()));
    let status = run_interactive("sudo", args, None).await?;
    Ok(status.success())
}

/// `sudo cp` artifacts into a root-owned directory such as the package cache.
pub async fn copy_privileged(artifacts: &[PathBuf], destination: &Path) -> Result<bool> {
    let mut args: Vec<&OsStr> = vec![OsStr::new("cp"), OsStr::new("--")];
    args.extend(artifacts.iter().map(|path| path.as_os_str()));
    args.push(destination.as_os_str());
    let status = run_interactive("sudo", args, None).await?;
    Ok(status.success())
}

/// Run a command with captured output; non-zero exit is an error.
pub async fn run_captured<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| map_spawn_error(err, program))?;

    if !output.status.success() {
        return Err(QuackError::CommandFailure {
            command: describe(program, &args),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|err| {
        QuackError::Serialization(format!("{program} emitted invalid UTF-8: {err}"))
    })
}

/// Run a command attached to the terminal and hand back its status.
pub async fn run_interactive<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<ExitStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    command
        .status()
        .await
        .map_err(|err| map_spawn_error(err, program))
}

fn parse_installed(stdout: &str) -> Vec<LocalPackage> {
    stdout.lines().filter_map(LocalPackage::from_query_line).collect()
}

fn describe<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

fn map_spawn_error(err: io::Error, command: &str) -> QuackError {
    if err.kind() == io::ErrorKind::NotFound {
        QuackError::CommandMissing {
            command: command.into(),
        }
    } else {
        QuackError::Runtime(format!("Failed to spawn {command}: {err}"))
    }
}
