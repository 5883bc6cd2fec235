/*============================================================
  Synavera Project: Quack
  Module: quack::garbage
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    List pacman's leftover .pacsave/.pacorig/.pacnew files and
    orphaned dependencies.

  Security / Safety Notes:
    Read-only. `find` runs through sudo for non-root callers so
    protected directories are covered.

  Dependencies:
    tokio::process via the pacman module.

  Operational Scope:
    Backs `quack -C`; the only operation allowed as root.

  Revision History:
    2026-10-19 COD  Authored garbage and orphan listing.
============================================================*/

use crate::error::Result;
use crate::logger::Logger;
use crate::output::Palette;
use crate::pacman;

/// Volatile or irrelevant trees skipped by the scan.
pub const IGNORED_PATHS: [&str; 12] = [
    "/dev",
    "/home",
    "/lost+found",
    "/proc",
    "/root",
    "/run",
    "/sys",
    "/tmp",
    "/var/db",
    "/var/log",
    "/var/spool",
    "/var/tmp",
];

/// Backup files pacman leaves behind on upgrade.
pub const BACKUP_PATTERNS: [&str; 3] = ["*.pacsave", "*.pacorig", "*.pacnew"];

/// `find` arguments pruning [`IGNORED_PATHS`] and printing backup files.
pub fn find_arguments() -> Vec<String> {
    let mut args = vec!["/".to_string(), "(".to_string()];
    args.extend(alternatives("-path", &IGNORED_PATHS));
    args.extend([")", "-prune", "-o", "-type", "f", "("].map(String::from));
    args.extend(alternatives("-name", &BACKUP_PATTERNS));
    args.extend([")", "-print"].map(String::from));
    args
}

fn alternatives(test: &str, values: &[&str]) -> Vec<String> {
    let mut args = Vec::with_capacity(values.len() * 3);
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            args.push("-o".to_string());
        }
        args.push(test.to_string());
        args.push((*value).to_string());
    }
    args
}

/// Print backup files, then orphaned packages.
///
/// Exit statuses of both listings are informational: `find` reports
/// unreadable paths and `pacman -Qdt` exits 1 when nothing is orphaned.
pub async fn list_garbage(palette: &Palette, as_root: bool, logger: &Logger) -> Result<()> {
    palette.info("Pacman post transaction files");
    let mut args = find_arguments();
    let program = if as_root {
        "find".to_string()
    } else {
        args.insert(0, "find".to_string());
        "sudo".to_string()
    };
    let status = pacman::run_interactive(&program, &args, None).await?;
    logger.debug("GARBAGE", format!("find finished with {status}"));

    palette.info("Orphaned packages");
    let code = pacman::list_orphans(palette.mode()).await?;
    logger.debug("GARBAGE", format!("pacman -Qdt exited with {code}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_prunes_every_ignored_path() {
        let args = find_arguments();
        assert_eq!(&args[..4], ["/", "(", "-path", "/dev"]);
        for path in IGNORED_PATHS {
            assert!(args.iter().any(|arg| arg == path), "{path} not pruned");
        }
        let prune = args.iter().position(|arg| arg == "-prune").expect("prune");
        assert_eq!(args[prune - 1], ")");
        assert_eq!(args[prune - 2], "/var/tmp");
    }

    #[test]
    fn find_matches_backup_suffixes_only_on_files() {
        let args = find_arguments().join(" ");
        assert!(args.ends_with(
            "-prune -o -type f ( -name *.pacsave -o -name *.pacorig -o -name *.pacnew ) -print"
        ));
    }

    #[test]
    fn alternatives_have_no_trailing_or() {
        assert_eq!(
            alternatives("-name", &["a", "b"]),
            vec!["-name", "a", "-o", "-name", "b"]
        );
        assert!(alternatives("-name", &[]).is_empty());
    }
}
