/*============================================================
  Synavera Project: Quack
  Module: quack::inventory
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Hold the run's snapshot of installed packages, classify them
    against the official repositories, and reconcile them with
    AUR records to find upgrade candidates.

  Security / Safety Notes:
    Pure computation over data captured at start-up.

  Dependencies:
    None beyond std.

  Operational Scope:
    Feeds the list, info, search and upgrade operations.

  Revision History:
    2026-10-19 COD  Authored inventory and upgrade resolution.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering taken from the inputs
    - Naive version ordering preserved; see `is_newer`
============================================================*/

use std::collections::HashSet;

use crate::aur::AurPackage;
use crate::package_info::{LocalPackage, UpgradeCandidate};

/// Name suffixes marking packages built from a VCS checkout.
const DEVEL_SUFFIXES: [&str; 5] = ["-bzr", "-cvs", "-git", "-hg", "-svn"];

/// Whether a package name tracks an upstream VCS branch.
pub fn is_devel(name: &str) -> bool {
    DEVEL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Strip an `aur/` prefix from a package argument.
pub fn clean_package_name(argument: &str) -> &str {
    match argument.strip_prefix("aur/") {
        Some(rest)
            if !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_') =>
        {
            rest
        }
        _ => argument,
    }
}

/// `remote` sorts strictly after `local` as a plain string.
///
/// This is byte-wise ordering, not pacman's `vercmp`: `1.10` sorts before
/// `1.9`. Upgrade detection depends on exactly this behaviour.
pub fn is_newer(local: &str, remote: &str) -> bool {
    remote > local
}

/// Installed packages plus the set of names served by official repositories.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    local: Vec<LocalPackage>,
    official: HashSet<String>,
}

impl Inventory {
    pub fn new(local: Vec<LocalPackage>, official: HashSet<String>) -> Self {
        Self { local, official }
    }

    pub fn is_official(&self, name: &str) -> bool {
        self.official.contains(name)
    }

    pub fn current_version(&self, name: &str) -> Option<&str> {
        self.local
            .iter()
            .find(|pkg| pkg.name == name)
            .map(|pkg| pkg.version.as_str())
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.current_version(name).is_some()
    }

    /// Installed packages absent from every official repository.
    ///
    /// Devel packages are dropped unless `with_devel` is set.
    pub fn foreign_packages(&self, with_devel: bool) -> Vec<&LocalPackage> {
        self.local
            .iter()
            .filter(|pkg| !self.is_official(&pkg.name))
            .filter(|pkg| with_devel || !is_devel(&pkg.name))
            .collect()
    }

    /// Names of [`Inventory::foreign_packages`], ready for an AUR lookup.
    pub fn foreign_names(&self, with_devel: bool) -> Vec<String> {
        self.foreign_packages(with_devel)
            .into_iter()
            .map(|pkg| pkg.name.clone())
            .collect()
    }

    /// Packages whose AUR version should replace the installed one.
    ///
    /// Output follows the order of `remote`.
    pub fn resolve_upgrades(&self, remote: &[AurPackage], with_devel: bool) -> Vec<UpgradeCandidate> {
        remote
            .iter()
            .filter_map(|record| self.upgrade_for(record, with_devel))
            .collect()
    }

    fn upgrade_for(&self, record: &AurPackage, with_devel: bool) -> Option<UpgradeCandidate> {
        if self.is_official(&record.name) {
            return None;
        }
        let devel = is_devel(&record.name);
        if devel && !with_devel {
            return None;
        }
        let current = self.current_version(&record.name)?;
        if current == record.version {
            return None;
        }
        // VCS snapshot versions do not order reliably; any change counts.
        if !devel && !is_newer(current, &record.version) {
            return None;
        }
        Some(UpgradeCandidate {
            name: record.name.clone(),
            current_version: current.to_string(),
            remote_version: record.version.clone(),
        })
    }
}
