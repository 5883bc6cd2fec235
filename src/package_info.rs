/*============================================================
  Synavera Project: Quack
  Module: quack::package_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing installed packages and the
    upgrade candidates derived from AUR metadata.

  Security / Safety Notes:
    Pure data containers; no I/O performed in this module.

  Dependencies:
    None beyond std.

  Operational Scope:
    Passed between the pacman snapshot, the reconciliation step
    and the upgrade report.

  Revision History:
    2026-10-19 COD  Introduced LocalPackage and UpgradeCandidate.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
============================================================*/

/// A package recorded in the local pacman database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPackage {
    pub name: String,
    pub version: String,
}

impl LocalPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse one `pacman -Q` line (`name version`).
    pub fn from_query_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next()?;
        let version = parts.next()?;
        Some(Self::new(name, version))
    }
}

/// An installed AUR package with a newer version upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCandidate {
    pub name: String,
    pub current_version: String,
    pub remote_version: String,
}
