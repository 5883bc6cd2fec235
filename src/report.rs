/*============================================================
  Synavera Project: Quack
  Module: quack::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Render package lists, search hits, upgrade candidates and
    the detailed info sheet.

  Security / Safety Notes:
    Formatting only; values come from pacman or the AUR.

  Dependencies:
    chrono for the Last Modified stamp.

  Operational Scope:
    Called by the list, search, info and upgrade operations.

  Revision History:
    2026-10-19 COD  Authored report rendering.
============================================================*/

use chrono::DateTime;

use crate::aur::AurPackage;
use crate::inventory::Inventory;
use crate::output::{Color, Palette, Style};
use crate::package_info::UpgradeCandidate;

const LABEL_WIDTH: usize = 16;
const EMPTY_VALUE: &str = "--";

/// `aur/<name> <version>` with an `[installed]` marker when relevant.
pub fn package_line(palette: &Palette, name: &str, version: &str, installed: bool) -> String {
    let mut line = format!(
        "{}{} {}",
        palette.paint("aur/", Style::fg(Color::Magenta).bold()),
        palette.bold(name),
        palette.paint(version, Style::fg(Color::Green).bold())
    );
    if installed {
        line.push(' ');
        line.push_str(&palette.paint("[installed]", Style::fg(Color::Cyan).bold()));
    }
    line
}

/// Search hit followed by its indented description.
pub fn search_entry(palette: &Palette, record: &AurPackage, installed: bool) -> String {
    format!(
        "{}\n    {}",
        package_line(palette, &record.name, &record.version, installed),
        record.description.as_deref().unwrap_or_default()
    )
}

/// `<name> - <installed> - <available>`.
pub fn upgrade_line(palette: &Palette, candidate: &UpgradeCandidate) -> String {
    format!(
        "{} - {} - {}",
        palette.bold(&candidate.name),
        palette.paint(&candidate.current_version, Style::fg(Color::Red)),
        palette.paint(&candidate.remote_version, Style::fg(Color::Green))
    )
}

/// The info sheet, one line per field, in pacman's `-Qi` layout.
pub fn info_sheet(
    palette: &Palette,
    record: &AurPackage,
    inventory: &Inventory,
    web_url: &str,
) -> Vec<String> {
    let web_url = web_url.trim_end_matches('/');
    let deps = |names: &[String]| -> Vec<String> {
        names
            .iter()
            .map(|name| {
                if inventory.is_official(name) {
                    name.clone()
                } else {
                    palette.paint(name, Style::PLAIN.underline())
                }
            })
            .collect()
    };

    let fields: [(&str, Option<String>); 15] = [
        ("Name", Some(record.name.clone())),
        ("Version", Some(record.version.clone())),
        ("Description", record.description.clone()),
        ("URL", record.url.clone()),
        ("License", joined(&record.license)),
        ("Provides", joined(&record.provides)),
        ("Depends On", joined(&deps(&record.depends))),
        ("Make Depends On", joined(&deps(&record.make_depends))),
        ("Conflicts With", joined(&record.conflicts)),
        (
            "Last Maintainer",
            record
                .maintainer
                .as_ref()
                .map(|maintainer| format!("{maintainer}  {web_url}/account/{maintainer}")),
        ),
        ("Last Modified", record.last_modified.and_then(format_epoch)),
        ("Votes Number", record.num_votes.map(|votes| votes.to_string())),
        ("Popularity", record.popularity.map(|score| score.to_string())),
        ("AUR Page", Some(format!("{web_url}/packages/{}", record.name))),
        ("Keywords", joined(&record.keywords)),
    ];

    fields
        .into_iter()
        .map(|(label, value)| {
            let value = value
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| EMPTY_VALUE.to_string());
            format!("{}: {value}", palette.bold(&format!("{label:<LABEL_WIDTH$}")))
        })
        .collect()
}

fn joined(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join("  "))
    }
}

fn format_epoch(epoch: i64) -> Option<String> {
    DateTime::from_timestamp(epoch, 0).map(|stamp| stamp.format("%c %Z").to_string())
}
