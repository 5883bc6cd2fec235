/*============================================================
  Synavera Project: Quack
  Module: quack::prompt
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Turn operator answers into explicit decisions consumed by
    the install pipeline and the upgrade confirmation.

  Security / Safety Notes:
    Reads stdin only; answers are never echoed into commands
    except as validated artifact indices.

  Dependencies:
    None beyond std.

  Operational Scope:
    `TerminalPrompter` in production, scripted prompters in tests.

  Revision History:
    2026-10-19 COD  Introduced decision types and prompter.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Every answer maps to one enumerated outcome
============================================================*/

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::build::RECIPE_FILE;
use crate::error::{QuackError, Result};
use crate::output::Palette;

/// Answer to the recipe review question `[y/N/q]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Proceed,
    Abort,
    Quit,
}

impl ReviewDecision {
    pub fn parse(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" => ReviewDecision::Proceed,
            "q" => ReviewDecision::Quit,
            _ => ReviewDecision::Abort,
        }
    }
}

/// Which of several built artifacts to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSelection {
    All,
    /// Zero-based indices in the order they were typed, without repeats.
    Indices(Vec<usize>),
}

impl ArtifactSelection {
    /// Parse `a` or space-separated 1-based indices in `1..=count`.
    pub fn parse(answer: &str, count: usize) -> Result<Self> {
        let answer = answer.trim().to_lowercase();
        if answer == "a" {
            return Ok(ArtifactSelection::All);
        }

        let mut indices = Vec::new();
        for token in answer.split_whitespace() {
            let index = token
                .parse::<usize>()
                .ok()
                .filter(|index| (1..=count).contains(index))
                .ok_or_else(|| QuackError::Input(format!("{token} is not a valid input")))?;
            if !indices.contains(&(index - 1)) {
                indices.push(index - 1);
            }
        }

        if indices.is_empty() {
            return Err(QuackError::Input(format!("`{answer}` is not a valid input")));
        }
        Ok(ArtifactSelection::Indices(indices))
    }

    /// Apply the selection to the enumerated artifacts.
    pub fn pick<T: Clone>(&self, items: &[T]) -> Vec<T> {
        match self {
            ArtifactSelection::All => items.to_vec(),
            ArtifactSelection::Indices(indices) => indices
                .iter()
                .filter_map(|index| items.get(*index).cloned())
                .collect(),
        }
    }
}

/// Source of operator decisions.
pub trait Prompter {
    /// Ask whether the recipe in `recipe_dir` may be built.
    fn review(&self, package: &str, recipe_dir: &Path) -> Result<ReviewDecision>;

    /// Ask which of `artifacts` to install.
    fn select_artifacts(&self, artifacts: &[String]) -> Result<ArtifactSelection>;

    /// Yes/no question defaulting to no.
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Tell the operator something they need to act on later.
    fn notify(&self, message: &str);
}

/// Prompter reading answers from stdin.
pub struct TerminalPrompter {
    palette: Palette,
    editor: String,
}

impl TerminalPrompter {
    pub fn new(palette: Palette, editor: String) -> Self {
        Self { palette, editor }
    }

    fn ask(&self, question: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{} ", self.palette.info_line(question))?;
        stdout.flush()?;
        drop(stdout);

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_lowercase())
    }

    fn inspection_hint(&self, recipe_dir: &Path) -> String {
        format!(
            "You should REALLY take time to inspect its {RECIPE_FILE} (e.g. {} {}).",
            self.editor,
            recipe_dir.join(RECIPE_FILE).display()
        )
    }
}

impl Prompter for TerminalPrompter {
    fn review(&self, package: &str, recipe_dir: &Path) -> Result<ReviewDecision> {
        self.palette.info(&format!(
            "Package {package} is ready to be built in {}",
            recipe_dir.display()
        ));
        self.palette.info(&self.inspection_hint(recipe_dir));
        let answer = self.ask("When it's done, shall we continue? [y/N/q]")?;
        Ok(ReviewDecision::parse(&answer))
    }

    fn select_artifacts(&self, artifacts: &[String]) -> Result<ArtifactSelection> {
        self.palette.info("The following packages have been built:");
        for (index, artifact) in artifacts.iter().enumerate() {
            println!("[{}] {artifact}", index + 1);
        }
        let answer = self.ask(&format!(
            "Which one do you really want to install? [1…{}/A]",
            artifacts.len()
        ))?;
        ArtifactSelection::parse(&answer, artifacts.len())
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        Ok(self.ask(question)? == "y")
    }

    fn notify(&self, message: &str) {
        self.palette.info(message);
    }
}

/// Editor suggested for recipe review: `$EDITOR`, else `nano`.
pub fn editor_from_env() -> String {
    std::env::var("EDITOR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "nano".to_string())
}
