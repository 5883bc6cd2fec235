/*============================================================
  Synavera Project: Quack
  Module: quack::build
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Clone an AUR recipe, have the operator review it, build it
    with makepkg and install the resulting packages.

  Security / Safety Notes:
    Recipes run unsandboxed under the caller's account, hence the
    mandatory review step. Only the final `pacman -U` and the
    cache copy use sudo. The working directory is a TempDir and is
    removed on every exit path, except when it holds the only copy
    of packages pacman refused to install.

  Dependencies:
    tempfile for the scoped working directory, tokio::process via
    the pacman module.

  Operational Scope:
    Invoked once per package by install and upgrade.

  Revision History:
    2026-10-19 COD  Authored build-and-install pipeline.
    2026-10-19 COD  Keep the build directory when the fallback copy fails.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Each stage gates the next; no retries
    - Built artifacts survive a failed install in a known place
============================================================*/

use std::path::{Path, PathBuf};

use crate::error::{QuackError, Result};
use crate::inventory::clean_package_name;
use crate::logger::Logger;
use crate::output::{ColorMode, Palette};
use crate::pacman;
use crate::prompt::{Prompter, ReviewDecision};

/// File every AUR recipe checkout must contain.
pub const RECIPE_FILE: &str = "PKGBUILD";

/// External tools driven by the pipeline.
pub trait BuildBackend {
    /// Clone the recipe of `package` into `workdir/<package>`.
    async fn clone_recipe(&self, package: &str, workdir: &Path) -> Result<bool>;

    /// Build the recipe in `recipe_dir`, leaving packages beside it.
    async fn build(&self, recipe_dir: &Path) -> Result<bool>;

    /// Install artifacts through the privileged package manager.
    async fn install(&self, artifacts: &[PathBuf]) -> Result<bool>;

    /// Store installed artifacts in the package cache.
    async fn cache(&self, artifacts: &[PathBuf], cache_dir: &Path) -> Result<bool>;
}

/// Backend running git, makepkg and sudo pacman.
pub struct ProcessBackend {
    web_url: String,
    color: ColorMode,
}

impl ProcessBackend {
    pub fn new(web_url: &str, color: ColorMode) -> Self {
        Self {
            web_url: web_url.trim_end_matches('/').to_string(),
            color,
        }
    }

    fn clone_url(&self, package: &str) -> String {
        format!("{}/{package}.git", self.web_url)
    }
}

impl BuildBackend for ProcessBackend {
    async fn clone_recipe(&self, package: &str, workdir: &Path) -> Result<bool> {
        let url = self.clone_url(package);
        let status = pacman::run_interactive("git", ["clone", url.as_str()], Some(workdir)).await?;
        Ok(status.success())
    }

    async fn build(&self, recipe_dir: &Path) -> Result<bool> {
        let status = pacman::run_interactive("makepkg", ["-sr"], Some(recipe_dir)).await?;
        Ok(status.success())
    }

    async fn install(&self, artifacts: &[PathBuf]) -> Result<bool> {
        pacman::install_artifacts(artifacts, self.color).await
    }

    async fn cache(&self, artifacts: &[PathBuf], cache_dir: &Path) -> Result<bool> {
        pacman::copy_privileged(artifacts, cache_dir).await
    }
}

/// Terminal result of one install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Aborted,
    Installed,
    Failed,
}

#[derive(Debug)]
enum Stage {
    Cloning,
    Cloned,
    RecipePresent,
    AwaitingApproval,
    Building,
    ArtifactsEnumerated(Vec<PathBuf>),
    AwaitingSelection(Vec<PathBuf>),
    Installing(Vec<PathBuf>),
    Preserving(Vec<PathBuf>),
    Done(InstallOutcome),
}

/// Where the pipeline keeps packages.
#[derive(Debug, Clone)]
pub struct InstallPaths {
    pub package_cache: PathBuf,
    pub fallback_dir: PathBuf,
}

/// Drives one package at a time through the build-and-install stages.
pub struct Installer<'a, B, P> {
    backend: &'a B,
    prompter: &'a P,
    paths: InstallPaths,
    palette: Palette,
    logger: &'a Logger,
}

impl<'a, B: BuildBackend, P: Prompter> Installer<'a, B, P> {
    pub fn new(
        backend: &'a B,
        prompter: &'a P,
        paths: InstallPaths,
        palette: Palette,
        logger: &'a Logger,
    ) -> Self {
        Self {
            backend,
            prompter,
            paths,
            palette,
            logger,
        }
    }

    /// Run the full pipeline for `package`.
    ///
    /// Clone failures, a missing recipe, an invalid selection and a quit
    /// answer are errors; a declined review or a failed build/install are
    /// outcomes. Packages pacman refused are copied to the fallback
    /// directory; if that copy fails the working directory is left behind.
    pub async fn install(&self, package: &str) -> Result<InstallOutcome> {
        let package = clean_package_name(package);
        let workdir = tempfile::Builder::new()
            .prefix("quack-")
            .tempdir()
            .map_err(|err| QuackError::Filesystem(format!("Failed to create build directory: {err}")))?;
        let recipe_dir = workdir.path().join(package);

        let mut retain_workdir = false;
        let mut stage = Stage::Cloning;
        let outcome = loop {
            self.logger.debug("BUILD", format!("{package}: {stage:?}"));
            stage = match stage {
                Stage::Cloning => {
                    if !self.backend.clone_recipe(package, workdir.path()).await? {
                        return Err(QuackError::Runtime(format!(
                            "impossible to clone {package} from AUR"
                        )));
                    }
                    Stage::Cloned
                }
                Stage::Cloned => {
                    if !recipe_dir.join(RECIPE_FILE).is_file() {
                        return Err(QuackError::Runtime(format!(
                            "{package} is NOT an AUR package"
                        )));
                    }
                    Stage::RecipePresent
                }
                Stage::RecipePresent => Stage::AwaitingApproval,
                Stage::AwaitingApproval => match self.prompter.review(package, &recipe_dir)? {
                    ReviewDecision::Proceed => Stage::Building,
                    ReviewDecision::Abort => Stage::Done(InstallOutcome::Aborted),
                    ReviewDecision::Quit => return Err(QuackError::Quit),
                },
                Stage::Building => {
                    if self.backend.build(&recipe_dir).await? {
                        Stage::ArtifactsEnumerated(enumerate_artifacts(&recipe_dir)?)
                    } else {
                        self.palette.error(&format!("failed to build {package}"));
                        Stage::Done(InstallOutcome::Failed)
                    }
                }
                Stage::ArtifactsEnumerated(artifacts) => match artifacts.len() {
                    0 => {
                        self.palette.error(&format!("no package was built for {package}"));
                        Stage::Done(InstallOutcome::Failed)
                    }
                    1 => Stage::Installing(artifacts),
                    _ => Stage::AwaitingSelection(artifacts),
                },
                Stage::AwaitingSelection(artifacts) => {
                    let names: Vec<String> = artifacts.iter().map(|path| file_name(path)).collect();
                    let selection = self.prompter.select_artifacts(&names)?;
                    Stage::Installing(selection.pick(&artifacts))
                }
                Stage::Installing(artifacts) => {
                    if self.install_and_cache(&artifacts).await? {
                        Stage::Done(InstallOutcome::Installed)
                    } else {
                        Stage::Preserving(artifacts)
                    }
                }
                // pacman refused (often a sudo timeout); the packages must
                // outlive the working directory.
                Stage::Preserving(artifacts) => {
                    let location = match keep_artifacts(&artifacts, &self.paths.fallback_dir) {
                        Ok(()) => self.paths.fallback_dir.clone(),
                        Err(err) => {
                            self.logger.warn(
                                "INSTALL",
                                format!("{err}; leaving build directory in place"),
                            );
                            retain_workdir = true;
                            recipe_dir.clone()
                        }
                    };
                    self.prompter.notify(&format!(
                        "A copy of the built packages has been kept in {}.",
                        location.display()
                    ));
                    self.logger.warn(
                        "INSTALL",
                        format!(
                            "pacman -U failed; {} package(s) kept in {}",
                            artifacts.len(),
                            location.display()
                        ),
                    );
                    Stage::Done(InstallOutcome::Failed)
                }
                Stage::Done(outcome) => break outcome,
            };
        };

        self.logger.info("INSTALL", format!("{package}: {outcome:?}"));
        if retain_workdir {
            let kept = workdir.keep();
            self.logger.debug("BUILD", format!("retained {}", kept.display()));
        }
        Ok(outcome)
    }

    async fn install_and_cache(&self, artifacts: &[PathBuf]) -> Result<bool> {
        if !self.backend.install(artifacts).await? {
            return Ok(false);
        }
        if !self.backend.cache(artifacts, &self.paths.package_cache).await? {
            self.logger.warn(
                "CACHE",
                format!(
                    "Could not copy built packages into {}",
                    self.paths.package_cache.display()
                ),
            );
        }
        Ok(true)
    }
}

/// Whether a file name looks like a makepkg output package.
pub fn is_package_artifact(name: &str) -> bool {
    if name.ends_with(".pkg.tar") {
        return true;
    }
    match name.rsplit_once(".pkg.tar.") {
        Some((stem, ext)) => !stem.is_empty() && !ext.is_empty() && !ext.contains('.'),
        None => false,
    }
}

/// Packages produced in `dir`, sorted by file name.
pub fn enumerate_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|err| {
        QuackError::Filesystem(format!("Failed to list {}: {err}", dir.display()))
    })?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_package_artifact(&file_name(&path)) {
            artifacts.push(path);
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// Copy artifacts into `destination`, creating it when needed.
pub fn keep_artifacts(artifacts: &[PathBuf], destination: &Path) -> Result<()> {
    std::fs::create_dir_all(destination).map_err(|err| {
        QuackError::Filesystem(format!("Failed to create {}: {err}", destination.display()))
    })?;

    for artifact in artifacts {
        let target = destination.join(file_name(artifact));
        std::fs::copy(artifact, &target).map_err(|err| {
            QuackError::Filesystem(format!(
                "Failed to copy {} to {}: {err}",
                artifact.display(),
                target.display()
            ))
        })?;
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::prompt::ArtifactSelection;

    struct FakeBackend {
        clone_ok: bool,
        write_recipe: bool,
        build_ok: bool,
        built: Vec<&'static str>,
        install_ok: bool,
        workdir: RefCell<Option<PathBuf>>,
        installed: RefCell<Vec<String>>,
        cached: RefCell<Vec<String>>,
    }

    impl FakeBackend {
        fn building(built: Vec<&'static str>) -> Self {
            Self {
                clone_ok: true,
                write_recipe: true,
                build_ok: true,
                built,
                install_ok: true,
                workdir: RefCell::new(None),
                installed: RefCell::new(Vec::new()),
                cached: RefCell::new(Vec::new()),
            }
        }

        fn workdir(&self) -> PathBuf {
            self.workdir.borrow().clone().expect("clone was attempted")
        }
    }

    impl BuildBackend for FakeBackend {
        async fn clone_recipe(&self, package: &str, workdir: &Path) -> Result<bool> {
            *self.workdir.borrow_mut() = Some(workdir.to_path_buf());
            if !self.clone_ok {
                return Ok(false);
            }
            let recipe_dir = workdir.join(package);
            std::fs::create_dir_all(&recipe_dir)?;
            if self.write_recipe {
                std::fs::write(recipe_dir.join(RECIPE_FILE), "pkgname=test\n")?;
            }
            Ok(true)
        }

        async fn build(&self, recipe_dir: &Path) -> Result<bool> {
            for name in &self.built {
                std::fs::write(recipe_dir.join(name), name.as_bytes())?;
            }
            Ok(self.build_ok)
        }

        async fn install(&self, artifacts: &[PathBuf]) -> Result<bool> {
            if self.install_ok {
                self.installed
                    .borrow_mut()
                    .extend(artifacts.iter().map(|path| file_name(path)));
            }
            Ok(self.install_ok)
        }

        async fn cache(&self, artifacts: &[PathBuf], _cache_dir: &Path) -> Result<bool> {
            self.cached
                .borrow_mut()
                .extend(artifacts.iter().map(|path| file_name(path)));
            Ok(true)
        }
    }

    struct ScriptedPrompter {
        review: ReviewDecision,
        selection: &'static str,
        offered: RefCell<Vec<String>>,
        notices: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        fn new(review: ReviewDecision, selection: &'static str) -> Self {
            Self {
                review,
                selection,
                offered: RefCell::new(Vec::new()),
                notices: RefCell::new(Vec::new()),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn review(&self, _package: &str, _recipe_dir: &Path) -> Result<ReviewDecision> {
            Ok(self.review)
        }

        fn select_artifacts(&self, artifacts: &[String]) -> Result<ArtifactSelection> {
            *self.offered.borrow_mut() = artifacts.to_vec();
            ArtifactSelection::parse(self.selection, artifacts.len())
        }

        fn confirm(&self, _question: &str) -> Result<bool> {
            Ok(true)
        }

        fn notify(&self, message: &str) {
            self.notices.borrow_mut().push(message.to_string());
        }
    }

    struct Harness {
        fallback: tempfile::TempDir,
        fallback_dir: PathBuf,
        logger: Logger,
    }

    impl Harness {
        fn new() -> Self {
            let fallback = tempfile::tempdir().expect("tempdir");
            let fallback_dir = fallback.path().to_path_buf();
            Self {
                fallback,
                fallback_dir,
                logger: Logger::stderr_only(false),
            }
        }

        async fn run(
            &self,
            backend: &FakeBackend,
            prompter: &ScriptedPrompter,
            package: &str,
        ) -> Result<InstallOutcome> {
            let paths = InstallPaths {
                package_cache: PathBuf::from("/nonexistent/cache"),
                fallback_dir: self.fallback_dir.clone(),
            };
            Installer::new(backend, prompter, paths, Palette::plain(), &self.logger)
                .install(package)
                .await
        }
    }

    const FOO: &str = "foo-1.0-1-x86_64.pkg.tar.zst";
    const FOO_DOCS: &str = "foo-docs-1.0-1-any.pkg.tar.zst";
    const FOO_DEBUG: &str = "foo-debug-1.0-1-x86_64.pkg.tar.zst";

    #[tokio::test]
    async fn single_artifact_installs_without_asking() {
        let harness = Harness::new();
        let backend = FakeBackend::building(vec![FOO]);
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "9");

        let outcome = harness.run(&backend, &prompter, "aur/foo").await.expect("install");

        assert_eq!(outcome, InstallOutcome::Installed);
        assert_eq!(*backend.installed.borrow(), vec![FOO]);
        assert_eq!(*backend.cached.borrow(), vec![FOO]);
        assert!(prompter.offered.borrow().is_empty());
        assert!(!backend.workdir().exists());
    }

    #[tokio::test]
    async fn all_installs_every_artifact() {
        let harness = Harness::new();
        let backend = FakeBackend::building(vec![FOO, FOO_DOCS, FOO_DEBUG]);
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "a");

        let outcome = harness.run(&backend, &prompter, "foo").await.expect("install");

        assert_eq!(outcome, InstallOutcome::Installed);
        assert_eq!(*prompter.offered.borrow(), vec![FOO, FOO_DEBUG, FOO_DOCS]);
        assert_eq!(*backend.installed.borrow(), vec![FOO, FOO_DEBUG, FOO_DOCS]);
    }

    #[tokio::test]
    async fn chosen_indices_install_in_order_typed() {
        let harness = Harness::new();
        let backend = FakeBackend::building(vec![FOO, FOO_DOCS, FOO_DEBUG]);
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "3 2");

        harness.run(&backend, &prompter, "foo").await.expect("install");

        assert_eq!(*backend.installed.borrow(), vec![FOO_DOCS, FOO_DEBUG]);
    }

    #[tokio::test]
    async fn out_of_range_selection_installs_nothing() {
        let harness = Harness::new();
        let backend = FakeBackend::building(vec![FOO, FOO_DOCS]);
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "1 3");

        let err = harness.run(&backend, &prompter, "foo").await.unwrap_err();

        assert!(matches!(err, QuackError::Input(_)));
        assert!(backend.installed.borrow().is_empty());
        assert!(!backend.workdir().exists());
    }

    #[tokio::test]
    async fn failed_install_keeps_artifacts_in_fallback() {
        let harness = Harness::new();
        let mut backend = FakeBackend::building(vec![FOO, FOO_DOCS]);
        backend.install_ok = false;
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "a");

        let outcome = harness.run(&backend, &prompter, "foo").await.expect("outcome");

        assert_eq!(outcome, InstallOutcome::Failed);
        for name in [FOO, FOO_DOCS] {
            let kept = harness.fallback.path().join(name);
            assert_eq!(std::fs::read_to_string(kept).expect("kept"), name);
        }
        assert!(backend.cached.borrow().is_empty());
        assert!(!backend.workdir().exists());
        assert_eq!(
            *prompter.notices.borrow(),
            vec![format!(
                "A copy of the built packages has been kept in {}.",
                harness.fallback.path().display()
            )]
        );
    }

    #[tokio::test]
    async fn unwritable_fallback_leaves_build_directory_behind() {
        let mut harness = Harness::new();
        let blocker = harness.fallback.path().join("blocker");
        std::fs::write(&blocker, "").expect("blocker");
        harness.fallback_dir = blocker.join("sub");
        let mut backend = FakeBackend::building(vec![FOO, FOO_DOCS]);
        backend.install_ok = false;
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "a");

        let outcome = harness.run(&backend, &prompter, "foo").await.expect("outcome");

        assert_eq!(outcome, InstallOutcome::Failed);
        let recipe_dir = backend.workdir().join("foo");
        for name in [FOO, FOO_DOCS] {
            assert_eq!(std::fs::read_to_string(recipe_dir.join(name)).expect("retained"), name);
        }
        assert_eq!(
            *prompter.notices.borrow(),
            vec![format!(
                "A copy of the built packages has been kept in {}.",
                recipe_dir.display()
            )]
        );
        std::fs::remove_dir_all(backend.workdir()).expect("cleanup");
    }

    #[test]
    fn keep_artifacts_copies_into_new_directory() {
        let source = tempfile::tempdir().expect("source");
        let artifact = source.path().join(FOO);
        std::fs::write(&artifact, "pkg").expect("artifact");
        let destination = source.path().join("kept").join("nested");

        keep_artifacts(&[artifact], &destination).expect("keep");

        assert_eq!(std::fs::read_to_string(destination.join(FOO)).expect("copy"), "pkg");
    }

    #[tokio::test]
    async fn declined_review_aborts_before_building() {
        let harness = Harness::new();
        let backend = FakeBackend::building(vec![FOO]);
        let prompter = ScriptedPrompter::new(ReviewDecision::Abort, "a");

        let outcome = harness.run(&backend, &prompter, "foo").await.expect("outcome");

        assert_eq!(outcome, InstallOutcome::Aborted);
        assert!(backend.installed.borrow().is_empty());
        assert!(!backend.workdir().exists());
    }

    #[tokio::test]
    async fn quit_is_an_error_and_cleans_up() {
        let harness = Harness::new();
        let backend = FakeBackend::building(vec![FOO]);
        let prompter = ScriptedPrompter::new(ReviewDecision::Quit, "a");

        let err = harness.run(&backend, &prompter, "foo").await.unwrap_err();

        assert!(matches!(err, QuackError::Quit));
        assert!(!backend.workdir().exists());
    }

    #[tokio::test]
    async fn clone_failure_is_fatal() {
        let harness = Harness::new();
        let mut backend = FakeBackend::building(vec![FOO]);
        backend.clone_ok = false;
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "a");

        let err = harness.run(&backend, &prompter, "foo").await.unwrap_err();

        assert_eq!(err.to_string(), "impossible to clone foo from AUR");
        assert!(!backend.workdir().exists());
    }

    #[tokio::test]
    async fn missing_recipe_is_fatal() {
        let harness = Harness::new();
        let mut backend = FakeBackend::building(vec![FOO]);
        backend.write_recipe = false;
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "a");

        let err = harness.run(&backend, &prompter, "foo").await.unwrap_err();

        assert_eq!(err.to_string(), "foo is NOT an AUR package");
    }

    #[tokio::test]
    async fn build_failure_is_an_outcome() {
        let harness = Harness::new();
        let mut backend = FakeBackend::building(Vec::new());
        backend.build_ok = false;
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "a");

        let outcome = harness.run(&backend, &prompter, "foo").await.expect("outcome");

        assert_eq!(outcome, InstallOutcome::Failed);
        assert!(backend.installed.borrow().is_empty());
    }

    #[tokio::test]
    async fn build_without_packages_fails() {
        let harness = Harness::new();
        let backend = FakeBackend::building(vec!["README.md"]);
        let prompter = ScriptedPrompter::new(ReviewDecision::Proceed, "a");

        let outcome = harness.run(&backend, &prompter, "foo").await.expect("outcome");

        assert_eq!(outcome, InstallOutcome::Failed);
    }

    #[test]
    fn artifact_names() {
        assert!(is_package_artifact("foo-1.0-1-x86_64.pkg.tar.zst"));
        assert!(is_package_artifact("foo-1.0-1-x86_64.pkg.tar.xz"));
        assert!(is_package_artifact("foo-1.0-1-any.pkg.tar"));
        assert!(!is_package_artifact("foo-1.0-1-x86_64.pkg.tar.zst.sig"));
        assert!(!is_package_artifact("foo-1.0.tar.gz"));
        assert!(!is_package_artifact("PKGBUILD"));
    }

    #[test]
    fn clone_url_uses_web_root() {
        let backend = ProcessBackend::new("https://aur.archlinux.org/", ColorMode::Never);
        assert_eq!(backend.clone_url("yay"), "https://aur.archlinux.org/yay.git");
    }
}
