//! Post-render bootstrap: dependency install and git initialization.
//!
//! The install step is fatal on failure. The git step is best-effort: any
//! failure is logged and reported as [`GitOutcome::Skipped`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{GalleryError, Result};

/// Runs the external commands that finish a scaffolded project.
#[async_trait]
pub trait Bootstrapper: Send + Sync {
    /// Install dependencies, streaming the tool's output to the terminal.
    async fn install_dependencies(&self, project_dir: &Path) -> Result<()>;

    /// `git init`, stage everything and create the initial commit.
    async fn init_repository(&self, project_dir: &Path) -> Result<()>;
}

/// Which bootstrap steps to run.
#[derive(Debug, Clone, Copy)]
pub struct BootstrapOptions {
    pub install: bool,
    pub git: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            install: true,
            git: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOutcome {
    Initialized,
    Skipped(String),
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub installed: bool,
    pub git: GitOutcome,
}

/// Run the enabled bootstrap steps against `project_dir`.
pub async fn run(
    bootstrapper: &dyn Bootstrapper,
    project_dir: &Path,
    options: BootstrapOptions,
) -> Result<BootstrapReport> {
    if options.install {
        bootstrapper.install_dependencies(project_dir).await?;
    }

    let git = if options.git {
        init_git(bootstrapper, project_dir).await
    } else {
        GitOutcome::Disabled
    };

    Ok(BootstrapReport {
        installed: options.install,
        git,
    })
}

/// Initialize the repository, turning any failure into [`GitOutcome::Skipped`].
pub async fn init_git(bootstrapper: &dyn Bootstrapper, project_dir: &Path) -> GitOutcome {
    match bootstrapper.init_repository(project_dir).await {
        Ok(()) => GitOutcome::Initialized,
        Err(e) => {
            tracing::info!("git initialization skipped: {e}");
            GitOutcome::Skipped(e.to_string())
        }
    }
}

/// `npm install` followed by a plain `git` repository setup.
pub struct NpmGitBootstrapper {
    npm: String,
    git: String,
}

impl NpmGitBootstrapper {
    pub fn new() -> Self {
        Self {
            npm: "npm".into(),
            git: "git".into(),
        }
    }

    /// Use different executables, e.g. `pnpm` instead of `npm`.
    pub fn with_programs(npm: impl Into<String>, git: impl Into<String>) -> Self {
        Self {
            npm: npm.into(),
            git: git.into(),
        }
    }

    fn resolve(program: &str, install: &str) -> Result<PathBuf> {
        which::which(program).map_err(|_| GalleryError::MissingTool {
            name: program.into(),
            install: install.into(),
        })
    }

    async fn run_git(&self, git: &Path, project_dir: &Path, args: &[&str]) -> Result<()> {
        let output = Command::new(git)
            .args(args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(GalleryError::Subprocess {
                command: format!("{} {}", self.git, args.join(" ")),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Default for NpmGitBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bootstrapper for NpmGitBootstrapper {
    async fn install_dependencies(&self, project_dir: &Path) -> Result<()> {
        let npm = Self::resolve(&self.npm, "https://nodejs.org/en/download")?;
        tracing::debug!("running {} install in {}", npm.display(), project_dir.display());

        let status = Command::new(&npm)
            .arg("install")
            .current_dir(project_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(GalleryError::Subprocess {
                command: format!("{} install", self.npm),
                message: status.to_string(),
            });
        }
        Ok(())
    }

    async fn init_repository(&self, project_dir: &Path) -> Result<()> {
        let git = Self::resolve(&self.git, "https://git-scm.com/downloads")?;
        self.run_git(&git, project_dir, &["init"]).await?;
        self.run_git(&git, project_dir, &["add", "."]).await?;
        self.run_git(&git, project_dir, &["commit", "-m", "Initial commit"])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<&'static str>>,
        fail_install: bool,
        fail_git: bool,
    }

    #[async_trait]
    impl Bootstrapper for Recording {
        async fn install_dependencies(&self, _project_dir: &Path) -> Result<()> {
            self.calls.lock().unwrap().push("install");
            if self.fail_install {
                return Err(GalleryError::Subprocess {
                    command: "npm install".into(),
                    message: "exit status: 1".into(),
                });
            }
            Ok(())
        }

        async fn init_repository(&self, _project_dir: &Path) -> Result<()> {
            self.calls.lock().unwrap().push("git");
            if self.fail_git {
                return Err(GalleryError::Subprocess {
                    command: "git commit -m Initial commit".into(),
                    message: "Author identity unknown".into(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_all_steps() {
        let fake = Recording::default();
        let report = run(&fake, Path::new("."), BootstrapOptions::default())
            .await
            .unwrap();
        assert!(report.installed);
        assert_eq!(report.git, GitOutcome::Initialized);
        assert_eq!(*fake.calls.lock().unwrap(), vec!["install", "git"]);
    }

    #[tokio::test]
    async fn test_git_failure_is_not_fatal() {
        let fake = Recording {
            fail_git: true,
            ..Default::default()
        };
        let report = run(&fake, Path::new("."), BootstrapOptions::default())
            .await
            .unwrap();
        match report.git {
            GitOutcome::Skipped(reason) => assert!(reason.contains("Author identity unknown")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_init_git_alone() {
        let fake = Recording {
            fail_git: true,
            ..Default::default()
        };
        let outcome = init_git(&fake, Path::new(".")).await;
        assert!(matches!(outcome, GitOutcome::Skipped(_)));
        assert_eq!(*fake.calls.lock().unwrap(), vec!["git"]);
    }

    #[tokio::test]
    async fn test_install_failure_aborts_before_git() {
        let fake = Recording {
            fail_install: true,
            ..Default::default()
        };
        let err = run(&fake, Path::new("."), BootstrapOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Subprocess { .. }));
        assert_eq!(*fake.calls.lock().unwrap(), vec!["install"]);
    }

    #[tokio::test]
    async fn test_disabled_steps() {
        let fake = Recording::default();
        let options = BootstrapOptions {
            install: false,
            git: false,
        };
        let report = run(&fake, Path::new("."), options).await.unwrap();
        assert!(!report.installed);
        assert_eq!(report.git, GitOutcome::Disabled);
        assert!(fake.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let bootstrapper =
            NpmGitBootstrapper::with_programs("this_tool_does_not_exist_xyz", "git");
        let dir = tempfile::tempdir().unwrap();
        let err = bootstrapper
            .install_dependencies(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::MissingTool { .. }));
    }
}
