use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::{Child, Command};

use crate::Error;

/// Everything needed to (re)launch an external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Name used in logs and errors.
    pub name: String,
    pub binary: PathBuf,
    pub args: Vec<String>,
    /// Working directory, relative state files of the process end up here.
    pub workdir: PathBuf,
    /// File stdout and stderr are appended to.
    pub log_file: PathBuf,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, binary: impl Into<PathBuf>, workdir: &Path) -> Self {
        let name = name.into();
        Self {
            log_file: workdir.join(format!("{name}.log")),
            binary: binary.into(),
            args: vec![],
            workdir: workdir.to_path_buf(),
            name,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// A running child process, killed when dropped.
#[derive(Debug)]
pub struct ManagedProcess {
    spec: ProcessSpec,
    child: Child,
}

impl ManagedProcess {
    #[tracing::instrument(skip_all, fields(name = %spec.name))]
    pub fn spawn(spec: ProcessSpec) -> Result<Self, Error> {
        std::fs::create_dir_all(&spec.workdir)?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&spec.log_file)?;

        let child = Command::new(&spec.binary)
            .args(&spec.args)
            .current_dir(&spec.workdir)
            .stdin(Stdio::null())
            .stdout(log.try_clone()?)
            .stderr(log)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                name: spec.name.clone(),
                binary: spec.binary.clone(),
                source,
            })?;

        tracing::info!(
            pid = ?child.id(),
            binary = %spec.binary.display(),
            log = %spec.log_file.display(),
            "launched {}",
            spec.name
        );
        Ok(Self { spec, child })
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    /// Whether the process is still alive; reaps it if it already exited.
    pub fn is_running(&mut self) -> Result<bool, Error> {
        Ok(self.child.try_wait()?.is_none())
    }

    /// Fail with [`Error::ExitedEarly`] if the process is gone.
    pub fn ensure_running(&mut self) -> Result<(), Error> {
        match self.child.try_wait()? {
            None => Ok(()),
            Some(status) => Err(Error::ExitedEarly {
                name: self.spec.name.clone(),
                code: status.code(),
            }),
        }
    }

    /// Kill the process and wait for it to be reaped.
    #[tracing::instrument(skip_all, fields(name = %self.spec.name))]
    pub async fn kill(mut self) -> Result<ProcessSpec, Error> {
        if self.is_running()? {
            self.child.kill().await?;
            tracing::info!("killed {}", self.spec.name);
        }
        Ok(self.spec)
    }
}
