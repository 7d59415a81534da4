use std::{future::Future, path::PathBuf, process::Stdio};

use crate::Error;

/// Default location of the client, relative to the directory scenarios are launched from.
pub const DEFAULT_CLIENT_BINARY: &str = "../bin/substratee-client";

/// Runs a single client invocation and returns its decoded stdout.
pub trait CommandRunner {
    /// Run the client with `args` appended to the configured prefix.
    ///
    /// Implementations wait for the invocation to complete and return stdout with
    /// surrounding whitespace removed.
    fn run(&self, args: &[String]) -> impl Future<Output = Result<String, Error>>;
}

impl<R> CommandRunner for &R
where
    R: CommandRunner,
{
    fn run(&self, args: &[String]) -> impl Future<Output = Result<String, Error>> {
        (**self).run(args)
    }
}

/// Where the client lives and which node/worker it talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub binary: PathBuf,
    /// Node port, passed as `-p`.
    pub node_port: Option<u16>,
    /// Worker port, passed as `-P`.
    pub worker_port: Option<u16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_CLIENT_BINARY),
            node_port: None,
            worker_port: None,
        }
    }
}

impl ClientConfig {
    /// Arguments preceding every subcommand.
    pub fn prefix_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(4);
        if let Some(worker_port) = self.worker_port {
            args.push("-P".to_string());
            args.push(worker_port.to_string());
        }
        if let Some(node_port) = self.node_port {
            args.push("-p".to_string());
            args.push(node_port.to_string());
        }
        args
    }
}

/// [`CommandRunner`] spawning the real client executable.
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    config: ClientConfig,
}

impl SubprocessRunner {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl CommandRunner for SubprocessRunner {
    #[tracing::instrument(level = "trace", skip_all, fields(args = ?args))]
    async fn run(&self, args: &[String]) -> Result<String, Error> {
        let output = tokio::process::Command::new(&self.config.binary)
            .args(self.config.prefix_args())
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let command = format!(
                "{} {}",
                self.config.binary.display(),
                self.config
                    .prefix_args()
                    .iter()
                    .chain(args)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(%command, code = ?output.status.code(), %stderr, "client invocation failed");
            return Err(Error::CommandFailed {
                command,
                code: output.status.code(),
                stderr,
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        tracing::trace!(stdout = %stdout.trim());
        Ok(stdout.trim().to_string())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::{cell::RefCell, collections::VecDeque};

    use super::{ClientConfig, CommandRunner};
    use crate::Error;

    /// Replays canned outputs in order and records every invocation.
    pub(crate) struct ScriptedRunner {
        outputs: RefCell<VecDeque<String>>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new<I>(outputs: I) -> Self
        where
            I: IntoIterator<Item = String>,
        {
            Self {
                outputs: RefCell::new(outputs.into_iter().collect()),
                calls: RefCell::new(vec![]),
            }
        }

        pub(crate) fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(&self, args: &[String]) -> Result<String, Error> {
            self.calls.borrow_mut().push(args.to_vec());
            Ok(self
                .outputs
                .borrow_mut()
                .pop_front()
                .unwrap_or_default()
                .trim()
                .to_string())
        }
    }

    #[test]
    fn prefix_puts_worker_port_first() {
        let config = ClientConfig {
            node_port: Some(9994),
            worker_port: Some(2094),
            ..Default::default()
        };
        assert_eq!(config.prefix_args(), ["-P", "2094", "-p", "9994"]);
    }

    #[test]
    fn prefix_skips_unset_ports() {
        let config = ClientConfig {
            node_port: Some(9994),
            ..Default::default()
        };
        assert_eq!(config.prefix_args(), ["-p", "9994"]);
        assert!(ClientConfig::default().prefix_args().is_empty());
    }

    #[cfg(unix)]
    mod subprocess {
        use std::{io::Write, os::unix::fs::PermissionsExt};

        use crate::{ClientConfig, CommandRunner, Error, SubprocessRunner};

        fn fake_client(dir: &tempfile::TempDir, script: &str) -> SubprocessRunner {
            let path = dir.path().join("substratee-client");
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "#!/bin/sh\n{script}").unwrap();
            drop(file);
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

            SubprocessRunner::new(ClientConfig {
                binary: path,
                node_port: Some(9994),
                worker_port: Some(2094),
            })
        }

        #[tokio::test]
        async fn passes_prefix_and_trims_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let runner = fake_client(&dir, r#"echo "  $@  ""#);

            let output = runner
                .run(&["balance".to_string(), "//Alice".to_string()])
                .await
                .unwrap();
            assert_eq!(output, "-P 2094 -p 9994 balance //Alice");
        }

        #[tokio::test]
        async fn non_zero_exit_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            let runner = fake_client(&dir, "echo 'insufficient balance' >&2\nexit 3");

            let result = runner.run(&["deposit".to_string()]).await;
            match result {
                Err(Error::CommandFailed {
                    command,
                    code,
                    stderr,
                }) => {
                    assert!(command.ends_with("-P 2094 -p 9994 deposit"));
                    assert_eq!(code, Some(3));
                    assert_eq!(stderr, "insufficient balance");
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }

        #[tokio::test]
        async fn missing_binary_is_an_io_error() {
            let runner = SubprocessRunner::new(ClientConfig {
                binary: "/does/not/exist/substratee-client".into(),
                ..Default::default()
            });
            assert!(matches!(
                runner.run(&[]).await,
                Err(Error::IoError(_))
            ));
        }
    }
}
