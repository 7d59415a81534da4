#![deny(clippy::unwrap_used)]

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use ocex_client::{runner::DEFAULT_CLIENT_BINARY, Client, ClientConfig, SubprocessRunner};
use ocex_scenarios::{
    scenarios, LocalTestnet, OutputFormat, Scenario, ScenarioError, ScenarioReport, Session,
    DEFAULT_MRENCLAVE_FILE,
};
use ocex_testnet::{find_binary, TestnetConfig, NODE_BINARY, WORKER_BINARY, WORKER_STATE_FILES};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Directories searched for the node and worker binaries when no path is given.
const BINARY_SEARCH_DIRS: [&str; 3] = ["../bin", "target/release", "target/debug"];

/// Balances read before the restart, written next to the worker's state.
const SNAPSHOT_FILE: &str = "balances-before-restart.json";

#[derive(Debug, Parser)]
#[command(name = "ocex-scenarios", about = "Run trading scenarios against the gateway", version)]
struct Cli {
    #[command(subcommand)]
    pub scenario: ScenarioCommand,

    /// Node port, forwarded to the client as `-p`.
    #[arg(short = 'p', long, global = true)]
    pub node_port: Option<u16>,

    /// Worker port, forwarded to the client as `-P`.
    #[arg(short = 'P', long, global = true)]
    pub worker_port: Option<u16>,

    /// Stage of the test run, only used to label logs and the report.
    #[arg(short = 't', long, global = true)]
    pub test_run: Option<u32>,

    /// Path of the `substratee-client` executable.
    #[arg(long, env = "OCEX_CLIENT_BINARY", default_value = DEFAULT_CLIENT_BINARY)]
    pub client_binary: PathBuf,

    /// File listing MRENCLAVE values, used when no worker is registered on chain.
    #[arg(long, env = "OCEX_MRENCLAVE_FILE", default_value = DEFAULT_MRENCLAVE_FILE)]
    pub mrenclave_file: PathBuf,

    /// Output format of the scenario report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Subcommand)]
enum ScenarioCommand {
    /// Deposit, trade 0.05 btc against 0.05 usd and withdraw the proceeds.
    HappyFlow,
    /// Walk a ladder of limit orders and check balances after each one.
    OrderMatching,
    /// Place a bid the trader cannot afford and check nothing moved.
    RejectedOrder,
    /// Deposit and withdraw without trading.
    DepositWithdraw,
    /// Launch a fresh node and worker, restart them mid-session and compare balances.
    CrashRecovery(TestnetArgs),
}

#[derive(Debug, Args)]
struct TestnetArgs {
    /// Node executable, searched for in the usual build directories when omitted.
    #[arg(long, env = "OCEX_NODE_BINARY")]
    pub node_binary: Option<PathBuf>,

    /// Worker executable, searched for in the usual build directories when omitted.
    #[arg(long, env = "OCEX_WORKER_BINARY")]
    pub worker_binary: Option<PathBuf>,

    /// Extra node arguments.
    #[arg(long, allow_hyphen_values = true)]
    pub node_arg: Vec<String>,

    /// Extra worker arguments.
    #[arg(long, allow_hyphen_values = true)]
    pub worker_arg: Vec<String>,

    /// Working directory of the node and worker, their state files and logs live here.
    #[arg(long, default_value = "../bin")]
    pub workdir: PathBuf,

    /// Restart the node along with the worker.
    #[arg(long, default_value_t = false)]
    pub restart_node: bool,

    /// How many times to poll a port before giving up.
    #[arg(long, default_value_t = 60)]
    pub n_retries: u32,

    /// Milliseconds between two port polls.
    #[arg(long, default_value = "1000", value_parser = parse_millis)]
    pub retry_interval: Duration,
}

fn parse_millis(src: &str) -> Result<Duration, std::num::ParseIntError> {
    src.parse().map(Duration::from_millis)
}

impl TestnetArgs {
    fn into_config(
        self,
        node_port: Option<u16>,
        worker_port: Option<u16>,
    ) -> Result<TestnetConfig, anyhow::Error> {
        let locate = |given: Option<PathBuf>, name: &str| {
            given
                .or_else(|| find_binary(name, &BINARY_SEARCH_DIRS))
                .ok_or_else(|| anyhow::anyhow!("could not find {name}, pass its path explicitly"))
        };

        Ok(TestnetConfig {
            node_binary: locate(self.node_binary, NODE_BINARY)?,
            node_port: node_port.unwrap_or(9944),
            node_args: self.node_arg,
            worker_binary: locate(self.worker_binary, WORKER_BINARY)?,
            worker_port: worker_port.unwrap_or(2000),
            worker_args: self.worker_arg,
            workdir: self.workdir,
            state_files: WORKER_STATE_FILES.iter().map(PathBuf::from).collect(),
            n_retries: self.n_retries,
            retry_interval: self.retry_interval,
        })
    }
}

impl Cli {
    async fn run(self) -> Result<(), anyhow::Error> {
        let client_config = ClientConfig {
            binary: self.client_binary,
            node_port: self.node_port,
            worker_port: self.worker_port,
        };
        let mrenclave_file = self.mrenclave_file.as_path();
        let test_run = self.test_run;

        let (report, result) = match self.scenario {
            ScenarioCommand::HappyFlow => {
                let mut session =
                    connect(client_config, mrenclave_file, Scenario::HappyFlow, test_run).await?;
                let result = scenarios::happy_flow::run(&mut session).await;
                (session.into_report(), result)
            }
            ScenarioCommand::OrderMatching => {
                let mut session =
                    connect(client_config, mrenclave_file, Scenario::OrderMatching, test_run)
                        .await?;
                let result = scenarios::order_matching::run(&mut session).await;
                (session.into_report(), result)
            }
            ScenarioCommand::RejectedOrder => {
                let mut session =
                    connect(client_config, mrenclave_file, Scenario::RejectedOrder, test_run)
                        .await?;
                let result = scenarios::rejected_order::run(&mut session).await;
                (session.into_report(), result)
            }
            ScenarioCommand::DepositWithdraw => {
                let mut session =
                    connect(client_config, mrenclave_file, Scenario::DepositWithdraw, test_run)
                        .await?;
                let result = scenarios::deposit_withdraw::run(&mut session).await;
                (session.into_report(), result)
            }
            ScenarioCommand::CrashRecovery(testnet_args) => {
                crash_recovery(testnet_args, client_config, mrenclave_file, test_run).await?
            }
        };

        println!("{}", self.output_format.format(&report)?);
        Ok(result?)
    }
}

async fn connect(
    client_config: ClientConfig,
    mrenclave_file: &Path,
    scenario: Scenario,
    test_run: Option<u32>,
) -> Result<Session<SubprocessRunner>, anyhow::Error> {
    tracing::info!(%scenario, ?test_run, "client: {}", client_config.binary.display());
    let client = Client::connect(SubprocessRunner::new(client_config), mrenclave_file).await?;
    Ok(Session::new(client, scenario, test_run))
}

async fn crash_recovery(
    testnet_args: TestnetArgs,
    mut client_config: ClientConfig,
    mrenclave_file: &Path,
    test_run: Option<u32>,
) -> Result<(ScenarioReport, Result<(), ScenarioError>), anyhow::Error> {
    let restart_node = testnet_args.restart_node;
    let config = testnet_args.into_config(client_config.node_port, client_config.worker_port)?;
    client_config.node_port = Some(config.node_port);
    client_config.worker_port = Some(config.worker_port);
    let snapshot_path = config.workdir.join(SNAPSHOT_FILE);

    let mut testnet = LocalTestnet::launch(config, restart_node).await?;
    let mut session = connect(client_config, mrenclave_file, Scenario::CrashRecovery, test_run)
        .await?;
    let result =
        scenarios::crash_recovery::run(&mut session, &mut testnet, &snapshot_path).await;
    testnet.shutdown().await?;

    Ok((session.into_report(), result))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Logger initialization.
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(LevelFilter::INFO.into())
                        .from_env()?,
                )
                .with_filter(filter::filter_fn(|metadata| {
                    if let Some(module_path) = metadata.module_path() {
                        module_path.starts_with("ocex")
                    } else {
                        true
                    }
                })),
        )
        .init();

    Cli::parse().run().await
}
