use std::time::Instant;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::console::{Console, ConsoleOpts};
use crate::app::modules::benchmark::config::BenchmarkConfig;
use crate::app::modules::{Environment, Partial};
use crate::app::output::{self, BenchmarkReport};
use crate::app::{AppConfig, ExitStatus};
use crate::benchmark::{qualified_domains, Benchmark, BenchmarkResults};
use crate::nameserver::{predefined, NameServerConfigGroup};
use crate::resolver::UdpExecutor;
use crate::Error;

pub struct NsBench {}

impl NsBench {
    pub fn init<'a>(app_config: &'a AppConfig, config: &'a BenchmarkConfig) -> Result<Partial<SelectDomains<'a>>> {
        let console = Console::new(ConsoleOpts::from(app_config));
        let env = Environment::new(app_config, config, console);

        let name_servers = NsBench::name_servers(config)?;
        if name_servers.is_empty() {
            env.console.error("No nameservers to benchmark. Aborting.");
            return Ok(Partial::ExitStatus(ExitStatus::Abort));
        }
        info!("Benchmarking {} nameservers.", name_servers.len());
        env.console.print_benchmark_opts(config);

        Ok(Partial::Next(SelectDomains { env, name_servers }))
    }

    fn name_servers(config: &BenchmarkConfig) -> Result<NameServerConfigGroup> {
        let mut name_servers = match &config.nameservers {
            Some(list) => NameServerConfigGroup::parse_list(list).context("Failed to parse nameservers")?,
            None => NameServerConfigGroup::default(),
        };
        if name_servers.is_empty() {
            info!("No nameservers specified; using predefined nameservers.");
            name_servers = predefined::name_server_config_group();
        }
        if config.system_nameservers {
            let system_name_servers = NameServerConfigGroup::from_system_config_path(&config.resolv_conf_path)
                .context("Failed to load system nameservers")?;
            info!("Loaded {} system nameservers.", system_name_servers.len());
            name_servers.merge(system_name_servers);
        }

        Ok(name_servers)
    }
}

impl<'a> Partial<SelectDomains<'a>> {
    pub async fn select_domains(self) -> Result<Partial<RunBenchmark<'a>>> {
        match self {
            Partial::Next(next) => next.select_domains().await,
            Partial::ExitStatus(e) => Ok(Partial::ExitStatus(e)),
        }
    }
}

pub struct SelectDomains<'a> {
    env: Environment<'a, BenchmarkConfig>,
    name_servers: NameServerConfigGroup,
}

impl<'a> SelectDomains<'a> {
    async fn select_domains(self) -> Result<Partial<RunBenchmark<'a>>> {
        let selected = self.env.mod_config.domain_selection().select().await;
        self.env.console.print_domain_selection(&selected);

        let domains = qualified_domains(&selected.domains);
        if domains.is_empty() {
            self.env.console.error("No domains to query. Aborting.");
            return Ok(Partial::ExitStatus(ExitStatus::Abort));
        }

        Ok(Partial::Next(RunBenchmark {
            env: self.env,
            name_servers: self.name_servers,
            domains,
        }))
    }
}

impl<'a> Partial<RunBenchmark<'a>> {
    pub async fn benchmark(self) -> Result<Partial<Report<'a>>> {
        match self {
            Partial::Next(next) => next.benchmark().await,
            Partial::ExitStatus(e) => Ok(Partial::ExitStatus(e)),
        }
    }
}

pub struct RunBenchmark<'a> {
    env: Environment<'a, BenchmarkConfig>,
    name_servers: NameServerConfigGroup,
    domains: Vec<String>,
}

impl<'a> RunBenchmark<'a> {
    async fn benchmark(self) -> Result<Partial<Report<'a>>> {
        let config = self.env.mod_config;
        if self.env.console.not_quiet() {
            self.env.console.caption("Running DNS benchmark.");
        }
        self.env.console.print_estimates(&self.name_servers, self.domains.len());

        let executor = UdpExecutor::new(config.executor_opts());
        let benchmark = Benchmark::new(executor, config.benchmark_opts());
        let cancellation = CancellationToken::new();
        let ctrl_c = cancel_on_ctrl_c(cancellation.clone());

        info!("Running benchmark.");
        let start_time = Instant::now();
        let results = benchmark.run(&self.name_servers, &self.domains, &cancellation).await;
        let total_run_time = start_time.elapsed();
        ctrl_c.abort();
        info!("Finished benchmark.");

        let results = match results {
            Ok(results) => results,
            Err(Error::ConfigError { reason }) => {
                self.env.console.error(format!("Cannot run benchmark: {}. Aborting.", reason));
                return Ok(Partial::ExitStatus(ExitStatus::Abort));
            }
            Err(err) => return Err(err).context("Failed to run benchmark"),
        };
        if cancellation.is_cancelled() {
            self.env
                .console
                .attention("Benchmark has been interrupted; pending queries have been cancelled.");
        }
        self.env.console.print_statistics(&results, total_run_time);

        Ok(Partial::Next(Report { env: self.env, results }))
    }
}

fn cancel_on_ctrl_c(cancellation: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl-C; cancelling benchmark.");
            cancellation.cancel();
        }
    })
}

impl Partial<Report<'_>> {
    pub fn output(self) -> Result<ExitStatus> {
        match self {
            Partial::Next(next) => next.output(),
            Partial::ExitStatus(e) => Ok(e),
        }
    }
}

pub struct Report<'a> {
    env: Environment<'a, BenchmarkConfig>,
    results: BenchmarkResults,
}

impl Report<'_> {
    fn output(self) -> Result<ExitStatus> {
        let report = BenchmarkReport::new(&self.results);
        output::output(&self.env.app_config.output_config, &report)?;
        self.env.console.print_finished();

        Ok(ExitStatus::Ok)
    }
}
