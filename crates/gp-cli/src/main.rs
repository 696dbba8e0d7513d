//! GridPilot — distributed grid search over SVR training parameters.
//!
//! Sweeps the cost/width/epsilon exponent grid, fanning trial executions
//! out over local processes, ssh hosts, and interactive remote sessions,
//! and reports the parameter combination with the lowest cross-validation
//! error. Progress is persisted incrementally and a killed sweep can be
//! resumed with `--resume`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use gp_dispatch::{
    run_sweep, FileProgress, NullProgress, ProgressSink, ResumeLedger, SweepOutcome,
};
use gp_grid::{AxisSpec, GridAxes};
use gp_trial::{
    LocalRunner, SessionCredentials, SessionRunner, SshRunner, TrialCommand, TrialRunner,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridpilot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Distributed grid search over SVR training parameters", long_about = None)]
struct Cli {
    /// Labeled training dataset.
    dataset: PathBuf,

    /// Cost exponent range, "begin,end,step", or "null" to disable the axis.
    #[arg(long, default_value = "-1,6,1", value_name = "RANGE")]
    log2c: AxisSpec,

    /// Kernel width exponent range, "begin,end,step" or "null".
    #[arg(long, default_value = "0,-8,-1", value_name = "RANGE")]
    log2g: AxisSpec,

    /// Epsilon exponent range, "begin,end,step" or "null".
    #[arg(long, default_value = "-8,-1,1", value_name = "RANGE")]
    log2p: AxisSpec,

    /// Cross-validation fold count.
    #[arg(short = 'v', long = "fold", default_value_t = 5)]
    fold: u32,

    /// Trainer executable invoked once per trial.
    #[arg(long, default_value = "./svm-train")]
    trainer: PathBuf,

    /// Progress/output file. Defaults to "<dataset file name>.out".
    #[arg(long)]
    out: Option<PathBuf>,

    /// Do not persist progress at all.
    #[arg(long, conflicts_with = "out")]
    no_out: bool,

    /// Resume from an existing progress file; with no value, the --out
    /// path is used.
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "PATH")]
    resume: Option<Option<PathBuf>>,

    /// Number of local worker processes.
    #[arg(long, default_value_t = 1)]
    local_workers: usize,

    /// Remote ssh host; repeat for one worker per host.
    #[arg(long = "ssh", value_name = "HOST")]
    ssh_hosts: Vec<String>,

    /// Interactive (telnet-style) host; repeat for one worker per host.
    #[arg(long = "telnet", value_name = "HOST")]
    telnet_hosts: Vec<String>,

    /// Login name for interactive hosts.
    #[arg(long, env = "USER")]
    telnet_user: Option<String>,

    /// Login password for interactive hosts.
    #[arg(long, env = "GRIDPILOT_TELNET_PASSWORD", hide_env_values = true)]
    telnet_password: Option<String>,

    /// Enable verbose output.
    #[arg(long)]
    verbose: bool,

    /// Extra arguments forwarded to the trainer unmodified.
    #[arg(last = true, value_name = "TRAINER_ARGS")]
    trainer_args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    preflight(&cli)?;

    let axes = GridAxes::new(cli.log2c, cli.log2g, cli.log2p);
    let out_path = cli
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(&cli.dataset));
    let resume_path = resolve_resume_path(&cli, &out_path);

    let ledger = match &resume_path {
        Some(path) => ResumeLedger::load(path)?,
        None => ResumeLedger::default(),
    };

    let sink: Box<dyn ProgressSink> = if cli.no_out {
        Box::new(NullProgress)
    } else if resume_path.is_some() {
        Box::new(FileProgress::append(&out_path)?)
    } else {
        Box::new(FileProgress::create(&out_path)?)
    };

    let command = TrialCommand::new(&cli.trainer, &cli.dataset, cli.fold)
        .with_extra_args(cli.trainer_args.clone());
    let runners = build_runners(&cli, &command)?;
    info!(
        dataset = %cli.dataset.display(),
        workers = runners.len(),
        resumed = ledger.len(),
        "starting sweep"
    );

    let outcome = run_sweep(&axes, ledger, sink, runners).await?;
    report(&outcome);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Fatal configuration checks, all performed before any worker starts.
fn preflight(cli: &Cli) -> Result<()> {
    if !cli.trainer.exists() {
        bail!("trainer executable not found: {}", cli.trainer.display());
    }
    if !cli.dataset.exists() {
        bail!("dataset not found: {}", cli.dataset.display());
    }
    if cli.local_workers == 0 && cli.ssh_hosts.is_empty() && cli.telnet_hosts.is_empty() {
        bail!("no workers configured: need local workers or remote hosts");
    }
    Ok(())
}

fn default_out_path(dataset: &Path) -> PathBuf {
    let name = dataset
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sweep".to_string());
    PathBuf::from(format!("{name}.out"))
}

fn resolve_resume_path(cli: &Cli, out_path: &Path) -> Option<PathBuf> {
    match &cli.resume {
        None => None,
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(out_path.to_path_buf()),
    }
}

/// Assemble the worker pool: interactive sessions first, then ssh hosts,
/// then local processes.
fn build_runners(cli: &Cli, command: &TrialCommand) -> Result<Vec<Box<dyn TrialRunner>>> {
    let mut runners: Vec<Box<dyn TrialRunner>> = Vec::new();

    if !cli.telnet_hosts.is_empty() {
        let username = cli
            .telnet_user
            .clone()
            .context("--telnet-user (or $USER) is required with --telnet")?;
        let password = cli.telnet_password.clone().context(
            "--telnet-password (or GRIDPILOT_TELNET_PASSWORD) is required with --telnet",
        )?;
        for host in &cli.telnet_hosts {
            let credentials = SessionCredentials {
                username: username.clone(),
                password: password.clone(),
            };
            runners.push(Box::new(SessionRunner::new(
                host.clone(),
                credentials,
                command.clone(),
            )?));
        }
    }

    for host in &cli.ssh_hosts {
        runners.push(Box::new(SshRunner::new(host.clone(), command.clone())?));
    }

    for index in 0..cli.local_workers {
        runners.push(Box::new(LocalRunner::new(index, command.clone())));
    }

    Ok(runners)
}

fn report(outcome: &SweepOutcome) {
    match &outcome.best {
        Some((job, score)) => {
            let mut values = Vec::new();
            if let Some(c) = job.c {
                values.push(format!("c={}", 2f64.powf(c)));
            }
            if let Some(g) = job.g {
                values.push(format!("g={}", 2f64.powf(g)));
            }
            if let Some(p) = job.p {
                values.push(format!("p={}", 2f64.powf(p)));
            }
            println!("best {} score={score}", values.join(" "));
        }
        None => println!("no completed trials; best parameters unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_axis_overrides_and_passthrough_args() {
        let cli = Cli::try_parse_from([
            "gridpilot",
            "--log2c",
            "1,3,1",
            "--log2g",
            "null",
            "--fold",
            "10",
            "--ssh",
            "node1",
            "--ssh",
            "node2",
            "data.scale",
            "--",
            "-t",
            "0",
        ])
        .unwrap();

        assert!(cli.log2g.is_disabled());
        assert_eq!(cli.fold, 10);
        assert_eq!(cli.ssh_hosts, vec!["node1", "node2"]);
        assert_eq!(cli.trainer_args, vec!["-t", "0"]);
        assert_eq!(cli.dataset, PathBuf::from("data.scale"));
    }

    #[test]
    fn malformed_axis_range_is_a_parse_error() {
        let result = Cli::try_parse_from(["gridpilot", "--log2c", "1,2", "data.scale"]);
        assert!(result.is_err());
    }

    #[test]
    fn out_path_defaults_to_dataset_name() {
        assert_eq!(
            default_out_path(Path::new("/data/heart_scale")),
            PathBuf::from("heart_scale.out")
        );
    }

    #[test]
    fn bare_resume_flag_falls_back_to_the_out_path() {
        let cli = Cli::try_parse_from(["gridpilot", "--resume", "data.scale"]).unwrap();
        let resume = resolve_resume_path(&cli, Path::new("data.scale.out"));
        assert_eq!(resume, Some(PathBuf::from("data.scale.out")));

        let cli =
            Cli::try_parse_from(["gridpilot", "--resume=prior.out", "data.scale"]).unwrap();
        let resume = resolve_resume_path(&cli, Path::new("data.scale.out"));
        assert_eq!(resume, Some(PathBuf::from("prior.out")));
    }

    #[test]
    fn preflight_rejects_missing_inputs_and_empty_pools() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = dir.path().join("svm-train");
        let dataset = dir.path().join("data.scale");
        std::fs::write(&trainer, "").unwrap();
        std::fs::write(&dataset, "").unwrap();

        let args = |trainer: &Path, dataset: &Path, extra: &[&str]| {
            let mut argv = vec![
                "gridpilot".to_string(),
                "--trainer".to_string(),
                trainer.display().to_string(),
            ];
            argv.extend(extra.iter().map(|s| s.to_string()));
            argv.push(dataset.display().to_string());
            Cli::try_parse_from(argv).unwrap()
        };

        assert!(preflight(&args(&trainer, &dataset, &[])).is_ok());
        assert!(preflight(&args(Path::new("/missing"), &dataset, &[])).is_err());
        assert!(preflight(&args(&trainer, Path::new("/missing"), &[])).is_err());
        assert!(preflight(&args(&trainer, &dataset, &["--local-workers", "0"])).is_err());
    }
}
