//! qfree - processor availability per node for PBS/Torque clusters

use anyhow::{Context, Result};
use clap::Parser;
use qfree::display;
use qfree::models::{DisplayConfig, JobFilter, QfreeConfig, ReportOptions, parse_node_status};
use qfree::pbs::PbsInterface;
use tracing_subscriber::EnvFilter;

const STATE_HELP: &str = "\
Meaning of the state column:
  free: all processors are available
  avail: some processors are available, but not all
  full: no processors available on this node
  offline: node not accepting jobs
  down: node is down";

#[derive(Parser, Debug)]
#[command(name = "qfree")]
#[command(about = "Lists how many processors (CPU threads) are available for each node in the cluster.")]
#[command(after_help = STATE_HELP)]
#[command(version)]
struct Cli {
    /// Show all nodes, including offline / down
    #[arg(short, long)]
    all: bool,

    /// Show processor counts for all jobs, or a specific JOB_ID if given
    #[arg(
        short,
        long = "jobs",
        value_name = "JOB_ID",
        num_args = 0..=1,
        default_missing_value = "all"
    )]
    jobs: Option<String>,

    /// Don't use colored output
    #[arg(short, long)]
    nocolor: bool,
}

impl Cli {
    /// Combine flags with the display configuration
    fn report_options(&self, display: &DisplayConfig) -> ReportOptions {
        ReportOptions {
            show_all: self.all,
            job_filter: JobFilter::from_arg(self.jobs.as_deref()),
            color: display.color && !self.nocolor,
        }
    }
}

/// Log to stderr so stdout carries only the report. Level from QFREE_LOG.
fn init_logging() {
    let filter = EnvFilter::try_from_env("QFREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let (config, warnings) = QfreeConfig::load().map_err(anyhow::Error::msg)?;
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    let options = cli.report_options(&config.display);
    tracing::debug!(?options, "report options");

    let pbs = PbsInterface::with_config(config.system.pbs_bin_path.as_deref());
    let xml = pbs
        .fetch_node_status()
        .context("Unable to query node status")?;

    let records = parse_node_status(&xml, &config.display.suffixes())
        .context("Unable to parse pbsnodes output")?;

    println!("{}", display::format_report(&records, &options));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("qfree").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&[]);
        let options = cli.report_options(&DisplayConfig::default());
        assert_eq!(options, ReportOptions::default());
    }

    #[test]
    fn test_cli_flags() {
        let options = parse(&["-a", "-n"]).report_options(&DisplayConfig::default());
        assert!(options.show_all);
        assert!(!options.color);

        let options = parse(&["--all", "--nocolor"]).report_options(&DisplayConfig::default());
        assert!(options.show_all);
        assert!(!options.color);
    }

    #[test]
    fn test_cli_jobs_without_value_means_all() {
        let options = parse(&["-j"]).report_options(&DisplayConfig::default());
        assert_eq!(options.job_filter, JobFilter::All);

        let options = parse(&["--jobs", "-a"]).report_options(&DisplayConfig::default());
        assert_eq!(options.job_filter, JobFilter::All);
        assert!(options.show_all);
    }

    #[test]
    fn test_cli_jobs_with_value() {
        let options = parse(&["-j", "1234"]).report_options(&DisplayConfig::default());
        assert_eq!(options.job_filter, JobFilter::Only("1234".to_string()));

        let options = parse(&["--jobs=all"]).report_options(&DisplayConfig::default());
        assert_eq!(options.job_filter, JobFilter::All);
    }

    #[test]
    fn test_cli_config_can_disable_color() {
        let display = DisplayConfig {
            color: false,
            ..DisplayConfig::default()
        };
        assert!(!parse(&[]).report_options(&display).color);
    }

    #[test]
    fn test_cli_help_and_unknown_flag() {
        let err = Cli::try_parse_from(["qfree", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);

        let err = Cli::try_parse_from(["qfree", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_ne!(err.exit_code(), 0);
    }
}
