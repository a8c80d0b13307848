use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vrutwin_core::facility::FacilityType;

#[derive(Parser, Debug)]
#[command(name = "vrutwin", version, about = "VRU digital twin simulator")]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the twin and print the final state
    Run(RunArgs),
    /// List facility types
    Facilities,
    /// Print the effective configuration as JSON
    Config {
        /// Config file to load instead of the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Facility type (gas or storage); overrides the config file
    #[arg(short, long)]
    pub facility: Option<FacilityType>,

    /// Seconds of simulated time
    #[arg(short, long, default_value_t = 28.0)]
    pub seconds: f64,

    /// Run against the wall clock instead of fast-forwarding
    #[arg(long)]
    pub realtime: bool,

    /// Seed for the status log
    #[arg(long)]
    pub seed: Option<u64>,

    /// Config file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::parse_from(["vrutwin", "run", "--facility", "storage", "-s", "5", "--json"]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.facility, Some(FacilityType::Storage));
                assert_eq!(args.seconds, 5.0);
                assert!(args.json);
                assert!(!args.realtime);
            }
            other => panic!("Expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_facility() {
        assert!(Cli::try_parse_from(["vrutwin", "run", "--facility", "refinery"]).is_err());
    }
}
