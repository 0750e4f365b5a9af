//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::pipeline::analysis::ConfidenceModel;

#[derive(Parser, Debug)]
#[command(name = "ownbioscan", version)]
#[command(about = "Cholesterol test-strip colorimetric analyzer with a local result history")]
#[command(
    after_help = "Environment:\n  OWNBIOSCAN_DATA_DIR   Data directory (default ~/OwnBioScan)\n  RUST_LOG              Log filter"
)]
pub struct Cli {
    /// Directory holding history.db
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Keep history in memory only for this run
    #[arg(long, global = true, default_value_t = false)]
    pub memory: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a strip photo (PNG/JPEG file, or a text file holding a data URL)
    Analyze {
        image: PathBuf,
        /// Do not record the result in the history
        #[arg(long, default_value_t = false)]
        no_save: bool,
        #[arg(long, value_enum, default_value_t = ConfidenceArg::Linear)]
        confidence: ConfidenceArg,
    },
    /// Write a synthetic reference strip for a calibration level
    Reference {
        level: u32,
        #[arg(short, long)]
        output: PathBuf,
        /// Per-channel jitter amplitude simulating a camera capture
        #[arg(long, default_value_t = 0)]
        noise: u8,
        /// Seed for the noise generator
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List calibration levels
    Levels,
    /// Manage the result history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Compare a stored result with the rest of the history
    Compare { id: String },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    List,
    Show { id: String },
    Delete { id: String },
    Clear,
    Stats,
    /// Export the history as JSON (stdout unless -o is given)
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge results from a JSON export
    Import { file: PathBuf },
    /// Add the demonstration records
    SeedSamples,
    /// Remove the demonstration records
    ClearSamples,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceArg {
    Linear,
    Exponential,
}

impl From<ConfidenceArg> for ConfidenceModel {
    fn from(arg: ConfidenceArg) -> Self {
        match arg {
            ConfidenceArg::Linear => ConfidenceModel::Linear,
            ConfidenceArg::Exponential => ConfidenceModel::ExponentialDecay,
        }
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
    fn parses_analyze_with_options() {
        let cli = Cli::try_parse_from([
            "ownbioscan",
            "--json",
            "analyze",
            "strip.jpg",
            "--no-save",
            "--confidence",
            "exponential",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Analyze { image, no_save, confidence } => {
                assert_eq!(image, PathBuf::from("strip.jpg"));
                assert!(no_save);
                assert_eq!(ConfidenceModel::from(confidence), ConfidenceModel::ExponentialDecay);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_reference() {
        let cli = Cli::try_parse_from([
            "ownbioscan", "reference", "220", "-o", "out.png", "--noise", "4", "--seed", "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Reference { level, output, noise, seed } => {
                assert_eq!(level, 220);
                assert_eq!(output, PathBuf::from("out.png"));
                assert_eq!(noise, 4);
                assert_eq!(seed, Some(9));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ownbioscan", "history", "list", "--memory", "--data-dir", "/tmp/x"]).unwrap();
        assert!(cli.memory);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Commands::History { command: HistoryCommand::List }));
    }

    #[test]
    fn history_subcommands() {
        let cli = Cli::try_parse_from(["ownbioscan", "history", "seed-samples"]).unwrap();
        assert!(matches!(cli.command, Commands::History { command: HistoryCommand::SeedSamples }));
        let cli = Cli::try_parse_from(["ownbioscan", "history", "export"]).unwrap();
        assert!(matches!(cli.command, Commands::History { command: HistoryCommand::Export { output: None } }));
    }

    #[test]
    fn rejects_unknown_confidence_model() {
        assert!(Cli::try_parse_from(["ownbioscan", "analyze", "a.png", "--confidence", "cubic"]).is_err());
    }

    #[test]
    fn reference_requires_output() {
        assert!(Cli::try_parse_from(["ownbioscan", "reference", "200"]).is_err());
    }
}
