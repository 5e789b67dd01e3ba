use clap::{Parser, Subcommand};
use sheet_insights::Result;
use sheet_insights::commands::{analyze_column, ask_question, chat, show_stats, summarize_file};
use sheet_insights::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheet-insights")]
#[command(about = "Statistics and natural-language answers about spreadsheet data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding server, chat model and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Print descriptive statistics for a CSV file
    Stats {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Ask one question about a CSV file
    Ask {
        /// Path to the CSV file
        file: PathBuf,
        /// The question to answer
        question: String,
    },
    /// Generate key insights about a CSV file
    Summarize {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Analyze a single column of a CSV file
    Column {
        /// Path to the CSV file
        file: PathBuf,
        /// Name of the column, as written in the header
        name: String,
    },
    /// Start an interactive question session over a CSV file
    Chat {
        /// Path to the CSV file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Stats { file } => {
            show_stats(&file)?;
        }
        Commands::Ask { file, question } => {
            ask_question(&file, &question)?;
        }
        Commands::Summarize { file } => {
            summarize_file(&file)?;
        }
        Commands::Column { file, name } => {
            analyze_column(&file, &name)?;
        }
        Commands::Chat { file } => {
            chat(&file)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn stats_command() {
        let cli = Cli::try_parse_from(["sheet-insights", "stats", "sales.csv"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Stats { file } = parsed.command {
                assert_eq!(file, PathBuf::from("sales.csv"));
            } else {
                panic!("expected stats command");
            }
        }
    }

    #[test]
    fn ask_command_with_question() {
        let cli = Cli::try_parse_from([
            "sheet-insights",
            "ask",
            "sales.csv",
            "what is the total revenue",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { file, question } = parsed.command {
                assert_eq!(file, PathBuf::from("sales.csv"));
                assert_eq!(question, "what is the total revenue");
            } else {
                panic!("expected ask command");
            }
        }
    }

    #[test]
    fn ask_requires_question() {
        let cli = Cli::try_parse_from(["sheet-insights", "ask", "sales.csv"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn column_command() {
        let cli = Cli::try_parse_from(["sheet-insights", "column", "sales.csv", "Revenue"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Column { name, .. } = parsed.command {
                assert_eq!(name, "Revenue");
            } else {
                panic!("expected column command");
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["sheet-insights", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["sheet-insights", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["sheet-insights", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
