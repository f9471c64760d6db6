use chrono::Local;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast twelve months of revenue from a workbook YAML
    Forecast {
        /// Workbook YAML file
        #[arg(short, long)]
        input: String,
        /// Output YAML file
        #[arg(short, long)]
        output: String,
        /// Number of simulation trials
        #[arg(short = 'n', long, default_value_t = 1000)]
        trials: usize,
        /// Run date deciding which months count as closed (YYYY-MM-DD)
        #[arg(short, long, default_value_t = default_run_date())]
        run_date: String,
        /// Seed for reproducible simulation runs
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn default_run_date() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}
