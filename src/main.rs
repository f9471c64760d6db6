mod commands;
mod domain;
mod services;

use crate::commands::base_commands::{CliArgs, Commands};
use crate::commands::report_format::format_forecast_report;
use crate::domain::model::ForecastConfig;
use crate::services::forecast::forecast_from_workbook_file;
use clap::{CommandFactory, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() {
    let args = CliArgs::parse();
    match args.command {
        Commands::Forecast {
            input,
            output,
            trials,
            run_date,
            seed,
        } => {
            let run_date = match chrono::NaiveDate::parse_from_str(&run_date, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    eprintln!("Invalid run date {run_date:?}: {e}");
                    return;
                }
            };

            let config = ForecastConfig {
                trials,
                ..ForecastConfig::default()
            };
            let run = match seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    forecast_from_workbook_file(&input, &output, run_date, &config, &mut rng)
                }
                None => {
                    let mut rng = rand::thread_rng();
                    forecast_from_workbook_file(&input, &output, run_date, &config, &mut rng)
                }
            };
            let run = match run {
                Ok(run) => run,
                Err(e) => {
                    eprintln!("Failed to forecast revenue: {e}");
                    return;
                }
            };

            let yaml = match serde_yaml::to_string(&run.report) {
                Ok(contents) => contents,
                Err(e) => {
                    eprintln!("Failed to serialize forecast output: {e:?}");
                    return;
                }
            };

            if let Err(e) = std::fs::write(&output, yaml) {
                eprintln!("Failed to write forecast output: {e:?}");
                return;
            }

            println!("{}", format_forecast_report(&run.report));
            println!();
            println!("Forecast report written to {output}");
            println!("Band charts written to {output}.mixed.png and {output}.objective.png");
        }
        Commands::Completions { shell } => {
            let mut cmd = CliArgs::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }
}
