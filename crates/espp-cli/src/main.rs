mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::espp::{CalculateArgs, PriceChangeArgs, SalePriceArgs, ValidateArgs};

/// After-tax outcome of an ESPP disqualifying disposition
#[derive(Parser)]
#[command(
    name = "espp",
    version,
    about = "After-tax outcome of an ESPP disqualifying disposition",
    long_about = "Computes purchase price, share count, discount income, tax, profit and \
                  percentage return for one Employee Stock Purchase Plan lot sold before \
                  the qualifying holding period, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the outcome of selling one ESPP lot
    Calculate(CalculateArgs),
    /// Check an ESPP input and list every invalid field
    Validate(ValidateArgs),
    /// Percent move between purchase-date and sale-date market values
    PriceChange(PriceChangeArgs),
    /// Sale-date market value implied by a percent move
    SalePrice(SalePriceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::espp::run_calculate(args),
        Commands::Validate(args) => commands::espp::run_validate(args),
        Commands::PriceChange(args) => commands::espp::run_price_change(args),
        Commands::SalePrice(args) => commands::espp::run_sale_price(args),
        Commands::Version => {
            println!("espp {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
