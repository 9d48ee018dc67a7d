use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use overdash::chart::ChartKind;
use overdash::page::{self, PageMode};
use overdash::{Config, Dashboard, Filter, EVERYTHING};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "overdash")]
#[command(author, version, about = "Dashboard of accidental drug-overdose deaths in Connecticut, 2012-2018")]
struct Cli {
    /// Config file (default: $OVERDASH_CONFIG, then the nearest overdash.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive dashboard server
    Serve {
        /// Port to listen on (default from config: 8050)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
    },

    /// Write a self-contained copy of the dashboard page
    Render {
        /// Output HTML file
        #[arg(short, long, default_value = "overdash.html")]
        output: PathBuf,
    },

    /// Print a chart specification (Vega-Lite JSON)
    Chart {
        /// Chart to build: demographics or race
        kind: ChartKind,

        /// Drug to filter on
        #[arg(long, default_value = EVERYTHING)]
        drug: String,

        /// Race to filter on
        #[arg(long)]
        race: Option<String>,

        /// Place of death to filter on
        #[arg(long)]
        place: Option<String>,

        /// Print a standalone HTML document instead of JSON
        #[arg(long)]
        html: bool,
    },

    /// Print total deaths and deaths per drug
    Summary,

    /// Check that every described drug has a column in the overdose table
    Check,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Command::Completion { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "overdash", &mut std::io::stdout());
        return;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    config.logging.init();

    match run(cli.command, &config) {
        Ok(code) => std::process::exit(code),
        Err(e) => fail(&*e),
    }
}

fn fail(e: &dyn std::error::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    std::process::exit(1);
}

/// Run a data-backed command, returning the process exit code
fn run(command: Command, config: &Config) -> Result<i32, Box<dyn std::error::Error>> {
    let dashboard = Dashboard::load(config)?;

    match command {
        Command::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            overdash::serve::start_dashboard_server(dashboard, &host, port)?;
        }

        Command::Render { output } => {
            let html = page::render(&dashboard, PageMode::Static)?;
            std::fs::write(&output, html)?;
            eprintln!("{}", format!("Dashboard saved: {}", output.display()).green());
        }

        Command::Chart {
            kind,
            drug,
            race,
            place,
            html,
        } => {
            let mut filter = Filter::drug(&drug);
            if let Some(race) = race.as_deref() {
                filter = filter.with_race(race);
            }
            if let Some(place) = place.as_deref() {
                filter = filter.with_place(place);
            }
            let spec = kind.build(dashboard.overdoses(), &filter, dashboard.theme())?;
            if html {
                println!("{}", spec.to_html()?);
            } else {
                println!("{}", spec.to_json()?);
            }
        }

        Command::Summary => {
            let counts = dashboard.overdoses().involvement_counts();
            let width = counts.iter().map(|(d, _)| d.len()).max().unwrap_or(0);

            println!("{}", "Overdash summary".bold());
            println!("  Total deaths: {}", dashboard.total_deaths());
            println!("  Described drugs: {}", dashboard.descriptions().len());
            println!();
            for (drug, deaths) in counts {
                println!("  {:<width$}  {:>6}", drug, deaths, width = width);
            }
        }

        Command::Check => {
            let missing = dashboard.missing_drug_columns();
            if missing.is_empty() {
                println!(
                    "{} {} described drugs, {} drug columns",
                    "OK".green().bold(),
                    dashboard.descriptions().len(),
                    dashboard.overdoses().drugs().len()
                );
            } else {
                for drug in &missing {
                    println!("{} '{}' has no column in the overdose table", "Missing:".yellow().bold(), drug);
                }
                return Ok(1);
            }
        }

        Command::Completion { .. } => {}
    }

    Ok(0)
}
