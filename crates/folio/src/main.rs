mod app;
mod canvas;
mod contact;
mod logging;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use folio_config::Config;

use crate::app::App;

#[derive(Parser)]
#[command(name = "folio", version, about = "Animated terminal backdrop and contact form handler")]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the animated backdrop (the default).
    Run {
        /// Seed the animations for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Handle one contact form submission read as JSON.
    Contact {
        /// Read the request body from a file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, env = "HCAPTCHA_SECRET_KEY", hide_env_values = true)]
        captcha_secret: Option<String>,
    },
    /// Show the config file location.
    Config {
        /// Write the default config if no file exists yet.
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Run { seed: None });
    if matches!(command, Commands::Run { .. }) {
        logging::init_file(cli.verbose);
    } else {
        logging::init_stderr(cli.verbose);
    }

    let mut config = Config::load(cli.config.as_deref()).wrap_err("could not load config")?;

    match command {
        Commands::Run { seed } => {
            if seed.is_some() {
                config.seed = seed;
            }
            run_backdrop(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Contact {
            file,
            captcha_secret,
        } => {
            if captcha_secret.is_some() {
                config.contact.captcha_secret = captcha_secret;
            }
            let response = contact::run(&config.contact, file.as_deref())?;
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Config { init } => {
            show_config(cli.config.as_deref(), init)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_backdrop(config: &Config) -> Result<()> {
    if !io::stdout().is_terminal() {
        tracing::warn!("stdout is not a terminal, nothing to draw on");
        eprintln!("folio: stdout is not a terminal, nothing to draw on");
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = match terminal.size() {
        Ok(size) => App::new(config, size).run(terminal),
        Err(e) => Err(e.into()),
    };
    ratatui::restore();
    result
}

fn show_config(explicit: Option<&Path>, init: bool) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => folio_config::default_config_path()
            .ok_or_else(|| eyre!("no home directory to keep a config in"))?,
    };

    if init {
        if path.exists() {
            println!("{} already exists", path.display());
        } else {
            Config::default().save(&path)?;
            println!("wrote {}", path.display());
        }
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
