use clap::Parser;
use numby::{api, NumbyError, Session};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Expressions to evaluate in order; reads stdin when empty
    exprs: Vec<String>,

    /// Path to config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Locale code, e.g. `de` or `fr`
    #[arg(short, long)]
    locale: Option<String>,

    /// Download current currency rates before evaluating
    #[arg(long)]
    update_rates: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn open_session(cli: &Cli) -> Result<Session, NumbyError> {
    let session = Session::new();
    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => api::default_config_path().ok(),
    };
    if let Some(path) = config_path {
        if path.exists() {
            session.load_config(&path)?;
        } else if cli.config.is_some() {
            return Err(NumbyError::InvalidInput(format!(
                "config file {} does not exist",
                path.display()
            )));
        } else {
            debug!("no config at {}", path.display());
        }
    }

    // explicit flag wins over the config file
    if let Some(locale) = &cli.locale {
        api::set_locale(locale)?;
    }

    if cli.update_rates {
        let date = session.update_currency_rates()?;
        info!("currency rates updated to {}", date);
    }
    Ok(session)
}

fn print_evaluation(session: &Session, input: &str) -> bool {
    match session.evaluate(input) {
        Ok(evaluation) => {
            println!("{}", evaluation.formatted);
            true
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}

fn repl(session: &Session) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            "" => continue,
            ":clear" => session.clear_history(),
            ":history" => {
                for entry in session.history() {
                    writeln!(stdout, "{:>4}  {} = {}", entry.sequence, entry.input, entry.formatted)?;
                }
            }
            _ => {
                print_evaluation(session, input);
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<bool, NumbyError> {
    let session = open_session(cli)?;
    if cli.exprs.is_empty() {
        repl(&session).map_err(|e| NumbyError::InvalidInput(format!("stdin: {}", e)))?;
        return Ok(true);
    }
    let mut all_ok = true;
    for expr in &cli.exprs {
        all_ok &= print_evaluation(&session, expr);
    }
    Ok(all_ok)
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
