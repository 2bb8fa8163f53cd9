//! Command-line front end for the messenger backend.
//!
//! Validates input with the same rules as every other front end, sends the
//! request, and renders the resulting outcome.

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use log::LevelFilter;
use log::debug;
use messenger_lib::ClientConfig;
use messenger_lib::MessengerClient;
use messenger_lib::Outcome;
use messenger_lib::api::username_taken_hint;
use messenger_lib::auth::StaticTokenProvider;
use messenger_lib::validation::LoginForm;
use messenger_lib::validation::RegistrationForm;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::TermLogger;
use simplelog::TerminalMode;

const FIX_ERRORS_MESSAGE: &str = "Please fix the errors below before submitting";

#[derive(Parser)]
#[command(name = "messenger")]
#[command(version, about = "Messenger account client", long_about = None)]
struct Cli {
    /// Backend base URL (overrides MESSENGER_API_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print outcomes as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is up
    Health,

    /// Create an account
    Register {
        /// Username
        #[arg(short, long)]
        login: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Password confirmation (defaults to the password)
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Sign in and print the session token
    Login {
        /// Username
        #[arg(short, long)]
        login: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Show the signed-in user
    Me {
        /// Bearer token returned by `login`
        #[arg(short, long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let config = match &cli.url {
        Some(url) => ClientConfig::from_env_with_base_url(url)?,
        None => ClientConfig::from_env()?,
    };
    debug!("Using backend at {}", config.base_url());

    let ok = match cli.command {
        Commands::Health => {
            let client = MessengerClient::from_config(config)?;
            render(&client.health().await, cli.json, |status| {
                format!("Server is {}", status.status)
            })?
        }
        Commands::Register {
            login,
            password,
            confirm,
        } => {
            let confirm = confirm.unwrap_or_else(|| password.clone());
            let form = RegistrationForm::new(login, password, confirm);
            let validation = form.validate();
            if !validation.is_valid() {
                eprintln!("{}", FIX_ERRORS_MESSAGE);
                for error in validation.field_errors() {
                    eprintln!("  {}", error);
                }
                std::process::exit(2);
            }

            let credentials = form.into_credentials()?;
            let client = MessengerClient::from_config(config)?;
            let outcome = client.register(&credentials).await;
            if let Some(hint) = username_taken_hint(&outcome) {
                eprintln!("  {}", hint);
            }
            render(&outcome, cli.json, |user| {
                format!("Account created for {} (id {})", user.login, user.id)
            })?
        }
        Commands::Login { login, password } => {
            let form = LoginForm::new(login, password);
            let validation = form.validate();
            if !validation.is_valid() {
                eprintln!("Please fill in all required fields");
                for error in validation.field_errors() {
                    eprintln!("  {}", error);
                }
                std::process::exit(2);
            }

            let credentials = form.into_credentials()?;
            let client = MessengerClient::from_config(config)?;
            render(&client.login(&credentials).await, cli.json, |session| {
                match &session.token {
                    Some(token) => format!("Signed in as {}\n{}", session.login, token),
                    None => format!("Signed in as {}", session.login),
                }
            })?
        }
        Commands::Me { token } => {
            let client = MessengerClient::from_config(config)?
                .with_token_provider(StaticTokenProvider::new(token));
            render(&client.current_user().await, cli.json, |user| {
                format!("{} (id {})", user.login, user.id)
            })?
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Prints an outcome and returns whether it succeeded.
fn render<T, F>(outcome: &Outcome<T>, json: bool, describe: F) -> Result<bool>
where
    T: serde::Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(outcome.success);
    }

    if outcome.success {
        match &outcome.data {
            Some(data) => println!("{}", describe(data)),
            None => println!("{}", outcome.message),
        }
    } else {
        eprintln!("{}", outcome.error_message());
        if let Some(cause) = &outcome.transport_error {
            debug!("Transport error: {}", cause);
        }
    }

    Ok(outcome.success)
}
