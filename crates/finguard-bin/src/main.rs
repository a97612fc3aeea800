// ============================
// crates/finguard-bin/src/main.rs
// ============================
//! Command-line front end for the FinGuard security layer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finguard_lib::{
    audit::DEFAULT_AUDIT_PAGE,
    auth::validate_password_strength,
    config::Settings,
    validation::{validate_email, SignInForm, SignUpForm, SignUpInput},
    AppState,
};

#[derive(Parser)]
#[command(name = "finguard", version, about = "Account security checks for FinGuard")]
struct Cli {
    /// Settings file; defaults to ./finguard.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a password
    Strength { password: String },

    /// Check an email address
    Email { address: String },

    /// Register an account.
    ///
    /// Accounts live in memory and are gone when the command exits; use
    /// `sign-in --register` to register and sign in within one run.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "NGN")]
        currency: String,
    },

    /// Attempt to sign in, optionally several times to exercise the limiter.
    ///
    /// Without `--register` no account exists, so every attempt is rejected.
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Register the account first, with placeholder names
        #[arg(long)]
        register: bool,
        #[arg(long, default_value_t = 1)]
        attempts: u32,
    },

    /// Show the most recent audit entries
    Audit {
        #[arg(long, default_value_t = DEFAULT_AUDIT_PAGE)]
        limit: usize,
    },
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));

    let json = settings.json_logs;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    init_tracing(&settings);

    let state = AppState::open(settings)?;
    let result = run(&state, cli.command).await;

    // let the writer drain before the runtime goes away
    state.audit.flush().await;
    result
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Strength { password } => {
            let strength = validate_password_strength(&password);
            println!("{} ({}/4)", strength.label(), strength.score);
            for hint in &strength.feedback {
                println!("  - {hint}");
            }
            println!("valid: {}", strength.is_valid);
        },
        Command::Email { address } => match validate_email(&address) {
            Ok(_) => println!("{address}: ok"),
            Err(err) => println!("{address}: {err}"),
        },
        Command::Register {
            email,
            password,
            confirm_password,
            first_name,
            last_name,
            currency,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            let form = SignUpForm::from_input(SignUpInput {
                email: &email,
                password: &password,
                confirm_password: &confirm_password,
                first_name: &first_name,
                last_name: &last_name,
                preferred_currency: &currency,
            });
            match state.gateway.sign_up(&form).await {
                Ok(user_id) => println!("registered {user_id}"),
                Err(err) => println!("sign-up failed [{}]: {}", err.error_code(), err.sanitized_message()),
            }
        },
        Command::SignIn {
            email,
            password,
            register,
            attempts,
        } => {
            if register {
                let form = SignUpForm::from_input(SignUpInput {
                    email: &email,
                    password: &password,
                    confirm_password: &password,
                    first_name: "FinGuard",
                    last_name: "User",
                    preferred_currency: "NGN",
                });
                if let Err(err) = state.gateway.sign_up(&form).await {
                    println!("sign-up failed [{}]: {}", err.error_code(), err.sanitized_message());
                }
            }
            let form = SignInForm::from_input(&email, &password);
            for attempt in 1..=attempts {
                match state.gateway.sign_in(&form).await {
                    Ok(user_id) => println!("#{attempt}: signed in as {user_id}"),
                    Err(err) => println!(
                        "#{attempt}: [{}] {}",
                        err.error_code(),
                        err.sanitized_message()
                    ),
                }
            }
        },
        Command::Audit { limit } => {
            for entry in state.audit.get_audit_logs(limit).await {
                println!("{}", serde_json::to_string(&entry)?);
            }
        },
    }
    Ok(())
}
