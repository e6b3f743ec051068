// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use registration_form::{
    Driver, DriverCommand, FieldName, FieldValue, FormConfig, LocationCatalog, PasswordStrength,
    RegistrationForm, Validator,
};

#[derive(Debug, Parser)]
#[command(name = "registration-form", version, about = "Registration form with cascading location selectors")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fill in the form interactively (default)
    Ui,
    /// Print the country → state → city catalog
    Catalog,
    /// Classify a password
    Strength { password: String },
    /// Check a single field value
    Validate { field: String, value: String },
    /// Replay a JSON list of driver commands and print the final view
    Run { script: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FormConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => run_ui_mode(&config)?,
        Command::Catalog => print_catalog(&config)?,
        Command::Strength { password } => print_strength(&password),
        Command::Validate { field, value } => validate_field(&config, &field, value)?,
        Command::Run { script } => run_script(&config, &script)?,
    }

    Ok(())
}

fn load_catalog(config: &FormConfig) -> Result<LocationCatalog> {
    let catalog = match &config.catalog_path {
        Some(path) => LocationCatalog::from_file(path)
            .with_context(|| format!("Failed to load catalog: {:?}", path))?,
        None => LocationCatalog::builtin().context("Built-in catalog is invalid")?,
    };
    Ok(catalog)
}

fn print_catalog(config: &FormConfig) -> Result<()> {
    let catalog = load_catalog(config)?;

    for country in catalog.list_countries() {
        println!("{}", country);
        for state in catalog.list_states(country) {
            println!("  {}: {}", state, catalog.list_cities(country, state).join(", "));
        }
    }

    Ok(())
}

fn print_strength(password: &str) {
    let strength = PasswordStrength::evaluate(password);
    match strength.level {
        Some(_) => println!(
            "{} ({}/{}, {}%)",
            strength.label(),
            strength.score,
            PasswordStrength::MAX_SCORE,
            strength.fill_percent()
        ),
        None => println!("(empty)"),
    }
}

fn validate_field(config: &FormConfig, field: &str, value: String) -> Result<()> {
    let name: FieldName = field.parse()?;
    let validator = Validator::with_disposable_domains(config.disposable_domains.clone());
    let value = if name == FieldName::Terms {
        FieldValue::Flag(matches!(value.as_str(), "true" | "on" | "yes" | "1"))
    } else {
        FieldValue::Text(value)
    };

    match validator.check_value(name, value) {
        Ok(()) => println!("✓ {} is valid", name),
        Err(violation) => {
            println!("✗ {}", violation);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn run_script(config: &FormConfig, script: &PathBuf) -> Result<()> {
    let raw = fs::read_to_string(script)
        .with_context(|| format!("Failed to read driver script: {:?}", script))?;
    let commands: Vec<DriverCommand> =
        serde_json::from_str(&raw).context("Failed to parse driver script JSON")?;

    let form = RegistrationForm::from_config(config).context("Failed to build form")?;
    let mut driver = Driver::new(form);

    for (step, command) in commands.iter().enumerate() {
        driver
            .apply(command)
            .with_context(|| format!("Step {} failed: {:?}", step + 1, command))?;
    }

    println!("{}", serde_json::to_string_pretty(&driver.view())?);
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &FormConfig) -> Result<()> {
    let form = RegistrationForm::from_config(config).context("Failed to build form")?;

    let mut app = ui::App::new(form);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &FormConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or drive the form headless: registration-form run <script.json>");
    std::process::exit(1);
}
