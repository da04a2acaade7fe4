//! KSeF Signer CLI
//!
//! Reads a JSON request (file or stdin), dispatches it to one of the
//! operations and prints the JSON response. Also manages the configuration
//! file holding default algorithms and XAdES switches.

use clap::{Parser, Subcommand};
use ksef_signer::{
    config::{ConfigManager, ServiceConfiguration},
    Dispatcher, LogObserver, Operation,
};
use miette::{Context, IntoDiagnostic, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ksef-signer")]
#[command(about = "RSA-OAEP encryption, XAdES XML signing and access-link signing")]
#[command(long_about = "
KSeF Signer - encryption and signing of KSeF payloads

Requests and responses are JSON documents; binary fields are base64.

EXAMPLES:
    # Encrypt a payload to a recipient certificate
    ksef-signer encrypt --request encrypt.json

    # Sign an XML document read from stdin
    ksef-signer sign-xml --request - < sign-xml.json

    # Sign an access link and write the response to a file
    ksef-signer sign-link --request link.json --output signed.json

    # Make ECDSA the default for links
    ksef-signer config set default_link_algorithm ecdsa_p256

ENVIRONMENT VARIABLES:
    RUST_LOG        Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user configuration directory)
    #[arg(long, global = true, value_name = "PATH", env = "KSEF_SIGNER_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a payload with RSA-OAEP under a certificate
    Encrypt(RequestArgs),

    /// Add an enveloped XAdES signature to an XML document
    SignXml(RequestArgs),

    /// Sign an access link
    SignLink(RequestArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(clap::Args)]
struct RequestArgs {
    /// JSON request file, or '-' for stdin
    #[arg(short, long, value_name = "FILE")]
    request: PathBuf,

    /// Write the JSON response here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Initialize default configuration
    Init,
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
    /// Print the configuration file location
    Path,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new().into_diagnostic()?,
    };

    // Read before the logger exists; errors resurface when the file is used.
    let file_verbose = config_manager
        .load_or_default()
        .is_ok_and(|config| config.verbose);
    let default_filter = if cli.verbose || file_verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Encrypt(args) => run_request(&config_manager, Operation::Encrypt, &args),
        Commands::SignXml(args) => run_request(&config_manager, Operation::SignXml, &args),
        Commands::SignLink(args) => run_request(&config_manager, Operation::SignLink, &args),
        Commands::Config(config_cmd) => {
            handle_config_command(&config_manager, config_cmd)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_request(
    config_manager: &ConfigManager,
    operation: Operation,
    args: &RequestArgs,
) -> Result<ExitCode> {
    let config = config_manager
        .load_or_default()
        .into_diagnostic()
        .wrap_err("Failed to load configuration")?;

    let body = read_request(&args.request)?;
    let dispatcher = Dispatcher::new(config, Arc::new(LogObserver));

    let (json, exit) = match dispatcher.handle_json(operation, &body) {
        Ok(response) => (response, ExitCode::SUCCESS),
        Err(error) => {
            log::error!(
                "{operation} failed with {} ({}): {}",
                error.error_code,
                error.http_status,
                error.message
            );
            let json = serde_json::to_value(&error).into_diagnostic()?;
            (json, ExitCode::FAILURE)
        }
    };

    let rendered = serde_json::to_string_pretty(&json).into_diagnostic()?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered + "\n")
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write response to {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(exit)
}

fn read_request(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .into_diagnostic()
            .wrap_err("Failed to read request from stdin")?;
        Ok(body)
    } else {
        std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read request file {}", path.display()))
    }
}

fn handle_config_command(config_manager: &ConfigManager, config_cmd: ConfigCommands) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => match config_manager.load() {
            Ok(config) => print_config(&config, config_manager.config_path()),
            Err(_) if !config_manager.config_path().exists() => {
                println!("📋 No configuration file found. Use 'config init' to create one.");
                print_config(&ServiceConfiguration::default(), config_manager.config_path());
            }
            Err(e) => return Err(e).into_diagnostic(),
        },

        ConfigCommands::Init => {
            let _config = config_manager.load_or_create_default().into_diagnostic()?;
            println!(
                "✅ Configuration initialized: {}",
                config_manager.config_path().display()
            );
            println!("   Edit the file to customize settings, or use 'config set' commands.");
        }

        ConfigCommands::Set { key, value } => {
            config_manager
                .update_value(&key, &value)
                .into_diagnostic()?;
            println!("✅ Configuration updated: {key} = {value}");
        }

        ConfigCommands::Path => {
            println!("{}", config_manager.config_path().display());
        }
    }

    Ok(())
}

fn print_config(config: &ServiceConfiguration, path: &Path) {
    println!("📋 Current Configuration:");
    println!("  XML signature algorithm: {}", config.default_xml_algorithm);
    println!("  Link signature algorithm: {}", config.default_link_algorithm);
    println!("  ECDSA encoding: {}", config.default_ecdsa_encoding);
    println!("  Extra link segments: {}", config.extra_link_segments);
    println!("  XAdES signing time: {}", config.xades.signing_time);
    println!(
        "  XAdES signing certificate: {}",
        config.xades.signing_certificate
    );
    println!("  Verbose: {}", config.verbose);
    println!("  Configuration file: {}", path.display());
}
