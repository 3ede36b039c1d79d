use boxup_cli::config::{AppConfig, CONFIG_KEYS, ConfigManager, get_config};
use boxup_cli::error::{CliError, CliResult};
use boxup_cli::orchestrators::{RunContext, UpdateFlags, UpdateOrchestrator};
use boxup_cli::terminal;
use boxup_core::ProjectOptions;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "boxup")]
#[command(author, version, about = "Boxup - keep project packages and lockfiles up to date", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update packages in your project
    #[command(
        long_about = "Update one, many, or all packages in your project. \
        If no packages are specified, all packages will be updated. \
        Legacy non-versioned packages are converted to @latest versioned \
        packages resolved to their current version."
    )]
    Update(UpdateArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Packages to update (all packages when omitted)
    #[arg(value_name = "PACKAGE")]
    packages: Vec<String>,

    /// Sync all lockfile dependencies across projects in the working directory.
    /// Dependencies sync to the latest local version.
    #[arg(long = "sync-lock")]
    sync: bool,

    /// Update all projects in the working directory, recursively
    #[arg(long)]
    all_projects: bool,

    /// Ensure every lockfile has a store_path for each system
    #[arg(long)]
    paths_in_lockfile: bool,

    /// Project directory to update
    #[arg(short = 'c', long = "config", value_name = "DIR")]
    config: Option<PathBuf>,

    /// Project environment (dev or prod)
    #[arg(short, long, value_name = "ENV")]
    environment: Option<String>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., project.environment)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., discovery.max_depth)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;

    // Initialize logging based on debug flag
    if debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Info)
            .filter_module("boxup_core", log::LevelFilter::Debug)
            .filter_module("boxup_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if let Err(error) = run(cli).await {
        eprint!("{}", error.format_for_user(debug));
        std::process::exit(error.exit_code().into());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Update(args) => {
            let config = load_config()?;
            update_command(config, args).await
        }
        Commands::Config { command } => {
            load_config()?;
            config_command(command)
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

fn load_config() -> CliResult<AppConfig> {
    let config = get_config()?;
    colored::control::set_override(terminal::should_use_color(config.output.color_enabled));
    Ok(config)
}

async fn update_command(mut config: AppConfig, args: UpdateArgs) -> CliResult<()> {
    log::debug!("Starting update command with {args:?}");
    config.apply_cli_overrides(args.config, args.environment);

    let working_dir = std::env::current_dir().map_err(|e| {
        CliError::filesystem(&format!("Failed to read the working directory: {e}"))
    })?;
    let project_dir = match &config.project.dir {
        Some(dir) => working_dir.join(dir),
        None => working_dir.clone(),
    };
    let options = ProjectOptions::new(project_dir).with_environment(&config.project.environment);

    let workspace = config.workspace()?;
    let orchestrator = UpdateOrchestrator::new(workspace, RunContext::new(working_dir, options));
    let flags = UpdateFlags {
        packages: args.packages,
        sync: args.sync,
        all_projects: args.all_projects,
        paths_in_lockfile: args.paths_in_lockfile,
    };

    // Dropping the orchestration future on Ctrl-C cancels the in-flight operation
    tokio::select! {
        result = orchestrator.run(flags) => result.map_err(CliError::from),
        _ = tokio::signal::ctrl_c() => Err(CliError::interrupted()),
    }
}

fn config_command(command: ConfigCommand) -> CliResult<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Get { key } => {
            check_key(&key)?;
            let value = manager.get(&key)?;
            println!("{value}");
        }
        ConfigCommand::Set { key, value } => {
            check_key(&key)?;
            manager.set(&key, &value)?;
            eprintln!("{}", format!("Set {key} = {value}").green());
            eprintln!(
                "Configuration saved to: {}",
                manager.get_config_path().display()
            );
        }
        ConfigCommand::List => {
            let items = manager.list()?;
            eprintln!("{}", "Configuration:".bold().blue());
            eprintln!("Config file: {}", manager.get_config_path().display());
            eprintln!();

            let mut sections: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
            for (key, value) in items {
                let (section, rest) = key.split_once('.').unwrap_or(("general", key.as_str()));
                sections
                    .entry(section.to_string())
                    .or_default()
                    .push((rest.to_string(), value));
            }

            for (section, items) in sections {
                println!("[{section}]");
                for (key, value) in items {
                    println!("  {} = {}", key.cyan(), value);
                }
                println!();
            }
        }
    }

    Ok(())
}

fn check_key(key: &str) -> CliResult<()> {
    if CONFIG_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(CliError::unknown_config_key(key, CONFIG_KEYS))
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
