use std::path::PathBuf;

use aboutme::{
    env::{env_vars, export_lines},
    net::my_ip,
    Config, Me,
};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(name = "aboutme")]
#[command(bin_name = "aboutme")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// The label selector picking the namespaces searched before the fallback.
    /// Default is "name=deis".
    /// Example: "name=workers,tier in (batch)"
    #[arg(long, global = true)]
    selector: Option<String>,

    /// The namespace that is always searched last.
    /// Default is "default".
    #[arg(long, global = true)]
    fallback_namespace: Option<String>,

    /// The network interface inspected by `ip`.
    /// Default is "eth0".
    #[arg(long, global = true)]
    interface: Option<String>,

    /// Fail if the pod cannot be found instead of continuing with what the environment provides.
    #[arg(long, global = true)]
    strict: bool,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print everything the pod knows about itself as JSON.
    Show,
    /// Print the MY_* variables as shell export lines, for `eval "$(aboutme env)"`.
    Env,
    /// Run a command with the MY_* variables in its environment.
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Print the IPv4 address of the local interface.
    Ip,
}

/// Merge the configuration file (if any) with the CLI flags. Flags win.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration file {:?}", path))?,
        None => Config::default(),
    };

    if let Some(selector) = &args.selector {
        config.selector = selector.clone();
    }
    if let Some(namespace) = &args.fallback_namespace {
        config.fallback_namespace = namespace.clone();
    }
    if let Some(interface) = &args.interface {
        config.interface = interface.clone();
    }
    Ok(config)
}

/// Build the Me for this pod.
///
/// A pod that cannot be found is only an error with `strict`; otherwise the seed
/// values from the environment are used on their own.
async fn discover(config: &Config, strict: bool) -> anyhow::Result<Me> {
    let options = config.search_options();
    let mut me = Me::from_env(&options).context("Failed to read the pod environment")?;

    let resolved = match kube::Client::try_default().await {
        Ok(client) => me.resolve(&client, &options).await,
        Err(e) => Err(e.into()),
    };

    settle(me, resolved, strict)
}

/// Keep the seed-only Me when resolution failed, unless `strict` is set.
fn settle(me: Me, resolved: aboutme::Result<()>, strict: bool) -> anyhow::Result<Me> {
    match resolved {
        Ok(()) => Ok(me),
        Err(e) if strict => {
            Err(e).with_context(|| format!("Failed to resolve pod {:?}", me.name()))
        }
        Err(e) => {
            tracing::warn!("Continuing without details from the API server: {}", e);
            Ok(me)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        // stdout is reserved for the command output.
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Parsed CLI arguments: {:?}", args);

    let config = load_config(&args)?;
    debug!("Using configuration: {:?}", config);

    match args.command {
        Command::Show => {
            let me = discover(&config, args.strict).await?;
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
        Command::Env => {
            let me = discover(&config, args.strict).await?;
            print!("{}", export_lines(&me));
        }
        Command::Exec { command } => {
            let me = discover(&config, args.strict).await?;
            let (program, program_args) = command.split_first().context("No command given")?;

            debug!("Running {:?} as pod {:?}", program, me.name());
            let status = tokio::process::Command::new(program)
                .args(program_args)
                .envs(env_vars(&me))
                .status()
                .await
                .with_context(|| format!("Failed to run {:?}", program))?;

            std::process::exit(status.code().unwrap_or(1));
        }
        Command::Ip => {
            let ip = my_ip(&config.interface)?;
            println!("{}", ip);
        }
    }

    Ok(())
}
