use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentline")]
#[command(about = "agentline CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook gateway: LINE webhooks and prompt requests forwarded to the agent runtime.
    Gateway {
        /// Config file path (default: AGENTLINE_CONFIG_PATH or ~/.agentline/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 15151)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run the local agent entrypoint (POST /invocations, GET /ping) backed by the configured model.
    Entrypoint {
        /// Config file path (default: AGENTLINE_CONFIG_PATH or ~/.agentline/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send one prompt to the agent runtime and print the normalized reply.
    Invoke {
        /// Config file path (default: AGENTLINE_CONFIG_PATH or ~/.agentline/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Prompt text
        #[arg(default_value = lib::gateway::DEFAULT_PROMPT)]
        prompt: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("agentline {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Entrypoint { config, port }) => {
            if let Err(e) = run_entrypoint(config, port).await {
                log::error!("entrypoint failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Invoke { config, prompt }) => {
            if let Err(e) = run_invoke(config, prompt).await {
                log::error!("invoke failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_gateway(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    lib::gateway::run_gateway(config).await
}

async fn run_entrypoint(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.entrypoint.port = p;
    }
    log::info!(
        "starting entrypoint on {}:{} (config {})",
        config.entrypoint.bind,
        config.entrypoint.port,
        path.display()
    );
    lib::entrypoint::run_entrypoint(config).await
}

async fn run_invoke(config_path: Option<PathBuf>, prompt: String) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let runtime = match lib::config::resolve_runtime_arn(&config) {
        Some(arn) => {
            let region = config.agents.region.clone();
            Some(lib::runtime::AgentCoreRuntime::from_env(arn, region).await)
        }
        None => None,
    };
    let text = lib::runtime::call_agent_runtime(
        runtime.as_ref().map(|r| r as &dyn lib::runtime::AgentRuntime),
        &prompt,
    )
    .await?;
    println!("{}", text);
    Ok(())
}
