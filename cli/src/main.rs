use anyhow::Result;
use clap::Parser;
use corral_core::{agent, config, providers, sandbox, tools};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "corral")]
#[command(about = "corral - bounded tool-call agent with sandboxed code execution", long_about = None)]
struct Cli {
    /// Prompt to send to the model; asked interactively when omitted
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model to use, as 'provider/model'. The provider's API key must be
    /// set in the environment as '<PROVIDER>_API_KEY'
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum number of callbacks with tool use
    #[arg(long)]
    max_callbacks: Option<usize>,

    /// Reflect on the output to try to improve it
    #[arg(long)]
    reflect: bool,

    /// Execute code returned by the model in a docker sandbox
    #[arg(long, value_name = "BOOL")]
    execute_code: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corral_core=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = config::Config::load_or_init()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(max_callbacks) = cli.max_callbacks {
        config.max_callbacks = max_callbacks;
    }
    if cli.reflect {
        config.reflect = true;
    }
    if let Some(execute_code) = cli.execute_code {
        config.execute_code = execute_code;
    }

    let prompt = match cli.prompt {
        Some(prompt) => prompt,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Enter your prompt")
            .interact_text()?,
    };

    let provider = providers::create_provider(&config.model)?;
    let registry = Arc::new(agent::ToolRegistry::new());
    registry.register(Box::new(tools::RandomNameTool::new()));

    let agent_loop = agent::AgentLoop::new(Arc::from(provider), registry)
        .with_max_callbacks(config.max_callbacks)
        .with_reflect(config.reflect);

    let seed = agent::ContextBuilder::new().build_messages(&prompt);
    let response = agent_loop.run(seed).await?;

    println!(">>> LLM Response:");
    println!("{}", response.as_deref().unwrap_or(""));

    if let Some(code) = sandbox::runnable_code(config.execute_code, response.as_deref()) {
        let runner = sandbox::CodeRunner::new(config.sandbox.clone());
        let output = runner.run(code).await?;
        println!(">>> Code execution output:");
        println!("{}", output);
    }

    Ok(())
}
