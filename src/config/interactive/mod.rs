
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{CompletionConfig, Config, ConfigError, EmbeddingConfig, FallbackMode, get_config_dir};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Sheet Insights Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Embedding Server").bold().yellow());
    eprintln!("Configure the Ollama instance used to embed table chunks.");
    eprintln!();

    configure_embedding(&mut config.embedding)?;

    eprintln!();
    eprintln!("{}", style("Chat Model").bold().yellow());
    eprintln!("Configure the hosted model that answers questions about your data.");
    eprintln!();

    configure_completion(&mut config.completion)?;
    configure_retrieval(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_embedding_connection(&config.embedding) {
        eprintln!("{}", style("✓ Embedding server connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to the embedding server").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before asking questions.");
    }

    if config.completion.api_key().is_err() {
        eprintln!(
            "{}",
            style(format!(
                "⚠ Warning: {} is not set; questions cannot be answered until it is",
                config.completion.api_key_env
            ))
            .yellow()
        );
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load(get_config_dir()?).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedding Settings:").bold().yellow());
    eprintln!("  Host: {}", style(&config.embedding.host).cyan());
    eprintln!("  Port: {}", style(config.embedding.port).cyan());
    eprintln!("  Model: {}", style(&config.embedding.model).cyan());
    eprintln!("  Batch Size: {}", style(config.embedding.batch_size).cyan());
    match config.embedding_url() {
        Ok(url) => eprintln!("  Embedding URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Embedding URL: {} ({})", style("Invalid").red(), e),
    }

    eprintln!();
    eprintln!("{}", style("Chat Model Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.completion.base_url).cyan());
    eprintln!("  Model: {}", style(&config.completion.model).cyan());
    eprintln!("  Max Tokens: {}", style(config.completion.max_tokens).cyan());
    let key_status = if config.completion.api_key().is_ok() {
        style("set").green()
    } else {
        style("missing").red()
    };
    eprintln!(
        "  API Key ({}): {}",
        config.completion.api_key_env, key_status
    );

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!(
        "  Chunk Size / Overlap: {} / {}",
        style(config.chunking.chunk_size).cyan(),
        style(config.chunking.chunk_overlap).cyan()
    );
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());
    eprintln!(
        "  Unmatched Questions: {}",
        style(fallback_label(config.retrieval.fallback)).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    Config::load(&config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No usable configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir.clone(),
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn fallback_label(mode: FallbackMode) -> &'static str {
    match mode {
        FallbackMode::Rag => "answer with the chat model",
        FallbackMode::Help => "reply with help text",
    }
}

fn configure_embedding(embedding: &mut EmbeddingConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == embedding.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(embedding.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = EmbeddingConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..EmbeddingConfig::default()
            };
            temp_config.validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(embedding.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(embedding.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(embedding.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    embedding.set_protocol(protocol)?;
    embedding.set_host(host)?;
    embedding.set_port(port)?;
    embedding.set_model(model)?;
    embedding.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_completion(completion: &mut CompletionConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Chat completion base URL")
        .default(completion.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = CompletionConfig {
                base_url: input.clone(),
                ..CompletionConfig::default()
            };
            temp_config.endpoint_url().map(|_| ())
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(completion.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let max_tokens: u32 = Input::new()
        .with_prompt("Maximum response tokens")
        .default(completion.max_tokens)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 || *input > 32768 {
                Err("Max tokens must be between 1 and 32768")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(completion.api_key_env.clone())
        .interact_text()?;

    completion.set_base_url(base_url)?;
    completion.set_model(model)?;
    completion.set_max_tokens(max_tokens)?;
    completion.set_api_key_env(api_key_env)?;

    Ok(())
}

fn configure_retrieval(config: &mut Config) -> Result<()> {
    let top_k: usize = Input::new()
        .with_prompt("Chunks retrieved per question")
        .default(config.retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=50).contains(input) {
                Ok(())
            } else {
                Err("Top K must be between 1 and 50")
            }
        })
        .interact_text()?;

    let modes = [FallbackMode::Rag, FallbackMode::Help];
    let labels: Vec<&str> = modes.iter().map(|&m| fallback_label(m)).collect();
    let default_index = modes
        .iter()
        .position(|&m| m == config.retrieval.fallback)
        .unwrap_or(0);
    let mode_index = Select::new()
        .with_prompt("For questions without a quick answer")
        .default(default_index)
        .items(&labels)
        .interact()?;

    config.retrieval.set_top_k(top_k)?;
    config.retrieval.fallback = modes[mode_index];

    Ok(())
}

fn test_embedding_connection(embedding: &EmbeddingConfig) -> bool {
    let url = format!(
        "{}://{}:{}/api/version",
        embedding.protocol, embedding.host, embedding.port
    );

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent.get(&url).call() {
        Ok(_) => true,
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => true,
        Err(_) => false,
    }
}
