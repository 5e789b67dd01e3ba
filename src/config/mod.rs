// Configuration management module
// TOML settings for the embedding server, chat model, chunking and retrieval

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    CompletionConfig, Config, ConfigError, EmbeddingConfig, FallbackMode, RetrievalConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
