pub mod config;
pub mod error;
pub mod logger;
pub mod model_manager;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::UiForgeError;
pub use model_manager::{ModelManager, SentenceModelFiles};
pub type Result<T> = std::result::Result<T, UiForgeError>;
