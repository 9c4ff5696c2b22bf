mod file_config;

pub use file_config::{FileConfig, LlmConfig};

/// Secrets read from the environment, never from CLI flags or config files.
#[derive(Debug, Default)]
pub struct EnvSecrets {
    pub google_maps_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub chat_model: Option<String>,
    pub openai_base_url: Option<String>,
}

impl EnvSecrets {
    pub fn from_env() -> Self {
        fn non_empty(var: &str) -> Option<String> {
            std::env::var(var).ok().filter(|v| !v.is_empty())
        }

        Self {
            google_maps_api_key: non_empty("GOOGLE_MAPS_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            chat_model: non_empty("CHAT_MODEL"),
            openai_base_url: non_empty("OPENAI_BASE_URL"),
        }
    }
}
