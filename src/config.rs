use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub interview: InterviewConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the interview backend, without a trailing path
    pub base_url: String,

    /// Timeout for start/transcribe/message/evaluate calls
    pub request_timeout_secs: u64,

    /// Timeout for speech synthesis, which routinely runs longer
    pub synthesis_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct InterviewConfig {
    /// Profile used when the user starts without naming one
    pub default_profile: String,

    /// Stack label used when the user starts without naming one
    pub default_stack: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "interview-client")?
            .set_default("backend.base_url", "http://localhost:8000")?
            .set_default("backend.request_timeout_secs", 30_i64)?
            .set_default("backend.synthesis_timeout_secs", 60_i64)?
            .set_default("interview.default_profile", "pleno")?
            .set_default("interview.default_stack", "backend")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("INTERVIEW").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let cfg = Config::load("config/definitely-missing").unwrap();
        assert_eq!(cfg.service.name, "interview-client");
        assert_eq!(cfg.backend.request_timeout_secs, 30);
        assert_eq!(cfg.backend.synthesis_timeout_secs, 60);
        assert_eq!(cfg.interview.default_profile, "pleno");
    }
}
