use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub taxonomy_path: Option<PathBuf>,
    pub concurrency_limit: usize,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let taxonomy_path = env::var("EDUTAGGER_TAXONOMY").ok().map(PathBuf::from);

        let concurrency_limit = env::var("CONCURRENCY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);

        Self {
            taxonomy_path,
            concurrency_limit,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub concurrency_limit: usize,
    pub dry_run: bool,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            concurrency_limit: config.concurrency_limit.max(1),
            dry_run: config.dry_run,
        }
    }
}
