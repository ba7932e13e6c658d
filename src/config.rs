use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

// ============================================================
// Detection Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    /// Anomaly score cutoff: a score strictly above this flags the transaction.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Minimum number of raw comparison transactions when no baseline exists.
    #[serde(default = "default_min_sample")]
    pub min_sample: usize,
    /// How many recent transactions to pull when building a baseline or sample.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Baseline cache entry lifetime.
    #[serde(default = "default_baseline_ttl")]
    pub baseline_ttl_secs: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            min_sample: default_min_sample(),
            history_window: default_history_window(),
            baseline_ttl_secs: default_baseline_ttl(),
        }
    }
}

fn default_threshold() -> f64 {
    2.5
}

fn default_min_sample() -> usize {
    3
}

fn default_history_window() -> usize {
    50
}

fn default_baseline_ttl() -> u64 {
    604_800 // 7 days
}

// ============================================================
// Summarizer Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_summarizer_endpoint")]
    pub endpoint: String,
    /// Bearer credential for the text-generation endpoint. Only ever read from
    /// the HF_API_TOKEN environment variable; absence means the deterministic
    /// template summary is used for every alert.
    #[serde(skip)]
    pub api_token: Option<String>,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_summarizer_endpoint(),
            api_token: None,
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_summarizer_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_summarizer_endpoint() -> String {
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_max_new_tokens() -> u32 {
    80
}

fn default_temperature() -> f64 {
    0.7
}

fn default_summarizer_timeout() -> u64 {
    10
}

// ============================================================
// API Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_host")]
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;

        if let Some(threshold) = threshold_override(std::env::var("AI_THRESHOLD").ok().as_deref())?
        {
            config.detection.threshold = threshold;
        }
        config.summarizer.api_token = std::env::var("HF_API_TOKEN").ok().filter(|t| !t.is_empty());

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.detection.threshold <= 0.0 {
            return Err(eyre::eyre!("detection.threshold must be positive"));
        }
        if self.detection.min_sample == 0 {
            return Err(eyre::eyre!("detection.min_sample must be at least 1"));
        }
        if self.detection.history_window < self.detection.min_sample {
            return Err(eyre::eyre!(
                "detection.history_window must be at least detection.min_sample ({})",
                self.detection.min_sample
            ));
        }
        if self.summarizer.timeout_secs == 0 {
            return Err(eyre::eyre!("summarizer.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Parse the AI_THRESHOLD override. An unset variable is fine; a set but
/// unparseable one is a configuration error, not something to guess around.
fn threshold_override(raw: Option<&str>) -> eyre::Result<Option<f64>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| eyre::eyre!("AI_THRESHOLD must be a number, got '{}'", s)),
    }
}
