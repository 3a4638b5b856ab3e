//! Application configuration for Scout.
//!
//! User config lives at `~/.scout/scout.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file: each section names the env var to read.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "scout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".scout";

// ---------------------------------------------------------------------------
// Config structs (matching scout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Fixed artifact paths.
    #[serde(default)]
    pub output: OutputConfig,

    /// Report decoration and prompt budget.
    #[serde(default)]
    pub report: ReportConfig,

    /// Generative model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Text-to-speech settings.
    #[serde(default)]
    pub speech: SpeechConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

/// `[output]` section.
///
/// Each generation overwrites the file at these paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Rendered report location.
    #[serde(default = "default_report_pdf")]
    pub report_pdf: PathBuf,

    /// Spoken briefing location.
    #[serde(default = "default_audio_path")]
    pub audio: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_pdf: default_report_pdf(),
            audio: default_audio_path(),
        }
    }
}

fn default_report_pdf() -> PathBuf {
    PathBuf::from("dcga_report.pdf")
}
fn default_audio_path() -> PathBuf {
    PathBuf::from("dcga_briefing.mp3")
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title shown on the title page and in every page header.
    #[serde(default = "default_title")]
    pub title: String,

    /// Subtitle shown on the title page.
    #[serde(default = "default_subtitle")]
    pub subtitle: String,

    /// Attribution text in every page footer.
    #[serde(default = "default_footer")]
    pub footer: String,

    /// Character budget for the evidence embedded in the synthesis prompt.
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            footer: default_footer(),
            context_budget: default_context_budget(),
        }
    }
}

fn default_title() -> String {
    "DCGA Scout Strategic Report".into()
}
fn default_subtitle() -> String {
    "Partner, Competitor & Regulatory Intelligence".into()
}
fn default_footer() -> String {
    "Generated by DCGA Scout | Confidential".into()
}
fn default_context_budget() -> usize {
    40_000
}

/// `[model]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_model_key_env")]
    pub api_key_env: String,

    /// Model identifier.
    #[serde(default = "default_model_id")]
    pub model: String,

    /// REST base URL (overridable for tests and proxies).
    #[serde(default = "default_model_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_model_key_env(),
            model: default_model_id(),
            base_url: default_model_base_url(),
            timeout_secs: default_model_timeout(),
        }
    }
}

fn default_model_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model_id() -> String {
    "gemini-2.5-flash".into()
}
fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_model_timeout() -> u64 {
    180
}

/// One search back end: where it lives and which env var holds its key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    pub api_key_env: String,
    pub base_url: String,
}

impl ProviderEndpoint {
    fn new(api_key_env: &str, base_url: &str) -> Self {
        Self {
            api_key_env: api_key_env.into(),
            base_url: base_url.into(),
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Provider used when a request does not name one.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_tavily")]
    pub tavily: ProviderEndpoint,
    #[serde(default = "default_exa")]
    pub exa: ProviderEndpoint,
    #[serde(default = "default_brave")]
    pub brave: ProviderEndpoint,
    #[serde(default = "default_serper")]
    pub serper: ProviderEndpoint,
    #[serde(default = "default_perplexity")]
    pub perplexity: ProviderEndpoint,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            timeout_secs: default_search_timeout(),
            tavily: default_tavily(),
            exa: default_exa(),
            brave: default_brave(),
            serper: default_serper(),
            perplexity: default_perplexity(),
        }
    }
}

fn default_provider() -> String {
    "tavily".into()
}
fn default_search_timeout() -> u64 {
    60
}
fn default_tavily() -> ProviderEndpoint {
    ProviderEndpoint::new("TAVILY_API_KEY", "https://api.tavily.com")
}
fn default_exa() -> ProviderEndpoint {
    ProviderEndpoint::new("EXA_API_KEY", "https://api.exa.ai")
}
fn default_brave() -> ProviderEndpoint {
    ProviderEndpoint::new("BRAVE_API_KEY", "https://api.search.brave.com")
}
fn default_serper() -> ProviderEndpoint {
    ProviderEndpoint::new("SERPER_API_KEY", "https://google.serper.dev")
}
fn default_perplexity() -> ProviderEndpoint {
    ProviderEndpoint::new("PERPLEXITY_API_KEY", "https://api.perplexity.ai")
}

/// `[speech]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            language: default_language(),
        }
    }
}

fn default_speech_base_url() -> String {
    "https://translate.google.com".into()
}
fn default_language() -> String {
    "en".into()
}

// ---------------------------------------------------------------------------
// Resolved settings (runtime, built once per process)
// ---------------------------------------------------------------------------

/// API keys read from the environment. Any of them may be absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub gemini: Option<String>,
    pub tavily: Option<String>,
    pub exa: Option<String>,
    pub brave: Option<String>,
    pub serper: Option<String>,
    pub perplexity: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "set" } else { "missing" };
        f.debug_struct("Credentials")
            .field("gemini", &mask(&self.gemini))
            .field("tavily", &mask(&self.tavily))
            .field("exa", &mask(&self.exa))
            .field("brave", &mask(&self.brave))
            .field("serper", &mask(&self.serper))
            .field("perplexity", &mask(&self.perplexity))
            .finish()
    }
}

/// Runtime settings: the file config plus credentials resolved from the environment.
///
/// Constructed once and passed by reference into the orchestrator, synthesizer,
/// renderer, and HTTP state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: AppConfig,
    pub credentials: Credentials,
}

impl Settings {
    /// Resolve credentials from the env vars named in `config`.
    pub fn resolve(config: AppConfig) -> Self {
        let search = &config.search;
        let credentials = Credentials {
            gemini: read_env_key(&config.model.api_key_env),
            tavily: read_env_key(&search.tavily.api_key_env),
            exa: read_env_key(&search.exa.api_key_env),
            brave: read_env_key(&search.brave.api_key_env),
            serper: read_env_key(&search.serper.api_key_env),
            perplexity: read_env_key(&search.perplexity.api_key_env),
        };

        tracing::debug!(?credentials, "resolved credentials");

        Self {
            config,
            credentials,
        }
    }

    /// Build settings with explicit credentials (tests, embedding).
    pub fn with_credentials(config: AppConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
        }
    }
}

fn read_env_key(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val.trim().to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.scout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.scout/scout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))?;

    validate_urls(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject base URLs that cannot be parsed before any request is attempted.
fn validate_urls(config: &AppConfig) -> Result<()> {
    let search = &config.search;
    let urls = [
        ("model.base_url", &config.model.base_url),
        ("search.tavily.base_url", &search.tavily.base_url),
        ("search.exa.base_url", &search.exa.base_url),
        ("search.brave.base_url", &search.brave.base_url),
        ("search.serper.base_url", &search.serper.base_url),
        ("search.perplexity.base_url", &search.perplexity.base_url),
        ("speech.base_url", &config.speech.base_url),
    ];

    for (key, value) in urls {
        url::Url::parse(value)
            .map_err(|e| ScoutError::config(format!("{key} = '{value}' is not a URL: {e}")))?;
    }
    Ok(())
}
