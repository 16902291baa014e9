use std::{fs, io, path::Path, path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::domain::LlmProvider;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub llm_provider: LlmProvider,
    pub debounce_ms: u64,
    pub notice_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub log_filter: String,
    pub download_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            llm_provider: LlmProvider::Openai,
            debounce_ms: 400,
            notice_ms: 3000,
            request_timeout_secs: None,
            log_filter: "info".into(),
            download_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    llm_provider: Option<String>,
    debounce_ms: Option<u64>,
    notice_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
    download_dir: Option<PathBuf>,
}

/// Defaults, then the TOML file at `path` if it exists, then environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.llm_provider {
        settings.llm_provider = v.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(v) = file_cfg.debounce_ms {
        settings.debounce_ms = v;
    }
    if let Some(v) = file_cfg.notice_ms {
        settings.notice_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.download_dir {
        settings.download_dir = v;
    }
    Ok(())
}

/// `QUERYDESK_*` first, `APP__*` overrides it. Unparseable numbers are ignored.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| {
        lookup(&format!("APP__{name}")).or_else(|| lookup(&format!("QUERYDESK_{name}")))
    };

    if let Some(v) = var("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("LLM_PROVIDER") {
        if let Ok(parsed) = v.parse() {
            settings.llm_provider = parsed;
        }
    }
    if let Some(v) = var("DEBOUNCE_MS") {
        if let Ok(parsed) = v.parse() {
            settings.debounce_ms = parsed;
        }
    }
    if let Some(v) = var("NOTICE_MS") {
        if let Ok(parsed) = v.parse() {
            settings.notice_ms = parsed;
        }
    }
    if let Some(v) = var("REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
    if let Some(v) = var("LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = var("DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }
}

pub fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Settings::default().server_url);
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let url = Url::parse(&with_scheme).with_context(|| format!("invalid server url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("server url '{raw}' must use http or https");
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
