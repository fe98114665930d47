use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::layout::{FontFamily, LayoutConfig};
use crate::render::CaptionStyle;

pub const DEFAULT_USER_AGENT: &str = "MemeGenerator/1.0";
pub const DEFAULT_SETTINGS_PATH: &str = "config.json";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Application configuration: environment (secrets, paths) plus the JSON
/// settings file. Built once in `main` and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub settings_path: PathBuf,
    pub rust_log: String,
    pub settings: Settings,
    pub settings_origin: SettingsOrigin,
    /// Reddit credentials from the environment; take precedence over the file.
    env_reddit: RedditSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let settings_path = optional_env("SHREDDIT_SETTINGS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
        let (settings, settings_origin) = Settings::load_or_create(&settings_path)?;

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            settings_path,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            settings,
            settings_origin,
            env_reddit: RedditSettings {
                client_id: optional_env("REDDIT_CLIENT_ID").unwrap_or_default(),
                client_secret: optional_env("REDDIT_CLIENT_SECRET").unwrap_or_default(),
                user_agent: optional_env("REDDIT_USER_AGENT").unwrap_or_default(),
            },
        })
    }

    /// Reports how the settings were obtained. Settings load before the
    /// subscriber exists, so `main` calls this once logging is initialised.
    pub fn log_settings_origin(&self) {
        let path = self.settings_path.display();
        match &self.settings_origin {
            SettingsOrigin::Created => info!("Created default configuration at {path}"),
            SettingsOrigin::Loaded => info!("Loaded configuration from {path}"),
            SettingsOrigin::Defaulted { reason } => {
                warn!("Error loading config {path}: {reason}. Using defaults.")
            }
        }
    }

    /// Reddit credentials with environment values layered over the settings file.
    pub fn reddit_credentials(&self) -> RedditSettings {
        let file = &self.settings.reddit;
        let pick = |env: &str, file: &str| {
            if env.is_empty() {
                file.to_string()
            } else {
                env.to_string()
            }
        };
        let user_agent = pick(&self.env_reddit.user_agent, &file.user_agent);
        RedditSettings {
            client_id: pick(&self.env_reddit.client_id, &file.client_id),
            client_secret: pick(&self.env_reddit.client_secret, &file.client_secret),
            user_agent: if user_agent.is_empty() {
                DEFAULT_USER_AGENT.to_string()
            } else {
                user_agent
            },
        }
    }

    /// AI captions need both the settings flag and an API key.
    pub fn ai_available(&self) -> bool {
        self.settings.ai.enabled && self.openai_api_key.is_some()
    }

    pub fn save_settings(&self) -> Result<()> {
        self.settings.save(&self.settings_path)
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Settings file
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl RedditSettings {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageEditorSettings {
    /// Font file to draw with. Empty means auto-detect a system font.
    pub font_path: String,
    pub output_dir: PathBuf,
    /// Width table used when laying out without a font file (`shreddit layout`).
    pub fallback_metrics: FontFamily,
}

impl Default for ImageEditorSettings {
    fn default() -> Self {
        Self {
            font_path: String::new(),
            output_dir: PathBuf::from("generated_memes"),
            fallback_metrics: FontFamily::Impact,
        }
    }
}

impl ImageEditorSettings {
    pub fn font_path(&self) -> Option<&Path> {
        let trimmed = self.font_path.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub enabled: bool,
    pub temp_dir: PathBuf,
    pub model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            temp_dir: PathBuf::from("temp_images"),
            model: crate::llm_client::DEFAULT_MODEL.to_string(),
        }
    }
}

/// How [`Settings::load_or_create`] came by the settings for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsOrigin {
    Created,
    Loaded,
    /// The file exists but could not be read or parsed.
    Defaulted { reason: String },
}

/// Contents of the JSON settings file. Missing sections take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reddit: RedditSettings,
    pub image_editor: ImageEditorSettings,
    pub ai: AiSettings,
    pub layout: LayoutConfig,
    pub caption_style: CaptionStyle,
    pub default_subreddits: Vec<String>,
    pub default_categories: Vec<String>,
    pub guitar_subreddits: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reddit: RedditSettings::default(),
            image_editor: ImageEditorSettings::default(),
            ai: AiSettings::default(),
            layout: LayoutConfig::default(),
            caption_style: CaptionStyle::default(),
            default_subreddits: to_strings(&[
                "memes",
                "dankmemes",
                "wholesomememes",
                "MemeEconomy",
                "AdviceAnimals",
            ]),
            default_categories: to_strings(&["hot", "new", "top", "rising"]),
            guitar_subreddits: to_strings(&[
                "guitar",
                "guitarmemes",
                "guitarcirclejerk",
                "guitarplaying",
                "guitars",
            ]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Settings {
    /// Loads the settings file, writing the defaults first if it does not exist.
    ///
    /// An unreadable or malformed file is not fatal: defaults are used for
    /// this run, the file is left untouched and the reason is returned in the
    /// [`SettingsOrigin`].
    pub fn load_or_create(path: &Path) -> Result<(Self, SettingsOrigin)> {
        if !path.exists() {
            let settings = Settings::default();
            settings.save(path)?;
            return Ok((settings, SettingsOrigin::Created));
        }

        let loaded = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str::<Settings>(&raw).map_err(anyhow::Error::from));

        Ok(match loaded {
            Ok(settings) => (settings, SettingsOrigin::Loaded),
            Err(e) => (
                Settings::default(),
                SettingsOrigin::Defaulted {
                    reason: e.to_string(),
                },
            ),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn update_reddit_credentials(
        &mut self,
        client_id: &str,
        client_secret: &str,
        user_agent: Option<&str>,
    ) {
        self.reddit.client_id = client_id.trim().to_string();
        self.reddit.client_secret = client_secret.trim().to_string();
        match user_agent.map(str::trim).filter(|ua| !ua.is_empty()) {
            Some(ua) => self.reddit.user_agent = ua.to_string(),
            None if self.reddit.user_agent.is_empty() => {
                self.reddit.user_agent = DEFAULT_USER_AGENT.to_string()
            }
            None => {}
        }
    }

    pub fn update_ai_settings(
        &mut self,
        enabled: bool,
        temp_dir: Option<PathBuf>,
        model: Option<&str>,
    ) {
        self.ai.enabled = enabled;
        if let Some(dir) = temp_dir {
            self.ai.temp_dir = dir;
        }
        if let Some(model) = model.map(str::trim).filter(|m| !m.is_empty()) {
            self.ai.model = model.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let (settings, origin) = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(origin, SettingsOrigin::Created);
        assert!(path.exists(), "default settings file should be created");

        let (reloaded, origin) = Settings::load_or_create(&path).unwrap();
        assert_eq!(reloaded, settings);
        assert_eq!(origin, SettingsOrigin::Loaded);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"reddit": {"client_id": "abc", "client_secret": "xyz"}}"#,
        )
        .unwrap();

        let (settings, _) = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings.reddit.client_id, "abc");
        assert_eq!(settings.reddit.user_agent, DEFAULT_USER_AGENT);
        assert!(!settings.ai.enabled);
        assert_eq!(settings.ai.model, "gpt-4o");
        assert_eq!(settings.layout, LayoutConfig::default());
        assert_eq!(settings.default_categories.len(), 4);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (settings, origin) = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings, Settings::default());
        match origin {
            SettingsOrigin::Defaulted { reason } => {
                assert!(!reason.is_empty(), "the parse error should be reported")
            }
            other => panic!("malformed file should fall back to defaults, got {other:?}"),
        }
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{ not json",
            "a malformed file must not be overwritten"
        );
    }

    #[test]
    fn test_update_reddit_credentials_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut settings = Settings::default();
        assert!(!settings.reddit.is_configured());
        settings.update_reddit_credentials(" id ", "secret", None);
        settings.save(&path).unwrap();

        let (reloaded, _) = Settings::load_or_create(&path).unwrap();
        assert!(reloaded.reddit.is_configured());
        assert_eq!(reloaded.reddit.client_id, "id");
        assert_eq!(reloaded.reddit.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_update_reddit_credentials_custom_user_agent() {
        let mut settings = Settings::default();
        settings.update_reddit_credentials("id", "secret", Some("shreddit/2.0 by u/riffs"));
        assert_eq!(settings.reddit.user_agent, "shreddit/2.0 by u/riffs");
        settings.update_reddit_credentials("id", "secret", Some("   "));
        assert_eq!(settings.reddit.user_agent, "shreddit/2.0 by u/riffs");
    }

    #[test]
    fn test_update_ai_settings_keeps_unset_fields() {
        let mut settings = Settings::default();
        settings.update_ai_settings(true, None, Some("gpt-4o-mini"));
        assert!(settings.ai.enabled);
        assert_eq!(settings.ai.model, "gpt-4o-mini");
        assert_eq!(settings.ai.temp_dir, PathBuf::from("temp_images"));

        settings.update_ai_settings(false, Some(PathBuf::from("/tmp/x")), None);
        assert!(!settings.ai.enabled);
        assert_eq!(settings.ai.model, "gpt-4o-mini");
        assert_eq!(settings.ai.temp_dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_font_path_empty_means_auto_detect() {
        let mut editor = ImageEditorSettings::default();
        assert!(editor.font_path().is_none());
        editor.font_path = "  /fonts/impact.ttf ".to_string();
        assert_eq!(editor.font_path(), Some(Path::new("/fonts/impact.ttf")));
    }

    fn config_with(settings: Settings, settings_origin: SettingsOrigin) -> Config {
        Config {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            settings_path: PathBuf::from("config.json"),
            rust_log: "info".to_string(),
            settings,
            settings_origin,
            env_reddit: RedditSettings::default(),
        }
    }

    #[test]
    fn test_env_credentials_override_file() {
        let mut settings = Settings::default();
        settings.update_reddit_credentials("file-id", "file-secret", None);
        let mut config = config_with(settings, SettingsOrigin::Loaded);
        config.env_reddit = RedditSettings {
            client_id: "env-id".to_string(),
            client_secret: String::new(),
            user_agent: String::new(),
        };

        let creds = config.reddit_credentials();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.client_secret, "file-secret");
        assert_eq!(creds.user_agent, DEFAULT_USER_AGENT);
        assert!(!config.ai_available(), "no API key means no AI captions");
    }

    /// Collects everything a fmt subscriber writes.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_malformed_file_warning_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (settings, origin) = Settings::load_or_create(&path).unwrap();
        let config = config_with(settings, origin);

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || config.log_settings_origin());

        let out = logs.text();
        assert!(out.contains("WARN"), "expected a warning, got: {out}");
        assert!(out.contains("Using defaults"), "got: {out}");
        assert!(out.contains("config.json"), "the file path should be named, got: {out}");
    }
}
