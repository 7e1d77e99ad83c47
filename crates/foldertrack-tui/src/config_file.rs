use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use foldertrack_core::DirectorySink;
use foldertrack_core::service::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use foldertrack_core::speech::DEFAULT_LISTEN_TIMEOUT;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub service: Option<ServiceConfig>,
    pub speech: Option<SpeechConfig>,
    pub export: Option<ExportConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    /// `0` disables the listen timeout.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
}

/// Platform config directory path: `<config_dir>/foldertrack/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("foldertrack").join("config.toml"))
}

/// Load config by cascading CWD `.foldertrack.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".foldertrack.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let service = (base.service.unwrap_or_default(), overlay.service.unwrap_or_default());
    let speech = (base.speech.unwrap_or_default(), overlay.speech.unwrap_or_default());
    let export = (base.export.unwrap_or_default(), overlay.export.unwrap_or_default());
    let display = (base.display.unwrap_or_default(), overlay.display.unwrap_or_default());

    ConfigFile {
        service: Some(ServiceConfig {
            base_url: service.1.base_url.or(service.0.base_url),
            timeout_secs: service.1.timeout_secs.or(service.0.timeout_secs),
        }),
        speech: Some(SpeechConfig {
            command: speech.1.command.or(speech.0.command),
            args: speech.1.args.or(speech.0.args),
            timeout_secs: speech.1.timeout_secs.or(speech.0.timeout_secs),
        }),
        export: Some(ExportConfig {
            dir: export.1.dir.or(export.0.dir),
        }),
        display: Some(DisplayConfig {
            theme: display.1.theme.or(display.0.theme),
        }),
    }
}

/// Save a config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    save_config_to(config, &path)?;
    Ok(path)
}

fn save_config_to(config: &ConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))?;
    Ok(())
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub env_base_url: Option<String>,
    pub theme: Option<String>,
    pub export_dir: Option<PathBuf>,
    pub speech_command: Option<String>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub speech_command: Option<String>,
    pub speech_args: Vec<String>,
    pub listen_timeout: Option<Duration>,
    pub export_dir: PathBuf,
    pub theme_name: String,
}

impl Settings {
    /// CLI flags > environment > config file > defaults.
    pub fn resolve(file: &ConfigFile, overrides: Overrides) -> Self {
        let service = file.service.clone().unwrap_or_default();
        let speech = file.speech.clone().unwrap_or_default();
        let export = file.export.clone().unwrap_or_default();
        let display = file.display.clone().unwrap_or_default();

        let base_url = overrides
            .base_url
            .or(overrides.env_base_url)
            .or(service.base_url)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = service
            .timeout_secs
            .map(|s| Duration::from_secs(s.max(1)))
            .unwrap_or(DEFAULT_TIMEOUT);

        let listen_timeout = match speech.timeout_secs {
            Some(0) => None,
            Some(s) => Some(Duration::from_secs(s)),
            None => Some(DEFAULT_LISTEN_TIMEOUT),
        };

        let export_dir = overrides
            .export_dir
            .or_else(|| export.dir.filter(|d| !d.is_empty()).map(PathBuf::from))
            .unwrap_or_else(DirectorySink::default_dir);

        Self {
            base_url,
            timeout,
            speech_command: overrides
                .speech_command
                .or(speech.command)
                .filter(|c| !c.trim().is_empty()),
            speech_args: speech.args.unwrap_or_default(),
            listen_timeout,
            export_dir,
            theme_name: overrides
                .theme
                .or(display.theme)
                .unwrap_or_else(|| "default".to_string()),
        }
    }

    /// The config file that reproduces these settings.
    pub fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            service: Some(ServiceConfig {
                base_url: Some(self.base_url.clone()),
                timeout_secs: Some(self.timeout.as_secs()),
            }),
            speech: Some(SpeechConfig {
                command: self.speech_command.clone(),
                args: (!self.speech_args.is_empty()).then(|| self.speech_args.clone()),
                timeout_secs: Some(self.listen_timeout.map(|d| d.as_secs()).unwrap_or(0)),
            }),
            export: Some(ExportConfig {
                dir: Some(self.export_dir.display().to_string()),
            }),
            display: Some(DisplayConfig {
                theme: Some(self.theme_name.clone()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(toml_text: &str) -> ConfigFile {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn cwd_overlay_wins_field_by_field() {
        let platform = file(
            r#"
            [service]
            base_url = "http://records.internal:5000"
            timeout_secs = 20

            [display]
            theme = "contrast"
            "#,
        );
        let cwd = file(
            r#"
            [service]
            base_url = "http://localhost:8080"
            "#,
        );

        let merged = merge(platform, cwd);
        let service = merged.service.unwrap();

        assert_eq!(service.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(service.timeout_secs, Some(20));
        assert_eq!(merged.display.unwrap().theme.as_deref(), Some("contrast"));
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let cfg = file(
            r#"
            [service]
            base_url = "http://from-file"
            "#,
        );

        let from_file = Settings::resolve(&cfg, Overrides::default());
        assert_eq!(from_file.base_url, "http://from-file");

        let from_env = Settings::resolve(
            &cfg,
            Overrides {
                env_base_url: Some("http://from-env".into()),
                ..Default::default()
            },
        );
        assert_eq!(from_env.base_url, "http://from-env");

        let from_cli = Settings::resolve(
            &cfg,
            Overrides {
                base_url: Some("http://from-cli".into()),
                env_base_url: Some("http://from-env".into()),
                ..Default::default()
            },
        );
        assert_eq!(from_cli.base_url, "http://from-cli");
    }

    #[test]
    fn defaults_apply_to_empty_config() {
        let s = Settings::resolve(&ConfigFile::default(), Overrides::default());
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.timeout, DEFAULT_TIMEOUT);
        assert_eq!(s.listen_timeout, Some(DEFAULT_LISTEN_TIMEOUT));
        assert_eq!(s.speech_command, None);
        assert_eq!(s.theme_name, "default");
    }

    #[test]
    fn zero_listen_timeout_disables_it() {
        let cfg = file(
            r#"
            [speech]
            command = "whisper-listen"
            args = ["--model", "base.en"]
            timeout_secs = 0
            "#,
        );
        let s = Settings::resolve(&cfg, Overrides::default());
        assert_eq!(s.listen_timeout, None);
        assert_eq!(s.speech_command.as_deref(), Some("whisper-listen"));
        assert_eq!(s.speech_args, vec!["--model", "base.en"]);
    }

    #[test]
    fn saved_settings_load_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = Settings::resolve(
            &ConfigFile::default(),
            Overrides {
                base_url: Some("http://records.internal".into()),
                export_dir: Some(dir.path().join("reports")),
                theme: Some("contrast".into()),
                ..Default::default()
            },
        );

        save_config_to(&settings.to_config_file(), &path).unwrap();
        let loaded = load_from_path(&path).unwrap();

        assert_eq!(Settings::resolve(&loaded, Overrides::default()), settings);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[service\nbase_url = ").unwrap();
        assert!(load_from_path(&path).is_none());
    }
}
