//! Per-task model and timeout selection
//!
//! Monthly summaries go to the "pro" model and chat answers to the "flash"
//! model. The table is TOML (`[defaults]` plus `[models.<task>]`), embedded
//! from `config/models.toml` and replaced wholesale by
//! ~/.local/share/pennywise/config/models.toml when that file exists.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/models.toml");

/// Task types for model routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Monthly spending summary
    MonthlySummary,
    /// Free-form questions about the ledger
    Chat,
}

impl TaskType {
    /// Get the config key for this task type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonthlySummary => "monthly_summary",
            Self::Chat => "chat",
        }
    }

    /// Get all task types
    pub fn all() -> &'static [TaskType] {
        &[Self::MonthlySummary, Self::Chat]
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "monthly_summary" => Ok(Self::MonthlySummary),
            "chat" => Ok(Self::Chat),
            _ => Err(format!("Unknown task type: {}", s)),
        }
    }
}

/// Configuration for a specific task type
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    /// Model to use for this task
    pub model: String,
    /// Timeout for API calls
    pub timeout: Duration,
}

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Default model for all task types
    pub default_model: String,
    /// Default timeout
    pub default_timeout: Duration,
    /// Per-task configurations
    pub tasks: HashMap<TaskType, TaskConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_model: "gemini-1.5-flash".to_string(),
            default_timeout: Duration::from_secs(30),
            tasks: HashMap::new(),
        }
    }
}

/// Model Router for task-based model selection
#[derive(Debug, Clone)]
pub struct ModelRouter {
    config: RouterConfig,
    config_path: Option<PathBuf>,
}

impl ModelRouter {
    /// Create a new model router, honoring the data-dir override if present
    pub fn new() -> Result<Self> {
        Self::from_path(default_config_path())
    }

    fn from_path(path: Option<PathBuf>) -> Result<Self> {
        let config = load_config(path.as_deref())?;
        Ok(Self {
            config,
            config_path: path,
        })
    }

    /// Create with an explicit configuration (for testing)
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Router using only the embedded defaults
    pub fn embedded() -> Result<Self> {
        Ok(Self::with_config(parse_config(DEFAULT_CONFIG)?))
    }

    /// Model and timeout for a task, falling back to the defaults
    pub fn config_for_task(&self, task: TaskType) -> TaskConfig {
        self.config.tasks.get(&task).cloned().unwrap_or_else(|| TaskConfig {
            model: self.config.default_model.clone(),
            timeout: self.config.default_timeout,
        })
    }

    /// Get the config path (if using file-based config)
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_config(RouterConfig::default()))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pennywise").join("config").join("models.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<RouterConfig> {
    let content = match override_path {
        Some(path) if path.exists() => fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read model config: {}", e)))?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    models: Option<HashMap<String, RawTaskConfig>>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawTaskConfig {
    model: Option<String>,
    timeout_secs: Option<u64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<RouterConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid model config TOML: {}", e)))?;

    let mut config = RouterConfig::default();

    if let Some(defaults) = raw.defaults {
        if let Some(model) = defaults.model {
            config.default_model = model;
        }
        if let Some(timeout) = defaults.timeout_secs {
            config.default_timeout = Duration::from_secs(timeout);
        }
    }

    if let Some(models) = raw.models {
        for (task_name, task_config) in models {
            let Ok(task) = task_name.parse::<TaskType>() else {
                tracing::warn!(task = %task_name, "Ignoring unknown task in model config");
                continue;
            };

            config.tasks.insert(
                task,
                TaskConfig {
                    model: task_config
                        .model
                        .unwrap_or_else(|| config.default_model.clone()),
                    timeout: task_config
                        .timeout_secs
                        .map(Duration::from_secs)
                        .unwrap_or(config.default_timeout),
                },
            );
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.default_model, "gemini-1.5-flash");
        assert_eq!(
            config.tasks[&TaskType::MonthlySummary].model,
            "gemini-1.5-pro-latest"
        );
        assert_eq!(config.tasks[&TaskType::Chat].model, "gemini-1.5-flash");
    }

    #[test]
    fn test_task_type_as_str_round_trip() {
        for task in TaskType::all() {
            assert_eq!(task.as_str().parse::<TaskType>().unwrap(), *task);
        }
        assert!("vision".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_router_model_selection() {
        let mut tasks = HashMap::new();
        tasks.insert(
            TaskType::MonthlySummary,
            TaskConfig {
                model: "pro-model".to_string(),
                timeout: Duration::from_secs(90),
            },
        );

        let router = ModelRouter::with_config(RouterConfig {
            default_model: "flash-model".to_string(),
            tasks,
            ..Default::default()
        });

        let summary = router.config_for_task(TaskType::MonthlySummary);
        assert_eq!(summary.model, "pro-model");
        assert_eq!(summary.timeout, Duration::from_secs(90));

        let chat = router.config_for_task(TaskType::Chat);
        assert_eq!(chat.model, "flash-model");
        assert_eq!(chat.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_task_without_model_uses_default() {
        let config = parse_config(
            r#"
[defaults]
model = "base"
timeout_secs = 12

[models.chat]
timeout_secs = 5

[models.unknown_task]
model = "ignored"
"#,
        )
        .unwrap();

        assert_eq!(config.tasks.len(), 1);
        assert_eq!(config.tasks[&TaskType::Chat].model, "base");
        assert_eq!(config.tasks[&TaskType::Chat].timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(parse_config("[defaults"), Err(Error::Config(_))));
    }

    #[test]
    fn test_override_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("models.toml");
        fs::write(&path, "[models.monthly_summary]\nmodel = \"custom-pro\"\n").unwrap();

        let router = ModelRouter::from_path(Some(path.clone())).unwrap();
        assert_eq!(router.config_for_task(TaskType::MonthlySummary).model, "custom-pro");
        assert_eq!(router.config_path(), Some(&path));
    }

    #[test]
    fn test_missing_override_falls_back_to_embedded() {
        let router =
            ModelRouter::from_path(Some(PathBuf::from("/nonexistent/models.toml"))).unwrap();
        assert_eq!(
            router.config_for_task(TaskType::MonthlySummary).model,
            "gemini-1.5-pro-latest"
        );
    }
}
