//! User settings: six categories with defaults, merged key by key on load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// File name used inside the client state directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown settings category '{0}'")]
    UnknownCategory(String),
    #[error("unknown setting '{category}.{key}'")]
    UnknownKey { category: String, key: String },
    #[error("invalid value for '{category}.{key}': {reason}")]
    InvalidValue {
        category: String,
        key: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    pub font_size: u32,
    pub tab_size: u32,
    pub line_numbers: bool,
    pub word_wrap: bool,
    pub minimap: bool,
    pub bracket_matching: bool,
    pub auto_close_brackets: bool,
    pub highlight_active_line: bool,
    pub line_height: f64,
    pub font_family: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            font_size: 14,
            tab_size: 2,
            line_numbers: true,
            word_wrap: true,
            minimap: false,
            bracket_matching: true,
            auto_close_brackets: true,
            highlight_active_line: true,
            line_height: 1.6,
            font_family: "JetBrains Mono".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoSaveSettings {
    pub enabled: bool,
    /// Debounce delay in milliseconds.
    pub delay: u64,
    pub save_on_blur: bool,
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: crate::constants::DEFAULT_AUTO_SAVE_DELAY_MS,
            save_on_blur: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearanceSettings {
    pub theme: String,
    pub accent_color: String,
    pub sidebar_position: String,
    pub compact_mode: bool,
    pub show_code_preview: bool,
    pub animations_enabled: bool,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            accent_color: "teal".to_string(),
            sidebar_position: "left".to_string(),
            compact_mode: false,
            show_code_preview: true,
            animations_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnippetSettings {
    pub default_language: String,
    pub auto_detect_language: bool,
    pub confirm_delete: bool,
    pub sort_order: String,
    pub group_by_language: bool,
}

impl Default for SnippetSettings {
    fn default() -> Self {
        Self {
            default_language: "javascript".to_string(),
            auto_detect_language: true,
            confirm_delete: true,
            sort_order: "updated".to_string(),
            group_by_language: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyboardSettings {
    pub vim_mode: bool,
    pub emacs_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    pub share_by_default: bool,
    pub include_timestamps: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            share_by_default: false,
            include_timestamps: true,
        }
    }
}

/// All user settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub editor: EditorSettings,
    pub auto_save: AutoSaveSettings,
    pub appearance: AppearanceSettings,
    pub snippets: SnippetSettings,
    pub keyboard: KeyboardSettings,
    pub privacy: PrivacySettings,
}

/// Category names as they appear in the JSON document.
pub const CATEGORIES: [&str; 6] = [
    "editor",
    "autoSave",
    "appearance",
    "snippets",
    "keyboard",
    "privacy",
];

impl Settings {
    /// Built-in defaults with environment overrides applied. Only the
    /// auto-save delay (`AUTO_SAVE_DELAY_MS`) is read from the environment.
    pub fn from_env_defaults() -> Self {
        let mut settings = Self::default();
        settings.auto_save.delay = crate::config::auto_save_delay_from_env();
        settings
    }

    /// Merge a saved document over the built-in defaults.
    pub fn merged(saved: &Value) -> Self {
        Self::merged_over(saved, Self::default())
    }

    /// Merge a saved document over `base`.
    ///
    /// Each category is merged key by key: missing keys, unknown keys and
    /// values of the wrong type all fall back to the value in `base`.
    pub fn merged_over(saved: &Value, base: Self) -> Self {
        Self {
            editor: merge_category(saved.get("editor"), base.editor),
            auto_save: merge_category(saved.get("autoSave"), base.auto_save),
            appearance: merge_category(saved.get("appearance"), base.appearance),
            snippets: merge_category(saved.get("snippets"), base.snippets),
            keyboard: merge_category(saved.get("keyboard"), base.keyboard),
            privacy: merge_category(saved.get("privacy"), base.privacy),
        }
    }

    /// Load settings from `path` over the built-in defaults.
    pub fn load(path: &Path) -> Self {
        Self::load_over(path, Self::default())
    }

    /// Load settings from `path` over `base`.
    ///
    /// A missing or unreadable file yields `base`; the failure is logged.
    pub fn load_over(path: &Path, base: Self) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return base,
            Err(err) => {
                tracing::warn!("failed to read settings {}: {}", path.display(), err);
                return base;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Self::merged_over(&value, base),
            Err(err) => {
                tracing::warn!("failed to parse settings {}: {}", path.display(), err);
                base
            }
        }
    }

    /// Write settings to `path` as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Set one key of one category.
    ///
    /// # Arguments
    /// - `category`: Category name, e.g. `autoSave`.
    /// - `key`: Key within the category, e.g. `delay`.
    /// - `value`: New value; must have the key's type.
    ///
    /// # Errors
    /// Rejects unknown categories and keys, and values of the wrong type.
    /// On error the settings are left unchanged.
    pub fn update_setting(
        &mut self,
        category: &str,
        key: &str,
        value: Value,
    ) -> Result<(), SettingsError> {
        if !CATEGORIES.contains(&category) {
            return Err(SettingsError::UnknownCategory(category.to_string()));
        }
        let mut document = serde_json::to_value(&*self)?;
        let section = document
            .get_mut(category)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SettingsError::UnknownCategory(category.to_string()))?;
        let slot = section
            .get_mut(key)
            .ok_or_else(|| SettingsError::UnknownKey {
                category: category.to_string(),
                key: key.to_string(),
            })?;
        if !same_kind(slot, &value) {
            return Err(SettingsError::InvalidValue {
                category: category.to_string(),
                key: key.to_string(),
                reason: format!("expected {}", kind_name(slot)),
            });
        }
        *slot = value;
        *self = serde_json::from_value(document).map_err(|err| SettingsError::InvalidValue {
            category: category.to_string(),
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        Ok(())
    }

    /// Look up one key as JSON.
    pub fn get_setting(&self, category: &str, key: &str) -> Option<Value> {
        let document = serde_json::to_value(self).ok()?;
        document.get(category)?.get(key).cloned()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn merge_category<T>(saved: Option<&Value>, defaults: T) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Some(saved) = saved.and_then(Value::as_object) else {
        return defaults;
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&defaults) else {
        return defaults;
    };

    let known: Vec<String> = merged.keys().cloned().collect();
    for key in known {
        let Some(candidate) = saved.get(&key) else {
            continue;
        };
        let mut trial: Map<String, Value> = merged.clone();
        trial.insert(key.clone(), candidate.clone());
        if serde_json::from_value::<T>(Value::Object(trial)).is_ok() {
            merged.insert(key, candidate.clone());
        } else {
            tracing::debug!("ignoring invalid saved setting '{}'", key);
        }
    }
    serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
}

fn same_kind(current: &Value, candidate: &Value) -> bool {
    matches!(
        (current, candidate),
        (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
    )
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        _ => "a structured value",
    }
}
