//! User settings with validated durations.
//!
//! Durations are seconds, bounded to 5..=60 minutes on a 5-minute grid (the
//! same bounds the duration picker enforces). Validation happens on a merged
//! candidate before anything is committed, so a rejected update leaves the
//! previous settings untouched. Duration changes reach the running engine
//! only at the next session boundary, never mid-countdown.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SettingsError, StoreError};
use crate::storage::{keys, Store};
use crate::timer::SessionPlan;

/// Smallest allowed session duration (5 minutes).
pub const MIN_DURATION_SECS: u32 = 300;
/// Largest allowed session duration (60 minutes).
pub const MAX_DURATION_SECS: u32 = 3600;
/// Durations must land on this grid (5-minute steps).
pub const DURATION_STEP_SECS: u32 = 300;

fn default_work_duration() -> u32 {
    1500
}

fn default_short_break_duration() -> u32 {
    300
}

fn default_long_break_duration() -> u32 {
    900
}

fn default_true() -> bool {
    true
}

fn default_background_sound() -> String {
    "none".to_string()
}

/// Persisted user preferences.
///
/// Every field carries a serde default, so partially saved documents from
/// older versions merge cleanly over the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    #[serde(default = "default_short_break_duration")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break_duration")]
    pub long_break_duration: u32,
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default = "default_true")]
    pub sound_effects: bool,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default = "default_background_sound")]
    pub background_sound: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            notifications: true,
            sound_effects: true,
            dark_mode: false,
            background_sound: default_background_sound(),
        }
    }
}

/// Checks one duration against the allowed range and step grid.
pub fn validate_duration(field: &'static str, value: u32) -> Result<(), SettingsError> {
    if value < MIN_DURATION_SECS || value > MAX_DURATION_SECS || value % DURATION_STEP_SECS != 0 {
        return Err(SettingsError::InvalidDuration {
            field,
            value,
            min: MIN_DURATION_SECS,
            max: MAX_DURATION_SECS,
            step: DURATION_STEP_SECS,
        });
    }
    Ok(())
}

impl Settings {
    /// Checks all three durations.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_duration("workDuration", self.work_duration)?;
        validate_duration("shortBreakDuration", self.short_break_duration)?;
        validate_duration("longBreakDuration", self.long_break_duration)?;
        Ok(())
    }

    /// The duration plan these settings describe.
    pub fn plan(&self) -> SessionPlan {
        SessionPlan {
            work_secs: self.work_duration,
            short_break_secs: self.short_break_duration,
            long_break_secs: self.long_break_duration,
        }
    }

    /// Merges a patch and validates the result before committing.
    ///
    /// # Errors
    /// Returns the first validation failure; `self` is unchanged in that
    /// case.
    pub fn apply(&mut self, patch: &SettingsPatch) -> Result<(), SettingsError> {
        let mut next = self.clone();
        if let Some(value) = patch.work_duration {
            next.work_duration = value;
        }
        if let Some(value) = patch.short_break_duration {
            next.short_break_duration = value;
        }
        if let Some(value) = patch.long_break_duration {
            next.long_break_duration = value;
        }
        if let Some(value) = patch.notifications {
            next.notifications = value;
        }
        if let Some(value) = patch.sound_effects {
            next.sound_effects = value;
        }
        if let Some(value) = patch.dark_mode {
            next.dark_mode = value;
        }
        if let Some(value) = &patch.background_sound {
            next.background_sound = value.clone();
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Reads one field by its wire name.
    pub fn get_key(&self, key: &str) -> Result<String, SettingsError> {
        match key {
            "workDuration" => Ok(self.work_duration.to_string()),
            "shortBreakDuration" => Ok(self.short_break_duration.to_string()),
            "longBreakDuration" => Ok(self.long_break_duration.to_string()),
            "notifications" => Ok(self.notifications.to_string()),
            "soundEffects" => Ok(self.sound_effects.to_string()),
            "darkMode" => Ok(self.dark_mode.to_string()),
            "backgroundSound" => Ok(self.background_sound.clone()),
            _ => Err(SettingsError::UnknownKey(key.to_string())),
        }
    }

    /// All fields as `(wire name, value)` pairs, in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("workDuration", self.work_duration.to_string()),
            ("shortBreakDuration", self.short_break_duration.to_string()),
            ("longBreakDuration", self.long_break_duration.to_string()),
            ("notifications", self.notifications.to_string()),
            ("soundEffects", self.sound_effects.to_string()),
            ("darkMode", self.dark_mode.to_string()),
            ("backgroundSound", self.background_sound.clone()),
        ]
    }

    /// Hydrates settings from the store.
    ///
    /// Missing or corrupted data falls back to defaults; persisted values
    /// that no longer pass validation are logged and replaced by defaults
    /// too, so a hand-edited store cannot smuggle a zero-second session in.
    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        let settings: Settings = store.get_or_default(keys::SETTINGS).await?;
        if let Err(err) = settings.validate() {
            warn!("stored settings are invalid ({err}); using defaults");
            return Ok(Settings::default());
        }
        Ok(settings)
    }

    /// Writes the settings back to the store.
    pub async fn save(&self, store: &Store) -> Result<(), StoreError> {
        store.put(keys::SETTINGS, self).await
    }
}

/// Partial update, `None` fields left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub work_duration: Option<u32>,
    pub short_break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub notifications: Option<bool>,
    pub sound_effects: Option<bool>,
    pub dark_mode: Option<bool>,
    pub background_sound: Option<String>,
}

impl SettingsPatch {
    /// Parses one `key value` pair in wire naming into this patch.
    ///
    /// # Errors
    /// Returns `UnknownKey` for a key that is not a settings field and
    /// `InvalidValue` when the value does not parse for that field.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        fn secs(key: &str, value: &str) -> Result<u32, SettingsError> {
            value.parse().map_err(|_| SettingsError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a number of seconds, got '{value}'"),
            })
        }
        fn flag(key: &str, value: &str) -> Result<bool, SettingsError> {
            value.parse().map_err(|_| SettingsError::InvalidValue {
                key: key.to_string(),
                message: format!("expected true or false, got '{value}'"),
            })
        }

        match key {
            "workDuration" => self.work_duration = Some(secs(key, value)?),
            "shortBreakDuration" => self.short_break_duration = Some(secs(key, value)?),
            "longBreakDuration" => self.long_break_duration = Some(secs(key, value)?),
            "notifications" => self.notifications = Some(flag(key, value)?),
            "soundEffects" => self.sound_effects = Some(flag(key, value)?),
            "darkMode" => self.dark_mode = Some(flag(key, value)?),
            "backgroundSound" => self.background_sound = Some(value.to_string()),
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}
