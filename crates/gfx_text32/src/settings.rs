use serde::{Deserialize, Serialize};

use crate::{FontId, Result, ScaleTransform, Size};

/// Resolution and default style settings for a text renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSettings {
    /// Logical design resolution game scripts place text in.
    #[serde(default = "default_script_width")]
    pub script_width: i32,
    #[serde(default = "default_script_height")]
    pub script_height: i32,

    /// Resolution text bitmaps are rendered at.
    #[serde(default = "default_script_width")]
    pub scaled_width: i32,
    #[serde(default = "default_script_height")]
    pub scaled_height: i32,

    #[serde(default)]
    pub default_font: FontId,

    /// Border thickness in script pixels.
    #[serde(default = "default_border_size")]
    pub border_size: i32,

    /// Wrap width used when a measurement asks for width 0, in percent of the scaled width.
    #[serde(default = "default_wrap_percent")]
    pub default_wrap_percent: i32,
}

fn default_script_width() -> i32 {
    320
}

fn default_script_height() -> i32 {
    200
}

fn default_border_size() -> i32 {
    1
}

fn default_wrap_percent() -> i32 {
    60
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            script_width: default_script_width(),
            script_height: default_script_height(),
            scaled_width: default_script_width(),
            scaled_height: default_script_height(),
            default_font: 0,
            border_size: default_border_size(),
            default_wrap_percent: default_wrap_percent(),
        }
    }
}

impl TextSettings {
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Settings`] if the text is not valid settings TOML.
    pub fn from_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// # Errors
    ///
    /// Returns [`crate::EngineError::SettingsWrite`] if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn script_size(&self) -> Size {
        Size::new(self.script_width, self.script_height)
    }

    pub fn scaled_size(&self) -> Size {
        Size::new(self.scaled_width, self.scaled_height)
    }

    /// # Errors
    ///
    /// Returns [`crate::EngineError::InvalidScale`] if a resolution axis is not positive.
    pub fn scale_transform(&self) -> Result<ScaleTransform> {
        ScaleTransform::new(self.script_size(), self.scaled_size())
    }

    /// Wrap width in scaled pixels for measurements that pass width 0.
    pub fn default_wrap_width(&self) -> i32 {
        self.scaled_width * self.default_wrap_percent / 100
    }
}
