use std::{collections::HashMap, fs, path::Path};

use anyhow::bail;
use serde::{
    de::{value::StrDeserializer, Visitor},
    Deserialize,
};
use winit::keyboard::KeyCode;

use crate::cmd::Action;

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub window: Window,
    #[serde(default)]
    pub screen: Screen,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub wipe: Wipe,
    #[serde(default = "default_bind")]
    pub bind: HashMap<Key, Action>,
}

impl Config {
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.wipe.fade_step > 0.0 && self.wipe.fade_step <= 1.0) {
            bail!(
                "[wipe] fade_step must be in (0, 1] (found {})",
                self.wipe.fade_step
            );
        }
        if self.wipe.fade_interval_ms == 0 {
            bail!("[wipe] fade_interval_ms must be at least 1");
        }
        if !(self.screen.stroke_width > 0.0) {
            bail!(
                "[screen] stroke_width must be positive (found {})",
                self.screen.stroke_width
            );
        }
        if !(self.tuning.key_step > 0.0) {
            bail!(
                "[tuning] key_step must be positive (found {})",
                self.tuning.key_step
            );
        }
        if !self.tuning.drag_scale.is_finite() {
            bail!("[tuning] drag_scale must be finite");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: Window::default(),
            screen: Screen::default(),
            tuning: Tuning::default(),
            wipe: Wipe::default(),
            bind: default_bind(),
        }
    }
}

fn default_bind() -> HashMap<Key, Action> {
    [
        (KeyCode::ArrowLeft, Action::NudgeLeft),
        (KeyCode::ArrowRight, Action::NudgeRight),
        (KeyCode::ArrowUp, Action::NudgeUp),
        (KeyCode::ArrowDown, Action::NudgeDown),
        (KeyCode::Space, Action::Shake),
    ]
    .into_iter()
    .map(|(code, action)| (Key(code), action))
    .collect()
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub(crate) KeyCode);

impl<'a> Deserialize<'a> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        struct FromStrVisitor;

        impl<'de> Visitor<'de> for FromStrVisitor {
            type Value = Key;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("physical key name")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                KeyCode::deserialize(StrDeserializer::<E>::new(v))
                    .map(Key)
                    .map_err(|_| E::custom(format_args!("unknown key name '{v}'")))
            }
        }

        deserializer.deserialize_str(FromStrVisitor)
    }
}

/// An sRGB color written as `"#rrggbb"`.
#[derive(Clone, Copy)]
pub struct Color(pub [f32; 3]);

impl<'a> Deserialize<'a> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        struct FromStrVisitor;

        impl<'de> Visitor<'de> for FromStrVisitor {
            type Value = Color;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("hex color like \"#a04030\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let bad = || E::custom(format_args!("invalid hex color '{v}'"));
                let hex = v.strip_prefix('#').ok_or_else(bad)?;
                if hex.len() != 6 || !hex.is_ascii() {
                    return Err(bad());
                }
                let mut rgb = [0.0; 3];
                for (i, chunk) in rgb.iter_mut().enumerate() {
                    let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                        .map_err(|_| bad())?;
                    *chunk = byte as f32 / 255.0;
                }
                Ok(Color(rgb))
            }
        }

        deserializer.deserialize_str(FromStrVisitor)
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Window {
    pub width: u32,
    pub height: u32,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            width: 900,
            height: 680,
        }
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Screen {
    pub stroke_width: f32,
    /// The trace the stylus leaves.
    pub ink: Color,
    /// Base fill the screen resets to.
    pub fill: Color,
    /// Chassis color around the screen.
    pub bezel: Color,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            stroke_width: 3.0,
            ink: Color([0.20, 0.20, 0.22]),
            fill: Color([0.76, 0.76, 0.73]),
            bezel: Color([0.72, 0.18, 0.12]),
        }
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Tuning {
    /// Pixels moved per tick while a nudge key is held.
    pub key_step: f32,
    /// Degrees a dial turns per tick while a nudge key is held.
    pub key_twist: f32,
    /// Linear pixels per dragged degree.
    pub drag_scale: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            key_step: 2.0,
            key_twist: 3.0,
            drag_scale: 0.3,
        }
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Wipe {
    /// Opacity lost per fade step.
    pub fade_step: f32,
    pub fade_interval_ms: u64,
    /// Pause after the erase before the cooldown starts.
    pub settle_ms: u64,
    /// Further shakes stay ignored for this long after the settle.
    pub cooldown_ms: u64,
}

impl Default for Wipe {
    fn default() -> Self {
        Self {
            fade_step: 0.05,
            fade_interval_ms: 50,
            settle_ms: 200,
            cooldown_ms: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_example_config() {
        let config = Config::load("config.example.toml").unwrap();
        assert_eq!(config.bind.len(), 9);
    }

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_tunables() {
        let mut config = Config::default();
        config.wipe.fade_step = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.screen.stroke_width = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_key_names_and_colors() {
        let config: Config = toml::from_str(
            r##"
            [screen]
            ink = "#112233"

            [bind]
            KeyA = "LEFT"
            Space = "SHAKE"
            "##,
        )
        .unwrap();
        assert_eq!(config.bind.get(&Key(KeyCode::KeyA)), Some(&Action::NudgeLeft));
        assert_eq!(config.bind.get(&Key(KeyCode::Space)), Some(&Action::Shake));
        let [r, g, b] = config.screen.ink.0;
        assert!((r - 0x11 as f32 / 255.0).abs() < 1e-6);
        assert!((g - 0x22 as f32 / 255.0).abs() < 1e-6);
        assert!((b - 0x33 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_unknown_key_names() {
        let err = toml::from_str::<Config>("[bind]\nNoSuchKey = \"SHAKE\"\n");
        assert!(err.is_err());
    }
}
