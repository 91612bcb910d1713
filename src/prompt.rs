//! # Prompt Resolution
//!
//! Turns the caller's optional [`AuthenticateConfig`] into the concrete,
//! platform-filtered [`PromptRequest`] the native collaborator renders.
//! Missing fields get defaults, fields the platform cannot use are dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::Platform;
use crate::types::AuthenticateConfig;

/// Default dialog title
pub const DEFAULT_TITLE: &str = "Authentication Required";
/// Default fingerprint image color
pub const DEFAULT_IMAGE_COLOR: &str = "#1306ff";
/// Default fingerprint image color after a failed read
pub const DEFAULT_IMAGE_ERROR_COLOR: &str = "#ff0000";
/// Default sensor description
pub const DEFAULT_SENSOR_DESCRIPTION: &str = "Touch sensor";
/// Default sensor description after a failed read
pub const DEFAULT_SENSOR_ERROR_DESCRIPTION: &str = "Failed";
/// Default cancel button text
pub const DEFAULT_CANCEL_TEXT: &str = "Cancel";
/// Default fallback button label
pub const DEFAULT_FALLBACK_LABEL: &str = "Show Password";

/// An ARGB color parsed from `#RRGGBB` or `#AARRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Alpha
    pub a: u8,
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Parse a hex color string
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self {
                a: 0xff,
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            8 => Some(Self {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// Packed `0xAARRGGBB`, the form Android's `Color` APIs take
    pub fn to_argb(&self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Color::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {}", value)))
    }
}

/// Values used when a call leaves a presentation field unset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptDefaults {
    /// Dialog title
    pub title: String,
    /// Fingerprint image color
    pub image_color: Color,
    /// Fingerprint image color after a failed read
    pub image_error_color: Color,
    /// Sensor description
    pub sensor_description: String,
    /// Sensor description after a failed read
    pub sensor_error_description: String,
    /// Cancel button text
    pub cancel_text: String,
    /// Fallback button label
    pub fallback_label: String,
}

impl Default for PromptDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            image_color: Color {
                a: 0xff,
                r: 0x13,
                g: 0x06,
                b: 0xff,
            },
            image_error_color: Color {
                a: 0xff,
                r: 0xff,
                g: 0x00,
                b: 0x00,
            },
            sensor_description: DEFAULT_SENSOR_DESCRIPTION.to_string(),
            sensor_error_description: DEFAULT_SENSOR_ERROR_DESCRIPTION.to_string(),
            cancel_text: DEFAULT_CANCEL_TEXT.to_string(),
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
        }
    }
}

/// Platform-specific presentation of a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PromptStyle {
    /// LocalAuthentication alert
    Ios {
        /// Fallback button label; `None` hides the button
        #[serde(rename = "fallbackLabel")]
        fallback_label: Option<String>,
    },
    /// Fingerprint dialog
    #[serde(rename_all = "camelCase")]
    Android {
        /// Dialog title
        title: String,
        /// Fingerprint image color
        image_color: Color,
        /// Fingerprint image color after a failed read
        image_error_color: Color,
        /// Text next to the fingerprint image
        sensor_description: String,
        /// Text after a failed read
        sensor_error_description: String,
        /// Cancel button text
        cancel_text: String,
    },
}

/// Everything the native collaborator needs to render one prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    /// Reason shown to the user, where the platform displays one
    pub reason: Option<String>,
    /// Whether the device credential may satisfy the challenge
    pub password_fallback: bool,
    /// Presentation
    pub style: PromptStyle,
}

impl PromptRequest {
    /// Resolve a caller's config for `platform`.
    pub fn resolve(
        platform: Platform,
        reason: Option<&str>,
        config: &AuthenticateConfig,
        defaults: &PromptDefaults,
    ) -> Self {
        let ignored = ignored_options(platform, config);
        if !ignored.is_empty() {
            tracing::debug!("Ignoring options not used on {}: {:?}", platform, ignored);
        }

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());

        match platform {
            Platform::Ios => {
                // LocalAuthentication rejects an empty localized reason.
                let reason = reason.unwrap_or(" ").to_string();
                let fallback_label = match config.fallback_label.as_deref() {
                    Some("") => None,
                    Some(label) => Some(label.to_string()),
                    None => Some(defaults.fallback_label.clone()),
                };
                Self {
                    reason: Some(reason),
                    password_fallback: config.password_fallback.unwrap_or(false),
                    style: PromptStyle::Ios { fallback_label },
                }
            }
            Platform::Android => Self {
                reason: reason.map(str::to_string),
                password_fallback: false,
                style: PromptStyle::Android {
                    title: text_or(&config.title, &defaults.title),
                    image_color: color_or(&config.image_color, defaults.image_color),
                    image_error_color: color_or(
                        &config.image_error_color,
                        defaults.image_error_color,
                    ),
                    sensor_description: text_or(
                        &config.sensor_description,
                        &defaults.sensor_description,
                    ),
                    sensor_error_description: text_or(
                        &config.sensor_error_description,
                        &defaults.sensor_error_description,
                    ),
                    cancel_text: text_or(&config.cancel_text, &defaults.cancel_text),
                },
            },
        }
    }

    /// Fallback label, when the prompt shows one
    pub fn fallback_label(&self) -> Option<&str> {
        match &self.style {
            PromptStyle::Ios { fallback_label } => fallback_label.as_deref(),
            PromptStyle::Android { .. } => None,
        }
    }
}

fn text_or(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

fn color_or(value: &Option<String>, default: Color) -> Color {
    match value.as_deref() {
        None => default,
        Some(raw) => Color::parse(raw).unwrap_or_else(|| {
            tracing::warn!("Invalid color '{}', using {}", raw, default);
            default
        }),
    }
}

/// Names of options set in `config` that have no effect on `platform`
pub fn ignored_options(platform: Platform, config: &AuthenticateConfig) -> Vec<&'static str> {
    let mut ignored = Vec::new();
    match platform {
        Platform::Ios => {
            let android_only = [
                ("title", config.title.is_some()),
                ("imageColor", config.image_color.is_some()),
                ("imageErrorColor", config.image_error_color.is_some()),
                ("sensorDescription", config.sensor_description.is_some()),
                ("sensorErrorDescription", config.sensor_error_description.is_some()),
                ("cancelText", config.cancel_text.is_some()),
            ];
            ignored.extend(android_only.iter().filter(|(_, set)| *set).map(|(n, _)| *n));
        }
        Platform::Android => {
            if config.fallback_label.is_some() {
                ignored.push("fallbackLabel");
            }
            if config.password_fallback.is_some() {
                ignored.push("passwordFallback");
            }
        }
    }
    ignored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        let c = Color::parse("#1306ff").unwrap();
        assert_eq!((c.a, c.r, c.g, c.b), (0xff, 0x13, 0x06, 0xff));
        assert_eq!(c.to_argb(), 0xff1306ff);
        assert_eq!(c.to_string(), DEFAULT_IMAGE_COLOR);

        let translucent = Color::parse("#80FF0000").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_string(), "#80ff0000");

        assert!(Color::parse("1306ff").is_none());
        assert!(Color::parse("#12345").is_none());
        assert!(Color::parse("#zz06ff").is_none());
        assert!(Color::parse("#ééé").is_none());
    }

    #[test]
    fn test_defaults_match_constants() {
        let d = PromptDefaults::default();
        assert_eq!(d.image_color.to_string(), DEFAULT_IMAGE_COLOR);
        assert_eq!(d.image_error_color.to_string(), DEFAULT_IMAGE_ERROR_COLOR);
        assert_eq!(d.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_resolve_android_fills_defaults() {
        let config = AuthenticateConfig {
            title: Some("Unlock vault".into()),
            image_color: Some("#00ff00".into()),
            fallback_label: Some("Use PIN".into()),
            password_fallback: Some(true),
            ..Default::default()
        };
        let request = PromptRequest::resolve(
            Platform::Android,
            Some("Confirm payment"),
            &config,
            &PromptDefaults::default(),
        );
        assert_eq!(request.reason.as_deref(), Some("Confirm payment"));
        assert!(!request.password_fallback);
        assert_eq!(request.fallback_label(), None);
        match request.style {
            PromptStyle::Android {
                title,
                image_color,
                image_error_color,
                cancel_text,
                ..
            } => {
                assert_eq!(title, "Unlock vault");
                assert_eq!(image_color.to_string(), "#00ff00");
                assert_eq!(image_error_color.to_string(), DEFAULT_IMAGE_ERROR_COLOR);
                assert_eq!(cancel_text, DEFAULT_CANCEL_TEXT);
            }
            other => panic!("unexpected style: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_android_invalid_color_uses_default() {
        let config = AuthenticateConfig {
            image_error_color: Some("red".into()),
            ..Default::default()
        };
        let request =
            PromptRequest::resolve(Platform::Android, None, &config, &PromptDefaults::default());
        assert_eq!(request.reason, None);
        match request.style {
            PromptStyle::Android {
                image_error_color, ..
            } => assert_eq!(image_error_color.to_string(), DEFAULT_IMAGE_ERROR_COLOR),
            other => panic!("unexpected style: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_ios_reason_and_fallback_label() {
        let defaults = PromptDefaults::default();

        let request =
            PromptRequest::resolve(Platform::Ios, Some("  "), &AuthenticateConfig::default(), &defaults);
        assert_eq!(request.reason.as_deref(), Some(" "));
        assert_eq!(request.fallback_label(), Some(DEFAULT_FALLBACK_LABEL));
        assert!(!request.password_fallback);

        let hidden = AuthenticateConfig {
            fallback_label: Some(String::new()),
            password_fallback: Some(true),
            title: Some("ignored on iOS".into()),
            ..Default::default()
        };
        let request = PromptRequest::resolve(Platform::Ios, Some("Sign in"), &hidden, &defaults);
        assert_eq!(request.reason.as_deref(), Some("Sign in"));
        assert_eq!(request.fallback_label(), None);
        assert!(request.password_fallback);
    }

    #[test]
    fn test_ignored_options() {
        let config = AuthenticateConfig {
            title: Some("t".into()),
            cancel_text: Some("c".into()),
            fallback_label: Some("f".into()),
            unified_errors: Some(true),
            ..Default::default()
        };
        assert_eq!(ignored_options(Platform::Ios, &config), vec!["title", "cancelText"]);
        assert_eq!(ignored_options(Platform::Android, &config), vec!["fallbackLabel"]);
    }

    #[test]
    fn test_prompt_request_json() {
        let request = PromptRequest::resolve(
            Platform::Ios,
            Some("Sign in"),
            &AuthenticateConfig::default(),
            &PromptDefaults::default(),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["reason"], "Sign in");
        assert_eq!(value["passwordFallback"], false);
        assert_eq!(value["style"]["platform"], "ios");
        assert_eq!(value["style"]["fallbackLabel"], DEFAULT_FALLBACK_LABEL);
    }
}
