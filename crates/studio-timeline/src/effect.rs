//! Effect metadata attached to clips.
//!
//! Effects are opaque to the engine: it stores and edits their parameters,
//! but rendering belongs to whatever consumes the timeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use studio_core::KeyframeTrack;
use uuid::Uuid;

use crate::error::{EditError, EditResult};

/// Effect categories known to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectType {
    ColorCorrection,
    Blur,
    Sharpen,
    NoiseReduction,
    Stabilization,
    ChromaKey,
    Mask,
    Transform,
    Distortion,
    Artistic,
    AudioFilter,
    AudioEq,
    AudioCompressor,
    AudioReverb,
}

impl EffectType {
    pub fn is_audio(self) -> bool {
        matches!(
            self,
            Self::AudioFilter | Self::AudioEq | Self::AudioCompressor | Self::AudioReverb
        )
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::ColorCorrection => "Color Correction",
            Self::Blur => "Blur",
            Self::Sharpen => "Sharpen",
            Self::NoiseReduction => "Noise Reduction",
            Self::Stabilization => "Stabilization",
            Self::ChromaKey => "Chroma Key",
            Self::Mask => "Mask",
            Self::Transform => "Transform",
            Self::Distortion => "Distortion",
            Self::Artistic => "Artistic",
            Self::AudioFilter => "Audio Filter",
            Self::AudioEq => "Equalizer",
            Self::AudioCompressor => "Compressor",
            Self::AudioReverb => "Reverb",
        }
    }

    /// Parameters a freshly created effect of this type starts with.
    pub fn default_parameters(self) -> Vec<EffectParameter> {
        use EffectParameter as P;
        match self {
            Self::ColorCorrection => vec![
                P::number("brightness", 0.0, -1.0, 1.0),
                P::number("contrast", 1.0, 0.0, 2.0),
                P::number("saturation", 1.0, 0.0, 2.0),
                P::number("temperature", 0.0, -100.0, 100.0),
            ],
            Self::Blur => vec![
                P::number("radius", 5.0, 0.0, 100.0),
                P::choice("mode", &["gaussian", "box", "motion"], "gaussian"),
            ],
            Self::Sharpen => vec![P::number("amount", 0.5, 0.0, 2.0)],
            Self::NoiseReduction => vec![P::number("strength", 0.3, 0.0, 1.0)],
            Self::Stabilization => vec![
                P::number("smoothness", 0.5, 0.0, 1.0),
                P::boolean("crop", true),
            ],
            Self::ChromaKey => vec![
                P::color("key_color", "#00ff00"),
                P::number("tolerance", 0.3, 0.0, 1.0),
                P::number("softness", 0.1, 0.0, 1.0),
            ],
            Self::Mask => vec![
                P::choice("shape", &["rectangle", "ellipse"], "rectangle"),
                P::number("feather", 0.0, 0.0, 100.0),
                P::boolean("invert", false),
            ],
            Self::Transform => vec![
                P::number("x", 0.0, -10_000.0, 10_000.0),
                P::number("y", 0.0, -10_000.0, 10_000.0),
                P::number("scale", 1.0, 0.0, 10.0),
                P::number("rotation", 0.0, -360.0, 360.0),
            ],
            Self::Distortion => vec![P::number("amount", 0.0, -1.0, 1.0)],
            Self::Artistic => vec![
                P::choice("style", &["sketch", "oil", "posterize"], "sketch"),
                P::number("intensity", 0.5, 0.0, 1.0),
            ],
            Self::AudioFilter => vec![
                P::choice("kind", &["lowpass", "highpass", "bandpass"], "lowpass"),
                P::number("cutoff", 1000.0, 20.0, 20_000.0),
            ],
            Self::AudioEq => vec![
                P::number("low", 0.0, -24.0, 24.0),
                P::number("mid", 0.0, -24.0, 24.0),
                P::number("high", 0.0, -24.0, 24.0),
            ],
            Self::AudioCompressor => vec![
                P::number("threshold", -18.0, -60.0, 0.0),
                P::number("ratio", 4.0, 1.0, 20.0),
            ],
            Self::AudioReverb => vec![
                P::number("room_size", 0.5, 0.0, 1.0),
                P::number("wet", 0.3, 0.0, 1.0),
            ],
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Declared kind of an effect parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Number,
    Boolean,
    Color,
    Text,
    Enum,
}

/// Current value of an effect parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    Number(f64),
    Boolean(bool),
    /// `#rrggbb`
    Color(String),
    Text(String),
    Enum(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Number(_) => ParamKind::Number,
            Self::Boolean(_) => ParamKind::Boolean,
            Self::Color(_) => ParamKind::Color,
            Self::Text(_) => ParamKind::Text,
            Self::Enum(_) => ParamKind::Enum,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// A named effect parameter with its declared kind and constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParameter {
    pub name: String,
    pub value: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Allowed values for enum parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub animatable: bool,
    pub keyframes: KeyframeTrack,
}

impl EffectParameter {
    fn with_value(name: &str, value: ParamValue, animatable: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            min: None,
            max: None,
            options: Vec::new(),
            animatable,
            keyframes: KeyframeTrack::new(name),
        }
    }

    pub fn number(name: &str, value: f64, min: f64, max: f64) -> Self {
        let mut param = Self::with_value(name, ParamValue::Number(value), true);
        param.min = Some(min);
        param.max = Some(max);
        param
    }

    pub fn boolean(name: &str, value: bool) -> Self {
        Self::with_value(name, ParamValue::Boolean(value), false)
    }

    pub fn color(name: &str, value: &str) -> Self {
        Self::with_value(name, ParamValue::Color(value.to_string()), false)
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self::with_value(name, ParamValue::Text(value.to_string()), false)
    }

    pub fn choice(name: &str, options: &[&str], selected: &str) -> Self {
        let mut param = Self::with_value(name, ParamValue::Enum(selected.to_string()), false);
        param.options = options.iter().map(|o| o.to_string()).collect();
        param
    }

    pub fn kind(&self) -> ParamKind {
        self.value.kind()
    }

    /// Check that `value` is acceptable for this parameter.
    pub fn check(&self, value: &ParamValue) -> EditResult<()> {
        if value.kind() != self.kind() {
            return Err(EditError::validation(format!(
                "parameter '{}' expects {:?}, got {:?}",
                self.name,
                self.kind(),
                value.kind()
            )));
        }
        match value {
            ParamValue::Number(v) => {
                let below = self.min.is_some_and(|min| *v < min);
                let above = self.max.is_some_and(|max| *v > max);
                if !v.is_finite() || below || above {
                    return Err(EditError::validation(format!(
                        "parameter '{}' value {} out of range",
                        self.name, v
                    )));
                }
            }
            ParamValue::Color(c) if !is_hex_color(c) => {
                return Err(EditError::validation(format!(
                    "parameter '{}' expects a #rrggbb color, got '{}'",
                    self.name, c
                )));
            }
            ParamValue::Enum(choice) if !self.options.iter().any(|o| o == choice) => {
                return Err(EditError::validation(format!(
                    "parameter '{}' has no option '{}'",
                    self.name, choice
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// An effect instance on a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: Uuid,
    pub name: String,
    pub effect_type: EffectType,
    pub enabled: bool,
    pub parameters: Vec<EffectParameter>,
    /// Preset this instance was created from, if any.
    pub preset_id: Option<String>,
}

impl Effect {
    /// A new enabled effect with the type's default parameters.
    pub fn new(effect_type: EffectType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: effect_type.display_name().to_string(),
            effect_type,
            enabled: true,
            parameters: effect_type.default_parameters(),
            preset_id: None,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&EffectParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Validate and assign a parameter value.
    pub fn set_parameter(&mut self, name: &str, value: ParamValue) -> EditResult<()> {
        let param = self
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| EditError::validation(format!("unknown parameter '{}'", name)))?;
        param.check(&value)?;
        param.value = value;
        Ok(())
    }

    /// Copy with a fresh id, as used when a clip is split.
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}
