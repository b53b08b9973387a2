//! Parameters
//!
//! A parameter holds a current value plus a user-adjustable min/max sweep,
//! all constrained to a declared domain. Tempo-linked parameters additionally
//! accept note divisions, which are stored as codes above the free-running
//! range and travel only through the tempo-specific messages.

use core::fmt;

use crate::errors::ValidationError;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Tempo parameter sent through the primary tempo message
pub const TEMPO_PRIMARY_ID: u32 = 0x3F10_0000;

/// Tempo parameter sent through the secondary tempo message
pub const TEMPO_SECONDARY_ID: u32 = 0x3F10_0002;

/// Decoded tempo values at or below this also need the generic parameter message
pub const TEMPO_FREE_THRESHOLD: f32 = 1.0;

/// First code used for note divisions; everything here and above is synced
const DIVISION_CODE_BASE: f32 = 2.0;

// ----------------------------------------------------------------------------
// Value Range
// ----------------------------------------------------------------------------

/// Closed interval a value must lie in
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValueRange {
    pub lower: f32,
    pub upper: f32,
}

impl ValueRange {
    pub const UNIT: ValueRange = ValueRange {
        lower: 0.0,
        upper: 1.0,
    };

    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.lower && value <= self.upper
    }

    fn check(&self, field: &str, value: f32) -> Result<f32, ValidationError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                lower: self.lower,
                upper: self.upper,
            })
        }
    }
}

// ----------------------------------------------------------------------------
// Note Divisions
// ----------------------------------------------------------------------------

/// Note divisions a tempo-linked parameter can lock to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NoteDivision {
    Whole,
    Half,
    HalfDotted,
    Quarter,
    QuarterDotted,
    QuarterTriplet,
    Eighth,
    EighthDotted,
    EighthTriplet,
    Sixteenth,
    SixteenthDotted,
    SixteenthTriplet,
}

impl NoteDivision {
    pub const ALL: [NoteDivision; 12] = [
        NoteDivision::Whole,
        NoteDivision::Half,
        NoteDivision::HalfDotted,
        NoteDivision::Quarter,
        NoteDivision::QuarterDotted,
        NoteDivision::QuarterTriplet,
        NoteDivision::Eighth,
        NoteDivision::EighthDotted,
        NoteDivision::EighthTriplet,
        NoteDivision::Sixteenth,
        NoteDivision::SixteenthDotted,
        NoteDivision::SixteenthTriplet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NoteDivision::Whole => "1/1",
            NoteDivision::Half => "1/2",
            NoteDivision::HalfDotted => "1/2.",
            NoteDivision::Quarter => "1/4",
            NoteDivision::QuarterDotted => "1/4.",
            NoteDivision::QuarterTriplet => "1/4T",
            NoteDivision::Eighth => "1/8",
            NoteDivision::EighthDotted => "1/8.",
            NoteDivision::EighthTriplet => "1/8T",
            NoteDivision::Sixteenth => "1/16",
            NoteDivision::SixteenthDotted => "1/16.",
            NoteDivision::SixteenthTriplet => "1/16T",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.label() == label)
    }

    /// Stored value for this division
    pub fn code(&self) -> f32 {
        let index = Self::ALL.iter().position(|d| d == self).unwrap_or(0);
        DIVISION_CODE_BASE + index as f32
    }

    pub fn from_code(code: f32) -> Option<Self> {
        if code < DIVISION_CODE_BASE || code.fract() != 0.0 {
            return None;
        }
        Self::ALL.get((code - DIVISION_CODE_BASE) as usize).copied()
    }
}

// ----------------------------------------------------------------------------
// Parameter
// ----------------------------------------------------------------------------

/// Parameter flavor; selects how changes are shaped into messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParameterKind {
    Standard,
    Tempo,
}

/// A single device parameter
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    id: u32,
    name: String,
    kind: ParameterKind,
    range: ValueRange,
    value: f32,
    min: f32,
    max: f32,
}

impl Parameter {
    /// Ordinary parameter spanning its whole range
    pub fn new(id: u32, name: impl Into<String>, range: ValueRange) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ParameterKind::Standard,
            range,
            value: range.lower,
            min: range.lower,
            max: range.upper,
        }
    }

    /// Tempo-linked parameter with a unit free-running range
    pub fn tempo(id: u32, name: impl Into<String>) -> Self {
        Self {
            kind: ParameterKind::Tempo,
            ..Self::new(id, name, ValueRange::UNIT)
        }
    }

    /// Builder-style initial value; not validated
    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_tempo(&self) -> bool {
        self.kind == ParameterKind::Tempo
    }

    /// Binary encoding of the current value as carried on the link
    pub fn binary_value(&self) -> [u8; 4] {
        self.value.to_le_bytes()
    }

    /// Numeric value decoded back from [`Parameter::binary_value`]
    pub fn decoded_value(&self) -> f32 {
        f32::from_le_bytes(self.binary_value())
    }

    /// Note division the value is locked to, if any
    pub fn division(&self) -> Option<NoteDivision> {
        if self.is_tempo() {
            NoteDivision::from_code(self.value)
        } else {
            None
        }
    }

    /// Parse and apply a new current value
    pub fn set_value_current(&mut self, text: &str) -> Result<(), ValidationError> {
        let text = text.trim();
        if self.is_tempo() {
            if let Some(division) = NoteDivision::from_label(text) {
                self.value = division.code();
                return Ok(());
            }
        }
        let value = parse_number(&self.name, text)?;
        self.value = self.range.check(&self.name, value)?;
        Ok(())
    }

    /// Parse and apply a new lower sweep bound
    pub fn set_value_min(&mut self, text: &str) -> Result<(), ValidationError> {
        let field = format!("{} min", self.name);
        let value = self.range.check(&field, parse_number(&field, text)?)?;
        if value > self.max {
            return Err(ValidationError::InvertedBounds {
                field,
                min: value,
                max: self.max,
            });
        }
        self.min = value;
        Ok(())
    }

    /// Parse and apply a new upper sweep bound
    pub fn set_value_max(&mut self, text: &str) -> Result<(), ValidationError> {
        let field = format!("{} max", self.name);
        let value = self.range.check(&field, parse_number(&field, text)?)?;
        if value < self.min {
            return Err(ValidationError::InvertedBounds {
                field,
                min: self.min,
                max: value,
            });
        }
        self.max = value;
        Ok(())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.division() {
            Some(division) => write!(f, "{}={}", self.name, division.label()),
            None => write!(f, "{}={}", self.name, self.value),
        }
    }
}

fn parse_number(field: &str, text: &str) -> Result<f32, ValidationError> {
    let text = text.trim();
    match text.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::invalid_number(field, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_value_parse() {
        let mut param = Parameter::new(1, "Bass", ValueRange::UNIT);
        param.set_value_current(" 0.25 ").unwrap();
        assert_eq!(param.value(), 0.25);

        assert!(matches!(
            param.set_value_current("loud"),
            Err(ValidationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            param.set_value_current("1.5"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(param.set_value_current("NaN").is_err());
        assert_eq!(param.value(), 0.25);
    }

    #[test]
    fn test_standard_rejects_division_label() {
        let mut param = Parameter::new(1, "Bass", ValueRange::UNIT);
        assert!(param.set_value_current("1/4").is_err());
    }

    #[test]
    fn test_tempo_division_encoding() {
        let mut param = Parameter::tempo(TEMPO_PRIMARY_ID, "Time");
        param.set_value_current("1/8T").unwrap();
        assert_eq!(param.division(), Some(NoteDivision::EighthTriplet));
        assert!(param.decoded_value() > TEMPO_FREE_THRESHOLD);

        param.set_value_current("0.75").unwrap();
        assert_eq!(param.division(), None);
        assert_eq!(param.decoded_value(), 0.75);
    }

    #[test]
    fn test_division_codes_roundtrip() {
        for division in NoteDivision::ALL {
            assert_eq!(NoteDivision::from_code(division.code()), Some(division));
        }
        assert_eq!(NoteDivision::from_code(1.0), None);
        assert_eq!(NoteDivision::from_code(2.5), None);
    }

    #[test]
    fn test_bounds_cannot_invert() {
        let mut param = Parameter::new(3, "Mid", ValueRange::UNIT);
        param.set_value_max("0.4").unwrap();
        assert!(matches!(
            param.set_value_min("0.6"),
            Err(ValidationError::InvertedBounds { .. })
        ));
        param.set_value_min("0.1").unwrap();
        assert_eq!((param.min(), param.max()), (0.1, 0.4));
    }
}
