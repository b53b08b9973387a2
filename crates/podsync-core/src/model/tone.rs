//! Tone descriptors
//!
//! Each amplifier owns one descriptor ("DT") selecting its power-amp class,
//! tube mode and circuit topology. Values arrive as labels and are parsed
//! case-insensitively.

use core::fmt;
use core::str::FromStr;

use crate::errors::ValidationError;

/// Power-amp class
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ToneClass {
    A,
    AB,
}

/// Tube operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ToneMode {
    Pentode,
    Triode,
}

/// Circuit topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ToneTopology {
    I,
    II,
    III,
    IV,
}

impl FromStr for ToneClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ToneClass::A),
            "AB" | "A/B" => Ok(ToneClass::AB),
            _ => Err(ValidationError::unknown_option("class", s.trim())),
        }
    }
}

impl FromStr for ToneMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pentode" => Ok(ToneMode::Pentode),
            "triode" => Ok(ToneMode::Triode),
            _ => Err(ValidationError::unknown_option("mode", s.trim())),
        }
    }
}

impl FromStr for ToneTopology {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(ToneTopology::I),
            "II" => Ok(ToneTopology::II),
            "III" => Ok(ToneTopology::III),
            "IV" => Ok(ToneTopology::IV),
            _ => Err(ValidationError::unknown_option("topology", s.trim())),
        }
    }
}

impl fmt::Display for ToneClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneClass::A => write!(f, "A"),
            ToneClass::AB => write!(f, "AB"),
        }
    }
}

impl fmt::Display for ToneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneMode::Pentode => write!(f, "Pentode"),
            ToneMode::Triode => write!(f, "Triode"),
        }
    }
}

impl fmt::Display for ToneTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToneTopology::I => "I",
            ToneTopology::II => "II",
            ToneTopology::III => "III",
            ToneTopology::IV => "IV",
        };
        write!(f, "{}", label)
    }
}

/// How a tone descriptor is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneTarget {
    /// By descriptor id
    Id(u32),
    /// By the amplifier that owns it
    Amp(u32),
}

impl fmt::Display for ToneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneTarget::Id(id) => write!(f, "ID:{}", id),
            ToneTarget::Amp(amp_id) => write!(f, "AmpID:{}", amp_id),
        }
    }
}

/// Descriptor attached to one amplifier
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToneDescriptor {
    id: u32,
    amp_id: u32,
    class: ToneClass,
    mode: ToneMode,
    topology: ToneTopology,
}

impl ToneDescriptor {
    pub fn new(id: u32, amp_id: u32) -> Self {
        Self {
            id,
            amp_id,
            class: ToneClass::AB,
            mode: ToneMode::Pentode,
            topology: ToneTopology::I,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn amp_id(&self) -> u32 {
        self.amp_id
    }

    pub fn class(&self) -> ToneClass {
        self.class
    }

    pub fn mode(&self) -> ToneMode {
        self.mode
    }

    pub fn topology(&self) -> ToneTopology {
        self.topology
    }

    pub fn set_class(&mut self, text: &str) -> Result<(), ValidationError> {
        self.class = text.parse()?;
        Ok(())
    }

    pub fn set_mode(&mut self, text: &str) -> Result<(), ValidationError> {
        self.mode = text.parse()?;
        Ok(())
    }

    pub fn set_topology(&mut self, text: &str) -> Result<(), ValidationError> {
        self.topology = text.parse()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_case_insensitively() {
        let mut dt = ToneDescriptor::new(0, 1);
        dt.set_class("a").unwrap();
        dt.set_mode("TRIODE").unwrap();
        dt.set_topology(" iii ").unwrap();
        assert_eq!(dt.class(), ToneClass::A);
        assert_eq!(dt.mode(), ToneMode::Triode);
        assert_eq!(dt.topology(), ToneTopology::III);
    }

    #[test]
    fn test_unknown_label_keeps_value() {
        let mut dt = ToneDescriptor::new(0, 0);
        let err = dt.set_topology("V").unwrap_err();
        assert_eq!(err, ValidationError::unknown_option("topology", "V"));
        assert_eq!(dt.topology(), ToneTopology::I);
    }

    #[test]
    fn test_display_roundtrip() {
        for label in ["I", "II", "III", "IV"] {
            let topology: ToneTopology = label.parse().unwrap();
            assert_eq!(topology.to_string(), label);
        }
    }
}
