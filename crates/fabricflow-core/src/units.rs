//! Units for link capacities and flow amounts.

use std::fmt;

/// An amount of traffic per unit time. Used for link capacities and for the flow assigned to a
/// link. Capacities of synthetic source and sink links are infinite.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct Bandwidth(f64);

impl Bandwidth {
    pub const ZERO: Bandwidth = Self::new(0.0);
    pub const INFINITY: Bandwidth = Self::new(f64::INFINITY);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn into_f64(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }

    /// Returns true if this is a usable capacity: not NaN and not negative.
    pub fn is_valid_capacity(self) -> bool {
        self.0 >= 0.0
    }
}

impl From<f64> for Bandwidth {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<u64> for Bandwidth {
    fn from(value: u64) -> Self {
        Self::new(value as f64)
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_infinite() {
            let sign = if v < 0.0 { "-" } else { "" };
            write!(f, "{sign}inf")
        } else if v.fract() == 0.0 && v.abs() < 1e15 {
            write!(f, "{}", v as i64)
        } else {
            write!(f, "{v}")
        }
    }
}

const INFINITY_STR: &str = "inf";

impl serde::Serialize for Bandwidth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.0.is_infinite() && self.0 > 0.0 {
            serializer.serialize_str(INFINITY_STR)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum BandwidthRepr {
    Number(f64),
    Text(String),
}

impl<'de> serde::Deserialize<'de> for Bandwidth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match BandwidthRepr::deserialize(deserializer)? {
            BandwidthRepr::Number(v) => Ok(Self::new(v)),
            BandwidthRepr::Text(s) if s == INFINITY_STR => Ok(Self::INFINITY),
            BandwidthRepr::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid bandwidth `{s}`, expected a number or \"{INFINITY_STR}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_display_without_decimal_point() {
        assert_eq!(Bandwidth::new(3.0).to_string(), "3");
        assert_eq!(Bandwidth::new(0.0).to_string(), "0");
        assert_eq!(Bandwidth::new(100.0).to_string(), "100");
    }

    #[test]
    fn fractional_and_infinite_display() {
        assert_eq!(Bandwidth::new(2.5).to_string(), "2.5");
        assert_eq!(Bandwidth::INFINITY.to_string(), "inf");
    }

    #[test]
    fn infinity_serializes_as_string() -> anyhow::Result<()> {
        let caps = vec![Bandwidth::new(4.0), Bandwidth::INFINITY];
        let s = serde_json::to_string(&caps)?;
        assert_eq!(s, r#"[4.0,"inf"]"#);
        let back: Vec<Bandwidth> = serde_json::from_str(&s)?;
        assert_eq!(back, caps);
        Ok(())
    }

    #[test]
    fn unknown_text_fails_to_deserialize() {
        let res: Result<Bandwidth, _> = serde_json::from_str(r#""fast""#);
        assert!(res.is_err());
    }

    #[test]
    fn nan_and_negative_are_invalid_capacities() {
        assert!(!Bandwidth::new(f64::NAN).is_valid_capacity());
        assert!(!Bandwidth::new(-1.0).is_valid_capacity());
        assert!(Bandwidth::ZERO.is_valid_capacity());
        assert!(Bandwidth::INFINITY.is_valid_capacity());
    }
}
