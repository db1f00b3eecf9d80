// standard library
use std::fmt;

// external crates
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// internal modules
use crate::error::{Error, Result};

/// Tabulated quantity of an electron-photon data set
///
/// Quantities are identified by a kebab-case name, with the subshell
/// designator appended for electroionization.
///
/// ```rust
/// # use xsgrid_datagen::Quantity;
/// # use std::str::FromStr;
/// assert_eq!(Quantity::from_str("total-elastic").unwrap(), Quantity::TotalElastic);
/// assert_eq!(
///     Quantity::from_str("Electroionization-5").unwrap(),
///     Quantity::Electroionization(5)
/// );
///
/// // names round trip through display
/// assert_eq!(Quantity::Electroionization(5).to_string(), "electroionization-5");
/// ```
///
/// Quantities serialise as their names, so they can be used directly as JSON
/// map keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quantity {
    /// Elastic scattering above the cutoff angle
    CutoffElastic,
    /// Total elastic scattering
    TotalElastic,
    /// Screened Rutherford elastic scattering
    ScreenedRutherfordElastic,
    /// Bremsstrahlung
    Bremsstrahlung,
    /// Atomic excitation
    AtomicExcitation,
    /// Electroionization of a single subshell
    Electroionization(u32),
    /// Incoherent photon scattering
    Incoherent,
    /// Coherent photon scattering
    Coherent,
}

impl std::str::FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();

        if let Some(subshell) = name.strip_prefix("electroionization-") {
            return subshell
                .parse::<u32>()
                .map(Quantity::Electroionization)
                .map_err(|_| Error::UnknownQuantity(s.to_string()));
        }

        match name.as_str() {
            "cutoff-elastic" => Ok(Quantity::CutoffElastic),
            "total-elastic" => Ok(Quantity::TotalElastic),
            "screened-rutherford-elastic" => Ok(Quantity::ScreenedRutherfordElastic),
            "bremsstrahlung" => Ok(Quantity::Bremsstrahlung),
            "atomic-excitation" => Ok(Quantity::AtomicExcitation),
            "incoherent" => Ok(Quantity::Incoherent),
            "coherent" => Ok(Quantity::Coherent),
            _ => Err(Error::UnknownQuantity(s.to_string())),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Quantity::CutoffElastic => write!(f, "cutoff-elastic"),
            Quantity::TotalElastic => write!(f, "total-elastic"),
            Quantity::ScreenedRutherfordElastic => write!(f, "screened-rutherford-elastic"),
            Quantity::Bremsstrahlung => write!(f, "bremsstrahlung"),
            Quantity::AtomicExcitation => write!(f, "atomic-excitation"),
            Quantity::Electroionization(subshell) => write!(f, "electroionization-{subshell}"),
            Quantity::Incoherent => write!(f, "incoherent"),
            Quantity::Coherent => write!(f, "coherent"),
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(Quantity::CutoffElastic)]
    #[case(Quantity::TotalElastic)]
    #[case(Quantity::ScreenedRutherfordElastic)]
    #[case(Quantity::Bremsstrahlung)]
    #[case(Quantity::AtomicExcitation)]
    #[case(Quantity::Electroionization(0))]
    #[case(Quantity::Electroionization(42))]
    #[case(Quantity::Incoherent)]
    #[case(Quantity::Coherent)]
    fn names(#[case] quantity: Quantity) {
        assert_eq!(Quantity::from_str(&quantity.to_string()).unwrap(), quantity);
    }

    #[test]
    fn unknown_names() {
        assert!(Quantity::from_str("elastic").is_err());
        assert!(Quantity::from_str("electroionization-").is_err());
        assert!(Quantity::from_str("electroionization-k").is_err());
    }

    #[test]
    fn json_map_keys() {
        let map = std::collections::BTreeMap::from([(Quantity::Electroionization(1), 1.0)]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"electroionization-1":1.0}"#);
    }
}
