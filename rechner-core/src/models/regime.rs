use serde::{Deserialize, Serialize};

/// Statutory flat-rate expense regimes (Pauschalierung).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatRateRegime {
    #[default]
    None,
    /// Basispauschalierung, standard rate.
    Basis,
    /// Basispauschalierung, reduced rate for the listed professions.
    BasisReduced,
    /// Kleinunternehmerpauschalierung for trade and production.
    Kleinunternehmer,
    /// Kleinunternehmerpauschalierung for service businesses.
    KleinunternehmerService,
}

impl FlatRateRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basis => "basis",
            Self::BasisReduced => "basis_reduced",
            Self::Kleinunternehmer => "kleinunternehmer",
            Self::KleinunternehmerService => "kleinunternehmer_service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "basis" => Some(Self::Basis),
            "basis_reduced" => Some(Self::BasisReduced),
            "kleinunternehmer" => Some(Self::Kleinunternehmer),
            "kleinunternehmer_service" => Some(Self::KleinunternehmerService),
            _ => None,
        }
    }

    pub fn all() -> &'static [FlatRateRegime] {
        &[
            Self::None,
            Self::Basis,
            Self::BasisReduced,
            Self::Kleinunternehmer,
            Self::KleinunternehmerService,
        ]
    }

    /// Basis regimes keep personnel and material costs deductible on top of
    /// the flat amount.
    pub fn keeps_personnel_and_materials(&self) -> bool {
        matches!(self, Self::Basis | Self::BasisReduced)
    }
}

/// SVS insurance category of the business owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceCategory {
    /// Neue Selbständige: exempt below the annual insurance threshold.
    #[default]
    NeueSelbstaendige,
    /// Gewerbetreibende with a trade licence: always insured, at least on
    /// the minimum contribution base.
    Gewerbetreibende,
}

impl InsuranceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeueSelbstaendige => "neue_selbstaendige",
            Self::Gewerbetreibende => "gewerbetreibende",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "neue_selbstaendige" | "nsv" => Some(Self::NeueSelbstaendige),
            "gewerbetreibende" | "gsvg" => Some(Self::Gewerbetreibende),
            _ => None,
        }
    }
}
