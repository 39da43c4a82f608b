//! Distribution families and the caller-facing selection.
//!
//! `DistributionFamily` is the closed set of concrete families a PDF can be
//! evaluated for. `DistributionChoice` adds `Auto`, which only ever resolves
//! to a family, so a PDF can never be asked for "Auto".

mod pdf;

pub use pdf::{
    beta_function, lognormal_pdf, normal_pdf, pert_pdf, stirling_gamma, triangular_pdf,
    weibull_pdf,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::stats::DistributionParams;

/// A concrete probability distribution family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionFamily {
    Normal,
    LogNormal,
    Triangular,
    #[serde(rename = "PERT")]
    Pert,
    Weibull,
}

impl DistributionFamily {
    /// Every family, in evaluation order. Best-fit ties resolve to the earliest.
    pub const ALL: [DistributionFamily; 5] = [
        Self::Normal,
        Self::LogNormal,
        Self::Triangular,
        Self::Pert,
        Self::Weibull,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::LogNormal => "LogNormal",
            Self::Triangular => "Triangular",
            Self::Pert => "PERT",
            Self::Weibull => "Weibull",
        }
    }

    /// Density at `x` for this family parameterized by `params`.
    pub fn pdf(&self, params: &DistributionParams, x: f64) -> f64 {
        match self {
            Self::Normal => normal_pdf(x, params.mean, params.std_dev),
            Self::LogNormal => lognormal_pdf(x, params.mean, params.std_dev),
            Self::Triangular => triangular_pdf(x, params.min, params.max, params.mode),
            Self::Pert => pert_pdf(x, params.min, params.max, params.mode),
            Self::Weibull => weibull_pdf(x, params.mean, params.std_dev),
        }
    }
}

impl fmt::Display for DistributionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown distribution family '{s}'"))
    }
}

/// Distribution selection on an analysis unit: a fixed family or `Auto`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DistributionChoice {
    /// Use whichever family fits best.
    #[default]
    Auto,
    Fixed(DistributionFamily),
}

impl DistributionChoice {
    /// The family to evaluate, given the current best fit.
    pub fn resolve(&self, best_fit: DistributionFamily) -> DistributionFamily {
        match self {
            Self::Auto => best_fit,
            Self::Fixed(family) => *family,
        }
    }
}

impl From<DistributionFamily> for DistributionChoice {
    fn from(family: DistributionFamily) -> Self {
        Self::Fixed(family)
    }
}

impl fmt::Display for DistributionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Fixed(family) => family.fmt(f),
        }
    }
}

impl FromStr for DistributionChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            s.parse().map(Self::Fixed)
        }
    }
}

impl From<DistributionChoice> for String {
    fn from(choice: DistributionChoice) -> Self {
        choice.to_string()
    }
}

impl TryFrom<String> for DistributionChoice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DistributionParams {
        DistributionParams {
            min: 10.0,
            mode: 20.0,
            max: 40.0,
            mean: 22.0,
            std_dev: 6.0,
        }
    }

    #[test]
    fn evaluation_order() {
        assert_eq!(DistributionFamily::ALL[0], DistributionFamily::Normal);
        assert_eq!(DistributionFamily::ALL[4], DistributionFamily::Weibull);
    }

    #[test]
    fn pdf_dispatch_matches_free_functions() {
        let p = params();
        let x = 21.0;
        assert_eq!(DistributionFamily::Normal.pdf(&p, x), normal_pdf(x, 22.0, 6.0));
        assert_eq!(DistributionFamily::LogNormal.pdf(&p, x), lognormal_pdf(x, 22.0, 6.0));
        assert_eq!(DistributionFamily::Triangular.pdf(&p, x), triangular_pdf(x, 10.0, 40.0, 20.0));
        assert_eq!(DistributionFamily::Pert.pdf(&p, x), pert_pdf(x, 10.0, 40.0, 20.0));
        assert_eq!(DistributionFamily::Weibull.pdf(&p, x), weibull_pdf(x, 22.0, 6.0));
    }

    #[test]
    fn auto_resolves_to_best_fit() {
        assert_eq!(
            DistributionChoice::Auto.resolve(DistributionFamily::Weibull),
            DistributionFamily::Weibull
        );
        assert_eq!(
            DistributionChoice::Fixed(DistributionFamily::Pert).resolve(DistributionFamily::Normal),
            DistributionFamily::Pert
        );
    }

    #[test]
    fn parse_names() {
        assert_eq!("pert".parse::<DistributionFamily>(), Ok(DistributionFamily::Pert));
        assert_eq!("LogNormal".parse::<DistributionChoice>(), Ok(DistributionFamily::LogNormal.into()));
        assert_eq!("AUTO".parse::<DistributionChoice>(), Ok(DistributionChoice::Auto));
        assert!("Cauchy".parse::<DistributionChoice>().is_err());
    }

    #[test]
    fn choice_serializes_as_name() {
        let json = serde_json::to_string(&DistributionChoice::Fixed(DistributionFamily::Pert)).unwrap();
        assert_eq!(json, "\"PERT\"");
        let auto: DistributionChoice = serde_json::from_str("\"Auto\"").unwrap();
        assert_eq!(auto, DistributionChoice::Auto);
        assert_eq!(serde_json::to_string(&DistributionFamily::Pert).unwrap(), "\"PERT\"");
    }
}
