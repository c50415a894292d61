// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use statrs::distribution::{Binomial, DiscreteCDF, Hypergeometric};

use crate::errors::Error;
use crate::model::SomaticModel;
use crate::parameters::{CallingParameters, SomaticModelKind};

/// Read counts supporting the variant and the reference allele, per sample category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, CopyGetters, new)]
#[getset(get_copy = "pub")]
pub struct SomaticStatistics {
    normal_support: u64,
    normal_reference: u64,
    tumour_support: u64,
    tumour_reference: u64,
}

impl SomaticStatistics {
    pub fn normal_total(&self) -> u64 {
        self.normal_support + self.normal_reference
    }

    pub fn tumour_total(&self) -> u64 {
        self.tumour_support + self.tumour_reference
    }

    fn failure(&self) -> Error {
        Error::SomaticModelFailure {
            normal_support: self.normal_support,
            normal_total: self.normal_total(),
            tumour_support: self.tumour_support,
            tumour_total: self.tumour_total(),
        }
    }
}

/// The somatic model selected by the given parameters.
pub fn somatic_model(parameters: &CallingParameters) -> Box<dyn SomaticModel> {
    match parameters.somatic_model() {
        SomaticModelKind::Binomial => {
            Box::new(BinomialSomaticModel::new(parameters.tumour_fraction()))
        }
        SomaticModelKind::Fisher => Box::new(FisherSomaticModel),
    }
}

/// One-sided binomial test for an excess of tumour reads among the supporting reads.
///
/// Without a somatic event, supporting reads are drawn from both samples in proportion to
/// their depth. The depth ratio is estimated from the reference read counts, or taken to be
/// `tumour_fraction` if none are known.
#[derive(Debug, Clone, Copy, new)]
pub struct BinomialSomaticModel {
    tumour_fraction: f64,
}

impl Default for BinomialSomaticModel {
    fn default() -> Self {
        BinomialSomaticModel::new(0.5)
    }
}

impl SomaticModel for BinomialSomaticModel {
    fn pvalue(&self, statistics: &SomaticStatistics) -> Result<f64> {
        let draws = statistics.normal_support() + statistics.tumour_support();
        let observed = statistics.tumour_support();
        if draws == 0 || observed == 0 {
            return Ok(1.0);
        }

        let reference = statistics.normal_reference() + statistics.tumour_reference();
        let tumour_fraction = if reference > 0 {
            statistics.tumour_reference() as f64 / reference as f64
        } else {
            self.tumour_fraction
        };
        let dist =
            Binomial::new(tumour_fraction, draws).map_err(|_| statistics.failure())?;

        Ok(dist.sf(observed - 1).max(0.0).min(1.0))
    }
}

/// One-sided Fisher's exact test for an excess of variant support in the tumour.
///
/// Given the marginals of the 2x2 table, the tumour support follows a hypergeometric
/// distribution. The p-value is the probability of observing at least the given tumour support.
#[derive(Debug, Clone, Copy, Default)]
pub struct FisherSomaticModel;

impl SomaticModel for FisherSomaticModel {
    fn pvalue(&self, statistics: &SomaticStatistics) -> Result<f64> {
        let population = statistics.normal_total() + statistics.tumour_total();
        let draws = statistics.normal_support() + statistics.tumour_support();
        let observed = statistics.tumour_support();
        if population == 0 || draws == 0 || observed == 0 {
            return Ok(1.0);
        }

        let dist = Hypergeometric::new(population, statistics.tumour_total(), draws)
            .map_err(|_| statistics.failure())?;

        Ok(dist.sf(observed - 1).max(0.0).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tumour_support() {
        let stats = SomaticStatistics::new(10, 10, 0, 20);
        assert_eq!(FisherSomaticModel.pvalue(&stats).unwrap(), 1.0);
    }

    #[test]
    fn test_tumour_only_support() {
        // all 10 supporting reads in the tumour, 10 of 20 reads per sample
        let stats = SomaticStatistics::new(0, 10, 10, 0);
        let p = FisherSomaticModel.pvalue(&stats).unwrap();
        // 1 / C(20, 10)
        assert_relative_eq!(p, 1.0 / 184_756.0, max_relative = 1e-6);
    }

    #[test]
    fn test_binomial_without_reference_counts() {
        let model = BinomialSomaticModel::default();
        let p = model.pvalue(&SomaticStatistics::new(1, 0, 30, 0)).unwrap();
        // P(X >= 30) for X ~ Bin(31, 0.5)
        assert_relative_eq!(p, 32.0 / 2f64.powi(31), max_relative = 1e-6);
        assert_eq!(model.pvalue(&SomaticStatistics::new(5, 0, 0, 0)).unwrap(), 1.0);
        let balanced = model.pvalue(&SomaticStatistics::new(10, 0, 10, 0)).unwrap();
        assert!(balanced > 0.5);
    }

    #[test]
    fn test_binomial_uses_depth_ratio() {
        // tumour sequenced at three times the depth of the normal
        let stats = SomaticStatistics::new(5, 10, 15, 30);
        let p = BinomialSomaticModel::default().pvalue(&stats).unwrap();
        assert!(p > 0.3);
        let deep_normal = SomaticStatistics::new(5, 90, 15, 10);
        assert!(BinomialSomaticModel::default().pvalue(&deep_normal).unwrap() < 1e-6);
    }

    #[test]
    fn test_balanced_support_is_not_significant() {
        let stats = SomaticStatistics::new(10, 10, 10, 10);
        let p = FisherSomaticModel.pvalue(&stats).unwrap();
        assert!(p > 0.3 && p <= 1.0);
    }
}
