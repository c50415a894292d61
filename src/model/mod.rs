// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Statistical models: evidence scoring and somatic significance.

pub mod likelihood;
pub mod somatic;

use anyhow::Result;
use bio::stats::{LogProb, PHREDProb};

use crate::evidence::Evidence;

pub use likelihood::PhredLikelihoodScorer;
pub use somatic::{somatic_model, BinomialSomaticModel, FisherSomaticModel, SomaticStatistics};

/// Log-likelihood ratio (natural log) of a piece of evidence supporting its breakend versus
/// the reference allele. Must be a pure function of the evidence.
pub trait LikelihoodScorer: Send + Sync {
    fn llr(&self, evidence: &Evidence) -> f64;
}

/// P-value of the tumour support given the normal support. Must lie in [0, 1].
pub trait SomaticModel: Send + Sync {
    fn pvalue(&self, statistics: &SomaticStatistics) -> Result<f64>;
}

/// Log-likelihood ratio of a correct versus an incorrect placement, given a PHRED scaled error
/// probability. Never negative.
pub fn phred_to_llr(phred: f64) -> f64 {
    let prob_error = LogProb::from(PHREDProb(phred));
    let prob_correct = prob_error.ln_one_minus_exp();
    (*prob_correct - *prob_error).max(0.0)
}

/// PHRED scaled probability of the reference allele given a log-likelihood ratio, i.e.
/// `10 log10(1 + exp(llr))`.
pub fn llr_to_phred(llr: f64) -> f64 {
    let prob_ref = LogProb(-*LogProb::ln_one().ln_add_exp(LogProb(llr)));
    *PHREDProb::from(prob_ref)
}
