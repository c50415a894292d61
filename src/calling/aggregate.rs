// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Attribute aggregation across evidence, split into normal and tumour contributions.

use crate::evidence::{Evidence, SampleCategory};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    Sum,
    Max,
}

impl Combinator {
    fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Combinator::Sum => a + b,
            Combinator::Max => a.max(b),
        }
    }
}

/// Running aggregate of one attribute.
///
/// Values of untagged contributors are accounted on the normal side; any untagged contributor
/// (or the absence of tumour contributors) collapses the final vector to a single total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    normal: i64,
    tumour: i64,
    tumour_seen: bool,
    untagged_seen: bool,
}

impl Tally {
    pub fn add(
        mut self,
        category: Option<SampleCategory>,
        value: i64,
        combinator: Combinator,
    ) -> Self {
        match category {
            Some(SampleCategory::Tumour) => {
                self.tumour = combinator.apply(self.tumour, value);
                self.tumour_seen = true;
            }
            Some(SampleCategory::Normal) => {
                self.normal = combinator.apply(self.normal, value);
            }
            None => {
                self.normal = combinator.apply(self.normal, value);
                self.untagged_seen = true;
            }
        }
        self
    }

    pub fn merge(self, other: &Tally, combinator: Combinator) -> Self {
        Tally {
            normal: combinator.apply(self.normal, other.normal),
            tumour: combinator.apply(self.tumour, other.tumour),
            tumour_seen: self.tumour_seen || other.tumour_seen,
            untagged_seen: self.untagged_seen || other.untagged_seen,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.untagged_seen || !self.tumour_seen
    }

    pub fn total(&self, combinator: Combinator) -> i64 {
        combinator.apply(self.normal, self.tumour)
    }

    /// Final attribute vector: `[normal, tumour]`, or `[total]` if collapsed.
    pub fn values(&self, combinator: Combinator) -> Vec<i64> {
        if self.is_collapsed() {
            vec![self.total(combinator)]
        } else {
            vec![self.normal, self.tumour]
        }
    }
}

/// Aggregate a per-evidence value over the given evidence.
pub fn sum_or_max<'a, I, F>(evidence: I, f: F, combinator: Combinator) -> Tally
where
    I: IntoIterator<Item = &'a Evidence>,
    F: Fn(&Evidence) -> i64,
{
    evidence.into_iter().fold(Tally::default(), |tally, e| {
        tally.add(e.source().category(), f(e), combinator)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_max() {
        let tally = [10, 20, 30].iter().fold(Tally::default(), |t, v| {
            t.add(Some(SampleCategory::Normal), *v, Combinator::Sum)
        });
        assert_eq!(tally.values(Combinator::Sum), vec![60]);

        let tally = [10, 30, 20].iter().fold(Tally::default(), |t, v| {
            t.add(Some(SampleCategory::Normal), *v, Combinator::Max)
        });
        assert_eq!(tally.values(Combinator::Max), vec![30]);
    }

    #[test]
    fn test_split_and_collapse() {
        let tally = Tally::default()
            .add(Some(SampleCategory::Normal), 3, Combinator::Sum)
            .add(Some(SampleCategory::Tumour), 4, Combinator::Sum);
        assert_eq!(tally.values(Combinator::Sum), vec![3, 4]);

        let collapsed = tally.add(None, 1, Combinator::Sum);
        assert_eq!(collapsed.values(Combinator::Sum), vec![8]);

        let only_tumour = Tally::default().add(Some(SampleCategory::Tumour), 5, Combinator::Max);
        assert_eq!(only_tumour.values(Combinator::Max), vec![0, 5]);
    }

    #[test]
    fn test_empty_is_single_zero() {
        assert_eq!(Tally::default().values(Combinator::Sum), vec![0]);
    }

    #[test]
    fn test_merge() {
        let a = Tally::default().add(Some(SampleCategory::Tumour), 7, Combinator::Max);
        let b = Tally::default().add(Some(SampleCategory::Normal), 9, Combinator::Max);
        assert_eq!(a.merge(&b, Combinator::Max).values(Combinator::Max), vec![9, 7]);
    }
}
