// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Merging of all evidence supporting one breakend into a call.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::Result;
use itertools::Itertools;

use crate::calling::aggregate::{sum_or_max, Combinator, Tally};
use crate::calling::call::{Attribute, StructuralVariantCall};
use crate::errors::Error;
use crate::evidence::{AssemblyAttributes, Evidence, EvidenceRef, SampleCategory};
use crate::locus::{BreakendLocus, BreakendSummary};
use crate::model::{llr_to_phred, LikelihoodScorer, SomaticModel, SomaticStatistics};
use crate::reference::ReferenceLookup;
use crate::utils::descending;

/// The locus a call is built around, together with the scores it carries in.
#[derive(Clone, Debug, Builder, Getters, CopyGetters)]
#[builder(pattern = "owned")]
pub struct AnchorCall {
    #[getset(get_copy = "pub")]
    locus: BreakendLocus,
    #[builder(default)]
    #[getset(get_copy = "pub")]
    assembly_llr: f64,
    #[builder(default)]
    #[getset(get_copy = "pub")]
    softclip_llr: [f64; 2],
    #[builder(default)]
    #[getset(get_copy = "pub")]
    readpair_llr: [f64; 2],
    #[builder(default)]
    #[getset(get = "pub")]
    assembly_attributes: Option<AssemblyAttributes>,
}

impl AnchorCall {
    /// An anchor without any carried scores.
    pub fn at(locus: BreakendLocus) -> Self {
        AnchorCall {
            locus,
            assembly_llr: 0.0,
            softclip_llr: [0.0; 2],
            readpair_llr: [0.0; 2],
            assembly_attributes: None,
        }
    }
}

/// Models and thresholds needed to turn accumulated evidence into a call.
#[derive(new)]
pub struct CallingContext<'a> {
    scorer: &'a dyn LikelihoodScorer,
    somatic_model: &'a dyn SomaticModel,
    reference: &'a dyn ReferenceLookup,
    somatic_pvalue_threshold: f64,
}

#[derive(Clone, Debug)]
struct Scored {
    evidence: EvidenceRef,
    llr: f64,
}

/// Two-sided evidence first, then by decreasing LLR, then by identifier.
fn by_resolution_then_llr(a: &Scored, b: &Scored) -> Ordering {
    b.evidence
        .is_breakpoint()
        .cmp(&a.evidence.is_breakpoint())
        .then_with(|| by_llr(a, b))
}

/// Decreasing LLR, then identifier.
fn by_llr(a: &Scored, b: &Scored) -> Ordering {
    descending(a.llr, b.llr).then_with(|| a.evidence.id().cmp(b.evidence.id()))
}

/// Index into `[normal, tumour]` pairs. Untagged evidence is accounted as normal.
fn category_index(evidence: &Evidence) -> usize {
    evidence.source().is_tumour() as usize
}

/// Accumulates the evidence of one call.
///
/// Evidence is added in any order; `make` sorts it, so the resulting call only depends on
/// the set of added evidence.
#[derive(Clone, Debug)]
pub struct CallBuilder {
    anchor: AnchorCall,
    softclips: Vec<EvidenceRef>,
    readpairs: Vec<EvidenceRef>,
    assemblies: Vec<EvidenceRef>,
    reference_reads: [u64; 2],
    reference_spanning_pairs: [u64; 2],
}

impl CallBuilder {
    pub fn new(anchor: AnchorCall) -> Self {
        CallBuilder {
            anchor,
            softclips: Vec::new(),
            readpairs: Vec::new(),
            assemblies: Vec::new(),
            reference_reads: [0; 2],
            reference_spanning_pairs: [0; 2],
        }
    }

    pub fn anchor(&self) -> &AnchorCall {
        &self.anchor
    }

    pub fn evidence_count(&self) -> usize {
        self.softclips.len() + self.readpairs.len() + self.assemblies.len()
    }

    /// Add supporting evidence. Fails if the evidence does not overlap the anchor locus.
    pub fn add_evidence(mut self, evidence: EvidenceRef) -> Result<Self> {
        let locus = evidence.locus();
        if !self.anchor.locus.overlaps(&locus) {
            return Err(Error::EvidenceDoesNotSupportCall {
                evidence: evidence.id().to_owned(),
                locus: locus.to_string(),
                call: self.anchor.locus.to_string(),
            }
            .into());
        }
        match evidence.as_ref() {
            Evidence::SoftClip(_) | Evidence::RemoteSoftClip(_) => self.softclips.push(evidence),
            Evidence::ReadPair(_) => self.readpairs.push(evidence),
            Evidence::Assembly(_) => self.assemblies.push(evidence),
        }
        Ok(self)
    }

    /// Number of reads supporting the reference allele at the breakend.
    pub fn reference_reads(mut self, normal: u64, tumour: u64) -> Self {
        self.reference_reads = [normal, tumour];
        self
    }

    /// Number of read pairs spanning the breakend without supporting it.
    pub fn reference_spanning_pairs(mut self, normal: u64, tumour: u64) -> Self {
        self.reference_spanning_pairs = [normal, tumour];
        self
    }

    fn scored<F>(&self, evidence: &[EvidenceRef], scorer: &dyn LikelihoodScorer, cmp: F) -> Vec<Scored>
    where
        F: Fn(&Scored, &Scored) -> Ordering,
    {
        let mut scored = evidence
            .iter()
            .map(|e| Scored {
                evidence: e.clone(),
                llr: scorer.llr(e),
            })
            .collect_vec();
        scored.sort_by(cmp);
        scored
    }

    /// Build the call from the evidence added so far.
    pub fn make(&self, context: &CallingContext) -> Result<StructuralVariantCall> {
        let assemblies = self.scored(&self.assemblies, context.scorer, by_resolution_then_llr);
        let softclips = self.scored(&self.softclips, context.scorer, by_resolution_then_llr);
        let readpairs = self.scored(&self.readpairs, context.scorer, by_llr);

        let (locus, untemplated_sequence) = self.representative(&assemblies, &softclips);

        let assembly_llr =
            self.anchor.assembly_llr + assemblies.iter().map(|s| s.llr).sum::<f64>();
        let split_llr = |initial: [f64; 2], scored: &[Scored]| {
            scored.iter().fold(initial, |mut llr, s| {
                llr[category_index(&s.evidence)] += s.llr;
                llr
            })
        };
        let softclip_llr = split_llr(self.anchor.softclip_llr, &softclips);
        let readpair_llr = split_llr(self.anchor.readpair_llr, &readpairs);
        let llr = assembly_llr
            + softclip_llr.iter().sum::<f64>()
            + readpair_llr.iter().sum::<f64>();

        let assembly_attributes = assemblies
            .iter()
            .filter_map(|s| match s.evidence.as_ref() {
                Evidence::Assembly(asm) => Some(asm.attributes()),
                _ => None,
            })
            .fold(
                self.anchor.assembly_attributes.clone().unwrap_or_default(),
                |merged, attributes| merged.merge(attributes),
            );
        let attributes = self.attributes(&assembly_attributes, &softclips, &readpairs);

        let statistics = self.somatic_statistics(&assemblies, &softclips, &readpairs);
        let somatic_pvalue = context.somatic_model.pvalue(&statistics)?;

        let filters = if !assemblies.is_empty()
            && assemblies.iter().all(|s| match s.evidence.as_ref() {
                Evidence::Assembly(asm) => asm.is_filtered(),
                _ => false,
            }) {
            assemblies
                .iter()
                .filter_map(|s| match s.evidence.as_ref() {
                    Evidence::Assembly(asm) => Some(asm.filters().iter().cloned()),
                    _ => None,
                })
                .flatten()
                .sorted()
                .dedup()
                .collect()
        } else {
            Vec::new()
        };

        let evidence_ids = assemblies
            .iter()
            .chain(&softclips)
            .chain(&readpairs)
            .map(|s| s.evidence.id().to_owned())
            .collect();

        Ok(StructuralVariantCall::new(
            call_id(&self.anchor.locus, context.reference)?,
            locus,
            untemplated_sequence,
            llr,
            llr_to_phred(llr),
            assembly_llr,
            softclip_llr,
            readpair_llr,
            attributes,
            assembly_attributes.consensus().clone(),
            assembly_attributes.program().clone(),
            somatic_pvalue,
            somatic_pvalue < context.somatic_pvalue_threshold,
            evidence_ids,
            filters,
        ))
    }

    /// Locus and untemplated sequence of the best two-sided evidence. Assemblies take
    /// precedence over soft clips.
    fn representative(
        &self,
        assemblies: &[Scored],
        softclips: &[Scored],
    ) -> (BreakendLocus, Option<String>) {
        let best_assembly = assemblies.first().and_then(|s| match s.evidence.as_ref() {
            Evidence::Assembly(asm) => asm
                .untemplated_sequence()
                .map(|seq| (*asm.locus(), seq)),
            _ => None,
        });
        let best_softclip = || {
            softclips.first().and_then(|s| match s.evidence.as_ref() {
                Evidence::SoftClip(sc) => sc.untemplated_sequence().map(|seq| (sc.locus(), seq)),
                Evidence::RemoteSoftClip(remote) => {
                    Some((remote.locus(), remote.untemplated().as_slice()))
                }
                _ => None,
            })
        };
        match best_assembly.or_else(best_softclip) {
            Some((locus, seq)) => (locus, Some(String::from_utf8_lossy(seq).into_owned())),
            None => (self.anchor.locus, None),
        }
    }

    fn attributes(
        &self,
        assembly: &AssemblyAttributes,
        softclips: &[Scored],
        readpairs: &[Scored],
    ) -> BTreeMap<Attribute, Vec<i64>> {
        let mut attributes = BTreeMap::new();
        let sum = |tally: &Tally| tally.values(Combinator::Sum);
        let max = |tally: &Tally| tally.values(Combinator::Max);

        attributes.insert(Attribute::AssemblyEvidenceCount, sum(assembly.evidence_count()));
        attributes.insert(Attribute::AssemblyMapped, sum(assembly.mapped()));
        attributes.insert(Attribute::AssemblyMapqRemoteMax, max(assembly.mapq_remote_max()));
        attributes.insert(Attribute::AssemblyMapqRemoteTotal, sum(assembly.mapq_remote_total()));
        attributes.insert(Attribute::AssemblyLengthLocalMax, max(assembly.length_local_max()));
        attributes.insert(Attribute::AssemblyLengthRemoteMax, max(assembly.length_remote_max()));
        attributes.insert(Attribute::AssemblyBaseCount, sum(assembly.base_count()));
        attributes.insert(Attribute::AssemblyReadpairCount, sum(assembly.readpair_count()));
        attributes.insert(
            Attribute::AssemblyReadpairLengthMax,
            max(assembly.readpair_length_max()),
        );
        attributes.insert(Attribute::AssemblySoftclipCount, sum(assembly.softclip_count()));
        attributes.insert(
            Attribute::AssemblySoftclipCliplengthTotal,
            sum(assembly.softclip_cliplength_total()),
        );
        attributes.insert(
            Attribute::AssemblySoftclipCliplengthMax,
            max(assembly.softclip_cliplength_max()),
        );

        let remote_mapq = |e: &Evidence| e.remote_mapq().unwrap_or(0) as i64;
        let mut aggregate = |attribute, scored: &[Scored], f: &dyn Fn(&Evidence) -> i64, comb| {
            let tally = sum_or_max(scored.iter().map(|s| s.evidence.as_ref()), f, comb);
            attributes.insert(attribute, tally.values(comb));
        };

        aggregate(Attribute::ReadpairEvidenceCount, readpairs, &|_| 1, Combinator::Sum);
        aggregate(
            Attribute::ReadpairMappedReadpair,
            readpairs,
            &|e| e.is_breakpoint() as i64,
            Combinator::Sum,
        );
        aggregate(
            Attribute::ReadpairMapqLocalMax,
            readpairs,
            &|e| e.local_mapq() as i64,
            Combinator::Max,
        );
        aggregate(
            Attribute::ReadpairMapqLocalTotal,
            readpairs,
            &|e| e.local_mapq() as i64,
            Combinator::Sum,
        );
        aggregate(Attribute::ReadpairMapqRemoteMax, readpairs, &remote_mapq, Combinator::Max);
        aggregate(Attribute::ReadpairMapqRemoteTotal, readpairs, &remote_mapq, Combinator::Sum);

        let clip_length = |e: &Evidence| e.breakend_sequence().len() as i64;
        aggregate(Attribute::SoftclipEvidenceCount, softclips, &|_| 1, Combinator::Sum);
        aggregate(
            Attribute::SoftclipMapped,
            softclips,
            &|e| e.is_breakpoint() as i64,
            Combinator::Sum,
        );
        aggregate(Attribute::SoftclipMapqRemoteMax, softclips, &remote_mapq, Combinator::Max);
        aggregate(Attribute::SoftclipMapqRemoteTotal, softclips, &remote_mapq, Combinator::Sum);
        aggregate(Attribute::SoftclipLengthRemoteMax, softclips, &clip_length, Combinator::Max);
        aggregate(
            Attribute::SoftclipLengthRemoteTotal,
            softclips,
            &clip_length,
            Combinator::Sum,
        );

        let per_sample = |counts: [u64; 2]| {
            let tally =
                Tally::default().add(Some(SampleCategory::Normal), counts[0] as i64, Combinator::Sum);
            let tally = if counts[1] > 0 {
                tally.add(Some(SampleCategory::Tumour), counts[1] as i64, Combinator::Sum)
            } else {
                tally
            };
            tally.values(Combinator::Sum)
        };
        attributes.insert(Attribute::ReferenceCountRead, per_sample(self.reference_reads));
        attributes.insert(
            Attribute::ReferenceCountReadpair,
            per_sample(self.reference_spanning_pairs),
        );
        attributes
    }

    /// Supporting reads per sample. Reads contributing to an assembly count once, even if they
    /// also support the call directly.
    fn somatic_statistics(
        &self,
        assemblies: &[Scored],
        softclips: &[Scored],
        readpairs: &[Scored],
    ) -> SomaticStatistics {
        let assembled = assemblies
            .iter()
            .filter_map(|s| match s.evidence.as_ref() {
                Evidence::Assembly(asm) => Some(asm.supporting().iter()),
                _ => None,
            })
            .flatten();
        let reads: BTreeMap<&str, usize> = softclips
            .iter()
            .chain(readpairs)
            .map(|s| &s.evidence)
            .chain(assembled)
            .map(|e| (e.id(), category_index(e)))
            .collect();
        let mut support = [0u64; 2];
        for category in reads.values() {
            support[*category] += 1;
        }
        SomaticStatistics::new(
            support[0],
            self.reference_reads[0] + self.reference_spanning_pairs[0],
            support[1],
            self.reference_reads[1] + self.reference_spanning_pairs[1],
        )
    }
}

fn breakend_id(breakend: &BreakendSummary, reference: &dyn ReferenceLookup) -> Result<String> {
    let name = reference.name(breakend.reference_index())?;
    Ok(if breakend.is_exact() {
        format!("{}:{}{}", name, breakend.start(), breakend.direction().as_char())
    } else {
        format!(
            "{}:{}-{}{}",
            name,
            breakend.start(),
            breakend.end(),
            breakend.direction().as_char()
        )
    })
}

/// Identifier of a call, derived from the locus it was built around.
pub fn call_id(locus: &BreakendLocus, reference: &dyn ReferenceLookup) -> Result<String> {
    let mut id = format!("call{}", breakend_id(&locus.local(), reference)?);
    if let Some(remote) = locus.remote() {
        id.push_str(&breakend_id(&remote, reference)?);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::evidence::{
        AssemblyEvidenceBuilder, EvidenceSource, MateAlignment, ReadPairEvidenceBuilder,
        Realignment, SoftClipEvidenceBuilder,
    };
    use crate::locus::{BreakpointSummary, Direction};
    use crate::model::{FisherSomaticModel, PhredLikelihoodScorer};
    use crate::reference::SequenceDictionary;

    fn breakend() -> BreakendSummary {
        BreakendSummary::exact(0, Direction::Forward, 100)
    }

    fn remote() -> BreakendSummary {
        BreakendSummary::new(1, Direction::Backward, 200, 210)
    }

    fn readpair(id: &str, source: Arc<EvidenceSource>, mapq: u8) -> EvidenceRef {
        Arc::new(
            ReadPairEvidenceBuilder::default()
                .id(id)
                .source(source)
                .local(BreakendSummary::new(0, Direction::Forward, 50, 150))
                .mapq(mapq)
                .mate_sequence(b"ACGTACGT".to_vec())
                .mate(Some(MateAlignment::new(remote(), 20)))
                .build()
                .unwrap()
                .into(),
        )
    }

    fn softclip(id: &str, source: Arc<EvidenceSource>, untemplated: Option<&[u8]>) -> EvidenceRef {
        Arc::new(
            SoftClipEvidenceBuilder::default()
                .id(id)
                .source(source)
                .reference_index(0)
                .direction(Direction::Forward)
                .alignment_start(91)
                .mapq(40)
                .sequence(b"ACGTACGTACGTTTTT".to_vec())
                .trailing_clip(6)
                .realignment(untemplated.map(|u| Realignment::new(remote(), 30, u.to_vec())))
                .build()
                .unwrap()
                .into(),
        )
    }

    fn assembly(id: &str, untemplated: &[u8]) -> EvidenceRef {
        Arc::new(
            AssemblyEvidenceBuilder::default()
                .id(id)
                .locus(BreakpointSummary::new(breakend(), BreakendSummary::exact(1, Direction::Backward, 205)).into())
                .breakend_sequence(untemplated.to_vec())
                .breakend_quality(vec![30; untemplated.len()])
                .mapq(60)
                .llr(10.0)
                .build()
                .unwrap()
                .into(),
        )
    }

    fn with_context<F: FnOnce(&CallingContext)>(f: F) {
        let scorer = PhredLikelihoodScorer::default();
        let reference = SequenceDictionary::new(vec![("chr1", 1000), ("chr2", 1000)]);
        let context = CallingContext::new(&scorer, &FisherSomaticModel, &reference, 0.001);
        f(&context)
    }

    #[test]
    fn test_non_overlapping_evidence() {
        let far = Arc::new(
            ReadPairEvidenceBuilder::default()
                .id("far")
                .source(EvidenceSource::normal("normal"))
                .local(BreakendSummary::new(0, Direction::Forward, 500, 600))
                .mapq(60)
                .mate_sequence(b"ACGT".to_vec())
                .build()
                .unwrap()
                .into(),
        );
        let err = CallBuilder::new(AnchorCall::at(breakend().into()))
            .add_evidence(far)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::EvidenceDoesNotSupportCall {
                evidence: "far".to_owned(),
                locus: "0:500-600f".to_owned(),
                call: "0:100f".to_owned(),
            })
        );
    }

    #[test]
    fn test_normal_only_collapses() {
        let normal = EvidenceSource::normal("normal");
        let builder = CallBuilder::new(AnchorCall::at(breakend().into()))
            .add_evidence(readpair("rp1", normal.clone(), 10))
            .unwrap()
            .add_evidence(readpair("rp2", normal.clone(), 20))
            .unwrap()
            .add_evidence(readpair("rp3", normal, 30))
            .unwrap();
        with_context(|context| {
            let call = builder.make(context).unwrap();
            assert_eq!(call.attribute(Attribute::ReadpairMapqLocalTotal), Some(&[60][..]));
            assert_eq!(call.attribute(Attribute::ReadpairMapqLocalMax), Some(&[30][..]));
            assert_eq!(call.attribute(Attribute::ReadpairEvidenceCount), Some(&[3][..]));
            assert_eq!(call.attribute_by_name("READPAIR_MAPPED_READPAIR"), Some(&[3][..]));
            assert_eq!(call.attribute(Attribute::ReferenceCountRead), Some(&[0][..]));
            assert_eq!(call.attribute(Attribute::ReferenceCountReadpair), Some(&[0][..]));
            assert_eq!(call.readpair_llr()[1], 0.0);
            assert!(!call.somatic());
        });
    }

    #[test]
    fn test_tumour_split() {
        let builder = CallBuilder::new(AnchorCall::at(breakend().into()))
            .add_evidence(readpair("rp1", EvidenceSource::normal("normal"), 10))
            .unwrap()
            .add_evidence(readpair("rp2", EvidenceSource::tumour("tumour"), 20))
            .unwrap()
            .reference_reads(7, 3);
        with_context(|context| {
            let call = builder.make(context).unwrap();
            assert_eq!(call.attribute(Attribute::ReadpairMapqLocalTotal), Some(&[10, 20][..]));
            assert_eq!(call.attribute(Attribute::ReferenceCountRead), Some(&[7, 3][..]));
            assert!(call.readpair_llr()[1] > call.readpair_llr()[0]);
        });
    }

    #[test]
    fn test_assembled_reads_count_once() {
        let sc = softclip("sc1", EvidenceSource::tumour("tumour"), None);
        let asm: EvidenceRef = Arc::new(
            AssemblyEvidenceBuilder::default()
                .id("asm")
                .locus(breakend().into())
                .breakend_sequence(b"ACGT".to_vec())
                .breakend_quality(vec![30; 4])
                .mapq(60)
                .llr(10.0)
                .supporting(vec![sc.clone(), readpair("rp2", EvidenceSource::tumour("tumour"), 20)])
                .build()
                .unwrap()
                .into(),
        );
        let builder = CallBuilder::new(AnchorCall::at(breakend().into()))
            .add_evidence(sc)
            .unwrap()
            .add_evidence(readpair("rp1", EvidenceSource::normal("normal"), 10))
            .unwrap()
            .add_evidence(asm)
            .unwrap();
        let scorer = PhredLikelihoodScorer::default();
        let statistics = builder.somatic_statistics(
            &builder.scored(&builder.assemblies, &scorer, by_llr),
            &builder.scored(&builder.softclips, &scorer, by_llr),
            &builder.scored(&builder.readpairs, &scorer, by_llr),
        );
        assert_eq!(statistics, SomaticStatistics::new(1, 0, 2, 0));
    }

    #[test]
    fn test_make_is_idempotent_and_order_independent() {
        let evidence = vec![
            softclip("sc1", EvidenceSource::tumour("tumour"), Some(b"TT")),
            softclip("sc2", EvidenceSource::normal("normal"), None),
            readpair("rp1", EvidenceSource::tumour("tumour"), 25),
            assembly("asm1", b"ACGT"),
        ];
        let forward = evidence
            .iter()
            .cloned()
            .try_fold(CallBuilder::new(AnchorCall::at(breakend().into())), |b, e| {
                b.add_evidence(e)
            })
            .unwrap();
        let backward = evidence
            .iter()
            .rev()
            .cloned()
            .try_fold(CallBuilder::new(AnchorCall::at(breakend().into())), |b, e| {
                b.add_evidence(e)
            })
            .unwrap();
        with_context(|context| {
            let first = forward.make(context).unwrap();
            assert_eq!(first, forward.make(context).unwrap());
            assert_eq!(first, backward.make(context).unwrap());
        });
    }

    #[test]
    fn test_assembly_sequence_takes_precedence() {
        let builder = CallBuilder::new(AnchorCall::at(breakend().into()))
            .add_evidence(softclip("sc", EvidenceSource::normal("normal"), Some(b"TTTT")))
            .unwrap()
            .add_evidence(assembly("asm", b"ACGT"))
            .unwrap();
        with_context(|context| {
            let call = builder.make(context).unwrap();
            assert_eq!(call.untemplated_sequence().as_deref(), Some("ACGT"));
            assert_eq!(call.locus().remote(), Some(BreakendSummary::exact(1, Direction::Backward, 205)));
            assert_eq!(call.id(), "callchr1:100f");
            assert_relative_eq!(call.assembly_llr(), 10.0);
        });
    }

    #[test]
    fn test_softclip_sequence_without_assembly() {
        let builder = CallBuilder::new(AnchorCall::at(breakend().into()))
            .add_evidence(softclip("sc", EvidenceSource::normal("normal"), Some(b"TTTT")))
            .unwrap();
        with_context(|context| {
            let call = builder.make(context).unwrap();
            assert_eq!(call.untemplated_sequence().as_deref(), Some("TTTT"));
            assert_eq!(call.locus().remote(), Some(remote()));
            assert_eq!(call.id(), "callchr1:100f");
            assert_eq!(call.attribute(Attribute::SoftclipMapqRemoteTotal), Some(&[30][..]));
        });
    }

    #[test]
    fn test_anchor_scores_are_carried() {
        let anchor = AnchorCallBuilder::default()
            .locus(breakend().into())
            .assembly_llr(1.5)
            .softclip_llr([0.5, 1.0])
            .build()
            .unwrap();
        with_context(|context| {
            let call = CallBuilder::new(anchor).make(context).unwrap();
            assert_relative_eq!(call.llr(), 3.0);
            assert_relative_eq!(call.quality(), llr_to_phred(3.0));
            assert_eq!(call.id(), "callchr1:100f");
            assert_eq!(call.untemplated_sequence(), &None);
            assert_eq!(call.attribute(Attribute::AssemblyEvidenceCount), Some(&[0][..]));
        });
    }
}
