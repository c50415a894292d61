// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Partition-parallel calling: read, assemble, cluster and call each reference sequence on
//! its own worker, and emit the calls in genomic order.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bio_types::genome::Locus;
use crossbeam::channel::{Receiver, Sender};
use itertools::Itertools;
use progress_logger::ProgressLogger;

use crate::assembly::{Assembler, MinBaseQuality};
use crate::assembly::support::KmerWeighting;
use crate::calling::builder::CallingContext;
use crate::calling::call::StructuralVariantCall;
use crate::calling::cluster::cluster;
use crate::errors::Error;
use crate::evidence::{
    Evidence, EvidenceRef, ReadEvidenceSource, RealignedEvidenceSource, RealignmentLookup,
};
use crate::locus::by_genomic_position;
use crate::model::{somatic_model, LikelihoodScorer, PhredLikelihoodScorer, SomaticModel};
use crate::parameters::Parameters;
use crate::reference::ReferenceLookup;
use crate::utils::worker_pool::{worker_pool, Orderable};

struct PartitionCalls {
    index: usize,
    calls: Vec<StructuralVariantCall>,
}

impl Orderable for PartitionCalls {
    fn index(&self) -> usize {
        self.index
    }
}

/// Caller of structural variants over all partitions of an evidence source.
///
/// Scorer and somatic model default to the PHRED based scorer and the test chosen in the
/// calling parameters, k-mer weighting to the minimum base quality.
///
/// With `realignments`, soft clips and assemblies are resolved into breakpoints using the
/// realigned breakend sequences.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct Caller<'a> {
    source: &'a dyn ReadEvidenceSource,
    reference: &'a dyn ReferenceLookup,
    #[builder(default)]
    parameters: Parameters,
    #[builder(default, setter(strip_option))]
    scorer: Option<Box<dyn LikelihoodScorer>>,
    #[builder(default, setter(strip_option))]
    somatic_model: Option<Box<dyn SomaticModel>>,
    #[builder(default = "Box::new(MinBaseQuality)")]
    weighting: Box<dyn KmerWeighting>,
    #[builder(default, setter(strip_option))]
    realignments: Option<&'a RealignmentLookup>,
}

impl<'a> Caller<'a> {
    /// Call all partitions and pass the calls to `sink`, ordered by partition and genomic
    /// position.
    pub fn call<F>(&self, mut sink: F) -> Result<()>
    where
        F: FnMut(StructuralVariantCall) -> Result<()> + Send,
    {
        self.parameters.validate()?;
        let default_scorer = PhredLikelihoodScorer::new(self.parameters.calling());
        let scorer: &dyn LikelihoodScorer = match self.scorer {
            Some(ref scorer) => scorer.as_ref(),
            None => &default_scorer,
        };
        let default_somatic_model = somatic_model(self.parameters.calling());
        let somatic_model: &dyn SomaticModel = match self.somatic_model {
            Some(ref model) => model.as_ref(),
            None => default_somatic_model.as_ref(),
        };
        let realigned;
        let source: &dyn ReadEvidenceSource = match self.realignments {
            Some(realignments) => {
                realigned = RealignedEvidenceSource::new(self.source, realignments);
                &realigned
            }
            None => self.source,
        };
        let pipeline = self.parameters.pipeline();
        info!(
            "calling {} partitions with {} threads",
            source.partition_count(),
            pipeline.threads()
        );

        let preprocessor = |sender: Sender<(usize, Vec<EvidenceRef>)>| -> Result<()> {
            for index in 0..source.partition_count() {
                let evidence = self.read_partition(source, index)?;
                if sender.send((index, evidence)).is_err() {
                    // downstream failed, its error is reported by the pool
                    break;
                }
            }
            Ok(())
        };

        let workers = (0..pipeline.threads()).map(|_| {
            move |receiver: Receiver<(usize, Vec<EvidenceRef>)>,
                  sender: Sender<Box<PartitionCalls>>|
                  -> Result<()> {
                for (index, evidence) in receiver {
                    let calls = self.call_partition(index, evidence, scorer, somatic_model)?;
                    if sender.send(Box::new(PartitionCalls { index, calls })).is_err() {
                        break;
                    }
                }
                Ok(())
            }
        });

        let mut progress_logger = ProgressLogger::builder()
            .with_items_name("calls")
            .with_frequency(Duration::from_secs(20))
            .start();
        let postprocessor = |partition: Box<PartitionCalls>| -> Result<()> {
            debug!(
                "partition {}: {} calls",
                partition.index,
                partition.calls.len()
            );
            for call in partition.calls {
                sink(call)?;
                progress_logger.update(1u64);
            }
            Ok(())
        };

        worker_pool(
            preprocessor,
            workers,
            postprocessor,
            pipeline.channel_capacity(),
            pipeline.channel_capacity(),
        )?;
        progress_logger.stop();
        Ok(())
    }

    /// Read the evidence of a partition, checking that it belongs there and is sorted by
    /// position. Malformed evidence is skipped. The remote views of soft clips realigned to
    /// this partition are appended.
    fn read_partition(
        &self,
        source: &dyn ReadEvidenceSource,
        index: usize,
    ) -> Result<Vec<EvidenceRef>> {
        let mut evidence = Vec::new();
        let mut previous: Option<i64> = None;
        for e in source.valid_partition(index)? {
            let e = e?;
            let locus = e.locus();
            if locus.reference_index() != index {
                return Err(Error::EvidenceInWrongPartition {
                    id: e.id().to_owned(),
                    expected: index,
                    found: locus.reference_index(),
                }
                .into());
            }
            if let Some(previous) = previous {
                if previous > locus.start() {
                    let name = self.reference.name(index)?;
                    return Err(Error::UnsortedEvidence {
                        previous_locus: Locus::new(name.to_owned(), previous as u64),
                        current_locus: Locus::new(name.to_owned(), locus.start() as u64),
                    }
                    .into());
                }
            }
            previous = Some(locus.start());
            evidence.push(Arc::new(e));
        }
        evidence.extend(source.remote_partition(index)?.into_iter().map(Arc::new));
        Ok(evidence)
    }

    fn call_partition(
        &self,
        index: usize,
        mut evidence: Vec<EvidenceRef>,
        scorer: &dyn LikelihoodScorer,
        somatic_model: &dyn SomaticModel,
    ) -> Result<Vec<StructuralVariantCall>> {
        let assembler = Assembler::new(
            self.parameters.assembly(),
            self.weighting.as_ref(),
            self.reference,
        );
        let assemblies = assembler.assemble(&evidence)?;
        debug!(
            "partition {}: {} evidence, {} assemblies",
            index,
            evidence.len(),
            assemblies.len()
        );
        evidence.extend(assemblies.into_iter().map(|asm| {
            let asm = Evidence::from(asm);
            Arc::new(match self.realignments {
                Some(realignments) => realignments.realign(asm),
                None => asm,
            })
        }));

        let context = CallingContext::new(
            scorer,
            somatic_model,
            self.reference,
            self.parameters.calling().somatic_pvalue_threshold(),
        );
        let calls: Result<Vec<_>> = cluster(evidence, scorer)?
            .iter()
            .map(|builder| builder.make(&context))
            .collect();

        Ok(calls?
            .into_iter()
            .sorted_by(|a, b| {
                by_genomic_position(&a.locus(), &b.locus()).then_with(|| a.id().cmp(b.id()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::fastq::RealignmentKey;
    use crate::evidence::{
        BreakendAlignment, Evidence, EvidenceSource, InMemoryEvidenceSource,
        ReadPairEvidenceBuilder, SoftClipEvidence, SoftClipEvidenceBuilder,
    };
    use crate::locus::{BreakendSummary, Direction};
    use crate::reference::SequenceDictionary;

    fn readpair(id: &str, reference_index: usize, start: i64) -> Evidence {
        sample_readpair(id, EvidenceSource::normal("normal"), reference_index, start)
    }

    fn sample_readpair(
        id: &str,
        source: Arc<EvidenceSource>,
        reference_index: usize,
        start: i64,
    ) -> Evidence {
        ReadPairEvidenceBuilder::default()
            .id(id)
            .source(source)
            .local(BreakendSummary::new(reference_index, Direction::Forward, start, start + 10))
            .mapq(60)
            .mate_sequence(b"ACGT".to_vec())
            .build()
            .unwrap()
            .into()
    }

    fn softclip(id: &str) -> SoftClipEvidence {
        SoftClipEvidenceBuilder::default()
            .id(id)
            .source(EvidenceSource::tumour("tumour"))
            .reference_index(0)
            .direction(Direction::Forward)
            .alignment_start(91)
            .mapq(60)
            .sequence(b"CCCCCCCCTTACGT".to_vec())
            .trailing_clip(6)
            .build()
            .unwrap()
    }

    fn collect_calls(caller: &Caller) -> Vec<StructuralVariantCall> {
        let mut calls = Vec::new();
        caller
            .call(|call| {
                calls.push(call);
                Ok(())
            })
            .unwrap();
        calls
    }

    fn containing<'c>(calls: &'c [StructuralVariantCall], id: &str) -> &'c StructuralVariantCall {
        calls
            .iter()
            .find(|call| call.evidence_ids().iter().any(|e| e == id))
            .unwrap()
    }

    #[test]
    fn test_unsorted_partition() {
        let source = InMemoryEvidenceSource::new(vec![readpair("a", 0, 100), readpair("b", 0, 50)], 1);
        let reference = SequenceDictionary::new(vec![("chr1", 1000)]);
        let caller = CallerBuilder::default()
            .source(&source)
            .reference(&reference)
            .build()
            .unwrap();
        let err = caller.call(|_| Ok(())).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::UnsortedEvidence {
                previous_locus: Locus::new("chr1".to_owned(), 100),
                current_locus: Locus::new("chr1".to_owned(), 50),
            })
        );
    }

    #[test]
    fn test_calls_in_partition_order() {
        let evidence = (0..4)
            .rev()
            .flat_map(|i| vec![readpair(&format!("a{}", i), i, 10), readpair(&format!("b{}", i), i, 500)]);
        let source = InMemoryEvidenceSource::new(evidence, 4);
        let reference = SequenceDictionary::new((0..4).map(|i| (format!("chr{}", i), 1000)));
        let parameters = Parameters::default().with_threads(3);
        let caller = CallerBuilder::default()
            .source(&source)
            .reference(&reference)
            .parameters(parameters)
            .build()
            .unwrap();

        let mut calls = Vec::new();
        caller
            .call(|call| {
                calls.push(call);
                Ok(())
            })
            .unwrap();
        let loci = calls
            .iter()
            .map(|call| (call.locus().reference_index(), call.locus().start()))
            .collect_vec();
        assert_eq!(
            loci,
            vec![(0, 10), (0, 500), (1, 10), (1, 500), (2, 10), (2, 500), (3, 10), (3, 500)]
        );
    }

    #[test]
    fn test_tumour_specific_support_is_somatic() {
        let mut evidence = vec![sample_readpair("n0", EvidenceSource::normal("normal"), 0, 100)];
        evidence.extend(
            (0..30).map(|i| sample_readpair(&format!("t{}", i), EvidenceSource::tumour("tumour"), 0, 100)),
        );
        let source = InMemoryEvidenceSource::new(evidence, 1);
        let reference = SequenceDictionary::new(vec![("chr1", 1000)]);
        let caller = CallerBuilder::default()
            .source(&source)
            .reference(&reference)
            .build()
            .unwrap();

        let calls = collect_calls(&caller);
        let call = containing(&calls, "t0");
        assert!(call.evidence_ids().iter().any(|e| e == "n0"));
        assert!(call.somatic());
        assert!(call.somatic_pvalue() < 1e-6);
    }

    #[test]
    fn test_malformed_evidence_is_skipped() {
        let mut value = serde_json::to_value(softclip("bad")).unwrap();
        value["trailing_clip"] = serde_json::json!(30);
        let malformed: SoftClipEvidence = serde_json::from_value(value).unwrap();
        let source = InMemoryEvidenceSource::new(
            vec![malformed.into(), readpair("a", 0, 100)],
            1,
        );
        let reference = SequenceDictionary::new(vec![("chr1", 1000)]);
        let caller = CallerBuilder::default()
            .source(&source)
            .reference(&reference)
            .build()
            .unwrap();

        let calls = collect_calls(&caller);
        assert!(!calls.is_empty());
        assert!(calls
            .iter()
            .all(|call| call.evidence_ids().iter().all(|e| e != "bad")));
    }

    #[test]
    fn test_realigned_softclip_supports_both_sides() {
        let sc = Evidence::from(softclip("sc1"));
        let mut realignments = RealignmentLookup::default();
        realignments.insert(
            RealignmentKey::of(&sc),
            BreakendAlignment::new(1, 300, 303, false, 2, 0, 37),
        );
        let source = InMemoryEvidenceSource::new(vec![sc], 2);
        let reference = SequenceDictionary::new(vec![("chr1", 1000), ("chr2", 1000)]);
        let caller = CallerBuilder::default()
            .source(&source)
            .reference(&reference)
            .realignments(&realignments)
            .build()
            .unwrap();

        let calls = collect_calls(&caller);
        let local = containing(&calls, "sc1");
        assert_eq!(local.locus().reference_index(), 0);
        assert_eq!(
            local.locus().remote(),
            Some(BreakendSummary::exact(1, Direction::Backward, 300))
        );
        let remote = containing(&calls, "Rsc1");
        assert_eq!(remote.locus().reference_index(), 1);
        assert_eq!(
            remote.locus().remote(),
            Some(BreakendSummary::exact(0, Direction::Forward, 98))
        );
    }
}
