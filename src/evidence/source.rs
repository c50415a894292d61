// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Readers of raw evidence, partitioned by reference sequence.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::evidence::{Evidence, RemoteSoftClipEvidence};
use crate::locus::by_genomic_position;

pub type EvidenceIter<'a> = Box<dyn Iterator<Item = Result<Evidence>> + 'a>;

/// Source of raw evidence. Partition `i` holds the evidence of reference sequence `i`, ordered
/// by local start position.
pub trait ReadEvidenceSource: Sync {
    fn partition_count(&self) -> usize;

    /// Lazily iterate over the evidence of the given partition.
    fn partition(&self, index: usize) -> Result<EvidenceIter<'_>>;

    /// Like `partition`, but malformed evidence is skipped with a warning. Read errors are
    /// passed on.
    fn valid_partition(&self, index: usize) -> Result<EvidenceIter<'_>> {
        Ok(Box::new(self.partition(index)?.filter(|evidence| {
            match evidence.as_ref().map(|e| e.validate()) {
                Ok(Err(err)) => {
                    warn!("skipping {}", err);
                    false
                }
                _ => true,
            }
        })))
    }

    /// Iterate over the evidence of all partitions.
    fn all(&self) -> Result<EvidenceIter<'_>> {
        let partitions = (0..self.partition_count())
            .map(|index| self.partition(index))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(partitions.into_iter().flatten()))
    }

    /// Remote views of all realigned soft clips whose clipped bases align to the given
    /// partition, in genomic order. Malformed soft clips are left out.
    fn remote_partition(&self, index: usize) -> Result<Vec<Evidence>> {
        let mut remote = Vec::new();
        for evidence in self.all()? {
            let evidence = evidence?;
            if evidence.validate().is_err() {
                continue;
            }
            if let Evidence::SoftClip(ref sc) = evidence {
                if let Some(r) = RemoteSoftClipEvidence::from_softclip(sc) {
                    if r.locus().reference_index() == index {
                        remote.push(Evidence::from(r));
                    }
                }
            }
        }
        remote.sort_by(|a, b| {
            by_genomic_position(&a.locus(), &b.locus()).then_with(|| a.id().cmp(b.id()))
        });
        Ok(remote)
    }
}

/// Evidence held in memory, mainly for testing and for embedding the caller.
#[derive(Debug, Default)]
pub struct InMemoryEvidenceSource {
    partitions: Vec<Vec<Evidence>>,
}

impl InMemoryEvidenceSource {
    /// Distribute the given evidence over `partition_count` partitions by reference index.
    /// The relative order of the evidence is kept.
    pub fn new<I>(evidence: I, partition_count: usize) -> Self
    where
        I: IntoIterator<Item = Evidence>,
    {
        let mut partitions = vec![Vec::new(); partition_count];
        for e in evidence {
            let reference_index = e.locus().reference_index();
            if reference_index >= partitions.len() {
                partitions.resize(reference_index + 1, Vec::new());
            }
            partitions[reference_index].push(e);
        }
        InMemoryEvidenceSource { partitions }
    }
}

impl ReadEvidenceSource for InMemoryEvidenceSource {
    fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    fn partition(&self, index: usize) -> Result<EvidenceIter<'_>> {
        let partition = self.partitions.get(index).map(|p| p.as_slice()).unwrap_or(&[]);
        Ok(Box::new(partition.iter().cloned().map(Ok)))
    }
}

/// Evidence stored as one JSON object per line. The file is scanned once per partition, and
/// once more per partition for remote soft clips.
#[derive(Debug, Clone, new)]
pub struct JsonLinesEvidenceSource {
    path: PathBuf,
    partition_count: usize,
}

impl JsonLinesEvidenceSource {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JsonLinesEvidenceSource {
    fn records(&self) -> Result<EvidenceIter<'_>> {
        let reader = BufReader::new(
            fs::File::open(&self.path)
                .with_context(|| format!("unable to open evidence file {}", self.path.display()))?,
        );
        let path = self.path.clone();

        Ok(Box::new(reader.lines().enumerate().filter_map(
            move |(i, line)| {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        return Some(Err(anyhow::Error::new(e).context(format!(
                            "error reading line {} of {}",
                            i + 1,
                            path.display()
                        ))))
                    }
                };
                if line.trim().is_empty() {
                    return None;
                }
                Some(serde_json::from_str::<Evidence>(&line).with_context(|| {
                    format!("invalid evidence in line {} of {}", i + 1, path.display())
                }))
            },
        )))
    }
}

impl ReadEvidenceSource for JsonLinesEvidenceSource {
    fn partition_count(&self) -> usize {
        self.partition_count
    }

    fn partition(&self, index: usize) -> Result<EvidenceIter<'_>> {
        Ok(Box::new(self.records()?.filter(move |evidence| match evidence {
            Ok(e) => e.locus().reference_index() == index,
            Err(_) => true,
        })))
    }

    /// A single scan over the file.
    fn all(&self) -> Result<EvidenceIter<'_>> {
        self.records()
    }
}
