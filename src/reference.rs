// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::path::Path;

use anyhow::Result;
use bio::io::fasta;

use crate::errors::Error;

/// Lookup of reference sequence names and lengths by index.
pub trait ReferenceLookup: Send + Sync {
    fn name(&self, index: usize) -> Result<&str>;

    fn length(&self, index: usize) -> Result<u64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The reference sequences of a genome, in index order.
#[derive(Debug, Clone, Default)]
pub struct SequenceDictionary {
    sequences: Vec<fasta::Sequence>,
}

impl SequenceDictionary {
    pub fn new<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        SequenceDictionary {
            sequences: sequences
                .into_iter()
                .map(|(name, len)| fasta::Sequence {
                    name: name.into(),
                    len,
                })
                .collect(),
        }
    }

    /// Read the dictionary from a samtools faidx index (.fai).
    pub fn from_fai<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self> {
        let index = fasta::Index::from_file(&path)?;
        Ok(SequenceDictionary {
            sequences: index.sequences(),
        })
    }

    fn get(&self, index: usize) -> Result<&fasta::Sequence> {
        Ok(self
            .sequences
            .get(index)
            .ok_or(Error::UnknownReferenceIndex { index })?)
    }
}

impl ReferenceLookup for SequenceDictionary {
    fn name(&self, index: usize) -> Result<&str> {
        Ok(&self.get(index)?.name)
    }

    fn length(&self, index: usize) -> Result<u64> {
        Ok(self.get(index)?.len)
    }

    fn len(&self) -> usize {
        self.sequences.len()
    }
}
