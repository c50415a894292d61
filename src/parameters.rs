// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Run parameters. All values can be given in a YAML file, missing values take their defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use strum_macros::{Display, EnumString};

use crate::errors::Error;

/// Parameters of the positional assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, CopyGetters)]
#[serde(default)]
#[builder(pattern = "owned", default)]
#[getset(get_copy = "pub")]
pub struct AssemblyParameters {
    /// K-mer size (2 to 32).
    k: usize,
    /// Maximum expected fragment size, bounding the position uncertainty of read pairs.
    max_fragment_size: i64,
    /// Maximum positional width of a connected subgraph, in multiples of the maximum fragment
    /// size. `None` disables the check.
    max_subgraph_fragment_width: Option<f64>,
    /// Maximum number of nodes in the graph of a single window. `None` disables the check.
    max_graph_nodes: Option<usize>,
    /// Contigs supported by fewer evidence items are filtered.
    min_evidence_count: usize,
    /// Contigs with a lower total k-mer weight are filtered.
    min_contig_weight: u64,
    /// Contigs with fewer bases are filtered.
    min_contig_length: usize,
    /// Report filtered contigs (with filter markers) instead of dropping them.
    write_filtered_assemblies: bool,
    /// Base quality assumed for evidence without base qualities.
    fallback_base_quality: u8,
}

impl Default for AssemblyParameters {
    fn default() -> Self {
        AssemblyParameters {
            k: 25,
            max_fragment_size: 600,
            max_subgraph_fragment_width: Some(16.0),
            max_graph_nodes: Some(200_000),
            min_evidence_count: 2,
            min_contig_weight: 0,
            min_contig_length: 0,
            write_filtered_assemblies: false,
            fallback_base_quality: 20,
        }
    }
}

impl AssemblyParameters {
    /// Maximum subgraph width in bases, if limited.
    pub fn max_subgraph_width(&self) -> Option<i64> {
        self.max_subgraph_fragment_width
            .filter(|w| *w > 0.0)
            .map(|w| (w * self.max_fragment_size as f64).ceil() as i64)
    }
}

/// Statistical test for the somatic p-value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SomaticModelKind {
    /// Binomial test of the tumour share of the supporting reads.
    Binomial,
    /// Fisher's exact test of supporting versus reference reads. Requires reference counts.
    Fisher,
}

/// Parameters of the evidence scoring and call synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, CopyGetters)]
#[serde(default)]
#[builder(pattern = "owned", default)]
#[getset(get_copy = "pub")]
pub struct CallingParameters {
    /// Calls with a somatic p-value below this threshold are flagged as somatic.
    somatic_pvalue_threshold: f64,
    /// Mapping qualities are capped at this value before scoring.
    max_mapq: u8,
    /// Soft clips with at least this many clipped bases receive full weight.
    full_weight_clip_length: usize,
    somatic_model: SomaticModelKind,
    /// Expected share of tumour reads at a germline breakend, used by the binomial test when
    /// no reference read counts are known.
    tumour_fraction: f64,
}

impl Default for CallingParameters {
    fn default() -> Self {
        CallingParameters {
            somatic_pvalue_threshold: 0.001,
            max_mapq: 60,
            full_weight_clip_length: 25,
            somatic_model: SomaticModelKind::Binomial,
            tumour_fraction: 0.5,
        }
    }
}

/// Parameters of the partition pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, CopyGetters)]
#[serde(default)]
#[builder(pattern = "owned", default)]
#[getset(get_copy = "pub")]
pub struct PipelineParameters {
    /// Number of partition workers.
    threads: usize,
    /// Capacity of the bounded queues between the pipeline stages.
    channel_capacity: usize,
}

impl Default for PipelineParameters {
    fn default() -> Self {
        PipelineParameters {
            threads: 1,
            channel_capacity: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[serde(default)]
#[builder(pattern = "owned", default)]
#[getset(get = "pub")]
pub struct Parameters {
    assembly: AssemblyParameters,
    calling: CallingParameters,
    pipeline: PipelineParameters,
}

impl Parameters {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let parameters: Parameters = serde_yaml::from_str(yaml)?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = fs::read_to_string(path.as_ref())
            .with_context(|| format!("unable to read parameters from {}", path.as_ref().display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Override the number of workers, e.g. from the command line.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.pipeline.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> {
            Err(Error::InvalidParameters {
                msg: msg.to_owned(),
            }
            .into())
        };
        let k = self.assembly.k;
        if !(2..=32).contains(&k) {
            return Err(Error::InvalidKmerSize { k }.into());
        }
        if self.assembly.max_fragment_size < 0 {
            return invalid("max_fragment_size must not be negative");
        }
        if self.assembly.min_evidence_count == 0 {
            return invalid("min_evidence_count must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.calling.somatic_pvalue_threshold) {
            return invalid("somatic_pvalue_threshold must be between 0 and 1");
        }
        let tumour_fraction = self.calling.tumour_fraction;
        if !(tumour_fraction > 0.0 && tumour_fraction < 1.0) {
            return invalid("tumour_fraction must lie strictly between 0 and 1");
        }
        if self.pipeline.threads == 0 || self.pipeline.channel_capacity == 0 {
            return invalid("threads and channel_capacity must be at least 1");
        }
        Ok(())
    }
}
