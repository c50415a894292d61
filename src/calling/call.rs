// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::BTreeMap;
use std::str::FromStr;

use strum_macros::{Display, EnumString};

use crate::evidence::AssemblyFilter;
use crate::locus::BreakendLocus;

/// Aggregated integer attributes of a call. Each value is either `[normal, tumour]` or a single
/// collapsed total.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    AssemblyEvidenceCount,
    AssemblyMapped,
    AssemblyMapqRemoteMax,
    AssemblyMapqRemoteTotal,
    AssemblyLengthLocalMax,
    AssemblyLengthRemoteMax,
    AssemblyBaseCount,
    AssemblyReadpairCount,
    AssemblyReadpairLengthMax,
    AssemblySoftclipCount,
    AssemblySoftclipCliplengthTotal,
    AssemblySoftclipCliplengthMax,
    ReadpairEvidenceCount,
    ReadpairMappedReadpair,
    ReadpairMapqLocalMax,
    ReadpairMapqLocalTotal,
    ReadpairMapqRemoteMax,
    ReadpairMapqRemoteTotal,
    SoftclipEvidenceCount,
    SoftclipMapped,
    SoftclipMapqRemoteMax,
    SoftclipMapqRemoteTotal,
    SoftclipLengthRemoteMax,
    SoftclipLengthRemoteTotal,
    ReferenceCountRead,
    ReferenceCountReadpair,
}

/// A structural variant call, merged from all evidence of one breakpoint locus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct StructuralVariantCall {
    #[getset(get = "pub")]
    id: String,
    #[getset(get_copy = "pub")]
    locus: BreakendLocus,
    /// Inserted bases between the two sides of the breakpoint, if known.
    #[getset(get = "pub")]
    untemplated_sequence: Option<String>,
    #[getset(get_copy = "pub")]
    llr: f64,
    /// PHRED scaled probability of the reference allele.
    #[getset(get_copy = "pub")]
    quality: f64,
    #[getset(get_copy = "pub")]
    assembly_llr: f64,
    #[getset(get_copy = "pub")]
    softclip_llr: [f64; 2],
    #[getset(get_copy = "pub")]
    readpair_llr: [f64; 2],
    #[getset(get = "pub")]
    attributes: BTreeMap<Attribute, Vec<i64>>,
    #[getset(get = "pub")]
    assembly_consensus: Vec<String>,
    #[getset(get = "pub")]
    assembly_program: Vec<String>,
    #[getset(get_copy = "pub")]
    somatic_pvalue: f64,
    #[getset(get_copy = "pub")]
    somatic: bool,
    #[getset(get = "pub")]
    evidence_ids: Vec<String>,
    #[getset(get = "pub")]
    filters: Vec<AssemblyFilter>,
}

impl StructuralVariantCall {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        locus: BreakendLocus,
        untemplated_sequence: Option<String>,
        llr: f64,
        quality: f64,
        assembly_llr: f64,
        softclip_llr: [f64; 2],
        readpair_llr: [f64; 2],
        attributes: BTreeMap<Attribute, Vec<i64>>,
        assembly_consensus: Vec<String>,
        assembly_program: Vec<String>,
        somatic_pvalue: f64,
        somatic: bool,
        evidence_ids: Vec<String>,
        filters: Vec<AssemblyFilter>,
    ) -> Self {
        StructuralVariantCall {
            id,
            locus,
            untemplated_sequence,
            llr,
            quality,
            assembly_llr,
            softclip_llr,
            readpair_llr,
            attributes,
            assembly_consensus,
            assembly_program,
            somatic_pvalue,
            somatic,
            evidence_ids,
            filters,
        }
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<&[i64]> {
        self.attributes.get(&attribute).map(|v| v.as_slice())
    }

    /// Look up an attribute by its output name, e.g. `READPAIR_MAPQ_LOCAL_TOTAL`.
    pub fn attribute_by_name(&self, name: &str) -> Option<&[i64]> {
        Attribute::from_str(name)
            .ok()
            .and_then(|attribute| self.attribute(attribute))
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names() {
        assert_eq!(
            Attribute::AssemblySoftclipCliplengthTotal.to_string(),
            "ASSEMBLY_SOFTCLIP_CLIPLENGTH_TOTAL"
        );
        assert_eq!(
            Attribute::from_str("REFERENCE_COUNT_READPAIR").unwrap(),
            Attribute::ReferenceCountReadpair
        );
        assert_eq!(
            serde_json::to_string(&Attribute::ReadpairMappedReadpair).unwrap(),
            "\"READPAIR_MAPPED_READPAIR\""
        );
    }
}
