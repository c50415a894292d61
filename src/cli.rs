// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bio::io::fastq;
use structopt::StructOpt;

use crate::assembly::{Assembler, MinBaseQuality};
use crate::calling::CallerBuilder;
use crate::evidence::fastq::write_realignment_fastq;
use crate::evidence::{
    Evidence, EvidenceRef, JsonLinesEvidenceSource, ReadEvidenceSource, RealignmentLookup,
};
use crate::parameters::Parameters;
use crate::reference::{ReferenceLookup, SequenceDictionary};

#[derive(Debug, StructOpt, Clone)]
#[structopt(
    name = "breakend-caller",
    about = "Structural variant breakpoint calling from soft clipped reads, discordant read pairs and local assembly."
)]
#[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
pub enum BreakendCaller {
    #[structopt(
        name = "call",
        about = "Assemble and call structural variant breakpoints from the given evidence."
    )]
    #[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
    Call {
        #[structopt(
            long,
            parse(from_os_str),
            help = "Evidence in JSON lines format, sorted by reference index and position."
        )]
        evidence: PathBuf,
        #[structopt(
            long,
            parse(from_os_str),
            help = "FASTA index (.fai) of the reference genome, as written by samtools faidx."
        )]
        fai: PathBuf,
        #[structopt(long, parse(from_os_str), help = "YAML file with assembly and calling parameters.")]
        config: Option<PathBuf>,
        #[structopt(long, short = "t", help = "Number of threads to use (overrides the config).")]
        threads: Option<usize>,
        #[structopt(
            long,
            parse(from_os_str),
            help = "SAM, BAM or CRAM file with the realigned records of encode-realignment."
        )]
        realigned: Option<PathBuf>,
        #[structopt(
            long,
            short = "o",
            parse(from_os_str),
            help = "File to write calls to as JSON lines (if omitted, write to STDOUT)."
        )]
        output: Option<PathBuf>,
    },
    #[structopt(
        name = "encode-realignment",
        about = "Write breakend sequences as FASTQ for realignment by an external aligner. \
                 Read names encode reference index, position and evidence identifier."
    )]
    #[structopt(setting = structopt::clap::AppSettings::ColoredHelp)]
    EncodeRealignment {
        #[structopt(long, parse(from_os_str), help = "Evidence in JSON lines format.")]
        evidence: PathBuf,
        #[structopt(long, parse(from_os_str), help = "FASTA index (.fai) of the reference genome.")]
        fai: PathBuf,
        #[structopt(long, parse(from_os_str), help = "YAML file with assembly parameters.")]
        config: Option<PathBuf>,
        #[structopt(long, help = "Also assemble the evidence and write the assembled breakends.")]
        assemble: bool,
        #[structopt(
            long,
            short = "o",
            parse(from_os_str),
            help = "FASTQ file to write (if omitted, write to STDOUT)."
        )]
        output: Option<PathBuf>,
    },
}

fn load_parameters(config: &Option<PathBuf>) -> Result<Parameters> {
    match config {
        Some(path) => Parameters::from_path(path),
        None => Ok(Parameters::default()),
    }
}

fn output_writer(output: &Option<PathBuf>) -> Result<Box<dyn Write + Send>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("unable to create output file {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

pub fn run(opt: BreakendCaller) -> Result<()> {
    match opt {
        BreakendCaller::Call {
            ref evidence,
            ref fai,
            ref config,
            threads,
            ref realigned,
            ref output,
        } => {
            let mut parameters = load_parameters(config)?;
            if let Some(threads) = threads {
                parameters = parameters.with_threads(threads);
            }
            let reference = SequenceDictionary::from_fai(fai)?;
            let source = JsonLinesEvidenceSource::new(evidence.clone(), reference.len());

            let realignments = realigned
                .as_ref()
                .map(|path| RealignmentLookup::from_path(path))
                .transpose()?;

            let mut writer = output_writer(output)?;
            let mut builder = CallerBuilder::default()
                .source(&source)
                .reference(&reference)
                .parameters(parameters);
            if let Some(ref realignments) = realignments {
                builder = builder.realignments(realignments);
            }
            let caller = builder.build()?;
            caller.call(|call| {
                serde_json::to_writer(&mut writer, &call)?;
                writeln!(writer)?;
                Ok(())
            })?;
            writer.flush()?;
        }
        BreakendCaller::EncodeRealignment {
            ref evidence,
            ref fai,
            ref config,
            assemble,
            ref output,
        } => {
            let parameters = load_parameters(config)?;
            let reference = SequenceDictionary::from_fai(fai)?;
            let source = JsonLinesEvidenceSource::new(evidence.clone(), reference.len());
            let assembler = Assembler::new(parameters.assembly(), &MinBaseQuality, &reference);
            let fallback_quality = parameters.assembly().fallback_base_quality();

            let mut writer = fastq::Writer::new(output_writer(output)?);
            let mut written = 0;
            for index in 0..source.partition_count() {
                let partition = source
                    .valid_partition(index)?
                    .map(|e| e.map(Arc::new))
                    .collect::<Result<Vec<EvidenceRef>>>()?;
                written += write_realignment_fastq(
                    partition.iter().map(|e| e.as_ref()),
                    &mut writer,
                    fallback_quality,
                )?;
                if assemble {
                    let assemblies = assembler
                        .assemble(&partition)?
                        .into_iter()
                        .map(Evidence::from)
                        .collect::<Vec<_>>();
                    written += write_realignment_fastq(&assemblies, &mut writer, fallback_quality)?;
                }
            }
            info!("wrote {} realignment records", written);
        }
    }
    Ok(())
}
