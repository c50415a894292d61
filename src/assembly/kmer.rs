// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! 2-bit packed k-mers.
//!
//! The first base occupies the most significant bits, so that the numeric order of packed
//! k-mers of equal size is their lexicographic order.

use anyhow::Result;

use crate::errors::Error;

pub type Kmer = u64;

pub const MAX_K: usize = 32;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

pub fn check_kmer_size(k: usize) -> Result<()> {
    if (2..=MAX_K).contains(&k) {
        Ok(())
    } else {
        Err(Error::InvalidKmerSize { k }.into())
    }
}

fn mask(k: usize) -> Kmer {
    if k >= MAX_K {
        !0
    } else {
        (1 << (2 * k)) - 1
    }
}

pub fn encode_base(base: u8) -> Option<Kmer> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Pack the given bases, `None` if any of them is ambiguous.
pub fn encode(seq: &[u8]) -> Option<Kmer> {
    seq.iter()
        .try_fold(0, |kmer, base| encode_base(*base).map(|b| (kmer << 2) | b))
}

pub fn decode(kmer: Kmer, k: usize) -> Vec<u8> {
    (0..k)
        .rev()
        .map(|i| BASES[((kmer >> (2 * i)) & 3) as usize])
        .collect()
}

pub fn last_base(kmer: Kmer) -> u8 {
    BASES[(kmer & 3) as usize]
}

/// The first k-1 bases.
pub fn prefix(kmer: Kmer) -> Kmer {
    kmer >> 2
}

/// The last k-1 bases.
pub fn suffix(kmer: Kmer, k: usize) -> Kmer {
    kmer & mask(k - 1)
}

/// All k-mers of the given sequence by offset. K-mers covering an ambiguous base are `None`.
pub fn kmers(seq: &[u8], k: usize) -> impl Iterator<Item = Option<Kmer>> + '_ {
    let mut kmer: Kmer = 0;
    let mut valid = 0;
    seq.iter().enumerate().filter_map(move |(i, base)| {
        match encode_base(*base) {
            Some(b) => {
                kmer = ((kmer << 2) | b) & mask(k);
                valid += 1;
            }
            None => valid = 0,
        }
        if i + 1 >= k {
            Some(if valid >= k { Some(kmer) } else { None })
        } else {
            None
        }
    })
}
