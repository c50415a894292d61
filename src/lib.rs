// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Calling of structural variant breakpoints from soft clipped reads, discordant read pairs
//! and a positional de Bruijn graph assembly of their breakend sequences.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate getset;
#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate derive_builder;
#[macro_use]
extern crate lazy_static;
#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod assembly;
pub mod calling;
pub mod cli;
pub mod errors;
pub mod evidence;
pub mod locus;
pub mod model;
pub mod parameters;
pub mod reference;
pub(crate) mod utils;

pub use calling::{Caller, CallerBuilder, StructuralVariantCall};
pub use parameters::Parameters;
