// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

pub mod aggregate;
pub mod builder;
pub mod call;
pub mod cluster;
pub mod pipeline;

pub use builder::{AnchorCall, AnchorCallBuilder, CallBuilder, CallingContext};
pub use call::{Attribute, StructuralVariantCall};
pub use pipeline::{Caller, CallerBuilder};
