// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

pub(crate) mod worker_pool;

/// Descending total order of floats.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    OrderedFloat(b).cmp(&OrderedFloat(a))
}
