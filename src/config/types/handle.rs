//! Global options handle for the command-line tool.
//!
//! Uses `arc-swap` for lock-free reads from worker threads and atomic
//! replacement when options change.

use crate::config::Options;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global options storage.
pub static CONFIG: LazyLock<ArcSwap<Options>> =
    LazyLock::new(|| ArcSwap::from_pointee(Options::default()));

#[inline]
pub fn cfg() -> Arc<Options> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(options: Options) -> Arc<Options> {
    let arc = Arc::new(options);
    CONFIG.store(Arc::clone(&arc));
    arc
}
