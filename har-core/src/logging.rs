//! Tracing subscriber bootstrap for binaries embedding the pipeline.
//! A library call to `analyze()` never initialises a subscriber itself —
//! only the host application should install one — but we give it a
//! ready-made, teacher-style initialiser to pull in.

use tracing_subscriber::EnvFilter;

/// Install a `tracing-subscriber` formatter reading `RUST_LOG`
/// (default: `info`) if one hasn't been installed already.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
