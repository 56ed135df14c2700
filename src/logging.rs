use std::time::Instant;

use log::{info, LevelFilter};

pub fn initialize_logging(log_level: LevelFilter) {
    // RUST_LOG still overrides the level given on the command line
    let _ = env_logger::builder()
        .filter_level(log_level)
        .parse_default_env()
        .try_init();
}

/// Runs one pipeline stage and logs how long it took.
pub fn timed<'a, F, Out>(target: &'a str, task_desc: &'a str, function: F) -> Out
where
    F: FnOnce() -> Out,
{
    info!(target: target, "{}...", task_desc);
    let start_time = Instant::now();

    let out = function();

    info!(
        target: target,
        "{} finished (took {:.2?})",
        task_desc,
        start_time.elapsed()
    );
    out
}
