use crate::{PointCloudError, Result};
use rayon::ThreadPoolBuilder;
use std::num::NonZeroUsize;
use std::sync::OnceLock;

/// Environment variable consulted when no explicit thread count is given.
pub const THREADS_ENV: &str = "OBJECTNESS_CPU_THREADS";

static POOL: OnceLock<std::result::Result<usize, String>> = OnceLock::new();

/// Thread count requested through [`THREADS_ENV`]; `None` when unset.
fn requested_from_env() -> Result<Option<NonZeroUsize>> {
    match std::env::var(THREADS_ENV) {
        Ok(raw) => parse_thread_count(&raw).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(PointCloudError::InvalidParameter(format!("{}: {}", THREADS_ENV, e))),
    }
}

fn parse_thread_count(raw: &str) -> Result<NonZeroUsize> {
    raw.trim().parse::<NonZeroUsize>().map_err(|_| {
        PointCloudError::InvalidParameter(format!(
            "{} wants a thread count of at least 1, got {:?}",
            THREADS_ENV, raw
        ))
    })
}

/// Size the global Rayon pool that normal estimation runs on.
///
/// An explicit `num_threads` wins over [`THREADS_ENV`]; with neither, Rayon
/// picks. The pool can be built once per process, so every call after the
/// first reports the first outcome. Returns the pool's worker count.
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<usize> {
    let outcome = POOL.get_or_init(|| {
        let requested = match num_threads {
            Some(n) => Some(NonZeroUsize::new(n).ok_or_else(|| {
                PointCloudError::InvalidParameter("thread count must be at least 1".into())
            })),
            None => requested_from_env().transpose(),
        }
        .transpose()
        .map_err(|e| e.to_string())?;

        let builder = requested.map_or_else(ThreadPoolBuilder::new, |n| {
            ThreadPoolBuilder::new().num_threads(n.get())
        });
        builder.build_global().map_err(|e| e.to_string())?;
        tracing::debug!("rayon pool ready with {} threads", rayon::current_num_threads());
        Ok(rayon::current_num_threads())
    });
    outcome.clone().map_err(PointCloudError::InvalidParameter)
}
