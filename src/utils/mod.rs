pub mod cross_validate;
pub mod numeric;

use crate::error::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Pool of `workers` threads, `0` means one per cpu
pub fn worker_pool(workers: usize) -> Result<ThreadPool> {
    let workers = if workers == 0 { num_cpus::get() } else { workers };
    let tpb = ThreadPoolBuilder::new().num_threads(workers);
    Ok(tpb.build()?)
}

/// Level is read from `MYCORRHIZA_LOG`, e.g. `MYCORRHIZA_LOG=debug`
pub fn init_logging() -> std::result::Result<(), log::SetLoggerError> {
    pretty_env_logger::try_init_timed_custom_env("MYCORRHIZA_LOG")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pool_size_follows_worker_count() {
        assert_eq!(worker_pool(3).unwrap().current_num_threads(), 3);
        assert_eq!(worker_pool(0).unwrap().current_num_threads(), num_cpus::get());
    }
}
