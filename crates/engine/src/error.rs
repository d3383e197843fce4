use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Core type error: {0}")]
    Core(#[from] core_types::CoreError),

    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Run cancelled after {completed} of {total} securities.")]
    Cancelled { completed: usize, total: usize },
}
