//! [`Backend`] adapter for the crossword solver.

use std::num::NonZeroUsize;

use rayon::{ThreadPool, ThreadPoolBuilder};
use sha2::{Digest as _, Sha256};
use wordgrid_solver::{Dictionary, GridSpec, SlotGrid, Solution};

use super::{Backend, BackendError};

/// Smallest module image [`CrosswordBackend`] accepts: the WebAssembly magic
/// number followed by binary format version 1.
pub const MODULE_HEADER: [u8; 8] = *b"\0asm\x01\0\0\0";

/// Whether this build can start a parallel runtime.
///
/// `wasm32` builds run without shared-memory threads, so a request for more
/// than one thread fails at runtime initialization there.
pub const PARALLEL_RUNTIME_SUPPORTED: bool = cfg!(not(target_arch = "wasm32"));

/// Crossword solver behind the [`Backend`] interface.
///
/// The module image must be a WebAssembly binary of format version 1. The
/// parallel runtime is a private rayon pool, so sibling instances in the same
/// process never share threads. See [`PARALLEL_RUNTIME_SUPPORTED`] for the
/// targets that have one.
#[derive(Debug, Default)]
pub struct CrosswordBackend {
    module: Option<ModuleInfo>,
    pool: Option<ThreadPool>,
}

#[derive(Debug, Clone)]
struct ModuleInfo {
    len: usize,
    digest: String,
}

impl ModuleInfo {
    fn parse(image: &[u8]) -> Result<Self, BackendError> {
        let Some(header) = image.get(..MODULE_HEADER.len()) else {
            return Err(BackendError::ModuleRejected {
                reason: format!("image is {} bytes, shorter than the header", image.len()),
            });
        };
        if header[..4] != MODULE_HEADER[..4] {
            return Err(BackendError::ModuleRejected {
                reason: "missing wasm magic number".to_owned(),
            });
        }
        if header[4..] != MODULE_HEADER[4..] {
            let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
            return Err(BackendError::ModuleRejected {
                reason: format!("unsupported binary format version {version}"),
            });
        }

        Ok(Self {
            len: image.len(),
            digest: format!("{:x}", Sha256::digest(image)),
        })
    }
}

impl CrosswordBackend {
    /// Creates a backend with no module loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of threads of the parallel runtime, if started.
    #[must_use]
    pub fn pool_threads(&self) -> Option<usize> {
        self.pool.as_ref().map(ThreadPool::current_num_threads)
    }
}

impl Backend for CrosswordBackend {
    type Grid = GridSpec;
    type Output = Option<Solution>;

    async fn initialize(&mut self, module: &[u8]) -> Result<(), BackendError> {
        let info = ModuleInfo::parse(module)?;
        log::debug!(
            "loaded crossword module: {} bytes, sha256 {}",
            info.len,
            info.digest
        );
        self.module = Some(info);
        Ok(())
    }

    async fn initialize_parallel_runtime(
        &mut self,
        threads: NonZeroUsize,
    ) -> Result<(), BackendError> {
        if self.module.is_none() {
            return Err(BackendError::NotInitialized);
        }
        if !PARALLEL_RUNTIME_SUPPORTED {
            return Err(BackendError::RuntimeUnavailable {
                reason: format!("{threads} threads requested, but this build has no thread support"),
            });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|i| format!("wordgrid-solver-{i}"))
            .build()
            .map_err(|err| BackendError::RuntimeUnavailable {
                reason: err.to_string(),
            })?;
        self.pool = Some(pool);
        Ok(())
    }

    fn solve(&self, wordlist: &[String], grid: &GridSpec) -> Result<Option<Solution>, BackendError> {
        if self.module.is_none() {
            return Err(BackendError::NotInitialized);
        }
        let grid = SlotGrid::new(grid).map_err(|err| BackendError::InvalidInput {
            reason: err.to_string(),
        })?;
        let dict = Dictionary::from_iter(wordlist);

        let solution = match &self.pool {
            Some(pool) => pool.install(|| wordgrid_solver::solve_parallel(&grid, &dict)),
            None => wordgrid_solver::solve(&grid, &dict),
        };
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use futures_executor::block_on;

    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|&w| w.to_owned()).collect()
    }

    fn cross() -> GridSpec {
        GridSpec::new(vec![vec![0, 1, 2], vec![2, 3, 4]])
    }

    #[test]
    fn test_accepts_wasm_header() {
        let mut backend = CrosswordBackend::new();
        let mut image = MODULE_HEADER.to_vec();
        image.extend_from_slice(&[0x01, 0x04, 0x01, 0x60]);

        assert_eq!(block_on(backend.initialize(&image)), Ok(()));
        assert_eq!(backend.module.as_ref().map(|m| m.len), Some(12));
        assert_eq!(backend.module.as_ref().map(|m| m.digest.len()), Some(64));
    }

    #[test]
    fn test_rejects_malformed_images() {
        let mut backend = CrosswordBackend::new();

        for image in [&b"\0as"[..], b"\x7fELF\x01\0\0\0", b"\0asm\x02\0\0\0"] {
            let result = block_on(backend.initialize(image));
            assert!(
                matches!(result, Err(BackendError::ModuleRejected { .. })),
                "{image:?}: {result:?}"
            );
        }
        assert!(backend.module.is_none());
    }

    #[test]
    fn test_rejected_version_is_reported() {
        let mut backend = CrosswordBackend::new();
        let err = block_on(backend.initialize(b"\0asm\x02\0\0\0")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "module rejected: unsupported binary format version 2"
        );
    }

    #[test]
    fn test_requires_module_before_runtime_and_solve() {
        let mut backend = CrosswordBackend::new();
        let threads = NonZeroUsize::new(2).unwrap();

        assert_eq!(
            block_on(backend.initialize_parallel_runtime(threads)),
            Err(BackendError::NotInitialized)
        );
        assert_eq!(
            backend.solve(&words(&["cat"]), &cross()),
            Err(BackendError::NotInitialized)
        );
    }

    #[test]
    fn test_runtime_follows_thread_support() {
        let mut backend = CrosswordBackend::new();
        block_on(backend.initialize(&MODULE_HEADER)).unwrap();

        let result = block_on(backend.initialize_parallel_runtime(NonZeroUsize::new(2).unwrap()));
        if PARALLEL_RUNTIME_SUPPORTED {
            assert_eq!(result, Ok(()));
            assert_eq!(backend.pool_threads(), Some(2));
        } else {
            assert!(matches!(result, Err(BackendError::RuntimeUnavailable { .. })));
            assert_eq!(backend.pool_threads(), None);
        }
    }

    #[test]
    fn test_solves_with_and_without_pool() {
        let wordlist = words(&["cat", "tea", "dog"]);

        let mut sequential = CrosswordBackend::new();
        block_on(sequential.initialize(&MODULE_HEADER)).unwrap();
        let expected = sequential.solve(&wordlist, &cross()).unwrap();
        assert!(expected.is_some());

        let mut parallel = CrosswordBackend::new();
        block_on(parallel.initialize(&MODULE_HEADER)).unwrap();
        block_on(parallel.initialize_parallel_runtime(NonZeroUsize::new(3).unwrap())).unwrap();
        assert_eq!(parallel.pool_threads(), Some(3));
        assert_eq!(parallel.solve(&wordlist, &cross()).unwrap(), expected);
    }

    #[test]
    fn test_invalid_grid_is_an_input_error() {
        let mut backend = CrosswordBackend::new();
        block_on(backend.initialize(&MODULE_HEADER)).unwrap();

        let result = backend.solve(&words(&["cat"]), &GridSpec::default());
        assert_eq!(
            result,
            Err(BackendError::InvalidInput {
                reason: "grid has no words".to_owned(),
            })
        );
    }
}
