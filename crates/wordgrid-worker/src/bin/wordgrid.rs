//! Command-line front end that solves one grid on a native worker instance.
//!
//! # Usage
//!
//! ```sh
//! cargo run -- --words words.txt --grid grid.txt
//! ```
//!
//! Solve on a four-thread parallel runtime:
//!
//! ```sh
//! cargo run -- --words words.txt --grid grid.txt --threads 4
//! ```
//!
//! The grid file lists one word per line as slot numbers separated by spaces
//! or commas; `#` starts a comment.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::{error::Error, fs, num::NonZeroUsize, path::PathBuf};

    use clap::{Parser, ValueEnum};
    use wordgrid_solver::{GridSpec, SlotGrid};
    use wordgrid_worker::{
        CrosswordBackend, DefaultThreads, DispatcherConfig, LogObserver, MODULE_HEADER, Request,
        platform,
    };

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum DefaultThreadsArg {
        Sequential,
        Auto,
    }

    #[derive(Debug, Parser)]
    #[command(author, version, about)]
    struct Args {
        /// Word list, one word per line.
        #[arg(short, long, value_name = "PATH")]
        words: PathBuf,

        /// Grid description file.
        #[arg(short, long, value_name = "PATH")]
        grid: PathBuf,

        /// Backend module image. Defaults to a minimal WebAssembly header.
        #[arg(long, value_name = "PATH")]
        module: Option<PathBuf>,

        /// Size of the parallel runtime; 1 solves on the worker thread.
        #[arg(short, long, value_name = "COUNT")]
        threads: Option<u32>,

        /// Identifier reported in log messages.
        #[arg(long, value_name = "ID")]
        id: Option<String>,

        /// Thread count used when --threads is not given.
        #[arg(long, value_name = "MODE", default_value = "sequential")]
        default_threads: DefaultThreadsArg,

        /// Use exactly this many threads when --threads is not given.
        #[arg(long, value_name = "COUNT", conflicts_with = "default_threads")]
        fixed_threads: Option<NonZeroUsize>,
    }

    impl Args {
        fn config(&self) -> DispatcherConfig {
            let default_threads = match (self.fixed_threads, self.default_threads) {
                (Some(n), _) => DefaultThreads::Fixed(n),
                (None, DefaultThreadsArg::Sequential) => DefaultThreads::Sequential,
                (None, DefaultThreadsArg::Auto) => DefaultThreads::HardwareConcurrency,
            };
            DispatcherConfig { default_threads }
        }
    }

    pub(crate) fn main() -> Result<(), Box<dyn Error>> {
        better_panic::install();
        env_logger::init();

        let args = Args::parse();
        let wordlist = fs::read_to_string(&args.words)?
            .lines()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let spec: GridSpec = fs::read_to_string(&args.grid)?.parse()?;
        let grid = SlotGrid::new(&spec)?;
        let module = match &args.module {
            Some(path) => fs::read(path)?,
            None => MODULE_HEADER.to_vec(),
        };

        let mut request = Request::new(module, wordlist, spec);
        if let Some(threads) = args.threads {
            request = request.with_num_threads(threads);
        }
        if let Some(id) = &args.id {
            request = request.with_id(id.as_str());
        }

        let worker = platform::spawn(CrosswordBackend::new(), args.config(), LogObserver)?;
        log::debug!("posting request to worker {}", worker.instance());
        match worker.post(request)?.wait()? {
            Some(solution) => {
                for word in solution.words(&grid) {
                    println!("{word}");
                }
            }
            None => println!("no solution"),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
