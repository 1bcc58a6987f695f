pub mod benchmark;
pub mod rouge;

pub use benchmark::{run_benchmark, BenchmarkReport};
pub use rouge::{aggregate, score};
