pub mod concurrency_limit;

pub use concurrency_limit::ConcurrencyLimit;
