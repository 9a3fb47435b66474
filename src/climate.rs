pub mod aggregator;
pub mod archive;
pub mod calendar;
pub mod error;
pub mod retry;
#[cfg(test)]
pub(crate) mod testing;
