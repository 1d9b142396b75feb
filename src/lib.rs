pub mod dataset;
pub mod error;
pub mod features;
pub mod mobilenet;
pub mod preprocessing;
