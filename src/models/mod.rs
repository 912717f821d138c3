pub mod job;
pub mod verification;
