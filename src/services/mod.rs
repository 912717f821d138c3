pub mod csv_source;
pub mod gravatar;
pub mod jobs;
pub mod reachability;
pub mod runner;
pub mod store;
pub mod syntax;
pub mod verifier;
