pub mod config;
pub mod fetch;
pub mod grading;
pub mod output;
pub mod record;
pub mod s3;
pub mod services;
pub mod summary;
