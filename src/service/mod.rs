pub mod api;
pub mod dashboard;
pub mod reporter;
pub mod sampler;
