pub mod analytics;
pub mod routes;

pub use analytics::*;
pub use routes::*;
