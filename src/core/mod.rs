pub mod series;
pub mod types;
pub mod window;

pub use series::*;
pub use types::*;
pub use window::{Lookback, Tenor, TenorUnit, Window, WindowSize};
