pub mod calculations;
pub mod models;
pub mod registry;

pub use calculations::{RechnerResult, calculate_all, calculate_all_with, calculate_svs, calculate_tax_tips};
pub use models::*;
pub use registry::YearConfigRegistry;
