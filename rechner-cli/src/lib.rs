//! Command-line front end for the SVS and income tax calculator.
//!
//! The binary in `main.rs` only parses arguments; loading files, rendering
//! results and writing snapshots live here so they can be tested without a
//! process boundary.

pub mod input;
pub mod logging;
pub mod output;
pub mod snapshot;

pub use input::{
    LoadError, YearTableError, default_tax_year, load_input, load_year_table, parse_input,
    parse_year_table,
};
pub use logging::{init_logging, resolve_level};
pub use output::{OutputFormat, render_result, render_svs, render_tips, render_years};
pub use snapshot::{append_snapshot, write_snapshot};
