//! Library side of the `sheetval` command line tool.

pub mod logging;
pub mod params;
pub mod pipeline;
