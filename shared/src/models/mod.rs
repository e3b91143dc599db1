//! Domain models for the Solar Performance Monitor

mod alert;
mod installation;
mod metering;
mod weather;

pub use alert::*;
pub use installation::*;
pub use metering::*;
pub use weather::*;
