pub mod combat;
pub mod logging;
