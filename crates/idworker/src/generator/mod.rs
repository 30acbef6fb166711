mod basic;
mod error;
mod interface;
mod lock;
mod mutex;
mod spin;
mod state;
mod status;
#[cfg(test)]
mod tests;

pub use basic::*;
pub use error::*;
pub use interface::*;
pub use lock::*;
pub use mutex::*;
pub use spin::*;
pub use status::*;
