#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod generator;
mod id;
#[cfg(feature = "order")]
mod order;
#[cfg(feature = "short-id")]
mod short_id;
mod time;

pub use crate::generator::*;
pub use crate::id::*;
#[cfg_attr(docsrs, doc(cfg(feature = "order")))]
#[cfg(feature = "order")]
pub use crate::order::*;
#[cfg_attr(docsrs, doc(cfg(feature = "short-id")))]
#[cfg(feature = "short-id")]
pub use crate::short_id::*;
pub use crate::time::*;
