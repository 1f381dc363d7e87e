#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod event;
mod operation;
mod record;

pub use error::{BoxedError, Error, ErrorKind, LOOKUP_CONTEXT, Result};
pub use event::ChangeEvent;
pub use operation::Operation;
pub use record::{Record, SYSTEM_FIELDS};
