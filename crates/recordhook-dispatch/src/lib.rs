#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod bootstrap;
mod dispatcher;
mod hooks;

pub use bootstrap::install;
pub use dispatcher::Dispatcher;
pub use hooks::{DispatchHook, HookPoint, HookRegistry, LifecycleHooks, RecordEvent, RecordHook};
pub use recordhook_core::{Error, ErrorKind, Result};
