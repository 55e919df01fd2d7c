mod anchor;
mod command;
mod config;
mod context;
mod debounce;
mod dom;
mod editor;
mod error;
mod exec;
mod form;
mod ops;
mod selection;
mod toolbar;

pub use crate::anchor::*;
pub use crate::command::*;
pub use crate::config::*;
pub use crate::context::*;
pub use crate::debounce::*;
pub use crate::dom::*;
pub use crate::editor::*;
pub use crate::error::*;
pub use crate::exec::*;
pub use crate::form::*;
pub use crate::ops::*;
pub use crate::selection::*;
pub use crate::toolbar::*;
