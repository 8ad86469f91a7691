//! # drover-tools
//!
//! Tool abstraction and registry for the Drover agent loop.
//!
//! A [`Tool`] is one capability the model can invoke against a live
//! instance: pointer/keyboard control, a persistent shell, or a file
//! editor. The [`ToolCollection`] advertises tool descriptors to the model
//! in registration order and dispatches invocations by name, isolating
//! dispatch failures so one bad call never aborts the loop.

mod bash;
mod collection;
mod computer;
mod editor;
mod tool;

pub use bash::BashTool;
pub use collection::ToolCollection;
pub use computer::ComputerTool;
pub use editor::EditTool;
pub use tool::Tool;
