//! Text building blocks for rendered templates.

mod code_builder;
mod indent;

pub use code_builder::CodeBuilder;
pub use indent::Indent;
