//! Report data structures for commands.
//!
//! Commands build reports, then render them to an Output target.

mod check;
mod explain;
mod generate;
mod output;

pub use check::{CheckReport, ServiceCheck};
pub use explain::{ExplainReport, LintInfo, PhaseInfo, RegistryEntry, ResourceInfo};
pub use generate::{GenerateReport, GenerationResult, PreviewFile, PreviewResult, WrittenResult};
pub use output::{Report, TerminalOutput};
