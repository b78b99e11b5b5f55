//! Built-in lints for manifest validation.

mod ingress_port;
mod unknown_type;

pub use ingress_port::IngressPortLint;
pub use unknown_type::UnknownTypeLint;
