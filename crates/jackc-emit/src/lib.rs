//! Output sinks for the two compilation stages: a VM instruction-listing
//! writer ([`vm`]) and an indented XML tree writer ([`xml`]).

mod error;
pub mod vm;
pub mod xml;

pub use error::{EmitError, Result};
pub use vm::{ArithCommand, VmWriter};
pub use xml::XmlWriter;
