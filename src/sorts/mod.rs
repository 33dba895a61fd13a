//! Built-in sorts
//!
//! The main program's sorts register themselves here at startup. Only their
//! metadata lives in this crate; the algorithms run in the visualizer.

mod distribution;
mod exchange;

use crate::error::Result;
use crate::namespace::Namespace;

/// Base type every sort in the main program shares; never a candidate
pub const TEMPLATE_BASE: &str = "sorts.templates.Sort";

/// Register every built-in type into the main program's namespace
pub fn register_builtins(namespace: &mut Namespace) -> Result<()> {
    namespace.register_type(TEMPLATE_BASE)?;
    exchange::register(namespace)?;
    distribution::register(namespace)?;
    Ok(())
}

/// A namespace holding only the built-ins
pub fn builtin_namespace() -> Result<Namespace> {
    let mut namespace = Namespace::builtin();
    register_builtins(&mut namespace)?;
    Ok(namespace)
}
