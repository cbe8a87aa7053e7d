//! External collaborators the core consumes but does not design (spec §1,
//! §6): argv construction, ANSI colorization, terminal detection.

mod argv;
mod color;

pub use argv::build_argv;
pub use color::{Painter, stdout_is_terminal};
