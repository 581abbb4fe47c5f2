mod info;
mod resolve;

pub use info::{cmd_dirs, cmd_info};
pub use resolve::{cmd_resolve, cmd_unresolve};
