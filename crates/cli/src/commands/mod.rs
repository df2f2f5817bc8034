//! Command implementations.

mod info;
mod run;
mod scan;
mod validate;

pub use info::run_info;
pub use run::run_loop;
pub use scan::run_scan;
pub use validate::run_validate;
