//! Command implementations.

pub mod check;
pub mod run;
pub mod watch;

pub use self::check::execute_check;
pub use self::run::execute_run;
pub use self::watch::execute_watch;
