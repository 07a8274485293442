pub mod timer;
pub mod watch;
