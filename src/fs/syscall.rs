mod getcwd;

pub use getcwd::sys_getcwd;
