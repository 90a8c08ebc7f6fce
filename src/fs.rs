pub mod cwd;
pub mod path;
pub mod syscall;
pub mod tmpfs;
pub mod vfs;
