mod dirent;
mod handle;
mod inode;
mod walk;

pub use dirent::*;
pub use handle::*;
pub use inode::*;
pub use walk::*;
