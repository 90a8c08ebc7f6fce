#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod backtrace;
pub mod config;
pub mod fs;
pub mod mm;
pub mod printk;
pub mod process;
pub mod syscall;
pub mod sysrq;
