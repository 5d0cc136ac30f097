// src/commands/mod.rs
//! Command handlers for the conary-module CLI

mod module;
mod prompt;

pub use module::{
    cmd_module_disable, cmd_module_enable, cmd_module_info, cmd_module_install, cmd_module_list,
    cmd_module_lock, cmd_module_unlock, cmd_module_upgrade,
};
