//! Backend bridge: the command vocabulary and the worker thread owning the gateway.

pub mod commands;
pub mod runtime;
