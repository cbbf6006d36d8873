use super::*;

pub mod raft;
pub mod validate;
