// src/models/mod.rs

pub mod literal;
pub mod policy;
pub mod value;
