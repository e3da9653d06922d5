//! Types shared by the explorer engine, the map boundary and the front-ends.

pub mod domain;
pub mod error;
pub mod protocol;
