#![allow(missing_docs)]

pub mod backend;
pub mod consts;
pub mod error;
pub mod integral;
pub mod ray;
pub mod splat;
pub mod surrogate;
