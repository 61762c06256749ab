#![allow(dead_code)]

pub mod execution;
pub mod gateway;
pub mod market;

pub use execution::successful_result;
