#![allow(dead_code)]

pub mod session;
