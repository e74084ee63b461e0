pub mod hasher;
pub mod progress;
