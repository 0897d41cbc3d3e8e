// src/config/mod.rs
pub mod client;

pub use client::{ClientConfig, VariantConfig, ENV_CONFIG_PATH};
