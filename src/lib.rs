pub mod config;
pub mod doppler;
pub mod geo;
pub mod locator;
pub mod los;
pub mod predict;
pub mod rf;
pub mod web;
