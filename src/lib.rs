pub mod analysis;
pub mod boolean;
pub mod config;
pub mod liberty;
pub mod netlist;
