pub mod cli;
pub mod commands;
pub mod composite;
pub mod motif;
pub mod repeats;
pub mod resolve;
pub mod scan;
pub mod score;
pub mod utils;
pub mod workflows;
