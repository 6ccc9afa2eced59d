pub mod classes;
pub mod scan;
