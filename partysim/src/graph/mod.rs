pub mod generate;
pub mod matrix;
