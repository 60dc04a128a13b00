pub mod parser;
pub mod vrp_file;
