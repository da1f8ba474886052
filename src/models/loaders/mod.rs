pub mod json_loader;

pub use json_loader::{load_answers_file, parse_answers_document};
