pub mod access_code;
pub mod answer;
pub mod loaders;
pub mod platform;

pub use access_code::AccessCode;
pub use answer::{AnswerDataset, AnswerOption, AnswerRecord};
pub use loaders::{load_answers_file, parse_answers_document};
pub use platform::Platform;
