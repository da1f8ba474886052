pub mod question_flow;
pub mod session;

pub use question_flow::{process_question, ProcessResult};
pub use session::QuizSession;
