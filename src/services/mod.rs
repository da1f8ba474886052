pub mod matching_service;
pub mod normalizer;
pub mod notifier;
pub mod option_marker;
pub mod question_locator;
pub mod similarity;

pub use matching_service::{Match, MatchKind, MatchingService, DEFAULT_SIMILARITY_THRESHOLD};
pub use normalizer::normalize;
pub use notifier::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use option_marker::mark_options;
pub use question_locator::locate_question;
pub use similarity::similarity;
