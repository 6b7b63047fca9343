mod paginate;
mod quiz;

pub use paginate::{paginate, parse_page, DEFAULT_PAGE_SIZE};
pub use quiz::{select_quiz_question, QuizCategory};
