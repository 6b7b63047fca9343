mod index;
mod types;

pub use index::{build_category_index, CategoryIndex};
pub use types::{Category, CategoryId, NewQuestion, Question, QuestionId};
