use rand::seq::IteratorRandom;
use rand::Rng;

use crate::catalog::{CategoryId, Question, QuestionId};

/// Which questions a quiz draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCategory {
    All,
    Only(CategoryId),
}

impl QuizCategory {
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            QuizCategory::All => true,
            QuizCategory::Only(id) => question.category == Some(*id),
        }
    }
}

/// Pick a random question in `category` that is not in `previous`.
pub fn select_quiz_question<'a, R: Rng + ?Sized>(
    questions: &'a [Question],
    category: QuizCategory,
    previous: &[QuestionId],
    rng: &mut R,
) -> Option<&'a Question> {
    questions
        .iter()
        .filter(|q| category.matches(q) && !previous.contains(&q.id))
        .choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn question(id: QuestionId, category: CategoryId) -> Question {
        Question {
            id,
            question: format!("question {id}"),
            answer: None,
            category: Some(category),
            difficulty: None,
        }
    }

    fn pool() -> Vec<Question> {
        vec![question(1, 1), question(2, 2), question(3, 2), question(4, 3)]
    }

    #[test]
    fn stays_inside_requested_category() {
        let questions = pool();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let picked = select_quiz_question(&questions, QuizCategory::Only(2), &[], &mut rng).unwrap();
            assert_eq!(picked.category, Some(2));
        }
    }

    #[test]
    fn never_repeats_previous_questions() {
        let questions = pool();
        let mut rng = StdRng::seed_from_u64(11);

        let picked = select_quiz_question(&questions, QuizCategory::Only(2), &[2], &mut rng).unwrap();
        assert_eq!(picked.id, 3);
    }

    #[test]
    fn exhausted_pool_yields_none() {
        let questions = pool();
        let mut rng = StdRng::seed_from_u64(3);

        assert!(select_quiz_question(&questions, QuizCategory::Only(2), &[2, 3], &mut rng).is_none());
        assert!(select_quiz_question(&questions, QuizCategory::Only(42), &[], &mut rng).is_none());
        assert!(select_quiz_question(&[], QuizCategory::All, &[], &mut rng).is_none());
    }

    #[test]
    fn all_categories_eventually_cover_pool() {
        let questions = pool();
        let mut rng = StdRng::seed_from_u64(5);
        let mut previous = Vec::new();

        while let Some(q) = select_quiz_question(&questions, QuizCategory::All, &previous, &mut rng) {
            previous.push(q.id);
        }

        previous.sort_unstable();
        assert_eq!(previous, vec![1, 2, 3, 4]);
    }
}
