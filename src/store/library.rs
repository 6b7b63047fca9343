use std::path::{Path, PathBuf};

use super::persist::{read_snapshot, write_snapshot, Snapshot};
use super::StoreError;
use crate::catalog::{
    build_category_index, Category, CategoryId, CategoryIndex, NewQuestion, Question, QuestionId,
};

/// In-memory library of categories and questions, optionally backed by a JSON file.
pub struct TriviaStore {
    categories: Vec<Category>,
    questions: Vec<Question>,
    /// `None` once `QuestionId::MAX` has been handed out.
    next_question_id: Option<QuestionId>,
    data_path: Option<PathBuf>,
    autosave: bool,
}

impl TriviaStore {
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    pub fn from_parts(mut categories: Vec<Category>, mut questions: Vec<Question>) -> Self {
        categories.sort_by_key(|c| c.id);
        questions.sort_by_key(|q| q.id);
        let next_question_id = match questions.last() {
            Some(q) => q.id.checked_add(1),
            None => Some(1),
        };
        Self {
            categories,
            questions,
            next_question_id,
            data_path: None,
            autosave: false,
        }
    }

    /// Load a data file and remember it as the save target.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let snapshot = read_snapshot(path)?;
        let mut store = Self::from_parts(snapshot.categories, snapshot.questions);
        store.data_path = Some(path.to_path_buf());
        tracing::info!(
            "Loaded {} categories and {} questions from {}",
            store.categories.len(),
            store.questions.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            categories: self.categories.clone(),
            questions: self.questions.clone(),
        }
    }

    /// Write to the attached data file. No-op for a purely in-memory store.
    pub fn save(&self) -> Result<(), StoreError> {
        match &self.data_path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        write_snapshot(path, &self.snapshot())?;
        tracing::debug!("Saved store to {}", path.display());
        Ok(())
    }

    fn persist_if_enabled(&self) -> Result<(), StoreError> {
        if self.autosave {
            self.save()?;
        }
        Ok(())
    }

    /// All categories, ordered by id.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_index(&self) -> CategoryIndex {
        build_category_index(&self.categories)
    }

    /// All questions, ordered by id.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions
            .binary_search_by_key(&id, |q| q.id)
            .ok()
            .map(|pos| &self.questions[pos])
    }

    pub fn insert_question(&mut self, new: NewQuestion) -> Result<QuestionId, StoreError> {
        let text = new.question.ok_or(StoreError::MissingQuestionText)?;

        let id = self.next_question_id.ok_or(StoreError::IdsExhausted)?;
        self.questions.push(Question {
            id,
            question: text,
            answer: new.answer,
            category: new.category,
            difficulty: new.difficulty,
        });

        // Roll back so memory never disagrees with the error the caller sees.
        if let Err(err) = self.persist_if_enabled() {
            self.questions.pop();
            return Err(err);
        }
        self.next_question_id = id.checked_add(1);

        tracing::info!("Created question {}", id);
        Ok(id)
    }

    pub fn delete_question(&mut self, id: QuestionId) -> Result<Question, StoreError> {
        let pos = self
            .questions
            .binary_search_by_key(&id, |q| q.id)
            .map_err(|_| StoreError::QuestionNotFound(id))?;
        let removed = self.questions.remove(pos);

        if let Err(err) = self.persist_if_enabled() {
            self.questions.insert(pos, removed);
            return Err(err);
        }

        tracing::info!("Deleted question {}", id);
        Ok(removed)
    }

    /// Case-insensitive substring match on the question text.
    pub fn search(&self, term: &str) -> Vec<&Question> {
        let needle = term.to_lowercase();
        self.questions
            .iter()
            .filter(|q| q.question.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn questions_in_category(&self, category: CategoryId) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.category == Some(category))
            .collect()
    }
}

impl Default for TriviaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: QuestionId, text: &str, category: CategoryId) -> Question {
        Question {
            id,
            question: text.to_string(),
            answer: Some("answer".to_string()),
            category: Some(category),
            difficulty: Some(1),
        }
    }

    fn sample_store() -> TriviaStore {
        TriviaStore::from_parts(
            vec![Category::new(2, "Art"), Category::new(1, "Science")],
            vec![
                question(5, "Who painted the Mona Lisa?", 2),
                question(2, "What is the boiling point of water?", 1),
                question(9, "Which planet is the Red Planet?", 1),
            ],
        )
    }

    fn new_question(text: Option<&str>) -> NewQuestion {
        NewQuestion {
            question: text.map(str::to_string),
            answer: Some("Apollo 13".to_string()),
            category: Some(5),
            difficulty: Some(4),
        }
    }

    #[test]
    fn listings_are_ordered_by_id() {
        let store = sample_store();

        let category_ids: Vec<_> = store.categories().iter().map(|c| c.id).collect();
        let question_ids: Vec<_> = store.questions().iter().map(|q| q.id).collect();

        assert_eq!(category_ids, vec![1, 2]);
        assert_eq!(question_ids, vec![2, 5, 9]);
    }

    #[test]
    fn category_index_covers_every_category() {
        let index = sample_store().category_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&1], "Science");
        assert_eq!(index[&2], "Art");
    }

    #[test]
    fn insert_assigns_next_id_after_highest() {
        let mut store = sample_store();

        let id = store
            .insert_question(new_question(Some("Which movie earned Tom Hanks his third Oscar nomination?")))
            .unwrap();

        assert_eq!(id, 10);
        assert_eq!(store.question(10).unwrap().answer.as_deref(), Some("Apollo 13"));
    }

    #[test]
    fn insert_without_text_is_rejected() {
        let mut store = sample_store();

        let err = store.insert_question(new_question(None)).unwrap_err();

        assert!(matches!(err, StoreError::MissingQuestionText));
        assert_eq!(store.questions().len(), 3);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut store = sample_store();

        store.delete_question(9).unwrap();
        let id = store.insert_question(new_question(Some("Again?"))).unwrap();

        assert_eq!(id, 10);
    }

    #[test]
    fn delete_unknown_question_fails() {
        let mut store = sample_store();

        match store.delete_question(99999) {
            Err(StoreError::QuestionNotFound(id)) => assert_eq!(id, 99999),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn search_ignores_case() {
        let store = sample_store();

        let hits: Vec<_> = store.search("RED planet").iter().map(|q| q.id).collect();
        assert_eq!(hits, vec![9]);

        assert_eq!(store.search("").len(), 3);
        assert!(store.search("earnedearnedearned").is_empty());
    }

    #[test]
    fn filters_by_category() {
        let store = sample_store();

        let science: Vec<_> = store.questions_in_category(1).iter().map(|q| q.id).collect();
        assert_eq!(science, vec![2, 9]);
        assert!(store.questions_in_category(33333).is_empty());
    }

    #[test]
    fn autosave_writes_mutations_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trivia.json");
        sample_store().save_to(&path).unwrap();

        let mut store = TriviaStore::load(&path).unwrap();
        store.set_autosave(true);
        store.delete_question(2).unwrap();

        let reloaded = TriviaStore::load(&path).unwrap();
        assert!(reloaded.question(2).is_none());
        assert_eq!(reloaded.questions().len(), 2);
    }

    #[test]
    fn failed_autosave_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trivia.json");
        sample_store().save_to(&path).unwrap();
        let mut store = TriviaStore::load(&path).unwrap();
        store.set_autosave(true);
        drop(dir);

        let err = store.insert_question(new_question(Some("Q?"))).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(store.questions().len(), 3);

        let err = store.delete_question(5).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(store.question(5).is_some());
        assert_eq!(store.questions().len(), 3);

        store.set_autosave(false);
        assert_eq!(store.insert_question(new_question(Some("Q?"))).unwrap(), 10);
    }

    #[test]
    fn highest_possible_id_exhausts_the_counter() {
        let mut store = TriviaStore::from_parts(Vec::new(), vec![question(QuestionId::MAX, "Last?", 1)]);

        let err = store.insert_question(new_question(Some("One more?"))).unwrap_err();

        assert!(matches!(err, StoreError::IdsExhausted));
        assert_eq!(store.questions().len(), 1);
        assert!(store.question(QuestionId::MAX).is_some());
    }

    #[test]
    fn counter_stops_after_handing_out_the_last_id() {
        let mut store = TriviaStore::from_parts(Vec::new(), vec![question(QuestionId::MAX - 1, "Nearly?", 1)]);

        assert_eq!(store.insert_question(new_question(Some("Last?"))).unwrap(), QuestionId::MAX);
        assert!(matches!(
            store.insert_question(new_question(Some("Too many?"))),
            Err(StoreError::IdsExhausted)
        ));
    }

    #[test]
    fn in_memory_store_save_is_noop() {
        let store = sample_store();
        assert!(store.data_path().is_none());
        store.save().unwrap();
    }
}
