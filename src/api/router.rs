use crate::catalog::{CategoryId, QuestionId};

/// Known endpoints. Matching the method happens in the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Categories,
    CategoryIndex,
    CategoryQuestions(CategoryId),
    Questions,
    Question(QuestionId),
    SearchQuestions,
    Quizzes,
}

/// Split `path` into a route and its raw query string.
pub fn resolve(path: &str) -> (Option<Route>, Option<&str>) {
    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let route = match segments.as_slice() {
        ["categories"] => Some(Route::Categories),
        ["categories", "index"] => Some(Route::CategoryIndex),
        ["categories", id, "questions"] => id.parse().ok().map(Route::CategoryQuestions),
        ["questions"] => Some(Route::Questions),
        ["questions", "search"] => Some(Route::SearchQuestions),
        ["questions", id] => id.parse().ok().map(Route::Question),
        ["quizzes"] => Some(Route::Quizzes),
        _ => None,
    };
    (route, query)
}
