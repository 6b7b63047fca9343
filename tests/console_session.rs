// Drives the interactive console end to end over in-memory input

use std::io::Cursor;

use trivia_core::api::ApiServer;
use trivia_core::catalog::{Category, Question};
use trivia_core::interactive::{parse_command, Command, Console};
use trivia_core::store::TriviaStore;

fn question(id: u32, text: &str, answer: &str, category: u32) -> Question {
    Question {
        id,
        question: text.to_string(),
        answer: Some(answer.to_string()),
        category: Some(category),
        difficulty: Some(2),
    }
}

fn console() -> Console {
    let store = TriviaStore::from_parts(
        vec![
            Category::new(1, "Science"),
            Category::new(2, "Art"),
            Category::new(4, "History"),
        ],
        vec![
            question(1, "Who discovered penicillin?", "Alexander Fleming", 1),
            question(2, "La Giaconda is better known as what?", "Mona Lisa", 2),
            question(3, "Who invented Peanut Butter?", "George Washington Carver", 4),
        ],
    );
    Console::new(ApiServer::with_seed(store, 10, 9))
}

fn run_script(console: &mut Console, script: &str) -> String {
    let mut output = Vec::new();
    console
        .run(Cursor::new(script.as_bytes()), &mut output)
        .expect("console run failed");
    String::from_utf8(output).unwrap()
}

#[cfg(test)]
mod console_tests {
    use super::*;

    #[test]
    fn test_categories_listed_in_id_order() {
        let mut c = console();
        let out = c.execute(Command::Categories);
        assert_eq!(out, "   1  Science\n   2  Art\n   4  History");
    }

    #[test]
    fn test_question_list_shows_category_labels() {
        let mut c = console();
        let out = c.execute(Command::List(1));

        assert!(out.contains("[Science] Who discovered penicillin?"));
        assert!(out.contains("[Art] La Giaconda"));
        assert!(out.contains("(3 shown, 3 total)"));
    }

    #[test]
    fn test_add_then_search_finds_new_question() {
        let mut c = console();
        let out = run_script(
            &mut c,
            "add \"Who painted The Starry Night?\" \"Van Gogh\" 2 3\nsearch starry\nquit\n",
        );

        assert!(out.contains("Created question 4"));
        assert!(out.contains("[Art] Who painted The Starry Night?"));
        assert_eq!(c.server().store().questions().len(), 4);
    }

    #[test]
    fn test_errors_are_reported_not_fatal() {
        let mut c = console();
        let out = run_script(&mut c, "delete 99\nfrobnicate\ncategory 7\nlist\n");

        assert!(out.contains("error 422: unprocessable"));
        assert!(out.contains("unknown command 'frobnicate'"));
        assert!(out.contains("error 404: resource not found"));
        assert!(out.contains("(3 shown, 3 total)"));
    }

    #[test]
    fn test_play_walks_through_category_without_repeats() {
        let mut c = console();

        let first = c.execute(Command::Play(Some(1)));
        assert!(first.contains("Who discovered penicillin?"));
        assert_eq!(c.asked(), &[1]);

        let done = c.execute(Command::Play(Some(1)));
        assert_eq!(done, "Quiz over after 1 questions");
        assert!(c.asked().is_empty());
    }

    #[test]
    fn test_switching_category_restarts_quiz() {
        let mut c = console();

        c.execute(Command::Play(Some(1)));
        let out = c.execute(Command::Play(Some(2)));

        assert!(out.contains("Mona Lisa"));
        assert_eq!(c.asked(), &[2]);
    }

    #[test]
    fn test_quit_stops_reading() {
        let mut c = console();
        let out = run_script(&mut c, "quit\ndelete 1\n");

        assert!(!out.contains("Deleted"));
        assert!(c.server().store().question(1).is_some());
        assert_eq!(parse_command("exit"), Ok(Some(Command::Quit)));
    }
}
