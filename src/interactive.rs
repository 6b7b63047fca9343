use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use thiserror::Error;

use crate::api::{ApiRequest, ApiResponse, ApiServer};
use crate::catalog::{build_category_index, Category, CategoryId, CategoryIndex, Question, QuestionId};

const HELP: &str = "\
Commands:
  categories                              list categories
  list [page]                             list questions
  category <id> [page]                    questions in a category
  search <term>                           search question text
  add <question> <answer> <category> <difficulty>
  delete <id>                             delete a question
  play [category]                         next quiz question
  reset                                   forget quiz history
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Categories,
    List(i64),
    Category(CategoryId, i64),
    Search(String),
    Add {
        question: String,
        answer: String,
        category: String,
        difficulty: String,
    },
    Delete(QuestionId),
    Play(Option<CategoryId>),
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unbalanced quotes")]
    Unbalanced,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

fn parse_number<T: std::str::FromStr>(arg: &str, usage: &'static str) -> Result<T, CommandError> {
    arg.parse().map_err(|_| CommandError::Usage(usage))
}

/// Parse one console line with shell quoting. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let words = shlex::split(line).ok_or(CommandError::Unbalanced)?;
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };

    let cmd = match (head.to_lowercase().as_str(), args) {
        ("categories", []) => Command::Categories,
        ("list", []) => Command::List(1),
        ("list", [page]) => Command::List(parse_number(page, "list [page]")?),
        ("category", [id]) => Command::Category(parse_number(id, "category <id> [page]")?, 1),
        ("category", [id, page]) => Command::Category(
            parse_number(id, "category <id> [page]")?,
            parse_number(page, "category <id> [page]")?,
        ),
        ("search", terms) if !terms.is_empty() => Command::Search(terms.join(" ")),
        ("add", [question, answer, category, difficulty]) => Command::Add {
            question: question.clone(),
            answer: answer.clone(),
            category: category.clone(),
            difficulty: difficulty.clone(),
        },
        ("delete", [id]) => Command::Delete(parse_number(id, "delete <id>")?),
        ("play", []) => Command::Play(None),
        ("play", [id]) => Command::Play(Some(parse_number(id, "play [category]")?)),
        ("reset", []) => Command::Reset,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        ("list", _) => return Err(CommandError::Usage("list [page]")),
        ("category", _) => return Err(CommandError::Usage("category <id> [page]")),
        ("search", _) => return Err(CommandError::Usage("search <term>")),
        ("add", _) => {
            return Err(CommandError::Usage(
                "add <question> <answer> <category> <difficulty>",
            ))
        }
        ("delete", _) => return Err(CommandError::Usage("delete <id>")),
        ("play", _) => return Err(CommandError::Usage("play [category]")),
        (other, _) => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

/// Line-oriented front end that drives the API router in-process.
pub struct Console {
    server: ApiServer,
    previous: Vec<QuestionId>,
    quiz_category: Option<CategoryId>,
}

impl Console {
    pub fn new(server: ApiServer) -> Self {
        Self {
            server,
            previous: Vec::new(),
            quiz_category: None,
        }
    }

    pub fn server(&self) -> &ApiServer {
        &self.server
    }

    pub fn asked(&self) -> &[QuestionId] {
        &self.previous
    }

    fn request(&mut self, method: &str, path: String, body: Option<Value>) -> ApiResponse {
        self.server.dispatch(&ApiRequest::new(method, path, body))
    }

    /// Fetch the category list and turn it into an id -> label lookup.
    fn fetch_category_index(&mut self) -> CategoryIndex {
        let response = self.request("GET", "/categories".to_string(), None);
        let categories: Vec<Category> = response
            .body
            .get("categories")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        build_category_index(&categories)
    }

    pub fn execute(&mut self, cmd: Command) -> String {
        match cmd {
            Command::Categories => {
                let index = self.fetch_category_index();
                if index.is_empty() {
                    return "No categories".to_string();
                }
                let mut ids: Vec<_> = index.keys().copied().collect();
                ids.sort_unstable();
                ids.iter()
                    .map(|id| format!("{:>4}  {}", id, index[id]))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Command::List(page) => {
                let response = self.request("GET", format!("/questions?page={page}"), None);
                self.render_questions(&response)
            }
            Command::Category(id, page) => {
                let response =
                    self.request("GET", format!("/categories/{id}/questions?page={page}"), None);
                self.render_questions(&response)
            }
            Command::Search(term) => {
                let body = json!({ "search_term": term });
                let response = self.request("POST", "/questions/search".to_string(), Some(body));
                self.render_questions(&response)
            }
            Command::Add {
                question,
                answer,
                category,
                difficulty,
            } => {
                let body = json!({
                    "question": question,
                    "answer": answer,
                    "category": category,
                    "difficulty": difficulty,
                });
                let response = self.request("POST", "/questions".to_string(), Some(body));
                if response.is_success() {
                    format!("Created question {}", response.body["created"])
                } else {
                    render_error(&response)
                }
            }
            Command::Delete(id) => {
                let response = self.request("DELETE", format!("/questions/{id}"), None);
                if response.is_success() {
                    format!("Deleted question {}", id)
                } else {
                    render_error(&response)
                }
            }
            Command::Play(category) => self.play(category),
            Command::Reset => {
                self.previous.clear();
                "Quiz history cleared".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }

    fn play(&mut self, category: Option<CategoryId>) -> String {
        if category != self.quiz_category {
            self.previous.clear();
            self.quiz_category = category;
        }

        let quiz_category = match category {
            Some(id) => json!({ "id": id }),
            None => json!({}),
        };
        let body = json!({
            "quiz_category": quiz_category,
            "previous_questions": self.previous,
        });
        let response = self.request("POST", "/quizzes".to_string(), Some(body));
        if !response.is_success() {
            return render_error(&response);
        }

        let next: Option<Question> = serde_json::from_value(response.body["question"].clone()).ok();
        match next {
            Some(q) => {
                self.previous.push(q.id);
                format!(
                    "Q{}: {}\n   answer: {}",
                    self.previous.len(),
                    q.question,
                    q.answer.as_deref().unwrap_or("-")
                )
            }
            None => {
                let asked = self.previous.len();
                self.previous.clear();
                format!("Quiz over after {} questions", asked)
            }
        }
    }

    fn render_questions(&mut self, response: &ApiResponse) -> String {
        if !response.is_success() {
            return render_error(response);
        }
        let questions: Vec<Question> = response
            .body
            .get("questions")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let index = self.fetch_category_index();

        let mut out = String::new();
        for q in &questions {
            let label = q
                .category
                .and_then(|c| index.get(&c))
                .map(String::as_str)
                .unwrap_or("?");
            let _ = writeln!(out, "{:>4}  [{}] {}", q.id, label, q.question);
        }
        let _ = write!(
            out,
            "({} shown, {} total)",
            questions.len(),
            response.body["total_questions"]
        );
        out
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<()> {
        writeln!(output, "Trivia console. Type 'help' for commands.")?;
        for line in input.lines() {
            let line = line?;
            match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(cmd)) => {
                    tracing::debug!("Console command: {:?}", cmd);
                    writeln!(output, "{}", self.execute(cmd))?;
                }
                Err(err) => writeln!(output, "{}", err)?,
            }
            output.flush()?;
        }
        Ok(())
    }
}

fn render_error(response: &ApiResponse) -> String {
    format!(
        "error {}: {}",
        response.status,
        response.body["message"].as_str().unwrap_or("unknown")
    )
}
