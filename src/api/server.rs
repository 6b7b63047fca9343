use super::error::ApiError;
use super::protocol::{ApiMessage, ApiMessageContent, ApiRequest, ApiResponse};
use super::router::{resolve, Route};
use crate::catalog::{CategoryId, NewQuestion, Question, QuestionId};
use crate::query::{paginate, parse_page, select_quiz_question, QuizCategory};
use crate::store::TriviaStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};
use std::io::{self, BufRead, Read, Write};

/// Largest body `read_message` will buffer.
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

pub struct ApiServer {
    seq: u64,
    store: TriviaStore,
    per_page: usize,
    rng: StdRng,
}

impl ApiServer {
    pub fn new(store: TriviaStore, per_page: usize) -> Self {
        Self {
            seq: 0,
            store,
            per_page,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic quiz picks, for tests and replays.
    pub fn with_seed(store: TriviaStore, per_page: usize, seed: u64) -> Self {
        Self {
            seq: 0,
            store,
            per_page,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn store(&self) -> &TriviaStore {
        &self.store
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn dispatch(&mut self, request: &ApiRequest) -> ApiResponse {
        let response = match self.handle(request) {
            Ok(body) => ApiResponse::ok(body),
            Err(err) => err.into_response(),
        };
        tracing::info!(
            "{} {} -> {}",
            request.method,
            request.path,
            response.status
        );
        response
    }

    fn handle(&mut self, request: &ApiRequest) -> Result<Value, ApiError> {
        let (route, query) = resolve(&request.path);
        let route = route.ok_or(ApiError::NotFound)?;
        let page = parse_page(query);
        let method = request.method.to_ascii_uppercase();
        let body = request.body.as_ref();

        match (route, method.as_str()) {
            (Route::Categories, "GET") => self.handle_categories(),
            (Route::CategoryIndex, "GET") => self.handle_category_index(),
            (Route::Questions, "GET") => self.handle_questions(page),
            (Route::Questions, "POST") => self.handle_create_question(body, page),
            (Route::Question(id), "DELETE") => self.handle_delete_question(id, page),
            (Route::SearchQuestions, "POST") => self.handle_search(body, page),
            (Route::CategoryQuestions(id), "GET") => self.handle_category_questions(id, page),
            (Route::Quizzes, "POST") => self.handle_quiz(body),
            _ => Err(ApiError::MethodNotAllowed),
        }
    }

    fn page_of(&self, selection: &[&Question], page: i64) -> Vec<Question> {
        paginate(selection, page, self.per_page)
            .iter()
            .map(|q| (*q).clone())
            .collect()
    }

    fn current_page(&self, page: i64) -> Vec<Question> {
        paginate(self.store.questions(), page, self.per_page).to_vec()
    }

    pub fn handle_categories(&self) -> Result<Value, ApiError> {
        let categories = self.store.categories();
        if categories.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(json!({
            "success": true,
            "categories": categories,
            "total_categories": categories.len(),
        }))
    }

    pub fn handle_category_index(&self) -> Result<Value, ApiError> {
        let index = self.store.category_index();
        if index.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(json!({
            "success": true,
            "categories": index,
        }))
    }

    pub fn handle_questions(&self, page: i64) -> Result<Value, ApiError> {
        let current = self.current_page(page);
        if current.is_empty() {
            return Err(ApiError::NotFound);
        }
        Ok(json!({
            "success": true,
            "questions": current,
            "total_questions": self.store.questions().len(),
        }))
    }

    pub fn handle_create_question(
        &mut self,
        body: Option<&Value>,
        page: i64,
    ) -> Result<Value, ApiError> {
        let fields = body.and_then(Value::as_object).ok_or(ApiError::BadRequest)?;
        let new = parse_new_question(fields)?;
        let created = self.store.insert_question(new)?;

        Ok(json!({
            "success": true,
            "created": created,
            "questions": self.current_page(page),
            "total_questions": self.store.questions().len(),
        }))
    }

    pub fn handle_delete_question(&mut self, id: QuestionId, page: i64) -> Result<Value, ApiError> {
        self.store.delete_question(id)?;

        Ok(json!({
            "success": true,
            "deleted": id,
            "questions": self.current_page(page),
            "total_questions": self.store.questions().len(),
        }))
    }

    pub fn handle_search(&self, body: Option<&Value>, page: i64) -> Result<Value, ApiError> {
        let fields = body.and_then(Value::as_object).ok_or(ApiError::BadRequest)?;
        let term = match fields.get("search_term") {
            None | Some(Value::Null) => "",
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Err(ApiError::BadRequest),
        };

        let selection = self.store.search(term);
        let current = self.page_of(&selection, page);
        if current.is_empty() {
            return Err(ApiError::NotFound);
        }
        tracing::debug!("Search '{}' matched {} questions", term, selection.len());

        Ok(json!({
            "success": true,
            "questions": current,
            "total_questions": selection.len(),
        }))
    }

    pub fn handle_category_questions(
        &self,
        category: CategoryId,
        page: i64,
    ) -> Result<Value, ApiError> {
        let selection = self.store.questions_in_category(category);
        let current = self.page_of(&selection, page);
        if current.is_empty() {
            return Err(ApiError::NotFound);
        }

        Ok(json!({
            "success": true,
            "questions": current,
            "total_questions": selection.len(),
            "current_category": category,
        }))
    }

    pub fn handle_quiz(&mut self, body: Option<&Value>) -> Result<Value, ApiError> {
        let (category, previous) = match body {
            None | Some(Value::Null) => (QuizCategory::All, Vec::new()),
            Some(Value::Object(fields)) => parse_quiz_params(fields)?,
            Some(_) => return Err(ApiError::BadRequest),
        };

        let question = select_quiz_question(self.store.questions(), category, &previous, &mut self.rng);
        tracing::debug!(
            "Quiz {:?} with {} previous -> {:?}",
            category,
            previous.len(),
            question.map(|q| q.id)
        );

        Ok(json!({
            "success": true,
            "question": question,
        }))
    }

    pub fn respond(&mut self, request_seq: u64, response: ApiResponse) -> ApiMessage {
        ApiMessage {
            seq: self.next_seq(),
            msg_type: "response".to_string(),
            content: ApiMessageContent::Response {
                request_seq,
                status: response.status,
                body: response.body,
            },
        }
    }
}

/// Accept ids sent either as JSON numbers or as numeric strings.
pub fn value_as_id(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_int(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn optional_field<T>(
    fields: &Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<Option<T>, ApiError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => convert(value).map(Some).ok_or(ApiError::Unprocessable),
    }
}

fn parse_new_question(fields: &Map<String, Value>) -> Result<NewQuestion, ApiError> {
    let as_text = |v: &Value| v.as_str().map(str::to_string);
    Ok(NewQuestion {
        question: optional_field(fields, "question", as_text)?,
        answer: optional_field(fields, "answer", as_text)?,
        category: optional_field(fields, "category", value_as_id)?,
        difficulty: optional_field(fields, "difficulty", value_as_int)?,
    })
}

fn parse_quiz_params(
    fields: &Map<String, Value>,
) -> Result<(QuizCategory, Vec<QuestionId>), ApiError> {
    let category = match fields.get("quiz_category") {
        None | Some(Value::Null) => QuizCategory::All,
        Some(Value::Object(c)) if c.is_empty() => QuizCategory::All,
        Some(Value::Object(c)) => c
            .get("id")
            .and_then(value_as_id)
            .map(QuizCategory::Only)
            .ok_or(ApiError::BadRequest)?,
        Some(_) => return Err(ApiError::BadRequest),
    };

    let previous = match fields.get("previous_questions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| value_as_id(v).ok_or(ApiError::BadRequest))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ApiError::BadRequest),
    };

    Ok((category, previous))
}

/// Read one `Content-Length` framed message. `Ok(None)` means end of input.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<ApiMessage>> {
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if content_length > 0 {
                break;
            }
            continue;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            content_length = value.trim().parse().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, format!("bad header: {line}"))
            })?;
        }
    }

    if content_length > MAX_FRAME_SIZE {
        // Drain what is there so the stream can resync on the next header.
        io::copy(&mut reader.take(content_length as u64), &mut io::sink())?;
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {content_length} bytes exceeds {MAX_FRAME_SIZE}"),
        ));
    }

    let mut buffer = vec![0u8; content_length];
    reader.read_exact(&mut buffer)?;
    serde_json::from_slice(&buffer)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn write_message<W: Write>(writer: &mut W, msg: &ApiMessage) -> io::Result<()> {
    let json = serde_json::to_string(msg).map_err(io::Error::other)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", json.len(), json)?;
    writer.flush()?;
    tracing::trace!("Sent {} bytes", json.len());
    Ok(())
}
