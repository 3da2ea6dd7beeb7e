use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::Error;
use crate::model::{CreatePostRequest, UpdatePostRequest};

static CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^C[0-9]{3}$").expect("category regex must compile"));
static EPOCH_MILLIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]*$").expect("epoch regex must compile"));

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl Violation {
    fn new(field: &str, value: &str, message: &str) -> Self {
        Self { field: field.to_string(), value: value.to_string(), message: message.to_string() }
    }
}

/// Converts the first violation into the client-facing error.
///
/// # Errors
/// `InvalidValue` carrying the first violation, when any exist.
pub fn into_error(violations: Vec<Violation>) -> Result<(), Error> {
    match violations.into_iter().next() {
        Some(v) => Err(Error::InvalidValue { field: v.field, value: v.value, message: v.message }),
        None => Ok(()),
    }
}

/// Checks a creation payload: required fields, category/length formats, and
/// the numeric shape of an explicit exposure time.
#[must_use]
pub fn validate_create(req: &CreatePostRequest) -> Vec<Violation> {
    let mut out = Vec::new();

    match req.category.as_deref() {
        None | Some("") => out.push(Violation::new("category", "", "category does not exist")),
        Some(c) if !CATEGORY.is_match(c) => {
            out.push(Violation::new("category", c, "category does not matched"));
        }
        Some(_) => {}
    }

    match &req.title {
        None => out.push(Violation::new("title", "", "title does not exist")),
        Some(title) if title.is_empty() => {
            out.push(Violation::new("title", "", "title does not exist"));
        }
        Some(title) => out.extend(check_title_lengths(title)),
    }

    match req.content.as_deref() {
        None | Some("") => out.push(Violation::new("content", "", "content does not exist")),
        Some(c) => out.extend(check_content_length(c)),
    }

    match req.author.as_deref() {
        None | Some("") => out.push(Violation::new("author", "", "author does not exist")),
        Some(a) => out.extend(check_author_length(a)),
    }

    if let Some(showed_at) = req.showed_at.as_deref() {
        if !EPOCH_MILLIS.is_match(showed_at) {
            out.push(Violation::new("showedAt", showed_at, "showedAt does not matched"));
        }
    }

    out
}

/// Checks a mutation payload: the editor is mandatory, optional title and
/// content only need to respect the length rules.
#[must_use]
pub fn validate_update(req: &UpdatePostRequest) -> Vec<Violation> {
    let mut out = Vec::new();

    match req.author.as_deref() {
        None | Some("") => out.push(Violation::new("author", "", "author does not exist")),
        Some(a) => out.extend(check_author_length(a)),
    }

    if let Some(title) = &req.title {
        out.extend(check_title_lengths(title));
    }
    if let Some(content) = req.content.as_deref() {
        out.extend(check_content_length(content));
    }

    out
}

fn check_title_lengths(title: &[crate::model::LocalizedText]) -> Vec<Violation> {
    title
        .iter()
        .filter(|entry| !(2..=100).contains(&entry.value.chars().count()))
        .map(|entry| {
            Violation::new("title", &entry.value, "title's length must be between 2 to 100")
        })
        .collect()
}

fn check_content_length(content: &str) -> Vec<Violation> {
    if content.chars().count() > 2000 {
        vec![Violation::new("content", content, "The maximum content length is 2000")]
    } else {
        Vec::new()
    }
}

fn check_author_length(author: &str) -> Vec<Violation> {
    if (2..=20).contains(&author.chars().count()) {
        Vec::new()
    } else {
        vec![Violation::new("author", author, "author's length must be between 2 to 20")]
    }
}
