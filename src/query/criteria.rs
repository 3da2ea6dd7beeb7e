use bson::Bson;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::Error;

use super::types::{CmpOp, Filter, MAX_IN_SET, ValueType};

// A token either opens a clause (`field%op?value`) or continues the previous
// clause's value list. `le` is absent from the token grammar even though the
// value builder accepts it; legacy grammar, kept as-is.
static CLAUSE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.+%(eq|ne|lt|gt|ge|in|nin|like)\?[ㄱ-ㅎㅏ-ㅣ가-힣0-9a-zA-Z,]+$")
        .expect("clause token regex must compile")
});
static BARE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ㄱ-ㅎㅏ-ㅣ가-힣0-9a-zA-Z]+$").expect("bare token regex must compile")
});

/// Maps a q-expression field name to its stored path and value type.
///
/// `title` searches inside the localized entries, so it is rewritten to
/// `title.value`. Timestamps are `long`, the delete flag is `boolean`, and
/// everything else defaults to `string`. Matching is case-insensitive.
#[must_use]
pub fn resolve_field(field: &str) -> (String, ValueType) {
    let path = if field.eq_ignore_ascii_case("title") {
        "title.value".to_string()
    } else {
        field.to_string()
    };

    let value_type = if ["createdAt", "updatedAt", "showedAt"]
        .iter()
        .any(|f| path.eq_ignore_ascii_case(f))
    {
        ValueType::Long
    } else if path.eq_ignore_ascii_case("delYn") {
        ValueType::Boolean
    } else {
        ValueType::String
    };

    (path, value_type)
}

/// Compiles a comma-separated q-expression into one predicate per clause.
///
/// A blank `q` compiles to an empty clause list (match everything). A token
/// matching neither permitted shape, or a continuation value arriving before
/// any clause opened, rejects the whole expression.
///
/// # Errors
/// `QueryNotMatched` for grammar violations; `Query` for unparsable numeric
/// literals.
pub fn compile(q: &str) -> Result<Vec<Filter>, Error> {
    if q.trim().is_empty() {
        return Ok(Vec::new());
    }

    // First pass: re-join bare values onto the clause they belong to, since
    // the raw split on ',' breaks multi-value operators apart.
    let mut raw_clauses: Vec<String> = Vec::new();
    for token in q.split(',') {
        if !(CLAUSE_TOKEN.is_match(token) || BARE_TOKEN.is_match(token)) {
            return Err(Error::QueryNotMatched(q.to_string()));
        }
        if token.find('%').is_some_and(|i| i > 0) {
            raw_clauses.push(token.to_string());
        } else {
            match raw_clauses.last_mut() {
                Some(last) => {
                    last.push(',');
                    last.push_str(token);
                }
                None => return Err(Error::QueryNotMatched(q.to_string())),
            }
        }
    }

    // Second pass: split each clause into field, operator and value. Clauses
    // that do not split cleanly are skipped rather than rejected; legacy
    // behavior, kept as-is.
    let mut clauses = Vec::new();
    for raw in &raw_clauses {
        let parts: Vec<&str> = raw.split('%').collect();
        if parts.len() != 2 {
            continue;
        }
        let op_value: Vec<&str> = parts[1].split('?').collect();
        if op_value.len() != 2 {
            continue;
        }
        let (path, value_type) = resolve_field(parts[0]);
        clauses.push(build_predicate(&path, op_value[0], op_value[1], value_type)?);
    }

    Ok(clauses)
}

/// Compiles `q` and folds the clauses into a single AND filter.
///
/// # Errors
/// See [`compile`].
pub fn compile_filter(q: &str) -> Result<Filter, Error> {
    Ok(combine(compile(q)?))
}

/// Folds compiled clauses into one filter; no clauses means match-all.
#[must_use]
pub fn combine(clauses: Vec<Filter>) -> Filter {
    if clauses.is_empty() { Filter::True } else { Filter::And(clauses) }
}

/// A predicate that can never match: every stored document carries a postId.
fn never_matches() -> Filter {
    Filter::Exists { path: "postId".to_string(), exists: false }
}

fn build_predicate(
    path: &str,
    op: &str,
    value: &str,
    value_type: ValueType,
) -> Result<Filter, Error> {
    let filter = match op {
        "eq" => match value_type {
            ValueType::String => {
                if value == "null" {
                    Filter::In { path: path.to_string(), values: null_trio() }
                } else {
                    cmp(path, CmpOp::Eq, Bson::String(value.to_string()))
                }
            }
            ValueType::Int | ValueType::Long | ValueType::Float | ValueType::Double => {
                if value == "null" {
                    Filter::In { path: path.to_string(), values: vec![Bson::Null] }
                } else {
                    cmp(path, CmpOp::Eq, parse_number(value, value_type)?)
                }
            }
            ValueType::Boolean => match value {
                "true" => cmp(path, CmpOp::Eq, Bson::Boolean(true)),
                "false" => cmp(path, CmpOp::Eq, Bson::Boolean(false)),
                _ => never_matches(),
            },
        },
        "ne" => match value_type {
            ValueType::String => {
                if value == "null" {
                    Filter::Nin { path: path.to_string(), values: null_trio() }
                } else {
                    cmp(path, CmpOp::Ne, Bson::String(value.to_string()))
                }
            }
            ValueType::Int | ValueType::Long | ValueType::Float | ValueType::Double => {
                if value == "null" {
                    Filter::Nin { path: path.to_string(), values: vec![Bson::Null] }
                } else {
                    cmp(path, CmpOp::Ne, parse_number(value, value_type)?)
                }
            }
            ValueType::Boolean => match value {
                "true" => cmp(path, CmpOp::Ne, Bson::Boolean(true)),
                "false" => cmp(path, CmpOp::Ne, Bson::Boolean(false)),
                _ => never_matches(),
            },
        },
        "lt" | "le" | "gt" | "ge" => {
            let cmp_op = match op {
                "lt" => CmpOp::Lt,
                "le" => CmpOp::Lte,
                "gt" => CmpOp::Gt,
                _ => CmpOp::Gte,
            };
            match value_type {
                ValueType::String => cmp(path, cmp_op, Bson::String(value.to_string())),
                ValueType::Int | ValueType::Long | ValueType::Float | ValueType::Double => {
                    cmp(path, cmp_op, parse_number(value, value_type)?)
                }
                ValueType::Boolean => never_matches(),
            }
        }
        "like" => match value_type {
            ValueType::String => Filter::Regex {
                path: path.to_string(),
                pattern: format!(".*{value}.*"),
                case_insensitive: true,
            },
            _ => never_matches(),
        },
        "in" => build_membership(path, value, value_type, false)?,
        "nin" => build_membership(path, value, value_type, true)?,
        _ => never_matches(),
    };
    Ok(filter)
}

/// Builds `in`/`nin` predicates from a multi-value literal.
///
/// When `"null"` appears among the pieces, the predicate grows a second
/// branch that detects null/empty values. For `nin` that branch keeps the
/// same polarity as the membership arm instead of inverting; known anomaly,
/// kept as-is.
fn build_membership(
    path: &str,
    value: &str,
    value_type: ValueType,
    negated: bool,
) -> Result<Filter, Error> {
    let stripped = value.replace(' ', "");
    let pieces: Vec<&str> = stripped.split(',').take(MAX_IN_SET).collect();
    let has_null = pieces.contains(&"null");

    let membership = |values: Vec<Bson>| -> Filter {
        if negated {
            Filter::Nin { path: path.to_string(), values }
        } else {
            Filter::In { path: path.to_string(), values }
        }
    };

    let filter = match value_type {
        ValueType::String => {
            if has_null {
                let rest: Vec<Bson> = pieces
                    .iter()
                    .filter(|p| **p != "null")
                    .map(|p| Bson::String((*p).to_string()))
                    .collect();
                Filter::Or(vec![membership(rest), membership(null_trio())])
            } else {
                membership(pieces.iter().map(|p| Bson::String((*p).to_string())).collect())
            }
        }
        ValueType::Int | ValueType::Long | ValueType::Float | ValueType::Double => {
            let rest: Vec<Bson> = pieces
                .iter()
                .filter(|p| **p != "null")
                .map(|p| parse_number(p, value_type))
                .collect::<Result<_, _>>()?;
            if has_null {
                let null_branch = vec![Bson::Null, Bson::Array(Vec::new())];
                Filter::Or(vec![membership(rest), membership(null_branch)])
            } else {
                membership(rest)
            }
        }
        ValueType::Boolean => never_matches(),
    };
    Ok(filter)
}

/// `eq?null` on string fields matches null, empty string, and literal "null".
fn null_trio() -> Vec<Bson> {
    vec![Bson::Null, Bson::String(String::new()), Bson::String("null".to_string())]
}

fn cmp(path: &str, op: CmpOp, value: Bson) -> Filter {
    Filter::Cmp { path: path.to_string(), op, value }
}

fn parse_number(value: &str, value_type: ValueType) -> Result<Bson, Error> {
    let parsed = match value_type {
        ValueType::Int => value.parse::<i32>().map(Bson::Int32).ok(),
        ValueType::Long => value.parse::<i64>().map(Bson::Int64).ok(),
        ValueType::Float => value.parse::<f32>().map(|f| Bson::Double(f64::from(f))).ok(),
        ValueType::Double => value.parse::<f64>().map(Bson::Double).ok(),
        ValueType::String | ValueType::Boolean => None,
    };
    parsed.ok_or_else(|| Error::Query(format!("invalid numeric literal: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rewrites_title_and_types_timestamps() {
        assert_eq!(resolve_field("title"), ("title.value".into(), ValueType::String));
        assert_eq!(resolve_field("CreatedAt"), ("CreatedAt".into(), ValueType::Long));
        assert_eq!(resolve_field("delYn"), ("delYn".into(), ValueType::Boolean));
        assert_eq!(resolve_field("category"), ("category".into(), ValueType::String));
    }

    #[test]
    fn malformed_split_is_skipped_not_rejected() {
        // Passes the token grammar but splits into three parts on '%'.
        let clauses = compile("a%b%eq?1").unwrap();
        assert!(clauses.is_empty());
    }

    #[test]
    fn unknown_operator_never_matches() {
        // Operator list in build_predicate is exhaustive over the grammar,
        // so this is only reachable through the default arm.
        let f = build_predicate("category", "between", "a", ValueType::String).unwrap();
        assert_eq!(f, Filter::Exists { path: "postId".into(), exists: false });
    }

    #[test]
    fn numeric_literal_failure_is_server_side() {
        let err = compile("createdAt%ge?12a3").unwrap_err();
        assert_eq!(err.code(), 500);
    }
}
