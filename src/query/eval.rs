use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH, Pipeline, Stage};

/// Evaluates a filter against one document.
///
/// Path resolution fans out through arrays of subdocuments, so `title.value`
/// addresses every localized entry. Null-literal membership and `ne` follow
/// the document-store convention of also matching missing fields.
pub fn eval_filter(doc: &BsonDocument, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Exists { path, exists } => !resolve_path(doc, path).is_empty() == *exists,
        Filter::In { path, values } => in_matches(doc, path, values),
        Filter::Nin { path, values } => !in_matches(doc, path, values),
        Filter::Cmp { path, op, value } => {
            let resolved = resolve_path(doc, path);
            match op {
                CmpOp::Eq => eq_matches(&resolved, value),
                CmpOp::Ne => !eq_matches(&resolved, value),
                CmpOp::Gt => resolved.iter().any(|v| compare_bson(v, value) == Ordering::Greater),
                CmpOp::Gte => resolved.iter().any(|v| compare_bson(v, value) != Ordering::Less),
                CmpOp::Lt => resolved.iter().any(|v| compare_bson(v, value) == Ordering::Less),
                CmpOp::Lte => resolved.iter().any(|v| compare_bson(v, value) != Ordering::Greater),
            }
        }
        Filter::Regex { path, pattern, case_insensitive } => {
            let mut builder = regex::RegexBuilder::new(pattern);
            builder.case_insensitive(*case_insensitive);
            let Ok(re) = builder.build() else {
                return false;
            };
            resolve_path(doc, path).iter().any(|v| match v {
                Bson::String(s) => re.is_match(s),
                _ => false,
            })
        }
    }
}

/// Runs a pipeline over an already-materialized document set, stage by stage.
pub fn apply_pipeline(mut docs: Vec<BsonDocument>, pipeline: &Pipeline) -> Vec<BsonDocument> {
    for stage in &pipeline.stages {
        match stage {
            Stage::Match(filter) => docs.retain(|d| eval_filter(d, filter)),
            Stage::Skip(n) => {
                let n = usize::try_from(*n).unwrap_or(usize::MAX);
                if n >= docs.len() {
                    docs.clear();
                } else {
                    docs.drain(..n);
                }
            }
            Stage::Limit(n) => docs.truncate(usize::try_from(*n).unwrap_or(usize::MAX)),
            Stage::Project(fields) => {
                for d in &mut docs {
                    *d = project_fields(d, fields);
                }
            }
        }
    }
    docs
}

fn in_matches(doc: &BsonDocument, path: &str, values: &[Bson]) -> bool {
    let resolved = resolve_path(doc, path);
    if resolved.is_empty() {
        // A membership set containing null also matches absent fields.
        return values.iter().take(MAX_IN_SET).any(|v| matches!(v, Bson::Null));
    }
    resolved.iter().any(|v| is_in_set(v, values))
}

fn eq_matches(resolved: &[&Bson], value: &Bson) -> bool {
    if resolved.is_empty() {
        return matches!(value, Bson::Null);
    }
    resolved.iter().any(|v| *v == value || element_of(v, value))
}

fn is_in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().take(MAX_IN_SET).any(|x| x == v || element_of(v, x))
}

/// Array fields also match element-wise, as the document store does.
fn element_of(v: &Bson, candidate: &Bson) -> bool {
    match v {
        Bson::Array(items) => items.iter().any(|i| i == candidate),
        _ => false,
    }
}

fn resolve_path<'a>(doc: &'a BsonDocument, path: &str) -> Vec<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return Vec::new();
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() > MAX_PATH_DEPTH {
        return Vec::new();
    }
    let mut out = Vec::new();
    if let Some(v) = doc.get(segments[0]) {
        collect_values(v, &segments[1..], &mut out);
    }
    out
}

fn collect_values<'a>(v: &'a Bson, segments: &[&str], out: &mut Vec<&'a Bson>) {
    if segments.is_empty() {
        out.push(v);
        return;
    }
    match v {
        Bson::Document(d) => {
            if let Some(next) = d.get(segments[0]) {
                collect_values(next, &segments[1..], out);
            }
        }
        Bson::Array(items) => {
            for item in items {
                collect_values(item, segments, out);
            }
        }
        _ => {}
    }
}

pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    use bson::Bson as T;
    fn is_num(x: &T) -> bool {
        matches!(x, T::Int32(_) | T::Int64(_) | T::Double(_))
    }
    #[allow(clippy::cast_precision_loss)]
    fn as_f64_num(x: &T) -> f64 {
        match x {
            T::Int32(i) => f64::from(*i),
            T::Int64(i) => *i as f64,
            T::Double(f) => *f,
            _ => f64::NAN,
        }
    }
    if is_num(a) && is_num(b) {
        return as_f64_num(a).total_cmp(&as_f64_num(b));
    }
    match (a, b) {
        (T::String(x), T::String(y)) => x.cmp(y),
        (T::Boolean(x), T::Boolean(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    use bson::Bson as T;
    match v {
        T::Null => 0,
        T::Boolean(_) => 1,
        T::Int32(_) => 2,
        T::Int64(_) => 3,
        T::Double(_) => 4,
        T::String(_) => 5,
        T::Array(_) => 6,
        T::Document(_) => 7,
        _ => 8,
    }
}

pub fn project_fields(doc: &BsonDocument, fields: &[String]) -> BsonDocument {
    let mut out = BsonDocument::new();
    for f in fields {
        if let Some(v) = doc.get(f) {
            out.insert(f.clone(), v.clone());
        }
    }
    out
}
