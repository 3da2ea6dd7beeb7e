use crate::errors::Error;

use super::types::{CmpOp, Filter, Pipeline, Stage};

/// Legacy pagination parameters: `offset` is the page size and `count` the
/// 1-based page number. The names are preserved from the request contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub count: i64,
}

impl PageRequest {
    #[must_use]
    pub fn new(offset: i64, count: i64) -> Self {
        Self { offset, count }
    }

    /// Rejects non-positive parameters before any store round-trip.
    ///
    /// # Errors
    /// `OffsetInvalid` when `offset <= 0`, `CountInvalid` when `count <= 0`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.offset <= 0 {
            return Err(Error::OffsetInvalid);
        }
        if self.count <= 0 {
            return Err(Error::CountInvalid);
        }
        Ok(())
    }

    #[must_use]
    pub fn skip(&self) -> u64 {
        ((self.count - 1) * self.offset) as u64
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.offset as u64
    }
}

/// Optional inclusive range filter over a stored timestamp field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub field: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    #[must_use]
    pub fn over(field: &str, start: Option<String>, end: Option<String>) -> Self {
        Self { field: field.to_string(), start, end }
    }
}

/// Paired pipelines over the same filter window. The count pipeline includes
/// Skip/Limit, so its result is the number of matches inside the requested
/// page, not across all pages. Legacy semantics, kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan {
    pub count: Pipeline,
    pub list: Pipeline,
}

/// Assembles the count and list pipelines for a paginated listing.
///
/// Stage order matters: owner match, compiled clauses, Skip, Limit, then the
/// date-range matches, with the projection applied only to the list pipeline.
#[must_use]
pub fn plan_list(
    owner: Option<Filter>,
    clauses: Vec<Filter>,
    page: PageRequest,
    range: Option<&DateRange>,
    projection: Option<&[&str]>,
) -> ListPlan {
    let mut shared = Vec::new();
    if let Some(owner) = owner {
        shared.push(Stage::Match(owner));
    }
    shared.push(Stage::Match(super::criteria::combine(clauses)));
    shared.push(Stage::Skip(page.skip()));
    shared.push(Stage::Limit(page.limit()));

    if let Some(range) = range {
        if let Some(start) = &range.start {
            shared.push(Stage::Match(Filter::Cmp {
                path: range.field.clone(),
                op: CmpOp::Gte,
                value: bson::Bson::String(start.clone()),
            }));
        }
        if let Some(end) = &range.end {
            shared.push(Stage::Match(Filter::Cmp {
                path: range.field.clone(),
                op: CmpOp::Lte,
                value: bson::Bson::String(end.clone()),
            }));
        }
    }

    let count = Pipeline::new(shared.clone());
    let mut list_stages = shared;
    if let Some(fields) = projection {
        list_stages.push(Stage::Project(fields.iter().map(|f| (*f).to_string()).collect()));
    }

    ListPlan { count, list: Pipeline::new(list_stages) }
}
