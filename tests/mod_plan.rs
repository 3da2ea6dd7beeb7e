use bson::Bson;
use boardlite::query::{
    CmpOp, DateRange, Filter, PageRequest, Stage, compile, plan_list,
};

#[test]
fn offset_is_page_size_and_count_is_page_number() {
    let page = PageRequest::new(10, 1);
    assert_eq!(page.skip(), 0);
    assert_eq!(page.limit(), 10);

    let page = PageRequest::new(10, 3);
    assert_eq!(page.skip(), 20);
    assert_eq!(page.limit(), 10);
}

#[test]
fn non_positive_pagination_is_rejected_in_order() {
    assert_eq!(PageRequest::new(0, 1).validate().unwrap_err().code(), 4001);
    assert_eq!(PageRequest::new(-5, 1).validate().unwrap_err().code(), 4001);
    assert_eq!(PageRequest::new(10, 0).validate().unwrap_err().code(), 4002);
    // Offset is checked first when both are invalid.
    assert_eq!(PageRequest::new(0, 0).validate().unwrap_err().code(), 4001);
    assert!(PageRequest::new(10, 1).validate().is_ok());
}

#[test]
fn list_plan_preserves_stage_order() {
    let clauses = compile("category%eq?C001").unwrap();
    let plan = plan_list(None, clauses, PageRequest::new(10, 2), None, None);

    assert_eq!(plan.count.stages.len(), 3);
    assert!(matches!(plan.count.stages[0], Stage::Match(Filter::And(_))));
    assert_eq!(plan.count.stages[1], Stage::Skip(10));
    assert_eq!(plan.count.stages[2], Stage::Limit(10));
}

#[test]
fn blank_query_matches_everything() {
    let plan = plan_list(None, Vec::new(), PageRequest::new(5, 1), None, None);
    assert_eq!(plan.count.stages[0], Stage::Match(Filter::True));
}

#[test]
fn projection_applies_to_the_list_pipeline_only() {
    let fields = ["postId", "title"];
    let plan = plan_list(None, Vec::new(), PageRequest::new(5, 1), None, Some(&fields));

    assert_eq!(plan.list.stages.len(), plan.count.stages.len() + 1);
    assert_eq!(
        plan.list.stages.last(),
        Some(&Stage::Project(vec!["postId".into(), "title".into()]))
    );
    assert!(!plan.count.stages.iter().any(|s| matches!(s, Stage::Project(_))));
}

#[test]
fn date_range_matches_come_after_the_page_window() {
    let range = DateRange::over("editedAt", Some("100".into()), Some("200".into()));
    let plan = plan_list(None, Vec::new(), PageRequest::new(5, 1), Some(&range), None);

    assert_eq!(plan.count.stages.len(), 5);
    assert_eq!(plan.count.stages[1], Stage::Skip(0));
    assert_eq!(plan.count.stages[2], Stage::Limit(5));
    assert_eq!(
        plan.count.stages[3],
        Stage::Match(Filter::Cmp {
            path: "editedAt".into(),
            op: CmpOp::Gte,
            value: Bson::String("100".into()),
        })
    );
    assert_eq!(
        plan.count.stages[4],
        Stage::Match(Filter::Cmp {
            path: "editedAt".into(),
            op: CmpOp::Lte,
            value: Bson::String("200".into()),
        })
    );
}

#[test]
fn owner_filter_leads_the_pipeline() {
    let owner = Filter::Cmp {
        path: "postId".into(),
        op: CmpOp::Eq,
        value: Bson::String("7".into()),
    };
    let plan = plan_list(Some(owner.clone()), Vec::new(), PageRequest::new(5, 1), None, None);
    assert_eq!(plan.count.stages[0], Stage::Match(owner));
}
