//! Integration tests for query and filter serialization.
//!
//! These tests pin the exact wire JSON for:
//! - Single filter and query shapes
//! - Filtered query composition and the filter-only policy
//! - Compound filters
//! - Sorts and request bodies
//! - Shape stability across a parse round trip

use esdsl::dsl::{ErrorCode, FilterItem, FilterOnlyPolicy, FilterValue};
use esdsl::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn text<T: ToJson>(node: &T) -> String {
    node.to_json_string().expect("serialization failed")
}

#[test]
fn test_query_term() {
    assert_eq!(text(&query().term("user", "kimchy")), r#"{"term":{"user":"kimchy"}}"#);
}

#[test]
fn test_search_with_range_filter() {
    let q = query().search("actor:\"bob\"").range(
        range()
            .field("@timestamp")
            .from("2012-12-29T16:52:48+00:00")
            .to("2012-12-29T17:52:48+00:00"),
    );

    assert_eq!(
        text(&q),
        r#"{"filtered":{"query":{"query_string":{"query":"actor:\"bob\""}},"filter":{"range":{"@timestamp":{"from":"2012-12-29T16:52:48+00:00","to":"2012-12-29T17:52:48+00:00"}}}}}"#
    );
}

#[test]
fn test_range_after_term_filter_keeps_term() {
    let q = query()
        .all()
        .filter(filter().term("user", "kimchy"))
        .range(range().field("age").gte(1));

    assert_eq!(
        text(&q),
        r#"{"filtered":{"query":{"match_all":{}},"filter":{"term":{"user":"kimchy"}}}}"#
    );
}

#[test]
fn test_range_after_missing_filter_takes_range() {
    let q = query()
        .all()
        .filter(filter().missing("deleted"))
        .range(range().field("age").gte(1));

    assert_eq!(
        text(&q),
        r#"{"filtered":{"query":{"match_all":{}},"filter":{"range":{"age":{"gte":1}}}}}"#
    );
}

#[test]
fn test_strict_range_rejects_conflicting_filter() {
    let err = query()
        .all()
        .filter(filter().term("user", "kimchy"))
        .try_range(range().field("age").gte(1))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidQuery);
}

#[test]
fn test_range_without_field_is_omitted() {
    assert_eq!(text(&range().build()), "{}");
    assert_eq!(text(&range().field("").gte(1).build()), "{}");
    assert_eq!(
        text(&range().field("").gte(1).field("age").lt(3).build()),
        r#"{"range":{"age":{"lt":3}}}"#
    );
}

#[test]
fn test_empty_terms_query_is_not_a_query_clause() {
    let q = query()
        .terms("tags", Vec::<String>::new())
        .filter(filter().exists("a"));
    assert_eq!(text(&q), "{}");
}

#[test]
fn test_value_serde_matches_wire() {
    let json = serde_json::to_string(&FilterValue::Float(3.0)).unwrap();
    assert_eq!(json, "3");
    assert!(serde_json::to_string(&FilterValue::Float(f64::NAN)).is_err());
}

#[test]
fn test_filter_only_query_serializes_to_empty_object() {
    let q = query().filter(filter().term("user", "kimchy"));
    assert_eq!(text(&q), "{}");

    let q = query().filters([FilterItem::from(filter().exists("a"))]);
    assert_eq!(text(&q), "{}");
}

#[test]
fn test_filter_only_query_rejected_when_configured() {
    let config = DslConfig::builder().filter_only(FilterOnlyPolicy::Reject).build();
    let err = query()
        .filter(filter().exists("a"))
        .to_json_with(&config)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::FilterWithoutQuery);
}

#[test]
fn test_sort() {
    assert_eq!(text(&sort("age")), r#"{"age":{"order":"asc"}}"#);
    assert_eq!(text(&sort("last_name").desc()), r#"{"last_name":{"order":"desc"}}"#);
    assert_eq!(
        text(&sort("age").missing_first()),
        r#"{"age":{"missing":"_first","order":"asc"}}"#
    );
}

#[test]
fn test_single_item_group_is_unwrapped() {
    let group = compound_filter([FilterItem::from(filter().term("user", "kimchy"))]);
    assert_eq!(group.to_json().unwrap(), filter().term("user", "kimchy").to_json().unwrap());
}

#[test]
fn test_group_preserves_item_order() {
    let group = filters![
        filter().missing("z"),
        filter().exists("a"),
        json!({"match_all": {}}),
    ];
    assert_eq!(
        text(&group),
        r#"{"and":[{"missing":{"field":"z"}},{"exists":{"field":"a"}},{"match_all":{}}]}"#
    );
}

#[test]
fn test_nested_groups() {
    let group = filters![
        "or",
        filters![filter().exists("a"), filter().exists("b")],
        filter().missing("c"),
    ];
    assert_eq!(
        text(&group),
        r#"{"or":[{"and":[{"exists":{"field":"a"}},{"exists":{"field":"b"}}]},{"missing":{"field":"c"}}]}"#
    );
}

#[test]
fn test_terms_append_across_calls() {
    let f = filter()
        .terms("user", ["kimchy"])
        .terms("user", ["elasticsearch"]);
    assert_eq!(text(&f), r#"{"terms":{"user":["kimchy","elasticsearch"]}}"#);
}

#[test]
fn test_filter_embedding_query() {
    let f = filter().query(query().prefix("name", "ki"));
    assert_eq!(text(&f), r#"{"query":{"prefix":{"name":"ki"}}}"#);
}

#[test]
fn test_filter_bool_with_nested() {
    let f = filter().bool(
        vec![filter().nested("comments", filter().term("author", "bob"), 0, 0)],
        vec![filter().regexp("name", "ki.*"), filter().exists("email")],
    );
    assert_eq!(
        f.to_json().unwrap(),
        json!({
            "bool": {
                "must": [{"nested": {"filter": {"term": {"author": "bob"}}, "path": "comments"}}],
                "should": [{"regexp": {"name": "ki.*"}}, {"exists": {"field": "email"}}]
            }
        })
    );
}

#[test]
fn test_function_score_with_raw_function() {
    let q = query().function_score(
        "sum",
        query().term("user", "kimchy"),
        [json!({"random_score": {"seed": 10}})],
    );
    assert_eq!(
        text(&q),
        r#"{"function_score":{"functions":[{"random_score":{"seed":10}}],"query":{"term":{"user":"kimchy"}},"score_mode":"sum"}}"#
    );
}

#[test]
fn test_query_string_builder() {
    let qs = QueryString::new("_all", "actor:\"bob\" AND type:\"EventType\"")
        .default_operator("OR");
    assert_eq!(
        text(&query().query_string(qs)),
        r#"{"query_string":{"default_operator":"OR","default_field":"_all","query":"actor:\"bob\" AND type:\"EventType\""}}"#
    );
}

#[test]
fn test_round_trip_shape_stability() {
    let request = SearchRequest::new()
        .from(10)
        .size(5)
        .query(
            query()
                .bool(
                    vec![
                        query().term("user", "kimchy"),
                        query().fields("title,body", "rust", "", ""),
                    ],
                    vec![query().all()],
                )
                .filters([
                    FilterItem::from("or"),
                    range().field("age").gte(18.0).lt(65.5).into(),
                    filter().geo_distance_range("1km", "5km", "loc", "arc", 52.37, 4.89).into(),
                ]),
        )
        .sort(sort("age").desc())
        .fields(["title"]);

    let first = request.to_json().unwrap();
    let text = serde_json::to_string(&first).unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, first);
    assert_eq!(serde_json::to_string(&parsed).unwrap(), text);
}
