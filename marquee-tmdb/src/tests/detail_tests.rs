use super::*;

const DETAIL: &str = r#"{
    "id": 10,
    "title": "Example",
    "runtime": 120,
    "adult": false,
    "genres": [{"id": 28, "name": "Action"}],
    "vote_average": 7.1,
    "vote_count": 900
}"#;

const CREDITS: &str = r#"{
    "id": 10,
    "cast": [
        {"id": 100, "name": "Alan Smith"},
        {"id": 101, "name": "Beth Jones"},
        {"id": 100, "name": "Alan Smith"}
    ],
    "crew": [
        {"id": 200, "name": "Sam Producer", "job": "Producer"},
        {"id": 201, "name": "Jane Doe", "job": "Director"},
        {"id": 202, "name": "Second Director", "job": "Director"}
    ]
}"#;

#[test]
fn test_full_enrichment() {
    let enrichment = parse_enrichment(10, DETAIL, CREDITS).unwrap();
    assert_eq!(enrichment.runtime_minutes, 120);
    assert_eq!(enrichment.director, Some(PersonRef::new(201, "Jane Doe")));
    let cast: Vec<_> = enrichment.cast.iter().map(|p| p.id).collect();
    assert_eq!(cast, vec![100, 101]);
}

#[test]
fn test_no_director_when_no_crew_matches() {
    let credits =
        r#"{"id": 10, "cast": [], "crew": [{"id": 1, "name": "X", "job": "Co-Director"}]}"#;
    let enrichment = parse_enrichment(10, DETAIL, credits).unwrap();
    assert!(enrichment.director.is_none());
    assert!(enrichment.cast.is_empty());
}

#[test]
fn test_missing_cast_and_crew_arrays() {
    let enrichment = parse_enrichment(10, DETAIL, r#"{"id": 10}"#).unwrap();
    assert!(enrichment.director.is_none());
    assert!(enrichment.cast.is_empty());
}

#[test]
fn test_director_match_is_exact() {
    let crew = vec![
        CrewMember {
            id: Some(1),
            name: "Assistant".to_string(),
            job: "Assistant Director".to_string(),
        },
        CrewMember {
            id: None,
            name: "No Id".to_string(),
            job: "Director".to_string(),
        },
        CrewMember {
            id: Some(3),
            name: "Real".to_string(),
            job: "Director".to_string(),
        },
    ];
    assert_eq!(find_director(&crew), Some(PersonRef::new(3, "Real")));
}

#[test]
fn test_detail_id_mismatch_is_malformed() {
    let err = parse_enrichment(11, DETAIL, CREDITS).unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }));
}

#[test]
fn test_credits_id_mismatch_is_malformed() {
    let err = parse_enrichment(10, DETAIL, r#"{"id": 99, "cast": []}"#).unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }));
}

#[test]
fn test_null_runtime_is_zero() {
    let enrichment =
        parse_enrichment(10, r#"{"id": 10, "runtime": null}"#, r#"{"cast": []}"#).unwrap();
    assert_eq!(enrichment.runtime_minutes, 0);
}

#[test]
fn test_detail_error_payload() {
    let err = parse_enrichment(
        10,
        concat!(
            r#"{"success": false, "status_code": 34, "#,
            r#""status_message": "The resource you requested could not be found."}"#
        ),
        CREDITS,
    )
    .unwrap_err();
    assert!(matches!(err, FetchError::Application { code: 34, .. }));
}

#[test]
fn test_unparseable_detail_is_malformed() {
    let err = parse_enrichment(10, "{}", CREDITS).unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }));
}
