use chart_studio::error::{ChartStudioError, ErrorCategory};
use chart_studio::messages::{Locale, Operation};
use chart_studio::response_parser::parse;
use serde_json::Value;

const BODIES: &[&str] = &[
    r#"[{"name":"Jan","value":100},{"name":"Feb","value":-3.5}]"#,
    r#"{"nested":{"list":[1,2,3]},"flag":true}"#,
    "[]",
    "42",
    r#""just a string""#,
];

#[test]
fn fenced_json_parses_like_its_body() {
    for body in BODIES {
        let expected: Value = parse(body).unwrap();
        for fenced in [
            format!("```json\n{body}\n```"),
            format!("```JSON\n{body}\n```"),
            format!("```\n{body}\n```"),
            format!("  \n```javascript\n{body}\n```\n  "),
            format!("```json\n{body}```"),
        ] {
            let got: Value = parse(&fenced).unwrap();
            assert_eq!(got, expected, "fence variant {fenced:?}");
        }
    }
}

#[test]
fn invalid_json_is_always_a_parse_error() {
    for raw in [
        "",
        "   ",
        "not json",
        "```json\n{\"name\": \"Jan\",}\n```",
        "```json\n```",
        "[{\"name\":\"Jan\",\"value\":100}",
        "Here is your data: [1,2,3]",
        "```json\n[1,2]\n``` trailing prose",
    ] {
        match parse::<Value>(raw) {
            Err(ChartStudioError::Parse { .. }) => {}
            other => panic!("{raw:?} gave {other:?}"),
        }
    }
}

#[test]
fn parse_error_hides_the_decoder_diagnostic_from_users() {
    let err = parse::<Value>("{oops").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    let shown = err.user_message(Locale::Es, Operation::GenerateData);
    assert!(!shown.contains("line"));
    assert!(!shown.contains("oops"));
    match err {
        ChartStudioError::Parse { diagnostic } => assert!(!diagnostic.is_empty()),
        other => panic!("unexpected {other:?}"),
    }
}
