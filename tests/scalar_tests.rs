// tests/scalar_tests.rs

use std::sync::Arc;

use graphql_html::{
    HTML_SCALAR_NAME, HtmlScalar, LiteralKind, LiteralNode, PolicyOptions, ScalarError, ScalarType,
    ValueShape,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Defaults plus `img`, as most integrators configure it.
fn with_img() -> HtmlScalar {
    HtmlScalar::new(PolicyOptions::new().extend_tags(["img"]))
}

#[test]
fn descriptor_name_and_description() {
    let html = HtmlScalar::default();

    assert_eq!(html.name(), HTML_SCALAR_NAME);
    assert_eq!(html.name(), "HTML");
    assert!(html.description().unwrap().starts_with("The `HTML` scalar type"));
}

#[test]
fn serialize_strips_script() {
    // Arrange
    init_tracing();
    let html = HtmlScalar::build(None);

    // Act
    let out = html.serialize(&json!("Hello<script>evil()</script>")).unwrap();

    // Assert
    assert_eq!(out, "Hello");
}

#[test]
fn plain_text_is_preserved() {
    let html = HtmlScalar::build(None);

    assert_eq!(html.serialize(&json!("Hello")).unwrap(), "Hello");
    assert_eq!(html.parse_value(&json!("Hello")).unwrap(), "Hello");
    assert_eq!(html.parse_literal(&LiteralNode::string("Hello")).unwrap(), "Hello");
}

#[test]
fn serialize_and_parse_value_agree() {
    let html = with_img();
    let inputs = [
        "<p>Hello, world<script>console.log('x')</script>!</p>",
        "<a href=\"https://example.com\" onclick=\"steal()\">link</a>",
        "<img src=\"x.png\" onerror=\"alert(1)\">",
        "<div><b>bold</i> unclosed",
        "",
    ];

    for input in inputs {
        assert_eq!(
            html.serialize(&json!(input)).unwrap(),
            html.parse_value(&json!(input)).unwrap(),
            "entry points disagree on {input:?}"
        );
    }
}

#[test]
fn default_policy_strips_img() {
    let html = HtmlScalar::default();

    let out = html.parse_value(&json!("<img src=\"x.png\">")).unwrap();

    assert_eq!(out, "");
}

#[test]
fn extended_policy_keeps_img() {
    let html = with_img();

    let out = html.parse_value(&json!("<img src=\"x.png\">")).unwrap();

    assert_eq!(out, "<img src=\"x.png\">");
}

#[test]
fn extended_policy_still_filters_img_attributes() {
    let html = with_img();

    let out = html
        .parse_value(&json!("<img src=\"x.png\" onerror=\"alert(1)\" data-x=\"1\">"))
        .unwrap();

    assert_eq!(out, "<img src=\"x.png\">");
}

#[test]
fn non_string_values_are_type_mismatch() {
    init_tracing();
    let html = HtmlScalar::default();

    assert_eq!(
        html.serialize(&json!(42)),
        Err(ScalarError::TypeMismatch {
            found: ValueShape::Number
        })
    );
    assert_eq!(
        html.parse_value(&json!(42)),
        Err(ScalarError::TypeMismatch {
            found: ValueShape::Number
        })
    );
    assert_eq!(
        html.parse_value(&json!(null)),
        Err(ScalarError::TypeMismatch {
            found: ValueShape::Null
        })
    );
    assert_eq!(
        html.serialize(&json!(["<b>x</b>"])),
        Err(ScalarError::TypeMismatch {
            found: ValueShape::Array
        })
    );
}

#[test]
fn type_mismatch_message_and_code() {
    let err = HtmlScalar::default().serialize(&json!(true)).unwrap_err();

    assert_eq!(err.to_string(), "HTML cannot represent a non string value: boolean");
    assert_eq!(err.code(), "HTML_TYPE_MISMATCH");
    assert_eq!(
        err.to_graphql_error(),
        json!({
            "message": "HTML cannot represent a non string value: boolean",
            "extensions": { "code": "HTML_TYPE_MISMATCH" },
        })
    );
}

#[test]
fn non_string_literals_fail_validation() {
    let html = HtmlScalar::default();
    let cases = [
        (LiteralNode::int(42), LiteralKind::Int),
        (LiteralNode::Float("4.2".into()), LiteralKind::Float),
        (LiteralNode::Boolean(true), LiteralKind::Boolean),
        (LiteralNode::Null, LiteralKind::Null),
        (LiteralNode::Enum("BOLD".into()), LiteralKind::Enum),
        (LiteralNode::Variable("body".into()), LiteralKind::Variable),
        (LiteralNode::List(vec![LiteralNode::string("<b>x</b>")]), LiteralKind::List),
        (
            LiteralNode::Object(vec![("body".into(), LiteralNode::string("x"))]),
            LiteralKind::Object,
        ),
    ];

    for (node, kind) in cases {
        assert_eq!(html.parse_literal(&node), Err(ScalarError::Validation { kind }));
    }
}

#[test]
fn validation_message_names_the_kind() {
    let err = HtmlScalar::default()
        .parse_literal(&LiteralNode::int(42))
        .unwrap_err();

    assert_eq!(err.to_string(), "Can only sanitize HTML strings, but got: IntValue");
    assert_eq!(err.code(), "GRAPHQL_VALIDATION_FAILED");
}

#[test]
fn literal_matches_parse_value() {
    let html = HtmlScalar::default();

    let literal = html.parse_literal(&LiteralNode::string("<b>hi</b>")).unwrap();
    let value = html.parse_value(&json!("<b>hi</b>")).unwrap();

    assert_eq!(literal, "<b>hi</b>");
    assert_eq!(literal, value);
}

#[test]
fn block_string_literal_is_sanitized() {
    let html = HtmlScalar::default();

    let out = html
        .parse_literal(&LiteralNode::block_string("<p>ok</p>\n<script>bad()</script>"))
        .unwrap();

    assert_eq!(out, "<p>ok</p>\n");
}

#[test]
fn sanitizing_twice_is_a_no_op() {
    let html = with_img();
    let inputs = [
        "Hello<script>evil()</script>",
        "<p>Hello, <a href=\"https://example.com\" target=\"_blank\">world</a></p>",
        "<ul><li>one<li>two</ul>",
        "5 < 6 & 7 > 3",
        "<table><tr><td>cell</td></tr></table>",
    ];

    for input in inputs {
        let once = html.parse_value(&json!(input)).unwrap();
        let twice = html.parse_value(&json!(once.clone())).unwrap();
        assert_eq!(once, twice, "second pass changed {input:?}");
    }
}

#[test]
fn links_lose_javascript() {
    let html = HtmlScalar::default();

    let safe = html
        .serialize(&json!("<a href=\"https://example.com\">x</a>"))
        .unwrap();
    let evil = html
        .serialize(&json!("<a href=\"javascript:alert(1)\">x</a>"))
        .unwrap();

    assert_eq!(safe, "<a href=\"https://example.com\">x</a>");
    assert!(!evil.contains("javascript"));
    assert!(evil.ends_with(">x</a>"));
}

#[test]
fn default_policy_keeps_links_unchanged() {
    let html = HtmlScalar::default();
    let input = "<p>see <a href=\"https://x.org\" target=\"_blank\">x</a></p>";

    let out = html.parse_value(&json!(input)).unwrap();

    // no attribute outside the allow-list is added
    assert_eq!(out, input);
    assert!(!out.contains("rel="));
}

#[test]
fn event_handlers_are_removed() {
    let html = HtmlScalar::default();

    let out = html.serialize(&json!("<p onclick=\"steal()\">hi</p>")).unwrap();

    assert_eq!(out, "<p>hi</p>");
}

#[test]
fn scalar_is_usable_as_trait_object() {
    let scalars: Vec<Box<dyn ScalarType + Send + Sync>> =
        vec![Box::new(HtmlScalar::default()), Box::new(with_img())];

    for scalar in &scalars {
        assert_eq!(scalar.name(), "HTML");
        assert_eq!(scalar.serialize(&json!("<b>x</b>")).unwrap(), "<b>x</b>");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_conversions_share_one_scalar() {
    // Arrange
    let html = Arc::new(with_img());
    let expected = html.serialize(&json!("<p>hi<script>x()</script></p>")).unwrap();

    // Act
    let mut handles = Vec::new();
    for i in 0..16 {
        let html = Arc::clone(&html);
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                html.serialize(&json!("<p>hi<script>x()</script></p>"))
            } else {
                html.parse_value(&json!("<p>hi<script>x()</script></p>"))
            }
        }));
    }

    // Assert
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), expected);
    }
    assert_eq!(expected, "<p>hi</p>");
}
