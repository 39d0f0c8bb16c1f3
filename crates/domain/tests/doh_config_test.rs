use doh_config_domain::{DohConfig, DohConfigError, DohEndpoint, DohServer};
use serde_json::{json, Value};

const A: &str = "https://dns.example/dns-query{?dns}";
const B: &str = "https://dns2.example/dns-query{?dns}";
const POST: &str = "https://doh.example/dns-query";

fn server(template: &str) -> DohServer {
    DohServer::from_template(template).unwrap()
}

fn pinned(template: &str, ips: &[&str]) -> DohServer {
    let ips = ips.iter().map(|ip| ip.parse().unwrap()).collect();
    DohServer::from_template_with_endpoints(template, vec![DohEndpoint::new(ips)]).unwrap()
}

// ============================================================================
// Strict parsing: template list
// ============================================================================

#[test]
fn test_strict_single_template() {
    let config = DohConfig::from_str_strict(A).unwrap();
    assert_eq!(config.servers(), &[server(A)]);
}

#[test]
fn test_strict_keeps_order_and_duplicates() {
    let config = DohConfig::from_str_strict(&format!("{A} {B} {A}")).unwrap();
    assert_eq!(config.servers(), &[server(A), server(B), server(A)]);
}

#[test]
fn test_strict_ignores_surrounding_and_repeated_whitespace() {
    let spaced = DohConfig::from_str_strict(&format!("  {A} \t\n {B}\r\n\x0B ")).unwrap();
    let plain = DohConfig::from_str_strict(&format!("{A} {B}")).unwrap();
    assert_eq!(spaced, plain);
}

#[test]
fn test_strict_empty_input_fails() {
    assert_eq!(
        DohConfig::from_str_strict(""),
        Err(DohConfigError::EmptyConfiguration)
    );
    assert_eq!(
        DohConfig::from_str_strict(" \n\t "),
        Err(DohConfigError::EmptyConfiguration)
    );
}

#[test]
fn test_strict_partial_validity_fails() {
    let result = DohConfig::from_str_strict("https://good/{?dns} not a template");
    assert!(matches!(
        result,
        Err(DohConfigError::InvalidTemplate { .. })
    ));
}

#[test]
fn test_strict_order_sensitive() {
    let ab = DohConfig::from_str_strict(&format!("{A} {B}")).unwrap();
    let ba = DohConfig::from_str_strict(&format!("{B} {A}")).unwrap();
    assert_ne!(ab, ba);
}

#[test]
fn test_from_str_is_strict() {
    let config: DohConfig = A.parse().unwrap();
    assert_eq!(config, DohConfig::from_str_strict(A).unwrap());
    assert!("".parse::<DohConfig>().is_err());
}

// ============================================================================
// Strict parsing: JSON
// ============================================================================

#[test]
fn test_strict_json_document() {
    let text = json!({
        "servers": [
            { "template": A },
            { "template": B, "endpoints": [{ "ips": ["192.0.2.1"] }] }
        ]
    })
    .to_string();

    let config = DohConfig::from_str_strict(&text).unwrap();
    assert_eq!(config.servers(), &[server(A), pinned(B, &["192.0.2.1"])]);
}

#[test]
fn test_strict_json_ignores_extra_keys() {
    let text = json!({
        "servers": [{ "template": A, "useGet": true }],
        "comment": "ignored"
    })
    .to_string();

    let config = DohConfig::from_str_strict(&text).unwrap();
    assert_eq!(config.servers(), &[server(A)]);
}

#[test]
fn test_strict_json_empty_servers_fails() {
    assert_eq!(
        DohConfig::from_str_strict(r#"{"servers": []}"#),
        Err(DohConfigError::EmptyConfiguration)
    );
}

#[test]
fn test_strict_json_with_bad_record_fails() {
    let text = json!({
        "servers": [
            { "template": A },
            { "template": "not a template" },
            { "template": B }
        ]
    })
    .to_string();

    assert!(matches!(
        DohConfig::from_str_strict(&text),
        Err(DohConfigError::InvalidStructuredConfig(_))
    ));
}

#[test]
fn test_strict_json_wrong_shape_is_malformed() {
    for text in [
        r#"{"servers": "https://dns.example/dns-query{?dns}"}"#,
        r#"{"templates": []}"#,
        r#"["https://dns.example/dns-query{?dns}"]"#,
    ] {
        assert!(
            matches!(
                DohConfig::from_str_strict(text),
                Err(DohConfigError::MalformedDocument(_))
            ),
            "expected MalformedDocument for {text}"
        );
    }
}

#[test]
fn test_strict_json_non_object_element_fails() {
    let text = json!({ "servers": [A] }).to_string();
    assert!(matches!(
        DohConfig::from_str_strict(&text),
        Err(DohConfigError::InvalidStructuredConfig(_))
    ));
}

// ============================================================================
// Lenient parsing
// ============================================================================

#[test]
fn test_lax_empty_input() {
    assert!(DohConfig::from_str_lax("").is_empty());
    assert!(DohConfig::from_str_lax("   \n").is_empty());
}

#[test]
fn test_lax_drops_invalid_tokens() {
    let config = DohConfig::from_str_lax("https://good/{?dns} not a template");
    assert_eq!(config.len(), 1);
    assert_eq!(config.servers()[0].server_template(), "https://good/{?dns}");
}

#[test]
fn test_lax_keeps_order_of_valid_tokens() {
    let config = DohConfig::from_str_lax(&format!("junk {B} more-junk {A}"));
    assert_eq!(config.servers(), &[server(B), server(A)]);
}

#[test]
fn test_lax_json_empty_servers_is_empty_group() {
    let config = DohConfig::from_str_lax(r#"{"servers": []}"#);
    assert!(config.is_empty());
}

#[test]
fn test_lax_json_document() {
    let text = json!({ "servers": [{ "template": A }, { "template": B }] }).to_string();
    let config = DohConfig::from_str_lax(&text);
    assert_eq!(config.servers(), &[server(A), server(B)]);
}

#[test]
fn test_lax_json_with_bad_record_is_not_partially_accepted() {
    let text = json!({
        "servers": [
            { "template": A },
            { "template": B },
            { "template": "not a template" }
        ]
    })
    .to_string();

    assert!(DohConfig::from_str_lax(&text).is_empty());
}

#[test]
fn test_lax_matches_strict_on_valid_input() {
    let text = format!("{A}\n{POST}");
    assert_eq!(
        DohConfig::from_str_lax(&text),
        DohConfig::from_str_strict(&text).unwrap()
    );
}

// ============================================================================
// from_templates
// ============================================================================

#[test]
fn test_from_templates_all_valid() {
    let config = DohConfig::from_templates([A, B]).unwrap();
    assert_eq!(config, DohConfig::new(vec![server(A), server(B)]));
}

#[test]
fn test_from_templates_any_invalid_fails() {
    let result = DohConfig::from_templates(vec![A.to_string(), "bad".to_string()]);
    assert!(matches!(result, Err(DohConfigError::InvalidTemplate { .. })));
}

#[test]
fn test_from_templates_empty_list_is_empty_group() {
    let config = DohConfig::from_templates(Vec::<String>::new()).unwrap();
    assert!(config.is_empty());
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_to_string_simple_is_newline_joined() {
    let config = DohConfig::new(vec![server(A), server(B)]);
    assert_eq!(config.to_string(), format!("{A}\n{B}"));
}

#[test]
fn test_to_string_empty_group() {
    assert_eq!(DohConfig::default().to_string(), "");
}

#[test]
fn test_to_string_non_simple_is_json() {
    let config = DohConfig::new(vec![server(A), pinned(B, &["192.0.2.1", "2001:db8::1"])]);
    let text = config.to_string();

    assert!(text.starts_with('{'));
    assert!(text.ends_with('}'));
    assert!(!text.ends_with('\n'));

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, config.to_value());
}

#[test]
fn test_to_value_always_structured() {
    let config = DohConfig::new(vec![server(A)]);
    assert_eq!(config.to_value(), json!({ "servers": [{ "template": A }] }));
}

#[test]
fn test_round_trip_simple() {
    let config = DohConfig::new(vec![server(A), server(POST), server(A)]);
    assert_eq!(DohConfig::from_str_strict(&config.to_string()).unwrap(), config);
}

#[test]
fn test_round_trip_structured() {
    let config = DohConfig::new(vec![
        pinned(A, &["192.0.2.1"]),
        server(B),
        pinned(POST, &["2001:db8::53"]),
    ]);
    let text = config.to_string();

    assert_eq!(DohConfig::from_str_strict(&text).unwrap(), config);
    assert_eq!(DohConfig::from_str_lax(&text), config);
}

#[test]
fn test_round_trip_to_value() {
    let config = DohConfig::new(vec![server(B), pinned(A, &["192.0.2.7"])]);
    assert_eq!(DohConfig::from_value(&config.to_value()).unwrap(), config);
}

// ============================================================================
// Serde
// ============================================================================

#[test]
fn test_serde_embeds_structured_form() {
    let config = DohConfig::new(vec![server(A)]);
    let outer = json!({ "doh": config });

    assert_eq!(outer, json!({ "doh": { "servers": [{ "template": A }] } }));

    let decoded: DohConfig = serde_json::from_value(outer["doh"].clone()).unwrap();
    assert_eq!(decoded, config);
}

#[test]
fn test_serde_deserialize_rejects_bad_document() {
    let bad = json!({ "servers": [{ "template": "bad" }] });
    assert!(serde_json::from_value::<DohConfig>(bad).is_err());
}
