//! RFC 6570 URI template checking for DoH server templates.
//!
//! Only the parts needed to validate a template are implemented: the
//! template is expanded with the `dns` variable bound to a probe value and
//! the result must be an absolute `https` URL.

use url::Url;

/// The only variable a DoH template may bind.
const DNS_VARIABLE: &str = "dns";

/// Value substituted for `dns` when probing a template.
const PROBE_QUERY: &str = "this_is_a_test_query";

const MAX_PREFIX_LENGTH: usize = 9999;

/// Result of a successful template check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckedTemplate {
    /// True when the template never references `dns`, meaning queries are
    /// sent in a POST body.
    pub use_post: bool,
}

/// Expansion rules for one expression operator (RFC 6570 appendix A).
struct Operator {
    first: &'static str,
    separator: &'static str,
    named: bool,
    if_empty: &'static str,
}

impl Operator {
    fn parse(c: char) -> Option<Self> {
        let op = match c {
            '+' => Self::new("", ",", false, ""),
            '#' => Self::new("#", ",", false, ""),
            '.' => Self::new(".", ".", false, ""),
            '/' => Self::new("/", "/", false, ""),
            ';' => Self::new(";", ";", true, ""),
            '?' => Self::new("?", "&", true, "="),
            '&' => Self::new("&", "&", true, "="),
            _ => return None,
        };
        Some(op)
    }

    const fn new(
        first: &'static str,
        separator: &'static str,
        named: bool,
        if_empty: &'static str,
    ) -> Self {
        Self {
            first,
            separator,
            named,
            if_empty,
        }
    }

    const fn simple() -> Self {
        Self::new("", ",", false, "")
    }
}

/// Checks `template` and reports whether it describes a GET or POST server.
pub(crate) fn check(template: &str) -> Result<CheckedTemplate, String> {
    let (expanded, used_dns) = expand(template)?;

    let url = Url::parse(&expanded).map_err(|e| format!("expands to an invalid URL: {e}"))?;
    if url.scheme() != "https" {
        return Err(format!("scheme must be https, got {}", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("URL has no host".to_string());
    }

    Ok(CheckedTemplate {
        use_post: !used_dns,
    })
}

/// Expands `template` with only `dns` defined. Returns the expanded text and
/// whether `dns` was referenced.
fn expand(template: &str) -> Result<(String, bool), String> {
    let mut out = String::with_capacity(template.len() + PROBE_QUERY.len());
    let mut used_dns = false;
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        let (literal, tail) = rest.split_at(pos);
        out.push_str(literal);

        if tail.starts_with('}') {
            return Err("unmatched '}'".to_string());
        }
        let close = tail
            .find('}')
            .ok_or_else(|| "unterminated expression".to_string())?;
        let expression = &tail[1..close];
        if expression.contains('{') {
            return Err("nested '{' in expression".to_string());
        }
        used_dns |= expand_expression(expression, &mut out)?;
        rest = &tail[close + 1..];
    }
    out.push_str(rest);

    Ok((out, used_dns))
}

fn expand_expression(expression: &str, out: &mut String) -> Result<bool, String> {
    let mut chars = expression.chars();
    let (op, specs) = match chars.next().and_then(Operator::parse) {
        Some(op) => (op, chars.as_str()),
        None => (Operator::simple(), expression),
    };
    if specs.is_empty() {
        return Err("empty expression".to_string());
    }

    let mut used_dns = false;
    let mut first = true;
    for spec in specs.split(',') {
        let (name, prefix) = parse_varspec(spec)?;
        if name != DNS_VARIABLE {
            continue;
        }
        used_dns = true;

        out.push_str(if first { op.first } else { op.separator });
        first = false;

        let value = match prefix {
            Some(len) => &PROBE_QUERY[..len.min(PROBE_QUERY.len())],
            None => PROBE_QUERY,
        };
        if op.named {
            out.push_str(name);
            if value.is_empty() {
                out.push_str(op.if_empty);
                continue;
            }
            out.push('=');
        }
        out.push_str(value);
    }

    Ok(used_dns)
}

/// Splits a varspec into its name and optional prefix length. The explode
/// modifier has no effect on a single string value.
fn parse_varspec(spec: &str) -> Result<(&str, Option<usize>), String> {
    let (name, prefix) = if let Some(name) = spec.strip_suffix('*') {
        (name, None)
    } else if let Some((name, len)) = spec.split_once(':') {
        let len: usize = len
            .parse()
            .map_err(|_| format!("invalid prefix modifier in '{spec}'"))?;
        if !(1..=MAX_PREFIX_LENGTH).contains(&len) {
            return Err(format!("prefix length out of range in '{spec}'"));
        }
        (name, Some(len))
    } else {
        (spec, None)
    };

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '%'));
    if !valid {
        return Err(format!("invalid variable name '{name}'"));
    }

    Ok((name, prefix))
}
