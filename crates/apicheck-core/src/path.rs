//! Declarative path expressions over parsed JSON documents
//!
//! A `PathExpr` is a small explicit AST — field access, array indexing,
//! wildcard projection, and first-match filtering — evaluated against a
//! `serde_json::Value`. Absence is a value (`None`), never a panic: callers
//! decide whether a miss is a failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One navigation step of a path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object field access: `owner`
    Field(String),
    /// Array index: `[0]`
    Index(usize),
    /// Projection over every array element: `*`
    Wildcard,
    /// First array element whose field equals the literal: `find(name="x")`
    Filter { field: String, literal: Value },
}

/// A parsed path expression.
///
/// The empty expression selects the whole document. Parsing happens once, at
/// suite load; evaluation never fails, it only misses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathExpr {
    raw: String,
    segments: Vec<Segment>,
}

impl PathExpr {
    /// Parse an expression like `find(name="Gryffindor").members.*._id`.
    ///
    /// # Errors
    ///
    /// Returns `PathError` on malformed syntax (unterminated filter, bad
    /// index, empty segment).
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let segments = parse_segments(input)?;
        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    /// The original expression text, for diagnostics.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluate against a document. `None` means the path did not resolve.
    #[must_use]
    pub fn extract(&self, document: &Value) -> Option<ExtractedValue> {
        extract_node(document, &self.segments).map(|node| ExtractedValue {
            source: self.raw.clone(),
            node,
        })
    }
}

impl std::fmt::Display for PathExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PathExpr {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, PathError> {
        Self::parse(&s)
    }
}

impl From<PathExpr> for String {
    fn from(expr: PathExpr) -> Self {
        expr.raw
    }
}

/// Result of a successful extraction, tagged with its source expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue {
    /// The expression that produced this value.
    pub source: String,
    pub node: ExtractedNode,
}

/// Scalar/sub-document vs. ordered sequence.
///
/// Sequences preserve source array order. A wildcard over an empty array is
/// `Many(vec![])` — found, just empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedNode {
    One(Value),
    Many(Vec<Value>),
}

impl ExtractedValue {
    /// Flatten to a value list: `One(v)` becomes a single-element list.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        match self.node {
            ExtractedNode::One(v) => vec![v],
            ExtractedNode::Many(vs) => vs,
        }
    }

    /// The single value, if this extraction was scalar-shaped.
    #[must_use]
    pub fn as_one(&self) -> Option<&Value> {
        match &self.node {
            ExtractedNode::One(v) => Some(v),
            ExtractedNode::Many(_) => None,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PathError {
    #[error("empty segment in path {0:?}")]
    EmptySegment(String),
    #[error("invalid index in path {0:?}: {1}")]
    InvalidIndex(String, String),
    #[error("invalid filter in path {0:?}: {1}")]
    InvalidFilter(String, String),
}

// ── Evaluation ──

fn extract_node(value: &Value, segments: &[Segment]) -> Option<ExtractedNode> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(ExtractedNode::One(value.clone()));
    };

    match head {
        Segment::Field(name) => extract_node(value.as_object()?.get(name)?, rest),
        Segment::Index(i) => extract_node(value.as_array()?.get(*i)?, rest),
        Segment::Wildcard => {
            let arr = value.as_array()?;
            let mut collected = Vec::new();
            for element in arr {
                // Elements where the remainder misses are skipped, not nulled.
                match extract_node(element, rest) {
                    Some(ExtractedNode::One(v)) => collected.push(v),
                    Some(ExtractedNode::Many(vs)) => collected.extend(vs),
                    None => {}
                }
            }
            Some(ExtractedNode::Many(collected))
        }
        Segment::Filter { field, literal } => {
            let arr = value.as_array()?;
            // First match only. Exact value equality: "5" never matches 5.
            let hit = arr
                .iter()
                .find(|el| el.as_object().and_then(|o| o.get(field)) == Some(literal))?;
            extract_node(hit, rest)
        }
    }
}

// ── Parsing ──

fn parse_segments(input: &str) -> Result<Vec<Segment>, PathError> {
    let mut segments = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                // Separator. A leading dot or a dot before the end leaves an
                // empty segment, which is a syntax error.
                if pos == 0 || pos + 1 == chars.len() || chars[pos + 1] == '.' {
                    return Err(PathError::EmptySegment(input.to_string()));
                }
                pos += 1;
            }
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or_else(|| {
                        PathError::InvalidIndex(input.to_string(), "unterminated '['".into())
                    })?;
                let digits: String = chars[pos + 1..pos + close].iter().collect();
                let index = digits.parse::<usize>().map_err(|_| {
                    PathError::InvalidIndex(input.to_string(), format!("{digits:?}"))
                })?;
                segments.push(Segment::Index(index));
                pos += close + 1;
            }
            '*' => {
                segments.push(Segment::Wildcard);
                pos += 1;
            }
            _ => {
                if chars[pos..].starts_with(&['f', 'i', 'n', 'd', '(']) {
                    let (segment, consumed) = parse_filter(input, &chars[pos..])?;
                    segments.push(segment);
                    pos += consumed;
                } else {
                    let start = pos;
                    while pos < chars.len() && chars[pos] != '.' && chars[pos] != '[' {
                        pos += 1;
                    }
                    let name: String = chars[start..pos].iter().collect();
                    segments.push(Segment::Field(name));
                }
            }
        }
    }

    Ok(segments)
}

/// Parse `find(field=literal)` starting at `chars[0]`. Returns the segment
/// and the number of chars consumed.
fn parse_filter(input: &str, chars: &[char]) -> Result<(Segment, usize), PathError> {
    let invalid = |reason: &str| PathError::InvalidFilter(input.to_string(), reason.to_string());

    let mut pos = "find(".len();

    let field_start = pos;
    while pos < chars.len() && chars[pos] != '=' {
        pos += 1;
    }
    if pos == chars.len() {
        return Err(invalid("missing '='"));
    }
    let field: String = chars[field_start..pos].iter().collect();
    if field.is_empty() {
        return Err(invalid("empty field name"));
    }
    pos += 1; // consume '='

    let literal = if chars.get(pos) == Some(&'"') {
        // Quoted string literal; backslash escapes the next character so the
        // value may contain '.', ')', and '"'.
        pos += 1;
        let mut s = String::new();
        loop {
            match chars.get(pos) {
                None => return Err(invalid("unterminated string literal")),
                Some('\\') => {
                    pos += 1;
                    match chars.get(pos) {
                        Some(&c) => {
                            s.push(c);
                            pos += 1;
                        }
                        None => return Err(invalid("dangling escape")),
                    }
                }
                Some('"') => {
                    pos += 1;
                    break;
                }
                Some(&c) => {
                    s.push(c);
                    pos += 1;
                }
            }
        }
        Value::String(s)
    } else {
        // Bare literal: number, boolean, or null.
        let start = pos;
        while pos < chars.len() && chars[pos] != ')' {
            pos += 1;
        }
        let token: String = chars[start..pos].iter().collect();
        serde_json::from_str::<Value>(token.trim())
            .map_err(|_| invalid(&format!("bad literal {token:?}")))?
    };

    if chars.get(pos) != Some(&')') {
        return Err(invalid("missing ')'"));
    }
    pos += 1;

    Ok((Segment::Filter { field, literal }, pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expr(s: &str) -> PathExpr {
        PathExpr::parse(s).unwrap()
    }

    fn one(document: &Value, path: &str) -> Option<Value> {
        expr(path)
            .extract(document)
            .and_then(|e| e.as_one().cloned())
    }

    fn many(document: &Value, path: &str) -> Option<Vec<Value>> {
        expr(path).extract(document).map(|e| match e.node {
            ExtractedNode::Many(vs) => vs,
            ExtractedNode::One(_) => panic!("expected sequence from {path}"),
        })
    }

    // ── parsing ──

    #[test]
    fn parse_field_chain() {
        let p = expr("owner.id");
        assert_eq!(
            p.segments(),
            &[
                Segment::Field("owner".into()),
                Segment::Field("id".into())
            ]
        );
    }

    #[test]
    fn parse_index_after_field() {
        let p = expr("members[0]._id");
        assert_eq!(
            p.segments(),
            &[
                Segment::Field("members".into()),
                Segment::Index(0),
                Segment::Field("_id".into())
            ]
        );
    }

    #[test]
    fn parse_wildcard_projection() {
        let p = expr("*.full_name");
        assert_eq!(
            p.segments(),
            &[Segment::Wildcard, Segment::Field("full_name".into())]
        );
    }

    #[test]
    fn parse_filter_with_string_literal() {
        let p = expr("find(name=\"Gryffindor\")._id");
        assert_eq!(
            p.segments(),
            &[
                Segment::Filter {
                    field: "name".into(),
                    literal: json!("Gryffindor")
                },
                Segment::Field("_id".into())
            ]
        );
    }

    #[test]
    fn parse_filter_with_number_literal() {
        let p = expr("find(id=5)");
        assert_eq!(
            p.segments(),
            &[Segment::Filter {
                field: "id".into(),
                literal: json!(5)
            }]
        );
    }

    #[test]
    fn parse_filter_string_may_contain_dots_and_parens() {
        let p = expr("find(label=\"a.b (c)\")");
        assert_eq!(
            p.segments(),
            &[Segment::Filter {
                field: "label".into(),
                literal: json!("a.b (c)")
            }]
        );
    }

    #[test]
    fn parse_empty_is_whole_document() {
        assert!(expr("").segments().is_empty());
    }

    #[test]
    fn parse_display_roundtrip() {
        let raw = "find(name=\"x\").members.*._id";
        assert_eq!(expr(raw).to_string(), raw);
    }

    #[test]
    fn parse_rejects_empty_segment() {
        assert!(matches!(
            PathExpr::parse("a..b"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            PathExpr::parse(".a"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            PathExpr::parse("a."),
            Err(PathError::EmptySegment(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_index() {
        assert!(matches!(
            PathExpr::parse("a[x]"),
            Err(PathError::InvalidIndex(..))
        ));
        assert!(matches!(
            PathExpr::parse("a[1"),
            Err(PathError::InvalidIndex(..))
        ));
    }

    #[test]
    fn parse_rejects_bad_filter() {
        assert!(matches!(
            PathExpr::parse("find(name)"),
            Err(PathError::InvalidFilter(..))
        ));
        assert!(matches!(
            PathExpr::parse("find(name=\"x"),
            Err(PathError::InvalidFilter(..))
        ));
        assert!(matches!(
            PathExpr::parse("find(name=oops)"),
            Err(PathError::InvalidFilter(..))
        ));
    }

    #[test]
    fn deserializes_from_plain_string() {
        let p: PathExpr = serde_json::from_str("\"owner.id\"").unwrap();
        assert_eq!(p.raw(), "owner.id");
        assert!(serde_json::from_str::<PathExpr>("\"a..b\"").is_err());
    }

    // ── extraction ──

    #[test]
    fn extract_nested_field() {
        let doc = json!({"owner": {"id": 320565}});
        assert_eq!(one(&doc, "owner.id"), Some(json!(320565)));
    }

    #[test]
    fn extract_missing_field_is_none() {
        let doc = json!({"login": "cucumber"});
        assert_eq!(expr("name").extract(&doc), None);
    }

    #[test]
    fn extract_field_on_non_object_is_none() {
        assert_eq!(expr("name").extract(&json!([1, 2])), None);
        assert_eq!(expr("name").extract(&json!("scalar")), None);
    }

    #[test]
    fn extract_whole_document() {
        let doc = json!([{"a": 1}]);
        assert_eq!(one(&doc, ""), Some(doc.clone()));
    }

    #[test]
    fn extract_index() {
        let doc = json!([{"name": "Harry"}, {"name": "Ron"}]);
        assert_eq!(one(&doc, "[1].name"), Some(json!("Ron")));
        assert_eq!(expr("[5]").extract(&doc), None);
    }

    #[test]
    fn extract_wildcard_preserves_order() {
        let doc = json!([{"id": 3}, {"id": 1}, {"id": 2}]);
        assert_eq!(
            many(&doc, "*.id"),
            Some(vec![json!(3), json!(1), json!(2)])
        );
    }

    #[test]
    fn extract_wildcard_skips_missing_fields() {
        let doc = json!([{"house": "Gryffindor"}, {"name": "Nick"}, {"house": "Slytherin"}]);
        assert_eq!(
            many(&doc, "*.house"),
            Some(vec![json!("Gryffindor"), json!("Slytherin")])
        );
    }

    #[test]
    fn extract_wildcard_on_empty_array_is_empty_sequence() {
        assert_eq!(many(&json!([]), "*.id"), Some(vec![]));
    }

    #[test]
    fn extract_wildcard_on_non_array_is_none() {
        assert_eq!(expr("*.id").extract(&json!({"id": 1})), None);
    }

    #[test]
    fn extract_nested_wildcards_flatten() {
        let doc = json!([
            {"members": [{"_id": "a"}, {"_id": "b"}]},
            {"members": [{"_id": "c"}]}
        ]);
        assert_eq!(
            many(&doc, "*.members.*._id"),
            Some(vec![json!("a"), json!("b"), json!("c")])
        );
    }

    #[test]
    fn extract_filter_first_match() {
        let doc = json!([
            {"name": "Gryffindor", "id": "1"},
            {"name": "Slytherin", "id": "2"},
            {"name": "Gryffindor", "id": "3"}
        ]);
        assert_eq!(
            one(&doc, "find(name=\"Gryffindor\")"),
            Some(json!({"name": "Gryffindor", "id": "1"}))
        );
        assert_eq!(one(&doc, "find(name=\"Gryffindor\").id"), Some(json!("1")));
    }

    #[test]
    fn extract_filter_no_match_is_none() {
        let doc = json!([{"name": "Gryffindor"}]);
        assert_eq!(expr("find(name=\"Durmstrang\")").extract(&doc), None);
    }

    #[test]
    fn extract_filter_never_coerces_types() {
        let doc = json!([{"id": 5}, {"id": "5"}]);
        assert_eq!(one(&doc, "find(id=5)"), Some(json!({"id": 5})));
        assert_eq!(one(&doc, "find(id=\"5\")"), Some(json!({"id": "5"})));
        let bools = json!([{"flag": true}]);
        assert_eq!(expr("find(flag=\"true\")").extract(&bools), None);
    }

    #[test]
    fn extracted_value_carries_source() {
        let doc = json!({"a": 1});
        let got = expr("a").extract(&doc).unwrap();
        assert_eq!(got.source, "a");
        assert_eq!(got.into_values(), vec![json!(1)]);
    }
}
