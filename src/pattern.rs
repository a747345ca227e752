//! Route template compilation.
//!
//! A template is a `/`-delimited string. Each segment is one of:
//!
//! - a literal (`users`), matched exactly;
//! - a typed capture (`int:id`, `alpha:slug`, `alnum:code`);
//! - an untyped capture (`:name`), matching any run of non-`/` characters;
//! - an injected fragment (`regex:[0-9]{4}` or `:regex:[0-9]{4}`), copied into
//!   the expression verbatim inside a non-capturing group.
//!
//! Templates compile once, at declaration time, into an anchored expression
//! plus the ordered list of parameters it captures.

use crate::error::{Result, RouterError};
use crate::params::PathParams;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Segment delimiter for templates and request paths.
pub const SEGMENT_DELIMITER: char = '/';

/// Maximum allowed length for a route template in bytes.
const MAX_TEMPLATE_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a route template.
const MAX_TEMPLATE_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled expression (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// The kind of text a capture accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
	/// Any run of characters other than `/`.
	Any,
	/// ASCII digits.
	Int,
	/// ASCII letters, `_` and `-`.
	Alpha,
	/// ASCII digits, letters, `_` and `-`.
	Alphanumeric,
	/// A named group contributed by an injected fragment. Not validated.
	RawRegex,
}

impl ParameterType {
	/// Maps a template type token to a parameter type.
	///
	/// Tokens are case-insensitive. Unrecognized tokens (including the empty
	/// token of a bare `:name`) fall back to [`ParameterType::Any`] rather than
	/// failing.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::ParameterType;
	///
	/// assert_eq!(ParameterType::from_token("INT"), ParameterType::Int);
	/// assert_eq!(ParameterType::from_token("alnum"), ParameterType::Alphanumeric);
	/// assert_eq!(ParameterType::from_token("uuid"), ParameterType::Any);
	/// ```
	pub fn from_token(token: &str) -> Self {
		match token.to_ascii_lowercase().as_str() {
			"int" | "integer" => Self::Int,
			"alpha" => Self::Alpha,
			"alphanumeric" | "alphanum" | "alnum" => Self::Alphanumeric,
			"regex" => Self::RawRegex,
			_ => Self::Any,
		}
	}

	/// Sub-expression placed inside the named group for this type.
	///
	/// Quantifiers are lazy; the whole expression is anchored so the capture
	/// still extends to the next literal.
	fn sub_pattern(self) -> &'static str {
		match self {
			Self::Any | Self::RawRegex => "[^/]+?",
			Self::Int => "[0-9]+?",
			Self::Alpha => "[a-zA-Z_-]+?",
			Self::Alphanumeric => "[0-9a-zA-Z_-]+?",
		}
	}
}

impl fmt::Display for ParameterType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Any => "any",
			Self::Int => "int",
			Self::Alpha => "alpha",
			Self::Alphanumeric => "alphanumeric",
			Self::RawRegex => "regex",
		};
		f.write_str(name)
	}
}

/// One parsed template segment.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
	Literal(&'a str),
	Fragment(&'a str),
	Capture { name: String, kind: ParameterType },
}

impl<'a> Segment<'a> {
	fn parse(element: &'a str) -> Self {
		let Some((type_token, rest)) = element.split_once(':') else {
			return Self::Literal(element);
		};

		if type_token.eq_ignore_ascii_case("regex") {
			return Self::Fragment(rest);
		}

		if type_token.is_empty()
			&& let Some((inner, fragment)) = rest.split_once(':')
			&& inner.eq_ignore_ascii_case("regex")
		{
			return Self::Fragment(fragment);
		}

		// Anything after a second ':' is ignored.
		let key = rest.split(':').next().unwrap_or_default();
		let name: String = key.chars().filter(|c| c.is_ascii_alphanumeric()).collect();

		Self::Capture {
			name,
			kind: ParameterType::from_token(type_token),
		}
	}
}

/// A compiled route template.
///
/// Matching is anchored to the whole path, case-sensitive and Unicode-aware.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
	/// The template as declared, including any group prefix.
	template: String,
	/// Compiled expression.
	regex: Regex,
	/// Parameters emitted on match, in capture order.
	parameters: Vec<(String, ParameterType)>,
}

impl CompiledPattern {
	/// Compiles `template` with `prefix` prepended.
	///
	/// The prefix is concatenated as-is, without inserting or removing a
	/// delimiter.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MalformedTemplate`] if the template is too long,
	/// has too many segments, declares an empty, digit-leading or duplicate
	/// parameter name, or injects a fragment the regex engine rejects.
	///
	/// # Examples
	///
	/// ```
	/// use switchyard::CompiledPattern;
	///
	/// let pattern = CompiledPattern::compile("view/int:id", "/posts/").unwrap();
	/// assert_eq!(pattern.template(), "/posts/view/int:id");
	/// assert_eq!(pattern.as_regex(), "^/posts/view/(?P<id>[0-9]+?)$");
	///
	/// let params = pattern.matches("/posts/view/7").unwrap();
	/// assert_eq!(params.get("id"), Some("7"));
	/// assert!(pattern.matches("/posts/view/seven").is_none());
	/// ```
	pub fn compile(template: &str, prefix: &str) -> Result<Self> {
		let full = format!("{}{}", prefix, template);

		if full.len() > MAX_TEMPLATE_LENGTH {
			return Err(malformed(
				&full,
				format!(
					"length {} exceeds maximum allowed length of {} bytes",
					full.len(),
					MAX_TEMPLATE_LENGTH
				),
			));
		}

		let (expression, parameters) = Self::build_expression(&full)?;

		let regex = RegexBuilder::new(&expression)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| malformed(&full, e.to_string()))?;

		let mut parameters = parameters;
		// Named groups inside injected fragments are still reported.
		for name in regex.capture_names().flatten() {
			if !parameters.iter().any(|(declared, _)| declared == name) {
				parameters.push((name.to_string(), ParameterType::RawRegex));
			}
		}

		Ok(Self {
			template: full,
			regex,
			parameters,
		})
	}

	fn build_expression(template: &str) -> Result<(String, Vec<(String, ParameterType)>)> {
		let delimiter = SEGMENT_DELIMITER.to_string();

		if template.is_empty() || template == delimiter {
			return Ok(("^/$".to_string(), Vec::new()));
		}

		let mut elements: Vec<&str> = template.split(SEGMENT_DELIMITER).collect();
		if template.starts_with(SEGMENT_DELIMITER) {
			elements.remove(0);
		}

		if elements.len() > MAX_TEMPLATE_SEGMENTS {
			return Err(malformed(
				template,
				format!(
					"{} segments exceed maximum of {}",
					elements.len(),
					MAX_TEMPLATE_SEGMENTS
				),
			));
		}

		let mut expression = String::from("^");
		let mut parameters: Vec<(String, ParameterType)> = Vec::new();

		for element in elements {
			expression.push(SEGMENT_DELIMITER);

			match Segment::parse(element) {
				Segment::Literal(text) => expression.push_str(&regex::escape(text)),
				// Grouped so alternation and inline flags stay inside the segment.
				Segment::Fragment(fragment) => {
					expression.push_str("(?:");
					expression.push_str(fragment);
					expression.push(')');
				}
				Segment::Capture { name, kind } => {
					if name.is_empty() {
						return Err(malformed(
							template,
							format!("segment '{}' has an empty parameter name", element),
						));
					}
					if name.starts_with(|c: char| c.is_ascii_digit()) {
						return Err(malformed(
							template,
							format!("parameter name '{}' must not start with a digit", name),
						));
					}
					if parameters.iter().any(|(declared, _)| *declared == name) {
						return Err(malformed(
							template,
							format!("duplicate parameter name '{}'", name),
						));
					}

					expression.push_str(&format!("(?P<{}>{})", name, kind.sub_pattern()));
					parameters.push((name, kind));
				}
			}
		}

		expression.push('$');
		Ok((expression, parameters))
	}

	/// Returns the template this pattern was compiled from.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Returns the generated expression.
	pub fn as_regex(&self) -> &str {
		self.regex.as_str()
	}

	/// Returns the parameters emitted on match, in capture order.
	pub fn parameters(&self) -> &[(String, ParameterType)] {
		&self.parameters
	}

	/// Returns true if the template declares no captures.
	pub fn is_literal(&self) -> bool {
		self.parameters.is_empty()
	}

	/// Checks if this pattern matches `path`.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Matches `path`, returning the captured parameters.
	///
	/// Captures that did not participate in the match (possible only inside
	/// injected fragments) are omitted.
	pub fn matches(&self, path: &str) -> Option<PathParams> {
		let captures = self.regex.captures(path)?;
		let mut params = PathParams::new();

		for (name, _) in &self.parameters {
			if let Some(value) = captures.name(name) {
				params.push(name.clone(), value.as_str());
			}
		}

		Some(params)
	}
}

impl PartialEq for CompiledPattern {
	fn eq(&self, other: &Self) -> bool {
		self.template == other.template
	}
}

impl Eq for CompiledPattern {}

impl fmt::Display for CompiledPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.template)
	}
}

fn malformed(template: &str, reason: String) -> RouterError {
	RouterError::MalformedTemplate {
		template: template.to_string(),
		reason,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn compile(template: &str) -> CompiledPattern {
		CompiledPattern::compile(template, "").unwrap()
	}

	#[rstest]
	#[case("/")]
	#[case("")]
	fn test_root_template(#[case] template: &str) {
		let pattern = compile(template);

		assert_eq!(pattern.as_regex(), "^/$");
		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match(""));
		assert!(!pattern.is_match("//"));
	}

	#[rstest]
	#[case("/users", "/users")]
	#[case("users", "/users")]
	#[case("/users/list", "/users/list")]
	#[case("/api/v1.0/", "/api/v1.0/")]
	fn test_literal_template_matches_only_itself(#[case] template: &str, #[case] path: &str) {
		let pattern = compile(template);

		let params = pattern.matches(path).unwrap();
		assert!(params.is_empty());
		assert!(pattern.is_literal());
		assert!(!pattern.is_match(&format!("{}x", path)));
		assert!(!pattern.is_match(&format!("/prefix{}", path)));
	}

	#[rstest]
	fn test_literal_metacharacters_are_escaped() {
		let pattern = compile("/api/v1.0");

		assert!(pattern.is_match("/api/v1.0"));
		assert!(!pattern.is_match("/api/v1X0"));
	}

	#[rstest]
	#[case("42", true)]
	#[case("0", true)]
	#[case("abc", false)]
	#[case("4a", false)]
	#[case("", false)]
	fn test_int_capture(#[case] segment: &str, #[case] should_match: bool) {
		let pattern = compile("/users/int:id");

		let result = pattern.matches(&format!("/users/{}", segment));

		assert_eq!(result.is_some(), should_match);
		if let Some(params) = result {
			assert_eq!(params.get("id"), Some(segment));
		}
	}

	#[rstest]
	#[case("alpha:name", "john_doe-x", true)]
	#[case("alpha:name", "john1", false)]
	#[case("alnum:code", "ab-12_c", true)]
	#[case("alphanumeric:code", "ab.12", false)]
	#[case(":slug", "anything.goes~here", true)]
	#[case(":slug", "no/slashes", false)]
	#[case("unknown:slug", "treated-as-any.1", true)]
	fn test_typed_captures(#[case] segment: &str, #[case] value: &str, #[case] should_match: bool) {
		let pattern = compile(&format!("/items/{}", segment));

		assert_eq!(pattern.is_match(&format!("/items/{}", value)), should_match);
	}

	#[rstest]
	fn test_type_tokens_are_case_insensitive() {
		let pattern = compile("/users/INT:id");

		assert_eq!(pattern.parameters(), &[("id".to_string(), ParameterType::Int)]);
		assert!(!pattern.is_match("/users/abc"));
	}

	#[rstest]
	fn test_parameter_names_are_sanitized() {
		let pattern = compile("/users/int:user_id");

		assert_eq!(pattern.parameters()[0].0, "userid");
		let params = pattern.matches("/users/5").unwrap();
		assert_eq!(params.get("userid"), Some("5"));
	}

	#[rstest]
	fn test_multiple_captures_in_order() {
		let pattern = compile("/users/int:user/posts/alpha:slug");

		let params = pattern.matches("/users/3/posts/hello").unwrap();
		assert_eq!(
			params.iter().collect::<Vec<_>>(),
			vec![("user", "3"), ("slug", "hello")]
		);
	}

	#[rstest]
	#[case("regex:[0-9]{4}")]
	#[case(":regex:[0-9]{4}")]
	fn test_injected_fragment(#[case] segment: &str) {
		let pattern = compile(&format!("/archive/{}", segment));

		assert!(pattern.is_match("/archive/2024"));
		assert!(!pattern.is_match("/archive/24"));
		assert!(pattern.matches("/archive/2024").unwrap().is_empty());
	}

	#[rstest]
	#[case("/archive/2023", true)]
	#[case("/archive/2024", true)]
	#[case("/archive/2023-junk", false)]
	#[case("/reports/2024", false)]
	#[case("/totally/else/2024", false)]
	fn test_fragment_alternation_stays_anchored(#[case] path: &str, #[case] should_match: bool) {
		// Arrange
		let pattern = compile("/archive/regex:2023|2024");

		// Act
		let matched = pattern.is_match(path);

		// Assert
		assert_eq!(pattern.as_regex(), "^/archive/(?:2023|2024)$");
		assert_eq!(matched, should_match);
	}

	#[rstest]
	fn test_fragment_flags_do_not_leak() {
		let pattern = compile("/x/regex:(?i)a/Users");

		assert!(pattern.is_match("/x/A/Users"));
		assert!(!pattern.is_match("/x/a/users"));
	}

	#[rstest]
	fn test_fragment_named_groups_are_reported() {
		let pattern = compile("/archive/regex:(?P<year>[0-9]{4})");

		assert_eq!(
			pattern.parameters(),
			&[("year".to_string(), ParameterType::RawRegex)]
		);
		let params = pattern.matches("/archive/1999").unwrap();
		assert_eq!(params.get("year"), Some("1999"));
	}

	#[rstest]
	fn test_unicode_segments() {
		let literal = compile("/café/menü");
		assert!(literal.is_match("/café/menü"));

		let capture = compile("/tags/:tag");
		let params = capture.matches("/tags/日本語").unwrap();
		assert_eq!(params.get("tag"), Some("日本語"));
	}

	#[rstest]
	fn test_matching_is_case_sensitive() {
		let pattern = compile("/Users");

		assert!(pattern.is_match("/Users"));
		assert!(!pattern.is_match("/users"));
	}

	#[rstest]
	fn test_prefix_is_concatenated() {
		let pattern = CompiledPattern::compile("add", "/posts/").unwrap();

		assert_eq!(pattern.template(), "/posts/add");
		assert!(pattern.is_match("/posts/add"));
	}

	#[rstest]
	#[case("/users/int:")]
	#[case("/users/:")]
	#[case("/users/:$$")]
	#[case("/users/int:1id")]
	#[case("/users/:id/:id")]
	#[case("/users/regex:([0-9]")]
	fn test_malformed_templates(#[case] template: &str) {
		let result = CompiledPattern::compile(template, "");

		assert!(matches!(
			result,
			Err(RouterError::MalformedTemplate { .. })
		));
	}

	#[rstest]
	fn test_rejects_excessive_length() {
		// Arrange
		let template = "/".to_string() + &"a".repeat(MAX_TEMPLATE_LENGTH + 1);

		// Act
		let result = CompiledPattern::compile(&template, "");

		// Assert
		let err = result.unwrap_err();
		assert!(err.to_string().contains("exceeds maximum allowed length"));
	}

	#[rstest]
	fn test_rejects_excessive_segments() {
		// Arrange
		let segments: Vec<&str> = (0..40).map(|_| "seg").collect();
		let template = format!("/{}", segments.join("/"));

		// Act
		let result = CompiledPattern::compile(&template, "");

		// Assert
		assert!(result.unwrap_err().to_string().contains("exceed maximum"));
	}

	#[rstest]
	fn test_segment_parse() {
		assert_eq!(Segment::parse("users"), Segment::Literal("users"));
		assert_eq!(Segment::parse("regex:a|b"), Segment::Fragment("a|b"));
		assert_eq!(
			Segment::parse("int:id:ignored"),
			Segment::Capture {
				name: "id".to_string(),
				kind: ParameterType::Int
			}
		);
	}

	#[rstest]
	fn test_display_and_equality() {
		let a = compile("/users/int:id");
		let b = compile("/users/int:id");
		let c = compile("/users/:id");

		assert_eq!(a.to_string(), "/users/int:id");
		assert_eq!(a, b);
		assert_ne!(a, c);
	}
}
