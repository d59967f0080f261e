//! License information algebra.
//!
//! A [`LicenseInformation`] is either a single [`License`] or an n-ary
//! [`LicenseStatement`] that applies one [`LicenseOperator`] across all of
//! its children. Statements render as `( a AND b )`; empty statements
//! render as the empty string.
//!
//! [`parse_license_expression`] reads both that rendering and plain SPDX
//! style expressions, so an evaluated statement can be read back.

use crate::error::{AntennaError, ParseErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single license, identified by its short id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct License {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    long_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl License {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            long_name: None,
            text: None,
        }
    }

    /// Create a license, filling the long name from the SPDX license list
    /// when the id is a known SPDX identifier.
    pub fn known(id: impl Into<String>) -> Self {
        let id = id.into();
        let base_id = id.split(" WITH ").next().unwrap_or(&id);
        let long_name = spdx::license_id(base_id.trim_end_matches('+'))
            .map(|license| license.full_name.to_string());
        Self {
            id,
            long_name,
            text: None,
        }
    }

    #[must_use]
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.trim().is_empty()
    }

    /// Short form rendering: the id.
    #[must_use]
    pub fn evaluate(&self) -> String {
        self.id.clone()
    }

    /// Long form rendering: the long name, falling back to the id.
    #[must_use]
    pub fn evaluate_long(&self) -> String {
        self.long_name.clone().unwrap_or_else(|| self.id.clone())
    }
}

// Licenses are identified by id alone.
impl PartialEq for License {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for License {}

impl Hash for License {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for License {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for License {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Operator joining the children of a [`LicenseStatement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LicenseOperator {
    And,
    Or,
}

impl fmt::Display for LicenseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Homogeneous n-ary license statement.
///
/// Equality is structural and order-sensitive: `( A OR B )` and `( B OR A )`
/// are different statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LicenseStatement {
    licenses: Vec<LicenseInformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    op: Option<LicenseOperator>,
}

impl LicenseStatement {
    /// Create an empty statement without an operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a statement from its children and operator.
    pub fn with_licenses(licenses: Vec<LicenseInformation>, op: LicenseOperator) -> Self {
        Self {
            licenses,
            op: Some(op),
        }
    }

    /// Build `( statement OP license )` with the existing statement as the
    /// left child.
    ///
    /// Appending to an empty statement yields `( license )` rather than
    /// carrying an empty left child along, so folding a list produces a
    /// left-leaning chain such as `( ( EPL-2.0 ) AND GPL-2.0 )`.
    pub fn append_license(
        statement: impl Into<LicenseInformation>,
        license: impl Into<LicenseInformation>,
        op: LicenseOperator,
    ) -> Self {
        let statement = statement.into();
        let licenses = if statement.is_empty() {
            vec![license.into()]
        } else {
            vec![statement, license.into()]
        };
        Self::with_licenses(licenses, op)
    }

    /// Fold licenses into a left-leaning chain via [`Self::append_license`].
    pub fn fold<I>(licenses: I, op: LicenseOperator) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LicenseInformation>,
    {
        licenses.into_iter().fold(Self::new(), |statement, license| {
            Self::append_license(statement, license, op)
        })
    }

    /// Append a child.
    pub fn add_license_information(&mut self, license: impl Into<LicenseInformation>) {
        self.licenses.push(license.into());
    }

    pub fn set_op(&mut self, op: LicenseOperator) {
        self.op = Some(op);
    }

    /// The operator, absent on a freshly created statement.
    #[must_use]
    pub const fn op(&self) -> Option<LicenseOperator> {
        self.op
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[LicenseInformation] {
        &self.licenses
    }

    /// True iff there are no children or every child is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.licenses.iter().all(LicenseInformation::is_empty)
    }

    #[must_use]
    pub fn evaluate(&self) -> String {
        self.render(LicenseInformation::evaluate)
    }

    #[must_use]
    pub fn evaluate_long(&self) -> String {
        self.render(LicenseInformation::evaluate_long)
    }

    // Empty children are skipped so they never leave a dangling operator.
    // A statement with several children but no operator joins them with AND.
    fn render(&self, child: fn(&LicenseInformation) -> String) -> String {
        if self.is_empty() {
            return String::new();
        }
        let separator = format!(" {} ", self.op.unwrap_or(LicenseOperator::And));
        let rendered: Vec<String> = self
            .licenses
            .iter()
            .filter(|license| !license.is_empty())
            .map(child)
            .collect();
        format!("( {} )", rendered.join(&separator))
    }

    /// Distinct leaf licenses, in order of first appearance.
    #[must_use]
    pub fn licenses(&self) -> Vec<&License> {
        let mut seen = Vec::new();
        for child in &self.licenses {
            for license in child.licenses() {
                if !seen.contains(&license) {
                    seen.push(license);
                }
            }
        }
        seen
    }
}

impl fmt::Display for LicenseStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.evaluate())
    }
}

/// Either a single license or a composite statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LicenseInformation {
    License(License),
    Statement(LicenseStatement),
}

impl LicenseInformation {
    #[must_use]
    pub fn evaluate(&self) -> String {
        match self {
            Self::License(license) => license.evaluate(),
            Self::Statement(statement) => statement.evaluate(),
        }
    }

    #[must_use]
    pub fn evaluate_long(&self) -> String {
        match self {
            Self::License(license) => license.evaluate_long(),
            Self::Statement(statement) => statement.evaluate_long(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::License(license) => license.is_empty(),
            Self::Statement(statement) => statement.is_empty(),
        }
    }

    /// Distinct leaf licenses. Calling this never mutates the expression.
    #[must_use]
    pub fn licenses(&self) -> Vec<&License> {
        match self {
            Self::License(license) if license.is_empty() => Vec::new(),
            Self::License(license) => vec![license],
            Self::Statement(statement) => statement.licenses(),
        }
    }
}

impl Default for LicenseInformation {
    fn default() -> Self {
        Self::Statement(LicenseStatement::new())
    }
}

impl From<License> for LicenseInformation {
    fn from(license: License) -> Self {
        Self::License(license)
    }
}

impl From<LicenseStatement> for LicenseInformation {
    fn from(statement: LicenseStatement) -> Self {
        Self::Statement(statement)
    }
}

impl fmt::Display for LicenseInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.evaluate())
    }
}

// ============================================================================
// Expression parsing
// ============================================================================

/// Parse a license expression.
///
/// Accepts the rendering produced by [`LicenseInformation::evaluate`] as well
/// as SPDX style expressions. `AND` binds tighter than `OR`, runs of the same
/// operator collapse into one n-ary statement, and `X WITH Y` is kept as a
/// single license id. A parenthesised single license becomes a one-child
/// `AND` statement, matching what [`LicenseStatement::fold`] builds for the
/// first license of a chain. An empty input yields an empty statement.
pub fn parse_license_expression(expression: &str) -> Result<LicenseInformation> {
    let tokens = tokenize(expression);
    if tokens.is_empty() {
        return Ok(LicenseInformation::default());
    }

    let mut parser = ExpressionParser {
        expression,
        tokens,
        position: 0,
        depth: 0,
    };
    let parsed = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error(&format!("unexpected token '{}'", token.describe())));
    }
    Ok(parsed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    With,
    Word(String),
}

impl Token {
    fn describe(&self) -> &str {
        match self {
            Self::Open => "(",
            Self::Close => ")",
            Self::And => "AND",
            Self::Or => "OR",
            Self::With => "WITH",
            Self::Word(word) => word,
        }
    }
}

fn tokenize(expression: &str) -> Vec<Token> {
    let spaced = expression.replace('(', " ( ").replace(')', " ) ");
    spaced
        .split_whitespace()
        .map(|word| match word {
            "(" => Token::Open,
            ")" => Token::Close,
            "AND" | "and" => Token::And,
            "OR" | "or" => Token::Or,
            "WITH" | "with" => Token::With,
            other => Token::Word(other.to_string()),
        })
        .collect()
}

/// Deepest parenthesis nesting accepted by the parser.
const MAX_NESTING_DEPTH: usize = 64;

struct ExpressionParser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl ExpressionParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn error(&self, reason: &str) -> AntennaError {
        AntennaError::parse(
            "license expression",
            ParseErrorKind::InvalidLicenseExpression {
                expression: self.expression.to_string(),
                reason: reason.to_string(),
            },
        )
    }

    /// Ids may contain spaces: adjacent words form one id.
    fn join_words(&mut self, mut id: String) -> String {
        while let Some(Token::Word(word)) = self.peek() {
            id.push(' ');
            id.push_str(word);
            self.position += 1;
        }
        id
    }

    fn parse_or(&mut self) -> Result<LicenseInformation> {
        let mut operands = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.next();
            operands.push(self.parse_and()?);
        }
        Ok(collapse(operands, LicenseOperator::Or))
    }

    fn parse_and(&mut self) -> Result<LicenseInformation> {
        let mut operands = vec![self.parse_atom()?];
        while self.peek() == Some(&Token::And) {
            self.next();
            operands.push(self.parse_atom()?);
        }
        Ok(collapse(operands, LicenseOperator::And))
    }

    fn parse_atom(&mut self) -> Result<LicenseInformation> {
        match self.next() {
            Some(Token::Open) => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(self.error("nesting too deep"));
                }
                self.depth += 1;
                let inner = self.parse_or()?;
                self.depth -= 1;
                if self.next() != Some(Token::Close) {
                    return Err(self.error("missing closing parenthesis"));
                }
                Ok(match inner {
                    LicenseInformation::License(license) => LicenseStatement::with_licenses(
                        vec![LicenseInformation::License(license)],
                        LicenseOperator::And,
                    )
                    .into(),
                    statement => statement,
                })
            }
            Some(Token::Word(first)) => {
                let id = self.join_words(first);
                if self.peek() == Some(&Token::With) {
                    self.next();
                    match self.next() {
                        Some(Token::Word(first)) => {
                            let exception = self.join_words(first);
                            Ok(License::known(format!("{id} WITH {exception}")).into())
                        }
                        _ => Err(self.error("WITH must be followed by an exception id")),
                    }
                } else {
                    Ok(License::known(id).into())
                }
            }
            Some(token) => Err(self.error(&format!("unexpected token '{}'", token.describe()))),
            None => Err(self.error("unexpected end of expression")),
        }
    }
}

fn collapse(mut operands: Vec<LicenseInformation>, op: LicenseOperator) -> LicenseInformation {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        LicenseStatement::with_licenses(operands, op).into()
    }
}
