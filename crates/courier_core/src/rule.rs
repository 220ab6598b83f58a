//! Validation rule tokens.
//!
//! Rules arrive from the host application either as colon-delimited strings
//! (`required`, `min:3`, `in:draft,published`) or as custom rule objects the
//! extractor cannot read. The latter are kept as [`RuleToken::Opaque`] so the
//! field survives even though its rule contributes nothing to typing.

use indexmap::IndexMap;

/// Validation rules for one handler, keyed by dotted field path in
/// declaration order.
pub type RuleMap = IndexMap<String, Vec<RuleToken>>;

/// One atomic validation constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleToken {
    /// A string rule such as `max:255`, split into its name and arguments
    Rule { name: String, args: Vec<String> },
    /// A rule that could not be parsed
    Opaque { implies_required: bool },
}

impl RuleToken {
    /// Parse a single rule string. The name is lowercased and trimmed; the
    /// argument list is comma-split.
    ///
    /// ```
    /// use courier_core::RuleToken;
    ///
    /// let token = RuleToken::parse("in:draft,published");
    /// assert_eq!(token.name(), Some("in"));
    /// assert_eq!(token.args(), ["draft", "published"]);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let (name, args) = match raw.split_once(':') {
            Some((name, args)) => (
                name,
                args.split(',').map(|a| a.trim().to_string()).collect(),
            ),
            None => (raw, Vec::new()),
        };
        Self::Rule {
            name: name.trim().to_lowercase(),
            args,
        }
    }

    pub fn opaque(implies_required: bool) -> Self {
        Self::Opaque { implies_required }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Rule { name, .. } => Some(name),
            Self::Opaque { .. } => None,
        }
    }

    pub fn args(&self) -> &[String] {
        match self {
            Self::Rule { args, .. } => args,
            Self::Opaque { .. } => &[],
        }
    }

    pub fn implies_required(&self) -> bool {
        match self {
            Self::Rule { name, .. } => name == "required",
            Self::Opaque { implies_required } => *implies_required,
        }
    }
}

/// Split a pipe-delimited rule string (`required|email|max:255`) into tokens.
/// Empty segments are dropped.
pub fn parse_rules(raw: &str) -> Vec<RuleToken> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RuleToken::parse)
        .collect()
}
