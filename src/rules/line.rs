//! Splitting configuration text into rule lines.

/// Marker that starts a comment line.
pub const COMMENT_MARKER: &str = "//";

/// Keyword of aggregation lines.
pub const ADD: &str = "ADD";

/// Trigger types a definition line may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Title,
    Description,
    After,
    Before,
    Not,
    And,
    Or,
}

impl Kind {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "TITLE" => Some(Self::Title),
            "DESCRIPTION" => Some(Self::Description),
            "AFTER" => Some(Self::After),
            "BEFORE" => Some(Self::Before),
            "NOT" => Some(Self::Not),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Title | Self::Description | Self::After | Self::Before | Self::Not => 1,
            Self::And | Self::Or => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "TITLE",
            Self::Description => "DESCRIPTION",
            Self::After => "AFTER",
            Self::Before => "BEFORE",
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A rule line that survived comment and blank filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLine<'a> {
    /// 1-based physical line number.
    pub number: usize,
    /// Line text without trailing whitespace.
    pub content: &'a str,
}

impl<'a> RuleLine<'a> {
    /// Comma-separated fields, each trimmed. No escaping exists.
    pub fn fields(&self) -> Vec<&'a str> {
        self.content.split(',').map(str::trim).collect()
    }
}

/// Yield the rule lines of `text`, skipping blanks and `//` comments while
/// keeping physical line numbers.
pub fn rule_lines(text: &str) -> impl Iterator<Item = RuleLine<'_>> {
    text.lines().enumerate().filter_map(|(index, raw)| {
        let content = raw.trim_end();
        if content.trim_start().is_empty() || content.trim_start().starts_with(COMMENT_MARKER) {
            None
        } else {
            Some(RuleLine {
                number: index + 1,
                content,
            })
        }
    })
}
