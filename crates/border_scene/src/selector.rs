//! Node selectors.
//!
//! A deliberately small selector language: `#name`, `.class`, or a bare
//! name. Combinators are not supported.

use std::fmt;
use std::str::FromStr;

use crate::error::{SceneError, SceneResult};
use crate::node::Node;

/// Identifies a node inside a subtree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeSelector {
    /// `#name` - matches the node name.
    Id(String),
    /// `.class` - matches any of the node's class tags.
    Class(String),
    /// Bare word - matches the node name.
    Name(String),
}

impl NodeSelector {
    /// Parses selector text.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidSelector`] for empty text, a lone `#`/`.`,
    /// or text containing whitespace.
    pub fn parse(text: &str) -> SceneResult<Self> {
        let trimmed = text.trim();
        let invalid = |reason| SceneError::InvalidSelector {
            selector: text.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(invalid("selector is empty"));
        }
        if trimmed.contains(char::is_whitespace) {
            return Err(invalid("combinators are not supported"));
        }

        let selector = if let Some(id) = trimmed.strip_prefix('#') {
            Self::Id(id.to_string())
        } else if let Some(class) = trimmed.strip_prefix('.') {
            Self::Class(class.to_string())
        } else {
            Self::Name(trimmed.to_string())
        };

        match &selector {
            Self::Id(s) | Self::Class(s) if s.is_empty() => Err(invalid("missing name after prefix")),
            _ => Ok(selector),
        }
    }

    /// Returns true if `node` satisfies the selector.
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Id(name) | Self::Name(name) => node.name == *name,
            Self::Class(class) => node.has_class(class),
        }
    }
}

impl FromStr for NodeSelector {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(name) => write!(f, "#{name}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(NodeSelector::parse("#menu").unwrap(), NodeSelector::Id("menu".into()));
        assert_eq!(NodeSelector::parse(".hud").unwrap(), NodeSelector::Class("hud".into()));
        assert_eq!(NodeSelector::parse("  label ").unwrap(), NodeSelector::Name("label".into()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(NodeSelector::parse("").is_err());
        assert!(NodeSelector::parse("#").is_err());
        assert!(NodeSelector::parse(".a .b").is_err());
    }

    #[test]
    fn test_matches_class_and_name() {
        let node = Node::new("menu").with_class("hud");
        assert!(NodeSelector::parse(".hud").unwrap().matches(&node));
        assert!(NodeSelector::parse("#menu").unwrap().matches(&node));
        assert!(!NodeSelector::parse("#hud").unwrap().matches(&node));
    }

    #[test]
    fn test_display_round_trips_prefix() {
        assert_eq!(NodeSelector::parse(".hud").unwrap().to_string(), ".hud");
    }
}
