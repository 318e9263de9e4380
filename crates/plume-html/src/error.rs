//! Error types for the HTML phase.

/// Error while parsing HTML into the offline tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TreeError {
    /// XML tokenizer error.
    #[error("HTML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute.
    #[error("HTML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Text that is not valid in the document encoding.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Error in a CSS fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    /// `(` without matching `)`.
    #[error("unbalanced parentheses in {0:?}")]
    UnbalancedParens(String),

    /// `var()` whose first argument is not a custom property name.
    #[error("invalid var() reference: {0:?}")]
    InvalidVar(String),

    /// `{` without matching `}`.
    #[error("unterminated block starting at {0:?}")]
    UnterminatedBlock(String),
}

/// Error inside an HTML plugin.
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    /// The input could not be parsed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A stylesheet could not be processed.
    #[error(transparent)]
    Css(#[from] CssError),
}
