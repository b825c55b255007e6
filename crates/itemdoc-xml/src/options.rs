//! Writer options.

/// Revision written to every document. Readers accept any value.
pub const REVISION: &str = "1";

/// Options controlling XML output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Emit the `<?xml ...?>` declaration.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
        }
    }
}

impl WriteOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Write the document without line breaks or indentation.
    #[must_use]
    pub fn compact(mut self) -> Self {
        self.indent = 0;
        self
    }

    /// Enable or disable the XML declaration.
    #[must_use]
    pub fn with_declaration(mut self, enable: bool) -> Self {
        self.declaration = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let options = WriteOptions::new().compact().with_declaration(false);
        assert_eq!(options.indent, 0);
        assert!(!options.declaration);
        assert_eq!(WriteOptions::default().indent, 2);
    }
}
