//! Rendering context for the outline renderer.

use super::OutlineOptions;
use super::types::{HeadingEntry, Scope};
use texskel_core::AnchorSet;

/// Manages the current rendering state while folding over the records.
///
/// Every line is written at an indentation equal to the number of open
/// scopes, so nesting in the output mirrors the scope stack.
pub struct Context<'a> {
    /// Rendered HTML so far.
    pub output: String,

    /// Headings emitted so far.
    pub headings: Vec<HeadingEntry>,

    /// Anchor generator for label ids.
    anchors: AnchorSet,

    stack: Vec<Scope>,
    options: &'a OutlineOptions,
}

impl<'a> Context<'a> {
    /// Creates an empty context.
    pub fn new(options: &'a OutlineOptions) -> Self {
        Self {
            output: String::with_capacity(4096),
            headings: Vec::new(),
            anchors: AnchorSet::new(),
            stack: Vec::new(),
            options,
        }
    }

    /// Returns the rendering options.
    pub fn options(&self) -> &OutlineOptions {
        self.options
    }

    /// Writes one line at the current indentation.
    pub fn push_line(&mut self, line: &str) {
        for _ in 0..self.stack.len() {
            self.output.push_str(&self.options.indent);
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Opens a scope: writes its opening tag and pushes it onto the stack.
    pub fn enter(&mut self, scope: Scope) {
        self.push_line(&scope.open_tag());
        self.stack.push(scope);
    }

    /// Closes the innermost scope, writing its closing tag.
    pub fn exit(&mut self) -> Option<Scope> {
        let scope = self.stack.pop()?;
        self.push_line(scope.close_tag());
        Some(scope)
    }

    /// Number of open section levels.
    pub fn depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|scope| matches!(scope, Scope::Level(_)))
            .count()
    }

    /// Closes levels down to `depth`, then opens levels up to it.
    pub fn move_to_depth(&mut self, depth: usize) {
        while self.depth() > depth {
            self.exit();
        }
        while self.depth() < depth {
            let next = self.depth() + 1;
            self.enter(Scope::Level(next));
        }
    }

    /// Closes every open scope, root included.
    pub fn close_all(&mut self) {
        while self.exit().is_some() {}
    }

    /// Allocates the anchor id for a label.
    pub fn anchor_for(&mut self, label: &str) -> String {
        self.anchors.next_anchor(label)
    }

    /// Consumes the context and returns output plus headings.
    pub fn finish(mut self) -> (String, Vec<HeadingEntry>) {
        self.close_all();
        (self.output, self.headings)
    }
}
