//! One compilation unit: source, node graph and diagnostics.

use std::io::{self, Read, Seek};

use quix_diagnostic::{DiagFormat, DiagnosticConfig, DiagnosticManager, Severity, Ticket};
use quix_ir::serialize::to_sexpr;
use quix_ir::{
    LocationTable, NodeArena, NodeId, SexprOptions, SharedInterner, StringInterner,
    StringLookup,
};
use quix_lexer::{Lexer, LexerConfig};

use crate::error::ParseResult;
use crate::{Parser, ParserConfig};

/// Everything one source file turns into.
///
/// Created empty, filled by one [`parse`](Module::parse), then read by
/// later passes. Nothing is shared between modules except the interner, so
/// independent modules can be processed on separate threads.
pub struct Module<R> {
    lexer: Lexer<R>,
    arena: NodeArena,
    diags: DiagnosticManager,
    config: ParserConfig,
    root: Option<NodeId>,
}

/// Result of [`Module::parse_snippet`]: a tree in its own arena.
#[derive(Debug)]
pub struct Snippet {
    pub arena: NodeArena,
    pub root: NodeId,
    pub diagnostics: DiagnosticManager,
    /// Locations used by the snippet's spans and diagnostics.
    pub locations: LocationTable,
}

impl Module<io::Cursor<Vec<u8>>> {
    /// Module over an in-memory copy of `text` with a fresh interner.
    pub fn from_text(text: &str, filename: impl Into<String>) -> Self {
        let lexer = Lexer::from_text(text, filename, StringInterner::shared());
        Self::with_lexer(lexer, NodeArena::with_capacity(text.len()))
    }
}

impl<R: Read + Seek + Send> Module<R> {
    pub fn new(source: R, filename: impl Into<String>, interner: SharedInterner) -> Self {
        Self::with_lexer(Lexer::new(source, filename, interner), NodeArena::new())
    }

    fn with_lexer(lexer: Lexer<R>, arena: NodeArena) -> Self {
        Module {
            lexer: lexer.with_config(LexerConfig {
                skip_comments: true,
            }),
            arena,
            diags: DiagnosticManager::default(),
            config: ParserConfig::default(),
            root: None,
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, config: DiagnosticConfig) -> Self {
        self.diags = DiagnosticManager::new(config);
        self
    }

    #[must_use]
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_lexer_config(mut self, config: LexerConfig) -> Self {
        self.lexer = self.lexer.with_config(config);
        self
    }

    /// Parse the whole source. Later calls return the first root.
    ///
    /// Syntax errors inside statements are reported and skipped, so this
    /// only fails when `fast_error` is set or the input cannot be
    /// recovered from. Check [`has_failed`](Self::has_failed) either way.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.lexer.filename()))]
    pub fn parse(&mut self) -> ParseResult<NodeId> {
        if let Some(root) = self.root {
            return Ok(root);
        }
        let mut parser = Parser::new(&mut self.lexer, &mut self.arena, &mut self.diags, self.config);
        let root = parser.parse_module()?;
        self.root = Some(root);
        Ok(root)
    }

    /// Whether the root and every occupied slot point into the arena.
    pub fn verify(&self) -> bool {
        let Some(root) = self.root.filter(|&root| self.arena.contains(root)) else {
            return false;
        };
        tracing::trace!(?root, nodes = self.arena.len(), "verifying module");
        self.arena.ids().all(|id| {
            self.arena
                .children(id)
                .iter()
                .all(|&child| self.arena.contains(child))
        })
    }

    /// Parse, then confirm there were no errors and the tree is sound.
    pub fn check(&mut self) -> bool {
        self.parse().is_ok() && !self.diags.has_failed() && self.verify()
    }

    /// S-expression text of the parsed tree.
    pub fn dump(&self, options: SexprOptions) -> Option<String> {
        let root = self.root?;
        Some(to_sexpr(&self.arena, self.lexer.strings(), root, options))
    }

    /// Parse `text` as a block of statements into a separate arena.
    ///
    /// The module's arena, root and diagnostics are untouched. Names are
    /// interned into the shared interner.
    pub fn parse_snippet(&mut self, text: &str) -> ParseResult<Snippet> {
        let source = io::Cursor::new(text.as_bytes().to_vec());
        let mut lexer = self.lexer.fork(source, self.lexer.filename().to_string());
        let mut diagnostics = DiagnosticManager::new(self.diags.config());

        let mut scope = self.arena.scoped();
        let root = Parser::new(&mut lexer, &mut scope, &mut diagnostics, self.config).parse_module()?;
        let arena = scope.finish();

        Ok(Snippet {
            arena,
            root,
            diagnostics,
            locations: lexer.locations().clone(),
        })
    }

    /// Render diagnostics selected by `ticket`. Returns how many were
    /// rendered.
    pub fn render_diagnostics(
        &mut self,
        ticket: Ticket,
        format: DiagFormat,
        sink: &mut dyn FnMut(&str, Severity),
    ) -> usize {
        self.diags.render(ticket, format, Some(&mut self.lexer), sink)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    pub fn diagnostics(&self) -> &DiagnosticManager {
        &self.diags
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticManager {
        &mut self.diags
    }

    pub fn has_failed(&self) -> bool {
        self.diags.has_failed()
    }

    pub fn interner(&self) -> &SharedInterner {
        self.lexer.interner()
    }

    pub fn strings(&self) -> &dyn StringLookup {
        self.lexer.strings()
    }

    pub fn lexer(&self) -> &Lexer<R> {
        &self.lexer
    }

    pub fn lexer_mut(&mut self) -> &mut Lexer<R> {
        &mut self.lexer
    }

    pub fn filename(&self) -> &str {
        self.lexer.filename()
    }
}
