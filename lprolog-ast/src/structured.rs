//! Structured programs and the pass that builds them from flat ones.
//!
//! [`structure`] walks a flat declaration list with a stack of open blocks.
//! A block opener pushes a frame; the matching `End` pops it and attaches
//! the finished sub-program to its parent. Consecutive clauses with no block
//! boundary between them land in a single [`Block::Clauses`].
//!
//! `shorten` has no `End` of its own: its scope extends to the end of the
//! enclosing block (or of the unit).

use crate::program::{self, Attribute, Decl, Digest};
use crate::{Chr, Clause, Loc, Macro, Mode, Shorthand, Symbol, TermError, Type, TypeAbbreviation};
use smartstring::alias::String as SmartString;
use std::collections::HashSet;

/// Where a clause goes relative to a named one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    Before(String),
    After(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseAttributes {
    pub id: Option<String>,
    pub insertion: Option<Insertion>,
    pub ifexpr: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeAttribute {
    #[default]
    Plain,
    External,
    Index(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChrAttributes {
    /// Rule name; the rule location when none is given.
    pub cid: String,
    pub cifexpr: Option<String>,
}

/// A nested program scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub macros: Vec<Macro>,
    pub types: Vec<Type<TypeAttribute>>,
    pub type_abbrevs: Vec<TypeAbbreviation>,
    pub modes: Vec<Mode>,
    pub body: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A `{ }` block with its `local` names.
    Locals(Vec<Symbol>, Program),
    Clauses(Vec<Clause<ClauseAttributes>>),
    Namespace(Symbol, Program),
    Shorten(Vec<Shorthand>, Program),
    Constraints(Vec<Symbol>, Vec<Chr<ChrAttributes>>, Program),
}

#[derive(Debug)]
enum FrameKind {
    Root,
    Begin,
    Namespace(Symbol),
    Constraint(Vec<Symbol>),
    Shorten(Vec<Shorthand>),
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    loc: Loc,
    program: Program,
    clauses: Vec<Clause<ClauseAttributes>>,
    chrs: Vec<Chr<ChrAttributes>>,
    locals: Vec<Symbol>,
}

impl Frame {
    fn new(kind: FrameKind, loc: Loc) -> Self {
        Self {
            kind,
            loc,
            program: Program::default(),
            clauses: Vec::new(),
            chrs: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Closes the pending run of clauses.
    fn flush(&mut self) {
        if !self.clauses.is_empty() {
            let clauses = std::mem::take(&mut self.clauses);
            self.program.body.push(Block::Clauses(clauses));
        }
    }

    fn into_block(mut self) -> Block {
        self.flush();
        match self.kind {
            FrameKind::Begin => Block::Locals(self.locals, self.program),
            FrameKind::Namespace(name) => Block::Namespace(name, self.program),
            FrameKind::Constraint(names) => Block::Constraints(names, self.chrs, self.program),
            FrameKind::Shorten(s) => Block::Shorten(s, self.program),
            FrameKind::Root => crate::anomaly!("root frame closed as a block"),
        }
    }
}

macro_rules! bail_structure {
    ($loc:expr, $($arg:tt)*) => {
        return Err(TermError::Structure {
            loc: ::core::clone::Clone::clone(&$loc),
            message: SmartString::from(format!($($arg)*)),
        })
    };
}

struct Structurer {
    stack: Vec<Frame>,
    seen: HashSet<Digest>,
}

impl Structurer {
    fn top(&mut self) -> &mut Frame {
        match self.stack.last_mut() {
            Some(frame) => frame,
            None => crate::anomaly!("structuring stack is empty"),
        }
    }

    /// Nearest enclosing frame that is not a `shorten` scope.
    fn scope(&mut self) -> &mut Frame {
        match self
            .stack
            .iter_mut()
            .rev()
            .find(|f| !matches!(f.kind, FrameKind::Shorten(_)))
        {
            Some(frame) => frame,
            None => crate::anomaly!("structuring stack has no root"),
        }
    }

    fn open(&mut self, kind: FrameKind, loc: Loc) {
        log::debug!("structure: open {:?} at {}", kind, loc);
        self.top().flush();
        self.stack.push(Frame::new(kind, loc));
    }

    fn close_top(&mut self) {
        if let Some(frame) = self.stack.pop() {
            log::debug!("structure: close {:?} opened at {}", frame.kind, frame.loc);
            let block = frame.into_block();
            self.top().program.body.push(block);
        }
    }

    fn close_shortens(&mut self) {
        while matches!(
            self.stack.last().map(|f| &f.kind),
            Some(FrameKind::Shorten(_))
        ) {
            self.close_top();
        }
    }

    fn decls(&mut self, decls: Vec<Decl>) -> Result<(), TermError> {
        for decl in decls {
            self.decl(decl)?;
        }
        Ok(())
    }

    fn decl(&mut self, decl: Decl) -> Result<(), TermError> {
        match decl {
            Decl::Begin(loc) => self.open(FrameKind::Begin, loc),
            Decl::Namespace(loc, name) => self.open(FrameKind::Namespace(name), loc),
            Decl::Constraint(loc, names) => self.open(FrameKind::Constraint(names), loc),
            Decl::Shorten(loc, s) => self.open(FrameKind::Shorten(s), loc),
            Decl::End(loc) => {
                self.close_shortens();
                if self.stack.len() == 1 {
                    bail_structure!(loc, "unmatched block end");
                }
                self.close_top();
            }
            Decl::Accumulated(_, units) => {
                for (digest, decls) in units {
                    if self.seen.insert(digest) {
                        self.decls(decls)?;
                    } else {
                        log::debug!("structure: skipping already accumulated unit {digest}");
                    }
                }
            }
            Decl::Clause(c) => {
                let attributes = clause_attributes(&c.loc, c.attributes)?;
                self.top().clauses.push(Clause {
                    loc: c.loc,
                    attributes,
                    body: c.body,
                });
            }
            Decl::Local(loc, names) => {
                let scope = self.scope();
                if !matches!(scope.kind, FrameKind::Begin) {
                    bail_structure!(loc, "local declarations are only allowed inside {{ }} blocks");
                }
                scope.locals.extend(names);
            }
            Decl::Mode(modes) => self.top().program.modes.extend(modes),
            Decl::Chr(r) => {
                let attributes = chr_attributes(&r.loc, r.attributes)?;
                let rule = Chr {
                    to_match: r.to_match,
                    to_remove: r.to_remove,
                    guard: r.guard,
                    new_goal: r.new_goal,
                    attributes,
                    loc: r.loc,
                };
                let scope = self.scope();
                if !matches!(scope.kind, FrameKind::Constraint(_)) {
                    bail_structure!(rule.loc, "rules are only allowed inside constraint blocks");
                }
                scope.chrs.push(rule);
            }
            Decl::Macro(m) => self.top().program.macros.push(m),
            Decl::Type(types) => {
                for t in types {
                    let attributes = type_attributes(&t.loc, t.attributes)?;
                    self.top().program.types.push(Type {
                        loc: t.loc,
                        attributes,
                        name: t.name,
                        ty: t.ty,
                    });
                }
            }
            Decl::TypeAbbreviation(a) => self.top().program.type_abbrevs.push(a),
            Decl::Ignored(_) => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Program, TermError> {
        self.close_shortens();
        let mut root = match self.stack.pop() {
            Some(frame) => frame,
            None => crate::anomaly!("structuring stack is empty"),
        };
        if !matches!(root.kind, FrameKind::Root) {
            bail_structure!(root.loc, "block is never closed");
        }
        root.flush();
        Ok(root.program)
    }
}

/// Nests a flat program into a [`Program`] tree.
///
/// Accumulated units are spliced in place; a unit whose digest was already
/// seen is skipped.
///
/// # Errors
/// [`TermError::Structure`] on an unmatched `End`, an unclosed block, a
/// constraint rule outside a `constraint` block, a `local` outside a `{ }`
/// block, or a misplaced or repeated attribute.
pub fn structure(decls: program::Program) -> Result<Program, TermError> {
    let mut s = Structurer {
        stack: vec![Frame::new(FrameKind::Root, Loc::initial("<root>"))],
        seen: HashSet::new(),
    };
    s.decls(decls)?;
    s.finish()
}

fn set_once<T>(slot: &mut Option<T>, value: T, loc: &Loc, what: &str) -> Result<(), TermError> {
    if slot.is_some() {
        bail_structure!(loc, "duplicate attribute {what}");
    }
    *slot = Some(value);
    Ok(())
}

fn clause_attributes(loc: &Loc, attrs: Vec<Attribute>) -> Result<ClauseAttributes, TermError> {
    let mut out = ClauseAttributes::default();
    for a in attrs {
        match a {
            Attribute::Name(s) => set_once(&mut out.id, s, loc, "name")?,
            Attribute::Before(s) => {
                set_once(&mut out.insertion, Insertion::Before(s), loc, "before/after")?
            }
            Attribute::After(s) => {
                set_once(&mut out.insertion, Insertion::After(s), loc, "before/after")?
            }
            Attribute::If(s) => set_once(&mut out.ifexpr, s, loc, "if")?,
            other => bail_structure!(loc, "attribute {other} is not allowed on clauses"),
        }
    }
    Ok(out)
}

fn chr_attributes(loc: &Loc, attrs: Vec<Attribute>) -> Result<ChrAttributes, TermError> {
    let mut cid = None;
    let mut cifexpr = None;
    for a in attrs {
        match a {
            Attribute::Name(s) => set_once(&mut cid, s, loc, "name")?,
            Attribute::If(s) => set_once(&mut cifexpr, s, loc, "if")?,
            other => bail_structure!(loc, "attribute {other} is not allowed on rules"),
        }
    }
    Ok(ChrAttributes {
        cid: cid.unwrap_or_else(|| loc.to_string()),
        cifexpr,
    })
}

fn type_attributes(loc: &Loc, attrs: Vec<Attribute>) -> Result<TypeAttribute, TermError> {
    let mut out: Option<TypeAttribute> = None;
    for a in attrs {
        match a {
            Attribute::External => set_once(&mut out, TypeAttribute::External, loc, "external/index")?,
            Attribute::Index(ix) => set_once(&mut out, TypeAttribute::Index(ix), loc, "external/index")?,
            other => bail_structure!(loc, "attribute {other} is not allowed on types"),
        }
    }
    Ok(out.unwrap_or_default())
}
