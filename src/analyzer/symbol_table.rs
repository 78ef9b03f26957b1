use std::collections::HashMap;
use std::fmt;

use crate::codegen::Segment;

/// Storage kind of a declared name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    pub fn segment(&self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Argument => Segment::Argument,
            Kind::Local => Segment::Local,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Static => "static",
            Kind::Field => "field",
            Kind::Argument => "argument",
            Kind::Local => "local",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub ty: String,
    pub kind: Kind,
    pub index: usize,
}

/// Result of looking a name up in both tiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Variable {
        segment: Segment,
        index: usize,
        ty: String,
    },
    Unresolved,
}

#[derive(Clone, Debug, Default)]
struct Scope {
    symbols: HashMap<String, Symbol>,
    counts: [usize; 4],
}

impl Scope {
    fn declare(&mut self, name: &str, ty: &str, kind: Kind) -> usize {
        let index = self.counts[kind.slot()];
        self.counts[kind.slot()] += 1;
        self.symbols.insert(
            name.to_string(),
            Symbol {
                ty: ty.to_string(),
                kind,
                index,
            },
        );
        index
    }

    fn clear(&mut self) {
        self.symbols.clear();
        self.counts = [0; 4];
    }

    fn dump(&self) -> String {
        let mut entries: Vec<_> = self.symbols.iter().collect();
        entries.sort_by_key(|(_, s)| (s.kind.slot(), s.index));
        entries
            .iter()
            .map(|(name, s)| format!("  {name}: {} {} {}", s.ty, s.kind, s.index))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Two tier scope table: class level (static, field) and subroutine level
/// (argument, local). Also owns the label counters, which share the
/// subroutine tier's lifetime.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    class_name: String,
    subroutine_name: String,
    class_level: Scope,
    subroutine_level: Scope,
    if_labels: usize,
    while_labels: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_class_name(&mut self, name: &str) {
        self.class_name = name.to_string();
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn set_subroutine_name(&mut self, name: &str) {
        self.subroutine_name = name.to_string();
    }

    /// `ClassName.subroutineName` of the subroutine being compiled.
    pub fn qualified_subroutine_name(&self) -> String {
        format!("{}.{}", self.class_name, self.subroutine_name)
    }

    /// Re-registering a name overwrites the previous entry.
    pub fn register_class_level(&mut self, name: &str, ty: &str, kind: Kind) -> usize {
        self.class_level.declare(name, ty, kind)
    }

    pub fn register_subroutine_level(&mut self, name: &str, ty: &str, kind: Kind) -> usize {
        self.subroutine_level.declare(name, ty, kind)
    }

    /// Subroutine level first, then class level.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_level
            .symbols
            .get(name)
            .or_else(|| self.class_level.symbols.get(name))
    }

    pub fn resolve(&self, name: &str) -> Resolution {
        match self.lookup(name) {
            Some(symbol) => Resolution::Variable {
                segment: symbol.kind.segment(),
                index: symbol.index,
                ty: symbol.ty.clone(),
            },
            None => Resolution::Unresolved,
        }
    }

    pub fn var_count(&self, kind: Kind) -> usize {
        match kind {
            Kind::Static | Kind::Field => self.class_level.counts[kind.slot()],
            Kind::Argument | Kind::Local => self.subroutine_level.counts[kind.slot()],
        }
    }

    pub fn field_count(&self) -> usize {
        self.var_count(Kind::Field)
    }

    pub fn local_count(&self) -> usize {
        self.var_count(Kind::Local)
    }

    pub fn begin_subroutine(&mut self) {
        self.subroutine_level.clear();
        self.if_labels = 0;
        self.while_labels = 0;
    }

    pub fn end_subroutine(&mut self) {
        log::debug!(
            "subroutine-level table [{}]\n{}",
            self.qualified_subroutine_name(),
            self.subroutine_level.dump()
        );
        self.begin_subroutine();
    }

    pub fn end_class(&mut self) {
        log::debug!(
            "class-level table [{}]\n{}",
            self.class_name,
            self.class_level.dump()
        );
    }

    pub fn next_branch_label(&mut self) -> usize {
        let index = self.if_labels;
        self.if_labels += 1;
        index
    }

    pub fn next_loop_label(&mut self) -> usize {
        let index = self.while_labels;
        self.while_labels += 1;
        index
    }
}
