//! Core type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::span::Span;
use crate::{Error, Result};

/// Kind of an opening conditional directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    If,
    Ifdef,
    Ifndef,
}

impl DirectiveKind {
    /// Directive keyword without the leading `#`
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveKind::If => "if",
            DirectiveKind::Ifdef => "ifdef",
            DirectiveKind::Ifndef => "ifndef",
        }
    }
}

impl std::str::FromStr for DirectiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "if" => Ok(DirectiveKind::If),
            "ifdef" => Ok(DirectiveKind::Ifdef),
            "ifndef" => Ok(DirectiveKind::Ifndef),
            other => Err(Error::UnknownDirective(other.to_string())),
        }
    }
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open conditional block awaiting its `#else`/`#endif`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveFrame {
    /// Directive kind
    pub kind: DirectiveKind,
    /// Condition text as written (or synthesized for `#else` branches)
    pub param: String,
    /// Span of the opening line (the `#else` line for alternate branches)
    pub open: Span,
}

impl DirectiveFrame {
    /// Create a new frame
    pub fn new(kind: DirectiveKind, param: impl Into<String>, open: Span) -> Self {
        Self {
            kind,
            param: param.into(),
            open,
        }
    }

    /// Frame for the `#else` branch that follows this one
    ///
    /// `#if X` becomes `#if !( X )`; `#ifdef X` and `#ifndef X` swap.
    pub fn complement(&self, else_line: Span) -> Self {
        let (kind, param) = match self.kind {
            DirectiveKind::If => (DirectiveKind::If, format!("!( {} )", self.param)),
            DirectiveKind::Ifdef => (DirectiveKind::Ifndef, self.param.clone()),
            DirectiveKind::Ifndef => (DirectiveKind::Ifdef, self.param.clone()),
        };
        Self::new(kind, param, else_line)
    }

    /// Guard text describing this frame's condition
    pub fn guard(&self) -> GuardText {
        GuardText {
            kind: self.kind,
            param: self.param.clone(),
        }
    }
}

/// Synthesized condition wrapped around the entities of one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardText {
    pub kind: DirectiveKind,
    pub param: String,
}

impl GuardText {
    /// Opening directive line, e.g. `#ifdef FOO`
    pub fn opening(&self) -> String {
        format!("#{} {}", self.kind, self.param)
    }

    /// Matching `#endif` line with its trailing condition comment
    pub fn closing(&self) -> String {
        match self.kind {
            DirectiveKind::If => format!("#endif /* {} */", self.param),
            DirectiveKind::Ifdef => format!("#endif /* defined({}) */", self.param),
            DirectiveKind::Ifndef => format!("#endif /* !defined({}) */", self.param),
        }
    }
}

/// One rendered line of a guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardLine {
    /// Directive text
    pub text: String,
    /// Whether this closes the scope (`#endif`)
    pub closing: bool,
}

/// A line in an enum body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum EnumLine {
    /// Enumerator name
    Member(String),
    /// Conditional directive kept verbatim
    Directive(String),
}

/// `[typedef] enum [prefix] { body } [suffix];`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntity {
    /// Suffix name if present, otherwise the prefix name
    pub name: String,
    /// Parameter type of the generated function
    pub prototype: String,
    /// Enumerators and nested directive lines in source order
    pub body: Vec<EnumLine>,
    pub span: Span,
}

impl EnumEntity {
    /// Build an enum entity from its matched parts
    pub fn new(prefix: &str, body: &str, suffix: &str, span: Span) -> Result<Self> {
        if prefix.is_empty() && suffix.is_empty() {
            return Err(Error::MalformedEntity(format!(
                "enum at {} has neither a tag nor a typedef name",
                span
            )));
        }
        if body.trim().is_empty() {
            return Err(Error::MalformedEntity(format!(
                "enum at {} has an empty body",
                span
            )));
        }

        let (name, prototype) = if suffix.is_empty() {
            (prefix.to_string(), format!("enum {}", prefix))
        } else {
            (suffix.to_string(), suffix.to_string())
        };

        Ok(Self {
            name,
            prototype,
            body: parse_enum_body(body),
            span,
        })
    }

    /// Enumerator names, skipping directive lines
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(|line| match line {
            EnumLine::Member(name) => Some(name.as_str()),
            EnumLine::Directive(_) => None,
        })
    }
}

fn parse_enum_body(body: &str) -> Vec<EnumLine> {
    let mut lines = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            lines.push(EnumLine::Directive(line.to_string()));
            continue;
        }

        for field in line.split(',') {
            if let Some(member) = field.split_whitespace().next() {
                lines.push(EnumLine::Member(member.to_string()));
            }
        }
    }

    lines
}

/// `#define <prefix><NAME> 0x..`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDefinition {
    pub name: String,
    /// Hexadecimal value as written
    pub value: String,
    pub span: Span,
}

/// Macro definitions sharing a prefix, found in one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroGroupEntity {
    pub prefix: String,
    pub definitions: Vec<MacroDefinition>,
}

impl MacroGroupEntity {
    /// Returns `None` for an empty group
    pub fn new(prefix: impl Into<String>, definitions: Vec<MacroDefinition>) -> Option<Self> {
        if definitions.is_empty() {
            return None;
        }
        Some(Self {
            prefix: prefix.into(),
            definitions,
        })
    }

    /// Span of the first definition
    pub fn span(&self) -> Span {
        self.definitions[0].span
    }

    /// Lowercase name with the group prefix stripped
    pub fn label(&self, definition: &MacroDefinition) -> String {
        definition
            .name
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(&definition.name)
            .to_lowercase()
    }
}

/// An entity produced by an extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Enum(EnumEntity),
    MacroGroup(MacroGroupEntity),
}

impl Entity {
    /// Source span of the entity
    pub fn span(&self) -> Span {
        match self {
            Entity::Enum(e) => e.span,
            Entity::MacroGroup(g) => g.span(),
        }
    }

    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            Entity::Enum(e) => format!("enum {} ({} members)", e.name, e.members().count()),
            Entity::MacroGroup(g) => {
                format!("macro group {}* ({} definitions)", g.prefix, g.definitions.len())
            }
        }
    }
}

/// An element of the scanner output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum Item {
    Guard(GuardLine),
    Entity(Entity),
}

/// Order items by offset and drop repeated entities
///
/// The sort is stable, so items at the same offset keep their emission
/// order. Only the first entity seen at a given offset is retained; guard
/// lines are always kept.
pub fn order_items(mut items: Vec<(usize, Item)>) -> Vec<(usize, Item)> {
    items.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    items.retain(|(offset, item)| match item {
        Item::Guard(_) => true,
        Item::Entity(_) => seen.insert(*offset),
    });
    items
}
