//! The parsed structural model of one source template.
//!
//! A `TemplateModel` is built once per template and shared read-only by
//! every generation pass: an ordered sequence of construct spans over the
//! raw source, plus a scope table for nested declarations that re-declare
//! a slot name. Everything between construct spans is literal text.

use smallvec::SmallVec;

use crate::{Slot, Span};

/// One segment of a templated identifier: a slot marker or literal text.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum StemSegment {
    Marker(Slot),
    Text(String),
}

/// A templated identifier split into marker and text segments.
///
/// `KTypeVTypeFoo` parses to `[Marker(K), Marker(V), Text("Foo")]`;
/// markers may appear anywhere in the identifier.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StemPattern {
    segments: SmallVec<[StemSegment; 4]>,
}

impl StemPattern {
    /// Split an identifier into marker/text segments.
    ///
    /// Returns `None` when the identifier contains no slot marker at all.
    pub fn parse(ident: &str) -> Option<StemPattern> {
        let mut segments: SmallVec<[StemSegment; 4]> = SmallVec::new();
        let mut rest = ident;
        loop {
            let k = rest.find("KType");
            let v = rest.find("VType");
            let (pos, slot) = match (k, v) {
                (Some(k), Some(v)) if k <= v => (k, Slot::K),
                (Some(_), Some(v)) => (v, Slot::V),
                (Some(k), None) => (k, Slot::K),
                (None, Some(v)) => (v, Slot::V),
                (None, None) => break,
            };
            if pos > 0 {
                segments.push(StemSegment::Text(rest[..pos].to_string()));
            }
            segments.push(StemSegment::Marker(slot));
            rest = &rest[pos + 5..];
        }
        if segments.is_empty() {
            return None;
        }
        if !rest.is_empty() {
            segments.push(StemSegment::Text(rest.to_string()));
        }
        Some(StemPattern { segments })
    }

    /// A stem with no markers at all, for declarations whose name is
    /// plain but whose parameter list still declares a slot.
    pub fn literal(ident: &str) -> StemPattern {
        let mut segments: SmallVec<[StemSegment; 4]> = SmallVec::new();
        segments.push(StemSegment::Text(ident.to_string()));
        StemPattern { segments }
    }

    pub fn segments(&self) -> &[StemSegment] {
        &self.segments
    }

    /// Marker slots in lexical order, with repeats.
    pub fn markers(&self) -> impl Iterator<Item = Slot> + '_ {
        self.segments.iter().filter_map(|s| match s {
            StemSegment::Marker(slot) => Some(*slot),
            StemSegment::Text(_) => None,
        })
    }

    pub fn marker_count(&self) -> usize {
        self.markers().count()
    }

    pub fn mentions(&self, slot: Slot) -> bool {
        self.markers().any(|m| m == slot)
    }

    /// The set of slots this stem mentions.
    pub fn slot_set(&self) -> SlotSet {
        let mut set = SlotSet::default();
        for slot in self.markers() {
            set.insert(slot);
        }
        set
    }
}

/// A small set over the two slots.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct SlotSet {
    k: bool,
    v: bool,
}

impl SlotSet {
    pub fn insert(&mut self, slot: Slot) {
        match slot {
            Slot::K => self.k = true,
            Slot::V => self.v = true,
        }
    }

    pub fn contains(self, slot: Slot) -> bool {
        match slot {
            Slot::K => self.k,
            Slot::V => self.v,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.k && !self.v
    }

    pub fn union(self, other: SlotSet) -> SlotSet {
        SlotSet {
            k: self.k || other.k,
            v: self.v || other.v,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Slot> {
        [Slot::K, Slot::V]
            .into_iter()
            .filter(move |slot| self.contains(*slot))
    }
}

/// A type argument in a templated reference's `<...>` list.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum TypeArg {
    /// A bare slot token, e.g. the `KType` in `KTypeBar<KType>`.
    Slot(Slot),
    /// A bare `?` wildcard.
    Wildcard,
    /// `? extends T` / `? super T`.
    Bounded { upper: bool, inner: Box<TypeArg> },
    /// A templated type used as an argument.
    Stem {
        stem: StemPattern,
        args: Option<Vec<TypeArg>>,
    },
    /// Anything unrelated to the slots, preserved verbatim.
    Other(String),
}

impl TypeArg {
    pub fn slot_set(&self) -> SlotSet {
        match self {
            TypeArg::Slot(slot) => {
                let mut set = SlotSet::default();
                set.insert(*slot);
                set
            }
            TypeArg::Wildcard | TypeArg::Other(_) => SlotSet::default(),
            TypeArg::Bounded { inner, .. } => inner.slot_set(),
            TypeArg::Stem { stem, args } => {
                let mut set = stem.slot_set();
                if let Some(args) = args {
                    for arg in args {
                        set = set.union(arg.slot_set());
                    }
                }
                set
            }
        }
    }
}

/// The bound of a declared type parameter.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum TypeParamBound {
    /// Untemplated bound text, kept verbatim.
    Plain(String),
    /// A templated bound, e.g. `KTypeBar<? super KType>`.
    Templated {
        stem: StemPattern,
        args: Option<Vec<TypeArg>>,
    },
}

/// One declared type parameter in a class or method parameter list.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeParam {
    pub name: String,
    /// `Some` when the parameter name is itself a slot token.
    pub slot: Option<Slot>,
    pub bound: Option<TypeParamBound>,
}

impl TypeParam {
    pub fn slot_set(&self) -> SlotSet {
        let mut set = SlotSet::default();
        if let Some(slot) = self.slot {
            set.insert(slot);
        }
        if let Some(TypeParamBound::Templated { stem, args }) = &self.bound {
            set = set.union(stem.slot_set());
            if let Some(args) = args {
                for arg in args {
                    set = set.union(arg.slot_set());
                }
            }
        }
        set
    }
}

/// The type-argument shape of an object-creation expression.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum NewArgs {
    /// `new KTypeFoo(...)` — raw type, no argument list.
    None,
    /// `new KTypeFoo<>(...)`.
    Diamond,
    /// `new KTypeFoo<KType, B>(...)`.
    Explicit(Vec<TypeArg>),
}

/// The slot-type token an intrinsic call targets.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct IntrinsicTarget {
    pub slot: Slot,
    pub array: bool,
}

impl IntrinsicTarget {
    pub fn token(self) -> &'static str {
        if self.array {
            self.slot.array_token()
        } else {
            self.slot.token()
        }
    }
}

/// A recognized template-sensitive construct.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ConstructKind {
    /// A class/interface header: stem name plus its type parameter list.
    /// `decl_slots` are the slot parameters in declaration order; they
    /// drive the stem naming rule for the declared type.
    TypeDecl {
        stem: StemPattern,
        params: Vec<TypeParam>,
        decl_slots: SmallVec<[Slot; 2]>,
    },
    /// A templated type reference with an optional argument list:
    /// supertypes, imports, locals, parameter types.
    StemRef {
        stem: StemPattern,
        args: Option<Vec<TypeArg>>,
    },
    /// A bare slot token used as a type or expression.
    SlotRef { slot: Slot },
    /// Object creation over a templated type.
    NewExpr { stem: StemPattern, args: NewArgs },
    /// `KTypeVTypeFoo.this` — the qualifier of a qualified this.
    ThisRef { stem: StemPattern },
    /// A method/constructor-level type parameter list that declares a
    /// slot or carries a templated bound.
    MethodTyParams { params: Vec<TypeParam> },
    /// A `/** ... */` span whose slot words follow the doc-word rule.
    Javadoc,
    /// An `Intrinsics.<KType>name(args...)` call site. Argument spans
    /// are split at the top nesting level; their contents are resolved
    /// per generation before the handler runs.
    IntrinsicCall {
        target: IntrinsicTarget,
        name: String,
        args: Vec<Span>,
    },
}

impl ConstructKind {
    /// Every slot this construct mentions, in any role.
    pub fn slot_set(&self) -> SlotSet {
        match self {
            ConstructKind::TypeDecl { stem, params, .. } => {
                let mut set = stem.slot_set();
                for param in params {
                    set = set.union(param.slot_set());
                }
                set
            }
            ConstructKind::StemRef { stem, args } => {
                let mut set = stem.slot_set();
                if let Some(args) = args {
                    for arg in args {
                        set = set.union(arg.slot_set());
                    }
                }
                set
            }
            ConstructKind::SlotRef { slot } => {
                let mut set = SlotSet::default();
                set.insert(*slot);
                set
            }
            ConstructKind::NewExpr { stem, args } => {
                let mut set = stem.slot_set();
                if let NewArgs::Explicit(args) = args {
                    for arg in args {
                        set = set.union(arg.slot_set());
                    }
                }
                set
            }
            ConstructKind::ThisRef { stem } => stem.slot_set(),
            ConstructKind::MethodTyParams { params } => {
                let mut set = SlotSet::default();
                for param in params {
                    set = set.union(param.slot_set());
                }
                set
            }
            // Javadoc word mentions are resolved per word at substitution
            // time; the span itself constrains nothing.
            ConstructKind::Javadoc => SlotSet::default(),
            ConstructKind::IntrinsicCall { target, .. } => {
                let mut set = SlotSet::default();
                set.insert(target.slot);
                set
            }
        }
    }
}

/// A construct span within the template, tagged with its scope.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Construct {
    pub span: Span,
    pub scope: ScopeId,
    pub kind: ConstructKind,
}

pub type ScopeId = usize;

/// One declaration scope. Scope 0 is the file level.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Slots this scope re-declares as its own type parameters,
    /// shadowing the template's slots for the extent of the body.
    pub shadows: SlotSet,
}

/// The parse-once structural model of one template.
#[derive(Clone, Debug)]
pub struct TemplateModel {
    source: String,
    name: String,
    constructs: Vec<Construct>,
    scopes: Vec<Scope>,
    /// Index of the primary type declaration, when the template has one.
    primary: Option<usize>,
    /// Distinct intrinsic names mentioned, with a representative span.
    intrinsics: Vec<(String, Span)>,
}

impl TemplateModel {
    pub fn new(
        source: String,
        name: String,
        constructs: Vec<Construct>,
        scopes: Vec<Scope>,
        primary: Option<usize>,
        intrinsics: Vec<(String, Span)>,
    ) -> Self {
        debug_assert!(
            constructs.windows(2).all(|w| w[0].span.end <= w[1].span.start
                || w[1].span.end <= w[0].span.end),
            "constructs must be ordered and either disjoint or nested"
        );
        TemplateModel {
            source,
            name,
            constructs,
            scopes,
            primary,
            intrinsics,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Template identity used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructs(&self) -> &[Construct] {
        &self.constructs
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// The primary type declaration construct, if any.
    pub fn primary_decl(&self) -> Option<&Construct> {
        self.primary.map(|i| &self.constructs[i])
    }

    pub fn intrinsic_mentions(&self) -> &[(String, Span)] {
        &self.intrinsics
    }

    /// Source text under a span.
    pub fn slice(&self, span: Span) -> &str {
        &self.source[span.to_range()]
    }

    /// Whether `slot` is shadowed at `scope` (searching the scope chain).
    pub fn is_shadowed(&self, scope: ScopeId, slot: Slot) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id];
            if s.shadows.contains(slot) {
                return true;
            }
            current = s.parent;
        }
        false
    }
}
