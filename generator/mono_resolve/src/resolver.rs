//! The substitution resolver.
//!
//! Folds over a template model's construct spans: inter-construct
//! source is copied byte-for-byte, each construct is rewritten under
//! the active assignment, and intrinsic call sites dispatch to the
//! registry with their arguments resolved first. The model is never
//! mutated; for a fixed (model, assignment) the output is
//! byte-identical across runs.

use tracing::trace;

use mono_ir::{
    Assignment, ConfigurationError, Construct, ConstructKind, IntrinsicTarget, Kind, NewArgs,
    Slot, SlotSet, Span, StemPattern, StemSegment, TemplateModel, TypeArg, TypeParam,
    TypeParamBound,
};

use crate::error::{ResolutionError, ResolveError, TemplateError};
use crate::registry::{IntrinsicCtx, IntrinsicRegistry};

/// Resolve one (template, assignment) unit to output text.
pub fn resolve(
    model: &TemplateModel,
    assignment: &Assignment,
    registry: &IntrinsicRegistry,
) -> Result<String, ResolveError> {
    let resolver = Resolver {
        model,
        assignment,
        registry,
        source: model.source(),
    };
    let mut out = String::with_capacity(model.source().len() + model.source().len() / 4);
    let mut idx = 0;
    let end = u32::try_from(model.source().len()).unwrap_or(u32::MAX);
    resolver.emit_range(&mut out, &mut idx, 0, end)?;
    trace!(template = model.name(), bytes = out.len(), "resolved unit");
    Ok(out)
}

/// Derive the output identifier for one assignment: the stem naming
/// rule applied to the template's primary declaration. `None` when the
/// template has no templated primary declaration.
pub fn derive_identifier(
    model: &TemplateModel,
    assignment: &Assignment,
) -> Result<Option<String>, ResolveError> {
    let Some(construct) = model.primary_decl() else {
        return Ok(None);
    };
    let ConstructKind::TypeDecl {
        stem, decl_slots, ..
    } = &construct.kind
    else {
        return Ok(None);
    };
    let fills = decl_order_fills(assignment, stem, decl_slots, construct.span)?;
    Ok(Some(stem_display(stem, &fills)))
}

/// Fill stem markers from the declaration's slot parameters in
/// declaration order; markers beyond the declared slots fall back to
/// their own token's binding.
fn decl_order_fills(
    assignment: &Assignment,
    stem: &StemPattern,
    decl_slots: &[Slot],
    span: Span,
) -> Result<Vec<Kind>, ResolveError> {
    let mut fills = Vec::with_capacity(stem.marker_count());
    let mut next = 0;
    for marker in stem.markers() {
        let slot = if next < decl_slots.len() {
            let slot = decl_slots[next];
            next += 1;
            slot
        } else {
            marker
        };
        fills.push(kind_of(assignment, slot, span)?);
    }
    Ok(fills)
}

fn kind_of(assignment: &Assignment, slot: Slot, span: Span) -> Result<Kind, ResolveError> {
    assignment
        .kind(slot)
        .ok_or_else(|| ResolutionError::UndeclaredSlot { slot, span }.into())
}

/// Render a stem with its marker fills.
fn stem_display(stem: &StemPattern, fills: &[Kind]) -> String {
    let mut out = String::new();
    let mut next = 0;
    for segment in stem.segments() {
        match segment {
            StemSegment::Text(text) => out.push_str(text),
            StemSegment::Marker(_) => {
                let kind = fills.get(next).copied().unwrap_or(Kind::Generic);
                next += 1;
                out.push_str(kind.display());
            }
        }
    }
    out
}

struct Resolver<'a> {
    model: &'a TemplateModel,
    assignment: &'a Assignment,
    registry: &'a IntrinsicRegistry,
    source: &'a str,
}

impl Resolver<'_> {
    /// Emit `[start, end)`: verbatim gaps interleaved with rewritten
    /// constructs. `idx` advances past every construct in the range.
    fn emit_range(
        &self,
        out: &mut String,
        idx: &mut usize,
        start: u32,
        end: u32,
    ) -> Result<(), ResolveError> {
        let constructs = self.model.constructs();
        let mut pos = start;
        while *idx < constructs.len() {
            let construct = &constructs[*idx];
            if construct.span.start >= end {
                break;
            }
            if construct.span.start > pos {
                out.push_str(&self.source[pos as usize..construct.span.start as usize]);
                pos = construct.span.start;
            }
            *idx += 1;
            self.emit_construct(construct, out, idx)?;
            pos = pos.max(construct.span.end);
        }
        if pos < end {
            out.push_str(&self.source[pos as usize..end as usize]);
        }
        Ok(())
    }

    /// Skip constructs nested within `span` (used when the span was
    /// emitted wholesale).
    fn skip_nested(&self, idx: &mut usize, span: Span) {
        let constructs = self.model.constructs();
        while *idx < constructs.len() && constructs[*idx].span.start < span.end {
            *idx += 1;
        }
    }

    fn emit_construct(
        &self,
        construct: &Construct,
        out: &mut String,
        idx: &mut usize,
    ) -> Result<(), ResolveError> {
        // Shadowing: a construct whose mentioned slots are all
        // re-declared by an enclosing nested declaration is copied
        // verbatim; a partial shadow cannot be disambiguated.
        let mentioned = construct.kind.slot_set();
        if !mentioned.is_empty() {
            let total = mentioned.iter().count();
            let shadowed = mentioned
                .iter()
                .filter(|slot| self.model.is_shadowed(construct.scope, *slot))
                .count();
            if shadowed == total {
                out.push_str(self.model.slice(construct.span));
                self.skip_nested(idx, construct.span);
                return Ok(());
            }
            if shadowed > 0 {
                return Err(ResolutionError::ShadowConflict {
                    span: construct.span,
                }
                .into());
            }
        }

        if let ConstructKind::IntrinsicCall { target, name, args } = &construct.kind {
            return self.emit_intrinsic(construct, *target, name, args, out, idx);
        }

        for slot in mentioned.iter() {
            if !self.assignment.has(slot) {
                return Err(ResolutionError::UndeclaredSlot {
                    slot,
                    span: construct.span,
                }
                .into());
            }
        }

        match &construct.kind {
            ConstructKind::TypeDecl {
                stem,
                params,
                decl_slots,
            } => {
                let fills =
                    decl_order_fills(self.assignment, stem, decl_slots, construct.span)?;
                out.push_str(&stem_display(stem, &fills));
                let kept = self.render_params(params, construct.span)?;
                if !kept.is_empty() {
                    out.push('<');
                    out.push_str(&kept.join(", "));
                    out.push('>');
                }
            }
            ConstructKind::StemRef { stem, args } => {
                out.push_str(&self.render_stem_ref(stem, args.as_deref(), construct.span)?);
            }
            ConstructKind::SlotRef { slot } => {
                let kind = kind_of(self.assignment, *slot, construct.span)?;
                if kind.is_generic() {
                    out.push_str(slot.token());
                } else {
                    out.push_str(kind.native());
                }
            }
            ConstructKind::NewExpr { stem, args } => {
                self.emit_new(stem, args, construct.span, out)?;
            }
            ConstructKind::ThisRef { stem } => {
                let fills = self.token_fills(stem, construct.span)?;
                out.push_str(&stem_display(stem, &fills));
            }
            ConstructKind::MethodTyParams { params } => {
                let kept = self.render_params(params, construct.span)?;
                if !kept.is_empty() {
                    out.push('<');
                    out.push_str(&kept.join(", "));
                    out.push('>');
                }
            }
            ConstructKind::Javadoc => {
                self.emit_javadoc(construct, out)?;
            }
            ConstructKind::IntrinsicCall { .. } => {}
        }
        Ok(())
    }

    /// Marker fills from each marker's own token binding.
    fn token_fills(&self, stem: &StemPattern, span: Span) -> Result<Vec<Kind>, ResolveError> {
        stem.markers()
            .map(|slot| kind_of(self.assignment, slot, span))
            .collect()
    }

    /// Rewrite a type parameter list: slot parameters bound to concrete
    /// kinds are dropped, generic slots keep their formal token,
    /// unrelated parameters stay (with their bounds rewritten).
    fn render_params(
        &self,
        params: &[TypeParam],
        span: Span,
    ) -> Result<Vec<String>, ResolveError> {
        let mut kept = Vec::new();
        for param in params {
            if let Some(slot) = param.slot {
                if !kind_of(self.assignment, slot, span)?.is_generic() {
                    continue;
                }
            }
            let mut rendered = param.name.clone();
            if let Some(bound) = &param.bound {
                rendered.push_str(" extends ");
                rendered.push_str(&self.render_bound(bound, span)?);
            }
            kept.push(rendered);
        }
        Ok(kept)
    }

    fn render_bound(
        &self,
        bound: &TypeParamBound,
        span: Span,
    ) -> Result<String, ResolveError> {
        match bound {
            TypeParamBound::Plain(text) => self.substitute_code_words(text, span),
            TypeParamBound::Templated { stem, args } => {
                self.render_stem_ref(stem, args.as_deref(), span)
            }
        }
    }

    /// The stem-with-arguments rule shared by references, supertypes,
    /// bounds, and explicit instantiations.
    ///
    /// Each marker fills positionally from its argument: a slot or
    /// wildcard argument follows that slot's binding, while an unrelated
    /// argument forces the erased `Object` form and survives verbatim.
    /// The reduced argument list keeps only what is still parameterized.
    fn render_stem_ref(
        &self,
        stem: &StemPattern,
        args: Option<&[TypeArg]>,
        span: Span,
    ) -> Result<String, ResolveError> {
        let markers: Vec<Slot> = stem.markers().collect();
        let mut fills = Vec::with_capacity(markers.len());
        for (i, marker) in markers.iter().enumerate() {
            let kind = match args.and_then(|a| a.get(i)) {
                Some(TypeArg::Slot(slot)) => kind_of(self.assignment, *slot, span)?,
                Some(TypeArg::Wildcard | TypeArg::Bounded { .. }) | None => {
                    kind_of(self.assignment, *marker, span)?
                }
                Some(TypeArg::Stem { .. } | TypeArg::Other(_)) => Kind::Generic,
            };
            fills.push(kind);
        }
        let mut rendered = stem_display(stem, &fills);
        if let Some(args) = args {
            let kept = self.reduce_args(args, &fills, span)?;
            if !kept.is_empty() {
                rendered.push('<');
                rendered.push_str(&kept.join(", "));
                rendered.push('>');
            }
        }
        Ok(rendered)
    }

    fn reduce_args(
        &self,
        args: &[TypeArg],
        fills: &[Kind],
        span: Span,
    ) -> Result<Vec<String>, ResolveError> {
        let mut kept = Vec::new();
        for (i, arg) in args.iter().enumerate() {
            match arg {
                TypeArg::Slot(slot) => {
                    if kind_of(self.assignment, *slot, span)?.is_generic() {
                        kept.push(slot.token().to_string());
                    }
                }
                TypeArg::Wildcard => {
                    if fills.get(i).is_none_or(|kind| kind.is_generic()) {
                        kept.push("?".to_string());
                    }
                }
                TypeArg::Bounded { upper, inner } => {
                    let mut keep = true;
                    for slot in arg.slot_set().iter() {
                        keep &= kind_of(self.assignment, slot, span)?.is_generic();
                    }
                    if keep {
                        let qualifier = if *upper { "extends" } else { "super" };
                        kept.push(format!(
                            "? {qualifier} {}",
                            self.render_type_arg(inner, span)?
                        ));
                    }
                }
                TypeArg::Stem { stem, args } => {
                    kept.push(self.render_stem_ref(stem, args.as_deref(), span)?);
                }
                TypeArg::Other(text) => {
                    kept.push(self.substitute_code_words(text, span)?);
                }
            }
        }
        Ok(kept)
    }

    fn render_type_arg(&self, arg: &TypeArg, span: Span) -> Result<String, ResolveError> {
        match arg {
            TypeArg::Slot(slot) => {
                let kind = kind_of(self.assignment, *slot, span)?;
                Ok(if kind.is_generic() {
                    slot.token().to_string()
                } else {
                    kind.native().to_string()
                })
            }
            TypeArg::Wildcard => Ok("?".to_string()),
            TypeArg::Bounded { upper, inner } => {
                let qualifier = if *upper { "extends" } else { "super" };
                Ok(format!(
                    "? {qualifier} {}",
                    self.render_type_arg(inner, span)?
                ))
            }
            TypeArg::Stem { stem, args } => self.render_stem_ref(stem, args.as_deref(), span),
            TypeArg::Other(text) => self.substitute_code_words(text, span),
        }
    }

    fn emit_new(
        &self,
        stem: &StemPattern,
        args: &NewArgs,
        span: Span,
        out: &mut String,
    ) -> Result<(), ResolveError> {
        match args {
            NewArgs::None => {
                let fills = self.token_fills(stem, span)?;
                out.push_str(&stem_display(stem, &fills));
            }
            NewArgs::Diamond => {
                let fills = self.token_fills(stem, span)?;
                out.push_str(&stem_display(stem, &fills));
                // A fully concrete instantiation drops the diamond
                // entirely; an empty `<>` never appears in output.
                if fills.iter().any(|kind| kind.is_generic()) {
                    out.push_str("<>");
                }
            }
            NewArgs::Explicit(list) => {
                out.push_str(&self.render_stem_ref(stem, Some(list), span)?);
            }
        }
        Ok(())
    }

    /// Word-level substitution for raw text fragments (plain bounds,
    /// unrelated type arguments): bare slot tokens follow the slot
    /// reference rule, compound stems the stem rule, everything else is
    /// untouched.
    fn substitute_code_words(&self, text: &str, span: Span) -> Result<String, ResolveError> {
        let mut out = String::with_capacity(text.len());
        for piece in split_words(text) {
            match piece {
                WordPiece::Other(other) => out.push_str(other),
                WordPiece::Word(word) => {
                    if let Some(slot) = Slot::from_token(word) {
                        let kind = kind_of(self.assignment, slot, span)?;
                        if kind.is_generic() {
                            out.push_str(word);
                        } else {
                            out.push_str(kind.native());
                        }
                    } else if let Some(stem) = StemPattern::parse(word) {
                        let fills = self.token_fills(&stem, span)?;
                        out.push_str(&stem_display(&stem, &fills));
                    } else {
                        out.push_str(word);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Doc-comment substitution: bare slot words use the lower-case
    /// pluralization-preserving doc form, compound words the stem rule.
    fn emit_javadoc(&self, construct: &Construct, out: &mut String) -> Result<(), ResolveError> {
        let text = self.model.slice(construct.span);
        for piece in split_words(text) {
            match piece {
                WordPiece::Other(other) => out.push_str(other),
                WordPiece::Word(word) => {
                    match self.javadoc_word(word, construct)? {
                        Some(replacement) => out.push_str(&replacement),
                        None => out.push_str(word),
                    }
                }
            }
        }
        Ok(())
    }

    fn javadoc_word(
        &self,
        word: &str,
        construct: &Construct,
    ) -> Result<Option<String>, ResolveError> {
        let Some(stem) = StemPattern::parse(word) else {
            return Ok(None);
        };
        let mentioned: SlotSet = stem.slot_set();
        let total = mentioned.iter().count();
        let shadowed = mentioned
            .iter()
            .filter(|slot| self.model.is_shadowed(construct.scope, *slot))
            .count();
        if shadowed == total {
            return Ok(None);
        }
        if shadowed > 0 {
            return Err(ResolutionError::ShadowConflict {
                span: construct.span,
            }
            .into());
        }

        if let Some(slot) = Slot::from_token(word) {
            let kind = kind_of(self.assignment, slot, construct.span)?;
            return Ok(if kind.is_generic() {
                None
            } else {
                Some(kind.native().to_string())
            });
        }
        if word == "KTypes" || word == "VTypes" {
            let slot = if word.starts_with('K') { Slot::K } else { Slot::V };
            let kind = kind_of(self.assignment, slot, construct.span)?;
            return Ok(Some(format!("{}s", kind.doc_word())));
        }
        let fills = self.token_fills(&stem, construct.span)?;
        Ok(Some(stem_display(&stem, &fills)))
    }

    fn emit_intrinsic(
        &self,
        construct: &Construct,
        target: IntrinsicTarget,
        name: &str,
        arg_spans: &[Span],
        out: &mut String,
        idx: &mut usize,
    ) -> Result<(), ResolveError> {
        if !self.assignment.has(target.slot) {
            return Err(TemplateError::TargetUnavailable {
                target: target.token(),
                span: construct.span,
            }
            .into());
        }

        // Arguments resolve first, consuming their nested constructs.
        let mut resolved = Vec::with_capacity(arg_spans.len());
        for span in arg_spans {
            let mut buf = String::new();
            self.emit_range(&mut buf, idx, span.start, span.end)?;
            resolved.push(buf);
        }
        self.skip_nested(idx, construct.span);

        let Some(handler) = self.registry.get(name) else {
            return Err(ConfigurationError::UnknownIntrinsic {
                name: name.to_string(),
                span: construct.span,
            }
            .into());
        };
        let ctx = IntrinsicCtx {
            assignment: self.assignment,
            target,
            name,
            call_span: construct.span,
            call_text: self.model.slice(construct.span),
            args: &resolved,
        };
        handler.expand(&ctx, out)?;
        Ok(())
    }
}

/// Split text into identifier-shaped words and everything between them.
enum WordPiece<'a> {
    Word(&'a str),
    Other(&'a str),
}

fn split_words(text: &str) -> impl Iterator<Item = WordPiece<'_>> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        if pos >= bytes.len() {
            return None;
        }
        let start = pos;
        let is_word_byte =
            |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';
        if is_word_byte(bytes[pos]) {
            while pos < bytes.len() && is_word_byte(bytes[pos]) {
                pos += 1;
            }
            Some(WordPiece::Word(&text[start..pos]))
        } else {
            while pos < bytes.len() && !is_word_byte(bytes[pos]) {
                pos += 1;
            }
            Some(WordPiece::Other(&text[start..pos]))
        }
    })
}
