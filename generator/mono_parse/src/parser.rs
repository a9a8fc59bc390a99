//! The signature parser: raw template text to `TemplateModel`.
//!
//! One linear walk over the token stream. Constructs are recognized
//! speculatively — save the cursor, try the shape, roll back when it
//! does not hold — so anything ambiguous falls through as literal text.
//! The walk is assignment-independent: the model it builds is reused by
//! every generation pass of the template.

use smallvec::SmallVec;
use tracing::{debug, trace};

use mono_ir::{
    Construct, ConstructKind, IntrinsicTarget, NewArgs, Scope, ScopeId, Slot, SlotSet, Span,
    StemPattern, TemplateModel, TokenKind, TypeArg, TypeParam, TypeParamBound,
};

use crate::cursor::Cursor;
use crate::error::ParseError;

/// Parse template source into a reusable `TemplateModel`.
pub fn parse_template(source: &str, name: impl Into<String>) -> Result<TemplateModel, ParseError> {
    let name = name.into();
    let tokens = mono_lexer::lex(source);
    let parser = Parser {
        cur: Cursor::new(&tokens, source),
        constructs: Vec::new(),
        scopes: Vec::new(),
        scope_stack: Vec::new(),
        brace_stack: Vec::new(),
        pending_scope: None,
        decl_depth: 0,
        primary: None,
        intrinsics: Vec::new(),
    };
    parser.run(name)
}

struct BraceEntry {
    span: Span,
    opened_scope: bool,
}

struct Parser<'a> {
    cur: Cursor<'a>,
    constructs: Vec<Construct>,
    scopes: Vec<Scope>,
    scope_stack: Vec<ScopeId>,
    brace_stack: Vec<BraceEntry>,
    /// Set after a declaration header; the next `{` opens this scope.
    pending_scope: Option<SlotSet>,
    /// How many type-declaration bodies enclose the cursor.
    decl_depth: usize,
    primary: Option<usize>,
    intrinsics: Vec<(String, Span)>,
}

impl<'a> Parser<'a> {
    fn run(mut self, name: String) -> Result<TemplateModel, ParseError> {
        self.scopes.push(Scope {
            parent: None,
            shadows: SlotSet::default(),
        });
        self.scope_stack.push(0);

        while !self.cur.is_at_end() {
            self.step()?;
        }
        if let Some(entry) = self.brace_stack.first() {
            return Err(ParseError::UnbalancedBrace { span: entry.span });
        }

        debug!(
            template = %name,
            constructs = self.constructs.len(),
            scopes = self.scopes.len(),
            "parsed template"
        );
        Ok(TemplateModel::new(
            self.cur.source().to_string(),
            name,
            self.constructs,
            self.scopes,
            self.primary,
            self.intrinsics,
        ))
    }

    fn step(&mut self) -> Result<(), ParseError> {
        match self.cur.current_kind() {
            TokenKind::UnterminatedComment => Err(ParseError::UnterminatedComment {
                span: self.cur.current_span(),
            }),
            TokenKind::UnterminatedLiteral => Err(ParseError::UnterminatedLiteral {
                span: self.cur.current_span(),
            }),
            TokenKind::Javadoc => {
                let span = self.cur.advance().span;
                self.push_construct(span, ConstructKind::Javadoc);
                Ok(())
            }
            TokenKind::Class | TokenKind::Interface => self.type_decl(),
            TokenKind::New => self.new_expr(),
            TokenKind::Ident => self.ident(),
            TokenKind::Lt => {
                self.maybe_method_ty_params();
                Ok(())
            }
            TokenKind::LBrace => {
                self.open_brace();
                Ok(())
            }
            TokenKind::RBrace => self.close_brace(),
            _ => {
                self.cur.advance();
                Ok(())
            }
        }
    }

    fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().unwrap_or(&0)
    }

    fn push_construct(&mut self, span: Span, kind: ConstructKind) {
        self.constructs.push(Construct {
            span,
            scope: self.current_scope(),
            kind,
        });
    }

    fn open_brace(&mut self) {
        let span = self.cur.advance().span;
        let opened_scope = if let Some(shadows) = self.pending_scope.take() {
            let parent = self.current_scope();
            self.scopes.push(Scope {
                parent: Some(parent),
                shadows,
            });
            self.scope_stack.push(self.scopes.len() - 1);
            self.decl_depth += 1;
            true
        } else {
            false
        };
        self.brace_stack.push(BraceEntry { span, opened_scope });
    }

    fn close_brace(&mut self) -> Result<(), ParseError> {
        let span = self.cur.current_span();
        let Some(entry) = self.brace_stack.pop() else {
            return Err(ParseError::StrayCloseBrace { span });
        };
        if entry.opened_scope {
            self.scope_stack.pop();
            self.decl_depth -= 1;
        }
        self.cur.advance();
        Ok(())
    }

    /// `class`/`interface` header: name plus type parameter list. The
    /// extends/implements clauses need no special handling — the main
    /// walk picks their templated references up as stem references.
    fn type_decl(&mut self) -> Result<(), ParseError> {
        self.cur.advance();
        if !self.cur.check(TokenKind::Ident) {
            return Ok(());
        }
        let name_tok = self.cur.advance();
        let name_text = self.cur.text(name_tok.span);
        let stem = StemPattern::parse(name_text)
            .unwrap_or_else(|| StemPattern::literal(name_text));

        let mut end = name_tok.span.end;
        let mut params = Vec::new();
        if self.cur.check(TokenKind::Lt) {
            let (list, gt_end) = self.type_param_list()?;
            params = list;
            end = gt_end;
        }
        let decl_slots: SmallVec<[Slot; 2]> = params.iter().filter_map(|p| p.slot).collect();

        // Every declaration body opens a scope; only a nested declaration
        // that re-declares a slot shadows it.
        let mut shadows = SlotSet::default();
        if self.decl_depth > 0 {
            for slot in &decl_slots {
                shadows.insert(*slot);
            }
        }
        self.pending_scope = Some(shadows);

        let templated = stem.marker_count() > 0
            || params.iter().any(|p| {
                p.slot.is_some() || matches!(p.bound, Some(TypeParamBound::Templated { .. }))
            });
        if templated {
            if self.decl_depth == 0 && self.primary.is_none() && stem.marker_count() > 0 {
                self.primary = Some(self.constructs.len());
            }
            trace!(name = name_text, slots = decl_slots.len(), "type declaration");
            self.push_construct(
                Span::new(name_tok.span.start, end),
                ConstructKind::TypeDecl {
                    stem,
                    params,
                    decl_slots,
                },
            );
        }
        Ok(())
    }

    /// A declared `<...>` list in declaration position; malformed input
    /// here is a hard error (the caller is certain it is a list).
    fn type_param_list(&mut self) -> Result<(Vec<TypeParam>, u32), ParseError> {
        let lt = self.cur.advance();
        let mut params = Vec::new();
        loop {
            if !self.cur.check(TokenKind::Ident) {
                return Err(ParseError::UnterminatedTypeList { span: lt.span });
            }
            let name_tok = self.cur.advance();
            let name = self.cur.text(name_tok.span).to_string();
            let slot = Slot::from_token(&name);
            let mut bound = None;
            if self.cur.eat(TokenKind::Extends).is_some() {
                bound = Some(self.type_param_bound(lt.span)?);
            }
            params.push(TypeParam { name, slot, bound });

            if self.cur.eat(TokenKind::Comma).is_some() {
                continue;
            }
            if let Some(gt) = self.cur.eat(TokenKind::Gt) {
                return Ok((params, gt.span.end));
            }
            return Err(ParseError::UnterminatedTypeList { span: lt.span });
        }
    }

    /// The bound after `extends` in a type parameter declaration. A
    /// single templated type is modeled structurally; anything else is
    /// captured raw until the parameter list resumes.
    fn type_param_bound(&mut self, list_span: Span) -> Result<TypeParamBound, ParseError> {
        if self.cur.check(TokenKind::Ident) {
            if let Some(stem) = StemPattern::parse(self.cur.current_text()) {
                self.cur.advance();
                let args = if self.cur.check(TokenKind::Lt) {
                    Some(self.type_args()?.0)
                } else {
                    None
                };
                return Ok(TypeParamBound::Templated { stem, args });
            }
        }

        let start = self.cur.current_span().start;
        let mut end = start;
        let mut depth = 0i32;
        loop {
            match self.cur.current_kind() {
                TokenKind::Eof => {
                    return Err(ParseError::UnterminatedTypeList { span: list_span });
                }
                TokenKind::Lt | TokenKind::LBracket => depth += 1,
                TokenKind::Gt if depth == 0 => break,
                TokenKind::Comma if depth == 0 => break,
                TokenKind::Gt | TokenKind::RBracket => depth -= 1,
                _ => {}
            }
            end = self.cur.advance().span.end;
        }
        let text = self.cur.source()[start as usize..end as usize].to_string();
        Ok(TypeParamBound::Plain(text))
    }

    /// A `<...>` type argument list. Callers in ambiguous positions
    /// snapshot and roll back on error; only declaration positions
    /// propagate the error.
    fn type_args(&mut self) -> Result<(Vec<TypeArg>, u32), ParseError> {
        let lt = self.cur.advance();
        let mut args = Vec::new();
        if let Some(gt) = self.cur.eat(TokenKind::Gt) {
            return Ok((args, gt.span.end));
        }
        loop {
            args.push(self.type_arg()?);
            if self.cur.eat(TokenKind::Comma).is_some() {
                continue;
            }
            if let Some(gt) = self.cur.eat(TokenKind::Gt) {
                return Ok((args, gt.span.end));
            }
            return Err(ParseError::UnterminatedTypeList { span: lt.span });
        }
    }

    fn type_arg(&mut self) -> Result<TypeArg, ParseError> {
        match self.cur.current_kind() {
            TokenKind::Question => {
                self.cur.advance();
                match self.cur.current_kind() {
                    TokenKind::Extends => {
                        self.cur.advance();
                        Ok(TypeArg::Bounded {
                            upper: true,
                            inner: Box::new(self.type_arg()?),
                        })
                    }
                    TokenKind::Super => {
                        self.cur.advance();
                        Ok(TypeArg::Bounded {
                            upper: false,
                            inner: Box::new(self.type_arg()?),
                        })
                    }
                    _ => Ok(TypeArg::Wildcard),
                }
            }
            TokenKind::Ident => {
                let text = self.cur.current_text();
                if let Some(slot) = Slot::from_token(text) {
                    if matches!(self.cur.peek_kind(1), TokenKind::Comma | TokenKind::Gt) {
                        self.cur.advance();
                        return Ok(TypeArg::Slot(slot));
                    }
                    return self.raw_type_arg();
                }
                if matches!(
                    self.cur.peek_kind(1),
                    TokenKind::Comma | TokenKind::Gt | TokenKind::Lt
                ) {
                    if let Some(stem) = StemPattern::parse(text) {
                        self.cur.advance();
                        let args = if self.cur.check(TokenKind::Lt) {
                            Some(self.type_args()?.0)
                        } else {
                            None
                        };
                        return Ok(TypeArg::Stem { stem, args });
                    }
                }
                self.raw_type_arg()
            }
            _ => self.raw_type_arg(),
        }
    }

    /// Fallback capture of one type argument as raw text, stopping at a
    /// depth-zero `,` or `>`. Errs on anything a type argument cannot
    /// contain, so speculative callers roll back to literal text.
    fn raw_type_arg(&mut self) -> Result<TypeArg, ParseError> {
        let start_span = self.cur.current_span();
        let start = start_span.start;
        let mut end = start;
        let mut depth = 0i32;
        let mut any = false;
        loop {
            match self.cur.current_kind() {
                TokenKind::Eof
                | TokenKind::Semi
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::Str
                | TokenKind::Number
                | TokenKind::Op => {
                    return Err(ParseError::UnterminatedTypeList { span: start_span });
                }
                TokenKind::RBracket if depth == 0 => {
                    return Err(ParseError::UnterminatedTypeList { span: start_span });
                }
                TokenKind::Lt | TokenKind::LBracket => depth += 1,
                TokenKind::Gt if depth == 0 => break,
                TokenKind::Comma if depth == 0 => break,
                TokenKind::Gt | TokenKind::RBracket => depth -= 1,
                _ => {}
            }
            end = self.cur.advance().span.end;
            any = true;
        }
        if !any {
            return Err(ParseError::UnterminatedTypeList { span: start_span });
        }
        let text = self.cur.source()[start as usize..end as usize].to_string();
        Ok(TypeArg::Other(text))
    }

    /// A bare `<` in member position: speculatively a method-level type
    /// parameter list. Only lists that declare a slot or carry a
    /// templated bound become constructs; everything else rolls back.
    fn maybe_method_ty_params(&mut self) {
        let snapshot = self.cur.position();
        let lt_span = self.cur.current_span();
        match self.type_param_list() {
            Ok((params, end)) => {
                let templated = params.iter().any(|p| {
                    p.slot.is_some() || matches!(p.bound, Some(TypeParamBound::Templated { .. }))
                });
                if templated && self.cur.check(TokenKind::Ident) {
                    self.push_construct(
                        Span::new(lt_span.start, end),
                        ConstructKind::MethodTyParams { params },
                    );
                    return;
                }
            }
            Err(_) => {}
        }
        self.cur.set_position(snapshot);
        self.cur.advance();
    }

    fn ident(&mut self) -> Result<(), ParseError> {
        let text = self.cur.current_text();
        if text == "Intrinsics" && self.cur.peek_kind(1) == TokenKind::Dot {
            let call_shape = self.cur.peek_kind(2) == TokenKind::Lt
                || (self.cur.peek_kind(2) == TokenKind::Ident
                    && self.cur.peek_kind(3) == TokenKind::LParen);
            if call_shape {
                return self.intrinsic_call();
            }
        }

        let tok_span = self.cur.current_span();
        if let Some(slot) = Slot::from_token(text) {
            self.push_construct(tok_span, ConstructKind::SlotRef { slot });
            self.cur.advance();
            return Ok(());
        }
        let Some(stem) = StemPattern::parse(text) else {
            self.cur.advance();
            return Ok(());
        };
        self.cur.advance();

        if self.cur.check(TokenKind::Dot) && self.cur.peek_kind(1) == TokenKind::This {
            self.push_construct(tok_span, ConstructKind::ThisRef { stem });
            return Ok(());
        }

        if self.cur.check(TokenKind::Lt) {
            let snapshot = self.cur.position();
            match self.type_args() {
                Ok((args, end)) if !args.is_empty() => {
                    self.push_construct(
                        Span::new(tok_span.start, end),
                        ConstructKind::StemRef {
                            stem,
                            args: Some(args),
                        },
                    );
                    return Ok(());
                }
                _ => self.cur.set_position(snapshot),
            }
        }
        self.push_construct(tok_span, ConstructKind::StemRef { stem, args: None });
        Ok(())
    }

    fn new_expr(&mut self) -> Result<(), ParseError> {
        self.cur.advance();
        if !self.cur.check(TokenKind::Ident) {
            return Ok(());
        }
        let text = self.cur.current_text();
        if Slot::from_token(text).is_some() {
            // `new KType[n]`: the element type is an ordinary slot
            // reference, handled on the next step.
            return Ok(());
        }
        let Some(stem) = StemPattern::parse(text) else {
            return Ok(());
        };
        let name_tok = self.cur.advance();
        let mut span = name_tok.span;
        let mut args = NewArgs::None;
        if self.cur.check(TokenKind::Lt) {
            if self.cur.peek_kind(1) == TokenKind::Gt {
                self.cur.advance();
                let gt = self.cur.advance();
                span = Span::new(span.start, gt.span.end);
                args = NewArgs::Diamond;
            } else {
                let snapshot = self.cur.position();
                match self.type_args() {
                    Ok((list, end)) if !list.is_empty() => {
                        span = Span::new(span.start, end);
                        args = NewArgs::Explicit(list);
                    }
                    _ => self.cur.set_position(snapshot),
                }
            }
        }
        self.push_construct(span, ConstructKind::NewExpr { stem, args });
        Ok(())
    }

    /// An `Intrinsics.<KType>name(args...)` call site. The call span and
    /// argument spans go into the model; the cursor then re-enters the
    /// argument region so slot references and nested calls inside the
    /// arguments land in the model as ordinary constructs.
    fn intrinsic_call(&mut self) -> Result<(), ParseError> {
        let start_span = self.cur.current_span();
        self.cur.advance(); // Intrinsics
        self.cur.advance(); // .

        let mut target = IntrinsicTarget {
            slot: Slot::K,
            array: false,
        };
        if self.cur.eat(TokenKind::Lt).is_some() {
            let slot = if self.cur.check(TokenKind::Ident) {
                Slot::from_token(self.cur.current_text())
            } else {
                None
            };
            let Some(slot) = slot else {
                return Err(ParseError::MalformedIntrinsic {
                    span: start_span,
                    reason: "type witness must be KType or VType",
                });
            };
            self.cur.advance();
            let array = if self.cur.check(TokenKind::LBracket)
                && self.cur.peek_kind(1) == TokenKind::RBracket
            {
                self.cur.advance();
                self.cur.advance();
                true
            } else {
                false
            };
            if self.cur.eat(TokenKind::Gt).is_none() {
                return Err(ParseError::MalformedIntrinsic {
                    span: start_span,
                    reason: "unclosed type witness",
                });
            }
            target = IntrinsicTarget { slot, array };
        }

        if !self.cur.check(TokenKind::Ident) {
            return Err(ParseError::MalformedIntrinsic {
                span: start_span,
                reason: "missing method name",
            });
        }
        let name = self.cur.current_text().to_string();
        self.cur.advance();
        let Some(lparen) = self.cur.eat(TokenKind::LParen) else {
            return Err(ParseError::MalformedIntrinsic {
                span: start_span,
                reason: "missing argument list",
            });
        };

        // Split arguments at the top nesting level without consuming;
        // the walk resumes inside the argument region afterwards.
        // Angle depth is tracked so commas inside type arguments (e.g.
        // `new KTypeVTypeBar<KType, VType>()`) do not split; a stray
        // comparison `>` cannot push it below zero.
        let resume = self.cur.position();
        let mut args: Vec<Span> = Vec::new();
        let mut depth = 0i32;
        let mut angle_depth = 0i32;
        let mut arg_start: Option<u32> = None;
        let mut arg_end = 0u32;
        let end_span;
        loop {
            match self.cur.current_kind() {
                TokenKind::Eof => {
                    return Err(ParseError::UnterminatedIntrinsicArgs { span: lparen.span });
                }
                TokenKind::RParen if depth == 0 => {
                    if let Some(s) = arg_start {
                        args.push(Span::new(s, arg_end));
                    }
                    end_span = self.cur.current_span();
                    break;
                }
                TokenKind::Comma if depth == 0 && angle_depth == 0 => {
                    if let Some(s) = arg_start.take() {
                        args.push(Span::new(s, arg_end));
                    }
                    self.cur.advance();
                    continue;
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => depth -= 1,
                TokenKind::Lt => angle_depth += 1,
                TokenKind::Gt => angle_depth = (angle_depth - 1).max(0),
                _ => {}
            }
            let tok = self.cur.advance();
            if arg_start.is_none() {
                arg_start = Some(tok.span.start);
            }
            arg_end = tok.span.end;
        }

        let call_span = Span::new(start_span.start, end_span.end);
        if !self.intrinsics.iter().any(|(n, _)| n == &name) {
            self.intrinsics.push((name.clone(), call_span));
        }
        trace!(intrinsic = %name, target = target.token(), "intrinsic call site");
        self.push_construct(call_span, ConstructKind::IntrinsicCall { target, name, args });
        self.cur.set_position(resume);
        Ok(())
    }
}
