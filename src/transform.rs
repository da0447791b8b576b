use std::sync::Arc;

use swc_core::{
    common::{
        errors::HANDLER, util::take::Take, BytePos, Loc, SourceMapper, Span, Spanned, SyntaxContext,
        DUMMY_SP,
    },
    ecma::{
        ast::*,
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::location::{escape_template_raw, format_tag, quote_str, relative_path, UNKNOWN_TAG};

// -----------------------------------------------------------------------------
// Recognized shapes
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intrinsic {
    Print,
    Warn,
    Debug,
}

impl Intrinsic {
    fn of(callee: &Callee) -> Option<Self> {
        match callee {
            Callee::Expr(expr) => Self::of_expr(expr),
            _ => None,
        }
    }

    fn of_expr(expr: &Expr) -> Option<Self> {
        let Expr::Ident(id) = expr else {
            return None;
        };
        match id.sym.as_ref() {
            "$print" => Some(Self::Print),
            "$warn" => Some(Self::Warn),
            "$debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Thrown {
    /// `"..."` or a template without substitutions
    Literal,
    /// template with at least one `${}`
    Template,
    Ident,
}

impl Thrown {
    fn of(arg: &Expr) -> Option<Self> {
        match arg {
            Expr::Lit(Lit::Str(_)) => Some(Self::Literal),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => Some(Self::Literal),
            Expr::Tpl(_) => Some(Self::Template),
            Expr::Ident(_) => Some(Self::Ident),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Transform state
// -----------------------------------------------------------------------------

/// Prefixes `$print`/`$warn`/`$debug` arguments and thrown messages with
/// the `[file:line:col] ` of the call or `throw`.
pub struct LocationTagger {
    source_map: Option<Arc<dyn SourceMapper>>,
    base_dir: Option<String>,
    debug_callee: String,
}

impl LocationTagger {
    pub fn new(
        source_map: Option<Arc<dyn SourceMapper>>,
        base_dir: Option<String>,
        debug_callee: impl Into<String>,
    ) -> Self {
        Self {
            source_map,
            base_dir,
            debug_callee: debug_callee.into(),
        }
    }

    // ---------- helpers ----------

    fn location_tag(&self, span: Span) -> String {
        if span.is_dummy() {
            return UNKNOWN_TAG.to_string();
        }
        let Some(ref cm) = self.source_map else {
            return UNKNOWN_TAG.to_string();
        };
        let loc = cm.lookup_char_pos(span.lo());
        let path = relative_path(self.base_dir.as_deref(), &loc.file.name.to_string());
        format_tag(&path, loc.line, utf16_column(&loc, span.lo()) + 1)
    }

    /// Source text of a call argument as written, spread included.
    fn source_text(&self, arg: &ExprOrSpread) -> String {
        let span = arg.span();
        if !span.is_dummy() {
            if let Some(ref cm) = self.source_map {
                if let Ok(snippet) = cm.span_to_snippet(span) {
                    return snippet;
                }
            }
        }
        // Only reachable when another pass synthesized the `$debug` call:
        // there is no source text, so non-identifiers get a placeholder.
        match &*arg.expr {
            Expr::Ident(id) => id.sym.to_string(),
            _ => "<expr>".to_string(),
        }
    }

    fn callee(name: &str, span: Span) -> Callee {
        Callee::Expr(Box::new(Expr::Ident(Ident::new(
            name.into(),
            span,
            SyntaxContext::empty(),
        ))))
    }

    fn str_arg(value: String) -> ExprOrSpread {
        ExprOrSpread {
            spread: None,
            expr: Box::new(Expr::Lit(Lit::Str(Str {
                span: DUMMY_SP,
                value: value.into(),
                raw: None,
            }))),
        }
    }

    /// String literal whose raw form is preset, so codegen writes
    /// non-ASCII characters through instead of `\u` escaping them.
    fn unescaped_str(value: String, span: Span) -> Str {
        let raw = quote_str(&value);
        Str {
            span,
            value: value.into(),
            raw: Some(raw.into()),
        }
    }

    fn report(span: Span, msg: &str) {
        if HANDLER.is_set() {
            HANDLER.with(|handler| handler.struct_span_warn(span, msg).emit());
        } else {
            tracing::warn!("{}", msg);
        }
    }

    fn report_empty_debug(span: Span) {
        Self::report(span, "`$debug()` needs an argument; call left unchanged")
    }

    // ---------- calls ----------

    fn rewrite_call(&self, n: &mut CallExpr, intrinsic: Intrinsic) {
        match intrinsic {
            Intrinsic::Print => self.rewrite_message_call(n, "print"),
            Intrinsic::Warn => self.rewrite_message_call(n, "warn"),
            Intrinsic::Debug => self.rewrite_debug_call(n),
        }
    }

    /// `$print(a, b)` -> `print("[tag] ", a, b)`, likewise for `$warn`.
    fn rewrite_message_call(&self, n: &mut CallExpr, mode: &str) {
        let tag = self.location_tag(n.span);
        tracing::debug!(mode, %tag, "tagging message call");

        let mut args = Vec::with_capacity(n.args.len() + 1);
        args.push(Self::str_arg(tag));
        args.append(&mut n.args);

        n.callee = Self::callee(mode, n.callee.span());
        n.args = args;
        n.type_args = None;
    }

    /// `$debug(x, ..)` -> `debugPrint("[tag] x = ", x, ..)`.
    fn rewrite_debug_call(&self, n: &mut CallExpr) {
        let tag = self.location_tag(n.span);
        let label = format!("{}{} = ", tag, self.source_text(&n.args[0]));
        tracing::debug!(%label, "tagging debug call");

        let mut args = Vec::with_capacity(n.args.len() + 1);
        args.push(Self::str_arg(label));
        args.append(&mut n.args);

        n.callee = Self::callee(&self.debug_callee, n.callee.span());
        n.args = args;
    }

    // ---------- throws ----------

    fn rewrite_throw(&self, n: &mut ThrowStmt, shape: Thrown) {
        let tag = self.location_tag(n.span);
        tracing::debug!(?shape, %tag, "tagging thrown message");

        match shape {
            Thrown::Literal => {
                let (text, span) = match &*n.arg {
                    Expr::Lit(Lit::Str(s)) => (s.value.to_string(), s.span),
                    Expr::Tpl(tpl) => {
                        let text = tpl
                            .quasis
                            .first()
                            .map(|q| q.cooked.as_ref().unwrap_or(&q.raw).to_string())
                            .unwrap_or_default();
                        (text, tpl.span)
                    }
                    _ => return,
                };
                let lit = Self::unescaped_str(format!("{}{}", tag, text), span);
                n.arg = Box::new(Expr::Lit(Lit::Str(lit)));
            }
            Thrown::Template => {
                let Expr::Tpl(tpl) = &mut *n.arg else {
                    return;
                };
                if let Some(head) = tpl.quasis.first_mut() {
                    // raw text is emitted verbatim, non-ASCII included
                    head.raw = format!("{}{}", escape_template_raw(&tag), head.raw).into();
                    head.cooked = head
                        .cooked
                        .as_ref()
                        .map(|cooked| format!("{}{}", tag, cooked).into());
                }
            }
            Thrown::Ident => {
                let id = n.arg.take();
                n.arg = Box::new(Expr::Bin(BinExpr {
                    span: id.span(),
                    op: BinaryOp::Add,
                    left: Self::str_arg(tag).expr,
                    right: id,
                }));
            }
        }
    }
}

/// Zero-based column of `pos` in UTF-16 code units.
///
/// Falls back to the source map's column when the file text is not
/// available (or does not line up with the reported position).
fn utf16_column(loc: &Loc, pos: BytePos) -> usize {
    let src: &str = &loc.file.src;
    pos.0
        .checked_sub(loc.file.start_pos.0)
        .and_then(|offset| src.get(..offset as usize))
        .map(|before| {
            before
                .rsplit(['\n', '\r', '\u{2028}', '\u{2029}'])
                .next()
                .unwrap_or(before)
        })
        .filter(|line| {
            line.chars().count() == loc.col.0 || line.encode_utf16().count() == loc.col.0
        })
        .map(|line| line.encode_utf16().count())
        .unwrap_or(loc.col.0)
}

impl VisitMut for LocationTagger {
    fn visit_mut_call_expr(&mut self, n: &mut CallExpr) {
        match Intrinsic::of(&n.callee) {
            Some(Intrinsic::Debug) if n.args.is_empty() => Self::report_empty_debug(n.span),
            Some(intrinsic) => return self.rewrite_call(n, intrinsic),
            None => {}
        }
        n.visit_mut_children_with(self);
    }

    /// `$print?.(..)` parses as an optional chain, not a call; it gets the
    /// same rewrite and becomes a plain call.
    fn visit_mut_expr(&mut self, n: &mut Expr) {
        if let Expr::OptChain(chain) = n {
            if let OptChainBase::Call(call) = &mut *chain.base {
                match Intrinsic::of_expr(&call.callee) {
                    Some(Intrinsic::Debug) if call.args.is_empty() => {
                        Self::report_empty_debug(call.span)
                    }
                    Some(intrinsic) => {
                        let mut plain = CallExpr {
                            span: chain.span,
                            ctxt: call.ctxt,
                            callee: Callee::Expr(call.callee.take()),
                            args: std::mem::take(&mut call.args),
                            type_args: call.type_args.take(),
                        };
                        self.rewrite_call(&mut plain, intrinsic);
                        *n = Expr::Call(plain);
                        return;
                    }
                    None => {}
                }
            }
        }
        n.visit_mut_children_with(self);
    }

    fn visit_mut_throw_stmt(&mut self, n: &mut ThrowStmt) {
        match Thrown::of(&n.arg) {
            Some(shape) => self.rewrite_throw(n, shape),
            None => n.visit_mut_children_with(self),
        }
    }
}
