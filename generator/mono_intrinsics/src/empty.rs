//! The `empty` intrinsic.

use mono_resolve::{Intrinsic, IntrinsicCtx, TemplateError};

/// `Intrinsics.<KType>empty()` — the slot's absent value: `null` for a
/// generic slot, the zero literal for concrete kinds.
pub struct Empty;

impl Intrinsic for Empty {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn expand(&self, ctx: &IntrinsicCtx<'_>, out: &mut String) -> Result<(), TemplateError> {
        ctx.expect_argument_count(0)?;
        let kind = ctx
            .assignment
            .kind(ctx.target.slot)
            .unwrap_or(mono_ir::Kind::Generic);
        out.push_str(kind.default_literal());
        Ok(())
    }
}
