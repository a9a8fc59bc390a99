//! The `newArray` intrinsic.

use mono_resolve::{Intrinsic, IntrinsicCtx, TemplateError};

/// `Intrinsics.<KType>newArray(length)`.
///
/// A generic slot cannot say `new KType[n]`, so the expansion allocates
/// `Object[]` and casts to the erased array type; concrete slots
/// allocate the primitive array directly.
pub struct NewArray;

impl Intrinsic for NewArray {
    fn name(&self) -> &'static str {
        "newArray"
    }

    fn expand(&self, ctx: &IntrinsicCtx<'_>, out: &mut String) -> Result<(), TemplateError> {
        ctx.expect_argument_count(1)?;
        let length = &ctx.args[0];
        if ctx.assignment.is_generic(ctx.target.slot) {
            out.push_str(&format!(
                "(({}[]) new Object[{length}])",
                ctx.target.slot.token()
            ));
        } else {
            let kind = ctx.assignment.kind(ctx.target.slot).unwrap_or(mono_ir::Kind::Generic);
            out.push_str(&format!("new {}[{length}]", kind.native()));
        }
        Ok(())
    }
}
