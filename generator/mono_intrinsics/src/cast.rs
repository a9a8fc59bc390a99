//! The `cast` intrinsic.

use mono_resolve::{Intrinsic, IntrinsicCtx, TemplateError};

/// `Intrinsics.<KType>cast(expr)`.
///
/// Against a generic slot the expression gains an explicit cast to the
/// retained type parameter (array brackets preserved when targeting the
/// array form). Against a concrete slot the cast erases entirely:
/// primitive-to-primitive assignment needs no cast, so the argument
/// passes through unchanged.
pub struct Cast;

impl Intrinsic for Cast {
    fn name(&self) -> &'static str {
        "cast"
    }

    fn expand(&self, ctx: &IntrinsicCtx<'_>, out: &mut String) -> Result<(), TemplateError> {
        ctx.expect_argument_count(1)?;
        if ctx.assignment.is_generic(ctx.target.slot) {
            out.push('(');
            out.push_str(ctx.target.token());
            out.push_str(") ");
            out.push_str(&ctx.args[0]);
        } else {
            out.push_str(&ctx.args[0]);
        }
        Ok(())
    }
}
