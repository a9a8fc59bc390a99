//! The `equals` intrinsic.

use mono_ir::Kind;
use mono_resolve::{Intrinsic, IntrinsicCtx, TemplateError};

/// `Intrinsics.<KType>equals(a, b)`.
///
/// Generic slots compare through `java.util.Objects.equals`; float and
/// double compare by bit pattern so `NaN == NaN` holds inside
/// containers; the remaining primitives compare with `==`.
pub struct Equals;

impl Intrinsic for Equals {
    fn name(&self) -> &'static str {
        "equals"
    }

    fn expand(&self, ctx: &IntrinsicCtx<'_>, out: &mut String) -> Result<(), TemplateError> {
        ctx.expect_argument_count(2)?;
        let a = &ctx.args[0];
        let b = &ctx.args[1];
        let expansion = match ctx.assignment.kind(ctx.target.slot) {
            Some(Kind::Generic) => format!("java.util.Objects.equals({a}, {b})"),
            Some(Kind::Float) => {
                format!("(Float.floatToIntBits({a}) == Float.floatToIntBits({b}))")
            }
            Some(Kind::Double) => {
                format!("(Double.doubleToLongBits({a}) == Double.doubleToLongBits({b}))")
            }
            _ => format!("(({a}) == ({b}))"),
        };
        out.push_str(&expansion);
        Ok(())
    }
}
