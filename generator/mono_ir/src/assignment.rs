//! Slot identity and per-generation kind assignments.

use std::fmt;

use crate::Kind;

/// A template slot: the key position or the value position.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Slot {
    K,
    V,
}

impl Slot {
    /// The literal marker token for this slot as written in templates.
    pub fn token(self) -> &'static str {
        match self {
            Slot::K => "KType",
            Slot::V => "VType",
        }
    }

    /// The array form of the marker token.
    pub fn array_token(self) -> &'static str {
        match self {
            Slot::K => "KType[]",
            Slot::V => "VType[]",
        }
    }

    /// Recognize a bare slot token.
    pub fn from_token(token: &str) -> Option<Slot> {
        match token {
            "KType" => Some(Slot::K),
            "VType" => Some(Slot::V),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How many slots a template declares.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Arity {
    /// Key slot only.
    One,
    /// Key and value slots.
    Two,
}

impl Arity {
    pub fn slots(self) -> usize {
        match self {
            Arity::One => 1,
            Arity::Two => 2,
        }
    }
}

/// The kind bound to each declared slot for one generation pass.
///
/// Immutable once resolved; one `Assignment` exists per entry of the
/// driver's enumerated cross-product.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Assignment {
    k: Option<Kind>,
    v: Option<Kind>,
}

impl Assignment {
    /// Validate supplied kinds against the template's declared arity.
    ///
    /// A two-slot template needs both kinds; a one-slot template must not
    /// be given a value kind.
    pub fn resolve(
        arity: Arity,
        k: Kind,
        v: Option<Kind>,
    ) -> Result<Assignment, ConfigurationError> {
        match (arity, v) {
            (Arity::One, None) => Ok(Assignment { k: Some(k), v: None }),
            (Arity::One, Some(_)) => Err(ConfigurationError::UnexpectedKind { slot: Slot::V }),
            (Arity::Two, Some(v)) => Ok(Assignment {
                k: Some(k),
                v: Some(v),
            }),
            (Arity::Two, None) => Err(ConfigurationError::MissingKind { slot: Slot::V }),
        }
    }

    /// One-slot assignment, for direct construction in tests and drivers.
    pub fn single(k: Kind) -> Assignment {
        Assignment { k: Some(k), v: None }
    }

    /// Two-slot assignment.
    pub fn pair(k: Kind, v: Kind) -> Assignment {
        Assignment {
            k: Some(k),
            v: Some(v),
        }
    }

    /// Whether this assignment binds the slot at all.
    pub fn has(&self, slot: Slot) -> bool {
        self.kind(slot).is_some()
    }

    /// The kind bound to a slot, if the slot is declared.
    pub fn kind(&self, slot: Slot) -> Option<Kind> {
        match slot {
            Slot::K => self.k,
            Slot::V => self.v,
        }
    }

    /// True iff the slot is declared and left generic.
    pub fn is_generic(&self, slot: Slot) -> bool {
        matches!(self.kind(slot), Some(kind) if kind.is_generic())
    }

    pub fn arity(&self) -> Arity {
        if self.v.is_some() {
            Arity::Two
        } else {
            Arity::One
        }
    }

    /// Short display form for reports, e.g. `K=Int, V=Object`.
    pub fn describe(&self) -> String {
        match (self.k, self.v) {
            (Some(k), Some(v)) => format!("K={}, V={}", k.display(), v.display()),
            (Some(k), None) => format!("K={}", k.display()),
            (None, Some(v)) => format!("V={}", v.display()),
            (None, None) => "unbound".to_string(),
        }
    }
}

/// Mismatch between a template's declared arity and the supplied kinds,
/// or other pre-generation configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The template declares this slot but no kind was supplied for it.
    MissingKind { slot: Slot },
    /// A kind was supplied for a slot the template does not declare.
    UnexpectedKind { slot: Slot },
    /// An intrinsic name in the template has no registered handler.
    UnknownIntrinsic {
        name: String,
        span: crate::Span,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingKind { slot } => {
                write!(f, "template declares {slot} but no kind was supplied for it")
            }
            ConfigurationError::UnexpectedKind { slot } => {
                write!(f, "a kind was supplied for {slot} but the template does not declare it")
            }
            ConfigurationError::UnknownIntrinsic { name, span } => {
                write!(f, "no handler registered for intrinsic `{name}` at {span}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_arity_checks() {
        assert!(Assignment::resolve(Arity::One, Kind::Int, None).is_ok());
        assert!(Assignment::resolve(Arity::Two, Kind::Int, Some(Kind::Long)).is_ok());
        assert_eq!(
            Assignment::resolve(Arity::Two, Kind::Int, None),
            Err(ConfigurationError::MissingKind { slot: Slot::V })
        );
        assert_eq!(
            Assignment::resolve(Arity::One, Kind::Int, Some(Kind::Long)),
            Err(ConfigurationError::UnexpectedKind { slot: Slot::V })
        );
    }

    #[test]
    fn test_flags() {
        let a = Assignment::pair(Kind::Int, Kind::Generic);
        assert!(a.has(Slot::K));
        assert!(a.has(Slot::V));
        assert!(!a.is_generic(Slot::K));
        assert!(a.is_generic(Slot::V));

        let single = Assignment::single(Kind::Float);
        assert!(!single.has(Slot::V));
        assert!(!single.is_generic(Slot::V));
        assert_eq!(single.arity(), Arity::One);
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            Assignment::pair(Kind::Int, Kind::Generic).describe(),
            "K=Int, V=Object"
        );
        assert_eq!(Assignment::single(Kind::Byte).describe(), "K=Byte");
    }

    #[test]
    fn test_slot_tokens() {
        assert_eq!(Slot::K.token(), "KType");
        assert_eq!(Slot::V.array_token(), "VType[]");
        assert_eq!(Slot::from_token("VType"), Some(Slot::V));
        assert_eq!(Slot::from_token("TType"), None);
    }
}
