//! Representations of Go types, as far as constant analysis needs them.
//!
//! Only basic types are modelled precisely. Every other type constructor is
//! reduced to a [`Ty`] variant that records *what* it is without recording
//! its structure, which is enough to answer "is this an integer type?" and
//! "is this a struct type?".

use crate::symbol::Symbol;

/// A predeclared basic type, or the kind of an untyped constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
}

impl BasicKind {
    /// Looks up a predeclared type name, including the `byte` and `rune`
    /// aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "rune" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "string" => Self::String,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::UntypedBool => "untyped bool",
            Self::UntypedInt => "untyped int",
            Self::UntypedRune => "untyped rune",
            Self::UntypedFloat => "untyped float",
            Self::UntypedComplex => "untyped complex",
            Self::UntypedString => "untyped string",
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
                | Self::UntypedInt
                | Self::UntypedRune
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64 | Self::UntypedFloat)
    }

    pub const fn is_complex(self) -> bool {
        matches!(
            self,
            Self::Complex64 | Self::Complex128 | Self::UntypedComplex
        )
    }

    pub const fn is_string(self) -> bool {
        matches!(self, Self::String | Self::UntypedString)
    }

    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool | Self::UntypedBool)
    }

    pub const fn is_untyped(self) -> bool {
        matches!(
            self,
            Self::UntypedBool
                | Self::UntypedInt
                | Self::UntypedRune
                | Self::UntypedFloat
                | Self::UntypedComplex
                | Self::UntypedString
        )
    }

    /// Returns the inclusive range of values an integer type can hold, or
    /// `None` for untyped and non-integer kinds.
    ///
    /// `int`, `uint` and `uintptr` are assumed to be 64 bits wide.
    pub const fn integer_bounds(self) -> Option<(i128, i128)> {
        Some(match self {
            Self::Int8 => (i8::MIN as i128, i8::MAX as i128),
            Self::Int16 => (i16::MIN as i128, i16::MAX as i128),
            Self::Int32 => (i32::MIN as i128, i32::MAX as i128),
            Self::Int | Self::Int64 => (i64::MIN as i128, i64::MAX as i128),
            Self::Uint8 => (0, u8::MAX as i128),
            Self::Uint16 => (0, u16::MAX as i128),
            Self::Uint32 => (0, u32::MAX as i128),
            Self::Uint | Self::Uint64 | Self::Uintptr => (0, u64::MAX as i128),
            _ => return None,
        })
    }
}

impl std::fmt::Display for BasicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A Go type as written in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    /// A predeclared basic type.
    Basic(BasicKind),
    /// A type declared in the package being analyzed.
    Named(Symbol),
    /// A type declared in an imported package, e.g. `time.Duration`.
    Foreign { package: Symbol, name: Symbol },
    Struct,
    Interface,
    Pointer,
    /// Arrays, slices, maps, channels and function types.
    Composite,
    /// An instantiation of a generic type.
    Generic,
    /// The type of a value imported from a package that was not loaded.
    Unknown,
}

impl Ty {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Basic(kind) if kind.is_integer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predeclared_aliases() {
        assert_eq!(BasicKind::from_name("byte"), Some(BasicKind::Uint8));
        assert_eq!(BasicKind::from_name("rune"), Some(BasicKind::Int32));
        assert_eq!(BasicKind::from_name("ShirtSize"), None);
    }

    #[test]
    fn kind_classification() {
        assert!(BasicKind::Uint8.is_integer());
        assert!(BasicKind::UntypedRune.is_integer());
        assert!(!BasicKind::Float64.is_integer());
        assert!(BasicKind::UntypedFloat.is_float());
        assert!(BasicKind::UntypedString.is_untyped());
        assert!(!BasicKind::String.is_untyped());
        assert_eq!(BasicKind::Uint8.integer_bounds(), Some((0, 255)));
        assert_eq!(BasicKind::Float32.integer_bounds(), None);
    }
}
