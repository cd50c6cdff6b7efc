//! In-memory form of the emitted artifacts.
//!
//! An [`ArtifactSet`] holds every `#define` and every array symbol exactly
//! once. The header only ever sees [`Declaration`]s and the source only
//! [`Definition`]s derived from it; [`check_consistency`] proves the two
//! sides agree before anything is rendered.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// C element type of an emitted array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    U8,
    I8,
    U16,
    U32,
}

impl ElementType {
    /// C type name from `<stdint.h>`.
    pub fn c_name(self) -> &'static str {
        match self {
            Self::U8 => "uint8_t",
            Self::I8 => "int8_t",
            Self::U16 => "uint16_t",
            Self::U32 => "uint32_t",
        }
    }

    /// Storage width in bytes.
    pub fn width_bytes(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Smallest representable value.
    pub fn min(self) -> i64 {
        match self {
            Self::I8 => i8::MIN as i64,
            _ => 0,
        }
    }

    /// Largest representable value.
    pub fn max(self) -> i64 {
        match self {
            Self::U8 => u8::MAX as i64,
            Self::I8 => i8::MAX as i64,
            Self::U16 => u16::MAX as i64,
            Self::U32 => u32::MAX as i64,
        }
    }

    /// Whether `value` is representable without truncation.
    pub fn fits(self, value: i64) -> bool {
        (self.min()..=self.max()).contains(&value)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.c_name())
    }
}

/// Array layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `name[]`
    Vector,
    /// `name[][columns]`, row-major.
    Table { columns: usize },
}

impl Shape {
    /// Inner dimension, if any.
    pub fn columns(self) -> Option<usize> {
        match self {
            Self::Vector => None,
            Self::Table { columns } => Some(columns),
        }
    }
}

/// Scalar constant rendered as `#define NAME value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: &'static str,
    pub value: u64,
    /// Human-readable restatement, documentation only.
    pub comment: Option<String>,
}

impl Define {
    pub fn new(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Array constant with its values in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySymbol {
    pub name: &'static str,
    pub element_type: ElementType,
    pub shape: Shape,
    pub values: Vec<i64>,
    /// One label per row (tables) or per element (vectors), documentation only.
    pub labels: Vec<String>,
    /// Trailing comment, documentation only.
    pub note: Option<String>,
}

impl ArraySymbol {
    pub fn vector<T: Copy + Into<i64>>(
        name: &'static str,
        element_type: ElementType,
        values: &[T],
    ) -> Self {
        Self {
            name,
            element_type,
            shape: Shape::Vector,
            values: values.iter().map(|&v| v.into()).collect(),
            labels: Vec::new(),
            note: None,
        }
    }

    pub fn table(
        name: &'static str,
        element_type: ElementType,
        columns: usize,
        values: Vec<i64>,
    ) -> Self {
        Self {
            name,
            element_type,
            shape: Shape::Table { columns },
            values,
            labels: Vec::new(),
            note: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Values grouped by row; vectors are a single row.
    pub fn rows(&self) -> Vec<&[i64]> {
        match self.shape {
            Shape::Vector => vec![self.values.as_slice()],
            Shape::Table { columns } if columns > 0 => self.values.chunks(columns).collect(),
            Shape::Table { .. } => Vec::new(),
        }
    }
}

/// What the declarations artifact states about a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub name: &'static str,
    pub element_type: ElementType,
    pub shape: Shape,
}

/// What the definitions artifact provides for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub name: &'static str,
    pub element_type: ElementType,
    pub shape: Shape,
    pub element_count: usize,
}

/// Every constant of one artifact pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    pub defines: Vec<Define>,
    pub arrays: Vec<ArraySymbol>,
}

impl ArtifactSet {
    /// Declarations for the header, in emission order.
    pub fn declarations(&self) -> Vec<Declaration> {
        self.arrays
            .iter()
            .map(|a| Declaration {
                name: a.name,
                element_type: a.element_type,
                shape: a.shape,
            })
            .collect()
    }

    /// Definitions for the source, in emission order.
    pub fn definitions(&self) -> Vec<Definition> {
        self.arrays
            .iter()
            .map(|a| Definition {
                name: a.name,
                element_type: a.element_type,
                shape: a.shape,
                element_count: a.values.len(),
            })
            .collect()
    }

    /// Check names, values and both sides of the pair.
    pub fn verify(&self) -> Result<(), ConsistencyError> {
        let mut names = HashSet::new();
        for name in self
            .defines
            .iter()
            .map(|d| d.name)
            .chain(self.arrays.iter().map(|a| a.name))
        {
            if !names.insert(name) {
                return Err(ConsistencyError::DuplicateSymbol(name));
            }
        }

        for array in &self.arrays {
            for (index, &value) in array.values.iter().enumerate() {
                if !array.element_type.fits(value) {
                    return Err(ConsistencyError::ValueOutOfRange {
                        symbol: array.name,
                        index,
                        value,
                        element_type: array.element_type,
                    });
                }
            }
        }

        check_consistency(&self.declarations(), &self.definitions())
    }
}

/// Check that every declaration has exactly one matching definition.
pub fn check_consistency(
    declarations: &[Declaration],
    definitions: &[Definition],
) -> Result<(), ConsistencyError> {
    let mut by_name: HashMap<&'static str, &Definition> = HashMap::new();
    for definition in definitions {
        if by_name.insert(definition.name, definition).is_some() {
            return Err(ConsistencyError::DuplicateSymbol(definition.name));
        }
    }

    let mut declared = HashSet::new();
    for declaration in declarations {
        if !declared.insert(declaration.name) {
            return Err(ConsistencyError::DuplicateSymbol(declaration.name));
        }

        let definition = by_name
            .get(declaration.name)
            .ok_or(ConsistencyError::MissingDefinition(declaration.name))?;

        if definition.element_type != declaration.element_type {
            return Err(ConsistencyError::TypeMismatch {
                symbol: declaration.name,
                declared: declaration.element_type,
                defined: definition.element_type,
            });
        }
        if definition.element_count == 0 {
            return Err(ConsistencyError::EmptyArray(declaration.name));
        }
        let shape_ok = match (declaration.shape, definition.shape) {
            (Shape::Vector, Shape::Vector) => true,
            (Shape::Table { columns: a }, Shape::Table { columns: b }) => {
                a == b && a > 0 && definition.element_count % a == 0
            }
            _ => false,
        };
        if !shape_ok {
            return Err(ConsistencyError::ShapeMismatch {
                symbol: declaration.name,
                declared_columns: declaration.shape.columns(),
                defined_columns: definition.shape.columns(),
                element_count: definition.element_count,
            });
        }
    }

    if let Some(orphan) = definitions.iter().find(|d| !declared.contains(d.name)) {
        return Err(ConsistencyError::MissingDeclaration(orphan.name));
    }

    Ok(())
}

/// Declared and defined artifacts disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    /// Symbol emitted twice.
    DuplicateSymbol(&'static str),
    /// Declared but never defined.
    MissingDefinition(&'static str),
    /// Defined but never declared.
    MissingDeclaration(&'static str),
    /// Element types differ.
    TypeMismatch {
        symbol: &'static str,
        declared: ElementType,
        defined: ElementType,
    },
    /// Dimensions differ or the values do not fill whole rows.
    ShapeMismatch {
        symbol: &'static str,
        declared_columns: Option<usize>,
        defined_columns: Option<usize>,
        element_count: usize,
    },
    /// A value would be truncated by its element type.
    ValueOutOfRange {
        symbol: &'static str,
        index: usize,
        value: i64,
        element_type: ElementType,
    },
    /// Array without values.
    EmptyArray(&'static str),
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSymbol(name) => write!(f, "symbol {} emitted twice", name),
            Self::MissingDefinition(name) => write!(f, "symbol {} declared but not defined", name),
            Self::MissingDeclaration(name) => write!(f, "symbol {} defined but not declared", name),
            Self::TypeMismatch {
                symbol,
                declared,
                defined,
            } => write!(
                f,
                "symbol {} declared as {} but defined as {}",
                symbol, declared, defined
            ),
            Self::ShapeMismatch {
                symbol,
                declared_columns,
                defined_columns,
                element_count,
            } => write!(
                f,
                "symbol {} declared with {:?} columns, defined with {:?} columns and {} elements",
                symbol, declared_columns, defined_columns, element_count
            ),
            Self::ValueOutOfRange {
                symbol,
                index,
                value,
                element_type,
            } => write!(
                f,
                "symbol {}[{}] = {} does not fit {}",
                symbol, index, value, element_type
            ),
            Self::EmptyArray(name) => write!(f, "symbol {} has no elements", name),
        }
    }
}

impl std::error::Error for ConsistencyError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(name: &'static str, element_type: ElementType, shape: Shape) -> Declaration {
        Declaration {
            name,
            element_type,
            shape,
        }
    }

    fn definition(
        name: &'static str,
        element_type: ElementType,
        shape: Shape,
        element_count: usize,
    ) -> Definition {
        Definition {
            name,
            element_type,
            shape,
            element_count,
        }
    }

    // ==================== ElementType Tests ====================

    #[test]
    fn test_element_ranges() {
        assert!(ElementType::U8.fits(255));
        assert!(!ElementType::U8.fits(256));
        assert!(!ElementType::U8.fits(-1));
        assert!(ElementType::I8.fits(-128));
        assert!(!ElementType::I8.fits(128));
        assert!(ElementType::U32.fits(u32::MAX as i64));
        assert!(!ElementType::U32.fits(u32::MAX as i64 + 1));
    }

    #[test]
    fn test_element_widths() {
        assert_eq!(ElementType::I8.width_bytes(), 1);
        assert_eq!(ElementType::U16.width_bytes(), 2);
        assert_eq!(ElementType::U32.c_name(), "uint32_t");
    }

    // ==================== ArtifactSet Tests ====================

    #[test]
    fn test_verify_accepts_well_formed_set() {
        let set = ArtifactSet {
            defines: vec![Define::new("LWB_MOD_COUNT", 2)],
            arrays: vec![
                ArraySymbol::vector("lwb_powers", ElementType::I8, &[-3i8, 22]),
                ArraySymbol::table("lwb_slot_times", ElementType::U32, 2, vec![1, 2, 3, 4]),
            ],
        };
        assert_eq!(set.verify(), Ok(()));
    }

    #[test]
    fn test_verify_rejects_truncation() {
        let set = ArtifactSet {
            defines: Vec::new(),
            arrays: vec![ArraySymbol::vector("gloria_hop_counts", ElementType::U8, &[1u16, 300])],
        };
        assert_eq!(
            set.verify(),
            Err(ConsistencyError::ValueOutOfRange {
                symbol: "gloria_hop_counts",
                index: 1,
                value: 300,
                element_type: ElementType::U8,
            })
        );
    }

    #[test]
    fn test_verify_rejects_duplicate_across_kinds() {
        let set = ArtifactSet {
            defines: vec![Define::new("lwb_powers", 1)],
            arrays: vec![ArraySymbol::vector("lwb_powers", ElementType::I8, &[1i8])],
        };
        assert_eq!(
            set.verify(),
            Err(ConsistencyError::DuplicateSymbol("lwb_powers"))
        );
    }

    #[test]
    fn test_verify_rejects_ragged_table() {
        let set = ArtifactSet {
            defines: Vec::new(),
            arrays: vec![ArraySymbol::table("t", ElementType::U32, 4, vec![1, 2, 3, 4, 5])],
        };
        assert!(matches!(
            set.verify(),
            Err(ConsistencyError::ShapeMismatch { symbol: "t", .. })
        ));
    }

    #[test]
    fn test_rows() {
        let table = ArraySymbol::table("t", ElementType::U32, 2, vec![1, 2, 3, 4]);
        assert_eq!(table.rows(), vec![&[1, 2][..], &[3, 4][..]]);
        let vector = ArraySymbol::vector("v", ElementType::U8, &[7u8, 8]);
        assert_eq!(vector.rows(), vec![&[7, 8][..]]);
    }

    // ==================== check_consistency Tests ====================

    #[test]
    fn test_missing_definition() {
        let decls = [declaration("a", ElementType::U8, Shape::Vector)];
        assert_eq!(
            check_consistency(&decls, &[]),
            Err(ConsistencyError::MissingDefinition("a"))
        );
    }

    #[test]
    fn test_missing_declaration() {
        let defs = [definition("a", ElementType::U8, Shape::Vector, 3)];
        assert_eq!(
            check_consistency(&[], &defs),
            Err(ConsistencyError::MissingDeclaration("a"))
        );
    }

    #[test]
    fn test_type_mismatch() {
        let decls = [declaration("t", ElementType::U8, Shape::Table { columns: 256 })];
        let defs = [definition("t", ElementType::U32, Shape::Table { columns: 256 }, 512)];
        assert!(matches!(
            check_consistency(&decls, &defs),
            Err(ConsistencyError::TypeMismatch { symbol: "t", .. })
        ));
    }

    #[test]
    fn test_column_mismatch() {
        let decls = [declaration("t", ElementType::U32, Shape::Table { columns: 256 })];
        let defs = [definition("t", ElementType::U32, Shape::Table { columns: 128 }, 512)];
        assert!(matches!(
            check_consistency(&decls, &defs),
            Err(ConsistencyError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_vector_declared_as_table() {
        let decls = [declaration("v", ElementType::U8, Shape::Vector)];
        let defs = [definition("v", ElementType::U8, Shape::Table { columns: 2 }, 4)];
        assert!(matches!(
            check_consistency(&decls, &defs),
            Err(ConsistencyError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_definition() {
        let decls = [declaration("v", ElementType::U8, Shape::Vector)];
        let defs = [definition("v", ElementType::U8, Shape::Vector, 0)];
        assert_eq!(
            check_consistency(&decls, &defs),
            Err(ConsistencyError::EmptyArray("v"))
        );
    }

    #[test]
    fn test_duplicate_definition() {
        let decls = [declaration("v", ElementType::U8, Shape::Vector)];
        let defs = [
            definition("v", ElementType::U8, Shape::Vector, 1),
            definition("v", ElementType::U8, Shape::Vector, 1),
        ];
        assert_eq!(
            check_consistency(&decls, &defs),
            Err(ConsistencyError::DuplicateSymbol("v"))
        );
    }
}
