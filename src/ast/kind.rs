/// Every grammar production gets exactly one variant. Kept flat (no nested
/// payload variants) rather than modeling the grammar through Rust's type
/// system, so one enum tag covers a production regardless of shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstNodeKind {
    Document,
    Section,
    SectionMember,

    LetExpression,
    IfExpression,
    EachExpression,
    FunctionExpression,
    ParameterList,
    Parameter,

    InvokeExpression,
    ListExpression,
    RecordExpression,
    FieldSelector,
    FieldProjection,
    FieldSpecification,
    ItemAccess,

    PrimitiveType,
    RecordType,
    TableType,
    ListType,
    FunctionType,
    NullableType,
    TypePrimaryType,
    AsType,

    AsExpression,
    IsExpression,
    NullablePrimitiveType,

    MetadataExpression,
    LogicalOrExpression,
    LogicalAndExpression,
    EqualityExpression,
    RelationalExpression,
    ArithmeticExpression,
    UnaryExpression,

    Identifier,
    IdentifierExpression,
    GeneralizedIdentifier,
    Literal,
    Constant,

    CsvArray,
    Csv,
    GeneralizedIdentifierPairedExpression,
    IdentifierPairedExpression,

    ErrorHandlingExpression,
    ErrorRaisingExpression,
    OtherwiseExpression,
    ParenthesizedExpression,

    NotImplementedExpression,
}

impl AstNodeKind {
    /// Kinds that can never have children: literals, identifiers,
    /// constants, and bare primitive-type names (§3 "Ast node": `isLeaf`).
    pub fn is_always_leaf(self) -> bool {
        matches!(
            self,
            AstNodeKind::Identifier
                | AstNodeKind::GeneralizedIdentifier
                | AstNodeKind::Literal
                | AstNodeKind::Constant
                | AstNodeKind::PrimitiveType
        )
    }
}
