//! Operator families shared by several node classes.
//!
//! Nodes whose operands have the same shape are grouped under one
//! `NodeKind` variant carrying one of these operators; the operator decides
//! the host class name that is emitted.

// =============================================================================
// Binary Operators
// =============================================================================

/// Two-operand nodes with `x` and `y` inputs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BinaryOp {
    Add,
    And,
    BinaryMathIntrinsic,
    FloatEquals,
    FloatLessThan,
    FloatNormalizeCompare,
    IntegerBelow,
    IntegerEquals,
    IntegerLessThan,
    IntegerMulHigh,
    IntegerNormalizeCompare,
    IntegerTest,
    LeftShift,
    Mul,
    ObjectEquals,
    Or,
    RightShift,
    ShortCircuitOr,
    Sub,
    UnsignedMulHigh,
    UnsignedRightShift,
    Xor,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 22] = [
        BinaryOp::Add,
        BinaryOp::And,
        BinaryOp::BinaryMathIntrinsic,
        BinaryOp::FloatEquals,
        BinaryOp::FloatLessThan,
        BinaryOp::FloatNormalizeCompare,
        BinaryOp::IntegerBelow,
        BinaryOp::IntegerEquals,
        BinaryOp::IntegerLessThan,
        BinaryOp::IntegerMulHigh,
        BinaryOp::IntegerNormalizeCompare,
        BinaryOp::IntegerTest,
        BinaryOp::LeftShift,
        BinaryOp::Mul,
        BinaryOp::ObjectEquals,
        BinaryOp::Or,
        BinaryOp::RightShift,
        BinaryOp::ShortCircuitOr,
        BinaryOp::Sub,
        BinaryOp::UnsignedMulHigh,
        BinaryOp::UnsignedRightShift,
        BinaryOp::Xor,
    ];

    pub const fn class_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "AddNode",
            BinaryOp::And => "AndNode",
            BinaryOp::BinaryMathIntrinsic => "BinaryMathIntrinsicNode",
            BinaryOp::FloatEquals => "FloatEqualsNode",
            BinaryOp::FloatLessThan => "FloatLessThanNode",
            BinaryOp::FloatNormalizeCompare => "FloatNormalizeCompareNode",
            BinaryOp::IntegerBelow => "IntegerBelowNode",
            BinaryOp::IntegerEquals => "IntegerEqualsNode",
            BinaryOp::IntegerLessThan => "IntegerLessThanNode",
            BinaryOp::IntegerMulHigh => "IntegerMulHighNode",
            BinaryOp::IntegerNormalizeCompare => "IntegerNormalizeCompareNode",
            BinaryOp::IntegerTest => "IntegerTestNode",
            BinaryOp::LeftShift => "LeftShiftNode",
            BinaryOp::Mul => "MulNode",
            BinaryOp::ObjectEquals => "ObjectEqualsNode",
            BinaryOp::Or => "OrNode",
            BinaryOp::RightShift => "RightShiftNode",
            BinaryOp::ShortCircuitOr => "ShortCircuitOrNode",
            BinaryOp::Sub => "SubNode",
            BinaryOp::UnsignedMulHigh => "UnsignedMulHighNode",
            BinaryOp::UnsignedRightShift => "UnsignedRightShiftNode",
            BinaryOp::Xor => "XorNode",
        }
    }

    /// Comparison nodes produce a logic value rather than a number.
    pub const fn is_logic(self) -> bool {
        matches!(
            self,
            BinaryOp::FloatEquals
                | BinaryOp::FloatLessThan
                | BinaryOp::IntegerBelow
                | BinaryOp::IntegerEquals
                | BinaryOp::IntegerLessThan
                | BinaryOp::IntegerTest
                | BinaryOp::ObjectEquals
                | BinaryOp::ShortCircuitOr
        )
    }
}

// =============================================================================
// Unary Operators
// =============================================================================

/// Single-operand nodes with a `value` input only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnaryOp {
    Abs,
    BitCount,
    FloatConvert,
    HotSpotCompression,
    Negate,
    Not,
    Sqrt,
    ReverseBytes,
    UnaryMathIntrinsic,
}

impl UnaryOp {
    pub const fn class_name(self) -> &'static str {
        match self {
            UnaryOp::Abs => "AbsNode",
            UnaryOp::BitCount => "BitCountNode",
            UnaryOp::FloatConvert => "FloatConvertNode",
            UnaryOp::HotSpotCompression => "HotSpotCompressionNode",
            UnaryOp::Negate => "NegateNode",
            UnaryOp::Not => "NotNode",
            UnaryOp::Sqrt => "SqrtNode",
            UnaryOp::ReverseBytes => "ReverseBytesNode",
            UnaryOp::UnaryMathIntrinsic => "UnaryMathIntrinsicNode",
        }
    }
}

/// Integer width conversions; they also record input and result widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConvertOp {
    Narrow,
    SignExtend,
    ZeroExtend,
}

impl ConvertOp {
    pub const fn class_name(self) -> &'static str {
        match self {
            ConvertOp::Narrow => "NarrowNode",
            ConvertOp::SignExtend => "SignExtendNode",
            ConvertOp::ZeroExtend => "ZeroExtendNode",
        }
    }
}

/// Fixed division and remainder nodes, which may trap on a zero divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DivRemOp {
    SignedDiv,
    SignedRem,
    UnsignedDiv,
    UnsignedRem,
}

impl DivRemOp {
    pub const fn class_name(self) -> &'static str {
        match self {
            DivRemOp::SignedDiv => "SignedDivNode",
            DivRemOp::SignedRem => "SignedRemNode",
            DivRemOp::UnsignedDiv => "UnsignedDivNode",
            DivRemOp::UnsignedRem => "UnsignedRemNode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MonitorOp {
    Enter,
    Exit,
}

impl MonitorOp {
    pub const fn class_name(self) -> &'static str {
        match self {
            MonitorOp::Enter => "MonitorEnterNode",
            MonitorOp::Exit => "MonitorExitNode",
        }
    }
}

/// Dispatch mode of a call target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InvokeKind {
    Static,
    Special,
    Virtual,
    Interface,
}

impl InvokeKind {
    pub const fn tag(self) -> &'static str {
        match self {
            InvokeKind::Static => "Static",
            InvokeKind::Special => "Special",
            InvokeKind::Virtual => "Virtual",
            InvokeKind::Interface => "Interface",
        }
    }

    /// Whether the target is chosen by the receiver's runtime type.
    pub const fn is_indirect(self) -> bool {
        matches!(self, InvokeKind::Virtual | InvokeKind::Interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_binary_class_names_unique() {
        let names: HashSet<_> = BinaryOp::ALL.iter().map(|op| op.class_name()).collect();
        assert_eq!(names.len(), BinaryOp::ALL.len());
        assert!(names.iter().all(|n| n.ends_with("Node")));
    }

    #[test]
    fn test_logic_ops() {
        assert!(BinaryOp::IntegerLessThan.is_logic());
        assert!(!BinaryOp::Add.is_logic());
    }

    #[test]
    fn test_invoke_kind_tags() {
        assert_eq!(InvokeKind::Interface.tag(), "Interface");
        assert!(InvokeKind::Virtual.is_indirect());
        assert!(!InvokeKind::Special.is_indirect());
    }
}
