use std::fmt::Display;

use crate::ast::ast::{BinaryOp, UnaryOp};

/// Instruction input: a constant or a temporary of the current function.
/// Booleans are the constants `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Const(i64),
    Temp(u32),
}

/// Named storage. Top-level variables are globals; everything else is a
/// local named `name.N` after its declaring scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Place {
    Local(String),
    Global(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Binary {
        dest: u32,
        op: BinaryOp,
        left: Operand,
        right: Operand,
    },
    Unary {
        dest: u32,
        op: UnaryOp,
        operand: Operand,
    },
    Load {
        dest: u32,
        place: Place,
    },
    Store {
        place: Place,
        value: Operand,
    },
    Call {
        dest: Option<u32>,
        function: String,
        args: Vec<Operand>,
    },
    Jump {
        label: String,
    },
    Branch {
        cond: Operand,
        then_label: String,
        else_label: String,
    },
    Label(String),
    Return(Option<Operand>),
}

impl Instr {
    /// Temporary written by this instruction, if any.
    pub fn dest(&self) -> Option<u32> {
        match self {
            Instr::Binary { dest, .. } | Instr::Unary { dest, .. } | Instr::Load { dest, .. } => {
                Some(*dest)
            }
            Instr::Call { dest, .. } => *dest,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<Place>,
    pub instrs: Vec<Instr>,
    pub temp_count: u32,
}

impl IrFunction {
    /// Labels in emission order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.instrs.iter().filter_map(|instr| match instr {
            Instr::Label(label) => Some(label.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrProgram {
    /// The entry function first, then declared functions in source order.
    pub functions: Vec<IrFunction>,
}

impl IrProgram {
    pub const ENTRY: &'static str = "$entry";

    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn entry(&self) -> Option<&IrFunction> {
        self.function(Self::ENTRY)
    }
}

fn op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
        BinaryOp::Rem => "rem",
        BinaryOp::Eq => "eq",
        BinaryOp::Ne => "ne",
        BinaryOp::Lt => "lt",
        BinaryOp::Le => "le",
        BinaryOp::Gt => "gt",
        BinaryOp::Ge => "ge",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Const(value) => write!(f, "{}", value),
            Operand::Temp(temp) => write!(f, "t{}", temp),
        }
    }
}

impl Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Place::Local(name) => write!(f, "%{}", name),
            Place::Global(name) => write!(f, "@{}", name),
        }
    }
}

fn join(operands: &[Operand]) -> String {
    operands
        .iter()
        .map(Operand::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Instr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instr::Binary {
                dest,
                op,
                left,
                right,
            } => write!(f, "  t{} = {} {}, {}", dest, op_name(*op), left, right),
            Instr::Unary { dest, op, operand } => {
                let name = match op {
                    UnaryOp::Neg => "neg",
                    UnaryOp::Not => "not",
                };
                write!(f, "  t{} = {} {}", dest, name, operand)
            }
            Instr::Load { dest, place } => write!(f, "  t{} = load {}", dest, place),
            Instr::Store { place, value } => write!(f, "  store {}, {}", place, value),
            Instr::Call {
                dest: Some(dest),
                function,
                args,
            } => write!(f, "  t{} = call {}({})", dest, function, join(args)),
            Instr::Call {
                dest: None,
                function,
                args,
            } => write!(f, "  call {}({})", function, join(args)),
            Instr::Jump { label } => write!(f, "  jump {}", label),
            Instr::Branch {
                cond,
                then_label,
                else_label,
            } => write!(f, "  branch {}, {}, {}", cond, then_label, else_label),
            Instr::Label(label) => write!(f, "{}:", label),
            Instr::Return(Some(value)) => write!(f, "  return {}", value),
            Instr::Return(None) => write!(f, "  return"),
        }
    }
}

impl Display for IrFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self
            .params
            .iter()
            .map(Place::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "fn {}({}):", self.name, params)?;
        for instr in &self.instrs {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}

impl Display for IrProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, function) in self.functions.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}
