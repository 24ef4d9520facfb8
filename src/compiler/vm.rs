//! Interpreter for the IR.
//!
//! Runs `$entry` of an `IrProgram` and collects what the program prints.
//! Arithmetic is checked: overflow and division by zero stop execution with
//! a `VmError` instead of wrapping.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::ast::{BinaryOp, UnaryOp};

use super::ir::{Instr, IrFunction, IrProgram, Operand, Place};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("program has no entry function")]
    MissingEntry,
    #[error("call to unknown function `{name}`")]
    UnknownFunction { name: String },
    #[error("function `{name}` expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("jump to unknown label `{label}` in `{function}`")]
    UnknownLabel { function: String, label: String },
    #[error("temporary t{temp} read before it was written in `{function}`")]
    UndefinedTemp { function: String, temp: u32 },
    #[error("`{place}` read before it was written")]
    UninitializedPlace { place: String },
    #[error("function `{function}` returned no value")]
    MissingValue { function: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("call depth exceeded {limit}")]
    StackOverflow { limit: usize },
    #[error("step limit of {limit} exceeded")]
    StepLimit { limit: u64 },
}

const MAX_DEPTH: usize = 512;
const DEFAULT_STEP_LIMIT: u64 = 10_000_000;

pub struct Vm<'p> {
    functions: HashMap<&'p str, &'p IrFunction>,
    labels: HashMap<&'p str, HashMap<&'p str, usize>>,
    globals: HashMap<String, i64>,
    output: Vec<i64>,
    steps: u64,
    step_limit: u64,
    depth: usize,
}

struct Frame<'p> {
    function: &'p IrFunction,
    temps: Vec<Option<i64>>,
    locals: HashMap<&'p str, i64>,
}

impl<'p> Frame<'p> {
    fn read(&self, operand: Operand) -> Result<i64, VmError> {
        match operand {
            Operand::Const(value) => Ok(value),
            Operand::Temp(temp) => self
                .temps
                .get(temp as usize)
                .copied()
                .flatten()
                .ok_or_else(|| VmError::UndefinedTemp {
                    function: self.function.name.clone(),
                    temp,
                }),
        }
    }

    fn write(&mut self, temp: u32, value: i64) {
        let index = temp as usize;
        if index >= self.temps.len() {
            self.temps.resize(index + 1, None);
        }
        self.temps[index] = Some(value);
    }
}

fn binary(op: BinaryOp, left: i64, right: i64) -> Result<i64, VmError> {
    let value = match op {
        BinaryOp::Add => left.checked_add(right).ok_or(VmError::Overflow)?,
        BinaryOp::Sub => left.checked_sub(right).ok_or(VmError::Overflow)?,
        BinaryOp::Mul => left.checked_mul(right).ok_or(VmError::Overflow)?,
        BinaryOp::Div | BinaryOp::Rem if right == 0 => return Err(VmError::DivisionByZero),
        BinaryOp::Div => left.checked_div(right).ok_or(VmError::Overflow)?,
        BinaryOp::Rem => left.checked_rem(right).ok_or(VmError::Overflow)?,
        BinaryOp::Eq => (left == right) as i64,
        BinaryOp::Ne => (left != right) as i64,
        BinaryOp::Lt => (left < right) as i64,
        BinaryOp::Le => (left <= right) as i64,
        BinaryOp::Gt => (left > right) as i64,
        BinaryOp::Ge => (left >= right) as i64,
        BinaryOp::And => (left != 0 && right != 0) as i64,
        BinaryOp::Or => (left != 0 || right != 0) as i64,
    };
    Ok(value)
}

impl<'p> Vm<'p> {
    pub fn new(program: &'p IrProgram) -> Self {
        let mut functions = HashMap::new();
        let mut labels = HashMap::new();

        for function in &program.functions {
            functions.insert(function.name.as_str(), function);
            let targets = function
                .instrs
                .iter()
                .enumerate()
                .filter_map(|(index, instr)| match instr {
                    Instr::Label(label) => Some((label.as_str(), index)),
                    _ => None,
                })
                .collect();
            labels.insert(function.name.as_str(), targets);
        }

        Vm {
            functions,
            labels,
            globals: HashMap::new(),
            output: vec![],
            steps: 0,
            step_limit: DEFAULT_STEP_LIMIT,
            depth: 0,
        }
    }

    pub fn with_step_limit(mut self, step_limit: u64) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Runs the entry function and returns the printed values.
    pub fn run(mut self) -> Result<Vec<i64>, VmError> {
        self.call(IrProgram::ENTRY, vec![])?;
        debug!(steps = self.steps, printed = self.output.len(), "program finished");
        Ok(self.output)
    }

    fn call(&mut self, name: &str, args: Vec<i64>) -> Result<Option<i64>, VmError> {
        if name == "print" {
            let value = args.first().copied().ok_or(VmError::ArityMismatch {
                name: name.to_string(),
                expected: 1,
                found: 0,
            })?;
            trace!(value, "print");
            self.output.push(value);
            return Ok(None);
        }

        let function = match self.functions.get(name) {
            Some(function) => *function,
            None if name == IrProgram::ENTRY => return Err(VmError::MissingEntry),
            None => {
                return Err(VmError::UnknownFunction {
                    name: name.to_string(),
                })
            }
        };
        if function.params.len() != args.len() {
            return Err(VmError::ArityMismatch {
                name: name.to_string(),
                expected: function.params.len(),
                found: args.len(),
            });
        }
        if self.depth >= MAX_DEPTH {
            return Err(VmError::StackOverflow { limit: MAX_DEPTH });
        }

        let mut frame = Frame {
            function,
            temps: vec![None; function.temp_count as usize],
            locals: HashMap::new(),
        };
        for (param, value) in function.params.iter().zip(args) {
            if let Place::Local(name) = param {
                frame.locals.insert(name.as_str(), value);
            }
        }

        self.depth += 1;
        let result = self.execute(&mut frame);
        self.depth -= 1;
        result
    }

    fn load(&self, frame: &Frame<'p>, place: &Place) -> Result<i64, VmError> {
        let value = match place {
            Place::Local(name) => frame.locals.get(name.as_str()).copied(),
            Place::Global(name) => self.globals.get(name).copied(),
        };
        value.ok_or_else(|| VmError::UninitializedPlace {
            place: place.to_string(),
        })
    }

    fn jump(&self, frame: &Frame<'p>, label: &str) -> Result<usize, VmError> {
        self.labels
            .get(frame.function.name.as_str())
            .and_then(|labels| labels.get(label))
            .copied()
            .ok_or_else(|| VmError::UnknownLabel {
                function: frame.function.name.clone(),
                label: label.to_string(),
            })
    }

    fn execute(&mut self, frame: &mut Frame<'p>) -> Result<Option<i64>, VmError> {
        let function = frame.function;
        let mut pc = 0;

        while let Some(instr) = function.instrs.get(pc) {
            self.steps += 1;
            if self.steps > self.step_limit {
                return Err(VmError::StepLimit {
                    limit: self.step_limit,
                });
            }
            pc += 1;

            match instr {
                Instr::Binary {
                    dest,
                    op,
                    left,
                    right,
                } => {
                    let value = binary(*op, frame.read(*left)?, frame.read(*right)?)?;
                    frame.write(*dest, value);
                }
                Instr::Unary { dest, op, operand } => {
                    let operand = frame.read(*operand)?;
                    let value = match op {
                        UnaryOp::Neg => operand.checked_neg().ok_or(VmError::Overflow)?,
                        UnaryOp::Not => (operand == 0) as i64,
                    };
                    frame.write(*dest, value);
                }
                Instr::Load { dest, place } => {
                    let value = self.load(frame, place)?;
                    frame.write(*dest, value);
                }
                Instr::Store { place, value } => {
                    let value = frame.read(*value)?;
                    match place {
                        Place::Local(name) => {
                            frame.locals.insert(name.as_str(), value);
                        }
                        Place::Global(name) => {
                            self.globals.insert(name.clone(), value);
                        }
                    }
                }
                Instr::Call {
                    dest,
                    function: callee,
                    args,
                } => {
                    let args = args
                        .iter()
                        .map(|arg| frame.read(*arg))
                        .collect::<Result<Vec<_>, _>>()?;
                    let result = self.call(callee, args)?;
                    if let Some(dest) = dest {
                        let value = result.ok_or_else(|| VmError::MissingValue {
                            function: callee.clone(),
                        })?;
                        frame.write(*dest, value);
                    }
                }
                Instr::Jump { label } => pc = self.jump(frame, label)?,
                Instr::Branch {
                    cond,
                    then_label,
                    else_label,
                } => {
                    let label = if frame.read(*cond)? != 0 {
                        then_label
                    } else {
                        else_label
                    };
                    pc = self.jump(frame, label)?;
                }
                Instr::Label(_) => {}
                Instr::Return(value) => {
                    return match value {
                        Some(value) => Ok(Some(frame.read(*value)?)),
                        None => Ok(None),
                    };
                }
            }
        }

        Ok(None)
    }
}

/// Runs `program` and returns everything it printed.
pub fn run(program: &IrProgram) -> Result<Vec<i64>, VmError> {
    Vm::new(program).run()
}
