//! Main code generator module.
//!
//! This module contains the `Compiler` structure that lowers a typed program
//! into an `IrProgram`: the top-level statements form the entry function,
//! every declared function becomes an `IrFunction` of its own.

use tracing::{debug, info_span, trace};

use crate::{
    errors::errors::InternalError,
    resolver::scope::{ScopeId, SymbolRef},
    type_checker::typed_ast::{TypedFunction, TypedProgram, TypedStmtKind},
    Span,
};

use super::{
    ir::{Instr, IrFunction, IrProgram, Operand, Place},
    stmt::gen_statement,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Fold binary operations whose operands are both literals.
    pub fold_constants: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            fold_constants: true,
        }
    }
}

/// Code generation state.
///
/// Instruction buffer and counters belong to the function being generated
/// and are reset by `finish_function`.
pub struct Compiler<'a> {
    /// The typed program being compiled
    pub program: &'a TypedProgram,
    pub options: &'a CodegenOptions,

    /// Instructions of the current function
    pub instrs: Vec<Instr>,
    /// Next free temporary of the current function
    pub temp_count: u32,
    /// Next free label number of the current function
    pub label_count: u32,
}

impl<'a> Compiler<'a> {
    pub fn new(program: &'a TypedProgram, options: &'a CodegenOptions) -> Self {
        Compiler {
            program,
            options,
            instrs: vec![],
            temp_count: 0,
            label_count: 0,
        }
    }

    pub fn new_temp(&mut self) -> u32 {
        let temp = self.temp_count;
        self.temp_count += 1;
        temp
    }

    /// Number shared by all labels of one `if`, `while` or short-circuit.
    pub fn new_label_id(&mut self) -> u32 {
        let id = self.label_count;
        self.label_count += 1;
        id
    }

    pub fn emit(&mut self, instr: Instr) {
        trace!(%instr, "emit");
        self.instrs.push(instr);
    }

    /// Emits `instr` into a fresh temporary and returns it.
    pub fn emit_temp(&mut self, build: impl FnOnce(u32) -> Instr) -> Operand {
        let temp = self.new_temp();
        self.emit(build(temp));
        Operand::Temp(temp)
    }

    /// Storage of a resolved variable or parameter.
    pub fn place(
        &self,
        symbol: Option<SymbolRef>,
        name: &str,
        span: Span,
    ) -> Result<Place, InternalError> {
        let symbol = symbol.ok_or_else(|| InternalError::UnresolvedIdentifier {
            name: name.to_string(),
            span,
        })?;

        if symbol.scope == ScopeId::GLOBAL {
            Ok(Place::Global(name.to_string()))
        } else {
            Ok(Place::Local(format!("{}.{}", name, symbol.scope)))
        }
    }

    /// Closes the current function, appending a bare `return` unless the
    /// body already ends with one.
    pub fn finish_function(&mut self, name: &str, params: Vec<Place>) -> IrFunction {
        if !matches!(self.instrs.last(), Some(Instr::Return(_))) {
            self.emit(Instr::Return(None));
        }

        let function = IrFunction {
            name: name.to_string(),
            params,
            instrs: std::mem::take(&mut self.instrs),
            temp_count: self.temp_count,
        };
        self.temp_count = 0;
        self.label_count = 0;

        debug!(
            function = %function.name,
            instrs = function.instrs.len(),
            temps = function.temp_count,
            "generated function"
        );
        function
    }

    fn gen_entry(&mut self) -> Result<IrFunction, InternalError> {
        let program = self.program;
        for stmt in &program.body {
            if !matches!(stmt.kind, TypedStmtKind::FunctionDecl(_)) {
                gen_statement(self, stmt)?;
            }
        }
        Ok(self.finish_function(IrProgram::ENTRY, vec![]))
    }

    fn gen_function(&mut self, function: &TypedFunction) -> Result<IrFunction, InternalError> {
        let params = function
            .params
            .iter()
            .map(|param| self.place(param.symbol, &param.name, function.span))
            .collect::<Result<Vec<_>, _>>()?;

        for stmt in &function.body.body {
            gen_statement(self, stmt)?;
        }
        Ok(self.finish_function(&function.name, params))
    }
}

/// Lowers a typed program to IR.
///
/// Fails with an `InternalError` when the program still contains error
/// placeholders or unresolved names: such a program must never reach code
/// generation.
pub fn generate(
    program: &TypedProgram,
    options: &CodegenOptions,
) -> Result<IrProgram, InternalError> {
    let _span = info_span!("generate").entered();
    let mut compiler = Compiler::new(program, options);

    let mut functions = vec![compiler.gen_entry()?];
    for function in program.functions() {
        functions.push(compiler.gen_function(function)?);
    }

    Ok(IrProgram { functions })
}
