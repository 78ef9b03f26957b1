use std::io::{self, Write};

use super::{ArithmeticOp, Command, Segment};

/// Instruction sink. Commands are kept in emission order.
#[derive(Debug, Default)]
pub struct VmWriter {
    commands: Vec<Command>,
}

impl VmWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn push(&mut self, segment: Segment, index: usize) {
        self.emit(Command::Push(segment, index));
    }

    pub fn pop(&mut self, segment: Segment, index: usize) {
        self.emit(Command::Pop(segment, index));
    }

    pub fn arithmetic(&mut self, op: ArithmeticOp) {
        self.emit(Command::Arithmetic(op));
    }

    pub fn label(&mut self, label: &str) {
        self.emit(Command::Label(label.to_string()));
    }

    pub fn goto(&mut self, label: &str) {
        self.emit(Command::Goto(label.to_string()));
    }

    pub fn if_goto(&mut self, label: &str) {
        self.emit(Command::IfGoto(label.to_string()));
    }

    pub fn call(&mut self, name: &str, args: usize) {
        self.emit(Command::Call(name.to_string(), args));
    }

    pub fn function(&mut self, name: &str, locals: usize) {
        log::trace!("function {name} {locals}");
        self.emit(Command::Function(name.to_string(), locals));
    }

    pub fn ret(&mut self) {
        self.emit(Command::Return);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

/// Newline terminated text, one command per line.
pub fn render(commands: &[Command]) -> String {
    let mut out = String::new();
    for command in commands {
        out.push_str(&command.to_string());
        out.push('\n');
    }
    out
}

pub fn write_commands<W: Write>(out: &mut W, commands: &[Command]) -> io::Result<()> {
    for command in commands {
        writeln!(out, "{command}")?;
    }
    out.flush()
}
