use std::fmt;

/// Storage region of the stack machine, addressed by segment + index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        };
        f.write_str(s)
    }
}

/// One line of the instruction stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Push(Segment, usize),
    Pop(Segment, usize),
    Arithmetic(ArithmeticOp),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, usize),
    Call(String, usize),
    Return,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Push(segment, index) => write!(f, "push {segment} {index}"),
            Command::Pop(segment, index) => write!(f, "pop {segment} {index}"),
            Command::Arithmetic(op) => write!(f, "{op}"),
            Command::Label(label) => write!(f, "label {label}"),
            Command::Goto(label) => write!(f, "goto {label}"),
            Command::IfGoto(label) => write!(f, "if-goto {label}"),
            Command::Function(name, locals) => write!(f, "function {name} {locals}"),
            Command::Call(name, args) => write!(f, "call {name} {args}"),
            Command::Return => write!(f, "return"),
        }
    }
}
