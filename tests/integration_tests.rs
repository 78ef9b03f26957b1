use jackc::codegen::render;
use jackc::lexer::TokenKind;
use jackc::{compile, translate, CompileError, TraceOptions};

fn vm(source: &str) -> Vec<String> {
    compile(source)
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn wrap_in_main(locals: &str, body: &str) -> String {
    format!("class Main {{ function void main() {{ {locals} {body} return; }} }}")
}

/// Commands between the function header and the trailing `push constant 0` / `return`.
fn main_body(locals: &str, body: &str) -> Vec<String> {
    let mut lines = vm(&wrap_in_main(locals, body));
    assert!(lines[0].starts_with("function Main.main"));
    lines.truncate(lines.len() - 2);
    lines.remove(0);
    lines
}

#[test]
fn empty_function() {
    assert_eq!(
        vm("class Main { function void main() { return; } }"),
        ["function Main.main 0", "push constant 0", "return"]
    );
}

#[test]
fn method_argument_is_shifted_past_the_receiver() {
    let source = "
class Point {
    method void set(int x) {
        let x = x;
        return;
    }
}";
    assert_eq!(
        vm(source),
        [
            "function Point.set 0",
            "push argument 0",
            "pop pointer 0",
            "push argument 1",
            "pop argument 1",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn array_store() {
    assert_eq!(
        main_body(
            "var Array arr;",
            "let arr = Array.new(3); let arr[2] = 5;"
        ),
        [
            "push constant 3",
            "call Array.new 1",
            "pop local 0",
            "push local 0",
            "push constant 2",
            "add",
            "push constant 5",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
        ]
    );
}

#[test]
fn array_copy_reads_before_storing() {
    assert_eq!(
        main_body("var Array a, b; var int i, j;", "let a[i] = b[j];"),
        [
            "push local 0",
            "push local 2",
            "add",
            "push local 1",
            "push local 3",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
        ]
    );
}

#[test]
fn array_read_with_expression_index() {
    assert_eq!(
        main_body("var Array b; var int a, i;", "let a = b[i + 1];"),
        [
            "push local 0",
            "push local 2",
            "push constant 1",
            "add",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop local 1",
        ]
    );
}

#[test]
fn string_constant() {
    assert_eq!(
        main_body("", "do Output.printString(\"ab\");"),
        [
            "push constant 2",
            "call String.new 1",
            "push constant 97",
            "call String.appendChar 2",
            "push constant 98",
            "call String.appendChar 2",
            "call Output.printString 1",
            "pop temp 0",
        ]
    );
}

#[test]
fn string_constant_keeps_spaces_and_punctuation() {
    let lines = main_body("", "do Output.printString(\"a, b\");");
    assert_eq!(lines[0], "push constant 4");
    let codes: Vec<_> = lines
        .iter()
        .filter(|l| l.starts_with("push constant"))
        .skip(1)
        .cloned()
        .collect();
    assert_eq!(
        codes,
        [
            "push constant 97",
            "push constant 44",
            "push constant 32",
            "push constant 98"
        ]
    );
}

#[test]
fn keyword_constants() {
    assert_eq!(
        main_body(
            "var boolean a; var Point p;",
            "let a = true; let a = false; let p = null;"
        ),
        [
            "push constant 0",
            "not",
            "pop local 0",
            "push constant 0",
            "pop local 0",
            "push constant 0",
            "pop local 1",
        ]
    );
}

#[test]
fn operators_apply_left_to_right() {
    assert_eq!(
        main_body("var int x;", "let x = 1 + 2 * 3 - -x / 4;"),
        [
            "push constant 1",
            "push constant 2",
            "add",
            "push constant 3",
            "call Math.multiply 2",
            "push local 0",
            "neg",
            "sub",
            "push constant 4",
            "call Math.divide 2",
            "pop local 0",
        ]
    );
}

#[test]
fn comparison_and_logic_operators() {
    assert_eq!(
        main_body(
            "var boolean b; var int x;",
            "let b = (x < 1) | (x > 2) & ~(x = 3);"
        ),
        [
            "push local 1",
            "push constant 1",
            "lt",
            "push local 1",
            "push constant 2",
            "gt",
            "or",
            "push local 1",
            "push constant 3",
            "eq",
            "not",
            "and",
            "pop local 0",
        ]
    );
}

#[test]
fn point_class() {
    let source = "
// A point in the plane.
class Point {
    field int x, y;
    static int count;

    /** Creates a point and counts it. */
    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        let count = count + 1;
        return this;
    }

    method int getX() { return x; }

    method int distance(Point other) {
        var int dx, dy;
        let dx = x - other.getX();
        let dy = y - other.getY();
        return Math.sqrt((dx * dx) + (dy * dy));
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Point.new 0",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push static 0",
            "push constant 1",
            "add",
            "pop static 0",
            "push pointer 0",
            "return",
            "function Point.getX 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "return",
            "function Point.distance 2",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push argument 1",
            "call Point.getX 1",
            "sub",
            "pop local 0",
            "push this 1",
            "push argument 1",
            "call Point.getY 1",
            "sub",
            "pop local 1",
            "push local 0",
            "push local 0",
            "call Math.multiply 2",
            "push local 1",
            "push local 1",
            "call Math.multiply 2",
            "add",
            "call Math.sqrt 1",
            "return",
        ]
    );
}

#[test]
fn control_flow_labels() {
    let source = "
class Main {
    function int f(int n) {
        var int i;
        let i = 0;
        while (i < n) {
            if (i = 2) { let i = i + 2; } else { let i = i + 1; }
        }
        if (~(n > 0)) { return 0; }
        return i;
    }

    function void g() {
        while (true) { do Main.f(1); }
        return;
    }
}
";
    let expected = "\
function Main.f 1
push constant 0
pop local 0
label WHILE_EXP0
push local 0
push argument 0
lt
not
if-goto WHILE_END0
push local 0
push constant 2
eq
if-goto IF_TRUE0
goto IF_FALSE0
label IF_TRUE0
push local 0
push constant 2
add
pop local 0
goto IF_END0
label IF_FALSE0
push local 0
push constant 1
add
pop local 0
label IF_END0
goto WHILE_EXP0
label WHILE_END0
push argument 0
push constant 0
gt
not
if-goto IF_TRUE1
goto IF_FALSE1
label IF_TRUE1
push constant 0
return
label IF_FALSE1
push local 0
return
function Main.g 0
label WHILE_EXP0
push constant 0
not
not
if-goto WHILE_END0
push constant 1
call Main.f 1
pop temp 0
goto WHILE_EXP0
label WHILE_END0
push constant 0
return
";
    assert_eq!(render(&compile(source).unwrap()), expected);
}

#[test]
fn bare_call_is_a_method_call_on_this() {
    let source = "
class Game {
    field Square square;

    method void run() {
        do move();
        do square.resize(2, 3);
        do draw(square);
        return;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Game.run 0",
            "push argument 0",
            "pop pointer 0",
            "push pointer 0",
            "call Game.move 1",
            "pop temp 0",
            "push this 0",
            "push constant 2",
            "push constant 3",
            "call Square.resize 3",
            "pop temp 0",
            "push pointer 0",
            "push this 0",
            "call Game.draw 2",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn call_result_inside_expression() {
    assert_eq!(
        main_body("var int x;", "let x = Math.max(x, 3) + 1;"),
        [
            "push local 0",
            "push constant 3",
            "call Math.max 2",
            "push constant 1",
            "add",
            "pop local 0",
        ]
    );
}

#[test]
fn local_count_sums_every_var_declaration() {
    let lines = vm("
class Main {
    function void main() {
        var int a, b;
        var Array c;
        var boolean d, e, f;
        return;
    }
}");
    assert_eq!(lines[0], "function Main.main 6");
}

#[test]
fn constructor_allocates_field_count() {
    let lines = vm("
class Box {
    field int w, h, d;
    static int made;
    constructor Box new() { return this; }
}");
    assert_eq!(
        &lines[..4],
        [
            "function Box.new 0",
            "push constant 3",
            "call Memory.alloc 1",
            "pop pointer 0"
        ]
    );
}

#[test]
fn comments_are_ignored() {
    let source = "
/** Entry point.
 * Does nothing.
 */
class Main {
    // nothing here
    function void main() { // trailing comment
        return; // done
    }
}
";
    assert_eq!(
        vm(source),
        ["function Main.main 0", "push constant 0", "return"]
    );
}

#[test]
fn expression_continued_on_a_line_starting_with_star() {
    assert_eq!(
        main_body("var int x;", "let x = 2\n * 3\n + 1;"),
        [
            "push constant 2",
            "push constant 3",
            "call Math.multiply 2",
            "push constant 1",
            "add",
            "pop local 0"
        ]
    );
}

#[test]
fn undeclared_variable_is_an_error() {
    let err = compile("class Main { function void main() { let y = 1; return; } }").unwrap_err();
    assert_eq!(
        err,
        CompileError::UndeclaredIdentifier {
            position: 10,
            name: "y".into()
        }
    );
}

#[test]
fn undeclared_variable_in_expression_is_an_error() {
    let err = compile("class Main { function int main() { return z; } }").unwrap_err();
    assert!(matches!(err, CompileError::UndeclaredIdentifier { ref name, .. } if name == "z"));
}

#[test]
fn missing_expression_is_an_invalid_term() {
    let err = compile("class Main { function void main() { return } }").unwrap_err();
    assert_eq!(
        err,
        CompileError::InvalidTerm {
            position: 10,
            found: "}".into(),
            kind: TokenKind::Symbol
        }
    );
}

#[test]
fn keyword_that_is_not_a_constant_is_an_invalid_term() {
    let err = compile("class Main { function int main() { return class; } }").unwrap_err();
    assert!(matches!(err, CompileError::InvalidTerm { kind: TokenKind::Keyword, .. }));
}

#[test]
fn class_name_must_be_an_identifier() {
    let err = compile("class 42 { }").unwrap_err();
    assert_eq!(
        err,
        CompileError::ExpectedIdentifier {
            position: 1,
            found: "42".into(),
            kind: TokenKind::IntegerConstant
        }
    );
}

#[test]
fn wrong_symbol_is_an_unexpected_token() {
    let err = compile("class Main ( }").unwrap_err();
    assert_eq!(
        err,
        CompileError::UnexpectedToken {
            position: 2,
            found: "(".into(),
            kind: TokenKind::Symbol,
            expected: vec!["'{'".into()]
        }
    );
}

#[test]
fn unknown_statement_lists_the_alternatives() {
    let err = compile("class Main { function void main() { foo; } }").unwrap_err();
    let CompileError::UnexpectedToken {
        position, expected, ..
    } = err
    else {
        panic!("expected an unexpected token error");
    };
    assert_eq!(position, 9);
    assert!(expected.contains(&"'let'".to_string()));
    assert!(expected.contains(&"'}'".to_string()));
}

#[test]
fn truncated_input_is_an_unexpected_eof() {
    let err = compile("class Main { function void main() { return; }").unwrap_err();
    assert!(matches!(err, CompileError::UnexpectedEof { .. }));
}

#[test]
fn tokens_after_the_class_are_rejected() {
    let err = compile("class A { } class B { }").unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnexpectedToken { position: 4, .. }
    ));
}

#[test]
fn integer_constant_out_of_range() {
    assert!(compile("class Main { function int main() { return 32767; } }").is_ok());
    let err = compile("class Main { function int main() { return 32768; } }").unwrap_err();
    assert_eq!(
        err,
        CompileError::IntegerOverflow {
            position: 10,
            value: "32768".into()
        }
    );
}

#[test]
fn string_character_out_of_range() {
    let accented = "class Main { function void main() { do Output.printString(\"caf\u{e9}\"); return; } }";
    assert!(compile(accented).is_ok());

    let emoji = "class Main { function void main() { do Output.printString(\"hi \u{1F600}\"); return; } }";
    assert_eq!(
        compile(emoji).unwrap_err(),
        CompileError::InvalidCharacter {
            position: 14,
            found: '\u{1F600}'
        }
    );
}

#[test]
fn parse_tree_trace() {
    let translation = translate(
        "class Main { function void main() { return; } }",
        TraceOptions {
            tokens: false,
            parse_tree: true,
        },
    )
    .unwrap();
    assert!(translation.tokens_xml.is_none());
    assert_eq!(
        translation.parse_tree_xml.unwrap(),
        "\
<class>
  <keyword> class </keyword>
  <identifier> Main </identifier>
  <symbol> { </symbol>
  <subroutineDec>
    <keyword> function </keyword>
    <keyword> void </keyword>
    <identifier> main </identifier>
    <symbol> ( </symbol>
    <parameterList>
    </parameterList>
    <symbol> ) </symbol>
    <subroutineBody>
      <symbol> { </symbol>
      <statements>
        <returnStatement>
          <keyword> return </keyword>
          <symbol> ; </symbol>
        </returnStatement>
      </statements>
      <symbol> } </symbol>
    </subroutineBody>
  </subroutineDec>
  <symbol> } </symbol>
</class>
"
    );
}

#[test]
fn parse_tree_of_do_statement_has_no_term_wrapper() {
    let translation = translate(
        "class Main { function void main() { do Sys.halt(); return; } }",
        TraceOptions {
            tokens: true,
            parse_tree: true,
        },
    )
    .unwrap();
    let tree = translation.parse_tree_xml.unwrap();
    assert!(tree.contains(
        "<doStatement>
          <keyword> do </keyword>
          <identifier> Sys </identifier>
          <symbol> . </symbol>
          <identifier> halt </identifier>
          <symbol> ( </symbol>
          <expressionList>
          </expressionList>
          <symbol> ) </symbol>
          <symbol> ; </symbol>
        </doStatement>"
    ));
    assert!(translation
        .tokens_xml
        .unwrap()
        .starts_with("<tokens>\n<keyword> class </keyword>\n"));
}

#[test]
fn traces_do_not_change_the_instruction_stream() {
    let source = "
class Main {
    function void main() {
        var Array a;
        let a = Array.new(2);
        let a[0] = \"x<y\";
        if (a[0] = null) { do Sys.halt(); }
        return;
    }
}";
    let plain = compile(source).unwrap();
    let traced = translate(
        source,
        TraceOptions {
            tokens: true,
            parse_tree: true,
        },
    )
    .unwrap();
    assert_eq!(plain, traced.commands);
    assert!(traced
        .tokens_xml
        .unwrap()
        .contains("<stringConstant> x&lt;y </stringConstant>"));
}
