//! REPL (Read-Eval-Print Loop) for Tally

use crate::error::{report_syntax_error, Error};
use crate::interp::{evaluate, Context, Value};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io;
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".tally_history";
const SOURCE_NAME: &str = "<stdin>";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    /// One root context for the whole session
    context: Context,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            context: Context::new(SOURCE_NAME),
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Tally REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.eval_line(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                print_help();
                false
            }
            ":clear" => {
                self.context.reset();
                println!("Session cleared.");
                false
            }
            ":vars" => {
                for (name, value) in self.context.globals() {
                    println!("{name} = {value}");
                }
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    /// Evaluate one line against the session context and print the outcome.
    /// Errors are reported and the session carries on.
    fn eval_line(&mut self, line: &str) -> Option<Value> {
        match evaluate(line, SOURCE_NAME, &mut self.context) {
            Ok(value) => {
                if !value.is_null() {
                    println!("{value}");
                }
                Some(value)
            }
            Err(Error::Syntax(err)) => {
                let _ = report_syntax_error(SOURCE_NAME, line, &err, io::stderr());
                None
            }
            Err(Error::Runtime(err)) => {
                eprintln!("{}", err.traceback());
                None
            }
        }
    }
}

fn print_help() {
    println!("Tally REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :quit, :q       Exit the REPL");
    println!("  :clear          Forget every variable and function");
    println!("  :vars           List the variables defined so far");
    println!();
    println!("You can enter:");
    println!("  - Expressions: 1 + 2 * 3, \"a\" + \"b\"");
    println!("  - Statements: let x = 5; for (i = 0; i < 3; i++) println(i);");
    println!("  - Function definitions: func add(a, b) {{ return a + b; }}");
    println!();
    println!("Built-in functions:");
    println!("  print, println, printf, sprintf, scanf, sleep, clear");
    println!("  sin, cos, tan, asin, acos, atan, sinh, cosh, tanh");
    println!("  sqrt, pow, abs, floor, ceil, round, min, max, clamp, random");
    println!("  log, log10, log2, ln, len, substr, replace, arr");
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
