//! rustql-ext shell - call extension functions from the command line
//!
//! Usage: rustql-ext [-cmd LINE] [-sublatin on|na|off]
//!
//! Each input line is `name arg...`. Arguments are NULL, integers, reals or
//! 'quoted text'. A scalar is called once; an aggregate steps once per
//! argument (or per pair of arguments for two-argument aggregates such as
//! covar_samp) and prints the final value.

use rustql_ext::functions::{FunctionContext, FunctionRegistry};
use rustql_ext::{register_extension_functions, register_sublatin, SubLatinFlags, Value};
use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing_subscriber::EnvFilter;

/// Shell state
struct Shell {
    registry: FunctionRegistry,
    ctx: FunctionContext,
    sublatin: SubLatinFlags,
}

impl Shell {
    fn new(sublatin: SubLatinFlags) -> Result<Self, String> {
        let mut shell = Shell {
            registry: FunctionRegistry::new(),
            ctx: FunctionContext::new(),
            sublatin,
        };
        shell.reload()?;
        Ok(shell)
    }

    fn reload(&mut self) -> Result<(), String> {
        let mut registry = FunctionRegistry::new();
        register_extension_functions(&mut registry).map_err(|e| e.to_string())?;
        register_sublatin(&mut registry, self.sublatin).map_err(|e| e.to_string())?;
        self.registry = registry;
        Ok(())
    }

    /// Process a dot command; `false` means exit
    fn process_dot_command(&mut self, line: &str) -> Result<bool, String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(true);
        }

        match parts[0].to_lowercase().as_str() {
            ".quit" | ".exit" | ".q" => return Ok(false),
            ".help" => self.print_help(),
            ".functions" => {
                for (name, n_arg, kind) in self.registry.entries() {
                    println!("{:<20} {:>3}  {:?}", name, n_arg, kind);
                }
            }
            ".sublatin" => match parts.get(1) {
                Some(mode) => {
                    self.sublatin = parse_sublatin(mode)
                        .ok_or_else(|| format!("unknown sublatin mode: {}", mode))?;
                    self.reload()?;
                }
                None => println!("sublatin: {:?}", self.sublatin),
            },
            #[cfg(feature = "fts3")]
            ".tokenize" => {
                let name = parts.get(1).ok_or("usage: .tokenize NAME TEXT")?;
                let text = line
                    .splitn(3, char::is_whitespace)
                    .nth(2)
                    .unwrap_or("")
                    .trim();
                let tokenizer =
                    rustql_ext::fts3::create_tokenizer(name, &[]).map_err(|e| e.to_string())?;
                for token in tokenizer.tokenize(text).map_err(|e| e.to_string())? {
                    println!("{}\t{}\t{}..{}", token.position, token.text, token.start, token.end);
                }
            }
            ".reset" => self.ctx.reset(),
            other => return Err(format!("unknown command: {}", other)),
        }
        Ok(true)
    }

    fn print_help(&self) {
        println!(".functions           List registered functions and collations");
        println!(".help                Show this message");
        println!(".quit                Exit this program");
        println!(".reset               Clear per-statement state (accumulate)");
        println!(".sublatin on|na|off  Override NOCASE/upper/lower/like");
        #[cfg(feature = "fts3")]
        println!(".tokenize NAME TEXT  Show the tokens of TEXT");
        println!();
        println!("Aggregates step once per argument: median 1 2 3");
        println!("Two-argument aggregates take pairs: covar_samp 1,2 2,4 3,6");
    }

    fn execute(&mut self, line: &str) -> Result<(), String> {
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (line, ""),
        };
        let args = parse_args(rest)?;

        let value = if self.registry.find_function(name, args.len() as i32).is_some() {
            self.registry
                .call(&mut self.ctx, name, &args)
                .map_err(|e| e.to_string())?
        } else if let Some(arity) = [1, 2]
            .into_iter()
            .find(|&n| self.registry.find_aggregate(name, n).is_some())
        {
            let rows = aggregate_rows(arity, &args)?;
            self.registry
                .aggregate(name, arity, rows)
                .map_err(|e| e.to_string())?
        } else {
            return Err(format!("no such function: {}", name));
        };

        println!("{}", format_value(&value));
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<bool, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("--") {
            return Ok(true);
        }
        if line.starts_with('.') {
            return self.process_dot_command(line);
        }
        self.execute(line)?;
        Ok(true)
    }

    fn run(&mut self, interactive: bool) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        loop {
            if interactive {
                print!("rustql-ext> ");
                stdout.flush()?;
            }
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            match self.handle_line(&line) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        Ok(())
    }
}

/// Split aggregate arguments into rows of `arity` values each
fn aggregate_rows(arity: i32, args: &[Value]) -> Result<Vec<&[Value]>, String> {
    let width = arity.max(1) as usize;
    if args.len() % width != 0 {
        return Err(format!(
            "{} arguments do not split into rows of {}",
            args.len(),
            width
        ));
    }
    Ok(args.chunks(width).collect())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Blob(b) => format!("x'{}'", hex::encode(b)),
        other => other.to_text(),
    }
}

/// Split a line into values; quoted text uses '' for a literal quote
fn parse_args(input: &str) -> Result<Vec<Value>, String> {
    let mut args = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() || ch == ',' {
            chars.next();
            continue;
        }
        if ch == '\'' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some('\'') if chars.peek() == Some(&'\'') => {
                        chars.next();
                        text.push('\'');
                    }
                    Some('\'') => break,
                    Some(c) => text.push(c),
                    None => return Err("unterminated string".to_string()),
                }
            }
            args.push(Value::Text(text));
            continue;
        }

        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || c == ',' {
                break;
            }
            word.push(c);
            chars.next();
        }
        let value = if word.eq_ignore_ascii_case("null") {
            Value::Null
        } else if let Ok(i) = word.parse::<i64>() {
            Value::Integer(i)
        } else if let Ok(r) = word.parse::<f64>() {
            Value::Real(r)
        } else {
            Value::Text(word)
        };
        args.push(value);
    }

    Ok(args)
}

fn parse_sublatin(mode: &str) -> Option<SubLatinFlags> {
    match mode.to_lowercase().as_str() {
        "on" => Some(SubLatinFlags::LIKE),
        "na" => Some(SubLatinFlags::NA_LIKE),
        "off" => Some(SubLatinFlags::empty()),
        _ => None,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut commands = Vec::new();
    let mut sublatin = SubLatinFlags::empty();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-help" | "--help" | "-?" => {
                println!("Usage: rustql-ext [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -help              Show this help");
                println!("  -version           Show version");
                println!("  -cmd LINE          Run LINE before reading stdin");
                println!("  -sublatin MODE     on, na or off");
                return;
            }
            "-version" | "--version" => {
                println!("rustql-ext {}", rustql_ext::libversion());
                return;
            }
            "-cmd" => {
                i += 1;
                if let Some(line) = args.get(i) {
                    commands.push(line.clone());
                }
            }
            "-sublatin" => {
                i += 1;
                match args.get(i).and_then(|m| parse_sublatin(m)) {
                    Some(flags) => sublatin = flags,
                    None => {
                        eprintln!("Error: -sublatin expects on, na or off");
                        std::process::exit(1);
                    }
                }
            }
            other => {
                eprintln!("Error: unknown option: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut shell = match Shell::new(sublatin) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for line in &commands {
        match shell.handle_line(line) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                eprintln!("Error in -cmd: {}", e);
                std::process::exit(1);
            }
        }
    }

    let interactive = io::stdin().is_terminal();
    if let Err(e) = shell.run(interactive) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(SubLatinFlags::empty()).unwrap()
    }

    #[test]
    fn test_aggregate_rows() {
        let args = parse_args("1, 2, 2, 4, 3, 6").unwrap();
        let rows = aggregate_rows(2, &args).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], &[Value::Integer(2), Value::Integer(4)][..]);
        assert_eq!(aggregate_rows(1, &args).unwrap().len(), 6);
        assert!(aggregate_rows(2, &args[..5]).is_err());
    }

    #[test]
    fn test_execute_two_argument_aggregate() {
        let mut shell = shell();
        assert!(shell.execute("covar_samp 1,2 2,4 3,6").is_ok());
        assert!(shell.execute("covar_samp 1 2 3").is_err());
        assert!(shell.execute("median 3 1 2").is_ok());
        assert!(shell.execute("no_such_thing 1").is_err());
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args("NULL, -3 2.5 'it''s' word").unwrap();
        assert_eq!(
            args,
            vec![
                Value::Null,
                Value::Integer(-3),
                Value::Real(2.5),
                Value::from("it's"),
                Value::from("word"),
            ]
        );
        assert!(parse_args("'open").is_err());
    }
}
