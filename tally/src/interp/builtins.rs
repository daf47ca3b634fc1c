//! Built-in constants and functions seeded into every root context

use super::error::{InterpResult, RuntimeError};
use super::scope::Context;
use super::value::{NativeFn, Value};
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Bind every built-in into the root of `context`. All of them are constants.
pub fn install(context: &mut Context) {
    context.define_constant("pi", Value::Number(std::f64::consts::PI));
    context.define_constant("e", Value::Number(std::f64::consts::E));
    context.define_constant("null", Value::Null);
    context.define_constant("true", Value::Bool(true));
    context.define_constant("false", Value::Bool(false));

    for &(name, func) in BUILTINS {
        context.define_constant(name, Value::native(name, func));
    }
    tracing::trace!(count = BUILTINS.len(), "installed builtins");
}

/// Longest array `arr` will allocate
const MAX_ARRAY_LEN: usize = 1 << 24;

const BUILTINS: &[(&str, NativeFn)] = &[
    // IO
    ("print", builtin_print),
    ("println", builtin_println),
    ("printf", builtin_printf),
    ("sprintf", builtin_sprintf),
    ("scanf", builtin_scanf),
    ("sleep", builtin_sleep),
    ("clear", builtin_clear),
    // Trigonometric and hyperbolic
    ("sin", builtin_sin),
    ("cos", builtin_cos),
    ("tan", builtin_tan),
    ("asin", builtin_asin),
    ("acos", builtin_acos),
    ("atan", builtin_atan),
    ("sinh", builtin_sinh),
    ("cosh", builtin_cosh),
    ("tanh", builtin_tanh),
    // Math
    ("sqrt", builtin_sqrt),
    ("pow", builtin_pow),
    ("abs", builtin_abs),
    ("floor", builtin_floor),
    ("ceil", builtin_ceil),
    ("round", builtin_round),
    ("min", builtin_min),
    ("max", builtin_max),
    ("clamp", builtin_clamp),
    ("random", builtin_random),
    ("log", builtin_log),
    ("log10", builtin_log10),
    ("log2", builtin_log2),
    ("ln", builtin_ln),
    // Strings and arrays
    ("len", builtin_len),
    ("substr", builtin_substr),
    ("replace", builtin_replace),
    ("arr", builtin_arr),
];

// ============ Argument helpers ============

fn expect_arity(name: &str, args: &[Value], expected: usize) -> InterpResult<()> {
    if args.len() == expected {
        return Ok(());
    }
    let expected = match expected {
        1 => "exactly 1 argument".to_string(),
        n => format!("exactly {n} arguments"),
    };
    Err(RuntimeError::arity_mismatch(name, &expected, args.len()))
}

fn number_arg(name: &str, value: &Value) -> InterpResult<f64> {
    value
        .as_number()
        .ok_or_else(|| RuntimeError::type_error(format!("{name}() takes only numbers")))
}

fn string_arg<'a>(name: &str, value: &'a Value) -> InterpResult<&'a str> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::type_error(format!(
            "{name}() expects a string, got {}",
            other.type_name()
        ))),
    }
}

fn numbers(name: &str, args: &[Value]) -> InterpResult<Vec<f64>> {
    args.iter().map(|arg| number_arg(name, arg)).collect()
}

/// One number in, one number out
fn unary_math(name: &str, args: &[Value], op: fn(f64) -> f64) -> InterpResult<Value> {
    expect_arity(name, args, 1)?;
    Ok(Value::Number(op(number_arg(name, &args[0])?)))
}

fn binary_math(name: &str, args: &[Value], op: fn(f64, f64) -> f64) -> InterpResult<Value> {
    expect_arity(name, args, 2)?;
    let a = number_arg(name, &args[0])?;
    let b = number_arg(name, &args[1])?;
    Ok(Value::Number(op(a, b)))
}

fn write_stdout(text: &str) -> InterpResult<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(RuntimeError::io_error)
}

/// Expand `{0}`, `{1}`, ... placeholders. `{{` and `}}` are literal braces.
fn format_positional(name: &str, args: &[Value]) -> InterpResult<String> {
    let Some(first) = args.first() else {
        return Err(RuntimeError::arity_mismatch(name, "at least 1 argument", 0));
    };
    let format = string_arg(name, first)?;
    let values = &args[1..];

    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => digits.push(c),
                        None => {
                            return Err(RuntimeError::invalid_argument(name, "format has an unclosed '{'"));
                        }
                    }
                }
                let index: usize = digits.trim().parse().map_err(|_| {
                    RuntimeError::invalid_argument(name, &format!("format has an invalid placeholder {{{digits}}}"))
                })?;
                let value = values.get(index).ok_or_else(|| {
                    RuntimeError::invalid_argument(name, &format!("format refers to missing argument {index}"))
                })?;
                out.push_str(&value.to_text());
            }
            '}' => {
                return Err(RuntimeError::invalid_argument(name, "format has an unmatched '}'"));
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

// ============ IO ============

fn builtin_print(args: &[Value]) -> InterpResult<Value> {
    let text: String = args.iter().map(|arg| arg.to_string()).collect();
    write_stdout(&text)?;
    Ok(Value::Null)
}

fn builtin_println(args: &[Value]) -> InterpResult<Value> {
    let mut text: String = args.iter().map(|arg| arg.to_string()).collect();
    text.push('\n');
    write_stdout(&text)?;
    Ok(Value::Null)
}

fn builtin_printf(args: &[Value]) -> InterpResult<Value> {
    let text = format_positional("printf", args)?;
    write_stdout(&text)?;
    Ok(Value::Null)
}

fn builtin_sprintf(args: &[Value]) -> InterpResult<Value> {
    format_positional("sprintf", args).map(Value::Str)
}

/// scanf(format) reads one line from stdin and converts it per `%d`, `%f` or `%s`
fn builtin_scanf(args: &[Value]) -> InterpResult<Value> {
    expect_arity("scanf", args, 1)?;
    let format = string_arg("scanf", &args[0])?;
    if !matches!(format, "%d" | "%f" | "%s") {
        return Err(RuntimeError::invalid_argument("scanf", "format was not a valid format"));
    }

    let line = io::stdin()
        .lock()
        .lines()
        .next()
        .ok_or_else(|| RuntimeError::io_error("scanf() failed to read input"))?
        .map_err(RuntimeError::io_error)?;
    let input = line.trim_end_matches('\r');

    let parse_failed = || RuntimeError::invalid_argument("scanf", "failed to parse input");
    match format {
        "%d" => input
            .trim()
            .parse::<i32>()
            .map(|n| Value::Number(f64::from(n)))
            .map_err(|_| parse_failed()),
        "%f" => input
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| parse_failed()),
        _ => Ok(Value::from(input)),
    }
}

fn builtin_sleep(args: &[Value]) -> InterpResult<Value> {
    expect_arity("sleep", args, 1)?;
    let millis = number_arg("sleep", &args[0])?;
    if millis > 0.0 {
        std::thread::sleep(Duration::from_millis(millis as u64));
    }
    Ok(Value::Null)
}

fn builtin_clear(_args: &[Value]) -> InterpResult<Value> {
    write_stdout("\x1B[2J\x1B[1;1H")?;
    Ok(Value::Null)
}

// ============ Trigonometric and hyperbolic ============

fn builtin_sin(args: &[Value]) -> InterpResult<Value> {
    unary_math("sin", args, f64::sin)
}

fn builtin_cos(args: &[Value]) -> InterpResult<Value> {
    unary_math("cos", args, f64::cos)
}

fn builtin_tan(args: &[Value]) -> InterpResult<Value> {
    unary_math("tan", args, f64::tan)
}

fn builtin_asin(args: &[Value]) -> InterpResult<Value> {
    unary_math("asin", args, f64::asin)
}

fn builtin_acos(args: &[Value]) -> InterpResult<Value> {
    unary_math("acos", args, f64::acos)
}

fn builtin_atan(args: &[Value]) -> InterpResult<Value> {
    unary_math("atan", args, f64::atan)
}

fn builtin_sinh(args: &[Value]) -> InterpResult<Value> {
    unary_math("sinh", args, f64::sinh)
}

fn builtin_cosh(args: &[Value]) -> InterpResult<Value> {
    unary_math("cosh", args, f64::cosh)
}

fn builtin_tanh(args: &[Value]) -> InterpResult<Value> {
    unary_math("tanh", args, f64::tanh)
}

// ============ Math ============

/// sqrt(x) or sqrt(x, n) for the n-th root
fn builtin_sqrt(args: &[Value]) -> InterpResult<Value> {
    match args {
        [x] => Ok(Value::Number(number_arg("sqrt", x)?.sqrt())),
        [x, n] => {
            let x = number_arg("sqrt", x)?;
            let n = number_arg("sqrt", n)?;
            Ok(Value::Number(x.powf(1.0 / n)))
        }
        _ => Err(RuntimeError::arity_mismatch("sqrt", "1 or 2 arguments", args.len())),
    }
}

fn builtin_pow(args: &[Value]) -> InterpResult<Value> {
    binary_math("pow", args, f64::powf)
}

fn builtin_abs(args: &[Value]) -> InterpResult<Value> {
    unary_math("abs", args, f64::abs)
}

fn builtin_floor(args: &[Value]) -> InterpResult<Value> {
    unary_math("floor", args, f64::floor)
}

fn builtin_ceil(args: &[Value]) -> InterpResult<Value> {
    unary_math("ceil", args, f64::ceil)
}

/// Halves round to the nearest even number
fn builtin_round(args: &[Value]) -> InterpResult<Value> {
    unary_math("round", args, f64::round_ties_even)
}

fn builtin_min(args: &[Value]) -> InterpResult<Value> {
    if args.len() < 2 {
        return Err(RuntimeError::arity_mismatch("min", "at least 2 arguments", args.len()));
    }
    let values = numbers("min", args)?;
    Ok(Value::Number(values.into_iter().fold(f64::INFINITY, f64::min)))
}

fn builtin_max(args: &[Value]) -> InterpResult<Value> {
    if args.len() < 2 {
        return Err(RuntimeError::arity_mismatch("max", "at least 2 arguments", args.len()));
    }
    let values = numbers("max", args)?;
    Ok(Value::Number(values.into_iter().fold(f64::NEG_INFINITY, f64::max)))
}

/// clamp(value, lo, hi); lo wins when the bounds are inverted
fn builtin_clamp(args: &[Value]) -> InterpResult<Value> {
    expect_arity("clamp", args, 3)?;
    let values = numbers("clamp", args)?;
    let (value, lo, hi) = (values[0], values[1], values[2]);
    let clamped = if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    };
    Ok(Value::Number(clamped))
}

/// Uniform float in [lo, hi)
fn builtin_random(args: &[Value]) -> InterpResult<Value> {
    expect_arity("random", args, 2)?;
    let values = numbers("random", args)?;
    let (lo, hi) = (values[0], values[1]);
    let mut rng = rand::thread_rng();
    Ok(Value::Number(rng.r#gen::<f64>() * (hi - lo) + lo))
}

fn builtin_log(args: &[Value]) -> InterpResult<Value> {
    binary_math("log", args, f64::log)
}

fn builtin_log10(args: &[Value]) -> InterpResult<Value> {
    unary_math("log10", args, f64::log10)
}

fn builtin_log2(args: &[Value]) -> InterpResult<Value> {
    unary_math("log2", args, f64::log2)
}

fn builtin_ln(args: &[Value]) -> InterpResult<Value> {
    unary_math("ln", args, f64::ln)
}

// ============ Strings and arrays ============

/// len(s) counts characters; len(a) counts elements
fn builtin_len(args: &[Value]) -> InterpResult<Value> {
    expect_arity("len", args, 1)?;
    match &args[0] {
        Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(items) => Ok(Value::Number(items.borrow().len() as f64)),
        other => Err(RuntimeError::type_error(format!(
            "len() takes only strings and arrays, got {}",
            other.type_name()
        ))),
    }
}

/// substr(s, start, length), measured in characters
fn builtin_substr(args: &[Value]) -> InterpResult<Value> {
    expect_arity("substr", args, 3)?;
    let text = string_arg("substr", &args[0])?;
    let start = number_arg("substr", &args[1])?.floor();
    let length = number_arg("substr", &args[2])?.floor();

    let count = text.chars().count();
    if start < 0.0 || length < 0.0 || start + length > count as f64 {
        return Err(RuntimeError::index_out_of_bounds(start + length.max(0.0), count));
    }
    let sub: String = text
        .chars()
        .skip(start as usize)
        .take(length as usize)
        .collect();
    Ok(Value::Str(sub))
}

fn builtin_replace(args: &[Value]) -> InterpResult<Value> {
    expect_arity("replace", args, 3)?;
    let text = string_arg("replace", &args[0])?;
    let from = string_arg("replace", &args[1])?;
    let to = string_arg("replace", &args[2])?;
    if from.is_empty() {
        return Err(RuntimeError::invalid_argument("replace", "cannot replace an empty string"));
    }
    Ok(Value::Str(text.replace(from, to)))
}

/// arr(n) or arr(n, fill). Every slot starts as the same fill value, so an
/// array fill is shared by all slots.
fn builtin_arr(args: &[Value]) -> InterpResult<Value> {
    let (length, fill) = match args {
        [n] => (n, Value::Null),
        [n, fill] => (n, fill.clone()),
        _ => return Err(RuntimeError::arity_mismatch("arr", "1 or 2 arguments", args.len())),
    };
    let length = number_arg("arr", length)?;
    if length < 0.0 || length.is_nan() {
        return Err(RuntimeError::invalid_argument("arr", "length cannot be negative"));
    }
    if length > MAX_ARRAY_LEN as f64 {
        return Err(RuntimeError::invalid_argument("arr", "length is too large"));
    }
    let length = length as usize;
    let mut items = Vec::new();
    items
        .try_reserve_exact(length)
        .map_err(|_| RuntimeError::invalid_argument("arr", "length is too large"))?;
    items.resize(length, fill);
    Ok(Value::array(items))
}
