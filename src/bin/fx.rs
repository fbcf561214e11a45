use formexpr::{evaluate, EvalOptions, ExprVal, StaticDataSources, Value};
use serde_json::json;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("Usage: fx 'EXPRESSION_JSON' [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data FILE          Load data sources from a JSON file");
    eprintln!("  --data-json JSON     Data sources as an inline JSON string");
    eprintln!("  --return-type TYPE   boolean, string, number, date or any (default any)");
    eprintln!("  --default JSON       Value returned when the result is null or evaluation fails");
    eprintln!("  --positional JSON    JSON array of positional arguments for argv");
    eprintln!("  --intro TEXT         Text prepended to recovered error reports");
    eprintln!("  --output-json        Output result in JSON format with type and timing");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  fx '[\"concat\", \"a\", \"b\"]'");
    eprintln!("  fx '[\"equals\", [\"dataModel\", \"age\"], 18]' --data-json '{{\"defaultDataType\": \"m\", \"dataModels\": {{\"m\": {{\"age\": \"18\"}}}}}}'");
    eprintln!("  fx '[\"round\", 2.5]' --return-type number --output-json");
    eprintln!();
    eprintln!("Set FX_LOG to control diagnostics (e.g. FX_LOG=trace).");
    std::process::exit(1);
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn parse_json(flag: &str, raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|e| fail(format!("{} expects JSON: {}", flag, e)))
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) => v.as_str(),
        None => fail(format!("{} flag requires an argument", flag)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("FX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut expr_text: Option<&str> = None;
    let mut sources = StaticDataSources::new();
    let mut return_type = ExprVal::Any;
    let mut default_value: Option<Value> = None;
    let mut positional: Option<Vec<Value>> = None;
    let mut intro: Option<String> = None;
    let mut output_json = false;
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--data" => {
                let path = flag_value(&args, i, arg);
                let content = std::fs::read_to_string(path)
                    .unwrap_or_else(|e| fail(format!("cannot read {}: {}", path, e)));
                sources = StaticDataSources::from_json(&content)
                    .unwrap_or_else(|e| fail(format!("invalid data file {}: {}", path, e)));
                i += 1;
            }
            "--data-json" => {
                sources = StaticDataSources::from_json(flag_value(&args, i, arg))
                    .unwrap_or_else(|e| fail(format!("invalid --data-json: {}", e)));
                i += 1;
            }
            "--return-type" => {
                return_type = flag_value(&args, i, arg).parse().unwrap_or_else(|e: String| fail(e));
                i += 1;
            }
            "--default" => {
                default_value = Some(Value::from(parse_json(arg, flag_value(&args, i, arg))));
                i += 1;
            }
            "--positional" => {
                match parse_json(arg, flag_value(&args, i, arg)) {
                    serde_json::Value::Array(items) => positional = Some(items.into_iter().map(Value::from).collect()),
                    _ => fail("--positional expects a JSON array"),
                }
                i += 1;
            }
            "--intro" => {
                intro = Some(flag_value(&args, i, arg).to_string());
                i += 1;
            }
            "--output-json" => output_json = true,
            "-h" | "--help" => usage(),
            _ if expr_text.is_none() && !arg.starts_with("--") => expr_text = Some(arg),
            _ => fail(format!("unexpected argument '{}'", arg)),
        }
        i += 1;
    }

    let expr_text = expr_text.unwrap_or_else(|| usage());
    let expr = parse_json("expression", expr_text);

    let mut options = EvalOptions::new().with_return_type(return_type);
    if let Some(default) = default_value {
        options = options.with_default(default);
    }
    if let Some(intro) = intro {
        options = options.with_error_intro(intro);
    }
    if let Some(positional) = positional.as_deref() {
        options = options.with_positional_arguments(positional);
    }

    let start_time = Instant::now();
    let result = evaluate(&expr, &sources, &options);
    let execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(val) => {
            if output_json {
                println!("{}", format_json_output(&val, execution_time_ms));
            } else {
                println!("{}", val);
            }
        }
        Err(e) => {
            eprintln!("{}", e.render());
            std::process::exit(2);
        }
    }
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Date(_) => "date",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn format_json_output(value: &Value, execution_time_ms: f64) -> String {
    let output = json!({
        "result": value.to_json(),
        "type": type_label(value),
        "execution_time": format!("{:.2} ms", execution_time_ms)
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
