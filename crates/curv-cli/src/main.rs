//! The reference `curv` command-line front-end (spec.md §6): `--version`,
//! `-o <format>` to select an exporter, `-O <k>=<v>` rendering options,
//! `-x <expr>` to evaluate a literal expression instead of a file, and
//! otherwise a positional `.curv`/`.gpu`/directory path.

use std::{env, process::ExitCode, rc::Rc, time::Instant};

use curv::{
    gpu_json,
    source::{Source, SourceKind},
    system::System,
    Program,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Args {
    output_format: Option<String>,
    render_options: Vec<(String, String)>,
    expr: Option<String>,
    file: Option<String>,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut output_format = None;
    let mut render_options = Vec::new();
    let mut expr = None;
    let mut file = None;

    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "--version" => {
                println!("curv {VERSION}");
                std::process::exit(0);
            }
            "-o" => {
                i += 1;
                let value = raw.get(i).ok_or("-o: missing format argument")?;
                output_format = Some(value.clone());
            }
            "-O" => {
                i += 1;
                let kv = raw.get(i).ok_or("-O: missing k=v argument")?;
                let (k, v) = kv.split_once('=').ok_or_else(|| format!("-O: expected k=v, got '{kv}'"))?;
                render_options.push((k.to_string(), v.to_string()));
            }
            "-x" => {
                i += 1;
                let rest = raw.get(i..).ok_or("-x: missing expression argument")?;
                expr = Some(rest.join(" "));
                i = raw.len();
                continue;
            }
            other => {
                if file.is_none() {
                    file = Some(other.to_string());
                } else {
                    return Err(format!("unexpected argument '{other}'"));
                }
            }
        }
        i += 1;
    }

    Ok(Args {
        output_format,
        render_options,
        expr,
        file,
    })
}

fn main() -> ExitCode {
    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let source = match load_source(&args) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if !args.render_options.is_empty() {
        for (k, v) in &args.render_options {
            eprintln!("note: rendering option {k}={v} noted (no viewer in this build)");
        }
    }

    let system = Rc::new(System::new());
    let mut program = Program::new(system, source, None);

    let start = Instant::now();
    if let Err(err) = program.compile() {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    let value = match program.eval() {
        Ok(v) => v,
        Err(err) => {
            let elapsed = start.elapsed();
            eprintln!("error after {elapsed:?}\n{err}");
            return ExitCode::FAILURE;
        }
    };

    match args.output_format.as_deref() {
        Some("json") | Some("gpu") => {
            let loc = program.start_location();
            match gpu_json::encode(&value, &loc) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("error: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
        _ => println!("{value}"),
    }

    ExitCode::SUCCESS
}

fn load_source(args: &Args) -> Result<Rc<Source>, String> {
    if let Some(expr) = &args.expr {
        return Ok(Source::from_string(expr.clone()));
    }
    let Some(path) = &args.file else {
        return Err("no input: pass a .curv file, a .gpu file, or -x <expr>".to_string());
    };
    let metadata = std::fs::metadata(path).map_err(|err| format!("cannot read '{path}': {err}"))?;
    if metadata.is_dir() {
        return Err(format!("'{path}' is a directory; pass a file or use -x"));
    }
    let text = std::fs::read_to_string(path).map_err(|err| format!("error reading '{path}': {err}"))?;
    let kind = if path.ends_with(".gpu") { SourceKind::Gpu } else { SourceKind::Curv };
    Ok(Source::new(path.clone(), text, kind))
}
