use std::{env, fs, path::PathBuf, process};

use anyhow::{Context, Result, anyhow};

use picolin::bytecode::ProgramBc;
use picolin::bytecode::disasm::print_bc;
use picolin::frontend::{Lexer, token_dumper::TokenDumper};

const DEFAULT_OUTPUT: &str = "program.bin";

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 1 || has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage();
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Compilation error: {:#}", e);
        process::exit(1);
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn run(args: &[String]) -> Result<()> {
    let tokens_only = has_flag(args, "--tokens");
    let no_color = has_flag(args, "--no-color");
    let pretty = has_flag(args, "--pretty");
    let bytecode = has_flag(args, "--bc") || has_flag(args, "--bytecode");
    let symbols = has_flag(args, "--symbols");
    let disasm = has_flag(args, "--disasm");

    // positional arguments: input, then optional output
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with('-')).collect();
    let input = positional
        .first()
        .ok_or_else(|| anyhow!("missing input file"))?;

    if disasm {
        return disassemble_file(input);
    }

    let source =
        fs::read_to_string(input).with_context(|| format!("failed to read '{}'", input))?;

    if tokens_only {
        return dump_tokens(&source, no_color, pretty);
    }

    let output = positional
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_OUTPUT);

    let program = picolin::compile_program(&source)?;

    for warning in program.limit_warnings() {
        eprintln!("Warning: {}", warning);
    }

    if bytecode {
        print_bc(&program)?;
    }

    fs::write(output, &program.code).with_context(|| format!("failed to write '{}'", output))?;

    if symbols {
        let path = sidecar_path(output);
        let bytes = program.symbols_to_bytes()?;
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    println!("Compilation successful: {} -> {}", input, output);
    println!("Bytecode size: {} bytes", program.code.len());
    Ok(())
}

/// `program.bin` -> `program.bin.sym`
fn sidecar_path(output: &str) -> PathBuf {
    PathBuf::from(format!("{}.sym", output))
}

fn dump_tokens(source: &str, no_color: bool, pretty: bool) -> Result<()> {
    let tokens = Lexer::new(source).tokenize()?;

    let mut dumper = TokenDumper::new();
    if no_color {
        dumper = dumper.no_color();
    }
    if pretty {
        dumper = dumper.pretty();
    }

    dumper.dump(&tokens);
    Ok(())
}

fn disassemble_file(path: &str) -> Result<()> {
    let code = fs::read(path).with_context(|| format!("failed to read '{}'", path))?;

    let sidecar_file = sidecar_path(path);
    let sidecar = if sidecar_file.exists() {
        Some(
            fs::read(&sidecar_file)
                .with_context(|| format!("failed to read '{}'", sidecar_file.display()))?,
        )
    } else {
        None
    };

    let program = ProgramBc::from_parts(code, sidecar.as_deref())
        .with_context(|| format!("corrupt symbol file '{}'", sidecar_file.display()))?;
    print_bc(&program)?;
    Ok(())
}

fn print_usage() {
    println!("PICOLIN - compiler for the Picolin stack machine");
    println!();
    println!("Usage:");
    println!("  picolin <file> [out.bin]          Compile (default output: {})", DEFAULT_OUTPUT);
    println!("  picolin --tokens <file>           Show tokens only (--no-color, --pretty)");
    println!("  picolin --bc <file> [out.bin]     Compile and print the disassembly");
    println!("  picolin --symbols <file> [out]    Also write variable names to <out>.sym");
    println!("  picolin --disasm <file.bin>       Disassemble a compiled program");
    println!("  picolin --help, -h                Show this help");
}
