use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(input) = args.next() else {
        eprintln!("usage: oglang <source-file> [output-file]");
        return ExitCode::FAILURE;
    };
    let output = args.next();

    match run(&input, output.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &str, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let src = fs::read_to_string(input)?;

    match oglang::compile(&src) {
        Ok(code) => {
            let output = output
                .map(PathBuf::from)
                .unwrap_or_else(|| Path::new(input).with_extension("js"));
            fs::write(&output, code)?;
            println!("wrote {}", output.display());
            Ok(())
        }
        Err(error) => {
            for message in error.render(&src) {
                eprintln!("{input}:{message}");
            }
            Err("compilation failed".into())
        }
    }
}
