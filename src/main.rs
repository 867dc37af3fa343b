use std::env;
use std::fs;
use std::process;

const USAGE: &str = "Usage: lilyvoice encode <voice.yaml> [output.ly]\n       lilyvoice decode <input.ly> [voice.yaml]";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("{}", USAGE);
        process::exit(1);
    }

    let command = args[1].as_str();
    let input_path = &args[2];
    let output_path: Option<&String> = args.get(3);

    // Read input file
    let source = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let (result, kind) = match command {
        "encode" => (lilyvoice::encode_document(&source), "LilyPond"),
        "decode" => (lilyvoice::decode_document(&source), "voice document"),
        other => {
            eprintln!("Unknown command '{}'", other);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let text = match result {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Translation error: {}", e);
            process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &text) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote {} to {}", kind, path);
        }
        None => {
            print!("{}", text);
        }
    }
}
