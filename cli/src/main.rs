use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-unicodify")]
#[command(
    about = "Replace custom PDF font encodings with Identity-H and a ToUnicode map",
    long_about = None
)]
struct Args {
    /// PDF file to convert
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the converted PDF
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Password for encrypted PDFs
    #[arg(short, long)]
    password: Option<String>,

    /// Print debug diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
    {
        eprintln!("Could not set up logging: {}", e);
    }

    let unicodifier = if let Some(password) = args.password {
        pdf_unicodify::Unicodifier::builder()
            .password(password)
            .build()
    } else {
        pdf_unicodify::Unicodifier::default()
    };

    if let Err(e) = unicodifier.convert_path(&args.input, &args.output) {
        eprintln!("Error converting {:?}: {}", args.input, e);
        std::process::exit(1);
    }
}
