use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::exit;

use clap::Parser;

use finance_tracker::{
    barcode::{DEFAULT_DPI, generate_barcode_for_tag},
    logging::setup_logging,
};

/// Draw a loyalty card number as a PNG barcode.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The card number to encode.
    #[arg(long, short)]
    code: String,

    /// The barcode type: code128, ean13, ean8, upca, code39 or itf.
    ///
    /// Detected from the code when omitted. Unknown types fall back to code128.
    #[arg(long, short)]
    symbology: Option<String>,

    /// The image resolution in dots per inch, from 1 to 1200.
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// File path to save the PNG image to.
    #[arg(long, short)]
    output_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let barcode = generate_barcode_for_tag(&args.code, args.symbology.as_deref(), args.dpi)?;

    fs::write(output_path, &barcode.png)?;

    println!(
        "Saved {} barcode for \"{}\" to {output_path:#?}",
        barcode.symbology, barcode.code
    );

    Ok(())
}
