use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "label-sheet")]
#[command(about = "Print text in a custom font onto a sheet of labels", long_about = None)]
struct Args {
    /// TrueType font file to embed
    #[arg(value_name = "FONT", required_unless_present = "list_layouts")]
    font: Option<PathBuf>,

    /// Text printed on every label; use "\n" in the shell for line breaks
    #[arg(short, long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the label text from a file instead
    #[arg(long, value_name = "FILE")]
    text_file: Option<PathBuf>,

    /// Sheet layout name (see --list-layouts)
    #[arg(short, long)]
    layout: Option<String>,

    /// Font size in points
    #[arg(short = 's', long, default_value_t = 12.0)]
    font_size: f32,

    /// Draw the outline of every label
    #[arg(long)]
    borders: bool,

    /// Draw a tick box in the corner of every label
    #[arg(long)]
    checkbox: bool,

    /// Shrink the font so the text fits a label
    #[arg(long)]
    auto_size: bool,

    /// Where to write the PDF
    #[arg(short, long, default_value = "labels.pdf")]
    output: PathBuf,

    /// Print the known sheet layouts and exit
    #[arg(long)]
    list_layouts: bool,

    /// More output; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("Could not install logger: {}", e);
    }
}

fn print_layouts() {
    for layout in label_sheet::layouts() {
        println!(
            "{:<12} {} x {} labels, {} x {} mm",
            layout.name, layout.cols, layout.rows, layout.label_width_mm, layout.label_height_mm
        );
    }
}

fn read_text(args: &Args) -> Result<String, String> {
    match (&args.text, &args.text_file) {
        (Some(text), _) => Ok(text.replace("\\n", "\n")),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(|text| text.trim_end_matches(['\r', '\n']).to_owned())
            .map_err(|e| format!("Error reading text from {:?}: {}", path, e)),
        (None, None) => Err("Nothing to print: pass --text or --text-file".to_owned()),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_layouts {
        print_layouts();
        return;
    }

    let Some(font_path) = args.font.as_ref() else {
        eprintln!("No font given");
        std::process::exit(2);
    };

    let text = match read_text(&args) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let font = match std::fs::read(font_path) {
        Ok(font) => font,
        Err(e) => {
            eprintln!("Error reading font {:?}: {}", font_path, e);
            std::process::exit(1);
        }
    };

    let mut builder = label_sheet::LabelSheet::builder()
        .font_size(args.font_size)
        .show_borders(args.borders)
        .include_checkbox(args.checkbox)
        .auto_font_size(args.auto_size);
    if let Some(layout) = &args.layout {
        builder = builder.layout(layout.as_str());
    }
    let sheet = builder.build();

    if let Err(e) = sheet.save(&font, &text, &args.output) {
        eprintln!("Error writing labels to {:?}: {}", args.output, e);
        std::process::exit(1);
    }

    log::info!(
        "wrote {} labels to {:?}",
        sheet.resolved_layout().label_count(),
        args.output
    );
}
