use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mddocx")]
#[command(about = "Convert Markdown to a .docx document with fixed academic formatting")]
struct Cli {
    /// Input Markdown file (reads stdin when neither this nor --text is given)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Markdown text to convert; takes priority over --input
    #[arg(short, long)]
    text: Option<String>,

    /// Output .docx file (defaults to input name with .docx extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log each conversion stage
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Inline text, if given and non-empty.
    fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    /// Where to write the document; `None` when it cannot be derived.
    fn output_path(&self) -> Option<PathBuf> {
        match (&self.output, &self.input) {
            (Some(output), _) => Some(output.clone()),
            (None, Some(input)) if self.text().is_none() => Some(input.with_extension("docx")),
            _ => None,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "mddocx=debug" } else { "mddocx=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Determine output path
    let Some(output) = cli.output_path() else {
        eprintln!("Error: --output is required when reading from --text or stdin");
        std::process::exit(2);
    };

    // Read input
    let markdown = match load_markdown(&cli) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Convert and write
    match mddocx::write_docx(&markdown, &output) {
        Ok(path) => println!("Created {}", path.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_markdown(cli: &Cli) -> mddocx::Result<String> {
    if let Some(text) = cli.text() {
        return Ok(text.to_string());
    }
    if let Some(input) = &cli.input {
        return mddocx::read_markdown(input);
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|source| mddocx::Error::ReadInput {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
    Ok(buf)
}
