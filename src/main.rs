use anyhow::Result;
use clap::Parser;

mod ansi;
mod capture;
mod color_key;
mod export;
mod grid;
mod html;
mod layout;
mod meta;
mod output;
mod pane;
mod pty;
mod reconstruct;
mod render;
mod rewrite;
mod session;

#[derive(Parser, Debug)]
#[command(
    name = "deckprint",
    version,
    about = "Converts terminal presentations into PDF files"
)]
struct Args {
    /// Write intermediate HTML files next to the presentation source
    #[arg(long)]
    emit_intermediate: bool,

    /// Font size in pixels
    #[arg(long, default_value = "10")]
    font_size: u32,

    /// Line height in pixels
    #[arg(long, default_value = "12")]
    line_height: u32,

    /// Presentation command to run
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let meta = meta::load(&mut std::io::stdin().lock())?;

    let options = export::ExportOptions {
        emit_intermediate: args.emit_intermediate,
        style: layout::StyleOptions {
            font_size: args.font_size,
            line_height: args.line_height,
        },
    };
    export::run(&args.command, &meta, &options).await
}
