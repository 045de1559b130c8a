use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xmind2yaml")]
#[command(version)]
#[command(about = "Print the outline of an XMind mind map as indented YAML-style text", long_about = None)]
#[command(after_help = "Examples:\n  \
  xmind2yaml ideas.xmind              extract content.xml here and print the outline\n  \
  xmind2yaml ideas.xmind -d /tmp/x    extract content.xml into /tmp/x instead\n\n\
  Set RUST_LOG=debug to trace archive parsing on stderr.")]
pub struct Cli {
    /// XMind file (ZIP package containing content.xml)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Extract content.xml into DIR instead of the current directory
    #[arg(short = 'd', value_name = "DIR", default_value = ".")]
    pub extract_dir: PathBuf,
}
