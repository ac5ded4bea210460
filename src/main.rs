use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "proto-lsp")]
#[command(version, about = "Language Server for Protocol Buffers schemas")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    // Future subcommands will be added here
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(proto_lsp::lsp::server::run_server()),
    }
}
