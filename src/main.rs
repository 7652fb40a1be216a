use clap::Parser;
use postit::cli::{
    handle_add, handle_background_color, handle_background_image, handle_background_show,
    handle_color, handle_delete, handle_edit, handle_get, handle_init, handle_list, handle_move,
    handle_status, BackgroundAction, Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("postit=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init => handle_init().await,
        Commands::Add { text, stdin, json } => handle_add(text, stdin, json).await,
        Commands::List { json } => handle_list(json).await,
        Commands::Get { id, json } => handle_get(id, json).await,
        Commands::Move { id, x, y } => handle_move(id, x, y).await,
        Commands::Edit { id, text, stdin } => handle_edit(id, text, stdin).await,
        Commands::Color { id, color } => handle_color(id, color).await,
        Commands::Delete { id, force } => handle_delete(id, force).await,
        Commands::Background(bg) => match bg.action {
            BackgroundAction::Color { color } => handle_background_color(color).await,
            BackgroundAction::Image { uri } => handle_background_image(uri).await,
            BackgroundAction::Show { json } => handle_background_show(json).await,
        },
        Commands::Status => handle_status().await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
