use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linkdrop::app::AppContext;
use linkdrop::cli::{commands, Cli, Commands};
use linkdrop::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Save {
            text,
            url,
            caption,
            title,
            thumbnail,
        } => {
            commands::save(
                &ctx,
                commands::SaveArgs {
                    text: &text,
                    url: url.as_deref(),
                    caption: caption.as_deref(),
                    title: title.as_deref(),
                    thumbnail,
                },
            )
            .await?;
        }
        Commands::List => {
            commands::list(&ctx)?;
        }
        Commands::Clear => {
            commands::clear(&ctx)?;
        }
        Commands::Redirect { enabled } => {
            commands::redirect(&ctx, enabled)?;
        }
        Commands::Watch => {
            commands::watch(&ctx).await?;
        }
    }

    Ok(())
}
