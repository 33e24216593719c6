mod cli;

use postboard::{
    build_feed, config,
    config::Config,
    feed::PostFeed,
    messages::{Failure, Messages},
    ui::{CreatePostForm, PostList},
};
use postboard_common::PostId;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "postboard=trace,reqwest=debug".to_string()
        } else {
            "postboard=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("postboard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let config = load_session_config(cli.config.as_deref(), cli.user, cli.email)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_command(command, config))
        }
    }
}

/// Load the config and apply the identity overrides from the command line.
fn load_session_config(
    config_path: Option<&Path>,
    user: Option<String>,
    email: Option<String>,
) -> Result<Config> {
    let mut config = config::load_config_or_default(config_path)?;

    if user.is_some() {
        config.session.user_id = user;
    }
    if email.is_some() {
        config.session.email = email;
    }

    config::validate_config(&config)?;
    Ok(config)
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    let identity = config
        .session
        .identity()
        .context("No signed-in user: set [session] user_id in the config or pass --user")?;

    let messages = Messages::new(config.display.locale);
    let feed = build_feed(&config);
    // `create` never reads the existing posts; `delete` needs them for the
    // image lookup.
    if matches!(command, Commands::Create { .. }) {
        feed.adopt_user(identity);
    } else {
        feed.set_user(Some(identity)).await;
    }

    match command {
        Commands::List { json } => list_posts(&feed, &messages, json),
        Commands::Create {
            title,
            content,
            image,
        } => create_post(&feed, &messages, title, content, image).await,
        Commands::Delete { id, yes } => delete_post(&feed, &messages, PostId::new(id), yes).await,
        Commands::Validate { .. } | Commands::Version => Ok(()),
    }
}

fn list_posts(feed: &PostFeed, messages: &Messages, json: bool) -> Result<()> {
    let posts = feed.posts();

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
    } else {
        print!("{}", PostList::new(*messages).render(&posts));
    }

    Ok(())
}

async fn create_post(
    feed: &PostFeed,
    messages: &Messages,
    title: String,
    content: String,
    image: Option<PathBuf>,
) -> Result<()> {
    let mut form = CreatePostForm::new();
    form.title = title;
    form.content = content;
    if let Some(ref path) = image {
        form.select_image(path).await?;
    }

    if form.is_disabled(feed.is_loading()) {
        anyhow::bail!("Title and content cannot be empty");
    }

    if !form.submit(feed).await {
        let error = feed
            .error()
            .unwrap_or_else(|| messages.failure(Failure::Create).to_string());
        anyhow::bail!(error);
    }

    println!("{}", messages.created());
    print!("{}", PostList::new(*messages).render(&feed.posts()[..1]));
    Ok(())
}

async fn delete_post(feed: &PostFeed, messages: &Messages, id: PostId, yes: bool) -> Result<()> {
    if !yes && !confirm(messages.confirm_delete())? {
        return Ok(());
    }

    if feed.delete_post(&id).await.is_err() {
        let error = feed
            .error()
            .unwrap_or_else(|| messages.failure(Failure::Delete).to_string());
        anyhow::bail!(error);
    }

    println!("{}", messages.deleted());
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [s/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    ))
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Store: {} (project {})", config.store.base_url, config.store.project_id);
            println!("  Collection: {}", config.store.collection);
            println!("  Images: {}", config.images.endpoint);
            println!(
                "  Session user: {}",
                config.session.user_id.as_deref().unwrap_or("(none)")
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Store: {}", config.store.base_url);
            println!("  Images: {}", config.images.endpoint);
        }
    }

    Ok(())
}
