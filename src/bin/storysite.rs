use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser as ClapParser;
use log::info;
use rouille::{Request, Server};

use storysite::config::{getenv_or, Overrides, ServeConfig, DEFAULT_ASSET_BASE};
use storysite::html::HtmlWriter;
use storysite::layout::SiteLayout;
use storysite::server::Site;
use storysite::story_body::render_story_body;
use storysite::story_html::write_blocks;

#[derive(clap::Parser, Debug)]
/// Serve the Champions Place story site, or render a story body.
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run the web server. Content comes from the hosted backend
    /// (SUPABASE_URL, SUPABASE_KEY) unless a fixtures file is given.
    Serve {
        /// Address to listen on (default from LISTEN_HTTP, or
        /// 127.0.0.1:3000)
        #[clap(long)]
        listen: Option<String>,

        /// JSON file with stories and champions to serve instead of
        /// the hosted backend
        #[clap(long)]
        fixtures: Option<PathBuf>,

        /// Directory served under /static/ (default from STATIC_DIR,
        /// or "static")
        #[clap(long)]
        static_dir: Option<PathBuf>,
    },

    /// Render the story body in FILE to stdout.
    Render {
        file: PathBuf,

        /// The story's slug, used to locate its embedded images
        #[clap(long)]
        slug: String,

        /// "html" or "json"
        #[clap(long, default_value = "html")]
        format: String,

        /// Base URL for image assets
        #[clap(long, default_value = DEFAULT_ASSET_BASE)]
        asset_base: String,
    },
}

fn serve(overrides: Overrides) -> Result<()> {
    let config = ServeConfig::from_env(overrides)?;
    let repo = config.backend.open()
        .with_context(|| anyhow!("opening content backend {}", config.backend.describe()))?;
    let static_dir = if config.static_dir.is_dir() {
        Some(config.static_dir.clone())
    } else {
        log::warn!("static dir {:?} does not exist, not serving /static/",
                   config.static_dir);
        None
    };
    let site = Site::new(repo, Arc::new(SiteLayout::default()), static_dir);

    let server = Server::new(config.listen.as_str(), move |request: &Request| {
        site.handle(request)
    }).map_err(|e| anyhow!("can't listen on {:?}: {e}", config.listen))?;
    info!("listening on http://{}", server.server_addr());
    server.run();
    bail!("Server stopped.")
}

fn render(file: PathBuf, slug: &str, format: &str, asset_base: &str) -> Result<()> {
    let body = std::fs::read_to_string(&file)
        .with_context(|| anyhow!("reading story body from {file:?}"))?;
    let asset_base = asset_base.trim_end_matches('/');
    let blocks = render_story_body(&body, slug, |path| format!("{asset_base}/{path}"));
    match format {
        "html" => {
            let mut html = HtmlWriter::new();
            write_blocks(&mut html, &blocks)?;
            println!("{}", html.as_str());
        }
        "json" => println!("{}", serde_json::to_string_pretty(&blocks)?),
        _ => bail!("unknown --format {format:?}, expecting \"html\" or \"json\""),
    }
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&getenv_or("RUST_LOG", "info")?)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Serve { listen, fixtures, static_dir } =>
            serve(Overrides { listen, fixtures, static_dir }),
        Command::Render { file, slug, format, asset_base } =>
            render(file, &slug, &format, &asset_base),
    }
}
