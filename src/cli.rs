use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::warn;
use url::Url;

use crate::{
  blog::{Blog, ListingSession},
  config::SiteConfig,
  server::{self, ServerConfig, web},
};

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
  #[clap(subcommand)]
  subcmd: SubCommand,

  /// YAML site config; defaults apply when omitted
  #[clap(long, short)]
  config: Option<PathBuf>,

  /// Prismic API endpoint, overrides the config file
  #[clap(long, env = "PRISMIC_URL_API")]
  api_url: Option<Url>,

  #[clap(long, env = "PRISMIC_ACCESS_TOKEN", hide_env_values = true)]
  access_token: Option<String>,
}

#[derive(Parser)]
enum SubCommand {
  Server(ServerConfig),
  /// Print a rendered page to stdout
  #[clap(subcommand)]
  Render(RenderCommand),
}

#[derive(Parser)]
enum RenderCommand {
  Listing {
    /// Number of pages to load after the first one
    #[clap(long, default_value_t = 0)]
    pages: usize,
  },
  Post {
    slug: String,
  },
}

impl Cli {
  pub async fn run(self) -> anyhow::Result<()> {
    let site = self.site_config()?;

    match self.subcmd {
      SubCommand::Server(server_config) => {
        server::serve(server_config, site).await?
      }
      SubCommand::Render(cmd) => render(cmd, &site).await?,
    }

    Ok(())
  }

  fn site_config(&self) -> anyhow::Result<SiteConfig> {
    let mut site = match &self.config {
      Some(path) => SiteConfig::load_from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?,
      None => SiteConfig::default(),
    };

    if let Some(api_url) = &self.api_url {
      site.content_source.api_url = Some(api_url.clone());
    }
    if let Some(token) = &self.access_token {
      site.content_source.access_token = Some(token.clone());
    }

    Ok(site)
  }
}

async fn render(cmd: RenderCommand, site: &SiteConfig) -> anyhow::Result<()> {
  let blog = Blog::from_config(site)?;

  let html = match cmd {
    RenderCommand::Listing { pages } => {
      let first = blog.listing.build().await?;
      let mut session = ListingSession::new(first);
      let loaded = session
        .load_pages(&blog.listing, pages)
        .await
        .context("loading more posts")?;
      if loaded < pages {
        warn!("only {loaded} more pages available");
      }
      web::listing::render_listing_page(&blog.title, session.listing())
    }
    RenderCommand::Post { slug } => {
      let Some(page) = blog.posts.build(&slug).await? else {
        bail!("post {slug} not found");
      };
      web::post::render_post_page(&blog.title, &page)
    }
  };

  println!("{}", html.into_string());
  Ok(())
}
