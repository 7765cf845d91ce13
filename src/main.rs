use clap::{Parser, Subcommand};
use ogpress::build::{self, Site};
use ogpress::routes::RouteContext;
use ogpress::{config, output};
use std::path::PathBuf;
use std::process::ExitCode;

/// `--version` text: the crate version on a release tag, `dev@<commit>`
/// anywhere else.
fn version_string() -> &'static str {
    match (env!("ON_RELEASE_TAG"), env!("GIT_HASH")) {
        ("true", _) => env!("CARGO_PKG_VERSION"),
        (_, "") => "dev@unknown",
        (_, hash) => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "ogpress")]
#[command(about = "Open Graph preview images for markdown blogs")]
#[command(long_about = "\
Open Graph preview images for markdown blogs

Every published post gets a PNG card with its title, description, author,
date and reading time. The site gets one too.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── fonts/Inter.ttf              # Font files listed under [og] fonts
  └── blog/                        # Posts directory ([content] posts_dir)
      ├── hello-world.md           # +++ TOML front matter +++ then markdown
      └── 2024/deep-dive.md        # Subdirectories are fine

Front matter:

  +++
  title = \"Hello World!\"            # Required; the slug comes from it
  description = \"First post\"
  author = \"Jane Doe\"               # Falls back to [site] author
  pub_datetime = 2024-01-15T09:00:00Z
  tags = [\"intro\"]
  draft = false                    # Drafts get no image
  +++

Output:

  dist/posts/<slug>/index.png      # One per published post
  dist/og.png                      # Site card

Run 'ogpress gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every route into the output directory
    Build,
    /// Validate content and list what a build would produce
    Check {
        /// Print the route descriptors as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Render a single route, e.g. /posts/hello-world/index.png
    Render {
        /// Route path to render
        path: String,
        /// Write here instead of under the output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build => {
            println!("==> Loading {}", cli.source.display());
            let site = Site::load(&cli.source)?;

            println!("{}", output::format_build_start(&cli.output, site.threads()));
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = site.build(&cli.output, Some(tx));
            printer.join().ok();
            let summary = result?;
            output::print_build_summary(&summary, &cli.output);

            if !summary.is_success() {
                return Err(format!(
                    "{} of {} routes failed",
                    summary.failed.len(),
                    summary.failed.len() + summary.written.len()
                )
                .into());
            }
        }
        Command::Check { json } => {
            let site = Site::load(&cli.source)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&site.paths.routes)?);
            } else {
                println!("==> Checking {}", cli.source.display());
                output::print_check_output(&site.paths, &site.routes, &site.config, &cli.source);
                println!("==> Content is valid");
            }
        }
        Command::Render { path, out } => {
            let site = Site::load(&cli.source)?;
            let ctx = RouteContext {
                renderer: &site.renderer,
            };
            let response = site.routes.resolve(&path, &site.paths, &ctx)?;
            let target = out.unwrap_or_else(|| build::output_path(&cli.output, &path));
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &response.body)?;
            println!(
                "{} → {} ({} bytes)",
                path,
                target.display(),
                response.body.len()
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
