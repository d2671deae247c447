//! `zodiac new`: generate a project from a template

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};

use crate::scaffold::{Scaffold, TemplateContext, ZodiacSource};

/// Environment variable overriding the template root
pub const TEMPLATES_DIR_ENV: &str = "ZODIAC_TEMPLATES_DIR";
/// Environment variable pointing at a local zodiac checkout
pub const ZODIAC_PATH_ENV: &str = "ZODIAC_PATH";
/// Environment variable naming the zodiac git repository
pub const ZODIAC_GIT_ENV: &str = "ZODIAC_GIT";

/// Templates shipped with the crate
pub fn default_templates_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates"))
}

/// Workspace this CLI was built from
pub fn default_zodiac_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.join(".."))
}

/// Available project templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateId {
    /// API, service and repository layers in one crate
    #[value(name = "standard-3tier")]
    Standard3Tier,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Standard3Tier => "standard-3tier",
        }
    }
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Name of the project
    pub project_name: String,

    /// Template id
    #[arg(long = "tpl", value_enum)]
    pub template: TemplateId,

    /// Directory where the project will be generated
    #[arg(short = 'o', long = "output")]
    pub output_dir: PathBuf,

    /// Overwrite files in the target directory if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Directory holding the templates
    #[arg(long, env = TEMPLATES_DIR_ENV)]
    pub templates_dir: Option<PathBuf>,

    /// Local zodiac checkout the project depends on [default: the CLI's own workspace]
    #[arg(long, env = ZODIAC_PATH_ENV, conflicts_with = "zodiac_git")]
    pub zodiac_path: Option<PathBuf>,

    /// Git repository the project takes the zodiac crates from
    #[arg(long, env = ZODIAC_GIT_ENV)]
    pub zodiac_git: Option<String>,
}

impl NewArgs {
    /// `<output_dir>/<project_name>`
    pub fn target_path(&self) -> PathBuf {
        self.output_dir.join(&self.project_name)
    }

    /// Dependency source written into the generated manifest
    pub fn zodiac_source(&self) -> anyhow::Result<ZodiacSource> {
        if let Some(url) = &self.zodiac_git {
            return Ok(ZodiacSource::git(url));
        }
        let root = self.zodiac_path.clone().unwrap_or_else(default_zodiac_root);
        let root = root
            .canonicalize()
            .with_context(|| format!("zodiac checkout not found at {}", root.display()))?;
        Ok(ZodiacSource::path(&root))
    }

    fn template_path(&self) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(default_templates_dir)
            .join(self.template.as_str())
    }
}

/// Generate the project, returning the target directory
pub fn run(args: &NewArgs) -> anyhow::Result<PathBuf> {
    let target = args.target_path();
    let scaffold = Scaffold::new(args.template_path());
    let context = TemplateContext::new(
        &args.project_name,
        args.template.as_str(),
        args.zodiac_source()?,
    );

    println!(
        "🚀 Generating project {} using {}...",
        args.project_name,
        args.template.as_str()
    );
    let written = scaffold.generate(&target, &context, args.force)?;
    tracing::info!(files = written.len(), "Project generated");

    let shown = target
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", target.display()))?;
    println!("✅ Project created at: {}", shown.display());
    println!("\nTo get started:");
    println!("  cd {}", target.display());
    println!("  cargo run");
    Ok(target)
}
