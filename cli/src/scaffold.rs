//! Template tree rendering
//!
//! Files ending in `.jinja` are rendered with the [`TemplateContext`] and
//! written without the suffix; every other file is copied as is.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

/// Suffix of files rendered as templates
pub const TEMPLATE_SUFFIX: &str = ".jinja";

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Directory already exists: {}. Use --force to overwrite.", .0.display())]
    TargetExists(PathBuf),

    #[error("Template directory not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Failed to read template tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },
}

/// Where a generated project takes the zodiac crates from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ZodiacSource {
    /// A local checkout; crates live in `<root>/api`, `<root>/infra`, `<root>/shared`
    Path { root: String },
    /// A git repository holding the workspace
    Git { url: String },
}

impl ZodiacSource {
    pub fn path(root: &Path) -> Self {
        ZodiacSource::Path {
            root: root.to_string_lossy().replace('\\', "/"),
        }
    }

    pub fn git(url: impl Into<String>) -> Self {
        ZodiacSource::Git { url: url.into() }
    }
}

/// Variables available to templates
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    pub project_name: String,
    /// `project_name` as a valid crate identifier
    pub crate_name: String,
    pub template_id: String,
    pub zodiac: ZodiacSource,
}

impl TemplateContext {
    pub fn new(project_name: &str, template_id: &str, zodiac: ZodiacSource) -> Self {
        Self {
            project_name: project_name.to_string(),
            crate_name: crate_name(project_name),
            template_id: template_id.to_string(),
            zodiac,
        }
    }
}

fn crate_name(project_name: &str) -> String {
    project_name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// A template directory
#[derive(Debug, Clone)]
pub struct Scaffold {
    root: PathBuf,
}

impl Scaffold {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render the template tree into `target`.
    ///
    /// A non-empty `target` is refused unless `force` is set, in which case
    /// existing files are overwritten. Returns the written files.
    pub fn generate(
        &self,
        target: &Path,
        context: &TemplateContext,
        force: bool,
    ) -> Result<Vec<PathBuf>, ScaffoldError> {
        if !self.root.is_dir() {
            return Err(ScaffoldError::TemplateNotFound(self.root.clone()));
        }
        if !force && is_occupied(target)? {
            return Err(ScaffoldError::TargetExists(target.to_path_buf()));
        }

        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let mut written = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let destination = target.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&destination).map_err(|source| ScaffoldError::Io {
                    path: destination.clone(),
                    source,
                })?;
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            match file_name.strip_suffix(TEMPLATE_SUFFIX) {
                Some(stem) => {
                    let destination = destination.with_file_name(stem);
                    let source = read_to_string(entry.path())?;
                    let rendered =
                        env.render_str(&source, context)
                            .map_err(|source| ScaffoldError::Render {
                                path: entry.path().to_path_buf(),
                                source,
                            })?;
                    fs::write(&destination, rendered).map_err(|source| ScaffoldError::Io {
                        path: destination.clone(),
                        source,
                    })?;
                    tracing::debug!("Rendered {}", destination.display());
                    written.push(destination);
                }
                None => {
                    fs::copy(entry.path(), &destination).map_err(|source| ScaffoldError::Io {
                        path: destination.clone(),
                        source,
                    })?;
                    tracing::debug!("Copied {}", destination.display());
                    written.push(destination);
                }
            }
        }
        Ok(written)
    }
}

/// A file, or a directory with at least one entry
fn is_occupied(target: &Path) -> Result<bool, ScaffoldError> {
    if !target.exists() {
        return Ok(false);
    }
    if !target.is_dir() {
        return Ok(true);
    }
    let mut entries = fs::read_dir(target).map_err(|source| ScaffoldError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(entries.next().is_some())
}

fn read_to_string(path: &Path) -> Result<String, ScaffoldError> {
    fs::read_to_string(path).map_err(|source| ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(project_name: &str) -> TemplateContext {
        TemplateContext::new(project_name, "standard-3tier", ZodiacSource::path(Path::new("/opt/zodiac")))
    }

    fn template_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("README.md.jinja"), "# {{ project_name }}\n").unwrap();
        fs::write(
            dir.path().join("src/main.rs.jinja"),
            "// {{ crate_name }} from {{ template_id }}\nfn main() {}\n",
        )
        .unwrap();
        fs::write(dir.path().join("src/lib.rs"), "pub fn answer() -> u32 { 42 }\n").unwrap();
        dir
    }

    #[test]
    fn test_crate_name() {
        assert_eq!(crate_name("My-Service"), "my_service");
        assert_eq!(crate_name("orders"), "orders");
    }

    #[test]
    fn test_renders_and_copies() {
        let templates = template_tree();
        let out = TempDir::new().unwrap();
        let target = out.path().join("shop-api");
        let context = context("shop-api");

        let written = Scaffold::new(templates.path())
            .generate(&target, &context, false)
            .unwrap();
        assert_eq!(written.len(), 3);

        assert_eq!(fs::read_to_string(target.join("README.md")).unwrap(), "# shop-api\n");
        assert_eq!(
            fs::read_to_string(target.join("src/main.rs")).unwrap(),
            "// shop_api from standard-3tier\nfn main() {}\n"
        );
        assert_eq!(
            fs::read_to_string(target.join("src/lib.rs")).unwrap(),
            "pub fn answer() -> u32 { 42 }\n"
        );
        assert!(!target.join("README.md.jinja").exists());
    }

    #[test]
    fn test_non_empty_target_requires_force() {
        let templates = template_tree();
        let out = TempDir::new().unwrap();
        let target = out.path().join("shop");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("README.md"), "old").unwrap();
        let context = context("shop");
        let scaffold = Scaffold::new(templates.path());

        let err = scaffold.generate(&target, &context, false).unwrap_err();
        assert!(matches!(err, ScaffoldError::TargetExists(_)));
        assert_eq!(
            err.to_string(),
            format!("Directory already exists: {}. Use --force to overwrite.", target.display())
        );
        assert_eq!(fs::read_to_string(target.join("README.md")).unwrap(), "old");

        scaffold.generate(&target, &context, true).unwrap();
        assert_eq!(fs::read_to_string(target.join("README.md")).unwrap(), "# shop\n");
    }

    #[test]
    fn test_empty_target_is_used() {
        let templates = template_tree();
        let out = TempDir::new().unwrap();
        let target = out.path().join("empty");
        fs::create_dir_all(&target).unwrap();
        let context = context("empty");

        Scaffold::new(templates.path())
            .generate(&target, &context, false)
            .unwrap();
        assert!(target.join("src/main.rs").exists());
    }

    #[test]
    fn test_missing_template_root() {
        let out = TempDir::new().unwrap();
        let context = context("x");
        let err = Scaffold::new(out.path().join("nope"))
            .generate(&out.path().join("x"), &context, false)
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::TemplateNotFound(_)));
    }

    #[test]
    fn test_undefined_variable_fails() {
        let templates = TempDir::new().unwrap();
        fs::write(templates.path().join("a.txt.jinja"), "{{ missing }}").unwrap();
        let out = TempDir::new().unwrap();
        let context = context("x");
        let err = Scaffold::new(templates.path())
            .generate(&out.path().join("x"), &context, false)
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Render { .. }));
    }

    #[test]
    fn test_zodiac_source_selects_dependencies() {
        let templates = TempDir::new().unwrap();
        fs::write(
            templates.path().join("deps.toml.jinja"),
            "{% if zodiac.kind == \"git\" %}\nzd_api = { git = '{{ zodiac.url }}' }\n{% else %}\nzd_api = { path = '{{ zodiac.root }}/api' }\n{% endif %}\n",
        )
        .unwrap();
        let out = TempDir::new().unwrap();
        let scaffold = Scaffold::new(templates.path());

        let target = out.path().join("local");
        scaffold.generate(&target, &context("local"), false).unwrap();
        assert_eq!(
            fs::read_to_string(target.join("deps.toml")).unwrap(),
            "zd_api = { path = '/opt/zodiac/api' }\n"
        );

        let target = out.path().join("remote");
        let remote = TemplateContext::new(
            "remote",
            "standard-3tier",
            ZodiacSource::git("https://example.com/zodiac.git"),
        );
        scaffold.generate(&target, &remote, false).unwrap();
        assert_eq!(
            fs::read_to_string(target.join("deps.toml")).unwrap(),
            "zd_api = { git = 'https://example.com/zodiac.git' }\n"
        );
    }
}
