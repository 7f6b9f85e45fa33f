// homeport-cluster/src/render.rs
// ============================================================================
// Module: Resource Set Renderers
// Description: YAML manifest and helm template renderers.
// Purpose: Produce concrete resource sets for an environment, fail closed.
// Dependencies: homeport-core, serde_yaml, serde_json, std::process
// ============================================================================

//! ## Overview
//! Renderers turn declared apply actions into concrete resource sets. The
//! file renderer reads multi-document YAML manifests with environment
//! overlay resolution: files in `<dir>/<environment>/` replace same-named
//! files of the base directory. The helm renderer shells to `helm template`
//! and parses the rendered stream. Both enforce size limits and fail closed
//! on unparseable documents; a composition failure means nothing was
//! submitted to the cluster.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use homeport_core::ApplyAction;
use homeport_core::EnvironmentId;
use homeport_core::NamespaceId;
use homeport_core::RenderError;
use homeport_core::ResourceObject;
use homeport_core::ResourceRenderer;
use homeport_core::ResourceSet;
use serde_json::Value;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of one manifest file or rendered stream, in bytes.
const MAX_MANIFEST_BYTES: usize = 1024 * 1024;
/// Maximum number of objects in one rendered resource set.
const MAX_RENDER_OBJECTS: usize = 512;

// ============================================================================
// SECTION: File Renderer
// ============================================================================

/// Renderer reading YAML manifests from files and overlay directories.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    /// Base directory resolving relative manifest paths.
    base_dir: PathBuf,
}

impl FileRenderer {
    /// Creates a file renderer rooted at the given base directory.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Renders a single manifest file.
    fn render_file(&self, path: &str) -> Result<ResourceSet, RenderError> {
        let resolved = self.base_dir.join(path);
        let text = read_limited(&resolved)?;
        let objects = parse_documents(&text, path)?;
        bounded_set(objects)
    }

    /// Renders a manifest directory with environment overlay resolution.
    ///
    /// Base files are the directory's own YAML files in lexicographic order;
    /// a file of the same name under `<dir>/<environment>/` replaces its
    /// base counterpart.
    fn render_dir(
        &self,
        path: &str,
        environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError> {
        let resolved = self.base_dir.join(path);
        if !resolved.is_dir() {
            return Err(RenderError::SourceMissing(path.to_string()));
        }
        let overlay_dir = resolved.join(environment.as_str());

        let mut objects = Vec::new();
        for file_name in yaml_file_names(&resolved)? {
            let overlay = overlay_dir.join(&file_name);
            let source = if overlay.is_file() {
                overlay
            } else {
                resolved.join(&file_name)
            };
            let text = read_limited(&source)?;
            let origin = format!("{path}/{file_name}");
            objects.extend(parse_documents(&text, &origin)?);
        }
        bounded_set(objects)
    }
}

impl ResourceRenderer for FileRenderer {
    fn render(
        &self,
        action: &ApplyAction,
        environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError> {
        match action {
            ApplyAction::Manifest {
                path,
            } => self.render_file(path),
            ApplyAction::ManifestDir {
                path,
            } => self.render_dir(path, environment),
            ApplyAction::ChartRelease {
                release, ..
            } => Err(RenderError::Template {
                release: release.clone(),
                reason: "chart releases require the helm renderer".to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Helm Renderer
// ============================================================================

/// Renderer shelling to `helm template` for chart releases.
#[derive(Debug, Clone)]
pub struct HelmRenderer {
    /// Path or name of the helm binary.
    binary: String,
    /// Base directory resolving relative values paths.
    base_dir: PathBuf,
}

impl HelmRenderer {
    /// Creates a helm renderer rooted at the given base directory.
    #[must_use]
    pub fn new(binary: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Renders one chart release for the target environment.
    ///
    /// When a values file is declared, an `<stem>-<environment>` sibling is
    /// layered on top when present, so environments override shared values.
    fn render_release(
        &self,
        chart: &str,
        release: &str,
        namespace: &NamespaceId,
        values_path: Option<&str>,
        environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("template")
            .arg(release)
            .arg(chart)
            .arg("--namespace")
            .arg(namespace.as_str());
        if let Some(values_path) = values_path {
            let resolved = self.base_dir.join(values_path);
            if !resolved.is_file() {
                return Err(RenderError::SourceMissing(values_path.to_string()));
            }
            command.arg("-f").arg(&resolved);
            if let Some(overlay) = environment_values(&resolved, environment) {
                command.arg("-f").arg(overlay);
            }
        }
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = command.output().map_err(|err| RenderError::Template {
            release: release.to_string(),
            reason: format!("helm spawn failed: {err}"),
        })?;
        if !output.status.success() {
            return Err(RenderError::Template {
                release: release.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.len() > MAX_MANIFEST_BYTES {
            return Err(RenderError::TooLarge(format!("release {release}")));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let objects = parse_documents(&text, release)?;
        bounded_set(objects)
    }
}

impl ResourceRenderer for HelmRenderer {
    fn render(
        &self,
        action: &ApplyAction,
        environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError> {
        match action {
            ApplyAction::ChartRelease {
                chart,
                release,
                namespace,
                values_path,
            } => self.render_release(
                chart,
                release,
                namespace,
                values_path.as_deref(),
                environment,
            ),
            ApplyAction::Manifest {
                path,
            }
            | ApplyAction::ManifestDir {
                path,
            } => Err(RenderError::Parse {
                path: path.clone(),
                reason: "manifest actions require the file renderer".to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Plan Renderer
// ============================================================================

/// Composite renderer dispatching actions to the file or helm renderer.
#[derive(Debug, Clone)]
pub struct PlanRenderer {
    /// File and directory manifest renderer.
    files: FileRenderer,
    /// Chart release renderer.
    helm: HelmRenderer,
}

impl PlanRenderer {
    /// Creates a plan renderer over the given renderers.
    #[must_use]
    pub const fn new(files: FileRenderer, helm: HelmRenderer) -> Self {
        Self {
            files,
            helm,
        }
    }
}

impl ResourceRenderer for PlanRenderer {
    fn render(
        &self,
        action: &ApplyAction,
        environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError> {
        match action {
            ApplyAction::Manifest {
                ..
            }
            | ApplyAction::ManifestDir {
                ..
            } => self.files.render(action, environment),
            ApplyAction::ChartRelease {
                ..
            } => self.helm.render(action, environment),
        }
    }
}

// ============================================================================
// SECTION: Document Parsing
// ============================================================================

/// Parses a multi-document YAML stream into resource objects.
///
/// # Errors
///
/// Returns [`RenderError::Parse`] on the first unparseable or incomplete
/// document.
pub fn parse_documents(text: &str, origin: &str) -> Result<Vec<ResourceObject>, RenderError> {
    let mut objects = Vec::new();
    for chunk in split_documents(text) {
        if chunk.trim().is_empty() {
            continue;
        }
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&chunk).map_err(|err| RenderError::Parse {
                path: origin.to_string(),
                reason: err.to_string(),
            })?;
        if yaml.is_null() {
            continue;
        }
        let manifest = serde_json::to_value(&yaml).map_err(|err| RenderError::Parse {
            path: origin.to_string(),
            reason: err.to_string(),
        })?;
        objects.push(object_from_manifest(manifest, chunk, origin)?);
    }
    Ok(objects)
}

/// Splits a YAML stream on `---` document separators.
fn split_documents(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim_end() == "---" {
            chunks.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    chunks.push(current);
    chunks
}

/// Builds a resource object from a parsed manifest document.
fn object_from_manifest(
    manifest: Value,
    source_text: String,
    origin: &str,
) -> Result<ResourceObject, RenderError> {
    let kind = manifest
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::Parse {
            path: origin.to_string(),
            reason: "document has no kind".to_string(),
        })?
        .to_string();
    let metadata = manifest.get("metadata").ok_or_else(|| RenderError::Parse {
        path: origin.to_string(),
        reason: "document has no metadata".to_string(),
    })?;
    let name = metadata
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::Parse {
            path: origin.to_string(),
            reason: "document has no metadata.name".to_string(),
        })?
        .to_string();
    let namespace = metadata
        .get("namespace")
        .and_then(Value::as_str)
        .map(NamespaceId::new);
    let labels = metadata
        .get("labels")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| {
                    value.as_str().map(|value| (key.clone(), value.to_string()))
                })
                .collect::<BTreeMap<String, String>>()
        })
        .unwrap_or_default();

    Ok(ResourceObject {
        kind,
        name,
        namespace,
        labels,
        manifest,
        source_text,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Caps a rendered object list into a resource set.
fn bounded_set(objects: Vec<ResourceObject>) -> Result<ResourceSet, RenderError> {
    if objects.len() > MAX_RENDER_OBJECTS {
        return Err(RenderError::TooLarge(format!("{} rendered objects", objects.len())));
    }
    Ok(ResourceSet::new(objects))
}

/// Reads a file while enforcing the manifest size limit.
fn read_limited(path: &Path) -> Result<String, RenderError> {
    if !path.is_file() {
        return Err(RenderError::SourceMissing(path.display().to_string()));
    }
    let metadata = fs::metadata(path).map_err(|err| RenderError::Parse {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let limit = u64::try_from(MAX_MANIFEST_BYTES).map_err(|_| RenderError::Parse {
        path: path.display().to_string(),
        reason: "size limit exceeds u64".to_string(),
    })?;
    if metadata.len() > limit {
        return Err(RenderError::TooLarge(path.display().to_string()));
    }
    fs::read_to_string(path).map_err(|err| RenderError::Parse {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

/// Lists the YAML file names of a directory in lexicographic order.
fn yaml_file_names(dir: &Path) -> Result<Vec<String>, RenderError> {
    let entries = fs::read_dir(dir).map_err(|err| RenderError::Parse {
        path: dir.display().to_string(),
        reason: err.to_string(),
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| RenderError::Parse {
            path: dir.display().to_string(),
            reason: err.to_string(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml && let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Resolves the environment-specific values overlay, when present.
fn environment_values(values: &Path, environment: &EnvironmentId) -> Option<PathBuf> {
    let stem = values.file_stem()?.to_str()?;
    let extension = values.extension()?.to_str()?;
    let overlay = values.with_file_name(format!("{stem}-{environment}.{extension}"));
    overlay.is_file().then_some(overlay)
}
