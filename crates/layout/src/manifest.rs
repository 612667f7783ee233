use crate::{GridSpec, LayoutError};
use driftgrid_common::{Rect, Tuning};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File extensions picked up by [`LayoutManifest::from_image_dir`].
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tif", "tiff"];

/// One grid cell: where it sits and which image it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    /// Image path, relative to the manifest directory unless absolute.
    pub src: String,
    pub rect: Rect,
}

/// The container and its planes, plus optional effect tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutManifest {
    pub container: Rect,
    pub planes: Vec<PlaneSpec>,
    #[serde(default)]
    pub tuning: Tuning,
    /// Directory relative sources resolve against. Set on load.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, LayoutError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(LayoutError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl LayoutManifest {
    pub fn new(container: Rect, planes: Vec<PlaneSpec>) -> Self {
        Self {
            container,
            planes,
            tuning: Tuning::default(),
            base_dir: None,
        }
    }

    /// Lay out `sources` on a regular grid.
    pub fn from_grid(spec: &GridSpec, sources: Vec<String>) -> Self {
        let planes = sources
            .into_iter()
            .enumerate()
            .map(|(i, src)| PlaneSpec {
                src,
                rect: spec.cell_rect(i),
            })
            .collect::<Vec<_>>();
        let container = spec.container(planes.len());
        Self::new(container, planes)
    }

    /// Lay out every image file in `dir` (sorted by file name) on a grid.
    pub fn from_image_dir(dir: impl AsRef<Path>, spec: &GridSpec) -> Result<Self, LayoutError> {
        let dir = dir.as_ref();
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_image(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();

        if names.is_empty() {
            return Err(LayoutError::Invalid(format!(
                "no images found in {}",
                dir.display()
            )));
        }

        tracing::debug!("laid out {} images from {}", names.len(), dir.display());
        let mut manifest = Self::from_grid(spec, names);
        manifest.base_dir = Some(dir.to_path_buf());
        Ok(manifest)
    }

    /// Load and validate a manifest. Format is chosen by file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let data = std::fs::read_to_string(path)?;
        let mut manifest: Self = match format {
            Format::Yaml => serde_yaml::from_str(&data)?,
            Format::Json => serde_json::from_str(&data)?,
        };
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        manifest.validate()?;
        tracing::debug!(
            "loaded layout {} with {} planes",
            path.display(),
            manifest.planes.len()
        );
        Ok(manifest)
    }

    /// Save the manifest. Format is chosen by file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let path = path.as_ref();
        let text = match Format::of(path)? {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, LayoutError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rewrite relative sources as absolute paths so the manifest can be
    /// saved into `dir` and still find its images.
    pub fn rebase(&mut self, dir: impl Into<PathBuf>) -> Result<(), LayoutError> {
        let dir = dir.into();
        if self.base_dir.as_deref() == Some(dir.as_path()) {
            return Ok(());
        }
        for i in 0..self.planes.len() {
            let resolved = std::path::absolute(self.resolve_src(&self.planes[i].src))?;
            self.planes[i].src = resolved.to_string_lossy().into_owned();
        }
        self.base_dir = Some(dir);
        Ok(())
    }

    /// Check the structural invariants of the layout.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let c = &self.container;
        if !(c.width > 0.0 && c.height > 0.0) {
            return Err(LayoutError::Invalid(format!(
                "container must have positive size, got {}x{}",
                c.width, c.height
            )));
        }
        // The wrap period is the container's bottom-right corner.
        let origin_ok = c.left >= 0.0 && c.top >= 0.0;
        if !origin_ok || !(c.right().is_finite() && c.bottom().is_finite()) {
            return Err(LayoutError::Invalid(format!(
                "container must start at a non-negative finite origin, got ({}, {})",
                c.left, c.top
            )));
        }
        validate_tuning(&self.tuning)?;
        if self.planes.is_empty() {
            return Err(LayoutError::Invalid("layout has no planes".into()));
        }
        for (i, plane) in self.planes.iter().enumerate() {
            let r = &plane.rect;
            if !(r.width > 0.0 && r.height > 0.0) {
                return Err(LayoutError::Invalid(format!(
                    "plane {i} ({}) must have positive size",
                    plane.src
                )));
            }
            if !c.contains(r) {
                return Err(LayoutError::Invalid(format!(
                    "plane {i} ({}) lies outside the container",
                    plane.src
                )));
            }
        }
        Ok(())
    }

    /// Absolute path of a plane's image.
    pub fn resolve_src(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

fn validate_tuning(t: &Tuning) -> Result<(), LayoutError> {
    let invalid = |msg: String| Err(LayoutError::Invalid(format!("tuning: {msg}")));
    if !(t.ease > 0.0 && t.ease <= 1.0) {
        return invalid(format!("ease must be in (0, 1], got {}", t.ease));
    }
    if t.precision > Tuning::MAX_PRECISION {
        return invalid(format!(
            "precision must be at most {}, got {}",
            Tuning::MAX_PRECISION,
            t.precision
        ));
    }
    for (name, value) in [
        ("diff_scale", t.diff_scale),
        ("drag_scale", t.drag_scale),
        ("weight_step", t.weight_step),
    ] {
        if !value.is_finite() {
            return invalid(format!("{name} must be finite, got {value}"));
        }
    }
    if t.weight_period == 0 {
        return invalid("weight_period must be positive".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LayoutManifest {
        LayoutManifest::new(
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                PlaneSpec {
                    src: "a.png".into(),
                    rect: Rect::new(10.0, 10.0, 100.0, 100.0),
                },
                PlaneSpec {
                    src: "b.png".into(),
                    rect: Rect::new(200.0, 150.0, 100.0, 100.0),
                },
            ],
        )
    }

    #[test]
    fn valid_manifest_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_layout_rejected() {
        let m = LayoutManifest::new(Rect::new(0.0, 0.0, 100.0, 100.0), vec![]);
        assert!(matches!(m.validate(), Err(LayoutError::Invalid(_))));
    }

    #[test]
    fn plane_outside_container_rejected() {
        let mut m = sample();
        m.planes[1].rect.left = 350.0;
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("outside the container"));
    }

    #[test]
    fn zero_sized_plane_rejected() {
        let mut m = sample();
        m.planes[0].rect.width = 0.0;
        assert!(m.validate().is_err());
    }

    #[test]
    fn yaml_round_trip_keeps_tuning_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        let mut m = sample();
        m.tuning.ease = 0.2;
        m.save(&path).unwrap();

        let loaded = LayoutManifest::load(&path).unwrap();
        assert_eq!(loaded.planes, m.planes);
        assert_eq!(loaded.tuning.ease, 0.2);
        assert_eq!(loaded.base_dir(), Some(dir.path()));
    }

    #[test]
    fn json_without_tuning_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(
            &path,
            r#"{
                "container": { "left": 0, "top": 0, "width": 500, "height": 500 },
                "planes": [
                    { "src": "img/one.jpg", "rect": { "left": 0, "top": 0, "width": 250, "height": 250 } }
                ]
            }"#,
        )
        .unwrap();

        let loaded = LayoutManifest::load(&path).unwrap();
        assert_eq!(loaded.tuning, Tuning::default());
        assert_eq!(
            loaded.resolve_src("img/one.jpg"),
            dir.path().join("img/one.jpg")
        );
    }

    #[test]
    fn partial_tuning_fills_defaults() {
        let yaml = r#"
container: { left: 0, top: 0, width: 100, height: 100 }
planes:
  - src: x.png
    rect: { left: 0, top: 0, width: 50, height: 50 }
tuning:
  drag_scale: 4.0
"#;
        let m: LayoutManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(m.tuning.drag_scale, 4.0);
        assert_eq!(m.tuning.ease, 0.085);
    }

    #[test]
    fn unsupported_extension() {
        let err = LayoutManifest::load("layout.toml").unwrap_err();
        assert!(matches!(err, LayoutError::UnsupportedFormat(_)));
    }

    #[test]
    fn image_dir_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.png", "a.jpg", "notes.txt", "b.webp"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let spec = GridSpec {
            columns: 2,
            ..GridSpec::default()
        };
        let m = LayoutManifest::from_image_dir(dir.path(), &spec).unwrap();
        let srcs: Vec<&str> = m.planes.iter().map(|p| p.src.as_str()).collect();
        assert_eq!(srcs, ["a.jpg", "b.webp", "c.png"]);
        assert!(m.validate().is_ok());
        assert_eq!(m.resolve_src("a.jpg"), dir.path().join("a.jpg"));
    }

    #[test]
    fn image_dir_without_images_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = LayoutManifest::from_image_dir(dir.path(), &GridSpec::default()).unwrap_err();
        assert!(matches!(err, LayoutError::Invalid(_)));
    }

    #[test]
    fn rebase_keeps_sources_resolvable() {
        let mut m = sample().with_base_dir("/srv/grid");
        m.rebase("/srv/out").unwrap();
        assert_eq!(m.planes[0].src, "/srv/grid/a.png");
        assert_eq!(m.resolve_src(&m.planes[0].src), PathBuf::from("/srv/grid/a.png"));
        assert!(m.to_yaml().unwrap().contains("/srv/grid/b.png"));
    }

    #[test]
    fn rebase_from_relative_dir_is_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let mut m = sample().with_base_dir("pics");
        m.rebase("out").unwrap();
        assert!(Path::new(&m.planes[0].src).is_absolute());
        assert_eq!(m.resolve_src(&m.planes[0].src), cwd.join("pics").join("a.png"));
    }

    #[test]
    fn rebased_manifest_loads_from_new_dir() {
        let dir = tempfile::tempdir().unwrap();
        let pics = dir.path().join("pics");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&pics).unwrap();
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(pics.join("a.png"), b"").unwrap();

        let mut m = LayoutManifest::from_image_dir(&pics, &GridSpec::default()).unwrap();
        m.rebase(&out).unwrap();
        m.save(out.join("layout.yaml")).unwrap();

        let loaded = LayoutManifest::load(out.join("layout.yaml")).unwrap();
        assert!(loaded.resolve_src(&loaded.planes[0].src).exists());
    }

    #[test]
    fn container_with_negative_origin_rejected() {
        let m = LayoutManifest::new(
            Rect::new(-1000.0, -1000.0, 500.0, 500.0),
            vec![PlaneSpec {
                src: "a.png".into(),
                rect: Rect::new(-900.0, -900.0, 100.0, 100.0),
            }],
        );
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("origin"));
    }

    #[test]
    fn bad_tuning_in_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yaml");
        for tuning in [
            "{ precision: 400 }",
            "{ precision: 4294967295 }",
            "{ ease: 0.0 }",
            "{ ease: 1.5 }",
            "{ ease: .nan }",
            "{ drag_scale: .inf }",
            "{ diff_scale: .nan }",
            "{ weight_period: 0 }",
        ] {
            let yaml = format!(
                "container: {{ left: 0, top: 0, width: 100, height: 100 }}\n\
                 planes:\n  - src: x.png\n    rect: {{ left: 0, top: 0, width: 50, height: 50 }}\n\
                 tuning: {tuning}\n"
            );
            std::fs::write(&path, yaml).unwrap();
            let err = LayoutManifest::load(&path).unwrap_err();
            assert!(matches!(err, LayoutError::Invalid(_)), "accepted {tuning}");
        }
    }

    #[test]
    fn tuning_at_limits_accepted() {
        let mut m = sample();
        m.tuning.ease = 1.0;
        m.tuning.precision = Tuning::MAX_PRECISION;
        assert!(m.validate().is_ok());
    }

    #[test]
    fn absolute_src_is_untouched() {
        let m = sample().with_base_dir("/srv/grid");
        assert_eq!(m.resolve_src("/tmp/x.png"), PathBuf::from("/tmp/x.png"));
        assert_eq!(m.resolve_src("x.png"), PathBuf::from("/srv/grid/x.png"));
    }
}
