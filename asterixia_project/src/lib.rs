use asterixia_scene::{
    AxisLineDesc, BodyKind, CelestialBodyDesc, Color, OrbitalPathDesc, SceneGraph,
};
use glam::Vec3;
use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};
use toml::{Table, Value};

pub const CONFIG_FILE: &str = "asterixia.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub fps_cap: u32,
    pub log_filter: String,
    /// Asset directory, relative to the config file unless absolute.
    pub assets: String,
    pub vertical_fov_deg: f32,
    pub night_mode: bool,
    pub night_intensity: f32,
    pub tap_debounce_ms: u64,
}

impl ViewerConfig {
    pub fn default_for_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            window_width: 1280,
            window_height: 720,
            fps_cap: 60,
            log_filter: "info".to_string(),
            assets: "assets".to_string(),
            vertical_fov_deg: 60.0,
            night_mode: false,
            night_intensity: 0.3,
            tap_debounce_ms: 300,
        }
    }

    pub fn assets_dir(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.assets);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

/// Initial scene listed in the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneManifest {
    pub bodies: Vec<CelestialBodyDesc>,
    pub orbits: Vec<OrbitalPathDesc>,
    pub axes: Vec<AxisLineDesc>,
}

impl SceneManifest {
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty() && self.orbits.is_empty() && self.axes.is_empty()
    }

    /// Adds every listed node to `scene` and returns how many were added.
    pub fn populate(&self, scene: &mut SceneGraph) -> usize {
        for body in &self.bodies {
            scene.add_celestial_body(body.clone());
        }
        for orbit in &self.orbits {
            scene.add_orbital_path(orbit.clone());
        }
        for axis in &self.axes {
            scene.add_axis_line(axis.clone());
        }
        self.bodies.len() + self.orbits.len() + self.axes.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerProject {
    pub config: ViewerConfig,
    pub scene: SceneManifest,
}

#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    ParseToml(toml::de::Error),
    MissingField(&'static str),
    InvalidField(&'static str, String),
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::ParseToml(err) => write!(f, "{err}"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidField(field, reason) => write!(f, "invalid field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<std::io::Error> for ProjectError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ProjectError {
    fn from(value: toml::de::Error) -> Self {
        Self::ParseToml(value)
    }
}

/// Writes a default config into `root` if none exists, then loads it.
pub fn bootstrap_viewer(root: &Path, default_name: &str) -> Result<ViewerProject, ProjectError> {
    fs::create_dir_all(root)?;
    ensure_viewer_toml(root, default_name)?;
    load_viewer_toml(root)
}

pub fn ensure_viewer_toml(root: &Path, default_name: &str) -> std::io::Result<()> {
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        return Ok(());
    }
    fs::write(path, default_viewer_toml(default_name))
}

pub fn load_viewer_toml(root: &Path) -> Result<ViewerProject, ProjectError> {
    let contents = fs::read_to_string(root.join(CONFIG_FILE))?;
    parse_viewer_toml(&contents)
}

pub fn default_viewer_toml(name: &str) -> String {
    format!(
        r##"[viewer]
name = "{name}"
window = "1280x720"
fps_cap = 60
log_filter = "info"
assets = "assets"

[camera]
vertical_fov_deg = 60.0

[night_mode]
enabled = false
intensity = 0.3

[input]
tap_debounce_ms = 300

[[body]]
name = "Sun"
kind = "star"
position = [0.0, 0.0, -2.0]
scale = 0.1
color = "#FFD700"
glow = 1.0

[[body]]
name = "Earth"
kind = "planet"
position = [0.5, 0.0, -2.0]
scale = 0.05
color = "#4169E1"
distance = 1.0

[[body]]
name = "Moon"
kind = "moon"
position = [0.6, 0.05, -2.0]
scale = 0.02
color = "#E0E0E0"
distance = 0.00257

[[orbit]]
planet = "Earth"
center = [0.0, 0.0, -2.0]
semi_major = 0.5
semi_minor = 0.48
inclination = 0.0
color = "#4169E1"

[[axis]]
name = "Earth axis"
body = "Earth"
length = 0.2
tilt = 23.4
color = "#00FFFF"
show_rotation = true
"##
    )
}

pub fn parse_viewer_toml(contents: &str) -> Result<ViewerProject, ProjectError> {
    let value: Value = contents.parse::<Value>()?;
    let mut config = ViewerConfig::default_for_name("Asterixia");

    if let Some(viewer) = table(&value, "viewer")? {
        if let Some(name) = viewer.get("name") {
            config.name = name
                .as_str()
                .ok_or_else(|| expected("viewer.name", "a string"))?
                .to_string();
        }
        if let Some(raw) = viewer.get("window") {
            let raw = raw
                .as_str()
                .ok_or_else(|| expected("viewer.window", "a string like `1280x720`"))?;
            (config.window_width, config.window_height) = parse_window(raw)?;
        } else {
            if let Some(w) = viewer.get("window_width") {
                config.window_width = positive_u32("viewer.window_width", w)?;
            }
            if let Some(h) = viewer.get("window_height") {
                config.window_height = positive_u32("viewer.window_height", h)?;
            }
        }
        if let Some(fps) = viewer.get("fps_cap") {
            config.fps_cap = positive_u32("viewer.fps_cap", fps)?;
        }
        if let Some(filter) = viewer.get("log_filter") {
            config.log_filter = filter
                .as_str()
                .ok_or_else(|| expected("viewer.log_filter", "a string"))?
                .to_string();
        }
        if let Some(assets) = viewer.get("assets") {
            config.assets = assets
                .as_str()
                .ok_or_else(|| expected("viewer.assets", "a string"))?
                .to_string();
        }
    }

    if let Some(fov) = table(&value, "camera")?.and_then(|t| t.get("vertical_fov_deg")) {
        let fov = number("camera.vertical_fov_deg", fov)?;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ProjectError::InvalidField(
                "camera.vertical_fov_deg",
                "must be between 0 and 180 degrees".to_string(),
            ));
        }
        config.vertical_fov_deg = fov;
    }

    if let Some(night) = table(&value, "night_mode")? {
        if let Some(enabled) = night.get("enabled") {
            config.night_mode = enabled
                .as_bool()
                .ok_or_else(|| expected("night_mode.enabled", "a boolean"))?;
        }
        if let Some(intensity) = night.get("intensity") {
            config.night_intensity = number("night_mode.intensity", intensity)?;
        }
    }

    if let Some(ms) = table(&value, "input")?.and_then(|t| t.get("tap_debounce_ms")) {
        let ms = ms
            .as_integer()
            .ok_or_else(|| expected("input.tap_debounce_ms", "an integer"))?;
        config.tap_debounce_ms = u64::try_from(ms).map_err(|_| {
            ProjectError::InvalidField("input.tap_debounce_ms", "must not be negative".to_string())
        })?;
    }

    let scene = SceneManifest {
        bodies: entries(&value, "body")?
            .iter()
            .enumerate()
            .map(|(i, t)| parse_body(i, t))
            .collect::<Result<_, _>>()?,
        orbits: entries(&value, "orbit")?
            .iter()
            .enumerate()
            .map(|(i, t)| parse_orbit(i, t))
            .collect::<Result<_, _>>()?,
        axes: entries(&value, "axis")?
            .iter()
            .enumerate()
            .map(|(i, t)| parse_axis(i, t))
            .collect::<Result<_, _>>()?,
    };

    Ok(ViewerProject { config, scene })
}

fn parse_body(index: usize, t: &Table) -> Result<CelestialBodyDesc, ProjectError> {
    let mut desc = CelestialBodyDesc {
        name: required_str(t, "name", "body.name")?,
        ..Default::default()
    };
    if let Some(kind) = t.get("kind") {
        let raw = kind
            .as_str()
            .ok_or_else(|| expected("body.kind", "a string"))?;
        desc.kind = raw
            .parse::<BodyKind>()
            .map_err(|e| ProjectError::InvalidField("body.kind", format!("entry {index}: {e}")))?;
    }
    if let Some(position) = t.get("position") {
        desc.position = vec3("body.position", index, position)?;
    }
    if let Some(scale) = t.get("scale") {
        desc.base_scale = number("body.scale", scale)?;
    }
    if let Some(color) = t.get("color") {
        desc.color = color_value("body.color", index, color)?;
    }
    if let Some(glow) = t.get("glow") {
        desc.glow_intensity = number("body.glow", glow)?;
    }
    if let Some(distance) = t.get("distance") {
        desc.real_distance = number("body.distance", distance)? as f64;
    }
    Ok(desc)
}

fn parse_orbit(index: usize, t: &Table) -> Result<OrbitalPathDesc, ProjectError> {
    let mut desc = OrbitalPathDesc {
        planet_name: required_str(t, "planet", "orbit.planet")?,
        ..Default::default()
    };
    if let Some(center) = t.get("center") {
        desc.center = vec3("orbit.center", index, center)?;
    }
    if let Some(a) = t.get("semi_major") {
        desc.semi_major_axis = number("orbit.semi_major", a)?;
    }
    if let Some(b) = t.get("semi_minor") {
        desc.semi_minor_axis = number("orbit.semi_minor", b)?;
    }
    if let Some(inclination) = t.get("inclination") {
        desc.inclination_deg = number("orbit.inclination", inclination)?;
    }
    if let Some(color) = t.get("color") {
        desc.color = color_value("orbit.color", index, color)?;
    }
    Ok(desc)
}

fn parse_axis(index: usize, t: &Table) -> Result<AxisLineDesc, ProjectError> {
    let mut desc = AxisLineDesc {
        name: required_str(t, "name", "axis.name")?,
        attached_body: required_str(t, "body", "axis.body")?,
        ..Default::default()
    };
    if let Some(length) = t.get("length") {
        desc.length = number("axis.length", length)?;
    }
    if let Some(tilt) = t.get("tilt") {
        desc.tilt_deg = number("axis.tilt", tilt)?;
    }
    if let Some(color) = t.get("color") {
        desc.color = color_value("axis.color", index, color)?;
    }
    if let Some(show) = t.get("show_rotation") {
        desc.show_rotation = show
            .as_bool()
            .ok_or_else(|| expected("axis.show_rotation", "a boolean"))?;
    }
    Ok(desc)
}

fn table<'a>(value: &'a Value, key: &'static str) -> Result<Option<&'a Table>, ProjectError> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_table()
            .map(Some)
            .ok_or_else(|| expected(key, "a table")),
    }
}

fn entries<'a>(value: &'a Value, key: &'static str) -> Result<Vec<&'a Table>, ProjectError> {
    let Some(raw) = value.get(key) else {
        return Ok(Vec::new());
    };
    let array = raw
        .as_array()
        .ok_or_else(|| expected(key, "an array of tables, written `[[...]]`"))?;
    array
        .iter()
        .map(|v| v.as_table().ok_or_else(|| expected(key, "an array of tables")))
        .collect()
}

fn expected(field: &'static str, what: &str) -> ProjectError {
    ProjectError::InvalidField(field, format!("expected {what}"))
}

fn required_str(t: &Table, key: &str, field: &'static str) -> Result<String, ProjectError> {
    t.get(key)
        .ok_or(ProjectError::MissingField(field))?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| expected(field, "a string"))
}

fn number(field: &'static str, value: &Value) -> Result<f32, ProjectError> {
    let n = match value {
        Value::Float(f) => *f as f32,
        Value::Integer(i) => *i as f32,
        _ => return Err(expected(field, "a number")),
    };
    if !n.is_finite() {
        return Err(expected(field, "a finite number"));
    }
    Ok(n)
}

fn positive_u32(field: &'static str, value: &Value) -> Result<u32, ProjectError> {
    let raw = value
        .as_integer()
        .ok_or_else(|| expected(field, "an integer"))?;
    match u32::try_from(raw) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ProjectError::InvalidField(
            field,
            "must be a positive integer".to_string(),
        )),
    }
}

fn vec3(field: &'static str, index: usize, value: &Value) -> Result<Vec3, ProjectError> {
    let array = value
        .as_array()
        .filter(|a| a.len() == 3)
        .ok_or_else(|| {
            ProjectError::InvalidField(field, format!("entry {index}: expected [x, y, z]"))
        })?;
    Ok(Vec3::new(
        number(field, &array[0])?,
        number(field, &array[1])?,
        number(field, &array[2])?,
    ))
}

fn color_value(field: &'static str, index: usize, value: &Value) -> Result<Color, ProjectError> {
    let raw = value
        .as_str()
        .ok_or_else(|| expected(field, "a hex string like `#RRGGBB`"))?;
    Color::from_hex(raw)
        .map_err(|e| ProjectError::InvalidField(field, format!("entry {index}: {e}")))
}

fn parse_window(raw: &str) -> Result<(u32, u32), ProjectError> {
    let raw = raw.trim().to_ascii_lowercase();
    let (w, h) = raw.split_once('x').ok_or(ProjectError::InvalidField(
        "viewer.window",
        "expected format `WIDTHxHEIGHT`, for example `1280x720`".to_string(),
    ))?;

    let width = w.trim().parse::<u32>().map_err(|_| {
        ProjectError::InvalidField("viewer.window", "invalid width component".to_string())
    })?;
    let height = h.trim().parse::<u32>().map_err(|_| {
        ProjectError::InvalidField("viewer.window", "invalid height component".to_string())
    })?;
    if width == 0 || height == 0 {
        return Err(ProjectError::InvalidField(
            "viewer.window",
            "window size must be greater than 0".to_string(),
        ));
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_round_trips_through_parser() {
        let project = parse_viewer_toml(&default_viewer_toml("Sky")).expect("default must parse");
        assert_eq!(project.config.name, "Sky");
        assert_eq!(
            (project.config.window_width, project.config.window_height),
            (1280, 720)
        );
        assert_eq!(project.config.tap_debounce_ms, 300);
        assert_eq!(project.scene.bodies.len(), 3);
        assert_eq!(project.scene.bodies[0].kind, BodyKind::Star);
        assert_eq!(project.scene.orbits[0].planet_name, "Earth");
        assert_eq!(project.scene.axes[0].tilt_deg, 23.4);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let project = parse_viewer_toml("").expect("empty config is valid");
        assert_eq!(project.config, ViewerConfig::default_for_name("Asterixia"));
        assert!(project.scene.is_empty());
    }

    #[test]
    fn split_window_dimensions() {
        let project = parse_viewer_toml(
            r#"
[viewer]
window_width = 800
window_height = 600
"#,
        )
        .expect("failed to parse");
        assert_eq!(project.config.window_width, 800);
        assert_eq!(project.config.window_height, 600);
    }

    #[test]
    fn integer_numbers_are_accepted() {
        let project = parse_viewer_toml(
            r#"
[camera]
vertical_fov_deg = 45

[[body]]
name = "Mars"
position = [1, 0, -3]
"#,
        )
        .expect("failed to parse");
        assert_eq!(project.config.vertical_fov_deg, 45.0);
        assert_eq!(project.scene.bodies[0].position, Vec3::new(1.0, 0.0, -3.0));
        assert_eq!(project.scene.bodies[0].kind, BodyKind::Planet);
    }

    #[test]
    fn rejects_bad_window() {
        let err = parse_viewer_toml("[viewer]\nwindow = \"wide\"\n").expect_err("must fail");
        assert!(matches!(err, ProjectError::InvalidField("viewer.window", _)));
        let err = parse_viewer_toml("[viewer]\nwindow = \"0x10\"\n").expect_err("must fail");
        assert!(matches!(err, ProjectError::InvalidField("viewer.window", _)));
    }

    #[test]
    fn rejects_unknown_body_kind() {
        let err = parse_viewer_toml("[[body]]\nname = \"X\"\nkind = \"comet\"\n")
            .expect_err("must fail");
        assert!(matches!(err, ProjectError::InvalidField("body.kind", _)));
    }

    #[test]
    fn body_needs_a_name() {
        let err = parse_viewer_toml("[[body]]\nscale = 1.0\n").expect_err("must fail");
        assert!(matches!(err, ProjectError::MissingField("body.name")));
    }

    #[test]
    fn rejects_bad_color_and_position() {
        let err = parse_viewer_toml("[[axis]]\nname = \"a\"\nbody = \"b\"\ncolor = \"#12\"\n")
            .expect_err("must fail");
        assert!(matches!(err, ProjectError::InvalidField("axis.color", _)));

        let err = parse_viewer_toml("[[orbit]]\nplanet = \"p\"\ncenter = [1.0, 2.0]\n")
            .expect_err("must fail");
        assert!(matches!(err, ProjectError::InvalidField("orbit.center", _)));
    }

    #[test]
    fn fov_out_of_range() {
        let err = parse_viewer_toml("[camera]\nvertical_fov_deg = 190.0\n").expect_err("must fail");
        assert!(matches!(
            err,
            ProjectError::InvalidField("camera.vertical_fov_deg", _)
        ));
    }

    #[test]
    fn negative_debounce_is_rejected() {
        let err = parse_viewer_toml("[input]\ntap_debounce_ms = -5\n").expect_err("must fail");
        assert!(matches!(
            err,
            ProjectError::InvalidField("input.tap_debounce_ms", _)
        ));
    }

    #[test]
    fn manifest_populates_scene() {
        let project = parse_viewer_toml(&default_viewer_toml("Sky")).expect("default must parse");
        let mut scene = SceneGraph::new();
        assert_eq!(project.scene.populate(&mut scene), 5);
        assert_eq!(scene.len(), 5);
        assert!(scene.find_body_by_name("Earth").is_some());
        assert_eq!(scene.guide_lines().count(), 1);
        assert_eq!(scene.axis_lines().count(), 1);
    }

    #[test]
    fn assets_dir_is_relative_to_root() {
        let config = ViewerConfig::default_for_name("x");
        assert_eq!(
            config.assets_dir(Path::new("sky")),
            Path::new("sky").join("assets")
        );
    }

    #[test]
    fn bootstrap_writes_and_loads_default() {
        let root = std::env::temp_dir().join(format!(
            "asterixia-bootstrap-{}-{}",
            std::process::id(),
            line!()
        ));
        let _ = fs::remove_dir_all(&root);
        let project = bootstrap_viewer(&root, "Fresh").expect("bootstrap");
        assert_eq!(project.config.name, "Fresh");
        assert!(root.join(CONFIG_FILE).exists());

        fs::write(root.join(CONFIG_FILE), "[viewer]\nname = \"Edited\"\n").expect("write");
        let again = bootstrap_viewer(&root, "Ignored").expect("bootstrap again");
        assert_eq!(again.config.name, "Edited");
        let _ = fs::remove_dir_all(&root);
    }
}
