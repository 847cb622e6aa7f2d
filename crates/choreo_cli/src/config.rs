//! Scene file handling
//!
//! A scene is a TOML document with an optional `[engine]` table and a
//! `[root]` animation description. Composites nest their children as
//! `[[root.children]]` arrays or a single `[root.child]` table.

use anyhow::{Context, Result};
use choreo_animation::{Curve, EngineConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SceneError;

/// Top-level scene description (`*.toml`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub engine: EngineSection,
    pub root: NodeDescription,
}

/// Engine tunables
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSection {
    /// Root duration used when nothing in the tree is sized (seconds)
    #[serde(default = "default_duration")]
    pub default_duration: f64,
    #[serde(default = "default_split_step")]
    pub split_step: f64,
    #[serde(default = "default_cache_capacity")]
    pub curve_cache_capacity: usize,
    /// Frames per second used by `choreo play`
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

fn default_duration() -> f64 {
    EngineConfig::default().default_duration
}

fn default_split_step() -> f64 {
    EngineConfig::default().split_step
}

fn default_cache_capacity() -> usize {
    EngineConfig::default().curve_cache_capacity
}

fn default_frame_rate() -> u32 {
    EngineConfig::default().frame_rate
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
            split_step: default_split_step(),
            curve_cache_capacity: default_cache_capacity(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl EngineSection {
    /// Convert to a validated [`EngineConfig`]
    pub fn to_engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig::default()
            .with_default_duration(self.default_duration)
            .with_split_step(self.split_step)
            .with_curve_cache_capacity(self.curve_cache_capacity)
            .with_frame_rate(self.frame_rate);
        config.validate().context("Invalid [engine] table")?;
        Ok(config)
    }
}

/// Kind of a described node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Sequential,
    Parallel,
    Repeat,
    Autoreverse,
    Tween,
    Wait,
    Instant,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Sequential => "sequential",
            NodeKind::Parallel => "parallel",
            NodeKind::Repeat => "repeat",
            NodeKind::Autoreverse => "autoreverse",
            NodeKind::Tween => "tween",
            NodeKind::Wait => "wait",
            NodeKind::Instant => "instant",
        }
    }

    /// Takes a list of `children`
    pub fn is_group(&self) -> bool {
        matches!(self, NodeKind::Sequential | NodeKind::Parallel)
    }

    /// Wraps a single `child`
    pub fn is_wrapper(&self) -> bool {
        matches!(self, NodeKind::Repeat | NodeKind::Autoreverse)
    }
}

/// One node of the described tree
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeDescription {
    pub kind: NodeKind,
    /// Label used in reports, defaults to the node's path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absolute duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Fraction of the parent's duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<f64>,
    /// `linear`, `ease-in-out`, `cubic-bezier(x1, y1, x2, y2)`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    /// Repeat count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Repeat until stopped
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forever: bool,
    /// Tween start value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    /// Tween end value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<NodeDescription>>,
}

impl NodeDescription {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            duration: None,
            relative: None,
            curve: None,
            complete: None,
            count: None,
            forever: false,
            from: None,
            to: None,
            children: Vec::new(),
            child: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn seconds(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_curve(mut self, curve: &str) -> Self {
        self.curve = Some(curve.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<NodeDescription>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Label shown for this node, `path` when it has no name
    pub fn label(&self, path: &str) -> String {
        self.name.clone().unwrap_or_else(|| path.to_string())
    }

    /// Described children, in order
    pub fn nested(&self) -> Vec<&NodeDescription> {
        match &self.child {
            Some(child) => vec![child.as_ref()],
            None => self.children.iter().collect(),
        }
    }

    /// Parsed curve, if one is given
    pub fn parsed_curve(&self, path: &str) -> Result<Option<Curve>, SceneError> {
        self.curve
            .as_deref()
            .map(|text| {
                text.parse::<Curve>().map_err(|source| SceneError::Curve {
                    path: path.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Check the shape of this node and its descendants
    pub fn validate(&self, path: &str) -> Result<(), SceneError> {
        if self.duration.is_some() && self.relative.is_some() {
            return Err(SceneError::ConflictingDuration(path.to_string()));
        }
        self.parsed_curve(path)?;

        if self.kind.is_wrapper() {
            if self.child.is_none() || !self.children.is_empty() {
                return Err(SceneError::WrapperChild {
                    path: path.to_string(),
                    kind: self.kind.as_str(),
                });
            }
        } else if !self.kind.is_group() && (self.child.is_some() || !self.children.is_empty()) {
            return Err(SceneError::LeafChildren {
                path: path.to_string(),
                kind: self.kind.as_str(),
            });
        } else if self.child.is_some() {
            return Err(SceneError::GroupChild {
                path: path.to_string(),
                kind: self.kind.as_str(),
            });
        }

        if self.kind == NodeKind::Repeat && self.forever && self.count.is_some() {
            return Err(SceneError::ConflictingCount(path.to_string()));
        }

        for (i, child) in self.nested().into_iter().enumerate() {
            child.validate(&format!("{path}/{i}"))?;
        }
        Ok(())
    }
}

impl SceneConfig {
    /// Load and validate a scene file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("No scene file found at {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded scene");
        Ok(config)
    }

    /// Parse and validate a scene from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(content).context("Failed to parse scene")?;
        config.root.validate("root")?;
        Ok(config)
    }

    /// A small scene showing every node kind
    pub fn sample() -> Self {
        let tween = |name: &str, from: f64, to: f64| {
            let mut node = NodeDescription::new(NodeKind::Tween).named(name);
            node.from = Some(from);
            node.to = Some(to);
            node
        };

        let mut pulse = NodeDescription::new(NodeKind::Repeat).with_child(
            NodeDescription::new(NodeKind::Autoreverse)
                .with_child(tween("scale", 1.0, 1.2).seconds(0.25)),
        );
        pulse.count = Some(2);

        let mut gap = NodeDescription::new(NodeKind::Wait);
        gap.relative = Some(0.1);

        let root = NodeDescription::new(NodeKind::Sequential)
            .named("intro")
            .with_curve("ease-in-out")
            .with_children(vec![
                NodeDescription::new(NodeKind::Parallel).with_children(vec![
                    tween("opacity", 0.0, 1.0).seconds(0.5),
                    tween("offset", 40.0, 0.0).seconds(1.0),
                ]),
                gap,
                NodeDescription::new(NodeKind::Instant).named("ping"),
                pulse,
            ]);

        Self {
            engine: EngineSection::default(),
            root,
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize scene")
    }
}
