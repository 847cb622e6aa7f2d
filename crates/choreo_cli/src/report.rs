//! Schedule reports
//!
//! Walks a scene description and its resolved animation tree side by side
//! and produces a serializable snapshot of every node.

use choreo_animation::Animation;
use serde::Serialize;
use std::fmt::Write;

use crate::config::NodeDescription;

/// Snapshot of one node of a resolved tree
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub label: String,
    pub kind: String,
    /// Progress range within the parent
    pub range: [f64; 2],
    /// Resolved duration in seconds
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    pub progress: f64,
    pub phase: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeReport>,
}

impl NodeReport {
    pub fn new(desc: &NodeDescription, node: &Animation) -> Self {
        Self::walk(desc, node, "root", [0.0, 1.0])
    }

    fn walk(desc: &NodeDescription, node: &Animation, path: &str, range: [f64; 2]) -> Self {
        let schedule = node.schedule();
        let children = desc
            .nested()
            .into_iter()
            .zip(node.children())
            .enumerate()
            .map(|(i, (child_desc, child))| {
                let range = schedule
                    .get(i)
                    .map_or([0.0, 1.0], |slot| [*slot.range.start(), *slot.range.end()]);
                Self::walk(child_desc, child, &format!("{path}/{i}"), range)
            })
            .collect();

        Self {
            label: desc.label(path),
            kind: desc.kind.as_str().to_string(),
            range,
            duration: node.resolved_duration(),
            curve: node.effective_curve().map(|curve| curve.to_string()),
            progress: node.progress(),
            phase: node.phase().to_string(),
            children,
        }
    }

    /// Number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeReport::count).sum::<usize>()
    }

    /// Indented one-line-per-node rendering
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(
            out,
            "{indent}{} ({}) [{:.3}, {:.3}] {:.3}s progress {:.3} {}",
            self.label,
            self.kind,
            self.range[0],
            self.range[1],
            self.duration,
            self.progress,
            self.phase,
        );
        if let Some(curve) = &self.curve {
            let _ = write!(out, " curve {curve}");
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::scene::Scene;

    const SCENE: &str = r#"
        [root]
        kind = "sequential"
        name = "intro"

        [[root.children]]
        kind = "wait"
        duration = 1.0

        [[root.children]]
        kind = "autoreverse"
        [root.children.child]
        kind = "tween"
        name = "fade"
        duration = 1.5
    "#;

    fn report() -> NodeReport {
        let config = SceneConfig::from_toml(SCENE).unwrap();
        let scene = Scene::build(&config).unwrap();
        NodeReport::new(&config.root, scene.timeline.root())
    }

    #[test]
    fn test_report_tree() {
        let report = report();
        assert_eq!(report.label, "intro");
        assert_eq!(report.duration, 4.0);
        assert_eq!(report.count(), 4);
        assert_eq!(report.children[0].label, "root/0");
        assert_eq!(report.children[0].range, [0.0, 0.25]);
        assert_eq!(report.children[1].range, [0.25, 1.0]);
        assert_eq!(report.children[1].children[0].label, "fade");
        assert_eq!(report.children[1].children[0].duration, 1.5);
    }

    #[test]
    fn test_render_indents_children() {
        let text = report().render();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("intro (sequential) [0.000, 1.000] 4.000s"));
        assert!(lines[3].starts_with("    fade (tween)"));
        assert!(lines[0].ends_with("idle"));
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(report()).unwrap();
        assert_eq!(value["kind"], "sequential");
        assert_eq!(value["children"][1]["kind"], "autoreverse");
        assert!(value["children"][0].get("children").is_none());
        assert!(value.get("curve").is_none());
    }
}
