//! Building live animation trees from scene descriptions
//!
//! Every tween writes into a shared probe and every instant counts its
//! firings, so the CLI can print what the leaves saw without a renderer.

use anyhow::Result;
use choreo_animation::{Animation, AnimationOptions, Duration, Timeline};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::{NodeDescription, NodeKind, SceneConfig};
use crate::error::SceneError;

/// What a probe observes
#[derive(Clone, Debug)]
pub enum Reading {
    /// Last value written by a tween
    Value(Rc<Cell<f64>>),
    /// Number of times an instant fired
    Fired(Rc<Cell<usize>>),
}

impl Reading {
    pub fn display(&self) -> String {
        match self {
            Reading::Value(value) => format!("{:.4}", value.get()),
            Reading::Fired(count) => format!("fired x{}", count.get()),
        }
    }
}

/// A labelled leaf observer
#[derive(Clone, Debug)]
pub struct Probe {
    pub label: String,
    pub reading: Reading,
}

/// A timeline built from a scene together with its leaf probes
pub struct Scene {
    pub timeline: Timeline,
    pub probes: Vec<Probe>,
    completions: Rc<RefCell<Vec<bool>>>,
}

impl Scene {
    pub fn build(config: &SceneConfig) -> Result<Self> {
        let engine = config.engine.to_engine_config()?;
        let mut probes = Vec::new();
        let root = build_node(&config.root, "root", &mut probes)?;

        let mut timeline = Timeline::with_config(root, engine);
        let completions = Rc::new(RefCell::new(Vec::new()));
        let sink = completions.clone();
        timeline.on_complete(move |done| sink.borrow_mut().push(done));

        tracing::debug!(
            duration = timeline.duration(),
            probes = probes.len(),
            "built scene"
        );
        Ok(Self {
            timeline,
            probes,
            completions,
        })
    }

    /// Completion results reported by the root so far
    #[cfg(test)]
    pub fn completions(&self) -> Vec<bool> {
        self.completions.borrow().clone()
    }

    /// Split into the timeline, its probes and the shared completion log
    pub fn into_parts(self) -> (Timeline, Vec<Probe>, Rc<RefCell<Vec<bool>>>) {
        (self.timeline, self.probes, self.completions)
    }

    /// Current probe readings as `label = reading` pairs
    pub fn readings(&self) -> Vec<(String, String)> {
        self.probes
            .iter()
            .map(|probe| (probe.label.clone(), probe.reading.display()))
            .collect()
    }
}

fn build_node(
    desc: &NodeDescription,
    path: &str,
    probes: &mut Vec<Probe>,
) -> Result<Animation, SceneError> {
    let nested = desc.nested();
    let mut children = nested
        .iter()
        .enumerate()
        .map(|(i, child)| build_node(child, &format!("{path}/{i}"), probes))
        .collect::<Result<Vec<_>, _>>()?;

    let node = match desc.kind {
        NodeKind::Sequential => Animation::sequential(children),
        NodeKind::Parallel => Animation::parallel(children),
        NodeKind::Repeat | NodeKind::Autoreverse => {
            let child = children.pop().ok_or_else(|| SceneError::WrapperChild {
                path: path.to_string(),
                kind: desc.kind.as_str(),
            })?;
            match (desc.kind, desc.forever) {
                (NodeKind::Autoreverse, _) => child.autoreverse(),
                (_, true) => child.repeat_forever(),
                (_, false) => child.repeat(desc.count.unwrap_or(1)),
            }
        }
        NodeKind::Tween => {
            let value = Rc::new(Cell::new(desc.from.unwrap_or(0.0)));
            let sink = value.clone();
            probes.push(Probe {
                label: desc.label(path),
                reading: Reading::Value(value),
            });
            Animation::tween(
                desc.from.unwrap_or(0.0),
                desc.to.unwrap_or(1.0),
                move |v: f64| sink.set(v),
            )
        }
        NodeKind::Wait => Animation::wait(),
        NodeKind::Instant => {
            let count = Rc::new(Cell::new(0));
            let sink = count.clone();
            probes.push(Probe {
                label: desc.label(path),
                reading: Reading::Fired(count),
            });
            Animation::instant(move || sink.set(sink.get() + 1))
        }
    };

    Ok(node.with_options(options(desc, path)?))
}

fn options(desc: &NodeDescription, path: &str) -> Result<AnimationOptions, SceneError> {
    let mut options = AnimationOptions::new();
    if let Some(seconds) = desc.duration {
        options = options.with_duration(Duration::seconds(seconds));
    }
    if let Some(fraction) = desc.relative {
        options = options.with_duration(Duration::relative(fraction));
    }
    if let Some(curve) = desc.parsed_curve(path)? {
        options = options.curve(curve);
    }
    if let Some(complete) = desc.complete {
        options = options.complete(complete);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo_animation::{AnimationKind, Position};

    fn scene(text: &str) -> Scene {
        let config = SceneConfig::from_toml(text).unwrap();
        Scene::build(&config).unwrap()
    }

    #[test]
    fn test_build_sample() {
        let scene = Scene::build(&SceneConfig::sample()).unwrap();
        let root = scene.timeline.root();
        assert_eq!(root.kind(), AnimationKind::Sequential);
        assert_eq!(root.children()[3].kind(), AnimationKind::Repeat);
        let labels: Vec<_> = scene.probes.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["opacity", "offset", "ping", "scale"]);
    }

    #[test]
    fn test_tween_probe_follows_seek() {
        let mut scene = scene(
            r#"
            [root]
            kind = "tween"
            duration = 2.0
            from = 10.0
            to = 20.0
            "#,
        );
        assert_eq!(scene.timeline.duration(), 2.0);
        scene.timeline.set_position(Position::Progress(0.5));
        assert_eq!(scene.readings(), vec![("root".to_string(), "15.0000".to_string())]);
    }

    #[test]
    fn test_completion_recorded() {
        let mut scene = scene(
            r#"
            [root]
            kind = "sequential"

            [[root.children]]
            kind = "wait"
            duration = 0.5

            [[root.children]]
            kind = "instant"
            name = "done"
            "#,
        );
        scene.timeline.play(AnimationOptions::default());
        scene.timeline.tick(0.5);
        assert_eq!(scene.completions(), vec![true]);
        assert_eq!(scene.readings()[0].1, "fired x1");
    }

    #[test]
    fn test_forever_and_count() {
        let scene = scene(
            r#"
            [root]
            kind = "parallel"

            [[root.children]]
            kind = "repeat"
            forever = true
            [root.children.child]
            kind = "wait"
            duration = 1.0

            [[root.children]]
            kind = "repeat"
            count = 3
            [root.children.child]
            kind = "wait"
            duration = 1.0
            "#,
        );
        assert_eq!(scene.timeline.duration(), 3.0);
        let schedule = scene.timeline.root().schedule();
        assert_eq!(schedule[0].duration, 1.0);
        assert_eq!(schedule[1].duration, 3.0);
    }
}
