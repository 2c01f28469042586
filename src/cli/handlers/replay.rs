use tracing::info;

use crate::backend::memory::MemoryBackend;
use crate::cli::output::{ReplayJson, StepJson};
use crate::dnd::engine::Engine;
use crate::dnd::geometry::Rect;
use crate::io::scenario::{Scenario, Step};
use crate::model::config::EngineConfig;

/// Play `scenario` against a fresh engine and an in-memory backend. Calls
/// still pending after the last step are flushed.
pub fn run_scenario(scenario: Scenario, config: &EngineConfig) -> ReplayJson {
    let mut engine = Engine::with_snapshot(config, scenario.entities);
    for zone in scenario.zones {
        engine.register_zone(zone.target, zone.rect);
    }
    let mut backend = MemoryBackend::new();
    for kind in scenario.fail {
        backend.fail_on(kind);
    }

    let mut steps = Vec::new();
    let mut failures = Vec::new();
    for (index, step) in scenario.steps.into_iter().enumerate() {
        let (outcome, transition) = match step {
            Step::Drag {
                source,
                from,
                rect,
                path,
                to,
                cancel,
            } => {
                let rect = rect.unwrap_or(Rect::new(from.x, from.y, 0.0, 0.0));
                engine.pointer_down(source, from, rect);
                for point in path {
                    engine.pointer_move(point);
                }
                engine.pointer_move(to);
                if cancel {
                    engine.cancel();
                    ("cancelled".to_string(), None)
                } else {
                    match engine.pointer_up(to) {
                        Some(t) => (t.to_string(), Some(t)),
                        None => ("click".to_string(), None),
                    }
                }
            }
            Step::Drop { source, target } => {
                let t = engine.apply_drop(&source, target.as_ref());
                (t.to_string(), Some(t))
            }
            Step::Flush => {
                failures.extend(engine.flush(&mut backend).iter().map(|e| e.to_string()));
                ("flush".to_string(), None)
            }
            Step::FailOn { call } => {
                backend.fail_on(call);
                (format!("fail {}", call), None)
            }
            Step::Recover { call } => {
                backend.stop_failing(call);
                (format!("recover {}", call), None)
            }
        };
        info!(step = index, outcome = %outcome, "replayed step");
        steps.push(StepJson {
            index,
            outcome,
            transition,
        });
    }
    failures.extend(engine.flush(&mut backend).iter().map(|e| e.to_string()));

    ReplayJson {
        steps,
        calls: backend.calls().to_vec(),
        failures,
        notifications: engine.drain_notifications(),
        final_state: engine.snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CallKind;
    use crate::dnd::geometry::Point;
    use crate::dnd::zone::DropZone;
    use crate::model::entity::{Container, DragSource, DropTarget};
    use crate::model::registry::RegistrySnapshot;
    use crate::model::task::Task;
    use pretty_assertions::assert_eq;

    fn scenario(steps: Vec<Step>) -> Scenario {
        Scenario {
            entities: RegistrySnapshot {
                tasks: vec![Task::new("t1", "One"), Task::new("t2", "Two")],
                ..Default::default()
            },
            zones: vec![
                DropZone::new(
                    DropTarget::Task {
                        id: "t1".into(),
                        container: Container::Main,
                    },
                    Rect::new(0.0, 0.0, 100.0, 20.0),
                ),
                DropZone::new(
                    DropTarget::Task {
                        id: "t2".into(),
                        container: Container::Main,
                    },
                    Rect::new(0.0, 20.0, 100.0, 20.0),
                ),
                DropZone::new(DropTarget::WorkareaSlot, Rect::new(200.0, 0.0, 100.0, 100.0)),
            ],
            fail: vec![],
            steps,
        }
    }

    fn drag_t2(to: Point, cancel: bool) -> Step {
        Step::Drag {
            source: DragSource::Task {
                id: "t2".into(),
                container: Container::Main,
            },
            from: Point::new(50.0, 30.0),
            rect: Some(Rect::new(0.0, 20.0, 100.0, 20.0)),
            path: vec![],
            to,
            cancel,
        }
    }

    #[test]
    fn replay_reports_each_step_and_the_calls() {
        let report = run_scenario(
            scenario(vec![drag_t2(Point::new(50.0, 10.0), false), Step::Flush]),
            &EngineConfig::default(),
        );
        let outcomes: Vec<&str> = report.steps.iter().map(|s| s.outcome.as_str()).collect();
        assert_eq!(outcomes, vec!["reorder main 1 -> 0", "flush"]);
        assert_eq!(report.calls.len(), 1);
        assert_eq!(report.calls[0].kind, CallKind::ReorderTasks);
        let ids: Vec<&str> = report.final_state.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
    }

    #[test]
    fn cancelled_drag_and_injected_failure() {
        let report = run_scenario(
            scenario(vec![
                drag_t2(Point::new(50.0, 10.0), true),
                Step::FailOn {
                    call: CallKind::ReorderTasks,
                },
                drag_t2(Point::new(50.0, 10.0), false),
            ]),
            &EngineConfig::default(),
        );
        assert_eq!(report.steps[0].outcome, "cancelled");
        assert_eq!(report.failures.len(), 1);
        let ids: Vec<&str> = report.final_state.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn drop_into_workarea_is_transient() {
        let report = run_scenario(
            scenario(vec![drag_t2(Point::new(250.0, 50.0), false)]),
            &EngineConfig::default(),
        );
        assert_eq!(report.steps[0].outcome, "focus t2");
        assert!(report.calls.is_empty());
        assert_eq!(report.final_state.workarea.as_deref(), Some("t2"));
    }
}
