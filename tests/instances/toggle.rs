use std::sync::Arc;
use std::time::Duration;

use dbot::cloud::CloudControl;
use dbot::instances::{InstanceState, ToggleActuator, ToggleOutcome};

use super::{cloud, registry_with};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn stopped_instance_is_started_and_toggle_time_recorded() {
    let (db, registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["stopped"]);
    let actuator = ToggleActuator::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    let outcome = actuator.toggle("web", TIMEOUT).await.unwrap();

    assert_eq!(outcome, ToggleOutcome::Started);
    assert_eq!(cloud.calls(), ["describe i-web", "start i-web"]);
    assert!(registry.get("web").await.unwrap().unwrap().toggled_at.is_some());
}

#[tokio::test]
async fn running_instance_is_stopped_via_prefix() {
    let (db, _registry) = registry_with(&[("worker-1", Some("i-w1"))]).await;
    let cloud = cloud();
    cloud.script("i-w1", &["running"]);
    let actuator = ToggleActuator::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    let outcome = actuator.toggle("work", TIMEOUT).await.unwrap();

    assert_eq!(outcome, ToggleOutcome::Stopped);
    assert_eq!(cloud.calls(), ["describe i-w1", "stop i-w1"]);
}

#[tokio::test]
async fn transitional_state_is_left_alone() {
    let (db, registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["pending"]);
    let actuator = ToggleActuator::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    let outcome = actuator.toggle("web", TIMEOUT).await.unwrap();

    assert_eq!(outcome, ToggleOutcome::Skipped(InstanceState::Pending));
    assert_eq!(cloud.calls(), ["describe i-web"]);
    assert_eq!(registry.get("web").await.unwrap().unwrap().toggled_at, None);
}

#[tokio::test]
async fn unknown_and_idless_names_are_not_found() {
    let (db, _registry) = registry_with(&[("spare", None)]).await;
    let cloud = cloud();
    let actuator = ToggleActuator::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    assert_eq!(actuator.toggle("ghost", TIMEOUT).await.unwrap(), ToggleOutcome::NotFound);
    assert_eq!(actuator.toggle("spare", TIMEOUT).await.unwrap(), ToggleOutcome::NotFound);
    assert!(cloud.calls().is_empty());
}

#[tokio::test]
async fn toggle_many_keeps_going_past_missing_and_failing_names() {
    let (db, _registry) = registry_with(&[
        ("web", Some("i-web")),
        ("db", Some("i-db")),
        ("cache", Some("i-cache")),
    ])
    .await;
    let cloud = cloud();
    cloud.script("i-web", &["stopped"]);
    cloud.fail("i-db", "UnauthorizedOperation");
    cloud.script("i-cache", &["running"]);
    let actuator = ToggleActuator::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    let names: Vec<String> = ["web", "ghost", "db", "cache"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let report = actuator.toggle_many(&names, TIMEOUT).await;

    assert!(report.any_not_found());
    assert_eq!(report.results.len(), 4);
    assert_eq!(report.results[0].1, ToggleOutcome::Started);
    assert_eq!(report.results[1].1, ToggleOutcome::NotFound);
    assert!(matches!(report.results[2].1, ToggleOutcome::Failed(_)));
    assert_eq!(report.results[3].1, ToggleOutcome::Stopped);
    assert!(cloud.calls().contains(&"stop i-cache".to_string()));
}

#[tokio::test]
async fn hung_stop_fails_and_records_no_toggle() {
    let (db, registry) = registry_with(&[("web", Some("i-ok"))]).await;
    let cloud = cloud();
    cloud.script("i-ok", &["running"]);
    cloud.hang("stop i-ok");
    let actuator = ToggleActuator::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    let report = actuator
        .toggle_many(&["web".to_string()], Duration::from_millis(100))
        .await;

    match &report.results[0].1 {
        ToggleOutcome::Failed(message) => {
            assert!(message.contains("StopInstances for i-ok timed out after 100ms"));
        }
        other => panic!("expected a failed toggle, got {other:?}"),
    }
    assert_eq!(cloud.calls(), ["describe i-ok", "stop i-ok"]);
    assert_eq!(registry.get("web").await.unwrap().unwrap().toggled_at, None);
}
