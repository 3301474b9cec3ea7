use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use dbot::cloud::CloudControl;
use dbot::instances::{InstanceState, StateNotification, StatePoller};

use super::{cloud, registry_with, settings, t0};

fn running(name: &str) -> StateNotification {
    StateNotification {
        name: name.into(),
        state: InstanceState::Running,
    }
}

#[tokio::test]
async fn stop_is_announced_only_after_second_consistent_observation() {
    let (db, registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["running", "stopped", "stopped"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);
    let settings = settings(2);

    let first = poller.tick(&settings, t0()).await.unwrap();
    assert_eq!(first.notifications, vec![running("web")]);

    let second = poller
        .tick(&settings, t0() + TimeDelta::minutes(1))
        .await
        .unwrap();
    assert!(second.notifications.is_empty());
    let record = registry.get("web").await.unwrap().unwrap();
    assert_eq!(record.state, Some(InstanceState::Running));
    assert_eq!(record.soft_check_count, 1);

    let third = poller
        .tick(&settings, t0() + TimeDelta::minutes(2))
        .await
        .unwrap();
    assert_eq!(
        third.notifications,
        vec![StateNotification {
            name: "web".into(),
            state: InstanceState::Stopped,
        }]
    );
    let record = registry.get("web").await.unwrap().unwrap();
    assert_eq!(record.state, Some(InstanceState::Stopped));
    assert_eq!(record.soft_check_count, 0);
    assert_eq!(record.notified_at, Some(t0() + TimeDelta::minutes(2)));
}

#[tokio::test]
async fn stopped_instance_is_never_reannounced() {
    let (db, _registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["stopped"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);
    let settings = settings(2);

    let first = poller.tick(&settings, t0()).await.unwrap();
    assert_eq!(first.notifications.len(), 1);

    let much_later = poller
        .tick(&settings, t0() + TimeDelta::days(3))
        .await
        .unwrap();
    assert!(much_later.notifications.is_empty());
}

#[tokio::test]
async fn running_instance_is_reannounced_strictly_after_interval() {
    let (db, registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["running"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);
    let settings = settings(2);

    poller.tick(&settings, t0()).await.unwrap();

    let at_boundary = poller
        .tick(&settings, t0() + TimeDelta::hours(4))
        .await
        .unwrap();
    assert!(at_boundary.notifications.is_empty());

    let after = t0() + TimeDelta::hours(4) + TimeDelta::seconds(1);
    let past_boundary = poller.tick(&settings, after).await.unwrap();
    assert_eq!(past_boundary.notifications, vec![running("web")]);
    let record = registry.get("web").await.unwrap().unwrap();
    assert_eq!(record.notified_at, Some(after));
}

#[tokio::test]
async fn repeated_tick_with_same_observation_is_idempotent() {
    let (db, registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["running"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);
    let settings = settings(2);

    poller.tick(&settings, t0()).await.unwrap();
    let before = registry.get("web").await.unwrap().unwrap();
    let again = poller.tick(&settings, t0()).await.unwrap();
    let after = registry.get("web").await.unwrap().unwrap();

    assert!(again.notifications.is_empty());
    assert_eq!(before, after);
}

#[tokio::test]
async fn flapping_signal_resets_the_soft_check_counter() {
    let (db, registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["running", "stopped", "running", "stopped"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);
    let settings = settings(2);

    poller.tick(&settings, t0()).await.unwrap();
    for minute in 1..=3 {
        let report = poller
            .tick(&settings, t0() + TimeDelta::minutes(minute))
            .await
            .unwrap();
        assert!(report.notifications.is_empty(), "tick {minute} notified");
    }

    let record = registry.get("web").await.unwrap().unwrap();
    assert_eq!(record.state, Some(InstanceState::Running));
    assert_eq!(record.soft_check_count, 1);
}

#[tokio::test]
async fn threshold_of_one_announces_immediately() {
    let (db, _registry) = registry_with(&[("web", Some("i-web"))]).await;
    let cloud = cloud();
    cloud.script("i-web", &["running", "stopped"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);
    let settings = settings(1);

    poller.tick(&settings, t0()).await.unwrap();
    let report = poller
        .tick(&settings, t0() + TimeDelta::minutes(1))
        .await
        .unwrap();
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].state, InstanceState::Stopped);
}

#[tokio::test]
async fn failed_fetch_leaves_record_untouched_and_others_proceed() {
    let (db, registry) = registry_with(&[("web", Some("i-web")), ("db", Some("i-db"))]).await;
    let cloud = cloud();
    cloud.fail("i-web", "RequestLimitExceeded");
    cloud.script("i-db", &["running"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    let report = poller.tick(&settings(2), t0()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.observed, 1);
    assert_eq!(report.notifications, vec![running("db")]);
    let web = registry.get("web").await.unwrap().unwrap();
    assert_eq!(web.state, None);
    assert_eq!(web.notified_at, None);
}

#[tokio::test]
async fn instances_without_id_and_removed_instances_are_not_polled() {
    let (db, registry) = registry_with(&[("web", Some("i-web")), ("spare", None)]).await;
    registry
        .reconcile(&[dbot::config::InstanceEntry::new("spare", None)])
        .await
        .unwrap();
    let cloud = cloud();
    cloud.script("i-web", &["running"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);

    let report = poller.tick(&settings(2), t0()).await.unwrap();

    assert!(report.notifications.is_empty());
    assert!(cloud.calls().is_empty());
    let web = registry.get("web").await.unwrap().unwrap();
    assert!(!web.active);
}

#[tokio::test]
async fn hung_describe_times_out_without_blocking_other_instances() {
    let (db, registry) = registry_with(&[("a-slow", Some("i-slow")), ("b-ok", Some("i-ok"))]).await;
    let cloud = cloud();
    cloud.script("i-slow", &["running"]);
    cloud.hang("describe i-slow");
    cloud.script("i-ok", &["running"]);
    let poller = StatePoller::new(db, Arc::clone(&cloud) as Arc<dyn CloudControl>);
    let mut settings = settings(2);
    settings.request_timeout = Duration::from_millis(100);

    let report = poller.tick(&settings, t0()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.observed, 1);
    assert_eq!(report.notifications, vec![running("b-ok")]);
    let slow = registry.get("a-slow").await.unwrap().unwrap();
    assert_eq!(slow.state, None);
    assert_eq!(slow.soft_check_count, 0);
    assert_eq!(slow.notified_at, None);
}
