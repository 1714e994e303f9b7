//! Deployment workflow behavior

mod common;

use std::sync::Arc;
use std::time::Duration;

use weaver_models::ConfigResponse;

use common::FakeApi;
use confweaver::catalog::TemplateCatalog;
use confweaver::errors::ConsoleError;
use confweaver::notify::{Notifier, ToastSeverity};
use confweaver::views::deploy::DeployView;

fn view(api: Arc<FakeApi>) -> DeployView {
    DeployView::new(
        api,
        Arc::new(Notifier::new(Duration::from_secs(5))),
        Arc::new(TemplateCatalog::built_in()),
    )
}

fn view_with_notifier(api: Arc<FakeApi>, notifier: Arc<Notifier>) -> DeployView {
    DeployView::new(api, notifier, Arc::new(TemplateCatalog::built_in()))
}

#[tokio::test]
async fn successful_deployment_is_logged_newest_first() {
    let api = Arc::new(FakeApi::default());
    {
        let mut q = api.deploy_responses.lock().unwrap();
        q.push_back(Ok(ConfigResponse {
            status: "success".to_string(),
            message: "Firewall configured".to_string(),
        }));
        q.push_back(Ok(ConfigResponse {
            status: "success".to_string(),
            message: "Firewall updated".to_string(),
        }));
    }

    let mut view = view(Arc::clone(&api));
    view.select_device(1);
    view.select_template("basic_firewall").unwrap();
    view.set_param("wan_interface", "ether1");
    view.set_param("lan_interface", "bridge1");
    view.deploy().await.unwrap();

    view.set_param("wan_interface", "ether2");
    view.set_param("lan_interface", "bridge1");
    view.deploy().await.unwrap();

    let log: Vec<&str> = view.execution_log().collect();
    assert_eq!(log.len(), 2);
    assert!(log[0].starts_with("[Success] "));
    assert!(log[0].ends_with("Firewall updated"));
    assert!(log[1].ends_with("Firewall configured"));
    // Timestamps are bare, e.g. "[Success] 14:03:59: ..."
    assert!(!log[0].contains('<'));
}

#[tokio::test]
async fn failed_deployment_logs_an_error_line() {
    let api = Arc::new(FakeApi::default());
    api.deploy_responses
        .lock()
        .unwrap()
        .push_back(Err(FakeApi::api_error(500, "Device refused the command")));

    let notifier = Arc::new(Notifier::new(Duration::from_secs(5)));
    let mut view = view_with_notifier(Arc::clone(&api), Arc::clone(&notifier));
    view.select_device(1);
    view.select_template("block_website").unwrap();
    view.set_param("url", "example.com");

    let err = view.deploy().await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let log: Vec<&str> = view.execution_log().collect();
    assert!(log[0].starts_with("[Error] "));
    assert!(log[0].ends_with("Device refused the command"));
    assert!(!log[0].contains('<'));

    let toasts = notifier.active();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, ToastSeverity::Error);
}

#[tokio::test]
async fn switching_templates_resets_parameters() {
    let api = Arc::new(FakeApi::default());
    let mut view = view(api);
    view.select_template("basic_firewall").unwrap();
    view.set_param("wan_interface", "ether1");
    assert_eq!(view.params().len(), 1);

    view.select_template("bandwidth_limit").unwrap();
    assert!(view.params().is_empty());
}

#[tokio::test]
async fn missing_parameter_blocks_submission() {
    let api = Arc::new(FakeApi::default());
    let mut view = view(Arc::clone(&api));
    view.select_device(1);
    view.select_template("bandwidth_limit").unwrap();
    view.set_param("target_ip", "10.0.0.9");

    let err = view.deploy().await.unwrap_err();
    assert!(matches!(err, ConsoleError::ValidationError(_)));
    assert!(err.to_string().contains("Max Upload"));
    assert!(api.deploy_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn custom_template_sends_the_raw_command() {
    let api = Arc::new(FakeApi::default());
    api.deploy_responses
        .lock()
        .unwrap()
        .push_back(Ok(ConfigResponse {
            status: "success".to_string(),
            message: "Executed".to_string(),
        }));

    let mut view = view(Arc::clone(&api));
    view.select_device(3);
    view.select_template("custom").unwrap();
    view.set_custom_command("/ip firewall filter print");
    view.deploy().await.unwrap();

    let requests = api.deploy_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].device_id, 3);
    assert_eq!(requests[0].template_name, "/ip firewall filter print");
    assert!(requests[0].params.is_empty());
}

#[tokio::test]
async fn rollback_is_a_marker_in_the_execution_log() {
    let api = Arc::new(FakeApi::default());
    let mut view = view(api);

    // No device, nothing to roll back against
    assert!(matches!(
        view.rollback(),
        Err(ConsoleError::ValidationError(_))
    ));

    // With a device selected it needs no prior deployment
    view.select_device(1);
    view.rollback().unwrap();
    let log: Vec<&str> = view.execution_log().collect();
    assert!(log[0].starts_with("[Rollback] "));
    assert!(log[0].ends_with("Rollback initiated"));
    assert!(!log[0].contains('<'));

    // And it can be repeated
    view.rollback().unwrap();
    assert_eq!(view.execution_log().count(), 2);
}

#[tokio::test]
async fn unknown_template_is_rejected() {
    let api = Arc::new(FakeApi::default());
    let mut view = view(api);
    assert!(matches!(
        view.select_template("does_not_exist"),
        Err(ConsoleError::ValidationError(_))
    ));
}
