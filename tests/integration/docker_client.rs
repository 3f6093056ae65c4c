//! Integration tests for Docker client

// These tests require Docker to be running

use dockconsole::docker::{DockerClient, RuntimeClient};

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_docker_connection() {
    let client = DockerClient::from_env().await;
    assert!(client.is_ok());

    let client = client.unwrap();
    assert!(client.ping().await.is_ok());
    assert_ne!(client.connection_info().api_version, "unknown");
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_running_listing_is_subset_of_all() {
    let client = DockerClient::from_env().await.unwrap();
    let client: &dyn RuntimeClient = &client;

    let running = client.list_containers(false).await.unwrap();
    let all = client.list_containers(true).await.unwrap();

    for container in &running {
        assert!(
            container.status.starts_with("Up"),
            "Container {} should be running",
            container.id
        );
        assert!(all.iter().any(|c| c.id == container.id));
    }
}

#[tokio::test]
#[ignore = "requires Docker daemon"]
async fn test_missing_container_is_api_error() {
    let client = DockerClient::from_env().await.unwrap();
    let client: &dyn RuntimeClient = &client;

    let err = client
        .inspect_container("dockconsole-no-such-container")
        .await
        .unwrap_err();
    assert_eq!(err.dialog_title(), "HTTP Error: 404");
}
