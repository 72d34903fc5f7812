//! Loopback overlay nodes over real sockets.

use std::time::Duration;

use assert_matches::assert_matches;
use flock_net_overlay::{LoopbackBackend, LoopbackNode};
use flock_node_api::{NodeConfig, OverlayBackend, OverlayError, OverlayNode, Transport};

const STABILIZE: Duration = Duration::from_millis(20);

async fn started(transport: Transport) -> LoopbackNode {
    let node = LoopbackBackend
        .new_node(NodeConfig::new(transport, 0).with_base_stabilize_interval(STABILIZE))
        .unwrap();
    node.start().await.unwrap();
    node
}

fn addr_of(node: &LoopbackNode) -> String {
    format!("127.0.0.1:{}", node.local_port())
}

async fn assert_swarm_forms(transport: Transport) {
    let seed = started(transport).await;
    let first = started(transport).await;
    let second = started(transport).await;
    assert_ne!(seed.local_port(), 0);

    first.join(&addr_of(&seed)).await.unwrap();
    second.join(&addr_of(&seed)).await.unwrap();

    let seed_ports: Vec<u16> = seed.peers().iter().map(|a| a.port()).collect();
    assert!(seed_ports.contains(&first.local_port()));
    assert!(seed_ports.contains(&second.local_port()));
    assert_eq!(seed.peer_count(), 2);

    assert_eq!(first.peers(), vec![addr_of(&seed).parse::<std::net::SocketAddr>().unwrap()]);
    assert_eq!(second.peer_count(), 1);

    for node in [&second, &first, &seed] {
        node.stop().await.unwrap();
        assert!(!node.is_running());
    }
}

#[tokio::test]
async fn test_tcp_nodes_join_seed() {
    assert_swarm_forms(Transport::Tcp).await;
}

#[tokio::test]
async fn test_kcp_nodes_join_seed() {
    assert_swarm_forms(Transport::Kcp).await;
}

#[tokio::test]
async fn test_repeated_join_is_idempotent() {
    let seed = started(Transport::Kcp).await;
    let node = started(Transport::Kcp).await;

    node.join(&addr_of(&seed)).await.unwrap();
    node.join(&addr_of(&seed)).await.unwrap();

    assert_eq!(seed.peer_count(), 1);
    assert_eq!(node.peer_count(), 1);
}

#[tokio::test]
async fn test_tcp_join_without_listener_fails() {
    let dead = started(Transport::Tcp).await;
    let target = addr_of(&dead);
    dead.stop().await.unwrap();

    let node = started(Transport::Tcp).await;
    let err = node.join(&target).await.unwrap_err();
    assert_matches!(err, OverlayError::Join { addr, .. } if addr == target);
    assert_eq!(node.peer_count(), 0);
}

#[tokio::test]
async fn test_kcp_join_without_listener_fails() {
    let dead = started(Transport::Kcp).await;
    let target = addr_of(&dead);
    dead.stop().await.unwrap();

    let node = started(Transport::Kcp).await;
    let err = node.join(&target).await.unwrap_err();
    assert_matches!(err, OverlayError::Join { .. });
}

#[tokio::test]
async fn test_join_requires_running_node() {
    let seed = started(Transport::Tcp).await;
    let node = LoopbackBackend
        .new_node(NodeConfig::new(Transport::Tcp, 0))
        .unwrap();

    assert_matches!(
        node.join(&addr_of(&seed)).await,
        Err(OverlayError::NotRunning)
    );
}

#[tokio::test]
async fn test_join_rejects_malformed_address() {
    let node = started(Transport::Tcp).await;
    assert_matches!(
        node.join("localhost").await,
        Err(OverlayError::InvalidAddress { .. })
    );
}

#[tokio::test]
async fn test_start_twice_fails() {
    let node = started(Transport::Tcp).await;
    assert_matches!(node.start().await, Err(OverlayError::AlreadyStarted));
}

#[tokio::test]
async fn test_port_in_use_is_bind_error() {
    for transport in [Transport::Tcp, Transport::Kcp] {
        let holder = started(transport).await;
        let node = LoopbackBackend
            .new_node(NodeConfig::new(transport, holder.local_port()))
            .unwrap();

        let err = node.start().await.unwrap_err();
        assert_matches!(err, OverlayError::Bind { transport: t, .. } if t == transport);
        assert!(!node.is_running());
    }
}

#[tokio::test]
async fn test_stop_releases_port() {
    for transport in [Transport::Tcp, Transport::Kcp] {
        let node = started(transport).await;
        let port = node.local_port();
        node.stop().await.unwrap();

        let again = LoopbackBackend
            .new_node(NodeConfig::new(transport, port))
            .unwrap();
        again.start().await.unwrap();
        assert_eq!(again.local_port(), port);
        again.stop().await.unwrap();
    }
}

#[tokio::test]
async fn test_stop_is_noop_when_inactive() {
    let node = LoopbackBackend
        .new_node(NodeConfig::new(Transport::Tcp, 0))
        .unwrap();
    node.stop().await.unwrap();

    let running = started(Transport::Tcp).await;
    running.stop().await.unwrap();
    running.stop().await.unwrap();
    assert_matches!(running.start().await, Err(OverlayError::AlreadyStarted));
}
