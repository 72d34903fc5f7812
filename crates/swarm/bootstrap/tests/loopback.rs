//! Full runs over real loopback sockets.

use std::{
    net::{Ipv4Addr, TcpListener, UdpSocket},
    time::Duration,
};

use flock_net_overlay::LoopbackBackend;
use flock_node_api::Transport;
use flock_swarm_bootstrap::{
    BootstrapConfig, Bootstrapper, NoDelay, NodeFactory, ShutdownCoordinator, SwarmPhase,
    SwarmRunner,
};
use flock_tasks::signal;

const NODES: u16 = 3;

/// Find a base port with `NODES` consecutive ports free for both transports.
fn free_base() -> u16 {
    for _ in 0..64 {
        let probe = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let base = probe.local_addr().unwrap().port();
        drop(probe);

        let Some(last) = base.checked_add(NODES) else {
            continue;
        };
        let free = (base..last).all(|port| {
            TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
                && UdpSocket::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
        });
        if free {
            return base;
        }
    }
    panic!("no free port range");
}

fn factory() -> NodeFactory<LoopbackBackend> {
    NodeFactory::new(LoopbackBackend).with_base_stabilize_interval(Duration::from_millis(20))
}

async fn run_swarm(transport: Transport) {
    let base = free_base();
    let config = BootstrapConfig::new(i64::from(NODES), transport).with_base_port(base);
    let runner = SwarmRunner::new(Bootstrapper::new(config, factory()).with_delay(NoDelay));
    let (trigger, shutdown) = signal();

    let mut phases = runner.subscribe();
    let report = runner
        .run(async {
            assert_eq!(*phases.borrow_and_update(), SwarmPhase::Running);
            trigger.fire();
            shutdown.await;
        })
        .await
        .unwrap();

    assert!(report.is_clean(), "{report:?}");
    let mut stopped = report.stopped.clone();
    stopped.sort_unstable();
    assert_eq!(stopped, (base..base + NODES).collect::<Vec<_>>());

    // Every listener was released.
    for port in base..base + NODES {
        match transport {
            Transport::Tcp => drop(TcpListener::bind((Ipv4Addr::LOCALHOST, port)).unwrap()),
            Transport::Kcp => drop(UdpSocket::bind((Ipv4Addr::LOCALHOST, port)).unwrap()),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tcp_swarm_lifecycle() {
    run_swarm(Transport::Tcp).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_kcp_swarm_lifecycle() {
    run_swarm(Transport::Kcp).await;
}

#[tokio::test]
async fn test_seed_learns_every_peer() {
    let base = free_base();
    let config = BootstrapConfig::new(i64::from(NODES), Transport::Tcp).with_base_port(base);
    let registry = Bootstrapper::new(config, factory())
        .with_delay(NoDelay)
        .run()
        .await
        .unwrap();

    let seed = registry.seed().unwrap().node();
    let peers: Vec<u16> = seed.peers().iter().map(|addr| addr.port()).collect();
    assert_eq!(peers, (base + 1..base + NODES).collect::<Vec<_>>());

    ShutdownCoordinator::new(&registry).stop_all().await;
}

#[tokio::test]
async fn test_occupied_port_is_skipped() {
    let base = free_base();
    let _holder = TcpListener::bind((Ipv4Addr::LOCALHOST, base + 1)).unwrap();

    let config = BootstrapConfig::new(i64::from(NODES), Transport::Tcp).with_base_port(base);
    let registry = Bootstrapper::new(config, factory())
        .with_delay(NoDelay)
        .run()
        .await
        .unwrap();

    assert_eq!(registry.ports(), vec![base, base + 2]);
    ShutdownCoordinator::new(&registry).stop_all().await;
}
