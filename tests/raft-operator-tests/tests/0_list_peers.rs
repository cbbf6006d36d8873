use anyhow::Result;
use raft_operator_tests::*;
use serial_test::serial;
use test_log::test;

#[serial]
#[test(tokio::test(flavor = "multi_thread"))]
async fn list_two_peers() -> Result<()> {
    let cluster = Cluster::new(1).await?;
    cluster.bootstrap(
        vec![
            peer("a", "10.0.0.1:8300", true),
            peer("b", "10.0.0.2:8300", false),
        ],
        Some("a"),
    );

    let report = cluster.admin(0)?.list_peers(false).await?;
    assert!(!report.stale);

    let out = report.to_string();
    let rows: Vec<Vec<&str>> = out
        .lines()
        .skip(1)
        .map(|line| line.split_whitespace().collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["10.0.0.1:8300", "a", "true"],
            vec!["10.0.0.2:8300", "b", "false"],
        ]
    );
    Ok(())
}

#[serial]
#[test(tokio::test(flavor = "multi_thread"))]
async fn list_from_every_member() -> Result<()> {
    let cluster = Cluster::new(3).await?;
    cluster.bootstrap(three_servers(), Some("a"));

    for id in 0..3 {
        let report = cluster.admin(id)?.list_peers(false).await?;
        assert_eq!(report.peers, three_servers());
    }
    Ok(())
}

#[serial]
#[test(tokio::test(flavor = "multi_thread"))]
async fn list_empty_configuration() -> Result<()> {
    let cluster = Cluster::builder().with_logging(false).build(1).await?;
    cluster.bootstrap(vec![], Some("a"));

    let report = cluster.admin(0)?.list_peers(false).await?;
    assert!(report.is_empty());
    assert_eq!(report.to_string(), "Address  ID  Voter\n");
    Ok(())
}

#[serial]
#[test(tokio::test(flavor = "multi_thread"))]
async fn stale_read_is_forwarded_as_query() -> Result<()> {
    let mut cluster = Cluster::new(1).await?;
    cluster.bootstrap(three_servers(), Some("a"));

    cluster.admin(0)?.list_peers(true).await?;
    cluster.admin(0)?.list_peers(false).await?;

    let requests = cluster.env().requests();
    let stale: Vec<_> = requests
        .iter()
        .map(|r| r.query.get("stale").cloned())
        .collect();
    assert_eq!(
        stale,
        vec![Some("true".to_string()), Some("false".to_string())]
    );
    Ok(())
}
