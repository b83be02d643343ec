use std::time::Duration;

use beacon_signal::{latest_value_channel, relay, RelayError, Shutdown};
use futures::StreamExt;

const WAIT: Duration = Duration::from_secs(5);

async fn assert_burst_reads_latest(n: u64) -> anyhow::Result<()> {
    let (_shutdown, signal) = Shutdown::new();
    let (tx, rx) = latest_value_channel(signal);

    for i in 1..=n {
        tx.send(i)?;
    }

    let value = tokio::time::timeout(WAIT, rx.recv()).await?;
    assert_eq!(value, Some(n), "Reading after {n} sends must see the last value.");
    assert_eq!(rx.try_recv(), None, "Intermediate values must not be observed.");

    let stats = rx.statistics();
    assert_eq!(stats.num_received(), n);
    assert_eq!(stats.num_coalesced(), n - 1);
    assert_eq!(stats.num_forwarded(), 1);

    let res = tokio::time::timeout(Duration::from_millis(20), rx.recv()).await;
    assert!(res.is_err(), "No further value should be pending.");

    Ok(())
}

#[tokio::test]
async fn test_single_value_is_delivered() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let (_shutdown, signal) = Shutdown::new();
    let (tx, rx) = latest_value_channel(signal);

    tx.send("hello")?;

    let value = tokio::time::timeout(WAIT, rx.recv()).await?;
    assert_eq!(value, Some("hello"));
    assert_eq!(rx.try_recv(), None);

    Ok(())
}

#[tokio::test]
async fn test_burst_only_delivers_latest() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    for n in [1, 2, 4, 5] {
        assert_burst_reads_latest(n).await?;
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_burst_only_delivers_latest_multi_thread() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    for n in [1, 2, 4, 5] {
        assert_burst_reads_latest(n).await?;
    }

    Ok(())
}

#[tokio::test]
async fn test_close_flushes_pending_value() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let (_shutdown, signal) = Shutdown::new();
    let (tx, rx) = latest_value_channel(signal);

    tx.send(1)?;
    tx.send(2)?;
    tx.close();

    let value = tokio::time::timeout(WAIT, rx.recv()).await?;
    assert_eq!(value, Some(2));
    let value = tokio::time::timeout(WAIT, rx.recv()).await?;
    assert_eq!(value, None, "Stream should end after the final value.");

    Ok(())
}

#[tokio::test]
async fn test_close_wakes_waiting_receiver() -> anyhow::Result<()> {
    let (_shutdown, signal) = Shutdown::new();
    let (tx, rx) = latest_value_channel::<u64>(signal);

    let reader = tokio::spawn(async move { rx.recv().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(tx);

    let value = tokio::time::timeout(WAIT, reader).await??;
    assert_eq!(value, None);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fast_producer_slow_consumer() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    const LAST: u64 = 10_000;

    let (_shutdown, signal) = Shutdown::new();
    let (tx, rx) = latest_value_channel(signal);

    let producer = tokio::spawn(async move {
        for i in 1..=LAST {
            tx.send(i).expect("Relay should be running");
            if i % 100 == 0 {
                tokio::task::yield_now().await;
            }
        }
    });

    let consumer = tokio::spawn(async move {
        let mut observed = Vec::new();
        while let Some(value) = rx.recv().await {
            observed.push(value);
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        observed
    });

    tokio::time::timeout(Duration::from_secs(30), producer).await??;
    let observed = tokio::time::timeout(Duration::from_secs(30), consumer).await??;

    assert!(!observed.is_empty());
    assert!(observed.len() as u64 <= LAST);
    assert!(
        observed.windows(2).all(|pair| pair[0] < pair[1]),
        "Delivered values must keep production order."
    );
    assert_eq!(observed.last().copied(), Some(LAST));
    assert_eq!(
        observed.iter().filter(|v| **v == LAST).count(),
        1,
        "The final value must be observed exactly once."
    );

    Ok(())
}

#[tokio::test]
async fn test_shutdown_stops_forwarding() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let (shutdown, signal) = Shutdown::new();
    let (tx, rx) = latest_value_channel(signal);

    tx.send(1)?;
    shutdown.fire();

    assert!(matches!(tx.send(2), Err(RelayError::Closed(2))));

    let res = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(res.is_err(), "Receiver should stay idle after a shutdown.");
    assert_eq!(rx.try_recv(), None);

    // Closing after a shutdown does not turn the idle receiver into a closed one.
    drop(tx);
    let res = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(res.is_err());

    Ok(())
}

#[tokio::test]
async fn test_relay_from_existing_source() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let (_shutdown, signal) = Shutdown::new();
    let (tx, source) = flume::unbounded();
    let rx = relay(source, signal);

    for i in 0..3 {
        tx.send(i).expect("Relay source should be open");
    }
    drop(tx);

    let observed = tokio::time::timeout(WAIT, rx.into_stream().collect::<Vec<_>>()).await?;
    assert!(observed.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(observed.last().copied(), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_relay_task_exits_on_shutdown() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let (shutdown, signal) = Shutdown::new();
    let (tx, source) = flume::bounded(0);
    let rx = relay(source, signal);

    tx.send_async(1).await?;
    shutdown.fire();

    // The task drops the source on its way out.
    tokio::time::timeout(WAIT, async {
        while !tx.is_disconnected() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    assert!(tx.send_async(2).await.is_err());

    let res = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(res.is_err(), "Receiver should stay idle after a shutdown.");

    Ok(())
}
