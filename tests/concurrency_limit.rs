use std::sync::Arc;
use std::time::Duration;

use fakeroute::fs::mock::MockFileSystem;
use fakeroute::FakeFileLoader;
use fakeroute_test_utils::builders::LoaderConfigBuilder;
use fakeroute_test_utils::stubs::{FakeRoute, StubBundler, StubEvaluator};
use fakeroute_test_utils::{init_tracing, with_timeout};

fn populated_fs(count: usize) -> (Arc<MockFileSystem>, Arc<StubBundler>) {
    let fs = Arc::new(MockFileSystem::new());
    let bundler = Arc::new(StubBundler::with_delay(Duration::from_millis(30)));
    for i in 0..count {
        let path = format!("/app/mock/r{i}.fake.ts");
        fs.add_file(&path);
        bundler.add_source(&path, &format!("/r{i}\n"));
    }
    (fs, bundler)
}

#[tokio::test]
async fn bulk_load_never_exceeds_the_concurrency_ceiling() {
    init_tracing();

    let (fs, bundler) = populated_fs(8);
    let cfg = LoaderConfigBuilder::new("/app")
        .include("mock")
        .concurrency(3)
        .build();
    let mut loader: FakeFileLoader<FakeRoute> = FakeFileLoader::with_file_system(
        cfg,
        Arc::clone(&bundler) as Arc<dyn fakeroute::Bundler>,
        Arc::new(StubEvaluator),
        fs,
    )
    .unwrap();

    with_timeout(loader.start()).await.unwrap();

    assert_eq!(loader.routes().len(), 8);
    let max = bundler.max_in_flight();
    assert!(max <= 3, "in-flight loads exceeded the limit: {max}");
    assert!(max >= 2, "loads never overlapped; limiter test is inert");
    loader.close().await;
}

#[tokio::test]
async fn limit_of_one_serializes_the_whole_batch() {
    init_tracing();

    let (fs, bundler) = populated_fs(4);
    let cfg = LoaderConfigBuilder::new("/app")
        .include("mock")
        .concurrency(1)
        .build();
    let mut loader: FakeFileLoader<FakeRoute> = FakeFileLoader::with_file_system(
        cfg,
        Arc::clone(&bundler) as Arc<dyn fakeroute::Bundler>,
        Arc::new(StubEvaluator),
        fs,
    )
    .unwrap();

    with_timeout(loader.start()).await.unwrap();

    assert_eq!(loader.routes().len(), 4);
    assert_eq!(bundler.max_in_flight(), 1);
    loader.close().await;
}
