use std::sync::Arc;

use fakeroute::fs::mock::MockFileSystem;
use fakeroute::{FakeFileLoader, LoaderState};
use fakeroute_test_utils::builders::LoaderConfigBuilder;
use fakeroute_test_utils::stubs::{FakeRoute, StubBundler, StubEvaluator};
use fakeroute_test_utils::{init_tracing, with_timeout};

fn loader_over(
    fs: Arc<MockFileSystem>,
    bundler: Arc<StubBundler>,
    cfg: fakeroute::LoaderConfig,
) -> FakeFileLoader<FakeRoute> {
    FakeFileLoader::with_file_system(cfg, bundler, Arc::new(StubEvaluator), fs)
        .expect("valid config")
}

fn route_paths(routes: &[FakeRoute]) -> Vec<&str> {
    routes.iter().map(|r| r.path.as_str()).collect()
}

#[tokio::test]
async fn empty_include_yields_empty_table_and_stays_idle() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    let cfg = LoaderConfigBuilder::new("/app").watch(true).build();
    let mut loader = loader_over(fs, Arc::new(StubBundler::new()), cfg);

    with_timeout(loader.start()).await.unwrap();

    assert!(loader.routes().is_empty());
    assert!(loader.module_paths().is_empty());
    // watch=true but no includes: never enters Watching.
    assert_eq!(loader.state(), LoaderState::Idle);
    loader.close().await;
}

#[tokio::test]
async fn bulk_load_populates_cache_and_table() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/app/mock/a.fake.ts");
    fs.add_file("/app/mock/b.fake.ts");

    let bundler = Arc::new(StubBundler::new());
    bundler.add_source("/app/mock/a.fake.ts", "/a\n/a2\n");
    bundler.add_source("/app/mock/b.fake.ts", "single /b");

    let cfg = LoaderConfigBuilder::new("/app")
        .include("mock")
        .concurrency(1)
        .build();
    let mut loader = loader_over(fs, bundler, cfg);

    with_timeout(loader.start()).await.unwrap();

    // concurrency=1 keeps cache insertion in resolve order.
    let routes = loader.routes();
    assert_eq!(route_paths(&routes), vec!["/a", "/a2", "/b"]);
    assert_eq!(loader.module_paths().len(), 2);
    assert_eq!(loader.state(), LoaderState::Idle);
    loader.close().await;
}

#[tokio::test]
async fn overlapping_includes_produce_one_cache_entry_per_file() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/app/mock/api/users.fake.ts");

    let bundler = Arc::new(StubBundler::new());
    bundler.add_source("/app/mock/api/users.fake.ts", "/users\n");

    let cfg = LoaderConfigBuilder::new("/app")
        .include("mock")
        .include("mock/api")
        .build();
    let mut loader = loader_over(fs, bundler, cfg);

    with_timeout(loader.start()).await.unwrap();

    // Resolved twice, cached once: the cache keys by normalized path.
    assert_eq!(loader.module_paths().len(), 1);
    assert_eq!(route_paths(&loader.routes()), vec!["/users"]);
    loader.close().await;
}

#[tokio::test]
async fn aggregation_is_idempotent_between_mutations() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/app/mock/a.fake.ts");
    fs.add_file("/app/mock/b.fake.ts");

    let bundler = Arc::new(StubBundler::new());
    bundler.add_source("/app/mock/a.fake.ts", "/a\n");
    bundler.add_source("/app/mock/b.fake.ts", "/b\n");

    let cfg = LoaderConfigBuilder::new("/app").include("mock").build();
    let mut loader = loader_over(fs, bundler, cfg);

    with_timeout(loader.start()).await.unwrap();

    let first = loader.routes();
    let second = loader.routes();
    assert_eq!(first, second);
    loader.close().await;
}

#[tokio::test]
async fn double_start_is_rejected() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    let cfg = LoaderConfigBuilder::new("/app").build();
    let mut loader = loader_over(fs, Arc::new(StubBundler::new()), cfg);

    with_timeout(loader.start()).await.unwrap();
    let err = loader.start().await.unwrap_err();
    assert!(matches!(err, fakeroute::FakeRouteError::AlreadyStarted));
    loader.close().await;
}
