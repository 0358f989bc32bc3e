use std::sync::Arc;

use fakeroute::fs::mock::MockFileSystem;
use fakeroute::FakeFileLoader;
use fakeroute_test_utils::builders::LoaderConfigBuilder;
use fakeroute_test_utils::stubs::{FakeRoute, StubBundler, StubEvaluator};
use fakeroute_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn one_failing_file_does_not_abort_the_batch() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/app/mock/a.fake.ts");
    fs.add_file("/app/mock/bad.fake.ts");
    fs.add_file("/app/mock/c.fake.ts");

    let bundler = Arc::new(StubBundler::new());
    bundler.add_source("/app/mock/a.fake.ts", "/a\n");
    bundler.add_source("/app/mock/bad.fake.ts", "boom\n");
    bundler.add_source("/app/mock/c.fake.ts", "/c\n");

    let cfg = LoaderConfigBuilder::new("/app").include("mock").build();
    let mut loader: FakeFileLoader<FakeRoute> =
        FakeFileLoader::with_file_system(cfg, bundler, Arc::new(StubEvaluator), fs).unwrap();

    // No error escapes start() even though one file fails to evaluate.
    with_timeout(loader.start()).await.unwrap();

    let mut paths: Vec<String> = loader
        .routes()
        .iter()
        .map(|r| r.path.clone())
        .collect();
    paths.sort();
    assert_eq!(paths, vec!["/a", "/c"]);
    loader.close().await;
}

#[tokio::test]
async fn failed_file_keeps_an_empty_cache_entry() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/app/mock/bad.fake.ts");

    let bundler = Arc::new(StubBundler::new());
    bundler.add_source("/app/mock/bad.fake.ts", "boom\n");

    let cfg = LoaderConfigBuilder::new("/app").include("mock").build();
    let mut loader: FakeFileLoader<FakeRoute> =
        FakeFileLoader::with_file_system(cfg, bundler, Arc::new(StubEvaluator), fs).unwrap();

    with_timeout(loader.start()).await.unwrap();

    // "known but contributed nothing", not "never seen".
    assert_eq!(loader.module_paths().len(), 1);
    assert_eq!(loader.module_paths()[0].as_str(), "/app/mock/bad.fake.ts");
    assert!(loader.routes().is_empty());
    loader.close().await;
}

#[tokio::test]
async fn missing_bundler_source_is_absorbed_too() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/app/mock/ghost.fake.ts");

    // Nothing registered with the bundler: bundling itself fails.
    let bundler = Arc::new(StubBundler::new());

    let cfg = LoaderConfigBuilder::new("/app").include("mock").build();
    let mut loader: FakeFileLoader<FakeRoute> =
        FakeFileLoader::with_file_system(cfg, bundler, Arc::new(StubEvaluator), fs).unwrap();

    with_timeout(loader.start()).await.unwrap();

    assert_eq!(loader.module_paths().len(), 1);
    assert!(loader.routes().is_empty());
    loader.close().await;
}
