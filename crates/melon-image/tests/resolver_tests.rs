//! ImageResolver Tests
//!
//! Cache behaviour and decode scheduling across the resolver's public API.

use futures::future::join_all;
use melon_image::{
    DirAssetLoader, ImageCache, ImageError, ImageResolver, ResourceDescriptor,
};
use melon_test_utils::{png_bytes, CountingAssetLoader};
use std::sync::Arc;

fn resolver_with(loader: Arc<CountingAssetLoader>, capacity: u64) -> ImageResolver {
    ImageResolver::new(ImageCache::new(capacity), loader)
}

#[tokio::test]
async fn test_cached_asset_decodes_once() {
    let loader = Arc::new(CountingAssetLoader::new().with_png("photo.png", 4, 3));
    let resolver = resolver_with(Arc::clone(&loader), 20);
    let photo = ResourceDescriptor::parse("photo.png");

    let first = resolver.resolve("LargeIcon", &photo, false).unwrap().await.unwrap().unwrap();

    let second = resolver.resolve("LargeIcon", &photo, false).unwrap();
    assert!(second.is_ready());
    let second = second.await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(loader.opens("photo.png"), 1);
    let bitmap = first.as_bitmap().unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (4, 3));
}

#[tokio::test]
async fn test_disabled_cache_decodes_every_time() {
    let loader = Arc::new(CountingAssetLoader::new().with_png("photo.png", 2, 2));
    let resolver = resolver_with(Arc::clone(&loader), 20);
    resolver.cache().set_enabled(false);
    let photo = ResourceDescriptor::parse("photo.png");

    for _ in 0..2 {
        resolver.resolve("LargeIcon", &photo, false).unwrap().await.unwrap();
    }
    assert_eq!(loader.opens("photo.png"), 2);
}
#[tokio::test]
async fn test_overlapping_resolutions_share_one_decode() {
    let loader = Arc::new(CountingAssetLoader::new().with_png("photo.png", 4, 3));
    let resolver = resolver_with(Arc::clone(&loader), 20);
    let photo = ResourceDescriptor::parse("photo.png");

    let pending: Vec<_> = (0..4)
        .map(|_| resolver.resolve("LargeIcon", &photo, false).unwrap())
        .collect();
    let results = join_all(pending).await;

    assert!(results.iter().all(|r| r.as_ref().unwrap().is_some()));
    assert_eq!(loader.opens("photo.png"), 1);
}

#[tokio::test]
async fn test_toggling_cache_keeps_entries() {
    let loader = Arc::new(CountingAssetLoader::new().with_png("a.png", 1, 1).with_png("b.png", 1, 1));
    let resolver = resolver_with(Arc::clone(&loader), 20);
    let a = ResourceDescriptor::parse("a.png");
    let b = ResourceDescriptor::parse("b.png");

    let cached_a = resolver.resolve("x", &a, false).unwrap().await.unwrap();

    resolver.cache().set_enabled(false);
    resolver.resolve("x", &b, false).unwrap().await.unwrap();
    assert!(resolver.cache().contains("asset:a.png"));
    assert!(!resolver.cache().contains("asset:b.png"));

    resolver.cache().set_enabled(true);
    let again_a = resolver.resolve("x", &a, false).unwrap().await.unwrap();
    assert_eq!(cached_a, again_a);
    assert_eq!(loader.opens("a.png"), 1);
}

#[tokio::test]
async fn test_failed_decode_not_cached() {
    let loader = Arc::new(CountingAssetLoader::new().with_asset("broken.png", b"garbage".to_vec()));
    let resolver = resolver_with(Arc::clone(&loader), 20);
    let broken = ResourceDescriptor::parse("broken.png");

    let err = resolver.resolve("LargeIcon", &broken, false).unwrap().await.unwrap_err();
    assert!(matches!(err, ImageError::Decode(_)));
    assert!(!resolver.cache().contains("asset:broken.png"));

    resolver.resolve("LargeIcon", &broken, false).unwrap().await.unwrap_err();
    assert_eq!(loader.opens("broken.png"), 2);
}

#[tokio::test]
async fn test_cache_is_bounded() {
    let mut loader = CountingAssetLoader::new();
    for i in 0..30 {
        loader = loader.with_png(&format!("{i}.png"), 1, 1);
    }
    let resolver = resolver_with(Arc::new(loader), 20);

    for i in 0..30 {
        let d = ResourceDescriptor::parse(&format!("{i}.png"));
        resolver.resolve("x", &d, false).unwrap().await.unwrap();
    }
    assert!(resolver.cache().entry_count() <= 20);
}

#[tokio::test]
async fn test_concurrent_resolutions_complete_in_any_order() {
    let loader = Arc::new(
        CountingAssetLoader::new()
            .with_png("a.png", 1, 1)
            .with_png("b.png", 2, 2)
            .with_png("c.png", 3, 3),
    );
    let resolver = resolver_with(loader, 20);

    let pending: Vec<_> = ["a.png", "b.png", "c.png"]
        .iter()
        .map(|n| resolver.resolve("x", &ResourceDescriptor::parse(n), false).unwrap())
        .collect();
    let results = join_all(pending).await;

    let widths: Vec<u32> = results
        .into_iter()
        .map(|img| img.unwrap().unwrap().as_bitmap().unwrap().width())
        .collect();
    assert_eq!(widths, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_file_path_and_dir_assets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pic.png");
    std::fs::write(&path, png_bytes(5, 1, [0, 0, 0, 255])).unwrap();

    let resolver = ImageResolver::new(ImageCache::default(), Arc::new(DirAssetLoader::new(dir.path())));

    let by_path = ResourceDescriptor::parse(path.to_str().unwrap());
    assert!(matches!(by_path, ResourceDescriptor::FilePath(_)));
    let image = resolver.resolve("x", &by_path, false).unwrap().await.unwrap().unwrap();
    assert_eq!(image.as_bitmap().unwrap().width(), 5);

    let by_asset = ResourceDescriptor::parse("pic.png");
    let image = resolver.resolve("x", &by_asset, false).unwrap().await.unwrap().unwrap();
    assert_eq!(image.as_bitmap().unwrap().width(), 5);
}

#[tokio::test]
async fn test_invalid_value_type() {
    let resolver = ImageResolver::default();
    let err = resolver
        .resolve_value("BigPictureStyle[.bigPicture]", &serde_json::json!([1, 2]), true)
        .unwrap_err();
    assert!(matches!(err, ImageError::InvalidResourceType { ref actual, .. } if actual == "list"));
}
