//! NotificationComposer Tests
//!
//! Post cycle, image caching through the composer, handle validation and
//! dispatch delivery.

use melon_dispatch::{CallResult, Delivery, DeliveryMode};
use melon_image::{IconTable, ImageError, ResourceDescriptor};
use melon_notify::{
    ActionHandle, ActionOptions, BigPictureSource, Importance, NotificationPlatform,
    NotificationStyle, NotifyError, SequentialIds, Triggered,
};
use melon_test_utils::{ComposerFixture, CountingAssetLoader, RecordingProvider};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn fixture() -> ComposerFixture {
    ComposerFixture::new(CountingAssetLoader::new().with_png("photo.png", 8, 6))
}

#[tokio::test]
async fn test_post_base_with_generated_id() {
    let mut fx = fixture();
    fx.composer
        .set_base("Hi", "There", &ResourceDescriptor::parse(":alert"))
        .await
        .unwrap();

    let id = fx.composer.post(0).await.unwrap();

    assert!(id > 0);
    let posted = fx.platform.get(id).unwrap();
    assert_eq!(posted.notification.title, "Hi");
    assert_eq!(posted.notification.text, "There");
    assert_eq!(posted.notification.small_icon.as_icon(), Some(IconTable::alert()));
}

#[tokio::test]
async fn test_empty_icon_defaults_to_alert() {
    let mut fx = fixture();
    fx.composer
        .set_base("t", "x", &ResourceDescriptor::empty())
        .await
        .unwrap();
    let n = fx.composer.build().await.unwrap();
    assert_eq!(n.small_icon.as_icon(), Some(IconTable::alert()));
}

#[tokio::test]
async fn test_unknown_icon_is_caller_error() {
    let mut fx = fixture();
    let err = fx
        .composer
        .set_base("t", "x", &ResourceDescriptor::parse(":nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, NotifyError::Image(ImageError::ResourceNotFound(ref n)) if n == "nope"));
}

#[tokio::test]
async fn test_generated_ids_rarely_collide() {
    let mut fx = fixture();
    let mut ids = HashSet::new();
    for _ in 0..1000 {
        let id = fx.composer.post(0).await.unwrap();
        assert!(id > 0);
        ids.insert(id);
    }
    assert!(ids.len() >= 999);
}

#[tokio::test]
async fn test_same_id_updates_single_entry() {
    let mut fx = fixture();
    fx.composer.set_subtext("first");
    assert_eq!(fx.composer.post(7).await.unwrap(), 7);
    fx.composer.set_subtext("second");
    assert_eq!(fx.composer.post(7).await.unwrap(), 7);

    assert_eq!(fx.composer.active_notification_ids(), vec![7]);
    let posted = fx.platform.get(7).unwrap();
    assert_eq!(posted.notification.subtext.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_sequential_ids_are_used() {
    let fx = fixture();
    let mut composer = fx.composer.with_ids(Arc::new(SequentialIds::starting_at(100)));
    assert_eq!(composer.post(0).await.unwrap(), 100);
    assert_eq!(composer.post(-3).await.unwrap(), 101);
    assert_eq!(composer.active_notification_ids(), vec![100, 101]);
}

#[tokio::test]
async fn test_large_icon_twice_decodes_once() {
    let mut fx = fixture();
    let photo = ResourceDescriptor::parse("photo.png");

    fx.composer.set_large_icon(&photo).unwrap();
    fx.composer.build().await.unwrap();
    fx.composer.set_large_icon(&photo).unwrap();
    let n = fx.composer.build().await.unwrap();

    assert_eq!(fx.assets.opens("photo.png"), 1);
    let bitmap = n.large_icon.as_ref().and_then(|i| i.as_bitmap()).unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (8, 6));
}

#[tokio::test]
async fn test_back_to_back_large_icons_decode_once() {
    let mut fx = fixture();
    let photo = ResourceDescriptor::parse("photo.png");

    fx.composer.set_large_icon(&photo).unwrap();
    fx.composer.set_large_icon(&photo).unwrap();
    let id = fx.composer.post(0).await.unwrap();

    assert_eq!(fx.assets.opens("photo.png"), 1);
    assert!(fx.platform.get(id).unwrap().notification.large_icon.is_some());
}

#[tokio::test]
async fn test_large_icon_caching_disabled_decodes_twice() {
    let mut fx = fixture();
    fx.composer.set_caching(false);
    let photo = ResourceDescriptor::parse("photo.png");

    fx.composer.set_large_icon(&photo).unwrap();
    fx.composer.set_large_icon(&photo).unwrap();
    fx.composer.build().await.unwrap();

    assert_eq!(fx.assets.opens("photo.png"), 2);
}

#[tokio::test]
async fn test_empty_large_icon_is_caller_error() {
    let mut fx = fixture();
    let err = fx.composer.set_large_icon(&ResourceDescriptor::empty()).unwrap_err();
    assert!(matches!(err, NotifyError::Image(ImageError::MissingResource(ref l)) if l == "LargeIcon"));
    assert_eq!(fx.composer.pending_len(), 0);
}

#[tokio::test]
async fn test_failed_decode_discards_cycle() {
    let mut fx = ComposerFixture::new(CountingAssetLoader::new().with_asset("bad.png", b"nope".to_vec()));
    fx.composer.set_subtext("lost");
    fx.composer.set_large_icon(&ResourceDescriptor::parse("bad.png")).unwrap();

    assert!(fx.composer.post(1).await.is_err());
    assert!(fx.composer.active_notification_ids().is_empty());
    assert_eq!(fx.composer.pending_len(), 0);

    let n = fx.composer.build().await.unwrap();
    assert!(n.subtext.is_none());
}

#[tokio::test]
async fn test_actions_replay_in_order() {
    let mut fx = fixture();
    let open = fx.composer.create_intent("Screen2", "a");
    let options = ActionOptions {
        shows_user_interface: true,
        ..ActionOptions::default()
    };
    fx.composer
        .add_action(&ResourceDescriptor::parse("photo.png"), "Open", open, options)
        .unwrap();
    fx.composer
        .add_action(&ResourceDescriptor::empty(), "Later", open, ActionOptions::default())
        .unwrap();
    fx.composer.set_intent(open).unwrap();

    let n = fx.composer.build().await.unwrap();
    let titles: Vec<&str> = n.actions.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Open", "Later"]);
    assert!(n.actions[0].icon.is_some());
    assert!(n.actions[1].icon.is_none());
    assert!(n.actions[0].options.shows_user_interface);
    assert!(n.content_intent.is_some());
}

#[tokio::test]
async fn test_invalid_handles_rejected() {
    let mut fx = fixture();
    let forged = ActionHandle::from_raw(u64::MAX - 1);

    assert!(matches!(fx.composer.set_intent(forged), Err(NotifyError::InvalidIntentHandle(_))));
    assert!(matches!(
        fx.composer.add_action(&ResourceDescriptor::empty(), "x", forged, ActionOptions::default()),
        Err(NotifyError::InvalidIntentHandle(_))
    ));
    assert!(fx.composer.trigger(forged).is_err());

    let other = fixture().composer.create_intent("Screen2", "");
    assert!(fx.composer.set_intent(other).is_err());
}

#[tokio::test]
async fn test_big_picture_style_resolves_images() {
    let mut fx = fixture();
    fx.composer
        .set_big_picture_style(BigPictureSource {
            content_title: Some("Look".into()),
            ..BigPictureSource::picture(ResourceDescriptor::parse("photo.png"))
        })
        .unwrap();

    let n = fx.composer.build().await.unwrap();
    match n.style {
        Some(NotificationStyle::BigPicture {
            large_icon,
            picture,
            content_title,
            ..
        }) => {
            assert!(large_icon.is_none());
            assert_eq!(picture.unwrap().as_bitmap().unwrap().width(), 8);
            assert_eq!(content_title.as_deref(), Some("Look"));
        }
        other => panic!("unexpected style {other:?}"),
    }
}

#[tokio::test]
async fn test_channel_auto_created_on_post() {
    let mut fx = fixture();
    fx.composer.set_channel("alerts").unwrap();
    fx.composer.post(1).await.unwrap();

    let channel = fx.platform.channel("alerts").unwrap();
    assert_eq!(channel.name, "alerts");
    assert_eq!(channel.importance, Importance::Default);
}

#[tokio::test]
async fn test_explicit_channel_kept() {
    let mut fx = fixture();
    fx.composer
        .create_channel("news", "News", "Daily news", Importance::High)
        .unwrap();
    fx.composer.set_channel("news").unwrap();
    fx.composer.post(1).await.unwrap();

    let channel = fx.platform.channel("news").unwrap();
    assert_eq!(channel.importance, Importance::High);
    assert_eq!(channel.description.as_deref(), Some("Daily news"));
    assert!(matches!(
        fx.composer.create_channel("", "x", "", Importance::Low),
        Err(NotifyError::EmptyChannelId)
    ));
}

#[tokio::test]
async fn test_notification_info_reads_extras() {
    let mut fx = fixture();
    fx.composer.create_intent("Screen2", "payload");
    fx.composer.post(3).await.unwrap();
    fx.composer.post(4).await.unwrap();

    let info = fx.composer.notification_info(3).unwrap();
    assert_eq!(info.class.as_deref(), Some("app.Screen2"));
    assert_eq!(info.value.as_deref(), Some("payload"));

    let plain = fx.composer.notification_info(4).unwrap();
    assert!(plain.class.is_none());
    assert!(fx.composer.notification_info(5).is_none());
}

#[tokio::test]
async fn test_cancel_and_cancel_all() {
    let mut fx = fixture();
    for id in 1..=3 {
        fx.composer.post(id).await.unwrap();
    }
    fx.composer.cancel(2);
    assert_eq!(fx.composer.active_notification_ids(), vec![1, 3]);
    fx.composer.cancel_all();
    assert!(fx.composer.active_notification_ids().is_empty());
}

#[tokio::test]
async fn test_cancel_releases_attached_handles() {
    let mut fx = fixture();
    let open = fx.composer.create_intent("Screen2", "a");
    let shared = fx.composer.create_intent("Screen3", "b");
    let spare = fx.composer.create_intent("Screen4", "c");

    fx.composer.set_intent(open).unwrap();
    fx.composer
        .add_action(&ResourceDescriptor::empty(), "Both", shared, ActionOptions::default())
        .unwrap();
    fx.composer.post(1).await.unwrap();
    fx.composer
        .add_action(&ResourceDescriptor::empty(), "Both", shared, ActionOptions::default())
        .unwrap();
    fx.composer.post(2).await.unwrap();
    assert_eq!(fx.composer.handle_count(), 3);

    fx.composer.cancel(1);
    assert!(fx.composer.trigger(open).is_err());
    assert!(fx.composer.trigger(shared).is_ok());

    fx.composer.set_intent(shared).unwrap();
    fx.composer.post(2).await.unwrap();
    assert!(fx.composer.trigger(shared).is_ok());

    fx.composer.cancel_all();
    assert!(fx.composer.trigger(shared).is_err());
    assert!(fx.composer.trigger(spare).is_ok());
    assert_eq!(fx.composer.handle_count(), 1);
}

#[tokio::test]
async fn test_background_dispatch_handle_reaches_provider() {
    let provider = Arc::new(RecordingProvider::new());
    let mut fx = ComposerFixture::with_provider(CountingAssetLoader::new(), provider.clone());

    let handle = fx
        .composer
        .create_dispatch_intent("Screen1", "@doThing", vec![json!(1), json!("x")], DeliveryMode::Background)
        .unwrap();
    fx.composer
        .add_action(&ResourceDescriptor::empty(), "Do", handle, ActionOptions::default())
        .unwrap();
    fx.composer.post(9).await.unwrap();

    let fired = fx.composer.trigger(handle).unwrap();
    assert_eq!(fired, Triggered::Dispatched(Delivery::Background(CallResult::Value(json!(true)))));
    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].procedure, "doThing");
    assert_eq!(calls[0].args, vec![json!(1), json!("x")]);
}

#[tokio::test]
async fn test_activate_automation_registers_screen() {
    let provider = Arc::new(RecordingProvider::new());
    let fx = ComposerFixture::with_provider(CountingAssetLoader::new(), provider.clone());
    fx.composer.activate_automation("Screen1");
    assert_eq!(provider.activations(), vec!["Screen1".to_string()]);

    fixture().composer.activate_automation("Screen1");
}
