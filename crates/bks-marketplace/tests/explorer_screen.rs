mod common;

use bks_marketplace::ExplorerScreen;
use bks_wallet_core::{
    EventCardsReply, EventId, LikeList, LikeUpdateReply, PortError, UserId,
};

use common::{cards, ScriptedBackend, SIGNED_IN};

async fn loaded(backend: ScriptedBackend) -> ExplorerScreen<ScriptedBackend> {
    let mut screen = ExplorerScreen::new(backend, Some("https://api.bks.test".to_owned()));
    screen.load().await.expect("load");
    screen
}

fn names(screen: &ExplorerScreen<ScriptedBackend>) -> Vec<&str> {
    screen.visible().iter().map(|c| c.name.as_str()).collect()
}

#[tokio::test]
async fn load_clears_loading_only_on_success() {
    let backend = ScriptedBackend::serving(cards());
    backend.listing.lock().expect("lock").insert(
        0,
        Ok(EventCardsReply {
            success: false,
            eventcards: vec![],
        }),
    );
    backend
        .listing
        .lock()
        .expect("lock")
        .insert(0, Err(PortError::Transport("offline".to_owned())));

    let mut screen = ExplorerScreen::new(backend, None);
    assert!(screen.load().await.is_err());
    assert!(screen.is_loading());
    screen.load().await.expect("unsuccessful reply is not an error");
    assert!(screen.is_loading());
    assert!(screen.visible().is_empty());

    screen.load().await.expect("load");
    assert!(!screen.is_loading());
    assert_eq!(screen.visible().len(), 3);
}

#[tokio::test]
async fn search_filters_by_name_substring() {
    let mut screen = loaded(ScriptedBackend::serving(cards())).await;

    screen.set_search(Some("Jazz".to_owned()));
    assert_eq!(names(&screen), vec!["Jazz Night", "Jazz Brunch"]);

    // case sensitive
    screen.set_search(Some("jazz".to_owned()));
    assert!(screen.visible().is_empty());

    screen.set_search(None);
    assert_eq!(screen.visible().len(), 3);
}

#[tokio::test]
async fn toggle_like_is_noop_when_signed_out() {
    let mut screen = loaded(ScriptedBackend::serving(cards())).await;
    assert_eq!(screen.toggle_like(&EventId::Numeric(1)).await, None);

    screen.set_user_info(Some("{broken"));
    assert_eq!(screen.toggle_like(&EventId::Numeric(1)).await, None);
}

#[tokio::test]
async fn toggle_like_removes_and_adds_the_user() {
    let mut screen = loaded(ScriptedBackend::serving(cards())).await;
    screen.set_user_info(Some(SIGNED_IN));
    let jazz = EventId::Numeric(1);

    assert_eq!(screen.toggle_like(&jazz).await, Some(false));
    let card = screen.card(&jazz).expect("card");
    assert_eq!(card.likes(), LikeList::from_ids([UserId::Numeric(8)]));
    assert_eq!(card.likes_number.as_deref(), Some("[8]"));

    assert_eq!(screen.toggle_like(&jazz).await, Some(true));
    assert_eq!(
        screen.card(&jazz).expect("card").likes(),
        LikeList::from_ids([UserId::Numeric(8), UserId::Numeric(7)])
    );
}

#[tokio::test]
async fn malformed_likes_start_from_empty_list() {
    let backend = ScriptedBackend::serving(cards());
    let mut screen = loaded(backend).await;
    screen.set_user_info(Some(SIGNED_IN));

    let rock = EventId::Numeric(2);
    assert_eq!(screen.toggle_like(&rock).await, Some(true));
    assert_eq!(screen.card(&rock).expect("card").likes_number.as_deref(), Some("[7]"));

    let brunch = EventId::Text("vip-3".to_owned());
    assert_eq!(screen.toggle_like(&brunch).await, Some(true));
    assert_eq!(screen.card(&brunch).expect("card").likes_count(), 1);
}

#[tokio::test]
async fn like_targets_card_by_id_under_active_search() {
    let mut screen = loaded(ScriptedBackend::serving(cards())).await;
    screen.set_user_info(Some(SIGNED_IN));
    screen.set_search(Some("Brunch".to_owned()));

    let brunch = EventId::Text("vip-3".to_owned());
    assert_eq!(screen.toggle_like(&brunch).await, Some(true));
    assert_eq!(screen.visible()[0].likes_count(), 1);
    // the first card overall is untouched
    assert_eq!(screen.card(&EventId::Numeric(1)).expect("card").likes_count(), 2);
}

#[tokio::test]
async fn failed_like_update_leaves_state_unchanged() {
    let backend = ScriptedBackend::serving(cards());
    backend.set_like_reply(Ok(LikeUpdateReply {
        success: false,
        message: Some("denied".to_owned()),
    }));
    let mut screen = loaded(backend).await;
    screen.set_user_info(Some(SIGNED_IN));
    let jazz = EventId::Numeric(1);

    assert_eq!(screen.toggle_like(&jazz).await, None);
    assert_eq!(screen.card(&jazz).expect("card").likes_number.as_deref(), Some("[7, 8]"));

    assert_eq!(screen.toggle_like(&EventId::Numeric(404)).await, None);
}

#[tokio::test]
async fn transport_error_on_like_update_is_swallowed() {
    let backend = ScriptedBackend::serving(cards());
    backend.set_like_reply(Err(PortError::Transport("timeout".to_owned())));
    let mut screen = loaded(backend).await;
    screen.set_user_info(Some(SIGNED_IN));

    assert_eq!(screen.toggle_like(&EventId::Numeric(2)).await, None);
    assert_eq!(
        screen.card(&EventId::Numeric(2)).expect("card").likes_number.as_deref(),
        Some("not json")
    );
}

#[tokio::test]
async fn picture_url_uses_configured_base() {
    let screen = loaded(ScriptedBackend::serving(cards())).await;
    let jazz = screen.card(&EventId::Numeric(1)).expect("card");
    assert_eq!(
        screen.picture_url(jazz).as_deref(),
        Some("https://api.bks.test/api/upload/get_file?path=jazz.png")
    );
    assert!(jazz.is_sold_out());
    assert_eq!(screen.picture_url(screen.card(&EventId::Numeric(2)).expect("card")), None);
}
