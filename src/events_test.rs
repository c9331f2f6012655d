use super::*;

#[tokio::test]
async fn subscribers_receive_in_order() {
    let events = SessionEvents::new();
    let mut rx = events.subscribe();

    events.emit(SessionEvent::SignedIn { user_id: "u1".into() });
    events.emit(SessionEvent::SignedOut);

    assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedIn { user_id: "u1".into() });
    assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut);
}

#[test]
fn emit_without_subscribers_is_noop() {
    let events = SessionEvents::new();
    events.emit(SessionEvent::SignedOut);
}

#[tokio::test]
async fn clones_share_the_channel() {
    let events = SessionEvents::new();
    let mut rx = events.subscribe();
    let other = events.clone();

    other.emit(SessionEvent::Invalidated { path: "/stories".into(), status: 401 });

    assert_eq!(rx.recv().await.unwrap(), SessionEvent::Invalidated { path: "/stories".into(), status: 401 });
}

#[test]
fn zero_capacity_is_clamped() {
    let events = SessionEvents::with_capacity(0);
    let mut rx = events.subscribe();
    events.emit(SessionEvent::SignedOut);
    assert_eq!(rx.try_recv().unwrap(), SessionEvent::SignedOut);
}
