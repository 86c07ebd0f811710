//! GPUI integration tests
//!
//! Writes made through the context functions settle on the deferred tick at
//! the end of the update that made them.

use gpui::TestAppContext;
use serde_json::json;
use url_pathfinder::context::{self, current_url};
use url_pathfinder::*;

fn init(cx: &mut TestAppContext, url: &str) {
    cx.update(|cx| {
        init_navigator(cx, Box::new(MemoryHistory::new(url)), Prefs::default());
    });
}

#[gpui::test]
async fn test_init_seeds_from_host(cx: &mut TestAppContext) {
    init(cx, "/start?page=2");

    assert_eq!(cx.read(current_url), "/start?page=2");
    let page = cx.read(|cx| cx.navigator().query().get("page").cloned());
    assert_eq!(page, Some(Value::Number(2.0)));
}

#[gpui::test]
async fn test_writes_in_one_update_settle_once(cx: &mut TestAppContext) {
    init(cx, "/");

    let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = events.clone();
    cx.update(|cx| {
        cx.update_navigator(|nav, _| {
            nav.subscribe(move |event| sink.borrow_mut().push(event.to.clone()));
        });
    });

    cx.update(|cx| {
        context::set_path(cx, "/products");
        context::set_query(cx, "sort=name");
        context::set_fragment(cx, "#top");
    });
    cx.run_until_parked();

    assert_eq!(cx.read(current_url), "/products?sort=name#top");
    assert_eq!(*events.borrow(), vec!["/products?sort=name#top".to_string()]);
    assert_eq!(cx.read(|cx| cx.navigator().depth()), 1);
}

#[gpui::test]
async fn test_goto_and_back(cx: &mut TestAppContext) {
    init(cx, "/");

    cx.update(|cx| context::goto(cx, "/users/7", Some(json!({"from": "list"}))))
        .unwrap();
    cx.run_until_parked();
    assert_eq!(cx.read(current_url), "/users/7");
    assert_eq!(
        cx.read(|cx| cx.navigator().state().clone()),
        json!({"from": "list"})
    );

    cx.update(|cx| context::back(cx, "/"));
    let polled = cx.update(context::poll_host);
    assert!(polled);
    cx.run_until_parked();

    // The host moved back on its own: no new entry, url follows the host
    assert_eq!(cx.read(current_url), "/");
    assert_eq!(cx.read(|cx| cx.navigator().depth()), 0);
}

#[gpui::test]
async fn test_goto_malformed_url(cx: &mut TestAppContext) {
    init(cx, "/");

    let result = cx.update(|cx| context::goto(cx, "http://[::1", None));
    assert!(result.is_err_and(|err| err.is_malformed_url()));
    cx.run_until_parked();
    assert_eq!(cx.read(current_url), "/");
}
