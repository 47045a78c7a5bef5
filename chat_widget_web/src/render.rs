//! Bootstrap/render: the widget page with its per-render configuration.
//!
//! The markup is an embedded template; rendering injects the proxy endpoint
//! and a freshly minted token into `window.chatWidgetConfig`. The page is
//! served uncached since every render carries its own token.

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{AppendHeaders, Html},
};
use std::sync::Arc;

use crate::AppState;

pub const CHAT_ENDPOINT: &str = "/api/chat";

const WIDGET_TEMPLATE: &str = include_str!("../public/widget.html");
const ENDPOINT_SLOT: &str = "{{chat_endpoint}}";
const TOKEN_SLOT: &str = "{{chat_token}}";

pub async fn widget_page(
    State(state): State<Arc<AppState>>,
) -> (
    StatusCode,
    AppendHeaders<Vec<(HeaderName, &'static str)>>,
    Html<String>,
) {
    let token = state.tokens.issue();
    (
        StatusCode::OK,
        AppendHeaders(vec![
            (header::CACHE_CONTROL, "no-cache, no-store"),
            (header::EXPIRES, "-1"),
        ]),
        Html(render_widget_page(&token)),
    )
}

fn render_widget_page(token: &str) -> String {
    WIDGET_TEMPLATE
        .replace(ENDPOINT_SLOT, CHAT_ENDPOINT)
        .replace(TOKEN_SLOT, token)
}
