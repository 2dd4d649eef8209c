use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{spotify, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    if let Err(e) = spotify::auth::auth(shared_state).await {
        super::fail(e, "access token");
    }
}
