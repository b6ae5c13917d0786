use crate::config::SessionConfig;

use self::http::FriendHttp;

pub use self::friend::FriendApi;

mod friend;
pub mod http;

pub fn friends(conf: &SessionConfig) -> Box<dyn FriendApi> {
    Box::new(FriendHttp::new(conf.clone()))
}
